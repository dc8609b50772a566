use super::name::{Name, PojoName};
use super::types::Type;

/// Whether a member must be present in a serialized instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Necessity {
    Required,
    Optional,
}

impl Necessity {
    pub fn from_required(required: bool) -> Self {
        if required {
            Necessity::Required
        } else {
            Necessity::Optional
        }
    }
}

/// Whether a member's value may be `null`, independent of presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nullability {
    Nullable,
    NotNullable,
}

impl Nullability {
    pub fn from_nullable(nullable: bool) -> Self {
        if nullable {
            Nullability::Nullable
        } else {
            Nullability::NotNullable
        }
    }
}

/// The four presence/null states a member can be in.
///
/// Each state has its own accessor contract in generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberState {
    /// Always present, never null.
    RequiredNotNullable,
    /// Key always present; the value may be null.
    RequiredNullable,
    /// Key may be absent; if present, never null.
    OptionalNotNullable,
    /// Absent, present with null, or present with a value.
    Tristate,
}

/// A single property of a pojo.
#[derive(Debug, Clone, PartialEq)]
pub struct PojoMember {
    pub name: Name,
    pub description: Option<String>,
    pub member_type: Type,
    pub necessity: Necessity,
    pub nullability: Nullability,
}

impl PojoMember {
    pub fn new(
        name: impl Into<Name>,
        member_type: Type,
        necessity: Necessity,
        nullability: Nullability,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            member_type,
            necessity,
            nullability,
        }
    }

    pub fn state(&self) -> MemberState {
        match (self.necessity, self.nullability) {
            (Necessity::Required, Nullability::NotNullable) => MemberState::RequiredNotNullable,
            (Necessity::Required, Nullability::Nullable) => MemberState::RequiredNullable,
            (Necessity::Optional, Nullability::NotNullable) => MemberState::OptionalNotNullable,
            (Necessity::Optional, Nullability::Nullable) => MemberState::Tristate,
        }
    }

    pub fn is_required(&self) -> bool {
        self.necessity == Necessity::Required
    }

    pub fn is_optional(&self) -> bool {
        !self.is_required()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullability == Nullability::Nullable
    }

    pub fn with_description(self, description: Option<String>) -> Self {
        Self {
            description,
            ..self
        }
    }

    pub fn with_type(self, member_type: Type) -> Self {
        Self {
            member_type,
            ..self
        }
    }

    /// Rewrite pojo references in the member type.
    pub fn map_names(&self, rename: &dyn Fn(&PojoName) -> Option<PojoName>) -> Self {
        self.clone().with_type(self.member_type.map_names(rename))
    }

    /// Replace references to `reference` with its type. A direct reference
    /// also takes over the referenced schema's description when the member has
    /// none.
    pub fn inline_object_reference(
        &self,
        reference: &PojoName,
        reference_description: Option<&str>,
        reference_type: &Type,
    ) -> Self {
        let direct = self
            .member_type
            .as_object_name()
            .is_some_and(|n| n.equals_ignore_case(reference));
        let description = match (&self.description, direct) {
            (None, true) => reference_description.map(str::to_string),
            _ => self.description.clone(),
        };
        self.clone()
            .with_type(
                self.member_type
                    .inline_object_reference(reference, reference_type),
            )
            .with_description(description)
    }

    /// Attach the description of a referenced pojo if this member has none.
    pub fn add_object_type_description(&self, object_type: &PojoName, description: &str) -> Self {
        let references = self
            .member_type
            .as_object_name()
            .is_some_and(|n| n.equals_ignore_case(object_type));
        if references && self.description.is_none() {
            self.clone().with_description(Some(description.to_string()))
        } else {
            self.clone()
        }
    }
}
