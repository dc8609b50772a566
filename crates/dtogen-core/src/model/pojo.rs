use crate::error::BuildError;

use super::composition::{
    AllOfComposition, AnyOfComposition, CompositionKind, OneOfComposition, UnionComposition,
    rename_discriminator,
};
use super::constraints::Constraints;
use super::member::{Necessity, Nullability, PojoMember};
use super::name::{Name, PojoName};
use super::types::{EnumMember, Type, TypeKind};

/// Whether an object accepts properties beyond its declared members.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    NotAllowed,
    Allowed(Type),
}

impl AdditionalProperties {
    /// Allow additional properties of `value_type`. An unmapped value type
    /// degrades to the free-form sentinel.
    pub fn allowed_for(value_type: Type) -> Self {
        if value_type.is_no_type() {
            AdditionalProperties::Allowed(Type::free_form())
        } else {
            AdditionalProperties::Allowed(value_type)
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, AdditionalProperties::Allowed(_))
    }

    pub fn value_type(&self) -> Option<&Type> {
        match self {
            AdditionalProperties::Allowed(t) => Some(t),
            AdditionalProperties::NotAllowed => None,
        }
    }

    fn map_type(&self, f: &dyn Fn(&Type) -> Type) -> Self {
        match self {
            AdditionalProperties::Allowed(t) => AdditionalProperties::Allowed(f(t)),
            AdditionalProperties::NotAllowed => AdditionalProperties::NotAllowed,
        }
    }
}

/// A resolved description of one generated data type.
#[derive(Debug, Clone, PartialEq)]
pub enum Pojo {
    Object(ObjectPojo),
    Array(ArrayPojo),
    Enum(EnumPojo),
    Composed(ComposedPojo),
    FreeForm(FreeFormPojo),
    Alias(AliasPojo),
}

impl Pojo {
    pub fn name(&self) -> &PojoName {
        match self {
            Pojo::Object(p) => &p.name,
            Pojo::Array(p) => &p.name,
            Pojo::Enum(p) => &p.name,
            Pojo::Composed(p) => &p.name,
            Pojo::FreeForm(p) => &p.name,
            Pojo::Alias(p) => &p.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Pojo::Object(p) => p.description.as_deref(),
            Pojo::Array(p) => p.description.as_deref(),
            Pojo::Enum(p) => p.description.as_deref(),
            Pojo::Composed(p) => p.description.as_deref(),
            Pojo::FreeForm(p) => p.description.as_deref(),
            Pojo::Alias(p) => p.description.as_deref(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Pojo::Object(_) => "object",
            Pojo::Array(_) => "array",
            Pojo::Enum(_) => "enum",
            Pojo::Composed(_) => "composed",
            Pojo::FreeForm(_) => "free_form",
            Pojo::Alias(_) => "alias",
        }
    }

    pub fn as_object(&self) -> Option<&ObjectPojo> {
        match self {
            Pojo::Object(p) => Some(p),
            _ => None,
        }
    }

    /// Rename pojos and every reference to them.
    pub fn map_names(&self, rename: &dyn Fn(&PojoName) -> Option<PojoName>) -> Self {
        self.transform(&PojoTransform {
            member: &|m| m.map_names(rename),
            value_type: &|t| t.map_names(rename),
            rename,
        })
    }

    /// Replace references to `reference` with `reference_type`.
    pub fn inline_object_reference(
        &self,
        reference: &PojoName,
        reference_description: Option<&str>,
        reference_type: &Type,
    ) -> Self {
        self.transform(&PojoTransform {
            member: &|m| m.inline_object_reference(reference, reference_description, reference_type),
            value_type: &|t| t.inline_object_reference(reference, reference_type),
            rename: &|_| None,
        })
    }

    /// Give members referencing `object_type` its description when they have none.
    pub fn add_object_type_description(&self, object_type: &PojoName, description: &str) -> Self {
        self.transform(&PojoTransform {
            member: &|m| m.add_object_type_description(object_type, description),
            value_type: &Type::clone,
            rename: &|_| None,
        })
    }

    /// Pojo names referenced by member types and additional properties.
    pub fn referenced_names(&self) -> Vec<&PojoName> {
        match self {
            Pojo::Object(p) => p.referenced_names(),
            Pojo::Array(p) => p.value.member_type.referenced_names(),
            Pojo::Composed(p) => p
                .composition
                .pojos()
                .iter()
                .flat_map(ObjectPojo::referenced_names)
                .collect(),
            Pojo::Alias(p) => p.alias_type.referenced_names(),
            Pojo::Enum(_) | Pojo::FreeForm(_) => Vec::new(),
        }
    }

    fn transform(&self, t: &PojoTransform<'_>) -> Self {
        let rename = |name: &PojoName| (t.rename)(name).unwrap_or_else(|| name.clone());
        match self {
            Pojo::Object(p) => Pojo::Object(p.transform(t)),
            Pojo::Array(p) => Pojo::Array(ArrayPojo {
                name: rename(&p.name),
                description: p.description.clone(),
                value: (t.member)(&p.value),
            }),
            Pojo::Enum(p) => Pojo::Enum(EnumPojo {
                name: rename(&p.name),
                ..p.clone()
            }),
            Pojo::Composed(p) => Pojo::Composed(ComposedPojo {
                name: rename(&p.name),
                description: p.description.clone(),
                composition: p.composition.map_pojos(&|o| o.transform(t), t.rename),
            }),
            Pojo::FreeForm(p) => Pojo::FreeForm(FreeFormPojo {
                name: rename(&p.name),
                ..p.clone()
            }),
            Pojo::Alias(p) => Pojo::Alias(AliasPojo {
                name: rename(&p.name),
                description: p.description.clone(),
                alias_type: (t.value_type)(&p.alias_type),
                nullability: p.nullability,
            }),
        }
    }
}

/// A structural rewrite applied uniformly through a pojo and its compositions.
struct PojoTransform<'a> {
    member: &'a dyn Fn(&PojoMember) -> PojoMember,
    value_type: &'a dyn Fn(&Type) -> Type,
    rename: &'a dyn Fn(&PojoName) -> Option<PojoName>,
}

/// An object with members, additional-properties policy, and optional
/// composition links.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPojo {
    pub name: PojoName,
    pub description: Option<String>,
    pub members: Vec<PojoMember>,
    pub required_additional_properties: Vec<Name>,
    pub additional_properties: AdditionalProperties,
    pub constraints: Constraints,
    pub all_of: Option<AllOfComposition>,
    pub one_of: Option<OneOfComposition>,
    pub any_of: Option<AnyOfComposition>,
}

impl ObjectPojo {
    pub fn builder() -> ObjectPojoBuilder {
        ObjectPojoBuilder::default()
    }

    pub fn member(&self, name: &str) -> Option<&PojoMember> {
        self.members.iter().find(|m| m.name.as_str() == name)
    }

    pub fn has_composition(&self, kind: CompositionKind) -> bool {
        match kind {
            CompositionKind::AllOf => self.all_of.is_some(),
            CompositionKind::OneOf => self.one_of.is_some(),
            CompositionKind::AnyOf => self.any_of.is_some(),
        }
    }

    fn referenced_names(&self) -> Vec<&PojoName> {
        let mut names: Vec<&PojoName> = self
            .members
            .iter()
            .flat_map(|m| m.member_type.referenced_names())
            .collect();
        if let Some(t) = self.additional_properties.value_type() {
            names.extend(t.referenced_names());
        }
        let branches = self
            .all_of
            .iter()
            .flat_map(|c| c.pojos.iter())
            .chain(self.one_of.iter().flat_map(|c| c.pojos.iter()))
            .chain(self.any_of.iter().flat_map(|c| c.pojos.iter()));
        for branch in branches {
            names.extend(branch.referenced_names());
        }
        names
    }

    fn transform(&self, t: &PojoTransform<'_>) -> Self {
        let union = |pojos: &Vec<ObjectPojo>| pojos.iter().map(|p| p.transform(t)).collect();
        Self {
            name: (t.rename)(&self.name).unwrap_or_else(|| self.name.clone()),
            description: self.description.clone(),
            members: self.members.iter().map(t.member).collect(),
            required_additional_properties: self.required_additional_properties.clone(),
            additional_properties: self.additional_properties.map_type(t.value_type),
            constraints: self.constraints.clone(),
            all_of: self.all_of.as_ref().map(|c| AllOfComposition {
                pojos: union(&c.pojos),
            }),
            one_of: self.one_of.as_ref().map(|c| OneOfComposition {
                pojos: union(&c.pojos),
                discriminator: c
                    .discriminator
                    .as_ref()
                    .map(|d| rename_discriminator(d, t.rename)),
            }),
            any_of: self.any_of.as_ref().map(|c| AnyOfComposition {
                pojos: union(&c.pojos),
                discriminator: c
                    .discriminator
                    .as_ref()
                    .map(|d| rename_discriminator(d, t.rename)),
            }),
        }
    }
}

/// Flat builder for [`ObjectPojo`]; `build` fails when the name is missing.
#[derive(Debug, Default)]
pub struct ObjectPojoBuilder {
    name: Option<PojoName>,
    description: Option<String>,
    members: Vec<PojoMember>,
    required_additional_properties: Vec<Name>,
    additional_properties: Option<AdditionalProperties>,
    constraints: Constraints,
    all_of: Option<AllOfComposition>,
    one_of: Option<OneOfComposition>,
    any_of: Option<AnyOfComposition>,
}

impl ObjectPojoBuilder {
    pub fn name(mut self, name: PojoName) -> Self {
        self.name = Some(name);
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn members(mut self, members: Vec<PojoMember>) -> Self {
        self.members = members;
        self
    }

    pub fn required_additional_properties(mut self, names: Vec<Name>) -> Self {
        self.required_additional_properties = names;
        self
    }

    pub fn additional_properties(mut self, additional_properties: AdditionalProperties) -> Self {
        self.additional_properties = Some(additional_properties);
        self
    }

    pub fn constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn all_of(mut self, composition: Option<AllOfComposition>) -> Self {
        self.all_of = composition;
        self
    }

    pub fn one_of(mut self, composition: Option<OneOfComposition>) -> Self {
        self.one_of = composition;
        self
    }

    pub fn any_of(mut self, composition: Option<AnyOfComposition>) -> Self {
        self.any_of = composition;
        self
    }

    pub fn build(self) -> Result<ObjectPojo, BuildError> {
        let name = self.name.ok_or(BuildError::MissingField("name"))?;
        Ok(ObjectPojo {
            name,
            description: self.description,
            members: self.members,
            required_additional_properties: self.required_additional_properties,
            additional_properties: self
                .additional_properties
                .unwrap_or(AdditionalProperties::NotAllowed),
            constraints: self.constraints,
            all_of: self.all_of,
            one_of: self.one_of,
            any_of: self.any_of,
        })
    }
}

/// A top-level array schema, represented by its synthetic `value` member.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPojo {
    pub name: PojoName,
    pub description: Option<String>,
    pub value: PojoMember,
}

impl ArrayPojo {
    pub const VALUE_MEMBER: &'static str = "value";

    pub fn of(
        name: PojoName,
        description: Option<String>,
        array_type: Type,
        nullability: Nullability,
    ) -> Self {
        Self {
            name,
            description,
            value: PojoMember::new(
                Self::VALUE_MEMBER,
                array_type,
                Necessity::Required,
                nullability,
            ),
        }
    }

    pub fn item_type(&self) -> Option<&Type> {
        match &self.value.member_type.kind {
            TypeKind::Array(item) => Some(&**item),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumPojo {
    pub name: PojoName,
    pub description: Option<String>,
    pub members: Vec<EnumMember>,
}

/// A pure oneOf/anyOf union.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPojo {
    pub name: PojoName,
    pub description: Option<String>,
    pub composition: UnionComposition,
}

/// An object without declared properties that accepts anything.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeFormPojo {
    pub name: PojoName,
    pub description: Option<String>,
    pub constraints: Constraints,
}

/// A named scalar-like schema kept as its own type instead of being inlined.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasPojo {
    pub name: PojoName,
    pub description: Option<String>,
    pub alias_type: Type,
    pub nullability: Nullability,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::discriminator::{Discriminator, DiscriminatorMapping};

    fn name(n: &str) -> PojoName {
        PojoName::of_name_and_suffix(n, "")
    }

    fn object(n: &str, members: Vec<PojoMember>) -> ObjectPojo {
        ObjectPojo::builder()
            .name(name(n))
            .members(members)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_name() {
        let err = ObjectPojo::builder().build().unwrap_err();
        assert_eq!(err, BuildError::MissingField("name"));
    }

    #[test]
    fn test_builder_defaults() {
        let pojo = object("Pet", vec![]);
        assert_eq!(pojo.additional_properties, AdditionalProperties::NotAllowed);
        assert!(pojo.constraints.is_empty());
        assert!(!pojo.has_composition(CompositionKind::AllOf));
    }

    #[test]
    fn test_allowed_for_no_type_is_free_form() {
        assert_eq!(
            AdditionalProperties::allowed_for(Type::no_type()),
            AdditionalProperties::Allowed(Type::free_form())
        );
    }

    #[test]
    fn test_map_names_reaches_compositions() {
        let cat = object(
            "Cat",
            vec![PojoMember::new(
                "owner",
                Type::object(name("LegacyOwner")),
                Necessity::Required,
                Nullability::NotNullable,
            )],
        );
        let pet = Pojo::Composed(ComposedPojo {
            name: name("LegacyPet"),
            description: None,
            composition: UnionComposition::OneOf(OneOfComposition {
                pojos: vec![cat],
                discriminator: Some(Discriminator {
                    property_name: Name::of("type"),
                    mappings: vec![DiscriminatorMapping {
                        value: "cat".to_string(),
                        pojo_name: name("Cat"),
                    }],
                }),
            }),
        });

        let renamed = pet.map_names(&|n| Some(n.replace_constant("Legacy", "")));
        assert_eq!(renamed.name().to_string(), "Pet");
        let Pojo::Composed(composed) = renamed else {
            panic!("expected composed pojo");
        };
        let branch = &composed.composition.pojos()[0];
        assert_eq!(
            branch.members[0].member_type,
            Type::object(name("Owner"))
        );
    }

    #[test]
    fn test_referenced_names() {
        let pojo = Pojo::Object(
            ObjectPojo::builder()
                .name(name("User"))
                .members(vec![PojoMember::new(
                    "address",
                    Type::object(name("Address")),
                    Necessity::Optional,
                    Nullability::NotNullable,
                )])
                .additional_properties(AdditionalProperties::allowed_for(Type::object(name("Tag"))))
                .build()
                .unwrap(),
        );
        let names: Vec<String> = pojo.referenced_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["Address", "Tag"]);
    }

    #[test]
    fn test_array_pojo_item_type() {
        let array = ArrayPojo::of(
            name("Pets"),
            None,
            Type::array(Type::integer()),
            Nullability::NotNullable,
        );
        assert_eq!(array.item_type(), Some(&Type::integer()));
        assert_eq!(array.value.name.as_str(), "value");
        assert!(array.value.is_required());
    }
}
