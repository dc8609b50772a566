use super::discriminator::Discriminator;
use super::name::PojoName;
use super::pojo::ObjectPojo;

/// The three composition keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositionKind {
    AllOf,
    OneOf,
    AnyOf,
}

impl CompositionKind {
    /// Tag used when naming inline composition members (`PetOneOf`).
    pub fn as_pascal_case(&self) -> &'static str {
        match self {
            CompositionKind::AllOf => "AllOf",
            CompositionKind::OneOf => "OneOf",
            CompositionKind::AnyOf => "AnyOf",
        }
    }
}

impl std::fmt::Display for CompositionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CompositionKind::AllOf => "allOf",
            CompositionKind::OneOf => "oneOf",
            CompositionKind::AnyOf => "anyOf",
        };
        f.write_str(s)
    }
}

/// Resolved allOf members in declaration order. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct AllOfComposition {
    pub pojos: Vec<ObjectPojo>,
}

/// Resolved oneOf branches in declaration order. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct OneOfComposition {
    pub pojos: Vec<ObjectPojo>,
    pub discriminator: Option<Discriminator>,
}

/// Resolved anyOf branches in declaration order. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct AnyOfComposition {
    pub pojos: Vec<ObjectPojo>,
    pub discriminator: Option<Discriminator>,
}

/// A pure union: the content of a [`super::pojo::ComposedPojo`].
#[derive(Debug, Clone, PartialEq)]
pub enum UnionComposition {
    OneOf(OneOfComposition),
    AnyOf(AnyOfComposition),
}

impl UnionComposition {
    pub fn kind(&self) -> CompositionKind {
        match self {
            UnionComposition::OneOf(_) => CompositionKind::OneOf,
            UnionComposition::AnyOf(_) => CompositionKind::AnyOf,
        }
    }

    pub fn pojos(&self) -> &[ObjectPojo] {
        match self {
            UnionComposition::OneOf(c) => &c.pojos,
            UnionComposition::AnyOf(c) => &c.pojos,
        }
    }

    pub fn discriminator(&self) -> Option<&Discriminator> {
        match self {
            UnionComposition::OneOf(c) => c.discriminator.as_ref(),
            UnionComposition::AnyOf(c) => c.discriminator.as_ref(),
        }
    }

    pub(crate) fn map_pojos(
        &self,
        f: &dyn Fn(&ObjectPojo) -> ObjectPojo,
        rename: &dyn Fn(&PojoName) -> Option<PojoName>,
    ) -> Self {
        match self {
            UnionComposition::OneOf(c) => UnionComposition::OneOf(OneOfComposition {
                pojos: c.pojos.iter().map(f).collect(),
                discriminator: c.discriminator.as_ref().map(|d| rename_discriminator(d, rename)),
            }),
            UnionComposition::AnyOf(c) => UnionComposition::AnyOf(AnyOfComposition {
                pojos: c.pojos.iter().map(f).collect(),
                discriminator: c.discriminator.as_ref().map(|d| rename_discriminator(d, rename)),
            }),
        }
    }
}

pub(crate) fn rename_discriminator(
    discriminator: &Discriminator,
    rename: &dyn Fn(&PojoName) -> Option<PojoName>,
) -> Discriminator {
    let mut renamed = discriminator.clone();
    for mapping in &mut renamed.mappings {
        if let Some(new_name) = rename(&mapping.pojo_name) {
            mapping.pojo_name = new_name;
        }
    }
    renamed
}
