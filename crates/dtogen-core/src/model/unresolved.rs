use super::composition::CompositionKind;
use super::constraints::Constraints;
use super::discriminator::UntypedDiscriminator;
use super::member::PojoMember;
use super::name::{Name, PojoName};
use super::pojo::AdditionalProperties;

/// A composition whose branches are still pojo names.
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedComposition {
    pub kind: CompositionKind,
    pub pojo_names: Vec<PojoName>,
    pub discriminator: Option<UntypedDiscriminator>,
}

/// An object pojo that still refers to its composition branches by name.
///
/// Only exists while the resolver runs.
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedObjectPojo {
    pub name: PojoName,
    pub description: Option<String>,
    pub members: Vec<PojoMember>,
    pub required_additional_properties: Vec<Name>,
    pub additional_properties: AdditionalProperties,
    pub constraints: Constraints,
    pub all_of: Option<UnresolvedComposition>,
    pub one_of: Option<UnresolvedComposition>,
    pub any_of: Option<UnresolvedComposition>,
}

impl UnresolvedObjectPojo {
    pub fn compositions(&self) -> impl Iterator<Item = &UnresolvedComposition> {
        [&self.all_of, &self.one_of, &self.any_of]
            .into_iter()
            .flatten()
    }

    /// Every branch name across all compositions, in declaration order.
    pub fn composition_names(&self) -> impl Iterator<Item = &PojoName> {
        self.compositions().flat_map(|c| c.pojo_names.iter())
    }

    /// True when the schema has no content besides a single oneOf or anyOf.
    pub fn is_pure_union(&self) -> bool {
        self.members.is_empty()
            && self.all_of.is_none()
            && self.one_of.is_some() != self.any_of.is_some()
    }
}
