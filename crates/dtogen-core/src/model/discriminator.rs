use indexmap::IndexMap;
use thiserror::Error;

use super::name::{Name, PojoName};

/// A discriminator value with no matching branch, reported when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value '{value}' for discriminator property '{property_name}'")]
pub struct DiscriminatorMismatch {
    pub property_name: String,
    pub value: String,
}

/// A discriminator as written on a composing schema, before its branches are
/// resolved. Mapping targets are already reduced to pojo names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UntypedDiscriminator {
    pub property_name: Name,
    pub mapping: Option<IndexMap<String, PojoName>>,
}

/// One dispatch entry: discriminator value to branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscriminatorMapping {
    pub value: String,
    pub pojo_name: PojoName,
}

/// The resolved discriminator of a oneOf/anyOf composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discriminator {
    pub property_name: Name,
    pub mappings: Vec<DiscriminatorMapping>,
}

impl Discriminator {
    /// Value used for `branch` when dispatching, if the branch takes part.
    pub fn value_for(&self, branch: &PojoName) -> Option<&str> {
        self.mappings
            .iter()
            .find(|m| m.pojo_name.equals_ignore_case(branch))
            .map(|m| m.value.as_str())
    }

    /// Branch selected by an incoming discriminator value.
    pub fn branch_for(&self, value: &str) -> Result<&PojoName, DiscriminatorMismatch> {
        self.mappings
            .iter()
            .find(|m| m.value == value)
            .map(|m| &m.pojo_name)
            .ok_or_else(|| DiscriminatorMismatch {
                property_name: self.property_name.to_string(),
                value: value.to_string(),
            })
    }

    /// Like [`Discriminator::branch_for`] but falls back to a caller-supplied
    /// branch instead of failing.
    pub fn branch_for_or<'a>(&'a self, value: &str, fallback: &'a PojoName) -> &'a PojoName {
        self.branch_for(value).unwrap_or(fallback)
    }
}
