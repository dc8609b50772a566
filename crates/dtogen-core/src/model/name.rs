use std::fmt;

use crate::transform::name_normalizer::{to_member_identifier, to_type_identifier};

/// A raw schema or property key, as written in the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    pub fn of(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Type identifier form (`pet` → `Pet`).
    pub fn starts_upper_case(&self) -> String {
        to_type_identifier(&self.0)
    }

    /// Member identifier form (`Pet` → `pet`).
    pub fn starts_lower_case(&self) -> String {
        to_member_identifier(&self.0)
    }

    pub fn equals_ignore_case(&self, other: &Name) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::of(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The identity of a generated type: a schema name plus the configured suffix.
///
/// PojoNames are matched case-insensitively ([`PojoName::key`]) but keep the
/// spelling of the schema key they were derived from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PojoName {
    name: Name,
    suffix: String,
}

impl PojoName {
    pub fn of_name_and_suffix(name: impl Into<Name>, suffix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            suffix: suffix.into(),
        }
    }

    /// The un-suffixed schema name.
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Name of an inline schema nested under this one, e.g. `Pet` + `owner`
    /// → `PetOwner`.
    pub fn derive_member_name(&self, member: &Name) -> Self {
        self.append_to_name(&member.starts_upper_case())
    }

    pub fn append_to_name(&self, append: &str) -> Self {
        Self {
            name: Name::of(format!("{}{}", self.name.starts_upper_case(), append)),
            suffix: self.suffix.clone(),
        }
    }

    /// Case-insensitive lookup key.
    pub fn key(&self) -> String {
        self.to_string().to_lowercase()
    }

    pub fn equals_ignore_case(&self, other: &PojoName) -> bool {
        self.key() == other.key()
    }

    /// Replace a constant substring of the schema name.
    pub fn replace_constant(&self, constant: &str, replacement: &str) -> Self {
        if constant.is_empty() {
            return self.clone();
        }
        Self {
            name: Name::of(self.name.as_str().replace(constant, replacement)),
            suffix: self.suffix.clone(),
        }
    }
}

impl fmt::Display for PojoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name.starts_upper_case(), self.suffix)
    }
}
