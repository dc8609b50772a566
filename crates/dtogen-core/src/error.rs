use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::CompositionKind;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("in referenced document {document}: {source}")]
    Document {
        document: String,
        source: Box<ParseError>,
    },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },

    #[error("invalid excluded schema pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

/// A pojo whose composition still names schemas that never resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub pojo: String,
    pub missing: Vec<String>,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> [{}]", self.pojo, self.missing.join(", "))
    }
}

/// Structural errors that abort a run.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResolveError {
    #[error("unresolvable references: {}", join(.0))]
    UnresolvableReferences(Vec<UnresolvedReference>),

    #[error("ambiguous member '{member}' in allOf of {pojo}")]
    AmbiguousMember { pojo: String, member: String },

    #[error("{kind} member {member} of {pojo} is a {member_kind} pojo, expected an object")]
    InvalidCompositionMember {
        pojo: String,
        kind: CompositionKind,
        member: String,
        member_kind: &'static str,
    },

    #[error("discriminator mapping '{value}' of {pojo} targets {target}, which is not a branch")]
    InvalidDiscriminatorMapping {
        pojo: String,
        value: String,
        target: String,
    },

    #[error("enum {pojo} has no description for: {}", .missing.join(", "))]
    IncompleteEnumDescription { pojo: String, missing: Vec<String> },

    #[error("schemas '{first}' and '{second}' both map to type name {type_name}")]
    DuplicateTypeName {
        first: String,
        second: String,
        type_name: String,
    },

    #[error("{reference} points into {document}, which was not loaded")]
    UnloadedDocument { reference: String, document: String },

    #[error("{} errors:\n  {}", .0.len(), join_lines(.0))]
    Multiple(Vec<ResolveError>),
}

impl ResolveError {
    /// Collapse collected errors: one stays itself, several become `Multiple`.
    pub fn from_errors(mut errors: Vec<ResolveError>) -> Option<ResolveError> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(ResolveError::Multiple(errors)),
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_lines<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n  ")
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("build error: {0}")]
    Build(#[from] BuildError),
}

/// Non-fatal degradations collected alongside a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("unrecognized schema shape for {pojo}.{member}, mapped to NoType")]
    UnrecognizedSchemaShape { pojo: String, member: String },

    #[error("{pojo} references {reference}, which is not defined")]
    DanglingReference { pojo: String, reference: String },

    #[error("enum {pojo} has no description for: {}", .missing.join(", "))]
    IncompleteEnumDescription { pojo: String, missing: Vec<String> },

    #[error("enum {pojo} has non-string values, mapped as a plain type")]
    NonStringEnumValues { pojo: String },

    #[error("reference cycle through {pojo} cannot be inlined")]
    CyclicAliasReference { pojo: String },
}
