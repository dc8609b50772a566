use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::SettingsError;
use crate::model::{ClassOverride, Type, TypeKind};

/// Settings for one generation run, loaded from `.dtogen.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PojoSettings {
    pub input: String,
    /// Appended to every generated type name.
    pub suffix: String,
    /// Regular expressions; a top-level schema whose name fully matches one is skipped.
    pub excluded_schemas: Vec<String>,
    pub class_mappings: Vec<ClassMapping>,
    pub format_mappings: Vec<FormatMapping>,
    pub reference_inlining: ReferenceInlining,
    pub name_mappings: Vec<NameMapping>,
    pub enum_description: Option<EnumDescriptionSettings>,
}

impl Default for PojoSettings {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            suffix: String::new(),
            excluded_schemas: Vec::new(),
            class_mappings: Vec::new(),
            format_mappings: Vec::new(),
            reference_inlining: ReferenceInlining::Simple,
            name_mappings: Vec::new(),
            enum_description: None,
        }
    }
}

impl PojoSettings {
    /// Class override for a mapped type: a format mapping wins over a class
    /// mapping of the canonical type name.
    pub fn class_override_for(&self, ty: &Type) -> Option<ClassOverride> {
        if let TypeKind::String(format) = &ty.kind
            && let Some(format) = format.as_format()
            && let Some(mapping) = self.format_mappings.iter().find(|m| m.format == format)
        {
            return Some(ClassOverride {
                class_name: mapping.to.clone(),
                import: mapping.import.clone(),
            });
        }
        let canonical = ty.canonical_name()?;
        self.class_mappings
            .iter()
            .find(|m| m.from.eq_ignore_ascii_case(canonical))
            .map(|m| ClassOverride {
                class_name: m.to.clone(),
                import: m.import.clone(),
            })
    }

    /// Compile `excluded_schemas` once for the run.
    pub fn exclusion_filter(&self) -> Result<ExclusionFilter, SettingsError> {
        let patterns = self
            .excluded_schemas
            .iter()
            .map(|pattern| {
                Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
                    SettingsError::InvalidPattern {
                        pattern: pattern.clone(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ExclusionFilter { patterns })
    }
}

/// Compiled schema-exclusion patterns.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    patterns: Vec<Regex>,
}

impl ExclusionFilter {
    pub fn is_excluded(&self, schema_name: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(schema_name))
    }
}

/// Replace the class of a canonical scalar type (`uuid`, `date-time`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClassMapping {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub import: Option<String>,
}

/// Replace the class of strings with a given `format`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormatMapping {
    pub format: String,
    pub to: String,
    #[serde(default)]
    pub import: Option<String>,
}

/// Constant substring replacement in generated type names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NameMapping {
    pub constant: String,
    pub replacement: String,
}

/// What happens to references to schemas that are just a plain type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceInlining {
    /// Inline the referenced type into the referencing member.
    #[default]
    Simple,
    /// Keep the schema as a standalone alias type.
    Never,
}

/// Extraction of enum member descriptions from `<prefix><value>: <text>` lines.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnumDescriptionSettings {
    #[serde(default = "default_enum_description_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub fail_on_incomplete: bool,
}

fn default_enum_description_prefix() -> String {
    "* `".to_string()
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".dtogen.yaml";

/// Load settings from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<PojoSettings>, SettingsError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: PojoSettings =
        serde_yaml_ng::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(settings))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# dtogen configuration
input: openapi.yaml
suffix: ""  # e.g. Dto

# Schemas skipped entirely (full-match regular expressions).
excluded_schemas: []
  # - "Legacy.*"

# Replacement classes for scalar types: string, date, date-time, time, uuid,
# email, uri, url, binary, byte, password, integer, long, float, double, boolean.
class_mappings: []
  # - from: uuid
  #   to: CustomUuid
  #   import: com.example.CustomUuid

format_mappings: []
  # - format: iban
  #   to: Iban
  #   import: com.example.Iban

reference_inlining: simple  # simple | never

name_mappings: []
  # - constant: Legacy
  #   replacement: ""

# enum_description:
#   prefix: "* `"
#   fail_on_incomplete: false
"#
}
