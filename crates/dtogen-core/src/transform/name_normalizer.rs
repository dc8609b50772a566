use std::collections::HashSet;

use heck::{ToLowerCamelCase, ToPascalCase};

use crate::model::PojoName;

/// Type identifier form of a schema key: first character upper-cased.
///
/// Keys made only of identifier characters keep the rest of their spelling
/// (`userDTO` → `UserDTO`). Keys containing separators are joined into
/// PascalCase (`pet-store` → `PetStore`).
pub fn to_type_identifier(name: &str) -> String {
    if is_plain_identifier(name) {
        upper_first(name)
    } else {
        sanitize_identifier(name).to_pascal_case()
    }
}

/// Member identifier form of a schema key: first character lower-cased.
///
/// Same separator handling as [`to_type_identifier`] but in camelCase.
pub fn to_member_identifier(name: &str) -> String {
    if is_plain_identifier(name) {
        lower_first(name)
    } else {
        sanitize_identifier(name).to_lower_camel_case()
    }
}

pub fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

/// Sanitize a string to be a valid identifier.
fn sanitize_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_was_separator = false;

    for (i, ch) in name.chars().enumerate() {
        if ch.is_alphanumeric() {
            if i == 0 && ch.is_ascii_digit() {
                result.push('_');
            }
            if prev_was_separator && !result.is_empty() {
                result.push('_');
            }
            result.push(ch);
            prev_was_separator = false;
        } else {
            prev_was_separator = true;
        }
    }

    if result.is_empty() {
        return "unnamed".to_string();
    }

    result
}

/// Pojo names taken in one run, compared case-insensitively.
#[derive(Debug, Default)]
pub struct NameRegistry {
    used_names: HashSet<String>,
}

impl NameRegistry {
    /// Take `name`, or the first free of `name2`, `name3`, ...
    pub fn claim(&mut self, name: PojoName) -> PojoName {
        if self.used_names.insert(name.key()) {
            return name;
        }
        let mut i = 2;
        loop {
            let candidate = PojoName::of_name_and_suffix(
                format!("{}{}", name.name(), i),
                name.suffix(),
            );
            if self.used_names.insert(candidate.key()) {
                return candidate;
            }
            i += 1;
        }
    }
}
