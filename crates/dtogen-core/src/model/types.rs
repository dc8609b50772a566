use std::fmt;

use super::constraints::Constraints;
use super::name::PojoName;

/// Recognized `format` values of string schemas.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StringFormat {
    None,
    Date,
    DateTime,
    Time,
    Uuid,
    Email,
    Uri,
    Url,
    Binary,
    Byte,
    Password,
    Other(String),
}

impl StringFormat {
    pub fn parse(format: Option<&str>) -> Self {
        match format {
            None => StringFormat::None,
            Some("date") => StringFormat::Date,
            Some("date-time") => StringFormat::DateTime,
            Some("time" | "partial-time") => StringFormat::Time,
            Some("uuid") => StringFormat::Uuid,
            Some("email") => StringFormat::Email,
            Some("uri") => StringFormat::Uri,
            Some("url") => StringFormat::Url,
            Some("binary") => StringFormat::Binary,
            Some("byte") => StringFormat::Byte,
            Some("password") => StringFormat::Password,
            Some(other) => StringFormat::Other(other.to_string()),
        }
    }

    /// The `format` keyword this was parsed from, if any.
    pub fn as_format(&self) -> Option<&str> {
        match self {
            StringFormat::None => None,
            StringFormat::Date => Some("date"),
            StringFormat::DateTime => Some("date-time"),
            StringFormat::Time => Some("time"),
            StringFormat::Uuid => Some("uuid"),
            StringFormat::Email => Some("email"),
            StringFormat::Uri => Some("uri"),
            StringFormat::Url => Some("url"),
            StringFormat::Binary => Some("binary"),
            StringFormat::Byte => Some("byte"),
            StringFormat::Password => Some("password"),
            StringFormat::Other(other) => Some(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerFormat {
    Integer,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberFormat {
    Float,
    Double,
}

/// One member of an enum, with an optional description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub value: String,
    pub description: Option<String>,
}

impl EnumMember {
    pub fn of(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: None,
        }
    }
}

/// Ordered, de-duplicated enum members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub members: Vec<EnumMember>,
}

impl EnumType {
    /// Build from raw values, dropping duplicates and keeping source order.
    pub fn of_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut members: Vec<EnumMember> = Vec::new();
        for value in values {
            let value = value.into();
            if !members.iter().any(|m| m.value == value) {
                members.push(EnumMember::of(value));
            }
        }
        Self { members }
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.value.as_str())
    }
}

/// A replacement class for a mapped scalar type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassOverride {
    pub class_name: String,
    pub import: Option<String>,
}

/// The shape of a type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    String(StringFormat),
    Integer(IntegerFormat),
    Number(NumberFormat),
    Boolean,
    Array(Box<Type>),
    Map { key: Box<Type>, value: Box<Type> },
    /// Reference to another pojo by name.
    Object(PojoName),
    Enum(EnumType),
    /// Untyped "any" value.
    FreeForm,
    /// Placeholder for a schema that could not be mapped.
    NoType,
}

/// A resolved type with its constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub kind: TypeKind,
    pub constraints: Constraints,
    pub class_override: Option<ClassOverride>,
}

impl Type {
    pub fn of_kind(kind: TypeKind) -> Self {
        Self {
            kind,
            constraints: Constraints::empty(),
            class_override: None,
        }
    }

    pub fn string() -> Self {
        Self::of_kind(TypeKind::String(StringFormat::None))
    }

    pub fn string_format(format: StringFormat) -> Self {
        Self::of_kind(TypeKind::String(format))
    }

    pub fn integer() -> Self {
        Self::of_kind(TypeKind::Integer(IntegerFormat::Integer))
    }

    pub fn long() -> Self {
        Self::of_kind(TypeKind::Integer(IntegerFormat::Long))
    }

    pub fn float() -> Self {
        Self::of_kind(TypeKind::Number(NumberFormat::Float))
    }

    pub fn double() -> Self {
        Self::of_kind(TypeKind::Number(NumberFormat::Double))
    }

    pub fn boolean() -> Self {
        Self::of_kind(TypeKind::Boolean)
    }

    pub fn array(item: Type) -> Self {
        Self::of_kind(TypeKind::Array(Box::new(item)))
    }

    pub fn map(key: Type, value: Type) -> Self {
        Self::of_kind(TypeKind::Map {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    pub fn object(name: PojoName) -> Self {
        Self::of_kind(TypeKind::Object(name))
    }

    pub fn enumeration(enum_type: EnumType) -> Self {
        Self::of_kind(TypeKind::Enum(enum_type))
    }

    pub fn free_form() -> Self {
        Self::of_kind(TypeKind::FreeForm)
    }

    pub fn no_type() -> Self {
        Self::of_kind(TypeKind::NoType)
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_class_override(mut self, class_override: Option<ClassOverride>) -> Self {
        self.class_override = class_override;
        self
    }

    pub fn is_no_type(&self) -> bool {
        matches!(self.kind, TypeKind::NoType)
    }

    /// The pojo this type directly refers to (not looking into containers).
    pub fn as_object_name(&self) -> Option<&PojoName> {
        match &self.kind {
            TypeKind::Object(name) => Some(name),
            _ => None,
        }
    }

    /// Canonical name used to look up class mappings. `None` for non-scalars.
    pub fn canonical_name(&self) -> Option<&'static str> {
        let name = match &self.kind {
            TypeKind::String(format) => match format {
                StringFormat::Date => "date",
                StringFormat::DateTime => "date-time",
                StringFormat::Time => "time",
                StringFormat::Uuid => "uuid",
                StringFormat::Email => "email",
                StringFormat::Uri => "uri",
                StringFormat::Url => "url",
                StringFormat::Binary => "binary",
                StringFormat::Byte => "byte",
                StringFormat::Password => "password",
                StringFormat::None | StringFormat::Other(_) => "string",
            },
            TypeKind::Integer(IntegerFormat::Integer) => "integer",
            TypeKind::Integer(IntegerFormat::Long) => "long",
            TypeKind::Number(NumberFormat::Float) => "float",
            TypeKind::Number(NumberFormat::Double) => "double",
            TypeKind::Boolean => "boolean",
            _ => return None,
        };
        Some(name)
    }

    /// All pojo names referenced anywhere inside this type.
    pub fn referenced_names(&self) -> Vec<&PojoName> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a PojoName>) {
        match &self.kind {
            TypeKind::Object(name) => names.push(name),
            TypeKind::Array(item) => item.collect_names(names),
            TypeKind::Map { key, value } => {
                key.collect_names(names);
                value.collect_names(names);
            }
            _ => {}
        }
    }

    /// Rewrite every object reference through `rename`, keeping names it
    /// returns `None` for.
    pub fn map_names(&self, rename: &dyn Fn(&PojoName) -> Option<PojoName>) -> Self {
        let kind = match &self.kind {
            TypeKind::Object(name) => {
                TypeKind::Object(rename(name).unwrap_or_else(|| name.clone()))
            }
            TypeKind::Array(item) => TypeKind::Array(Box::new(item.map_names(rename))),
            TypeKind::Map { key, value } => TypeKind::Map {
                key: Box::new(key.map_names(rename)),
                value: Box::new(value.map_names(rename)),
            },
            other => other.clone(),
        };
        Self {
            kind,
            constraints: self.constraints.clone(),
            class_override: self.class_override.clone(),
        }
    }

    /// Replace references to `name` with `replacement`, also inside containers.
    ///
    /// The replaced type keeps the replacement's constraints; container
    /// constraints are untouched.
    pub fn inline_object_reference(&self, name: &PojoName, replacement: &Type) -> Self {
        match &self.kind {
            TypeKind::Object(n) if n.equals_ignore_case(name) => replacement.clone(),
            TypeKind::Array(item) => Self {
                kind: TypeKind::Array(Box::new(item.inline_object_reference(name, replacement))),
                ..self.clone()
            },
            TypeKind::Map { key, value } => Self {
                kind: TypeKind::Map {
                    key: Box::new(key.inline_object_reference(name, replacement)),
                    value: Box::new(value.inline_object_reference(name, replacement)),
                },
                ..self.clone()
            },
            _ => self.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref o) = self.class_override {
            return f.write_str(&o.class_name);
        }
        match &self.kind {
            TypeKind::String(format) => match format {
                StringFormat::None => f.write_str("String"),
                StringFormat::Date => f.write_str("Date"),
                StringFormat::DateTime => f.write_str("DateTime"),
                StringFormat::Time => f.write_str("Time"),
                StringFormat::Uuid => f.write_str("Uuid"),
                StringFormat::Email => f.write_str("Email"),
                StringFormat::Uri => f.write_str("Uri"),
                StringFormat::Url => f.write_str("Url"),
                StringFormat::Binary => f.write_str("Binary"),
                StringFormat::Byte => f.write_str("Byte"),
                StringFormat::Password => f.write_str("Password"),
                StringFormat::Other(other) => write!(f, "String({other})"),
            },
            TypeKind::Integer(IntegerFormat::Integer) => f.write_str("Integer"),
            TypeKind::Integer(IntegerFormat::Long) => f.write_str("Long"),
            TypeKind::Number(NumberFormat::Float) => f.write_str("Float"),
            TypeKind::Number(NumberFormat::Double) => f.write_str("Double"),
            TypeKind::Boolean => f.write_str("Boolean"),
            TypeKind::Array(item) => write!(f, "List<{item}>"),
            TypeKind::Map { key, value } => write!(f, "Map<{key}, {value}>"),
            TypeKind::Object(name) => write!(f, "{name}"),
            TypeKind::Enum(e) => {
                let values: Vec<&str> = e.values().collect();
                write!(f, "Enum[{}]", values.join(", "))
            }
            TypeKind::FreeForm => f.write_str("Any"),
            TypeKind::NoType => f.write_str("NoType"),
        }
    }
}
