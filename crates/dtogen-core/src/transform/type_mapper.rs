use log::debug;
use serde_json::Number;

use crate::config::PojoSettings;
use crate::error::Warning;
use crate::model::{Constraints, DecimalBound, EnumType, Name, PojoName, StringFormat, Type};
use crate::parse::schema::{
    AdditionalProperties, ExclusiveBound, Schema, SchemaOrRef, SchemaType, ref_name,
};

use super::name_normalizer::NameRegistry;

/// A named schema waiting to be classified.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSchema<'a> {
    pub name: PojoName,
    pub schema: &'a SchemaOrRef,
}

/// The type of one schema node plus the inline schemas found while mapping it.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedType<'a> {
    pub ty: Type,
    pub discovered: Vec<PendingSchema<'a>>,
    pub warnings: Vec<Warning>,
}

impl<'a> MappedType<'a> {
    pub fn of(ty: Type) -> Self {
        Self {
            ty,
            discovered: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn map_type(self, f: impl FnOnce(Type) -> Type) -> Self {
        Self {
            ty: f(self.ty),
            ..self
        }
    }
}

/// Where a schema node sits: the pojo being classified and the member it
/// belongs to. Inline objects found here are named `pojo_name + member_name`.
pub struct MapContext<'c> {
    pub pojo_name: &'c PojoName,
    pub member_name: &'c Name,
    pub settings: &'c PojoSettings,
    pub chain: &'c TypeMapperChain,
    pub names: &'c mut NameRegistry,
}

impl MapContext<'_> {
    fn inline_name(&mut self) -> PojoName {
        self.names.claim(self.pojo_name.derive_member_name(self.member_name))
    }

    fn pojo_name_of_ref(&self, ref_path: &str) -> PojoName {
        PojoName::of_name_and_suffix(
            ref_name(ref_path),
            self.settings.suffix.clone(),
        )
    }
}

/// One link of the chain: maps the schema shapes it recognizes and declines
/// everything else.
pub trait TypeMapper {
    fn map<'a>(&self, ctx: &mut MapContext<'_>, schema: &'a SchemaOrRef) -> Option<MappedType<'a>>;
}

/// Ordered type mappers, built once per run.
pub struct TypeMapperChain {
    mappers: Vec<Box<dyn TypeMapper>>,
}

impl TypeMapperChain {
    pub fn new(mappers: Vec<Box<dyn TypeMapper>>) -> Self {
        Self { mappers }
    }

    /// The default chain, most specific shapes first.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(ReferenceMapper),
            Box::new(SingleReferenceCompositionMapper),
            Box::new(InlineObjectMapper),
            Box::new(EnumMapper),
            Box::new(StringFormatMapper::new(StringFormat::Date)),
            Box::new(StringFormatMapper::new(StringFormat::DateTime)),
            Box::new(StringFormatMapper::new(StringFormat::Uuid)),
            Box::new(StringFormatMapper::new(StringFormat::Email)),
            Box::new(StringFormatMapper::new(StringFormat::Binary)),
            Box::new(StringMapper),
            Box::new(BooleanMapper),
            Box::new(IntegerMapper),
            Box::new(NumberMapper),
            Box::new(ArrayMapper),
            Box::new(MapMapper),
            Box::new(FreeFormMapper),
        ])
    }

    /// Map a schema node, degrading to `NoType` when no mapper recognizes it.
    pub fn map_schema<'a>(
        &self,
        pojo_name: &PojoName,
        member_name: &Name,
        schema: &'a SchemaOrRef,
        settings: &PojoSettings,
        names: &mut NameRegistry,
    ) -> MappedType<'a> {
        let mut ctx = MapContext {
            pojo_name,
            member_name,
            settings,
            chain: self,
            names,
        };
        let mapped = self
            .mappers
            .iter()
            .find_map(|mapper| mapper.map(&mut ctx, schema));
        match mapped {
            Some(mapped) if mapped.ty.class_override.is_none() => {
                let class_override = settings.class_override_for(&mapped.ty);
                mapped.map_type(|t| t.with_class_override(class_override))
            }
            Some(mapped) => mapped,
            None => {
                debug!("no type mapper for {pojo_name}.{member_name}");
                MappedType {
                    ty: Type::no_type(),
                    discovered: Vec::new(),
                    warnings: vec![Warning::UnrecognizedSchemaShape {
                        pojo: pojo_name.to_string(),
                        member: member_name.to_string(),
                    }],
                }
            }
        }
    }
}

fn inline(schema: &SchemaOrRef) -> Option<&Schema> {
    match schema {
        SchemaOrRef::Schema(s) => Some(s),
        SchemaOrRef::Ref { .. } => None,
    }
}

/// The single `$ref` of `allOf: [$ref]` (or oneOf/anyOf), the usual way to make
/// a reference nullable or describe it. `{type: 'null'}` entries are ignored,
/// so the 3.1 form `oneOf: [$ref, {type: 'null'}]` qualifies too.
pub fn single_composed_reference(schema: &Schema) -> Option<&str> {
    if !schema.properties.is_empty() {
        return None;
    }
    let mut composed = schema
        .all_of
        .iter()
        .chain(&schema.one_of)
        .chain(&schema.any_of)
        .filter(|s| !s.is_null_type());
    match (composed.next(), composed.next()) {
        (Some(SchemaOrRef::Ref { ref_path }), None) => Some(ref_path.as_str()),
        _ => None,
    }
}

/// An object without properties whose `additionalProperties` is a schema.
fn map_value_schema(schema: &Schema) -> Option<&SchemaOrRef> {
    let object_like = schema.single_type().is_none_or(|t| t == SchemaType::Object);
    match &schema.additional_properties {
        Some(AdditionalProperties::Schema(value))
            if object_like && schema.properties.is_empty() && !is_empty_schema(value) =>
        {
            Some(value.as_ref())
        }
        _ => None,
    }
}

/// `{}`: a schema without any keyword that constrains the value.
pub fn is_empty_schema(schema: &SchemaOrRef) -> bool {
    match schema {
        SchemaOrRef::Ref { .. } => false,
        SchemaOrRef::Schema(s) => {
            let stripped = Schema {
                title: None,
                description: None,
                nullable: None,
                ..(**s).clone()
            };
            stripped == Schema::default()
        }
    }
}

/// Enum values when every non-null entry is a string. A `null` entry only
/// makes the schema nullable.
pub fn string_enum_values(schema: &Schema) -> Option<Vec<&str>> {
    let values: Option<Vec<&str>> = schema
        .enum_values
        .iter()
        .filter(|v| !v.is_null())
        .map(serde_json::Value::as_str)
        .collect();
    values.filter(|v| !v.is_empty())
}

struct ReferenceMapper;

impl TypeMapper for ReferenceMapper {
    fn map<'a>(&self, ctx: &mut MapContext<'_>, schema: &'a SchemaOrRef) -> Option<MappedType<'a>> {
        match schema {
            SchemaOrRef::Ref { ref_path } => {
                Some(MappedType::of(Type::object(ctx.pojo_name_of_ref(ref_path))))
            }
            SchemaOrRef::Schema(_) => None,
        }
    }
}

struct SingleReferenceCompositionMapper;

impl TypeMapper for SingleReferenceCompositionMapper {
    fn map<'a>(&self, ctx: &mut MapContext<'_>, schema: &'a SchemaOrRef) -> Option<MappedType<'a>> {
        let ref_path = single_composed_reference(inline(schema)?)?;
        Some(MappedType::of(Type::object(ctx.pojo_name_of_ref(ref_path))))
    }
}

/// Inline objects and compositions become schemas of their own.
struct InlineObjectMapper;

impl TypeMapper for InlineObjectMapper {
    fn map<'a>(&self, ctx: &mut MapContext<'_>, schema: &'a SchemaOrRef) -> Option<MappedType<'a>> {
        let s = inline(schema)?;
        if s.properties.is_empty() && !s.has_composition() {
            return None;
        }
        let name = ctx.inline_name();
        Some(MappedType {
            ty: Type::object(name.clone()),
            discovered: vec![PendingSchema { name, schema }],
            warnings: Vec::new(),
        })
    }
}

/// Inline string enums stay inline.
struct EnumMapper;

impl TypeMapper for EnumMapper {
    fn map<'a>(&self, _ctx: &mut MapContext<'_>, schema: &'a SchemaOrRef) -> Option<MappedType<'a>> {
        let s = inline(schema)?;
        if s.enum_values.is_empty() || s.single_type().is_some_and(|t| t != SchemaType::String) {
            return None;
        }
        let values = string_enum_values(s)?;
        Some(MappedType::of(Type::enumeration(EnumType::of_values(values))))
    }
}

fn string_constraints(schema: &Schema) -> Constraints {
    let mut constraints = Constraints::empty().with_size(schema.min_length, schema.max_length);
    if let Some(pattern) = &schema.pattern {
        constraints = constraints.with_pattern(pattern.clone());
    }
    constraints
}

/// Strings of one specific `format`.
struct StringFormatMapper {
    format: StringFormat,
}

impl StringFormatMapper {
    fn new(format: StringFormat) -> Self {
        Self { format }
    }
}

impl TypeMapper for StringFormatMapper {
    fn map<'a>(&self, _ctx: &mut MapContext<'_>, schema: &'a SchemaOrRef) -> Option<MappedType<'a>> {
        let s = inline(schema)?;
        if !s.is_type(SchemaType::String) || s.format.as_deref() != self.format.as_format() {
            return None;
        }
        let mut constraints = string_constraints(s);
        if self.format == StringFormat::Email {
            constraints = constraints.with_email();
        }
        Some(MappedType::of(
            Type::string_format(self.format.clone()).with_constraints(constraints),
        ))
    }
}

struct StringMapper;

impl TypeMapper for StringMapper {
    fn map<'a>(&self, _ctx: &mut MapContext<'_>, schema: &'a SchemaOrRef) -> Option<MappedType<'a>> {
        let s = inline(schema)?;
        if !s.is_type(SchemaType::String) {
            return None;
        }
        let format = StringFormat::parse(s.format.as_deref());
        Some(MappedType::of(
            Type::string_format(format).with_constraints(string_constraints(s)),
        ))
    }
}

struct BooleanMapper;

impl TypeMapper for BooleanMapper {
    fn map<'a>(&self, _ctx: &mut MapContext<'_>, schema: &'a SchemaOrRef) -> Option<MappedType<'a>> {
        inline(schema)?
            .is_type(SchemaType::Boolean)
            .then(|| MappedType::of(Type::boolean()))
    }
}

enum Bound {
    Lower,
    Upper,
}

/// Bound constraints as written: integral bounds stay integers, everything
/// else (fractions, exclusive bounds) becomes a decimal bound.
fn bound_constraints(
    mut constraints: Constraints,
    value: Option<&Number>,
    exclusive: Option<&ExclusiveBound>,
    bound: Bound,
    integral: bool,
) -> Constraints {
    let decimal = match (value, exclusive) {
        (_, Some(ExclusiveBound::Value(n))) => Some(DecimalBound::exclusive(n.to_string())),
        (Some(n), Some(ExclusiveBound::Flag(true))) => Some(DecimalBound::exclusive(n.to_string())),
        (Some(n), _) => match n.as_i64() {
            Some(i) if integral => {
                return match bound {
                    Bound::Lower => constraints.with_min(i),
                    Bound::Upper => constraints.with_max(i),
                };
            }
            _ => Some(DecimalBound::inclusive(n.to_string())),
        },
        (None, _) => None,
    };
    if let Some(decimal) = decimal {
        constraints = match bound {
            Bound::Lower => constraints.with_decimal_min(decimal),
            Bound::Upper => constraints.with_decimal_max(decimal),
        };
    }
    constraints
}

fn numeric_constraints(schema: &Schema, integral: bool) -> Constraints {
    let mut constraints = bound_constraints(
        Constraints::empty(),
        schema.minimum.as_ref(),
        schema.exclusive_minimum.as_ref(),
        Bound::Lower,
        integral,
    );
    constraints = bound_constraints(
        constraints,
        schema.maximum.as_ref(),
        schema.exclusive_maximum.as_ref(),
        Bound::Upper,
        integral,
    );
    if let Some(multiple_of) = &schema.multiple_of {
        constraints = constraints.with_multiple_of(multiple_of.to_string());
    }
    constraints
}

struct IntegerMapper;

impl TypeMapper for IntegerMapper {
    fn map<'a>(&self, _ctx: &mut MapContext<'_>, schema: &'a SchemaOrRef) -> Option<MappedType<'a>> {
        let s = inline(schema)?;
        if !s.is_type(SchemaType::Integer) {
            return None;
        }
        let ty = match s.format.as_deref() {
            Some("int64") => Type::long(),
            _ => Type::integer(),
        };
        Some(MappedType::of(ty.with_constraints(numeric_constraints(s, true))))
    }
}

struct NumberMapper;

impl TypeMapper for NumberMapper {
    fn map<'a>(&self, _ctx: &mut MapContext<'_>, schema: &'a SchemaOrRef) -> Option<MappedType<'a>> {
        let s = inline(schema)?;
        if !s.is_type(SchemaType::Number) {
            return None;
        }
        let ty = match s.format.as_deref() {
            Some("float") => Type::float(),
            _ => Type::double(),
        };
        Some(MappedType::of(ty.with_constraints(numeric_constraints(s, false))))
    }
}

/// Arrays recurse into their item schema with the same member name.
struct ArrayMapper;

impl TypeMapper for ArrayMapper {
    fn map<'a>(&self, ctx: &mut MapContext<'_>, schema: &'a SchemaOrRef) -> Option<MappedType<'a>> {
        let s = inline(schema)?;
        let is_array = s.is_type(SchemaType::Array) || (s.schema_type.is_none() && s.items.is_some());
        if !is_array {
            return None;
        }
        let constraints = Constraints::empty().with_size(s.min_items, s.max_items);
        let mapped = match &s.items {
            Some(items) => ctx.chain.map_schema(
                ctx.pojo_name,
                ctx.member_name,
                items,
                ctx.settings,
                ctx.names,
            ),
            None => MappedType::of(Type::free_form()),
        };
        Some(mapped.map_type(|item| Type::array(item).with_constraints(constraints)))
    }
}

/// Objects without properties but with a typed `additionalProperties`.
struct MapMapper;

impl TypeMapper for MapMapper {
    fn map<'a>(&self, ctx: &mut MapContext<'_>, schema: &'a SchemaOrRef) -> Option<MappedType<'a>> {
        let s = inline(schema)?;
        let value_schema = map_value_schema(s)?;
        let constraints = Constraints::empty().with_property_count(s.min_properties, s.max_properties);
        let mapped = ctx
            .chain
            .map_schema(ctx.pojo_name, ctx.member_name, value_schema, ctx.settings, ctx.names);
        Some(mapped.map_type(|value| Type::map(Type::string(), value).with_constraints(constraints)))
    }
}

/// `type: object` without properties, or the empty schema `{}`.
struct FreeFormMapper;

impl TypeMapper for FreeFormMapper {
    fn map<'a>(&self, _ctx: &mut MapContext<'_>, schema: &'a SchemaOrRef) -> Option<MappedType<'a>> {
        let s = inline(schema)?;
        let object_without_properties = s.is_type(SchemaType::Object) && s.properties.is_empty();
        (object_without_properties || is_empty_schema(schema)).then(|| {
            let constraints =
                Constraints::empty().with_property_count(s.min_properties, s.max_properties);
            MappedType::of(Type::free_form().with_constraints(constraints))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClassMapping, FormatMapping};
    use crate::model::TypeKind;

    fn schema(yaml: &str) -> SchemaOrRef {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    fn map_with<'a>(settings: &PojoSettings, yaml: &'a SchemaOrRef) -> MappedType<'a> {
        let chain = TypeMapperChain::standard();
        let pojo = PojoName::of_name_and_suffix("User", &settings.suffix);
        chain.map_schema(&pojo, &Name::of("field"), yaml, settings, &mut NameRegistry::default())
    }

    fn map(yaml: &SchemaOrRef) -> MappedType<'_> {
        map_with(&PojoSettings::default(), yaml)
    }

    #[test]
    fn test_reference() {
        let s = schema("$ref: '#/components/schemas/Address'");
        let settings = PojoSettings {
            suffix: "Dto".to_string(),
            ..PojoSettings::default()
        };
        let mapped = map_with(&settings, &s);
        insta::assert_snapshot!(mapped.ty.to_string(), @"AddressDto");
        assert!(mapped.discovered.is_empty());
    }

    #[test]
    fn test_single_ref_all_of() {
        let s = schema("nullable: true\nallOf:\n  - $ref: '#/components/schemas/Address'");
        assert_eq!(map(&s).ty.to_string(), "Address");
    }

    #[test]
    fn test_nullable_one_of_reference() {
        let s = schema("oneOf:\n  - $ref: '#/components/schemas/Owner'\n  - type: 'null'");
        let mapped = map(&s);
        assert_eq!(mapped.ty.to_string(), "Owner");
        assert!(mapped.discovered.is_empty());
    }

    #[test]
    fn test_string_formats() {
        assert_eq!(map(&schema("type: string\nformat: date")).ty.to_string(), "Date");
        assert_eq!(map(&schema("type: string\nformat: date-time")).ty.to_string(), "DateTime");
        assert_eq!(map(&schema("type: string\nformat: uuid")).ty.to_string(), "Uuid");
        assert_eq!(map(&schema("type: string\nformat: binary")).ty.to_string(), "Binary");
        assert_eq!(map(&schema("type: string\nformat: ipv4")).ty.to_string(), "String(ipv4)");
    }

    #[test]
    fn test_email_adds_constraint() {
        let s = schema("type: string\nformat: email\nmaxLength: 64");
        let mapped = map(&s);
        assert!(mapped.ty.constraints.email);
        assert_eq!(mapped.ty.constraints.size.as_ref().unwrap().max, Some(64));
    }

    #[test]
    fn test_string_constraints() {
        let s = schema("type: string\nminLength: 2\npattern: '^[a-z]+$'");
        let mapped = map(&s);
        insta::assert_snapshot!(mapped.ty.constraints.labels().join(" "), @"size=2.. pattern=^[a-z]+$");
    }

    #[test]
    fn test_integer_bounds() {
        let s = schema("type: integer\nformat: int64\nminimum: 1\nmaximum: 100");
        let mapped = map(&s);
        assert_eq!(mapped.ty.to_string(), "Long");
        assert_eq!(mapped.ty.constraints.min, Some(1));
        assert_eq!(mapped.ty.constraints.max, Some(100));
    }

    #[test]
    fn test_integer_exclusive_bounds_become_decimal() {
        let v30_schema = schema("type: integer\nminimum: 0\nexclusiveMinimum: true");
        let v30 = map(&v30_schema);
        assert_eq!(v30.ty.constraints.min, None);
        assert_eq!(v30.ty.constraints.decimal_min, Some(DecimalBound::exclusive("0")));

        let v31_schema = schema("type: integer\nexclusiveMaximum: 10");
        let v31 = map(&v31_schema);
        assert_eq!(v31.ty.constraints.decimal_max, Some(DecimalBound::exclusive("10")));
    }

    #[test]
    fn test_number_bounds_are_decimal() {
        let s = schema("type: number\nformat: float\nminimum: 0.5\nmaximum: 10\nmultipleOf: 0.5");
        let mapped = map(&s);
        assert_eq!(mapped.ty.to_string(), "Float");
        assert_eq!(mapped.ty.constraints.decimal_min, Some(DecimalBound::inclusive("0.5")));
        assert_eq!(mapped.ty.constraints.decimal_max, Some(DecimalBound::inclusive("10")));
        assert_eq!(mapped.ty.constraints.multiple_of.as_deref(), Some("0.5"));
    }

    #[test]
    fn test_array_of_inline_object_is_discovered() {
        let s = schema(
            "type: array\nminItems: 1\nitems:\n  type: object\n  properties:\n    street:\n      type: string",
        );
        let mapped = map(&s);
        assert_eq!(mapped.ty.to_string(), "List<UserField>");
        assert_eq!(mapped.ty.constraints.size.as_ref().unwrap().min, Some(1));
        assert_eq!(mapped.discovered.len(), 1);
        assert_eq!(mapped.discovered[0].name.to_string(), "UserField");
    }

    #[test]
    fn test_map_of_refs() {
        let s = schema("type: object\nadditionalProperties:\n  $ref: '#/components/schemas/Tag'");
        assert_eq!(map(&s).ty.to_string(), "Map<String, Tag>");
    }

    #[test]
    fn test_free_form() {
        assert_eq!(map(&schema("type: object")).ty.kind, TypeKind::FreeForm);
        assert_eq!(map(&schema("type: object\nadditionalProperties: true")).ty.kind, TypeKind::FreeForm);
        assert_eq!(map(&schema("description: anything")).ty.kind, TypeKind::FreeForm);
    }

    #[test]
    fn test_inline_enum() {
        let s = schema("type: string\nenum: [red, green, red]");
        let mapped = map(&s);
        insta::assert_snapshot!(mapped.ty.to_string(), @"Enum[red, green]");
    }

    #[test]
    fn test_inline_enum_ignores_null_entry() {
        let s = schema("type: string\nnullable: true\nenum: [red, null]");
        let mapped = map(&s);
        assert_eq!(mapped.ty.to_string(), "Enum[red]");
    }

    #[test]
    fn test_integer_enum_falls_through() {
        let s = schema("type: integer\nenum: [1, 2]");
        let mapped = map(&s);
        assert_eq!(mapped.ty.to_string(), "Integer");
    }

    #[test]
    fn test_unrecognized_is_no_type_with_warning() {
        let s = schema("type: [string, integer]");
        let mapped = map(&s);
        assert!(mapped.ty.is_no_type());
        assert_eq!(
            mapped.warnings,
            vec![Warning::UnrecognizedSchemaShape {
                pojo: "User".to_string(),
                member: "field".to_string(),
            }]
        );
    }

    #[test]
    fn test_class_and_format_overrides() {
        let settings = PojoSettings {
            class_mappings: vec![ClassMapping {
                from: "uuid".to_string(),
                to: "CustomUuid".to_string(),
                import: None,
            }],
            format_mappings: vec![FormatMapping {
                format: "iban".to_string(),
                to: "Iban".to_string(),
                import: None,
            }],
            ..PojoSettings::default()
        };
        let uuid = schema("type: string\nformat: uuid");
        assert_eq!(map_with(&settings, &uuid).ty.to_string(), "CustomUuid");

        let list = schema("type: array\nitems:\n  type: string\n  format: iban");
        assert_eq!(map_with(&settings, &list).ty.to_string(), "List<Iban>");
    }
}
