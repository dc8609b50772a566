use log::debug;

use crate::config::{EnumDescriptionSettings, PojoSettings};
use crate::error::{ResolveError, TransformError, Warning};
use crate::model::discriminator::UntypedDiscriminator;
use crate::model::unresolved::{UnresolvedComposition, UnresolvedObjectPojo};
use crate::model::{
    AdditionalProperties, ArrayPojo, CompositionKind, Constraints, EnumMember, EnumPojo, EnumType,
    FreeFormPojo, Name, Necessity, Nullability, ObjectPojo, Pojo, PojoMember, PojoName, Type,
};
use crate::parse::schema::{self, Schema, SchemaOrRef, SchemaType};

use super::name_normalizer::NameRegistry;
use super::type_mapper::{
    PendingSchema, TypeMapperChain, is_empty_schema, single_composed_reference, string_enum_values,
};

/// A schema that is just a type, with no pojo of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct PlainMember {
    pub name: PojoName,
    pub description: Option<String>,
    pub member_type: Type,
    pub nullability: Nullability,
}

/// What a named schema turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    Pojo(Pojo),
    Unresolved(UnresolvedObjectPojo),
    Member(PlainMember),
}

impl Classified {
    pub fn name(&self) -> &PojoName {
        match self {
            Classified::Pojo(p) => p.name(),
            Classified::Unresolved(p) => &p.name,
            Classified::Member(m) => &m.name,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Classified::Pojo(p) => p.kind(),
            Classified::Unresolved(_) => "composed stub",
            Classified::Member(_) => "plain member",
        }
    }
}

/// The classification of one schema plus the inline schemas it discovered.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification<'a> {
    pub classified: Classified,
    pub discovered: Vec<PendingSchema<'a>>,
    pub warnings: Vec<Warning>,
}

const ADDITIONAL_PROPERTIES_MEMBER: &str = "additionalProperties";

/// Classify a named schema. Rules apply in order: array, composition,
/// object, enum, free-form, plain member.
///
/// Inline schemas are named against `names`, so a discovered name never
/// collides with a declared or previously discovered one.
pub fn classify<'a>(
    pending: &PendingSchema<'a>,
    settings: &PojoSettings,
    chain: &TypeMapperChain,
    names: &mut NameRegistry,
) -> Result<Classification<'a>, TransformError> {
    let mut classifier = Classifier {
        name: &pending.name,
        settings,
        chain,
        names,
        discovered: Vec::new(),
        warnings: Vec::new(),
    };
    let classified = match pending.schema {
        SchemaOrRef::Ref { .. } => classifier.plain_member(pending.schema, None, false),
        SchemaOrRef::Schema(s) => classifier.classify_schema(pending.schema, s)?,
    };
    debug!("classified {} as {}", pending.name, classified.kind());
    Ok(Classification {
        classified,
        discovered: classifier.discovered,
        warnings: classifier.warnings,
    })
}

struct Classifier<'s, 'a> {
    name: &'s PojoName,
    settings: &'s PojoSettings,
    chain: &'s TypeMapperChain,
    names: &'s mut NameRegistry,
    discovered: Vec<PendingSchema<'a>>,
    warnings: Vec<Warning>,
}

impl<'a> Classifier<'_, 'a> {
    fn classify_schema(
        &mut self,
        schema_or_ref: &'a SchemaOrRef,
        s: &'a Schema,
    ) -> Result<Classified, TransformError> {
        let description = s.description.clone();

        if s.is_type(SchemaType::Array) || (s.schema_type.is_none() && s.items.is_some()) {
            let array_type = self.map_type(&Name::of(ArrayPojo::VALUE_MEMBER), schema_or_ref);
            return Ok(Classified::Pojo(Pojo::Array(ArrayPojo::of(
                self.name.clone(),
                description,
                array_type,
                Nullability::from_nullable(s.is_nullable()),
            ))));
        }

        if s.has_null_branch() && single_composed_reference(s).is_some() {
            return Ok(self.plain_member(schema_or_ref, description, true));
        }

        if s.has_composition() {
            return Ok(Classified::Unresolved(self.unresolved_object(s)));
        }

        if is_object_shape(s) {
            let pojo = ObjectPojo::builder()
                .name(self.name.clone())
                .description(description)
                .members(self.members(s))
                .required_additional_properties(required_additional_properties(s))
                .additional_properties(self.additional_properties(s))
                .constraints(object_constraints(s))
                .build()?;
            return Ok(Classified::Pojo(Pojo::Object(pojo)));
        }

        if !s.enum_values.is_empty() {
            if let Some(values) = string_enum_values(s)
                && s.single_type().is_none_or(|t| t == SchemaType::String)
            {
                return Ok(Classified::Pojo(self.enum_pojo(s, &values)?));
            }
            self.warnings.push(Warning::NonStringEnumValues {
                pojo: self.name.to_string(),
            });
        }

        if s.is_type(SchemaType::Object) || is_empty_schema(schema_or_ref) {
            return Ok(Classified::Pojo(Pojo::FreeForm(FreeFormPojo {
                name: self.name.clone(),
                description,
                constraints: object_constraints(s),
            })));
        }

        Ok(self.plain_member(schema_or_ref, description, s.is_nullable()))
    }

    fn plain_member(
        &mut self,
        schema: &'a SchemaOrRef,
        description: Option<String>,
        nullable: bool,
    ) -> Classified {
        let member_type = self.map_type(&Name::of(ArrayPojo::VALUE_MEMBER), schema);
        Classified::Member(PlainMember {
            name: self.name.clone(),
            description,
            member_type,
            nullability: Nullability::from_nullable(nullable),
        })
    }

    fn map_type(&mut self, member_name: &Name, schema: &'a SchemaOrRef) -> Type {
        let mapped = self
            .chain
            .map_schema(self.name, member_name, schema, self.settings, self.names);
        self.discovered.extend(mapped.discovered);
        self.warnings.extend(mapped.warnings);
        mapped.ty
    }

    fn members(&mut self, s: &'a Schema) -> Vec<PojoMember> {
        s.properties
            .iter()
            .map(|(key, property)| {
                let name = Name::of(key.as_str());
                let member_type = self.map_type(&name, property);
                let (description, nullable) = match property {
                    SchemaOrRef::Schema(p) => (p.description.clone(), p.is_nullable()),
                    SchemaOrRef::Ref { .. } => (None, false),
                };
                PojoMember::new(
                    name,
                    member_type,
                    Necessity::from_required(s.required.contains(key)),
                    Nullability::from_nullable(nullable),
                )
                .with_description(description)
            })
            .collect()
    }

    fn additional_properties(&mut self, s: &'a Schema) -> AdditionalProperties {
        match &s.additional_properties {
            None | Some(schema::AdditionalProperties::Bool(false)) => {
                AdditionalProperties::NotAllowed
            }
            Some(schema::AdditionalProperties::Bool(true)) => {
                AdditionalProperties::Allowed(Type::free_form())
            }
            Some(schema::AdditionalProperties::Schema(value)) if is_empty_schema(value) => {
                AdditionalProperties::Allowed(Type::free_form())
            }
            Some(schema::AdditionalProperties::Schema(value)) => {
                let value_type = self.map_type(&Name::of(ADDITIONAL_PROPERTIES_MEMBER), value);
                AdditionalProperties::allowed_for(value_type)
            }
        }
    }

    fn unresolved_object(&mut self, s: &'a Schema) -> UnresolvedObjectPojo {
        let all_of = self.composition(CompositionKind::AllOf, &s.all_of, None);
        let discriminator = s.discriminator.as_ref().map(|d| self.untyped_discriminator(d));
        let (one_of_discriminator, any_of_discriminator) = if s.one_of.is_empty() {
            (None, discriminator)
        } else {
            (discriminator, None)
        };
        let one_of = self.composition(CompositionKind::OneOf, &s.one_of, one_of_discriminator);
        let any_of = self.composition(CompositionKind::AnyOf, &s.any_of, any_of_discriminator);

        UnresolvedObjectPojo {
            name: self.name.clone(),
            description: s.description.clone(),
            members: self.members(s),
            required_additional_properties: required_additional_properties(s),
            additional_properties: self.additional_properties(s),
            constraints: object_constraints(s),
            all_of,
            one_of,
            any_of,
        }
    }

    /// Branch names of one composition list. Inline branches are named
    /// `Parent + Kind`, with an index when the list has several inline ones.
    /// `{type: 'null'}` entries only make the schema nullable and are skipped.
    fn composition(
        &mut self,
        kind: CompositionKind,
        schemas: &'a [SchemaOrRef],
        discriminator: Option<UntypedDiscriminator>,
    ) -> Option<UnresolvedComposition> {
        let branches: Vec<&'a SchemaOrRef> =
            schemas.iter().filter(|s| !s.is_null_type()).collect();
        if branches.is_empty() {
            return None;
        }
        let inline_count = branches
            .iter()
            .filter(|s| matches!(s, SchemaOrRef::Schema(_)))
            .count();
        let mut inline_index = 0;
        let pojo_names = branches
            .into_iter()
            .map(|schema| match schema {
                SchemaOrRef::Ref { ref_path } => self.referenced_name(ref_path),
                SchemaOrRef::Schema(_) => {
                    let tag = if inline_count > 1 {
                        format!("{}{inline_index}", kind.as_pascal_case())
                    } else {
                        kind.as_pascal_case().to_string()
                    };
                    inline_index += 1;
                    let name = self.names.claim(self.name.append_to_name(&tag));
                    self.discovered.push(PendingSchema {
                        name: name.clone(),
                        schema,
                    });
                    name
                }
            })
            .collect();
        Some(UnresolvedComposition {
            kind,
            pojo_names,
            discriminator,
        })
    }

    fn untyped_discriminator(&self, d: &schema::Discriminator) -> UntypedDiscriminator {
        UntypedDiscriminator {
            property_name: Name::of(d.property_name.as_str()),
            mapping: (!d.mapping.is_empty()).then(|| {
                d.mapping
                    .iter()
                    .map(|(value, target)| (value.clone(), self.referenced_name(target)))
                    .collect()
            }),
        }
    }

    fn referenced_name(&self, ref_path: &str) -> PojoName {
        PojoName::of_name_and_suffix(schema::ref_name(ref_path), self.settings.suffix.clone())
    }

    fn enum_pojo(&mut self, s: &Schema, values: &[&str]) -> Result<Pojo, ResolveError> {
        let mut members = EnumType::of_values(values.iter().copied()).members;
        if let Some(settings) = &self.settings.enum_description
            && let Some(description) = &s.description
        {
            let missing = attach_enum_descriptions(&mut members, description, settings);
            if !missing.is_empty() {
                if settings.fail_on_incomplete {
                    return Err(ResolveError::IncompleteEnumDescription {
                        pojo: self.name.to_string(),
                        missing,
                    });
                }
                self.warnings.push(Warning::IncompleteEnumDescription {
                    pojo: self.name.to_string(),
                    missing,
                });
            }
        }
        Ok(Pojo::Enum(EnumPojo {
            name: self.name.clone(),
            description: s.description.clone(),
            members,
        }))
    }
}

/// Objects: declared properties, a typed or forbidden `additionalProperties`,
/// or required names without declared properties.
fn is_object_shape(s: &Schema) -> bool {
    let typed_additional = match &s.additional_properties {
        Some(schema::AdditionalProperties::Schema(value)) => !is_empty_schema(value),
        Some(schema::AdditionalProperties::Bool(allowed)) => !allowed,
        None => false,
    };
    let object_like = s.single_type().is_none_or(|t| t == SchemaType::Object);
    !s.properties.is_empty() || (object_like && (typed_additional || !s.required.is_empty()))
}

fn required_additional_properties(s: &Schema) -> Vec<Name> {
    s.required
        .iter()
        .filter(|r| !s.properties.contains_key(*r))
        .map(|r| Name::of(r.as_str()))
        .collect()
}

fn object_constraints(s: &Schema) -> Constraints {
    Constraints::empty().with_property_count(s.min_properties, s.max_properties)
}

/// Attach descriptions from `<prefix><value>: <text>` lines and return the
/// values left without one. Nothing is reported when no line matched at all.
fn attach_enum_descriptions(
    members: &mut [EnumMember],
    description: &str,
    settings: &EnumDescriptionSettings,
) -> Vec<String> {
    let mut matched = false;
    for line in description.lines() {
        let Some(rest) = line.trim().strip_prefix(settings.prefix.as_str()) else {
            continue;
        };
        let Some((value, text)) = rest.split_once(':') else {
            continue;
        };
        let value = value.trim().trim_matches('`');
        if let Some(member) = members.iter_mut().find(|m| m.value == value) {
            member.description = Some(text.trim().to_string());
            matched = true;
        }
    }
    if !matched {
        return Vec::new();
    }
    members
        .iter()
        .filter(|m| m.description.is_none())
        .map(|m| m.value.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemberState, TypeKind};

    fn parse(yaml: &str) -> SchemaOrRef {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    fn run<'a>(name: &str, schema: &'a SchemaOrRef, settings: &PojoSettings) -> Classification<'a> {
        let pending = PendingSchema {
            name: PojoName::of_name_and_suffix(name, ""),
            schema,
        };
        classify(&pending, settings, &TypeMapperChain::standard(), &mut NameRegistry::default()).unwrap()
    }

    fn object<'c>(c: &'c Classification<'_>) -> &'c ObjectPojo {
        match &c.classified {
            Classified::Pojo(Pojo::Object(o)) => o,
            other => panic!("expected object, got {other:?}"),
        }
    }

    fn enum_settings(fail_on_incomplete: bool) -> PojoSettings {
        PojoSettings {
            enum_description: Some(EnumDescriptionSettings {
                prefix: "* `".to_string(),
                fail_on_incomplete,
            }),
            ..PojoSettings::default()
        }
    }

    #[test]
    fn test_array_pojo() {
        let s = parse("type: array\nitems:\n  $ref: '#/components/schemas/Pet'");
        let c = run("Pets", &s, &PojoSettings::default());
        let Classified::Pojo(Pojo::Array(array)) = &c.classified else {
            panic!("expected array");
        };
        assert_eq!(array.value.member_type.to_string(), "List<Pet>");
    }

    #[test]
    fn test_object_members_keep_four_states() {
        let s = parse(
            r#"
type: object
required: [a, b]
properties:
  a: { type: string }
  b: { type: string, nullable: true }
  c: { type: string }
  d: { type: [string, "null"] }
"#,
        );
        let c = run("User", &s, &PojoSettings::default());
        let states: Vec<MemberState> = object(&c).members.iter().map(PojoMember::state).collect();
        assert_eq!(
            states,
            vec![
                MemberState::RequiredNotNullable,
                MemberState::RequiredNullable,
                MemberState::OptionalNotNullable,
                MemberState::Tristate,
            ]
        );
    }

    #[test]
    fn test_inline_property_object_is_discovered() {
        let s = parse(
            "type: object\nproperties:\n  address:\n    type: object\n    properties:\n      street: { type: string }",
        );
        let c = run("User", &s, &PojoSettings::default());
        assert_eq!(object(&c).members[0].member_type.to_string(), "UserAddress");
        assert_eq!(c.discovered[0].name.to_string(), "UserAddress");
    }

    #[test]
    fn test_required_additional_properties() {
        let s = parse(
            "type: object\nrequired: [id, extra]\nproperties:\n  id: { type: string }\nadditionalProperties:\n  type: integer",
        );
        let c = run("User", &s, &PojoSettings::default());
        let pojo = object(&c);
        assert_eq!(pojo.required_additional_properties, vec![Name::of("extra")]);
        assert_eq!(pojo.additional_properties, AdditionalProperties::Allowed(Type::integer()));
    }

    #[test]
    fn test_additional_properties_defaults() {
        let s = parse("type: object\nproperties:\n  x: { type: string }");
        let absent = run("A", &s, &PojoSettings::default());
        assert_eq!(object(&absent).additional_properties, AdditionalProperties::NotAllowed);

        let s = parse("type: object\nadditionalProperties: true\nproperties:\n  x: { type: string }");
        let allowed = run("B", &s, &PojoSettings::default());
        assert_eq!(
            object(&allowed).additional_properties,
            AdditionalProperties::Allowed(Type::free_form())
        );
    }

    #[test]
    fn test_composition_inline_names() {
        let s = parse(
            r#"
oneOf:
  - $ref: '#/components/schemas/Cat'
  - type: object
    properties:
      a: { type: string }
  - type: object
    properties:
      b: { type: string }
allOf:
  - type: object
    properties:
      id: { type: string }
"#,
        );
        let c = run("Pet", &s, &PojoSettings::default());
        let Classified::Unresolved(stub) = &c.classified else {
            panic!("expected stub");
        };
        let names: Vec<String> = stub.composition_names().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["PetAllOf", "Cat", "PetOneOf0", "PetOneOf1"]);
        assert_eq!(c.discovered.len(), 3);
    }

    #[test]
    fn test_discriminator_mapping_targets() {
        let s = parse(
            r#"
oneOf:
  - $ref: '#/components/schemas/Cat'
discriminator:
  propertyName: petType
  mapping:
    cat: '#/components/schemas/Cat'
"#,
        );
        let c = run("Pet", &s, &PojoSettings::default());
        let Classified::Unresolved(stub) = &c.classified else {
            panic!("expected stub");
        };
        let discriminator = stub.one_of.as_ref().unwrap().discriminator.as_ref().unwrap();
        assert_eq!(discriminator.property_name.as_str(), "petType");
        assert_eq!(discriminator.mapping.as_ref().unwrap()["cat"].to_string(), "Cat");
    }

    #[test]
    fn test_enum_pojo_with_descriptions() {
        let s = parse("type: string\nenum: [red, green]\ndescription: |\n  Colors\n  * `red`: Warm\n");
        let c = run("Color", &s, &enum_settings(false));
        let Classified::Pojo(Pojo::Enum(e)) = &c.classified else {
            panic!("expected enum");
        };
        assert_eq!(e.members[0].description.as_deref(), Some("Warm"));
        assert_eq!(
            c.warnings,
            vec![Warning::IncompleteEnumDescription {
                pojo: "Color".to_string(),
                missing: vec!["green".to_string()],
            }]
        );
    }

    #[test]
    fn test_incomplete_enum_description_can_fail() {
        let s = parse("type: string\nenum: [a, b]\ndescription: \"* `a`: first\"");
        let pending = PendingSchema {
            name: PojoName::of_name_and_suffix("Letters", ""),
            schema: &s,
        };
        let err = classify(
            &pending,
            &enum_settings(true),
            &TypeMapperChain::standard(),
            &mut NameRegistry::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TransformError::Resolve(ResolveError::IncompleteEnumDescription { ref missing, .. })
                if missing == &["b"]
        ));
    }

    #[test]
    fn test_null_enum_entry_keeps_enum_pojo() {
        let s = parse("type: string\nnullable: true\nenum: [red, green, null]");
        let c = run("Color", &s, &PojoSettings::default());
        let Classified::Pojo(Pojo::Enum(e)) = &c.classified else {
            panic!("expected enum, got {:?}", c.classified);
        };
        let values: Vec<&str> = e.members.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(values, vec!["red", "green"]);
        assert!(c.warnings.is_empty());
    }

    #[test]
    fn test_nullable_reference_property() {
        let s = parse(
            r#"
type: object
required: [owner]
properties:
  owner:
    oneOf:
      - $ref: '#/components/schemas/Owner'
      - type: 'null'
"#,
        );
        let c = run("Pet", &s, &PojoSettings::default());
        let owner = &object(&c).members[0];
        assert_eq!(owner.member_type.to_string(), "Owner");
        assert_eq!(owner.state(), MemberState::RequiredNullable);
        assert!(c.discovered.is_empty());
    }

    #[test]
    fn test_top_level_nullable_reference_is_plain_member() {
        let s = parse("anyOf:\n  - $ref: '#/components/schemas/Owner'\n  - type: 'null'");
        let c = run("MaybeOwner", &s, &PojoSettings::default());
        let Classified::Member(member) = &c.classified else {
            panic!("expected plain member");
        };
        assert_eq!(member.member_type.to_string(), "Owner");
        assert_eq!(member.nullability, Nullability::Nullable);
    }

    #[test]
    fn test_null_branch_skipped_in_union() {
        let s = parse(
            "oneOf:\n  - $ref: '#/components/schemas/Cat'\n  - $ref: '#/components/schemas/Dog'\n  - type: 'null'",
        );
        let c = run("Pet", &s, &PojoSettings::default());
        let Classified::Unresolved(stub) = &c.classified else {
            panic!("expected stub");
        };
        let names: Vec<String> = stub.composition_names().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["Cat", "Dog"]);
        assert!(c.discovered.is_empty());
    }

    #[test]
    fn test_non_string_enum_is_plain_member() {
        let s = parse("type: integer\nenum: [1, 2, 3]");
        let c = run("Level", &s, &PojoSettings::default());
        let Classified::Member(member) = &c.classified else {
            panic!("expected plain member");
        };
        assert_eq!(member.member_type, Type::integer());
        assert_eq!(c.warnings, vec![Warning::NonStringEnumValues { pojo: "Level".to_string() }]);
    }

    #[test]
    fn test_free_form_and_plain_member() {
        let s = parse("type: object\nmaxProperties: 5");
        let c = run("Any", &s, &PojoSettings::default());
        let Classified::Pojo(Pojo::FreeForm(free)) = &c.classified else {
            panic!("expected free form");
        };
        assert_eq!(free.constraints.property_count.unwrap().max, Some(5));

        let s = parse("type: string\nformat: uuid\ndescription: Id");
        let c = run("UserId", &s, &PojoSettings::default());
        let Classified::Member(member) = &c.classified else {
            panic!("expected plain member");
        };
        assert!(matches!(member.member_type.kind, TypeKind::String(_)));
        assert_eq!(member.description.as_deref(), Some("Id"));
    }

    #[test]
    fn test_map_only_object() {
        let s = parse("type: object\nadditionalProperties:\n  type: integer");
        let c = run("Scores", &s, &PojoSettings::default());
        let pojo = object(&c);
        assert!(pojo.members.is_empty());
        assert_eq!(pojo.additional_properties.value_type(), Some(&Type::integer()));
    }
}
