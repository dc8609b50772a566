use dtogen_core::error::{ResolveError, TransformError};
use dtogen_core::model::{CompositionKind, MemberState, ObjectPojo, Pojo};
use dtogen_core::{PojoSettings, map_document};

const UNIONS: &str = include_str!("fixtures/unions.yaml");
const NULLABLE: &str = include_str!("fixtures/nullable.yaml");

fn names(pojos: &[Pojo]) -> Vec<String> {
    pojos.iter().map(|p| p.name().to_string()).collect()
}

fn find<'a>(pojos: &'a [Pojo], name: &str) -> &'a Pojo {
    pojos
        .iter()
        .find(|p| p.name().to_string() == name)
        .unwrap_or_else(|| panic!("no pojo named {name}"))
}

fn object<'a>(pojos: &'a [Pojo], name: &str) -> &'a ObjectPojo {
    find(pojos, name)
        .as_object()
        .unwrap_or_else(|| panic!("{name} is not an object"))
}

fn branch_names(pojos: &[ObjectPojo]) -> Vec<String> {
    pojos.iter().map(|p| p.name.to_string()).collect()
}

#[test]
fn any_of_alone_is_composed() {
    let result = map_document(UNIONS, &PojoSettings::default()).unwrap();
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);

    let Pojo::Composed(contact) = find(&result.pojos, "Contact") else {
        panic!("Contact should be composed");
    };
    assert_eq!(contact.composition.kind(), CompositionKind::AnyOf);
    assert_eq!(branch_names(contact.composition.pojos()), ["Email", "Phone"]);
    assert!(contact.composition.discriminator().is_none());
    assert_eq!(contact.description.as_deref(), Some("Any way to reach someone"));
}

#[test]
fn one_of_next_to_properties_links_object() {
    let result = map_document(UNIONS, &PojoSettings::default()).unwrap();
    let adoption = object(&result.pojos, "Adoption");

    assert_eq!(adoption.members.len(), 1);
    assert_eq!(
        adoption.member("id").unwrap().state(),
        MemberState::RequiredNotNullable
    );
    assert!(adoption.has_composition(CompositionKind::OneOf));
    assert!(!adoption.has_composition(CompositionKind::AnyOf));
    assert!(!adoption.has_composition(CompositionKind::AllOf));

    let one_of = adoption.one_of.as_ref().unwrap();
    assert_eq!(branch_names(&one_of.pojos), ["Cat", "Dog"]);
    assert!(one_of.discriminator.is_none());
}

#[test]
fn discriminator_attaches_to_one_of_when_both_unions_present() {
    let result = map_document(UNIONS, &PojoSettings::default()).unwrap();
    let companion = object(&result.pojos, "Companion");
    assert!(companion.members.is_empty());

    let one_of = companion.one_of.as_ref().unwrap();
    let any_of = companion.any_of.as_ref().unwrap();
    assert_eq!(branch_names(&one_of.pojos), ["Cat", "Dog"]);
    assert_eq!(branch_names(&any_of.pojos), ["Email", "Phone"]);
    assert!(any_of.discriminator.is_none());

    let discriminator = one_of.discriminator.as_ref().unwrap();
    assert_eq!(discriminator.property_name.as_str(), "kind");
    assert_eq!(discriminator.value_for(&one_of.pojos[0].name), Some("cat"));
    assert_eq!(discriminator.value_for(&one_of.pojos[1].name), Some("dog"));
}

#[test]
fn branches_stay_standalone_pojos() {
    let result = map_document(UNIONS, &PojoSettings::default()).unwrap();
    let all = names(&result.pojos);
    for name in ["Cat", "Dog", "Email", "Phone"] {
        assert!(all.iter().any(|n| n == name), "{name} missing from {all:?}");
    }
    assert_eq!(find(&result.pojos, "Cat").kind(), "object");
}

#[test]
fn mapping_to_non_branch_is_invalid() {
    let yaml = r#"
openapi: 3.0.3
info: { title: Broken, version: '1' }
components:
  schemas:
    Cat:
      type: object
      properties:
        meows: { type: boolean }
    Dog:
      type: object
      properties:
        barks: { type: boolean }
    Bird:
      type: object
      properties:
        sings: { type: boolean }
    Pet:
      oneOf:
        - $ref: '#/components/schemas/Cat'
        - $ref: '#/components/schemas/Dog'
      discriminator:
        propertyName: petType
        mapping:
          cat: '#/components/schemas/Cat'
          bird: '#/components/schemas/Bird'
"#;
    let err = map_document(yaml, &PojoSettings::default()).unwrap_err();
    let TransformError::Resolve(ResolveError::InvalidDiscriminatorMapping {
        pojo,
        value,
        target,
    }) = &err
    else {
        panic!("expected invalid discriminator mapping, got {err:?}");
    };
    assert_eq!(pojo, "Pet");
    assert_eq!(value, "bird");
    assert_eq!(target, "Bird");
}

#[test]
fn null_enum_entry_keeps_enum() {
    let result = map_document(NULLABLE, &PojoSettings::default()).unwrap();
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);

    let Pojo::Enum(color) = find(&result.pojos, "Color") else {
        panic!("Color should be an enum");
    };
    let values: Vec<&str> = color.members.iter().map(|m| m.value.as_str()).collect();
    assert_eq!(values, ["red", "green"]);

    let pet = object(&result.pojos, "Pet");
    assert_eq!(pet.member("color").unwrap().member_type.to_string(), "Color");
}

#[test]
fn null_branch_makes_reference_nullable() {
    let result = map_document(NULLABLE, &PojoSettings::default()).unwrap();
    let pet = object(&result.pojos, "Pet");

    let owner = pet.member("owner").unwrap();
    assert_eq!(owner.member_type.to_string(), "Owner");
    assert_eq!(owner.state(), MemberState::RequiredNullable);

    let previous = pet.member("previousOwner").unwrap();
    assert_eq!(previous.member_type.to_string(), "Owner");
    assert_eq!(previous.state(), MemberState::Tristate);

    let all = names(&result.pojos);
    assert!(!all.iter().any(|n| n.starts_with("PetOwner")), "{all:?}");
}

#[test]
fn nullable_reference_schema_inlines() {
    let result = map_document(NULLABLE, &PojoSettings::default()).unwrap();
    let pet = object(&result.pojos, "Pet");
    assert_eq!(pet.member("keeper").unwrap().member_type.to_string(), "Owner");
}
