use std::collections::HashSet;

use crate::error::ResolveError;
use crate::model::discriminator::UntypedDiscriminator;
use crate::model::unresolved::UnresolvedObjectPojo;
use crate::model::{
    AdditionalProperties, AllOfComposition, AnyOfComposition, ComposedPojo, CompositionKind,
    Constraints, Discriminator, DiscriminatorMapping, ObjectPojo, OneOfComposition, Pojo,
    PojoMember, Type, UnionComposition,
};

/// Resolved branches of each composition of a stub.
#[derive(Debug, Default)]
pub struct ResolvedBranches {
    pub all_of: Option<Vec<ObjectPojo>>,
    pub one_of: Option<Vec<ObjectPojo>>,
    pub any_of: Option<Vec<ObjectPojo>>,
}

/// A resolved pojo usable as a composition branch. Pure unions and free-form
/// objects become member-less objects; anything else is rejected with its kind.
pub fn as_composition_branch(pojo: &Pojo) -> Result<ObjectPojo, &'static str> {
    match pojo {
        Pojo::Object(object) => Ok(object.clone()),
        Pojo::Composed(composed) => {
            let (one_of, any_of) = match &composed.composition {
                UnionComposition::OneOf(c) => (Some(c.clone()), None),
                UnionComposition::AnyOf(c) => (None, Some(c.clone())),
            };
            Ok(ObjectPojo {
                name: composed.name.clone(),
                description: composed.description.clone(),
                members: Vec::new(),
                required_additional_properties: Vec::new(),
                additional_properties: AdditionalProperties::NotAllowed,
                constraints: Constraints::empty(),
                all_of: None,
                one_of,
                any_of,
            })
        }
        Pojo::FreeForm(free) => Ok(ObjectPojo {
            name: free.name.clone(),
            description: free.description.clone(),
            members: Vec::new(),
            required_additional_properties: Vec::new(),
            additional_properties: AdditionalProperties::allowed_for(Type::free_form()),
            constraints: free.constraints.clone(),
            all_of: None,
            one_of: None,
            any_of: None,
        }),
        other => Err(other.kind()),
    }
}

/// Turn a stub into its final pojo once every branch is resolved.
///
/// A stub with nothing but a single oneOf/anyOf becomes a [`ComposedPojo`];
/// everything else becomes an object whose allOf members are flattened into
/// its own member list.
pub fn resolve_stub(
    stub: &UnresolvedObjectPojo,
    branches: ResolvedBranches,
) -> Result<Pojo, Vec<ResolveError>> {
    let mut errors = Vec::new();
    let pojo_name = stub.name.to_string();

    let one_of = match (&stub.one_of, branches.one_of) {
        (Some(c), Some(pojos)) => {
            match resolve_discriminator(&pojo_name, &pojos, c.discriminator.as_ref()) {
                Ok(discriminator) => Some(OneOfComposition {
                    pojos,
                    discriminator,
                }),
                Err(e) => {
                    errors.push(e);
                    None
                }
            }
        }
        _ => None,
    };
    let any_of = match (&stub.any_of, branches.any_of) {
        (Some(c), Some(pojos)) => {
            match resolve_discriminator(&pojo_name, &pojos, c.discriminator.as_ref()) {
                Ok(discriminator) => Some(AnyOfComposition {
                    pojos,
                    discriminator,
                }),
                Err(e) => {
                    errors.push(e);
                    None
                }
            }
        }
        _ => None,
    };

    let all_of_pojos = branches.all_of.unwrap_or_default();
    let members = match flatten_all_of(&pojo_name, &all_of_pojos, &stub.members) {
        Ok(members) => members,
        Err(mut duplicates) => {
            errors.append(&mut duplicates);
            Vec::new()
        }
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    let pure_union = stub.is_pure_union()
        && !stub.additional_properties.is_allowed()
        && stub.required_additional_properties.is_empty();
    let (one_of, any_of) = match (one_of, any_of) {
        (Some(c), None) if pure_union => {
            return Ok(composed(stub, UnionComposition::OneOf(c)));
        }
        (None, Some(c)) if pure_union => {
            return Ok(composed(stub, UnionComposition::AnyOf(c)));
        }
        links => links,
    };

    Ok(Pojo::Object(ObjectPojo {
        name: stub.name.clone(),
        description: stub.description.clone(),
        members,
        required_additional_properties: stub.required_additional_properties.clone(),
        additional_properties: stub.additional_properties.clone(),
        constraints: stub.constraints.clone(),
        all_of: (!all_of_pojos.is_empty()).then_some(AllOfComposition {
            pojos: all_of_pojos,
        }),
        one_of,
        any_of,
    }))
}

fn composed(stub: &UnresolvedObjectPojo, composition: UnionComposition) -> Pojo {
    Pojo::Composed(ComposedPojo {
        name: stub.name.clone(),
        description: stub.description.clone(),
        composition,
    })
}

/// Branch members in branch-then-field order, followed by the composing
/// schema's own members. A name seen twice is an error.
pub fn flatten_all_of(
    pojo_name: &str,
    branches: &[ObjectPojo],
    own_members: &[PojoMember],
) -> Result<Vec<PojoMember>, Vec<ResolveError>> {
    let mut seen = HashSet::new();
    let mut members = Vec::new();
    let mut errors = Vec::new();
    let candidates = branches
        .iter()
        .flat_map(|b| b.members.iter())
        .chain(own_members);
    for member in candidates {
        if seen.insert(member.name.clone()) {
            members.push(member.clone());
        } else {
            errors.push(ResolveError::AmbiguousMember {
                pojo: pojo_name.to_string(),
                member: member.name.to_string(),
            });
        }
    }
    if errors.is_empty() {
        Ok(members)
    } else {
        Err(errors)
    }
}

/// Dispatch table of a oneOf/anyOf.
///
/// With an explicit mapping, only the branches it names take part and every
/// target must be a branch. Without one, each branch dispatches on its own
/// schema name.
pub fn resolve_discriminator(
    pojo_name: &str,
    branches: &[ObjectPojo],
    discriminator: Option<&UntypedDiscriminator>,
) -> Result<Option<Discriminator>, ResolveError> {
    let Some(discriminator) = discriminator else {
        return Ok(None);
    };
    let mappings = match &discriminator.mapping {
        Some(mapping) => {
            if let Some((value, target)) = mapping
                .iter()
                .find(|(_, target)| !branches.iter().any(|b| b.name.equals_ignore_case(target)))
            {
                return Err(ResolveError::InvalidDiscriminatorMapping {
                    pojo: pojo_name.to_string(),
                    value: value.clone(),
                    target: target.to_string(),
                });
            }
            branches
                .iter()
                .flat_map(|branch| {
                    mapping
                        .iter()
                        .filter(|(_, target)| branch.name.equals_ignore_case(target))
                        .map(|(value, _)| DiscriminatorMapping {
                            value: value.clone(),
                            pojo_name: branch.name.clone(),
                        })
                })
                .collect()
        }
        None => branches
            .iter()
            .map(|branch| DiscriminatorMapping {
                value: branch.name.name().to_string(),
                pojo_name: branch.name.clone(),
            })
            .collect(),
    };
    Ok(Some(Discriminator {
        property_name: discriminator.property_name.clone(),
        mappings,
    }))
}

/// Error for a branch that resolved to something other than an object.
pub fn invalid_branch(
    stub: &UnresolvedObjectPojo,
    kind: CompositionKind,
    member: &str,
    member_kind: &'static str,
) -> ResolveError {
    ResolveError::InvalidCompositionMember {
        pojo: stub.name.to_string(),
        kind,
        member: member.to_string(),
        member_kind,
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::model::unresolved::UnresolvedComposition;
    use crate::model::{EnumPojo, Name, Necessity, Nullability, PojoName};

    fn name(n: &str) -> PojoName {
        PojoName::of_name_and_suffix(n, "Dto")
    }

    fn object(n: &str, members: Vec<PojoMember>) -> ObjectPojo {
        ObjectPojo::builder().name(name(n)).members(members).build().unwrap()
    }

    fn member(n: &str, ty: Type, necessity: Necessity) -> PojoMember {
        PojoMember::new(n, ty, necessity, Nullability::NotNullable)
    }

    fn stub(all_of: Vec<&str>, one_of: Vec<&str>) -> UnresolvedObjectPojo {
        let composition = |kind, names: Vec<&str>| {
            (!names.is_empty()).then(|| UnresolvedComposition {
                kind,
                pojo_names: names.into_iter().map(name).collect(),
                discriminator: None,
            })
        };
        UnresolvedObjectPojo {
            name: name("Composed"),
            description: Some("composed".to_string()),
            members: vec![],
            required_additional_properties: vec![],
            additional_properties: AdditionalProperties::NotAllowed,
            constraints: Constraints::empty(),
            all_of: composition(CompositionKind::AllOf, all_of),
            one_of: composition(CompositionKind::OneOf, one_of),
            any_of: None,
        }
    }

    #[test]
    fn test_all_of_flattening_order() {
        let a = object("A", vec![member("x", Type::string(), Necessity::Required)]);
        let b = object("B", vec![member("y", Type::integer(), Necessity::Optional)]);
        let pojo = resolve_stub(
            &stub(vec!["A", "B"], vec![]),
            ResolvedBranches {
                all_of: Some(vec![a, b]),
                ..Default::default()
            },
        )
        .unwrap();
        let Pojo::Object(object) = pojo else {
            panic!("expected object");
        };
        assert_eq!(
            object.members,
            vec![
                member("x", Type::string(), Necessity::Required),
                member("y", Type::integer(), Necessity::Optional),
            ]
        );
        assert_eq!(object.all_of.unwrap().pojos.len(), 2);
    }

    #[test]
    fn test_all_of_duplicate_member_is_ambiguous() {
        let a = object("A", vec![member("id", Type::string(), Necessity::Required)]);
        let b = object("B", vec![member("id", Type::string(), Necessity::Required)]);
        let errors = flatten_all_of("C", &[a, b], &[]).unwrap_err();
        assert_eq!(
            errors,
            vec![ResolveError::AmbiguousMember {
                pojo: "C".to_string(),
                member: "id".to_string(),
            }]
        );
    }

    #[test]
    fn test_pure_one_of_is_composed() {
        let pojo = resolve_stub(
            &stub(vec![], vec!["Cat", "Dog"]),
            ResolvedBranches {
                one_of: Some(vec![object("Cat", vec![]), object("Dog", vec![])]),
                ..Default::default()
            },
        )
        .unwrap();
        let Pojo::Composed(composed) = pojo else {
            panic!("expected composed");
        };
        assert_eq!(composed.composition.kind(), CompositionKind::OneOf);
        assert_eq!(composed.description.as_deref(), Some("composed"));
    }

    #[test]
    fn test_one_of_with_members_is_object_with_link() {
        let mut with_members = stub(vec![], vec!["Cat", "Dog"]);
        with_members.members = vec![member("id", Type::string(), Necessity::Required)];
        let pojo = resolve_stub(
            &with_members,
            ResolvedBranches {
                one_of: Some(vec![object("Cat", vec![]), object("Dog", vec![])]),
                ..Default::default()
            },
        )
        .unwrap();
        let Pojo::Object(object) = pojo else {
            panic!("expected object");
        };
        assert_eq!(object.members.len(), 1);
        assert_eq!(object.one_of.unwrap().pojos.len(), 2);
        assert!(object.any_of.is_none());
        assert!(object.all_of.is_none());
    }

    #[test]
    fn test_default_discriminator_uses_schema_names() {
        let branches = [object("Admin", vec![]), object("User", vec![])];
        let untyped = UntypedDiscriminator {
            property_name: Name::of("role"),
            mapping: None,
        };
        let discriminator = resolve_discriminator("Person", &branches, Some(&untyped))
            .unwrap()
            .unwrap();
        assert_eq!(discriminator.value_for(&name("Admin")), Some("Admin"));
        assert_eq!(discriminator.value_for(&name("User")), Some("User"));
    }

    #[test]
    fn test_explicit_mapping_excludes_unmapped_branches() {
        let branches = [object("Cat", vec![]), object("Dog", vec![]), object("Bird", vec![])];
        let untyped = UntypedDiscriminator {
            property_name: Name::of("petType"),
            mapping: Some(IndexMap::from([
                ("dog".to_string(), name("Dog")),
                ("cat".to_string(), name("Cat")),
            ])),
        };
        let discriminator = resolve_discriminator("Pet", &branches, Some(&untyped))
            .unwrap()
            .unwrap();
        let values: Vec<&str> = discriminator.mappings.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(values, vec!["cat", "dog"]);
        assert_eq!(discriminator.value_for(&name("Bird")), None);
    }

    #[test]
    fn test_mapping_to_non_branch_is_invalid() {
        let branches = [object("Cat", vec![])];
        let untyped = UntypedDiscriminator {
            property_name: Name::of("petType"),
            mapping: Some(IndexMap::from([("fish".to_string(), name("Fish"))])),
        };
        let err = resolve_discriminator("Pet", &branches, Some(&untyped)).unwrap_err();
        assert_eq!(
            err,
            ResolveError::InvalidDiscriminatorMapping {
                pojo: "Pet".to_string(),
                value: "fish".to_string(),
                target: "FishDto".to_string(),
            }
        );
    }

    #[test]
    fn test_enum_is_not_a_branch() {
        let e = Pojo::Enum(EnumPojo {
            name: name("Color"),
            description: None,
            members: vec![],
        });
        assert_eq!(as_composition_branch(&e), Err("enum"));
    }
}
