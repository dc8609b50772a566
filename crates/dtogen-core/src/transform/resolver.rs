use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;

use crate::config::PojoSettings;
use crate::error::{ResolveError, TransformError, UnresolvedReference, Warning};
use crate::model::unresolved::{UnresolvedComposition, UnresolvedObjectPojo};
use crate::model::{ObjectPojo, Pojo, PojoName, TypeKind};

use super::classifier::{Classified, PlainMember, classify};
use super::composition::{ResolvedBranches, as_composition_branch, invalid_branch, resolve_stub};
use super::name_normalizer::NameRegistry;
use super::type_mapper::{PendingSchema, TypeMapperChain};

/// A fully resolved schema: a pojo, or a plain type without a pojo of its own.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Pojo(Pojo),
    Member(PlainMember),
}

impl Resolved {
    pub fn name(&self) -> &PojoName {
        match self {
            Resolved::Pojo(p) => p.name(),
            Resolved::Member(m) => &m.name,
        }
    }
}

/// Everything resolved in one run, in discovery order.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub entries: Vec<Resolved>,
    pub warnings: Vec<Warning>,
}

/// Classify the roots and every schema they discover until a pass finds no
/// new schemas, then resolve composition stubs in rounds.
///
/// `names` must already hold the names of the roots.
pub fn resolve<'a>(
    roots: Vec<PendingSchema<'a>>,
    settings: &PojoSettings,
    chain: &TypeMapperChain,
    names: &mut NameRegistry,
) -> Result<Resolution, TransformError> {
    let mut slots: IndexMap<String, Classified> = IndexMap::new();
    let mut warnings = Vec::new();
    let mut errors = Vec::new();
    let mut pending = roots;
    let mut pass = 0;

    while !pending.is_empty() {
        pass += 1;
        debug!("classification pass {pass}: {} schemas", pending.len());
        let mut next = Vec::new();
        for schema in &pending {
            let classification = match classify(schema, settings, chain, names) {
                Ok(classification) => classification,
                Err(TransformError::Resolve(e)) => {
                    errors.push(e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            warnings.extend(classification.warnings);
            next.extend(classification.discovered);
            let classified = classification.classified;
            slots.insert(classified.name().key(), classified);
        }
        pending = next;
    }
    if let Some(e) = ResolveError::from_errors(errors) {
        return Err(e.into());
    }

    let entries = resolve_stubs(slots)?;
    Ok(Resolution { entries, warnings })
}

enum Lookup {
    Ready(ObjectPojo),
    /// Still an unresolved stub, or not defined at all.
    Blocked,
    Invalid(&'static str),
}

enum StubState {
    Ready(ResolvedBranches),
    Blocked(Vec<String>),
    Invalid(Vec<ResolveError>),
}

/// Replace stubs by resolved pojos, one round at a time, until none remain.
/// A round in which no stub advances fails with every stuck reference.
fn resolve_stubs(mut slots: IndexMap<String, Classified>) -> Result<Vec<Resolved>, ResolveError> {
    let mut round = 0;
    loop {
        let stub_keys: Vec<String> = slots
            .iter()
            .filter(|(_, c)| matches!(c, Classified::Unresolved(_)))
            .map(|(key, _)| key.clone())
            .collect();
        if stub_keys.is_empty() {
            return Ok(slots
                .into_values()
                .filter_map(|classified| match classified {
                    Classified::Pojo(p) => Some(Resolved::Pojo(p)),
                    Classified::Member(m) => Some(Resolved::Member(m)),
                    Classified::Unresolved(_) => None,
                })
                .collect());
        }
        round += 1;
        debug!("composition round {round}: {} stubs", stub_keys.len());

        let mut resolved = Vec::new();
        let mut stuck = Vec::new();
        let mut errors = Vec::new();
        for key in &stub_keys {
            let Some(Classified::Unresolved(stub)) = slots.get(key) else {
                continue;
            };
            match stub_state(stub, &slots) {
                StubState::Ready(branches) => match resolve_stub(stub, branches) {
                    Ok(pojo) => resolved.push((key.clone(), pojo)),
                    Err(mut e) => errors.append(&mut e),
                },
                StubState::Blocked(missing) => stuck.push(UnresolvedReference {
                    pojo: stub.name.to_string(),
                    missing,
                }),
                StubState::Invalid(mut e) => errors.append(&mut e),
            }
        }
        if let Some(e) = ResolveError::from_errors(errors) {
            return Err(e);
        }
        if resolved.is_empty() {
            return Err(ResolveError::UnresolvableReferences(stuck));
        }
        for (key, pojo) in resolved {
            slots.insert(key, Classified::Pojo(pojo));
        }
    }
}

fn stub_state(stub: &UnresolvedObjectPojo, slots: &IndexMap<String, Classified>) -> StubState {
    let mut missing = Vec::new();
    let mut errors = Vec::new();
    let mut branches_of = |composition: &Option<UnresolvedComposition>| {
        let composition = composition.as_ref()?;
        let mut pojos = Vec::with_capacity(composition.pojo_names.len());
        for name in &composition.pojo_names {
            match lookup(name, slots) {
                Lookup::Ready(pojo) => pojos.push(pojo),
                Lookup::Blocked => missing.push(name.to_string()),
                Lookup::Invalid(kind) => {
                    errors.push(invalid_branch(stub, composition.kind, &name.to_string(), kind))
                }
            }
        }
        Some(pojos)
    };
    let branches = ResolvedBranches {
        all_of: branches_of(&stub.all_of),
        one_of: branches_of(&stub.one_of),
        any_of: branches_of(&stub.any_of),
    };
    if !errors.is_empty() {
        StubState::Invalid(errors)
    } else if !missing.is_empty() {
        StubState::Blocked(missing)
    } else {
        StubState::Ready(branches)
    }
}

/// Find a branch by name. Plain members that are references to another
/// schema are followed.
fn lookup(name: &PojoName, slots: &IndexMap<String, Classified>) -> Lookup {
    let mut visited = HashSet::new();
    let mut key = name.key();
    loop {
        if !visited.insert(key.clone()) {
            return Lookup::Invalid("cyclic reference");
        }
        match slots.get(&key) {
            Some(Classified::Pojo(pojo)) => {
                return match as_composition_branch(pojo) {
                    Ok(object) => Lookup::Ready(object),
                    Err(kind) => Lookup::Invalid(kind),
                };
            }
            Some(Classified::Member(member)) => match &member.member_type.kind {
                TypeKind::Object(target) => key = target.key(),
                _ => return Lookup::Invalid("plain member"),
            },
            Some(Classified::Unresolved(_)) | None => return Lookup::Blocked,
        }
    }
}
