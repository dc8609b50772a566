use std::collections::{HashMap, HashSet};

use crate::config::{ExclusionFilter, NameMapping, PojoSettings, ReferenceInlining};
use crate::error::Warning;
use crate::model::{AliasPojo, Pojo, PojoName, Type, TypeKind};

use super::classifier::PlainMember;
use super::resolver::Resolved;

/// Turn resolved entries into the final pojo set.
///
/// Plain members are inlined into every referencing type or kept as alias
/// pojos, depending on `reference_inlining`. Then referenced pojo
/// descriptions are attached, dangling references reported, and name
/// mappings applied.
pub fn finalize(
    entries: Vec<Resolved>,
    settings: &PojoSettings,
    exclusion: &ExclusionFilter,
) -> (Vec<Pojo>, Vec<Warning>) {
    let mut warnings = Vec::new();
    let mut pojos = match settings.reference_inlining {
        ReferenceInlining::Simple => inline_plain_members(entries, &mut warnings),
        ReferenceInlining::Never => entries
            .into_iter()
            .map(|entry| match entry {
                Resolved::Pojo(pojo) => pojo,
                Resolved::Member(member) => alias(member),
            })
            .collect(),
    };

    pojos = attach_descriptions(pojos);
    warnings.extend(dangling_references(&pojos, exclusion));
    let pojos = apply_name_mappings(pojos, &settings.name_mappings);
    (pojos, warnings)
}

fn alias(member: PlainMember) -> Pojo {
    Pojo::Alias(AliasPojo {
        name: member.name,
        description: member.description,
        alias_type: member.member_type,
        nullability: member.nullability,
    })
}

/// Replace references to plain members by their types. A member whose
/// reference chain loops is kept as an alias so its references stay valid.
fn inline_plain_members(entries: Vec<Resolved>, warnings: &mut Vec<Warning>) -> Vec<Pojo> {
    let members: HashMap<String, &PlainMember> = entries
        .iter()
        .filter_map(|entry| match entry {
            Resolved::Member(m) => Some((m.name.key(), m)),
            Resolved::Pojo(_) => None,
        })
        .collect();

    let mut inlined: Vec<(PojoName, Option<String>, Type)> = Vec::new();
    let mut cyclic = HashSet::new();
    for entry in &entries {
        let Resolved::Member(member) = entry else {
            continue;
        };
        match final_type(member, &members) {
            Some(ty) => inlined.push((member.name.clone(), member.description.clone(), ty)),
            None => {
                warnings.push(Warning::CyclicAliasReference {
                    pojo: member.name.to_string(),
                });
                cyclic.insert(member.name.key());
            }
        }
    }

    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Resolved::Pojo(pojo) => Some(pojo),
            Resolved::Member(member) if cyclic.contains(&member.name.key()) => Some(alias(member)),
            Resolved::Member(_) => None,
        })
        .map(|pojo| {
            inlined.iter().fold(pojo, |pojo, (name, description, ty)| {
                pojo.inline_object_reference(name, description.as_deref(), ty)
            })
        })
        .collect()
}

/// The type a plain member stands for once references to other plain
/// members are followed, or `None` on a cycle.
fn final_type(member: &PlainMember, members: &HashMap<String, &PlainMember>) -> Option<Type> {
    let mut visited = HashSet::from([member.name.key()]);
    let mut ty = member.member_type.clone();
    loop {
        let next = match &ty.kind {
            TypeKind::Object(target) => members.get(&target.key()),
            _ => None,
        };
        let Some(next) = next else {
            return Some(ty);
        };
        if !visited.insert(next.name.key()) {
            return None;
        }
        ty = next.member_type.clone();
    }
}

fn attach_descriptions(pojos: Vec<Pojo>) -> Vec<Pojo> {
    let described: Vec<(PojoName, String)> = pojos
        .iter()
        .filter_map(|p| Some((p.name().clone(), p.description()?.to_string())))
        .collect();
    pojos
        .into_iter()
        .map(|pojo| {
            described.iter().fold(pojo, |pojo, (name, description)| {
                pojo.add_object_type_description(name, description)
            })
        })
        .collect()
}

fn dangling_references(pojos: &[Pojo], exclusion: &ExclusionFilter) -> Vec<Warning> {
    let defined: HashSet<String> = pojos.iter().map(|p| p.name().key()).collect();
    let mut warnings = Vec::new();
    for pojo in pojos {
        let mut reported = HashSet::new();
        for reference in pojo.referenced_names() {
            if defined.contains(&reference.key())
                || exclusion.is_excluded(reference.name().as_str())
                || !reported.insert(reference.key())
            {
                continue;
            }
            warnings.push(Warning::DanglingReference {
                pojo: pojo.name().to_string(),
                reference: reference.to_string(),
            });
        }
    }
    warnings
}

fn apply_name_mappings(pojos: Vec<Pojo>, mappings: &[NameMapping]) -> Vec<Pojo> {
    if mappings.is_empty() {
        return pojos;
    }
    let rename = |name: &PojoName| {
        let renamed = mappings.iter().fold(name.clone(), |n, m| {
            n.replace_constant(&m.constant, &m.replacement)
        });
        (renamed != *name).then_some(renamed)
    };
    pojos.iter().map(|pojo| pojo.map_names(&rename)).collect()
}
