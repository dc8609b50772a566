use std::collections::HashMap;

use log::{info, warn};

use crate::config::PojoSettings;
use crate::error::{ResolveError, TransformError, Warning};
use crate::model::{Pojo, PojoName};
use crate::parse;
use crate::parse::loader::SpecificationSet;
use crate::parse::schema::ref_file;
use crate::parse::spec::OpenApiSpec;

use super::inline_refs::finalize;
use super::name_normalizer::NameRegistry;
use super::resolver::resolve;
use super::type_mapper::{PendingSchema, TypeMapperChain};

/// The final pojo set of a run, in discovery order, with its warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct MapResult {
    pub pojos: Vec<Pojo>,
    pub warnings: Vec<Warning>,
}

/// Map every non-excluded component schema, and everything reachable from
/// it, to pojos. References into other documents are refused; use
/// [`map_specification_set`] for multi-document specifications.
pub fn map_specification(
    spec: &OpenApiSpec,
    settings: &PojoSettings,
) -> Result<MapResult, TransformError> {
    map_documents(&[spec], |_| false, settings)
}

/// Map the schemas of a main document and of every document it references,
/// in one run.
pub fn map_specification_set(
    set: &SpecificationSet,
    settings: &PojoSettings,
) -> Result<MapResult, TransformError> {
    let documents: Vec<&OpenApiSpec> = set.documents().collect();
    map_documents(&documents, |document| set.is_loaded(document), settings)
}

fn map_documents(
    documents: &[&OpenApiSpec],
    is_loaded: impl Fn(&str) -> bool,
    settings: &PojoSettings,
) -> Result<MapResult, TransformError> {
    let exclusion = settings.exclusion_filter()?;
    let chain = TypeMapperChain::standard();
    let schemas = || {
        documents
            .iter()
            .flat_map(|spec| spec.schemas())
            .filter(|(name, _)| !exclusion.is_excluded(name))
    };

    // Phase 1: Refuse references into documents outside the run
    let mut errors = Vec::new();
    for reference in schemas().flat_map(|(_, schema)| schema.references()) {
        if let Some(document) = ref_file(reference)
            && !is_loaded(document)
        {
            let error = ResolveError::UnloadedDocument {
                reference: reference.to_string(),
                document: document.to_string(),
            };
            if !errors.contains(&error) {
                errors.push(error);
            }
        }
    }

    // Phase 2: Claim root names in declaration order
    let mut names = NameRegistry::default();
    let mut declared: HashMap<String, &str> = HashMap::new();
    let mut roots = Vec::new();
    for (name, schema) in schemas() {
        let pojo_name = PojoName::of_name_and_suffix(name.as_str(), settings.suffix.clone());
        if let Some(first) = declared.get(&pojo_name.key()) {
            errors.push(ResolveError::DuplicateTypeName {
                first: first.to_string(),
                second: name.clone(),
                type_name: pojo_name.to_string(),
            });
            continue;
        }
        declared.insert(pojo_name.key(), name.as_str());
        roots.push(PendingSchema {
            name: names.claim(pojo_name),
            schema,
        });
    }
    if let Some(error) = ResolveError::from_errors(errors) {
        return Err(error.into());
    }
    let root_count = roots.len();

    // Phase 3: Discover, classify and resolve compositions
    let resolution = resolve(roots, settings, &chain, &mut names)?;

    // Phase 4: Inline plain references, attach descriptions, rename
    let (pojos, finalize_warnings) = finalize(resolution.entries, settings, &exclusion);
    let mut warnings = resolution.warnings;
    warnings.extend(finalize_warnings);

    for warning in &warnings {
        warn!("{warning}");
    }
    info!(
        "mapped {root_count} of {} schemas from {} documents to {} pojos ({} warnings)",
        documents.iter().map(|spec| spec.schema_count()).sum::<usize>(),
        documents.len(),
        pojos.len(),
        warnings.len()
    );
    Ok(MapResult { pojos, warnings })
}

/// Parse a YAML or JSON document and map it.
pub fn map_document(input: &str, settings: &PojoSettings) -> Result<MapResult, TransformError> {
    let spec = if input.trim_start().starts_with('{') {
        parse::from_json(input)?
    } else {
        parse::from_yaml(input)?
    };
    map_specification(&spec, settings)
}
