use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::debug;

use super::schema::ref_file;
use super::spec::OpenApiSpec;
use super::{from_json, from_yaml};
use crate::error::ParseError;

/// A main document together with every document its `$ref`s point into,
/// transitively.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecificationSet {
    pub main: OpenApiSpec,
    /// File name of the main document, so references back into it count as loaded.
    pub main_document: Option<String>,
    /// Referenced documents keyed by their path relative to the main document, in load order.
    pub external: IndexMap<String, OpenApiSpec>,
}

impl SpecificationSet {
    /// Read `path` and every document reachable through its references.
    /// Document paths in references are relative to the directory of `path`.
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let main = read_document(path)?;
        let directory = path.parent().unwrap_or_else(|| Path::new(""));
        let main_document = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string);
        Self::resolve(main, main_document, |document| {
            read_document(&directory.join(document))
        })
    }

    /// Pull in referenced documents through `read` until no reference points
    /// into a document that is missing from the set.
    pub fn resolve(
        main: OpenApiSpec,
        main_document: Option<String>,
        mut read: impl FnMut(&str) -> Result<OpenApiSpec, ParseError>,
    ) -> Result<Self, ParseError> {
        let mut set = Self {
            main,
            main_document,
            external: IndexMap::new(),
        };
        loop {
            let mut missing: Vec<String> = Vec::new();
            for document in set.documents().flat_map(referenced_documents) {
                if !set.is_loaded(&document) && !missing.contains(&document) {
                    missing.push(document);
                }
            }
            if missing.is_empty() {
                return Ok(set);
            }
            for document in missing {
                debug!("loading referenced document {document}");
                let spec = read(&document).map_err(|source| ParseError::Document {
                    document: document.clone(),
                    source: Box::new(source),
                })?;
                set.external.insert(document, spec);
            }
        }
    }

    /// The main document first, then the referenced ones in load order.
    pub fn documents(&self) -> impl Iterator<Item = &OpenApiSpec> {
        std::iter::once(&self.main).chain(self.external.values())
    }

    pub fn is_loaded(&self, document: &str) -> bool {
        let document = document_key(document);
        self.main_document.as_deref() == Some(document) || self.external.contains_key(document)
    }

    pub fn schema_count(&self) -> usize {
        self.documents().map(OpenApiSpec::schema_count).sum()
    }
}

/// Read a single document, as JSON for `.json` files and YAML otherwise.
pub fn read_document(path: &Path) -> Result<OpenApiSpec, ParseError> {
    let content = fs::read_to_string(path).map_err(|source| ParseError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => from_json(&content),
        _ => from_yaml(&content),
    }
}

fn referenced_documents(spec: &OpenApiSpec) -> Vec<String> {
    spec.schemas()
        .flat_map(|(_, schema)| schema.references())
        .filter_map(ref_file)
        .map(|document| document_key(document).to_string())
        .collect()
}

fn document_key(document: &str) -> &str {
    document.trim_start_matches("./")
}
