use crate::merge::{DocumentMerger, MergeError};
use lopdf::{dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Object types rebuilt for the merged document rather than copied
const STRUCTURE_TYPES: [&[u8]; 4] = [b"Catalog", b"Pages", b"Outlines", b"Outline"];

/// Page tree nodes deeper than this are treated as malformed
const MAX_TREE_DEPTH: usize = 32;

/// lopdf-backed merger
///
/// Every input is renumbered into a shared object space, its pages are
/// re-parented under a single new page tree, and the result is compressed
/// and serialized. Outlines and the inputs' own catalogs are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfMerger;

impl LopdfMerger {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentMerger for LopdfMerger {
    fn merge(&self, inputs: &[Vec<u8>]) -> Result<Vec<u8>, MergeError> {
        if inputs.is_empty() {
            return Err(MergeError::EmptyInput);
        }

        let mut max_id = 1;
        let mut page_ids: Vec<ObjectId> = Vec::new();
        let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

        for (index, bytes) in inputs.iter().enumerate() {
            let mut doc = Document::load_mem(bytes).map_err(|e| MergeError::Load {
                index,
                message: e.to_string(),
            })?;

            doc.renumber_objects_with(max_id);
            max_id = doc.max_id + 1;

            let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
            for &page_id in &pages {
                let inherited = inherited_attributes(&doc, page_id);
                if let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id) {
                    for (key, value) in inherited {
                        page.set(key.to_vec(), value);
                    }
                }
            }
            page_ids.extend(pages);

            objects.extend(
                doc.objects
                    .into_iter()
                    .filter(|(_, object)| !is_document_structure(object)),
            );
        }

        if page_ids.is_empty() {
            return Err(MergeError::NoPages);
        }

        let mut merged = Document::with_version("1.5");
        merged.objects = objects;
        merged.max_id = max_id;

        let pages_id = merged.new_object_id();
        for &page_id in &page_ids {
            if let Ok(Object::Dictionary(page)) = merged.get_object_mut(page_id) {
                page.set("Parent", pages_id);
            }
        }

        let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
        merged.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_ids.len() as i64,
            }),
        );

        let catalog_id = merged.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        merged.trailer.set("Root", catalog_id);

        merged.prune_objects();
        merged.renumber_objects();
        merged.compress();

        let mut out = Vec::new();
        merged
            .save_to(&mut out)
            .map_err(|e| MergeError::Save(e.to_string()))?;

        tracing::debug!(
            "Merged {} documents into {} pages ({} bytes)",
            inputs.len(),
            page_ids.len(),
            out.len()
        );
        Ok(out)
    }
}

/// Number of pages in a PDF
pub fn page_count(bytes: &[u8]) -> Result<usize, MergeError> {
    let doc = Document::load_mem(bytes).map_err(|e| MergeError::Load {
        index: 0,
        message: e.to_string(),
    })?;
    Ok(doc.get_pages().len())
}

fn is_document_structure(object: &Object) -> bool {
    object
        .as_dict()
        .ok()
        .and_then(|dict| dict.get(b"Type").ok())
        .and_then(|t| t.as_name().ok())
        .is_some_and(|name| STRUCTURE_TYPES.iter().any(|t| *t == name))
}

/// Attributes the page does not set itself but inherits from the page tree
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(&'static [u8], Object)> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };

    let mut missing: Vec<&'static [u8]> = INHERITABLE
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();
    let mut found = Vec::new();

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(node_id) = parent {
        if missing.is_empty() || depth >= MAX_TREE_DEPTH {
            break;
        }
        let Ok(node) = doc.get_dictionary(node_id) else {
            break;
        };

        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });

        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    found
}
