//! PDF merging using lopdf.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info, warn};

use super::error::AssemblyError;
use crate::download::DownloadedAsset;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards the parent walk against cyclic page trees.
const MAX_TREE_DEPTH: usize = 64;

/// Version written when no input declares a higher one.
const BASE_PDF_VERSION: &str = "1.5";

/// A merged document held in memory.
#[derive(Debug)]
pub struct MergedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Ordinals of the assets that made it into the document.
    pub merged: Vec<usize>,
    /// Assets that were skipped, one [`AssemblyError::InvalidAsset`] each.
    pub skipped: Vec<AssemblyError>,
}

/// Merges `assets` in the order given into one document.
///
/// Assets that fail to parse or have no pages are skipped and reported in
/// [`MergedPdf::skipped`].
///
/// # Errors
///
/// Returns [`AssemblyError::Empty`] when nothing could be merged and
/// [`AssemblyError::Serialize`] when the result cannot be written out.
pub fn merge_assets(assets: &[DownloadedAsset]) -> Result<MergedPdf, AssemblyError> {
    let mut max_id = 1;
    let mut version = BASE_PDF_VERSION.to_string();
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut merged = Vec::new();
    let mut skipped = Vec::new();

    for asset in assets {
        let ordinal = asset.task.ordinal;
        let mut doc = match load_asset(asset) {
            Ok(doc) => doc,
            Err(error) => {
                warn!(ordinal, url = %asset.task.url, error = %error, "asset skipped");
                skipped.push(error);
                continue;
            }
        };

        inline_inherited_attributes(&mut doc);
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        let pages = doc.get_pages();
        debug!(ordinal, label = %asset.task.label(), pages = pages.len(), "asset loaded");
        page_ids.extend(pages.into_values());

        if doc.version > version {
            version.clone_from(&doc.version);
        }
        objects.extend(
            doc.objects
                .into_iter()
                .filter(|(_, object)| !is_tree_root(object)),
        );
        merged.push(ordinal);
    }

    if merged.is_empty() {
        return Err(AssemblyError::Empty);
    }

    let mut document = Document::with_version(version);
    document.objects.extend(objects);
    // New ids must be allocated above everything taken from the inputs.
    document.max_id = max_id - 1;

    let pages_id = document.new_object_id();
    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(page_ids.len() as i64));
    pages.set("Kids", Object::Array(kids));

    let catalog_id = document.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    document.objects.insert(pages_id, Object::Dictionary(pages));
    document.objects.insert(catalog_id, Object::Dictionary(catalog));
    document.trailer.set("Root", Object::Reference(catalog_id));

    for &page_id in &page_ids {
        if let Ok(page) = document.get_dictionary_mut(page_id) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }

    document.compress();
    let mut bytes = Vec::new();
    document
        .save_to(&mut bytes)
        .map_err(AssemblyError::Serialize)?;

    info!(
        assets = merged.len(),
        skipped = skipped.len(),
        pages = page_ids.len(),
        bytes = bytes.len(),
        "documents merged"
    );

    Ok(MergedPdf {
        bytes,
        page_count: page_ids.len(),
        merged,
        skipped,
    })
}

/// Writes `bytes` to `path` via a sibling temporary file and a rename, so a
/// failed write never leaves a truncated PDF at `path`.
///
/// # Errors
///
/// Returns [`AssemblyError::Io`] if the directory, temporary file or rename fails.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<(), AssemblyError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| AssemblyError::Io { path, source }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    let mut staging = path.as_os_str().to_owned();
    staging.push(".part");
    let staging = Path::new(&staging);

    std::fs::write(staging, bytes).map_err(io_error(staging))?;
    if let Err(source) = std::fs::rename(staging, path) {
        let _ = std::fs::remove_file(staging);
        return Err(AssemblyError::Io {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

fn load_asset(asset: &DownloadedAsset) -> Result<Document, AssemblyError> {
    let ordinal = asset.task.ordinal;
    let doc = Document::load_mem(&asset.bytes)
        .map_err(|e| AssemblyError::invalid_asset(ordinal, asset.task.label(), e))?;
    if doc.get_pages().is_empty() {
        return Err(AssemblyError::invalid_asset(
            ordinal,
            asset.task.label(),
            "document has no pages",
        ));
    }
    Ok(doc)
}

/// Copies attributes a page inherits from its page-tree ancestors onto the
/// page itself, so the page renders the same once re-parented.
fn inline_inherited_attributes(doc: &mut Document) {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    for page_id in page_ids {
        let inherited: Vec<(&[u8], Object)> = match doc.get_dictionary(page_id) {
            Ok(page) => INHERITABLE_ATTRIBUTES
                .into_iter()
                .filter(|key| !page.has(key))
                .filter_map(|key| find_inherited(doc, page, key).map(|value| (key, value)))
                .collect(),
            Err(_) => continue,
        };
        if inherited.is_empty() {
            continue;
        }
        if let Ok(page) = doc.get_dictionary_mut(page_id) {
            for (key, value) in inherited {
                page.set(key, value);
            }
        }
    }
}

fn find_inherited(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

/// Catalog and page-tree nodes of the inputs are replaced by new ones.
fn is_tree_root(object: &Object) -> bool {
    let Ok(dict) = object.as_dict() else {
        return false;
    };
    matches!(
        dict.get(b"Type").and_then(Object::as_name),
        Ok(b"Catalog" | b"Pages")
    )
}
