//! Page attribute lookup
//!
//! `MediaBox`, `CropBox`, `Resources` and `Rotate` may be inherited from
//! any ancestor in the page tree, so lookups walk `Parent` links.

use crate::constants::{DEFAULT_PAGE_HEIGHT_PT, DEFAULT_PAGE_WIDTH_PT};
use crate::geometry::{PageGeometry, PdfRect};
use crate::plan::SourceDescriptor;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Page attributes a page may inherit from the page tree
pub(crate) const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guard against malformed, cyclic page trees
const MAX_TREE_DEPTH: usize = 64;

/// Page object ids in document order
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Follow a reference to its target; other objects are returned as-is
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Look up `key` on the page or its nearest ancestor
pub fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(value);
        }
        let parent = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Extract numeric value from a PDF object
pub(crate) fn extract_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Parse a `[x1 y1 x2 y2]` rectangle array
fn parse_box(doc: &Document, obj: &Object) -> Option<PdfRect> {
    let values = resolve(doc, obj).as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let mut nums = [0.0; 4];
    for (slot, value) in nums.iter_mut().zip(values) {
        *slot = extract_number(resolve(doc, value))?;
    }
    let [x1, y1, x2, y2] = nums;
    Some(PdfRect::new(
        x1.min(x2),
        y1.min(y2),
        (x2 - x1).abs(),
        (y2 - y1).abs(),
    ))
}

/// The page's MediaBox, defaulting to US Letter when missing or malformed
pub fn media_box(doc: &Document, page_id: ObjectId) -> PdfRect {
    inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|obj| parse_box(doc, obj))
        .unwrap_or_else(|| {
            log::warn!("page {:?} has no usable MediaBox, assuming US Letter", page_id);
            PdfRect::new(0.0, 0.0, DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT)
        })
}

/// Physical size of a page in points (unrotated MediaBox)
pub fn page_geometry(doc: &Document, page_id: ObjectId) -> PageGeometry {
    let rect = media_box(doc, page_id);
    PageGeometry {
        width_pt: rect.width_pt,
        height_pt: rect.height_pt,
    }
}

/// The page's `/Rotate`, normalized to `0..360`
pub fn page_rotation(doc: &Document, page_id: ObjectId) -> i32 {
    inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|obj| resolve(doc, obj).as_i64().ok())
        .map(|deg| (deg as i32).rem_euclid(360))
        .unwrap_or(0)
}

/// Geometry of every page, in document order
pub fn page_geometries(doc: &Document) -> Vec<PageGeometry> {
    page_ids(doc)
        .into_iter()
        .map(|id| page_geometry(doc, id))
        .collect()
}

/// Describe a loaded document for merge planning
pub fn describe_source(doc: &Document, name: impl Into<String>) -> SourceDescriptor {
    let rotations = page_ids(doc)
        .into_iter()
        .map(|id| page_rotation(doc, id))
        .collect();
    SourceDescriptor::with_rotations(name, rotations)
}

/// Build a `[x1 y1 x2 y2]` array from a rectangle
pub(crate) fn box_array(rect: &PdfRect) -> Object {
    Object::Array(vec![
        Object::Real(rect.x_pt as f32),
        Object::Real(rect.y_pt as f32),
        Object::Real(rect.right() as f32),
        Object::Real(rect.top() as f32),
    ])
}

/// Resolved, owned copy of the page's resource dictionary
pub(crate) fn page_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    inherited_attribute(doc, page_id, b"Resources")
        .and_then(|obj| resolve(doc, obj).as_dict().ok())
        .cloned()
        .unwrap_or_default()
}

/// Resolved, owned copy of a resource category such as `/Font`
pub(crate) fn resource_category(doc: &Document, resources: &Dictionary, key: &[u8]) -> Dictionary {
    resources
        .get(key)
        .ok()
        .and_then(|obj| resolve(doc, obj).as_dict().ok())
        .cloned()
        .unwrap_or_default()
}

/// Format a number for a content stream, trimming trailing zeros
pub(crate) fn num(value: f64) -> String {
    let s = format!("{:.4}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}
