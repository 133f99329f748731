//! Object copying between documents and Form XObject creation
//!
//! Page content is wrapped in a Form XObject when it has to be redrawn at
//! a new position or scale on another page.

use super::page::{box_array, inherited_attribute, media_box};
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

// =============================================================================
// XObject Creation
// =============================================================================

/// Create a Form XObject from a source page.
///
/// The XObject's BBox is the page's MediaBox, so drawing it with an
/// identity matrix reproduces the page in its own user space.
pub fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let content = get_page_content(source, source.get_dictionary(page_id)?)?;
    let mut form = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Form".to_vec())),
        ("FormType", Object::Integer(1)),
        ("BBox", box_array(&media_box(source, page_id))),
    ]);
    if let Some(resources) = inherited_attribute(source, page_id, b"Resources") {
        form.set("Resources", copy_object_deep(output, source, resources, cache)?);
    }
    Ok(output.add_object(Stream::new(form, content)))
}

// =============================================================================
// Page Content
// =============================================================================

/// Ids of a page's content streams in drawing order.
///
/// `Contents` may be a single stream, an array of streams, or a reference
/// to such an array.
pub(crate) fn content_stream_ids(doc: &Document, page_dict: &Dictionary) -> Vec<ObjectId> {
    match page_dict.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => references(items),
            _ => vec![*id],
        },
        Ok(Object::Array(items)) => references(items),
        _ => Vec::new(),
    }
}

fn references(items: &[Object]) -> Vec<ObjectId> {
    items
        .iter()
        .filter_map(|obj| obj.as_reference().ok())
        .collect()
}

/// Decoded content of a page, streams joined by newlines.
///
/// A page without `Contents` yields no bytes.
pub(crate) fn get_page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    for id in content_stream_ids(doc, page_dict) {
        match doc.get_object(id).and_then(Object::as_stream) {
            Ok(stream) => {
                let bytes = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                data.extend_from_slice(&bytes);
                data.push(b'\n');
            }
            Err(e) => log::warn!("skipping content stream {:?}: {}", id, e),
        }
    }
    Ok(data)
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object from `source` into `output`, following references.
///
/// `cache` maps source ids to output ids. An id is reserved before its
/// target is copied, so reference cycles terminate.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let copied = match source.get_object(*id) {
                Ok(referenced) => copy_object_deep(output, source, referenced, cache)?,
                Err(_) => {
                    log::warn!("dangling reference {:?} replaced with null", id);
                    Object::Null
                }
            };
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => {
            let mut copied = stream.clone();
            copied.dict = copy_dictionary(output, source, &stream.dict, cache)?;
            Ok(Object::Stream(copied))
        }
        // Primitive types: just clone
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}

/// Map every page-tree node of `source` to `pages_root` in `cache`.
///
/// Stray references into the source page tree (a page's `Parent`, an
/// annotation's `P`) then resolve to the output tree instead of dragging
/// the whole source tree along.
pub(crate) fn seed_page_tree(
    source: &Document,
    pages_root: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) {
    for (id, obj) in &source.objects {
        if let Object::Dictionary(dict) = obj {
            if matches!(dict.get(b"Type").and_then(Object::as_name), Ok(name) if name == b"Pages")
            {
                cache.insert(*id, pages_root);
            }
        }
    }
}
