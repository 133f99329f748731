//! Content stream inspection

use super::page::page_ids;
use super::xobject::get_page_content;
use crate::types::Result;
use lopdf::content::Content;
use lopdf::{Document, ObjectId};

/// Operators that put marks on the page
const PAINTING_OPERATORS: &[&str] = &[
    "S", "s", "f", "F", "f*", "B", "B*", "b", "b*", "sh", "Do", "Tj", "TJ", "'", "\"", "BI",
];

/// Whether a page paints nothing at all.
///
/// Content that cannot be decoded is treated as not blank.
pub fn is_blank_page(doc: &Document, page_id: ObjectId) -> Result<bool> {
    let page_dict = doc.get_dictionary(page_id)?;
    let data = get_page_content(doc, page_dict)?;
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(true);
    }

    match Content::decode(&data) {
        Ok(content) => Ok(!content
            .operations
            .iter()
            .any(|op| PAINTING_OPERATORS.contains(&op.operator.as_str()))),
        Err(e) => {
            log::warn!("could not decode content of page {:?}: {}", page_id, e);
            Ok(false)
        }
    }
}

/// 0-based indices of every blank page
pub fn blank_pages(doc: &Document) -> Result<Vec<usize>> {
    let mut blanks = Vec::new();
    for (index, page_id) in page_ids(doc).into_iter().enumerate() {
        if is_blank_page(doc, page_id)? {
            blanks.push(index);
        }
    }
    Ok(blanks)
}
