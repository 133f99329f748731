//! Building output documents from merge and split plans

use super::page::{INHERITABLE_KEYS, inherited_attribute, page_ids};
use super::xobject::{copy_object_deep, seed_page_tree};
use crate::plan::{MergePlan, MergePlanEntry, SplitPlan, build_merge_plan};
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;

/// An output document under construction: objects are added first, the
/// page tree and catalog are written by [`PageTreeBuilder::finish`].
pub(crate) struct PageTreeBuilder {
    pub(crate) output: Document,
    pub(crate) pages_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl PageTreeBuilder {
    pub(crate) fn new() -> Self {
        let mut output = Document::with_version("1.7");
        let pages_id = output.new_object_id();
        Self {
            output,
            pages_id,
            kids: Vec::new(),
        }
    }

    pub(crate) fn push_page(&mut self, page_id: ObjectId) {
        self.kids.push(page_id);
    }

    pub(crate) fn finish(mut self) -> Document {
        let count = self.kids.len();
        let kids = self.kids.into_iter().map(Object::Reference).collect();
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count as i64)),
        ]);
        self.output
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self.output.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        self.output.trailer.set("Root", catalog_id);

        self.output
    }
}

/// Copy one page into `output` under `parent_id` with the given final rotation.
///
/// Inheritable attributes are resolved from the source tree and written
/// onto the copy, since the copy's new parent does not carry them.
fn import_page(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    parent_id: ObjectId,
    rotation: i32,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let page = source.get_dictionary(page_id)?;

    // Reserved up front so references back to this page resolve to the copy
    let new_id = output.new_object_id();
    cache.insert(page_id, new_id);

    let mut dict = Dictionary::new();
    for (key, value) in page.iter() {
        if key.as_slice() == b"Parent" {
            continue;
        }
        dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    for key in INHERITABLE_KEYS {
        if !dict.has(key) {
            if let Some(value) = inherited_attribute(source, page_id, key) {
                dict.set(key.to_vec(), copy_object_deep(output, source, value, cache)?);
            }
        }
    }

    dict.set("Parent", Object::Reference(parent_id));
    if rotation == 0 {
        dict.remove(b"Rotate");
    } else {
        dict.set("Rotate", Object::Integer(i64::from(rotation)));
    }

    output.objects.insert(new_id, Object::Dictionary(dict));
    Ok(new_id)
}

/// Assemble one document from a validated merge plan.
///
/// Each source gets its own object cache, so resources shared between
/// pages of the same source are copied once.
pub fn assemble(sources: &[Document], plan: &MergePlan) -> Result<Document> {
    if plan.is_empty() {
        return Err(PlanningError::EmptyPlan.into());
    }

    let source_pages: Vec<Vec<ObjectId>> = sources.iter().map(page_ids).collect();
    let mut builder = PageTreeBuilder::new();
    let pages_id = builder.pages_id;
    let mut caches: Vec<Option<HashMap<ObjectId, ObjectId>>> = vec![None; sources.len()];

    for (entry, rotation) in plan.iter() {
        let (source, page_id) = locate(sources, &source_pages, entry)?;
        let cache = caches[entry.source_doc_index].get_or_insert_with(|| {
            let mut cache = HashMap::new();
            seed_page_tree(source, pages_id, &mut cache);
            cache
        });
        let new_page = import_page(
            &mut builder.output,
            source,
            page_id,
            pages_id,
            rotation,
            cache,
        )?;
        builder.push_page(new_page);
    }

    log::debug!(
        "assembled {} pages from {} sources",
        plan.len(),
        sources.len()
    );
    Ok(builder.finish())
}

fn locate<'a>(
    sources: &'a [Document],
    source_pages: &[Vec<ObjectId>],
    entry: &MergePlanEntry,
) -> Result<(&'a Document, ObjectId)> {
    let source = sources
        .get(entry.source_doc_index)
        .ok_or(PlanningError::SourceOutOfRange {
            index: entry.source_doc_index,
            source_count: sources.len(),
        })?;
    let pages = &source_pages[entry.source_doc_index];
    let page_id = pages
        .get(entry.source_page_index)
        .copied()
        .ok_or(PlanningError::SourcePageOutOfRange {
            source_index: entry.source_doc_index,
            index: entry.source_page_index,
            page_count: pages.len(),
        })?;
    Ok((source, page_id))
}

/// Produce one output document per range of `plan`
pub fn extract_ranges(source: &Document, plan: &SplitPlan) -> Result<Vec<Document>> {
    let descriptor = super::page::describe_source(source, "source");
    if descriptor.page_count != plan.page_count() {
        return Err(LayoutError::Config(format!(
            "split plan covers {} pages but the document has {}",
            plan.page_count(),
            descriptor.page_count
        )));
    }

    let sources = std::slice::from_ref(source);
    plan.iter()
        .map(|range| {
            let ordering: Vec<MergePlanEntry> = range
                .pages()
                .map(|page| MergePlanEntry::new(0, page))
                .collect();
            let merge_plan = build_merge_plan(std::slice::from_ref(&descriptor), &ordering)?;
            assemble(sources, &merge_plan)
        })
        .collect()
}
