//! Async entry points for each document tool
//!
//! Every tool takes ownership of its input documents and runs the lopdf
//! work on the blocking pool.

use crate::constants::pt_to_mm;
use crate::geometry::PageGeometry;
use crate::options::{
    CropOptions, PageNumberOptions, RedactOptions, ResizeOptions, SplitRule, WatermarkOptions,
};
use crate::plan::{
    MergePlanEntry, SplitPlan, build_merge_plan, initial_ordering, plan_interval_split,
    plan_predicate_split,
};
use crate::render;
use crate::types::*;
use lopdf::Document;

/// Compute the split plan for `rule` without touching the document
pub fn plan_split(doc: &Document, rule: &SplitRule) -> Result<SplitPlan> {
    let page_count = doc.get_pages().len();
    let plan = match rule {
        SplitRule::Every(interval) => plan_interval_split(page_count, *interval)?,
        SplitRule::At(triggers) => plan_predicate_split(page_count, triggers)?,
        SplitRule::AtBlankPages => {
            let blanks = render::blank_pages(doc)?;
            log::debug!("blank pages: {:?}", blanks);
            plan_predicate_split(page_count, &blanks)?
        }
    };
    Ok(plan)
}

/// Split `doc` into one document per planned range
pub async fn split(doc: Document, rule: SplitRule) -> Result<Vec<Document>> {
    let parts = tokio::task::spawn_blocking(move || {
        let plan = plan_split(&doc, &rule)?;
        render::extract_ranges(&doc, &plan)
    })
    .await??;
    log::info!("split into {} documents", parts.len());
    Ok(parts)
}

/// Merge `sources` in `ordering`, or all pages in source order when `None`
pub async fn merge(
    sources: Vec<(String, Document)>,
    ordering: Option<Vec<MergePlanEntry>>,
) -> Result<Document> {
    let merged = tokio::task::spawn_blocking(move || {
        let descriptors: Vec<_> = sources
            .iter()
            .map(|(name, doc)| render::describe_source(doc, name.as_str()))
            .collect();
        let ordering = ordering.unwrap_or_else(|| initial_ordering(&descriptors));
        let plan = build_merge_plan(&descriptors, &ordering)?;

        let documents: Vec<Document> = sources.into_iter().map(|(_, doc)| doc).collect();
        render::assemble(&documents, &plan)
    })
    .await??;
    log::info!("merged {} pages", merged.get_pages().len());
    Ok(merged)
}

/// Redraw every page onto the configured paper size
pub async fn resize(doc: Document, options: ResizeOptions) -> Result<Document> {
    options.validate()?;
    let target = PageGeometry::from_paper(options.paper, options.orientation);
    let resized = tokio::task::spawn_blocking(move || render::resize_pages(&doc, &target)).await??;
    log::info!(
        "resized {} pages to {:.1}x{:.1}pt",
        resized.get_pages().len(),
        target.width_pt,
        target.height_pt
    );
    Ok(resized)
}

pub async fn crop(mut doc: Document, options: CropOptions) -> Result<Document> {
    let doc = tokio::task::spawn_blocking(move || {
        let cropped = render::crop_pages(&mut doc, &options)?;
        log::info!("cropped {} pages", cropped);
        Ok::<_, LayoutError>(doc)
    })
    .await??;
    Ok(doc)
}

pub async fn redact(mut doc: Document, options: RedactOptions) -> Result<Document> {
    let doc = tokio::task::spawn_blocking(move || {
        let overlays = render::redaction_overlays(&doc, &options)?;
        let pages = render::apply_overlays(&mut doc, &overlays)?;
        log::info!("drew {} redaction boxes on {} pages", overlays.len(), pages);
        Ok::<_, LayoutError>(doc)
    })
    .await??;
    Ok(doc)
}

pub async fn watermark(mut doc: Document, options: WatermarkOptions) -> Result<Document> {
    let doc = tokio::task::spawn_blocking(move || {
        let overlays = render::watermark_overlays(&doc, &options)?;
        let pages = render::apply_overlays(&mut doc, &overlays)?;
        log::info!("watermarked {} pages", pages);
        Ok::<_, LayoutError>(doc)
    })
    .await??;
    Ok(doc)
}

pub async fn number_pages(mut doc: Document, options: PageNumberOptions) -> Result<Document> {
    let doc = tokio::task::spawn_blocking(move || {
        let overlays = render::page_number_overlays(&doc, &options)?;
        let pages = render::apply_overlays(&mut doc, &overlays)?;
        log::info!("numbered {} pages", pages);
        Ok::<_, LayoutError>(doc)
    })
    .await??;
    Ok(doc)
}

/// One page of a [`DocumentInfo`] report
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PageInfo {
    pub index: usize,
    pub width_pt: f64,
    pub height_pt: f64,
    pub rotation_deg: i32,
}

impl PageInfo {
    /// Page size in millimetres, width first
    pub fn size_mm(&self) -> (f64, f64) {
        (pt_to_mm(self.width_pt), pt_to_mm(self.height_pt))
    }
}

/// Per-page geometry report
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DocumentInfo {
    pub version: String,
    pub pages: Vec<PageInfo>,
}

pub fn document_info(doc: &Document) -> Result<DocumentInfo> {
    let ids = render::page_ids(doc);
    if ids.is_empty() {
        return Err(LayoutError::NoPages);
    }
    let pages = ids
        .into_iter()
        .enumerate()
        .map(|(index, id)| {
            let geometry = render::page_geometry(doc, id);
            PageInfo {
                index,
                width_pt: geometry.width_pt,
                height_pt: geometry.height_pt,
                rotation_deg: render::page_rotation(doc, id),
            }
        })
        .collect();
    Ok(DocumentInfo {
        version: doc.version.clone(),
        pages,
    })
}
