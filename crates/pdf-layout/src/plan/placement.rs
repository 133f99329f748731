//! Placed overlays (redaction boxes, stamps, signatures) in PDF space
//!
//! Items are identified by a stable [`PlacementId`]. Removing an item never
//! changes the id of any other item, so deletes are by identity rather than
//! by list position.

use crate::geometry::{NormalizedRect, PageGeometry, PdfRect, to_pdf_rect};
use crate::types::PlanningError;
use std::fmt;

/// Stable identifier of a placed item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacementId(u64);

impl PlacementId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PlacementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One overlay resolved to PDF space
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacementItem {
    pub id: PlacementId,
    pub page_index: usize,
    pub x_pt: f64,
    pub y_pt: f64,
    pub width_pt: f64,
    pub height_pt: f64,
    pub rotation_deg: f64,
}

impl PlacementItem {
    pub fn rect(&self) -> PdfRect {
        PdfRect::new(self.x_pt, self.y_pt, self.width_pt, self.height_pt)
    }
}

/// Copy `item` onto every other page of a `page_count`-page document.
///
/// Returns the `page_count - 1` new items in page order, each with an id
/// from `next_id` and geometry identical to `item`.
pub fn spread_to_all_pages<F>(
    item: &PlacementItem,
    page_count: usize,
    mut next_id: F,
) -> Result<Vec<PlacementItem>, PlanningError>
where
    F: FnMut() -> PlacementId,
{
    if item.page_index >= page_count {
        return Err(PlanningError::PageOutOfRange {
            index: item.page_index,
            page_count,
        });
    }

    Ok((0..page_count)
        .filter(|&page| page != item.page_index)
        .map(|page| PlacementItem {
            id: next_id(),
            page_index: page,
            ..*item
        })
        .collect())
}

fn invalid_geometry(
    item: &PlacementItem,
    x_pt: f64,
    y_pt: f64,
    width_pt: f64,
    height_pt: f64,
) -> PlanningError {
    PlanningError::InvalidPlacementGeometry {
        id: item.id,
        x_pt,
        y_pt,
        width_pt,
        height_pt,
    }
}

/// The overlays of one editing session
#[derive(Debug, Clone, Default)]
pub struct PlacementSet {
    items: Vec<PlacementItem>,
    next_id: u64,
}

impl PlacementSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> PlacementId {
        let id = PlacementId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Place an item given directly in PDF space
    pub fn add(&mut self, page_index: usize, rect: PdfRect, rotation_deg: f64) -> PlacementId {
        let id = self.allocate_id();
        self.items.push(PlacementItem {
            id,
            page_index,
            x_pt: rect.x_pt,
            y_pt: rect.y_pt,
            width_pt: rect.width_pt,
            height_pt: rect.height_pt,
            rotation_deg,
        });
        id
    }

    /// Place an item drawn in normalized visual space on a page of `page` geometry
    pub fn add_normalized(
        &mut self,
        page_index: usize,
        rect: &NormalizedRect,
        page: &PageGeometry,
        rotation_deg: f64,
    ) -> PlacementId {
        self.add(page_index, to_pdf_rect(rect, page), rotation_deg)
    }

    pub fn get(&self, id: PlacementId) -> Option<&PlacementItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn get_mut(&mut self, id: PlacementId) -> Result<&mut PlacementItem, PlanningError> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(PlanningError::UnknownPlacement(id))
    }

    /// Remove an item by identity
    pub fn remove(&mut self, id: PlacementId) -> Result<PlacementItem, PlanningError> {
        let pos = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(PlanningError::UnknownPlacement(id))?;
        Ok(self.items.remove(pos))
    }

    /// Drag an item to a new lower-left corner.
    ///
    /// Non-finite coordinates are rejected and leave the item unchanged.
    pub fn move_to(&mut self, id: PlacementId, x_pt: f64, y_pt: f64) -> Result<(), PlanningError> {
        let item = self.get_mut(id)?;
        if !(x_pt.is_finite() && y_pt.is_finite()) {
            return Err(invalid_geometry(item, x_pt, y_pt, item.width_pt, item.height_pt));
        }
        item.x_pt = x_pt;
        item.y_pt = y_pt;
        Ok(())
    }

    /// Resize an item, keeping its lower-left corner.
    ///
    /// Both dimensions must be finite and positive.
    pub fn resize(
        &mut self,
        id: PlacementId,
        width_pt: f64,
        height_pt: f64,
    ) -> Result<(), PlanningError> {
        let item = self.get_mut(id)?;
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !(valid(width_pt) && valid(height_pt)) {
            return Err(invalid_geometry(item, item.x_pt, item.y_pt, width_pt, height_pt));
        }
        item.width_pt = width_pt;
        item.height_pt = height_pt;
        Ok(())
    }

    /// Copy an item onto every other page; returns the ids of the copies
    pub fn spread_to_all_pages(
        &mut self,
        id: PlacementId,
        page_count: usize,
    ) -> Result<Vec<PlacementId>, PlanningError> {
        let item = *self.get(id).ok_or(PlanningError::UnknownPlacement(id))?;
        let mut next_id = self.next_id;
        let copies = spread_to_all_pages(&item, page_count, || {
            let id = PlacementId(next_id);
            next_id += 1;
            id
        })?;
        self.next_id = next_id;

        let ids = copies.iter().map(|copy| copy.id).collect();
        self.items.extend(copies);
        Ok(ids)
    }

    pub fn items(&self) -> &[PlacementItem] {
        &self.items
    }

    /// Items on one page, in placement order
    pub fn on_page(&self, page_index: usize) -> impl Iterator<Item = &PlacementItem> {
        self.items
            .iter()
            .filter(move |item| item.page_index == page_index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Take every item out, e.g. after a successful export
    pub fn drain(&mut self) -> Vec<PlacementItem> {
        std::mem::take(&mut self.items)
    }
}
