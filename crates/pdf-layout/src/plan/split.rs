//! Split planning
//!
//! A split plan partitions `[0, page_count)` into ascending, contiguous
//! ranges. Each range becomes one output document.

use crate::types::PlanningError;

/// Half-open range of page indices `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn pages(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Ordered partition of a document's pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    page_count: usize,
    ranges: Vec<PageRange>,
}

impl SplitPlan {
    /// Build a plan from chunk start indices. `starts` must be strictly
    /// ascending, begin with 0 and stay below `page_count`.
    fn from_starts(page_count: usize, starts: &[usize]) -> Self {
        let ranges = starts
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let end = starts.get(i + 1).copied().unwrap_or(page_count);
                PageRange::new(start, end)
            })
            .collect();
        Self { page_count, ranges }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn ranges(&self) -> &[PageRange] {
        &self.ranges
    }

    /// Number of output documents
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageRange> {
        self.ranges.iter()
    }
}

/// Split into chunks of `interval` pages; the last chunk may be shorter.
pub fn plan_interval_split(
    page_count: usize,
    interval: usize,
) -> Result<SplitPlan, PlanningError> {
    if page_count == 0 {
        return Err(PlanningError::EmptyDocument);
    }
    if interval == 0 {
        return Err(PlanningError::InvalidInterval(interval));
    }

    let starts: Vec<usize> = (0..page_count).step_by(interval).collect();
    Ok(SplitPlan::from_starts(page_count, &starts))
}

/// Start a new chunk at every trigger page.
///
/// Triggers are deduplicated and sorted; a trigger at page 0 adds nothing
/// because the first chunk always starts there.
pub fn plan_predicate_split(
    page_count: usize,
    trigger_page_indices: &[usize],
) -> Result<SplitPlan, PlanningError> {
    if page_count == 0 {
        return Err(PlanningError::EmptyDocument);
    }
    if let Some(&index) = trigger_page_indices.iter().find(|&&i| i >= page_count) {
        return Err(PlanningError::PageOutOfRange { index, page_count });
    }

    let mut starts: Vec<usize> = trigger_page_indices
        .iter()
        .copied()
        .filter(|&i| i != 0)
        .collect();
    starts.push(0);
    starts.sort_unstable();
    starts.dedup();

    Ok(SplitPlan::from_starts(page_count, &starts))
}

/// Indices of pages for which `predicate` holds, for use as split triggers
pub fn trigger_pages_where<F>(page_count: usize, mut predicate: F) -> Vec<usize>
where
    F: FnMut(usize) -> bool,
{
    (0..page_count).filter(|&i| predicate(i)).collect()
}
