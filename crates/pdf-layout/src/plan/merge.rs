//! Merge order planning
//!
//! The user's ordering is taken literally: the planner validates each
//! entry and resolves its output rotation but never reorders anything.

use crate::types::PlanningError;

/// What the planner needs to know about one loaded source document
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDescriptor {
    pub name: String,
    pub page_count: usize,
    /// Existing `/Rotate` of each page; missing entries count as 0
    pub page_rotations: Vec<i32>,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, page_count: usize) -> Self {
        Self {
            name: name.into(),
            page_count,
            page_rotations: Vec::new(),
        }
    }

    pub fn with_rotations(name: impl Into<String>, page_rotations: Vec<i32>) -> Self {
        Self {
            name: name.into(),
            page_count: page_rotations.len(),
            page_rotations,
        }
    }

    pub fn base_rotation(&self, page_index: usize) -> i32 {
        self.page_rotations.get(page_index).copied().unwrap_or(0)
    }
}

/// One output page: which source page to copy and how much to rotate it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergePlanEntry {
    pub source_doc_index: usize,
    pub source_page_index: usize,
    /// Added to the page's existing rotation
    pub rotation_deg: i32,
}

impl MergePlanEntry {
    pub fn new(source_doc_index: usize, source_page_index: usize) -> Self {
        Self {
            source_doc_index,
            source_page_index,
            rotation_deg: 0,
        }
    }

    pub fn rotated(mut self, rotation_deg: i32) -> Self {
        self.rotation_deg = rotation_deg;
        self
    }

    /// Rotation of the output page given the source page's own rotation
    pub fn output_rotation(&self, base_rotation: i32) -> i32 {
        (base_rotation.rem_euclid(360) + self.rotation_deg.rem_euclid(360)) % 360
    }
}

/// A validated, fully resolved assembly plan
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan {
    entries: Vec<MergePlanEntry>,
    output_rotations: Vec<i32>,
}

impl MergePlan {
    pub fn entries(&self) -> &[MergePlanEntry] {
        &self.entries
    }

    /// Final `/Rotate` of each output page, in output order
    pub fn output_rotations(&self) -> &[i32] {
        &self.output_rotations
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries paired with their resolved output rotation
    pub fn iter(&self) -> impl Iterator<Item = (&MergePlanEntry, i32)> {
        self.entries
            .iter()
            .zip(self.output_rotations.iter().copied())
    }
}

/// Default ordering: every page of source 0 in order, then source 1, ...
pub fn initial_ordering(sources: &[SourceDescriptor]) -> Vec<MergePlanEntry> {
    sources
        .iter()
        .enumerate()
        .flat_map(|(doc, source)| (0..source.page_count).map(move |page| MergePlanEntry::new(doc, page)))
        .collect()
}

/// Validate `ordering` against the loaded sources.
///
/// Fails on the first entry that references a missing source or page, or
/// whose rotation is not a multiple of 90 degrees.
pub fn build_merge_plan(
    sources: &[SourceDescriptor],
    ordering: &[MergePlanEntry],
) -> Result<MergePlan, PlanningError> {
    if ordering.is_empty() {
        return Err(PlanningError::EmptyPlan);
    }

    let mut output_rotations = Vec::with_capacity(ordering.len());
    for entry in ordering {
        let source = sources.get(entry.source_doc_index).ok_or(
            PlanningError::SourceOutOfRange {
                index: entry.source_doc_index,
                source_count: sources.len(),
            },
        )?;
        if entry.source_page_index >= source.page_count {
            return Err(PlanningError::SourcePageOutOfRange {
                source_index: entry.source_doc_index,
                index: entry.source_page_index,
                page_count: source.page_count,
            });
        }
        if entry.rotation_deg % 90 != 0 {
            return Err(PlanningError::InvalidRotation(entry.rotation_deg));
        }
        output_rotations.push(entry.output_rotation(source.base_rotation(entry.source_page_index)));
    }

    Ok(MergePlan {
        entries: ordering.to_vec(),
        output_rotations,
    })
}
