use crate::plan::PlacementId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Planning error: {0}")]
    Planning(#[from] PlanningError),
    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),
    #[error("Invalid region: {0}")]
    InvalidRect(String),
    #[error("No pages to process")]
    NoPages,
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// A split or merge plan referenced something that does not exist.
///
/// Planning calls are all-or-nothing: when one of these is returned no
/// partial plan was produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanningError {
    #[error("document has no pages")]
    EmptyDocument,
    #[error("split interval must be at least 1 (got {0})")]
    InvalidInterval(usize),
    #[error("page index {index} is out of range (document has {page_count} pages)")]
    PageOutOfRange { index: usize, page_count: usize },
    #[error("source document index {index} is out of range ({source_count} sources loaded)")]
    SourceOutOfRange { index: usize, source_count: usize },
    #[error("page index {index} is out of range for source {source_index} ({page_count} pages)")]
    SourcePageOutOfRange {
        source_index: usize,
        index: usize,
        page_count: usize,
    },
    #[error("rotation {0} is not a multiple of 90 degrees")]
    InvalidRotation(i32),
    #[error("plan contains no pages")]
    EmptyPlan,
    #[error("no placement with id {0}")]
    UnknownPlacement(PlacementId),
    #[error("placement {id} cannot be set to {x_pt}, {y_pt} ({width_pt} x {height_pt} pt)")]
    InvalidPlacementGeometry {
        id: PlacementId,
        x_pt: f64,
        y_pt: f64,
        width_pt: f64,
        height_pt: f64,
    },
}

/// Geometry that cannot be composited. Callers must not draw.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompositionError {
    #[error("source geometry has zero or invalid area")]
    DegenerateSource,
    #[error("target geometry has zero or invalid area")]
    DegenerateTarget,
    #[error("tile gap must be finite and non-negative (got {0})")]
    InvalidGap(f64),
    #[error("margin must be finite and non-negative (got {0})")]
    InvalidMargin(f64),
    #[error("tile grid needs {count} tiles, more than the limit of {limit}")]
    TooManyTiles { count: f64, limit: usize },
}

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Portrait: height > width (default for most paper sizes)
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Standard paper sizes used by the resize tool
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaperSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: f64, height_mm: f64 },
}

impl PaperSize {
    /// Get base dimensions (always portrait: width < height for standard sizes)
    pub fn dimensions_mm(self) -> (f64, f64) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Tabloid => (279.4, 431.8),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f64, f64) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w.min(h), w.max(h)),
            Orientation::Landscape => (w.max(h), w.min(h)),
        }
    }
}

/// RGB colour with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const GRAY: Rgb = Rgb::new(0.5, 0.5, 0.5);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(
            f64::from(channel(0)?) / 255.0,
            f64::from(channel(2)?) / 255.0,
            f64::from(channel(4)?) / 255.0,
        ))
    }

    pub(crate) fn is_valid(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| c.is_finite() && (0.0..=1.0).contains(c))
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}
