//! Shared constants for page layout and overlay rendering

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f64 = 72.0 / 25.4;

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f64) -> f64 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f64) -> f64 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f64 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f64 = 792.0;

// =============================================================================
// Region Sizes
// =============================================================================

/// Smallest crop box, as a fraction of the page
pub const MIN_CROP_SIZE: f64 = 0.1;

/// Smallest redaction box, as a fraction of the page
pub const MIN_REDACTION_SIZE: f64 = 0.005;

/// Largest tile grid a single page may hold
pub const MAX_TILES: usize = 10_000;

/// Tolerance used when checking normalized bounds
pub const NORMALIZED_EPSILON: f64 = 1e-9;

// =============================================================================
// Text
// =============================================================================

/// Default font size for page numbers (points)
pub const PAGE_NUMBER_FONT_SIZE: f64 = 10.0;

/// Default distance between page numbers and the page edge (points)
pub const PAGE_NUMBER_MARGIN: f64 = 20.0;

/// Default font size for watermark text (points)
pub const WATERMARK_FONT_SIZE: f64 = 48.0;

/// Approximate character width ratio for Helvetica
pub const HELVETICA_CHAR_WIDTH_RATIO: f64 = 0.5;

/// Estimated width of `text` set in Helvetica at `font_size`
pub fn estimate_text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * HELVETICA_CHAR_WIDTH_RATIO
}

// =============================================================================
// Resource Names
// =============================================================================

/// Font resource name used by overlays
pub const OVERLAY_FONT_NAME: &str = "PdftF1";

/// Prefix for overlay graphics-state resource names
pub const OVERLAY_GSTATE_PREFIX: &str = "PdftGS";

/// XObject name used when a page is redrawn onto a new sheet
pub const PAGE_XOBJECT_NAME: &str = "PdftP0";
