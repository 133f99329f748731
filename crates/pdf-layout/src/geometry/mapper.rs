//! Conversion between normalized visual space and PDF space
//!
//! Visual y grows downward from the top of the page while PDF y grows
//! upward from the bottom, so every vertical coordinate is flipped here and
//! nowhere else.

use super::{NormalizedRect, PageGeometry, PdfRect, Point};

/// Map a normalized rectangle onto a page in PDF points.
pub fn to_pdf_rect(rect: &NormalizedRect, page: &PageGeometry) -> PdfRect {
    PdfRect {
        x_pt: rect.x() * page.width_pt,
        y_pt: page.height_pt * (1.0 - (rect.y() + rect.h())),
        width_pt: rect.w() * page.width_pt,
        height_pt: rect.h() * page.height_pt,
    }
}

/// Exact inverse of [`to_pdf_rect`].
///
/// No bounds checking is done; a PDF rectangle that sticks out of the page
/// produces a normalized rectangle outside `[0, 1]`.
pub fn to_normalized(rect: &PdfRect, page: &PageGeometry) -> NormalizedRect {
    let w = rect.width_pt / page.width_pt;
    let h = rect.height_pt / page.height_pt;
    let x = rect.x_pt / page.width_pt;
    let y = 1.0 - rect.y_pt / page.height_pt - h;
    NormalizedRect::from_parts(x, y, w, h)
}

/// Map a normalized point to PDF coordinates
pub fn to_pdf_point(point: Point, page: &PageGeometry) -> (f64, f64) {
    (
        point.x * page.width_pt,
        page.height_pt * (1.0 - point.y),
    )
}

/// Map PDF coordinates to a normalized point
pub fn to_normalized_point(x_pt: f64, y_pt: f64, page: &PageGeometry) -> Point {
    Point::new(x_pt / page.width_pt, 1.0 - y_pt / page.height_pt)
}
