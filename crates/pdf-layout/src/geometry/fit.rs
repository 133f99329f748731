//! Placement of a source box onto a target page
//!
//! Three policies are supported:
//! - `ContainCenter`: uniform scale so the source fits, centered
//! - `Tile`: repeat the source over the whole page, optionally rotated
//! - `Anchor`: a single unscaled item pinned to one of nine anchor points
//!
//! All output is in PDF space (points, origin bottom-left).

use super::{PageGeometry, PdfRect};
use crate::constants::MAX_TILES;
use crate::types::CompositionError;

type FitResult<T> = std::result::Result<T, CompositionError>;

/// The nine anchor points of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    #[default]
    Center,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::MiddleLeft,
        Anchor::Center,
        Anchor::MiddleRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    /// Column in the 3x3 grid (0 = left)
    fn column(self) -> usize {
        match self {
            Anchor::TopLeft | Anchor::MiddleLeft | Anchor::BottomLeft => 0,
            Anchor::TopCenter | Anchor::Center | Anchor::BottomCenter => 1,
            Anchor::TopRight | Anchor::MiddleRight | Anchor::BottomRight => 2,
        }
    }

    /// Row in the 3x3 grid (0 = top)
    fn row(self) -> usize {
        match self {
            Anchor::TopLeft | Anchor::TopCenter | Anchor::TopRight => 0,
            Anchor::MiddleLeft | Anchor::Center | Anchor::MiddleRight => 1,
            Anchor::BottomLeft | Anchor::BottomCenter | Anchor::BottomRight => 2,
        }
    }
}

/// How a source box is composed onto a target page
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitPolicy {
    ContainCenter,
    Tile { gap_pt: f64, rotation_deg: f64 },
    Anchor { anchor: Anchor, margin_pt: f64 },
}

/// A single draw transform: translate to `(x_pt, y_pt)`, then scale uniformly
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub x_pt: f64,
    pub y_pt: f64,
    pub scale: f64,
}

impl Fit {
    /// Box covered by `source` once the transform is applied
    pub fn drawn_rect(&self, source: &PageGeometry) -> PdfRect {
        PdfRect::new(
            self.x_pt,
            self.y_pt,
            source.width_pt * self.scale,
            source.height_pt * self.scale,
        )
    }
}

/// Result of [`compute_fit`]
#[derive(Debug, Clone, PartialEq)]
pub enum Composition {
    Placed(Fit),
    Tiled(TileGrid),
}

/// Compose `source` onto `target` according to `policy`.
pub fn compute_fit(
    source: &PageGeometry,
    target: &PageGeometry,
    policy: &FitPolicy,
) -> FitResult<Composition> {
    match *policy {
        FitPolicy::ContainCenter => contain_center(source, target).map(Composition::Placed),
        FitPolicy::Anchor { anchor, margin_pt } => {
            anchor_fit(source, target, anchor, margin_pt).map(Composition::Placed)
        }
        FitPolicy::Tile {
            gap_pt,
            rotation_deg,
        } => tile(source, target, gap_pt, rotation_deg).map(Composition::Tiled),
    }
}

fn check_geometry(source: &PageGeometry, target: &PageGeometry) -> FitResult<()> {
    if source.is_degenerate() {
        return Err(CompositionError::DegenerateSource);
    }
    if target.is_degenerate() {
        return Err(CompositionError::DegenerateTarget);
    }
    Ok(())
}

/// Uniformly scale `source` to fit inside `target` and center it.
pub fn contain_center(source: &PageGeometry, target: &PageGeometry) -> FitResult<Fit> {
    check_geometry(source, target)?;

    let scale = (target.width_pt / source.width_pt).min(target.height_pt / source.height_pt);
    Ok(Fit {
        x_pt: (target.width_pt - source.width_pt * scale) / 2.0,
        y_pt: (target.height_pt - source.height_pt * scale) / 2.0,
        scale,
    })
}

/// Position an unscaled item against an anchor point, `margin_pt` in from
/// the page edges.
///
/// If the item and margin do not fit, the item is pulled back so it
/// still overlaps the page.
pub fn anchor_fit(
    item: &PageGeometry,
    target: &PageGeometry,
    anchor: Anchor,
    margin_pt: f64,
) -> FitResult<Fit> {
    check_geometry(item, target)?;
    if !margin_pt.is_finite() || margin_pt < 0.0 {
        return Err(CompositionError::InvalidMargin(margin_pt));
    }

    let free_x = target.width_pt - item.width_pt;
    let free_y = target.height_pt - item.height_pt;

    let x = match anchor.column() {
        0 => margin_pt,
        1 => free_x / 2.0,
        _ => free_x - margin_pt,
    };
    // Row 0 is the top of the page, which is the high end of PDF y
    let y = match anchor.row() {
        0 => free_y - margin_pt,
        1 => free_y / 2.0,
        _ => margin_pt,
    };

    Ok(Fit {
        x_pt: x.clamp(free_x.min(0.0), free_x.max(0.0)),
        y_pt: y.clamp(free_y.min(0.0), free_y.max(0.0)),
        scale: 1.0,
    })
}

/// A grid of repeated, individually rotated copies of an item
///
/// Tile `(i, j)` has its origin at
/// `(origin_x + i * pitch_x, origin_y + j * pitch_y)` for
/// `i in first_col..first_col + cols` and `j in first_row..first_row + rows`.
/// Each copy is rotated counter-clockwise about its own origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    pub origin_x_pt: f64,
    pub origin_y_pt: f64,
    pub pitch_x_pt: f64,
    pub pitch_y_pt: f64,
    pub first_col: i64,
    pub first_row: i64,
    pub cols: usize,
    pub rows: usize,
    pub rotation_deg: f64,
    item: PageGeometry,
    target: PageGeometry,
}

impl TileGrid {
    /// Column count of an unrotated grid starting at the origin
    pub fn naive_cols(&self) -> usize {
        ((self.target.width_pt - self.origin_x_pt) / self.pitch_x_pt).ceil() as usize
    }

    /// Row count of an unrotated grid starting at the origin
    pub fn naive_rows(&self) -> usize {
        ((self.target.height_pt - self.origin_y_pt) / self.pitch_y_pt).ceil() as usize
    }

    /// Origin of tile `(col, row)` in grid indices
    pub fn tile_origin(&self, col: i64, row: i64) -> (f64, f64) {
        (
            self.origin_x_pt + col as f64 * self.pitch_x_pt,
            self.origin_y_pt + row as f64 * self.pitch_y_pt,
        )
    }

    /// Axis-aligned bounds of the rotated item drawn at `(x, y)`
    pub fn content_bounds(&self, x: f64, y: f64) -> PdfRect {
        let (min_dx, max_dx, min_dy, max_dy) = rotated_extents(&self.item, self.rotation_deg);
        PdfRect::new(x + min_dx, y + min_dy, max_dx - min_dx, max_dy - min_dy)
    }

    /// Tile origins whose rotated content overlaps the page, row by row
    /// from the bottom.
    pub fn positions(&self) -> Vec<(f64, f64)> {
        let page = PdfRect::new(0.0, 0.0, self.target.width_pt, self.target.height_pt);
        let mut out = Vec::new();
        for row in self.first_row..self.first_row + self.rows as i64 {
            for col in self.first_col..self.first_col + self.cols as i64 {
                let (x, y) = self.tile_origin(col, row);
                if self.content_bounds(x, y).intersects(&page) {
                    out.push((x, y));
                }
            }
        }
        out
    }
}

/// Offsets `(min_dx, max_dx, min_dy, max_dy)` of the item's corners after a
/// counter-clockwise rotation about its origin
fn rotated_extents(item: &PageGeometry, rotation_deg: f64) -> (f64, f64, f64, f64) {
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    let corners = [
        (0.0, 0.0),
        (item.width_pt, 0.0),
        (0.0, item.height_pt),
        (item.width_pt, item.height_pt),
    ];
    corners.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(min_x, max_x, min_y, max_y), &(x, y)| {
            let rx = x * cos - y * sin;
            let ry = x * sin + y * cos;
            (min_x.min(rx), max_x.max(rx), min_y.min(ry), max_y.max(ry))
        },
    )
}

/// Index range `[lo, hi]` of tiles along one axis, as floats.
///
/// Covers the naive unrotated grid and every tile whose rotated content
/// can reach the page, plus one extra ring on each side. Callers bound the
/// count before converting to integers.
fn axis_range(extent: f64, origin: f64, pitch: f64, min_d: f64, max_d: f64) -> (f64, f64) {
    let naive_last = ((extent - origin) / pitch).ceil() - 1.0;
    let reach_lo = ((-max_d - origin) / pitch).floor();
    let reach_hi = ((extent - min_d - origin) / pitch).ceil();
    (reach_lo.min(0.0) - 1.0, reach_hi.max(naive_last) + 1.0)
}

/// Compute a tile grid covering `target` with copies of `item`.
///
/// Fails with [`CompositionError::TooManyTiles`] when the grid would hold
/// more than [`MAX_TILES`] tiles.
pub fn tile(
    item: &PageGeometry,
    target: &PageGeometry,
    gap_pt: f64,
    rotation_deg: f64,
) -> FitResult<TileGrid> {
    check_geometry(item, target)?;
    if !gap_pt.is_finite() || gap_pt < 0.0 {
        return Err(CompositionError::InvalidGap(gap_pt));
    }
    let rotation_deg = if rotation_deg.is_finite() {
        rotation_deg
    } else {
        0.0
    };

    let pitch_x = item.width_pt + gap_pt;
    let pitch_y = item.height_pt + gap_pt;
    let origin = -gap_pt;
    let (min_dx, max_dx, min_dy, max_dy) = rotated_extents(item, rotation_deg);

    let (col_lo, col_hi) = axis_range(target.width_pt, origin, pitch_x, min_dx, max_dx);
    let (row_lo, row_hi) = axis_range(target.height_pt, origin, pitch_y, min_dy, max_dy);
    let cols = col_hi - col_lo + 1.0;
    let rows = row_hi - row_lo + 1.0;
    let count = cols * rows;
    if !count.is_finite() || count > MAX_TILES as f64 {
        return Err(CompositionError::TooManyTiles {
            count,
            limit: MAX_TILES,
        });
    }

    Ok(TileGrid {
        origin_x_pt: origin,
        origin_y_pt: origin,
        pitch_x_pt: pitch_x,
        pitch_y_pt: pitch_y,
        first_col: col_lo as i64,
        first_row: row_lo as i64,
        cols: cols as usize,
        rows: rows as usize,
        rotation_deg,
        item: *item,
        target: *target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geom(w: f64, h: f64) -> PageGeometry {
        PageGeometry::new(w, h).unwrap()
    }

    #[test]
    fn test_rotated_extents_quarter_turn() {
        let (min_dx, max_dx, min_dy, max_dy) = rotated_extents(&geom(100.0, 20.0), 90.0);
        assert!((min_dx + 20.0).abs() < 1e-9);
        assert!(max_dx.abs() < 1e-9);
        assert!(min_dy.abs() < 1e-9);
        assert!((max_dy - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_axis_range_has_ring() {
        // Unrotated: naive grid is 0..=2 for a 300pt page with 110pt pitch
        let (lo, hi) = axis_range(300.0, -10.0, 110.0, 0.0, 100.0);
        assert!(lo <= -1.0);
        assert!(hi >= 3.0);
    }

    #[test]
    fn test_anchor_center() {
        let fit = anchor_fit(&geom(100.0, 50.0), &geom(600.0, 800.0), Anchor::Center, 10.0)
            .unwrap();
        assert_eq!(fit.x_pt, 250.0);
        assert_eq!(fit.y_pt, 375.0);
        assert_eq!(fit.scale, 1.0);
    }
}
