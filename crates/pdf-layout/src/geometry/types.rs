//! Geometry data types
//!
//! Two coordinate spaces meet here:
//! - normalized visual space: fractions of the rendered page box, origin top-left
//! - PDF space: points, origin bottom-left

use crate::constants::NORMALIZED_EPSILON;
use crate::types::{CompositionError, LayoutError, Orientation, PaperSize, Result};

/// A page's physical size in PDF points
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageGeometry {
    pub width_pt: f64,
    pub height_pt: f64,
}

impl PageGeometry {
    /// Create a geometry, rejecting zero, negative or non-finite sizes
    pub fn new(width_pt: f64, height_pt: f64) -> std::result::Result<Self, CompositionError> {
        let geometry = Self {
            width_pt,
            height_pt,
        };
        if geometry.is_degenerate() {
            return Err(CompositionError::DegenerateTarget);
        }
        Ok(geometry)
    }

    /// Geometry of a standard paper size
    pub fn from_paper(paper: PaperSize, orientation: Orientation) -> Self {
        let (w_mm, h_mm) = paper.dimensions_with_orientation(orientation);
        Self {
            width_pt: crate::constants::mm_to_pt(w_mm),
            height_pt: crate::constants::mm_to_pt(h_mm),
        }
    }

    /// True when either side is not a positive finite number
    pub fn is_degenerate(&self) -> bool {
        !(self.width_pt.is_finite()
            && self.height_pt.is_finite()
            && self.width_pt > 0.0
            && self.height_pt > 0.0)
    }

    /// The same page with width and height exchanged
    pub fn swapped(&self) -> Self {
        Self {
            width_pt: self.height_pt,
            height_pt: self.width_pt,
        }
    }

    /// Geometry as displayed after a `/Rotate` of `rotation_deg`
    pub fn displayed(&self, rotation_deg: i32) -> Self {
        if rotation_deg.rem_euclid(180) == 90 {
            self.swapped()
        } else {
            *self
        }
    }
}

/// A rectangle in normalized visual space (origin top-left, all values in `[0, 1]`)
///
/// Validated constructors guarantee `x + w <= 1`, `y + h <= 1` and
/// `w, h >= min_size`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalizedRect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl NormalizedRect {
    /// Create a validated rectangle
    pub fn new(x: f64, y: f64, w: f64, h: f64, min_size: f64) -> Result<Self> {
        let rect = Self { x, y, w, h };
        rect.validate(min_size)?;
        Ok(rect)
    }

    /// The whole page
    pub fn full() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            w: 1.0,
            h: 1.0,
        }
    }

    /// Build without validation. Only for values already known to be in bounds.
    pub(crate) fn from_parts(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Check the normalized-space invariants
    pub fn validate(&self, min_size: f64) -> Result<()> {
        let values = [self.x, self.y, self.w, self.h];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(LayoutError::InvalidRect(format!(
                "non-finite component in {:?}",
                self
            )));
        }
        if self.w <= 0.0 || self.h <= 0.0 {
            return Err(LayoutError::InvalidRect(format!(
                "width and height must be positive (w={}, h={})",
                self.w, self.h
            )));
        }
        if self.w < min_size - NORMALIZED_EPSILON || self.h < min_size - NORMALIZED_EPSILON {
            return Err(LayoutError::InvalidRect(format!(
                "region {}x{} is smaller than the minimum {}",
                self.w, self.h, min_size
            )));
        }
        if self.x < -NORMALIZED_EPSILON
            || self.y < -NORMALIZED_EPSILON
            || self.x + self.w > 1.0 + NORMALIZED_EPSILON
            || self.y + self.h > 1.0 + NORMALIZED_EPSILON
        {
            return Err(LayoutError::InvalidRect(format!(
                "region {:?} extends outside the page",
                self
            )));
        }
        Ok(())
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn w(&self) -> f64 {
        self.w
    }

    pub fn h(&self) -> f64 {
        self.h
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Bottom edge (visual space grows downward)
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Component-wise comparison within `tolerance`
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.w - other.w).abs() <= tolerance
            && (self.h - other.h).abs() <= tolerance
    }
}

/// A rectangle in PDF space (points, origin bottom-left)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PdfRect {
    /// X position (left edge)
    pub x_pt: f64,
    /// Y position (bottom edge)
    pub y_pt: f64,
    pub width_pt: f64,
    pub height_pt: f64,
}

impl PdfRect {
    pub fn new(x_pt: f64, y_pt: f64, width_pt: f64, height_pt: f64) -> Self {
        Self {
            x_pt,
            y_pt,
            width_pt,
            height_pt,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f64 {
        self.x_pt + self.width_pt
    }

    /// Top edge y coordinate
    pub fn top(&self) -> f64 {
        self.y_pt + self.height_pt
    }

    /// The rectangle moved by `(dx, dy)`
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x_pt + dx, self.y_pt + dy, self.width_pt, self.height_pt)
    }

    /// True when the two rectangles share a region of positive area
    pub fn intersects(&self, other: &PdfRect) -> bool {
        self.x_pt < other.right()
            && other.x_pt < self.right()
            && self.y_pt < other.top()
            && other.y_pt < self.top()
    }

    /// Whether `(x, y)` lies inside or on the boundary
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_pt && x <= self.right() && y >= self.y_pt && y <= self.top()
    }
}

/// A point in normalized visual space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Clamp both coordinates into `[0, 1]`
    pub fn clamped(&self) -> Self {
        Self::new(self.x.clamp(0.0, 1.0), self.y.clamp(0.0, 1.0))
    }
}

/// On-screen pixel box of a rendered page, as reported by the page renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Convert client pixel coordinates to normalized page space.
    ///
    /// The result is not clamped; a pointer outside the page maps outside
    /// `[0, 1]` and the region selector clamps it. A zero-sized box yields
    /// a non-finite point, which the selector ignores.
    pub fn normalize(&self, client_x: f64, client_y: f64) -> Point {
        Point::new(
            (client_x - self.left) / self.width,
            (client_y - self.top) / self.height,
        )
    }
}
