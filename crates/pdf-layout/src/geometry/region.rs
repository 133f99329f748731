//! Interactive rectangular region selection
//!
//! A selection is driven as an explicit state machine:
//! `Idle -> Dragging { handle, anchor, origin } -> Idle`.
//!
//! Every update is computed from the rectangle and pointer captured when
//! the drag started, never from the previous update, so replaying the same
//! pointer position always yields the same rectangle.

use super::{NormalizedRect, Point};
use crate::types::{LayoutError, Result};

/// Which part of the region the pointer grabbed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    /// Translate the whole region
    Move,
    /// Top-left corner (bottom-right stays pinned)
    Nw,
    /// Top-right corner (bottom-left stays pinned)
    Ne,
    /// Bottom-left corner (top-right stays pinned)
    Sw,
    /// Bottom-right corner (top-left stays pinned)
    Se,
}

/// Drag state. `handle == None` means a new region is being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        handle: Option<Handle>,
        anchor: NormalizedRect,
        origin: Point,
    },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }
}

/// Pointer events fed to [`reduce`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent {
    Start {
        pointer: Point,
        handle: Option<Handle>,
    },
    Update {
        pointer: Point,
    },
    End,
}

/// Pure transition function for a region selection.
///
/// Returns the next state and the rectangle to display. Events that would
/// produce an invalid rectangle (non-finite pointer, an update while idle)
/// leave the rectangle untouched.
pub fn reduce(
    state: &DragState,
    rect: &NormalizedRect,
    event: DragEvent,
    min_size: f64,
) -> (DragState, NormalizedRect) {
    match (state, event) {
        (_, DragEvent::Start { pointer, handle }) => {
            if !pointer.is_finite() {
                return (*state, *rect);
            }
            let origin = if handle.is_none() {
                pointer.clamped()
            } else {
                pointer
            };
            (
                DragState::Dragging {
                    handle,
                    anchor: *rect,
                    origin,
                },
                *rect,
            )
        }
        (
            DragState::Dragging {
                handle,
                anchor,
                origin,
            },
            DragEvent::Update { pointer },
        ) => {
            if !pointer.is_finite() {
                return (*state, *rect);
            }
            let candidate = match handle {
                Some(Handle::Move) => move_rect(anchor, *origin, pointer),
                Some(corner) => resize_rect(anchor, *corner, *origin, pointer, min_size),
                None => draw_rect(*origin, pointer.clamped(), min_size),
            };
            if candidate.validate(min_size).is_ok() {
                (*state, candidate)
            } else {
                log::debug!("rejected region update {:?}", candidate);
                (*state, *rect)
            }
        }
        (DragState::Idle, DragEvent::Update { .. }) => (*state, *rect),
        (_, DragEvent::End) => (DragState::Idle, *rect),
    }
}

/// Clamp `value` to `[lo, hi]`, preferring `hi` if the range is empty
fn span(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

fn move_rect(anchor: &NormalizedRect, origin: Point, pointer: Point) -> NormalizedRect {
    let dx = pointer.x - origin.x;
    let dy = pointer.y - origin.y;
    let x = span(anchor.x() + dx, 0.0, 1.0 - anchor.w());
    let y = span(anchor.y() + dy, 0.0, 1.0 - anchor.h());
    NormalizedRect::from_parts(x, y, anchor.w(), anchor.h())
}

fn resize_rect(
    anchor: &NormalizedRect,
    corner: Handle,
    origin: Point,
    pointer: Point,
    min_size: f64,
) -> NormalizedRect {
    let dx = pointer.x - origin.x;
    let dy = pointer.y - origin.y;

    // Horizontal: east handles pin the left edge, west handles pin the right edge
    let (x, w) = match corner {
        Handle::Ne | Handle::Se => {
            let w = span(anchor.w() + dx, min_size, 1.0 - anchor.x());
            (anchor.x(), w)
        }
        _ => {
            let right = anchor.right();
            let w = span(anchor.w() - dx, min_size, right);
            (right - w, w)
        }
    };

    // Vertical: south handles pin the top edge, north handles pin the bottom edge
    let (y, h) = match corner {
        Handle::Sw | Handle::Se => {
            let h = span(anchor.h() + dy, min_size, 1.0 - anchor.y());
            (anchor.y(), h)
        }
        _ => {
            let bottom = anchor.bottom();
            let h = span(anchor.h() - dy, min_size, bottom);
            (bottom - h, h)
        }
    };

    NormalizedRect::from_parts(x, y, w, h)
}

fn draw_rect(origin: Point, pointer: Point, min_size: f64) -> NormalizedRect {
    let (x, w) = draw_axis(origin.x, pointer.x, min_size);
    let (y, h) = draw_axis(origin.y, pointer.y, min_size);
    NormalizedRect::from_parts(x, y, w, h)
}

/// One axis of a freshly drawn region, grown toward the drag direction
fn draw_axis(from: f64, to: f64, min_size: f64) -> (f64, f64) {
    let extent = span((to - from).abs(), min_size, 1.0);
    if to >= from {
        let start = if from + extent > 1.0 { 1.0 - extent } else { from };
        (start, extent)
    } else {
        ((from - extent).max(0.0), extent)
    }
}

/// Stateful wrapper around [`reduce`]
#[derive(Debug, Clone)]
pub struct RegionSelector {
    rect: NormalizedRect,
    min_size: f64,
    state: DragState,
}

impl RegionSelector {
    /// Create a selector. `min_size` must lie in `(0, 1]` and `initial` must
    /// satisfy it.
    pub fn new(initial: NormalizedRect, min_size: f64) -> Result<Self> {
        if !(min_size > 0.0 && min_size <= 1.0) {
            return Err(LayoutError::InvalidRect(format!(
                "minimum region size must be in (0, 1], got {}",
                min_size
            )));
        }
        initial.validate(min_size)?;
        Ok(Self {
            rect: initial,
            min_size,
            state: DragState::Idle,
        })
    }

    pub fn rect(&self) -> NormalizedRect {
        self.rect
    }

    pub fn min_size(&self) -> f64 {
        self.min_size
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn start_drag(&mut self, pointer: Point, handle: Option<Handle>) {
        self.apply(DragEvent::Start { pointer, handle });
    }

    pub fn update_drag(&mut self, pointer: Point) -> NormalizedRect {
        self.apply(DragEvent::Update { pointer });
        self.rect
    }

    pub fn end_drag(&mut self) {
        self.apply(DragEvent::End);
    }

    /// Start a drag whose lifetime is tied to the returned session.
    ///
    /// Dropping the session ends the drag, so an abandoned interaction can
    /// never leave the selector stuck in `Dragging`.
    pub fn begin(&mut self, pointer: Point, handle: Option<Handle>) -> DragSession<'_> {
        self.start_drag(pointer, handle);
        DragSession { selector: self }
    }

    fn apply(&mut self, event: DragEvent) {
        let (state, rect) = reduce(&self.state, &self.rect, event, self.min_size);
        self.state = state;
        self.rect = rect;
    }
}

/// A drag in progress; ends the drag when dropped
pub struct DragSession<'a> {
    selector: &'a mut RegionSelector,
}

impl DragSession<'_> {
    pub fn update(&mut self, pointer: Point) -> NormalizedRect {
        self.selector.update_drag(pointer)
    }

    pub fn rect(&self) -> NormalizedRect {
        self.selector.rect
    }

    /// End the drag and return the final rectangle
    pub fn finish(self) -> NormalizedRect {
        self.selector.rect
    }
}

impl Drop for DragSession<'_> {
    fn drop(&mut self) {
        self.selector.end_drag();
    }
}
