//! Document-level plans computed before any PDF bytes are written
//!
//! - Split plans (page-range partitions)
//! - Merge plans (validated output page order)
//! - Placement sets (overlays with stable ids)

mod merge;
mod placement;
mod split;

pub use merge::*;
pub use placement::*;
pub use split::*;
