//! Geometry for placing content on PDF pages
//!
//! - Coordinate mapping between normalized visual space and PDF points
//! - Interactive region selection (move / corner resize / draw)
//! - Page composition (contain fit, tiling, anchored placement)

mod fit;
mod mapper;
mod region;
mod types;

pub use fit::*;
pub use mapper::*;
pub use region::*;
pub use types::*;
