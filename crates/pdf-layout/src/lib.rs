//! Page layout and document tools for PDF utilities
//!
//! The geometry and planning modules are pure and do not touch PDF bytes.
//! [`render`] and [`tools`] apply their results to lopdf documents.

pub mod constants;
pub mod geometry;
pub mod io;
mod options;
pub mod plan;
pub mod render;
pub mod tools;
mod types;

pub use io::{load_multiple_pdfs, load_pdf, save_pdf, save_split_outputs, suggested_filename};
pub use options::*;
pub use tools::{DocumentInfo, PageInfo, document_info, plan_split};
pub use types::*;
