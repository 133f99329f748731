//! PDF output built on lopdf
//!
//! Plans and fits from [`crate::plan`] and [`crate::geometry`] are turned
//! into documents here:
//! - [`assemble`] and [`extract_ranges`] copy pages between documents
//! - [`resize_pages`] redraws pages onto a new sheet size via Form XObjects
//! - [`apply_overlays`] draws fills and text over existing content

mod assemble;
mod content;
mod overlay;
mod page;
mod resize;
mod xobject;

pub use assemble::{assemble, extract_ranges};
pub use content::{blank_pages, is_blank_page};
pub use overlay::*;
pub use page::{
    describe_source, inherited_attribute, media_box, page_geometries, page_geometry, page_ids,
    page_rotation,
};
pub use resize::{crop_pages, resize_pages};
pub use xobject::{copy_object_deep, create_page_xobject};
