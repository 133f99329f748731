//! Page size changes: resize onto standard paper and crop boxes

use super::assemble::PageTreeBuilder;
use super::page::{box_array, media_box, num, page_ids, page_rotation};
use super::xobject::{create_page_xobject, seed_page_tree};
use crate::constants::PAGE_XOBJECT_NAME;
use crate::geometry::{PageGeometry, contain_center, to_pdf_rect};
use crate::options::CropOptions;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, Stream};
use std::collections::HashMap;

/// Redraw every page of `source` centered on a page of `target` size.
///
/// Pages with a quarter-turn `/Rotate` are fitted against the swapped
/// target and keep their rotation, so they display in the requested
/// orientation.
pub fn resize_pages(source: &Document, target: &PageGeometry) -> Result<Document> {
    let ids = page_ids(source);
    if ids.is_empty() {
        return Err(LayoutError::NoPages);
    }

    let mut builder = PageTreeBuilder::new();
    let pages_id = builder.pages_id;
    let mut cache = HashMap::new();
    seed_page_tree(source, pages_id, &mut cache);

    for page_id in ids {
        let media = media_box(source, page_id);
        let rotation = page_rotation(source, page_id);
        let sheet = target.displayed(rotation);
        let geometry = PageGeometry {
            width_pt: media.width_pt,
            height_pt: media.height_pt,
        };

        let fit = contain_center(&geometry, &sheet)?;
        let xobject_id = create_page_xobject(&mut builder.output, source, page_id, &mut cache)?;

        // The XObject keeps the source MediaBox origin, so shift it out first
        let tx = fit.x_pt - media.x_pt * fit.scale;
        let ty = fit.y_pt - media.y_pt * fit.scale;
        let content = format!(
            "q {s} 0 0 {s} {tx} {ty} cm /{name} Do Q\n",
            s = num(fit.scale),
            tx = num(tx),
            ty = num(ty),
            name = PAGE_XOBJECT_NAME
        );
        log::debug!(
            "page {:?}: {}x{} -> {}x{} at scale {:.4}",
            page_id,
            geometry.width_pt,
            geometry.height_pt,
            sheet.width_pt,
            sheet.height_pt,
            fit.scale
        );

        let content_id = builder
            .output
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut xobjects = Dictionary::new();
        xobjects.set(PAGE_XOBJECT_NAME, Object::Reference(xobject_id));
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(pages_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(sheet.width_pt as f32),
                Object::Real(sheet.height_pt as f32),
            ]),
        );
        page_dict.set("Resources", Object::Dictionary(resources));
        page_dict.set("Contents", Object::Reference(content_id));
        if rotation != 0 {
            page_dict.set("Rotate", Object::Integer(i64::from(rotation)));
        }

        let new_page = builder.output.add_object(page_dict);
        builder.push_page(new_page);
    }

    Ok(builder.finish())
}

/// Set the CropBox of the selected pages; returns the number of pages cropped.
///
/// The region is in the page's unrotated visual space.
pub fn crop_pages(doc: &mut Document, options: &CropOptions) -> Result<usize> {
    options.validate()?;
    let ids = page_ids(doc);
    if ids.is_empty() {
        return Err(LayoutError::NoPages);
    }
    options.pages.check_bounds(ids.len())?;

    let mut cropped = 0;
    for (index, page_id) in ids.into_iter().enumerate() {
        if !options.pages.includes(index) {
            continue;
        }
        let media = media_box(doc, page_id);
        let geometry = PageGeometry {
            width_pt: media.width_pt,
            height_pt: media.height_pt,
        };
        let crop = to_pdf_rect(&options.rect, &geometry).translated(media.x_pt, media.y_pt);

        doc.get_dictionary_mut(page_id)?
            .set("CropBox", box_array(&crop));
        cropped += 1;
    }
    Ok(cropped)
}
