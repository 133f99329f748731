//! Drawing overlays on top of existing page content
//!
//! Covers redaction fills, text watermarks and page numbers. Original
//! content is left untouched: the page's `Contents` becomes
//! `[q, original..., Q + overlays]` so the overlays start from a clean
//! graphics state.

use super::page::{media_box, num, page_ids, page_resources, resource_category};
use super::xobject::content_stream_ids;
use crate::constants::{OVERLAY_FONT_NAME, OVERLAY_GSTATE_PREFIX, estimate_text_width};
use crate::geometry::{Composition, FitPolicy, PageGeometry, PdfRect, compute_fit};
use crate::options::{PageNumberOptions, RedactOptions, WatermarkLayout, WatermarkOptions};
use crate::plan::{PlacementItem, PlacementSet};
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// What gets drawn inside a placement
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// Opaque filled rectangle
    Fill(Rgb),
    /// Single line of Helvetica, baseline at the placement origin
    Text {
        text: String,
        font_size: f64,
        color: Rgb,
        opacity: f64,
    },
}

/// A placement together with its paint
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub item: PlacementItem,
    pub paint: Paint,
}

// =============================================================================
// Overlay Builders
// =============================================================================

/// Redaction boxes for `options`, spread to every page if requested.
///
/// Boxes are opaque fills painted over the page. The text and images
/// underneath stay in the content stream and can still be extracted.
pub fn redaction_overlays(doc: &Document, options: &RedactOptions) -> Result<Vec<Overlay>> {
    options.validate()?;
    let geometries = super::page::page_geometries(doc);

    let mut set = PlacementSet::new();
    for region in &options.regions {
        let geometry = geometries
            .get(region.page_index)
            .ok_or(PlanningError::PageOutOfRange {
                index: region.page_index,
                page_count: geometries.len(),
            })?;
        let id = set.add_normalized(region.page_index, &region.rect, geometry, 0.0);
        if options.spread_to_all_pages {
            set.spread_to_all_pages(id, geometries.len())?;
        }
    }

    Ok(set
        .drain()
        .into_iter()
        .map(|item| Overlay {
            item,
            paint: Paint::Fill(options.color),
        })
        .collect())
}

/// Text stamps for a watermark, one or a tiled grid per selected page
pub fn watermark_overlays(doc: &Document, options: &WatermarkOptions) -> Result<Vec<Overlay>> {
    options.validate()?;
    let geometries = super::page::page_geometries(doc);
    options.pages.check_bounds(geometries.len())?;

    let stamp = PageGeometry {
        width_pt: estimate_text_width(&options.text, options.font_size),
        height_pt: options.font_size,
    };
    let policy = match options.layout {
        WatermarkLayout::Single { anchor, margin_pt } => FitPolicy::Anchor { anchor, margin_pt },
        WatermarkLayout::Tiled { gap_pt } => FitPolicy::Tile {
            gap_pt,
            rotation_deg: options.rotation_deg,
        },
    };

    let mut set = PlacementSet::new();
    for (page_index, geometry) in geometries.iter().enumerate() {
        if !options.pages.includes(page_index) {
            continue;
        }
        match compute_fit(&stamp, geometry, &policy)? {
            Composition::Placed(fit) => {
                let rect = fit.drawn_rect(&stamp);
                let (x, y) = rotation_origin(&rect, options.rotation_deg);
                set.add(
                    page_index,
                    PdfRect::new(x, y, rect.width_pt, rect.height_pt),
                    options.rotation_deg,
                );
            }
            Composition::Tiled(grid) => {
                for (x, y) in grid.positions() {
                    set.add(
                        page_index,
                        PdfRect::new(x, y, stamp.width_pt, stamp.height_pt),
                        grid.rotation_deg,
                    );
                }
            }
        }
    }

    log::debug!("watermark: {} stamps", set.len());
    let paint = Paint::Text {
        text: options.text.clone(),
        font_size: options.font_size,
        color: options.color,
        opacity: options.opacity,
    };
    Ok(set
        .drain()
        .into_iter()
        .map(|item| Overlay {
            item,
            paint: paint.clone(),
        })
        .collect())
}

/// Page number labels
pub fn page_number_overlays(doc: &Document, options: &PageNumberOptions) -> Result<Vec<Overlay>> {
    options.validate()?;
    let geometries = super::page::page_geometries(doc);
    let first = usize::from(options.skip_first);
    let numbered = geometries.len().saturating_sub(first);
    let total = options.start_number + numbered.saturating_sub(1);

    let policy = FitPolicy::Anchor {
        anchor: options.anchor,
        margin_pt: options.margin_pt,
    };

    let mut set = PlacementSet::new();
    let mut labels = Vec::with_capacity(numbered);
    for (page_index, geometry) in geometries.iter().enumerate().skip(first) {
        let number = options.start_number + (page_index - first);
        let text = options.format.render(number, total);
        let label = PageGeometry {
            width_pt: estimate_text_width(&text, options.font_size),
            height_pt: options.font_size,
        };
        if let Composition::Placed(fit) = compute_fit(&label, geometry, &policy)? {
            set.add(page_index, fit.drawn_rect(&label), 0.0);
            labels.push(text);
        }
    }

    Ok(set
        .drain()
        .into_iter()
        .zip(labels)
        .map(|(item, text)| Overlay {
            item,
            paint: Paint::Text {
                text,
                font_size: options.font_size,
                color: options.color,
                opacity: 1.0,
            },
        })
        .collect())
}

/// Origin that rotates `rect` about its own center by `rotation_deg`
fn rotation_origin(rect: &PdfRect, rotation_deg: f64) -> (f64, f64) {
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    let half_w = rect.width_pt / 2.0;
    let half_h = rect.height_pt / 2.0;
    let cx = rect.x_pt + half_w;
    let cy = rect.y_pt + half_h;
    (
        cx - (half_w * cos - half_h * sin),
        cy - (half_w * sin + half_h * cos),
    )
}

// =============================================================================
// Rendering
// =============================================================================

/// Draw `overlays` onto their pages; returns the number of pages touched.
///
/// Placement coordinates are relative to the page's MediaBox origin.
pub fn apply_overlays(doc: &mut Document, overlays: &[Overlay]) -> Result<usize> {
    let ids = page_ids(doc);
    if let Some(bad) = overlays.iter().find(|o| o.item.page_index >= ids.len()) {
        return Err(PlanningError::PageOutOfRange {
            index: bad.item.page_index,
            page_count: ids.len(),
        }
        .into());
    }

    let font_id = overlays
        .iter()
        .any(|o| matches!(o.paint, Paint::Text { .. }))
        .then(|| add_helvetica(doc));

    let mut touched = 0;
    for (page_index, &page_id) in ids.iter().enumerate() {
        let on_page: Vec<&Overlay> = overlays
            .iter()
            .filter(|o| o.item.page_index == page_index)
            .collect();
        if on_page.is_empty() {
            continue;
        }

        let media = media_box(doc, page_id);
        let mut opacities: Vec<u32> = Vec::new();
        let mut ops = String::new();
        for overlay in on_page {
            let item = &overlay.item;
            let placed = item.rect().translated(media.x_pt, media.y_pt);
            ops.push_str(&paint_ops(&overlay.paint, &placed, item.rotation_deg, &mut opacities));
        }

        wrap_page_contents(doc, page_id, &ops)?;
        add_overlay_resources(doc, page_id, font_id, &opacities)?;
        touched += 1;
    }

    log::debug!("drew {} overlays on {} pages", overlays.len(), touched);
    Ok(touched)
}

/// Content stream operators for one overlay
fn paint_ops(paint: &Paint, rect: &PdfRect, rotation_deg: f64, opacities: &mut Vec<u32>) -> String {
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    let matrix = format!(
        "{} {} {} {} {} {} cm",
        num(cos),
        num(sin),
        num(-sin),
        num(cos),
        num(rect.x_pt),
        num(rect.y_pt)
    );

    match paint {
        Paint::Fill(color) => format!(
            "q {} {} {} rg {} 0 0 {} {} re f Q\n",
            num(color.r),
            num(color.g),
            num(color.b),
            matrix,
            num(rect.width_pt),
            num(rect.height_pt)
        ),
        Paint::Text {
            text,
            font_size,
            color,
            opacity,
        } => {
            let gstate = if *opacity < 1.0 {
                format!("/{} gs ", gstate_name(opacity_key(*opacity, opacities)))
            } else {
                String::new()
            };
            format!(
                "q {}{} {} {} rg {} BT /{} {} Tf 0 0 Td ({}) Tj ET Q\n",
                gstate,
                num(color.r),
                num(color.g),
                num(color.b),
                matrix,
                OVERLAY_FONT_NAME,
                num(*font_size),
                escape_pdf_string(text)
            )
        }
    }
}

/// Opacity in thousandths, registered in `opacities` if new
fn opacity_key(opacity: f64, opacities: &mut Vec<u32>) -> u32 {
    let key = (opacity.clamp(0.0, 1.0) * 1000.0).round() as u32;
    if !opacities.contains(&key) {
        opacities.push(key);
    }
    key
}

fn gstate_name(key: u32) -> String {
    format!("{}{}", OVERLAY_GSTATE_PREFIX, key)
}

/// Escape a string for a PDF literal
fn escape_pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            // Helvetica's standard encoding has no glyphs outside ASCII
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn add_helvetica(doc: &mut Document) -> ObjectId {
    let mut font_dict = Dictionary::new();
    font_dict.set("Type", Object::Name(b"Font".to_vec()));
    font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
    font_dict.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    doc.add_object(font_dict)
}

/// Replace the page's contents with `[q, original..., Q + overlay]`
fn wrap_page_contents(doc: &mut Document, page_id: ObjectId, overlay_ops: &str) -> Result<()> {
    let existing: Vec<Object> = {
        let page = doc.get_dictionary(page_id)?;
        content_stream_ids(doc, page)
            .into_iter()
            .map(Object::Reference)
            .collect()
    };

    let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let close_id = doc.add_object(Stream::new(
        Dictionary::new(),
        format!("Q\n{}", overlay_ops).into_bytes(),
    ));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(open_id));
    contents.extend(existing);
    contents.push(Object::Reference(close_id));

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// Give the page an inline resource dictionary containing the overlay font
/// and opacity states alongside its existing resources
fn add_overlay_resources(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: Option<ObjectId>,
    opacities: &[u32],
) -> Result<()> {
    let mut resources = page_resources(doc, page_id);

    if let Some(font_id) = font_id {
        let mut fonts = resource_category(doc, &resources, b"Font");
        fonts.set(OVERLAY_FONT_NAME, Object::Reference(font_id));
        resources.set("Font", Object::Dictionary(fonts));
    }

    if !opacities.is_empty() {
        let mut gstates = resource_category(doc, &resources, b"ExtGState");
        for &key in opacities {
            let alpha = key as f32 / 1000.0;
            let mut gs = Dictionary::new();
            gs.set("Type", Object::Name(b"ExtGState".to_vec()));
            gs.set("ca", Object::Real(alpha));
            gs.set("CA", Object::Real(alpha));
            gstates.set(gstate_name(key), Object::Dictionary(gs));
        }
        resources.set("ExtGState", Object::Dictionary(gstates));
    }

    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(escape_pdf_string("a(b)c\\"), "a\\(b\\)c\\\\");
        assert_eq!(escape_pdf_string("naïve"), "na?ve");
    }

    #[test]
    fn test_rotation_origin_keeps_center() {
        let rect = PdfRect::new(100.0, 100.0, 200.0, 40.0);
        let (x, y) = rotation_origin(&rect, 90.0);
        // Rotating (x, y) + R(100, 20) must land on the center (200, 120)
        assert!((x - 20.0 - 200.0).abs() < 1e-9);
        assert!((y + 100.0 - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_opacity_keys_are_shared() {
        let mut keys = Vec::new();
        assert_eq!(opacity_key(0.3, &mut keys), 300);
        assert_eq!(opacity_key(0.3, &mut keys), 300);
        assert_eq!(keys, vec![300]);
    }
}
