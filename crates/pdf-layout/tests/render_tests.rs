use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdf_layout::geometry::{Anchor, NormalizedRect, PageGeometry};
use pdf_layout::plan::{MergePlanEntry, build_merge_plan, plan_interval_split};
use pdf_layout::render::*;
use pdf_layout::*;

/// Build a document whose pages have the given content streams
fn create_pdf_with_contents(contents: &[&str]) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for content in contents {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.as_bytes().to_vec()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(contents.len() as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc
}

fn create_test_pdf(num_pages: usize) -> Document {
    create_pdf_with_contents(&vec!["0 0 m 100 100 l S"; num_pages])
}

/// Save and reload, so the output is known to be a readable PDF
fn reload(mut doc: Document) -> Document {
    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    Document::load_mem(&writer).unwrap()
}

fn page(doc: &Document, index: usize) -> ObjectId {
    page_ids(doc)[index]
}

fn page_dict(doc: &Document, index: usize) -> &Dictionary {
    doc.get_dictionary(page(doc, index)).unwrap()
}

fn number(obj: &Object) -> f64 {
    match obj {
        Object::Integer(i) => *i as f64,
        Object::Real(r) => f64::from(*r),
        other => panic!("not a number: {:?}", other),
    }
}

fn box_values(dict: &Dictionary, key: &[u8]) -> Vec<f64> {
    dict.get(key)
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(number)
        .collect()
}

fn content_text(doc: &Document, index: usize) -> String {
    String::from_utf8(doc.get_page_content(page(doc, index)).unwrap()).unwrap()
}

fn inline_resources(doc: &Document, index: usize) -> &Dictionary {
    page_dict(doc, index)
        .get(b"Resources")
        .unwrap()
        .as_dict()
        .unwrap()
}

#[test]
fn test_assemble_reorders_and_rotates() {
    let a = create_test_pdf(3);
    let b = create_test_pdf(2);
    let descriptors = [describe_source(&a, "a"), describe_source(&b, "b")];
    let ordering = [
        MergePlanEntry::new(1, 0).rotated(90),
        MergePlanEntry::new(0, 2),
        MergePlanEntry::new(0, 2),
    ];
    let plan = build_merge_plan(&descriptors, &ordering).unwrap();

    let merged = reload(assemble(&[a, b], &plan).unwrap());
    assert_eq!(merged.get_pages().len(), 3);
    assert_eq!(page_rotation(&merged, page(&merged, 0)), 90);
    assert_eq!(page_rotation(&merged, page(&merged, 1)), 0);
    assert!(!page_dict(&merged, 1).has(b"Rotate"));
    assert_eq!(box_values(page_dict(&merged, 2), b"MediaBox"), vec![0.0, 0.0, 612.0, 792.0]);
}

#[test]
fn test_assemble_adds_to_existing_rotation() {
    let mut a = create_test_pdf(1);
    let id = page(&a, 0);
    a.get_dictionary_mut(id)
        .unwrap()
        .set("Rotate", Object::Integer(270));

    let descriptors = [describe_source(&a, "a")];
    assert_eq!(descriptors[0].page_rotations, vec![270]);
    let plan = build_merge_plan(&descriptors, &[MergePlanEntry::new(0, 0).rotated(180)]).unwrap();
    let merged = assemble(&[a], &plan).unwrap();
    assert_eq!(page_rotation(&merged, page(&merged, 0)), 90);
}

#[test]
fn test_assemble_resolves_inherited_attributes() {
    let mut doc = create_test_pdf(2);
    let pages_id = page_dict(&doc, 0)
        .get(b"Parent")
        .unwrap()
        .as_reference()
        .unwrap();
    for id in page_ids(&doc) {
        doc.get_dictionary_mut(id).unwrap().remove(b"MediaBox");
    }
    let pages = doc.get_dictionary_mut(pages_id).unwrap();
    pages.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ]),
    );
    pages.set("Rotate", Object::Integer(90));

    let descriptors = [describe_source(&doc, "inherited")];
    let plan = build_merge_plan(&descriptors, &[MergePlanEntry::new(0, 1)]).unwrap();
    let merged = reload(assemble(&[doc], &plan).unwrap());

    let dict = page_dict(&merged, 0);
    assert_eq!(box_values(dict, b"MediaBox"), vec![0.0, 0.0, 612.0, 792.0]);
    assert_eq!(page_rotation(&merged, page(&merged, 0)), 90);
}

#[test]
fn test_assemble_shares_resources_within_a_source() {
    let mut doc = create_test_pdf(2);
    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Courier".to_vec())),
    ]));
    for id in page_ids(&doc) {
        let mut fonts = Dictionary::new();
        fonts.set("F1", Object::Reference(font_id));
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));
        doc.get_dictionary_mut(id)
            .unwrap()
            .set("Resources", Object::Dictionary(resources));
    }

    let descriptors = [describe_source(&doc, "fonts")];
    let plan = build_merge_plan(
        &descriptors,
        &[MergePlanEntry::new(0, 0), MergePlanEntry::new(0, 1)],
    )
    .unwrap();
    let merged = assemble(&[doc], &plan).unwrap();

    let font_ref = |index: usize| {
        inline_resources(&merged, index)
            .get(b"Font")
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"F1")
            .unwrap()
            .as_reference()
            .unwrap()
    };
    assert_eq!(font_ref(0), font_ref(1));
}

#[test]
fn test_shared_page_tree_reference_does_not_loop() {
    let mut doc = create_test_pdf(1);
    let page_id = page(&doc, 0);
    // An annotation pointing back at its page
    let annot_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Annot".to_vec())),
        ("Subtype", Object::Name(b"Text".to_vec())),
        ("P", Object::Reference(page_id)),
    ]));
    doc.get_dictionary_mut(page_id)
        .unwrap()
        .set("Annots", Object::Array(vec![Object::Reference(annot_id)]));

    let descriptors = [describe_source(&doc, "annots")];
    let plan = build_merge_plan(&descriptors, &[MergePlanEntry::new(0, 0)]).unwrap();
    let merged = reload(assemble(&[doc], &plan).unwrap());
    assert_eq!(merged.get_pages().len(), 1);
}

#[test]
fn test_extract_ranges_ten_by_three() {
    let doc = create_test_pdf(10);
    let plan = plan_interval_split(10, 3).unwrap();
    let parts = extract_ranges(&doc, &plan).unwrap();
    let counts: Vec<usize> = parts
        .into_iter()
        .map(|part| reload(part).get_pages().len())
        .collect();
    assert_eq!(counts, vec![3, 3, 3, 1]);
}

#[test]
fn test_extract_ranges_checks_page_count() {
    let doc = create_test_pdf(4);
    let plan = plan_interval_split(5, 2).unwrap();
    assert!(matches!(
        extract_ranges(&doc, &plan),
        Err(LayoutError::Config(_))
    ));
}

#[test]
fn test_resize_to_a4() {
    let doc = create_test_pdf(2);
    let target = PageGeometry::from_paper(PaperSize::A4, Orientation::Portrait);
    let resized = reload(resize_pages(&doc, &target).unwrap());
    assert_eq!(resized.get_pages().len(), 2);

    let dict = page_dict(&resized, 0);
    let media = box_values(dict, b"MediaBox");
    assert!((media[2] - target.width_pt).abs() < 0.01);
    assert!((media[3] - target.height_pt).abs() < 0.01);

    let text = content_text(&resized, 0);
    assert!(text.contains("/PdftP0 Do"), "{}", text);

    let xobject_id = inline_resources(&resized, 0)
        .get(b"XObject")
        .unwrap()
        .as_dict()
        .unwrap()
        .get(b"PdftP0")
        .unwrap()
        .as_reference()
        .unwrap();
    let xobject = resized.get_object(xobject_id).unwrap().as_stream().unwrap();
    assert_eq!(
        xobject.dict.get(b"Subtype").unwrap().as_name().unwrap(),
        b"Form"
    );
    assert_eq!(box_values(&xobject.dict, b"BBox"), vec![0.0, 0.0, 612.0, 792.0]);
}

#[test]
fn test_resize_keeps_quarter_turn_pages_upright() {
    let mut doc = create_test_pdf(1);
    let id = page(&doc, 0);
    doc.get_dictionary_mut(id)
        .unwrap()
        .set("Rotate", Object::Integer(90));

    let target = PageGeometry::from_paper(PaperSize::A4, Orientation::Portrait);
    let resized = resize_pages(&doc, &target).unwrap();
    let media = box_values(page_dict(&resized, 0), b"MediaBox");
    // Stored landscape, displayed portrait
    assert!((media[2] - target.height_pt).abs() < 0.01);
    assert!((media[3] - target.width_pt).abs() < 0.01);
    assert_eq!(page_rotation(&resized, page(&resized, 0)), 90);
}

#[test]
fn test_resize_empty_document() {
    let doc = create_test_pdf(0);
    let target = PageGeometry::from_paper(PaperSize::A4, Orientation::Portrait);
    assert!(matches!(resize_pages(&doc, &target), Err(LayoutError::NoPages)));
}

#[test]
fn test_crop_sets_crop_box() {
    let mut doc = create_test_pdf(3);
    let options = CropOptions {
        rect: NormalizedRect::new(0.0, 0.0, 0.5, 0.5, 0.1).unwrap(),
        pages: PageSelection::Pages(vec![1]),
    };
    assert_eq!(crop_pages(&mut doc, &options).unwrap(), 1);
    assert!(!page_dict(&doc, 0).has(b"CropBox"));
    assert_eq!(
        box_values(page_dict(&doc, 1), b"CropBox"),
        vec![0.0, 396.0, 306.0, 792.0]
    );
}

#[test]
fn test_crop_rejects_small_region_and_bad_pages() {
    let mut doc = create_test_pdf(2);
    let options = CropOptions {
        rect: NormalizedRect::new(0.0, 0.0, 0.05, 0.5, 0.0).unwrap(),
        pages: PageSelection::All,
    };
    assert!(crop_pages(&mut doc, &options).is_err());

    let options = CropOptions {
        rect: NormalizedRect::full(),
        pages: PageSelection::Pages(vec![2]),
    };
    assert!(matches!(
        crop_pages(&mut doc, &options),
        Err(LayoutError::Planning(PlanningError::PageOutOfRange { index: 2, .. }))
    ));
}

#[test]
fn test_redaction_draws_over_content() {
    let mut doc = create_test_pdf(2);
    let options = RedactOptions {
        regions: vec![RedactionRegion {
            page_index: 0,
            rect: NormalizedRect::new(0.0, 0.0, 0.5, 0.5, 0.0).unwrap(),
        }],
        color: Rgb::BLACK,
        spread_to_all_pages: false,
    };
    let overlays = redaction_overlays(&doc, &options).unwrap();
    assert_eq!(overlays.len(), 1);
    assert_eq!(overlays[0].item.y_pt, 396.0);

    assert_eq!(apply_overlays(&mut doc, &overlays).unwrap(), 1);
    let doc = reload(doc);

    let contents = page_dict(&doc, 0).get(b"Contents").unwrap().as_array().unwrap();
    assert_eq!(contents.len(), 3);
    let text = content_text(&doc, 0);
    assert!(text.starts_with("q\n"));
    assert!(text.contains("0 0 m 100 100 l S"));
    assert!(text.contains("0 0 0 rg 1 0 0 1 0 396 cm 0 0 306 396 re f"), "{}", text);

    // Page 2 untouched
    assert!(page_dict(&doc, 1).get(b"Contents").unwrap().as_reference().is_ok());
}

#[test]
fn test_redaction_spreads_to_all_pages() {
    let mut doc = create_test_pdf(3);
    let options = RedactOptions {
        regions: vec![RedactionRegion {
            page_index: 1,
            rect: NormalizedRect::new(0.25, 0.25, 0.5, 0.5, 0.0).unwrap(),
        }],
        color: Rgb::new(1.0, 0.0, 0.0),
        spread_to_all_pages: true,
    };
    let overlays = redaction_overlays(&doc, &options).unwrap();
    let mut pages: Vec<usize> = overlays.iter().map(|o| o.item.page_index).collect();
    pages.sort();
    assert_eq!(pages, vec![0, 1, 2]);

    assert_eq!(apply_overlays(&mut doc, &overlays).unwrap(), 3);
    for index in 0..3 {
        assert!(content_text(&doc, index).contains("1 0 0 rg"));
    }
}

#[test]
fn test_redaction_rejects_missing_page() {
    let doc = create_test_pdf(1);
    let options = RedactOptions {
        regions: vec![RedactionRegion {
            page_index: 4,
            rect: NormalizedRect::full(),
        }],
        ..Default::default()
    };
    assert!(matches!(
        redaction_overlays(&doc, &options),
        Err(LayoutError::Planning(PlanningError::PageOutOfRange { index: 4, page_count: 1 }))
    ));
}

#[test]
fn test_overlays_respect_media_box_origin() {
    let mut doc = create_test_pdf(1);
    let id = page(&doc, 0);
    doc.get_dictionary_mut(id).unwrap().set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(100),
            Object::Integer(200),
            Object::Integer(712),
            Object::Integer(992),
        ]),
    );
    let options = RedactOptions {
        regions: vec![RedactionRegion {
            page_index: 0,
            rect: NormalizedRect::new(0.0, 0.5, 0.5, 0.5, 0.0).unwrap(),
        }],
        ..Default::default()
    };
    let overlays = redaction_overlays(&doc, &options).unwrap();
    apply_overlays(&mut doc, &overlays).unwrap();
    assert!(content_text(&doc, 0).contains("1 0 0 1 100 200 cm"));
}

#[test]
fn test_watermark_adds_font_and_opacity() {
    let mut doc = create_test_pdf(2);
    let options = WatermarkOptions {
        text: "DRAFT (v2)".to_string(),
        ..Default::default()
    };
    let overlays = watermark_overlays(&doc, &options).unwrap();
    assert_eq!(overlays.len(), 2);
    apply_overlays(&mut doc, &overlays).unwrap();
    let doc = reload(doc);

    let resources = inline_resources(&doc, 0);
    let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
    assert!(fonts.has(b"PdftF1"));
    let gstate = resources
        .get(b"ExtGState")
        .unwrap()
        .as_dict()
        .unwrap()
        .get(b"PdftGS300")
        .unwrap()
        .as_dict()
        .unwrap();
    assert!((number(gstate.get(b"ca").unwrap()) - 0.3).abs() < 1e-6);

    let text = content_text(&doc, 1);
    assert!(text.contains("/PdftGS300 gs"));
    assert!(text.contains("(DRAFT \\(v2\\)) Tj"), "{}", text);
    assert!(text.contains("/PdftF1 48 Tf"));
}

#[test]
fn test_single_watermark_rotates_about_center() {
    let doc = create_test_pdf(1);
    let options = WatermarkOptions {
        text: "ABCD".to_string(),
        font_size: 50.0,
        rotation_deg: 90.0,
        ..Default::default()
    };
    let overlays = watermark_overlays(&doc, &options).unwrap();
    let item = overlays[0].item;
    // 100x50 stamp centered on (306, 396); a quarter turn moves the origin
    // to the lower right of the rotated box
    assert!((item.x_pt - 331.0).abs() < 1e-9);
    assert!((item.y_pt - 346.0).abs() < 1e-9);
    assert_eq!(item.rotation_deg, 90.0);
}

#[test]
fn test_tiled_watermark_covers_page() {
    let doc = create_test_pdf(1);
    let options = WatermarkOptions {
        text: "X".to_string(),
        font_size: 40.0,
        layout: WatermarkLayout::Tiled { gap_pt: 20.0 },
        rotation_deg: 30.0,
        pages: PageSelection::Pages(vec![0]),
        ..Default::default()
    };
    let overlays = watermark_overlays(&doc, &options).unwrap();
    assert!(overlays.len() > 50);
    assert!(overlays.iter().all(|o| o.item.rotation_deg == 30.0));
}

#[test]
fn test_tiled_watermark_with_tiny_font_is_rejected() {
    let doc = create_test_pdf(1);
    let options = WatermarkOptions {
        text: "X".to_string(),
        font_size: 0.01,
        layout: WatermarkLayout::Tiled { gap_pt: 0.0 },
        rotation_deg: 45.0,
        pages: PageSelection::All,
        ..Default::default()
    };
    assert!(matches!(
        watermark_overlays(&doc, &options),
        Err(LayoutError::Composition(CompositionError::TooManyTiles { .. }))
    ));
}

#[test]
fn test_watermark_validation() {
    let doc = create_test_pdf(1);
    let options = WatermarkOptions {
        opacity: 1.5,
        ..Default::default()
    };
    assert!(matches!(
        watermark_overlays(&doc, &options),
        Err(LayoutError::Config(_))
    ));
}

#[test]
fn test_page_numbers_skip_first() {
    let mut doc = create_test_pdf(3);
    let options = PageNumberOptions {
        format: NumberFormat::Labeled,
        skip_first: true,
        ..Default::default()
    };
    let overlays = page_number_overlays(&doc, &options).unwrap();
    assert_eq!(overlays.len(), 2);
    assert_eq!(overlays[0].item.page_index, 1);
    // Bottom center, 20pt up
    assert_eq!(overlays[0].item.y_pt, 20.0);

    apply_overlays(&mut doc, &overlays).unwrap();
    assert_eq!(content_text(&doc, 0), "0 0 m 100 100 l S");
    assert!(content_text(&doc, 1).contains("(Page 1 of 2) Tj"));
    assert!(content_text(&doc, 2).contains("(Page 2 of 2) Tj"));
}

#[test]
fn test_page_numbers_start_and_anchor() {
    let doc = create_test_pdf(2);
    let options = PageNumberOptions {
        anchor: Anchor::TopRight,
        format: NumberFormat::OfTotal,
        start_number: 5,
        ..Default::default()
    };
    let overlays = page_number_overlays(&doc, &options).unwrap();
    let texts: Vec<&str> = overlays
        .iter()
        .map(|o| match &o.paint {
            Paint::Text { text, .. } => text.as_str(),
            Paint::Fill(_) => panic!("expected text"),
        })
        .collect();
    assert_eq!(texts, vec!["5 / 6", "6 / 6"]);
    let item = overlays[0].item;
    assert_eq!(item.x_pt + item.width_pt, 592.0);
    assert_eq!(item.y_pt + item.height_pt, 772.0);
}

#[test]
fn test_apply_overlays_rejects_missing_page() {
    let mut doc = create_test_pdf(1);
    let other = create_test_pdf(3);
    let options = RedactOptions {
        regions: vec![RedactionRegion {
            page_index: 2,
            rect: NormalizedRect::full(),
        }],
        ..Default::default()
    };
    let overlays = redaction_overlays(&other, &options).unwrap();
    assert!(apply_overlays(&mut doc, &overlays).is_err());
}

#[test]
fn test_blank_page_detection() {
    let doc = create_pdf_with_contents(&[
        "0 0 m 100 100 l S",
        "q Q",
        "BT /F1 12 Tf (hi) Tj ET",
        "   \n",
        "1 0 0 rg 0 0 10 10 re f",
    ]);
    assert_eq!(blank_pages(&doc).unwrap(), vec![1, 3]);
    assert_eq!(
        plan_split(&doc, &SplitRule::AtBlankPages)
            .unwrap()
            .iter()
            .map(|r| (r.start, r.end))
            .collect::<Vec<_>>(),
        vec![(0, 1), (1, 3), (3, 5)]
    );
}

#[test]
fn test_document_info() {
    let mut doc = create_test_pdf(2);
    let id = page(&doc, 1);
    doc.get_dictionary_mut(id)
        .unwrap()
        .set("Rotate", Object::Integer(-90));
    let info = document_info(&doc).unwrap();
    assert_eq!(info.pages.len(), 2);
    assert_eq!(info.pages[0].width_pt, 612.0);
    assert_eq!(info.pages[1].rotation_deg, 270);
    assert!(matches!(document_info(&create_test_pdf(0)), Err(LayoutError::NoPages)));
}
