//! End-to-end slide insertion against generated decks.
//!
//! Run with: cargo test --test add_slide

use proptest::prelude::*;
use slidemaker::container::OoxmlContainer;
use slidemaker::sample::{sample_png, SampleDeck, SampleLayout};
use slidemaker::{
    add_slide, list_layouts, ContentPlacement, Error, ImageOutcome, ImageUpload, Limits,
    Presentation, SlideRequest, ValidationError,
};

fn titles(bytes: &[u8]) -> Vec<String> {
    let presentation = Presentation::from_bytes(bytes.to_vec(), u64::MAX).unwrap();
    (0..presentation.slide_count())
        .map(|i| presentation.slide(i).unwrap().title().unwrap_or_default())
        .collect()
}

#[test]
fn test_insert_in_the_middle() {
    let deck = SampleDeck::new().slides(3).build().unwrap();
    let request = SlideRequest::new("Title and Content", "Middle body")
        .with_title("Inserted")
        .at_position(1);
    let insertion = add_slide(deck, &request, &Limits::default()).unwrap();

    assert_eq!(
        titles(&insertion.bytes),
        vec!["Slide 1", "Inserted", "Slide 2", "Slide 3"]
    );
    assert_eq!(insertion.report.position.applied, 1);
}

#[test]
fn test_position_past_the_end() {
    let deck = SampleDeck::new().slides(3).build().unwrap();
    let request = SlideRequest::new("Title and Content", "Tail")
        .with_title("Last")
        .at_position(999);
    let insertion = add_slide(deck, &request, &Limits::default()).unwrap();

    assert_eq!(insertion.report.position.applied, 3);
    assert_eq!(titles(&insertion.bytes)[3], "Last");
}

#[test]
fn test_title_and_body_survive_reopen() {
    let deck = SampleDeck::new().build().unwrap();
    let request = SlideRequest::new("title and content", "Line one\nLine two & <three>")
        .with_title("Multi\nLine");
    let insertion = add_slide(deck, &request, &Limits::default()).unwrap();
    assert_eq!(
        insertion.report.layout_match,
        slidemaker::LayoutMatch::Partial
    );

    let presentation = Presentation::from_bytes(insertion.bytes, u64::MAX).unwrap();
    let slide = presentation.slide(0).unwrap();
    assert_eq!(slide.title().as_deref(), Some("Multi\nLine"));
    assert_eq!(
        slide.shape_texts(),
        vec!["Multi\nLine", "Line one\nLine two & <three>"]
    );
}

#[test]
fn test_body_text_appears_once() {
    for layout in ["Title Slide", "Title and Content", "Section Header", "Blank"] {
        let deck = SampleDeck::new().slides(1).build().unwrap();
        let request = SlideRequest::new(layout, "Unique body text");
        let insertion = add_slide(deck, &request, &Limits::default()).unwrap();

        let presentation = Presentation::from_bytes(insertion.bytes, u64::MAX).unwrap();
        let slide = presentation.slide(0).unwrap();
        let hits = slide
            .shape_texts()
            .iter()
            .filter(|text| text.contains("Unique body text"))
            .count();
        assert_eq!(hits, 1, "layout {}", layout);
    }
}

#[test]
fn test_title_slide_uses_text_box() {
    // Subtitles never take body text.
    let deck = SampleDeck::new().build().unwrap();
    let insertion = add_slide(
        deck,
        &SlideRequest::new("Title Slide", "Body"),
        &Limits::default(),
    )
    .unwrap();
    assert!(matches!(
        insertion.report.content,
        ContentPlacement::TextBox { .. }
    ));
}

#[test]
fn test_master_without_layouts() {
    let deck = SampleDeck::new().layouts(Vec::new()).build().unwrap();
    let err = add_slide(deck, &SlideRequest::new("Blank", "x"), &Limits::default()).unwrap_err();
    assert_eq!(err.to_string(), "Presentation has no slide layouts");
    assert!(err.is_client_error());
}

#[test]
fn test_first_layout_fallback() {
    let layouts = vec![
        SampleLayout::new("Only Title").with_placeholder(Some("title"), 0, None),
        SampleLayout::new("Empty"),
    ];
    let deck = SampleDeck::new().layouts(layouts).build().unwrap();
    let insertion = add_slide(
        deck,
        &SlideRequest::new("Nothing like it", "x"),
        &Limits::default(),
    )
    .unwrap();
    assert_eq!(insertion.report.layout_used, "Only Title");
    assert_eq!(
        insertion.report.layout_match,
        slidemaker::LayoutMatch::FirstFallback
    );
}

#[test]
fn test_webp_is_rejected() {
    let deck = SampleDeck::new().build().unwrap();
    let request = SlideRequest::new("Blank", "x").with_image(ImageUpload {
        filename: "photo.webp".to_string(),
        data: vec![0; 32],
    });
    let err = add_slide(deck, &request, &Limits::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid image format. Allowed: png, jpg, jpeg, gif, bmp"
    );
}

#[test]
fn test_image_too_large() {
    let limits = Limits {
        max_image_bytes: 16,
        ..Limits::default()
    };
    let request = SlideRequest::new("Blank", "x").with_image(ImageUpload {
        filename: "big.png".to_string(),
        data: sample_png(32, 32).unwrap(),
    });
    let err = add_slide(SampleDeck::new().build().unwrap(), &request, &limits).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::TooLarge { what: "Image", .. })
    ));
}

#[test]
fn test_corrupt_upload() {
    let err = add_slide(
        b"PK\x03\x04 truncated".to_vec(),
        &SlideRequest::new("Blank", "x"),
        &Limits::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::CorruptPresentation(_)));
}

#[test]
fn test_package_stays_consistent() {
    let deck = SampleDeck::new().slides(2).build().unwrap();
    let original = OoxmlContainer::from_bytes(deck.clone(), u64::MAX).unwrap();
    let request = SlideRequest::new("Picture with Caption", "Caption").with_image(ImageUpload {
        filename: "chart.png".to_string(),
        data: sample_png(20, 10).unwrap(),
    });
    let first = add_slide(deck, &request, &Limits::default()).unwrap();
    let second = add_slide(first.bytes, &request, &Limits::default()).unwrap();
    assert!(matches!(second.report.image, ImageOutcome::Placeholder { .. }));

    let updated = OoxmlContainer::from_bytes(second.bytes, u64::MAX).unwrap();
    assert_eq!(
        updated.read_binary("ppt/theme/theme1.xml").unwrap(),
        original.read_binary("ppt/theme/theme1.xml").unwrap()
    );
    assert!(updated.exists("ppt/slides/slide3.xml"));
    assert!(updated.exists("ppt/slides/slide4.xml"));
    assert!(updated.exists("ppt/media/image1.png"));
    assert!(updated.exists("ppt/media/image2.png"));

    let content_types = updated.read_xml("[Content_Types].xml").unwrap();
    assert!(content_types.contains(r#"PartName="/ppt/slides/slide4.xml""#));
    assert_eq!(content_types.matches(r#"Extension="png""#).count(), 1);
}

#[test]
fn test_list_layouts_matches_master() {
    let listing = list_layouts(SampleDeck::new().slides(4).build().unwrap(), &Limits::default())
        .unwrap();
    assert_eq!(listing.total_slides, 4);
    let json = serde_json::to_value(&listing.layouts[1]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"index": 1, "name": "Title and Content", "type": "obj"})
    );
}

#[test]
fn test_save_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.pptx");
    let insertion = add_slide(
        SampleDeck::new().slides(1).build().unwrap(),
        &SlideRequest::new("Blank", "Saved"),
        &Limits::default(),
    )
    .unwrap();
    std::fs::write(&path, &insertion.bytes).unwrap();

    let reopened = Presentation::open(&path).unwrap();
    assert_eq!(reopened.slide_count(), 2);
    assert_eq!(reopened.slide(0).unwrap().shape_texts(), vec!["Saved"]);

    let mut copy = reopened.clone();
    copy.move_slide(0, 1).unwrap();
    let copy_path = dir.path().join("moved.pptx");
    copy.save(&copy_path).unwrap();
    assert_eq!(
        Presentation::open(&copy_path).unwrap().slide(0).unwrap().title().as_deref(),
        Some("Slide 1")
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_insertion_keeps_existing_order(existing in 0usize..5, position in 0usize..8) {
        let deck = SampleDeck::new().slides(existing).build().unwrap();
        let request = SlideRequest::new("Title and Content", "Body")
            .with_title("New")
            .at_position(position);
        let insertion = add_slide(deck, &request, &Limits::default()).unwrap();

        let mut expected: Vec<String> = (1..=existing).map(|n| format!("Slide {}", n)).collect();
        expected.insert(position.min(existing), "New".to_string());
        prop_assert_eq!(titles(&insertion.bytes), expected);
        prop_assert_eq!(insertion.report.total_slides, existing + 1);
    }
}
