mod common;

use lopdf::{dictionary, Document, Object};
use medquiz_gen::error::ExtractionError;
use medquiz_gen::infrastructure::{extract_pages, PdfReader};
use medquiz_gen::PageRange;

#[test]
fn test_extracts_exactly_the_requested_pages_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("book.pdf");
    common::write_pdf(
        &pdf,
        &[
            "Page one text",
            "Page two text",
            "Page three text",
            "Page four text",
        ],
    );

    let reader = PdfReader::open(&pdf).unwrap();
    assert_eq!(reader.page_count(), 4);

    for (start, end) in [(1, 1), (1, 4), (2, 3), (4, 4)] {
        let range = PageRange::new(start, end).unwrap();
        let pages = reader.extract(range).unwrap();
        assert_eq!(pages.len(), (end - start + 1) as usize);
        let numbers: Vec<u32> = pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, (start..=end).collect::<Vec<_>>());
    }

    let pages = extract_pages(&pdf, PageRange::new(2, 3).unwrap()).unwrap();
    assert!(pages[0].text.contains("two"));
    assert!(pages[1].text.contains("three"));
}

#[test]
fn test_range_beyond_page_count_fails() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("short.pdf");
    common::write_pdf(&pdf, &["only", "two"]);

    let result = extract_pages(&pdf, PageRange::new(2, 5).unwrap());
    assert!(matches!(
        result,
        Err(ExtractionError::PageOutOfRange {
            requested: 5,
            page_count: 2
        })
    ));

    let result = extract_pages(&pdf, PageRange::new(3, 3).unwrap());
    assert!(matches!(
        result,
        Err(ExtractionError::PageOutOfRange { requested: 3, .. })
    ));
}

#[test]
fn test_corrupt_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("broken.pdf");
    std::fs::write(&pdf, b"%PDF-1.5\n garbage without xref").unwrap();

    let result = PdfReader::open(&pdf);
    assert!(matches!(result, Err(ExtractionError::ParseFailed { .. })));
}

#[test]
fn test_encrypted_document_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let plain = dir.path().join("plain.pdf");
    common::write_pdf(&plain, &["Confidential lecture notes"]);

    let mut doc = Document::load(&plain).unwrap();
    doc.trailer.set(
        "Encrypt",
        dictionary! {
            "Filter" => "Standard",
            "V" => 1,
            "R" => 2,
            "O" => Object::string_literal(vec![0u8; 32]),
            "U" => Object::string_literal(vec![0u8; 32]),
            "P" => -4,
        },
    );
    let locked = dir.path().join("locked.pdf");
    doc.save(&locked).unwrap();

    let result = PdfReader::open(&locked);
    assert!(matches!(result, Err(ExtractionError::Encrypted { .. })));
}
