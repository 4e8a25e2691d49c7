//! Serializes laid-out pages into a PDF file with `lopdf`.
//!
//! Every page shares one resource dictionary holding a single standard Type1 font
//! (`/F1`), so text runs are plain `BT / Tf / Td / Tj / ET` sequences.

use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

use crate::render::font_metrics::FontMetricTable;
use crate::render::layout::{PageGeometry, PageLayout};
use crate::render::RenderError;

const FONT_RESOURCE: &str = "F1";

/// Values written into the document information dictionary.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub title: String,
    pub producer: String,
    pub created_at: DateTime<Utc>,
}

/// Builds the complete PDF byte stream for `pages`.
pub fn encode_document(
    pages: &[PageLayout],
    geometry: PageGeometry,
    metrics: &FontMetricTable,
    info: &DocumentInfo,
) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => metrics.base_font,
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { FONT_RESOURCE => font_id },
    });

    let media_box: Vec<Object> = vec![
        Object::Integer(0),
        Object::Integer(0),
        geometry.width.into(),
        geometry.height.into(),
    ];

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let mut operations = Vec::with_capacity(page.runs.len() * 5);
        for run in &page.runs {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![FONT_RESOURCE.into(), run.font_size.into()],
            ));
            operations.push(Operation::new("Td", vec![run.x.into(), run.y.into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_win_ansi(&run.text))],
            ));
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box.clone(),
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
        }),
    );

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_win_ansi(&info.title)),
        "Producer" => Object::string_literal(encode_win_ansi(&info.producer)),
        "CreationDate" => Object::string_literal(pdf_date(&info.created_at)),
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// PDF date string, e.g. `D:20240101120000Z`.
fn pdf_date(at: &DateTime<Utc>) -> String {
    at.format("D:%Y%m%d%H%M%SZ").to_string()
}

/// Encodes text for a WinAnsi-encoded simple font.
///
/// ASCII and Latin-1 map directly; the common typographic punctuation in 0x80..=0x9F
/// is translated; anything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' => b' ',
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::font_metrics::HELVETICA;
    use crate::render::layout::TextRun;

    fn info() -> DocumentInfo {
        DocumentInfo {
            title: "Job Application".to_string(),
            producer: "intake test".to_string(),
            created_at: DateTime::parse_from_rfc3339("2024-01-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    fn page(texts: &[&str]) -> PageLayout {
        PageLayout {
            runs: texts
                .iter()
                .enumerate()
                .map(|(i, t)| TextRun {
                    text: t.to_string(),
                    font_size: 12.0,
                    x: 72.0,
                    y: 700.0 - i as f32 * 14.0,
                })
                .collect(),
        }
    }

    fn page_texts(doc: &Document, page_id: lopdf::ObjectId) -> Vec<Vec<u8>> {
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .map(|op| op.operands[0].as_str().unwrap().to_vec())
            .collect()
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Jane"), b"Jane".to_vec());
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("a–b"), vec![b'a', 0x96, b'b']);
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
        assert_eq!(encode_win_ansi("a\tb"), b"a b".to_vec());
    }

    #[test]
    fn test_pdf_date_format() {
        assert_eq!(pdf_date(&info().created_at), "D:20240101120000Z");
    }

    #[test]
    fn test_document_round_trips_through_lopdf() {
        let bytes = encode_document(
            &[page(&["Job Application", "First Name: Jane"])],
            PageGeometry::LETTER,
            &HELVETICA,
            &info(),
        )
        .unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));

        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.values().next().unwrap();
        assert_eq!(
            page_texts(&doc, page_id),
            vec![b"Job Application".to_vec(), b"First Name: Jane".to_vec()]
        );
    }

    #[test]
    fn test_every_layout_page_becomes_a_pdf_page() {
        let bytes = encode_document(
            &[page(&["one"]), page(&["two"]), page(&["three"])],
            PageGeometry::LETTER,
            &HELVETICA,
            &info(),
        )
        .unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let texts: Vec<Vec<Vec<u8>>> = doc
            .get_pages()
            .values()
            .map(|id| page_texts(&doc, *id))
            .collect();
        assert_eq!(
            texts,
            vec![
                vec![b"one".to_vec()],
                vec![b"two".to_vec()],
                vec![b"three".to_vec()]
            ]
        );
    }

    #[test]
    fn test_info_dictionary_carries_title() {
        let bytes = encode_document(&[page(&["x"])], PageGeometry::LETTER, &HELVETICA, &info())
            .unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let info_ref = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = doc.get_dictionary(info_ref).unwrap();
        assert_eq!(
            info.get(b"Title").unwrap().as_str().unwrap(),
            b"Job Application"
        );
    }
}
