//! Text flow for the application document.
//!
//! Lays lines top to bottom inside the page margins, word-wrapping anything wider
//! than the text area and starting a new page when the next line would cross the
//! bottom margin. Output is pure geometry; `pdf.rs` turns it into PDF objects.

use crate::application::record::ApplicationRecord;
use crate::render::font_metrics::FontMetricTable;

pub const TITLE: &str = "Job Application";
pub const TITLE_FONT_SIZE: f32 = 16.0;
pub const BODY_FONT_SIZE: f32 = 12.0;

// ────────────────────────────────────────────────────────────────────────────
// Geometry
// ────────────────────────────────────────────────────────────────────────────

/// Page size and margins in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    /// US letter (8.5" × 11") with 1" margins on every side.
    pub const LETTER: PageGeometry = PageGeometry {
        width: 612.0,
        height: 792.0,
        margin: 72.0,
    };

    pub fn text_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// One line of text placed on a page. `(x, y)` is the baseline origin, y measured from the bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub font_size: f32,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub runs: Vec<TextRun>,
}

// ────────────────────────────────────────────────────────────────────────────
// Flow
// ────────────────────────────────────────────────────────────────────────────

pub struct TextFlow<'a> {
    geometry: PageGeometry,
    metrics: &'a FontMetricTable,
    pages: Vec<PageLayout>,
    /// Top edge of the next line box, measured from the bottom of the page.
    cursor: f32,
}

impl<'a> TextFlow<'a> {
    pub fn new(geometry: PageGeometry, metrics: &'a FontMetricTable) -> Self {
        TextFlow {
            geometry,
            metrics,
            pages: vec![PageLayout::default()],
            cursor: geometry.height - geometry.margin,
        }
    }

    /// Writes `text`, splitting on explicit newlines and wrapping to the text width.
    pub fn text(&mut self, text: &str, font_size: f32, align: Align) {
        let max_width = self.geometry.text_width();
        for paragraph in text.split('\n') {
            let paragraph = paragraph.trim_end_matches('\r');
            for line in wrap_text(paragraph, max_width, font_size, self.metrics) {
                self.place_line(line, font_size, align);
            }
        }
    }

    /// Advances the cursor by one empty line at `font_size`.
    pub fn move_down(&mut self, font_size: f32) {
        let line_height = self.metrics.line_height(font_size);
        if self.cursor - line_height < self.geometry.margin {
            self.new_page();
        } else {
            self.cursor -= line_height;
        }
    }

    pub fn finish(self) -> Vec<PageLayout> {
        self.pages
    }

    fn place_line(&mut self, text: String, font_size: f32, align: Align) {
        let line_height = self.metrics.line_height(font_size);
        if self.cursor - line_height < self.geometry.margin {
            self.new_page();
        }

        let x = match align {
            Align::Left => self.geometry.margin,
            Align::Center => {
                let width = self.metrics.measure_str(&text, font_size);
                self.geometry.margin + (self.geometry.text_width() - width).max(0.0) / 2.0
            }
        };
        let y = self.cursor - self.metrics.ascent(font_size);

        if let Some(page) = self.pages.last_mut() {
            page.runs.push(TextRun {
                text,
                font_size,
                x,
                y,
            });
        }
        self.cursor -= line_height;
    }

    fn new_page(&mut self) {
        self.pages.push(PageLayout::default());
        self.cursor = self.geometry.height - self.geometry.margin;
    }
}

/// Greedy word wrap. A word longer than the whole line is broken between characters.
/// An empty paragraph still yields one (empty) line so blank lines keep their space.
/// Text that fits on one line is returned verbatim; runs of spaces only collapse where
/// the text actually wraps.
pub fn wrap_text(
    text: &str,
    max_width: f32,
    font_size: f32,
    metrics: &FontMetricTable,
) -> Vec<String> {
    if metrics.measure_str(text, font_size) <= max_width {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let space_w = metrics.measure_str(" ", font_size);
    let mut current_w = 0.0_f32;

    for word in text.split_whitespace() {
        let word_w = metrics.measure_str(word, font_size);
        if current.is_empty() {
            if word_w <= max_width {
                current.push_str(word);
                current_w = word_w;
            } else {
                let (full, rest) = break_word(word, max_width, font_size, metrics);
                lines.extend(full);
                current_w = metrics.measure_str(&rest, font_size);
                current = rest;
            }
        } else if current_w + space_w + word_w <= max_width {
            current.push(' ');
            current.push_str(word);
            current_w += space_w + word_w;
        } else {
            lines.push(std::mem::take(&mut current));
            if word_w <= max_width {
                current.push_str(word);
                current_w = word_w;
            } else {
                let (full, rest) = break_word(word, max_width, font_size, metrics);
                lines.extend(full);
                current_w = metrics.measure_str(&rest, font_size);
                current = rest;
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Splits an over-long word into full-width chunks plus the trailing remainder.
fn break_word(
    word: &str,
    max_width: f32,
    font_size: f32,
    metrics: &FontMetricTable,
) -> (Vec<String>, String) {
    let mut full = Vec::new();
    let mut chunk = String::new();
    let mut chunk_w = 0.0_f32;

    for c in word.chars() {
        let mut buf = [0u8; 4];
        let c_w = metrics.measure_str(c.encode_utf8(&mut buf), font_size);
        if !chunk.is_empty() && chunk_w + c_w > max_width {
            full.push(std::mem::take(&mut chunk));
            chunk_w = 0.0;
        }
        chunk.push(c);
        chunk_w += c_w;
    }
    (full, chunk)
}

// ────────────────────────────────────────────────────────────────────────────
// Document composition
// ────────────────────────────────────────────────────────────────────────────

/// Lays out the application document: centered title, a blank line, the timestamp,
/// then one `Label: value` line per record field in fixed order.
pub fn compose_application(
    record: &ApplicationRecord,
    timestamp: &str,
    geometry: PageGeometry,
    metrics: &FontMetricTable,
) -> Vec<PageLayout> {
    let mut flow = TextFlow::new(geometry, metrics);

    flow.text(TITLE, TITLE_FONT_SIZE, Align::Center);
    flow.move_down(TITLE_FONT_SIZE);

    flow.text(&format!("Timestamp: {timestamp}"), BODY_FONT_SIZE, Align::Left);
    for (label, value) in record.labeled_fields() {
        flow.text(&format!("{label}: {value}"), BODY_FONT_SIZE, Align::Left);
    }

    flow.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::record::NO_FILE_SENTINEL;
    use crate::render::font_metrics::HELVETICA;

    fn jane() -> ApplicationRecord {
        ApplicationRecord {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@x.com".to_string(),
            job_role: "Engineer".to_string(),
            address: "1 Rd".to_string(),
            city: "Metropolis".to_string(),
            pincode: "00000".to_string(),
            date: "2024-01-01".to_string(),
            file_name: NO_FILE_SENTINEL.to_string(),
            file_path: NO_FILE_SENTINEL.to_string(),
        }
    }

    fn texts(pages: &[PageLayout]) -> Vec<String> {
        pages
            .iter()
            .flat_map(|p| p.runs.iter().map(|r| r.text.clone()))
            .collect()
    }

    #[test]
    fn test_wrap_short_text_is_single_line() {
        let lines = wrap_text("City: Metropolis", 468.0, 12.0, &HELVETICA);
        assert_eq!(lines, vec!["City: Metropolis".to_string()]);
    }

    #[test]
    fn test_wrap_empty_text_keeps_one_blank_line() {
        assert_eq!(wrap_text("", 468.0, 12.0, &HELVETICA), vec![String::new()]);
    }

    #[test]
    fn test_wrap_long_text_every_line_fits() {
        let text = "Address: ".to_string() + &"Long Street Name ".repeat(40);
        let lines = wrap_text(&text, 468.0, 12.0, &HELVETICA);
        assert!(lines.len() > 1, "expected wrapping, got {lines:?}");
        for line in &lines {
            assert!(HELVETICA.measure_str(line, 12.0) <= 468.0, "line too wide: {line}");
        }
        assert_eq!(lines.join(" "), text.trim_end());
    }

    #[test]
    fn test_wrap_keeps_spacing_of_a_fitting_line() {
        let text = "Address: Flat 2,   Block  B";
        assert_eq!(wrap_text(text, 468.0, 12.0, &HELVETICA), vec![text.to_string()]);
        assert_eq!(wrap_text("Email: ", 468.0, 12.0, &HELVETICA), vec!["Email: ".to_string()]);
    }

    #[test]
    fn test_wrap_breaks_overlong_word() {
        let word = "x".repeat(300);
        let lines = wrap_text(&word, 100.0, 12.0, &HELVETICA);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(HELVETICA.measure_str(line, 12.0) <= 100.0);
        }
    }

    #[test]
    fn test_compose_line_order() {
        let pages = compose_application(
            &jane(),
            "2024-01-01T00:00:00.000Z",
            PageGeometry::LETTER,
            &HELVETICA,
        );
        assert_eq!(pages.len(), 1);
        assert_eq!(
            texts(&pages),
            vec![
                "Job Application",
                "Timestamp: 2024-01-01T00:00:00.000Z",
                "First Name: Jane",
                "Last Name: Doe",
                "Email: jane@x.com",
                "Job Role: Engineer",
                "Address: 1 Rd",
                "City: Metropolis",
                "Pincode: 00000",
                "Date: 2024-01-01",
                "File Name: No file uploaded",
                "File Path: No file uploaded",
            ]
        );
    }

    #[test]
    fn test_title_is_centered_and_body_left_aligned() {
        let pages = compose_application(&jane(), "t", PageGeometry::LETTER, &HELVETICA);
        let runs = &pages[0].runs;

        let title = &runs[0];
        let title_w = HELVETICA.measure_str(TITLE, TITLE_FONT_SIZE);
        let left_gap = title.x;
        let right_gap = PageGeometry::LETTER.width - (title.x + title_w);
        assert!((left_gap - right_gap).abs() < 1e-2, "title not centered");
        assert_eq!(title.font_size, TITLE_FONT_SIZE);

        for run in &runs[1..] {
            assert_eq!(run.x, PageGeometry::LETTER.margin);
            assert_eq!(run.font_size, BODY_FONT_SIZE);
        }
    }

    #[test]
    fn test_lines_descend_and_blank_line_follows_title() {
        let pages = compose_application(&jane(), "t", PageGeometry::LETTER, &HELVETICA);
        let runs = &pages[0].runs;
        for pair in runs.windows(2) {
            assert!(pair[1].y < pair[0].y, "lines must move down the page");
        }
        // Title line + one blank title-sized line before the body starts.
        let gap = runs[0].y - runs[1].y;
        assert!(
            gap > HELVETICA.line_height(TITLE_FONT_SIZE) + HELVETICA.line_height(BODY_FONT_SIZE),
            "missing blank line after title, gap {gap}"
        );
    }

    #[test]
    fn test_multiline_value_splits_on_newlines() {
        let mut record = jane();
        record.address = "1 Rd\r\nFlat 2".to_string();
        let pages = compose_application(&record, "t", PageGeometry::LETTER, &HELVETICA);
        let all = texts(&pages);
        assert!(all.contains(&"Address: 1 Rd".to_string()));
        assert!(all.contains(&"Flat 2".to_string()));
    }

    #[test]
    fn test_compose_keeps_repeated_spaces() {
        let mut record = jane();
        record.address = "Flat 2,   Block  B".to_string();
        let pages = compose_application(&record, "t", PageGeometry::LETTER, &HELVETICA);
        assert!(
            texts(&pages).contains(&"Address: Flat 2,   Block  B".to_string()),
            "{:?}",
            texts(&pages)
        );
    }

    #[test]
    fn test_overflow_continues_on_new_page() {
        let mut record = jane();
        record.address = "Lane\n".repeat(80);
        let pages = compose_application(&record, "t", PageGeometry::LETTER, &HELVETICA);
        assert!(pages.len() > 1, "expected pagination");

        let last = pages.last().unwrap();
        assert_eq!(
            last.runs.last().map(|r| r.text.as_str()),
            Some("File Path: No file uploaded")
        );
        for page in &pages {
            for run in &page.runs {
                assert!(run.y >= PageGeometry::LETTER.margin - 1e-3, "run below margin");
            }
        }
    }
}
