//! PDF rendering engine.
//!
//! Rendering is split in two steps: [`plan_pages`] positions every piece of
//! text and every table rule, and [`PdfRenderEngine::render`] replays that plan
//! with `printpdf`. The plan is plain data so pagination can be tested without
//! parsing PDF output.

use std::str::FromStr;

use printpdf::{BuiltinFont, Line, Mm, PdfDocument, Point};

use super::document::ReceiptDocument;
use super::RenderError;

const PT_TO_MM: f32 = 0.3528;
/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;

const MARGIN_MM: f32 = 20.0;
const TITLE_SIZE: f32 = 20.0;
const BODY_SIZE: f32 = 10.0;
const SIGNATORY_SIZE: f32 = 14.0;
const LINE_MM: f32 = 6.0;
const ROW_MM: f32 = 7.5;
const METADATA_VALUE_OFFSET_MM: f32 = 32.0;
/// Item, Quantity, Unit Price, Total.
const COLUMN_WIDTHS_MM: [f32; 4] = [53.0, 28.0, 35.0, 35.0];
const CELL_PADDING_MM: f32 = 2.0;
/// Room the signature block and closing line need below the table.
const FOOTER_MM: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    Letter,
    A4,
}

impl PageSize {
    pub fn width_mm(&self) -> f32 {
        match self {
            Self::Letter => 215.9,
            Self::A4 => 210.0,
        }
    }

    pub fn height_mm(&self) -> f32 {
        match self {
            Self::Letter => 279.4,
            Self::A4 => 297.0,
        }
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "letter" => Ok(Self::Letter),
            "a4" => Ok(Self::A4),
            other => Err(format!("unknown page size '{}' (use letter|a4)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

/// A piece of text anchored at its baseline-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x_mm: f32,
    pub y_mm: f32,
    pub size_pt: f32,
    pub style: FontStyle,
}

/// Horizontal table rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub x1_mm: f32,
    pub x2_mm: f32,
    pub y_mm: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub texts: Vec<TextRun>,
    pub rules: Vec<Rule>,
}

impl PageLayout {
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts.iter().any(|t| t.text == needle)
    }
}

fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * PT_TO_MM * AVG_GLYPH_EM
}

/// Cut `text` so it fits in `width_mm`, marking the cut with "...".
fn fit_text(text: &str, width_mm: f32, size_pt: f32) -> String {
    let max_chars = (width_mm / (size_pt * PT_TO_MM * AVG_GLYPH_EM)).floor() as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Tracks the write position while pages are filled top to bottom.
struct Cursor {
    size: PageSize,
    pages: Vec<PageLayout>,
    y: f32,
}

impl Cursor {
    fn new(size: PageSize) -> Self {
        Self {
            size,
            pages: vec![PageLayout::default()],
            y: size.height_mm() - MARGIN_MM,
        }
    }

    fn page(&mut self) -> &mut PageLayout {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn remaining(&self) -> f32 {
        self.y - MARGIN_MM
    }

    fn new_page(&mut self) {
        self.pages.push(PageLayout::default());
        self.y = self.size.height_mm() - MARGIN_MM;
    }

    fn text(&mut self, text: impl Into<String>, x_mm: f32, size_pt: f32, style: FontStyle) {
        let y_mm = self.y;
        self.page().texts.push(TextRun {
            text: text.into(),
            x_mm,
            y_mm,
            size_pt,
            style,
        });
    }

    fn rule(&mut self, x1_mm: f32, x2_mm: f32) {
        let y_mm = self.y;
        self.page().rules.push(Rule { x1_mm, x2_mm, y_mm });
    }

    fn advance(&mut self, mm: f32) {
        self.y -= mm;
    }
}

/// Column left edges for a table centered on the page.
fn column_edges(size: PageSize) -> ([f32; 4], f32) {
    let table_width: f32 = COLUMN_WIDTHS_MM.iter().sum();
    let left = (size.width_mm() - table_width) / 2.0;
    let mut edges = [0.0; 4];
    let mut x = left;
    for (edge, width) in edges.iter_mut().zip(COLUMN_WIDTHS_MM) {
        *edge = x;
        x += width;
    }
    (edges, left + table_width)
}

fn table_row(cursor: &mut Cursor, cells: [&str; 4], style: FontStyle, size: PageSize) {
    let (edges, right) = column_edges(size);
    cursor.rule(edges[0], right);
    cursor.advance(ROW_MM - CELL_PADDING_MM);
    for ((cell, x), width) in cells.iter().zip(edges).zip(COLUMN_WIDTHS_MM) {
        if cell.is_empty() {
            continue;
        }
        let text = fit_text(cell, width - 2.0 * CELL_PADDING_MM, BODY_SIZE);
        cursor.text(text, x + CELL_PADDING_MM, BODY_SIZE, style);
    }
    cursor.advance(CELL_PADDING_MM);
}

fn close_table(cursor: &mut Cursor, size: PageSize) {
    let (edges, right) = column_edges(size);
    cursor.rule(edges[0], right);
}

/// Lay the receipt out over as many pages as the table needs.
///
/// The table header is repeated on every continuation page; the summary row
/// always shares a page with at least the header.
pub fn plan_pages(document: &ReceiptDocument, size: PageSize) -> Vec<PageLayout> {
    let mut cursor = Cursor::new(size);
    let left = MARGIN_MM;

    let title_x = (size.width_mm() - text_width_mm(&document.title, TITLE_SIZE)) / 2.0;
    cursor.advance(TITLE_SIZE * PT_TO_MM);
    cursor.text(&document.title, title_x.max(left), TITLE_SIZE, FontStyle::Bold);
    cursor.advance(10.0);

    for row in &document.metadata {
        cursor.text(format!("{}:", row.label), left, BODY_SIZE, FontStyle::Bold);
        cursor.text(
            &row.value,
            left + METADATA_VALUE_OFFSET_MM,
            BODY_SIZE,
            FontStyle::Regular,
        );
        cursor.advance(LINE_MM);
    }
    cursor.advance(LINE_MM);

    let header: [&str; 4] = [
        &document.header[0],
        &document.header[1],
        &document.header[2],
        &document.header[3],
    ];
    table_row(&mut cursor, header, FontStyle::Bold, size);

    for row in &document.rows {
        if cursor.remaining() < ROW_MM * 2.0 {
            close_table(&mut cursor, size);
            cursor.new_page();
            table_row(&mut cursor, header, FontStyle::Bold, size);
        }
        let cells = [
            row.item.as_str(),
            row.quantity.as_str(),
            row.unit_price.as_str(),
            row.total.as_str(),
        ];
        table_row(&mut cursor, cells, FontStyle::Regular, size);
    }

    if cursor.remaining() < ROW_MM * 2.0 {
        close_table(&mut cursor, size);
        cursor.new_page();
        table_row(&mut cursor, header, FontStyle::Bold, size);
    }
    let summary = ["", "", document.summary.label.as_str(), document.summary.amount.as_str()];
    table_row(&mut cursor, summary, FontStyle::Bold, size);
    close_table(&mut cursor, size);

    if cursor.remaining() < FOOTER_MM {
        cursor.new_page();
    }
    cursor.advance(12.0);
    cursor.text(&document.signature.label, left, BODY_SIZE, FontStyle::Bold);
    cursor.advance(LINE_MM + 2.0);
    cursor.text(
        &document.signature.signatory,
        left,
        SIGNATORY_SIZE,
        FontStyle::Italic,
    );
    cursor.advance(LINE_MM * 2.0);
    cursor.text(&document.closing, left, BODY_SIZE, FontStyle::Italic);

    cursor.pages
}

/// Stateless engine that turns a [`ReceiptDocument`] into PDF bytes.
pub struct PdfRenderEngine;

impl PdfRenderEngine {
    pub fn render(document: &ReceiptDocument, size: PageSize) -> Result<Vec<u8>, RenderError> {
        let pages = plan_pages(document, size);

        let (doc, first_page, first_layer) = PdfDocument::new(
            document.title.clone(),
            Mm(size.width_mm()),
            Mm(size.height_mm()),
            "Receipt",
        );

        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Pdf(format!("{:?}", e)))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Pdf(format!("{:?}", e)))?;
        let italic = doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(|e| RenderError::Pdf(format!("{:?}", e)))?;

        for (index, page) in pages.iter().enumerate() {
            let (page_index, layer_index) = if index == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(Mm(size.width_mm()), Mm(size.height_mm()), "Receipt")
            };
            let layer = doc.get_page(page_index).get_layer(layer_index);

            layer.set_outline_thickness(0.5);
            for rule in &page.rules {
                layer.add_line(Line {
                    points: vec![
                        (Point::new(Mm(rule.x1_mm), Mm(rule.y_mm)), false),
                        (Point::new(Mm(rule.x2_mm), Mm(rule.y_mm)), false),
                    ],
                    is_closed: false,
                });
            }

            for run in &page.texts {
                let font = match run.style {
                    FontStyle::Regular => &regular,
                    FontStyle::Bold => &bold,
                    FontStyle::Italic => &italic,
                };
                layer.use_text(run.text.clone(), run.size_pt, Mm(run.x_mm), Mm(run.y_mm), font);
            }
        }

        doc.save_to_bytes()
            .map_err(|e| RenderError::Pdf(format!("{:?}", e)))
    }
}
