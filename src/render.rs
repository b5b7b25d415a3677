//! PDF backend – executes draw calls with `printpdf` (v0.8 ops-based API).
//!
//! Coordinates arriving through [`Backend`] are points measured from the
//! top-left corner of the page. Cells that would cross the bottom margin
//! start a new page; everything below that point shifts up by the height
//! already consumed.

use printpdf::{
    BuiltinFont, Color, Line, LinePoint, Mm, Op, PaintMode, PdfDocument, PdfPage,
    PdfSaveOptions, Point, Polygon, PolygonRing, Pt, Rgb as PdfRgb, TextItem, WindingOrder,
};

use crate::draw::{Backend, Cell};
use crate::error::HyperError;
use crate::properties::{Align, BorderSides, Rgb, Side};

const PT_TO_MM: f32 = 0.352778;

/// Gap between a cell's edge and left/right aligned text.
const CELL_MARGIN: f32 = 2.83;

/// Average glyph advance as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.5;

const LINE_WIDTH: f32 = 0.57;

/// Page geometry for a [`PdfBackend`], in points.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSetup {
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

/// [`Backend`] that accumulates printpdf ops page by page.
pub struct PdfBackend {
    setup: PageSetup,
    pages: Vec<Vec<Op>>,
    ops: Vec<Op>,
    /// Cursor y at which the current page's content area begins.
    page_start: f32,
    x: f32,
    y: f32,
    text_color: Rgb,
    draw_color: Rgb,
    fill_color: Rgb,
    font: BuiltinFont,
    font_size: f32,
}

impl PdfBackend {
    pub fn new(setup: PageSetup) -> Self {
        Self {
            x: setup.margin_left,
            y: setup.margin_top,
            setup,
            pages: Vec::new(),
            ops: Vec::new(),
            page_start: 0.0,
            text_color: Rgb::BLACK,
            draw_color: Rgb::BLACK,
            fill_color: Rgb::WHITE,
            font: BuiltinFont::Helvetica,
            font_size: 12.0,
        }
    }

    /// Number of pages including the one being drawn.
    pub fn page_count(&self) -> usize {
        self.pages.len() + 1
    }

    /// Assemble the document and serialise it.
    pub fn finish(mut self) -> Result<Vec<u8>, HyperError> {
        self.pages.push(std::mem::take(&mut self.ops));

        let page_w = Mm(self.setup.width * PT_TO_MM);
        let page_h = Mm(self.setup.height * PT_TO_MM);
        let pages: Vec<PdfPage> = self
            .pages
            .into_iter()
            .map(|ops| PdfPage::new(page_w, page_h, ops))
            .collect();
        log::debug!("writing PDF with {} page(s)", pages.len());

        let mut doc = PdfDocument::new(&self.setup.title);
        doc.with_pages(pages);
        let mut warnings = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        for warning in &warnings {
            log::warn!("printpdf: {warning:?}");
        }

        if !bytes.starts_with(b"%PDF-") {
            return Err(HyperError::Render(
                "printpdf produced output without a PDF header".to_string(),
            ));
        }
        Ok(bytes)
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.ops));
        self.page_start = self.y - self.setup.margin_top;
        log::debug!("page {} starts at y {}", self.page_count(), self.page_start);
    }

    /// Page-relative top of a cell of `height` at the cursor, breaking the
    /// page first when the cell would cross the bottom margin.
    ///
    /// A cursor above the current page (an absolute cell placed after a page
    /// break) is pinned to the top margin.
    fn page_top(&mut self, height: f32) -> f32 {
        let limit = self.setup.height - self.setup.margin_bottom;
        let mut top = self.y - self.page_start;
        if top + height > limit && top > self.setup.margin_top {
            self.new_page();
            top = self.y - self.page_start;
        }
        if top < self.setup.margin_top {
            log::debug!(
                "cell at y {} is above page {}, pinned to the top margin",
                self.y,
                self.page_count()
            );
            top = self.setup.margin_top;
        }
        top
    }

    /// PDF y coordinate (origin bottom-left) of a top-down page offset.
    fn pdf_y(&self, top: f32) -> f32 {
        self.setup.height - top
    }

    fn fill_rect(&mut self, x: f32, top: f32, w: f32, h: f32) {
        let (y1, y2) = (self.pdf_y(top + h), self.pdf_y(top));
        let corner = |x: f32, y: f32| LinePoint {
            p: Point { x: Pt(x), y: Pt(y) },
            bezier: false,
        };
        self.ops.push(Op::SetFillColor {
            col: color(self.fill_color),
        });
        self.ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: vec![
                        corner(x, y1),
                        corner(x + w, y1),
                        corner(x + w, y2),
                        corner(x, y2),
                    ],
                }],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            },
        });
    }

    fn stroke_sides(&mut self, sides: BorderSides, x: f32, top: f32, w: f32, h: f32) {
        if sides.is_empty() {
            return;
        }
        let (bottom, top) = (self.pdf_y(top + h), self.pdf_y(top));
        self.ops.push(Op::SetOutlineColor {
            col: color(self.draw_color),
        });
        self.ops.push(Op::SetOutlineThickness {
            pt: Pt(LINE_WIDTH),
        });
        for side in sides.sides() {
            let ((x1, y1), (x2, y2)) = match side {
                Side::Left => ((x, bottom), (x, top)),
                Side::Top => ((x, top), (x + w, top)),
                Side::Right => ((x + w, top), (x + w, bottom)),
                Side::Bottom => ((x, bottom), (x + w, bottom)),
            };
            self.ops.push(Op::DrawLine {
                line: Line {
                    points: vec![
                        LinePoint {
                            p: Point { x: Pt(x1), y: Pt(y1) },
                            bezier: false,
                        },
                        LinePoint {
                            p: Point { x: Pt(x2), y: Pt(y2) },
                            bezier: false,
                        },
                    ],
                    is_closed: false,
                },
            });
        }
    }

    fn write_text(&mut self, text: &str, align: Option<Align>, x: f32, top: f32, w: f32, h: f32) {
        let text_width = text.chars().count() as f32 * self.font_size * GLYPH_WIDTH;
        let text_x = match align {
            Some(Align::Right) => x + w - CELL_MARGIN - text_width,
            Some(Align::Center) => x + (w - text_width) / 2.0,
            _ => x + CELL_MARGIN,
        };
        let baseline = self.pdf_y(top + h / 2.0 + 0.3 * self.font_size);

        self.ops.push(Op::StartTextSection);
        self.ops.push(Op::SetTextCursor {
            pos: Point {
                x: Pt(text_x),
                y: Pt(baseline),
            },
        });
        self.ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(self.font_size),
            font: self.font,
        });
        self.ops.push(Op::SetFillColor {
            col: color(self.text_color),
        });
        self.ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(to_winlatin(text))],
            font: self.font,
        });
        self.ops.push(Op::EndTextSection);
    }
}

impl Backend for PdfBackend {
    fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    fn set_draw_color(&mut self, color: Rgb) {
        self.draw_color = color;
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.fill_color = color;
    }

    fn set_font(&mut self, family: &str, style: &str, size: f32) {
        self.font = builtin_font(family, style);
        if size > 0.0 {
            self.font_size = size;
        }
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    fn cell(&mut self, cell: &Cell) {
        let top = self.page_top(cell.height);
        let x = self.x;
        if cell.fill {
            self.fill_rect(x, top, cell.width, cell.height);
        }
        self.stroke_sides(cell.border, x, top, cell.width, cell.height);
        if !cell.text.is_empty() {
            self.write_text(&cell.text, cell.align, x, top, cell.width, cell.height);
        }
    }

    fn new_line(&mut self, height: f32) {
        self.x = self.setup.margin_left;
        self.y += height;
    }

    fn advance_x(&mut self, width: f32) {
        self.x += width;
    }
}

fn color(rgb: Rgb) -> Color {
    let [r, g, b] = rgb.to_unit();
    Color::Rgb(PdfRgb {
        r,
        g,
        b,
        icc_profile: None,
    })
}

/// Map a family name and `B`/`I` flags onto one of the fourteen standard
/// fonts. Unknown families render as Helvetica.
fn builtin_font(family: &str, style: &str) -> BuiltinFont {
    let bold = style.contains('B');
    let italic = style.contains('I');
    let family = family.to_ascii_lowercase();

    match family.as_str() {
        "courier" | "courier new" | "monospace" => match (bold, italic) {
            (true, true) => BuiltinFont::CourierBoldOblique,
            (true, false) => BuiltinFont::CourierBold,
            (false, true) => BuiltinFont::CourierOblique,
            (false, false) => BuiltinFont::Courier,
        },
        "times" | "times new roman" | "serif" => match (bold, italic) {
            (true, true) => BuiltinFont::TimesBoldItalic,
            (true, false) => BuiltinFont::TimesBold,
            (false, true) => BuiltinFont::TimesItalic,
            (false, false) => BuiltinFont::TimesRoman,
        },
        other => {
            if !matches!(other, "arial" | "helvetica" | "sans-serif") {
                log::warn!("font family {family:?} not available, using Helvetica");
            }
            match (bold, italic) {
                (true, true) => BuiltinFont::HelveticaBoldOblique,
                (true, false) => BuiltinFont::HelveticaBold,
                (false, true) => BuiltinFont::HelveticaOblique,
                (false, false) => BuiltinFont::Helvetica,
            }
        }
    }
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte).
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80, // euro
            '\u{2026}' => 0x85, // ellipsis
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95, // bullet
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{00A0}' => 0x20,
            c if (c as u32) < 256 => c as u8,
            _ => b'?',
        })
        .collect();
    // SAFETY: intentionally non-UTF-8 above 0x7F; printpdf passes these bytes
    // straight to the content stream, decoded by WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a4() -> PageSetup {
        PageSetup {
            title: "test".to_string(),
            width: 595.28,
            height: 841.89,
            margin_left: 40.0,
            margin_top: 40.0,
            margin_bottom: 40.0,
        }
    }

    fn cell(height: f32) -> Cell {
        Cell {
            width: 100.0,
            height,
            text: "Total".to_string(),
            border: BorderSides::ALL,
            align: Some(Align::Right),
            fill: true,
        }
    }

    #[test]
    fn render_empty_page() {
        let bytes = PdfBackend::new(a4()).finish().unwrap();
        assert!(bytes.len() > 100, "PDF should have content");
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn cells_past_the_bottom_margin_start_a_page() {
        let mut backend = PdfBackend::new(a4());
        backend.move_to(40.0, 40.0);
        backend.cell(&cell(20.0));
        assert_eq!(backend.page_count(), 1);

        backend.move_to(40.0, 800.0);
        backend.cell(&cell(20.0));
        assert_eq!(backend.page_count(), 2);

        // Same cell height, further down: still fits on the second page.
        backend.move_to(40.0, 820.0);
        backend.cell(&cell(20.0));
        assert_eq!(backend.page_count(), 2);

        let bytes = backend.finish().unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn earlier_cells_after_a_page_break_stay_on_the_page() {
        let mut backend = PdfBackend::new(a4());
        backend.move_to(40.0, 800.0);
        backend.cell(&cell(20.0));
        assert_eq!(backend.page_count(), 2);

        backend.move_to(420.0, 160.0);
        let top = backend.page_top(24.0);
        assert_eq!(top, backend.setup.margin_top);
        backend.cell(&cell(24.0));
        assert_eq!(backend.page_count(), 2);

        let start = backend.page_start;
        backend.move_to(40.0, start + 100.0);
        assert_eq!(backend.page_top(10.0), 100.0);
    }

    #[test]
    fn oversized_cell_at_page_top_does_not_loop() {
        let mut backend = PdfBackend::new(a4());
        backend.move_to(40.0, 40.0);
        backend.cell(&cell(2000.0));
        assert_eq!(backend.page_count(), 1);
    }

    #[test]
    fn cursor_moves() {
        let mut backend = PdfBackend::new(a4());
        backend.move_to(100.0, 100.0);
        backend.advance_x(30.0);
        assert_eq!((backend.x, backend.y), (130.0, 100.0));
        backend.new_line(5.0);
        assert_eq!((backend.x, backend.y), (40.0, 105.0));
    }

    #[test]
    fn font_mapping() {
        assert!(matches!(builtin_font("Arial", ""), BuiltinFont::Helvetica));
        assert!(matches!(builtin_font("Arial", "BI"), BuiltinFont::HelveticaBoldOblique));
        assert!(matches!(builtin_font("Times", "I"), BuiltinFont::TimesItalic));
        assert!(matches!(builtin_font("Courier", "B"), BuiltinFont::CourierBold));
        assert!(matches!(builtin_font("Comic Sans", ""), BuiltinFont::Helvetica));
    }

    #[test]
    fn winlatin_maps_to_single_bytes() {
        assert_eq!(to_winlatin("abc").as_bytes(), b"abc");
        assert_eq!(to_winlatin("\u{20AC}").as_bytes(), &[0x80]);
        assert_eq!(to_winlatin("\u{4E2D}").as_bytes(), b"?");
    }
}
