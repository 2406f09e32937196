// PDF Renderer - paginated per-location stock tables

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocumentReference, PdfLayerReference, Point,
    Polygon, PolygonMode, Rgb, WindingOrder,
};

use crate::aggregate::{AggregateRow, StockAggregate};
use crate::error::{ReportError, Result};

// ============================================================================
// LAYOUT CONSTANTS (millimeters unless noted)
// ============================================================================

// A4 portrait
const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const MARGIN: f64 = 15.0;

// MSKU column ~3x the balance column
const MSKU_COL_WIDTH: f64 = 135.0;
const BALANCE_COL_WIDTH: f64 = 45.0;
const TABLE_WIDTH: f64 = MSKU_COL_WIDTH + BALANCE_COL_WIDTH;

const ROW_HEIGHT: f64 = 7.0;
const CELL_PADDING: f64 = 2.0;
const SECTION_GAP: f64 = 6.0;

const TITLE_SIZE: f64 = 16.0;
const HEADING_SIZE: f64 = 13.0;
const BODY_SIZE: f64 = 10.0;

const GRID_THICKNESS: f64 = 0.5;

// Points-to-millimeters, and the average Helvetica glyph advance as a
// fraction of the font size — close enough for centering and truncation
// with builtin fonts, which expose no metrics.
const PT_TO_MM: f64 = 25.4 / 72.0;
const AVG_GLYPH_EM: f64 = 0.5;

fn grid_color() -> Color {
    Color::Rgb(Rgb::new(0.5, 0.5, 0.5, None))
}

fn header_band_color() -> Color {
    // lightgrey
    Color::Rgb(Rgb::new(0.83, 0.83, 0.83, None))
}

fn heading_color() -> Color {
    // darkblue
    Color::Rgb(Rgb::new(0.0, 0.0, 0.55, None))
}

fn text_color() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn approx_text_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * AVG_GLYPH_EM * PT_TO_MM
}

/// Truncate to what fits in `width` at the given size, ellipsis included.
fn fit_text(text: &str, size: f64, width: f64) -> String {
    let usable = width - 2.0 * CELL_PADDING;
    if approx_text_width(text, size) <= usable {
        return text.to_string();
    }
    let max_chars = (usable / (size * AVG_GLYPH_EM * PT_TO_MM)) as usize;
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

// ============================================================================
// PAGE WRITER
// ============================================================================

/// Cursor over the document: tracks the current layer and vertical position,
/// starting a fresh page whenever a block would cross the bottom margin.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: &'a IndirectFontRef,
    bold: &'a IndirectFontRef,
    y: f64,
}

impl<'a> PageWriter<'a> {
    fn new(
        doc: &'a PdfDocumentReference,
        layer: PdfLayerReference,
        regular: &'a IndirectFontRef,
        bold: &'a IndirectFontRef,
    ) -> Self {
        PageWriter {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn ensure_room(&mut self, needed: f64) {
        if self.y - needed < MARGIN {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn text(&self, text: &str, size: f64, x: f64, baseline: f64, font: &IndirectFontRef) {
        self.layer.set_fill_color(text_color());
        self.layer
            .use_text(text, size as f32, Mm(x as f32), Mm(baseline as f32), font);
    }

    fn fill_rect(&self, x: f64, y_top: f64, width: f64, height: f64, color: Color) {
        let ring = vec![
            (Point::new(Mm(x as f32), Mm(y_top as f32)), false),
            (Point::new(Mm((x + width) as f32), Mm(y_top as f32)), false),
            (Point::new(Mm((x + width) as f32), Mm((y_top - height) as f32)), false),
            (Point::new(Mm(x as f32), Mm((y_top - height) as f32)), false),
        ];
        self.layer.set_fill_color(color);
        self.layer.add_polygon(Polygon {
            rings: vec![ring],
            mode: PolygonMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn stroke_rect(&self, x: f64, y_top: f64, width: f64, height: f64) {
        let points = vec![
            (Point::new(Mm(x as f32), Mm(y_top as f32)), false),
            (Point::new(Mm((x + width) as f32), Mm(y_top as f32)), false),
            (Point::new(Mm((x + width) as f32), Mm((y_top - height) as f32)), false),
            (Point::new(Mm(x as f32), Mm((y_top - height) as f32)), false),
        ];
        self.layer.set_outline_color(grid_color());
        self.layer.set_outline_thickness(GRID_THICKNESS as f32);
        self.layer.add_line(Line {
            points,
            is_closed: true,
        });
    }

    fn title(&mut self, text: &str) {
        self.y -= TITLE_SIZE * PT_TO_MM;
        self.text(text, TITLE_SIZE, MARGIN, self.y, self.bold);
        self.y -= 3.0;
    }

    fn subtitle(&mut self, text: &str) {
        self.y -= BODY_SIZE * PT_TO_MM;
        self.text(text, BODY_SIZE, MARGIN, self.y, self.regular);
        self.y -= SECTION_GAP;
    }

    fn heading(&mut self, text: &str) {
        self.y -= HEADING_SIZE * PT_TO_MM;
        self.layer.set_fill_color(heading_color());
        self.layer.use_text(
            text,
            HEADING_SIZE as f32,
            Mm(MARGIN as f32),
            Mm(self.y as f32),
            self.bold,
        );
        self.y -= 3.0;
    }

    /// Header band: grey background, bold cell labels, full border.
    fn table_header(&mut self) {
        let y_top = self.y;
        self.fill_rect(MARGIN, y_top, TABLE_WIDTH, ROW_HEIGHT, header_band_color());
        self.stroke_rect(MARGIN, y_top, MSKU_COL_WIDTH, ROW_HEIGHT);
        self.stroke_rect(MARGIN + MSKU_COL_WIDTH, y_top, BALANCE_COL_WIDTH, ROW_HEIGHT);

        let baseline = y_top - ROW_HEIGHT + CELL_PADDING;
        self.text("MSKU", BODY_SIZE, MARGIN + CELL_PADDING, baseline, self.bold);
        self.text(
            "Ending Warehouse Balance",
            BODY_SIZE,
            MARGIN + MSKU_COL_WIDTH + CELL_PADDING,
            baseline,
            self.bold,
        );
        self.y -= ROW_HEIGHT;
    }

    /// One data row: MSKU left-aligned, balance centered in its column.
    fn table_row(&mut self, row: &AggregateRow) {
        self.ensure_room(ROW_HEIGHT);
        let y_top = self.y;
        self.stroke_rect(MARGIN, y_top, MSKU_COL_WIDTH, ROW_HEIGHT);
        self.stroke_rect(MARGIN + MSKU_COL_WIDTH, y_top, BALANCE_COL_WIDTH, ROW_HEIGHT);

        let baseline = y_top - ROW_HEIGHT + CELL_PADDING;
        let msku = fit_text(&row.msku, BODY_SIZE, MSKU_COL_WIDTH);
        self.text(&msku, BODY_SIZE, MARGIN + CELL_PADDING, baseline, self.regular);

        let balance = row.balance.to_string();
        let center = MARGIN + MSKU_COL_WIDTH + BALANCE_COL_WIDTH / 2.0;
        let x = center - approx_text_width(&balance, BODY_SIZE) / 2.0;
        self.text(&balance, BODY_SIZE, x, baseline, self.regular);

        self.y -= ROW_HEIGHT;
    }
}

// ============================================================================
// RENDERING
// ============================================================================

/// Consecutive runs of the same location, in grouping order.
fn location_sections(rows: &[AggregateRow]) -> Vec<(&str, &[AggregateRow])> {
    let mut sections = Vec::new();
    let mut start = 0;
    for end in 1..=rows.len() {
        if end == rows.len() || rows[end].location != rows[start].location {
            sections.push((rows[start].location.as_str(), &rows[start..end]));
            start = end;
        }
    }
    sections
}

/// Render the aggregate as a paginated PDF report.
///
/// One section per location, in the aggregate's grouping order; each section
/// carries a heading and a bordered two-column table. Sections and rows flow
/// onto fresh pages as needed. Infallible for any well-formed aggregate —
/// the only error source is final document serialization.
pub fn render_pdf(aggregate: &StockAggregate, timestamp: &str) -> Result<Vec<u8>> {
    let (doc, page, layer) = printpdf::PdfDocument::new(
        "Warehouse Stock Report",
        Mm(PAGE_WIDTH as f32),
        Mm(PAGE_HEIGHT as f32),
        "Layer 1",
    );

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;

    let layer = doc.get_page(page).get_layer(layer);
    let mut writer = PageWriter::new(&doc, layer, &regular, &bold);

    writer.title("Warehouse Stock Report");
    writer.subtitle(&format!("Generated on: {timestamp}"));

    for (location, rows) in location_sections(aggregate.rows()) {
        // Keep the heading attached to at least the header and first row
        writer.ensure_room(HEADING_SIZE * PT_TO_MM + 3.0 + 2.0 * ROW_HEIGHT);
        writer.heading(location);
        writer.table_header();
        for row in rows {
            writer.table_row(row);
        }
        writer.y -= SECTION_GAP;
    }

    doc.save_to_bytes().map_err(|e| ReportError::Pdf(e.to_string()))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NormalizedRecord;

    fn aggregate(entries: &[(&str, &str, i64)]) -> StockAggregate {
        let records: Vec<NormalizedRecord> = entries
            .iter()
            .map(|(location, msku, balance)| NormalizedRecord {
                location: location.to_string(),
                msku: msku.to_string(),
                disposition: "SELLABLE".to_string(),
                balance: *balance,
            })
            .collect();
        StockAggregate::from_records(&records).unwrap()
    }

    #[test]
    fn test_render_single_location_single_msku() {
        let agg = aggregate(&[("Delhi", "SKU-1", 42)]);
        let bytes = render_pdf(&agg, "2025-03-01 09:30:05").unwrap();

        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_many_locations_many_mskus() {
        let mut entries: Vec<(String, String, i64)> = Vec::new();
        for loc in 0..5 {
            for sku in 0..60i64 {
                entries.push((format!("Warehouse {loc}"), format!("SKU-{loc}-{sku}"), sku));
            }
        }
        let refs: Vec<(&str, &str, i64)> = entries
            .iter()
            .map(|(l, m, b)| (l.as_str(), m.as_str(), *b))
            .collect();
        let agg = aggregate(&refs);

        // 300 rows forces several page breaks
        let bytes = render_pdf(&agg, "2025-03-01 09:30:05").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_handles_long_msku_and_negatives() {
        let long = "A".repeat(200);
        let agg = aggregate(&[("Delhi", long.as_str(), -56), ("Delhi", "B", 0)]);
        let bytes = render_pdf(&agg, "ts").unwrap();

        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_location_sections_grouping() {
        let agg = aggregate(&[
            ("A", "X", 1),
            ("A", "Y", 2),
            ("B", "X", 3),
        ]);
        let sections = location_sections(agg.rows());

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].0, "A");
        assert_eq!(sections[0].1.len(), 2);
        assert_eq!(sections[1].0, "B");
        assert_eq!(sections[1].1.len(), 1);
    }

    #[test]
    fn test_fit_text_truncates_with_ellipsis() {
        let long = "X".repeat(300);
        let fitted = fit_text(&long, BODY_SIZE, MSKU_COL_WIDTH);

        assert!(fitted.ends_with('…'));
        assert!(fitted.chars().count() < 300);
        assert_eq!(fit_text("short", BODY_SIZE, MSKU_COL_WIDTH), "short");
    }
}
