//! Fixed-grid tilemap layout: one cell per code point in [0, 255], every glyph
//! aligned to the shared baseline and horizontally centered inside its cell.

use crate::canvas::Canvas;
use crate::font::{FontMetrics, GlyphBbox, GlyphTable};
use log::trace;

/// The rendered range is fixed regardless of what the source declares.
pub const FIRST_CODE: i32 = 0;
pub const LAST_CODE: i32 = 255;

/// Number of tile rows needed to fit the full code range.
#[inline(always)]
pub fn grid_rows(columns: u32) -> u32 {
    let span = (LAST_CODE - FIRST_CODE + 1) as u32;
    span.div_ceil(columns)
}

/// Canvas size in pixels for the given cell box and column count.
#[inline(always)]
pub fn sheet_dimensions(metrics: FontMetrics, columns: u32) -> (u32, u32) {
    (columns * metrics.cell_w, grid_rows(columns) * metrics.cell_h)
}

/// One-line grid summary for status reporting, e.g. "16x16 tiles of 8x8".
pub fn summary(metrics: FontMetrics, columns: u32) -> String {
    format!(
        "{}x{} tiles of {}x{}",
        columns,
        grid_rows(columns),
        metrics.cell_w,
        metrics.cell_h
    )
}

/// Placement of a glyph inside its cell as (x_left, y_top) relative to the
/// cell origin.
///
/// y_top aligns the glyph ink to the shared baseline and is clamped into the
/// cell twice; for glyphs taller than the cell the second clamp can leave it
/// negative. That is accepted as-is — the per-pixel canvas check at paint
/// time is the hard bound.
#[inline(always)]
fn placement(bbox: GlyphBbox, metrics: FontMetrics, baseline: i32) -> (i32, i32) {
    let cell_h = metrics.cell_h as i32;

    let mut y_top = baseline - (bbox.y_off + bbox.height);
    if y_top < 0 {
        y_top = 0;
    }
    if y_top + bbox.height > cell_h {
        y_top = cell_h - bbox.height;
    }

    let x_left = ((metrics.cell_w as i32 - bbox.width) / 2).max(0);
    (x_left, y_top)
}

/// Paints every code point's glyph into its grid cell. Cells without a record
/// stay fully transparent; no write ever lands outside the canvas.
pub fn compose(
    table: &GlyphTable,
    metrics: FontMetrics,
    baseline: i32,
    columns: u32,
    canvas: &mut dyn Canvas,
) {
    let (canvas_w, canvas_h) = canvas.dimensions();
    let cell_h = metrics.cell_h as i32;

    for code in FIRST_CODE..=LAST_CODE {
        let idx = (code - FIRST_CODE) as u32;
        let x = (idx % columns * metrics.cell_w) as i32;
        let y = (idx / columns * metrics.cell_h) as i32;

        let Some(rec) = table.get(code) else {
            continue;
        };
        let (x_left, y_top) = placement(rec.bbox, metrics, baseline);
        trace!("code {code}: cell origin ({x},{y}), x_left={x_left} y_top={y_top}");

        for (j, row) in rec.bitmap.iter().enumerate() {
            // rows past the cell bottom are skipped entirely, not wrapped
            if y_top + j as i32 >= cell_h {
                break;
            }
            for (i, &bit) in row.iter().take(metrics.cell_w as usize).enumerate() {
                if !bit {
                    continue;
                }
                let px = x + x_left + i as i32;
                let py = y + y_top + j as i32;
                if px >= 0 && py >= 0 && (px as u32) < canvas_w && (py as u32) < canvas_h {
                    canvas.set_opaque(px as u32, py as u32);
                }
            }
        }
    }
}

/* ======================= TESTS ======================= */

#[cfg(test)]
mod tests {
    use super::{Canvas, FIRST_CODE, LAST_CODE, compose, grid_rows, placement, sheet_dimensions, summary};
    use crate::font::{FontMetrics, GlyphBbox, GlyphRecord, GlyphTable, baseline};
    use std::collections::HashSet;

    struct RecordingCanvas {
        w: u32,
        h: u32,
        painted: HashSet<(u32, u32)>,
    }

    impl RecordingCanvas {
        fn new(w: u32, h: u32) -> Self {
            Self {
                w,
                h,
                painted: HashSet::new(),
            }
        }
    }

    impl Canvas for RecordingCanvas {
        fn dimensions(&self) -> (u32, u32) {
            (self.w, self.h)
        }

        fn set_opaque(&mut self, x: u32, y: u32) {
            assert!(
                x < self.w && y < self.h,
                "write outside the canvas at ({x},{y})"
            );
            self.painted.insert((x, y));
        }
    }

    const METRICS: FontMetrics = FontMetrics {
        cell_w: 8,
        cell_h: 8,
    };

    fn glyph(code: i32, rows: &[&str], bbox: GlyphBbox) -> GlyphRecord {
        let bitmap = rows
            .iter()
            .map(|row| row.chars().map(|c| c == '1').collect())
            .collect();
        GlyphRecord { code, bitmap, bbox }
    }

    fn full_bbox(width: i32, height: i32, y_off: i32) -> GlyphBbox {
        GlyphBbox {
            width,
            height,
            x_off: 0,
            y_off,
        }
    }

    fn hollow_box(code: i32) -> GlyphRecord {
        let mut rows = vec!["11111111"; 8];
        for row in rows.iter_mut().take(7).skip(1) {
            *row = "10000001";
        }
        glyph(code, &rows, full_bbox(8, 8, 0))
    }

    #[test]
    fn hollow_box_fills_exactly_its_cell_block() {
        let records = vec![hollow_box(65)];
        let shared = baseline(&records);
        assert_eq!(shared, 8);
        let table = GlyphTable::from_records(records);

        let (w, h) = sheet_dimensions(METRICS, 16);
        let mut canvas = RecordingCanvas::new(w, h);
        compose(&table, METRICS, shared, 16, &mut canvas);

        // code 65 → column 1, row 4 → pixel block x∈[8,16), y∈[32,40)
        let mut expected = HashSet::new();
        for x in 8..16u32 {
            expected.insert((x, 32));
            expected.insert((x, 39));
        }
        for y in 33..39u32 {
            expected.insert((8, y));
            expected.insert((15, y));
        }
        assert_eq!(
            canvas.painted, expected,
            "glyph must paint unshifted and every other cell must stay transparent"
        );
    }

    #[test]
    fn descender_is_shifted_down_to_the_shared_baseline() {
        let low = glyph(97, &["1111"; 6], full_bbox(4, 6, -2));
        let tall = glyph(98, &["1111"; 8], full_bbox(4, 8, 0));
        let records = vec![low, tall];
        let shared = baseline(&records);
        assert_eq!(shared, 8, "max(-2+6, 0+8)");

        assert_eq!(
            placement(full_bbox(4, 6, -2), METRICS, shared),
            (2, 4),
            "descender drops 8-(-2+6)=4 rows and centers in the 8px cell"
        );
        assert_eq!(placement(full_bbox(4, 8, 0), METRICS, shared), (2, 0));
    }

    #[test]
    fn oversized_glyph_keeps_negative_y_top_from_second_clamp() {
        // first clamp lifts -2 to 0, second pushes it back to 8-10 = -2
        assert_eq!(placement(full_bbox(12, 10, 0), METRICS, 8), (0, -2));
    }

    #[test]
    fn oversized_glyph_is_cropped_at_canvas_bounds() {
        // last cell of a 16-column sheet; a 12x10 glyph overhangs both edges
        let records = vec![glyph(255, &["111111111111"; 10], full_bbox(12, 10, 0))];
        let table = GlyphTable::from_records(records);

        let (w, h) = sheet_dimensions(METRICS, 16);
        let mut canvas = RecordingCanvas::new(w, h);
        compose(&table, METRICS, 8, 16, &mut canvas);

        assert!(!canvas.painted.is_empty());
        // RecordingCanvas::set_opaque already asserts the bounds invariant;
        // additionally the overhanging columns must be gone.
        assert!(canvas.painted.iter().all(|&(x, _)| x >= 120 && x < w));
        assert!(canvas.painted.iter().all(|&(_, y)| y >= 118));
    }

    #[test]
    fn rows_past_the_cell_bottom_are_skipped() {
        // 12 bitmap rows against an 8px cell at y_top=0: rows 8..12 never paint
        let records = vec![glyph(0, &["10000000"; 12], full_bbox(8, 8, 0))];
        let table = GlyphTable::from_records(records);

        let mut canvas = RecordingCanvas::new(128, 128);
        compose(&table, METRICS, 8, 16, &mut canvas);
        assert_eq!(canvas.painted.len(), 8);
        assert!(canvas.painted.iter().all(|&(_, y)| y < 8));
    }

    #[test]
    fn absent_code_points_leave_their_cells_transparent() {
        let table = GlyphTable::from_records(vec![hollow_box(65)]);
        let mut canvas = RecordingCanvas::new(128, 128);
        compose(&table, METRICS, 8, 16, &mut canvas);

        assert!(
            canvas
                .painted
                .iter()
                .all(|&(x, y)| (8..16).contains(&x) && (32..40).contains(&y)),
            "only code 65's cell block may contain ink"
        );
    }

    #[test]
    fn painting_is_idempotent() {
        let table = GlyphTable::from_records(vec![hollow_box(65)]);
        let mut canvas = RecordingCanvas::new(128, 128);

        compose(&table, METRICS, 8, 16, &mut canvas);
        let first = canvas.painted.clone();
        compose(&table, METRICS, 8, 16, &mut canvas);
        assert_eq!(canvas.painted, first, "repainting must not accumulate");
    }

    #[test]
    fn grid_covers_the_full_code_range() {
        assert_eq!((LAST_CODE - FIRST_CODE + 1), 256);
        assert_eq!(grid_rows(16), 16);
        assert_eq!(grid_rows(10), 26, "256 codes need a partial final row");
        assert_eq!(grid_rows(1), 256);

        assert_eq!(sheet_dimensions(METRICS, 16), (128, 128));
        assert_eq!(sheet_dimensions(METRICS, 10), (80, 208));
        assert_eq!(summary(METRICS, 16), "16x16 tiles of 8x8");
    }
}
