//! BDF bitmap font parser (streaming, line-oriented)
//! - Reconstructs per-glyph bitmaps and metrics from STARTCHAR/ENCODING/BBX/BITMAP/ENDCHAR records
//! - Explicit {Idle, InGlyph, InBitmap} state machine; structurally incomplete glyphs are dropped, not fatal
//! - Hex rows are fixed-width: left-zero-padded to the cell width, wide rows keep the low-order bits
//! - Duplicate encodings: the last record parsed wins (table policy, not incidental map behavior)
//! - No regex/bigint; pure std + log

use log::{debug, trace, warn};
use std::collections::HashMap;
use std::fmt;

/* ======================= TYPES ======================= */

/// Font-wide cell box from FONTBOUNDINGBOX; fixed once parsed, always positive.
/// Every bitmap row is interpreted at `cell_w` bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    pub cell_w: u32,
    pub cell_h: u32,
}

/// Per-glyph bounding box and origin offset relative to the font baseline.
/// `y_off` is negative for descenders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphBbox {
    pub width: i32,
    pub height: i32,
    pub x_off: i32,
    pub y_off: i32,
}

/// One parsed glyph. Rows are exactly `cell_w` bits wide, but there may be
/// fewer rows than `bbox.height` when the source omits trailing rows.
#[derive(Debug, Clone)]
pub struct GlyphRecord {
    pub code: i32,
    pub bitmap: Vec<Vec<bool>>,
    pub bbox: GlyphBbox,
}

/// Parser output: the font cell box plus every emitted record in source order,
/// duplicates included (the table collapses them later).
#[derive(Debug)]
pub struct ParsedFont {
    pub metrics: FontMetrics,
    pub records: Vec<GlyphRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedFontError {
    /// No FONTBOUNDINGBOX line was ever seen.
    MissingMetrics,
    /// The declared cell box is not positive in both dimensions.
    InvalidMetrics { width: i32, height: i32 },
    /// The source produced zero usable glyph records.
    NoGlyphs,
}

impl fmt::Display for MalformedFontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMetrics => write!(f, "no FONTBOUNDINGBOX line found in font source"),
            Self::InvalidMetrics { width, height } => write!(
                f,
                "FONTBOUNDINGBOX must be positive in both dimensions, got {width}x{height}"
            ),
            Self::NoGlyphs => write!(f, "no usable glyph records found in font source"),
        }
    }
}

impl std::error::Error for MalformedFontError {}

/// Code point → record, built once from parser output and read-only during
/// layout. Duplicate encodings overwrite: the last record parsed wins.
#[derive(Debug, Default)]
pub struct GlyphTable {
    map: HashMap<i32, GlyphRecord>,
}

impl GlyphTable {
    pub fn from_records(records: Vec<GlyphRecord>) -> Self {
        let mut map = HashMap::with_capacity(records.len());
        for rec in records {
            let code = rec.code;
            if map.insert(code, rec).is_some() {
                debug!("duplicate ENCODING {code}: later record replaces the earlier one");
            }
        }
        Self { map }
    }

    #[inline(always)]
    pub fn get(&self, code: i32) -> Option<&GlyphRecord> {
        self.map.get(&code)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Shared vertical reference: the highest ascender tip, `max(y_off + height)`
/// across every parsed record. Computed once and reused for all glyphs so the
/// ink lines up along one row across the whole grid.
pub fn baseline(records: &[GlyphRecord]) -> i32 {
    records
        .iter()
        .map(|r| r.bbox.y_off + r.bbox.height)
        .max()
        .unwrap_or(0)
}

/* ======================= SMALL PARSERS ======================= */

/// Integer fields after a marker keyword, e.g. `BBX 5 7 0 -1` → [5, 7, 0, -1].
#[inline(always)]
fn parse_int_fields(line: &str, count: usize) -> Option<Vec<i32>> {
    let mut out = Vec::with_capacity(count);
    for tok in line.split_whitespace().skip(1).take(count) {
        out.push(tok.parse().ok()?);
    }
    (out.len() == count).then_some(out)
}

/// Expands one hex bitmap row to exactly `cell_w` bits: left-zero-padded when
/// the value needs fewer bits, truncated to the low-order bits when wider.
#[inline(always)]
fn expand_hex_row(line: &str, cell_w: usize) -> Option<Vec<bool>> {
    let mut bits = Vec::with_capacity(line.len() * 4);
    for ch in line.chars() {
        let nibble = ch.to_digit(16)?;
        for shift in (0..4).rev() {
            bits.push((nibble >> shift) & 1 == 1);
        }
    }
    if bits.len() < cell_w {
        let mut row = vec![false; cell_w - bits.len()];
        row.extend(bits);
        Some(row)
    } else {
        Some(bits.split_off(bits.len() - cell_w))
    }
}

/* ======================= PARSE ======================= */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    InGlyph,
    InBitmap,
}

/// Glyph under construction between STARTCHAR and ENDCHAR. Every field starts
/// unset; ENDCHAR only emits a record once all three have been seen.
#[derive(Debug, Default)]
struct PendingGlyph {
    code: Option<i32>,
    bbox: Option<GlyphBbox>,
    rows: Vec<Vec<bool>>,
}

impl PendingGlyph {
    fn finish(self) -> Option<GlyphRecord> {
        if self.rows.is_empty() {
            return None;
        }
        Some(GlyphRecord {
            code: self.code?,
            bbox: self.bbox?,
            bitmap: self.rows,
        })
    }
}

/// Parses the whole font source. Fails only when no cell metrics were found,
/// the cell box is non-positive, or zero usable glyph records were produced;
/// everything else is tolerated and logged.
pub fn parse(source: &str) -> Result<ParsedFont, MalformedFontError> {
    let mut metrics: Option<FontMetrics> = None;
    let mut records: Vec<GlyphRecord> = Vec::new();
    let mut state = State::Idle;
    let mut pending = PendingGlyph::default();
    let mut dropped = 0usize;

    for raw in source.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        // The two font-level markers keep their meaning in every state; the
        // rest only apply inside a glyph record.
        if line.starts_with("FONTBOUNDINGBOX") {
            match parse_int_fields(line, 4) {
                Some(f) if f[0] > 0 && f[1] > 0 => {
                    metrics = Some(FontMetrics {
                        cell_w: f[0] as u32,
                        cell_h: f[1] as u32,
                    });
                }
                Some(f) => {
                    return Err(MalformedFontError::InvalidMetrics {
                        width: f[0],
                        height: f[1],
                    });
                }
                None => warn!("ignoring malformed FONTBOUNDINGBOX line: '{line}'"),
            }
        } else if line.starts_with("STARTCHAR") {
            pending = PendingGlyph::default();
            state = State::InGlyph;
        } else if matches!(state, State::InGlyph | State::InBitmap) {
            if line.starts_with("ENCODING") {
                match parse_int_fields(line, 1) {
                    Some(f) => pending.code = Some(f[0]),
                    None => warn!("ignoring malformed ENCODING line: '{line}'"),
                }
            } else if line.starts_with("BBX") {
                match parse_int_fields(line, 4) {
                    Some(f) => {
                        pending.bbox = Some(GlyphBbox {
                            width: f[0],
                            height: f[1],
                            x_off: f[2],
                            y_off: f[3],
                        });
                    }
                    None => warn!("ignoring malformed BBX line: '{line}'"),
                }
            } else if line.starts_with("BITMAP") {
                pending.rows.clear();
                state = State::InBitmap;
            } else if line.starts_with("ENDCHAR") {
                match std::mem::take(&mut pending).finish() {
                    Some(rec) => {
                        trace!(
                            "glyph {}: bbx {}x{} offset ({},{}), {} row(s)",
                            rec.code,
                            rec.bbox.width,
                            rec.bbox.height,
                            rec.bbox.x_off,
                            rec.bbox.y_off,
                            rec.bitmap.len()
                        );
                        records.push(rec);
                    }
                    None => {
                        dropped += 1;
                        warn!("dropping glyph with missing encoding, bounding box or bitmap");
                    }
                }
                state = State::Idle;
            } else if state == State::InBitmap {
                let Some(m) = metrics else {
                    warn!("bitmap row before FONTBOUNDINGBOX; skipping: '{line}'");
                    continue;
                };
                match expand_hex_row(line, m.cell_w as usize) {
                    Some(row) => pending.rows.push(row),
                    None => warn!("skipping non-hexadecimal bitmap row: '{line}'"),
                }
            }
            // other properties inside a glyph (SWIDTH, DWIDTH, ...) are ignored
        }
        // unrecognized lines outside a glyph (COMMENT, names, junk) are ignored
    }

    let metrics = metrics.ok_or(MalformedFontError::MissingMetrics)?;
    if records.is_empty() {
        return Err(MalformedFontError::NoGlyphs);
    }
    if dropped > 0 {
        debug!("{dropped} structurally incomplete glyph(s) dropped");
    }
    debug!(
        "parsed {} glyph record(s) at cell {}x{}",
        records.len(),
        metrics.cell_w,
        metrics.cell_h
    );
    Ok(ParsedFont { metrics, records })
}

/* ======================= TESTS ======================= */
