mod canvas;
mod config;
mod font;
mod tilemap;

use crate::canvas::RgbaCanvas;
use crate::config::Options;
use crate::font::GlyphTable;
use std::fs;

fn main() {
    // Install the logger before anything can log; RUST_LOG overrides the default.
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .try_init();

    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "bdf2tm".to_string());
    let opts = match config::parse(args) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{}", config::usage(&program));
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&opts) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(opts: &Options) -> Result<(), Box<dyn std::error::Error>> {
    // Lossy decoding keeps going over undecodable bytes; those only occur in
    // comment/name lines, which never match a record marker.
    let bytes = fs::read(&opts.input)?;
    let source = String::from_utf8_lossy(&bytes);

    let parsed = font::parse(&source)?;
    let shared_baseline = font::baseline(&parsed.records);
    let table = GlyphTable::from_records(parsed.records);
    log::info!(
        "{} glyph(s) at cell {}x{}, baseline {}",
        table.len(),
        parsed.metrics.cell_w,
        parsed.metrics.cell_h,
        shared_baseline
    );

    let (width, height) = tilemap::sheet_dimensions(parsed.metrics, opts.columns);
    let mut canvas = RgbaCanvas::new(width, height);
    tilemap::compose(
        &table,
        parsed.metrics,
        shared_baseline,
        opts.columns,
        &mut canvas,
    );
    canvas.save(&opts.output)?;

    println!(
        "Saved {} ({}) baseline + horizontally centered",
        opts.output.display(),
        tilemap::summary(parsed.metrics, opts.columns)
    );
    Ok(())
}
