//! Command-line options. The converter core only ever sees validated primitives.

use std::path::PathBuf;

pub const DEFAULT_COLUMNS: u32 = 16;

#[derive(Debug, Clone)]
pub struct Options {
    pub input: PathBuf,
    pub output: PathBuf,
    pub columns: u32,
}

/// Usage line printed on bad invocations.
pub fn usage(program: &str) -> String {
    format!("Usage: {program} input.bdf output.png [cols]")
}

/// Parses `input output [cols]` from the given argument iterator (program
/// name already consumed). `cols` defaults to 16 and must be at least 1.
pub fn parse<I>(mut args: I) -> Result<Options, String>
where
    I: Iterator<Item = String>,
{
    let input = args.next().ok_or("missing input font path")?;
    let output = args.next().ok_or("missing output image path")?;
    let columns = match args.next() {
        Some(raw) => match raw.parse::<u32>() {
            Ok(n) if n >= 1 => n,
            _ => return Err(format!("cols must be a positive integer, got '{raw}'")),
        },
        None => DEFAULT_COLUMNS,
    };
    if let Some(extra) = args.next() {
        return Err(format!("unexpected argument '{extra}'"));
    }

    Ok(Options {
        input: PathBuf::from(input),
        output: PathBuf::from(output),
        columns,
    })
}
