//! Sequential conversion of a list of MIDI files

use crate::converter::Converter;
use crate::error::Result;
use log::{debug, info};
use std::io::Write;
use std::path::Path;

/// Outcome counts for one batch run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub converted: usize,
    pub failed: usize,
}

impl Summary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Convert each input in order.
///
/// Songs go to `out`, one per input and newline-terminated. Each failure is
/// a single `<path>: <error>` line on `err`. A failed conversion never stops
/// the run; only a failed write to `out` or `err` does.
pub fn run<I, P, W, E>(
    converter: &Converter,
    inputs: I,
    out: &mut W,
    err: &mut E,
) -> Result<Summary>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
    W: Write,
    E: Write,
{
    let mut summary = Summary::default();

    for input in inputs {
        let path = input.as_ref();
        match converter.convert(path) {
            Ok(song) => {
                writeln!(out, "{}", song)?;
                out.flush()?;
                summary.converted += 1;
            }
            Err(e) => {
                debug!("{} failed: {:?}", path.display(), e.kind());
                writeln!(err, "{}: {}", path.display(), e)?;
                err.flush()?;
                summary.failed += 1;
            }
        }
    }

    if summary.converted + summary.failed > 0 {
        info!("{} converted, {} failed", summary.converted, summary.failed);
    }

    Ok(summary)
}
