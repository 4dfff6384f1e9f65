//! Replay of recorded `x,y,z` logs.
//!
//! Reads the same line format the CSV sink writes, so a captured session can
//! be re-classified offline with a different window or threshold.

use crate::collector::source::{CollectorError, SampleSource};
use crate::collector::types::AccelSample;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

pub struct ReplaySource<R> {
    lines: Lines<R>,
    line_number: usize,
}

impl ReplaySource<BufReader<File>> {
    /// Open a log file for replay.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CollectorError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| CollectorError::Io(format!("open {}: {e}", path.display())))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> SampleSource for ReplaySource<R> {
    fn next_sample(&mut self) -> Result<Option<AccelSample>, CollectorError> {
        for line in self.lines.by_ref() {
            self.line_number += 1;
            let line = line?;
            let trimmed = line.trim();

            // Blank lines and comments are skipped
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            return parse_line(trimmed, self.line_number).map(Some);
        }
        Ok(None)
    }
}

/// Parse one `x,y,z` line.
fn parse_line(line: &str, line_number: usize) -> Result<AccelSample, CollectorError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(CollectorError::Parse {
            line: line_number,
            message: format!("expected 3 fields, found {}", fields.len()),
        });
    }

    let mut axes = [0.0f64; 3];
    for (axis, field) in axes.iter_mut().zip(&fields) {
        *axis = field.parse().map_err(|e| CollectorError::Parse {
            line: line_number,
            message: format!("invalid value {field:?}: {e}"),
        })?;
    }

    Ok(AccelSample::new(axes[0], axes[1], axes[2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_replay_reads_until_eof() {
        let log = "0.0100,-0.0200,1.0000\n\n# comment\n0.5,0.5,0.5\n";
        let mut source = ReplaySource::new(Cursor::new(log));

        let first = source.next_sample().unwrap().unwrap();
        assert_eq!((first.x, first.y, first.z), (0.01, -0.02, 1.0));

        let second = source.next_sample().unwrap().unwrap();
        assert_eq!(second.z, 0.5);

        assert!(source.next_sample().unwrap().is_none());
        assert!(source.next_sample().unwrap().is_none());
    }

    #[test]
    fn test_replay_reports_bad_line() {
        let log = "0,0,1\n0,oops,1\n";
        let mut source = ReplaySource::new(Cursor::new(log));
        source.next_sample().unwrap();

        match source.next_sample() {
            Err(CollectorError::Parse { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("oops"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_replay_rejects_wrong_field_count() {
        let mut source = ReplaySource::new(Cursor::new("1.0,2.0\n"));
        assert!(matches!(
            source.next_sample(),
            Err(CollectorError::Parse { line: 1, .. })
        ));
    }
}
