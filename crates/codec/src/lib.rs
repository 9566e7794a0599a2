//! Path file format.
//!
//! A path file is line-oriented text:
//!
//! ```text
//! <toggle index>        (zero or more, one per line, strictly increasing)
//! 4294967295            (TOGGLE_SENTINEL, always present)
//! <bound> <value>       (one decision per line, in request order:
//!                        prefix segment, then search, then random tail)
//! ```
//!
//! Decoding a file and replaying it reproduces the exact `(bound, value)`
//! sequence through at least the prefix length. Decoded decisions are not
//! range-checked against their bound: raw replay streams carry in-band
//! control values at or above [`wander_core::REPLAY_CONTROL_BASE`], and
//! those are interpreted downstream at the replay boundary.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use tracing::debug;
use wander_core::{Decision, TOGGLE_SENTINEL};

/// Errors from path file encoding/decoding. All fatal at load time.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The file violates the path format.
    #[error("malformed path file at line {line}: {reason}")]
    Malformed {
        /// 1-based line number of the offending line.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },
}

/// A decoded path file: gusto toggles plus the full decision sequence.
///
/// Segment boundaries are not stored in the file; consumers treat the whole
/// sequence as a prefix to replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathFile {
    /// Gusto toggle indices, strictly increasing.
    pub toggles: Vec<u64>,
    /// All decisions in request order.
    pub decisions: Vec<Decision>,
}

/// Encode a path to a writer: toggles, sentinel, then each segment's
/// decisions in request order.
pub fn encode<W: Write>(
    w: &mut W,
    toggles: &[u64],
    segments: &[&[Decision]],
) -> Result<(), CodecError> {
    for toggle in toggles {
        writeln!(w, "{toggle}")?;
    }
    writeln!(w, "{TOGGLE_SENTINEL}")?;
    for segment in segments {
        for decision in *segment {
            writeln!(w, "{} {}", decision.bound, decision.value)?;
        }
    }
    Ok(())
}

/// Decode a path from a reader.
pub fn decode<R: BufRead>(r: R) -> Result<PathFile, CodecError> {
    let mut toggles = Vec::new();
    let mut decisions = Vec::new();
    let mut saw_sentinel = false;

    for (idx, line) in r.lines().enumerate() {
        let line = line?;
        let lineno = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if !saw_sentinel {
            let toggle: u64 = trimmed.parse().map_err(|_| CodecError::Malformed {
                line: lineno,
                reason: format!("expected toggle index or sentinel, got {trimmed:?}"),
            })?;
            if toggle == TOGGLE_SENTINEL {
                saw_sentinel = true;
            } else {
                if toggles.last().map_or(false, |&last| toggle <= last) {
                    return Err(CodecError::Malformed {
                        line: lineno,
                        reason: format!("toggle indices must be strictly increasing, got {toggle}"),
                    });
                }
                toggles.push(toggle);
            }
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let (bound, value) = match (parts.next(), parts.next(), parts.next()) {
            (Some(bound), Some(value), None) => (bound, value),
            _ => {
                return Err(CodecError::Malformed {
                    line: lineno,
                    reason: format!("expected `bound value`, got {trimmed:?}"),
                })
            }
        };
        let bound: u64 = bound.parse().map_err(|_| CodecError::Malformed {
            line: lineno,
            reason: format!("invalid bound {bound:?}"),
        })?;
        let value: u64 = value.parse().map_err(|_| CodecError::Malformed {
            line: lineno,
            reason: format!("invalid value {value:?}"),
        })?;
        if bound == 0 {
            return Err(CodecError::Malformed {
                line: lineno,
                reason: "bound must be nonzero".to_string(),
            });
        }
        decisions.push(Decision { bound, value });
    }

    if !saw_sentinel {
        return Err(CodecError::Malformed {
            line: 0,
            reason: "missing toggle sentinel".to_string(),
        });
    }

    Ok(PathFile { toggles, decisions })
}

/// Write a path file to disk.
pub fn write_path(
    path: &Path,
    toggles: &[u64],
    segments: &[&[Decision]],
) -> Result<(), CodecError> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);
    encode(&mut w, toggles, segments)?;
    w.flush()?;
    debug!(path = %path.display(), "Wrote path file");
    Ok(())
}

/// Read a path file from disk.
pub fn read_path(path: &Path) -> Result<PathFile, CodecError> {
    let file = File::open(path)?;
    let decoded = decode(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        toggles = decoded.toggles.len(),
        decisions = decoded.decisions.len(),
        "Read path file"
    );
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_all_segments() {
        let toggles = vec![2, 5];
        let prefix = vec![Decision::new(4, 1), Decision::new(3, 2)];
        let search = vec![Decision::new(2, 0)];
        let random = vec![Decision::new(9, 7)];

        let mut buf = Vec::new();
        encode(&mut buf, &toggles, &[&prefix, &search, &random]).unwrap();
        let decoded = decode(buf.as_slice()).unwrap();

        assert_eq!(decoded.toggles, toggles);
        let all: Vec<Decision> = prefix
            .iter()
            .chain(&search)
            .chain(&random)
            .copied()
            .collect();
        assert_eq!(decoded.decisions, all);
    }

    #[test]
    fn test_empty_toggles_just_sentinel() {
        let mut buf = Vec::new();
        encode(&mut buf, &[], &[]).unwrap();
        let decoded = decode(buf.as_slice()).unwrap();
        assert!(decoded.toggles.is_empty());
        assert!(decoded.decisions.is_empty());
    }

    #[test]
    fn test_missing_sentinel_is_malformed() {
        let input = "2\n5\n";
        let err = decode(input.as_bytes()).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));
    }

    #[test]
    fn test_non_increasing_toggles_rejected() {
        let input = format!("5\n5\n{TOGGLE_SENTINEL}\n");
        let err = decode(input.as_bytes()).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_garbage_decision_line_rejected() {
        let input = format!("{TOGGLE_SENTINEL}\n4 one\n");
        let err = decode(input.as_bytes()).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_zero_bound_rejected() {
        let input = format!("{TOGGLE_SENTINEL}\n0 0\n");
        let err = decode(input.as_bytes()).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_control_values_above_bound_pass_through() {
        // Raw replay streams store control tokens as out-of-range values.
        let input = format!("{TOGGLE_SENTINEL}\n1 1000001\n");
        let decoded = decode(input.as_bytes()).unwrap();
        assert_eq!(decoded.decisions, vec![Decision { bound: 1, value: 1_000_001 }]);
    }
}
