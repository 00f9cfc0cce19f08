//! Reading a VCD trace back and checking the per-tick sample contract.
//!
//! A valid trace from this harness has one `#t` timestamp per tick, forming
//! the exact sequence `0, 1, ..., n-1`, and ends with the completion trailer
//! `$comment tickbench: complete N samples $end`. [`read_trace`] parses any
//! VCD into a [`TraceReport`]; [`TraceReport::verify`] enforces the contract.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use thiserror::Error;
use tickbench_common::{Logic, LogicVec};
use tickbench_config::Timescale;

/// Errors found while reading or checking a trace.
#[derive(Debug, Error)]
pub enum TraceCheckError {
    /// An I/O error occurred while reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A parse error at a specific line number.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// The 1-based line number where the error occurred.
        line: usize,
        /// Description of the error.
        message: String,
    },

    /// The file never reached `$enddefinitions`.
    #[error("missing $enddefinitions")]
    MissingDefinitions,

    /// A sample's timestamp is not its index.
    #[error("sample {index} has timestamp {got}, expected {index}")]
    NonContiguous {
        /// Position of the offending sample.
        index: u64,
        /// The timestamp found.
        got: u64,
    },

    /// The trace holds a different number of samples than expected.
    #[error("expected {expected} samples, found {got}")]
    SampleCount {
        /// Expected sample count.
        expected: u64,
        /// Samples found.
        got: u64,
    },

    /// The run that wrote the trace stopped early.
    #[error("trace was aborted after {samples} samples")]
    Aborted {
        /// Samples written before the abort.
        samples: u64,
    },

    /// The trace has no completion trailer.
    #[error("trace is incomplete: no completion marker")]
    Unterminated,
}

/// How a trace ended, from its `$comment tickbench: ...` trailer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceStatus {
    /// No trailer; the writer never finished.
    #[default]
    Unterminated,
    /// Closed after a full run of `samples` samples.
    Complete {
        /// Sample count recorded in the trailer.
        samples: u64,
    },
    /// Closed early after `samples` samples.
    Aborted {
        /// Sample count recorded in the trailer.
        samples: u64,
    },
}

impl TraceStatus {
    /// Recognizes a `$comment` body written by the trace recorder.
    fn from_comment(body: &[String]) -> Option<Self> {
        let words: Vec<&str> = body.iter().map(String::as_str).collect();
        match words.as_slice() {
            ["tickbench:", "complete", n, "samples"] => Some(TraceStatus::Complete {
                samples: n.parse().ok()?,
            }),
            ["tickbench:", "aborted", "after", n, "samples"] => Some(TraceStatus::Aborted {
                samples: n.parse().ok()?,
            }),
            _ => None,
        }
    }
}

/// A `$var` declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceSignalDef {
    /// The VCD identifier code.
    pub id_code: String,
    /// Dotted hierarchical name including the top scope (`counter.clk`).
    pub name: String,
    /// Bit width.
    pub width: u32,
}

/// Parsed contents of a trace.
#[derive(Clone, Debug, Default)]
pub struct TraceReport {
    /// The header timescale, if declared.
    pub timescale: Option<Timescale>,
    /// Declared signals in declaration order.
    pub signals: Vec<TraceSignalDef>,
    /// Sample timestamps in file order.
    pub timestamps: Vec<u64>,
    /// How the trace ended.
    pub status: TraceStatus,
    /// Per-signal `(sample index, value)` changes, parallel to `signals`.
    histories: Vec<Vec<(usize, LogicVec)>>,
}

impl TraceReport {
    /// Number of `#t` samples in the file.
    pub fn sample_count(&self) -> u64 {
        self.timestamps.len() as u64
    }

    /// Checks that timestamps are exactly `0..n`, that the trace was closed
    /// complete with a trailer count of `n` and, if given, that `n` equals
    /// `expected_samples`.
    pub fn verify(&self, expected_samples: Option<u64>) -> Result<(), TraceCheckError> {
        for (index, &got) in self.timestamps.iter().enumerate() {
            let index = index as u64;
            if got != index {
                return Err(TraceCheckError::NonContiguous { index, got });
            }
        }
        match self.status {
            TraceStatus::Unterminated => return Err(TraceCheckError::Unterminated),
            TraceStatus::Aborted { samples } => return Err(TraceCheckError::Aborted { samples }),
            TraceStatus::Complete { samples } if samples != self.sample_count() => {
                return Err(TraceCheckError::SampleCount {
                    expected: samples,
                    got: self.sample_count(),
                });
            }
            TraceStatus::Complete { .. } => {}
        }
        if let Some(expected) = expected_samples {
            if self.sample_count() != expected {
                return Err(TraceCheckError::SampleCount {
                    expected,
                    got: self.sample_count(),
                });
            }
        }
        Ok(())
    }

    /// Finds a signal by its full dotted name.
    pub fn signal(&self, name: &str) -> Option<&TraceSignalDef> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// The value of `name` at every sample, carrying values forward between
    /// changes. Samples before the first change read as `X`.
    pub fn sampled(&self, name: &str) -> Option<Vec<LogicVec>> {
        let idx = self.signals.iter().position(|s| s.name == name)?;
        let mut current = LogicVec::unknown(self.signals[idx].width);
        let mut changes = self.histories[idx].iter().peekable();
        let mut values = Vec::with_capacity(self.timestamps.len());
        for sample in 0..self.timestamps.len() {
            while let Some((_, value)) = changes.next_if(|(at, _)| *at == sample) {
                current = value.clone();
            }
            values.push(current.clone());
        }
        Some(values)
    }
}

/// Parses a VCD trace from a buffered reader.
pub fn read_trace<R: BufRead>(reader: R) -> Result<TraceReport, TraceCheckError> {
    let mut tokens = Vec::new();
    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        tokens.extend(line.split_whitespace().map(|t| (line_idx + 1, t.to_string())));
    }
    let mut tokens = tokens.into_iter();

    let mut report = TraceReport::default();
    let mut id_to_idx: HashMap<String, usize> = HashMap::new();
    let mut scope_stack: Vec<String> = Vec::new();
    let mut saw_enddefinitions = false;

    while let Some((line, tok)) = tokens.next() {
        match tok.as_str() {
            "$timescale" => {
                let body = body_until_end(&mut tokens, line)?.concat();
                let ts = body.parse().map_err(|_| TraceCheckError::Parse {
                    line,
                    message: format!("invalid timescale: {body}"),
                })?;
                report.timescale = Some(ts);
            }
            "$scope" => {
                let body = body_until_end(&mut tokens, line)?;
                // "module <name>"; tolerate a bare name.
                let name = body.last().cloned().unwrap_or_default();
                scope_stack.push(name);
            }
            "$upscope" => {
                body_until_end(&mut tokens, line)?;
                scope_stack.pop();
            }
            "$var" => {
                let body = body_until_end(&mut tokens, line)?;
                if body.len() < 4 {
                    return Err(parse_error(line, format!("invalid $var: {}", body.join(" "))));
                }
                let width: u32 = body[1]
                    .parse()
                    .map_err(|_| parse_error(line, format!("invalid width in $var: {}", body[1])))?;
                let mut path = scope_stack.clone();
                path.push(body[3].clone());
                id_to_idx.insert(body[2].clone(), report.signals.len());
                report.signals.push(TraceSignalDef {
                    id_code: body[2].clone(),
                    name: path.join("."),
                    width,
                });
                report.histories.push(Vec::new());
            }
            "$enddefinitions" => {
                body_until_end(&mut tokens, line)?;
                saw_enddefinitions = true;
            }
            "$comment" => {
                let body = body_until_end(&mut tokens, line)?;
                if let Some(status) = TraceStatus::from_comment(&body) {
                    report.status = status;
                }
            }
            // Value blocks: the values follow as ordinary tokens, closed by `$end`.
            "$dumpvars" | "$dumpall" | "$dumpon" | "$dumpoff" | "$end" => {}
            kw if kw.starts_with('$') => {
                // $date, $version, $comment and unknown sections.
                body_until_end(&mut tokens, line)?;
            }
            t if t.starts_with('#') => {
                if !saw_enddefinitions {
                    return Err(TraceCheckError::MissingDefinitions);
                }
                let time = t[1..]
                    .parse()
                    .map_err(|_| parse_error(line, format!("invalid timestamp: {t}")))?;
                report.timestamps.push(time);
            }
            t if t.starts_with(['b', 'B']) => {
                let (_, id_code) = tokens
                    .next()
                    .ok_or_else(|| parse_error(line, format!("vector change without id: {t}")))?;
                let value = LogicVec::from_binary_str(&t[1..])
                    .ok_or_else(|| parse_error(line, format!("invalid vector value: {t}")))?;
                report.push_change(&id_to_idx, &id_code, value, line)?;
            }
            t if t.starts_with(['r', 'R']) => {
                // Real-valued change; not produced here, skip its id.
                tokens.next();
            }
            t => {
                let mut chars = t.chars();
                let bit = chars
                    .next()
                    .and_then(Logic::from_char)
                    .ok_or_else(|| parse_error(line, format!("unexpected token: {t}")))?;
                report.push_change(&id_to_idx, chars.as_str(), LogicVec::filled(1, bit), line)?;
            }
        }
    }

    if !saw_enddefinitions {
        return Err(TraceCheckError::MissingDefinitions);
    }
    Ok(report)
}

/// Opens and parses a VCD file.
pub fn read_trace_file(path: &Path) -> Result<TraceReport, TraceCheckError> {
    let file = std::fs::File::open(path)?;
    read_trace(std::io::BufReader::new(file))
}

impl TraceReport {
    fn push_change(
        &mut self,
        id_to_idx: &HashMap<String, usize>,
        id_code: &str,
        value: LogicVec,
        line: usize,
    ) -> Result<(), TraceCheckError> {
        let Some(sample) = self.timestamps.len().checked_sub(1) else {
            return Err(parse_error(line, "value change before first timestamp".into()));
        };
        let &idx = id_to_idx
            .get(id_code)
            .ok_or_else(|| parse_error(line, format!("undeclared identifier: {id_code}")))?;
        let value = extend_to_width(value, self.signals[idx].width);
        self.histories[idx].push((sample, value));
        Ok(())
    }
}

/// Collects section tokens up to the closing `$end`.
fn body_until_end(
    tokens: &mut impl Iterator<Item = (usize, String)>,
    start_line: usize,
) -> Result<Vec<String>, TraceCheckError> {
    let mut body = Vec::new();
    for (_, tok) in tokens.by_ref() {
        if tok == "$end" {
            return Ok(body);
        }
        body.push(tok);
    }
    Err(parse_error(start_line, "unterminated section".into()))
}

/// Left-extends a short vector value: with `X`/`Z` if its MSB is one, else `0`.
fn extend_to_width(value: LogicVec, width: u32) -> LogicVec {
    if value.width() == width {
        return value;
    }
    let fill = match value.iter_msb_first().next() {
        Some(msb @ (Logic::X | Logic::Z)) => msb,
        _ => Logic::Zero,
    };
    let mut out = LogicVec::filled(width, fill);
    for i in 0..value.width().min(width) {
        out.set(i, value.get(i));
    }
    out
}

fn parse_error(line: usize, message: String) -> TraceCheckError {
    TraceCheckError::Parse { line, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> TraceReport {
        read_trace(text.as_bytes()).unwrap()
    }

    const SMALL: &str = "\
$version tickbench $end
$timescale
  1ns
$end
$scope module top $end
$var wire 1 ! clk $end
$var wire 4 \" count [3:0] $end
$scope module div $end
$var wire 1 # tick $end
$upscope $end
$upscope $end
$enddefinitions $end
#0
$dumpvars
0!
bxxxx \"
0#
$end
#1
1!
b1 \"
#2
0!
$comment tickbench: complete 3 samples $end
";

    #[test]
    fn parses_declarations_and_samples() {
        let report = parse(SMALL);
        assert_eq!(report.timescale.unwrap().to_string(), "1ns");
        let names: Vec<&str> = report.signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["top.clk", "top.count", "top.div.tick"]);
        assert_eq!(report.signal("top.count").unwrap().width, 4);
        assert_eq!(report.timestamps, [0, 1, 2]);
        assert_eq!(report.status, TraceStatus::Complete { samples: 3 });
        assert!(report.verify(Some(3)).is_ok());
    }

    #[test]
    fn sampled_carries_values_forward() {
        let report = parse(SMALL);
        let clk: Vec<String> = report
            .sampled("top.clk")
            .unwrap()
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(clk, ["0", "1", "0"]);

        let count = report.sampled("top.count").unwrap();
        assert_eq!(count[0], LogicVec::unknown(4));
        // "b1" is zero-extended to the declared width.
        assert_eq!(count[1].to_u64(), Some(1));
        assert_eq!(count[2].to_u64(), Some(1));
        assert!(report.sampled("top.nope").is_none());
    }

    #[test]
    fn detects_gap() {
        let text = "$enddefinitions $end\n#0\n#1\n#3\n";
        let err = parse(text).verify(None).unwrap_err();
        assert!(matches!(err, TraceCheckError::NonContiguous { index: 2, got: 3 }));
    }

    #[test]
    fn detects_repeat() {
        let text = "$enddefinitions $end\n#0\n#0\n";
        let err = parse(text).verify(None).unwrap_err();
        assert!(matches!(err, TraceCheckError::NonContiguous { index: 1, got: 0 }));
    }

    #[test]
    fn detects_late_start() {
        let err = parse("$enddefinitions $end\n#5\n").verify(None).unwrap_err();
        assert!(matches!(err, TraceCheckError::NonContiguous { index: 0, got: 5 }));
    }

    #[test]
    fn aborted_trace_is_rejected() {
        let text = SMALL.replace("complete 3 samples", "aborted after 3 samples");
        let report = parse(&text);
        assert_eq!(report.status, TraceStatus::Aborted { samples: 3 });
        let err = report.verify(None).unwrap_err();
        assert_eq!(err.to_string(), "trace was aborted after 3 samples");
    }

    #[test]
    fn trace_without_trailer_is_rejected() {
        let text = SMALL.replace("$comment tickbench: complete 3 samples $end\n", "");
        let report = parse(&text);
        assert_eq!(report.status, TraceStatus::Unterminated);
        assert!(matches!(report.verify(None), Err(TraceCheckError::Unterminated)));
    }

    #[test]
    fn trailer_count_must_match_samples() {
        let text = SMALL.replace("complete 3 samples", "complete 4 samples");
        let err = parse(&text).verify(None).unwrap_err();
        assert!(matches!(err, TraceCheckError::SampleCount { expected: 4, got: 3 }));
    }

    #[test]
    fn foreign_comments_are_ignored() {
        let text = SMALL.replace("#0\n", "$comment generated by hand $end\n#0\n");
        assert!(parse(&text).verify(Some(3)).is_ok());
    }

    #[test]
    fn detects_wrong_count() {
        let err = parse(SMALL).verify(Some(200)).unwrap_err();
        assert_eq!(err.to_string(), "expected 200 samples, found 3");
    }

    #[test]
    fn missing_enddefinitions() {
        let err = read_trace("$scope module top $end\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TraceCheckError::MissingDefinitions));
    }

    #[test]
    fn undeclared_identifier_is_parse_error() {
        let err = read_trace("$enddefinitions $end\n#0\n1?\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TraceCheckError::Parse { line: 3, .. }));
    }

    #[test]
    fn change_before_timestamp_is_parse_error() {
        let text = "$var wire 1 ! a $end\n$enddefinitions $end\n1!\n";
        assert!(matches!(
            read_trace(text.as_bytes()),
            Err(TraceCheckError::Parse { .. })
        ));
    }

    #[test]
    fn file_not_found() {
        let err = read_trace_file(Path::new("/nonexistent/waveform.vcd")).unwrap_err();
        assert!(matches!(err, TraceCheckError::Io(_)));
    }

    #[test]
    fn extend_fills_from_msb() {
        let v = extend_to_width(LogicVec::from_binary_str("x1").unwrap(), 4);
        assert_eq!(v.to_string(), "XXX1");
        let v = extend_to_width(LogicVec::from_binary_str("10").unwrap(), 4);
        assert_eq!(v.to_string(), "0010");
    }
}
