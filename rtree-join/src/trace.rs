//! Rectangle trace files.
//!
//! A trace is plain text: the first line holds the row count, and every
//! following line one object as `id low0 high0 low1 high1`, separated by
//! whitespace.

use std::fmt::Write as _;
use std::path::Path;

use crate::config::LoadOptions;
use crate::mbr::Mbr;
use crate::rtree::rtree_storage::read_file_bounded;
use crate::rtree::{Entry, ObjectId, SpatialError, SpatialResult};

/// Objects read from a trace, with their joint bounding rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub entries: Vec<Entry>,
    /// `None` when the trace has no rows
    pub bounds: Option<Mbr>,
}

/// Reads a trace file. The whole file is buffered first, subject to
/// `options.buffer_limit`.
pub fn read_trace(path: impl AsRef<Path>, options: &LoadOptions) -> SpatialResult<Trace> {
    let path = path.as_ref();
    let bytes = read_file_bounded(path, options.buffer_limit)?;
    let text = std::str::from_utf8(&bytes)
        .map_err(|e| SpatialError::Format(format!("trace {:?} is not UTF-8: {}", path, e)))?;
    let trace = parse_trace(text)?;
    log::debug!("Read {} objects from {:?}", trace.entries.len(), path);
    Ok(trace)
}

/// Parses trace text.
///
/// Rows past the announced count are ignored; fewer rows is an error.
pub fn parse_trace(text: &str) -> SpatialResult<Trace> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines
        .next()
        .ok_or_else(|| SpatialError::Format("trace is empty".to_string()))?;
    let count: usize = header.trim().parse().map_err(|_| {
        SpatialError::Format(format!("trace header {:?} is not a row count", header.trim()))
    })?;

    // the header is untrusted; a row takes at least 10 bytes
    let mut entries = Vec::with_capacity(count.min(text.len() / 10));
    for (line_no, line) in lines.by_ref().take(count) {
        entries.push(parse_row(line).map_err(|reason| {
            SpatialError::Format(format!("trace line {}: {}", line_no + 1, reason))
        })?);
    }
    if entries.len() < count {
        return Err(SpatialError::Format(format!(
            "trace announces {} rows but holds {}",
            count,
            entries.len()
        )));
    }
    if lines.next().is_some() {
        log::warn!("Trace holds rows past the announced {}; ignoring them", count);
    }

    let bounds = Mbr::bounding(entries.iter().map(|e| &e.mbr));
    Ok(Trace { entries, bounds })
}

fn parse_row(line: &str) -> Result<Entry, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(format!("expected 5 fields, found {}", fields.len()));
    }
    let id: ObjectId = fields[0]
        .parse()
        .map_err(|_| format!("bad object id {:?}", fields[0]))?;
    let mut bounds = [0f32; 4];
    for (slot, field) in bounds.iter_mut().zip(&fields[1..]) {
        *slot = field
            .parse()
            .map_err(|_| format!("bad coordinate {:?}", field))?;
    }
    Ok(Entry::new(id, Mbr::from_array(bounds)))
}

/// Renders entries in trace format.
pub fn format_trace(entries: &[Entry]) -> String {
    let mut out = String::with_capacity(16 + entries.len() * 48);
    let _ = writeln!(out, "{}", entries.len());
    for e in entries {
        let _ = writeln!(
            out,
            "{} {} {} {} {}",
            e.id, e.mbr.low0, e.mbr.high0, e.mbr.low1, e.mbr.high1
        );
    }
    out
}

/// Writes entries as a trace file.
pub fn write_trace(path: impl AsRef<Path>, entries: &[Entry]) -> SpatialResult<()> {
    std::fs::write(path, format_trace(entries))?;
    Ok(())
}
