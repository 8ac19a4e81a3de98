//! Handler-free readers over a single [`GridSource`].
//!
//! These skip the dispatcher entirely: no events, no reports, and every error propagates.

use serde::Serialize;

use crate::error::{HandlerResult, ImportError, ImportResult};
use crate::heading::FormatterRegistry;
use crate::source::GridSource;
use crate::stream::{stream_rows, RowKind, StreamOptions};
use crate::types::{HeadingMap, Record};

/// Everything read from one sheet range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SheetData {
    /// The heading row keyed by its own identifiers; `None` when no heading was derived.
    pub heading: Option<Record>,
    pub heading_map: Option<HeadingMap>,
    pub rows: Vec<Record>,
}

/// Read a whole range into memory, keeping the heading record alongside the data records.
pub fn read_into_array<S>(
    source: &S,
    options: &StreamOptions,
    registry: &FormatterRegistry,
) -> ImportResult<SheetData>
where
    S: GridSource + ?Sized,
{
    let mut heading = None;
    let mut rows = Vec::new();
    let heading_map = stream_rows(source, options, registry, |kind, record| {
        match kind {
            RowKind::Heading => heading = Some(record),
            RowKind::Data => rows.push(record),
        }
        Ok(())
    })?;
    Ok(SheetData {
        heading,
        heading_map,
        rows,
    })
}

/// Call `callback` once per data record and return how many were delivered.
///
/// The first callback error stops the read and is returned as [`ImportError::Handler`].
pub fn read_rows_with<S, F>(
    source: &S,
    options: &StreamOptions,
    registry: &FormatterRegistry,
    mut callback: F,
) -> ImportResult<usize>
where
    S: GridSource + ?Sized,
    F: FnMut(Record) -> HandlerResult,
{
    let mut delivered = 0;
    stream_rows(source, options, registry, |kind, record| {
        if kind == RowKind::Heading {
            return Ok(());
        }
        delivered += 1;
        callback(record).map_err(ImportError::Handler)
    })?;
    Ok(delivered)
}
