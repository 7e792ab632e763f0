//! Consolidation of per-day fixture documents into one chronological XML file.
//!
//! The aggregator takes the date-keyed documents produced by a range fetch,
//! parses each day's XML, and regroups the day's fixtures under a
//! `<DateSection date="YYYY-MM-DD">` element inside a single
//! `<ConsolidatedFixtures>` root. Days are emitted in ascending date order
//! and a running count of grouped fixture elements is written back to the
//! run statistics.
//!
//! A malformed day is rendered into its own buffer before being appended, so
//! a parse failure skips that day without corrupting the output or aborting
//! the rest of the aggregation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::stats::FetchStats;

/// Errors from the consolidation step.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The consolidated document itself could not be assembled.
    #[error("cannot assemble consolidated document: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The output file could not be written.
    #[error("cannot write consolidated output to {path}: {source}")]
    Io {
        /// Output path that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Why a single day was dropped from the consolidated output.
#[derive(Debug, Error)]
enum DayError {
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error("document has no root element")]
    NoRoot,
}

/// A consolidated fixtures document.
#[derive(Debug, Clone)]
pub struct Consolidated {
    xml: String,
    item_count: usize,
    date_count: usize,
}

impl Consolidated {
    /// Returns the consolidated XML text.
    #[must_use]
    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// Returns the number of fixture elements grouped across all days.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Returns the number of date sections emitted.
    #[must_use]
    pub fn date_count(&self) -> usize {
        self.date_count
    }

    /// Writes the consolidated XML to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::Io`] on write failure.
    #[instrument(level = "debug", skip(self), fields(path = %path.as_ref().display()))]
    pub async fn write_to(&self, path: impl AsRef<Path>) -> Result<(), AggregateError> {
        let path = path.as_ref();
        tokio::fs::write(path, &self.xml)
            .await
            .map_err(|source| AggregateError::Io {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Merges per-date documents into one chronologically ordered document.
///
/// Iterates the mapping in ascending date order, groups each day's root
/// children under a `DateSection`, and records the total grouped element
/// count in `stats`. Days that fail to parse are logged and skipped.
///
/// # Errors
///
/// Returns [`AggregateError::Xml`] only if the surrounding document cannot
/// be assembled; per-day parse failures never propagate.
#[instrument(skip_all, fields(days = documents.len()))]
pub fn consolidate(
    documents: &BTreeMap<NaiveDate, String>,
    stats: &FetchStats,
) -> Result<Consolidated, AggregateError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(quick_xml::Error::from)?;
    writer
        .write_event(Event::Start(BytesStart::new("ConsolidatedFixtures")))
        .map_err(quick_xml::Error::from)?;

    let mut item_count = 0usize;
    let mut date_count = 0usize;

    for (date, content) in documents {
        match render_day(*date, content) {
            Ok((section, children)) => {
                writer.get_mut().extend_from_slice(&section);
                item_count += children;
                date_count += 1;
            }
            Err(e) => {
                warn!(%date, error = %e, "skipping malformed day");
            }
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new("ConsolidatedFixtures")))
        .map_err(quick_xml::Error::from)?;

    stats.set_total_items(item_count);
    debug!(item_count, date_count, "consolidation complete");

    Ok(Consolidated {
        xml: String::from_utf8_lossy(&writer.into_inner()).into_owned(),
        item_count,
        date_count,
    })
}

/// Renders one day into a standalone `DateSection` buffer.
///
/// Returns the serialized section and the number of direct children of the
/// day's root element. Errors leave the consolidated output untouched.
fn render_day(date: NaiveDate, content: &str) -> Result<(Vec<u8>, usize), DayError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut writer = Writer::new(Vec::new());
    let mut section = BytesStart::new("DateSection");
    let date_attr = date.format("%Y-%m-%d").to_string();
    section.push_attribute(("date", date_attr.as_str()));
    writer
        .write_event(Event::Start(section))
        .map_err(quick_xml::Error::from)?;

    // Depth 1 is the day's root element; its children live at depth 2.
    let mut depth = 0usize;
    let mut children = 0usize;
    let mut saw_root = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                saw_root = true;
                if depth >= 2 {
                    if depth == 2 {
                        children += 1;
                    }
                    writer
                        .write_event(Event::Start(e))
                        .map_err(quick_xml::Error::from)?;
                }
            }
            Event::Empty(e) => {
                if depth == 0 {
                    // An empty root element carries no children.
                    saw_root = true;
                } else {
                    if depth == 1 {
                        children += 1;
                    }
                    writer
                        .write_event(Event::Empty(e))
                        .map_err(quick_xml::Error::from)?;
                }
            }
            Event::End(e) => {
                if depth >= 2 {
                    writer
                        .write_event(Event::End(e))
                        .map_err(quick_xml::Error::from)?;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(t) => {
                if depth >= 2 {
                    writer
                        .write_event(Event::Text(t))
                        .map_err(quick_xml::Error::from)?;
                }
            }
            Event::CData(c) => {
                if depth >= 2 {
                    writer
                        .write_event(Event::CData(c))
                        .map_err(quick_xml::Error::from)?;
                }
            }
            Event::Eof => break,
            // Declarations, comments and processing instructions from the
            // source documents are not carried over.
            _ => {}
        }
    }

    if !saw_root {
        return Err(DayError::NoRoot);
    }

    writer
        .write_event(Event::End(BytesEnd::new("DateSection")))
        .map_err(quick_xml::Error::from)?;

    Ok((writer.into_inner(), children))
}
