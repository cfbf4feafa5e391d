//! Sync request paths and sync response parsing.

use crate::error::{ProtocolError, ProtocolResult};
use crate::xml::{parse_document, Element};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use readsync_store::CatalogItem;

/// `strftime` format of `publication_date` in sync responses.
pub const PUBLICATION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+0000";

/// Builds the path (with query) of a sync request.
///
/// The checkpoint is only sent for incremental syncs, and is inserted
/// verbatim since it is an opaque marker issued by the service.
pub fn sync_request_path(base_path: &str, checkpoint: Option<&str>, force_full_sync: bool) -> String {
    match checkpoint {
        Some(checkpoint) if !force_full_sync => {
            format!("{base_path}?last_sync_time={checkpoint}")
        }
        _ => base_path.to_string(),
    }
}

/// A parsed sync response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResponse {
    /// The next checkpoint (first `;` segment of `sync_time`).
    pub checkpoint: String,
    /// The `syncType` attribute of the root element.
    pub sync_type: String,
    /// Entries of `add_update_list`, in document order.
    pub additions: Vec<CatalogItem>,
    /// ASINs of `removal_list`, in document order.
    pub removals: Vec<String>,
}

impl SyncResponse {
    /// Returns true if the response carries no changes.
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }
}

/// Parses the body of a `200 OK` sync response.
///
/// The whole delta is parsed before anything is returned, so a bad entry
/// anywhere rejects the response as a unit.
///
/// # Errors
///
/// Returns [`ProtocolError::Malformed`] if the document cannot be parsed,
/// lacks `sync_time` or `syncType`, contains a `meta_data` entry without
/// an `ASIN`, or has a `publication_date` in another format.
pub fn parse_sync_response(body: &[u8]) -> ProtocolResult<SyncResponse> {
    let root = parse_document(body)?;

    let sync_time = root
        .find_text("sync_time")
        .ok_or_else(|| ProtocolError::malformed("sync response lacks sync_time"))?;
    let checkpoint = sync_time
        .split(';')
        .next()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| ProtocolError::malformed(format!("empty sync_time {sync_time:?}")))?;

    let sync_type = root
        .attribute("syncType")
        .ok_or_else(|| ProtocolError::malformed("sync response lacks syncType"))?;

    let additions = entries(&root, "add_update_list")
        .map(parse_addition)
        .collect::<ProtocolResult<Vec<_>>>()?;
    let removals = entries(&root, "removal_list")
        .map(|entry| required_asin(entry).map(str::to_string))
        .collect::<ProtocolResult<Vec<_>>>()?;

    Ok(SyncResponse {
        checkpoint: checkpoint.to_string(),
        sync_type: sync_type.to_string(),
        additions,
        removals,
    })
}

fn entries<'a>(root: &'a Element, list: &'a str) -> impl Iterator<Item = &'a Element> {
    root.child(list)
        .into_iter()
        .flat_map(|list| list.children_named("meta_data"))
}

fn required_asin(entry: &Element) -> ProtocolResult<&str> {
    entry
        .find_text("ASIN")
        .ok_or_else(|| ProtocolError::malformed("meta_data entry without ASIN"))
}

fn parse_addition(entry: &Element) -> ProtocolResult<CatalogItem> {
    let asin = required_asin(entry)?;
    let publication_date = entry
        .find_text("publication_date")
        .map(parse_publication_date)
        .transpose()?;

    // Only the first author is kept.
    Ok(CatalogItem {
        asin: asin.to_string(),
        title: entry.find_text("title").map(str::to_string),
        author: entry.find_text("authors/author").map(str::to_string),
        publisher: entry.find_text("publisher").map(str::to_string),
        publication_date,
    })
}

fn parse_publication_date(value: &str) -> ProtocolResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, PUBLICATION_DATE_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|e| ProtocolError::malformed(format!("bad publication_date {value:?}: {e}")))
}
