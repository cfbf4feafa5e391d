//! Property-based test generators using proptest.

use crate::responses::{MetaData, SyncResponseBuilder};
use proptest::collection::vec;
use proptest::prelude::*;

/// Generates ASIN-like identifiers from a small pool, so that generated
/// deltas repeat and remove the same items.
pub fn asin_strategy() -> impl Strategy<Value = String> {
    (0u8..12).prop_map(|n| format!("B00TEST{n:03}"))
}

/// Generates an optional printable text field.
fn text_strategy() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[A-Za-z0-9 &<>'.,-]{1,24}")
}

/// Generates one `meta_data` entry for the add/update list.
pub fn meta_data_strategy() -> impl Strategy<Value = MetaData> {
    (
        asin_strategy(),
        text_strategy(),
        vec("[A-Za-z .]{1,16}", 0..3),
        text_strategy(),
    )
        .prop_map(|(asin, title, authors, publisher)| {
            let mut entry = MetaData::new(asin);
            if let Some(title) = title {
                entry = entry.title(title);
            }
            for author in authors {
                entry = entry.author(author);
            }
            if let Some(publisher) = publisher {
                entry = entry.publisher(publisher);
            }
            entry
        })
}

/// A generated delta: its document plus the ASINs it adds and removes.
#[derive(Debug, Clone)]
pub struct GeneratedDelta {
    /// Rendered sync response.
    pub body: String,
    /// ASINs in the add/update list, in order.
    pub added: Vec<String>,
    /// ASINs in the removal list, in order.
    pub removed: Vec<String>,
}

/// Generates a complete sync response.
pub fn sync_delta_strategy() -> impl Strategy<Value = GeneratedDelta> {
    (vec(meta_data_strategy(), 0..8), vec(asin_strategy(), 0..4)).prop_map(
        |(entries, removed)| {
            let added = entries
                .iter()
                .filter_map(|entry| entry.asin().map(str::to_string))
                .collect();
            let builder = entries
                .into_iter()
                .fold(SyncResponseBuilder::new("2020-01-01T00:00:00Z"), |b, entry| {
                    b.add(entry)
                });
            let builder = removed
                .iter()
                .fold(builder, |b, asin| b.remove(asin.clone()));
            GeneratedDelta {
                body: builder.build(),
                added,
                removed,
            }
        },
    )
}
