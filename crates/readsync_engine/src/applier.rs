//! Delta application.

use readsync_protocol::SyncResponse;
use readsync_store::{AccountId, CatalogTxn, StoreResult};

/// Counts of what one delta changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeltaSummary {
    /// Entries in the add/update list.
    pub additions: usize,
    /// Entries in the removal list.
    pub removals: usize,
    /// Catalog items created by this delta.
    pub items_created: usize,
    /// Ownership links created by this delta.
    pub links_created: usize,
    /// Ownership links removed by this delta.
    pub links_removed: usize,
}

/// Applies a parsed delta for one account inside a store transaction.
///
/// Additions run before removals. Every step is idempotent: an item seen
/// before keeps its original fields, an existing link is left alone and
/// removing an absent link changes nothing. Applying the same response
/// twice therefore yields the same catalog as applying it once.
pub fn apply_delta(
    txn: &mut dyn CatalogTxn,
    account_id: AccountId,
    response: &SyncResponse,
) -> StoreResult<DeltaSummary> {
    let mut summary = DeltaSummary {
        additions: response.additions.len(),
        removals: response.removals.len(),
        ..DeltaSummary::default()
    };

    for item in &response.additions {
        let (_, created) = txn.get_or_create_item(item.clone())?;
        if created {
            summary.items_created += 1;
        }
        if txn.ensure_link(account_id, &item.asin)? {
            summary.links_created += 1;
        }
        tracing::debug!(account = %account_id, asin = %item.asin, created, "applied addition");
    }

    for asin in &response.removals {
        let removed = txn.remove_link(account_id, asin)?;
        if removed {
            summary.links_removed += 1;
        }
        tracing::debug!(account = %account_id, asin = %asin, removed, "applied removal");
    }

    Ok(summary)
}
