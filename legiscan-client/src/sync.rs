//! Incremental bill synchronization
//!
//! Full bill payloads are expensive and rate-limited; the masterlist is
//! cheap and refreshed hourly. Comparing its change hashes against the
//! cached bills lets sync fetch only what actually changed, and gives every
//! bill the masterlist proves current a fresh TTL window without a fetch.

use crate::cache::{CacheEntry, LegiscanCache};
use crate::error::Result;
use crate::keys;
use crate::views::{ApiResponse, Bill, BillSummary};
use crate::LegiscanClient;

pub(crate) fn sync_bills(client: &LegiscanClient, session_id: i32) -> Result<Vec<Bill>> {
    tracing::info!(session_id, "updating bills from the masterlist");
    let masterlist = client.fetch_masterlist(session_id)?;

    let dirty = masterlist
        .bills
        .values()
        .filter(|summary| cached_current(client, summary).is_none())
        .count();
    tracing::info!(dirty, total = masterlist.bills.len(), "will fetch changed bills from LegiScan");

    let mut updated = Vec::with_capacity(dirty);
    for summary in masterlist.bills.values() {
        let id = summary.bill_id.to_string();
        let key = keys::cache_key("getBill", &[("id", &id)]);

        match cached_current(client, summary) {
            None => {
                client.cache.remove(&key);
                let bill = client.fetch_bill(summary.bill_id)?;
                updated.push(bill);
            }
            Some(entry) if entry.is_expired() => {
                // The masterlist just verified this copy, so extend its TTL
                // in place instead of re-fetching
                client.cache.put(
                    &key,
                    entry.value,
                    keys::ttl_for("getBill", client.config.cache_ttl_secs),
                );
            }
            Some(_) => {}
        }
    }

    Ok(updated)
}

/// The cached entry for this bill when it is present, decodable, and its
/// change hash matches the summary's; `None` means the bill is dirty.
fn cached_current(client: &LegiscanClient, summary: &BillSummary) -> Option<CacheEntry> {
    let id = summary.bill_id.to_string();
    let key = keys::cache_key("getBill", &[("id", &id)]);
    let entry = client.cache.peek(&key)?;
    let bill = serde_json::from_value::<ApiResponse>(entry.value.clone())
        .ok()?
        .bill?;
    (bill.change_hash == summary.change_hash).then_some(entry)
}
