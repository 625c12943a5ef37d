//! FileCache tests

use std::fs;
use std::thread::sleep;
use std::time::Duration;

use legiscan_client::cache::{FileCache, LegiscanCache, NoopCache};
use serde_json::json;
use tempfile::TempDir;

fn temp_cache() -> (TempDir, FileCache) {
    let dir = TempDir::new().unwrap();
    let cache = FileCache::new(dir.path()).unwrap();
    (dir, cache)
}

fn entry_count(dir: &TempDir) -> usize {
    fs::read_dir(dir.path()).unwrap().count()
}

#[test]
fn test_put_and_get() {
    let (_dir, cache) = temp_cache();

    cache.put("getbill/100", json!({"foo": "bar"}), 3600);

    let value = cache.get_or_expire("getbill/100").unwrap();
    assert_eq!(value["foo"], "bar");
    assert!(cache.contains_valid("getbill/100"));
}

#[test]
fn test_overwrite_value() {
    let (_dir, cache) = temp_cache();

    cache.put("overwrite", json!({"a": "1"}), 3600);
    cache.put("overwrite", json!({"a": "2"}), 3600);

    let value = cache.get_or_expire("overwrite").unwrap();
    assert_eq!(value["a"], "2");
}

#[test]
fn test_miss_on_absent_key() {
    let (_dir, cache) = temp_cache();

    assert!(cache.get_or_expire("nothing-here").is_none());
    assert!(cache.peek("nothing-here").is_none());
    assert!(!cache.contains_valid("nothing-here"));
}

#[test]
fn test_expired_entry_is_deleted_on_get() {
    let (dir, cache) = temp_cache();

    cache.put("getbill/100", json!({"bill": {"bill_id": 100}}), 1);
    assert_eq!(entry_count(&dir), 1);

    sleep(Duration::from_millis(1200));

    assert!(cache.get_or_expire("getbill/100").is_none());
    // The backing file is gone, not just hidden
    assert_eq!(entry_count(&dir), 0);
}

#[test]
fn test_zero_ttl_never_expires() {
    let (_dir, cache) = temp_cache();

    cache.put("getrollcall/55", json!({"rollcall": {}}), 0);
    sleep(Duration::from_millis(1100));

    assert!(cache.get_or_expire("getrollcall/55").is_some());
    assert!(cache.contains_valid("getrollcall/55"));
}

#[test]
fn test_peek_returns_expired_entries_without_side_effects() {
    let (dir, cache) = temp_cache();

    cache.put("stale", json!({"v": 1}), 1);
    sleep(Duration::from_millis(1200));

    let entry = cache.peek("stale").unwrap();
    assert!(entry.is_expired());
    assert_eq!(entry.ttl_secs, 1);

    // Still present after peeking
    assert!(cache.peek("stale").is_some());
    assert_eq!(entry_count(&dir), 1);
    assert!(!cache.contains_valid("stale"));
}

#[test]
fn test_remove_is_idempotent() {
    let (_dir, cache) = temp_cache();

    cache.remove("never-existed");

    cache.put("gone", json!({"v": 1}), 3600);
    cache.remove("gone");
    assert!(cache.get_or_expire("gone").is_none());
    cache.remove("gone");
}

#[test]
fn test_corrupt_entry_is_a_miss() {
    let (dir, cache) = temp_cache();

    // Key sanitization maps "getbill/100" to this file name
    fs::write(dir.path().join("getbill_100.json"), "definitely not json").unwrap();

    assert!(cache.get_or_expire("getbill/100").is_none());
    assert!(cache.peek("getbill/100").is_none());

    // A fresh put recovers the slot
    cache.put("getbill/100", json!({"ok": true}), 3600);
    assert!(cache.get_or_expire("getbill/100").is_some());
}

#[test]
fn test_entry_file_carries_expiry_metadata() {
    let (dir, cache) = temp_cache();

    cache.put("getbill/7", json!({"bill": {"bill_id": 7}}), 900);

    let raw = fs::read_to_string(dir.path().join("getbill_7.json")).unwrap();
    assert!(raw.contains("written_at"));
    assert!(raw.contains("ttl_secs"));
}

#[test]
fn test_bytes_roundtrip() {
    let (_dir, cache) = temp_cache();

    let payload = b"PK\x03\x04 not really a zip".to_vec();
    cache.put_bytes("getdatasetraw/abc/json/2049", &payload, 3600);

    let restored = cache.bytes_or_expire("getdatasetraw/abc/json/2049").unwrap();
    assert_eq!(restored, payload);
}

#[test]
fn test_non_byte_entry_misses_on_byte_path() {
    let (_dir, cache) = temp_cache();

    cache.put("weird", json!({"not": "bytes"}), 3600);
    assert!(cache.bytes_or_expire("weird").is_none());
    // Evicted so the next fetch repopulates it
    assert!(cache.peek("weird").is_none());
}

#[test]
fn test_noop_cache_never_stores() {
    let cache = NoopCache;

    cache.put("anything", json!({"v": 1}), 3600);
    assert!(cache.get_or_expire("anything").is_none());
    assert!(cache.peek("anything").is_none());
    assert!(!cache.contains_valid("anything"));
}
