//! Bulk dataset loading
//!
//! A dataset is a ZIP archive of per-entity JSON files (people, bills,
//! votes) for one legislative session, refreshed upstream at most weekly.
//! Loading expands the archive and merges every record into the cache.
//!
//! Merge rule: people and votes are unconditionally replaced, but a bill
//! already in the cache is kept. The API has no last-update date, only a
//! change hash, so a bill fetched incrementally since the archive was cut
//! may be more current than the archive's copy — "already cached" wins.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use walkdir::WalkDir;

use crate::cache::LegiscanCache;
use crate::error::{LegiscanError, Result};
use crate::keys;
use crate::views::{ApiResponse, Bill, DatasetInfo, Person, RollCall};
use crate::LegiscanClient;

/// Records loaded from one dataset archive, keyed by entity id
#[derive(Debug, Default)]
pub struct DatasetContents {
    pub people: HashMap<i32, Person>,
    pub bills: HashMap<i32, Bill>,
    pub votes: HashMap<i32, RollCall>,
}

pub(crate) fn load(client: &LegiscanClient, dataset: &DatasetInfo) -> Result<DatasetContents> {
    let session = dataset.session_name.as_deref().unwrap_or("unnamed session");
    tracing::info!(session, session_id = dataset.session_id, "bulk loading dataset");

    let access_key = dataset.access_key.as_deref().ok_or_else(|| {
        LegiscanError::Decode("dataset descriptor has no access_key".to_string())
    })?;
    let bytes = client.fetch_dataset_archive(dataset.session_id, access_key)?;

    // The temp file is removed on drop, covering every exit path below
    let mut archive_file = tempfile::NamedTempFile::new()?;
    archive_file.write_all(&bytes)?;

    let extract_dir = client
        .config
        .extract_root()
        .join(dataset.state_id.to_string())
        .join(dataset.year_end.unwrap_or_default().to_string())
        .join(dataset.session_id.to_string());
    fs::create_dir_all(&extract_dir)?;

    let file = File::open(archive_file.path())?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|err| archive_error(archive_file.path(), err))?;
    archive
        .extract(&extract_dir)
        .map_err(|err| archive_error(&extract_dir, err))?;

    let mut contents = DatasetContents::default();
    load_people(client, &extract_dir, &mut contents)?;
    load_bills(client, &extract_dir, &mut contents)?;
    load_votes(client, &extract_dir, &mut contents)?;

    tracing::info!(
        session,
        people = contents.people.len(),
        bills = contents.bills.len(),
        votes = contents.votes.len(),
        cache = client.cache.name(),
        "bulk load complete"
    );
    Ok(contents)
}

fn load_people(client: &LegiscanClient, root: &Path, contents: &mut DatasetContents) -> Result<()> {
    let Some(dir) = find_subtree(root, "people") else {
        tracing::warn!(root = %root.display(), "archive has no people directory");
        return Ok(());
    };
    let ttl = keys::ttl_for("getPerson", client.config.cache_ttl_secs);
    for path in json_files(&dir) {
        let envelope = read_envelope(&path)?;
        let person: Person = payload(&envelope, "person", &path)?;
        let id = person.people_id.to_string();
        let key = keys::cache_key("getPerson", &[("id", &id)]);
        client.cache.put(&key, envelope, ttl);
        contents.people.insert(person.people_id, person);
    }
    Ok(())
}

fn load_bills(client: &LegiscanClient, root: &Path, contents: &mut DatasetContents) -> Result<()> {
    let Some(dir) = find_subtree(root, "bill") else {
        tracing::warn!(root = %root.display(), "archive has no bill directory");
        return Ok(());
    };
    let ttl = keys::ttl_for("getBill", client.config.cache_ttl_secs);
    for path in json_files(&dir) {
        let envelope = read_envelope(&path)?;
        let bill: Bill = payload(&envelope, "bill", &path)?;
        let id = bill.bill_id.to_string();
        let key = keys::cache_key("getBill", &[("id", &id)]);

        match client.cache.peek(&key) {
            None => {
                client.cache.put(&key, envelope, ttl);
                contents.bills.insert(bill.bill_id, bill);
            }
            Some(entry) => {
                let cached = serde_json::from_value::<ApiResponse>(entry.value)
                    .ok()
                    .and_then(|response| response.bill);
                match cached {
                    Some(cached) => {
                        contents.bills.insert(bill.bill_id, cached);
                    }
                    None => {
                        tracing::warn!(%key, "cached bill undecodable, replacing with archive copy");
                        client.cache.put(&key, envelope, ttl);
                        contents.bills.insert(bill.bill_id, bill);
                    }
                }
            }
        }
    }
    Ok(())
}

fn load_votes(client: &LegiscanClient, root: &Path, contents: &mut DatasetContents) -> Result<()> {
    let Some(dir) = find_subtree(root, "vote") else {
        tracing::warn!(root = %root.display(), "archive has no vote directory");
        return Ok(());
    };
    let ttl = keys::ttl_for("getRollCall", client.config.cache_ttl_secs);
    for path in json_files(&dir) {
        let envelope = read_envelope(&path)?;
        let roll_call: RollCall = payload(&envelope, "rollcall", &path)?;
        let id = roll_call.roll_call_id.to_string();
        let key = keys::cache_key("getRollCall", &[("id", &id)]);
        client.cache.put(&key, envelope, ttl);
        contents.votes.insert(roll_call.roll_call_id, roll_call);
    }
    Ok(())
}

/// Locate a directory named `name` anywhere under `root`
fn find_subtree(root: &Path, name: &str) -> Option<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|entry| entry.file_type().is_dir() && entry.file_name() == name)
        .map(|entry| entry.into_path())
}

fn json_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .map(|entry| entry.into_path())
        .collect()
}

fn read_envelope(path: &Path) -> Result<Value> {
    let data = fs::read(path).map_err(|err| archive_error(path, err))?;
    serde_json::from_slice(&data).map_err(|err| archive_error(path, err))
}

fn payload<T: DeserializeOwned>(envelope: &Value, field: &str, path: &Path) -> Result<T> {
    let value = envelope
        .get(field)
        .cloned()
        .ok_or_else(|| archive_error(path, format!("missing {field} record")))?;
    serde_json::from_value(value).map_err(|err| archive_error(path, err))
}

fn archive_error(path: &Path, err: impl std::fmt::Display) -> LegiscanError {
    LegiscanError::Archive {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
