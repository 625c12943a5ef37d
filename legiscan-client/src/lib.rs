//! Caching client for the LegiScan legislative data API
//!
//! The client layers a local cache between callers and the remote API:
//!
//! - every fetch consults the cache under a canonical key before touching
//!   the network, and writes the result back with a policy TTL (unbounded
//!   for immutable documents, configurable for everything else);
//! - weekly dataset archives bulk-warm the cache without clobbering bills
//!   that a later incremental fetch may have made more current;
//! - the hourly masterlist's change hashes drive incremental sync, so only
//!   bills that actually changed are re-fetched.
//!
//! ## Architecture
//!
//! ```text
//! caller ──► LegiscanClient ──► cache (FileCache / NoopCache)
//!                 │   miss
//!                 ▼
//!             ApiClient ──► Transport (ureq)
//! ```
//!
//! The dataset loader and bill synchronizer are composed on top of the same
//! cache, not a separate store.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use legiscan_client::{ClientConfig, LegiscanClient};
//!
//! let client = LegiscanClient::new(ClientConfig::new(api_key))?;
//!
//! // Bulk load a session, then keep it current from the masterlist
//! let contents = client.load_dataset_for("TX", 2023, false)?;
//! let updated = client.sync_bills(2049)?;
//! ```
//!
//! The typical workflow for maintaining session data begins with bulk
//! loading the appropriate dataset, then periodically diffing the
//! masterlist change hashes and re-fetching the bills that changed.

pub mod api;
pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod keys;
pub mod sync;
pub mod transport;
pub mod views;

pub use cache::{CacheEntry, FileCache, LegiscanCache, NoopCache};
pub use config::ClientConfig;
pub use dataset::DatasetContents;
pub use error::{LegiscanError, Result};
pub use transport::{Transport, TransportResponse, UreqTransport};
pub use views::{
    Amendment, ApiResponse, Bill, BillSummary, BillText, DatasetInfo, MasterList, Person,
    RollCall, SearchPage, SessionInfo, SponsoredBill, Supplement,
};

use std::sync::Arc;
use std::time::Duration;

use api::ApiClient;

/// The caching LegiScan client
///
/// Wraps the raw API client with the cache store; all `fetch_*` operations
/// are cache-first. Construction fails fast on unusable configuration.
pub struct LegiscanClient {
    pub(crate) config: ClientConfig,
    pub(crate) api: ApiClient,
    pub(crate) cache: Box<dyn LegiscanCache>,
}

impl LegiscanClient {
    /// Create a client with the real HTTP transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self::with_transport(config, Arc::new(UreqTransport::new(timeout)))
    }

    /// Create a client with a custom transport backend
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let cache: Box<dyn LegiscanCache> = if config.cache_enabled {
            Box::new(FileCache::new(&config.cache_dir)?)
        } else {
            Box::new(NoopCache)
        };
        let api = ApiClient::new(&config.api_key, &config.base_url, transport)?;
        Ok(Self { config, api, cache })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &dyn LegiscanCache {
        self.cache.as_ref()
    }

    /// Cache-first envelope fetch. A cached entry that no longer decodes is
    /// evicted and re-fetched rather than failing the request.
    fn envelope(&self, op: &str, params: &[(&str, &str)]) -> Result<ApiResponse> {
        let key = keys::cache_key(op, params);

        if let Some(value) = self.cache.get_or_expire(&key) {
            match serde_json::from_value::<ApiResponse>(value) {
                Ok(envelope) => {
                    tracing::debug!(%key, "pulling object from cache");
                    return Ok(envelope);
                }
                Err(err) => {
                    tracing::warn!(%key, %err, "cached envelope undecodable, refetching");
                    self.cache.remove(&key);
                }
            }
        }

        tracing::info!(%key, "fetching object from LegiScan");
        let value = self.api.request_value(op, params)?;
        self.cache
            .put(&key, value.clone(), keys::ttl_for(op, self.config.cache_ttl_secs));
        serde_json::from_value(value).map_err(Into::into)
    }

    /// Retrieve bill detail for a bill id.
    ///
    /// Refresh frequency: 3 hours.
    pub fn fetch_bill(&self, bill_id: i32) -> Result<Bill> {
        let id = bill_id.to_string();
        let response = self.envelope("getBill", &[("id", &id)])?;
        require(response.bill, "bill")
    }

    /// Retrieve an individual copy of a bill text document. The text itself
    /// is base64 encoded to allow binary PDF/Word transfers.
    ///
    /// Refresh frequency: static.
    pub fn fetch_bill_text(&self, doc_id: i32) -> Result<BillText> {
        let id = doc_id.to_string();
        let response = self.envelope("getBillText", &[("id", &id)])?;
        require(response.text, "text")
    }

    /// Retrieve sponsor information for a people id. Person records reflect
    /// current status; `person_hash` detects changes.
    pub fn fetch_person(&self, people_id: i32) -> Result<Person> {
        let id = people_id.to_string();
        let response = self.envelope("getPerson", &[("id", &id)])?;
        require(response.person, "person")
    }

    /// Retrieve a vote record with summary and individual vote detail.
    ///
    /// Refresh frequency: static.
    pub fn fetch_roll_call(&self, roll_call_id: i32) -> Result<RollCall> {
        let id = roll_call_id.to_string();
        let response = self.envelope("getRollCall", &[("id", &id)])?;
        require(response.rollcall, "rollcall")
    }

    /// Retrieve amendment text for an amendment id.
    ///
    /// Refresh frequency: static.
    pub fn fetch_amendment(&self, amendment_id: i32) -> Result<Amendment> {
        let id = amendment_id.to_string();
        let response = self.envelope("getAmendment", &[("id", &id)])?;
        require(response.amendment, "amendment")
    }

    /// Retrieve a supplemental document (fiscal note, veto letter, etc.).
    ///
    /// Refresh frequency: static.
    pub fn fetch_supplement(&self, supplement_id: i32) -> Result<Supplement> {
        let id = supplement_id.to_string();
        let response = self.envelope("getSupplement", &[("id", &id)])?;
        require(response.supplement, "supplement")
    }

    /// Retrieve the master list of summary bill data for a session,
    /// optimized for change-hash comparison.
    ///
    /// Refresh frequency: 1 hour.
    pub fn fetch_masterlist(&self, session_id: i32) -> Result<MasterList> {
        let id = session_id.to_string();
        let response = self.envelope("getMasterListRaw", &[("id", &id)])?;
        require(response.masterlist, "masterlist")
    }

    /// Retrieve the master list for the current session in a state
    pub fn fetch_masterlist_for_state(&self, state: &str) -> Result<MasterList> {
        let response = self.envelope("getMasterListRaw", &[("state", state)])?;
        require(response.masterlist, "masterlist")
    }

    /// Retrieve the sessions available for a state, or all sessions when no
    /// state is given.
    ///
    /// Refresh frequency: daily.
    pub fn fetch_session_list(&self, state: Option<&str>) -> Result<Vec<SessionInfo>> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(state) = state {
            params.push(("state", state));
        }
        let response = self.envelope("getSessionList", &params)?;
        require(response.sessions, "sessions")
    }

    /// Retrieve the list of downloadable session datasets, with optional
    /// state and year filtering. The returned `access_key` is required for
    /// [`fetch_dataset_archive`](Self::fetch_dataset_archive).
    pub fn fetch_dataset_list(
        &self,
        state: Option<&str>,
        year: Option<i32>,
    ) -> Result<Vec<DatasetInfo>> {
        let year = year.map(|y| y.to_string());
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(state) = state {
            params.push(("state", state));
        }
        if let Some(year) = year.as_deref() {
            params.push(("year", year));
        }
        let response = self.envelope("getDatasetList", &params)?;
        require(response.datasetlist, "datasetlist")
    }

    /// Retrieve the dataset ZIP archive as raw bytes, cached like any other
    /// resource but on the byte path (the body is binary, not an envelope).
    pub fn fetch_dataset_archive(&self, session_id: i32, access_key: &str) -> Result<Vec<u8>> {
        let id = session_id.to_string();
        let params = [("id", id.as_str()), ("access_key", access_key), ("format", "json")];
        let key = keys::cache_key("getDatasetRaw", &params);

        if let Some(bytes) = self.cache.bytes_or_expire(&key) {
            tracing::debug!(%key, "pulling dataset archive from cache");
            return Ok(bytes);
        }

        tracing::info!(%key, "fetching dataset archive from LegiScan");
        let bytes = self.api.request_raw("getDatasetRaw", &params)?;
        self.cache.put_bytes(
            &key,
            &bytes,
            keys::ttl_for("getDatasetRaw", self.config.cache_ttl_secs),
        );
        Ok(bytes)
    }

    /// Retrieve the legislators active in a session (sponsor or vote
    /// activity).
    ///
    /// Refresh frequency: weekly.
    pub fn fetch_session_people(&self, session_id: i32) -> Result<Vec<Person>> {
        let id = session_id.to_string();
        let response = self.envelope("getSessionPeople", &[("id", &id)])?;
        require(response.sessionpeople, "sessionpeople")
    }

    /// Retrieve the bills sponsored by a legislator
    pub fn fetch_sponsored_list(&self, people_id: i32) -> Result<Vec<SponsoredBill>> {
        let id = people_id.to_string();
        let response = self.envelope("getSponsoredList", &[("id", &id)])?;
        require(response.sponsoredbills, "sponsoredbills")
    }

    /// Full-text search against the national database. Interactive and
    /// paginated, so results are never cached.
    pub fn search(
        &self,
        state: &str,
        query: &str,
        year: Option<i32>,
        page: Option<i32>,
    ) -> Result<SearchPage> {
        let year = year.map(|y| y.to_string());
        let page = page.map(|p| p.to_string());
        let mut params: Vec<(&str, &str)> = vec![("state", state), ("query", query)];
        if let Some(year) = year.as_deref() {
            params.push(("year", year));
        }
        if let Some(page) = page.as_deref() {
            params.push(("page", page));
        }
        let value = self.api.request_value("getSearch", &params)?;
        let response: ApiResponse = serde_json::from_value(value)?;
        require(response.searchresult, "searchresult")
    }

    /// Bulk load a dataset archive into the cache and return its contents.
    /// Bills already in the cache are not overwritten; see
    /// [`dataset`](crate::dataset) for the merge rules.
    pub fn load_dataset(&self, dataset: &DatasetInfo) -> Result<DatasetContents> {
        dataset::load(self, dataset)
    }

    /// Look up the dataset for a state, year and special-session flag, then
    /// bulk load it.
    pub fn load_dataset_for(&self, state: &str, year: i32, special: bool) -> Result<DatasetContents> {
        let datasets = self.fetch_dataset_list(Some(state), Some(year))?;
        let wanted = datasets
            .into_iter()
            .find(|d| (d.special != 0) == special)
            .ok_or_else(|| LegiscanError::Protocol {
                message: format!("no dataset listed for {state} {year} (special: {special})"),
            })?;
        self.load_dataset(&wanted)
    }

    /// Fetch the masterlist for a session and re-fetch every bill whose
    /// change hash differs from the cached copy. Returns the bills that
    /// were added or updated. Bills the masterlist proves current get their
    /// TTL refreshed without a network call.
    pub fn sync_bills(&self, session_id: i32) -> Result<Vec<Bill>> {
        sync::sync_bills(self, session_id)
    }
}

fn require<T>(payload: Option<T>, what: &str) -> Result<T> {
    payload.ok_or_else(|| LegiscanError::Decode(format!("response missing {what} payload")))
}
