//! Typed records for the API's JSON shapes
//!
//! Field names mirror the wire format; unknown fields are ignored. The
//! API is not consistent about shapes — some fields arrive as a single
//! object or an array depending on the record, and the masterlist and
//! search results are maps keyed by numeric strings with metadata entries
//! interleaved. Those are normalized here, at the envelope boundary, so
//! the rest of the crate sees one shape.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Response envelope common to every JSON operation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiResponse {
    pub status: Option<String>,
    pub alert: Option<Alert>,
    pub bill: Option<Bill>,
    pub person: Option<Person>,
    pub rollcall: Option<RollCall>,
    pub text: Option<BillText>,
    pub amendment: Option<Amendment>,
    pub supplement: Option<Supplement>,
    pub sessions: Option<Vec<SessionInfo>>,
    pub masterlist: Option<MasterList>,
    pub datasetlist: Option<Vec<DatasetInfo>>,
    pub dataset: Option<DatasetInfo>,
    pub searchresult: Option<SearchPage>,
    pub sessionpeople: Option<Vec<Person>>,
    pub sponsoredbills: Option<Vec<SponsoredBill>>,
}

/// Application-level failure reported inside a 2xx response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
}

/// Full bill record. `change_hash` is the only authoritative indicator of
/// whether a cached copy is current; the API has no last-modified date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub bill_id: i32,
    #[serde(default)]
    pub change_hash: Option<String>,
    #[serde(default)]
    pub session_id: Option<i32>,
    #[serde(default)]
    pub bill_number: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub state_id: Option<i32>,
    #[serde(default)]
    pub status: Option<i32>,
    #[serde(default)]
    pub status_date: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub state_link: Option<String>,
    // Arrives as a single object or an array depending on the bill
    #[serde(default, deserialize_with = "one_or_many")]
    pub committee: Vec<Committee>,
    #[serde(default)]
    pub sponsors: Vec<Sponsor>,
    #[serde(default)]
    pub progress: Vec<Progress>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Committee {
    pub committee_id: Option<i32>,
    pub chamber: Option<String>,
    pub chamber_id: Option<i32>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sponsor {
    pub people_id: Option<i32>,
    pub name: Option<String>,
    pub party: Option<String>,
    pub sponsor_type_id: Option<i32>,
    pub sponsor_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    pub date: Option<String>,
    pub event: Option<i32>,
}

/// Legislator record. `person_hash` plays the same role for people that
/// `change_hash` plays for bills.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub people_id: i32,
    #[serde(default)]
    pub person_hash: Option<String>,
    #[serde(default)]
    pub state_id: Option<i32>,
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
}

/// Roll-call detail with per-legislator votes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollCall {
    pub roll_call_id: i32,
    #[serde(default)]
    pub bill_id: Option<i32>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub yea: i32,
    #[serde(default)]
    pub nay: i32,
    #[serde(default)]
    pub nv: i32,
    #[serde(default)]
    pub absent: i32,
    #[serde(default)]
    pub total: i32,
    #[serde(default)]
    pub passed: Option<i32>,
    #[serde(default)]
    pub chamber: Option<String>,
    #[serde(default)]
    pub chamber_id: Option<i32>,
    #[serde(default)]
    pub votes: Vec<VoteRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteRecord {
    pub people_id: Option<i32>,
    pub vote_id: Option<i32>,
    pub vote_text: Option<String>,
}

/// Bill text document; `doc` is base64 to allow binary PDF/Word transfers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillText {
    pub doc_id: i32,
    #[serde(default)]
    pub bill_id: Option<i32>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub type_id: Option<i32>,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub mime_id: Option<i32>,
    #[serde(default)]
    pub text_size: Option<i64>,
    #[serde(default)]
    pub text_hash: Option<String>,
    #[serde(default)]
    pub doc: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Amendment {
    pub amendment_id: i32,
    #[serde(default)]
    pub bill_id: Option<i32>,
    #[serde(default)]
    pub adopted: Option<i32>,
    #[serde(default)]
    pub chamber: Option<String>,
    #[serde(default)]
    pub chamber_id: Option<i32>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub amendment_size: Option<i64>,
    #[serde(default)]
    pub amendment_hash: Option<String>,
    #[serde(default)]
    pub doc: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplement {
    pub supplement_id: i32,
    #[serde(default)]
    pub bill_id: Option<i32>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub type_id: Option<i32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub supplement_size: Option<i64>,
    #[serde(default)]
    pub supplement_hash: Option<String>,
    #[serde(default)]
    pub doc: Option<String>,
}

/// Summary row from the masterlist; used only for diffing against cached
/// full bill records, never cached as the bill itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillSummary {
    pub bill_id: i32,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub change_hash: Option<String>,
    #[serde(default)]
    pub status_date: Option<String>,
    #[serde(default)]
    pub last_action_date: Option<String>,
    #[serde(default)]
    pub last_action: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Per-session bill masterlist
///
/// The wire format is a map whose keys are numeric strings, with a
/// `session` metadata object mixed in; it decodes to a session plus a map
/// of summaries keyed by bill id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MasterList {
    pub session: Option<SessionInfo>,
    pub bills: HashMap<i32, BillSummary>,
}

impl<'de> Deserialize<'de> for MasterList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        let mut list = MasterList::default();
        for (key, value) in raw {
            if key == "session" {
                list.session = serde_json::from_value(value).ok();
            } else if let Ok(summary) = serde_json::from_value::<BillSummary>(value) {
                list.bills.insert(summary.bill_id, summary);
            }
        }
        Ok(list)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: i32,
    #[serde(default)]
    pub state_id: Option<i32>,
    #[serde(default)]
    pub year_start: Option<i32>,
    #[serde(default)]
    pub year_end: Option<i32>,
    #[serde(default)]
    pub special: Option<i32>,
    #[serde(default)]
    pub session_name: Option<String>,
    #[serde(default)]
    pub session_title: Option<String>,
    #[serde(default)]
    pub dataset_hash: Option<String>,
}

/// Dataset descriptor from `getDatasetList`; `access_key` is required to
/// retrieve the archive. `mime` and `zip` exist only on `getDataset`
/// responses, where `zip` is the base64-encoded archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub session_id: i32,
    #[serde(default)]
    pub state_id: i32,
    #[serde(default)]
    pub special: i32,
    #[serde(default)]
    pub year_start: Option<i32>,
    #[serde(default)]
    pub year_end: Option<i32>,
    #[serde(default)]
    pub session_name: Option<String>,
    #[serde(default)]
    pub session_title: Option<String>,
    #[serde(default)]
    pub dataset_hash: Option<String>,
    #[serde(default)]
    pub dataset_date: Option<String>,
    #[serde(default)]
    pub dataset_size: Option<i64>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SponsoredBill {
    pub session_id: Option<i32>,
    pub bill_id: Option<i32>,
    pub number: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSummary {
    pub page: Option<String>,
    pub range: Option<String>,
    pub relevancy: Option<String>,
    pub count: Option<i32>,
    pub page_current: Option<i32>,
    pub page_total: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub bill_id: i32,
    #[serde(default)]
    pub relevance: Option<i32>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub bill_number: Option<String>,
    #[serde(default)]
    pub change_hash: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text_url: Option<String>,
    #[serde(default)]
    pub last_action_date: Option<String>,
    #[serde(default)]
    pub last_action: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// One page of full-text search results: a `summary` object plus hits
/// keyed by numeric strings, normalized to a vector
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchPage {
    pub summary: SearchSummary,
    pub results: Vec<SearchHit>,
}

impl<'de> Deserialize<'de> for SearchPage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        let mut page = SearchPage::default();
        for (key, value) in raw {
            if key == "summary" {
                page.summary = serde_json::from_value(value).unwrap_or_default();
            } else if let Ok(hit) = serde_json::from_value::<SearchHit>(value) {
                page.results.push(hit);
            }
        }
        Ok(page)
    }
}

/// Accept a field that arrives as either a single object or an array of
/// objects, normalizing to a vector. `null` becomes empty.
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masterlist_separates_session_from_numeric_keys() {
        let value = json!({
            "session": {"session_id": 2049, "session_name": "2023 Regular Session"},
            "0": {"bill_id": 1, "number": "HB1", "change_hash": "aaa"},
            "1": {"bill_id": 2, "number": "SB2", "change_hash": "bbb"}
        });
        let list: MasterList = serde_json::from_value(value).unwrap();
        assert_eq!(list.session.as_ref().unwrap().session_id, 2049);
        assert_eq!(list.bills.len(), 2);
        assert_eq!(list.bills[&1].change_hash.as_deref(), Some("aaa"));
        assert_eq!(list.bills[&2].number.as_deref(), Some("SB2"));
    }

    #[test]
    fn committee_accepts_object_or_array() {
        let single: Bill = serde_json::from_value(json!({
            "bill_id": 7,
            "committee": {"committee_id": 10, "name": "Appropriations"}
        }))
        .unwrap();
        assert_eq!(single.committee.len(), 1);
        assert_eq!(single.committee[0].name.as_deref(), Some("Appropriations"));

        let many: Bill = serde_json::from_value(json!({
            "bill_id": 7,
            "committee": [{"committee_id": 10}, {"committee_id": 11}]
        }))
        .unwrap();
        assert_eq!(many.committee.len(), 2);

        let absent: Bill = serde_json::from_value(json!({"bill_id": 7})).unwrap();
        assert!(absent.committee.is_empty());
    }

    #[test]
    fn search_page_collects_numeric_hits() {
        let value = json!({
            "summary": {"page": "1 of 3", "count": 42, "page_current": 1, "page_total": 3},
            "0": {"bill_id": 100, "relevance": 99, "bill_number": "HB100"},
            "1": {"bill_id": 101, "relevance": 82, "bill_number": "HB101"}
        });
        let page: SearchPage = serde_json::from_value(value).unwrap();
        assert_eq!(page.summary.page_total, Some(3));
        assert_eq!(page.results.len(), 2);
    }

    #[test]
    fn envelope_decodes_bill_payload() {
        let value = json!({
            "status": "OK",
            "bill": {"bill_id": 101, "change_hash": "abc", "title": "An act"}
        });
        let envelope: ApiResponse = serde_json::from_value(value).unwrap();
        let bill = envelope.bill.unwrap();
        assert_eq!(bill.bill_id, 101);
        assert_eq!(bill.change_hash.as_deref(), Some("abc"));
    }
}
