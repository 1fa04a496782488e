use serde::{Deserialize, Serialize};

/// Kind of data subject request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    /// Right-of-access request: export what is stored about a subject.
    #[serde(rename = "INFO_REQUEST")]
    Info,
    /// Right-to-erasure request.
    #[serde(rename = "DELETE_REQUEST")]
    Delete,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO_REQUEST",
            Self::Delete => "DELETE_REQUEST",
        }
    }
}

/// Processing state of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Pending,
    Complete,
    Failed,
    Deleted,
    /// A status this client version does not know about.
    #[serde(other)]
    Unknown,
}

/// A stored data subject request as returned by the service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRequest {
    pub partition_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_key: Option<String>,
    #[serde(rename = "type")]
    pub kind: RequestType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RequestStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    pub created_by: String,
}

/// Record returned by the info request operations.
pub type InfoRequest = DataRequest;
/// Record returned by the deletion request operations.
pub type DeleteRequest = DataRequest;

/// One page of a listing.
///
/// `last_range_key` is an opaque cursor; pass it back unchanged to fetch
/// the next page. `None` means there are no further pages.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    #[serde(
        rename = "lastRangeKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_range_key: Option<String>,
}

impl PaginatedResponse {
    pub fn has_more(&self) -> bool {
        self.last_range_key
            .as_deref()
            .is_some_and(|key| !key.is_empty())
    }

    /// Decodes the raw result items into typed records.
    pub fn records(&self) -> Result<Vec<DataRequest>, serde_json::Error> {
        self.results
            .iter()
            .cloned()
            .map(serde_json::from_value)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{DataRequest, PaginatedResponse, RequestStatus, RequestType};

    #[test]
    fn request_type_uses_service_constants() {
        assert_eq!(
            serde_json::to_value(RequestType::Info).expect("serialize"),
            json!("INFO_REQUEST")
        );
        assert_eq!(RequestType::Delete.as_str(), "DELETE_REQUEST");
    }

    #[test]
    fn unknown_status_does_not_fail_decoding() {
        let status: RequestStatus = serde_json::from_value(json!("ARCHIVED")).expect("decode");
        assert_eq!(status, RequestStatus::Unknown);
        let status: RequestStatus = serde_json::from_value(json!("PENDING")).expect("decode");
        assert_eq!(status, RequestStatus::Pending);
    }

    #[test]
    fn data_request_tolerates_missing_optional_fields() {
        let record: DataRequest = serde_json::from_value(json!({
            "partition_key": "user-1",
            "type": "DELETE_REQUEST",
            "created_by": "support"
        }))
        .expect("decode");
        assert_eq!(record.kind, RequestType::Delete);
        assert!(record.range_key.is_none());
        assert!(record.status.is_none());
    }

    #[test]
    fn page_exposes_cursor_and_records() {
        let page: PaginatedResponse = serde_json::from_value(json!({
            "results": [
                {
                    "partition_key": "user-1",
                    "range_key": "r1",
                    "type": "INFO_REQUEST",
                    "status": "COMPLETE",
                    "created_by": "support"
                }
            ],
            "lastRangeKey": "r1"
        }))
        .expect("decode");
        assert!(page.has_more());
        let records = page.records().expect("typed records");
        assert_eq!(records[0].status, Some(RequestStatus::Complete));

        let last: PaginatedResponse =
            serde_json::from_value(json!({ "results": [] })).expect("decode");
        assert!(!last.has_more());
    }
}
