//! Request bodies for the service operations.
//!
//! Field names follow the service contract exactly, which mixes
//! `snake_case` and `camelCase` between operations.

use serde::Serialize;

use crate::{RequestStatus, RequestType};

/// Body carrying the pre-shared key, which the client fills in when unset.
pub(crate) trait WithApiKey {
    fn api_key_slot(&mut self) -> &mut Option<String>;

    fn fill_api_key(&mut self, key: &str) {
        let slot = self.api_key_slot();
        if slot.as_deref().map_or(true, str::is_empty) {
            *slot = Some(key.to_owned());
        }
    }
}

macro_rules! with_api_key {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl WithApiKey for $ty {
                fn api_key_slot(&mut self) -> &mut Option<String> {
                    &mut self.api_key
                }
            }
        )+
    };
}

/// Creates an info or deletion request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CreateRequestInput {
    pub partition_key: String,
    #[serde(rename = "type")]
    pub kind: RequestType,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl CreateRequestInput {
    pub fn new(
        partition_key: impl Into<String>,
        kind: RequestType,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            partition_key: partition_key.into(),
            kind,
            created_by: created_by.into(),
            api_key: None,
        }
    }

    /// Info request for `partition_key`.
    pub fn info(partition_key: impl Into<String>, created_by: impl Into<String>) -> Self {
        Self::new(partition_key, RequestType::Info, created_by)
    }

    /// Deletion request for `partition_key`.
    pub fn delete(partition_key: impl Into<String>, created_by: impl Into<String>) -> Self {
        Self::new(partition_key, RequestType::Delete, created_by)
    }
}

/// Addresses a single stored request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FetchRequestInput {
    pub partition_key: String,
    pub range_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl FetchRequestInput {
    pub fn new(partition_key: impl Into<String>, range_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            range_key: range_key.into(),
            api_key: None,
        }
    }
}

/// Changes the type and/or status of a stored request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UpdateRequestInput {
    pub partition_key: String,
    pub range_key: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<RequestType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RequestStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl UpdateRequestInput {
    pub fn new(partition_key: impl Into<String>, range_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            range_key: range_key.into(),
            kind: None,
            status: None,
            api_key: None,
        }
    }

    pub fn with_status(mut self, status: RequestStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_kind(mut self, kind: RequestType) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// Removes a stored request, softly unless `is_hard_delete` is set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequestInput {
    pub partition_key: String,
    pub range_key: String,
    pub is_hard_delete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl DeleteRequestInput {
    pub fn soft(partition_key: impl Into<String>, range_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            range_key: range_key.into(),
            is_hard_delete: false,
            api_key: None,
        }
    }

    pub fn hard(partition_key: impl Into<String>, range_key: impl Into<String>) -> Self {
        Self {
            is_hard_delete: true,
            ..Self::soft(partition_key, range_key)
        }
    }
}

/// Lists every request under one partition key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchAllRequestInput {
    pub partition_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_range_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl FetchAllRequestInput {
    pub fn new(partition_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            last_range_key: None,
            api_key: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchByTypeInput {
    #[serde(rename = "type")]
    pub kind: RequestType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_range_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl FetchByTypeInput {
    pub fn new(kind: RequestType) -> Self {
        Self {
            kind,
            last_range_key: None,
            api_key: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchByStatusInput {
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_range_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl FetchByStatusInput {
    pub fn new(status: RequestStatus) -> Self {
        Self {
            status,
            last_range_key: None,
            api_key: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchByCreatorInput {
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_range_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl FetchByCreatorInput {
    pub fn new(created_by: impl Into<String>) -> Self {
        Self {
            created_by: created_by.into(),
            last_range_key: None,
            api_key: None,
        }
    }
}

/// Listing inputs that accept a continuation cursor.
pub trait Paginated: Sized {
    fn last_range_key_slot(&mut self) -> &mut Option<String>;

    /// Continues after the given opaque cursor.
    fn after(mut self, last_range_key: impl Into<String>) -> Self {
        *self.last_range_key_slot() = Some(last_range_key.into());
        self
    }
}

macro_rules! paginated {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Paginated for $ty {
                fn last_range_key_slot(&mut self) -> &mut Option<String> {
                    &mut self.last_range_key
                }
            }
        )+
    };
}

with_api_key!(
    CreateRequestInput,
    FetchRequestInput,
    UpdateRequestInput,
    DeleteRequestInput,
    FetchAllRequestInput,
    FetchByTypeInput,
    FetchByStatusInput,
    FetchByCreatorInput,
);

paginated!(
    FetchAllRequestInput,
    FetchByTypeInput,
    FetchByStatusInput,
    FetchByCreatorInput,
);
