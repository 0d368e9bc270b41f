use crate::markup::Markup;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body of `POST /query`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub input: String,
}

impl QueryRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Response body of `POST /query`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
}

/// An assistant reply as shown in the response bubble
#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub id: Uuid,
    pub request_id: Uuid,
    /// Markup exactly as returned by the backend
    pub markup: String,
    pub document: Markup,
    /// Text used for read-aloud
    pub plain_text: String,
    pub received_at: DateTime<Utc>,
}

impl AssistantReply {
    pub fn new(request_id: Uuid, markup: impl Into<String>) -> Self {
        let markup = markup.into();
        let document = Markup::parse(&markup);
        let plain_text = document.plain_text();

        Self {
            id: Uuid::new_v4(),
            request_id,
            markup,
            document,
            plain_text,
            received_at: Utc::now(),
        }
    }
}
