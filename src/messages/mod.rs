pub mod types;

pub use types::{AssistantReply, QueryRequest, QueryResponse};
