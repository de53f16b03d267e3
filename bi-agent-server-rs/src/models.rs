use bi_agent_sdk_rs::events::{Message, RunAgentInput};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Deserialize, Debug, Clone)]
pub struct QueryRequest {
    pub query: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn create_user_message(content: &str) -> Message {
    Message::user(format!("msg-{}", Utc::now().timestamp_millis()), content)
}

/// Wraps a single query into a fresh run with empty state, tools and context.
pub fn create_run_input(query: &str) -> RunAgentInput {
    let now = Utc::now().timestamp_millis();
    RunAgentInput {
        thread_id: format!("thread-{}", now),
        run_id: format!("run-{}", now),
        state: Value::Object(Map::new()),
        messages: vec![create_user_message(query)],
        tools: vec![],
        context: vec![],
        forwarded_props: Value::Object(Map::new()),
    }
}
