pub mod http;

use serde_json::Value;

/// Raw reply from the analytics service. The body is kept as JSON so callers
/// can pass upstream errors through untouched.
#[derive(Debug, Clone)]
pub struct AnalyticsReply {
    pub status: u16,
    pub body: Value,
}

impl AnalyticsReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait::async_trait]
pub trait AnalyticsClient: Send + Sync {
    async fn analyze(&self, returns: Vec<Value>) -> anyhow::Result<AnalyticsReply>;
}
