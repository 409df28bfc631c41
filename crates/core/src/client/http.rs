use crate::client::{AnalyticsClient, AnalyticsReply};
use crate::config::Settings;
use anyhow::Context;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct HttpAnalyticsClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest {
    returns: Vec<Value>,
}

impl HttpAnalyticsClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.analytics_timeout()?)
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            base_url: settings.analytics_base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn analyze_url(&self) -> String {
        format!("{}/analyze", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl AnalyticsClient for HttpAnalyticsClient {
    async fn analyze(&self, returns: Vec<Value>) -> anyhow::Result<AnalyticsReply> {
        let res = self
            .http
            .post(self.analyze_url())
            .json(&AnalyzeRequest { returns })
            .send()
            .await
            .context("analytics request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read analytics response body")?;
        let body = serde_json::from_str::<Value>(&text)
            .with_context(|| format!("analytics response is not JSON (status={status}): {text}"))?;

        Ok(AnalyticsReply {
            status: status.as_u16(),
            body,
        })
    }
}
