use serde::Serialize;

pub const SERVICE_NAME: &str = "finpulse-analytics";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub avg_return: f64,
    pub volatility: f64,
    pub risk_score: f64,
    /// Unix seconds.
    pub processed_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok",
            service: SERVICE_NAME,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
