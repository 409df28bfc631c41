use crate::domain::analysis::AnalysisResult;
use crate::domain::contract::ReturnsInput;
use crate::domain::error::ComputeError;
use chrono::{DateTime, Utc};

pub const RISK_SCALE: f64 = 1000.0;
pub const RISK_SCORE_MIN: f64 = 0.0;
pub const RISK_SCORE_MAX: f64 = 100.0;

/// Arithmetic mean. NaN for an empty slice.
///
/// Falls back to summing `v / n` when the plain sum overflows, so any series
/// of finite values has a finite mean.
pub fn mean(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let total = values.iter().sum::<f64>();
    if total.is_finite() {
        total / n
    } else {
        values.iter().map(|v| v / n).sum()
    }
}

/// Population standard deviation (divides by N). NaN for an empty slice.
///
/// Values are scaled by their largest magnitude before squaring so that
/// neither the deviations nor their squares overflow.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let scale = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return if scale == 0.0 { 0.0 } else { f64::NAN };
    }

    let scaled = values.iter().map(|v| v / scale).collect::<Vec<_>>();
    let m = mean(&scaled);
    let sq_dev = scaled.iter().map(|u| (u - m) * (u - m)).sum::<f64>();
    (sq_dev / scaled.len() as f64).sqrt() * scale
}

pub fn risk_score(volatility: f64) -> f64 {
    (volatility * RISK_SCALE).clamp(RISK_SCORE_MIN, RISK_SCORE_MAX)
}

pub fn analyze(
    input: &ReturnsInput,
    processed_at: DateTime<Utc>,
) -> Result<AnalysisResult, ComputeError> {
    let avg_return = finite("mean", mean(input.values()))?;
    let volatility = finite("volatility", population_std_dev(input.values()))?;

    Ok(AnalysisResult {
        avg_return,
        volatility,
        risk_score: risk_score(volatility),
        processed_at: processed_at.timestamp(),
    })
}

fn finite(stage: &'static str, value: f64) -> Result<f64, ComputeError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ComputeError { stage, value })
    }
}
