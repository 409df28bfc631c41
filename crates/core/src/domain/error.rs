use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// `returns` is not an array, or holds something other than a number.
    InvalidType,
    /// Fewer than two data points.
    InsufficientData,
}

impl ValidationError {
    pub fn message(self) -> &'static str {
        match self {
            ValidationError::InvalidType => "`returns` must be an array of numbers.",
            ValidationError::InsufficientData => "Provide at least 2 return values.",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub struct ComputeError {
    pub stage: &'static str,
    pub value: f64,
}

impl fmt::Display for ComputeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "analytics produced a non-finite value (stage={}, value={})",
            self.stage, self.value
        )
    }
}

impl std::error::Error for ComputeError {}
