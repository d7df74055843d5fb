use thiserror::Error;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Data quality: {field} — {reason}")]
    DataQuality { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Retrieval failed from {source_name}: {reason}")]
    Retrieval { source_name: String, reason: String },

    #[error("Numeric anomaly in {context}: {reason}")]
    NumericAnomaly { context: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PricingError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        PricingError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn data_quality(field: &str, reason: impl Into<String>) -> Self {
        PricingError::DataQuality {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn retrieval(source_name: &str, reason: impl Into<String>) -> Self {
        PricingError::Retrieval {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    pub fn numeric(context: &str, reason: impl Into<String>) -> Self {
        PricingError::NumericAnomaly {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// True for failures raised by market-data collaborators rather than the engine.
    pub fn is_retrieval(&self) -> bool {
        matches!(self, PricingError::Retrieval { .. })
    }
}

impl From<serde_json::Error> for PricingError {
    fn from(e: serde_json::Error) -> Self {
        PricingError::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_field() {
        let err = PricingError::invalid("steps", "must be at least 1");
        assert_eq!(err.to_string(), "Invalid input: steps — must be at least 1");

        let err = PricingError::data_quality("closes[3]", "must be positive");
        assert!(err.to_string().contains("closes[3]"));
    }

    #[test]
    fn test_retrieval_is_distinct() {
        assert!(PricingError::retrieval("snapshot", "unknown ticker XYZ").is_retrieval());
        assert!(!PricingError::numeric("valuation", "root is NaN").is_retrieval());
        assert!(!PricingError::InsufficientData("1 close".into()).is_retrieval());
    }

    #[test]
    fn test_from_serde_json() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: PricingError = parse.unwrap_err().into();
        assert!(matches!(err, PricingError::SerializationError(_)));
    }
}
