use thiserror::Error;
use txscan_core::ParsedTransaction;

#[derive(Debug, Error)]
pub enum EnhanceError {
    #[error("No enhancement service configured")]
    Unavailable,
    #[error("Enhancement request rejected: {0}")]
    Rejected(String),
    #[error("Enhancement response could not be understood: {0}")]
    Malformed(String),
}

/// Model-assisted re-extraction used when the rule-based result is weak.
///
/// The request/response protocol is the implementor's business; the pipeline
/// only sees the transactions it returns. Calls may block.
pub trait Enhancer: Send + Sync {
    fn enhance(&self, text: &str, api_key: &str) -> Result<Vec<ParsedTransaction>, EnhanceError>;
}

/// Placeholder for pipelines without an enhancement service.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnhancer;

impl Enhancer for NoEnhancer {
    fn enhance(&self, _text: &str, _api_key: &str) -> Result<Vec<ParsedTransaction>, EnhanceError> {
        Err(EnhanceError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_enhancer_is_unavailable() {
        assert!(matches!(NoEnhancer.enhance("Food 60k", "key"), Err(EnhanceError::Unavailable)));
    }
}
