use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use txscan_core::{MultiParseResult, ParsedTransaction, SourceType};
use txscan_import::TextParser;

use crate::enhancer::{EnhanceError, Enhancer, NoEnhancer};
use crate::recognizer::{NoRecognizer, OcrBackend, OcrError};

/// Rule-based results below this confidence are offered to the enhancer.
pub const ENHANCEMENT_THRESHOLD: u8 = 75;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Nothing to parse: no text and no image")]
    EmptyInput,
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("Enhancement failed: {0}")]
    Enhance(#[from] EnhanceError),
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Raw text handed to the pipeline (SMS, pasted receipt, voice transcript).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    pub text: String,
}

impl From<&str> for TextInput {
    fn from(text: &str) -> Self {
        Self { text: text.to_string() }
    }
}

impl From<String> for TextInput {
    fn from(text: String) -> Self {
        Self { text }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Ask the enhancer even when the rule-based result is confident.
    pub prefer_enhancement: bool,
    pub api_key: Option<String>,
    /// Image to recognise when the input carries no text.
    pub image: Option<Vec<u8>>,
}

/// Orchestrates: OCR (image-only input) → rule-based parse → optional
/// enhancement, with every external step bounded by a timeout.
pub struct TextPipeline<R = NoRecognizer, E = NoEnhancer> {
    parser: Arc<TextParser>,
    recognizer: Option<Arc<R>>,
    enhancer: Option<Arc<E>>,
    timeout: Duration,
}

impl TextPipeline {
    pub fn new(parser: TextParser) -> Self {
        Self { parser: Arc::new(parser), recognizer: None, enhancer: None, timeout: DEFAULT_TIMEOUT }
    }
}

impl<R, E> TextPipeline<R, E>
where
    R: OcrBackend + 'static,
    E: Enhancer + 'static,
{
    pub fn with_recognizer<R2: OcrBackend>(self, recognizer: R2) -> TextPipeline<R2, E> {
        TextPipeline {
            parser: self.parser,
            recognizer: Some(Arc::new(recognizer)),
            enhancer: self.enhancer,
            timeout: self.timeout,
        }
    }

    pub fn with_enhancer<E2: Enhancer>(self, enhancer: E2) -> TextPipeline<R, E2> {
        TextPipeline {
            parser: self.parser,
            recognizer: self.recognizer,
            enhancer: Some(Arc::new(enhancer)),
            timeout: self.timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn parser(&self) -> &TextParser {
        &self.parser
    }

    /// Parse one input. Collaborator failures are logged and the rule-based
    /// result is returned instead; only an input with nothing in it is an error.
    pub async fn process(&self, input: TextInput, options: &ParseOptions) -> Result<MultiParseResult, PipelineError> {
        let mut text = input.text;
        if text.trim().is_empty() {
            let Some(image) = options.image.clone() else {
                return Err(PipelineError::EmptyInput);
            };
            match self.recognize(image).await {
                Ok(recognized) => text = recognized,
                Err(e) => tracing::warn!(error = %e, "OCR failed, nothing to parse"),
            }
        }

        let rule_based = self.parser.parse_multi(&text);
        let Some(api_key) = options.api_key.clone() else {
            return Ok(rule_based);
        };
        if self.enhancer.is_none() || !(options.prefer_enhancement || rule_based.confidence < ENHANCEMENT_THRESHOLD) {
            return Ok(rule_based);
        }

        match self.enhance(text.clone(), api_key).await {
            Ok(items) if !items.is_empty() => {
                tracing::debug!(items = items.len(), "using enhanced result");
                let source_type = match rule_based.source_type {
                    SourceType::Unknown => SourceType::Single,
                    other => other,
                };
                Ok(MultiParseResult::from_items(self.validated(items), source_type, &text))
            }
            Ok(_) => {
                tracing::debug!("enhancer returned nothing, keeping rule-based result");
                Ok(rule_based)
            }
            Err(e) => {
                tracing::warn!(error = %e, "enhancement failed, keeping rule-based result");
                Ok(rule_based)
            }
        }
    }

    async fn recognize(&self, image: Vec<u8>) -> Result<String, PipelineError> {
        let recognizer = self.recognizer.clone().ok_or(OcrError::NotAvailable)?;
        let task = tokio::task::spawn_blocking(move || recognizer.recognize(&image));
        let text = tokio::time::timeout(self.timeout, task)
            .await
            .map_err(|_| PipelineError::Timeout(self.timeout))???;
        Ok(text)
    }

    async fn enhance(&self, text: String, api_key: String) -> Result<Vec<ParsedTransaction>, PipelineError> {
        let enhancer = self.enhancer.clone().ok_or(EnhanceError::Unavailable)?;
        let task = tokio::task::spawn_blocking(move || enhancer.enhance(&text, &api_key));
        let items = tokio::time::timeout(self.timeout, task)
            .await
            .map_err(|_| PipelineError::Timeout(self.timeout))???;
        Ok(items)
    }

    /// Enhancer output may carry free-form labels; pin them to the taxonomy.
    fn validated(&self, items: Vec<ParsedTransaction>) -> Vec<ParsedTransaction> {
        let categories = self.parser.categories();
        items
            .into_iter()
            .map(|tx| {
                let category = categories.validate_category(&tx.category, tx.tx_type);
                tx.with_category(category)
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
