//! Free-text intake around the rule-based parser: OCR for screenshots and
//! photographed receipts, and optional model-assisted enhancement.

pub mod enhancer;
pub mod pipeline;
pub mod recognizer;

pub use enhancer::{EnhanceError, Enhancer, NoEnhancer};
pub use pipeline::{ParseOptions, PipelineError, TextInput, TextPipeline, DEFAULT_TIMEOUT, ENHANCEMENT_THRESHOLD};
pub use recognizer::{NoRecognizer, OcrBackend, OcrError};

#[cfg(feature = "tesseract")]
pub use recognizer::tesseract_backend::TesseractRecognizer;
