use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("No OCR backend available, build with the `tesseract` feature")]
    NotAvailable,
}

/// Image-to-text step for screenshots and photographed receipts.
/// Implementations accept raw PNG/JPEG bytes and return the recognized text.
/// Calls may block; the pipeline runs them on the blocking pool.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

/// Placeholder backend for builds without OCR support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecognizer;

impl OcrBackend for NoRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Err(OcrError::NotAvailable)
    }
}

// ── Tesseract backend (optional, `tesseract` feature) ────────────────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError};
    use leptess::LepTess;
    use std::path::PathBuf;

    /// Recognizes screenshots and receipt photos with a local Tesseract install.
    /// A fresh engine is created per call.
    #[derive(Debug, Clone)]
    pub struct TesseractRecognizer {
        tessdata: Option<PathBuf>,
        languages: String,
    }

    impl Default for TesseractRecognizer {
        fn default() -> Self {
            Self { tessdata: None, languages: "eng".to_string() }
        }
    }

    impl TesseractRecognizer {
        /// `languages` uses Tesseract's `eng+swa` syntax.
        pub fn with_languages(mut self, languages: &str) -> Self {
            self.languages = languages.to_string();
            self
        }

        pub fn with_tessdata(mut self, dir: impl Into<PathBuf>) -> Self {
            self.tessdata = Some(dir.into());
            self
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            let tessdata = self.tessdata.as_ref().map(|p| p.to_string_lossy().into_owned());
            let mut engine = LepTess::new(tessdata.as_deref(), &self.languages)
                .map_err(|e| OcrError::Engine(format!("{} ({})", e, self.languages)))?;
            engine
                .set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let text = engine.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))?;
            Ok(text.lines().map(str::trim_end).collect::<Vec<_>>().join("\n").trim().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_recognizer_is_unavailable() {
        let err = NoRecognizer.recognize(b"png").unwrap_err();
        assert!(matches!(err, OcrError::NotAvailable));
        assert!(err.to_string().contains("tesseract"));
    }
}
