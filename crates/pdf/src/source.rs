use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::PdfError;
use crate::glyph::Glyph;

/// Page-by-page access to a document's positioned text.
///
/// Pages are numbered from 1. The statement parser reads them strictly in
/// ascending order, one at a time.
pub trait PageSource: Send + Sync {
    /// Number of pages, or the reason the document cannot be opened.
    fn page_count(&self) -> Result<usize, PdfError>;

    fn read_page(&self, page: usize) -> impl Future<Output = Result<Vec<Glyph>, PdfError>> + Send;
}

/// Glyphs already in memory, e.g. dumped by an external PDF text layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlyphDocument {
    #[serde(default)]
    pub glyphs: Vec<Glyph>,
    /// Explicit page count; defaults to the highest page any glyph is on.
    #[serde(default)]
    pub pages: Option<usize>,
    #[serde(default)]
    pub encrypted: bool,
}

impl GlyphDocument {
    pub fn new(glyphs: Vec<Glyph>) -> Self {
        Self { glyphs, pages: None, encrypted: false }
    }

    pub fn from_json(json: &str) -> Result<Self, PdfError> {
        serde_json::from_str(json).map_err(|e| PdfError::Corrupt(e.to_string()))
    }

    pub async fn load(path: &Path) -> Result<Self, PdfError> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }
}

impl PageSource for GlyphDocument {
    fn page_count(&self) -> Result<usize, PdfError> {
        if self.encrypted {
            return Err(PdfError::Protected);
        }
        let highest = self.glyphs.iter().map(|g| g.page).max().unwrap_or(0);
        Ok(self.pages.unwrap_or(highest).max(highest))
    }

    async fn read_page(&self, page: usize) -> Result<Vec<Glyph>, PdfError> {
        Ok(self.glyphs.iter().filter(|g| g.page == page).cloned().collect())
    }
}

/// Shared cancellation signal, checked between pages.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> GlyphDocument {
        GlyphDocument::new(vec![
            Glyph::new("a", 0.0, 10.0, 1),
            Glyph::new("b", 0.0, 10.0, 3),
            Glyph::new("c", 5.0, 10.0, 1),
        ])
    }

    #[tokio::test]
    async fn pages_are_filtered_by_number() {
        let d = doc();
        assert_eq!(d.page_count().unwrap(), 3);
        let first: Vec<_> = d.read_page(1).await.unwrap().into_iter().map(|g| g.text).collect();
        assert_eq!(first, vec!["a", "c"]);
        assert!(d.read_page(2).await.unwrap().is_empty());
    }

    #[test]
    fn encrypted_documents_refuse_to_open() {
        let d = GlyphDocument { encrypted: true, ..doc() };
        assert!(matches!(d.page_count(), Err(PdfError::Protected)));
    }

    #[test]
    fn bad_json_is_corrupt() {
        assert!(matches!(GlyphDocument::from_json("{not json"), Err(PdfError::Corrupt(_))));
        let d = GlyphDocument::from_json(r#"{"glyphs":[{"text":"x","x":1,"y":2,"page":1}],"pages":2}"#).unwrap();
        assert_eq!(d.page_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.json");
        std::fs::write(&path, r#"{"glyphs":[]}"#).unwrap();
        let d = GlyphDocument::load(&path).await.unwrap();
        assert_eq!(d.page_count().unwrap(), 0);
    }

    #[test]
    fn cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
    }
}
