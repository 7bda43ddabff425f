//! Bank statement parsing from positioned PDF text.
//!
//! The PDF text layer itself lives outside this crate: anything that can hand
//! over [`Glyph`]s page by page implements [`PageSource`].

pub mod bank;
pub mod error;
pub mod glyph;
pub mod progress;
pub mod source;
pub mod statement;
pub mod table;

pub use bank::{account_number, default_bank_patterns, BankIdentityTable, BankPattern};
pub use error::PdfError;
pub use glyph::{reconstruct_lines, reconstruct_rows, Glyph, Row, COLUMN_SEPARATOR, ROW_TOLERANCE};
pub use progress::{NoProgress, ProgressSink};
pub use source::{CancelFlag, GlyphDocument, PageSource};
pub use statement::StatementParser;
pub use table::{RowOutcome, StatementTableParser};
