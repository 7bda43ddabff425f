pub mod amount;
pub mod result;
pub mod taxonomy;
pub mod transaction;

pub use amount::Amount;
pub use result::{BankStatementResult, MultiParseResult, SourceType, StatementDiagnostics};
pub use taxonomy::{CategoryTaxonomy, KeywordRule, TaxonomyError};
pub use transaction::{PaymentMethod, ParsedTransaction, TransactionType, MAX_DESCRIPTION_CHARS};
