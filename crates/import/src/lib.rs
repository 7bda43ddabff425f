pub mod amount;
pub mod arbiter;
pub mod category;
pub mod date;
pub mod dedup;
pub mod direction;
pub mod extractors;
pub mod parser;
pub mod source_type;
pub(crate) mod util;

pub use amount::{extract_amount, parse_amount, scan_amounts, AmountMatch};
pub use arbiter::{arbitrate, ARBITER_THRESHOLD};
pub use category::{CategoryClassifier, CategoryMatch};
pub use date::DateParser;
pub use dedup::deduplicate;
pub use direction::{direction_of, is_income_transaction};
pub use extractors::{ExtractContext, Extractor, ExtractorRegistry, ProviderProfile};
pub use parser::TextParser;
pub use source_type::classify_source;
