use regex::Captures;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use txscan_core::{ParsedTransaction, PaymentMethod, TransactionType};

use super::{ExtractContext, NAMED_RECEIPT_CONFIDENCE};
use crate::amount::extract_amount;
use crate::direction::direction_of;
use crate::util::{clean_label, letter_count, normalize, re, PatternChain, PatternRule};

/// A mobile-money or bank provider whose receipts get their own extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub name: String,
    /// Lower-case phrases that identify the provider's messages.
    pub keywords: Vec<String>,
    /// Merchant label used when the receipt names no counterparty.
    pub default_merchant: String,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

impl ProviderProfile {
    pub fn new(name: &str, keywords: &[&str], payment_method: PaymentMethod) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            default_merchant: name.to_string(),
            payment_method: Some(payment_method),
        }
    }

    pub fn defaults() -> Vec<ProviderProfile> {
        vec![
            Self::new("MTN Mobile Money", &["mtn mobile money", "mtn momo", "momo"], PaymentMethod::MobileMoney),
            Self::new("Airtel Money", &["airtel money"], PaymentMethod::MobileMoney),
            Self::new("M-Pesa", &["m-pesa", "mpesa"], PaymentMethod::MobileMoney),
            Self::new("Stanbic Bank", &["stanbic"], PaymentMethod::BankTransfer),
            Self::new("Centenary Bank", &["centenary", "centebank"], PaymentMethod::BankTransfer),
            Self::new("Equity Bank", &["equity bank", "eazzy"], PaymentMethod::BankTransfer),
        ]
    }

    pub fn matches(&self, text: &str) -> bool {
        let lower = normalize(text);
        self.keywords
            .iter()
            .any(|k| !k.trim().is_empty() && lower.contains(&k.to_lowercase()))
    }
}

// ── Counterparty patterns ────────────────────────────────────────────────────

re!(re_labeled_party,
    r"(?im)\b(?:paid\s+to|sent\s+to|to|merchant|payee|from)\b\s*[:\-]?\s*([A-Za-z][A-Za-z0-9&'.\- ]{1,40}?)(?:\s+(?:on|at|for|ref|reference|id|tid|txn|with|via|amount)\b|\s+\d|[,;(\n]|\.\s|\.$|$)");
re!(re_business_suffix,
    r"\b([A-Z][A-Z0-9&'.\-]*(?:\s+[A-Z0-9&'.\-]+)*?\s+(?:LTD|LIMITED|LLC|INC|ENTERPRISES?|STORES?|SUPERMARKET|PHARMACY|HOTEL|RESTAURANT|SACCO|CO)\b\.?)");

/// Words a label pattern can pick up that never name a counterparty.
const NOT_A_PARTY: &[&str] = &["you", "your", "your account", "account", "a/c", "acct", "mobile money", "wallet"];

fn party(caps: &Captures<'_>) -> Option<String> {
    let name = clean_label(caps.get(1)?.as_str());
    let lower = name.to_lowercase();
    if letter_count(&name) < 2 || NOT_A_PARTY.contains(&lower.as_str()) || lower.starts_with("your ") {
        return None;
    }
    Some(name)
}

fn party_chain() -> &'static PatternChain<String> {
    static CHAIN: OnceLock<PatternChain<String>> = OnceLock::new();
    CHAIN.get_or_init(|| {
        PatternChain::new(vec![
            PatternRule { name: "labeled_party", regex: re_labeled_party, handler: party },
            PatternRule { name: "business_suffix", regex: re_business_suffix, handler: party },
        ])
    })
}

pub fn extract(profile: &ProviderProfile, text: &str, ctx: &ExtractContext<'_>) -> Option<ParsedTransaction> {
    let amount = extract_amount(text)?;
    let tx_type = direction_of(text);
    let counterparty = party_chain().first_match(text);

    let description = match (&counterparty, tx_type) {
        (Some(name), TransactionType::Income) => format!("Received from {name}"),
        (Some(name), TransactionType::Expense) => format!("Paid to {name}"),
        (None, TransactionType::Income) => format!("{} receipt", profile.name),
        (None, TransactionType::Expense) => format!("{} payment", profile.name),
    };
    let merchant = counterparty.unwrap_or_else(|| profile.default_merchant.clone());

    Some(
        ctx.transaction(amount, &description, text, tx_type, text, NAMED_RECEIPT_CONFIDENCE)
            .with_merchant(Some(merchant))
            .with_payment_method(profile.payment_method.clone()),
    )
}
