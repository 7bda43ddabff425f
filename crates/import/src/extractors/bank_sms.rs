use regex::Captures;
use std::sync::OnceLock;
use txscan_core::{Amount, ParsedTransaction, PaymentMethod, TransactionType};

use super::{ExtractContext, BANK_SMS_CONFIDENCE};
use crate::amount::{extract_amount, parse_amount};
use crate::direction::direction_of;
use crate::util::{clean_label, contains_word, letter_count, normalize, re, PatternChain, PatternRule};

// ── Applicability ────────────────────────────────────────────────────────────

re!(re_sms_verb,
    r"(?i)\b(?:debit(?:ed)?|credit(?:ed)?|withdrawn|withdrawal|deposit(?:ed)?|transfer(?:red)?|sent|received)\b");
re!(re_money_token,
    r"(?i)\b(?:ugx|ushs?|shs|kes|kshs?|usd|a/c|acct|account)\b|[$€£]");

/// A debit/credit/transfer verb together with a currency or account token.
pub fn applies(text: &str) -> bool {
    re_sms_verb().is_match(text) && re_money_token().is_match(text)
}

// ── Amount ───────────────────────────────────────────────────────────────────

re!(re_verb_then_amount,
    r"(?i)\b(?:debited|credited|withdrawn|deposited|transferred|sent|received)\b\s*(?:with|of|by|for)?\s*(?:(?:ugx|ushs?|shs|kes|kshs?|usd)\.?|[$€£])?\s*(\d[\d,]*(?:\.\d{1,2})?)");
re!(re_amount_then_verb,
    r"(?i)(?:(?:ugx|ushs?|shs|kes|kshs?|usd)\.?|[$€£])\s*(\d[\d,]*(?:\.\d{1,2})?)\s*(?:has\s+been\s+|was\s+|is\s+)?(?:debited|credited|withdrawn|deposited|transferred|sent|received)\b");
re!(re_marker_label,
    r"(?i)\b(?:debit|credit|dr|cr)\s*(?:amount|amt)?\s*[:\-]\s*(?:(?:ugx|ushs?|shs|kes|kshs?|usd)\.?\s*)?(\d[\d,]*(?:\.\d{1,2})?)");

fn number(caps: &Captures<'_>) -> Option<Amount> {
    parse_amount(caps.get(1)?.as_str())
}

fn amount_chain() -> &'static PatternChain<Amount> {
    static CHAIN: OnceLock<PatternChain<Amount>> = OnceLock::new();
    CHAIN.get_or_init(|| {
        PatternChain::new(vec![
            PatternRule { name: "verb_then_amount", regex: re_verb_then_amount, handler: number },
            PatternRule { name: "amount_then_verb", regex: re_amount_then_verb, handler: number },
            PatternRule { name: "marker_label", regex: re_marker_label, handler: number },
        ])
    })
}

// ── Description ──────────────────────────────────────────────────────────────

re!(re_labeled_field,
    r"(?i)\b(?:desc(?:ription)?|narration|narr|details|remarks?|ref(?:erence)?)\s*[:\-]\s*([^\n.;]{3,60})");
re!(re_counterparty,
    r"(?i)\b(?:at|to|from)\s+([A-Za-z][A-Za-z0-9&'\- ]{2,40}?)(?:\s+(?:on|ref|bal|avail|available|for|at|via|with)\b|[,.;\n]|$)");

fn labeled_field(caps: &Captures<'_>) -> Option<String> {
    let value = clean_label(caps.get(1)?.as_str());
    (letter_count(&value) >= 2).then_some(value)
}

fn counterparty(caps: &Captures<'_>) -> Option<String> {
    let value = clean_label(caps.get(1)?.as_str());
    let lower = value.to_lowercase();
    let own_account = ["your", "a/c", "acct", "account"].iter().any(|p| lower.starts_with(p));
    (!own_account && letter_count(&value) >= 2).then_some(value)
}

fn description_chain() -> &'static PatternChain<String> {
    static CHAIN: OnceLock<PatternChain<String>> = OnceLock::new();
    CHAIN.get_or_init(|| {
        PatternChain::new(vec![
            PatternRule { name: "labeled_field", regex: re_labeled_field, handler: labeled_field },
            PatternRule { name: "counterparty", regex: re_counterparty, handler: counterparty },
        ])
    })
}

fn payment_method(lower: &str) -> PaymentMethod {
    if contains_word(lower, "pos") || contains_word(lower, "card") || contains_word(lower, "visa") {
        PaymentMethod::Card
    } else if contains_word(lower, "atm") {
        PaymentMethod::Cash
    } else {
        PaymentMethod::BankTransfer
    }
}

pub fn extract(text: &str, ctx: &ExtractContext<'_>) -> Option<ParsedTransaction> {
    let amount = amount_chain().first_match(text).or_else(|| extract_amount(text))?;
    let tx_type = direction_of(text);
    let found = description_chain().first_match_named(text);

    let description = match &found {
        Some((_, d)) => d.clone(),
        None if tx_type == TransactionType::Income => "Bank Credit".to_string(),
        None => "Bank Debit".to_string(),
    };
    let merchant = found.and_then(|(rule, d)| (rule == "counterparty").then_some(d));
    let lower = normalize(text);

    Some(
        ctx.transaction(amount, &description, text, tx_type, text, BANK_SMS_CONFIDENCE)
            .with_merchant(merchant)
            .with_payment_method(Some(payment_method(&lower))),
    )
}
