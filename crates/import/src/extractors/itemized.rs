use regex::Captures;
use rust_decimal::Decimal;
use std::sync::OnceLock;
use txscan_core::{Amount, ParsedTransaction, PaymentMethod, TransactionType};

use super::{ExtractContext, ITEMIZED_LINE_CONFIDENCE, ITEMIZED_TOTAL_CONFIDENCE};
use crate::amount::parse_amount;
use crate::util::{clean_label, contains_any, contains_word, letter_count, normalize, re, PatternChain, PatternRule};

/// Store and outlet words that mark a retail receipt.
pub const RETAIL_KEYWORDS: &[&str] = &[
    "supermarket", "shoprite", "carrefour", "capital shoppers", "mega standard", "mart", "store",
    "shop", "pharmacy", "restaurant", "hotel", "cafe", "wholesale", "hardware", "boutique",
    "bakery", "butchery",
];

const MIN_LINE_AMOUNT: i64 = 10;
const MAX_LINE_AMOUNT: i64 = 10_000_000;

/// Single words that disqualify a line from being an item.
const SKIP_WORDS: &[&str] = &[
    "subtotal", "total", "tax", "vat", "change", "cash", "tendered", "balance", "receipt", "tel",
    "phone", "thank", "thanks", "welcome", "cashier", "till", "invoice", "tin", "qty", "visa",
    "card", "www", "date", "time", "discount",
];
/// Multi-word phrases that disqualify a line.
const SKIP_PHRASES: &[&str] = &["sub total", "sub-total", "served by", "amount due", "you saved", "p.o. box"];

// ── Compiled regex cache ─────────────────────────────────────────────────────

re!(re_wide_name_amount,
    r"(?i)^(?P<name>.+?)\s{2,}(?:(?:ugx|ushs?|shs?|\$)\.?\s*)?(?P<amt>\d[\d,]*(?:\.\d{1,2})?)\s*$");
re!(re_dot_leader,
    r"(?i)^(?P<name>.+?)\s*\.{2,}\s*(?:(?:ugx|ushs?|shs?|\$)\.?\s*)?(?P<amt>\d[\d,]*(?:\.\d{1,2})?)\s*$");
re!(re_qty_price_total,
    r"(?i)^(?P<name>.+?)\s+(?P<qty>\d{1,3})\s*[x×*@]\s*(?P<price>\d[\d,]*(?:\.\d{1,2})?)\s*=?\s*(?P<amt>\d[\d,]*(?:\.\d{1,2})?)\s*$");
re!(re_name_qty_price,
    r"^(?P<name>[A-Za-z][^\d]*?)\s+(?P<qty>\d{1,3})\s+(?P<price>\d[\d,]*(?:\.\d{1,2})?)\s*$");
re!(re_price_name,
    r"(?i)^(?:(?:ugx|ushs?|shs?|\$)\.?\s*)?(?P<amt>\d[\d,]*(?:\.\d{1,2})?)\s+(?P<name>[a-z].*)$");
re!(re_total_label,
    r"(?i)\b(?:grand\s+total|total\s+(?:amount|due|payable)|amount\s+due|total)\b\s*[:\-=]?\s*(?:(?:ugx|ushs?|shs?|kes|usd)\.?\s*|[$€£]\s*)?(\d[\d,]*(?:\.\d{1,2})?)");
re!(re_separator_line, r"^[\s\-=*_#~.]*$");

#[derive(Debug, Clone, PartialEq)]
struct LineItem {
    name: String,
    amount: Amount,
}

fn in_range(amount: &Amount) -> bool {
    amount.value() >= Decimal::from(MIN_LINE_AMOUNT) && amount.value() < Decimal::from(MAX_LINE_AMOUNT)
}

fn item(name: &str, amount: Amount) -> Option<LineItem> {
    let name = clean_label(name);
    if letter_count(&name) < 2 || !in_range(&amount) {
        return None;
    }
    Some(LineItem { name, amount })
}

fn name_amount(caps: &Captures<'_>) -> Option<LineItem> {
    item(caps.name("name")?.as_str(), parse_amount(caps.name("amt")?.as_str())?)
}

fn name_qty_price(caps: &Captures<'_>) -> Option<LineItem> {
    let qty = Decimal::from(caps.name("qty")?.as_str().parse::<u32>().ok()?);
    let price = parse_amount(caps.name("price")?.as_str())?;
    let total = Amount::new(price.value() * qty)?;
    item(caps.name("name")?.as_str(), total)
}

fn line_chain() -> &'static PatternChain<LineItem> {
    static CHAIN: OnceLock<PatternChain<LineItem>> = OnceLock::new();
    CHAIN.get_or_init(|| {
        PatternChain::new(vec![
            PatternRule { name: "wide_name_amount", regex: re_wide_name_amount, handler: name_amount },
            PatternRule { name: "dot_leader", regex: re_dot_leader, handler: name_amount },
            PatternRule { name: "qty_price_total", regex: re_qty_price_total, handler: name_amount },
            PatternRule { name: "name_qty_price", regex: re_name_qty_price, handler: name_qty_price },
            PatternRule { name: "price_name", regex: re_price_name, handler: name_amount },
        ])
    })
}

// ── Line filtering ───────────────────────────────────────────────────────────

fn is_skipped(line: &str) -> bool {
    if re_separator_line().is_match(line) {
        return true;
    }
    let lower = normalize(line);
    contains_any(&lower, SKIP_PHRASES) || SKIP_WORDS.iter().any(|w| contains_word(&lower, w))
}

/// The store name: the first of the leading lines that reads like a name
/// rather than an address, phone number or date.
fn store_header(text: &str) -> Option<String> {
    text.lines()
        .take(5)
        .map(str::trim)
        .filter(|l| !is_skipped(l))
        .filter(|l| l.chars().next().is_some_and(char::is_alphabetic))
        .filter(|l| (3..=50).contains(&l.len()))
        .filter(|l| !l.chars().any(|c| c.is_ascii_digit()))
        .map(clean_label)
        .find(|l| letter_count(l) >= 3)
}

fn payment_method(lower: &str) -> Option<PaymentMethod> {
    if contains_word(lower, "visa") || contains_word(lower, "card") || contains_word(lower, "mastercard") {
        Some(PaymentMethod::Card)
    } else if lower.contains("mobile money") || contains_word(lower, "momo") {
        Some(PaymentMethod::MobileMoney)
    } else if contains_word(lower, "cash") {
        Some(PaymentMethod::Cash)
    } else {
        None
    }
}

// ── Extraction ───────────────────────────────────────────────────────────────

pub fn applies(text: &str) -> bool {
    let lower = normalize(text);
    contains_any(&lower, RETAIL_KEYWORDS) || contains_word(&lower, "receipt") || re_total_label().is_match(text)
}

pub fn extract(text: &str, ctx: &ExtractContext<'_>) -> Vec<ParsedTransaction> {
    let merchant = store_header(text);
    let lower = normalize(text);
    let method = payment_method(&lower);
    // Items that name nothing categorisable inherit the store's category.
    let store_category = ctx.categories.classify(text, TransactionType::Expense);

    let items: Vec<ParsedTransaction> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_skipped(line))
        .filter(|line| merchant.as_deref() != Some(clean_label(line).as_str()))
        .filter_map(|line| {
            let item = line_chain().first_match(line)?;
            let by_name = ctx.categories.classify(&item.name, TransactionType::Expense);
            let category = if by_name.keyword_hit { by_name.category } else { store_category.category.clone() };
            Some(
                ParsedTransaction::new(item.amount, &item.name, ctx.dates.parse(text), TransactionType::Expense, line)
                    .with_category(category)
                    .with_merchant(merchant.clone())
                    .with_confidence(ITEMIZED_LINE_CONFIDENCE)
                    .with_payment_method(method.clone()),
            )
        })
        .collect();

    if !items.is_empty() {
        return items;
    }

    let Some(total) = re_total_label()
        .captures_iter(text)
        .find_map(|caps| parse_amount(caps.get(1)?.as_str()))
    else {
        return Vec::new();
    };
    let description = merchant.clone().unwrap_or_else(|| "Receipt total".to_string());
    vec![
        ctx.transaction(total, &description, text, TransactionType::Expense, text, ITEMIZED_TOTAL_CONFIDENCE)
            .with_merchant(merchant)
            .with_payment_method(method),
    ]
}
