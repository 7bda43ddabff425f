use std::sync::Arc;
use txscan_core::{BankStatementResult, StatementDiagnostics};
use txscan_import::deduplicate;

use crate::bank::{account_number, BankIdentityTable};
use crate::error::PdfError;
use crate::glyph::{reconstruct_rows, Glyph, Row};
use crate::progress::{self, NoProgress, ProgressSink};
use crate::source::{CancelFlag, PageSource};
use crate::table::StatementTableParser;

/// Glyphs to [`BankStatementResult`]: rows, table, bank identity, dedup.
#[derive(Debug, Clone, Default)]
pub struct StatementParser {
    table: StatementTableParser,
    banks: Arc<BankIdentityTable>,
}

impl StatementParser {
    pub fn new(table: StatementTableParser, banks: BankIdentityTable) -> Self {
        Self { table, banks: Arc::new(banks) }
    }

    /// Parse glyphs that are already in memory.
    pub fn parse_glyphs(&self, glyphs: &[Glyph]) -> BankStatementResult {
        let pages_read = glyphs.iter().map(|g| g.page).collect::<std::collections::BTreeSet<_>>().len();
        self.finish(reconstruct_rows(glyphs), pages_read, &NoProgress)
    }

    /// Read every page from `source` in order, then parse.
    ///
    /// Document-level failures and cancellation come back as a failed result,
    /// never as a panic or an `Err`.
    pub async fn parse_document<S, P>(&self, source: &S, progress: &P, cancel: &CancelFlag) -> BankStatementResult
    where
        S: PageSource,
        P: ProgressSink + ?Sized,
    {
        match self.read_and_parse(source, progress, cancel).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "statement parse failed");
                BankStatementResult::failed(e.to_string())
            }
        }
    }

    async fn read_and_parse<S, P>(
        &self,
        source: &S,
        progress: &P,
        cancel: &CancelFlag,
    ) -> Result<BankStatementResult, PdfError>
    where
        S: PageSource,
        P: ProgressSink + ?Sized,
    {
        let total = source.page_count()?;
        progress.report("Loading document", progress::LOADED);

        let mut glyphs = Vec::new();
        for page in 1..=total {
            if cancel.is_cancelled() {
                return Err(PdfError::Cancelled);
            }
            glyphs.extend(source.read_page(page).await?);
            progress.report(&format!("Reading page {page} of {total}"), progress::page_percent(page, total));
        }
        if cancel.is_cancelled() {
            return Err(PdfError::Cancelled);
        }

        Ok(self.finish(reconstruct_rows(&glyphs), total, progress))
    }

    fn finish<P: ProgressSink + ?Sized>(&self, rows: Vec<Row>, pages_read: usize, progress: &P) -> BankStatementResult {
        progress.report("Reconstructing rows", progress::ROWS_BUILT);

        let (transactions, diagnostics) = self.table.parse_rows(&rows);
        progress.report("Parsing transactions", progress::TABLE_PARSED);

        let text = rows.iter().map(Row::text).collect::<Vec<_>>().join("\n");
        let bank_name = self.banks.detect(&text);
        let account = account_number(&text);
        progress.report("Detecting bank", progress::BANK_DETECTED);

        let before = transactions.len();
        let mut transactions = deduplicate(transactions);
        transactions.sort_by(|a, b| b.date.cmp(&a.date));

        let diagnostics = StatementDiagnostics {
            pages_read,
            duplicates_removed: before - transactions.len(),
            ..diagnostics
        };
        tracing::info!(
            transactions = transactions.len(),
            bank = bank_name.as_deref().unwrap_or("unknown"),
            rows = diagnostics.rows_seen,
            duplicates = diagnostics.duplicates_removed,
            "statement parsed"
        );
        progress.report("Done", progress::DONE);

        BankStatementResult::ok(transactions, bank_name, account, diagnostics)
    }
}
