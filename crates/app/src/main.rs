use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use txscan_ocr::{ParseOptions, TextInput, TextPipeline};
use txscan_pdf::{CancelFlag, GlyphDocument};

mod config;

#[derive(Parser, Debug)]
#[command(name = "txscan", version, about = "Extract transactions from messages, receipts and bank statements")]
struct Cli {
    /// Path to txscan.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse free text: an SMS, a pasted receipt, a list of expenses
    Text {
        /// The text itself; read from --file or stdin when omitted
        text: Option<String>,

        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Screenshot or photo to recognise (needs the `tesseract` feature)
        #[arg(long, conflicts_with_all = ["text", "file"])]
        image: Option<PathBuf>,

        /// Print only the single best transaction
        #[arg(long)]
        single: bool,
    },

    /// Parse a bank statement from its extracted glyphs (JSON)
    Statement { glyphs: PathBuf },

    /// Print the active category taxonomy
    Categories,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Text { text, file, image, single } => {
            let mut options = ParseOptions::default();
            let input = match (text, file, image) {
                (Some(text), _, _) => text,
                (None, Some(path), _) => {
                    std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?
                }
                (None, None, Some(path)) => {
                    let bytes = tokio::fs::read(&path).await.with_context(|| format!("read {}", path.display()))?;
                    options.image = Some(bytes);
                    String::new()
                }
                (None, None, None) => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf).context("read stdin")?;
                    buf
                }
            };

            let pipeline = TextPipeline::new(config.text_parser()).with_timeout(config.enhancement.timeout());
            #[cfg(feature = "tesseract")]
            let pipeline = pipeline.with_recognizer(txscan_ocr::TesseractRecognizer::default());

            let result = pipeline.process(TextInput::from(input), &options).await?;
            if single {
                print_json(&result.best())?;
            } else {
                print_json(&result)?;
            }
        }

        Command::Statement { glyphs } => {
            let parser = config.statement_parser()?;
            let document = GlyphDocument::load(&glyphs)
                .await
                .with_context(|| format!("load {}", glyphs.display()))?;

            let cancel = CancelFlag::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let progress = |label: &str, percent: u8| tracing::debug!(percent, "{label}");
            let result = parser.parse_document(&document, &progress, &cancel).await;
            print_json(&result)?;
            if let Some(error) = result.error {
                bail!("{}: {error}", glyphs.display());
            }
        }

        Command::Categories => print_json(&config.categories)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serialize output")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn text_and_file_conflict() {
        let err = Cli::try_parse_from(["txscan", "text", "Food 60k", "--file", "x.txt"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["txscan", "statement", "s.json", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Statement { .. }));
    }
}
