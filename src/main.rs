//! # ShieldChat: grounded Q&A over a document corpus
//!
//! Usage:
//!   shieldchat ask "What does RfPatrol detect?"   # One question, one answer
//!   shieldchat chat                               # Interactive prompt
//!   shieldchat search "drone detection" -k 8      # Retrieval only, with scores
//!   shieldchat --strategy hashed --corpus data.json ask "..."

use anyhow::Result;
use clap::{Parser, Subcommand};
use shieldchat_agent::AnswerComposer;
use shieldchat_core::config::{ShieldChatConfig, Strategy};
use shieldchat_core::traits::{Embedder, Provider};
use shieldchat_core::types::Answer;
use shieldchat_knowledge::Retriever;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "shieldchat",
    version,
    about = "🛡️ ShieldChat: answers grounded in your document corpus"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: ~/.shieldchat/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Corpus file, overrides [corpus].path
    #[arg(long, global = true)]
    corpus: Option<String>,

    /// Retrieval strategy: keyword, embedding or hashed
    #[arg(long, global = true)]
    strategy: Option<Strategy>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Ask one question and print the answer
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Read questions from stdin, one per line
    Chat,
    /// Show which documents a query retrieves, without calling the model
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Number of documents to show
        #[arg(short, default_value_t = shieldchat_knowledge::DEFAULT_TOP_K)]
        k: usize,
    },
}

fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "shieldchat=debug,shieldchat_knowledge=debug,\
         shieldchat_agent=debug,shieldchat_providers=debug"
    } else {
        "shieldchat=info,shieldchat_knowledge=info,shieldchat_agent=warn,shieldchat_providers=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => ShieldChatConfig::load_from(&expand_path(path))?,
        None => ShieldChatConfig::load()?,
    };
    if let Some(corpus) = &cli.corpus {
        config.corpus.path = corpus.clone();
    }
    if let Some(strategy) = cli.strategy {
        config.retrieval.strategy = strategy;
    }

    let composer = build_composer(&config)?;

    match cli.command {
        Command::Ask { question } => {
            let question = question.join(" ");
            eprintln!("Thinking…");
            let answer = composer.answer(&question).await;
            render(&answer);
        }
        Command::Chat => run_chat(&composer).await?,
        Command::Search { query, k } => {
            let query = query.join(" ");
            let hits = composer.retriever().retrieve_scored(&query, k).await;
            if hits.is_empty() {
                println!("No matching documents.");
            }
            for (i, hit) in hits.iter().enumerate() {
                let title = if hit.document.title.is_empty() {
                    "(untitled)"
                } else {
                    hit.document.title.as_str()
                };
                println!("{}. [{:.4}] {}", i + 1, hit.score, title);
                if !hit.document.url.is_empty() {
                    println!("   {}", hit.document.url);
                }
                println!("   {}", snippet(&hit.document.text, 160));
            }
        }
    }

    Ok(())
}

/// Load the corpus once and wire retriever, scorer and provider together.
fn build_composer(config: &ShieldChatConfig) -> Result<AnswerComposer> {
    let corpus_path = expand_path(&config.corpus.path);
    let outcome = shieldchat_knowledge::load_corpus(&corpus_path);
    if let Some(warning) = &outcome.warning {
        eprintln!("⚠️  {warning}; answers will not use local data.");
    }
    let corpus = Arc::new(outcome.corpus);

    let client = shieldchat_providers::http_client(config)?;

    let provider: Option<Arc<dyn Provider>> =
        match shieldchat_providers::create_provider(config, client.clone()) {
            Ok(p) => Some(Arc::new(p)),
            Err(e) => {
                tracing::warn!(
                    "⚠️ {e}. Available: {}",
                    shieldchat_providers::available_providers().join(", ")
                );
                None
            }
        };
    match &provider {
        Some(p) if !p.has_credentials() => {
            tracing::warn!(
                "⚠️ No API key for provider '{}'; answers will not call the model",
                p.name()
            );
        }
        _ => {}
    }

    let embedder: Option<Arc<dyn Embedder>> = if config.retrieval.strategy == Strategy::Embedding {
        match shieldchat_providers::create_embedder(config, client) {
            Ok(embedder) => Some(Arc::new(embedder)),
            Err(e) => {
                tracing::warn!("⚠️ Embeddings endpoint unavailable: {e}");
                None
            }
        }
    } else {
        None
    };

    let scorer = shieldchat_knowledge::build_scorer(&config.retrieval, embedder);
    tracing::info!("🔎 Retrieval: {} over {} documents", scorer.name(), corpus.len());

    let retriever = Retriever::new(corpus, scorer);
    Ok(AnswerComposer::from_config(config, retriever, provider))
}

async fn run_chat(composer: &AnswerComposer) -> Result<()> {
    println!(
        "🛡️ ShieldChat v{}: type a question, or 'exit' to quit.",
        env!("CARGO_PKG_VERSION")
    );
    if !composer.can_complete() {
        println!("   (no completion service configured; set api_key in ~/.shieldchat/config.toml)");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n❯ ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }

        eprintln!("Thinking…");
        let answer = composer.answer(question).await;
        render(&answer);
    }
    Ok(())
}

fn render(answer: &Answer) {
    println!("\n{}", answer.text.trim_end());
    if !answer.sources.is_empty() {
        println!("\nSources:");
        for url in &answer.sources {
            println!("- {url}");
        }
    }
}

/// First `max` chars of `text` on one line.
fn snippet(text: &str, max: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max).collect();
    format!("{cut}…")
}
