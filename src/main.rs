//! Word-recognizer CLI
//!
//! Command-line interface for per-word model selection and recognition

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use hmm_recognizer::{
    data,
    recognize::{recognize, report, word_error_rate},
    selection::{train_words, SelectorConfig, SelectorKind},
    GaussianHmmProvider,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hmm_recognizer")]
#[command(about = "Per-word HMM topology selection and word recognition")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SelectionArgs {
    /// Selection strategy (constant, bic, dic, cv)
    #[arg(short, long, default_value = "bic")]
    strategy: String,

    /// State count for the constant strategy
    #[arg(long, default_value = "3")]
    n_constant: usize,

    /// Smallest candidate state count
    #[arg(long, default_value = "2")]
    min_states: usize,

    /// Largest candidate state count
    #[arg(long, default_value = "10")]
    max_states: usize,

    /// RNG seed for model initialization
    #[arg(long, default_value = "14")]
    seed: u64,

    /// EM iteration cap per fit
    #[arg(long, default_value = "1000")]
    max_iter: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Select a model per vocabulary word and report the chosen topologies
    Select {
        /// Training corpus CSV (word,seq,features...)
        #[arg(short, long)]
        train: String,

        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Train word models, then recognize a test corpus
    Recognize {
        /// Training corpus CSV (word,seq,features...)
        #[arg(short, long)]
        train: String,

        /// Test corpus CSV (item,label,features...)
        #[arg(long)]
        test: String,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Write the full recognition report as JSON
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("hmm_recognizer=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Select { train, selection } => run_select(&train, &selection),
        Commands::Recognize {
            train,
            test,
            selection,
            output,
        } => run_recognize(&train, &test, &selection, output.as_deref()),
    }
}

fn parse_selection(args: &SelectionArgs) -> Result<(SelectorKind, SelectorConfig)> {
    let kind: SelectorKind = args.strategy.parse()?;
    let config = SelectorConfig {
        n_constant: args.n_constant,
        min_states: args.min_states,
        max_states: args.max_states,
        seed: args.seed,
    };
    Ok((kind, config))
}

fn run_select(train: &str, args: &SelectionArgs) -> Result<()> {
    let (kind, config) = parse_selection(args)?;

    println!("{}", "Loading training corpus...".cyan());
    let dataset = data::load_training(train)?;
    println!("Loaded {} words", dataset.len());

    println!(
        "{}",
        format!(
            "Selecting models with the {} strategy over {}..={} states...",
            kind, config.min_states, config.max_states
        )
        .cyan()
    );

    let provider = GaussianHmmProvider::with_max_iter(args.max_iter);
    let models = train_words(kind, &dataset, config, &provider);

    println!("\n{}", "=== Selected Topologies ===".bold());
    for word in dataset.words() {
        match models.get(word) {
            Some(model) => println!(
                "  {} -> {} states",
                word.green(),
                model.n_states().to_string().bold()
            ),
            None => println!("  {} -> {}", word.red(), "no model".red()),
        }
    }
    println!(
        "\n{} of {} words trained",
        models.len().to_string().green(),
        dataset.len()
    );

    Ok(())
}

fn run_recognize(train: &str, test: &str, args: &SelectionArgs, output: Option<&str>) -> Result<()> {
    let (kind, config) = parse_selection(args)?;

    println!("{}", "Loading corpora...".cyan());
    let dataset = data::load_training(train)?;
    let test_set = data::load_test(test)?;
    println!(
        "Loaded {} words, {} test items",
        dataset.len(),
        test_set.len()
    );

    println!(
        "{}",
        format!("Training word models ({} strategy)...", kind).cyan()
    );
    let provider = GaussianHmmProvider::with_max_iter(args.max_iter);
    let models = train_words(kind, &dataset, config, &provider);
    println!("Trained {} of {} words", models.len(), dataset.len());

    println!("{}", "Recognizing...".cyan());
    let recognition = recognize(&provider, &models, &test_set)?;

    println!("\n{}", "=== Guesses ===".bold());
    for (item, guess) in test_set.items().iter().zip(&recognition.guesses) {
        match &item.label {
            Some(label) if label == guess => {
                println!("  {} -> {}", item.id, guess.green());
            }
            Some(label) => {
                println!("  {} -> {} (expected {})", item.id, guess.red(), label);
            }
            None => println!("  {} -> {}", item.id, guess),
        }
    }

    if let Some(wer) = word_error_rate(&recognition, &test_set) {
        let line = format!("Word error rate: {:.1}%", wer * 100.0);
        let line = if wer <= 0.5 { line.green() } else { line.red() };
        println!("\n{line}");
    }

    if let Some(path) = output {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, &report(&recognition, &test_set))?;
        println!("{}", format!("Report written to {path}").green());
    }

    Ok(())
}
