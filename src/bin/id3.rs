//! Learn an ID3 decision tree from a delimited file and print it as Graphviz DOT.

use anyhow::{bail, Context, Result};
use clap::Parser;
use rusty_id3::data::reader::CsvReader;
use rusty_id3::trees::classifier::DecisionTreeClassifier;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "id3")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Induce an ID3 decision tree from categorical data", long_about = None)]
struct Args {
    /// Input file, one example per line, last column is the label
    #[arg(short, long)]
    input: PathBuf,

    /// Field delimiter
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// The first line is data, not column names
    #[arg(long)]
    no_headers: bool,

    /// Strip surrounding whitespace from every field
    #[arg(long)]
    trim: bool,

    /// Write the tree as Graphviz DOT to this file instead of stdout
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Fraction of rows held out to measure accuracy (0 trains on everything)
    #[arg(long, default_value_t = 0.0)]
    test_size: f64,

    /// Seed for the holdout shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Evaluate attribute gains on a single thread
    #[arg(long)]
    sequential: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    if !args.delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got {:?}", args.delimiter);
    }

    info!("Loading dataset from: {}", args.input.display());
    let dataset = CsvReader::default()
        .has_headers(!args.no_headers)
        .delimiter(args.delimiter as u8)
        .trim(args.trim)
        .read_path(&args.input)
        .context("Failed to load dataset")?;
    info!(
        "Loaded {} rows with {} attributes: {}",
        dataset.nrows(),
        dataset.ncols(),
        dataset.feature_names().join(", ")
    );

    let (train, test) = if args.test_size > 0.0 {
        let (train, test) = dataset
            .train_test_split(1.0 - args.test_size, args.seed)
            .context("Failed to split dataset")?;
        info!("Holding out {} of {} rows", test.nrows(), dataset.nrows());
        (train, Some(test))
    } else {
        (dataset, None)
    };

    let mut classifier = DecisionTreeClassifier::new();
    classifier.set_parallel(!args.sequential);
    classifier.fit(&train).context("Failed to build the tree")?;

    let root = classifier
        .root()
        .context("Classifier has no tree after fitting")?;

    if let Some(test) = test.filter(|test| !test.is_empty()) {
        let evaluation = classifier
            .evaluate(&test)
            .context("Failed to classify the holdout rows")?;
        for (row, err) in &evaluation.unclassified {
            warn!("Holdout row {} could not be classified: {err}", row + 1);
        }
        if evaluation.n_classified() > 0 {
            let accuracy = classifier.evaluation_accuracy(&evaluation)?;
            info!(
                "Holdout accuracy: {:.2}% over {} of {} rows",
                accuracy * 100.0,
                evaluation.n_classified(),
                test.nrows()
            );
        } else {
            warn!("No holdout row could be classified, accuracy is undefined");
        }
    }

    let dot = root.to_dot();
    match &args.dot {
        Some(path) => {
            std::fs::write(path, &dot)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote tree to: {}", path.display());
        }
        None => print!("{dot}"),
    }

    Ok(())
}
