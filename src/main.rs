use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ncda::alignment::AlignmentMethod;
use ncda::merge::MergeStrategy;
use ncda::pipeline::{self, Stage};
use ncda::similarity::StandardCombiner;
use ncda::term::InformationContentKind;
use ncda::{PipelineConfig, RnaKind};

/// ncRNA - disease association prediction
#[derive(Parser, Debug)]
#[command(name = "ncda")]
#[command(version)]
struct Cli {
    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory of all input and output files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pairwise sequence similarity per ncRNA type
    Similarity(SimilarityArgs),
    /// Merge the per-type similarity matrices
    Merge(MergeArgs),
    /// Disease semantic similarity from the Disease Ontology
    Disease(DiseaseArgs),
    /// Adjacency matrix of the known associations
    Adjacency,
    /// Pretrain k-mer embeddings
    Kmer(KmerArgs),
    /// Cross validation folds
    Folds(FoldsArgs),
    /// Train and evaluate the association model
    Train(TrainArgs),
    /// Run all stages in order
    All,
}

#[derive(Args, Debug)]
struct SimilarityArgs {
    /// ncRNA types to process (default: all)
    #[arg(long = "kind")]
    kinds: Vec<RnaKind>,
    /// Alignment method: global or local
    #[arg(long)]
    method: Option<String>,
}

#[derive(Args, Debug)]
struct MergeArgs {
    /// Merge strategy: block or padded
    #[arg(long)]
    strategy: Option<String>,
}

#[derive(Args, Debug)]
struct DiseaseArgs {
    /// Term similarity: graphic, resnik, lin, jc, rel or wang
    #[arg(long)]
    method: Option<String>,
    /// Combination of term similarities: funsimavg, funsimmax or bma
    #[arg(long)]
    combiner: Option<String>,
    /// Information content: intrinsic or annotation
    #[arg(long)]
    ic: Option<String>,
}

#[derive(Args, Debug)]
struct KmerArgs {
    /// ncRNA types to embed (default: all)
    #[arg(long = "kind")]
    kinds: Vec<RnaKind>,
    /// Length of the k-mers
    #[arg(long)]
    k: Option<usize>,
    /// Size of the k-mer vectors
    #[arg(long)]
    dim: Option<usize>,
    /// Tokens per segment
    #[arg(long)]
    max_len: Option<usize>,
}

#[derive(Args, Debug)]
struct FoldsArgs {
    /// Number of folds
    #[arg(long)]
    k: Option<usize>,
    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Number of epochs
    #[arg(long)]
    epochs: Option<usize>,
    /// Pairs per batch
    #[arg(long)]
    batch_size: Option<usize>,
    /// Learning rate
    #[arg(long)]
    lr: Option<f64>,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.paths.data_dir = dir.clone();
    }
    Ok(config)
}

/// Applies the subcommand flags to the configuration
fn apply_overrides(config: &mut PipelineConfig, command: &Commands) -> Result<()> {
    match command {
        Commands::Similarity(args) => {
            if !args.kinds.is_empty() {
                config.similarity.kinds = args.kinds.clone();
            }
            if let Some(method) = &args.method {
                config.similarity.method = AlignmentMethod::try_from(method.as_str())?;
            }
        }
        Commands::Merge(args) => {
            if let Some(strategy) = &args.strategy {
                config.similarity.merge = MergeStrategy::try_from(strategy.as_str())?;
            }
        }
        Commands::Disease(args) => {
            if let Some(method) = &args.method {
                config.disease.method = method.clone();
            }
            if let Some(combiner) = &args.combiner {
                config.disease.combiner = StandardCombiner::try_from(combiner.as_str())?;
            }
            if let Some(ic) = &args.ic {
                config.disease.ic = InformationContentKind::try_from(ic.as_str())?;
            }
            // fail early on unknown methods
            config.disease.similarity()?;
        }
        Commands::Kmer(args) => {
            if !args.kinds.is_empty() {
                config.kmer.kinds = args.kinds.clone();
            }
            config.kmer.k = args.k.unwrap_or(config.kmer.k);
            config.kmer.dim = args.dim.unwrap_or(config.kmer.dim);
            config.kmer.max_len = args.max_len.unwrap_or(config.kmer.max_len);
        }
        Commands::Folds(args) => {
            config.folds.k = args.k.unwrap_or(config.folds.k);
            config.folds.seed = args.seed.unwrap_or(config.folds.seed);
        }
        Commands::Train(args) => {
            config.model.epochs = args.epochs.unwrap_or(config.model.epochs);
            config.model.batch_size = args.batch_size.unwrap_or(config.model.batch_size);
            config.model.learning_rate = args.lr.unwrap_or(config.model.learning_rate);
        }
        Commands::Adjacency | Commands::All => {}
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = load_config(cli)?;
    apply_overrides(&mut config, &cli.command).context("Invalid arguments")?;
    std::fs::create_dir_all(&config.paths.data_dir).with_context(|| {
        format!(
            "Failed to create data directory {}",
            config.paths.data_dir.display()
        )
    })?;

    let stage = match cli.command {
        Commands::Similarity(_) => Stage::Similarity,
        Commands::Merge(_) => Stage::Merge,
        Commands::Disease(_) => Stage::Disease,
        Commands::Adjacency => Stage::Adjacency,
        Commands::Kmer(_) => Stage::Kmer,
        Commands::Folds(_) => Stage::Folds,
        Commands::Train(_) => Stage::Train,
        Commands::All => {
            return pipeline::run_all(&config).context("Pipeline failed");
        }
    };
    stage
        .run(&config)
        .with_context(|| format!("Stage {stage} failed"))
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    info!("ncda {}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = run(&cli) {
        error!("{err:#}");
        std::process::exit(1);
    }
}
