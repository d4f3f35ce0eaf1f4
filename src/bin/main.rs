//! DSVM Command Line Interface
//!
//! A command-line interface for training distributed linear SVM models from
//! job configuration files and for evaluating or inspecting saved models.

use clap::{Args, Parser, Subcommand};
use dsvm::config::{DataFormat, JobConfig};
use dsvm::core::Result;
use dsvm::persistence::SerializableModel;
use dsvm::SvmTrainer;
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "dsvm")]
#[command(about = "Distributed dual coordinate-descent training for linear SVMs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "DSVM Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model from a job configuration file
    Train(TrainArgs),
    /// Evaluate a saved model on a dataset
    Evaluate(EvaluateArgs),
    /// Display model information
    Info(InfoArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Job configuration file (key=value pairs)
    #[arg(short, long)]
    config: PathBuf,

    /// Number of data-parallel workers
    #[arg(short, long, default_value_t = 1)]
    workers: usize,

    /// Base seed for the per-worker sweep shuffles
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Worker id that emits progress log lines
    #[arg(long, default_value_t = 0)]
    reporter: usize,

    /// Save the trained model to this file
    #[arg(long)]
    model_out: Option<PathBuf>,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Saved model file
    #[arg(short, long)]
    model: PathBuf,

    /// Dataset file
    #[arg(long)]
    data: PathBuf,

    /// Data format: libsvm or tsv
    #[arg(short, long, default_value = "libsvm")]
    format: String,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    model: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Info(args) => info_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn train_command(args: TrainArgs) -> Result<()> {
    let job = JobConfig::from_file(&args.config)?;

    if !job.is_sparse {
        // Known limitation carried from the original system
        println!("Dense data format is not supported; nothing to do");
        return Ok(());
    }

    info!("Loading training data from {:?}", job.train);
    let train = job.format.load(&job.train)?;
    info!("Loading test data from {:?}", job.test);
    let test = job.format.load(&job.test)?;
    info!(
        "Loaded {} training and {} test samples ({} features)",
        train.len(),
        test.len(),
        train.dim().max(test.dim())
    );

    let trainer = SvmTrainer::new()
        .with_c(job.c)
        .with_max_iter(job.max_iter)
        .with_max_inner_iter(job.max_inn_iter)
        .with_workers(args.workers)
        .with_seed(args.seed)
        .with_reporter(args.reporter);

    let (model, accuracy) = trainer.train_evaluate(&*train, &*test)?;

    println!(
        "Classification accuracy on testing set with [C = {}], [max_iter = {}], \
         [max_inn_iter = {}], [test set size = {}]: {:.6}",
        job.c,
        job.max_iter,
        job.max_inn_iter,
        test.len(),
        accuracy
    );
    println!(
        "Stopped after {} iterations ({}), duality gap {:.6e}",
        model.iterations(),
        model.stop_reason(),
        model.duality_gap()
    );

    if let Some(path) = args.model_out {
        let serializable = SerializableModel::from_trained_model(&model);
        serializable.save_to_file(&path)?;
        info!("Model saved to {path:?}");
    }

    Ok(())
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    let format: DataFormat = args.format.parse()?;

    info!("Loading model from {:?}", args.model);
    let model = SerializableModel::load_from_file(&args.model)?.to_trained_model()?;

    info!("Loading data from {:?}", args.data);
    let dataset = format.load(&args.data)?;

    let accuracy = model.evaluate(&*dataset);
    println!("=== Model Evaluation ===");
    println!("Data file: {:?}", args.data);
    println!("Samples: {}", dataset.len());
    println!("Accuracy: {:.2}%", accuracy * 100.0);

    Ok(())
}

fn info_command(args: InfoArgs) -> Result<()> {
    info!("Loading model from {:?}", args.model);
    let serializable = SerializableModel::load_from_file(&args.model)?;

    serializable.print_summary();

    let weights = &serializable.weights;
    let n_show = weights.len().min(10);
    println!("\nFirst weights:");
    for (i, &w) in weights.iter().enumerate().take(n_show) {
        println!("  w{i}: {w:.6}");
    }
    if weights.len() > n_show {
        println!("  ... ({} more)", weights.len() - n_show);
    }

    Ok(())
}
