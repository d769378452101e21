//*** START FILE: src/main.rs ***//
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

use clap::{Parser, Subcommand, ValueEnum};
use eframe::{egui, NativeOptions};
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use translation_ranker::config::{load_config_or_default, Config, DEFAULT_CONFIG_FILE};
use translation_ranker::export::ExportKind;
use translation_ranker::store::FileStore;
use translation_ranker::Annotator;

use crate::gui::RankingApp;

#[derive(Parser, Debug)]
#[command(name = "translation-ranker", version, about = "Rank candidate translations of source sentences")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Overrides `data_dir` from the config file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Overrides `export_dir` from the config file
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Overrides `sample_size` from the config file
    #[arg(long)]
    sample_size: Option<usize>,

    /// Without a subcommand the annotation window opens
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a corpus CSV, replacing the current one
    Import { csv: PathBuf },
    /// Print annotation progress
    Stats,
    /// Write an export file into the export directory
    Export {
        #[arg(value_enum)]
        kind: ExportArg,
    },
    /// Remove progress, or everything including the corpus
    Reset {
        #[arg(value_enum)]
        scope: ResetScope,
        #[arg(long)]
        password: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ExportArg {
    Annotations,
    Snapshot,
    Corpus,
}

impl From<ExportArg> for ExportKind {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Annotations => ExportKind::Annotations,
            ExportArg::Snapshot => ExportKind::Snapshot,
            ExportArg::Corpus => ExportKind::Corpus,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ResetScope {
    Progress,
    All,
}

fn resolve_config(cli: &Cli) -> translation_ranker::Result<Config> {
    let mut config = load_config_or_default(&cli.config)?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = &cli.export_dir {
        config.export_dir = dir.clone();
    }
    if let Some(size) = cli.sample_size {
        config.sample_size = size;
    }
    config.validate()?;
    Ok(config)
}

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run_command(command: Command, config: &Config, mut annotator: Annotator<FileStore>) -> translation_ranker::Result<()> {
    match command {
        Command::Import { csv } => {
            let text = fs::read_to_string(&csv)?;
            let count = annotator.import_corpus(&text)?;
            println!("Imported {} sentences from {}", count, csv.display());
        }
        Command::Stats => {
            let stats = annotator.stats();
            println!("Total sentences:   {}", stats.total_sentences);
            println!("Completed:         {}", stats.completed);
            println!("Remaining:         {}", stats.remaining);
            println!("Sessions:          {}", stats.total_sessions);
            println!("Annotations:       {}", stats.total_annotations);
        }
        Command::Export { kind } => {
            let path = annotator.export_to(kind.into(), &config.export_dir)?;
            println!("Wrote {}", path.display());
        }
        Command::Reset { scope, password } => {
            annotator.authenticate(&password)?;
            match scope {
                ResetScope::Progress => annotator.reset_progress()?,
                ResetScope::All => annotator.reset_all()?,
            }
            println!("Reset complete");
        }
    }
    Ok(())
}

fn run_gui(config: &Config, annotator: Annotator<FileStore>) -> Result<(), eframe::Error> {
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 750.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };
    let export_dir = config.export_dir.clone();
    eframe::run_native(
        "Translation Ranker",
        options,
        Box::new(move |cc| Box::new(RankingApp::new(cc, annotator, export_dir))),
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            init_logging("info");
            error!("{}", e);
            return Err(e.into());
        }
    };
    init_logging(&config.log_filter);
    let store = FileStore::open(&config.data_dir)?;
    info!("Data directory: {}", store.root().display());
    let annotator = Annotator::from_config(store, &config)?;

    match cli.command {
        Some(command) => run_command(command, &config, annotator).map_err(|e| {
            error!("{}", e);
            e.into()
        }),
        None => run_gui(&config, annotator).map_err(|e| {
            error!("GUI error: {}", e);
            e.into()
        }),
    }
}
//*** END FILE: src/main.rs ***//
