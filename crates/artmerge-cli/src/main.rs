use std::path::PathBuf;

use anyhow::Result;
use artmerge_storage::TileKind;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::parse_id;

#[derive(Parser)]
#[command(
    name = "artmerge",
    about = "Inspect, rewrite and merge tile art datasets",
    version,
    long_about = "A command-line tool for tile art datasets (art.mul, artidx.mul, tiledata.mul): \
                  inspect archives, compact them through deduplicating rewrites, exchange tile \
                  metadata as ';'-delimited text and copy tiles between datasets."
)]
struct Cli {
    /// Raise the log level (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON file with dataset file names
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show index size class, tiledata layout and entry counts
    Info {
        /// Dataset directory
        dataset: PathBuf,
    },

    /// Load and save a dataset, compacting identical tiles
    Rewrite {
        /// Dataset directory
        dataset: PathBuf,

        /// Output directory (defaults to the dataset directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Export land or item metadata as ';'-delimited text
    ExportCsv {
        /// Dataset directory
        dataset: PathBuf,

        /// Tile kind (land or item)
        #[arg(short, long)]
        kind: TileKind,

        /// Text file to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import land or item metadata from ';'-delimited text and save
    ImportCsv {
        /// Dataset directory
        dataset: PathBuf,

        /// Tile kind (land or item)
        #[arg(short, long)]
        kind: TileKind,

        /// Text file to read
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory (defaults to the dataset directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Copy a run of tiles from one dataset into another
    Merge {
        /// Source dataset directory
        #[arg(long)]
        from: PathBuf,

        /// Destination dataset directory
        #[arg(long)]
        to: PathBuf,

        /// Tile kind (land or item)
        #[arg(short, long)]
        kind: TileKind,

        /// First source id (decimal or 0x hex)
        #[arg(long, value_parser = parse_id)]
        first: usize,

        /// Number of consecutive ids to copy
        #[arg(long, value_parser = parse_id)]
        count: usize,

        /// First destination id (decimal or 0x hex)
        #[arg(long, value_parser = parse_id)]
        at: usize,

        /// Copy tiledata records along with the images
        #[arg(long)]
        with_metadata: bool,

        /// Output directory (defaults to the destination directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Remove a tile's image and optionally reset its metadata
    Remove {
        /// Dataset directory
        dataset: PathBuf,

        /// Tile kind (land or item)
        #[arg(short, long)]
        kind: TileKind,

        /// Tile id (decimal or 0x hex)
        #[arg(long, value_parser = parse_id)]
        id: usize,

        /// Also reset the tile's tiledata record
        #[arg(long)]
        with_metadata: bool,

        /// Output directory (defaults to the dataset directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Info { dataset } => commands::info::handle(&dataset, config),
        Commands::Rewrite { dataset, out } => commands::rewrite::handle(&dataset, out, config),
        Commands::ExportCsv {
            dataset,
            kind,
            output,
        } => commands::csv::handle_export(&dataset, kind, &output, config),
        Commands::ImportCsv {
            dataset,
            kind,
            input,
            out,
        } => commands::csv::handle_import(&dataset, kind, &input, out, config),
        Commands::Merge {
            from,
            to,
            kind,
            first,
            count,
            at,
            with_metadata,
            out,
        } => commands::merge::handle(
            commands::merge::MergeArgs {
                from,
                to,
                kind,
                first,
                count,
                at,
                with_metadata,
                out,
            },
            config,
        ),
        Commands::Remove {
            dataset,
            kind,
            id,
            with_metadata,
            out,
        } => commands::remove::handle(&dataset, kind, id, with_metadata, out, config),
    }
}
