//! CLI for Collage board snapshots.

mod commands;

use std::path::PathBuf;
use std::process;

use cg_core::logging::{self, Profile};
use cg_layout::Point;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cg",
    about = "Collage: inspect and rearrange board snapshots",
    version,
    propagate_version = true
)]
struct Cli {
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a demo board with a row of slots and some cards
    New {
        /// Snapshot file to create
        file: PathBuf,

        /// Number of slots
        #[arg(long, default_value = "4")]
        slots: u32,

        /// Number of cards, placed into the first slots
        #[arg(long, default_value = "2")]
        items: u32,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// List entities with their position and role
    List {
        /// Snapshot file
        file: PathBuf,

        /// Only entities carrying this component kind
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Print the entities carrying every listed component kind
    Query {
        /// Snapshot file
        file: PathBuf,

        /// Component kinds (e.g. transform layout_config)
        #[arg(required = true)]
        kinds: Vec<String>,
    },

    /// Drag an entity so its center lands on a point, then save
    Drag {
        /// Snapshot file
        file: PathBuf,

        /// Entity ID or unique ID prefix
        entity: String,

        /// Drop point as X,Y
        #[arg(long, value_parser = parse_point)]
        to: Point,

        /// Session config JSON
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Resolve and print without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Apply a component write request (single or batch) and save
    Set {
        /// Snapshot file
        file: PathBuf,

        /// Request JSON file
        #[arg(short, long)]
        request: PathBuf,
    },

    /// Load a snapshot and verify store invariants
    Check {
        /// Snapshot file
        file: PathBuf,
    },
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{s}'"))?;
    let x = x
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad X '{x}': {e}"))?;
    let y = y
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad Y '{y}': {e}"))?;
    if !x.is_finite() || !y.is_finite() {
        return Err(format!("coordinates must be finite but got '{s}'"));
    }
    Ok(Point::new(x, y))
}

fn main() {
    let cli = Cli::parse();

    logging::init(if cli.verbose {
        Profile::Development
    } else {
        Profile::Test
    });

    let result = match cli.command {
        Commands::New {
            file,
            slots,
            items,
            force,
        } => commands::new::run(&file, slots, items, force),
        Commands::List { file, kind } => commands::list::run(&file, kind.as_deref()),
        Commands::Query { file, kinds } => commands::query::run(&file, &kinds),
        Commands::Drag {
            file,
            entity,
            to,
            config,
            dry_run,
        } => commands::drag::run(&file, &entity, to, config.as_deref(), dry_run),
        Commands::Set { file, request } => commands::set::run(&file, &request),
        Commands::Check { file } => commands::check::run(&file),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
