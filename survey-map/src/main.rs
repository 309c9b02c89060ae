//! Point d'entrée CLI pour survey-map

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use survey_map::map::MapInputs;

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::{Commands, MapArgs};

/// Préparer les cartes d'une campagne d'observation en mer
#[derive(Parser)]
#[command(name = "survey-map")]
#[command(author, version)]
#[command(about = "Build survey effort lines, repaired boundaries and basemap plans for sighting maps")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Lines {
            effort,
            output,
            epsg,
            precision,
        } => {
            info!(effort = %effort.display(), output = %output.display(), epsg, "Effort lines");
            cli::cmd_lines(&effort, &output, epsg, precision)?;
        }
        Commands::Map {
            shapes,
            sightings,
            effort,
            output,
            config,
            title,
            epsg,
            zoom,
            clip,
            assume_epsg,
        } => {
            let inputs = MapInputs {
                shapes_dir: shapes,
                sightings,
                effort,
            };
            let args = MapArgs {
                config,
                title,
                epsg,
                zoom,
                clip,
                assume_epsg,
            };
            cli::cmd_map(&inputs, &output, &args)?;
        }
        Commands::Repair {
            shapes,
            output,
            simplify,
        } => {
            info!(shapes = %shapes.display(), output = %output.display(), simplify, "Repair");
            cli::cmd_repair(&shapes, &output, simplify)?;
        }
        Commands::Tiles {
            bbox,
            zoom,
            max_tiles,
            template,
        } => {
            cli::cmd_tiles(&bbox, zoom, max_tiles, &template)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
