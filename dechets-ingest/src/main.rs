//! Point d'entrée CLI pour dechets-ingest

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use dechets_ingest::store::pool::DatabaseOverrides;

// Charger .env au démarrage
fn load_env() {
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

use cli::Commands;

/// Importer des données géographiques déchets (GeoJSON) avec détection du système de coordonnées
#[derive(Parser)]
#[command(name = "dechets-ingest")]
#[command(author, version)]
#[command(about = "Importer des GeoJSON (points de collecte, mobilier urbain, circuits) vers PostgreSQL ou JSON")]
#[command(long_about = "Détecte le système de coordonnées de chaque feature (WGS84, UTM 28N/27N, Lambert Sénégal), convertit en WGS84 et produit des enregistrements prêts à insérer.")]
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

#[tokio::main]
async fn main() -> Result<()> {
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Convert { x, y, strict_bounds } => {
            cli::cmd_convert(x, y, strict_bounds)?;
        }
        Commands::Systems => {
            cli::cmd_systems()?;
        }
        Commands::Map {
            input,
            output,
            geojson,
        } => {
            info!(path = %input.path.display(), kind = %input.kind, output = %output.display(), "Mapping vers fichier");
            cli::cmd_map(&input, &output, geojson.as_deref()).await?;
        }
        Commands::Import {
            input,
            schema,
            host,
            database,
            user,
            password,
            port,
            ssl,
        } => {
            info!(path = %input.path.display(), kind = %input.kind, schema = %schema, "Import vers PostgreSQL");
            let overrides = DatabaseOverrides {
                host,
                database,
                user,
                password,
                port,
                ssl,
            };
            cli::cmd_import(&input, &schema, overrides).await?;
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
        .with_writer(std::io::stderr)
        .init();
}
