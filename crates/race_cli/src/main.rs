//! Race CLI
//!
//! 레이스 파일 디렉터리 분석 도구

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use tracing_subscriber::{fmt, EnvFilter};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "race_cli")]
#[command(about = "Analyze recorded race files and print JSON reports", long_about = None)]
struct Cli {
    /// Analysis config JSON (tolerances, parallel threshold)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Players ranked by number of races
    Players {
        #[arg(long)]
        dir: PathBuf,
    },

    /// Win/placement/spurt/stamina rates per trained character for one player
    Summary {
        #[arg(long)]
        dir: PathBuf,

        /// Player name (default: most frequent)
        #[arg(long)]
        player: Option<String>,
    },

    /// Wins by running style
    Styles {
        #[arg(long)]
        dir: PathBuf,
    },

    /// Wins by character
    Characters {
        #[arg(long)]
        dir: PathBuf,
    },

    /// Occurrence histogram and hit rates for one skill
    Skill {
        #[arg(long)]
        dir: PathBuf,

        #[arg(long)]
        skill: i32,

        /// Caster skills that split the hit-rate table (repeatable)
        #[arg(long = "modifier")]
        modifiers: Vec<i32>,
    },

    /// Per-participant spurt and stamina for a single race file
    Race {
        #[arg(long)]
        file: PathBuf,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = race_cli::load_config(cli.config.as_deref())?;

    let output = match cli.command {
        Commands::Players { dir } => race_cli::players(&race_cli::load_batch(&dir, &config)?)?,
        Commands::Summary { dir, player } => {
            race_cli::summary(&race_cli::load_batch(&dir, &config)?, player.as_deref())?
        }
        Commands::Styles { dir } => race_cli::styles(&race_cli::load_batch(&dir, &config)?)?,
        Commands::Characters { dir } => {
            race_cli::characters(&race_cli::load_batch(&dir, &config)?)?
        }
        Commands::Skill { dir, skill, modifiers } => {
            race_cli::skill(&race_cli::load_batch(&dir, &config)?, skill, &modifiers)?
        }
        Commands::Race { file } => race_cli::race(&file, &config)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(feature = "cli")]
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr so stdout stays pure JSON
    let _ = fmt().with_env_filter(env_filter).with_writer(std::io::stderr).try_init();
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("race_cli is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
