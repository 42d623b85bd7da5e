use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use eyre::Result;
use moca_core::models::assessment::TestId;
use moca_flow::controller::{FlowController, FlowServices};
use moca_instruments::get_instrument;
use moca_kiosk::config::{self, API_URL_ENV, KioskConfig};
use moca_kiosk::microphone::MicrophoneSource;
use moca_kiosk::terminal::{self, Outcome};
use moca_storage::assessments::AssessmentStore;
use moca_storage::client::{HttpStore, StoreConfig};

#[derive(Parser)]
#[command(name = "moca-kiosk", about = "Administer the MoCA screening at a terminal")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config directory (defaults to the platform config directory)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an assessment session on this terminal
    Run,
    /// Look up a submitted test by its id
    Check { id: String },
    /// Write a config file
    Init {
        /// Assessment Store API root
        #[arg(long)]
        api_url: Option<String>,
        /// Replay this 16-bit PCM WAV file as the microphone
        #[arg(long)]
        wav: Option<PathBuf>,
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config
    Config,
    /// Delete the config file
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let dir = match cli.config_dir {
        Some(dir) => dir,
        None => config::default_dir()?,
    };

    match cli.command {
        Commands::Run => run(&effective_config(&dir)?).await,
        Commands::Check { id } => check(&effective_config(&dir)?, TestId::new(id)).await,
        Commands::Init {
            api_url,
            wav,
            force,
        } => {
            if config::has_config(&dir) && !force {
                return Err(eyre::eyre!(
                    "config already exists at {}; pass --force to overwrite",
                    config::config_path(&dir).display()
                ));
            }
            let mut kiosk = KioskConfig::new(StoreConfig::default()).with_api_url(api_url);
            if let Some(path) = wav {
                kiosk.microphone = MicrophoneSource::Wav { path };
            }
            HttpStore::new(&kiosk.store)?;
            config::save_config(&dir, &kiosk)
        }
        Commands::Config => {
            let kiosk = effective_config(&dir)?;
            println!("{}", serde_json::to_string_pretty(&kiosk)?);
            Ok(())
        }
        Commands::Reset => config::delete_config(&dir),
    }
}

fn effective_config(dir: &std::path::Path) -> Result<KioskConfig> {
    Ok(config::load_or_default(dir)?.with_api_url(std::env::var(API_URL_ENV).ok()))
}

async fn run(kiosk: &KioskConfig) -> Result<()> {
    let store = Arc::new(HttpStore::new(&kiosk.store)?);
    let services = FlowServices {
        capability: kiosk.microphone.capability(),
        assessments: store.clone(),
        media: store,
    };
    let mut flow = FlowController::new(get_instrument("moca")?, services, kiosk.flow)?;

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout();
    let outcome = terminal::run(&mut flow, input, &mut out).await;
    flow.teardown().await;

    match outcome? {
        Outcome::Submitted(id) => tracing::info!(test_id = %id, "assessment finished"),
        Outcome::Abandoned => tracing::warn!("assessment abandoned before submission"),
    }
    Ok(())
}

async fn check(kiosk: &KioskConfig, id: TestId) -> Result<()> {
    let store = HttpStore::new(&kiosk.store)?;
    let max_points = get_instrument("moca")?.max_score();
    let result = store.fetch_result(&id).await?;
    println!("{}", terminal::render_result(&result, max_points));
    Ok(())
}
