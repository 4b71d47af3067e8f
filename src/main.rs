use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use child_support_engine::api::{AppState, CalculationRequest, create_router};
use child_support_engine::calculation::compute;
use child_support_engine::config::ConfigLoader;

const DEFAULT_CONFIG_DIR: &str = "./config/child_support";

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Assess a case read from a JSON file and print the results
    Assess {
        /// Request file with `inputs` and optional `case_configuration`
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Parser, Debug)]
#[command(name = "child-support-engine")]
#[command(about = "Australian child support assessment engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding scheme.yaml and rates/
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_DIR)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let loader = ConfigLoader::load(&cli.config)?;
    info!(
        scheme = %loader.metadata().code,
        version = %loader.metadata().version,
        rate_years = loader.config().rates().len(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Serve { port } => {
            let app = create_router(AppState::new(loader));
            let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
            info!(port, "Listening");
            axum::serve(listener, app).await?;
        }
        Commands::Assess { input } => {
            let body = std::fs::read_to_string(&input)?;
            let request: CalculationRequest = serde_json::from_str(&body)?;
            let results = compute(&request.inputs, &request.case_configuration, loader.config())?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}
