use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;

use backend_gate::config::loader::load_config;
use backend_gate::config::ClientConfig;
use backend_gate::lifecycle::ClientContext;

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Inspect and drive the backend gate client", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show circuit breaker state after one probe
    Status,
    /// Probe the backend health endpoint once
    Probe,
    /// GET a backend path through the request pipeline
    Get {
        path: String,
        /// Use the ungated channel without credentials
        #[arg(long)]
        plain: bool,
    },
    /// Resolve a navigation through the route guard
    Navigate { path: String },
    /// Store a bearer token
    Login { token: String },
    /// Clear the stored token and session
    Logout,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    let ctx = ClientContext::init(config)?;

    match cli.command {
        Commands::Status => {
            ctx.monitor().force_health_check().await;
            print_json(&serde_json::to_value(ctx.monitor().status())?)?;
        }
        Commands::Probe => {
            let healthy = ctx.monitor().force_health_check().await;
            print_json(&json!({
                "url": ctx.monitor().settings().probe_url.as_str(),
                "healthy": healthy,
            }))?;
        }
        Commands::Get { path, plain } => {
            let channel = if plain { ctx.client().plain() } else { ctx.client().secured() };
            match channel.get(&path).await {
                Ok(res) => print_response(res).await?,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    if let Some(status) = e.status() {
                        eprintln!("Status: {}", status);
                    }
                }
            }
        }
        Commands::Navigate { path } => match ctx.history().navigate(&path) {
            Ok(arrival) => print_json(&json!({
                "path": arrival.path,
                "redirectedFrom": arrival.redirected_from,
            }))?,
            Err(e) => eprintln!("Error: {}", e),
        },
        Commands::Login { token } => {
            ctx.credentials().slot().set(&token)?;
            if !ctx.credentials().is_valid(&token) {
                eprintln!("Error: token is malformed or expires too soon; not stored");
                return Ok(());
            }
            let landing = ctx.routes().landing();
            println!("Token stored. Landing route: {} ({})", landing.name, landing.path);
        }
        Commands::Logout => {
            ctx.logout();
            println!("Logged out");
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => print_json(&json),
        Err(_) => {
            println!("{}", text);
            Ok(())
        }
    }
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
