//! Insight session CLI
//!
//! Obtains and inspects access tokens for the Insight security API.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use insight_session::auth::{claims, signer};
use insight_session::{AccessTokenClaims, Config};

#[derive(Parser)]
#[command(name = "insight-session")]
#[command(about = "Token session client for the Insight security API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file
    Init {
        /// Base server URL, e.g. https://api.example.com
        #[arg(long)]
        base_server: String,

        #[arg(long)]
        account: String,

        #[arg(long)]
        secret: String,

        /// Login department
        #[arg(long)]
        dept_id: Option<String>,
    },

    /// Log in and print the access token
    Token,

    /// Log in and print the claims carried by the access token
    Claims,

    /// Print the account signature (no network)
    Sign,

    /// Decode an access token (no network)
    Decode {
        /// Base64 access token
        token: String,
    },
}

fn print_claims(claims: &AccessTokenClaims) {
    println!("id:      {}", claims.id);
    println!("user_id: {}", claims.user_id);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init {
            base_server,
            account,
            secret,
            dept_id,
        } => {
            let mut config = Config::new(base_server, account, secret);
            config.dept_id = dept_id;
            let path = config.save(config_path).context("Failed to write config")?;
            println!("Config written to {}", path.display());
        }
        Commands::Token => {
            let config = Config::load(config_path)?;
            let session = insight_session::connect(&config)?;
            let token = session
                .access_token()
                .await
                .context("Failed to obtain access token")?;
            println!("{}", token);
        }
        Commands::Claims => {
            let config = Config::load(config_path)?;
            let session = insight_session::connect(&config)?;
            session
                .access_token()
                .await
                .context("Failed to obtain access token")?;
            let claims = session
                .claims()
                .await
                .context("Server issued an access token that does not decode")?;
            print_claims(&claims);
        }
        Commands::Sign => {
            let config = Config::load(config_path)?;
            println!("{}", signer::sign(&config.account, &config.secret));
        }
        Commands::Decode { token } => {
            let claims = claims::try_decode(&token)?;
            print_claims(&claims);
        }
    }

    Ok(())
}
