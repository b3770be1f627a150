//! Acquisitions CLI
//!
//! Command-line interface for the Acquisitions API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use acquisitions_client::AcquisitionsClient;
use acquisitions_types::Role;

#[derive(Parser)]
#[command(name = "acquisitions")]
#[command(author, version, about = "Acquisitions API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Acquisitions API
    #[arg(
        long,
        env = "ACQUISITIONS_API_URL",
        default_value = "http://localhost:3000"
    )]
    api_url: String,

    /// Session token from a previous sign-up or sign-in
    #[arg(long, env = "ACQUISITIONS_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Register a new user
    SignUp {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "ACQUISITIONS_PASSWORD", hide_env_values = true)]
        password: String,
        /// admin, user or guest
        #[arg(long, default_value = "user", value_parser = parse_role)]
        role: Role,
    },
    /// Sign in and print the session token
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ACQUISITIONS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the current session
    SignOut,
}

fn parse_role(s: &str) -> Result<Role> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Unknown role: {}. Supported: admin, user, guest", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = AcquisitionsClient::new(&cli.api_url);
    if let Some(token) = cli.token {
        client = client.with_token(token);
    }

    match cli.command {
        Commands::Health => {
            let health = client.health().await?;
            println!("✓ API is healthy");
            println!("{}", serde_json::to_string_pretty(&health)?);
        }

        Commands::SignUp {
            name,
            email,
            password,
            role,
        } => {
            let session = client.sign_up(&name, &email, &password, role).await?;
            println!("{}", serde_json::to_string_pretty(&session.user)?);
            println!("token: {}", session.token);
        }

        Commands::SignIn { email, password } => {
            let session = client.sign_in(&email, &password).await?;
            println!("{}", serde_json::to_string_pretty(&session.user)?);
            println!("token: {}", session.token);
        }

        Commands::SignOut => {
            let resp = client.sign_out().await?;
            println!("✓ {}", resp.message);
        }
    }

    Ok(())
}
