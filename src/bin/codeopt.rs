// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! `codeopt`: terminal front end for the Code Optimizer API.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use code_optimizer::client::{App, AuthOutcome, ClientConfig, OptimizeOutcome, View};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codeopt")]
#[command(about = "Get LLM optimization suggestions for your code", long_about = None)]
struct Cli {
    /// API base URL (defaults to the local development server)
    #[arg(long, global = true, env = "CODEOPT_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        username: String,
        #[arg(long, env = "CODEOPT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in and remember the session
    Login {
        username: String,
        #[arg(long, env = "CODEOPT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Submit code for optimization (reads stdin when no file is given)
    Optimize {
        #[arg(short, long, default_value = "python")]
        language: String,
        file: Option<PathBuf>,
    },
    /// List past submissions
    History {
        /// Show the full entry with this id
        #[arg(long)]
        expand: Option<u64>,
    },
    /// Delete a history entry
    Delete { id: u64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config = ClientConfig::new(url, config.token_file)?;
    }
    let app = App::from_config(&config);

    match cli.command {
        Commands::Register { username, password } => {
            match app.register(&username, &password).await {
                AuthOutcome::Success(message) => println!("{}", message),
                AuthOutcome::Failure(error) => bail!(error),
            }
        }
        Commands::Login { username, password } => {
            app.start().await;
            match app.login(&username, &password).await {
                AuthOutcome::Success(user) => println!("Logged in as {}", user.username),
                AuthOutcome::Failure(error) => bail!(error),
            }
        }
        Commands::Logout => {
            app.logout();
            println!("Logged out");
        }
        Commands::Whoami => {
            require_main(&app).await?;
            if let Some(user) = app.session().session().user {
                println!("{} (id {}, member since {})", user.username, user.id, user.created_at);
            }
        }
        Commands::Optimize { language, file } => {
            require_main(&app).await?;
            let code = read_code(file.as_deref())?;

            let workspace = app.workspace();
            workspace
                .set_language(&language)
                .map_err(anyhow::Error::msg)?;
            workspace.set_code(code);

            match workspace.submit().await {
                OptimizeOutcome::Completed(_) => println!("{}", app.render_suggestions().render()),
                OptimizeOutcome::Rejected(notice) => bail!(notice),
                OptimizeOutcome::Busy => bail!("An optimization is already running"),
                OptimizeOutcome::Failed(error) => bail!(error),
            }
        }
        Commands::History { expand } => {
            require_main(&app).await?;
            if let Some(id) = expand {
                app.toggle_history(id);
            }
            print!("{}", app.render_history());
        }
        Commands::Delete { id } => {
            require_main(&app).await?;
            if !app.delete_history(id).await {
                bail!("Could not delete history entry {}", id);
            }
            println!("Deleted history entry {}", id);
        }
    }

    Ok(())
}

/// Resolve the stored session; fail unless it leads to the main screen.
async fn require_main(app: &App) -> Result<()> {
    match app.start().await {
        View::Main => Ok(()),
        _ => bail!("Not logged in. Run `codeopt login <username>` first."),
    }
}

fn read_code(file: Option<&std::path::Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut code = String::new();
            std::io::stdin()
                .read_to_string(&mut code)
                .context("Failed to read code from stdin")?;
            Ok(code)
        }
    }
}

/// Human-readable logs on stderr, quiet unless `RUST_LOG` says otherwise.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
