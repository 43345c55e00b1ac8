use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::error;

use giftsync::config::{config_schema, load_config};
use giftsync::models::Credentials;
use giftsync::startup::{build_context, build_context_with_storage};
use giftsync::state::AppContext;
use giftsync::storage::MemoryStore;
use giftsync::utils::logger::init_logging;

#[derive(Parser)]
#[command(name = "giftsync")]
#[command(about = "Client for the family wishlist service", long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "./config.yaml")]
    config: PathBuf,

    /// Keep the session in memory instead of the configured storage
    #[arg(long)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login { email: String, password: String },
    /// Forget the stored session
    Logout,
    /// Restore the stored session and show who it belongs to
    Whoami,
    /// List notifications for the signed-in user
    Notifications {
        #[arg(long)]
        mark_all_read: bool,
    },
    /// Run the route guard for a path and print where it lands
    Navigate { path: String },
    /// Show or change the colour theme
    Theme {
        #[arg(long, conflicts_with_all = ["light", "toggle"])]
        dark: bool,
        #[arg(long, conflicts_with = "toggle")]
        light: bool,
        #[arg(long)]
        toggle: bool,
    },
    /// Ask the server to e-mail a password reset link
    RequestReset { email: String },
    /// Set a new password using the link's user id and token
    ResetPassword {
        user_id: String,
        token: String,
        new_password: String,
    },
    /// Print the JSON schema of the configuration file
    Schema,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Commands::Schema = cli.command {
        return match config_schema() {
            Ok(schema) => {
                println!("{}", schema);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to render schema: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let context = if cli.ephemeral {
        build_context_with_storage(config, Arc::new(MemoryStore::new()))
    } else {
        build_context(config)
    };
    let context = match context {
        Ok(context) => context,
        Err(e) => {
            error!("Failed to build client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&context, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            if let Some(path) = context.navigation.last() {
                eprintln!("Redirected to {}", path);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(context: &AppContext, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    let store = &context.store;
    match command {
        Commands::Login { email, password } => {
            let outcome = store.login(&Credentials::new(email, password)).await?;
            println!("Signed in as {}", outcome.user.display_name());
            println!("Continue to {}", context.guard.post_login_destination());
        }
        Commands::Logout => {
            store.logout();
            println!("Signed out");
        }
        Commands::Whoami => {
            store.initialize_app().await;
            match store.current_user() {
                Some(user) => println!("{} <{}>", user.display_name(), user.email),
                None => return Err("not signed in".into()),
            }
        }
        Commands::Notifications { mark_all_read } => {
            store.initialize_app().await;
            if store.current_user().is_none() {
                return Err("not signed in".into());
            }
            if mark_all_read {
                store.mark_all_notifications_read().await?;
            }
            for notification in store.notifications() {
                println!(
                    "{} {:>6} {:?} target={} {}",
                    if notification.read { " " } else { "*" },
                    notification.id,
                    notification.kind,
                    notification.target_id,
                    notification.created_at.to_rfc3339()
                );
            }
            println!("{} unread", store.unread_notifications_count());
        }
        Commands::Navigate { path } => {
            let navigation = context.guard.navigate(&path).await;
            println!("{}", navigation.destination());
        }
        Commands::Theme { dark, light, toggle } => {
            let is_dark = if toggle {
                store.toggle_theme()
            } else if dark || light {
                store.set_dark_theme(dark);
                dark
            } else {
                store.is_dark_theme()
            };
            println!("{}", if is_dark { "dark" } else { "light" });
        }
        Commands::RequestReset { email } => {
            context.auth.request_password_reset(&email).await?;
            println!("Reset link requested for {}", email);
        }
        Commands::ResetPassword {
            user_id,
            token,
            new_password,
        } => {
            context
                .auth
                .reset_password(&user_id, &token, &new_password)
                .await?;
            println!("Password updated");
        }
        Commands::Schema => println!("{}", config_schema()?),
    }
    Ok(())
}
