use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::error;

use authsession::config::{config_schema, load_config};
use authsession::models::Credentials;
use authsession::startup::build;
use authsession::state::AppState;
use authsession::utils::logger::init_logging;

#[derive(Parser, Debug)]
#[command(name = "authsession", about = "Session and route-guard client for the admin API")]
struct Cli {
    /// YAML configuration file; a missing file means defaults.
    #[arg(long, env = "AUTHSESSION_CONFIG", default_value = "./config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a session and store its token.
    Login { username: String, password: String },
    /// End the session and forget the token.
    Logout,
    /// Exit 0 if the stored session is valid.
    Check,
    /// Print the current user as JSON.
    Whoami,
    /// Run each path through the route guard.
    Navigate {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Print the configuration JSON schema.
    Schema,
}

async fn run(state: AppState, command: Command) -> Result<(), String> {
    let store = &state.store;
    match command {
        Command::Login { username, password } => {
            let user = store
                .login(&Credentials::new(&username, &password))
                .await
                .map_err(|e| e.to_string())?;
            println!("Logged in as {}", user.label());
        }
        Command::Logout => {
            store.logout().await;
            println!("Logged out");
        }
        Command::Check => {
            if !store.check_auth().await {
                return Err("not authenticated".to_string());
            }
            println!("Authenticated");
        }
        Command::Whoami => {
            let user = store.fetch_user().await.map_err(|e| e.to_string())?;
            let json = serde_json::to_string_pretty(&user).map_err(|e| e.to_string())?;
            println!("{}", json);
        }
        Command::Navigate { paths } => {
            let mut router = state.router();
            for path in paths {
                let navigation = router.navigate(&path).await.map_err(|e| e.to_string())?;
                println!(
                    "{} -> {} ({:?})",
                    navigation.requested, navigation.location.path, navigation.location.route.view
                );
            }
        }
        Command::Schema => println!("{}", config_schema()),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let Cli {
        config: config_path,
        command,
    } = Cli::parse();

    let config = match load_config(&config_path) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Invalid configuration in {}: {}", config_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Could not initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let state = match build(config) {
        Ok(state) => state,
        Err(e) => {
            error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(state, command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}
