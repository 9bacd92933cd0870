use std::process::exit;

use clap::Parser;
use reqwest::Method;
use serde_json::Value;
use tracing::{error, info};

use ascent_client::client::{RequestBody, RequestOptions};
use ascent_client::config::{load_config, print_schema};
use ascent_client::router::Navigator;
use ascent_client::startup::build_state;
use ascent_client::state::ClientState;
use ascent_client::utils::logger::init_logging;

#[derive(Parser)]
#[command(name = "ascent")]
#[command(version)]
#[command(about = "Command-line front end for the Ascent client session")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Print the JSON schema of the configuration file
    Schema,
    #[command(flatten)]
    Session(SessionCommand),
}

/// Commands that need the loaded configuration and a session.
#[derive(clap::Subcommand)]
enum SessionCommand {
    /// Resolve a backend path to an absolute URL
    Url { path: String },
    /// Build an authenticated websocket URL for a backend path
    Ws { path: String },
    /// Run the route guard for a path and print where it lands
    Navigate { path: String },
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user's profile
    Whoami,
    /// Send an authenticated request and print the response body
    Fetch {
        path: String,
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
        /// JSON request body
        #[arg(long)]
        json: Option<String>,
    },
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Schema => {
            if let Err(e) = print_schema() {
                eprintln!("Failed to render the configuration schema: {e}");
                exit(1);
            }
            return;
        }
        Commands::Session(command) => command,
    };

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{e}");
        exit(1);
    }

    let state = build_state(config);
    if let Err(e) = run(command, &state).await {
        error!("{}", e);
        eprintln!("{e}");
        exit(1);
    }
}

async fn run(command: SessionCommand, state: &ClientState) -> CliResult {
    match command {
        SessionCommand::Url { path } => println!("{}", state.endpoints.to_absolute_url(&path)),
        SessionCommand::Ws { path } => println!("{}", state.fetch.websocket_url(&path).await?),
        SessionCommand::Navigate { path } => {
            let navigation = state.router.navigate(&path).await;
            match navigation.view {
                Some(view) => println!("{} ({})", navigation.path, view),
                None => println!("{}", navigation.path),
            }
            if navigation.redirected {
                info!("Redirected from {} to {}", navigation.requested, navigation.path);
            }
        }
        SessionCommand::Login { email, password } => {
            let session = state.account.login(&email, &password).await?;
            println!("{}", serde_json::to_string_pretty(&session.user)?);
        }
        SessionCommand::Register { email, password } => {
            let session = state.account.register(&email, &password).await?;
            println!("{}", serde_json::to_string_pretty(&session.user)?);
        }
        SessionCommand::Logout => state.account.logout().await?,
        SessionCommand::Whoami => {
            let user = state.account.current_user().await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        SessionCommand::Fetch { path, method, json } => {
            let method = Method::from_bytes(method.to_uppercase().as_bytes())?;
            let mut options = RequestOptions::new(method);
            if let Some(json) = json {
                let body: Value = serde_json::from_str(&json)?;
                options = options.body(RequestBody::Json(body));
            }
            let response = state.fetch.fetch(&path, options).await?;
            let status = response.status();
            let text = response.text().await?;
            println!("{status}");
            println!("{text}");
        }
    }
    Ok(())
}
