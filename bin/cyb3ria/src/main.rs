mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use cyb3ria_core::Paths;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "cyb3ria")]
#[command(about = "Terminal client for cyb3ria chat and API", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Profile directory (config and local storage)
    #[arg(long, global = true, env = "CYB3RIA_HOME")]
    home: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Join the chat: print incoming messages, send each input line
    Chat {
        /// WebSocket endpoint (overrides config chat.endpoint)
        #[arg(short, long)]
        endpoint: Option<String>,
    },

    /// Send one JSON request with the stored CSRF token
    Request {
        /// Absolute URL, or a path starting with `/` resolved against http.baseUrl
        url: String,

        /// HTTP method
        #[arg(short = 'X', long, default_value = "POST")]
        method: String,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,
    },

    /// Log in and store the returned CSRF token
    Login {
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Register a new account
    Register {
        username: String,

        #[arg(short, long)]
        password: String,

        /// Password confirmation (defaults to --password)
        #[arg(long)]
        repeat_password: Option<String>,

        #[arg(short, long)]
        invitation_code: String,

        #[arg(long, default_value = "")]
        ip_address: String,

        #[arg(long)]
        mac_address: Option<String>,
    },

    /// Show profile paths, client id and token status
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Get a config value by dot-separated key (e.g. chat.endpoint)
    Get { key: String },
    /// Set a config value by dot-separated key
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with rendered chat lines.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let paths = match cli.home {
        Some(base) => Paths::with_base(base),
        None => Paths::new(),
    };

    match cli.command {
        Commands::Chat { endpoint } => {
            commands::chat::run(&paths, endpoint).await?;
        }
        Commands::Request { url, method, body } => {
            commands::request::run(&paths, &url, &method, body.as_deref()).await?;
        }
        Commands::Login { username, password } => {
            commands::auth::login(&paths, username, password).await?;
        }
        Commands::Register {
            username,
            password,
            repeat_password,
            invitation_code,
            ip_address,
            mac_address,
        } => {
            let repeat_password = repeat_password.unwrap_or_else(|| password.clone());
            commands::auth::register(
                &paths,
                cyb3ria_request::RegistrationRequest {
                    username,
                    password,
                    repeat_password,
                    invitation_code,
                    ip_address,
                    mac_address,
                },
            )
            .await?;
        }
        Commands::Status => {
            commands::status::run(&paths).await?;
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                commands::config_cmd::show(&paths).await?;
            }
            ConfigCommands::Path => {
                println!("{}", paths.config_file().display());
            }
            ConfigCommands::Get { key } => {
                commands::config_cmd::get(&paths, &key).await?;
            }
            ConfigCommands::Set { key, value } => {
                commands::config_cmd::set(&paths, &key, &value).await?;
            }
        },
        Commands::Completions { shell } => {
            commands::completions_cmd::run(&shell, Cli::command()).await?;
        }
    }

    Ok(())
}
