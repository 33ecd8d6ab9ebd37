mod commands;
mod logging;

use clap::{Parser, Subcommand};
use commands::directory::DirectoryCommand;
use commands::levels::LevelCommand;
use commands::orgs::OrgCommand;
use commands::projects::ProjectCommand;
use commands::users::UserCommand;
use commands::xdmod::XdmodCommand;
use om_core::config::OrgmapConfig;
use om_core::error::OrgmapError;
use om_events::bus::EventBus;
use owo_colors::OwoColorize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "om", about = "Hierarchical organization unit management")]
struct Cli {
    /// Path to orgmap.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve,
    /// Print the OpenAPI spec
    Openapi,
    /// Create the default hierarchy tiers and the root container
    Seed,
    /// Check the hierarchy and every organization's placement
    Validate,
    /// Manage hierarchy tiers
    Level {
        #[command(subcommand)]
        command: LevelCommand,
    },
    /// Manage organizations
    Org {
        #[command(subcommand)]
        command: OrgCommand,
    },
    /// Manage directory string mappings
    Directory {
        #[command(subcommand)]
        command: DirectoryCommand,
    },
    /// Query and sync users
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Query projects
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    /// XDMoD exports
    Xdmod {
        #[command(subcommand)]
        command: XdmodCommand,
    },
}

#[tokio::main]
async fn main() {
    logging::init();
    let cli = Cli::parse();

    let config = match OrgmapConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{} {err}", "error:".red());
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Serve => serve(config).await,
        Command::Openapi => {
            println!("{}", om_serve::openapi::generate_spec());
            Ok(())
        }
        Command::Seed => commands::open_orgmap(&config)
            .and_then(|orgmap| orgmap.seed_defaults(&commands::cli_ctx())),
        Command::Validate => validate(&config),
        Command::Level { command } => commands::levels::run(&config, command),
        Command::Org { command } => commands::orgs::run(&config, command),
        Command::Directory { command } => commands::directory::run(&config, command),
        Command::User { command } => commands::users::run(&config, command),
        Command::Project { command } => commands::projects::run(&config, command),
        Command::Xdmod { command } => commands::xdmod::run(&config, command),
    };

    if let Err(err) = result {
        eprintln!("{} {err}", "error:".red());
        std::process::exit(1);
    }
}

async fn serve(config: OrgmapConfig) -> Result<(), OrgmapError> {
    om_serve::openapi::ensure_initialized();
    if let Some(parent) = std::path::Path::new(&config.db_path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), config.port);
    let event_bus = EventBus::new(1024);
    let state = om_serve::AppState { config, event_bus };
    om_serve::serve(state, addr)
        .await
        .map_err(|err| OrgmapError::Internal {
            message: err.to_string(),
        })
}

fn validate(config: &OrgmapConfig) -> Result<(), OrgmapError> {
    let orgmap = commands::open_orgmap(config)?;
    orgmap.levels().validate()?;
    eprintln!("{}", "hierarchy ok".green());
    Ok(())
}
