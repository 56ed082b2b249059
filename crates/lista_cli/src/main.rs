//! Operator CLI for a roster database file.
//!
//! Usage:
//!   lista init                          - Create or migrate the database
//!   lista teams [--stats]               - List visible teams
//!   lista children [--team <ID>]        - List children with derived ages
//!   lista stats                         - Roster-wide aggregates
//!   lista delete-team <ID>              - Delete a team with no children
//!   lista move-children --from A --to B - Reassign every child of A to B

use anyhow::Context;
use clap::{Parser, Subcommand};
use lista_core::db::migrations::latest_version;
use lista_core::{init_logging_from, AppConfig, ChildService, Store, TeamId, TeamService};
use log::info;
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lista")]
#[command(about = "Lista de Chicos - team and child roster database tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides config and LISTA_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Create or migrate the database schema
    Init,
    /// List visible teams
    Teams {
        /// Include child count and age aggregates
        #[arg(long)]
        stats: bool,
    },
    /// List children
    Children {
        /// Only children of this team
        #[arg(long)]
        team: Option<TeamId>,
    },
    /// Aggregates across all children
    Stats,
    /// Delete a team that has no children
    DeleteTeam { id: TeamId },
    /// Move every child from one team to another
    MoveChildren {
        #[arg(long)]
        from: TeamId,
        #[arg(long)]
        to: TeamId,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    init_logging_from(&config).context("starting logging")?;

    let store = Store::from_config(&config)
        .with_context(|| format!("opening database `{}`", config.db_path.display()))?;
    let outcome = run(&store, cli.command);
    store.close().context("closing database")?;
    outcome
}

fn run(store: &Store, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Init => print_json(&json!({
            "db_path": store.path(),
            "schema_version": latest_version(),
        })),
        Command::Teams { stats } => {
            let service = TeamService::new(store.teams()?);
            if stats {
                print_json(&service.list_teams_with_stats()?)
            } else {
                print_json(&service.list_teams()?)
            }
        }
        Command::Children { team } => {
            let service = ChildService::new(store.children()?);
            print_json(&service.list_children(team)?)
        }
        Command::Stats => {
            let service = ChildService::new(store.children()?);
            print_json(&service.child_stats()?)
        }
        Command::DeleteTeam { id } => {
            let service = TeamService::new(store.teams()?);
            service.delete_team(id)?;
            info!("event=cli_delete_team module=cli status=ok team_id={id}");
            print_json(&json!({ "deleted": id }))
        }
        Command::MoveChildren { from, to } => {
            let service = TeamService::new(store.teams()?);
            let moved = service.move_children(from, to)?;
            print_json(&json!({ "from": from, "to": to, "moved": moved }))
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
