use crate::commands::orgs::resolve_org;
use crate::commands::open_orgmap;
use clap::{Args, Subcommand};
use om_core::config::OrgmapConfig;
use om_core::error::OrgmapError;
use om_core::orgmap::RequestContext;
use om_core::types::SyncOpts;
use om_events::types::EventSource;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum UserCommand {
    /// List users belonging to the given organizations
    List(ListArgs),
    /// Reconcile user memberships against a directory extract
    Sync(SyncArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Fullcode of an organization; repeat for several
    #[arg(short, long = "org", required = true)]
    pub orgs: Vec<String>,
    /// Only list users found in every given organization
    #[arg(long = "and")]
    pub match_all: bool,
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args)]
pub struct SyncArgs {
    /// JSON file mapping usernames to directory-string arrays
    #[arg(short, long)]
    pub input: PathBuf,
    /// Username to sync; repeat for several. Incompatible with --all
    #[arg(short, long = "user")]
    pub users: Vec<String>,
    /// Sync every active user found in the input file
    #[arg(long)]
    pub all: bool,
    /// Also add all ancestors of matched organizations
    #[arg(short, long = "parents")]
    pub add_parents: bool,
    /// Create placeholder organizations for unmapped strings
    #[arg(long = "create-placeholder")]
    pub create_placeholder: bool,
    /// Remove memberships not present in the extract
    #[arg(short, long)]
    pub delete: bool,
    /// Resolve and report without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(config: &OrgmapConfig, command: UserCommand) -> Result<(), OrgmapError> {
    let orgmap = open_orgmap(config)?;
    match command {
        UserCommand::List(args) => {
            let mut orgs = Vec::new();
            for code in &args.orgs {
                orgs.push(resolve_org(&orgmap, code)?);
            }
            for user in orgmap.users().list_by_orgs(&orgs, args.match_all)? {
                if args.verbose {
                    println!("{}: {}, {}", user.username, user.last_name, user.first_name);
                } else {
                    println!("{}", user.username);
                }
            }
        }
        UserCommand::Sync(args) => {
            if args.all && !args.users.is_empty() {
                return Err(OrgmapError::Internal {
                    message: "--all and --user are mutually exclusive".to_string(),
                });
            }
            if !args.all && args.users.is_empty() {
                return Err(OrgmapError::Internal {
                    message: "provide either --all or --user".to_string(),
                });
            }
            let extract = read_extract(&args.input)?;
            let usernames: Vec<String> = if args.all {
                let mut names: Vec<String> = orgmap
                    .users()
                    .list(true)?
                    .into_iter()
                    .map(|user| user.username)
                    .collect();
                names.retain(|name| extract.contains_key(name));
                names
            } else {
                args.users.clone()
            };

            let ctx = RequestContext::new(EventSource::Sync, None);
            let opts = SyncOpts {
                add_parents: args.add_parents,
                create_placeholder: args.create_placeholder,
                delete: args.delete,
                dry_run: args.dry_run,
            };
            let tag = if args.dry_run { "[DRYRUN]" } else { "[SYNC]" };
            for username in usernames {
                let Some(dirstrings) = extract.get(&username) else {
                    println!("{tag} No directory strings for {username} in extract");
                    continue;
                };
                let outcome = orgmap
                    .directory()
                    .sync_user_orgs(&ctx, &username, dirstrings, opts)?;
                for org_id in &outcome.added {
                    let org = orgmap.orgs().get(org_id)?;
                    let fullcode = orgmap.orgs().fullcode(&org)?;
                    println!("{tag} Added org {fullcode} to user {username}");
                }
                for org_id in &outcome.removed {
                    match orgmap.orgs().get(org_id) {
                        Ok(org) => {
                            let fullcode = orgmap.orgs().fullcode(&org)?;
                            println!("{tag} Removed org {fullcode} from user {username}");
                        }
                        Err(_) => {
                            println!("{tag} Removed org {org_id} from user {username}");
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

fn read_extract(path: &PathBuf) -> Result<HashMap<String, Vec<String>>, OrgmapError> {
    let content = fs::read_to_string(path).map_err(|err| OrgmapError::Internal {
        message: format!("cannot read {}: {err}", path.display()),
    })?;
    serde_json::from_str(&content).map_err(|err| OrgmapError::Internal {
        message: format!("invalid extract {}: {err}", path.display()),
    })
}
