use crate::commands::open_orgmap;
use crate::commands::orgs::resolve_org;
use clap::{Args, Subcommand};
use om_core::config::OrgmapConfig;
use om_core::error::OrgmapError;
use om_core::types::{ProjectOrgQuery, ProjectStatus};

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// List projects belonging to the given organizations
    List(ListArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Fullcode of an organization; repeat for several
    #[arg(short, long = "org", required = true)]
    pub orgs: Vec<String>,
    /// Only list projects found in every given organization
    #[arg(long = "and")]
    pub match_all: bool,
    /// Also match projects in descendants of the given organizations
    #[arg(short = 'c', long = "descendants")]
    pub include_descendants: bool,
    /// Only show projects with one of these statuses (New/Active/Archived)
    #[arg(short, long = "status")]
    pub statuses: Vec<String>,
    /// Match the primary organization only, ignoring additional ones
    #[arg(long)]
    pub primary_only: bool,
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_status(value: &str) -> Result<ProjectStatus, OrgmapError> {
    match value.to_ascii_lowercase().as_str() {
        "new" => Ok(ProjectStatus::New),
        "active" => Ok(ProjectStatus::Active),
        "archived" => Ok(ProjectStatus::Archived),
        other => Err(OrgmapError::Internal {
            message: format!("unknown project status {other:?}"),
        }),
    }
}

pub fn run(config: &OrgmapConfig, command: ProjectCommand) -> Result<(), OrgmapError> {
    let orgmap = open_orgmap(config)?;
    match command {
        ProjectCommand::List(args) => {
            let mut orgs = Vec::new();
            for code in &args.orgs {
                orgs.push(resolve_org(&orgmap, code)?);
            }
            let mut statuses = Vec::new();
            for value in &args.statuses {
                statuses.push(parse_status(value)?);
            }
            let query = ProjectOrgQuery {
                match_all: args.match_all,
                include_descendants: args.include_descendants,
                statuses,
                primary_only: args.primary_only,
            };
            for project in orgmap.projects().list_by_orgs(&orgs, &query)? {
                if args.verbose {
                    println!("{}: {:?}", project.title, project.status);
                } else {
                    println!("{}", project.title);
                }
            }
        }
    }
    Ok(())
}
