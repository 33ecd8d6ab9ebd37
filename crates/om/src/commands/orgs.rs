use crate::commands::{cli_ctx, expect_fields, open_orgmap, parse_flag, read_records};
use clap::{Args, Subcommand};
use om_core::config::OrgmapConfig;
use om_core::error::{OrgError, OrgmapError};
use om_core::types::{CreateOrgInput, DeleteOrgOpts, Org, OrgFilter};
use om_db::store::DbStore;
use om_core::orgmap::Orgmap;
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum OrgCommand {
    /// List organizations with their fullcodes
    List,
    /// Import organizations from a delimited file
    /// (code|level_name|parent_code|shortname|longname|selectable_user|selectable_project)
    Import(ImportArgs),
    /// Delete one organization addressed by fullcode (or semifullcode)
    Delete(DeleteArgs),
}

#[derive(Args)]
pub struct ImportArgs {
    #[arg(short, long, default_value = "local_data/organizations.csv")]
    pub input: PathBuf,
    #[arg(long, default_value = "|")]
    pub delimiter: char,
    /// Delete all existing organizations first
    #[arg(short, long)]
    pub delete: bool,
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Fullcode (falls back to semifullcode lookup)
    #[arg(long)]
    pub code: String,
    #[arg(long)]
    pub dissociate_users: bool,
    #[arg(long)]
    pub dissociate_projects: bool,
    /// Short for both dissociate flags
    #[arg(long)]
    pub dissociate: bool,
}

pub fn run(config: &OrgmapConfig, command: OrgCommand) -> Result<(), OrgmapError> {
    let orgmap = open_orgmap(config)?;
    let ctx = cli_ctx();
    match command {
        OrgCommand::List => {
            for org in orgmap.orgs().list(&OrgFilter::default())? {
                let fullcode = orgmap.orgs().fullcode(&org)?;
                println!("{fullcode:<40} {}", org.shortname);
            }
        }
        OrgCommand::Import(args) => {
            if args.delete {
                if args.verbose {
                    eprintln!("[VERBOSE] Deleting existing organizations");
                }
                clear_orgs(&orgmap, &ctx)?;
            }
            for record in read_records(&args.input, args.delimiter)? {
                expect_fields(&record, 7, &args.input)?;
                let (line, fields) = &record;
                let code = fields[0].clone();
                let level = orgmap.levels().get(&fields[1]).map_err(|_| {
                    OrgmapError::Internal {
                        message: format!(
                            "no organization level named {:?}, line {line} of {}",
                            fields[1],
                            args.input.display()
                        ),
                    }
                })?;
                let parent_code = fields[2].clone();
                let parent = if parent_code.is_empty() {
                    None
                } else {
                    Some(
                        orgmap
                            .orgs()
                            .get_by_fullcode(&parent_code)?
                            .ok_or_else(|| OrgmapError::Internal {
                                message: format!(
                                    "no organization with fullcode {parent_code:?}, line {line} of {}",
                                    args.input.display()
                                ),
                            })?,
                    )
                };

                let exists = orgmap
                    .orgs()
                    .get_by_fullcode(&match &parent {
                        Some(parent) => {
                            format!("{}-{code}", orgmap.orgs().fullcode(parent)?)
                        }
                        None => code.clone(),
                    })?
                    .is_some();
                if exists {
                    if args.verbose {
                        eprintln!("[VERBOSE] Skipping organization code={code}; already present");
                    }
                    continue;
                }

                orgmap.orgs().create(
                    &ctx,
                    CreateOrgInput {
                        parent_id: parent.as_ref().map(|org| org.id.clone()),
                        level_id: level.id.clone(),
                        code: code.clone(),
                        shortname: non_empty(&fields[3]),
                        longname: non_empty(&fields[4]),
                        is_selectable_for_user: Some(parse_flag(&fields[5])),
                        is_selectable_for_project: Some(parse_flag(&fields[6])),
                    },
                )?;
                if args.verbose {
                    eprintln!(
                        "[VERBOSE] Added organization code={code}, level={}, parent={}",
                        level.name,
                        if parent_code.is_empty() {
                            "<no parent>"
                        } else {
                            &parent_code
                        }
                    );
                }
            }
        }
        OrgCommand::Delete(args) => {
            let org = resolve_org(&orgmap, &args.code)?;
            let fullcode = orgmap.orgs().fullcode(&org)?;
            let opts = DeleteOrgOpts {
                dissociate_users: args.dissociate_users || args.dissociate,
                dissociate_projects: args.dissociate_projects || args.dissociate,
            };
            orgmap.orgs().delete(&ctx, &org.id, opts)?;
            eprintln!("{} organization {fullcode}", "deleted".red());
        }
    }
    Ok(())
}

pub fn resolve_org(orgmap: &Orgmap<DbStore>, code: &str) -> Result<Org, OrgmapError> {
    if let Some(org) = orgmap.orgs().get_by_fullcode(code)? {
        return Ok(org);
    }
    orgmap
        .orgs()
        .get_by_semifullcode(code)?
        .ok_or(OrgmapError::Org(OrgError::NotFound))
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Delete every organization, leaves first so no delete ever sees
/// children.
fn clear_orgs(
    orgmap: &Orgmap<DbStore>,
    ctx: &om_core::orgmap::RequestContext,
) -> Result<(), OrgmapError> {
    loop {
        let orgs = orgmap.orgs().list(&OrgFilter::default())?;
        if orgs.is_empty() {
            return Ok(());
        }
        let mut deleted_any = false;
        for org in &orgs {
            if orgmap.orgs().descendants(org)?.is_empty() {
                orgmap.orgs().delete(
                    ctx,
                    &org.id,
                    DeleteOrgOpts {
                        dissociate_users: true,
                        dissociate_projects: true,
                    },
                )?;
                deleted_any = true;
            }
        }
        if !deleted_any {
            return Err(OrgmapError::Internal {
                message: "organization tree contains a parent cycle".to_string(),
            });
        }
    }
}
