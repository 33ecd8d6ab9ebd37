use crate::commands::orgs::resolve_org;
use crate::commands::{cli_ctx, expect_fields, open_orgmap, read_records};
use clap::{Args, Subcommand};
use om_core::config::OrgmapConfig;
use om_core::error::OrgmapError;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum DirectoryCommand {
    /// List directory string mappings
    List,
    /// Import mappings from a delimited file (fullcode|directory_string)
    Import(ImportArgs),
}

#[derive(Args)]
pub struct ImportArgs {
    #[arg(short, long, default_value = "local_data/directory2organization.csv")]
    pub input: PathBuf,
    #[arg(long, default_value = "|")]
    pub delimiter: char,
    /// Delete all existing mappings first
    #[arg(short, long)]
    pub delete: bool,
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run(config: &OrgmapConfig, command: DirectoryCommand) -> Result<(), OrgmapError> {
    let orgmap = open_orgmap(config)?;
    let ctx = cli_ctx();
    match command {
        DirectoryCommand::List => {
            for mapping in orgmap.directory().list()? {
                let org = orgmap.orgs().get(&mapping.org_id)?;
                let fullcode = orgmap.orgs().fullcode(&org)?;
                println!("{:<48} => {fullcode}", mapping.directory_string);
            }
        }
        DirectoryCommand::Import(args) => {
            if args.delete {
                if args.verbose {
                    eprintln!("[VERBOSE] Deleting existing directory mappings");
                }
                for mapping in orgmap.directory().list()? {
                    orgmap.directory().unmap(&ctx, &mapping.id)?;
                }
            }
            for record in read_records(&args.input, args.delimiter)? {
                expect_fields(&record, 2, &args.input)?;
                let (line, fields) = &record;
                let fullcode = &fields[0];
                let dstring = &fields[1];

                let org = resolve_org(&orgmap, fullcode).map_err(|_| OrgmapError::Internal {
                    message: format!(
                        "no organization with fullcode {fullcode:?}, line {line} of {}",
                        args.input.display()
                    ),
                })?;
                if orgmap.directory().get_by_string(dstring)?.is_some() {
                    if args.verbose {
                        eprintln!(
                            "[VERBOSE] Skipping mapping {dstring} => {fullcode}; already present"
                        );
                    }
                    continue;
                }
                orgmap.directory().map(&ctx, &org.id, dstring)?;
                if args.verbose {
                    eprintln!("[VERBOSE] Added mapping {dstring} => {fullcode}");
                }
            }
        }
    }
    Ok(())
}
