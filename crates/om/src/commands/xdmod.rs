use crate::commands::open_orgmap;
use clap::{Args, Subcommand};
use om_core::config::OrgmapConfig;
use om_core::error::OrgmapError;
use std::fs;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum XdmodCommand {
    /// Write the XDMoD hierarchy.json setup file
    Hierarchy(OutputArgs),
    /// Write the XDMoD organization names CSV
    NamesCsv(OutputArgs),
}

#[derive(Args)]
pub struct OutputArgs {
    #[arg(short, long, default_value = "hierarchy.json")]
    pub output: PathBuf,
    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(config: &OrgmapConfig, command: XdmodCommand) -> Result<(), OrgmapError> {
    let orgmap = open_orgmap(config)?;
    match command {
        XdmodCommand::Hierarchy(args) => {
            check_clobber(&args)?;
            let setup = orgmap.levels().xdmod_setup()?;
            let json = serde_json::to_string_pretty(&setup).map_err(|err| {
                OrgmapError::Internal {
                    message: err.to_string(),
                }
            })?;
            write_output(&args.output, &json)?;
        }
        XdmodCommand::NamesCsv(args) => {
            check_clobber(&args)?;
            let mut csv = String::new();
            for row in orgmap.levels().xdmod_names()? {
                csv.push_str(&format!(
                    "{},{},{}\n",
                    row.fullcode,
                    row.longname,
                    row.parent_fullcode.unwrap_or_default()
                ));
            }
            write_output(&args.output, &csv)?;
        }
    }
    Ok(())
}

fn check_clobber(args: &OutputArgs) -> Result<(), OrgmapError> {
    if args.output.exists() && !args.force {
        return Err(OrgmapError::Internal {
            message: format!(
                "refusing to clobber existing {} without --force",
                args.output.display()
            ),
        });
    }
    Ok(())
}

fn write_output(path: &PathBuf, content: &str) -> Result<(), OrgmapError> {
    fs::write(path, content).map_err(|err| OrgmapError::Internal {
        message: format!("cannot write {}: {err}", path.display()),
    })
}
