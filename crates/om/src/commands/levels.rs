use crate::commands::{cli_ctx, expect_fields, open_orgmap, read_records};
use clap::{Args, Subcommand};
use om_core::config::OrgmapConfig;
use om_core::error::OrgmapError;
use om_core::types::CreateLevelInput;
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum LevelCommand {
    /// Print the hierarchy chain, root first
    List,
    /// Append a level at the bottom of the chain (or create the root)
    Add(AddArgs),
    /// Splice a level into the middle of the chain, repairing orgs
    Insert(AddArgs),
    /// Remove a level, splicing its orgs out of the tree
    Remove { name: String },
    /// Import levels from a delimited file (name|level|parent_name)
    Import(ImportArgs),
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub level: i64,
    #[arg(long)]
    pub parent: Option<String>,
    #[arg(long = "export-to-xdmod")]
    pub export_to_xdmod: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    #[arg(short, long, default_value = "local_data/organization_levels.csv")]
    pub input: PathBuf,
    #[arg(long, default_value = "|")]
    pub delimiter: char,
    /// Remove all existing levels (and their orgs) first
    #[arg(short, long)]
    pub delete: bool,
    #[arg(short, long)]
    pub verbose: bool,
}

impl AddArgs {
    fn input(&self) -> CreateLevelInput {
        CreateLevelInput {
            name: self.name.clone(),
            level: self.level,
            parent_name: self.parent.clone(),
            export_to_xdmod: self.export_to_xdmod,
        }
    }
}

pub fn run(config: &OrgmapConfig, command: LevelCommand) -> Result<(), OrgmapError> {
    let orgmap = open_orgmap(config)?;
    let ctx = cli_ctx();
    match command {
        LevelCommand::List => {
            for level in orgmap.levels().list()? {
                let parent = level.parent_id.is_some();
                let marker = if parent { " " } else { "*" };
                println!(
                    "{marker} {:<24} {:>6}  xdmod={}",
                    level.name, level.level, level.export_to_xdmod
                );
            }
        }
        LevelCommand::Add(args) => {
            let level = orgmap.levels().create(&ctx, args.input())?;
            eprintln!("{} level {}", "created".green(), level.name);
        }
        LevelCommand::Insert(args) => {
            let level = orgmap.levels().insert(&ctx, args.input())?;
            eprintln!("{} level {}", "inserted".green(), level.name);
        }
        LevelCommand::Remove { name } => {
            orgmap.levels().remove(&ctx, &name)?;
            eprintln!("{} level {name}", "removed".red());
        }
        LevelCommand::Import(args) => {
            if args.delete {
                if args.verbose {
                    eprintln!("[VERBOSE] Removing existing organization levels");
                }
                let names: Vec<String> = orgmap
                    .levels()
                    .list()?
                    .into_iter()
                    .rev()
                    .map(|level| level.name)
                    .collect();
                for name in names {
                    orgmap.levels().remove(&ctx, &name)?;
                }
            }
            for record in read_records(&args.input, args.delimiter)? {
                expect_fields(&record, 3, &args.input)?;
                let (line, fields) = &record;
                let name = fields[0].clone();
                let level: i64 = fields[1].parse().map_err(|_| OrgmapError::Internal {
                    message: format!(
                        "expected integer level, got {:?}, line {line} of {}",
                        fields[1],
                        args.input.display()
                    ),
                })?;
                let parent = if fields[2].is_empty() {
                    None
                } else {
                    Some(fields[2].clone())
                };

                if orgmap.levels().get(&name).is_ok() {
                    if args.verbose {
                        eprintln!("[VERBOSE] Skipping level name={name}; already present");
                    }
                    continue;
                }
                orgmap.levels().create(
                    &ctx,
                    CreateLevelInput {
                        name: name.clone(),
                        level,
                        parent_name: parent.clone(),
                        export_to_xdmod: true,
                    },
                )?;
                if args.verbose {
                    eprintln!(
                        "[VERBOSE] Added level name={name}, level={level}, parent={}",
                        parent.as_deref().unwrap_or("<no parent>")
                    );
                }
            }
        }
    }
    Ok(())
}
