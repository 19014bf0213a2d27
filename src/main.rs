//! groupsheet - Entry Point

use clap::{Parser, Subcommand, ValueEnum};
use groupsheet::config::{self, ResolvedConfig};
use groupsheet::model::{AppError, ErrorKind, FieldType, GroupId, RowId};
use groupsheet::workbook::{Confirm, ConfirmPrompt, Workbook};
use groupsheet::{export, render, storage};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// groupsheet - grouped parameter sheet editor
#[derive(Parser, Debug)]
#[command(name = "groupsheet")]
#[command(version)]
#[command(about = "Edit grouped parameter sheets stored as JSON and export them to CSV")]
pub struct Args {
    /// Path to the workbook JSON store
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Action to perform on the store
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Print the sheet in display order
    Show,
    /// Check that every required field is filled
    Check,
    /// Export visible columns to CSV
    Export {
        /// Output file (defaults to a dated file in the export directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Manage the field schema
    #[command(subcommand)]
    Field(FieldCommand),
    /// Manage the group tree
    #[command(subcommand)]
    Group(GroupCommand),
    /// Edit data rows
    #[command(subcommand)]
    Row(RowCommand),
}

/// Field schema commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum FieldCommand {
    /// List fields in column order
    List,
    /// Append a field to the schema
    Add {
        /// Field name
        name: String,
        /// Value type checked on edit
        #[arg(long = "type", value_enum, default_value_t = TypeArg::Text)]
        field_type: TypeArg,
        /// Require a value before the sheet passes `check`
        #[arg(long)]
        required: bool,
    },
    /// Remove a field and its values from every row
    Remove {
        /// Field name
        name: String,
    },
    /// Make a field visible
    Show {
        /// Field name
        name: String,
    },
    /// Hide a field from the sheet and exports
    Hide {
        /// Field name
        name: String,
    },
    /// Show every field, or hide every field with --hide
    All {
        /// Hide instead of show
        #[arg(long)]
        hide: bool,
    },
}

/// Group tree commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum GroupCommand {
    /// Print the group tree with row counts
    List,
    /// Add a group (a root group without --parent)
    Add {
        /// Display name
        name: String,
        /// Structure label
        struct_name: String,
        /// Parent group id
        #[arg(long)]
        parent: Option<u32>,
    },
    /// Rename a group or move it under another parent (omit --parent for root)
    Update {
        /// Group id
        id: u32,
        /// Display name
        name: String,
        /// Structure label
        struct_name: String,
        /// New parent group id
        #[arg(long)]
        parent: Option<u32>,
    },
    /// Remove a childless group, ungrouping its rows
    Remove {
        /// Group id
        id: u32,
    },
}

/// Row editing commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum RowCommand {
    /// Append an empty row to a group (ungrouped without --group)
    Add {
        /// Target group id
        #[arg(long)]
        group: Option<u32>,
    },
    /// Set one cell, checked against the field's type
    Set {
        /// Row number as shown by `show`
        row: u64,
        /// Field name
        field: String,
        /// New cell value
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Move a row to another group (ungrouped without --group)
    Group {
        /// Row number as shown by `show`
        row: u64,
        /// Target group id
        #[arg(long)]
        group: Option<u32>,
    },
    /// Clear the row's group selection at a tree level
    ClearLevel {
        /// Row number as shown by `show`
        row: u64,
        /// Tree level, 0 for the root
        level: usize,
    },
    /// Set a row's sequence number, shifting its neighbours
    Index {
        /// Row number as shown by `show`
        row: u64,
        /// New sequence number (values below 1 become 1)
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },
    /// Swap a row with the one before it in its group
    Up {
        /// Row number as shown by `show`
        row: u64,
    },
    /// Swap a row with the one after it in its group
    Down {
        /// Row number as shown by `show`
        row: u64,
    },
    /// Delete rows after confirmation
    Delete {
        /// Row numbers as shown by `show`
        #[arg(required = true)]
        rows: Vec<u64>,
    },
    /// Rewrite a scope's sequence numbers to 1..n
    Renumber {
        /// Group id (the ungrouped rows without --group)
        #[arg(long)]
        group: Option<u32>,
    },
}

/// Field type names accepted by `field add --type`
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TypeArg {
    /// Free text
    Text,
    /// Decimal number
    Number,
    /// Calendar date, YYYY-MM-DD
    Date,
    /// true or false
    Boolean,
}

impl From<TypeArg> for FieldType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Text => FieldType::Text,
            TypeArg::Number => FieldType::Number,
            TypeArg::Date => FieldType::Date,
            TypeArg::Boolean => FieldType::Boolean,
        }
    }
}

/// Asks on stderr and reads the answer from stdin, unless `--yes` was given.
struct StdinConfirm {
    assume_yes: bool,
}

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &ConfirmPrompt) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}

fn resolve_config(args: &Args) -> Result<ResolvedConfig, AppError> {
    // Defaults → Config File → Env Vars → CLI Args
    let config_file = config::load_config_with_precedence(args.config.clone())?;
    let merged = config::merge_config(config_file);
    let with_env = config::apply_env_overrides(merged);
    Ok(config::apply_cli_overrides(with_env, args.store.clone()))
}

/// Outcome of one command: whether the workbook must be written back.
enum Outcome {
    Unchanged,
    Changed(String),
}

fn run(args: Args) -> Result<(), AppError> {
    let config = resolve_config(&args)?;
    groupsheet::logging::init(&config.log_file_path)?;
    info!(config = ?config, command = ?args.command, "Configuration loaded and resolved");

    let mut workbook = storage::load(&config.store_path)?.unwrap_or_default();
    let mut confirm = StdinConfirm {
        assume_yes: args.yes,
    };

    let outcome = match args.command {
        Command::Show => {
            print!("{}", render::render_sheet(&workbook.projection()));
            Outcome::Unchanged
        }
        Command::Check => {
            workbook.validate_required()?;
            println!("ok: {} row(s) complete", workbook.rows().len());
            Outcome::Unchanged
        }
        Command::Export { out } => {
            let path = match out {
                Some(path) => {
                    export::export_to_file(&workbook, &path)?;
                    path
                }
                None => export::export_to_dir(&workbook, &config.export_dir)?,
            };
            println!("exported to {}", path.display());
            Outcome::Unchanged
        }
        Command::Field(cmd) => run_field(&mut workbook, cmd, &mut confirm)?,
        Command::Group(cmd) => run_group(&mut workbook, cmd, &mut confirm)?,
        Command::Row(cmd) => run_row(&mut workbook, cmd, &mut confirm)?,
    };

    if let Outcome::Changed(message) = outcome {
        storage::save(&config.store_path, &workbook)?;
        println!("{message}");
    }
    Ok(())
}

fn declined() -> Outcome {
    println!("cancelled");
    Outcome::Unchanged
}

fn run_field(
    workbook: &mut Workbook,
    cmd: FieldCommand,
    confirm: &mut impl Confirm,
) -> Result<Outcome, AppError> {
    let outcome = match cmd {
        FieldCommand::List => {
            print!("{}", render::render_fields(workbook.fields()));
            Outcome::Unchanged
        }
        FieldCommand::Add {
            name,
            field_type,
            required,
        } => {
            workbook.add_field(&name, field_type.into(), required)?;
            Outcome::Changed(format!("field '{}' added", name.trim()))
        }
        FieldCommand::Remove { name } => {
            if workbook.remove_field(&name, confirm)? {
                Outcome::Changed(format!("field '{name}' removed"))
            } else {
                declined()
            }
        }
        FieldCommand::Show { name } => {
            workbook.set_field_visible(&name, true)?;
            Outcome::Changed(format!("field '{name}' shown"))
        }
        FieldCommand::Hide { name } => {
            workbook.set_field_visible(&name, false)?;
            Outcome::Changed(format!("field '{name}' hidden"))
        }
        FieldCommand::All { hide } => {
            workbook.toggle_all_fields(!hide);
            Outcome::Changed(if hide {
                "all fields hidden".to_string()
            } else {
                "all fields shown".to_string()
            })
        }
    };
    Ok(outcome)
}

fn run_group(
    workbook: &mut Workbook,
    cmd: GroupCommand,
    confirm: &mut impl Confirm,
) -> Result<Outcome, AppError> {
    let outcome = match cmd {
        GroupCommand::List => {
            print!("{}", render::render_groups(workbook.groups(), workbook.rows()));
            Outcome::Unchanged
        }
        GroupCommand::Add {
            name,
            struct_name,
            parent,
        } => {
            let id = workbook.add_group(&name, &struct_name, parent.map(GroupId::new))?;
            Outcome::Changed(format!("group {id} added"))
        }
        GroupCommand::Update {
            id,
            name,
            struct_name,
            parent,
        } => {
            let id = GroupId::new(id);
            workbook.update_group(id, &name, &struct_name, parent.map(GroupId::new))?;
            Outcome::Changed(format!("group {id} updated"))
        }
        GroupCommand::Remove { id } => {
            let id = GroupId::new(id);
            if workbook.remove_group(id, confirm)? {
                Outcome::Changed(format!("group {id} removed"))
            } else {
                declined()
            }
        }
    };
    Ok(outcome)
}

fn run_row(
    workbook: &mut Workbook,
    cmd: RowCommand,
    confirm: &mut impl Confirm,
) -> Result<Outcome, AppError> {
    let outcome = match cmd {
        RowCommand::Add { group } => {
            let row = workbook.add_row(group.map(GroupId::new))?;
            Outcome::Changed(format!("row {row} added"))
        }
        RowCommand::Set { row, field, value } => {
            let row = RowId::new(row);
            workbook.set_value(row, &field, &value)?;
            Outcome::Changed(format!("row {row} updated"))
        }
        RowCommand::Group { row, group } => {
            let row = RowId::new(row);
            workbook.set_row_group(row, group.map(GroupId::new))?;
            Outcome::Changed(format!("row {row} moved"))
        }
        RowCommand::ClearLevel { row, level } => {
            let row = RowId::new(row);
            workbook.clear_group_level(row, level)?;
            Outcome::Changed(format!("row {row} moved"))
        }
        RowCommand::Index { row, index } => {
            let row = RowId::new(row);
            workbook.set_row_index(row, index)?;
            Outcome::Changed(format!("row {row} reindexed"))
        }
        RowCommand::Up { row } => moved(workbook.move_row_up(RowId::new(row))?),
        RowCommand::Down { row } => moved(workbook.move_row_down(RowId::new(row))?),
        RowCommand::Delete { rows } => {
            let ids: Vec<RowId> = rows.into_iter().map(RowId::new).collect();
            match workbook.delete_rows(&ids, confirm)? {
                0 => declined(),
                n => Outcome::Changed(format!("{n} row(s) deleted")),
            }
        }
        RowCommand::Renumber { group } => {
            workbook.renumber(group.map(GroupId::new))?;
            Outcome::Changed("scope renumbered".to_string())
        }
    };
    Ok(outcome)
}

fn moved(changed: bool) -> Outcome {
    if changed {
        Outcome::Changed("row moved".to_string())
    } else {
        println!("row already at the edge of its group");
        Outcome::Unchanged
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        // Stale references are a no-op, not a failure.
        Err(AppError::Sheet(err)) if err.kind() == ErrorKind::NotFound => {
            eprintln!("warning: {err}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
