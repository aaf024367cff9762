use super::{entity_for, read_page, resolve};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{Engine, EntityRef, InputValue};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Placeholder for the id created by the previous `add-*` operation
pub const LAST_ID: &str = "@last";

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Page document to edit
    pub page: PathBuf,

    /// Operation to apply, in order (repeatable):
    /// add-section:TYPE, add-block:SECTION:TYPE, set:ID:KEY=VALUE,
    /// move:ID:INDEX, delete:ID
    #[arg(long = "op", required = true)]
    pub ops: Vec<String>,

    /// Write the result here instead of back to the page
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the result instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    AddSection { type_name: String },
    AddBlock { section: String, type_name: String },
    Set { id: String, key: String, value: String },
    Move { id: String, index: usize },
    Delete { id: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpError {
    #[error("Unknown operation '{0}'")]
    UnknownOp(String),

    #[error("Malformed operation '{op}', expected {expected}")]
    Malformed { op: String, expected: &'static str },

    #[error("Invalid index '{0}'")]
    InvalidIndex(String),
}

impl FromStr for EditOp {
    type Err = OpError;

    fn from_str(op: &str) -> Result<Self, Self::Err> {
        let malformed = |expected| OpError::Malformed {
            op: op.to_string(),
            expected,
        };
        let (name, rest) = op
            .split_once(':')
            .ok_or_else(|| OpError::UnknownOp(op.to_string()))?;

        match name {
            "add-section" if !rest.is_empty() => Ok(EditOp::AddSection {
                type_name: rest.to_string(),
            }),
            "add-section" => Err(malformed("add-section:TYPE")),
            "add-block" => {
                let (section, type_name) = rest
                    .split_once(':')
                    .filter(|(s, t)| !s.is_empty() && !t.is_empty())
                    .ok_or_else(|| malformed("add-block:SECTION:TYPE"))?;
                Ok(EditOp::AddBlock {
                    section: section.to_string(),
                    type_name: type_name.to_string(),
                })
            }
            "set" => {
                let (id, assignment) = rest
                    .split_once(':')
                    .ok_or_else(|| malformed("set:ID:KEY=VALUE"))?;
                let (key, value) = assignment
                    .split_once('=')
                    .filter(|(k, _)| !id.is_empty() && !k.is_empty())
                    .ok_or_else(|| malformed("set:ID:KEY=VALUE"))?;
                Ok(EditOp::Set {
                    id: id.to_string(),
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
            "move" => {
                let (id, index) = rest
                    .rsplit_once(':')
                    .ok_or_else(|| malformed("move:ID:INDEX"))?;
                let index = index
                    .parse()
                    .map_err(|_| OpError::InvalidIndex(index.to_string()))?;
                Ok(EditOp::Move {
                    id: id.to_string(),
                    index,
                })
            }
            "delete" if !rest.is_empty() => Ok(EditOp::Delete {
                id: rest.to_string(),
            }),
            "delete" => Err(malformed("delete:ID")),
            _ => Err(OpError::UnknownOp(op.to_string())),
        }
    }
}

pub fn edit(args: EditArgs, cwd: &str) -> Result<()> {
    let ops = args
        .ops
        .iter()
        .map(|op| op.parse::<EditOp>())
        .collect::<Result<Vec<_>, _>>()?;

    let config = Config::load(cwd)?;
    let registry = config.registry()?;
    let path = resolve(cwd, &args.page);
    let page = read_page(&path)?;

    let mut engine = Engine::with_options(&registry, config.editor_options());
    engine.load(page);

    let mut session = EditSession::new(&mut engine);
    for op in &ops {
        let message = session.apply(op)?;
        if !args.dry_run {
            println!("  {} {}", "✓".green(), message);
        }
    }

    let output = engine.serialize_pretty();
    if args.dry_run {
        println!("{}", output);
        return Ok(());
    }

    let target = args
        .output
        .as_ref()
        .map(|out| resolve(cwd, out))
        .unwrap_or(path);
    fs::write(&target, output)?;

    println!();
    println!(
        "{} Applied {} operations → {}",
        "✅".green(),
        ops.len(),
        target.display()
    );
    Ok(())
}

/// Applies scripted operations to an engine, remembering the last added id
pub struct EditSession<'e, 'r> {
    engine: &'e mut Engine<'r>,
    last_id: Option<String>,
}

impl<'e, 'r> EditSession<'e, 'r> {
    pub fn new(engine: &'e mut Engine<'r>) -> Self {
        Self {
            engine,
            last_id: None,
        }
    }

    fn id<'a>(&'a self, id: &'a str) -> Result<&'a str> {
        if id != LAST_ID {
            return Ok(id);
        }
        self.last_id
            .as_deref()
            .ok_or_else(|| anyhow!("{} used before any add operation", LAST_ID))
    }

    fn entity(&self, id: &str) -> Result<EntityRef> {
        let id = self.id(id)?;
        entity_for(self.engine.page(), id)
            .ok_or_else(|| anyhow!("No section or block with id '{}'", id))
    }

    /// Apply one operation; returns a short description of what changed
    pub fn apply(&mut self, op: &EditOp) -> Result<String> {
        match op {
            EditOp::AddSection { type_name } => {
                let id = self
                    .engine
                    .add_section(type_name)
                    .ok_or_else(|| anyhow!("Unknown section type '{}'", type_name))?;
                self.last_id = Some(id.clone());
                Ok(format!("Added section {} ({})", id, type_name))
            }

            EditOp::AddBlock { section, type_name } => {
                let section = self.id(section)?.to_string();
                if self.engine.registry().block(type_name).is_none() {
                    return Err(anyhow!("Unknown block type '{}'", type_name));
                }
                let id = self
                    .engine
                    .add_block(&section, type_name)
                    .ok_or_else(|| anyhow!("Section '{}' cannot hold blocks", section))?;
                self.last_id = Some(id.clone());
                Ok(format!("Added block {} ({}) to {}", id, type_name, section))
            }

            EditOp::Set { id, key, value } => {
                let entity = self.entity(id)?;
                self.engine.select(entity.clone());
                let input = InputValue {
                    value: value.clone(),
                    checked: value == "true",
                };
                if !self.engine.edit_field(key, &input) {
                    return Err(anyhow!("{} has no setting '{}'", entity, key));
                }
                Ok(format!("Set {}.{} = {}", entity.id(), key, value))
            }

            EditOp::Move { id, index } => {
                let moved = match self.entity(id)? {
                    EntityRef::Section(id) => self.engine.move_section(&id, *index),
                    EntityRef::Block(id) => self.engine.move_block(&id, *index),
                };
                if !moved {
                    return Err(anyhow!("Cannot move '{}': it is not rendered", id));
                }
                Ok(format!("Moved {} to {}", id, index))
            }

            EditOp::Delete { id } => {
                let deleted = match self.entity(id)? {
                    EntityRef::Section(id) => self.engine.delete_section(&id),
                    EntityRef::Block(id) => self.engine.delete_block(&id),
                };
                if !deleted {
                    return Err(anyhow!("Cannot delete '{}'", id));
                }
                Ok(format!("Deleted {}", id))
            }
        }
    }
}
