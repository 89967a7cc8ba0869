//! Command parsing and execution.

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Value, json};
use tracing::info;
use tripbudget_core::editor::{AllocationGroup, AllocationKey, InputUnit};
use tripbudget_core::{
    AlertPolicy, AllocationCalculator, AllocationEditor, BudgetDefinition, CostCategory, Country,
};
use tripbudget_shared::{AppConfig, AppError, AppResult};

use crate::snapshot::Snapshot;

/// Usage text printed on bad arguments.
pub const USAGE: &str = "\
usage:
  tripbudget status <snapshot.json>
  tripbudget seed <snapshot.json> [contingency_pct]
  tripbudget allocate <snapshot.json> <category|country> <dollars|percent|perday> KEY=VALUE...";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print spend, utilization, and alerts.
    Status {
        /// Snapshot file.
        path: PathBuf,
    },
    /// Print a budget seeded from current spend.
    Seed {
        /// Snapshot file.
        path: PathBuf,
        /// Contingency override.
        contingency_pct: Option<Decimal>,
    },
    /// Apply allocation edits in one unit and print the saved budget.
    Allocate {
        /// Snapshot file.
        path: PathBuf,
        /// Group being edited.
        group: AllocationGroup,
        /// Unit the values are in.
        unit: InputUnit,
        /// Raw values per item.
        assignments: Vec<(AllocationKey, String)>,
    },
}

impl Command {
    /// Parses arguments (without the program name).
    pub fn parse(args: &[String]) -> AppResult<Self> {
        let usage = || AppError::Usage(USAGE.to_string());
        let (name, rest) = args.split_first().ok_or_else(usage)?;
        let path = rest.first().map(PathBuf::from).ok_or_else(usage)?;

        match name.as_str() {
            "status" if rest.len() == 1 => Ok(Self::Status { path }),
            "seed" if rest.len() <= 2 => {
                let contingency_pct = rest
                    .get(1)
                    .map(|raw| {
                        Decimal::from_str(raw)
                            .map_err(|_| AppError::Usage(format!("invalid contingency: {raw}")))
                    })
                    .transpose()?;
                Ok(Self::Seed {
                    path,
                    contingency_pct,
                })
            }
            "allocate" if rest.len() >= 3 => {
                let group = parse_group(&rest[1])?;
                let unit = parse_unit(&rest[2])?;
                let assignments = rest[3..]
                    .iter()
                    .map(|arg| parse_assignment(group, arg))
                    .collect::<AppResult<Vec<_>>>()?;
                Ok(Self::Allocate {
                    path,
                    group,
                    unit,
                    assignments,
                })
            }
            _ => Err(usage()),
        }
    }
}

fn parse_group(raw: &str) -> AppResult<AllocationGroup> {
    match raw {
        "category" => Ok(AllocationGroup::Category),
        "country" => Ok(AllocationGroup::Country),
        _ => Err(AppError::Usage(format!("unknown group: {raw}"))),
    }
}

fn parse_unit(raw: &str) -> AppResult<InputUnit> {
    match raw {
        "dollars" => Ok(InputUnit::Dollars),
        "percent" => Ok(InputUnit::Percent),
        "perday" => Ok(InputUnit::PerDay),
        _ => Err(AppError::Usage(format!("unknown unit: {raw}"))),
    }
}

fn parse_assignment(group: AllocationGroup, raw: &str) -> AppResult<(AllocationKey, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| AppError::Usage(format!("expected KEY=VALUE, got {raw}")))?;
    let key = match group {
        AllocationGroup::Category => AllocationKey::Category(
            CostCategory::from_str(key).map_err(|err| AppError::Usage(err.to_string()))?,
        ),
        AllocationGroup::Country => AllocationKey::Country(Country::new(key)),
    };
    Ok((key, value.to_string()))
}

/// Saved budget, or one seeded from current spend when there is none.
fn budget_for(snapshot: &Snapshot, config: &AppConfig) -> AppResult<BudgetDefinition> {
    match &snapshot.budget {
        Some(budget) => {
            budget
                .validate()
                .map_err(|err| AppError::Validation(err.to_string()))?;
            Ok(budget.clone())
        }
        None => {
            info!(
                contingency_pct = %config.defaults.contingency_pct,
                "No saved budget, seeding from current spend"
            );
            Ok(AllocationCalculator::default_allocation(
                &snapshot.cost_items,
                &snapshot.directory(),
                config.defaults.contingency_pct,
            ))
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value).map_err(|err| AppError::Serialization(err.to_string()))
}

/// Runs a command against an already-loaded snapshot.
pub fn execute(command: &Command, snapshot: &Snapshot, config: &AppConfig) -> AppResult<Value> {
    match command {
        Command::Status { .. } => {
            let budget = budget_for(snapshot, config)?;
            let calculator = AllocationCalculator::new(AlertPolicy::from(&config.alerts));
            let status =
                calculator.compute_status(&budget, &snapshot.cost_items, &snapshot.directory());
            to_json(&status)
        }
        Command::Seed {
            contingency_pct, ..
        } => {
            let contingency = contingency_pct.unwrap_or(config.defaults.contingency_pct);
            let budget = AllocationCalculator::default_allocation(
                &snapshot.cost_items,
                &snapshot.directory(),
                contingency,
            );
            to_json(&budget)
        }
        Command::Allocate {
            group,
            unit,
            assignments,
            ..
        } => {
            let budget = budget_for(snapshot, config)?;
            let mut editor =
                AllocationEditor::for_trip(&budget, &snapshot.directory(), config.editor);
            let invalid = |err: tripbudget_core::EditorError| AppError::Validation(err.to_string());

            editor.set_mode(*group, *unit).map_err(invalid)?;
            for (key, raw) in assignments {
                editor.set_value(key, raw).map_err(invalid)?;
            }

            let completeness = editor.completeness(*group);
            let summary = editor.summary(*group);
            let saved = editor.save();
            Ok(json!({
                "budget": to_json(&saved)?,
                "summary": to_json(&summary)?,
                "completeness": to_json(&completeness)?,
            }))
        }
    }
}

/// Snapshot path named by a command.
pub fn snapshot_path(command: &Command) -> &PathBuf {
    match command {
        Command::Status { path } | Command::Seed { path, .. } | Command::Allocate { path, .. } => {
            path
        }
    }
}
