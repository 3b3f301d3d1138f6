//! Command-line surface over [`Workshop`].
//!
//! Every command prints one JSON document on stdout; logs go to stderr.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use craftledger_builds::OrderStore;
use craftledger_catalog::{Catalog, MaterialInfoTable};
use craftledger_core::{parse_quantity, BatchId, StoreError};
use craftledger_infra::{JsonFileMaterialStore, JsonFileOrderStore};
use craftledger_ledger::MaterialStore;
use craftledger_reconcile::{MaterialFilter, Source, Status};

use crate::config::Config;
use crate::service::{ServiceError, Workshop, WorkshopOptions};

pub type FileWorkshop = Workshop<JsonFileMaterialStore, JsonFileOrderStore>;

#[derive(Debug, Parser)]
#[command(name = "craftledger")]
#[command(about = "Crafting material ledger: expand recipes, queue builds, reconcile stock")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Adjust a material directly (purchases, manual corrections)
    Add {
        material: String,
        /// Change to the on-hand quantity
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        have: i64,
        /// Change to the required quantity
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        required: i64,
    },

    /// Commit a build: one or more ITEM=QUANTITY rows under a single batch
    Commit {
        #[arg(required = true, value_parser = parse_entry)]
        entries: Vec<(String, i64)>,
    },

    /// Complete a pending build and retire its demand
    Complete { batch_id: BatchId },

    /// List pending build orders
    Orders,

    /// Unified material view
    Reconcile {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        source: Option<Source>,
        #[arg(long)]
        status: Option<Status>,
    },

    /// Status counts over the unified view
    Dashboard,

    /// Preview the material requirements of an item
    Expand {
        item: String,
        #[arg(default_value_t = 1, allow_hyphen_values = true)]
        quantity: i64,
    },

    /// Completion of a pending build against current stock
    Analyze { batch_id: BatchId },

    /// Combined demand of every pending build
    Demand,
}

/// `ITEM=QUANTITY`, split at the last `=` so item names may contain one.
fn parse_entry(raw: &str) -> Result<(String, i64), String> {
    let (item, quantity) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected ITEM=QUANTITY, got '{raw}'"))?;
    let quantity = parse_quantity(quantity).map_err(|e| format!("{}: {e}", item.trim()))?;
    // parse_quantity only accepts positive i64 values.
    Ok((item.trim().to_string(), quantity as i64))
}

/// Build a file-backed workshop from configuration.
pub fn open(config: &Config) -> anyhow::Result<FileWorkshop> {
    let catalog = load_catalog(&config.catalog_path)?;
    let material_info = match &config.material_info_path {
        Some(path) => MaterialInfoTable::from_path(path)
            .with_context(|| format!("loading material info from {}", path.display()))?,
        None => MaterialInfoTable::new(),
    };

    let materials = JsonFileMaterialStore::open(config.materials_path())
        .with_context(|| format!("opening {}", config.materials_path().display()))?;
    let orders = JsonFileOrderStore::open(config.orders_path())
        .with_context(|| format!("opening {}", config.orders_path().display()))?;

    tracing::info!(
        recipes = catalog.len(),
        factory_materials = material_info.len(),
        data_dir = %config.data_dir.display(),
        reversal = ?config.reversal,
        "workshop opened"
    );

    Ok(Workshop::with_options(
        materials,
        orders,
        Arc::new(catalog),
        WorkshopOptions { material_info, reversal: config.reversal },
    ))
}

/// A missing catalog file is an empty catalog: every item is then its own raw material.
fn load_catalog(path: &Path) -> anyhow::Result<Catalog> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "catalog not found; using an empty catalog");
        return Ok(Catalog::new());
    }
    Catalog::from_path(path).with_context(|| format!("loading catalog from {}", path.display()))
}

/// Execute one command and render its result as JSON.
///
/// Completing or analyzing an unknown batch is reported in the output rather
/// than failing the process.
pub fn run<M, O>(workshop: &Workshop<M, O>, command: Command) -> Result<Value, ServiceError>
where
    M: MaterialStore,
    O: OrderStore,
{
    let value = match command {
        Command::Add { material, have, required } => {
            to_json(&workshop.add_direct_quantity(&material, have, required)?)?
        }
        Command::Commit { entries } => {
            let batch_id = workshop.commit_batch(&entries)?;
            json!({ "batch_id": batch_id })
        }
        Command::Complete { batch_id } => match workshop.complete_build(batch_id) {
            Ok(retired) => json!({ "batch_id": batch_id, "completed": true, "retired": retired }),
            Err(e) if e.is_not_found() => json!({ "batch_id": batch_id, "completed": false, "error": e.to_string() }),
            Err(e) => return Err(e),
        },
        Command::Orders => to_json(&workshop.orders()?)?,
        Command::Reconcile { search, source, status } => {
            let filter = MaterialFilter { search, source, status };
            to_json(&workshop.reconcile_filtered(&filter)?)?
        }
        Command::Dashboard => to_json(&workshop.dashboard()?)?,
        Command::Expand { item, quantity } => to_json(&workshop.expand(&item, quantity)?)?,
        Command::Analyze { batch_id } => match workshop.analyze_order(batch_id) {
            Ok(analysis) => to_json(&analysis)?,
            Err(e) if e.is_not_found() => json!({ "batch_id": batch_id, "error": e.to_string() }),
            Err(e) => return Err(e),
        },
        Command::Demand => to_json(&workshop.pending_demand()?)?,
    };
    Ok(value)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, ServiceError> {
    Ok(serde_json::to_value(value).map_err(StoreError::from)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftledger_builds::InMemoryOrderStore;
    use craftledger_catalog::Recipe;
    use craftledger_ledger::InMemoryMaterialStore;

    fn parse(args: &[&str]) -> Command {
        let mut argv = vec!["craftledger"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    fn workshop() -> Workshop<InMemoryMaterialStore, InMemoryOrderStore> {
        let catalog = Catalog::from_recipes([
            Recipe::new("Wall", [("Brick", 4.0), ("Mortar", 1.0)]).unwrap(),
            Recipe::new("Mortar", [("Sand", 2.0)]).unwrap(),
        ])
        .unwrap();
        Workshop::new(InMemoryMaterialStore::new(), InMemoryOrderStore::new(), Arc::new(catalog))
    }

    #[test]
    fn parses_commit_rows() {
        assert_eq!(
            parse(&["commit", "Wall=2", "Door = 1"]),
            Command::Commit { entries: vec![("Wall".into(), 2), ("Door".into(), 1)] }
        );
    }

    #[test]
    fn commit_requires_whole_positive_quantity() {
        for bad in ["Wall", "Wall=2.5", "Wall=0", "Wall=-1", "Wall=lots"] {
            assert!(Cli::try_parse_from(["craftledger", "commit", bad]).is_err(), "{bad}");
        }
        assert!(Cli::try_parse_from(["craftledger", "commit"]).is_err());
    }

    #[test]
    fn parses_negative_adjustments() {
        assert_eq!(
            parse(&["add", "Metal", "--have", "-3"]),
            Command::Add { material: "Metal".into(), have: -3, required: 0 }
        );
    }

    #[test]
    fn parses_reconcile_filters() {
        assert_eq!(
            parse(&["reconcile", "--search", "met", "--source", "shop", "--status", "needed"]),
            Command::Reconcile {
                search: Some("met".into()),
                source: Some(Source::Shop),
                status: Some(Status::Needed),
            }
        );
        assert!(Cli::try_parse_from(["craftledger", "reconcile", "--status", "done"]).is_err());
    }

    #[test]
    fn expand_defaults_to_one() {
        assert_eq!(parse(&["expand", "Wall"]), Command::Expand { item: "Wall".into(), quantity: 1 });
    }

    #[test]
    fn commit_then_complete_round_trip() {
        let ws = workshop();
        let out = run(&ws, parse(&["commit", "Wall=2"])).unwrap();
        let batch_id = out["batch_id"].as_i64().unwrap();

        let demand = run(&ws, Command::Demand).unwrap();
        assert_eq!(demand, json!([
            { "material": "Wall", "quantity": 2 },
            { "material": "Brick", "quantity": 8 },
            { "material": "Mortar", "quantity": 2 },
            { "material": "Sand", "quantity": 4 },
        ]));

        let done = run(&ws, Command::Complete { batch_id: BatchId::from(batch_id) }).unwrap();
        assert_eq!(done["completed"], true);
        assert_eq!(run(&ws, Command::Orders).unwrap(), json!([]));
    }

    #[test]
    fn unknown_batch_is_reported_not_fatal() {
        let ws = workshop();
        let out = run(&ws, Command::Complete { batch_id: BatchId::from(42) }).unwrap();
        assert_eq!(out["completed"], false);
        assert!(out["error"].as_str().unwrap().contains("42"));

        let out = run(&ws, Command::Analyze { batch_id: BatchId::from(42) }).unwrap();
        assert!(out.get("error").is_some());
    }

    #[test]
    fn invalid_quantity_is_an_error() {
        let ws = workshop();
        let zero = Command::Commit { entries: vec![("Wall".into(), 0)] };
        assert!(run(&ws, zero).is_err());
        assert!(run(&ws, Command::Orders).unwrap().as_array().unwrap().is_empty());
    }
}
