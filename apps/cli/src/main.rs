#![deny(warnings)]

//! Headless driver: builds the default plan, applies edits through the
//! store and prints the diagram and P&L summary.

use anyhow::{anyhow, bail, Context, Result};
use plan_core::{BusinessPlan, Entity, Year};
use plan_layout::{build_diagram_with, Diagram, EdgeKind, LayoutConfig, NodeId};
use plan_metrics::{compute_metrics, format_tr, Metrics, YearFigures};
use plan_store::{
    add_product, add_supplier, remove_supplier, toggle_relation, Relation, StateStore,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// One edit requested on the command line, applied in order.
#[derive(Debug)]
enum Edit {
    Set { path: String, value: Value },
    AddSupplier,
    RemoveSupplier(usize),
    AddProduct,
    Toggle(Relation, usize),
}

#[derive(Debug, Default)]
struct Args {
    edits: Vec<Edit>,
    layout: Option<PathBuf>,
    json: bool,
    version: bool,
}

/// `path=value`; the value is read as JSON and falls back to plain text.
fn parse_set(arg: &str) -> Result<Edit> {
    let (path, raw) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("--set expects path=value, got `{arg}`"))?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok(Edit::Set {
        path: path.to_string(),
        value,
    })
}

/// `ata:2`, `ertug:0` or `fiyuu:4`.
fn parse_toggle(arg: &str) -> Result<Edit> {
    let (rel, idx) = arg
        .split_once(':')
        .ok_or_else(|| anyhow!("--toggle expects relation:index, got `{arg}`"))?;
    let relation = match rel {
        "ata" => Relation::AtaToSuppliers,
        "ertug" => Relation::ErtugFromSuppliers,
        "fiyuu" => Relation::FiyuuFromSuppliers,
        other => bail!("unknown relation `{other}`"),
    };
    let index = idx
        .parse()
        .with_context(|| format!("bad supplier index `{idx}`"))?;
    Ok(Edit::Toggle(relation, index))
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = |flag: &str| it.next().ok_or_else(|| anyhow!("{flag} needs a value"));
        match arg.as_str() {
            "--set" => args.edits.push(parse_set(&value("--set")?)?),
            "--toggle" => args.edits.push(parse_toggle(&value("--toggle")?)?),
            "--add-supplier" => args.edits.push(Edit::AddSupplier),
            "--add-product" => args.edits.push(Edit::AddProduct),
            "--remove-supplier" => {
                let raw = value("--remove-supplier")?;
                let index = raw
                    .parse()
                    .with_context(|| format!("bad supplier index `{raw}`"))?;
                args.edits.push(Edit::RemoveSupplier(index));
            }
            "--layout" => args.layout = Some(PathBuf::from(value("--layout")?)),
            "--json" => args.json = true,
            "--version" => args.version = true,
            other => bail!("unknown argument `{other}`"),
        }
    }
    Ok(args)
}

fn load_layout(path: Option<&PathBuf>) -> Result<LayoutConfig> {
    match path {
        None => Ok(LayoutConfig::default()),
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("reading layout config {}", p.display()))?;
            let cfg = serde_yaml::from_str(&text)
                .with_context(|| format!("parsing layout config {}", p.display()))?;
            Ok(cfg)
        }
    }
}

fn apply_edits(store: &mut StateStore, edits: Vec<Edit>) -> Result<()> {
    for edit in edits {
        info!(?edit, "applying edit");
        match edit {
            Edit::Set { path, value } => {
                store
                    .apply(&path, value)
                    .with_context(|| format!("--set {path}"))?;
            }
            Edit::AddSupplier => {
                store.update(add_supplier);
            }
            Edit::RemoveSupplier(i) => {
                store.update(|p| remove_supplier(p, i));
            }
            Edit::AddProduct => {
                store.update(add_product);
            }
            Edit::Toggle(rel, i) => {
                store.update(|p| toggle_relation(p, rel, i));
            }
        }
    }
    Ok(())
}

fn node_name(d: &Diagram, id: NodeId) -> String {
    d.node(id)
        .map(|b| b.title.clone())
        .unwrap_or_else(|| format!("{id:?}"))
}

/// EBITDA margin in percent, `-` without sales.
fn margin_text(f: &YearFigures) -> String {
    f.ebitda_margin()
        .map(|m| format!("{}%", format_tr(m.saturating_mul(Decimal::ONE_HUNDRED))))
        .unwrap_or_else(|| "-".to_string())
}

fn print_summary(plan: &BusinessPlan, diagram: &Diagram, metrics: &Metrics) {
    let dashed = diagram
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Dashed)
        .count();
    println!(
        "Plan | actors: {} | suppliers: {} | products: {}",
        plan.actors.len(),
        plan.suppliers.len(),
        plan.products.len()
    );
    let names: Vec<String> = plan
        .suppliers
        .iter()
        .enumerate()
        .map(|(i, s)| s.display_name(i))
        .collect();
    println!("Suppliers | {}", names.join(", "));
    println!(
        "Diagram | {}x{} | boxes: {} | edges: {} solid, {} dashed",
        diagram.width,
        diagram.height,
        diagram.boxes.len(),
        diagram.edges.len() - dashed,
        dashed
    );
    for e in &diagram.edges {
        let target = e
            .target
            .map(|t| node_name(diagram, t))
            .unwrap_or_else(|| "·".to_string());
        let label = e
            .label
            .as_ref()
            .map(|l| format!(" [{}]", l.text))
            .unwrap_or_default();
        println!(
            "  {:?} {} -> {}{}",
            e.kind,
            node_name(diagram, e.source),
            target,
            label
        );
    }
    for &entity in Entity::ALL {
        for &year in Year::ALL {
            let f = metrics.get(entity, year);
            println!(
                "P&L | {entity} {year} | Gross: {} | EBITDA: {} | margin: {}",
                format_tr(f.gross),
                format_tr(f.ebitda),
                margin_text(&f)
            );
        }
    }
    println!("Max EBITDA (hesaplanan): {}", format_tr(metrics.max_ebitda));
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    if args.version {
        println!(
            "{} {} ({})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env!("PLAN_GIT_SHA")
        );
        return Ok(());
    }

    info!(edits = args.edits.len(), layout = ?args.layout, json = args.json, "starting CLI");
    let layout = load_layout(args.layout.as_ref())?;
    let mut store = StateStore::default();
    apply_edits(&mut store, args.edits)?;
    info!(revision = store.revision(), "edits applied");

    let plan = store.snapshot();
    let diagram = build_diagram_with(&layout, plan.into());
    let metrics = compute_metrics(&plan.financials);

    if args.json {
        let out = json!({
            "plan": plan,
            "diagram": diagram,
            "metrics": metrics,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_summary(plan, &diagram, &metrics);
    }
    Ok(())
}
