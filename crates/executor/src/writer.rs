use common::types::Cycle;
use csv::WriterBuilder;
use exchange_core::Enumeration;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

use super::error::Error;

pub const CYCLES_CSV: &str = "cycles.csv";
pub const CYCLES_DOT: &str = "cycles.dot";
pub const CYCLES_JSON: &str = "cycles.json";

/// One exchanged item of one cycle.
#[derive(Debug, Serialize)]
struct CycleRow<'a> {
    cycle: usize,
    weight: Option<u64>,
    from_user: &'a str,
    to_user: &'a str,
    item_id: &'a str,
    item_name: &'a str,
    item_value: u64,
}

/// Summary document written to `cycles.json`.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    total_cycles: usize,
    classes: Vec<JsonClass<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonClass<'a> {
    weight: Option<u64>,
    count: usize,
    cycles: &'a [Cycle],
}

/// Writes enumeration results for downstream rendering.
pub struct ResultWriter {
    output_dir: PathBuf,
}

impl ResultWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        ResultWriter {
            output_dir: output_dir.into(),
        }
    }

    /// Writes `cycles.csv`, `cycles.dot` and `cycles.json`, returning their paths.
    pub fn write_all(
        &self,
        enumeration: &Enumeration,
        user_names: &HashMap<&str, &str>,
    ) -> Result<Vec<PathBuf>, Error> {
        fs::create_dir_all(&self.output_dir)?;

        let csv_path = self.output_dir.join(CYCLES_CSV);
        write_csv(enumeration, &csv_path)?;

        let dot_path = self.output_dir.join(CYCLES_DOT);
        fs::write(&dot_path, render_dot(enumeration, user_names))?;

        let json_path = self.output_dir.join(CYCLES_JSON);
        write_json(enumeration, &json_path)?;

        info!(
            cycles = enumeration.total_cycles(),
            dir = %self.output_dir.display(),
            "Results written"
        );

        Ok(vec![csv_path, dot_path, json_path])
    }
}

/// One row per cycle edge, cycles numbered from 1 in extraction order.
pub fn write_csv(enumeration: &Enumeration, path: &Path) -> Result<(), Error> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_path(path)?;

    for (number, (weight, cycle)) in enumeration.cycles().enumerate() {
        for edge in &cycle.edges {
            wtr.serialize(CycleRow {
                cycle: number + 1,
                weight,
                from_user: &edge.tail,
                to_user: &edge.head,
                item_id: &edge.key,
                item_name: &edge.name,
                item_value: edge.weight,
            })?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Per-class counts and cycles, in processing order.
pub fn write_json(enumeration: &Enumeration, path: &Path) -> Result<(), Error> {
    let report = JsonReport {
        total_cycles: enumeration.total_cycles(),
        classes: enumeration
            .classes
            .iter()
            .map(|class| JsonClass {
                weight: class.weight,
                count: class.count(),
                cycles: &class.cycles,
            })
            .collect(),
    };

    serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), &report)?;
    Ok(())
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Renders every cycle as a Graphviz digraph.
///
/// Nodes are labelled with the user's display name when known, edges with
/// the exchanged item and its value.
pub fn render_dot(enumeration: &Enumeration, user_names: &HashMap<&str, &str>) -> String {
    let mut dot = String::from("digraph cycles {\n");

    for (weight, cycle) in enumeration.cycles() {
        let _ = writeln!(
            dot,
            "  // {} participants, weight {}, total value {}",
            cycle.len(),
            weight.map_or_else(|| "any".to_string(), |w| w.to_string()),
            cycle.total_value()
        );
        for edge in &cycle.edges {
            let from = user_names.get(edge.tail.as_str()).copied().unwrap_or(&edge.tail);
            let to = user_names.get(edge.head.as_str()).copied().unwrap_or(&edge.head);
            let label = format!(" {} ({})", edge.name, edge.weight);
            let _ = writeln!(
                dot,
                "  {} -> {} [key={}, label={}];",
                quote(from),
                quote(to),
                quote(&edge.key),
                quote(&label)
            );
        }
    }

    dot.push_str("}\n");
    dot
}
