//! Export helpers for parsed structure listings
//!
//! Serializes the node sequence to a JSON document for import tooling and
//! to a SQL seed script. Both are pure text generation; no database access
//! happens here. The downstream loader is expected to clear the target
//! table, insert in batches, and verify the per-level counts against the
//! stats block.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::helpers::sql_quote_opt;
use crate::types::{Node, ParseStats};

/// Default target table for the SQL seed script
pub const DEFAULT_TABLE: &str = "cyrus_structure";

/// Metadata block included with the JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub source_file: String,
    pub total_items: usize,
    pub stats: ParseStats,
    pub parsed_at: String,
}

/// The full JSON export document: metadata plus the ordered node list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub metadata: ExportMetadata,
    pub items: Vec<Node>,
}

/// Assemble the export document for a parsed listing.
pub fn export_document(source_file: &str, nodes: &[Node], stats: &ParseStats) -> ExportDocument {
    ExportDocument {
        metadata: ExportMetadata {
            source_file: source_file.to_string(),
            total_items: nodes.len(),
            stats: stats.clone(),
            parsed_at: chrono::Utc::now().format("%Y-%m-%d").to_string(),
        },
        items: nodes.to_vec(),
    }
}

/// Serialize the export document, pretty-printed unless `minify` is set.
pub fn document_to_json(document: &ExportDocument, minify: bool) -> Result<String> {
    let json_str = if minify {
        serde_json::to_string(document)?
    } else {
        serde_json::to_string_pretty(document)?
    };
    Ok(json_str)
}

/// Write the JSON export for a parsed listing to a file.
pub fn write_json_file(
    json_path: &Path,
    source_file: &str,
    nodes: &[Node],
    stats: &ParseStats,
    minify: bool,
) -> Result<()> {
    let document = export_document(source_file, nodes, stats);
    let json_str = document_to_json(&document, minify)?;

    fs::write(json_path, json_str)
        .with_context(|| format!("Failed to write JSON file: {:?}", json_path))?;

    Ok(())
}

/// Render the SQL seed script: a statement clearing the target table,
/// then one INSERT per node in input order. The parent code is rendered
/// as NULL for sector rows.
pub fn generate_sql(nodes: &[Node], table: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("-- {} seed script\n", table));
    out.push_str(&format!(
        "-- Generated from a structure listing, {} rows\n\n",
        nodes.len()
    ));
    out.push_str(&format!("DELETE FROM {};\n\n", table));

    for node in nodes {
        out.push_str(&format!(
            "INSERT INTO {} (level, code, name, parent_code, full_path) VALUES ({}, {}, {}, {}, {});\n",
            table,
            u8::from(node.level),
            sql_quote_opt(Some(&node.code)),
            sql_quote_opt(Some(&node.name)),
            sql_quote_opt(node.parent_code.as_deref()),
            sql_quote_opt(Some(&node.full_path)),
        ));
    }

    out
}

/// Write the SQL seed script to a file.
pub fn write_sql_file(sql_path: &Path, nodes: &[Node], table: &str) -> Result<()> {
    let script = generate_sql(nodes, table);

    fs::write(sql_path, script)
        .with_context(|| format!("Failed to write SQL file: {:?}", sql_path))?;

    Ok(())
}
