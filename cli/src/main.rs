use std::path::{Path, PathBuf};
use std::process::exit;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use anyhow::Result;

use cyrus_backend::logger;
use cyrus_backend::export_helpers::{self, DEFAULT_TABLE};
use cyrus_backend::structure_parse::{dedup_keep_first, parse_structure_file, verify_consistency};
use cyrus_backend::types::{Level, Node, ParseResult};

#[derive(Parser, Debug)]
#[command(author, version, about = "CYRUS structure CLI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a structure listing and write the JSON export
    #[command(arg_required_else_help = true)]
    Parse {
        /// Path to the structure listing (e.g. StructureCYRUS.txt)
        #[arg(value_name = "INPUT_PATH")]
        input: PathBuf,

        /// Output JSON file
        #[arg(long, short, value_name = "JSON_PATH")]
        output: PathBuf,

        /// Write minified JSON
        #[arg(long, default_value_t = false)]
        minify: bool,

        /// Keep only the first occurrence of each (level, code) pair
        #[arg(long, default_value_t = false)]
        dedup: bool,
    },

    /// Parse a structure listing and write the SQL seed script
    #[command(arg_required_else_help = true)]
    ExportSql {
        /// Path to the structure listing
        #[arg(value_name = "INPUT_PATH")]
        input: PathBuf,

        /// Output SQL file
        #[arg(long, short, value_name = "SQL_PATH")]
        output: PathBuf,

        /// Target table name
        #[arg(long, default_value = DEFAULT_TABLE)]
        table: String,

        /// Keep only the first occurrence of each (level, code) pair
        #[arg(long, default_value_t = false)]
        dedup: bool,
    },

    /// Parse a structure listing and print per-level counts and warnings
    #[command(arg_required_else_help = true)]
    Stats {
        /// Path to the structure listing
        #[arg(value_name = "INPUT_PATH")]
        input: PathBuf,
    },
}

/// Parse the input file and apply the optional dedup transform.
fn load_nodes(input: &Path, dedup: bool) -> Result<(ParseResult, Vec<Node>)> {
    let result = parse_structure_file(input)?;

    for warning in &result.warnings {
        eprintln!("Warning: {}", warning);
    }
    for violation in verify_consistency(&result.nodes) {
        eprintln!("Consistency violation: {}", violation);
    }

    let nodes = if dedup {
        dedup_keep_first(&result.nodes)
    } else {
        result.nodes.clone()
    };

    Ok((result, nodes))
}

fn source_file_name(input: &Path) -> String {
    input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| input.display().to_string())
}

fn cmd_parse(input: &Path, output: &Path, minify: bool, dedup: bool) -> Result<()> {
    let (result, nodes) = load_nodes(input, dedup)?;

    export_helpers::write_json_file(
        output,
        &source_file_name(input),
        &nodes,
        &result.stats,
        minify,
    )?;

    println!("Wrote {} items to {:?}", nodes.len(), output);
    logger::log_to_file(&format!(
        "parse {:?}: {} items, {} warnings",
        input,
        nodes.len(),
        result.warnings.len()
    ));

    Ok(())
}

fn cmd_export_sql(input: &Path, output: &Path, table: &str, dedup: bool) -> Result<()> {
    let (result, nodes) = load_nodes(input, dedup)?;

    export_helpers::write_sql_file(output, &nodes, table)?;

    println!("Wrote {} insert statements to {:?}", nodes.len(), output);
    logger::log_to_file(&format!(
        "export-sql {:?}: {} rows into {}, {} warnings",
        input,
        nodes.len(),
        table,
        result.warnings.len()
    ));

    Ok(())
}

fn cmd_stats(input: &Path) -> Result<()> {
    let (result, _) = load_nodes(input, false)?;
    let stats = &result.stats;

    println!("Structure listing: {:?}", input);
    println!("  Total items: {}", stats.total);
    println!("  Sectors (level 1): {}", stats.sectors);
    println!("  Departments (level 2): {}", stats.departments);
    println!("  Families (level 3): {}", stats.families);
    println!("  Sub-families (level 4): {}", stats.sub_families);
    println!("  Skipped lines: {}", stats.skipped_lines);
    println!("  Warnings: {}", result.warnings.len());

    // A few sample entries per level
    for level in [
        Level::Sector,
        Level::Department,
        Level::Family,
        Level::SubFamily,
    ] {
        let examples: Vec<&Node> = result
            .nodes
            .iter()
            .filter(|n| n.level == level)
            .take(5)
            .collect();

        if !examples.is_empty() {
            println!("\n{} examples:", level.label());
            for node in examples {
                println!("  {} - {}", node.code, node.name);
                println!("    Path: {}", node.full_path);
            }
        }
    }

    Ok(())
}

fn main() {
    if dotenv().is_err() {
        // No .env file is fine; env vars may be set directly.
    }

    logger::init_tracing();

    let cli = Cli::parse();

    let command_result = match cli.command {
        Commands::Parse {
            input,
            output,
            minify,
            dedup,
        } => cmd_parse(&input, &output, minify, dedup),

        Commands::ExportSql {
            input,
            output,
            table,
            dedup,
        } => cmd_export_sql(&input, &output, &table, dedup),

        Commands::Stats { input } => cmd_stats(&input),
    };

    if let Err(e) = command_result {
        eprintln!("Error executing command: {:#}", e);
        exit(1);
    }
}
