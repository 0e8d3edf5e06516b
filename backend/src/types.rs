//! Core data structures for the CYRUS structure parser
//!
//! This module defines the node model emitted by the parser, the per-level
//! statistics, and the warning channel used for structural anomalies.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hierarchy level of a nomenclature entry.
///
/// Serialized as its numeric value (1–4) to match the import tooling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum Level {
    /// Top-level grouping, a retail banner (e.g. "201 GEANT CASINO")
    Sector = 1,
    /// Second tier under a sector (e.g. "01 MARCHE")
    Department = 2,
    /// Third tier under a department (e.g. "010 BOUCHERIE")
    Family = 3,
    /// Leaf classification under a family (e.g. "101 STAND TRADITIONNEL")
    SubFamily = 4,
}

impl Level {
    pub fn label(&self) -> &'static str {
        match self {
            Level::Sector => "sector",
            Level::Department => "department",
            Level::Family => "family",
            Level::SubFamily => "sub-family",
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level as u8
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Level::Sector),
            2 => Ok(Level::Department),
            3 => Ok(Level::Family),
            4 => Ok(Level::SubFamily),
            n => Err(format!("Invalid hierarchy level: {}", n)),
        }
    }
}

/// One classification entry resolved from the listing.
///
/// Nodes are created once per matched line and are immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    /// Hierarchy level (1=sector, 2=department, 3=family, 4=sub-family)
    pub level: Level,

    /// Numeric code as it appeared in the source. Kept as a string since
    /// leading-zero codes like "010" are distinct from "10".
    pub code: String,

    /// Free-text label, trimmed
    pub name: String,

    /// Code of the nearest ancestor one level up; None for sectors
    pub parent_code: Option<String>,

    /// Breadcrumb of "code name" segments from the sector down to this
    /// node, joined by " > "
    pub full_path: String,

    /// Originating line number in the source file (1-indexed)
    pub source_line: usize,
}

/// Per-level counts and skip statistics for one parse run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseStats {
    /// Total number of nodes emitted
    pub total: usize,
    pub sectors: usize,
    pub departments: usize,
    pub families: usize,
    pub sub_families: usize,
    /// Lines with no leading digit sequence, skipped without a node
    pub skipped_lines: usize,
}

/// Structural anomaly encountered while resolving a line.
///
/// Warnings never abort the parse; the node is still emitted with the
/// best available parent so that one malformed line cannot lose the rest
/// of the listing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseWarning {
    /// A 3-digit code resolved as a family while no department was open.
    /// The node is attached to the sector directly.
    #[error("line {line}: family '{code} {name}' has no open department, attached to sector '{sector}'")]
    FamilyWithoutDepartment {
        line: usize,
        code: String,
        name: String,
        sector: String,
    },

    /// A line resolved as a sub-family while no family was open. The node
    /// takes the nearest open ancestor as parent instead.
    #[error("line {line}: sub-family '{code} {name}' has no open family, attached to '{fallback}'")]
    SubFamilyWithoutFamily {
        line: usize,
        code: String,
        name: String,
        fallback: String,
    },

    /// A line resolved with no open ancestor at all; the node is emitted
    /// with an empty parent code.
    #[error("line {line}: '{code} {name}' has no open ancestor, parent left empty")]
    NoOpenAncestor {
        line: usize,
        code: String,
        name: String,
    },
}

impl ParseWarning {
    /// Source line the warning refers to
    pub fn line(&self) -> usize {
        match self {
            ParseWarning::FamilyWithoutDepartment { line, .. } => *line,
            ParseWarning::SubFamilyWithoutFamily { line, .. } => *line,
            ParseWarning::NoOpenAncestor { line, .. } => *line,
        }
    }
}

/// The outcome of parsing one listing: the ordered node sequence, the
/// per-level counts, and any structural warnings collected on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub nodes: Vec<Node>,
    pub stats: ParseStats,
    pub warnings: Vec<ParseWarning>,
}
