//! CYRUS structure listing parser
//!
//! Parses a flat `StructureCYRUS.txt`-style listing into a four-level
//! hierarchy: sector → department → family → sub-family. The listing
//! carries no reliable nesting markers, so the level of each entry is
//! inferred from its code length and from which ancestors are open in the
//! context stack at that point of the scan.
//!
//! The scan is a single synchronous pass in strict file order; resolution
//! depends on the lines seen so far, so the loop must not be reordered or
//! parallelized. Each parse invocation owns its own context stack and
//! output, so concurrent parses of different files are independent.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{Level, Node, ParseResult, ParseStats, ParseWarning};

/// A line whose trimmed content equals this sentinel marks the start of
/// the listing and carries no data.
pub const HEADER_SENTINEL: &str = "Structure";

/// Separator between "code name" segments in a full path
pub const PATH_SEPARATOR: &str = " > ";

lazy_static! {
    /// A data line: leading digits, whitespace, then the name
    static ref RE_DATA_LINE: Regex = Regex::new(r"^(\d+)\s+(.+)$").unwrap();
}

// ============================================================================
// Line Classifier
// ============================================================================

/// A data line split into its code and name parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    pub code: String,
    pub name: String,
    /// Leading whitespace width before the code. The source files mix tab
    /// and space indentation, so this is kept for diagnostics only and
    /// never drives level resolution.
    pub indent: usize,
    /// Source line number (1-indexed)
    pub line_number: usize,
}

/// Classification of one raw input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    /// Empty or whitespace-only line
    Blank,
    /// The literal header sentinel
    Header,
    /// A code + name data line
    Data(ClassifiedLine),
    /// Anything else, e.g. a stray annotation line
    Unmatched,
}

/// Split a raw line into (code, name), or report why it is not a data line.
pub fn classify_line(raw: &str, line_number: usize) -> LineClass {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return LineClass::Blank;
    }
    if trimmed == HEADER_SENTINEL {
        return LineClass::Header;
    }

    match RE_DATA_LINE.captures(trimmed) {
        Some(caps) => {
            let indent = raw.len() - raw.trim_start().len();
            LineClass::Data(ClassifiedLine {
                code: caps[1].to_string(),
                name: caps[2].trim().to_string(),
                indent,
                line_number,
            })
        }
        None => LineClass::Unmatched,
    }
}

// ============================================================================
// Context Stack
// ============================================================================

/// One open ancestor on the context stack.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StackEntry {
    code: String,
    name: String,
}

impl StackEntry {
    fn segment(&self) -> String {
        format!("{} {}", self.code, self.name)
    }
}

/// The ancestors currently in scope while scanning: at most one open
/// sector, department and family. Opening a slot discards everything
/// deeper, so a new department invalidates any previously open family.
#[derive(Debug, Clone, Default)]
struct ContextStack {
    sector: Option<StackEntry>,
    department: Option<StackEntry>,
    family: Option<StackEntry>,
}

impl ContextStack {
    fn open_sector(&mut self, entry: StackEntry) {
        self.sector = Some(entry);
        self.department = None;
        self.family = None;
    }

    fn open_department(&mut self, entry: StackEntry) {
        self.department = Some(entry);
        self.family = None;
    }

    fn open_family(&mut self, entry: StackEntry) {
        self.family = Some(entry);
    }

    /// "code name" segments of the open ancestors strictly below `level`,
    /// in root-to-leaf order.
    fn ancestor_segments(&self, level: Level) -> Vec<String> {
        let mut parts = Vec::new();
        if level > Level::Sector {
            if let Some(s) = &self.sector {
                parts.push(s.segment());
            }
        }
        if level > Level::Department {
            if let Some(d) = &self.department {
                parts.push(d.segment());
            }
        }
        if level > Level::Family {
            if let Some(f) = &self.family {
                parts.push(f.segment());
            }
        }
        parts
    }
}

// ============================================================================
// Level Resolver
// ============================================================================

/// Outcome of resolving one classified line against the stack.
#[derive(Debug)]
struct Resolution {
    level: Level,
    parent_code: Option<String>,
    warning: Option<ParseWarning>,
}

/// Decide which level a (code, name) occupies and update the stack.
///
/// The rules are evaluated top to bottom:
///
/// 1. no open sector → sector, regardless of code length
/// 2. 2-digit code → department under the open sector
/// 3. 3-digit code with no open family → family, under the department if
///    one is open, else directly under the sector (degraded but tolerated)
/// 4. anything else → sub-family; the stack is left untouched so that
///    sibling sub-families accumulate under the same family
///
/// Code length is the only reliable signal, and only 2-digit codes are
/// unambiguous. 3-digit codes take whatever slot is next to fill. A
/// consequence is that a second top-level sector cannot be detected once
/// one is open: a 3-digit code after an open sector always resolves as a
/// family or sub-family. The source format provides no reset marker
/// between sectors, so one listing holds one sector per parse.
fn resolve_level(line: &ClassifiedLine, stack: &mut ContextStack) -> Resolution {
    let entry = StackEntry {
        code: line.code.clone(),
        name: line.name.clone(),
    };

    if stack.sector.is_none() {
        stack.open_sector(entry);
        return Resolution {
            level: Level::Sector,
            parent_code: None,
            warning: None,
        };
    }

    if line.code.len() == 2 {
        let parent_code = stack.sector.as_ref().map(|s| s.code.clone());
        stack.open_department(entry);
        return Resolution {
            level: Level::Department,
            parent_code,
            warning: None,
        };
    }

    if line.code.len() == 3 && stack.family.is_none() {
        let (parent_code, warning) = if let Some(d) = &stack.department {
            (Some(d.code.clone()), None)
        } else {
            let sector_code = stack.sector.as_ref().map(|s| s.code.clone());
            let warning = ParseWarning::FamilyWithoutDepartment {
                line: line.line_number,
                code: line.code.clone(),
                name: line.name.clone(),
                sector: sector_code.clone().unwrap_or_default(),
            };
            (sector_code, Some(warning))
        };
        stack.open_family(entry);
        return Resolution {
            level: Level::Family,
            parent_code,
            warning,
        };
    }

    // Sub-family. When no family is open (e.g. an irregular code length
    // directly after a department), attach to the nearest open ancestor
    // and surface the degradation on the warning channel.
    let parent_code = stack
        .family
        .as_ref()
        .or(stack.department.as_ref())
        .or(stack.sector.as_ref())
        .map(|e| e.code.clone());

    let warning = if stack.family.is_some() {
        None
    } else if let Some(fallback) = &parent_code {
        Some(ParseWarning::SubFamilyWithoutFamily {
            line: line.line_number,
            code: line.code.clone(),
            name: line.name.clone(),
            fallback: fallback.clone(),
        })
    } else {
        Some(ParseWarning::NoOpenAncestor {
            line: line.line_number,
            code: line.code.clone(),
            name: line.name.clone(),
        })
    };

    Resolution {
        level: Level::SubFamily,
        parent_code,
        warning,
    }
}

// ============================================================================
// Path Builder
// ============================================================================

/// Render the breadcrumb path for a node from the ancestors in scope when
/// it was resolved. A sector's path is just its own "code name".
fn build_full_path(stack: &ContextStack, level: Level, code: &str, name: &str) -> String {
    let mut parts = stack.ancestor_segments(level);
    parts.push(format!("{} {}", code, name));
    parts.join(PATH_SEPARATOR)
}

// ============================================================================
// Tree Assembler
// ============================================================================

/// Accumulates resolved nodes in input order along with per-level counts
/// and the warning channel.
#[derive(Debug, Default)]
struct TreeAssembler {
    nodes: Vec<Node>,
    stats: ParseStats,
    warnings: Vec<ParseWarning>,
}

impl TreeAssembler {
    fn push(&mut self, node: Node) {
        self.stats.total += 1;
        match node.level {
            Level::Sector => self.stats.sectors += 1,
            Level::Department => self.stats.departments += 1,
            Level::Family => self.stats.families += 1,
            Level::SubFamily => self.stats.sub_families += 1,
        }
        self.nodes.push(node);
    }

    fn warn(&mut self, warning: ParseWarning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn skip(&mut self, line_number: usize) {
        tracing::debug!("Skipping unparseable line {}", line_number);
        self.stats.skipped_lines += 1;
    }

    fn finish(self) -> ParseResult {
        ParseResult {
            nodes: self.nodes,
            stats: self.stats,
            warnings: self.warnings,
        }
    }
}

// ============================================================================
// Main Public API
// ============================================================================

/// Parse a full structure listing.
///
/// Unparseable lines are skipped and counted; structural anomalies are
/// surfaced on the warning channel. Neither aborts the scan, so the parse
/// extracts as much as the input allows. The same input always yields the
/// same ordered node sequence.
pub fn parse_structure(text: &str) -> ParseResult {
    let mut stack = ContextStack::default();
    let mut assembler = TreeAssembler::default();

    for (idx, raw) in text.lines().enumerate() {
        let line_number = idx + 1;
        match classify_line(raw, line_number) {
            LineClass::Blank | LineClass::Header => {}
            LineClass::Unmatched => assembler.skip(line_number),
            LineClass::Data(line) => {
                let resolution = resolve_level(&line, &mut stack);
                let full_path = build_full_path(&stack, resolution.level, &line.code, &line.name);

                if let Some(warning) = resolution.warning {
                    assembler.warn(warning);
                }

                assembler.push(Node {
                    level: resolution.level,
                    code: line.code,
                    name: line.name,
                    parent_code: resolution.parent_code,
                    full_path,
                    source_line: line.line_number,
                });
            }
        }
    }

    assembler.finish()
}

/// Read and parse a listing file. I/O failures are the only fatal errors;
/// everything else is recovered per line.
pub fn parse_structure_file(path: &Path) -> Result<ParseResult> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read structure file: {:?}", path))?;

    let result = parse_structure(&content);
    tracing::info!(
        "Parsed {:?}: {} nodes, {} skipped lines, {} warnings",
        path,
        result.stats.total,
        result.stats.skipped_lines,
        result.warnings.len()
    );

    Ok(result)
}

/// Drop repeated (level, code) pairs, keeping the first occurrence.
///
/// Duplicates can legitimately recur under different parents, so this is
/// an explicit opt-in transform rather than something the parser applies
/// on its own. Applying it twice in a row is a no-op.
pub fn dedup_keep_first(nodes: &[Node]) -> Vec<Node> {
    let mut seen: HashSet<(Level, String)> = HashSet::new();
    nodes
        .iter()
        .filter(|n| seen.insert((n.level, n.code.clone())))
        .cloned()
        .collect()
}

/// Flag nodes that should have a parent but ended up without one.
///
/// The offending nodes stay in the sequence; callers decide whether a
/// non-empty list blocks downstream loading.
pub fn verify_consistency(nodes: &[Node]) -> Vec<String> {
    nodes
        .iter()
        .filter(|n| n.level != Level::Sector && n.parent_code.is_none())
        .map(|n| {
            format!(
                "line {}: {} '{} {}' has no parent code",
                n.source_line,
                n.level.label(),
                n.code,
                n.name
            )
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
