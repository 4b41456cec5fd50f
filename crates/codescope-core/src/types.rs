//! Knowledge-graph data model: nodes, edges, file records, and the
//! intermediate shapes the indexing pipeline passes between stages.

use crate::{CodescopeError, WarningKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Node Kinds ──────────────────────────────────────────────────────────────

/// The kind of an extracted code entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Module,
    Class,
    Struct,
    Interface,
    Trait,
    Enum,
    Function,
    Method,
    Constructor,
    Destructor,
    Property,
    Field,
    Variable,
    Constant,
    TypeAlias,
    /// Framework-derived web route (not a syntactic form).
    Route,
    /// Framework-derived UI component.
    Component,
    Parameter,
    Import,
    Unknown,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Module => write!(f, "module"),
            Self::Class => write!(f, "class"),
            Self::Struct => write!(f, "struct"),
            Self::Interface => write!(f, "interface"),
            Self::Trait => write!(f, "trait"),
            Self::Enum => write!(f, "enum"),
            Self::Function => write!(f, "function"),
            Self::Method => write!(f, "method"),
            Self::Constructor => write!(f, "constructor"),
            Self::Destructor => write!(f, "destructor"),
            Self::Property => write!(f, "property"),
            Self::Field => write!(f, "field"),
            Self::Variable => write!(f, "variable"),
            Self::Constant => write!(f, "constant"),
            Self::TypeAlias => write!(f, "type_alias"),
            Self::Route => write!(f, "route"),
            Self::Component => write!(f, "component"),
            Self::Parameter => write!(f, "parameter"),
            Self::Import => write!(f, "import"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for NodeKind {
    type Err = CodescopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::File),
            "module" => Ok(Self::Module),
            "class" => Ok(Self::Class),
            "struct" => Ok(Self::Struct),
            "interface" => Ok(Self::Interface),
            "trait" => Ok(Self::Trait),
            "enum" => Ok(Self::Enum),
            "function" => Ok(Self::Function),
            "method" => Ok(Self::Method),
            "constructor" => Ok(Self::Constructor),
            "destructor" => Ok(Self::Destructor),
            "property" => Ok(Self::Property),
            "field" => Ok(Self::Field),
            "variable" => Ok(Self::Variable),
            "constant" => Ok(Self::Constant),
            "type_alias" => Ok(Self::TypeAlias),
            "route" => Ok(Self::Route),
            "component" => Ok(Self::Component),
            "parameter" => Ok(Self::Parameter),
            "import" => Ok(Self::Import),
            "unknown" => Ok(Self::Unknown),
            _ => Err(CodescopeError::InvalidNodeKind(s.to_string())),
        }
    }
}

// ── Edge Kinds ──────────────────────────────────────────────────────────────

/// The kind of a directed relation between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Contains,
    Calls,
    Imports,
    Extends,
    Implements,
    Returns,
    TypeOf,
    Reads,
    Writes,
}

impl EdgeKind {
    /// Edge kinds that contribute to impact analysis (reverse reachability).
    pub const IMPACT: [EdgeKind; 4] = [
        EdgeKind::Calls,
        EdgeKind::Imports,
        EdgeKind::Extends,
        EdgeKind::Implements,
    ];
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Contains => write!(f, "contains"),
            Self::Calls => write!(f, "calls"),
            Self::Imports => write!(f, "imports"),
            Self::Extends => write!(f, "extends"),
            Self::Implements => write!(f, "implements"),
            Self::Returns => write!(f, "returns"),
            Self::TypeOf => write!(f, "type_of"),
            Self::Reads => write!(f, "reads"),
            Self::Writes => write!(f, "writes"),
        }
    }
}

impl std::str::FromStr for EdgeKind {
    type Err = CodescopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contains" => Ok(Self::Contains),
            "calls" => Ok(Self::Calls),
            "imports" => Ok(Self::Imports),
            "extends" => Ok(Self::Extends),
            "implements" => Ok(Self::Implements),
            "returns" => Ok(Self::Returns),
            "type_of" => Ok(Self::TypeOf),
            "reads" => Ok(Self::Reads),
            "writes" => Ok(Self::Writes),
            _ => Err(CodescopeError::InvalidEdgeKind(s.to_string())),
        }
    }
}

// ── Core Records ────────────────────────────────────────────────────────────

/// Source range of a node, 0-based lines and columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

/// A named entity extracted from source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Deterministic ID derived from (kind, file_path, qualified_name, start_line).
    pub id: String,
    pub kind: NodeKind,
    /// Simple identifier (e.g. "login").
    pub name: String,
    /// Containment-prefixed identifier (e.g. "AuthService.login").
    pub qualified_name: String,
    pub language: String,
    /// Project-relative path of the defining file.
    pub file_path: String,
    pub span: Span,
    pub signature: Option<String>,
    pub docstring: Option<String>,
    pub is_exported: bool,
    pub updated_at: DateTime<Utc>,
}

/// A directed relation between two nodes.
///
/// `target_id` is NULL while the reference is unresolved; `target_symbol`
/// always keeps the referenced name so name-based queries still work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source_id: String,
    pub target_id: Option<String>,
    pub target_symbol: String,
    pub kind: EdgeKind,
    /// 1.0 for structural edges derived from syntax alone; lower when the
    /// resolver used heuristics.
    pub confidence: f64,
    /// File the edge is sourced from (drives per-file slice replacement).
    pub file_path: String,
    /// 0-based line of the reference site.
    pub line: usize,
    /// Name of the resolver pass or framework that resolved this edge.
    pub resolved_by: Option<String>,
}

impl Edge {
    pub fn is_resolved(&self) -> bool {
        self.target_id.is_some()
    }
}

/// Per-file bookkeeping record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Project-relative path; unique primary key.
    pub path: String,
    pub language: String,
    /// Hex SHA-256 of the raw file bytes.
    pub content_hash: String,
    pub size: u64,
    pub indexed_at: DateTime<Utc>,
}

/// A name-based reference awaiting resolver attention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnresolvedReference {
    pub source_node_id: String,
    /// Referenced name as written (possibly qualified, e.g. "Obj.bar").
    pub reference_name: String,
    /// Explicit qualifier when the syntax exposes one (e.g. "Obj").
    pub qualifier: Option<String>,
    pub kind: EdgeKind,
    pub file_path: String,
    pub line: usize,
}

impl UnresolvedReference {
    /// Last segment of the reference name ("a.b.C" -> "C", "x::y" -> "y").
    pub fn simple_name(&self) -> &str {
        simple_name_of(&self.reference_name)
    }
}

/// Last segment of a possibly-qualified symbol name.
pub fn simple_name_of(name: &str) -> &str {
    let after_colons = name.rsplit("::").next().unwrap_or(name);
    after_colons.rsplit('.').next().unwrap_or(after_colons)
}

/// A stored embedding for one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorEntry {
    pub node_id: String,
    pub embedding: Vec<f32>,
    pub model: String,
}

// ── Summaries ───────────────────────────────────────────────────────────────

/// A contained per-file problem recorded during an index or sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexWarning {
    pub path: String,
    pub kind: WarningKind,
    pub message: String,
}

/// Result of an index or sync run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexSummary {
    pub files_added: usize,
    pub files_modified: usize,
    pub files_removed: usize,
    pub files_checked: usize,
    pub errors: Vec<IndexWarning>,
}
