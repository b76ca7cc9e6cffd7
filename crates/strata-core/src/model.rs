//! Core data structures for the dependency graph

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Dense, build-local identifier for a file node.
///
/// Ids are assigned by position in the scanned file list before any
/// parallel work starts, so they never depend on scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Parse the `node_<n>` display form.
    pub fn parse(token: &str) -> Option<Self> {
        token.strip_prefix("node_")?.parse().ok().map(NodeId)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

/// Languages recognised from file extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    // ── Code ────────────────────────────────────────────────
    JavaScript,
    TypeScript,
    Python,
    Java,
    Kotlin,
    Go,
    Rust,
    Ruby,
    Php,
    Swift,
    C,
    Cpp,
    CSharp,
    Dart,
    Haskell,

    // ── Styles / markup / data ──────────────────────────────
    Css,
    Scss,
    Sass,
    Less,
    Html,
    Json,
    Yaml,
    Xml,

    // ── Fallback ────────────────────────────────────────────
    Unknown,
}

impl Language {
    /// Detect language from a file extension, with or without the leading dot.
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "js" | "jsx" | "mjs" | "cjs" | "vue" | "svelte" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            "py" | "pyi" => Language::Python,
            "java" => Language::Java,
            "kt" | "kts" => Language::Kotlin,
            "go" => Language::Go,
            "rs" => Language::Rust,
            "rb" => Language::Ruby,
            "php" => Language::Php,
            "swift" => Language::Swift,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" => Language::Cpp,
            "cs" => Language::CSharp,
            "dart" => Language::Dart,
            "hs" | "lhs" => Language::Haskell,
            "css" => Language::Css,
            "scss" => Language::Scss,
            "sass" => Language::Sass,
            "less" => Language::Less,
            "html" | "htm" => Language::Html,
            "json" => Language::Json,
            "yaml" | "yml" => Language::Yaml,
            "xml" => Language::Xml,
            _ => Language::Unknown,
        }
    }

    /// Detect language from a path's extension.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map_or(Language::Unknown, Language::from_extension)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Kotlin => "kotlin",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::Swift => "swift",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
            Language::Dart => "dart",
            Language::Haskell => "haskell",
            Language::Css => "css",
            Language::Scss => "scss",
            Language::Sass => "sass",
            Language::Less => "less",
            Language::Html => "html",
            Language::Json => "json",
            Language::Yaml => "yaml",
            Language::Xml => "xml",
            Language::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lang = match s.to_ascii_lowercase().as_str() {
            "javascript" => Language::JavaScript,
            "typescript" => Language::TypeScript,
            "python" => Language::Python,
            "java" => Language::Java,
            "kotlin" => Language::Kotlin,
            "go" => Language::Go,
            "rust" => Language::Rust,
            "ruby" => Language::Ruby,
            "php" => Language::Php,
            "swift" => Language::Swift,
            "c" => Language::C,
            "cpp" => Language::Cpp,
            "csharp" => Language::CSharp,
            "dart" => Language::Dart,
            "haskell" => Language::Haskell,
            "css" => Language::Css,
            "scss" => Language::Scss,
            "sass" => Language::Sass,
            "less" => Language::Less,
            "html" => Language::Html,
            "json" => Language::Json,
            "yaml" => Language::Yaml,
            "xml" => Language::Xml,
            "unknown" => Language::Unknown,
            other => return Err(format!("unknown language: {other}")),
        };
        Ok(lang)
    }
}

/// Heuristic role of a file, derived from its name and location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    Test,
    Component,
    Config,
    Service,
    Hook,
    Route,
    Model,
    Entry,
    Utility,
    Style,
    Module,
}

impl FileRole {
    pub fn as_str(self) -> &'static str {
        match self {
            FileRole::Test => "test",
            FileRole::Component => "component",
            FileRole::Config => "config",
            FileRole::Service => "service",
            FileRole::Hook => "hook",
            FileRole::Route => "route",
            FileRole::Model => "model",
            FileRole::Entry => "entry",
            FileRole::Utility => "utility",
            FileRole::Style => "style",
            FileRole::Module => "module",
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FileRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let role = match s.to_ascii_lowercase().as_str() {
            "test" => FileRole::Test,
            "component" => FileRole::Component,
            "config" => FileRole::Config,
            "service" => FileRole::Service,
            "hook" => FileRole::Hook,
            "route" => FileRole::Route,
            "model" => FileRole::Model,
            "entry" => FileRole::Entry,
            "utility" => FileRole::Utility,
            "style" => FileRole::Style,
            "module" => FileRole::Module,
            other => return Err(format!("unknown role: {other}")),
        };
        Ok(role)
    }
}

/// One source file in the dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileNode {
    pub id: NodeId,
    pub absolute_path: PathBuf,
    /// Repository-relative path with forward slashes.
    pub relative_path: String,
    pub name: String,
    /// Parent directory of `relative_path`; `.` for files at the root.
    pub directory: String,
    /// Extension including the leading dot, empty when absent.
    pub extension: String,
    pub language: Language,
    pub role: FileRole,
    pub size_bytes: u64,
    pub line_count: u32,
}

/// What kind of relationship an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Import,
}

/// A resolved, directed dependency between two files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
}

impl DependencyEdge {
    /// Import edge from `source` to `target`. Returns `None` for self-references.
    pub fn import(source: NodeId, target: NodeId) -> Option<Self> {
        (source != target).then_some(DependencyEdge {
            source,
            target,
            kind: EdgeKind::Import,
        })
    }

    pub fn key(&self) -> (NodeId, NodeId) {
        (self.source, self.target)
    }
}

/// Normalize a path string to forward slashes.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Parent directory of a forward-slash relative path, `.` at the root.
pub fn parent_directory(relative_path: &str) -> String {
    match relative_path.rfind('/') {
        Some(idx) if idx > 0 => relative_path[..idx].to_string(),
        _ => ".".to_string(),
    }
}
