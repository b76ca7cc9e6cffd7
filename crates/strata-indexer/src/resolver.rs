//! Import specifier resolution against the repository's file set

use std::collections::HashMap;

use strata_core::{FileNode, Language, NodeId};

/// Suffixes tried, in order, when probing a JS/TS target.
const PROBE_SUFFIXES: &[&str] = &[
    "",
    ".js",
    ".jsx",
    ".ts",
    ".tsx",
    ".mjs",
    ".cjs",
    "/index.js",
    "/index.ts",
    "/index.jsx",
    "/index.tsx",
    ".vue",
    ".svelte",
];

/// Where `@/` and `~/` aliases are commonly rooted.
const ALIAS_BASES: &[&str] = &["", "client/", "server/", "src/", "client/src/", "server/src/"];

/// Source roots tried for bare specifiers such as `components/Button`.
const SOURCE_ROOTS: &[&str] = &["src/", "app/", "lib/", "client/src/", "server/src/"];

const JVM_EXTENSIONS: &[&str] = &[".kt", ".java", ".kts"];

/// Lookup tables over every file of the repository.
///
/// Built once per build and shared read-only by all resolution workers.
#[derive(Debug, Default)]
pub struct FileIndex {
    paths: Vec<String>,
    by_path: HashMap<String, NodeId>,
    by_stem: HashMap<String, Vec<NodeId>>,
    jvm_files: Vec<NodeId>,
}

impl FileIndex {
    pub fn new(nodes: &[FileNode]) -> Self {
        let mut index = FileIndex {
            paths: Vec::with_capacity(nodes.len()),
            by_path: HashMap::with_capacity(nodes.len()),
            ..Default::default()
        };
        for node in nodes {
            let path = node.relative_path.clone();
            index.by_path.insert(path.clone(), node.id);
            index
                .by_stem
                .entry(file_stem(&node.name).to_string())
                .or_default()
                .push(node.id);
            if JVM_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
                index.jvm_files.push(node.id);
            }
            index.paths.push(path);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn get(&self, relative_path: &str) -> Option<NodeId> {
        self.by_path.get(relative_path).copied()
    }

    fn path(&self, id: NodeId) -> &str {
        self.paths.get(id.index()).map_or("", String::as_str)
    }

    /// The single file with this stem, if exactly one exists.
    fn unique_stem(&self, stem: &str) -> Option<NodeId> {
        match self.by_stem.get(stem).map(Vec::as_slice) {
            Some([only]) => Some(*only),
            _ => None,
        }
    }
}

/// Maps raw specifiers to node ids. Misses yield `None` and are never errors.
pub struct ImportResolver<'a> {
    index: &'a FileIndex,
    basename_min_len: usize,
}

impl<'a> ImportResolver<'a> {
    pub fn new(index: &'a FileIndex, basename_min_len: usize) -> Self {
        Self {
            index,
            basename_min_len,
        }
    }

    pub fn resolve(&self, source: &FileNode, specifier: &str) -> Option<NodeId> {
        let resolved = match source.language {
            Language::JavaScript | Language::TypeScript => {
                self.resolve_script(&source.directory, specifier)
            }
            Language::Python => self.resolve_python(&source.directory, specifier),
            Language::Java | Language::Kotlin => self.resolve_jvm(specifier),
            _ => None,
        };
        if resolved.is_none() {
            tracing::trace!("Unresolved '{}' in {}", specifier, source.relative_path);
        }
        resolved
    }

    fn resolve_script(&self, source_dir: &str, specifier: &str) -> Option<NodeId> {
        if specifier.contains("://") {
            return None;
        }

        if is_path_specifier(specifier) {
            let base = if specifier.starts_with('/') { "" } else { source_dir };
            // A relative miss is final.
            return self.probe(&join_normalized(base, specifier));
        }

        if let Some(rest) = specifier
            .strip_prefix("@/")
            .or_else(|| specifier.strip_prefix("~/"))
        {
            let found = ALIAS_BASES
                .iter()
                .find_map(|base| self.probe(&format!("{base}{rest}")));
            if found.is_some() {
                return found;
            }
        }

        // Bare package names (`react`, `lodash`) never live in the repository.
        if !specifier.contains('/') {
            return None;
        }

        self.probe(specifier)
            .or_else(|| {
                SOURCE_ROOTS
                    .iter()
                    .find_map(|root| self.probe(&format!("{root}{specifier}")))
            })
            .or_else(|| self.basename_fallback(specifier))
    }

    fn probe(&self, target: &str) -> Option<NodeId> {
        let target = target.trim_end_matches('/');
        PROBE_SUFFIXES.iter().find_map(|suffix| {
            if target.is_empty() && suffix.is_empty() {
                return None;
            }
            self.index.get(&format!("{target}{suffix}"))
        })
    }

    fn basename_fallback(&self, specifier: &str) -> Option<NodeId> {
        // The last segment is compared as written against extensionless file names.
        let last = specifier.rsplit('/').next().unwrap_or(specifier);
        if last.chars().count() <= self.basename_min_len {
            return None;
        }
        self.index.unique_stem(last)
    }

    fn resolve_python(&self, source_dir: &str, specifier: &str) -> Option<NodeId> {
        let dots = specifier.chars().take_while(|&c| c == '.').count();
        let module = specifier[dots..].replace('.', "/");

        if dots > 0 {
            let mut dir = segments(source_dir);
            for _ in 1..dots {
                dir.pop()?;
            }
            let base = dir.join("/");
            if module.is_empty() {
                return self.index.get(&join(&base, "__init__.py"));
            }
            return self.python_module(&join(&base, &module));
        }

        if module.is_empty() {
            return None;
        }
        self.python_module(&join(&segments(source_dir).join("/"), &module))
            .or_else(|| self.python_module(&module))
    }

    fn python_module(&self, path: &str) -> Option<NodeId> {
        self.index
            .get(&format!("{path}.py"))
            .or_else(|| self.index.get(&format!("{path}/__init__.py")))
    }

    fn resolve_jvm(&self, specifier: &str) -> Option<NodeId> {
        let suffix = specifier.replace('.', "/");
        let boundary = format!("/{suffix}");

        let by_path = self.index.jvm_files.iter().copied().find(|&id| {
            let path = self.index.path(id);
            JVM_EXTENSIONS.iter().any(|ext| {
                path.strip_suffix(ext)
                    .is_some_and(|p| p == suffix || p.ends_with(&boundary))
            })
        });
        if by_path.is_some() {
            return by_path;
        }

        // Class-name fallback, only when the name is unambiguous among JVM files.
        let class = specifier.rsplit('.').next()?;
        let mut matches = self.index.jvm_files.iter().copied().filter(|&id| {
            let path = self.index.path(id);
            let name = path.rsplit('/').next().unwrap_or(path);
            file_stem(name) == class
        });
        match (matches.next(), matches.next()) {
            (Some(id), None) => Some(id),
            _ => None,
        }
    }
}

fn is_path_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
}

/// File name without its last extension.
fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Directory segments, treating `.` and `""` as the repository root.
fn segments(dir: &str) -> Vec<&str> {
    dir.split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

fn join(base: &str, rest: &str) -> String {
    if base.is_empty() {
        rest.to_string()
    } else {
        format!("{base}/{rest}")
    }
}

/// Resolve `.` and `..` segments of `specifier` against `base`.
/// A `..` at the repository root stays at the root.
fn join_normalized(base: &str, specifier: &str) -> String {
    let mut parts = segments(base);
    for segment in specifier.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::node;

    fn index_of(paths: &[&str]) -> (Vec<FileNode>, FileIndex) {
        let nodes: Vec<FileNode> = paths
            .iter()
            .enumerate()
            .map(|(i, p)| node(i as u32, p))
            .collect();
        let index = FileIndex::new(&nodes);
        (nodes, index)
    }

    #[test]
    fn test_relative_probing() {
        let (nodes, index) = index_of(&[
            "src/app.ts",
            "src/lib/math.ts",
            "src/widgets/index.tsx",
            "src/shared.js",
        ]);
        let resolver = ImportResolver::new(&index, 5);
        let app = &nodes[0];
        assert_eq!(resolver.resolve(app, "./lib/math"), Some(NodeId(1)));
        assert_eq!(resolver.resolve(app, "./widgets"), Some(NodeId(2)));
        assert_eq!(resolver.resolve(app, "./shared.js"), Some(NodeId(3)));
        assert_eq!(resolver.resolve(&nodes[1], "../shared"), Some(NodeId(3)));
        assert_eq!(resolver.resolve(app, "/src/lib/math"), Some(NodeId(1)));
        assert_eq!(resolver.resolve(app, "./missing"), None);
        assert_eq!(resolver.resolve(app, "../../../src/shared"), Some(NodeId(3)));
    }

    #[test]
    fn test_parent_of_root_clamps() {
        let (nodes, index) = index_of(&["b.js", "sub/c.js"]);
        let resolver = ImportResolver::new(&index, 5);
        assert_eq!(resolver.resolve(&nodes[0], "../sub/c"), Some(NodeId(1)));
        assert_eq!(resolver.resolve(&nodes[0], "../../missing"), None);
        assert_eq!(join_normalized("", "../../x/./y"), "x/y");
    }

    #[test]
    fn test_relative_miss_ends_chain() {
        // A unique stem exists, but relative misses never fall back.
        let (nodes, index) = index_of(&["src/app.ts", "src/deep/formatters.ts"]);
        let resolver = ImportResolver::new(&index, 5);
        assert_eq!(resolver.resolve(&nodes[0], "./formatters"), None);
    }

    #[test]
    fn test_alias_and_source_roots() {
        let (nodes, index) = index_of(&[
            "client/src/main.tsx",
            "client/src/components/Button.tsx",
            "server/src/routes/users.ts",
        ]);
        let resolver = ImportResolver::new(&index, 5);
        let main = &nodes[0];
        assert_eq!(resolver.resolve(main, "@/components/Button"), Some(NodeId(1)));
        assert_eq!(resolver.resolve(main, "~/routes/users"), Some(NodeId(2)));
        assert_eq!(resolver.resolve(main, "components/Button"), Some(NodeId(1)));
        assert_eq!(resolver.resolve(main, "react"), None);
        assert_eq!(resolver.resolve(main, "https://cdn.example.com/lib.js"), None);
    }

    #[test]
    fn test_basename_fallback_requires_unique_long_stem() {
        let (nodes, index) = index_of(&[
            "src/app.ts",
            "packages/core/formatters.ts",
            "packages/a/helpers.ts",
            "packages/b/helpers.ts",
            "packages/c/dates.ts",
        ]);
        let resolver = ImportResolver::new(&index, 5);
        let app = &nodes[0];
        assert_eq!(resolver.resolve(app, "@acme/formatters"), Some(NodeId(1)));
        // Two files share the stem.
        assert_eq!(resolver.resolve(app, "@acme/helpers"), None);
        // Stem too short.
        assert_eq!(resolver.resolve(app, "@acme/dates"), None);
        // The segment is matched as written, extension included.
        assert_eq!(resolver.resolve(app, "@acme/formatters.ts"), None);
    }

    #[test]
    fn test_python_resolution() {
        let (nodes, index) = index_of(&[
            "pkg/app/views.py",
            "pkg/app/helpers.py",
            "pkg/core/__init__.py",
            "pkg/core/db.py",
            "pkg/app/__init__.py",
        ]);
        let resolver = ImportResolver::new(&index, 5);
        let views = &nodes[0];
        assert_eq!(resolver.resolve(views, ".helpers"), Some(NodeId(1)));
        assert_eq!(resolver.resolve(views, "..core.db"), Some(NodeId(3)));
        assert_eq!(resolver.resolve(views, "..core"), Some(NodeId(2)));
        assert_eq!(resolver.resolve(views, "."), Some(NodeId(4)));
        assert_eq!(resolver.resolve(views, "pkg.core.db"), Some(NodeId(3)));
        assert_eq!(resolver.resolve(views, "helpers"), Some(NodeId(1)));
        assert_eq!(resolver.resolve(views, "os"), None);
        assert_eq!(resolver.resolve(views, "...."), None);
    }

    #[test]
    fn test_jvm_resolution() {
        let (nodes, index) = index_of(&[
            "app/src/main/java/com/acme/App.java",
            "core/src/main/kotlin/com/acme/core/Engine.kt",
            "core/src/main/kotlin/com/other/Engine.kt",
            "util/src/main/java/org/acme/Strings.java",
        ]);
        let resolver = ImportResolver::new(&index, 5);
        let app = &nodes[0];
        assert_eq!(resolver.resolve(app, "com.acme.core.Engine"), Some(NodeId(1)));
        // Not at a path boundary, falls back to the unique class name.
        assert_eq!(resolver.resolve(app, "misc.Strings"), Some(NodeId(3)));
        // Ambiguous class name.
        assert_eq!(resolver.resolve(app, "shaded.Engine"), None);
    }

    #[test]
    fn test_unsupported_language() {
        let (nodes, index) = index_of(&["main.go", "util.go"]);
        let resolver = ImportResolver::new(&index, 5);
        assert_eq!(resolver.resolve(&nodes[0], "./util"), None);
    }
}
