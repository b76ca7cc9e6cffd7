//! Java and Kotlin import extraction

use std::sync::LazyLock;

use regex::Regex;
use strata_core::Language;

use super::{push_unique, ReferenceExtractor};

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*import[ \t]+(static[ \t]+)?([A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*)(\.\*)?")
        .expect("jvm import pattern is valid")
});

/// Platform and test-framework packages never live in the repository.
const PLATFORM_PREFIXES: &[&str] = &[
    "java.",
    "javax.",
    "kotlin.",
    "kotlinx.",
    "android.",
    "androidx.",
    "org.junit",
    "org.jetbrains",
];

pub struct JvmExtractor;

impl ReferenceExtractor for JvmExtractor {
    fn name(&self) -> &'static str {
        "jvm"
    }

    fn matches(&self, language: Language) -> bool {
        matches!(language, Language::Java | Language::Kotlin)
    }

    fn extract_references(&self, content: &str) -> Vec<String> {
        let mut references = Vec::new();
        for captures in IMPORT.captures_iter(content) {
            let Some(path) = captures.get(2) else {
                continue;
            };
            let mut path = path.as_str();
            let is_static = captures.get(1).is_some();
            let is_wildcard = captures.get(3).is_some();

            // `import static a.b.Type.member` refers to `a.b.Type`
            if is_static && !is_wildcard {
                path = path.rsplit_once('.').map_or(path, |(owner, _)| owner);
            }
            if PLATFORM_PREFIXES.iter().any(|p| path.starts_with(p)) {
                continue;
            }
            push_unique(&mut references, path);
        }
        references
    }
}
