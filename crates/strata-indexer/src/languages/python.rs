//! Python import extraction

use std::sync::LazyLock;

use regex::Regex;
use strata_core::Language;

use super::{push_unique, ReferenceExtractor};

/// Either `from <module> import …` (group 1) or `import a.b [as c], d` (group 2).
static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:from[ \t]+(\.+[\w.]*|[\w.]+)[ \t]+import\b|import[ \t]+([\w.]+(?:[ \t]+as[ \t]+\w+)?(?:[ \t]*,[ \t]*[\w.]+(?:[ \t]+as[ \t]+\w+)?)*))",
    )
    .expect("python import pattern is valid")
});

pub struct PythonExtractor;

impl ReferenceExtractor for PythonExtractor {
    fn name(&self) -> &'static str {
        "python"
    }

    fn matches(&self, language: Language) -> bool {
        language == Language::Python
    }

    fn extract_references(&self, content: &str) -> Vec<String> {
        let mut references = Vec::new();
        for captures in IMPORT.captures_iter(content) {
            if let Some(module) = captures.get(1) {
                push_unique(&mut references, module.as_str());
            } else if let Some(list) = captures.get(2) {
                for item in list.as_str().split(',') {
                    let module = item.split_whitespace().next().unwrap_or_default();
                    push_unique(&mut references, module);
                }
            }
        }
        references
    }
}
