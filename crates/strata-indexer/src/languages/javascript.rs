//! JavaScript / TypeScript import extraction

use std::sync::LazyLock;

use regex::Regex;
use strata_core::Language;

use super::{push_unique, ReferenceExtractor};

/// `import x from 'a'`, `import {a, b} from 'a'`, `export * from 'a'`, `import type … from 'a'`.
static FROM_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:import|export)\s+(?:type\s+)?[\w*{}\s,$]*?\s*from\s*['"]([^'"\n]+)['"]"#)
        .expect("from-clause pattern is valid")
});

/// `import './polyfill'`
static SIDE_EFFECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s*['"]([^'"\n]+)['"]"#).expect("side-effect pattern is valid")
});

/// `require('a')`
static REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\brequire\s*\(\s*['"`]([^'"`\n]+)['"`]\s*\)"#).expect("require pattern is valid")
});

/// `import('a')`
static DYNAMIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s*\(\s*['"`]([^'"`\n]+)['"`]\s*\)"#).expect("dynamic import pattern is valid")
});

pub struct JavaScriptExtractor;

impl ReferenceExtractor for JavaScriptExtractor {
    fn name(&self) -> &'static str {
        "javascript"
    }

    fn matches(&self, language: Language) -> bool {
        matches!(language, Language::JavaScript | Language::TypeScript)
    }

    fn extract_references(&self, content: &str) -> Vec<String> {
        let mut references = Vec::new();
        for pattern in [&*FROM_CLAUSE, &*SIDE_EFFECT, &*REQUIRE, &*DYNAMIC] {
            for captures in pattern.captures_iter(content) {
                if let Some(specifier) = captures.get(1) {
                    push_unique(&mut references, specifier.as_str());
                }
            }
        }
        references
    }
}
