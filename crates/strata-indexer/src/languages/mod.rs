//! Reference extractors for different language families

pub mod javascript;
pub mod jvm;
pub mod python;

use strata_core::Language;

pub use javascript::JavaScriptExtractor;
pub use jvm::JvmExtractor;
pub use python::PythonExtractor;

/// Pulls raw import specifiers out of source text.
///
/// Implementations are pattern based and never fail: text they do not
/// understand simply yields no references.
pub trait ReferenceExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn matches(&self, language: Language) -> bool;

    /// Specifiers in source order, without duplicates.
    fn extract_references(&self, content: &str) -> Vec<String>;
}

/// The set of extractors consulted for each file.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn ReferenceExtractor>>,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self {
            extractors: vec![
                Box::new(JavaScriptExtractor),
                Box::new(PythonExtractor),
                Box::new(JvmExtractor),
            ],
        }
    }
}

impl ExtractorRegistry {
    pub fn empty() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    pub fn register(&mut self, extractor: Box<dyn ReferenceExtractor>) {
        self.extractors.push(extractor);
    }

    /// First registered extractor that handles `language`.
    pub fn for_language(&self, language: Language) -> Option<&dyn ReferenceExtractor> {
        self.extractors
            .iter()
            .find(|e| e.matches(language))
            .map(|e| e.as_ref())
    }
}

/// Append `specifier` unless already present.
pub(crate) fn push_unique(out: &mut Vec<String>, specifier: &str) {
    let specifier = specifier.trim();
    if !specifier.is_empty() && !out.iter().any(|s| s == specifier) {
        out.push(specifier.to_string());
    }
}
