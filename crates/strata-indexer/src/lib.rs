//! Repository scanning, import resolution and graph building

pub mod builder;
pub mod complexity;
pub mod coordinator;
pub mod error;
pub mod extractor;
pub mod languages;
pub mod resolver;
pub mod roles;
pub mod scanner;
pub mod service;

#[cfg(test)]
pub mod tests;

#[cfg(test)]
pub mod test_utils;

pub use builder::GraphBuilder;
pub use complexity::{ComplexityAnalyzer, ComplexityReport, ComplexitySummary, FileComplexity};
pub use coordinator::{Coordinator, Resolution, ResolutionStats};
pub use error::{BuildError, FileError};
pub use extractor::{validate_root, StructuralExtraction, StructuralExtractor};
pub use languages::{ExtractorRegistry, ReferenceExtractor};
pub use resolver::{FileIndex, ImportResolver};
pub use roles::classify_role;
pub use scanner::{RepositoryScanner, WalkScanner};
pub use service::AnalysisService;
