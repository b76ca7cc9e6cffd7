//! Pattern-based per-file complexity metrics

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;

static FUNCTIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"function\s+\w+|const\s+\w+\s*=\s*(?:async\s*)?\(")
        .expect("function pattern is valid")
});

static CLASSES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"class\s+\w+").expect("class pattern is valid"));

static CONDITIONALS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"if\s*\(|switch\s*\(|\?\s*.*:").expect("conditional pattern is valid")
});

static LOOPS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"for\s*\(|while\s*\(|\.forEach|\.map|\.filter|\.reduce")
        .expect("loop pattern is valid")
});

/// Number of files listed in each summary extreme.
const SUMMARY_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileComplexity {
    pub file: String,
    pub lines: usize,
    pub code_lines: usize,
    pub functions: usize,
    pub classes: usize,
    pub conditionals: usize,
    pub loops: usize,
    pub complexity_score: u64,
}

impl FileComplexity {
    pub fn measure(file: &str, content: &str) -> Self {
        let lines: Vec<&str> = content.split('\n').collect();
        let code_lines = lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty() && !l.starts_with("//"))
            .count();

        let functions = FUNCTIONS.find_iter(content).count();
        let classes = CLASSES.find_iter(content).count();
        let conditionals = CONDITIONALS.find_iter(content).count();
        let loops = LOOPS.find_iter(content).count();

        let score = (conditionals * 2 + loops * 2 + functions) as f64 + lines.len() as f64 / 50.0;
        Self {
            file: file.to_string(),
            lines: lines.len(),
            code_lines,
            functions,
            classes,
            conditionals,
            loops,
            complexity_score: score.round() as u64,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexitySummary {
    pub total_files: usize,
    pub average_complexity: u64,
    pub most_complex: Vec<FileComplexity>,
    pub least_complex: Vec<FileComplexity>,
}

/// Files sorted by descending score, plus a summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComplexityReport {
    pub files: Vec<FileComplexity>,
    pub summary: ComplexitySummary,
}

impl ComplexityReport {
    pub fn from_files(mut files: Vec<FileComplexity>) -> Self {
        files.sort_by(|a, b| b.complexity_score.cmp(&a.complexity_score));

        let total: u64 = files.iter().map(|f| f.complexity_score).sum();
        let average_complexity = if files.is_empty() {
            0
        } else {
            (total as f64 / files.len() as f64).round() as u64
        };
        let most_complex = files.iter().take(SUMMARY_LEN).cloned().collect();
        let least_complex = files.iter().rev().take(SUMMARY_LEN).cloned().collect();

        Self {
            summary: ComplexitySummary {
                total_files: files.len(),
                average_complexity,
                most_complex,
                least_complex,
            },
            files,
        }
    }
}

/// Measures every readable file below the size ceiling.
#[derive(Debug, Clone, Copy)]
pub struct ComplexityAnalyzer {
    max_file_size_bytes: u64,
}

impl ComplexityAnalyzer {
    pub fn new(max_file_size_bytes: u64) -> Self {
        Self {
            max_file_size_bytes,
        }
    }

    pub fn analyze(&self, root: &Path, paths: &[String]) -> ComplexityReport {
        tracing::info!("Analyzing complexity of {} files", paths.len());
        let files: Vec<FileComplexity> = paths
            .par_iter()
            .filter_map(|relative| self.analyze_file(root, relative))
            .collect();
        ComplexityReport::from_files(files)
    }

    fn analyze_file(&self, root: &Path, relative: &str) -> Option<FileComplexity> {
        let path = root.join(relative);
        let size = fs::metadata(&path).ok()?.len();
        if size > self.max_file_size_bytes {
            tracing::debug!("Skipping complexity of {} ({} bytes)", relative, size);
            return None;
        }
        match fs::read(&path) {
            Ok(bytes) => Some(FileComplexity::measure(
                relative,
                &String::from_utf8_lossy(&bytes),
            )),
            Err(err) => {
                tracing::debug!("Cannot read {}: {}", relative, err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_repo;

    #[test]
    fn test_measure_counts_patterns() {
        let src = "\
// header comment
function load(items) {
  if (items.length) {
    return items.map(x => x * 2);
  }
  for (const i of items) {}
}

class Store {}
const handler = async (req) => req;
";
        let m = FileComplexity::measure("app.js", src);
        assert_eq!(m.lines, 11);
        assert_eq!(m.code_lines, 8);
        assert_eq!(m.functions, 2);
        assert_eq!(m.classes, 1);
        assert_eq!(m.conditionals, 1);
        assert_eq!(m.loops, 2);
        // 2*1 + 2*2 + 2 + 11/50
        assert_eq!(m.complexity_score, 8);
    }

    #[test]
    fn test_report_ordering_and_summary() {
        let files = (0..7)
            .map(|i| FileComplexity::measure(&format!("f{i}.js"), &"if (x) {}\n".repeat(i)))
            .collect();
        let report = ComplexityReport::from_files(files);

        let order: Vec<&str> = report.files.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(order, vec!["f6.js", "f5.js", "f4.js", "f3.js", "f2.js", "f1.js", "f0.js"]);
        assert_eq!(report.summary.total_files, 7);
        assert_eq!(report.summary.average_complexity, 6);
        assert_eq!(report.summary.most_complex.len(), 5);
        assert_eq!(report.summary.least_complex[0].file, "f0.js");
        assert_eq!(report.summary.least_complex[4].file, "f4.js");
    }

    #[test]
    fn test_analyzer_skips_oversized_and_missing() {
        let repo = write_repo(&[("small.js", "if (a) {}"), ("large.js", "x\n".repeat(200).as_str())]);
        let paths: Vec<String> = ["small.js", "large.js", "gone.js"]
            .iter()
            .map(|p| p.to_string())
            .collect();
        let report = ComplexityAnalyzer::new(100).analyze(repo.path(), &paths);
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].file, "small.js");
        assert_eq!(report.files[0].conditionals, 1);
    }

    #[test]
    fn test_empty_report() {
        let report = ComplexityReport::from_files(Vec::new());
        assert_eq!(report.summary, ComplexitySummary::default());
    }
}
