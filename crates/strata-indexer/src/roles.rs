//! Heuristic file role classification from path patterns

use std::sync::LazyLock;

use regex::Regex;
use strata_core::FileRole;

/// Which part of the path a rule looks at.
enum Target {
    /// Lowercased relative path.
    Path,
    /// Lowercased file name.
    FileName,
    /// File name as written.
    RawFileName,
}

struct RoleRule {
    role: FileRole,
    target: Target,
    pattern: Regex,
}

impl RoleRule {
    fn new(role: FileRole, target: Target, pattern: &str) -> Self {
        Self {
            role,
            target,
            pattern: Regex::new(pattern).expect("role patterns are valid"),
        }
    }
}

/// Checked in order; the first match wins.
static RULES: LazyLock<Vec<RoleRule>> = LazyLock::new(|| {
    use FileRole::*;
    use Target::*;
    vec![
        RoleRule::new(Test, Path, r"\.(test|spec)\.(js|ts|jsx|tsx|py)$"),
        RoleRule::new(Test, Path, r"^(test|tests|__tests__)/"),
        RoleRule::new(Component, Path, r"(component|page|view|screen)\.(jsx?|tsx?)$"),
        RoleRule::new(
            Config,
            FileName,
            r"^(config|\.config|configuration|webpack|babel|tsconfig|vite|rollup)",
        ),
        RoleRule::new(Config, Path, r"\.(config|rc)\.(js|ts|json)$"),
        RoleRule::new(Service, Path, r"(service|api|handler|middleware)\.(js|ts|py)$"),
        RoleRule::new(Hook, RawFileName, r"^use[A-Z]\w*\.(js|ts|jsx|tsx)$"),
        RoleRule::new(Route, Path, r"(route|routing|router|pages)\.(js|ts|jsx|tsx)$"),
        RoleRule::new(Route, Path, r"^routes?/"),
        RoleRule::new(Model, Path, r"(model|schema|type|interface|entity)\.(js|ts|py)$"),
        RoleRule::new(Entry, Path, r"(index|main|entry)\.(js|ts|jsx|tsx|py)$"),
        RoleRule::new(Utility, Path, r"(util|helper|common|shared|lib|tool)\.(js|ts|py)$"),
    ]
});

/// Classify a repository-relative, forward-slash path.
pub fn classify_role(relative_path: &str) -> FileRole {
    let lower = relative_path.to_ascii_lowercase();
    let file_name = relative_path.rsplit('/').next().unwrap_or(relative_path);
    let lower_name = lower.rsplit('/').next().unwrap_or(&lower);

    for rule in RULES.iter() {
        let subject = match rule.target {
            Target::Path => lower.as_str(),
            Target::FileName => lower_name,
            Target::RawFileName => file_name,
        };
        if rule.pattern.is_match(subject) {
            return rule.role;
        }
    }

    let extension = lower_name.rsplit_once('.').map_or("", |(_, ext)| ext);
    match extension {
        "css" | "scss" | "sass" | "less" => FileRole::Style,
        "json" | "yaml" | "yml" | "xml" => FileRole::Config,
        _ => FileRole::Module,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tests_take_precedence() {
        assert_eq!(classify_role("src/api.test.ts"), FileRole::Test);
        assert_eq!(classify_role("tests/helpers/service.js"), FileRole::Test);
        assert_eq!(classify_role("__tests__/App.jsx"), FileRole::Test);
        // Nested test dirs are not test roots.
        assert_eq!(classify_role("src/tests/thing.rs"), FileRole::Module);
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(classify_role("src/components/LoginPage.tsx"), FileRole::Component);
        assert_eq!(classify_role("webpack.config.js"), FileRole::Config);
        assert_eq!(classify_role("src/.eslintrc.json"), FileRole::Config);
        assert_eq!(classify_role("server/userService.js"), FileRole::Service);
        assert_eq!(classify_role("src/hooks/useAuth.ts"), FileRole::Hook);
        assert_eq!(classify_role("src/router.ts"), FileRole::Route);
        assert_eq!(classify_role("routes/users.js"), FileRole::Route);
        assert_eq!(classify_role("src/models/userSchema.py"), FileRole::Model);
        assert_eq!(classify_role("src/index.js"), FileRole::Entry);
        assert_eq!(classify_role("src/dateUtil.ts"), FileRole::Utility);
        assert_eq!(classify_role("styles/app.scss"), FileRole::Style);
        assert_eq!(classify_role("data/fixtures.yaml"), FileRole::Config);
        assert_eq!(classify_role("src/engine.rs"), FileRole::Module);
    }

    #[test]
    fn test_hook_requires_capital_after_use() {
        assert_eq!(classify_role("src/user.js"), FileRole::Module);
        assert_eq!(classify_role("src/useful.js"), FileRole::Module);
        assert_eq!(classify_role("src/useFetch.js"), FileRole::Hook);
    }
}
