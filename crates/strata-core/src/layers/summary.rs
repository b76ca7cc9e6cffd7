//! Unit role classification from degree metrics

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum UnitRole {
    #[serde(rename = "Core Dependency")]
    CoreDependency,
    #[serde(rename = "Integration Point")]
    IntegrationPoint,
    #[serde(rename = "Entry Point")]
    EntryPoint,
    #[serde(rename = "Leaf Unit")]
    LeafUnit,
    #[default]
    Isolated,
    Standard,
}

impl UnitRole {
    pub fn description(self) -> &'static str {
        match self {
            UnitRole::CoreDependency => "Many units depend on this. Changes require careful review.",
            UnitRole::IntegrationPoint => "Connects many parts. May be a good refactoring candidate.",
            UnitRole::EntryPoint => "Entry point with no dependencies coming in.",
            UnitRole::LeafUnit => "End of dependency chain. Safe to modify in isolation.",
            UnitRole::Isolated => "No detected dependencies. May be unused or self-contained.",
            UnitRole::Standard => "Standard connectivity pattern.",
        }
    }

    /// First matching rule wins.
    pub fn classify(in_degree: usize, out_degree: usize) -> Self {
        if in_degree > out_degree * 2 && in_degree > 5 {
            UnitRole::CoreDependency
        } else if out_degree > in_degree * 2 && out_degree > 5 {
            UnitRole::IntegrationPoint
        } else if in_degree == 0 && out_degree > 0 {
            UnitRole::EntryPoint
        } else if out_degree == 0 && in_degree > 0 {
            UnitRole::LeafUnit
        } else if in_degree == 0 && out_degree == 0 {
            UnitRole::Isolated
        } else {
            UnitRole::Standard
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct UnitMetrics {
    pub depended_by: usize,
    pub depends_on: usize,
    pub internal_units: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UnitSummary {
    pub role: UnitRole,
    pub description: &'static str,
    pub metrics: UnitMetrics,
}

impl UnitSummary {
    pub fn for_degrees(in_degree: usize, out_degree: usize, members: usize) -> Self {
        let role = UnitRole::classify(in_degree, out_degree);
        UnitSummary {
            role,
            description: role.description(),
            metrics: UnitMetrics {
                depended_by: in_degree,
                depends_on: out_degree,
                internal_units: members,
            },
        }
    }
}
