//! Competitive stages and stage filters.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown stage: {0} (expected qualifiers, groups or playoffs)")]
pub struct UnknownStage(pub String);

/// A stage of the tournament that drafts are recorded under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Qualifiers,
    Groups,
    Playoffs,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Qualifiers, Stage::Groups, Stage::Playoffs];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Qualifiers => "qualifiers",
            Stage::Groups => "groups",
            Stage::Playoffs => "playoffs",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::Qualifiers => "Qualifiers",
            Stage::Groups => "Groups",
            Stage::Playoffs => "Playoffs/Finals",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "qualifiers" => Ok(Stage::Qualifiers),
            "groups" => Ok(Stage::Groups),
            "playoffs" | "finals" => Ok(Stage::Playoffs),
            _ => Err(UnknownStage(s.to_string())),
        }
    }
}

/// The set of stages included in an analysis pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFilter {
    stages: BTreeSet<Stage>,
}

impl Default for StageFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl StageFilter {
    pub fn all() -> Self {
        Self {
            stages: Stage::ALL.into_iter().collect(),
        }
    }

    pub fn only(stages: impl IntoIterator<Item = Stage>) -> Self {
        Self {
            stages: stages.into_iter().collect(),
        }
    }

    /// Parse a comma-separated stage list. `None` or an empty list selects all.
    pub fn parse(list: Option<&str>) -> Result<Self, UnknownStage> {
        let Some(list) = list.filter(|l| !l.trim().is_empty()) else {
            return Ok(Self::all());
        };
        let stages = list
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(Stage::from_str)
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { stages })
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    pub fn iter(&self) -> impl Iterator<Item = Stage> + '_ {
        self.stages.iter().copied()
    }

    /// Display names of the enabled stages, in stage order.
    pub fn display_names(&self) -> Vec<&'static str> {
        self.iter().map(|s| s.display_name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_from_str() {
        assert_eq!("groups".parse::<Stage>(), Ok(Stage::Groups));
        assert_eq!(" Playoffs ".parse::<Stage>(), Ok(Stage::Playoffs));
        assert_eq!("finals".parse::<Stage>(), Ok(Stage::Playoffs));
        assert!("swiss".parse::<Stage>().is_err());
    }

    #[test]
    fn test_stage_serialization() {
        let json = serde_json::to_string(&Stage::Qualifiers).unwrap();
        assert_eq!(json, "\"qualifiers\"");
    }

    #[test]
    fn test_filter_parse() {
        let filter = StageFilter::parse(Some("groups,playoffs")).unwrap();
        assert!(!filter.contains(Stage::Qualifiers));
        assert!(filter.contains(Stage::Groups));
        assert_eq!(filter.display_names(), vec!["Groups", "Playoffs/Finals"]);
    }

    #[test]
    fn test_filter_parse_defaults_to_all() {
        assert_eq!(StageFilter::parse(None).unwrap(), StageFilter::all());
        assert_eq!(StageFilter::parse(Some(" ")).unwrap(), StageFilter::all());
    }

    #[test]
    fn test_filter_parse_rejects_unknown() {
        let err = StageFilter::parse(Some("groups,swiss")).unwrap_err();
        assert_eq!(err, UnknownStage("swiss".to_string()));
    }
}
