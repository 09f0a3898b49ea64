//! Expert Registry
//!
//! The closed set of specialist analysts. Each expert owns one analysis
//! instruction; the registry is read-only and changes only at deploy time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::prompts;

/// Lookup of a name that is not in the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown expert: {0}")]
pub struct UnknownExpert(pub String);

/// A specialist analysis profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Expert {
    Cbt,
    Eft,
    GottmanMethod,
    SolutionFocused,
    FinancialPsychology,
    Psychiatrist,
    ObGyn,
    Urologist,
    Lawyer,
}

impl Expert {
    /// Every registered expert, in registry order.
    pub const ALL: [Expert; 9] = [
        Expert::Cbt,
        Expert::Eft,
        Expert::GottmanMethod,
        Expert::SolutionFocused,
        Expert::FinancialPsychology,
        Expert::Psychiatrist,
        Expert::ObGyn,
        Expert::Urologist,
        Expert::Lawyer,
    ];

    /// The registry name, as shown to the router and stored in rosters.
    pub fn name(&self) -> &'static str {
        match self {
            Expert::Cbt => "CBT Expert",
            Expert::Eft => "EFT Expert",
            Expert::GottmanMethod => "Gottman Method Expert",
            Expert::SolutionFocused => "Solution-Focused Expert",
            Expert::FinancialPsychology => "Financial Psychology Expert",
            Expert::Psychiatrist => "Psychiatrist",
            Expert::ObGyn => "OB/GYN Expert",
            Expert::Urologist => "Urologist Expert",
            Expert::Lawyer => "Lawyer Expert",
        }
    }

    /// The system instruction used for this expert's analysis call.
    pub fn instruction(&self) -> &'static str {
        match self {
            Expert::Cbt => prompts::CBT_EXPERT,
            Expert::Eft => prompts::EFT_EXPERT,
            Expert::GottmanMethod => prompts::GOTTMAN_METHOD_EXPERT,
            Expert::SolutionFocused => prompts::SOLUTION_FOCUSED_EXPERT,
            Expert::FinancialPsychology => prompts::FINANCIAL_PSYCHOLOGY_EXPERT,
            Expert::Psychiatrist => prompts::PSYCHIATRIST,
            Expert::ObGyn => prompts::OBGYN_EXPERT,
            Expert::Urologist => prompts::UROLOGIST_EXPERT,
            Expert::Lawyer => prompts::LAWYER_EXPERT,
        }
    }

    /// Looks an expert up by its exact registry name.
    pub fn from_name(name: &str) -> Result<Self, UnknownExpert> {
        Self::ALL
            .iter()
            .copied()
            .find(|expert| expert.name() == name)
            .ok_or_else(|| UnknownExpert(name.to_string()))
    }
}

impl fmt::Display for Expert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Expert {
    type Err = UnknownExpert;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl TryFrom<String> for Expert {
    type Error = UnknownExpert;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_name(&value)
    }
}

impl From<Expert> for String {
    fn from(expert: Expert) -> Self {
        expert.name().to_string()
    }
}

/// Looks up an instruction by name.
pub fn instruction_for(name: &str) -> Result<&'static str, UnknownExpert> {
    Expert::from_name(name).map(|expert| expert.instruction())
}

/// All registry names, in registry order.
pub fn registry_names() -> Vec<&'static str> {
    Expert::ALL.iter().map(Expert::name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_nine_unique_names() {
        let names = registry_names();
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();

        assert_eq!(names.len(), 9);
        assert_eq!(deduped.len(), 9);
    }

    #[test]
    fn every_name_resolves_back_to_its_expert() {
        for expert in Expert::ALL {
            assert_eq!(Expert::from_name(expert.name()), Ok(expert));
            assert!(!expert.instruction().trim().is_empty());
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = instruction_for("Astrologer").unwrap_err();
        assert_eq!(err, UnknownExpert("Astrologer".to_string()));
        assert_eq!(err.to_string(), "Unknown expert: Astrologer");
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(Expert::from_name("cbt expert").is_err());
    }

    #[test]
    fn serializes_as_registry_name() {
        let json = serde_json::to_string(&Expert::ObGyn).unwrap();
        assert_eq!(json, "\"OB/GYN Expert\"");

        let parsed: Expert = serde_json::from_str("\"Lawyer Expert\"").unwrap();
        assert_eq!(parsed, Expert::Lawyer);
    }
}
