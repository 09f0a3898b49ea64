//! Selected expert roster for a session.

use serde::{Deserialize, Serialize};

use super::experts::Expert;

/// Upper bound on roster size accepted from the router.
pub const MAX_ROSTER_SIZE: usize = 5;

/// Ordered, duplicate-free list of expert names, fixed after the first turn.
///
/// Names are kept as stored strings rather than [`Expert`] values so a
/// roster persisted by an older deployment still loads; the fan-out skips
/// names the current registry does not know. Loading goes through
/// [`SelectedExperts::from_names`], so a stored list with repeats still
/// yields a duplicate-free roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SelectedExperts(Vec<String>);

impl From<Vec<String>> for SelectedExperts {
    fn from(names: Vec<String>) -> Self {
        Self::from_names(names)
    }
}

impl From<SelectedExperts> for Vec<String> {
    fn from(roster: SelectedExperts) -> Self {
        roster.0
    }
}

impl SelectedExperts {
    /// Builds a roster, dropping repeated names but keeping first-seen order.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self(unique)
    }

    /// Keeps only the first `max` names.
    pub fn truncated(mut self, max: usize) -> Self {
        self.0.truncate(max);
        self
    }

    pub fn from_experts(experts: &[Expert]) -> Self {
        Self::from_names(experts.iter().map(Expert::name))
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Registry experts in roster order; unknown names are skipped.
    pub fn known_experts(&self) -> Vec<Expert> {
        self.0
            .iter()
            .filter_map(|name| Expert::from_name(name).ok())
            .collect()
    }
}

/// Generalist team used whenever routing does not produce a usable roster.
pub fn default_roster() -> SelectedExperts {
    SelectedExperts::from_experts(&[Expert::Cbt, Expert::Eft, Expert::Psychiatrist])
}
