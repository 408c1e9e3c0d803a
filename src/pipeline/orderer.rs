//! Priority ordering of mechanism runtimes.

use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;

use crate::mechanisms::MechanismRuntime;

/// Conventional priority bands. Only the number drives ordering; tiers exist for
/// validation and documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    /// 0..=9: raw player input to physical values.
    InputConverter,
    /// 10..=19: base values such as muzzle velocity.
    BaseValue,
    /// 20..=39: adjustments to base values.
    Modifier,
    /// 40..=89: turn delay, hooks, anything outside the ballistic attributes.
    NonBallistic,
    /// 90..=99: read-only consumers of the final context.
    Assistance,
}

impl PriorityTier {
    pub const ALL: [PriorityTier; 5] = [
        Self::InputConverter,
        Self::BaseValue,
        Self::Modifier,
        Self::NonBallistic,
        Self::Assistance,
    ];

    pub fn range(self) -> RangeInclusive<i32> {
        match self {
            Self::InputConverter => 0..=9,
            Self::BaseValue => 10..=19,
            Self::Modifier => 20..=39,
            Self::NonBallistic => 40..=89,
            Self::Assistance => 90..=99,
        }
    }

    pub fn contains(self, priority: i32) -> bool {
        self.range().contains(&priority)
    }

    pub fn for_priority(priority: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.contains(priority))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InputConverter => "input_converter",
            Self::BaseValue => "base_value",
            Self::Modifier => "modifier",
            Self::NonBallistic => "non_ballistic",
            Self::Assistance => "assistance",
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let range = self.range();
        write!(f, "{} ({}..={})", self.as_str(), range.start(), range.end())
    }
}

/// Stable ascending sort by a priority key; ties keep their input order.
pub fn ordered_by<T, F>(items: &[T], priority: F) -> Vec<&T>
where
    F: Fn(&T) -> i32,
{
    let mut indexed: Vec<(i32, usize, &T)> = items
        .iter()
        .enumerate()
        .map(|(index, item)| (priority(item), index, item))
        .collect();
    indexed.sort_by_key(|(priority, index, _)| (*priority, *index));
    indexed.into_iter().map(|(_, _, item)| item).collect()
}

pub struct MechanismOrderer;

impl MechanismOrderer {
    /// Runtimes in execution order: ascending priority, equipment order on ties.
    pub fn ordered(runtimes: &[Box<dyn MechanismRuntime>]) -> Vec<&dyn MechanismRuntime> {
        ordered_by(runtimes, |runtime| runtime.priority())
            .into_iter()
            .map(|runtime| &**runtime)
            .collect()
    }
}
