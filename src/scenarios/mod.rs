//! Scenario groups shipped with the suite.

/// Checks against the GUVI site.
pub mod guvi;

use crate::suite::ScenarioGroup;

/// Returns every group, in run order.
#[must_use]
pub fn groups() -> Vec<ScenarioGroup> {
    vec![guvi::group()]
}
