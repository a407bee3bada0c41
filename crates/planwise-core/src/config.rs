//! Configuration values consumed by the engine.
//!
//! Loading (files, environment) is the embedder's concern; the engine only
//! ever sees this value struct, injected at construction.

use serde::{Deserialize, Serialize};

/// Scheduler configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Hour of day when planned work begins (e.g. 9 for 09:00)
    pub default_start_hour: u32,
    /// Hour of day when planned work ends (e.g. 18 for 18:00)
    pub default_end_hour: u32,
    /// Daily capacity shared by all tasks, in hours
    pub max_hours_per_day: f64,
    /// Priority assigned to tasks created without one
    pub default_priority: i32,
    /// Algorithm used when the caller names none
    pub default_algorithm: String,
    /// Passed through to a country-aware holiday oracle, if one is wired
    pub country_code: Option<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_start_hour: 9,
            default_end_hour: 18,
            max_hours_per_day: 8.0,
            default_priority: 3,
            default_algorithm: "greedy".into(),
            country_code: None,
        }
    }
}
