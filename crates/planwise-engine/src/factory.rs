//! Strategy factory: algorithm names to strategy instances.

use planwise_core::SchedulerError;

use crate::strategy::{
    BalancedStrategy, DeadlinePackedStrategy, GreedyStrategy, HardDeadlineStrategy,
    MonteCarloStrategy, ShortTasksFirstStrategy, Strategy,
};

/// Descriptive metadata for one algorithm, for pickers and help output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlgorithmInfo {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
}

const ALGORITHMS: &[AlgorithmInfo] = &[
    AlgorithmInfo {
        name: "greedy",
        display_name: "Greedy",
        description: "Highest priority first, each task finishing as early as possible",
    },
    AlgorithmInfo {
        name: "balanced",
        display_name: "Balanced",
        description: "Spreads each task's hours evenly across its window",
    },
    AlgorithmInfo {
        name: "monte_carlo",
        display_name: "Monte Carlo",
        description: "Random sampling over task orderings, keeping the best schedule",
    },
    AlgorithmInfo {
        name: "hard_deadline",
        display_name: "Hard Deadline",
        description: "Greedy placement that refuses plans overrunning a deadline",
    },
    AlgorithmInfo {
        name: "deadline_packed",
        display_name: "Deadline Packed",
        description: "Packs work backward against each task's deadline",
    },
    AlgorithmInfo {
        name: "short_tasks_first",
        display_name: "Short Tasks First",
        description: "Clears the smallest tasks before starting larger ones",
    },
];

/// Creates strategies by name.
pub struct StrategyFactory;

impl StrategyFactory {
    /// Instantiate the named algorithm.
    pub fn create(
        name: &str,
        default_start_hour: u32,
        default_end_hour: u32,
    ) -> Result<Box<dyn Strategy>, SchedulerError> {
        match name {
            "greedy" => Ok(Box::new(GreedyStrategy::new(default_start_hour, default_end_hour))),
            "balanced" => Ok(Box::new(BalancedStrategy::new(default_start_hour, default_end_hour))),
            "monte_carlo" => Ok(Box::new(MonteCarloStrategy::new(
                default_start_hour,
                default_end_hour,
            ))),
            "hard_deadline" => Ok(Box::new(HardDeadlineStrategy::new(
                default_start_hour,
                default_end_hour,
            ))),
            "deadline_packed" => Ok(Box::new(DeadlinePackedStrategy::new(
                default_start_hour,
                default_end_hour,
            ))),
            "short_tasks_first" => Ok(Box::new(ShortTasksFirstStrategy::new(
                default_start_hour,
                default_end_hour,
            ))),
            other => Err(SchedulerError::UnknownAlgorithm(other.to_string())),
        }
    }

    /// Names of every available algorithm, in presentation order.
    pub fn list_available() -> Vec<&'static str> {
        ALGORITHMS.iter().map(|info| info.name).collect()
    }

    /// Metadata for every available algorithm.
    pub fn algorithm_metadata() -> &'static [AlgorithmInfo] {
        ALGORITHMS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_algorithm_can_be_created() {
        for name in StrategyFactory::list_available() {
            let strategy = StrategyFactory::create(name, 9, 18).unwrap();
            assert_eq!(strategy.name(), name);
        }
    }

    #[test]
    fn unknown_algorithm_is_an_error() {
        let err = StrategyFactory::create("simulated_annealing", 9, 18).unwrap_err();
        assert_eq!(
            err,
            SchedulerError::UnknownAlgorithm("simulated_annealing".into())
        );
    }

    #[test]
    fn metadata_covers_every_algorithm() {
        let names = StrategyFactory::list_available();
        let metadata = StrategyFactory::algorithm_metadata();
        assert_eq!(names.len(), metadata.len());
        for info in metadata {
            assert!(!info.display_name.is_empty());
            assert!(!info.description.is_empty());
        }
    }
}
