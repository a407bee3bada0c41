//! # planwise-engine
//!
//! The optimization engine: scheduling strategies, allocation primitives,
//! the daily-workload ledger, and the fitness evaluator used to compare
//! candidate schedules.
//!
//! An optimization run loads tasks, partitions them into *context* tasks
//! (committed allocations that must be respected) and *candidates*
//! (new or rescheduleable work), seeds a [`Ledger`] from the context, and
//! asks a [`Strategy`] to order the candidates and place each one through
//! an [`Allocator`]. A failed allocation rolls its partial commits back,
//! so the ledger never carries phantom hours.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use planwise_core::Task;
//! use planwise_engine::{OptimizeParams, Strategy, strategy::GreedyStrategy};
//!
//! let monday = NaiveDate::from_ymd_opt(2025, 10, 20).unwrap();
//! let params = OptimizeParams::new(
//!     monday.and_hms_opt(9, 0, 0).unwrap(),
//!     6.0,
//!     monday.and_hms_opt(9, 0, 0).unwrap(),
//! );
//! let task = Task::new("report").with_id(1).priority(100).estimated_hours(12.0);
//!
//! let strategy = GreedyStrategy::new(9, 18);
//! let result = strategy.optimize(&[task], &[], &params).unwrap();
//! assert_eq!(result.tasks.len(), 1);
//! assert_eq!(result.ledger.booked(monday), 6.0);
//! ```

pub mod alloc;
pub mod factory;
pub mod fitness;
pub mod ledger;
pub mod order;
pub mod params;
pub mod strategy;
pub mod usecase;
pub mod validate;

pub use alloc::{
    prepare_task_for_allocation, set_planned_times, AllocationError, Allocator,
    BackwardAllocator, BalancedAllocator, GreedyForwardAllocator,
};
pub use factory::{AlgorithmInfo, StrategyFactory};
pub use fitness::ScheduleFitness;
pub use ledger::Ledger;
pub use params::OptimizeParams;
pub use strategy::{OptimizeResult, SchedulingFailure, Strategy};
pub use usecase::{
    OptimizeRequest, OptimizeSummary, OptimizeTasks, SimulateRequest, SimulateSchedule,
    SimulationOutcome, UseCaseError, VIRTUAL_TASK_ID,
};
