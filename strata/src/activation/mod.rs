//! Planning and applying unit activation.
//!
//! The planner compares the rendered units of the current pass against
//! the previously applied system state and emits an explicit, ordered
//! plan of start/stop/restart/no-op actions. The executor then applies
//! that plan to a service backend; nothing before execution has any
//! externally visible effect, so an abandoned pass leaves the system
//! untouched.

mod executor;
mod graph;
mod planner;

pub use executor::{ExecutionResult, PlanExecutor};
pub use graph::UnitGraph;
pub use planner::{Action, ActivationPlan, ActivationPlanner};
