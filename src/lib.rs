/// Errors surfaced by grid construction and solving
pub mod error;

/// Typed grid and reward table
pub mod grid;

/// Per-sweep reporting sinks
pub mod report;

/// Value-iteration and policy-iteration engines
pub mod solver;

/// Actions and the noisy movement model
pub mod transition;
