// Copyright 2025 Irreducible Inc.

//! Error definitions for the core crate.

use g16_utils::serialization::SerializationError;

/// Witness solving error.
///
/// Internal invariant violations (two unknown wires in one constraint,
/// division by a zero coefficient, solving the same wire twice) are
/// programming bugs on well-formed systems and panic instead.
#[allow(missing_docs)] // errors are self-documenting
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
	#[error("invalid witness size, got {got}, expected {expected}")]
	InvalidWitnessSize { got: usize, expected: usize },
	#[error("solver missing hint(s): [{}]", .0.join(", "))]
	MissingHints(Vec<String>),
	#[error("hint {name} failed: {source}")]
	Hint { name: String, source: anyhow::Error },
	#[error("constraint #{constraint} is not satisfied: {debug}")]
	Unsatisfied { constraint: u32, debug: String },
	#[error("solver didn't assign a value to all wires ({solved}/{total})")]
	Incomplete { solved: usize, total: usize },
}

/// Constraint system construction or serialization error.
#[allow(missing_docs)] // errors are self-documenting
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
	#[error(transparent)]
	Serialization(#[from] SerializationError),
	#[error("scalar field mismatch: system built over {got}, running field is {expected}")]
	ScalarFieldMismatch { expected: String, got: String },
	#[error("only one commitment per system is supported")]
	DuplicateCommitment,
}
