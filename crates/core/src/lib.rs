// Copyright 2025 Irreducible Inc.

//! R1CS constraint system and parallel witness solver over the BN254 scalar
//! field.
//!
//! A constraint system is a blueprint-compressed program: a list of
//! [`Instruction`]s pointing into one shared `u32` calldata buffer, decoded
//! on the fly by [`Blueprint`]s into rank-1 constraints and hint calls.
//! Instructions are partitioned into [levels], batches with no mutual data
//! dependencies that the solver can execute in parallel.
//!
//! Solving instantiates every wire of the system from a witness: each R1C
//! carries at most one unknown wire at its scheduled level, which a linear
//! solve (with a finite-field division fallback) determines; hint
//! instructions delegate to registered [hint functions]. The output is the
//! full wire vector `W` together with the per-constraint `A`/`B`/`C` columns
//! consumed downstream by the Groth16 prover.
//!
//! [levels]: R1cs::levels
//! [hint functions]: g16_hints

#![warn(missing_docs)]

pub mod blueprint;
pub mod coeff;
pub mod commitment;
pub mod error;
pub mod r1c;
pub mod solver;
pub mod system;
pub mod term;

pub use blueprint::{
	Blueprint, BlueprintHint, BlueprintId, BlueprintR1C, BlueprintSolvable, GenericHint,
	GenericR1C, HintMapping,
};
pub use coeff::CoeffTable;
pub use commitment::Commitment;
pub use error::{SolveError, SystemError};
pub use r1c::{LinearExpression, Resolver, R1C};
pub use solver::{R1csSolution, SolverOpts, SolverView};
pub use system::{Instruction, R1cs, SYSTEM_TYPE_R1CS};
pub use term::{Term, COEFF_MINUS_ONE, COEFF_MINUS_TWO, COEFF_ONE, COEFF_TWO, COEFF_ZERO};
