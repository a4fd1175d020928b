// Copyright 2025 Irreducible Inc.

//! Hint functions and the process-wide hint registry.
//!
//! Hints are prover-side computations producing wire values that are
//! nondeterministic from the constraint system's perspective: modular
//! inverses, digit decompositions, selector indicators. A constraint system
//! records which hints it needs by id; the solver looks the functions up in
//! the registry (or in per-call overrides) at solving time.
//!
//! A solver service consuming serialized constraint systems has no way to
//! know which hints the circuit was compiled against, so the standard set can
//! be registered wholesale with [`register_std_hints`].

pub mod bits;
mod registry;
pub mod rangecheck;
pub mod selector;

use std::sync::Once;

pub use registry::{hint_id, inv_zero, register_hint, registered_hints, HintFn, HintId};

static REGISTER_STD: Once = Once::new();

/// Registers the standard hint set in the global registry.
///
/// Idempotent; safe to call from multiple binaries linking this crate.
pub fn register_std_hints() {
	REGISTER_STD.call_once(|| {
		register_hint("n_bits", bits::n_bits);
		register_hint("ith_bit", bits::ith_bit);
		register_hint("n_trits", bits::n_trits);
		register_hint("nnaf", bits::nnaf);
		register_hint("step_output", selector::step_output);
		register_hint("mux_indicators", selector::mux_indicators);
		register_hint("map_indicators", selector::map_indicators);
		register_hint("decompose", rangecheck::decompose);
		register_hint("count", rangecheck::count);
	});
}
