// Copyright 2025 Irreducible Inc.

//! Process-wide hint registry.

use std::{collections::HashMap, sync::RwLock};

use num_bigint::BigInt;
use num_traits::Zero;
use once_cell::sync::Lazy;
use tracing::warn;

/// Identifies a hint function. Derived from the hint's stable string name so
/// that ids survive serialization across processes.
pub type HintId = u64;

/// A hint function.
///
/// `inputs` and `outputs` are pre-sized by the solver; the function must
/// write every output. Values are interpreted modulo `q` when converted back
/// to field elements.
pub type HintFn = fn(q: &BigInt, inputs: &[BigInt], outputs: &mut [BigInt]) -> anyhow::Result<()>;

/// Derives the stable id of a hint name (64-bit FNV-1a over the name bytes).
pub fn hint_id(name: &str) -> HintId {
	const FNV_OFFSET: u64 = 0xcbf29ce484222325;
	const FNV_PRIME: u64 = 0x100000001b3;
	let mut hash = FNV_OFFSET;
	for byte in name.as_bytes() {
		hash ^= *byte as u64;
		hash = hash.wrapping_mul(FNV_PRIME);
	}
	hash
}

static REGISTRY: Lazy<RwLock<HashMap<HintId, HintFn>>> = Lazy::new(|| {
	let mut registry = HashMap::new();
	registry.insert(hint_id("inv_zero"), inv_zero as HintFn);
	RwLock::new(registry)
});

/// Registers a hint function in the global registry.
///
/// Registration is idempotent: a second registration under an already-known
/// id is ignored with a warning.
pub fn register_hint(name: &str, f: HintFn) {
	let id = hint_id(name);
	let mut registry = REGISTRY.write().expect("hint registry poisoned");
	if registry.contains_key(&id) {
		warn!(name, id, "hint function registered multiple times");
		return;
	}
	registry.insert(id, f);
}

/// Returns a snapshot of every registered hint function.
pub fn registered_hints() -> HashMap<HintId, HintFn> {
	REGISTRY.read().expect("hint registry poisoned").clone()
}

/// Computes `1/a` for the single input `a`. If `a == 0`, returns 0.
pub fn inv_zero(q: &BigInt, inputs: &[BigInt], outputs: &mut [BigInt]) -> anyhow::Result<()> {
	let a = &inputs[0];
	if a.is_zero() {
		outputs[0].set_zero();
		return Ok(());
	}
	outputs[0] = a
		.modinv(q)
		.ok_or_else(|| anyhow::anyhow!("input is not invertible modulo q"))?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_hint_id_is_stable() {
		// FNV-1a of the empty string is the offset basis.
		assert_eq!(hint_id(""), 0xcbf29ce484222325);
		assert_eq!(hint_id("inv_zero"), hint_id("inv_zero"));
		assert_ne!(hint_id("inv_zero"), hint_id("n_bits"));
	}

	#[test]
	fn test_inv_zero_registered_by_default() {
		let hints = registered_hints();
		assert!(hints.contains_key(&hint_id("inv_zero")));
	}

	#[test]
	fn test_register_is_idempotent() {
		fn noop(_: &BigInt, _: &[BigInt], _: &mut [BigInt]) -> anyhow::Result<()> {
			Ok(())
		}
		register_hint("test_noop_hint", noop);
		register_hint("test_noop_hint", noop);
		assert!(registered_hints().contains_key(&hint_id("test_noop_hint")));
	}

	#[test]
	fn test_inv_zero() {
		let q = BigInt::from(17);
		let inputs = [BigInt::from(3)];
		let mut outputs = [BigInt::zero()];
		inv_zero(&q, &inputs, &mut outputs).unwrap();
		// 3 * 6 == 18 == 1 mod 17
		assert_eq!(outputs[0], BigInt::from(6));

		let inputs = [BigInt::zero()];
		inv_zero(&q, &inputs, &mut outputs).unwrap();
		assert!(outputs[0].is_zero());
	}
}
