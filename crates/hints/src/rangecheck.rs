// Copyright 2025 Irreducible Inc.

//! Range-check hints: limb decomposition and occurrence counting.

use std::collections::HashMap;

use anyhow::{bail, Result};
use num_bigint::{BigInt, BigUint};
use num_traits::{One, ToPrimitive};

/// Decomposes a large value into limbs which can be range-checked
/// individually in the native range.
///
/// Inputs are `[var_size_bits, limb_size_bits, value]`; the number of outputs
/// must equal `ceil(var_size / limb_size)`. Limbs are little-endian.
pub fn decompose(_q: &BigInt, inputs: &[BigInt], outputs: &mut [BigInt]) -> Result<()> {
	if inputs.len() != 3 {
		bail!("input must be 3 elements");
	}
	let (Some(var_size), Some(limb_size)) = (inputs[0].to_u64(), inputs[1].to_u64()) else {
		bail!("first two inputs have to be uint64");
	};
	if limb_size == 0 {
		bail!("limb size must be non-zero");
	}
	let nb_limbs = var_size.div_ceil(limb_size) as usize;
	if outputs.len() != nb_limbs {
		bail!("need {nb_limbs} outputs to decompose, got {}", outputs.len());
	}
	let mask = (BigUint::one() << limb_size) - BigUint::one();
	let mut rest = inputs[2].magnitude().clone();
	for out in outputs {
		*out = BigInt::from(&rest & &mask);
		rest >>= limb_size as usize;
	}
	Ok(())
}

/// Counts the occurrences of each value `0..outputs.len()` among the inputs:
/// `outputs[i]` is the number of inputs equal to `i`.
pub fn count(_q: &BigInt, inputs: &[BigInt], outputs: &mut [BigInt]) -> Result<()> {
	let mut counts: HashMap<u64, u64> = HashMap::with_capacity(outputs.len());
	for (i, input) in inputs.iter().enumerate() {
		let Some(value) = input.to_u64() else {
			bail!("input {i} not uint64");
		};
		*counts.entry(value).or_default() += 1;
	}
	for (i, out) in outputs.iter_mut().enumerate() {
		*out = BigInt::from(counts.get(&(i as u64)).copied().unwrap_or(0));
	}
	Ok(())
}
