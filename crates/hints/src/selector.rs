// Copyright 2025 Irreducible Inc.

//! Selector hints: multiplexer and map indicators, step masks.
//!
//! These back the lookup gadgets that select from arbitrary-sized vectors by
//! index or by key with a linear scan.

use anyhow::{bail, Result};
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;

/// Writes the one-hot indicator vector of the selector: `outputs[i] == 1` iff
/// `inputs[0] == i`.
pub fn mux_indicators(_q: &BigInt, inputs: &[BigInt], outputs: &mut [BigInt]) -> Result<()> {
	let sel = &inputs[0];
	for (i, out) in outputs.iter_mut().enumerate() {
		*out = BigInt::from((*sel == BigInt::from(i)) as u8);
	}
	Ok(())
}

/// Writes the one-hot indicator vector of the key: `outputs[i] == 1` iff
/// `inputs[i]` equals the key, which is the last input.
pub fn map_indicators(_q: &BigInt, inputs: &[BigInt], outputs: &mut [BigInt]) -> Result<()> {
	let Some(key) = inputs.last() else {
		bail!("map indicators hint called without a key input");
	};
	for (i, out) in outputs.iter_mut().enumerate() {
		*out = BigInt::from((inputs[i] == *key) as u8);
	}
	Ok(())
}

/// Writes a step vector: `inputs[1]` before the step position `inputs[0]`,
/// `inputs[2]` from the step position on.
pub fn step_output(_q: &BigInt, inputs: &[BigInt], outputs: &mut [BigInt]) -> Result<()> {
	let step = match inputs[0].to_usize() {
		Some(step) => step,
		None if inputs[0].sign() == Sign::Minus => 0,
		None => usize::MAX,
	};
	for (i, out) in outputs.iter_mut().enumerate() {
		*out = if i < step { inputs[1].clone() } else { inputs[2].clone() };
	}
	Ok(())
}
