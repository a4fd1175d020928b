// Copyright 2025 Irreducible Inc.

//! Bit, trit and NAF decomposition hints.

use anyhow::{bail, Result};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, ToPrimitive, Zero};

/// Writes the low bits of the input, one per output, little-endian. The
/// number of returned bits is defined by the length of the outputs slice.
pub fn n_bits(_q: &BigInt, inputs: &[BigInt], outputs: &mut [BigInt]) -> Result<()> {
	let n = inputs[0].magnitude();
	for (i, out) in outputs.iter_mut().enumerate() {
		*out = BigInt::from(n.bit(i as u64) as u8);
	}
	Ok(())
}

/// Writes the i-th bit of the first input, where `i` is the second input.
/// An index that does not fit a `u64` yields 0.
pub fn ith_bit(_q: &BigInt, inputs: &[BigInt], outputs: &mut [BigInt]) -> Result<()> {
	let Some(i) = inputs[1].to_u64() else {
		outputs[0].set_zero();
		return Ok(());
	};
	outputs[0] = BigInt::from(inputs[0].magnitude().bit(i) as u8);
	Ok(())
}

/// Writes the low base-3 digits of the input, one per output, little-endian.
pub fn n_trits(_q: &BigInt, inputs: &[BigInt], outputs: &mut [BigInt]) -> Result<()> {
	let digits = inputs[0].magnitude().to_radix_le(3);
	for (i, out) in outputs.iter_mut().enumerate() {
		*out = BigInt::from(digits.get(i).copied().unwrap_or(0));
	}
	Ok(())
}

/// Writes the non-adjacent form of the input, one signed digit (−1, 0, 1) per
/// output, little-endian.
pub fn nnaf(_q: &BigInt, inputs: &[BigInt], outputs: &mut [BigInt]) -> Result<()> {
	if inputs[0].sign() == Sign::Minus {
		bail!("invalid input to naf decomposition; negative big integers not supported");
	}

	let one = BigUint::one();
	let three = BigUint::from(3u8);

	let mut a = inputs[0].magnitude().clone();
	let mut n = 0;
	while !a.is_zero() && n < outputs.len() {
		if (&a & &one).is_zero() {
			outputs[n].set_zero();
		} else if (&a & &three) == three {
			outputs[n] = BigInt::from(-1);
			a += &one;
		} else {
			outputs[n] = BigInt::one();
		}
		a >>= 1u32;
		n += 1;
	}
	for out in &mut outputs[n..] {
		out.set_zero();
	}
	Ok(())
}
