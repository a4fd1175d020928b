// Copyright 2025 Irreducible Inc.

//! Element conversions and the canonical byte codec.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use bytes::{Buf, BufMut};
use g16_utils::serialization::{
	assert_enough_data_for, assert_enough_space_for, read_count_be, write_count_be,
	SerializationError,
};
use num_bigint::{BigInt, BigUint, Sign};
use once_cell::sync::Lazy;

/// Byte length of a canonically encoded element.
pub const FR_BYTES: usize = 32;

static MODULUS: Lazy<BigUint> = Lazy::new(|| Fr::MODULUS.into());
static MODULUS_INT: Lazy<BigInt> = Lazy::new(|| BigInt::from(MODULUS.clone()));

/// The scalar field order `r` as an unsigned big integer.
pub fn modulus() -> &'static BigUint {
	&MODULUS
}

/// The scalar field order `r` as a signed big integer, for the hint contract.
pub fn modulus_bigint() -> &'static BigInt {
	&MODULUS_INT
}

/// Lowercase hex rendering of `r`, the serialization header of a constraint
/// system.
pub fn modulus_hex() -> String {
	MODULUS.to_str_radix(16)
}

/// Converts an element to its canonical non-negative big-integer
/// representative.
pub fn fr_to_bigint(e: &Fr) -> BigInt {
	BigInt::from(BigUint::from(*e))
}

/// Converts a big integer to an element, reducing modulo `r`. Negative values
/// map to `r - (|v| mod r)`.
pub fn fr_from_bigint(v: &BigInt) -> Fr {
	let mut reduced = v % &*MODULUS_INT;
	if reduced.sign() == Sign::Minus {
		reduced += &*MODULUS_INT;
	}
	let magnitude = reduced
		.to_biguint()
		.expect("reduced representative is non-negative");
	Fr::from(magnitude)
}

/// Writes the canonical 32-byte big-endian encoding of an element.
pub fn write_fr(mut write_buf: impl BufMut, e: &Fr) -> Result<(), SerializationError> {
	assert_enough_space_for(&write_buf, FR_BYTES)?;
	write_buf.put_slice(&e.into_bigint().to_bytes_be());
	Ok(())
}

/// Reads a canonical 32-byte big-endian element, rejecting values `>= r`.
pub fn read_fr(mut read_buf: impl Buf) -> Result<Fr, SerializationError> {
	assert_enough_data_for(&read_buf, FR_BYTES)?;
	let mut bytes = [0u8; FR_BYTES];
	read_buf.copy_to_slice(&mut bytes);
	let value = BigUint::from_bytes_be(&bytes);
	if value >= *MODULUS {
		return Err(SerializationError::InvalidConstruction { name: "Fr" });
	}
	Ok(Fr::from(value))
}

/// Writes an element vector: a big-endian `u32` length followed by the
/// canonical encoding of each element.
///
/// This is the `fr.Vector` wire format shared by the witness codec and the
/// solution codec, and is deliberately big-endian unlike the little-endian
/// system serialization.
pub fn write_fr_vector(mut write_buf: impl BufMut, v: &[Fr]) -> Result<(), SerializationError> {
	write_count_be(&mut write_buf, v.len())?;
	for e in v {
		write_fr(&mut write_buf, e)?;
	}
	Ok(())
}

/// Reads an element vector written by [`write_fr_vector`].
pub fn read_fr_vector(mut read_buf: impl Buf) -> Result<Vec<Fr>, SerializationError> {
	let len = read_count_be(&mut read_buf)?;
	(0..len).map(|_| read_fr(&mut read_buf)).collect()
}

#[cfg(test)]
mod tests {
	use ark_ff::{One, Zero};
	use num_traits::Num;

	use super::*;

	#[test]
	fn test_modulus_hex_is_bn254_r() {
		assert_eq!(
			modulus_hex(),
			"30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001"
		);
		assert_eq!(BigUint::from_str_radix(&modulus_hex(), 16).unwrap(), *modulus());
	}

	#[test]
	fn test_element_round_trip() {
		let elements = [
			Fr::zero(),
			Fr::one(),
			Fr::from(2u64),
			-Fr::one(),
			Fr::from(u64::MAX),
		];
		for e in elements {
			let mut buf = Vec::new();
			write_fr(&mut buf, &e).unwrap();
			assert_eq!(buf.len(), FR_BYTES);
			assert_eq!(read_fr(&mut buf.as_slice()).unwrap(), e);
		}
	}

	#[test]
	fn test_read_rejects_non_canonical() {
		// The modulus itself is the smallest non-canonical value.
		let mut buf = [0u8; FR_BYTES];
		buf.copy_from_slice(&modulus().to_bytes_be());
		assert!(read_fr(&mut buf.as_slice()).is_err());

		let all_ones = [0xffu8; FR_BYTES];
		assert!(read_fr(&mut all_ones.as_slice()).is_err());
	}

	#[test]
	fn test_bigint_round_trip_and_negative_reduction() {
		let e = Fr::from(123456789u64);
		assert_eq!(fr_from_bigint(&fr_to_bigint(&e)), e);

		// -1 must land on r - 1.
		assert_eq!(fr_from_bigint(&BigInt::from(-1)), -Fr::one());
		assert_eq!(fr_from_bigint(&BigInt::from(0)), Fr::zero());
	}

	#[test]
	fn test_vector_round_trip() {
		let v = vec![Fr::one(), Fr::from(35u64), Fr::from(3u64)];
		let mut buf = Vec::new();
		write_fr_vector(&mut buf, &v).unwrap();
		assert_eq!(buf.len(), 4 + 3 * FR_BYTES);
		// Length prefix is big-endian.
		assert_eq!(&buf[..4], &[0, 0, 0, 3]);
		assert_eq!(read_fr_vector(&mut buf.as_slice()).unwrap(), v);
	}

	#[test]
	fn test_vector_truncated_fails() {
		let v = vec![Fr::one(), Fr::from(2u64)];
		let mut buf = Vec::new();
		write_fr_vector(&mut buf, &v).unwrap();
		assert!(read_fr_vector(&mut buf[..buf.len() - 1].as_ref()).is_err());
	}
}
