// Copyright 2025 Irreducible Inc.

//! Typed conversions into field elements for witness filling.

use ark_ff::PrimeField;
use g16_field::{fr_from_bigint, Fr};
use num_bigint::{BigInt, BigUint, Sign};

use crate::WitnessError;

/// Conversion into a BN254 scalar, accepted by [`Witness::fill`].
///
/// Fixed-width integers convert directly (signed values reduce modulo the
/// field order), byte strings are interpreted big-endian and reduced, and
/// numeric strings follow the usual prefix rules: `0x`/`0X` hexadecimal,
/// `0b`/`0B` binary, `0o`/`0O` octal, decimal otherwise.
///
/// [`Witness::fill`]: crate::Witness::fill
pub trait IntoFr {
	/// Converts the value into a field element.
	fn into_fr(self) -> Result<Fr, WitnessError>;
}

impl IntoFr for Fr {
	fn into_fr(self) -> Result<Fr, WitnessError> {
		Ok(self)
	}
}

impl IntoFr for &Fr {
	fn into_fr(self) -> Result<Fr, WitnessError> {
		Ok(*self)
	}
}

macro_rules! impl_into_fr_primitive {
	($($ty:ty),*) => {
		$(
			impl IntoFr for $ty {
				fn into_fr(self) -> Result<Fr, WitnessError> {
					Ok(Fr::from(self))
				}
			}
		)*
	};
}

impl_into_fr_primitive!(bool, u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

impl IntoFr for usize {
	fn into_fr(self) -> Result<Fr, WitnessError> {
		Ok(Fr::from(self as u64))
	}
}

impl IntoFr for isize {
	fn into_fr(self) -> Result<Fr, WitnessError> {
		Ok(Fr::from(self as i64))
	}
}

impl IntoFr for BigUint {
	fn into_fr(self) -> Result<Fr, WitnessError> {
		Ok(Fr::from(self))
	}
}

impl IntoFr for &BigUint {
	fn into_fr(self) -> Result<Fr, WitnessError> {
		Ok(Fr::from(self.clone()))
	}
}

impl IntoFr for BigInt {
	fn into_fr(self) -> Result<Fr, WitnessError> {
		Ok(fr_from_bigint(&self))
	}
}

impl IntoFr for &BigInt {
	fn into_fr(self) -> Result<Fr, WitnessError> {
		Ok(fr_from_bigint(self))
	}
}

impl IntoFr for &[u8] {
	fn into_fr(self) -> Result<Fr, WitnessError> {
		Ok(Fr::from_be_bytes_mod_order(self))
	}
}

impl IntoFr for Vec<u8> {
	fn into_fr(self) -> Result<Fr, WitnessError> {
		self.as_slice().into_fr()
	}
}

impl IntoFr for &str {
	fn into_fr(self) -> Result<Fr, WitnessError> {
		let invalid = || WitnessError::Conversion(format!("invalid numeric string {self:?}"));

		let (sign, digits) = match self.strip_prefix('-') {
			Some(rest) => (Sign::Minus, rest),
			None => (Sign::Plus, self),
		};
		let (radix, digits) = match digits {
			d if d.starts_with("0x") || d.starts_with("0X") => (16, &d[2..]),
			d if d.starts_with("0o") || d.starts_with("0O") => (8, &d[2..]),
			d if d.starts_with("0b") || d.starts_with("0B") => (2, &d[2..]),
			d => (10, d),
		};
		let magnitude = BigUint::parse_bytes(digits.as_bytes(), radix).ok_or_else(invalid)?;
		Ok(fr_from_bigint(&BigInt::from_biguint(sign, magnitude)))
	}
}

impl IntoFr for String {
	fn into_fr(self) -> Result<Fr, WitnessError> {
		self.as_str().into_fr()
	}
}

#[cfg(test)]
mod tests {
	use ark_ff::One;

	use super::*;

	#[test]
	fn test_integer_conversions() {
		assert_eq!(7u8.into_fr().unwrap(), Fr::from(7u64));
		assert_eq!(7u128.into_fr().unwrap(), Fr::from(7u64));
		assert_eq!((-1i64).into_fr().unwrap(), -Fr::one());
		assert_eq!(true.into_fr().unwrap(), Fr::one());
	}

	#[test]
	fn test_big_integer_conversions() {
		assert_eq!(BigUint::from(42u64).into_fr().unwrap(), Fr::from(42u64));
		assert_eq!(BigInt::from(-2).into_fr().unwrap(), -Fr::from(2u64));
	}

	#[test]
	fn test_byte_string_is_big_endian() {
		let bytes: &[u8] = &[0x01, 0x00];
		assert_eq!(bytes.into_fr().unwrap(), Fr::from(256u64));
	}

	#[test]
	fn test_numeric_strings() {
		assert_eq!("35".into_fr().unwrap(), Fr::from(35u64));
		assert_eq!("0x23".into_fr().unwrap(), Fr::from(35u64));
		assert_eq!("0b100011".into_fr().unwrap(), Fr::from(35u64));
		assert_eq!("0o43".into_fr().unwrap(), Fr::from(35u64));
		assert_eq!("-1".into_fr().unwrap(), -Fr::one());
		assert!("0xzz".into_fr().is_err());
		assert!("".into_fr().is_err());
	}
}
