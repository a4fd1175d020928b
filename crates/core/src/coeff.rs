// Copyright 2025 Irreducible Inc.

//! Deduplicated storage of constraint coefficients.

use std::collections::HashMap;

use ark_ff::{One, Zero};
use g16_field::Fr;
use once_cell::sync::Lazy;

use crate::term::{Term, COEFF_MINUS_ONE, COEFF_MINUS_TWO, COEFF_ONE, COEFF_TWO, COEFF_ZERO};

static TWO: Lazy<Fr> = Lazy::new(|| Fr::from(2u64));
static MINUS_ONE: Lazy<Fr> = Lazy::new(|| -Fr::one());
static MINUS_TWO: Lazy<Fr> = Lazy::new(|| -Fr::from(2u64));

/// Interned coefficient storage of a constraint system.
///
/// Indices 0..=4 always hold the reserved values 0, 1, 2, −1, −2; any other
/// coefficient is appended on first sight and deduplicated, so a coefficient
/// id never aliases another value.
#[derive(Debug, Clone)]
pub struct CoeffTable {
	/// Dense storage, indexed by coefficient id.
	pub coefficients: Vec<Fr>,
	interned: HashMap<Fr, u32>,
}

impl CoeffTable {
	/// Creates a table seeded with the reserved coefficients.
	pub fn new(capacity: usize) -> Self {
		let mut coefficients = Vec::with_capacity(5 + capacity);
		coefficients.push(Fr::zero());
		coefficients.push(Fr::one());
		coefficients.push(*TWO);
		coefficients.push(*MINUS_ONE);
		coefficients.push(*MINUS_TWO);
		CoeffTable { coefficients, interned: HashMap::with_capacity(capacity) }
	}

	/// Rebuilds a table (including the interner) from deserialized storage.
	pub(crate) fn from_coefficients(coefficients: Vec<Fr>) -> Self {
		let mut interned = HashMap::with_capacity(coefficients.len().saturating_sub(5));
		for (id, coeff) in coefficients.iter().enumerate().skip(5) {
			interned.insert(*coeff, id as u32);
		}
		CoeffTable { coefficients, interned }
	}

	/// Interns `coeff` and returns its id.
	///
	/// Reserved values hit their fixed ids through a direct comparison fast
	/// path; everything else goes through the interner.
	pub fn add_coeff(&mut self, coeff: Fr) -> u32 {
		if coeff.is_zero() {
			return COEFF_ZERO;
		}
		if coeff.is_one() {
			return COEFF_ONE;
		}
		if coeff == *TWO {
			return COEFF_TWO;
		}
		if coeff == *MINUS_ONE {
			return COEFF_MINUS_ONE;
		}
		if coeff == *MINUS_TWO {
			return COEFF_MINUS_TWO;
		}
		if let Some(&id) = self.interned.get(&coeff) {
			return id;
		}
		let id = self.coefficients.len() as u32;
		self.coefficients.push(coeff);
		self.interned.insert(coeff, id);
		id
	}

	/// Composes a term out of a coefficient and a wire id.
	pub fn make_term(&mut self, coeff: Fr, wire_id: u32) -> Term {
		Term::new(self.add_coeff(coeff), wire_id)
	}

	/// Renders a coefficient for debug output and resolvers.
	pub fn coeff_to_string(&self, cid: u32) -> String {
		self.coefficients[cid as usize].to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_reserved_ids() {
		let mut table = CoeffTable::new(0);
		assert_eq!(table.add_coeff(Fr::zero()), COEFF_ZERO);
		assert_eq!(table.add_coeff(Fr::one()), COEFF_ONE);
		assert_eq!(table.add_coeff(Fr::from(2u64)), COEFF_TWO);
		assert_eq!(table.add_coeff(-Fr::one()), COEFF_MINUS_ONE);
		assert_eq!(table.add_coeff(-Fr::from(2u64)), COEFF_MINUS_TWO);
		assert_eq!(table.coefficients.len(), 5);
	}

	#[test]
	fn test_dedup() {
		let mut table = CoeffTable::new(0);
		let a = table.add_coeff(Fr::from(42u64));
		let b = table.add_coeff(Fr::from(7u64));
		let c = table.add_coeff(Fr::from(42u64));
		assert_eq!(a, c);
		assert_ne!(a, b);
		assert_eq!(table.coefficients.len(), 7);
	}

	#[test]
	fn test_make_term() {
		let mut table = CoeffTable::new(0);
		let t = table.make_term(Fr::from(3u64), 9);
		assert_eq!(t.vid, 9);
		assert_eq!(table.coefficients[t.cid as usize], Fr::from(3u64));
	}

	#[test]
	fn test_from_coefficients_rebuilds_interner() {
		let mut table = CoeffTable::new(0);
		let id = table.add_coeff(Fr::from(42u64));

		let mut rebuilt = CoeffTable::from_coefficients(table.coefficients.clone());
		assert_eq!(rebuilt.add_coeff(Fr::from(42u64)), id);
		assert_eq!(rebuilt.coefficients.len(), table.coefficients.len());
	}
}
