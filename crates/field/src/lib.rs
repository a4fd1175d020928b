// Copyright 2025 Irreducible Inc.

//! BN254 scalar field surface for the g16 workspace.
//!
//! Arithmetic itself comes from [`ark_bn254`]; this crate pins the scalar
//! field the whole workspace runs over and adds the conversions the
//! constraint system and solver need: the canonical 32-byte big-endian
//! element codec, the length-prefixed element vector format shared by the
//! witness and solution wire protocols, and signed big-integer conversions
//! for the hint boundary.

#![warn(missing_docs)]

mod element;

pub use ark_bn254::Fr;
pub use element::{
	fr_from_bigint, fr_to_bigint, modulus, modulus_bigint, modulus_hex, read_fr, read_fr_vector,
	write_fr, write_fr_vector, FR_BYTES,
};
