// Copyright 2025 Irreducible Inc.

//! Witness vectors and their binary wire format.
//!
//! A witness is the ordered assignment `[public..., secret...]` of BN254
//! scalars a prover feeds to the solver. Within each subset, values follow
//! the declaration order of the circuit.
//!
//! # Binary protocol
//!
//! ```text
//! [u32(nb_public) | u32(nb_secret) | u32(len) | element_0 ... element_{len-1}]
//! ```
//!
//! All integers are big-endian; each element is a canonical 32-byte
//! big-endian scalar and `len == nb_public + nb_secret`. For example, a
//! circuit with one public variable `Y = 35` and two secret variables
//! `X = 3`, `Z = 2` encodes as
//! `00000001 00000002 00000003 bytes(Y) bytes(X) bytes(Z)`.
//!
//! Note that `nb_public` counts *assigned* public inputs: the reserved ONE
//! wire of an R1CS is not part of a witness.

#![warn(missing_docs)]

mod convert;

use bytes::{Buf, BufMut};
use g16_field::{read_fr_vector, write_fr_vector, Fr};
use g16_utils::serialization::{read_count_be, write_count_be, SerializationError};

pub use convert::IntoFr;

/// Error produced by witness construction or decoding.
#[derive(Debug, thiserror::Error)]
pub enum WitnessError {
	/// The fill source yielded the wrong number of values.
	#[error("expected {expected} values, got {got}")]
	CountMismatch {
		/// Number of values the witness shape requires.
		expected: usize,
		/// Number of values the source produced.
		got: usize,
	},
	/// A value could not be converted to a field element.
	#[error("cannot convert value to a field element: {0}")]
	Conversion(String),
	/// The stream was truncated or an element was non-canonical.
	#[error("invalid witness: {0}")]
	Invalid(#[from] SerializationError),
	/// The declared vector length disagrees with the public/secret counts.
	#[error("invalid witness: vector length {vector_len} != {nb_public} public + {nb_secret} secret")]
	HeaderMismatch {
		/// Length of the decoded element vector.
		vector_len: usize,
		/// Declared number of public values.
		nb_public: usize,
		/// Declared number of secret values.
		nb_secret: usize,
	},
	/// The byte buffer holds more than one encoded witness.
	#[error("invalid witness: {0} trailing bytes")]
	TrailingBytes(usize),
}

/// An ordered assignment of field elements, public values first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Witness {
	nb_public: u32,
	nb_secret: u32,
	vector: Vec<Fr>,
}

impl Witness {
	/// Creates an empty witness.
	pub fn new() -> Self {
		Self::default()
	}

	/// Fills the witness from `values`, public values first then secret, each
	/// in declaration order.
	///
	/// The vector is reallocated to exactly `nb_public + nb_secret` elements;
	/// a source yielding any other number of values is an error.
	pub fn fill<I>(
		&mut self,
		nb_public: usize,
		nb_secret: usize,
		values: I,
	) -> Result<(), WitnessError>
	where
		I: IntoIterator,
		I::Item: IntoFr,
	{
		let n = nb_public + nb_secret;
		self.nb_public = nb_public as u32;
		self.nb_secret = nb_secret as u32;
		self.vector = Vec::with_capacity(n);

		let mut got = 0usize;
		for value in values {
			got += 1;
			if got <= n {
				self.vector.push(value.into_fr()?);
			}
		}
		if got != n {
			return Err(WitnessError::CountMismatch { expected: n, got });
		}
		Ok(())
	}

	/// Returns a witness containing only the public values.
	pub fn public(&self) -> Witness {
		Witness {
			nb_public: self.nb_public,
			nb_secret: 0,
			vector: self.vector[..self.nb_public as usize].to_vec(),
		}
	}

	/// Borrows the underlying element vector.
	pub fn vector(&self) -> &[Fr] {
		&self.vector
	}

	/// Number of public values (the reserved ONE wire excluded).
	pub fn nb_public(&self) -> usize {
		self.nb_public as usize
	}

	/// Number of secret values.
	pub fn nb_secret(&self) -> usize {
		self.nb_secret as usize
	}

	/// Encodes the witness into the buffer using the binary protocol.
	pub fn write_to(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		write_count_be(&mut write_buf, self.nb_public as usize)?;
		write_count_be(&mut write_buf, self.nb_secret as usize)?;
		write_fr_vector(&mut write_buf, &self.vector)
	}

	/// Decodes a witness from the buffer.
	pub fn read_from(mut read_buf: impl Buf) -> Result<Self, WitnessError> {
		let nb_public = read_count_be(&mut read_buf)?;
		let nb_secret = read_count_be(&mut read_buf)?;
		let vector = read_fr_vector(&mut read_buf)?;
		if vector.len() != nb_public + nb_secret {
			return Err(WitnessError::HeaderMismatch {
				vector_len: vector.len(),
				nb_public,
				nb_secret,
			});
		}
		Ok(Witness { nb_public: nb_public as u32, nb_secret: nb_secret as u32, vector })
	}

	/// Encodes the witness into a fresh byte vector.
	pub fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
		let mut out = Vec::new();
		self.write_to(&mut out)?;
		Ok(out)
	}

	/// Decodes a witness from a byte slice holding exactly one encoding.
	pub fn from_bytes(data: &[u8]) -> Result<Self, WitnessError> {
		let mut read_buf = data;
		let witness = Self::read_from(&mut read_buf)?;
		if read_buf.has_remaining() {
			return Err(WitnessError::TrailingBytes(read_buf.remaining()));
		}
		Ok(witness)
	}
}
