// Copyright 2025 Irreducible Inc.

//! Pedersen commitment descriptor.

use bytes::{Buf, BufMut};
use g16_hints::HintId;
use g16_utils::serialization::{DeserializeBytes, SerializationError, SerializeBytes};

/// Describes the single Pedersen commitment a constraint system may carry:
/// which wires are committed and where the commitment value lands.
///
/// The commitment value itself is produced on the prover side by a hint; the
/// descriptor only records the wiring the prover and verifier agree on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Commitment {
	/// Committed wire ids, in declaration order (public wires first).
	pub committed: Vec<u32>,
	/// Number of committed wires that are private.
	pub nb_private_committed: usize,
	/// Wire id receiving the commitment value.
	pub commitment_wire: u32,
	/// Hint producing the commitment value.
	pub hint_id: HintId,
}

impl SerializeBytes for Commitment {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		self.committed.serialize(&mut write_buf)?;
		self.nb_private_committed.serialize(&mut write_buf)?;
		self.commitment_wire.serialize(&mut write_buf)?;
		self.hint_id.serialize(write_buf)
	}
}

impl DeserializeBytes for Commitment {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, SerializationError>
	where
		Self: Sized,
	{
		let committed = Vec::<u32>::deserialize(&mut read_buf)?;
		let nb_private_committed = usize::deserialize(&mut read_buf)?;
		let commitment_wire = u32::deserialize(&mut read_buf)?;
		let hint_id = u64::deserialize(read_buf)?;

		Ok(Commitment { committed, nb_private_committed, commitment_wire, hint_id })
	}
}
