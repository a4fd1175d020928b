// Copyright 2025 Irreducible Inc.

//! Blueprints: compressed instruction descriptors.
//!
//! A blueprint knows how to pack a constraint or a hint call into the
//! system's shared `u32` calldata buffer and how to expand it back at solving
//! time. Heterogeneous instructions thereby share one flat buffer instead of
//! carrying per-instruction allocations.
//!
//! Capabilities are split across small traits queried at runtime: a blueprint
//! may encode an R1C, encode a hint, or know how to solve itself against the
//! running solver.

use std::{fmt, ops::Range};

use g16_hints::HintId;

use crate::{
	error::SolveError,
	r1c::{LinearExpression, R1C},
	solver::SolverView,
	term::Term,
};

/// Identifies a blueprint within a constraint system.
pub type BlueprintId = u32;

/// Serialization tag of [`GenericR1C`].
pub const TAG_GENERIC_R1C: u8 = 0;
/// Serialization tag of [`GenericHint`].
pub const TAG_GENERIC_HINT: u8 = 1;

/// A compressed instruction descriptor.
pub trait Blueprint: Send + Sync + fmt::Debug {
	/// Number of calldata slots an instruction of this blueprint occupies.
	///
	/// A return of −1 means the length is not static and is stored in the
	/// first calldata slot instead.
	fn nb_inputs(&self) -> i32;

	/// Number of constraints an instruction of this blueprint creates.
	fn nb_constraints(&self) -> u32;

	/// Stable tag identifying this blueprint in system serialization.
	fn tag(&self) -> u8;

	/// The R1C codec of this blueprint, if it encodes an R1C.
	fn as_r1c(&self) -> Option<&dyn BlueprintR1C> {
		None
	}

	/// The hint codec of this blueprint, if it encodes a hint call.
	fn as_hint(&self) -> Option<&dyn BlueprintHint> {
		None
	}

	/// The solve logic of this blueprint, if it solves itself.
	fn as_solvable(&self) -> Option<&dyn BlueprintSolvable> {
		None
	}
}

/// Blueprint capability: the calldata encodes an R1C.
pub trait BlueprintR1C {
	/// Appends the compressed form of `c` to `calldata`.
	fn compress_r1c(&self, c: &R1C, calldata: &mut Vec<u32>);
	/// Expands `calldata` into `into`, reusing its storage where capacity
	/// suffices.
	fn decompress_r1c(&self, into: &mut R1C, calldata: &[u32]);
}

/// Blueprint capability: the calldata encodes a hint call.
pub trait BlueprintHint {
	/// Appends the compressed form of `h` to `calldata`.
	fn compress_hint(&self, h: &HintMapping, calldata: &mut Vec<u32>);
	/// Expands `calldata` into `into`, reusing its storage where capacity
	/// suffices.
	fn decompress_hint(&self, into: &mut HintMapping, calldata: &[u32]);
}

/// Blueprint capability: the blueprint solves its instructions itself.
pub trait BlueprintSolvable {
	/// Solves the decoded instruction against the running solver.
	fn solve(&self, solver: &dyn SolverView, calldata: &[u32]) -> Result<(), SolveError>;
}

/// Declares a hint invocation: evaluate `inputs`, feed them (as big integers)
/// to the hint function `hint_id`, and write the outputs at the consecutive
/// wire ids of `output_range`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HintMapping {
	/// The hint function to call.
	pub hint_id: HintId,
	/// Input linear expressions, evaluated before the call.
	pub inputs: Vec<LinearExpression>,
	/// Wire ids receiving the outputs.
	pub output_range: Range<u32>,
}

/// Generic R1C blueprint.
///
/// Calldata layout: `[total_len, |L|, |R|, |O|, t₀.cid, t₀.vid, ...]` with
/// the terms of L, R and O flattened in order.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenericR1C;

impl Blueprint for GenericR1C {
	fn nb_inputs(&self) -> i32 {
		// linear expression sizes are not static
		-1
	}

	fn nb_constraints(&self) -> u32 {
		1
	}

	fn tag(&self) -> u8 {
		TAG_GENERIC_R1C
	}

	fn as_r1c(&self) -> Option<&dyn BlueprintR1C> {
		Some(self)
	}
}

impl BlueprintR1C for GenericR1C {
	fn compress_r1c(&self, c: &R1C, calldata: &mut Vec<u32>) {
		let total_len = 4 + 2 * (c.l.len() + c.r.len() + c.o.len());
		calldata.reserve(total_len);
		calldata.push(total_len as u32);
		calldata.push(c.l.len() as u32);
		calldata.push(c.r.len() as u32);
		calldata.push(c.o.len() as u32);
		for t in c.l.iter().chain(c.r.iter()).chain(c.o.iter()) {
			calldata.push(t.cid);
			calldata.push(t.vid);
		}
	}

	fn decompress_r1c(&self, into: &mut R1C, calldata: &[u32]) {
		let len_l = calldata[1] as usize;
		let len_r = calldata[2] as usize;
		let len_o = calldata[3] as usize;

		let mut idx = 4;
		for (expr, len) in [(&mut into.l, len_l), (&mut into.r, len_r), (&mut into.o, len_o)] {
			copy_expression(expr, len, &mut idx, calldata);
		}
	}
}

fn copy_expression(expr: &mut LinearExpression, len: usize, idx: &mut usize, calldata: &[u32]) {
	expr.clear();
	expr.reserve(len);
	for _ in 0..len {
		expr.push(Term::new(calldata[*idx], calldata[*idx + 1]));
		*idx += 2;
	}
}

/// Generic hint blueprint.
///
/// Calldata layout:
/// `[total_len, hint_id_lo, hint_id_hi, |inputs|, |inputs[0]|, t₀.cid,
/// t₀.vid, ..., |inputs[1]|, ..., out_start, out_end]`. The 64-bit hint id is
/// split over two slots, low word first.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenericHint;

impl Blueprint for GenericHint {
	fn nb_inputs(&self) -> i32 {
		-1
	}

	fn nb_constraints(&self) -> u32 {
		0
	}

	fn tag(&self) -> u8 {
		TAG_GENERIC_HINT
	}

	fn as_hint(&self) -> Option<&dyn BlueprintHint> {
		Some(self)
	}
}

impl BlueprintHint for GenericHint {
	fn compress_hint(&self, h: &HintMapping, calldata: &mut Vec<u32>) {
		// total_len + hint id (2 slots) + |inputs| + per-expression lengths
		// and terms + output range bounds
		let total_len = 4
			+ h.inputs.iter().map(|expr| 1 + 2 * expr.len()).sum::<usize>()
			+ 2;

		calldata.reserve(total_len);
		let start = calldata.len();
		calldata.push(total_len as u32);
		calldata.push(h.hint_id as u32);
		calldata.push((h.hint_id >> 32) as u32);
		calldata.push(h.inputs.len() as u32);
		for expr in &h.inputs {
			calldata.push(expr.len() as u32);
			for t in expr {
				calldata.push(t.cid);
				calldata.push(t.vid);
			}
		}
		calldata.push(h.output_range.start);
		calldata.push(h.output_range.end);
		debug_assert_eq!(calldata.len() - start, total_len);
	}

	fn decompress_hint(&self, into: &mut HintMapping, calldata: &[u32]) {
		// calldata[0] is the total length
		into.hint_id = calldata[1] as u64 | (calldata[2] as u64) << 32;
		let nb_inputs = calldata[3] as usize;
		into.inputs.resize_with(nb_inputs, LinearExpression::new);

		let mut idx = 4;
		for expr in &mut into.inputs {
			let len = calldata[idx] as usize;
			idx += 1;
			copy_expression(expr, len, &mut idx, calldata);
		}
		into.output_range = calldata[idx]..calldata[idx + 1];
	}
}
