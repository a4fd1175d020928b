// Copyright 2025 Irreducible Inc.

//! Multi-level parallel witness solver.
//!
//! Solving walks the system's [levels] in order. Within a level every
//! instruction is independent, so large levels are partitioned into
//! contiguous ranges and fanned out over the rayon pool; small levels run
//! sequentially on the caller thread. Each R1C holds at most one unknown
//! wire at its scheduled level: the linear solve determines it, with a
//! finite-field division fallback for non-trivial coefficients. Hint
//! instructions evaluate their inputs, call the registered hint function on
//! big integers, and write the outputs back as field elements.
//!
//! [levels]: crate::system::R1cs::levels

use std::{
	collections::HashMap,
	sync::{
		atomic::{AtomicU64, Ordering},
		Mutex,
	},
	time::Instant,
};

use ark_ff::{Field, One, Zero};
use bytes::{Buf, BufMut};
use g16_field::{fr_from_bigint, fr_to_bigint, modulus_bigint, read_fr_vector, write_fr_vector, Fr};
use g16_hints::{registered_hints, HintFn, HintId};
use g16_utils::{
	cell::{unwrap_cells, SyncCell},
	pool,
	serialization::SerializationError,
};
use itertools::Itertools;
use rayon::prelude::*;
use tracing::debug;

use crate::{
	blueprint::HintMapping,
	error::SolveError,
	r1c::{LinearExpression, R1C},
	system::{Instruction, R1cs},
	term::{Term, COEFF_MINUS_ONE, COEFF_ONE, COEFF_TWO, COEFF_ZERO},
};

/// Minimum number of instructions a parallel task should hold. A level whose
/// size does not amortize at least two such tasks runs sequentially, without
/// any synchronization.
const MIN_WORK_PER_CPU: usize = 50;

/// Options for a solve call.
#[derive(Default)]
pub struct SolverOpts {
	/// Hint functions merged over the global registry; overrides win.
	pub hint_functions: HashMap<HintId, HintFn>,
}

impl SolverOpts {
	/// Adds a hint function override.
	pub fn with_hint(mut self, id: HintId, f: HintFn) -> Self {
		self.hint_functions.insert(id, f);
		self
	}
}

/// A complete assignment to the constraint system: the wire vector `W` such
/// that `A∘B − C == 0`, together with the per-constraint columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct R1csSolution {
	/// Every wire value, indexed by wire id.
	pub w: Vec<Fr>,
	/// Per-constraint accumulated left values.
	pub a: Vec<Fr>,
	/// Per-constraint accumulated right values.
	pub b: Vec<Fr>,
	/// Per-constraint accumulated output values.
	pub c: Vec<Fr>,
}

impl R1csSolution {
	/// Encodes the solution as four consecutive element vectors.
	pub fn write_to(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		write_fr_vector(&mut write_buf, &self.w)?;
		write_fr_vector(&mut write_buf, &self.a)?;
		write_fr_vector(&mut write_buf, &self.b)?;
		write_fr_vector(&mut write_buf, &self.c)
	}

	/// Decodes a solution written by [`Self::write_to`].
	pub fn read_from(mut read_buf: impl Buf) -> Result<Self, SerializationError> {
		let w = read_fr_vector(&mut read_buf)?;
		let a = read_fr_vector(&mut read_buf)?;
		let b = read_fr_vector(&mut read_buf)?;
		let c = read_fr_vector(&mut read_buf)?;
		Ok(R1csSolution { w, a, b, c })
	}
}

/// Runtime view of the solver exposed to self-solving blueprints.
pub trait SolverView {
	/// Computes `coeff(cid) · value(vid)`. The wire must be solved.
	fn get_value(&self, cid: u32, vid: u32) -> Fr;
	/// Returns the coefficient with the given id.
	fn get_coeff(&self, cid: u32) -> Fr;
	/// Assigns a wire value and marks the wire solved.
	fn set_value(&self, vid: u32, value: Fr);
	/// Whether the wire already has a value.
	fn is_solved(&self, vid: u32) -> bool;
}

// Per-task scratch, reused across the instructions of a contiguous range to
// avoid per-instruction allocation.
#[derive(Default)]
struct Scratch {
	r1c: R1C,
	hint: HintMapping,
}

/// Solver state for one `R1cs::solve` call.
///
/// Wire values, solved flags and the A/B/C columns live in [`SyncCell`]s:
/// instructions within a level write disjoint cells, and the fork-join point
/// at the end of each level orders those writes before the next level's
/// reads.
struct Solver<'a> {
	system: &'a R1cs,

	// indexed by wire id
	values: Vec<SyncCell<Fr>>,
	solved: Vec<SyncCell<bool>>,
	nb_solved: AtomicU64,

	// the R1CS columns, indexed by constraint id
	a: Vec<SyncCell<Fr>>,
	b: Vec<SyncCell<Fr>>,
	c: Vec<SyncCell<Fr>>,

	hints: HashMap<HintId, HintFn>,
}

fn zero_column(len: usize, capacity: usize) -> Vec<SyncCell<Fr>> {
	let mut column = Vec::with_capacity(capacity);
	column.extend((0..len).map(|_| SyncCell::new(Fr::zero())));
	column
}

impl<'a> Solver<'a> {
	fn new(
		system: &'a R1cs,
		witness: &[Fr],
		opts: &SolverOpts,
	) -> Result<Self, SolveError> {
		// R1CS reserves wire 0 for the constant ONE; it is not part of the
		// witness.
		let expected = system.nb_public_variables() - 1 + system.nb_secret_variables();
		if witness.len() != expected {
			return Err(SolveError::InvalidWitnessSize { got: witness.len(), expected });
		}

		let mut hints = registered_hints();
		for (&id, &f) in &opts.hint_functions {
			hints.insert(id, f);
		}
		let missing: Vec<String> = system
			.hint_dependencies
			.iter()
			.filter(|(id, _)| !hints.contains_key(id))
			.map(|(_, name)| name.clone())
			.sorted()
			.collect();
		if !missing.is_empty() {
			return Err(SolveError::MissingHints(missing));
		}

		let nb_wires = system.nb_wires();
		let mut values = zero_column(nb_wires, nb_wires);
		let mut solved = Vec::with_capacity(nb_wires);
		solved.extend((0..nb_wires).map(|_| SyncCell::new(false)));

		values[0] = SyncCell::new(Fr::one());
		solved[0] = SyncCell::new(true);
		for (i, v) in witness.iter().enumerate() {
			values[i + 1] = SyncCell::new(*v);
			solved[i + 1] = SyncCell::new(true);
		}

		// the columns' capacity is rounded up to the next power of two, the
		// FFT domain size the Groth16 prover extends them to
		let nb_constraints = system.nb_constraints();
		let capacity = nb_constraints.next_power_of_two();

		Ok(Solver {
			system,
			values,
			solved,
			nb_solved: AtomicU64::new((witness.len() + 1) as u64),
			a: zero_column(nb_constraints, capacity),
			b: zero_column(nb_constraints, capacity),
			c: zero_column(nb_constraints, capacity),
			hints,
		})
	}

	#[inline(always)]
	fn wire_solved(&self, vid: u32) -> bool {
		// SAFETY: flags read here were either set before the solve started or
		// written in an earlier level; level boundaries order those writes.
		unsafe { self.solved[vid as usize].get() }
	}

	#[inline(always)]
	fn value(&self, vid: u32) -> Fr {
		// SAFETY: only solved wires are read, and their write happened in an
		// earlier level (or earlier in the current task).
		unsafe { self.values[vid as usize].get() }
	}

	fn set(&self, vid: u32, value: Fr) {
		if self.wire_solved(vid) {
			panic!("solving the same wire twice should never happen");
		}
		// SAFETY: each wire is written exactly once across all instructions,
		// and instructions within a level touch disjoint unsolved wires.
		unsafe {
			self.values[vid as usize].set(value);
			self.solved[vid as usize].set(true);
		}
		self.nb_solved.fetch_add(1, Ordering::Relaxed);
	}

	// r += coeff(t) · value(t)
	fn accumulate_into(&self, t: &Term, r: &mut Fr) {
		match t.cid {
			COEFF_ZERO => {}
			COEFF_ONE => *r += self.value(t.vid),
			COEFF_TWO => *r += self.value(t.vid).double(),
			COEFF_MINUS_ONE => *r -= self.value(t.vid),
			cid => *r += self.system.coefficients.coefficients[cid as usize] * self.value(t.vid),
		}
	}

	fn compute_term(&self, t: &Term) -> Fr {
		if t.cid != COEFF_ZERO && !self.wire_solved(t.vid) {
			panic!("computing a term with an unsolved wire");
		}
		match t.cid {
			COEFF_ZERO => Fr::zero(),
			COEFF_ONE => self.value(t.vid),
			COEFF_TWO => self.value(t.vid).double(),
			COEFF_MINUS_ONE => -self.value(t.vid),
			cid => self.system.coefficients.coefficients[cid as usize] * self.value(t.vid),
		}
	}

	// res /= coeff(cid), with fast paths for the coefficients the frontend
	// actually attaches to unsolved wires
	fn div_by_coeff(&self, res: &mut Fr, cid: u32) {
		match cid {
			COEFF_ONE => {}
			COEFF_MINUS_ONE => *res = -*res,
			COEFF_ZERO => panic!("division by zero coefficient"),
			cid => {
				let coeff = self.system.coefficients.coefficients[cid as usize];
				let inverse = coeff.inverse().expect("interned coefficient is non-zero");
				*res *= inverse;
			}
		}
	}

	fn run(&self) -> Result<(), SolveError> {
		let nb_cpus = rayon::current_num_threads();

		for level in &self.system.levels {
			let max_cpu = level.len() / MIN_WORK_PER_CPU;
			if max_cpu <= 1 {
				// not enough work to amortize the fan-out
				let mut scratch = Scratch::default();
				for &i in level {
					self.process_instruction(&self.system.instructions[i as usize], &mut scratch)?;
				}
				continue;
			}

			// contiguous ranges, one per task, the remainder spread over the
			// first tasks
			let nb_tasks = nb_cpus.min(level.len().div_ceil(MIN_WORK_PER_CPU));
			let per_task = level.len() / nb_tasks;
			let extra = level.len() % nb_tasks;
			let mut tasks = Vec::with_capacity(nb_tasks);
			let mut start = 0;
			for t in 0..nb_tasks {
				let end = start + per_task + (t < extra) as usize;
				tasks.push(&level[start..end]);
				start = end;
			}

			// a task that fails stops early; the rest of the level drains and
			// the first error is reported after the join point
			let first_error: Mutex<Option<SolveError>> = Mutex::new(None);
			tasks.into_par_iter().for_each(|task| {
				let mut scratch = Scratch::default();
				for &i in task {
					let inst = &self.system.instructions[i as usize];
					if let Err(err) = self.process_instruction(inst, &mut scratch) {
						let mut slot = first_error.lock().expect("error slot poisoned");
						slot.get_or_insert(err);
						return;
					}
				}
			});
			if let Some(err) = first_error.into_inner().expect("error slot poisoned") {
				return Err(err);
			}
		}

		let solved = self.nb_solved.load(Ordering::Relaxed) as usize;
		if solved != self.values.len() {
			return Err(SolveError::Incomplete { solved, total: self.values.len() });
		}
		Ok(())
	}

	fn process_instruction(
		&self,
		inst: &Instruction,
		scratch: &mut Scratch,
	) -> Result<(), SolveError> {
		let blueprint = &self.system.blueprints[inst.blueprint_id as usize];
		let calldata = self.system.calldata_of(inst);

		if let Some(codec) = blueprint.as_r1c() {
			codec.decompress_r1c(&mut scratch.r1c, calldata);
			return self.solve_r1c(inst.constraint_offset, &scratch.r1c);
		}
		if let Some(codec) = blueprint.as_hint() {
			codec.decompress_hint(&mut scratch.hint, calldata);
			return self.solve_with_hint(&scratch.hint);
		}
		if let Some(solvable) = blueprint.as_solvable() {
			return solvable.solve(self, calldata);
		}
		Ok(())
	}

	/// Solves the at-most-one unsolved wire of the constraint and stores the
	/// accumulated `a`, `b`, `c` column values.
	fn solve_r1c(&self, cid: u32, r1c: &R1C) -> Result<(), SolveError> {
		fn sweep(
			solver: &Solver<'_>,
			expr: &LinearExpression,
			acc: &mut Fr,
			side: u8,
			unknown: &mut Option<(u8, Term)>,
		) {
			for t in expr {
				if solver.wire_solved(t.vid) {
					solver.accumulate_into(t, acc);
					continue;
				}
				if unknown.is_some() {
					panic!("found more than one wire to instantiate");
				}
				*unknown = Some((side, *t));
			}
		}

		let mut a = Fr::zero();
		let mut b = Fr::zero();
		let mut c = Fr::zero();
		let mut unknown = None;
		sweep(self, &r1c.l, &mut a, 1, &mut unknown);
		sweep(self, &r1c.r, &mut b, 2, &mut unknown);
		sweep(self, &r1c.o, &mut c, 3, &mut unknown);

		match unknown {
			None => {
				// nothing to solve; happens for assertions and for wires
				// already instantiated by hints
				if a * b != c {
					return Err(self.unsatisfied(cid, &a, &b, &c));
				}
			}
			Some((side, t)) => {
				let mut wire;
				match side {
					1 => {
						if b.is_zero() {
							// the unknown is multiplied by zero: the
							// constraint reduces to 0 == c and the wire is
							// left for another instruction to produce
							if !c.is_zero() {
								return Err(self.unsatisfied(cid, &a, &b, &c));
							}
							self.store_columns(cid, a, b, c);
							return Ok(());
						}
						wire = c / b - a;
						a += wire;
					}
					2 => {
						if a.is_zero() {
							if !c.is_zero() {
								return Err(self.unsatisfied(cid, &a, &b, &c));
							}
							self.store_columns(cid, a, b, c);
							return Ok(());
						}
						wire = c / a - b;
						b += wire;
					}
					3 => {
						wire = a * b - c;
						c += wire;
					}
					_ => unreachable!("sides are 1, 2, 3"),
				}

				// `wire` is the term value coeff · value; strip the
				// coefficient before assigning
				self.div_by_coeff(&mut wire, t.cid);
				self.set(t.vid, wire);
			}
		}

		self.store_columns(cid, a, b, c);
		Ok(())
	}

	fn store_columns(&self, cid: u32, a: Fr, b: Fr, c: Fr) {
		// SAFETY: every constraint id is processed by exactly one
		// instruction, itself processed by exactly one task.
		unsafe {
			self.a[cid as usize].set(a);
			self.b[cid as usize].set(b);
			self.c[cid as usize].set(c);
		}
	}

	fn unsatisfied(&self, cid: u32, a: &Fr, b: &Fr, c: &Fr) -> SolveError {
		SolveError::Unsatisfied { constraint: cid, debug: format!("{a} ⋅ {b} != {c}") }
	}

	/// Evaluates the hint's inputs, executes it and assigns the outputs to
	/// their wires.
	fn solve_with_hint(&self, h: &HintMapping) -> Result<(), SolveError> {
		let Some(&f) = self.hints.get(&h.hint_id) else {
			return Err(SolveError::MissingHints(vec![self.hint_name(h.hint_id)]));
		};

		let mut inputs = Vec::with_capacity(h.inputs.len());
		for expr in &h.inputs {
			let mut v = Fr::zero();
			for t in expr {
				if t.is_constant() {
					v += self.system.coefficients.coefficients[t.cid as usize];
				} else {
					self.accumulate_into(t, &mut v);
				}
			}
			inputs.push(fr_to_bigint(&v));
		}

		let nb_outputs = (h.output_range.end - h.output_range.start) as usize;
		let mut outputs: Vec<_> = (0..nb_outputs).map(|_| pool::take_bigint()).collect();

		let result = f(modulus_bigint(), &inputs, &mut outputs);

		// outputs are committed even when the hint errors, so the error
		// report carries a consistent state
		for (i, out) in outputs.iter().enumerate() {
			self.set(h.output_range.start + i as u32, fr_from_bigint(out));
		}

		for n in inputs {
			pool::put_bigint(n);
		}
		for n in outputs {
			pool::put_bigint(n);
		}

		result.map_err(|source| SolveError::Hint { name: self.hint_name(h.hint_id), source })
	}

	fn hint_name(&self, id: HintId) -> String {
		self.system
			.hint_dependencies
			.get(&id)
			.cloned()
			.unwrap_or_else(|| format!("hint#{id:#018x}"))
	}

	fn into_solution(self) -> R1csSolution {
		fn take_column(cells: Vec<SyncCell<Fr>>, capacity: usize) -> Vec<Fr> {
			let mut column = Vec::with_capacity(capacity);
			column.extend(cells.into_iter().map(SyncCell::into_inner));
			column
		}

		let capacity = self.a.len().next_power_of_two();
		R1csSolution {
			w: unwrap_cells(self.values),
			a: take_column(self.a, capacity),
			b: take_column(self.b, capacity),
			c: take_column(self.c, capacity),
		}
	}
}

impl SolverView for Solver<'_> {
	fn get_value(&self, cid: u32, vid: u32) -> Fr {
		self.compute_term(&Term::new(cid, vid))
	}

	fn get_coeff(&self, cid: u32) -> Fr {
		self.system.coefficients.coefficients[cid as usize]
	}

	fn set_value(&self, vid: u32, value: Fr) {
		self.set(vid, value);
	}

	fn is_solved(&self, vid: u32) -> bool {
		self.wire_solved(vid)
	}
}

impl R1cs {
	/// Solves the system with the provided witness and returns the full
	/// assignment.
	///
	/// The witness holds `nb_public − 1` public values (the reserved ONE wire
	/// is implicit) followed by the secret values. Hints declared by the
	/// system must be registered globally or passed in `opts`.
	pub fn solve(
		&self,
		witness: &g16_witness::Witness,
		opts: &SolverOpts,
	) -> Result<R1csSolution, SolveError> {
		let _span =
			tracing::info_span!("solve", nb_constraints = self.nb_constraints()).entered();
		let start = Instant::now();

		let solver = Solver::new(self, witness.vector(), opts)
			.inspect_err(|err| debug!(%err, "solver init failed"))?;
		solver.run().inspect_err(|err| debug!(%err, "solver run failed"))?;

		debug!(took = ?start.elapsed(), "constraint system solver done");
		Ok(solver.into_solution())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_solution_round_trip() {
		let solution = R1csSolution {
			w: vec![Fr::one(), Fr::from(7u64)],
			a: vec![Fr::from(3u64)],
			b: vec![Fr::from(5u64)],
			c: vec![Fr::from(15u64)],
		};

		let mut buf = Vec::new();
		solution.write_to(&mut buf).unwrap();
		let decoded = R1csSolution::read_from(&mut buf.as_slice()).unwrap();
		assert_eq!(solution, decoded);
	}

	#[test]
	fn test_column_capacity_rounds_up() {
		let mut solver_columns = zero_column(3, 3usize.next_power_of_two());
		assert_eq!(solver_columns.len(), 3);
		assert_eq!(solver_columns.capacity(), 4);
		solver_columns.push(SyncCell::new(Fr::zero()));
		assert_eq!(solver_columns.capacity(), 4);
	}
}
