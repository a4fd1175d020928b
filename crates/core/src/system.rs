// Copyright 2025 Irreducible Inc.

//! Constraint system: instruction stream, shared calldata, levels and the
//! binary codec.

use std::collections::HashMap;

use bytes::{Buf, BufMut};
use g16_field::{modulus, modulus_hex, read_fr, write_fr};
use g16_hints::HintId;
use g16_utils::serialization::{DeserializeBytes, SerializationError, SerializeBytes};
use num_bigint::BigUint;
use num_traits::Num;

use crate::{
	blueprint::{
		Blueprint, BlueprintId, GenericHint, GenericR1C, HintMapping, TAG_GENERIC_HINT,
		TAG_GENERIC_R1C,
	},
	coeff::CoeffTable,
	commitment::Commitment,
	error::SystemError,
	r1c::{Resolver, R1C},
	term::Term,
};

/// Constraint system type tag. Only R1CS is defined.
pub const SYSTEM_TYPE_R1CS: u32 = 1;

/// The lowest element of a constraint system: just enough data to
/// reconstruct a constraint of any shape or a hint call at solving time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
	/// Blueprint decoding this instruction's calldata.
	pub blueprint_id: BlueprintId,
	/// Starting constraint id of this instruction.
	pub constraint_offset: u32,
	/// Starting index of this instruction's slice in the shared calldata
	/// buffer. Storing the offset instead of a slice keeps instructions at
	/// 16 bytes.
	pub start_calldata: u64,
}

impl SerializeBytes for Instruction {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		self.blueprint_id.serialize(&mut write_buf)?;
		self.constraint_offset.serialize(&mut write_buf)?;
		self.start_calldata.serialize(write_buf)
	}
}

impl DeserializeBytes for Instruction {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, SerializationError>
	where
		Self: Sized,
	{
		let blueprint_id = BlueprintId::deserialize(&mut read_buf)?;
		let constraint_offset = u32::deserialize(&mut read_buf)?;
		let start_calldata = u64::deserialize(read_buf)?;

		Ok(Instruction { blueprint_id, constraint_offset, start_calldata })
	}
}

/// An R1CS constraint system over the BN254 scalar field.
///
/// Wire ids form a single flat index space partitioned contiguously as
/// `[public | secret | internal]`; wire 0 is the reserved ONE wire, counted
/// among the public variables. Declare every public and secret variable
/// before adding constraints: variable ids are dense and adding an input
/// after internal wires exist would shift the partition.
///
/// Instructions must be added in an order where every wire an instruction
/// reads is either an input wire or produced by an earlier instruction; the
/// level builder relies on it.
#[derive(Debug)]
pub struct R1cs {
	/// Serialization header: lowercase hex of the scalar field order.
	pub scalar_field: String,
	/// Constraint system type tag.
	pub system_type: u32,
	/// The instruction stream.
	pub instructions: Vec<Instruction>,
	/// Installed blueprints, indexed by [`BlueprintId`].
	pub blueprints: Vec<Box<dyn Blueprint>>,
	/// The shared calldata buffer every instruction points into.
	pub calldata: Vec<u32>,
	/// Total number of constraints; can differ from the instruction count.
	pub nb_constraints: usize,
	/// Number of internal (non-input) wires.
	pub nb_internal_variables: usize,
	/// Public variable names, the reserved ONE wire first.
	pub public: Vec<String>,
	/// Secret variable names.
	pub secret: Vec<String>,
	/// The hints the solver needs, by id.
	pub hint_dependencies: HashMap<HintId, String>,
	/// Instruction indices partitioned into dependency layers: instructions
	/// within a level are mutually independent, and only depend on wires
	/// solved in earlier levels.
	pub levels: Vec<Vec<u32>>,
	/// Optional Pedersen commitment descriptor.
	pub commitment_info: Option<Commitment>,
	/// Interned coefficient storage.
	pub coefficients: CoeffTable,

	generic_r1c: BlueprintId,
	generic_hint: BlueprintId,

	// level builder state, rebuilt on deserialization: the level at which
	// each internal wire is solved, -1 while unassigned
	lb_wire_level: Vec<i32>,
	lb_outputs: Vec<u32>,
}

impl R1cs {
	/// Serialization format version for compatibility checking.
	pub const SERIALIZATION_VERSION: u32 = 1;

	/// Creates an empty system with the generic blueprints installed and the
	/// reserved ONE wire declared.
	pub fn new(capacity: usize) -> Self {
		let mut system = R1cs {
			scalar_field: modulus_hex(),
			system_type: SYSTEM_TYPE_R1CS,
			instructions: Vec::with_capacity(capacity),
			blueprints: Vec::new(),
			calldata: Vec::with_capacity(capacity * 8),
			nb_constraints: 0,
			nb_internal_variables: 0,
			public: Vec::new(),
			secret: Vec::new(),
			hint_dependencies: HashMap::new(),
			levels: Vec::new(),
			commitment_info: None,
			coefficients: CoeffTable::new(capacity / 10),
			generic_r1c: 0,
			generic_hint: 0,
			lb_wire_level: Vec::with_capacity(capacity),
			lb_outputs: Vec::with_capacity(256),
		};
		system.generic_r1c = system.add_blueprint(Box::new(GenericR1C));
		system.generic_hint = system.add_blueprint(Box::new(GenericHint));
		system.add_public_variable("one");
		system
	}

	/// Installs a blueprint and returns its id.
	pub fn add_blueprint(&mut self, blueprint: Box<dyn Blueprint>) -> BlueprintId {
		self.blueprints.push(blueprint);
		(self.blueprints.len() - 1) as BlueprintId
	}

	/// The well-known id of the generic hint blueprint.
	pub fn generic_hint_blueprint(&self) -> BlueprintId {
		self.generic_hint
	}

	/// Declares a public variable and returns its wire id.
	pub fn add_public_variable(&mut self, name: &str) -> u32 {
		debug_assert_eq!(self.nb_internal_variables, 0);
		self.public.push(name.to_string());
		(self.public.len() - 1) as u32
	}

	/// Declares a secret variable and returns its wire id.
	pub fn add_secret_variable(&mut self, name: &str) -> u32 {
		debug_assert_eq!(self.nb_internal_variables, 0);
		self.secret.push(name.to_string());
		(self.public.len() + self.secret.len() - 1) as u32
	}

	/// Allocates an internal wire and returns its id.
	pub fn add_internal_variable(&mut self) -> u32 {
		let id = self.nb_wires() as u32;
		self.nb_internal_variables += 1;
		self.lb_wire_level.push(-1);
		id
	}

	/// Number of public variables, the reserved ONE wire included.
	pub fn nb_public_variables(&self) -> usize {
		self.public.len()
	}

	/// Number of secret variables.
	pub fn nb_secret_variables(&self) -> usize {
		self.secret.len()
	}

	/// Total number of wires: public, secret and internal.
	pub fn nb_wires(&self) -> usize {
		self.public.len() + self.secret.len() + self.nb_internal_variables
	}

	/// Number of constraints in the system.
	pub fn nb_constraints(&self) -> usize {
		self.nb_constraints
	}

	/// Number of instructions in the system.
	pub fn nb_instructions(&self) -> usize {
		self.instructions.len()
	}

	/// Interns a coefficient. See [`CoeffTable::add_coeff`].
	pub fn add_coeff(&mut self, coeff: g16_field::Fr) -> u32 {
		self.coefficients.add_coeff(coeff)
	}

	/// Composes a term out of a coefficient and a wire id.
	pub fn make_term(&mut self, coeff: g16_field::Fr, wire_id: u32) -> Term {
		self.coefficients.make_term(coeff, wire_id)
	}

	/// Adds an R1C through the generic blueprint and returns its constraint
	/// id.
	pub fn add_r1c(&mut self, c: &R1C) -> u32 {
		self.add_r1c_with_blueprint(c, self.generic_r1c)
	}

	/// Adds an R1C through the given blueprint and returns its constraint id.
	///
	/// # Panics
	/// Panics if the blueprint does not encode R1Cs.
	pub fn add_r1c_with_blueprint(&mut self, c: &R1C, bid: BlueprintId) -> u32 {
		let inst = Instruction {
			blueprint_id: bid,
			constraint_offset: self.nb_constraints as u32,
			start_calldata: self.calldata.len() as u64,
		};
		let blueprint = &self.blueprints[bid as usize];
		let codec = blueprint.as_r1c().expect("blueprint does not encode an R1C");
		codec.compress_r1c(c, &mut self.calldata);
		let nb_new = blueprint.nb_constraints() as usize;

		self.nb_constraints += nb_new;
		self.instructions.push(inst);
		let inst_idx = (self.instructions.len() - 1) as u32;
		self.place_instruction(inst_idx, c.wire_ids(), None);
		inst.constraint_offset
	}

	/// Adds a hint instruction through the generic hint blueprint and records
	/// the hint as a solving dependency under `name`.
	pub fn add_hint_mapping(&mut self, name: &str, h: &HintMapping) {
		self.hint_dependencies
			.entry(h.hint_id)
			.or_insert_with(|| name.to_string());

		let inst = Instruction {
			blueprint_id: self.generic_hint,
			constraint_offset: self.nb_constraints as u32,
			start_calldata: self.calldata.len() as u64,
		};
		let blueprint = &self.blueprints[self.generic_hint as usize];
		let codec = blueprint.as_hint().expect("generic hint blueprint encodes hints");
		codec.compress_hint(h, &mut self.calldata);

		self.instructions.push(inst);
		let inst_idx = (self.instructions.len() - 1) as u32;
		let wires = h.inputs.iter().flatten().map(|t| t.vid);
		self.place_instruction(inst_idx, wires, Some(h.output_range.clone()));
	}

	/// Registers the system's Pedersen commitment.
	pub fn add_commitment(&mut self, commitment: Commitment) -> Result<(), SystemError> {
		if self.commitment_info.is_some() {
			return Err(SystemError::DuplicateCommitment);
		}
		self.commitment_info = Some(commitment);
		Ok(())
	}

	/// Reslices the shared calldata buffer with the portion belonging to
	/// `inst`. No copy; callers must not modify the system while holding it.
	pub fn calldata_of(&self, inst: &Instruction) -> &[u32] {
		let blueprint = &self.blueprints[inst.blueprint_id as usize];
		let start = inst.start_calldata as usize;
		let nb_inputs = match blueprint.nb_inputs() {
			// by convention a negative static size means the length is the
			// first calldata slot
			n if n < 0 => self.calldata[start] as usize,
			n => n as usize,
		};
		&self.calldata[start..start + nb_inputs]
	}

	/// Decompresses every R1C-bearing instruction, in instruction order.
	pub fn r1cs(&self) -> Vec<R1C> {
		let mut out = Vec::with_capacity(self.nb_constraints);
		for inst in &self.instructions {
			let blueprint = &self.blueprints[inst.blueprint_id as usize];
			if let Some(codec) = blueprint.as_r1c() {
				let mut c = R1C::default();
				codec.decompress_r1c(&mut c, self.calldata_of(inst));
				out.push(c);
			}
		}
		out
	}

	/// Assigns the instruction to its dependency level.
	///
	/// The instruction's level is one past the highest level among the wires
	/// it reads; input wires (public, secret, ONE) count as level −1. For
	/// R1Cs the produced wires are exactly the referenced wires not yet
	/// assigned a level; hints declare their outputs explicitly.
	fn place_instruction(
		&mut self,
		inst_idx: u32,
		wires: impl Iterator<Item = u32>,
		hint_outputs: Option<std::ops::Range<u32>>,
	) {
		let nb_inputs = (self.public.len() + self.secret.len()) as u32;
		let is_hint = hint_outputs.is_some();

		let mut max_level = -1i32;
		self.lb_outputs.clear();
		for vid in wires {
			if vid == Term::CONSTANT_VID || vid < nb_inputs {
				continue;
			}
			match self.lb_wire_level[(vid - nb_inputs) as usize] {
				-1 if !is_hint => self.lb_outputs.push(vid),
				// an unproduced hint input is left for the completeness check
				-1 => {}
				level => max_level = max_level.max(level),
			}
		}
		if let Some(range) = hint_outputs {
			self.lb_outputs.extend(range);
		}

		let level = max_level + 1;
		for i in 0..self.lb_outputs.len() {
			let vid = self.lb_outputs[i];
			self.lb_wire_level[(vid - nb_inputs) as usize] = level;
		}

		let level = level as usize;
		if self.levels.len() <= level {
			self.levels.resize_with(level + 1, Vec::new);
		}
		self.levels[level].push(inst_idx);
	}

	/// Rebuilds the level-builder state from the decoded levels, so a
	/// deserialized system accepts further construction.
	fn rebuild_level_state(&mut self) {
		let nb_inputs = (self.public.len() + self.secret.len()) as u32;
		self.lb_wire_level = vec![-1; self.nb_internal_variables];

		let mut scratch_r1c = R1C::default();
		let mut scratch_hint = HintMapping::default();
		for (level_idx, level) in self.levels.iter().enumerate() {
			for &inst_idx in level {
				let inst = self.instructions[inst_idx as usize];
				let blueprint = &self.blueprints[inst.blueprint_id as usize];
				let start = inst.start_calldata as usize;
				let nb = match blueprint.nb_inputs() {
					n if n < 0 => self.calldata[start] as usize,
					n => n as usize,
				};
				let calldata = &self.calldata[start..start + nb];

				self.lb_outputs.clear();
				if let Some(codec) = blueprint.as_r1c() {
					codec.decompress_r1c(&mut scratch_r1c, calldata);
					for vid in scratch_r1c.wire_ids() {
						if vid != Term::CONSTANT_VID && vid >= nb_inputs {
							self.lb_outputs.push(vid);
						}
					}
				} else if let Some(codec) = blueprint.as_hint() {
					codec.decompress_hint(&mut scratch_hint, calldata);
					self.lb_outputs.extend(scratch_hint.output_range.clone());
				}
				for i in 0..self.lb_outputs.len() {
					let slot = &mut self.lb_wire_level[(self.lb_outputs[i] - nb_inputs) as usize];
					if *slot == -1 {
						*slot = level_idx as i32;
					}
				}
			}
		}
	}

	/// Encodes the system into the buffer.
	pub fn write_to(&self, mut write_buf: impl BufMut) -> Result<(), SystemError> {
		Self::SERIALIZATION_VERSION.serialize(&mut write_buf)?;
		self.scalar_field.serialize(&mut write_buf)?;
		self.system_type.serialize(&mut write_buf)?;
		self.instructions.serialize(&mut write_buf)?;

		// blueprints are polymorphic: serialized by tag
		self.blueprints.len().serialize(&mut write_buf)?;
		for blueprint in &self.blueprints {
			blueprint.tag().serialize(&mut write_buf)?;
		}

		self.calldata.serialize(&mut write_buf)?;
		self.nb_constraints.serialize(&mut write_buf)?;
		self.nb_internal_variables.serialize(&mut write_buf)?;
		self.public.serialize(&mut write_buf)?;
		self.secret.serialize(&mut write_buf)?;

		// hint dependencies, sorted by id for a deterministic encoding
		let mut dependencies: Vec<(HintId, &String)> =
			self.hint_dependencies.iter().map(|(id, name)| (*id, name)).collect();
		dependencies.sort_by_key(|(id, _)| *id);
		dependencies.len().serialize(&mut write_buf)?;
		for (id, name) in dependencies {
			id.serialize(&mut write_buf)?;
			name.serialize(&mut write_buf)?;
		}

		self.levels.serialize(&mut write_buf)?;
		self.commitment_info.serialize(&mut write_buf)?;

		self.coefficients.coefficients.len().serialize(&mut write_buf)?;
		for coeff in &self.coefficients.coefficients {
			write_fr(&mut write_buf, coeff)?;
		}
		Ok(())
	}

	/// Decodes a system from the buffer.
	///
	/// The scalar-field header is re-parsed and rejected when it does not
	/// match the running field.
	pub fn read_from(mut read_buf: impl Buf) -> Result<Self, SystemError> {
		let version = u32::deserialize(&mut read_buf)?;
		if version != Self::SERIALIZATION_VERSION {
			return Err(SerializationError::InvalidConstruction { name: "R1cs::version" }.into());
		}

		let scalar_field = String::deserialize(&mut read_buf)?;
		let system_type = u32::deserialize(&mut read_buf)?;
		if system_type != SYSTEM_TYPE_R1CS {
			return Err(
				SerializationError::InvalidConstruction { name: "R1cs::system_type" }.into()
			);
		}

		let instructions = Vec::<Instruction>::deserialize(&mut read_buf)?;

		let nb_blueprints = usize::deserialize(&mut read_buf)?;
		let mut blueprints: Vec<Box<dyn Blueprint>> = Vec::with_capacity(nb_blueprints);
		let mut generic_r1c = 0;
		let mut generic_hint = 0;
		for id in 0..nb_blueprints {
			let tag = u8::deserialize(&mut read_buf)?;
			match tag {
				TAG_GENERIC_R1C => {
					generic_r1c = id as BlueprintId;
					blueprints.push(Box::new(GenericR1C));
				}
				TAG_GENERIC_HINT => {
					generic_hint = id as BlueprintId;
					blueprints.push(Box::new(GenericHint));
				}
				index => {
					return Err(SerializationError::UnknownEnumVariant {
						name: "Blueprint",
						index,
					}
					.into())
				}
			}
		}

		let calldata = Vec::<u32>::deserialize(&mut read_buf)?;
		let nb_constraints = usize::deserialize(&mut read_buf)?;
		let nb_internal_variables = usize::deserialize(&mut read_buf)?;
		let public = Vec::<String>::deserialize(&mut read_buf)?;
		let secret = Vec::<String>::deserialize(&mut read_buf)?;

		let nb_dependencies = usize::deserialize(&mut read_buf)?;
		let mut hint_dependencies = HashMap::with_capacity(nb_dependencies);
		for _ in 0..nb_dependencies {
			let id = u64::deserialize(&mut read_buf)?;
			let name = String::deserialize(&mut read_buf)?;
			hint_dependencies.insert(id, name);
		}

		let levels = Vec::<Vec<u32>>::deserialize(&mut read_buf)?;
		let commitment_info = Option::<Commitment>::deserialize(&mut read_buf)?;

		let nb_coefficients = usize::deserialize(&mut read_buf)?;
		let mut coefficients = Vec::with_capacity(nb_coefficients);
		for _ in 0..nb_coefficients {
			coefficients.push(read_fr(&mut read_buf)?);
		}

		// check the serialization header against the running field
		let parsed = BigUint::from_str_radix(&scalar_field, 16).map_err(|_| {
			SerializationError::InvalidConstruction { name: "R1cs::scalar_field" }
		})?;
		if parsed != *modulus() {
			return Err(SystemError::ScalarFieldMismatch {
				expected: modulus_hex(),
				got: scalar_field,
			});
		}

		let mut system = R1cs {
			scalar_field,
			system_type,
			instructions,
			blueprints,
			calldata,
			nb_constraints,
			nb_internal_variables,
			public,
			secret,
			hint_dependencies,
			levels,
			commitment_info,
			coefficients: CoeffTable::from_coefficients(coefficients),
			generic_r1c,
			generic_hint,
			lb_wire_level: Vec::new(),
			lb_outputs: Vec::new(),
		};
		system.rebuild_level_state();
		Ok(system)
	}
}

impl Resolver for R1cs {
	fn coeff_to_string(&self, cid: u32) -> String {
		self.coefficients.coeff_to_string(cid)
	}

	fn variable_to_string(&self, vid: u32) -> String {
		let vid = vid as usize;
		if vid < self.public.len() {
			return self.public[vid].clone();
		}
		let vid = vid - self.public.len();
		if vid < self.secret.len() {
			return self.secret[vid].clone();
		}
		format!("v{}", vid - self.secret.len())
	}
}
