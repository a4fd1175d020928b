// Copyright 2025 Irreducible Inc.

//! End-to-end solving scenarios.

use ark_ff::{Field, One, Zero};
use g16_core::{
	Blueprint, BlueprintSolvable, HintMapping, Instruction, R1cs, SolveError, SolverOpts,
	SolverView, Term, COEFF_ONE, R1C,
};
use g16_field::Fr;
use g16_hints::hint_id;
use g16_witness::Witness;
use num_bigint::BigInt;
use rand::{rngs::StdRng, RngCore, SeedableRng};

fn witness(nb_public: usize, nb_secret: usize, values: &[u64]) -> Witness {
	let mut w = Witness::new();
	w.fill(nb_public, nb_secret, values.iter().copied()).unwrap();
	w
}

fn empty_witness() -> Witness {
	witness(0, 0, &[])
}

/// `z = x · y` as one R1C, with `z` public and `x`, `y` secret.
fn mul_system() -> (R1cs, u32) {
	let mut cs = R1cs::new(4);
	let z = cs.add_public_variable("z");
	let x = cs.add_secret_variable("x");
	let y = cs.add_secret_variable("y");
	let tx = cs.make_term(Fr::one(), x);
	let ty = cs.make_term(Fr::one(), y);
	let tz = cs.make_term(Fr::one(), z);
	cs.add_r1c(&R1C { l: vec![tx], r: vec![ty], o: vec![tz] });
	(cs, z)
}

/// `x · inv == 1` with `inv` computed by the named hint on input `x`.
fn inv_system(hint_name: &str) -> (R1cs, u32) {
	let mut cs = R1cs::new(4);
	let x = cs.add_secret_variable("x");
	let inv = cs.add_internal_variable();
	let tx = cs.make_term(Fr::one(), x);
	cs.add_hint_mapping(
		hint_name,
		&HintMapping {
			hint_id: hint_id(hint_name),
			inputs: vec![vec![tx]],
			output_range: inv..inv + 1,
		},
	);
	let tinv = cs.make_term(Fr::one(), inv);
	let tone = Term::new(COEFF_ONE, 0);
	cs.add_r1c(&R1C { l: vec![tx], r: vec![tinv], o: vec![tone] });
	(cs, inv)
}

#[test]
fn test_identity_circuit() {
	// Y = X with X secret, Y public compiles to no constraint at all; the
	// witness carries both copies.
	let mut cs = R1cs::new(1);
	cs.add_public_variable("y");
	cs.add_secret_variable("x");

	let solution = cs.solve(&witness(1, 1, &[7, 7]), &SolverOpts::default()).unwrap();
	assert_eq!(solution.w, [Fr::one(), Fr::from(7u64), Fr::from(7u64)]);
	assert!(solution.a.is_empty());
	assert!(solution.b.is_empty());
	assert!(solution.c.is_empty());
}

#[test]
fn test_multiplication_constraint() {
	let (cs, z) = mul_system();
	let solution = cs.solve(&witness(1, 2, &[15, 3, 5]), &SolverOpts::default()).unwrap();
	assert_eq!(solution.w[0], Fr::one());
	assert_eq!(solution.w[z as usize], Fr::from(15u64));
	assert_eq!(solution.a, [Fr::from(3u64)]);
	assert_eq!(solution.b, [Fr::from(5u64)]);
	assert_eq!(solution.c, [Fr::from(15u64)]);
}

#[test]
fn test_unsatisfied_constraint() {
	let (cs, _) = mul_system();
	let err = cs.solve(&witness(1, 2, &[16, 3, 5]), &SolverOpts::default()).unwrap_err();
	match err {
		SolveError::Unsatisfied { constraint, .. } => assert_eq!(constraint, 0),
		other => panic!("expected Unsatisfied, got {other}"),
	}
}

#[test]
fn test_invalid_witness_size() {
	let (cs, _) = mul_system();
	let err = cs.solve(&witness(1, 1, &[15, 3]), &SolverOpts::default()).unwrap_err();
	assert!(matches!(err, SolveError::InvalidWitnessSize { got: 2, expected: 3 }));
}

#[test]
fn test_hint_computed_wire() {
	let (cs, inv) = inv_system("inv_zero");
	let solution = cs.solve(&witness(0, 1, &[2]), &SolverOpts::default()).unwrap();
	assert_eq!(solution.w[inv as usize], Fr::from(2u64).inverse().unwrap());
	assert_eq!(solution.a[0] * solution.b[0], solution.c[0]);
	assert_eq!(solution.c[0], Fr::one());
}

#[test]
fn test_inv_zero_hint_on_zero_input() {
	// The hint maps 0 to 0 and the constraint becomes 0 · 0 == 1.
	let (cs, _) = inv_system("inv_zero");
	let err = cs.solve(&witness(0, 1, &[0]), &SolverOpts::default()).unwrap_err();
	assert!(matches!(err, SolveError::Unsatisfied { constraint: 0, .. }));
}

#[test]
fn test_missing_hint() {
	let (cs, _) = inv_system("missing_inv");
	let err = cs.solve(&witness(0, 1, &[2]), &SolverOpts::default()).unwrap_err();
	match err {
		SolveError::MissingHints(names) => assert_eq!(names, ["missing_inv"]),
		other => panic!("expected MissingHints, got {other}"),
	}
}

#[test]
fn test_hint_override_via_opts() {
	let (cs, inv) = inv_system("custom_inv");
	let opts = SolverOpts::default().with_hint(hint_id("custom_inv"), g16_hints::inv_zero);
	let solution = cs.solve(&witness(0, 1, &[3]), &opts).unwrap();
	assert_eq!(solution.w[inv as usize], Fr::from(3u64).inverse().unwrap());
}

#[test]
fn test_failing_hint_is_reported_with_its_name() {
	fn failing(_q: &BigInt, _inputs: &[BigInt], _outputs: &mut [BigInt]) -> anyhow::Result<()> {
		anyhow::bail!("boom")
	}

	// An empty output range still invokes the hint.
	let mut cs = R1cs::new(1);
	cs.add_hint_mapping(
		"boom",
		&HintMapping { hint_id: hint_id("boom"), inputs: vec![], output_range: 1..1 },
	);
	let opts = SolverOpts::default().with_hint(hint_id("boom"), failing);
	let err = cs.solve(&empty_witness(), &opts).unwrap_err();
	match err {
		SolveError::Hint { name, source } => {
			assert_eq!(name, "boom");
			assert_eq!(source.to_string(), "boom");
		}
		other => panic!("expected Hint, got {other}"),
	}
}

#[test]
fn test_zero_annihilated_unknown_leaves_wire_unsolved() {
	// An unknown on L with R summing to zero reduces the constraint to
	// `0 == c`; nothing else produces the wire, so the solve is incomplete.
	let mut cs = R1cs::new(1);
	let u = cs.add_internal_variable();
	let tu = cs.make_term(Fr::one(), u);
	cs.add_r1c(&R1C { l: vec![tu], r: vec![], o: vec![] });

	let err = cs.solve(&empty_witness(), &SolverOpts::default()).unwrap_err();
	assert!(matches!(err, SolveError::Incomplete { solved: 1, total: 2 }));
}

#[test]
fn test_division_by_arbitrary_coefficients() {
	let mut cs = R1cs::new(2);
	let u = cs.add_internal_variable();
	let v = cs.add_internal_variable();
	let tone = Term::new(COEFF_ONE, 0);

	// 3·u · 1 == 12, coefficient outside the reserved set
	let l1 = cs.make_term(Fr::from(3u64), u);
	let o1 = cs.make_term(Fr::from(12u64), 0);
	cs.add_r1c(&R1C { l: vec![l1], r: vec![tone], o: vec![o1] });

	// −2·v · 1 == 6, the reserved MINUS_TWO also takes the inversion path
	let l2 = cs.make_term(-Fr::from(2u64), v);
	let o2 = cs.make_term(Fr::from(6u64), 0);
	cs.add_r1c(&R1C { l: vec![l2], r: vec![tone], o: vec![o2] });

	let solution = cs.solve(&empty_witness(), &SolverOpts::default()).unwrap();
	assert_eq!(solution.w[u as usize], Fr::from(4u64));
	assert_eq!(solution.w[v as usize], -Fr::from(3u64));
}

#[test]
fn test_unknown_on_each_side() {
	// u · 5 == 20 solves the left side, 4 · w == 20 the right side,
	// 4 · 5 == o the output side.
	let mut cs = R1cs::new(3);
	let u = cs.add_internal_variable();
	let w = cs.add_internal_variable();
	let o = cs.add_internal_variable();
	let four = cs.make_term(Fr::from(4u64), 0);
	let five = cs.make_term(Fr::from(5u64), 0);
	let twenty = cs.make_term(Fr::from(20u64), 0);
	let tu = cs.make_term(Fr::one(), u);
	let tw = cs.make_term(Fr::one(), w);
	let to = cs.make_term(Fr::one(), o);
	cs.add_r1c(&R1C { l: vec![tu], r: vec![five], o: vec![twenty] });
	cs.add_r1c(&R1C { l: vec![four], r: vec![tw], o: vec![twenty] });
	cs.add_r1c(&R1C { l: vec![four], r: vec![five], o: vec![to] });

	let solution = cs.solve(&empty_witness(), &SolverOpts::default()).unwrap();
	assert_eq!(solution.w[u as usize], Fr::from(4u64));
	assert_eq!(solution.w[w as usize], Fr::from(5u64));
	assert_eq!(solution.w[o as usize], Fr::from(20u64));
	for i in 0..3 {
		assert_eq!(solution.a[i] * solution.b[i], solution.c[i], "constraint {i}");
	}
}

#[test]
fn test_parallel_level() {
	// 10,000 independent constraints `xᵢ · 1 == xᵢ`, each xᵢ hint-computed
	// from a constant seed. The hint level and the constraint level are both
	// wide enough to fan out.
	const N: usize = 10_000;

	let mut cs = R1cs::new(N);
	let mut wires = Vec::with_capacity(N);
	for i in 0..N {
		let xi = cs.add_internal_variable();
		let mut seed = cs.make_term(Fr::from((i + 1) as u64), 0);
		seed.mark_constant();
		cs.add_hint_mapping(
			"inv_zero",
			&HintMapping {
				hint_id: hint_id("inv_zero"),
				inputs: vec![vec![seed]],
				output_range: xi..xi + 1,
			},
		);
		wires.push(xi);
	}
	let tone = Term::new(COEFF_ONE, 0);
	for &xi in &wires {
		let txi = cs.make_term(Fr::one(), xi);
		cs.add_r1c(&R1C { l: vec![txi], r: vec![tone], o: vec![txi] });
	}
	assert_eq!(cs.levels.len(), 2);
	assert_eq!(cs.levels[0].len(), N);
	assert_eq!(cs.levels[1].len(), N);

	let solution = cs.solve(&empty_witness(), &SolverOpts::default()).unwrap();
	assert_eq!(solution.w.len(), N + 1);
	for (i, &xi) in wires.iter().enumerate() {
		let expected = Fr::from((i + 1) as u64).inverse().unwrap();
		assert_eq!(solution.w[xi as usize], expected, "wire {i}");
		assert_eq!(solution.a[i], expected);
		assert_eq!(solution.b[i], Fr::one());
		assert_eq!(solution.c[i], expected);
	}
}

#[test]
fn test_parallel_level_reports_first_error_after_draining() {
	// One poisoned constraint in a wide level: the level completes and the
	// error surfaces.
	const N: usize = 2_000;

	let mut cs = R1cs::new(N);
	let tone = Term::new(COEFF_ONE, 0);
	let ttwo = cs.make_term(Fr::from(2u64), 0);
	for i in 0..N {
		// `1 · 1 == 1` everywhere except one `1 · 1 == 2`
		let o = if i == N / 2 { ttwo } else { tone };
		cs.add_r1c(&R1C { l: vec![tone], r: vec![tone], o: vec![o] });
	}

	let err = cs.solve(&empty_witness(), &SolverOpts::default()).unwrap_err();
	match err {
		SolveError::Unsatisfied { constraint, .. } => assert_eq!(constraint, (N / 2) as u32),
		other => panic!("expected Unsatisfied, got {other}"),
	}
}

#[test]
fn test_random_multiplication_batch() {
	// zᵢ = xᵢ · yᵢ over random inputs; every zᵢ is an internal wire solved
	// through the unknown-on-O path.
	let mut rng = StdRng::seed_from_u64(0);
	const N: usize = 64;

	let mut cs = R1cs::new(N);
	let mut inputs = Vec::with_capacity(N);
	for i in 0..N {
		cs.add_secret_variable(&format!("x{i}"));
		cs.add_secret_variable(&format!("y{i}"));
		inputs.push((rng.next_u64(), rng.next_u64()));
	}
	let mut products = Vec::with_capacity(N);
	for i in 0..N {
		let z = cs.add_internal_variable();
		let tx = cs.make_term(Fr::one(), (1 + 2 * i) as u32);
		let ty = cs.make_term(Fr::one(), (2 + 2 * i) as u32);
		let tz = cs.make_term(Fr::one(), z);
		cs.add_r1c(&R1C { l: vec![tx], r: vec![ty], o: vec![tz] });
		products.push(z);
	}

	let mut w = Witness::new();
	w.fill(0, 2 * N, inputs.iter().flat_map(|&(x, y)| [x, y])).unwrap();
	let solution = cs.solve(&w, &SolverOpts::default()).unwrap();
	for (i, &z) in products.iter().enumerate() {
		let (x, y) = inputs[i];
		assert_eq!(solution.w[z as usize], Fr::from(x) * Fr::from(y), "product {i}");
		assert_eq!(solution.a[i] * solution.b[i], solution.c[i]);
	}
}

#[test]
fn test_solve_after_serialization_round_trip() {
	let (cs, z) = mul_system();
	let mut buf = Vec::new();
	cs.write_to(&mut buf).unwrap();

	let decoded = R1cs::read_from(&mut buf.as_slice()).unwrap();
	let solution = decoded.solve(&witness(1, 2, &[15, 3, 5]), &SolverOpts::default()).unwrap();
	assert_eq!(solution.w[z as usize], Fr::from(15u64));
}

/// A self-solving blueprint: calldata `[in_wire, out_wire]`, assigns
/// `out = in²`.
#[derive(Debug)]
struct SquareBlueprint;

impl Blueprint for SquareBlueprint {
	fn nb_inputs(&self) -> i32 {
		2
	}

	fn nb_constraints(&self) -> u32 {
		0
	}

	fn tag(&self) -> u8 {
		64
	}

	fn as_solvable(&self) -> Option<&dyn BlueprintSolvable> {
		Some(self)
	}
}

impl BlueprintSolvable for SquareBlueprint {
	fn solve(&self, solver: &dyn SolverView, calldata: &[u32]) -> Result<(), SolveError> {
		assert!(solver.is_solved(calldata[0]));
		let value = solver.get_value(COEFF_ONE, calldata[0]);
		solver.set_value(calldata[1], value.square());
		Ok(())
	}
}

#[test]
fn test_self_solving_blueprint() {
	let mut cs = R1cs::new(1);
	let x = cs.add_secret_variable("x");
	let sq = cs.add_internal_variable();
	let bid = cs.add_blueprint(Box::new(SquareBlueprint));

	// the blueprint has a static calldata size, so no length prefix
	cs.instructions.push(Instruction {
		blueprint_id: bid,
		constraint_offset: 0,
		start_calldata: cs.calldata.len() as u64,
	});
	cs.calldata.extend([x, sq]);
	cs.levels.push(vec![0]);

	let solution = cs.solve(&witness(0, 1, &[9]), &SolverOpts::default()).unwrap();
	assert_eq!(solution.w[sq as usize], Fr::from(81u64));
	assert!(solution.w.iter().all(|v| !v.is_zero()));
}
