// Copyright 2025 Irreducible Inc.

//! Rank-1 constraints and linear expressions.

use itertools::Itertools;

use crate::term::{Term, COEFF_ONE, COEFF_ZERO};

/// An ordered linear combination of terms.
pub type LinearExpression = Vec<Term>;

/// A rank-1 constraint: `(Σ L) · (Σ R) == (Σ O)` in the scalar field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct R1C {
	/// Left linear expression.
	pub l: LinearExpression,
	/// Right linear expression.
	pub r: LinearExpression,
	/// Output linear expression.
	pub o: LinearExpression,
}

impl R1C {
	/// Iterates every wire id referenced by the constraint, L then R then O.
	pub fn wire_ids(&self) -> impl Iterator<Item = u32> + '_ {
		self.l
			.iter()
			.chain(self.r.iter())
			.chain(self.o.iter())
			.map(|t| t.vid)
	}

	/// Renders the constraint as `L ⋅ R == O` with resolved names.
	pub fn render(&self, resolver: &dyn Resolver) -> String {
		format!(
			"{} ⋅ {} == {}",
			linear_expression_string(&self.l, resolver),
			linear_expression_string(&self.r, resolver),
			linear_expression_string(&self.o, resolver),
		)
	}
}

/// Resolves coefficient and wire ids to human-readable names when rendering
/// constraints.
pub trait Resolver {
	/// Renders the coefficient with the given id.
	fn coeff_to_string(&self, cid: u32) -> String;
	/// Renders the variable with the given id.
	fn variable_to_string(&self, vid: u32) -> String;
}

/// Renders a linear expression as ` + `-joined terms.
pub fn linear_expression_string(l: &LinearExpression, resolver: &dyn Resolver) -> String {
	l.iter().map(|t| term_string(t, resolver)).join(" + ")
}

fn term_string(t: &Term, resolver: &dyn Resolver) -> String {
	if t.cid == COEFF_ZERO {
		return "0".to_string();
	}
	if t.is_constant() {
		return resolver.coeff_to_string(t.cid);
	}
	let variable = resolver.variable_to_string(t.vid);
	if t.cid == COEFF_ONE {
		return variable;
	}
	let coeff = resolver.coeff_to_string(t.cid);
	if t.vid == 0 && variable == "one" {
		// the ONE wire: the coefficient alone reads better
		return coeff;
	}
	format!("{coeff}⋅{variable}")
}
