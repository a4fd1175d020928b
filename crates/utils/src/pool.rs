// Copyright 2025 Irreducible Inc.

//! Reusable big-integer allocations.
//!
//! Hint execution converts field elements to arbitrary-precision integers and
//! back for every instruction; the free list below keeps those allocations
//! alive across calls instead of round-tripping through the allocator.

use std::sync::Mutex;

use num_bigint::BigInt;
use num_traits::Zero;
use once_cell::sync::Lazy;

static POOL: Lazy<Mutex<Vec<BigInt>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Takes a zeroed big integer from the pool, allocating a fresh one when the
/// pool is empty.
pub fn take_bigint() -> BigInt {
	let mut pool = POOL.lock().expect("bigint pool poisoned");
	let mut n = pool.pop().unwrap_or_default();
	n.set_zero();
	n
}

/// Returns a big integer to the pool for reuse.
pub fn put_bigint(n: BigInt) {
	let mut pool = POOL.lock().expect("bigint pool poisoned");
	pool.push(n);
}
