// Copyright 2025 Irreducible Inc.

//! Utility modules used across the g16 workspace.

pub mod cell;
pub mod pool;
pub mod serialization;

pub use bytes;
pub use serialization::{DeserializeBytes, SerializationError, SerializeBytes};
