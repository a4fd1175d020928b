// Copyright 2025 Irreducible Inc.

//! Byte-level serialization over [`bytes`] buffers.
//!
//! Two framing conventions live here. The self-describing constraint-system
//! codec is built from [`SerializeBytes`]/[`DeserializeBytes`]: primitives
//! little-endian, collections behind a `u32` length prefix. The witness wire
//! protocol is big-endian by contract; its `u32` count framing is the
//! [`write_count_be`]/[`read_count_be`] pair, shared by the element-vector,
//! witness and solution codecs.

use bytes::{Buf, BufMut};
use thiserror::Error;

/// Serialize a value into a byte buffer.
pub trait SerializeBytes {
	fn serialize(&self, write_buf: impl BufMut) -> Result<(), SerializationError>;
}

/// Deserialize a value from a byte buffer.
pub trait DeserializeBytes {
	fn deserialize(read_buf: impl Buf) -> Result<Self, SerializationError>
	where
		Self: Sized;
}

#[derive(Error, Debug, Clone)]
pub enum SerializationError {
	#[error("write buffer is full")]
	WriteBufferFull,
	#[error("not enough data in read buffer to deserialize")]
	NotEnoughBytes,
	#[error("unknown enum variant index {name}::{index}")]
	UnknownEnumVariant { name: &'static str, index: u8 },
	#[error("FromUtf8Error: {0}")]
	FromUtf8Error(#[from] std::string::FromUtf8Error),
	#[error("invalid construction of {name}")]
	InvalidConstruction { name: &'static str },
	#[error("usize {size} is too large to serialize (max is {max})", max = u32::MAX)]
	UsizeTooLarge { size: usize },
}

impl<T: SerializeBytes + ?Sized> SerializeBytes for &T {
	fn serialize(&self, write_buf: impl BufMut) -> Result<(), SerializationError> {
		(**self).serialize(write_buf)
	}
}

macro_rules! impl_int_serialization {
	($($ty:ty => $put:ident, $get:ident;)*) => {
		$(
			impl SerializeBytes for $ty {
				fn serialize(
					&self,
					mut write_buf: impl BufMut,
				) -> Result<(), SerializationError> {
					assert_enough_space_for(&write_buf, std::mem::size_of::<Self>())?;
					write_buf.$put(*self);
					Ok(())
				}
			}

			impl DeserializeBytes for $ty {
				fn deserialize(mut read_buf: impl Buf) -> Result<Self, SerializationError>
				where
					Self: Sized,
				{
					assert_enough_data_for(&read_buf, std::mem::size_of::<Self>())?;
					Ok(read_buf.$get())
				}
			}
		)*
	};
}

impl_int_serialization! {
	u8 => put_u8, get_u8;
	u32 => put_u32_le, get_u32_le;
	u64 => put_u64_le, get_u64_le;
}

impl SerializeBytes for usize {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		let value: u32 = (*self)
			.try_into()
			.map_err(|_| SerializationError::UsizeTooLarge { size: *self })?;
		SerializeBytes::serialize(&value, &mut write_buf)
	}
}

impl DeserializeBytes for usize {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, SerializationError>
	where
		Self: Sized,
	{
		let value: u32 = DeserializeBytes::deserialize(&mut read_buf)?;
		Ok(value as Self)
	}
}

impl SerializeBytes for bool {
	fn serialize(&self, write_buf: impl BufMut) -> Result<(), SerializationError> {
		u8::serialize(&(*self as u8), write_buf)
	}
}

impl DeserializeBytes for bool {
	fn deserialize(read_buf: impl Buf) -> Result<Self, SerializationError>
	where
		Self: Sized,
	{
		Ok(u8::deserialize(read_buf)? != 0)
	}
}

impl SerializeBytes for &str {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		let bytes = self.as_bytes();
		SerializeBytes::serialize(&bytes.len(), &mut write_buf)?;
		assert_enough_space_for(&write_buf, bytes.len())?;
		write_buf.put_slice(bytes);
		Ok(())
	}
}

impl SerializeBytes for String {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		SerializeBytes::serialize(&self.as_str(), &mut write_buf)
	}
}

impl DeserializeBytes for String {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, SerializationError>
	where
		Self: Sized,
	{
		let len = DeserializeBytes::deserialize(&mut read_buf)?;
		assert_enough_data_for(&read_buf, len)?;
		Ok(Self::from_utf8(read_buf.copy_to_bytes(len).to_vec())?)
	}
}

impl<T: SerializeBytes> SerializeBytes for [T] {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		SerializeBytes::serialize(&self.len(), &mut write_buf)?;
		self.iter()
			.try_for_each(|item| SerializeBytes::serialize(item, &mut write_buf))
	}
}

impl<T: SerializeBytes> SerializeBytes for Vec<T> {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		SerializeBytes::serialize(self.as_slice(), &mut write_buf)
	}
}

impl<T: DeserializeBytes> DeserializeBytes for Vec<T> {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, SerializationError>
	where
		Self: Sized,
	{
		let len: usize = DeserializeBytes::deserialize(&mut read_buf)?;
		(0..len)
			.map(|_| DeserializeBytes::deserialize(&mut read_buf))
			.collect()
	}
}

impl<T: SerializeBytes> SerializeBytes for Option<T> {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		match self {
			Some(value) => {
				SerializeBytes::serialize(&true, &mut write_buf)?;
				SerializeBytes::serialize(value, &mut write_buf)?;
			}
			None => {
				SerializeBytes::serialize(&false, write_buf)?;
			}
		}
		Ok(())
	}
}

impl<T: DeserializeBytes> DeserializeBytes for Option<T> {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, SerializationError>
	where
		Self: Sized,
	{
		Ok(match bool::deserialize(&mut read_buf)? {
			true => Some(T::deserialize(&mut read_buf)?),
			false => None,
		})
	}
}

impl<U: SerializeBytes, V: SerializeBytes> SerializeBytes for (U, V) {
	fn serialize(&self, mut write_buf: impl BufMut) -> Result<(), SerializationError> {
		U::serialize(&self.0, &mut write_buf)?;
		V::serialize(&self.1, write_buf)
	}
}

impl<U: DeserializeBytes, V: DeserializeBytes> DeserializeBytes for (U, V) {
	fn deserialize(mut read_buf: impl Buf) -> Result<Self, SerializationError>
	where
		Self: Sized,
	{
		Ok((U::deserialize(&mut read_buf)?, V::deserialize(read_buf)?))
	}
}

/// Writes a `u32` count in big-endian, the framing of the witness wire
/// protocol.
pub fn write_count_be(mut write_buf: impl BufMut, count: usize) -> Result<(), SerializationError> {
	let count: u32 = count
		.try_into()
		.map_err(|_| SerializationError::UsizeTooLarge { size: count })?;
	assert_enough_space_for(&write_buf, std::mem::size_of::<u32>())?;
	write_buf.put_u32(count);
	Ok(())
}

/// Reads a big-endian `u32` count written by [`write_count_be`].
pub fn read_count_be(mut read_buf: impl Buf) -> Result<usize, SerializationError> {
	assert_enough_data_for(&read_buf, std::mem::size_of::<u32>())?;
	Ok(read_buf.get_u32() as usize)
}

#[inline]
pub fn assert_enough_space_for(
	write_buf: &impl BufMut,
	size: usize,
) -> Result<(), SerializationError> {
	if write_buf.remaining_mut() < size {
		return Err(SerializationError::WriteBufferFull);
	}
	Ok(())
}

#[inline]
pub fn assert_enough_data_for(read_buf: &impl Buf, size: usize) -> Result<(), SerializationError> {
	if read_buf.remaining() < size {
		return Err(SerializationError::NotEnoughBytes);
	}
	Ok(())
}
