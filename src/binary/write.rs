#![deny(missing_docs)]

//! Write binary data
//!
//! Tables are written into a `WriteBuffer`. Fields whose value is only known once later data
//! has been written, such as offsets and lengths, are reserved with a `Placeholder` and
//! filled in afterwards.

use std::collections::TryReserveError;
use std::marker::PhantomData;

use crate::binary::read::{ReadFixed, ReadScope};
use crate::binary::{I16Be, I32Be, I64Be, U16Be, U32Be, U8};
use crate::error::WriteError;

/// An in-memory buffer that implements `WriteContext`.
#[derive(Debug, Default)]
pub struct WriteBuffer {
    data: Vec<u8>,
}

/// Fixed size window of a `WriteBuffer` that a placeholder value is written through.
struct PlaceholderSlot<'a> {
    written: usize,
    data: &'a mut [u8],
}

/// A reserved, zeroed region of a `WriteBuffer` that will later hold a `T`.
///
/// Placeholders are consumed by `WriteContext::write_placeholder`.
pub struct Placeholder<T, HostType> {
    offset: usize,
    marker: PhantomData<fn(HostType) -> T>,
}

/// Trait that describes a type that can be written to a `WriteContext` in binary form.
pub trait WriteBinary<HostType = Self> {
    /// The type of the value returned by `write`.
    type Output;

    /// Write the binary representation of Self to `ctxt`.
    fn write<C: WriteContext>(ctxt: &mut C, val: HostType) -> Result<Self::Output, WriteError>;
}

/// Trait for types that can have binary data written to them.
pub trait WriteContext {
    /// Write each value of `vec` as a `T`.
    fn write_vec<T, HostType>(&mut self, vec: Vec<HostType>) -> Result<(), WriteError>
    where
        Self: Sized,
        T: WriteBinary<HostType>,
    {
        self.write_iter::<T, HostType>(vec.into_iter())
    }

    /// Write each value yielded by `iter` as a `T`.
    fn write_iter<T, HostType>(
        &mut self,
        iter: impl Iterator<Item = HostType>,
    ) -> Result<(), WriteError>
    where
        Self: Sized,
        T: WriteBinary<HostType>,
    {
        iter.map(|val| T::write(self, val).map(|_| ())).collect()
    }

    /// Write a slice of bytes.
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), WriteError>;

    /// Write `count` zero bytes.
    fn write_zeros(&mut self, count: usize) -> Result<(), WriteError>;

    /// The total number of bytes written so far.
    fn bytes_written(&self) -> usize;

    /// Reserve space for a `T` at the current position, to be filled in later.
    fn placeholder<T, HostType>(&mut self) -> Result<Placeholder<T, HostType>, WriteError>
    where
        T: WriteBinary<HostType> + ReadFixed,
    {
        let offset = self.bytes_written();
        self.write_zeros(T::SIZE)?;
        Ok(Placeholder {
            offset,
            marker: PhantomData,
        })
    }

    /// Write `val` into the space reserved by `placeholder`.
    fn write_placeholder<T, HostType>(
        &mut self,
        placeholder: Placeholder<T, HostType>,
        val: HostType,
    ) -> Result<T::Output, WriteError>
    where
        T: WriteBinary<HostType> + ReadFixed;
}

macro_rules! write_int {
    ($($marker:ty => $host:ty),+ $(,)?) => {
        $(
            impl<T: Into<$host>> WriteBinary<T> for $marker {
                type Output = ();

                fn write<C: WriteContext>(ctxt: &mut C, val: T) -> Result<(), WriteError> {
                    let val: $host = val.into();
                    ctxt.write_bytes(&val.to_be_bytes())
                }
            }
        )+
    };
}

write_int! {
    U8 => u8,
    U16Be => u16,
    I16Be => i16,
    U32Be => u32,
    I32Be => i32,
    I64Be => i64,
}

impl WriteContext for WriteBuffer {
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), WriteError> {
        self.data.extend_from_slice(data);
        Ok(())
    }

    fn write_zeros(&mut self, count: usize) -> Result<(), WriteError> {
        self.data.resize(self.data.len() + count, 0);
        Ok(())
    }

    fn bytes_written(&self) -> usize {
        self.data.len()
    }

    fn write_placeholder<T, HostType>(
        &mut self,
        placeholder: Placeholder<T, HostType>,
        val: HostType,
    ) -> Result<T::Output, WriteError>
    where
        T: WriteBinary<HostType> + ReadFixed,
    {
        let data = placeholder
            .offset
            .checked_add(T::SIZE)
            .and_then(|end| self.data.get_mut(placeholder.offset..end))
            .ok_or(WriteError::PlaceholderMismatch)?;
        let mut slot = PlaceholderSlot { written: 0, data };
        let output = T::write(&mut slot, val)?;
        if slot.written == T::SIZE {
            Ok(output)
        } else {
            Err(WriteError::PlaceholderMismatch)
        }
    }
}

impl PlaceholderSlot<'_> {
    fn next(&mut self, count: usize) -> Result<&mut [u8], WriteError> {
        let start = self.written;
        self.written += count;
        self.data
            .get_mut(start..start + count)
            .ok_or(WriteError::PlaceholderMismatch)
    }
}

impl WriteContext for PlaceholderSlot<'_> {
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), WriteError> {
        self.next(data.len())?.copy_from_slice(data);
        Ok(())
    }

    fn write_zeros(&mut self, count: usize) -> Result<(), WriteError> {
        self.next(count)?.fill(0);
        Ok(())
    }

    fn bytes_written(&self) -> usize {
        self.written
    }

    fn write_placeholder<T, HostType>(
        &mut self,
        _placeholder: Placeholder<T, HostType>,
        _val: HostType,
    ) -> Result<T::Output, WriteError>
    where
        T: WriteBinary<HostType> + ReadFixed,
    {
        Err(WriteError::PlaceholderMismatch)
    }
}

impl WriteBinary for ReadScope<'_> {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, scope: Self) -> Result<(), WriteError> {
        ctxt.write_bytes(scope.data())
    }
}

impl WriteBuffer {
    /// Create a new, empty `WriteBuffer`
    pub fn new() -> Self {
        WriteBuffer::default()
    }

    /// The data written so far.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// The number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing has been written to this buffer
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reserve capacity for at least `additional` more bytes, failing instead of aborting
    /// when the allocation can't be made.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.data.try_reserve(additional)
    }

    /// Consume `self` and return the inner buffer
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}
