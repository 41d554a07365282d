#![allow(missing_docs)]

//! Parse binary data
//!
//! Every table the subsetter looks at is decoded through the types in this module. A
//! `ReadScope` is an immutable window onto the font data and a `ReadCtxt` is a cursor over a
//! scope. Types describe how they are decoded by implementing one of `ReadBinary`,
//! `ReadBinaryDep`, `ReadFixed`, or `ReadFrom`.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::slice::ChunksExact;

use crate::binary::{I16Be, I32Be, I64Be, U16Be, U32Be, U8};
use crate::error::ParseError;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ReadScope<'a> {
    data: &'a [u8],
}

#[derive(Clone)]
pub struct ReadCtxt<'a> {
    scope: ReadScope<'a>,
    offset: usize,
}

pub trait ReadBinary {
    type HostType<'a>: Sized; // default = Self

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError>;
}

pub trait ReadBinaryDep {
    type Args<'a>: Copy;
    type HostType<'a>: Sized; // default = Self

    fn read_dep<'a>(
        ctxt: &mut ReadCtxt<'a>,
        args: Self::Args<'a>,
    ) -> Result<Self::HostType<'a>, ParseError>;
}

/// A value encoded in a fixed number of bytes.
///
/// Decoding can't fail once `SIZE` bytes are in hand, which is what lets `ReadArray` decode
/// its items lazily.
pub trait ReadFixed {
    type HostType: Sized;

    const SIZE: usize;

    /// Decode a value from `bytes`, which holds exactly `SIZE` bytes.
    fn decode(bytes: &[u8]) -> Self::HostType;
}

/// A record decoded by converting the value of a fixed size `ReadType`.
pub trait ReadFrom {
    type ReadType: ReadFixed;
    fn read_from(value: <Self::ReadType as ReadFixed>::HostType) -> Self;
}

impl<T: ReadFrom> ReadFixed for T {
    type HostType = T;

    const SIZE: usize = T::ReadType::SIZE;

    fn decode(bytes: &[u8]) -> T {
        T::read_from(T::ReadType::decode(bytes))
    }
}

impl<T: ReadFixed> ReadBinary for T {
    type HostType<'a> = T::HostType;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError> {
        ctxt.read_slice(T::SIZE).map(T::decode)
    }
}

impl<T: ReadBinary> ReadBinaryDep for T {
    type Args<'a> = ();
    type HostType<'a> = T::HostType<'a>;

    fn read_dep<'a>(
        ctxt: &mut ReadCtxt<'a>,
        (): Self::Args<'_>,
    ) -> Result<Self::HostType<'a>, ParseError> {
        T::read(ctxt)
    }
}

macro_rules! read_fixed_int {
    ($($marker:ty => $host:ty),+ $(,)?) => {
        $(
            impl ReadFixed for $marker {
                type HostType = $host;

                const SIZE: usize = std::mem::size_of::<$host>();

                fn decode(bytes: &[u8]) -> $host {
                    let mut buf = [0; std::mem::size_of::<$host>()];
                    buf.copy_from_slice(&bytes[..Self::SIZE]);
                    <$host>::from_be_bytes(buf)
                }
            }
        )+
    };
}

read_fixed_int! {
    U8 => u8,
    U16Be => u16,
    I16Be => i16,
    U32Be => u32,
    I32Be => i32,
    I64Be => i64,
}

// Fields are decoded left to right, each from the bytes following the previous one.
macro_rules! read_fixed_tuple {
    ($($field:ident),+) => {
        impl<$($field: ReadFixed),+> ReadFixed for ($($field,)+) {
            type HostType = ($($field::HostType,)+);

            const SIZE: usize = 0 $(+ $field::SIZE)+;

            #[allow(unused_assignments)]
            fn decode(bytes: &[u8]) -> Self::HostType {
                let mut start = 0;
                ($({
                    let end = start + $field::SIZE;
                    let value = $field::decode(&bytes[start..end]);
                    start = end;
                    value
                },)+)
            }
        }
    };
}

read_fixed_tuple!(A, B);
read_fixed_tuple!(A, B, C);
read_fixed_tuple!(A, B, C, D);

/// A lazily decoded array of fixed size items borrowed from the font data.
pub struct ReadArray<'a, T> {
    data: &'a [u8],
    length: usize,
    item: PhantomData<T>,
}

pub struct ReadArrayIter<'a, T> {
    chunks: ChunksExact<'a, u8>,
    item: PhantomData<T>,
}

impl<'a> ReadScope<'a> {
    pub fn new(data: &'a [u8]) -> ReadScope<'a> {
        ReadScope { data }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The scope starting `offset` bytes in, empty if `offset` is past the end.
    pub fn offset(&self, offset: usize) -> ReadScope<'a> {
        ReadScope::new(self.data.get(offset..).unwrap_or_default())
    }

    /// Narrow the scope to `length` bytes starting at `offset`.
    ///
    /// Fails with `BadOffset` if `offset` is outside the scope and `BadEof` if the range runs
    /// past the end of it. An empty range is always valid.
    pub fn offset_length(&self, offset: usize, length: usize) -> Result<ReadScope<'a>, ParseError> {
        if length == 0 {
            return Ok(ReadScope::new(&[]));
        }
        let tail = self
            .data
            .get(offset..)
            .filter(|tail| !tail.is_empty())
            .ok_or(ParseError::BadOffset)?;
        tail.get(..length)
            .map(ReadScope::new)
            .ok_or(ParseError::BadEof)
    }

    pub fn ctxt(&self) -> ReadCtxt<'a> {
        ReadCtxt {
            scope: *self,
            offset: 0,
        }
    }

    pub fn read<T: ReadBinaryDep<Args<'a> = ()>>(&self) -> Result<T::HostType<'a>, ParseError> {
        self.ctxt().read::<T>()
    }

    pub fn read_dep<T: ReadBinaryDep>(
        &self,
        args: T::Args<'a>,
    ) -> Result<T::HostType<'a>, ParseError> {
        self.ctxt().read_dep::<T>(args)
    }
}

impl<'a> ReadCtxt<'a> {
    /// Check a condition, returning `ParseError::BadValue` if `false`.
    pub fn check(&self, cond: bool) -> Result<(), ParseError> {
        cond.then_some(()).ok_or(ParseError::BadValue)
    }

    /// Check a condition, returning `ParseError::BadVersion` if `false`.
    ///
    /// ```
    /// use ttfsubset::binary::read::ReadScope;
    /// use ttfsubset::error::ParseError;
    ///
    /// let scope = ReadScope::new(&[0, 4]);
    /// let mut ctxt = scope.ctxt();
    /// let format = ctxt.read_u16be().expect("unable to read format");
    ///
    /// assert!(ctxt.check_version(format == 4).is_ok());
    /// assert_eq!(ctxt.check_version(format == 12), Err(ParseError::BadVersion));
    /// ```
    pub fn check_version(&self, cond: bool) -> Result<(), ParseError> {
        cond.then_some(()).ok_or(ParseError::BadVersion)
    }

    /// The unread remainder of the scope.
    pub fn scope(&self) -> ReadScope<'a> {
        self.scope.offset(self.offset)
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn read<T: ReadBinaryDep<Args<'a> = ()>>(&mut self) -> Result<T::HostType<'a>, ParseError> {
        T::read_dep(self, ())
    }

    pub fn read_dep<T: ReadBinaryDep>(
        &mut self,
        args: T::Args<'a>,
    ) -> Result<T::HostType<'a>, ParseError> {
        T::read_dep(self, args)
    }

    pub fn bytes_available(&self) -> bool {
        self.offset < self.scope.data.len()
    }

    pub fn read_u16be(&mut self) -> Result<u16, ParseError> {
        self.read::<U16Be>()
    }

    pub fn read_i16be(&mut self) -> Result<i16, ParseError> {
        self.read::<I16Be>()
    }

    pub fn read_u32be(&mut self) -> Result<u32, ParseError> {
        self.read::<U32Be>()
    }

    pub fn read_i32be(&mut self) -> Result<i32, ParseError> {
        self.read::<I32Be>()
    }

    /// Borrow the next `length` items as an array.
    pub fn read_array<T: ReadFixed>(&mut self, length: usize) -> Result<ReadArray<'a, T>, ParseError> {
        let byte_length = length.checked_mul(T::SIZE).ok_or(ParseError::BadValue)?;
        let data = self.read_slice(byte_length)?;
        Ok(ReadArray {
            data,
            length,
            item: PhantomData,
        })
    }

    /// Skip `length` bytes, failing if fewer are available.
    pub fn skip(&mut self, length: usize) -> Result<(), ParseError> {
        self.read_slice(length).map(|_| ())
    }

    /// Consume the next `length` bytes. Nothing is consumed when fewer are available.
    pub fn read_slice(&mut self, length: usize) -> Result<&'a [u8], ParseError> {
        let bytes = self
            .offset
            .checked_add(length)
            .and_then(|end| self.scope.data.get(self.offset..end))
            .ok_or(ParseError::BadEof)?;
        self.offset += length;
        Ok(bytes)
    }
}

impl<T> Clone for ReadArray<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ReadArray<'_, T> {}

impl<'a, T: ReadFixed> ReadArray<'a, T> {
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn get_item(&self, index: usize) -> Option<T::HostType> {
        let start = index.checked_mul(T::SIZE)?;
        self.data.get(start..start + T::SIZE).map(T::decode)
    }

    pub fn last(&self) -> Option<T::HostType> {
        self.get_item(self.length.checked_sub(1)?)
    }

    pub fn iter(&self) -> ReadArrayIter<'a, T> {
        ReadArrayIter {
            chunks: self.data.chunks_exact(T::SIZE),
            item: PhantomData,
        }
    }

    /// Binary search of an array sorted by `f`, with the same result as the slice method.
    pub fn binary_search_by<F>(&self, mut f: F) -> Result<usize, usize>
    where
        F: FnMut(T::HostType) -> Ordering,
    {
        let mut low = 0;
        let mut high = self.length;
        while low < high {
            let mid = low + (high - low) / 2;
            match self.get_item(mid).map(&mut f) {
                Some(Ordering::Less) => low = mid + 1,
                Some(Ordering::Greater) => high = mid,
                Some(Ordering::Equal) => return Ok(mid),
                None => break,
            }
        }
        Err(low)
    }
}

impl<T: ReadFixed> Iterator for ReadArrayIter<'_, T> {
    type Item = T::HostType;

    fn next(&mut self) -> Option<T::HostType> {
        self.chunks.next().map(T::decode)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl<T: ReadFixed> ExactSizeIterator for ReadArrayIter<'_, T> {}

impl<T> fmt::Debug for ReadArray<'_, T>
where
    T: ReadFixed,
    T::HostType: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
