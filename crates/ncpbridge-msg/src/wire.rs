//! Field-level wire encoding.
//!
//! Every multi-byte integer goes out low byte first, lists are copied
//! element by element at their fixed length, and variable-length byte
//! fields carry a one-byte length in front. Nothing relies on native struct
//! layout.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{MsgError, Result};

/// Longest variable-length field a one-byte length prefix can describe.
pub const MAX_VAR_FIELD: usize = u8::MAX as usize;

/// Bounds-checked reader over one message payload.
#[derive(Debug)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    message: &'static str,
}

impl<'a> Decoder<'a> {
    /// Read fields of the message called `message` from `buf`.
    pub fn new(message: &'static str, buf: &'a [u8]) -> Self {
        Self { buf, message }
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Name of the message being decoded.
    pub fn message(&self) -> &'static str {
        self.message
    }

    fn need(&self, n: usize) -> Result<()> {
        if self.buf.len() < n {
            return Err(MsgError::Truncated {
                message: self.message,
                needed: n,
                remaining: self.buf.len(),
            });
        }
        Ok(())
    }

    pub fn u8(&mut self) -> Result<u8> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn u16(&mut self) -> Result<u16> {
        self.need(2)?;
        Ok(self.buf.get_u16_le())
    }

    pub fn u32(&mut self) -> Result<u32> {
        self.need(4)?;
        Ok(self.buf.get_u32_le())
    }

    pub fn u64(&mut self) -> Result<u64> {
        self.need(8)?;
        Ok(self.buf.get_u64_le())
    }

    /// Take the next `n` bytes verbatim.
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.need(n)?;
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }
}

/// A value with a fixed field-by-field wire representation.
pub trait WireFormat: Sized {
    /// Append the encoded value.
    fn put(&self, dst: &mut BytesMut);

    /// Read one value.
    fn take(src: &mut Decoder<'_>) -> Result<Self>;

    /// Reject values the encoding cannot represent faithfully.
    fn check(&self) -> Result<()> {
        Ok(())
    }
}

impl WireFormat for u8 {
    fn put(&self, dst: &mut BytesMut) {
        dst.put_u8(*self);
    }

    fn take(src: &mut Decoder<'_>) -> Result<Self> {
        src.u8()
    }
}

impl WireFormat for u16 {
    fn put(&self, dst: &mut BytesMut) {
        dst.put_u16_le(*self);
    }

    fn take(src: &mut Decoder<'_>) -> Result<Self> {
        src.u16()
    }
}

impl WireFormat for u32 {
    fn put(&self, dst: &mut BytesMut) {
        dst.put_u32_le(*self);
    }

    fn take(src: &mut Decoder<'_>) -> Result<Self> {
        src.u32()
    }
}

impl WireFormat for u64 {
    fn put(&self, dst: &mut BytesMut) {
        dst.put_u64_le(*self);
    }

    fn take(src: &mut Decoder<'_>) -> Result<Self> {
        src.u64()
    }
}

impl WireFormat for bool {
    fn put(&self, dst: &mut BytesMut) {
        dst.put_u8(u8::from(*self));
    }

    fn take(src: &mut Decoder<'_>) -> Result<Self> {
        Ok(src.u8()? != 0)
    }
}

impl<T: WireFormat + Copy + Default, const N: usize> WireFormat for [T; N] {
    fn put(&self, dst: &mut BytesMut) {
        for item in self {
            item.put(dst);
        }
    }

    fn take(src: &mut Decoder<'_>) -> Result<Self> {
        let mut out = [T::default(); N];
        for slot in &mut out {
            *slot = T::take(src)?;
        }
        Ok(out)
    }
}

/// Length-prefixed byte field.
impl WireFormat for Vec<u8> {
    fn put(&self, dst: &mut BytesMut) {
        let len = self.len().min(MAX_VAR_FIELD);
        dst.put_u8(len as u8);
        dst.put_slice(&self[..len]);
    }

    fn take(src: &mut Decoder<'_>) -> Result<Self> {
        let len = usize::from(src.u8()?);
        Ok(src.bytes(len)?.to_vec())
    }

    fn check(&self) -> Result<()> {
        if self.len() > MAX_VAR_FIELD {
            return Err(MsgError::FieldTooLong {
                len: self.len(),
                max: MAX_VAR_FIELD,
            });
        }
        Ok(())
    }
}

/// Declare a payload struct whose wire layout is its field order.
///
/// An optional `check = path;` clause adds a whole-struct validation step.
macro_rules! wire_struct {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                pub $field:ident : $ty:ty
            ),* $(,)?
        }
        $(check = $checker:path;)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )*
        }

        impl $crate::wire::WireFormat for $name {
            #[allow(unused_variables)]
            fn put(&self, dst: &mut bytes::BytesMut) {
                $( $crate::wire::WireFormat::put(&self.$field, dst); )*
            }

            #[allow(unused_variables)]
            fn take(src: &mut $crate::wire::Decoder<'_>) -> $crate::error::Result<Self> {
                Ok(Self {
                    $( $field: $crate::wire::WireFormat::take(src)?, )*
                })
            }

            fn check(&self) -> $crate::error::Result<()> {
                $( $crate::wire::WireFormat::check(&self.$field)?; )*
                $( $checker(self)?; )?
                Ok(())
            }
        }
    };
}

pub(crate) use wire_struct;
