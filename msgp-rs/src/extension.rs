//! Application-defined extension types.

use crate::error::Result;

/// A value carried on the wire as an extension: a type tag plus opaque bytes.
///
/// # Example
///
/// ```rust
/// use msgp_rs::{Extension, Result};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Point { x: u8, y: u8 }
///
/// impl Extension for Point {
///     fn extension_type(&self) -> i8 { 7 }
///     fn data_len(&self) -> usize { 2 }
///     fn marshal_binary_to(&self, buf: &mut Vec<u8>) -> Result<()> {
///         buf.extend_from_slice(&[self.x, self.y]);
///         Ok(())
///     }
///     fn unmarshal_binary(&mut self, _ext_type: i8, data: &[u8]) -> Result<()> {
///         let [x, y]: [u8; 2] = data.try_into().map_err(|_| msgp_rs::Error::Truncated)?;
///         self.x = x;
///         self.y = y;
///         Ok(())
///     }
/// }
///
/// let mut buf = Vec::new();
/// msgp_rs::append_extension(&mut buf, &Point { x: 1, y: 2 }).unwrap();
/// let mut out = Point::default();
/// msgp_rs::read_extension_bytes(&buf, &mut out).unwrap();
/// assert_eq!(out, Point { x: 1, y: 2 });
/// ```
pub trait Extension {
    /// The type tag written before the payload.
    fn extension_type(&self) -> i8;

    /// Length of the payload written by [`marshal_binary_to`](Self::marshal_binary_to).
    fn data_len(&self) -> usize;

    /// Append exactly [`data_len`](Self::data_len) payload bytes.
    fn marshal_binary_to(&self, buf: &mut Vec<u8>) -> Result<()>;

    /// Populate `self` from a payload tagged `ext_type`.
    fn unmarshal_binary(&mut self, ext_type: i8, data: &[u8]) -> Result<()>;

    /// Whether a payload with this tag can be decoded into `self`.
    fn accepts(&self, ext_type: i8) -> bool {
        ext_type == self.extension_type()
    }
}

/// An extension of any type, kept as raw bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RawExtension {
    pub ext_type: i8,
    pub data: Vec<u8>,
}

impl RawExtension {
    /// Create a raw extension from a tag and payload.
    pub fn new(ext_type: i8, data: impl Into<Vec<u8>>) -> Self {
        Self {
            ext_type,
            data: data.into(),
        }
    }
}

impl Extension for RawExtension {
    fn extension_type(&self) -> i8 {
        self.ext_type
    }

    fn data_len(&self) -> usize {
        self.data.len()
    }

    fn marshal_binary_to(&self, buf: &mut Vec<u8>) -> Result<()> {
        buf.extend_from_slice(&self.data);
        Ok(())
    }

    fn unmarshal_binary(&mut self, ext_type: i8, data: &[u8]) -> Result<()> {
        self.ext_type = ext_type;
        self.data.clear();
        self.data.extend_from_slice(data);
        Ok(())
    }

    fn accepts(&self, _ext_type: i8) -> bool {
        true
    }
}
