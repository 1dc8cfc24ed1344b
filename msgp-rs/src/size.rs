//! Upper bounds on encoded sizes.
//!
//! Generated `msgsize` routines add these up to pre-size output buffers. Each
//! constant is the largest encoding the writers in this crate can produce for
//! that kind, so a sum is never smaller than the real encoding.

use crate::Extension;

pub const NIL_SIZE: usize = 1;
pub const BOOL_SIZE: usize = 1;
pub const F32_SIZE: usize = 5;
pub const F64_SIZE: usize = 9;
pub const I8_SIZE: usize = 2;
pub const I16_SIZE: usize = 3;
pub const I32_SIZE: usize = 5;
pub const I64_SIZE: usize = 9;
pub const U8_SIZE: usize = 2;
pub const U16_SIZE: usize = 3;
pub const U32_SIZE: usize = 5;
pub const U64_SIZE: usize = 9;
pub const ARRAY_HEADER_SIZE: usize = 5;
pub const MAP_HEADER_SIZE: usize = 5;
pub const STR_PREFIX_SIZE: usize = 5;
pub const BYTES_PREFIX_SIZE: usize = 5;
pub const EXTENSION_PREFIX_SIZE: usize = 6;

/// Largest encoding of a string.
pub fn str_size(s: &str) -> usize {
    STR_PREFIX_SIZE + s.len()
}

/// Largest encoding of a binary blob.
pub fn bytes_size(b: &[u8]) -> usize {
    BYTES_PREFIX_SIZE + b.len()
}

/// Largest encoding of an extension value.
pub fn extension_size<E>(e: &E) -> usize
where
    E: Extension + ?Sized,
{
    EXTENSION_PREFIX_SIZE + e.data_len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::*;
    use crate::RawExtension;

    #[test]
    fn test_bounds_cover_largest_encodings() {
        let mut buf = Vec::new();
        append_i64(&mut buf, i64::MIN);
        assert_eq!(buf.len(), I64_SIZE);

        buf.clear();
        append_u32(&mut buf, u32::MAX);
        assert_eq!(buf.len(), U32_SIZE);

        buf.clear();
        append_map_header(&mut buf, u32::MAX);
        assert_eq!(buf.len(), MAP_HEADER_SIZE);
    }

    #[test]
    fn test_variable_sizes() {
        let s = "x".repeat(40);
        let mut buf = Vec::new();
        append_str(&mut buf, &s).unwrap();
        assert!(buf.len() <= str_size(&s));

        let ext = RawExtension::new(1, vec![0; 3]);
        buf.clear();
        append_extension(&mut buf, &ext).unwrap();
        assert!(buf.len() <= extension_size(&ext));
    }
}
