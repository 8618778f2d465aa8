//! Variable-length header encoding shared by `Text` columns and
//! `Vector<T>` columns (`T` ∈ {Int, Float, GeoPoint, Text}), per
//! spec.md §4.B: "per-row header is a 64-bit word: high 48 bits = byte
//! offset into the body arena, low 16 bits = size. If size < 0xFFFF it
//! is the inline size; if size == 0xFFFF the actual size is stored as
//! an Int at the offset".
//!
//! Here "size" counts elements of the arena's unit (bytes for a
//! `Text` body, `T`-elements for a `Vector<T>` body) rather than
//! always bytes — the 48/16 split and the escape convention are what
//! this module preserves.

const INLINE_MAX: u64 = 0xFFFE;
const ESCAPE: u64 = 0xFFFF;
const SIZE_BITS: u32 = 16;

/// A decoded `(offset, size)` pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub offset: u64,
    pub size: u64,
}

/// Encode `(offset, size)` into a 64-bit word. When `size` does not
/// fit in 16 bits, the caller must have already written the true size
/// as a prefix at `offset` (see [`escape_prefix_len`]); this function
/// only encodes the header word itself.
pub fn encode(offset: u64, size: u64) -> u64 {
    debug_assert!(offset < (1 << 48));
    let size_field = if size < INLINE_MAX { size } else { ESCAPE };
    (offset << SIZE_BITS) | size_field
}

pub fn decode(word: u64, escaped_size: impl FnOnce(u64) -> u64) -> Header {
    let offset = word >> SIZE_BITS;
    let size_field = word & ((1 << SIZE_BITS) - 1);
    if size_field == ESCAPE {
        Header {
            offset,
            size: escaped_size(offset),
        }
    } else {
        Header {
            offset,
            size: size_field,
        }
    }
}

pub fn needs_escape(size: u64) -> bool {
    size >= INLINE_MAX
}

/// Whether a header word was encoded with the size escape set. Needed
/// by byte-arena readers to know whether the payload starts right at
/// `offset` or after an 8-byte size prefix written there.
pub fn is_escaped(word: u64) -> bool {
    (word & ((1 << SIZE_BITS) - 1)) == ESCAPE
}

/// Append `bytes` to a byte arena and return its header word, writing
/// an escape size prefix first when `bytes` does not fit inline.
pub fn encode_bytes(arena: &mut Vec<u8>, bytes: &[u8]) -> u64 {
    let size = bytes.len() as u64;
    let offset = arena.len() as u64;
    if needs_escape(size) {
        arena.extend_from_slice(&(size as i64).to_le_bytes());
    }
    arena.extend_from_slice(bytes);
    encode(offset, size)
}

/// Inverse of [`encode_bytes`]: read the byte slice a header word
/// refers to out of `arena`.
pub fn decode_bytes(arena: &[u8], word: u64) -> &[u8] {
    let header = decode(word, |off| {
        let off = off as usize;
        i64::from_le_bytes(arena[off..off + 8].try_into().unwrap()) as u64
    });
    let start = if is_escaped(word) {
        header.offset as usize + 8
    } else {
        header.offset as usize
    };
    &arena[start..start + header.size as usize]
}
