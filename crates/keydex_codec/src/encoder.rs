//! Order-preserving key fragment encoder.
//!
//! Every fragment produced here sorts, byte for byte, in the same order as
//! the value it encodes (or the reverse, for descending fragments). The
//! store's native lexicographic key order therefore doubles as the index's
//! value order.
//!
//! # Known limitations
//!
//! - Strings longer than the pad length are not truncated and lose their
//!   ordering guarantee against longer neighbours.
//! - Ascending strings pad with a space, so characters below U+0020 sort
//!   incorrectly against shorter strings.
//! - Negative integers have no ordered encoding and are rejected.
//! - Floats are not padded; values with different magnitudes do not compare
//!   correctly as text, and descending floats close to zero collapse onto
//!   `f64::MAX`.

use crate::error::{CodecError, CodecResult};
use crate::value::{FieldValue, OrderType};
use data_encoding::BASE32HEX;

/// Width of an encoded integer fragment. `i64::MAX` has 19 digits.
pub const INTEGER_WIDTH: usize = 19;

/// Lowest printable character, used to pad ascending strings.
const ASCENDING_PAD: char = ' ';

/// Highest scalar value, used to pad descending strings.
const DESCENDING_PAD: char = char::MAX;

/// Stands in for base32hex `=` padding. Sorts below every alphabet digit.
pub const ARMOR_PAD: char = '-';

const SURROGATE_START: u32 = 0xD800;
const SURROGATE_LEN: u32 = 0x800;

/// Encodes `value` into a key fragment for the given order.
///
/// `pad_length` and `base32` only affect ordered strings.
///
/// # Errors
///
/// Returns [`CodecError::UnsupportedType`] when the value has no encoding
/// for the requested order: negative integers under an ascending or
/// descending order, and non-finite floats.
pub fn encode_fragment(
    value: &FieldValue,
    order: OrderType,
    pad_length: usize,
    base32: bool,
) -> CodecResult<String> {
    match value {
        FieldValue::Text(s) => Ok(match order {
            OrderType::Unordered => s.clone(),
            OrderType::Ascending => ascending_string(s, pad_length),
            OrderType::Descending => descending_string(s, pad_length, base32),
        }),
        FieldValue::Integer(n) => encode_integer(*n, order),
        FieldValue::Float(x) => encode_float(*x, order),
        FieldValue::Bool(b) => Ok(b.to_string()),
    }
}

fn encode_integer(n: i64, order: OrderType) -> CodecResult<String> {
    if n < 0 && order.is_ordered() {
        return Err(CodecError::unsupported_type("negative integer"));
    }
    let n = match order {
        OrderType::Descending => i64::MAX - n,
        OrderType::Ascending | OrderType::Unordered => n,
    };
    Ok(format!("{:0width$}", n, width = INTEGER_WIDTH))
}

fn encode_float(x: f64, order: OrderType) -> CodecResult<String> {
    if !x.is_finite() {
        return Err(CodecError::unsupported_type("non-finite float"));
    }
    Ok(match order {
        OrderType::Descending => format!("{:e}", f64::MAX - x),
        OrderType::Ascending | OrderType::Unordered => x.to_string(),
    })
}

fn ascending_string(s: &str, pad_length: usize) -> String {
    let mut out = String::with_capacity(s.len().max(pad_length));
    out.push_str(s);
    pad(&mut out, s.chars().count(), pad_length, ASCENDING_PAD);
    out
}

fn descending_string(s: &str, pad_length: usize, base32: bool) -> String {
    let mut out: String = s.chars().map(mirror).collect();
    pad(&mut out, s.chars().count(), pad_length, DESCENDING_PAD);
    if !base32 {
        return out;
    }
    BASE32HEX
        .encode(out.as_bytes())
        .chars()
        .map(|c| if c == '=' { ARMOR_PAD } else { c })
        .collect()
}

fn pad(out: &mut String, len: usize, pad_length: usize, c: char) {
    for _ in len..pad_length {
        out.push(c);
    }
}

/// Position of `c` among all Unicode scalar values, ignoring the surrogate gap.
const fn scalar_rank(c: char) -> u32 {
    let v = c as u32;
    if v >= SURROGATE_START + SURROGATE_LEN {
        v - SURROGATE_LEN
    } else {
        v
    }
}

/// Maps `c` to its mirror image in the scalar range, reversing code point order.
fn mirror(c: char) -> char {
    let rank = scalar_rank(char::MAX) - scalar_rank(c);
    let v = if rank >= SURROGATE_START {
        rank + SURROGATE_LEN
    } else {
        rank
    };
    char::from_u32(v).unwrap_or(char::REPLACEMENT_CHARACTER)
}
