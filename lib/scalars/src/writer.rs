use bytes::BufMut;

pub const NULL: &[u8] = b"null";
pub const TRUE: &[u8] = b"true";
pub const FALSE: &[u8] = b"false";

const fn get_replacements() -> [u8; 256] {
    // Only ASCII is ever replaced, so multi-byte UTF-8 sequences pass through untouched.
    let mut result = [0u8; 256];
    let mut i = 0;
    while i < 0x20 {
        result[i] = b'u';
        i += 1;
    }
    result[b'"' as usize] = b'"';
    result[b'\\' as usize] = b'\\';
    result[8] = b'b';
    result[0xc] = b'f';
    result[b'\n' as usize] = b'n';
    result[b'\r' as usize] = b'r';
    result[b'\t' as usize] = b't';

    result
}

static REPLACEMENTS: [u8; 256] = get_replacements();
static HEX: [u8; 16] = *b"0123456789abcdef";

#[inline]
pub fn write_and_escape_string<T: BufMut>(buffer: &mut T, input: &str) {
    buffer.put_u8(b'"');

    let bytes = input.as_bytes();
    let mut last_write = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        let replacement = REPLACEMENTS[byte as usize];
        if replacement == 0 {
            continue;
        }

        if last_write < i {
            buffer.put_slice(&bytes[last_write..i]);
        }

        if replacement == b'u' {
            buffer.put_slice(&[
                b'\\',
                b'u',
                b'0',
                b'0',
                HEX[((byte >> 4) & 0xF) as usize],
                HEX[(byte & 0xF) as usize],
            ]);
        } else {
            buffer.put_slice(&[b'\\', replacement]);
        }
        last_write = i + 1;
    }

    if last_write < bytes.len() {
        buffer.put_slice(&bytes[last_write..]);
    }

    buffer.put_u8(b'"');
}

/// Writes the shortest decimal form that reads back as the same `f64`,
/// without exponent and without a trailing `.0`.
#[inline]
pub fn write_f64<T: BufMut>(buffer: &mut T, value: f64) {
    if !value.is_finite() {
        buffer.put_slice(NULL);
        return;
    }

    let mut buf = ryu::Buffer::new();
    let formatted = buf.format_finite(value);
    if formatted.contains('e') {
        // ryu switches to scientific notation for very large and very small magnitudes,
        // `Display` keeps the same shortest digits in positional notation.
        buffer.put_slice(value.to_string().as_bytes());
        return;
    }

    let trimmed = formatted.strip_suffix(".0").unwrap_or(formatted);
    buffer.put_slice(trimmed.as_bytes());
}

#[inline]
pub fn write_i64<T: BufMut>(buffer: &mut T, value: i64) {
    let mut buf = itoa::Buffer::new();
    buffer.put_slice(buf.format(value).as_bytes());
}

#[inline]
pub fn write_bool<T: BufMut>(buffer: &mut T, value: bool) {
    buffer.put_slice(if value { TRUE } else { FALSE });
}
