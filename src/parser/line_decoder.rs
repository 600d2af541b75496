//! Decoding of the parameter lines in the `.smh` text section.
//!
//! Lines are stored as big-endian double-byte characters. The reader treats
//! the raw bytes as Latin-1, re-encodes them as UTF-8 and then walks the
//! result in pairs: a zero first byte means the second byte is a plain
//! character. A non-zero first byte appears only where a Latin-1 byte above
//! 0x7F expanded into two UTF-8 bytes; the previously emitted character is
//! then replaced by the byte two positions back followed by the current one.
//! This recovers characters such as `µ` in unit names.

/// Splits the text section into raw lines. Both `\n` and `\r` end a line;
/// the terminator stays attached to the line.
pub fn split_lines(text: &[u8]) -> impl Iterator<Item = &[u8]> {
    text.split_inclusive(|&b| b == b'\n' || b == b'\r')
}

/// Latin-1 bytes re-encoded as UTF-8.
fn latin1_to_utf8(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len() + raw.len() / 8);
    for &b in raw {
        if b < 0x80 {
            out.push(b);
        } else {
            out.push(0xC0 | (b >> 6));
            out.push(0x80 | (b & 0x3F));
        }
    }
    out
}

/// Decodes one raw line (terminator included) into text. Everything from the
/// first decoded newline onward is dropped.
pub fn decode_line(raw: &[u8]) -> String {
    let buf = latin1_to_utf8(raw);
    let mut chars: Vec<char> = Vec::with_capacity(buf.len() / 2);
    // Index of the last consumed byte; starts one before the buffer.
    let mut ich: isize = -1;

    for _ in 0..buf.len().saturating_sub(1) / 2 {
        let Some(&lead) = buf.get((ich + 1) as usize) else {
            break;
        };
        if lead == 0 {
            ich += 2;
            let Some(&b) = buf.get(ich as usize) else {
                break;
            };
            chars.push(char::from(b));
        } else {
            ich += 3;
            let (Some(&hi), Some(&lo)) = (buf.get((ich - 2) as usize), buf.get(ich as usize))
            else {
                break;
            };
            chars.pop();
            chars.push(char::from(hi));
            chars.push(char::from(lo));
        }
    }

    let text: String = chars.into_iter().collect();
    match text.split_once('\n') {
        Some((line, _)) => line.to_string(),
        None => text,
    }
}

/// Decoded lines that carry content. Empty lines and lines starting with NUL
/// (the zero padding behind the last entry) are skipped.
pub fn decode_lines(text: &[u8]) -> impl Iterator<Item = String> + '_ {
    split_lines(text)
        .map(decode_line)
        .filter(|line| !line.is_empty() && !line.starts_with('\0'))
}

#[cfg(test)]
pub(crate) fn encode_line(line: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(line.len() * 2 + 2);
    for ch in line.chars().chain(std::iter::once('\n')) {
        let unit = ch as u32;
        out.push((unit >> 8) as u8);
        out.push(unit as u8);
    }
    out
}
