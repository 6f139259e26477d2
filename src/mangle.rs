//! MQL string escaping.
//!
//! `mangle` first replaces newline, tab, double quote and backslash by their
//! two-character escapes, then writes every UTF-8 byte with the high bit set
//! as `\xHH` with lowercase hex digits. The result is pure ASCII.

/// Escapes a string for use inside a double-quoted MQL string literal.
pub fn mangle(input: &str) -> String {
    let escaped = escape_specials(input);
    escape_upper_bytes(&escaped)
}

fn escape_specials(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out
}

fn escape_upper_bytes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte >= 0x80 {
            out.push_str(&format!("\\x{byte:02x}"));
        } else {
            out.push(char::from(byte));
        }
    }
    out
}

/// Reverses [`mangle`]. Returns `None` for input `mangle` could not have produced.
pub fn unmangle(input: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(input.len());
    let mut rest = input.bytes();
    while let Some(byte) = rest.next() {
        if byte != b'\\' {
            bytes.push(byte);
            continue;
        }
        match rest.next()? {
            b'n' => bytes.push(b'\n'),
            b't' => bytes.push(b'\t'),
            b'"' => bytes.push(b'"'),
            b'\\' => bytes.push(b'\\'),
            b'x' => {
                let hi = hex_value(rest.next()?)?;
                let lo = hex_value(rest.next()?)?;
                bytes.push(hi << 4 | lo);
            }
            _ => return None,
        }
    }
    String::from_utf8(bytes).ok()
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        _ => None,
    }
}
