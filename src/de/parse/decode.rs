use std::borrow::Cow;

#[inline(always)]
fn hex_digit(c: u8) -> Option<u8> {
    char::from(c).to_digit(16).map(|d| d as u8)
}

/// Decodes one half of a `key=value` pair:
/// - `+` becomes a space, in either encoding mode; a literal plus must be sent as `%2B`
/// - `%XX` escapes are decoded; a `%` not followed by two hex digits is kept as is
/// - invalid UTF-8 in the decoded bytes is replaced with U+FFFD
///
/// Borrows the input when there is nothing to decode.
pub fn decode(input: &str) -> Cow<'_, str> {
    if !input.bytes().any(|b| b == b'+' || b == b'%') {
        return Cow::Borrowed(input);
    }

    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'+' => {
                decoded.push(b' ');
                idx += 1;
            }
            b'%' => {
                let high = bytes.get(idx + 1).copied().and_then(hex_digit);
                let low = bytes.get(idx + 2).copied().and_then(hex_digit);
                if let (Some(h), Some(l)) = (high, low) {
                    decoded.push(h << 4 | l);
                    idx += 3;
                } else {
                    decoded.push(b'%');
                    idx += 1;
                }
            }
            b => {
                decoded.push(b);
                idx += 1;
            }
        }
    }

    match String::from_utf8(decoded) {
        Ok(s) => Cow::Owned(s),
        Err(e) => Cow::Owned(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}
