use std::borrow::Cow;

#[inline(always)]
fn hex_digit(c: u8) -> Option<u8> {
    char::from(c).to_digit(16).map(|d| d as u8)
}

/// Decodes one querystring component:
/// - `+` becomes a space
/// - `%XX` escapes become the byte they name
/// - malformed escapes are kept literally
/// - invalid UTF-8 in the result is replaced with U+FFFD
///
/// Borrows the input when there is nothing to decode.
pub fn decode(input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    if !bytes.iter().any(|&b| b == b'+' || b == b'%') {
        return Cow::Borrowed(input);
    }

    let mut decoded = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'+' => {
                decoded.push(b' ');
                idx += 1;
            }
            b'%' => {
                let escaped = bytes
                    .get(idx + 1)
                    .and_then(|&h| hex_digit(h))
                    .zip(bytes.get(idx + 2).and_then(|&l| hex_digit(l)));
                match escaped {
                    Some((h, l)) => {
                        decoded.push(h * 0x10 + l);
                        idx += 3;
                    }
                    None => {
                        decoded.push(b'%');
                        idx += 1;
                    }
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
