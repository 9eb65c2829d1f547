use super::scanner::is_ident_byte;

pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-')
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// True when the quote at `idx` opens an `E'...'` string.
pub(super) fn is_escape_string_start(bytes: &[u8], idx: usize) -> bool {
    if idx == 0 || !matches!(bytes[idx - 1], b'e' | b'E') {
        return false;
    }
    idx < 2 || !is_ident_byte(bytes[idx - 2])
}

/// Recognise `$tag$` at `start`. Returns the tag and the index of the closing `$`.
pub(super) fn try_start_dollar_quote(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    if start > 0 && is_ident_byte(bytes[start - 1]) {
        return None;
    }
    // `$1` is a positional parameter, never a tag.
    if bytes.get(start + 1).is_some_and(u8::is_ascii_digit) {
        return None;
    }

    let mut idx = start + 1;
    while idx < bytes.len() && bytes[idx] != b'$' {
        let b = bytes[idx];
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return None;
        }
        idx += 1;
    }

    if idx < bytes.len() && bytes[idx] == b'$' {
        let tag = String::from_utf8(bytes[start + 1..idx].to_vec()).ok()?;
        Some((tag, idx))
    } else {
        None
    }
}

pub(super) fn matches_tag(bytes: &[u8], idx: usize, tag: &str) -> bool {
    bytes.get(idx) == Some(&b'$')
        && bytes[idx + 1..].starts_with(tag.as_bytes())
        && bytes.get(idx + 1 + tag.len()) == Some(&b'$')
}
