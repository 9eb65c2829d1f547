use std::borrow::Cow;

mod parsers;
mod scanner;

use parsers::{
    is_block_comment_end, is_block_comment_start, is_escape_string_start, is_line_comment_start,
    matches_tag, try_start_dollar_quote,
};
use scanner::{State, scan_digits};

/// Rewrite JDBC-style placeholders into PostgreSQL `$N` placeholders.
///
/// - a bare `?` becomes the next `$N`, counting from 1;
/// - `?N` becomes `$N`;
/// - `??` is an escaped literal `?`.
///
/// Quoted strings (including `E'...'`), quoted identifiers, line and nested block comments,
/// and dollar-quoted bodies are copied untouched. Returns a borrowed `Cow` when no changes
/// are needed.
///
/// ```rust
/// use pgwire_smoke::translate_placeholders;
///
/// let sql = translate_placeholders("update t1 set info=? , wt=? where id=?");
/// assert_eq!(sql, "update t1 set info=$1 , wt=$2 where id=$3");
/// ```
#[must_use]
pub fn translate_placeholders(sql: &str) -> Cow<'_, str> {
    let mut out: Option<String> = None;
    // Start of the input not yet copied into `out`.
    let mut copied = 0;
    let mut next_param = 1_usize;
    let mut state = State::Normal;
    let mut idx = 0;
    let bytes = sql.as_bytes();

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' if is_escape_string_start(bytes, idx) => state = State::EscapeQuoted,
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'$' => {
                    if let Some((tag, advance)) = try_start_dollar_quote(bytes, idx) {
                        state = State::DollarQuoted(tag);
                        idx = advance;
                    }
                }
                b'?' => {
                    let buf = out.get_or_insert_with(|| String::with_capacity(sql.len() + 8));
                    buf.push_str(&sql[copied..idx]);
                    if bytes.get(idx + 1) == Some(&b'?') {
                        buf.push('?');
                        idx += 1;
                    } else if let Some((digits_end, digits)) = scan_digits(bytes, idx + 1) {
                        buf.push('$');
                        buf.push_str(digits);
                        idx = digits_end - 1;
                    } else {
                        buf.push('$');
                        buf.push_str(&next_param.to_string());
                        next_param += 1;
                    }
                    copied = idx + 1;
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::EscapeQuoted => {
                if b == b'\\' {
                    idx += 1;
                } else if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
            State::DollarQuoted(ref tag) => {
                if matches_tag(bytes, idx, tag) {
                    idx += tag.len() + 1;
                    state = State::Normal;
                }
            }
        }

        idx += 1;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied.min(sql.len())..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_bare_markers_in_order() {
        let res = translate_placeholders("insert into t1 values(?, ?, ?)");
        assert_eq!(res, "insert into t1 values($1, $2, $3)");
    }

    #[test]
    fn keeps_explicit_numbers() {
        let res = translate_placeholders("select * from t where a = ?2 and b = ?1");
        assert_eq!(res, "select * from t where a = $2 and b = $1");
    }

    #[test]
    fn doubled_marker_is_a_literal() {
        let res = translate_placeholders("select data ?? 'k' from t where id = ?");
        assert_eq!(res, "select data ? 'k' from t where id = $1");
    }

    #[test]
    fn skips_inside_literals_and_comments() {
        let sql = "select '?', \"a?\" -- ?\n/* ? /* ? */ ? */ from t where a = ?";
        let res = translate_placeholders(sql);
        assert_eq!(
            res,
            "select '?', \"a?\" -- ?\n/* ? /* ? */ ? */ from t where a = $1"
        );
    }

    #[test]
    fn skips_escape_strings() {
        let res = translate_placeholders(r"select E'it\'s ?' , ? from t");
        assert_eq!(res, r"select E'it\'s ?' , $1 from t");

        // Without the E prefix a backslash does not escape the quote.
        let res = translate_placeholders(r"select 'a\', ?");
        assert_eq!(res, r"select 'a\', $1");
    }

    #[test]
    fn skips_dollar_quoted_blocks() {
        let sql = "$foo$ select ? from t $foo$ where a = ?";
        let res = translate_placeholders(sql);
        assert_eq!(res, "$foo$ select ? from t $foo$ where a = $1");
    }

    #[test]
    fn leaves_postgres_placeholders_alone() {
        let sql = "prepare q1(int) as select*from t1 where id=$1";
        let res = translate_placeholders(sql);
        assert!(matches!(res, Cow::Borrowed(_)));
        assert_eq!(res, sql);
    }

    #[test]
    fn preserves_multibyte_text() {
        let res = translate_placeholders("select 'héllo', ? -- ünïcode");
        assert_eq!(res, "select 'héllo', $1 -- ünïcode");
    }
}
