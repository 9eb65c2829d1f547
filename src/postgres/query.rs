use std::fmt::{self, Write as _};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use tokio_postgres::types::{FromSql, Type};
use tokio_postgres::{Row, SimpleQueryMessage, Statement};

use crate::error::SmokeError;
use crate::results::ResultSet;

/// Build a result set using statement metadata for column names.
///
/// # Errors
/// Returns errors from row value extraction.
pub fn build_result_set_from_statement(
    stmt: &Statement,
    rows: &[Row],
) -> Result<ResultSet, SmokeError> {
    let column_names: Vec<String> = stmt
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(Arc::new(column_names), rows.len());

    for row in rows {
        let mut values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            values.push(postgres_extract_text(row, idx)?);
        }
        result_set.add_row_values(values);
    }

    Ok(result_set)
}

/// Build a result set from simple-protocol messages, which already carry text values.
///
/// Returns the result set (if the command returned rows) and the command-complete count.
#[must_use]
pub fn build_result_set_from_simple(
    messages: &[SimpleQueryMessage],
) -> (Option<ResultSet>, Option<u64>) {
    let mut result_set: Option<ResultSet> = None;
    let mut affected = None;

    for message in messages {
        match message {
            SimpleQueryMessage::RowDescription(columns) => {
                let names = columns.iter().map(|c| c.name().to_string()).collect();
                result_set = Some(ResultSet::with_capacity(Arc::new(names), 0));
            }
            SimpleQueryMessage::Row(row) => {
                let values = (0..row.len())
                    .map(|idx| row.get(idx).map(str::to_string))
                    .collect();
                let rs = result_set.get_or_insert_with(|| {
                    let names = row.columns().iter().map(|c| c.name().to_string()).collect();
                    ResultSet::with_capacity(Arc::new(names), 0)
                });
                rs.add_row_values(values);
            }
            SimpleQueryMessage::CommandComplete(count) => affected = Some(*count),
            _ => {}
        }
    }

    (result_set, affected)
}

/// Extracts a column from a binary-format row as the text the server would render for it.
///
/// # Errors
/// Returns `SmokeError` if the column cannot be retrieved or has an unsupported type.
pub fn postgres_extract_text(row: &Row, idx: usize) -> Result<Option<String>, SmokeError> {
    let type_info = row.columns()[idx].type_();

    let text = match *type_info {
        Type::INT2 => row.try_get::<_, Option<i16>>(idx)?.map(|v| v.to_string()),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx)?.map(|v| v.to_string()),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(|v| v.to_string()),
        Type::OID => row.try_get::<_, Option<u32>>(idx)?.map(|v| v.to_string()),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)?
            .map(|v| float_text(v, FLOAT4_FIXED_EXP)),
        Type::FLOAT8 => row
            .try_get::<_, Option<f64>>(idx)?
            .map(|v| float_text(v, FLOAT8_FIXED_EXP)),
        Type::BOOL => row
            .try_get::<_, Option<bool>>(idx)?
            .map(|v| (if v { "t" } else { "f" }).to_string()),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            row.try_get::<_, Option<String>>(idx)?
        }
        Type::DATE => row
            .try_get::<_, Option<NaiveDate>>(idx)?
            .map(|v| v.format("%Y-%m-%d").to_string()),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(|v| timestamp_text(&v)),
        // Rendered in UTC; matches the server when the session time zone is UTC.
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(|v| format!("{}+00", timestamp_text(&v.naive_utc()))),
        Type::JSON | Type::JSONB => row.try_get::<_, Option<JsonText>>(idx)?.map(|v| v.0),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx)?.map(|bytes| {
            let mut out = String::with_capacity(2 + bytes.len() * 2);
            out.push_str("\\x");
            for b in bytes {
                let _ = write!(out, "{b:02x}");
            }
            out
        }),
        _ => {
            return Err(SmokeError::Unimplemented(format!(
                "column {} has unsupported type {}",
                row.columns()[idx].name(),
                type_info.name()
            )));
        }
    };

    Ok(text)
}

/// Decimal exponents below which `float4`/`float8` output stays in fixed notation.
const FLOAT4_FIXED_EXP: i32 = 6;
const FLOAT8_FIXED_EXP: i32 = 15;

/// Shortest round-trip digits, switching to `1e+20` style outside `[1e-4, 10^fixed_exp)`.
fn float_text<F>(value: F, fixed_exp: i32) -> String
where
    F: Copy + Into<f64> + fmt::Display + fmt::LowerExp,
{
    let wide: f64 = value.into();
    if wide.is_nan() {
        return "NaN".to_string();
    }
    if wide.is_infinite() {
        return (if wide > 0.0 { "Infinity" } else { "-Infinity" }).to_string();
    }

    let scientific = format!("{value:e}");
    let (mantissa, exp) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    if (-4..fixed_exp).contains(&exp) {
        value.to_string()
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    }
}

/// ISO timestamp with microseconds, trailing zeros dropped.
fn timestamp_text(ts: &NaiveDateTime) -> String {
    let mut text = ts.format("%Y-%m-%d %H:%M:%S").to_string();
    let micros = ts.nanosecond() / 1_000;
    if micros > 0 {
        let fraction = format!("{micros:06}");
        let _ = write!(text, ".{}", fraction.trim_end_matches('0'));
    }
    text
}

/// `json`/`jsonb` exactly as the server sent it.
struct JsonText(String);

impl<'a> FromSql<'a> for JsonText {
    fn from_sql(
        ty: &Type,
        raw: &'a [u8],
    ) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        let body = if *ty == Type::JSONB {
            match raw.split_first() {
                Some((1, rest)) => rest,
                _ => return Err("unsupported jsonb format version".into()),
            }
        } else {
            raw
        };
        Ok(JsonText(std::str::from_utf8(body)?.to_string()))
    }

    fn accepts(ty: &Type) -> bool {
        matches!(*ty, Type::JSON | Type::JSONB)
    }
}
