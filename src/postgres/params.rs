use std::error::Error;

use crate::error::SmokeError;
use crate::types::RowValues;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

/// Container for Postgres parameters with lifetime tracking
pub struct Params<'a> {
    references: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Params<'a> {
    /// Convert a slice of `RowValues` to Postgres parameters, checking the count against
    /// what the prepared statement expects.
    ///
    /// # Errors
    /// Returns `SmokeError::ParameterError` when the number of values does not match.
    pub fn convert(params: &'a [RowValues], expected: &[Type]) -> Result<Params<'a>, SmokeError> {
        if params.len() != expected.len() {
            return Err(SmokeError::ParameterError(format!(
                "statement expects {} parameter(s), got {}",
                expected.len(),
                params.len()
            )));
        }

        let references: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        Ok(Params { references })
    }

    /// Get a reference to the underlying parameter array
    #[must_use]
    pub fn as_refs(&self) -> &[&(dyn ToSql + Sync)] {
        &self.references
    }
}

impl ToSql for RowValues {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            // The wire width must match the inferred parameter type.
            RowValues::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                _ => (*i).to_sql(ty, out),
            },
            RowValues::Float(f) => match *ty {
                #[allow(clippy::cast_possible_truncation)]
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                _ => (*f).to_sql(ty, out),
            },
            RowValues::Text(s) => s.to_sql(ty, out),
            RowValues::Bool(b) => (*b).to_sql(ty, out),
            RowValues::Timestamp(dt) => dt.to_sql(ty, out),
            RowValues::Null => Ok(IsNull::Yes),
        }
    }

    fn accepts(ty: &Type) -> bool {
        match *ty {
            Type::INT2 | Type::INT4 | Type::INT8 => true,
            Type::FLOAT4 | Type::FLOAT8 => true,
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => true,
            Type::BOOL => true,
            Type::TIMESTAMP => true,
            _ => false,
        }
    }

    to_sql_checked!();
}
