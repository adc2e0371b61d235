//! Customer kind enumeration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What role a counterparty plays in the user's books.
///
/// Stored as a SMALLINT (1/2/3) and serialized as the same small integer on
/// the wire, matching the mobile and web clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum CustomerKind {
    /// Someone the user sells to.
    Customer,
    /// Someone the user buys from.
    Supplier,
    /// Both at once.
    Both,
}

/// Error returned when an integer does not map to a customer kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("customer kind must be 1, 2 or 3, got {0}")]
pub struct InvalidCustomerKind(pub i16);

impl CustomerKind {
    /// The wire/database representation.
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::Customer => 1,
            Self::Supplier => 2,
            Self::Both => 3,
        }
    }
}

impl TryFrom<i16> for CustomerKind {
    type Error = InvalidCustomerKind;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Customer),
            2 => Ok(Self::Supplier),
            3 => Ok(Self::Both),
            other => Err(InvalidCustomerKind(other)),
        }
    }
}

impl From<CustomerKind> for i16 {
    fn from(kind: CustomerKind) -> Self {
        kind.as_i16()
    }
}

impl std::fmt::Display for CustomerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Supplier => write!(f, "supplier"),
            Self::Both => write!(f, "both"),
        }
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CustomerKind {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i16 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i16 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CustomerKind {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i16 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::try_from(raw)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CustomerKind {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i16 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_i16(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_all_kinds() {
        for raw in 1..=3i16 {
            let kind = CustomerKind::try_from(raw).unwrap();
            assert_eq!(kind.as_i16(), raw);
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(CustomerKind::try_from(0), Err(InvalidCustomerKind(0))));
        assert!(matches!(CustomerKind::try_from(4), Err(InvalidCustomerKind(4))));
        assert!(matches!(CustomerKind::try_from(-1), Err(InvalidCustomerKind(-1))));
    }

    #[test]
    fn test_serde_as_integer() {
        let json = serde_json::to_string(&CustomerKind::Supplier).unwrap();
        assert_eq!(json, "2");

        let parsed: CustomerKind = serde_json::from_str("3").unwrap();
        assert_eq!(parsed, CustomerKind::Both);

        assert!(serde_json::from_str::<CustomerKind>("9").is_err());
    }
}
