//! ISO 3166-1 alpha-2 country codes for addresses.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Countries offered in the address forms, as `(code, name)` pairs.
const COUNTRIES: &[(&str, &str)] = &[
    ("AM", "Armenia"),
    ("AT", "Austria"),
    ("AU", "Australia"),
    ("AZ", "Azerbaijan"),
    ("BE", "Belgium"),
    ("BY", "Belarus"),
    ("CA", "Canada"),
    ("CH", "Switzerland"),
    ("CN", "China"),
    ("CZ", "Czechia"),
    ("DE", "Germany"),
    ("DK", "Denmark"),
    ("EE", "Estonia"),
    ("ES", "Spain"),
    ("FI", "Finland"),
    ("FR", "France"),
    ("GB", "United Kingdom"),
    ("GE", "Georgia"),
    ("GR", "Greece"),
    ("IE", "Ireland"),
    ("IL", "Israel"),
    ("IN", "India"),
    ("IT", "Italy"),
    ("JP", "Japan"),
    ("KG", "Kyrgyzstan"),
    ("KR", "South Korea"),
    ("KZ", "Kazakhstan"),
    ("LT", "Lithuania"),
    ("LV", "Latvia"),
    ("MD", "Moldova"),
    ("MX", "Mexico"),
    ("NL", "Netherlands"),
    ("NO", "Norway"),
    ("NZ", "New Zealand"),
    ("PL", "Poland"),
    ("PT", "Portugal"),
    ("RO", "Romania"),
    ("RS", "Serbia"),
    ("RU", "Russia"),
    ("SE", "Sweden"),
    ("TR", "Turkey"),
    ("UA", "Ukraine"),
    ("US", "United States"),
    ("UZ", "Uzbekistan"),
];

/// Errors that can occur when parsing a [`CountryCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CountryError {
    /// No country selected.
    #[error("country is required")]
    Empty,
    /// Not a country the shop ships to.
    #[error("unknown country code: {0}")]
    Unknown(String),
}

/// A validated two-letter country code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse a country code (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `CountryError::Empty` for blank input and
    /// `CountryError::Unknown` for codes not in the country list.
    pub fn parse(s: &str) -> Result<Self, CountryError> {
        let code = s.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(CountryError::Empty);
        }
        if COUNTRIES.iter().any(|(c, _)| *c == code) {
            Ok(Self(code))
        } else {
            Err(CountryError::Unknown(code))
        }
    }

    /// The two-letter code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// English country name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        COUNTRIES
            .iter()
            .find(|(c, _)| *c == self.0)
            .map_or("", |(_, name)| name)
    }
}

/// All selectable countries as `(code, name)` pairs, sorted by code.
#[must_use]
pub const fn countries() -> &'static [(&'static str, &'static str)] {
    COUNTRIES
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = CountryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CountryCode {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CountryCode {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CountryCode {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        let code = CountryCode::parse("de").unwrap();
        assert_eq!(code.as_str(), "DE");
        assert_eq!(code.name(), "Germany");
    }

    #[test]
    fn test_parse_rejects_blank_and_unknown() {
        assert_eq!(CountryCode::parse("  "), Err(CountryError::Empty));
        assert_eq!(
            CountryCode::parse("XX"),
            Err(CountryError::Unknown("XX".to_string()))
        );
    }

    #[test]
    fn test_country_list_is_sorted_and_unique() {
        let codes: Vec<&str> = countries().iter().map(|(c, _)| *c).collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(codes, sorted);
    }
}
