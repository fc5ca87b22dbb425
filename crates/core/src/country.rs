use serde::{Deserialize, Serialize};

/// Closed set of countries the directory accepts numbers for.
///
/// Adding a country is a data change: a new variant plus its entry in
/// [`CountryCode::region`] and [`CountryCode::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountryCode {
    US,
    GB,
    DE,
    FR,
    IN,
    IL,
    CN,
    JP,
    BR,
    CA,
}

impl CountryCode {
    /// Every supported country, in declaration order.
    pub const ALL: [CountryCode; 10] = [
        CountryCode::US,
        CountryCode::GB,
        CountryCode::DE,
        CountryCode::FR,
        CountryCode::IN,
        CountryCode::IL,
        CountryCode::CN,
        CountryCode::JP,
        CountryCode::BR,
        CountryCode::CA,
    ];

    /// ISO 3166-1 alpha-2 representation, as stored and serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            CountryCode::US => "US",
            CountryCode::GB => "GB",
            CountryCode::DE => "DE",
            CountryCode::FR => "FR",
            CountryCode::IN => "IN",
            CountryCode::IL => "IL",
            CountryCode::CN => "CN",
            CountryCode::JP => "JP",
            CountryCode::BR => "BR",
            CountryCode::CA => "CA",
        }
    }

    /// Region identifier used by the numbering-plan validator.
    pub fn region(self) -> phonenumber::country::Id {
        match self {
            CountryCode::US => phonenumber::country::Id::US,
            CountryCode::GB => phonenumber::country::Id::GB,
            CountryCode::DE => phonenumber::country::Id::DE,
            CountryCode::FR => phonenumber::country::Id::FR,
            CountryCode::IN => phonenumber::country::Id::IN,
            CountryCode::IL => phonenumber::country::Id::IL,
            CountryCode::CN => phonenumber::country::Id::CN,
            CountryCode::JP => phonenumber::country::Id::JP,
            CountryCode::BR => phonenumber::country::Id::BR,
            CountryCode::CA => phonenumber::country::Id::CA,
        }
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing a country code from text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCountryCode(pub String);

impl std::fmt::Display for UnknownCountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown country code: {}", self.0)
    }
}

impl std::error::Error for UnknownCountryCode {}

impl std::str::FromStr for CountryCode {
    type Err = UnknownCountryCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CountryCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownCountryCode(s.to_string()))
    }
}
