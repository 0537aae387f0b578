use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO-like currency code used for every amount the engine stores.
///
/// Collecta is mono-currency (`INR`), but currency is modelled explicitly so
/// that formatting and parsing have a single source of truth.
///
/// ## Minor units
///
/// Monetary values are stored as an `i64` number of **minor units** (see
/// [`Money`](crate::Money)). Example: INR has 2 minor units, so `10.50 INR` ⇄
/// `1050` paise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Inr,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Inr => "INR",
        }
    }

    /// Number of fraction digits of the stored minor unit.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Inr => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "INR" => Ok(Currency::Inr),
            other => Err(EngineError::InvalidAmount(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitive_code() {
        assert_eq!(Currency::try_from(" inr ").unwrap(), Currency::Inr);
        assert!(Currency::try_from("EUR").is_err());
        assert_eq!(Currency::Inr.minor_units(), 2);
    }
}
