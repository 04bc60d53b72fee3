//! Stellar assets as they appear in Horizon reserves and query parameters.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Horizon asset type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    /// The network's native asset (XLM).
    Native,
    /// Credit asset with a code of 1 to 4 characters.
    CreditAlphanum4,
    /// Credit asset with a code of 5 to 12 characters.
    CreditAlphanum12,
}

impl AssetType {
    /// Returns the Horizon query-parameter value for this type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Native => "native",
            AssetType::CreditAlphanum4 => "credit_alphanum4",
            AssetType::CreditAlphanum12 => "credit_alphanum12",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Stellar asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    /// XLM.
    Native,
    /// An issued asset.
    Credit {
        /// Asset code, e.g. `XLMFISH`.
        code: String,
        /// Issuing account.
        issuer: String,
    },
}

impl Asset {
    /// Creates a credit asset.
    pub fn credit(code: impl Into<String>, issuer: impl Into<String>) -> Self {
        Asset::Credit {
            code: code.into(),
            issuer: issuer.into(),
        }
    }

    /// Returns the Horizon asset type, derived from the code length.
    #[must_use]
    pub fn asset_type(&self) -> AssetType {
        match self {
            Asset::Native => AssetType::Native,
            Asset::Credit { code, .. } if code.chars().count() <= 4 => AssetType::CreditAlphanum4,
            Asset::Credit { .. } => AssetType::CreditAlphanum12,
        }
    }

    /// Asset code, `None` for native.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Asset::Native => None,
            Asset::Credit { code, .. } => Some(code),
        }
    }

    /// Issuer account, `None` for native.
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        match self {
            Asset::Native => None,
            Asset::Credit { issuer, .. } => Some(issuer),
        }
    }

    /// Returns true for XLM.
    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }

    /// Canonical Horizon form: `native` or `CODE:ISSUER`.
    #[must_use]
    pub fn canonical(&self) -> String {
        match self {
            Asset::Native => "native".to_string(),
            Asset::Credit { code, issuer } => format!("{code}:{issuer}"),
        }
    }

    /// Label used in pool names and tables.
    #[must_use]
    pub fn short_code(&self) -> &str {
        match self {
            Asset::Native => "XLM",
            Asset::Credit { code, .. } => code,
        }
    }

    /// Identity used when deduplicating counter assets: `type:code:issuer`.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.asset_type(),
            self.code().unwrap_or_default(),
            self.issuer().unwrap_or_default()
        )
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl FromStr for Asset {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "native" {
            return Ok(Asset::Native);
        }
        match s.split_once(':') {
            Some((code, issuer)) if !code.is_empty() && !issuer.is_empty() => {
                Ok(Asset::credit(code, issuer))
            }
            _ => Err(DomainError::InvalidAsset(s.to_string())),
        }
    }
}

/// Display code for a raw reserve asset string.
///
/// Falls back to the raw string when it has no code part.
#[must_use]
pub fn short_code_of(raw: &str) -> &str {
    if raw == "native" {
        return "XLM";
    }
    match raw.split(':').next() {
        Some(code) if !code.is_empty() => code,
        _ => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER: &str = "GAX3YQC26LTS6NLW2QGRQC4MK24XKL5JLZ7KFHNERWPC3HKCT2ABTEMT";

    #[test]
    fn test_parse_native_and_credit() {
        assert_eq!("native".parse::<Asset>().unwrap(), Asset::Native);

        let fish: Asset = format!("XLMFISH:{ISSUER}").parse().unwrap();
        assert_eq!(fish.code(), Some("XLMFISH"));
        assert_eq!(fish.issuer(), Some(ISSUER));
        assert_eq!(fish.canonical(), format!("XLMFISH:{ISSUER}"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("USDC".parse::<Asset>().is_err());
        assert!(":ISSUER".parse::<Asset>().is_err());
        assert!("USDC:".parse::<Asset>().is_err());
    }

    #[test]
    fn test_asset_type_from_code_length() {
        assert_eq!(Asset::Native.asset_type(), AssetType::Native);
        assert_eq!(
            Asset::credit("USDC", ISSUER).asset_type(),
            AssetType::CreditAlphanum4
        );
        assert_eq!(
            Asset::credit("XLMFISH", ISSUER).asset_type(),
            AssetType::CreditAlphanum12
        );
        assert_eq!(AssetType::CreditAlphanum12.as_str(), "credit_alphanum12");
    }

    #[test]
    fn test_dedup_key() {
        assert_eq!(Asset::Native.dedup_key(), "native::");
        assert_eq!(
            Asset::credit("AQUA", "GISSUER").dedup_key(),
            "credit_alphanum4:AQUA:GISSUER"
        );
    }

    #[test]
    fn test_short_codes() {
        assert_eq!(Asset::Native.short_code(), "XLM");
        assert_eq!(short_code_of("native"), "XLM");
        assert_eq!(short_code_of("AQUA:GISSUER"), "AQUA");
        assert_eq!(short_code_of(":GISSUER"), ":GISSUER");
    }
}
