//! Cash-out configuration for TOML persistence.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::{Cheque, cashout::DEFAULT_CASH_OUT_GAS_LIMIT};

/// Errors loading or saving a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading or writing the file failed.
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for this configuration.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Parameters for cashing cheques.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashOutConfig {
    /// Address receiving the paid out tokens. Defaults to the cheque's beneficiary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Address>,

    /// Gas ceiling for the cash-out transaction.
    pub gas_limit: u64,

    /// Chain id for replay-protected transactions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

impl Default for CashOutConfig {
    fn default() -> Self {
        Self {
            recipient: None,
            gas_limit: DEFAULT_CASH_OUT_GAS_LIMIT,
            chain_id: None,
        }
    }
}

impl CashOutConfig {
    /// Recipient for cashing `cheque`.
    pub fn recipient_for(&self, cheque: &Cheque) -> Address {
        self.recipient.unwrap_or(cheque.beneficiary())
    }

    /// Load the configuration from `path`, or the default if it doesn't exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save the configuration to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CashOutConfig::default();
        assert_eq!(config.gas_limit, 1_000_000);
        assert_eq!(config.recipient, None);

        let cheque = Cheque::new(Address::ZERO, Address::repeat_byte(0x02), 1);
        assert_eq!(config.recipient_for(&cheque), Address::repeat_byte(0x02));
    }

    #[test]
    fn partial_file_uses_defaults() {
        let config: CashOutConfig =
            toml::from_str("recipient = \"0xAd4F6Efc6594fE9305bF9A69BAb8bd942aDAECDB\"").unwrap();

        let recipient: Address = "0xAd4F6Efc6594fE9305bF9A69BAb8bd942aDAECDB".parse().unwrap();
        assert_eq!(config.recipient, Some(recipient));
        assert_eq!(config.gas_limit, DEFAULT_CASH_OUT_GAS_LIMIT);
        assert_eq!(config.chain_id, None);
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cashout.toml");

        assert_eq!(CashOutConfig::load_or_default(&path).unwrap(), CashOutConfig::default());

        let config = CashOutConfig {
            recipient: Some(Address::repeat_byte(0x0a)),
            gas_limit: 300_000,
            chain_id: Some(100),
        };
        config.save(&path).unwrap();
        assert_eq!(CashOutConfig::load_or_default(&path).unwrap(), config);
    }

    #[test]
    fn invalid_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cashout.toml");
        fs::write(&path, "gas_limit = \"lots\"").unwrap();

        assert!(matches!(
            CashOutConfig::load_or_default(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
