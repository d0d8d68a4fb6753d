//! Wallet CLI arguments.

use alloy_signer_local::{LocalSigner, PrivateKeySigner};
use clap::Args;
use eyre::{Result, WrapErr, bail};
use std::{path::PathBuf, str::FromStr};

#[derive(Debug, Clone, Args, PartialEq, Eq)]
#[command(next_help_heading = "Wallet")]
pub(crate) struct WalletArgs {
    /// The path to the JSON keystore file
    #[arg(
        long,
        value_name = "PATH",
        requires = "password",
        group = "wallet_config"
    )]
    pub(crate) keystore_file: Option<PathBuf>,

    /// The password to unlock the keystore file
    #[arg(
        long,
        value_name = "PASSWORD",
        requires = "keystore_file",
        group = "wallet_config"
    )]
    pub(crate) password: Option<String>,

    /// The raw private key to use for the wallet as a hex string
    #[arg(long, value_name = "PRIVATE_KEY", group = "wallet_config")]
    pub(crate) private_key: Option<String>,
}

impl WalletArgs {
    /// Returns the configured signing key.
    pub(crate) fn signer(&self) -> Result<PrivateKeySigner> {
        match (
            self.keystore_file.as_ref(),
            self.password.as_ref(),
            self.private_key.as_ref(),
        ) {
            (Some(keystore_file), Some(password), None) => {
                LocalSigner::decrypt_keystore(keystore_file, password).wrap_err_with(|| {
                    format!("failed to decrypt keystore {}", keystore_file.display())
                })
            }
            (None, None, Some(private_key)) => {
                PrivateKeySigner::from_str(private_key).wrap_err("invalid private key")
            }
            _ => bail!(
                "a wallet is required: pass --private-key or --keystore-file with --password"
            ),
        }
    }
}
