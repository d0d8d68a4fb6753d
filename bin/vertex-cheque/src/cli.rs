//! Command line interface.

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy_primitives::{Address, hex};
use clap::{Args, Parser, Subcommand};
use eyre::{Result, WrapErr};
use tracing::info;
use vertex_swarm_chequebook::{
    CashOutConfig, Cheque, LocalChequeSigner, SignedCheque, build_transaction_skeleton, sign_cheque,
};

use crate::{
    logging::{LogArgs, init_logging},
    wallet::WalletArgs,
};

#[derive(Debug, Parser)]
#[command(name = "vertex-cheque", version, about = "Chequebook cheque tool")]
pub(crate) struct Cli {
    #[command(flatten)]
    log: LogArgs,

    /// Cash-out configuration file (TOML).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the packed encoding, digest and signature hash of a cheque.
    Hash(ChequeArgs),

    /// Sign a cheque and print it as JSON.
    Sign {
        #[command(flatten)]
        cheque: ChequeArgs,

        #[command(flatten)]
        wallet: WalletArgs,

        /// Write the signed cheque to this file instead of stdout.
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },

    /// Check that a signed cheque was issued by the given address.
    Verify {
        /// Signed cheque JSON file.
        #[arg(long, value_name = "PATH")]
        cheque: PathBuf,

        /// Expected issuer.
        #[arg(long)]
        issuer: Address,
    },

    /// Print the `cashChequeBeneficiary` call data for a signed cheque.
    CallData {
        /// Signed cheque JSON file.
        #[arg(long, value_name = "PATH")]
        cheque: PathBuf,

        #[command(flatten)]
        cash_out: CashOutArgs,
    },

    /// Print the unsigned cash-out transaction for a signed cheque.
    Tx {
        /// Signed cheque JSON file.
        #[arg(long, value_name = "PATH")]
        cheque: PathBuf,

        /// Pending nonce of the beneficiary.
        #[arg(long)]
        nonce: u64,

        /// Fee price in wei.
        #[arg(long, value_name = "WEI")]
        gas_price: u128,

        #[command(flatten)]
        cash_out: CashOutArgs,
    },
}

/// Cheque fields.
#[derive(Debug, Args)]
#[command(next_help_heading = "Cheque")]
struct ChequeArgs {
    /// Chequebook contract address.
    #[arg(long)]
    chequebook: Address,

    /// Beneficiary address.
    #[arg(long)]
    beneficiary: Address,

    /// Cumulative payout.
    #[arg(long)]
    payout: u64,
}

impl ChequeArgs {
    fn cheque(&self) -> Cheque {
        Cheque::new(self.chequebook, self.beneficiary, self.payout)
    }
}

/// Overrides for the cash-out configuration file.
#[derive(Debug, Args, Default)]
#[command(next_help_heading = "Cash-out")]
struct CashOutArgs {
    /// Address receiving the paid out tokens (default: the beneficiary).
    #[arg(long)]
    recipient: Option<Address>,

    /// Gas ceiling for the cash-out transaction.
    #[arg(long)]
    gas_limit: Option<u64>,

    /// Chain id for replay protection.
    #[arg(long)]
    chain_id: Option<u64>,
}

impl CashOutArgs {
    fn apply(&self, mut config: CashOutConfig) -> CashOutConfig {
        if let Some(recipient) = self.recipient {
            config.recipient = Some(recipient);
        }
        if let Some(gas_limit) = self.gas_limit {
            config.gas_limit = gas_limit;
        }
        if let Some(chain_id) = self.chain_id {
            config.chain_id = Some(chain_id);
        }
        config
    }
}

/// Parse arguments, initialise logging and run the selected command.
pub(crate) async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log)?;

    let config = match &cli.config {
        Some(path) => CashOutConfig::load_or_default(path)
            .wrap_err_with(|| format!("failed to load config {}", path.display()))?,
        None => CashOutConfig::default(),
    };

    let output = match cli.command {
        Command::Hash(args) => hash(&args),
        Command::Sign {
            cheque,
            wallet,
            out,
        } => {
            let json = sign(&cheque, &wallet).await?;
            match out {
                Some(path) => {
                    fs::write(&path, &json)
                        .wrap_err_with(|| format!("failed to write {}", path.display()))?;
                    info!(path = %path.display(), "Signed cheque written");
                    return Ok(());
                }
                None => json,
            }
        }
        Command::Verify { cheque, issuer } => verify(&cheque, issuer)?,
        Command::CallData { cheque, cash_out } => call_data(&cheque, &cash_out.apply(config))?,
        Command::Tx {
            cheque,
            nonce,
            gas_price,
            cash_out,
        } => transaction(&cheque, nonce, gas_price, &cash_out.apply(config))?,
    };

    println!("{output}");
    Ok(())
}

fn hash(args: &ChequeArgs) -> String {
    let cheque = args.cheque();
    format!(
        "encoded:        {}\ndigest:         {}\nsignature hash: {}",
        hex::encode_prefixed(cheque.encode_for_signature()),
        cheque.digest(),
        cheque.signature_hash(),
    )
}

/// Signs the cheque with the wallet key and returns it as JSON.
async fn sign(args: &ChequeArgs, wallet: &WalletArgs) -> Result<String> {
    let key = wallet.signer()?;
    let issuer = key.address();
    let signer = LocalChequeSigner::new(key);

    let signed = sign_cheque(&signer, issuer, args.cheque()).await?;
    info!(%issuer, payout = signed.cheque().cumulative_payout(), "Cheque signed");
    Ok(serde_json::to_string_pretty(&signed)?)
}

fn verify(path: &Path, issuer: Address) -> Result<String> {
    read_cheque(path)?.verify(issuer)?;
    Ok(format!("cheque issued by {issuer}"))
}

fn call_data(path: &Path, config: &CashOutConfig) -> Result<String> {
    let signed = read_cheque(path)?;
    signed.parse_signature()?;

    let recipient = config.recipient_for(signed.cheque());
    Ok(signed.cash_out_call_data(recipient).to_string())
}

/// Unsigned cash-out transaction as JSON.
fn transaction(
    path: &Path,
    nonce: u64,
    gas_price: u128,
    config: &CashOutConfig,
) -> Result<String> {
    let signed = read_cheque(path)?;
    signed.parse_signature()?;

    let recipient = config.recipient_for(signed.cheque());
    let tx = build_transaction_skeleton(
        signed.cash_out_call_data(recipient),
        signed.cheque().chequebook(),
        nonce,
        gas_price,
    )
    .with_gas_limit(config.gas_limit);
    Ok(serde_json::to_string_pretty(&tx)?)
}

fn read_cheque(path: &Path) -> Result<SignedCheque> {
    let data = fs::read(path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
    Ok(SignedCheque::from_json(&data)?)
}
