//! Offline chequebook cheque tool.
//!
//! Hashes, signs and verifies cheques and builds cash-out call data and
//! transactions without talking to a chain.

mod cli;
mod logging;
mod wallet;

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    cli::run().await
}
