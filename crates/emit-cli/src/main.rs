//! emit-cli
//!
//! Thin demo/integration client for a running `emit-node`. Manages an
//! Ed25519 wallet keypair, queries eligibility, and drives the full
//! Prepare/Confirm round trip — signing the unsigned transaction `emit-node`
//! returns locally, the way a wallet UI would before it ever talks to a
//! chain.
//!
//! Usage:
//!   emit-cli keygen      [--keyfile <path>]
//!   emit-cli eligibility --token <b58> [--wallet <b58>] [--rpc <url>]
//!   emit-cli claim       --token <b58> --amount <decimal> [--rpc <url>] [--keyfile <path>]

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use ed25519_dalek::{Signer, SigningKey};
use emit_core::Address;
use emit_engine::{Message, SignedTransaction};
use serde::{Deserialize, Serialize};
use tracing::info;

mod client;
use client::ClaimApiClient;

#[derive(Parser, Debug)]
#[command(
    name = "emit-cli",
    version,
    about = "Emission Claim Engine wallet — prepare, sign, and confirm a claim"
)]
struct Args {
    /// Path to the wallet keyfile (JSON).
    #[arg(long, global = true, default_value = "~/.emit/wallet.json")]
    keyfile: PathBuf,

    /// emit-node base URL.
    #[arg(long, global = true, default_value = "http://127.0.0.1:8080")]
    rpc: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new Ed25519 keypair and save it to the keyfile.
    Keygen,

    /// Query claim eligibility for a token.
    Eligibility {
        /// Token address (base58).
        #[arg(long)]
        token: String,
        /// Wallet to evaluate; defaults to the local keypair's address.
        #[arg(long)]
        wallet: Option<String>,
    },

    /// Prepare, sign, and confirm a claim in one step.
    Claim {
        /// Token address (base58).
        #[arg(long)]
        token: String,
        /// Requested amount, as a decimal string (pre-decimal-scaling).
        #[arg(long)]
        amount: String,
    },
}

#[derive(Serialize, Deserialize)]
struct WalletKeyfile {
    secret_hex: String,
    address: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("warn,emit_cli=info").init();

    let args = Args::parse();
    let keyfile = expand_tilde(&args.keyfile);
    let client = ClaimApiClient::new(&args.rpc);

    match args.command {
        Command::Keygen => cmd_keygen(&keyfile),

        Command::Eligibility { token, wallet } => {
            let wallet = match wallet {
                Some(w) => w,
                None => load_keypair(&keyfile)?.1.to_base58(),
            };
            let eligibility = client.get_eligibility(&token, &wallet).await?;
            println!("{}", serde_json::to_string_pretty(&eligibility)?);
            Ok(())
        }

        Command::Claim { token, amount } => cmd_claim(&client, &keyfile, &token, &amount).await,
    }
}

fn cmd_keygen(keyfile: &PathBuf) -> anyhow::Result<()> {
    if keyfile.exists() {
        bail!("Keyfile {} already exists. Delete it first to generate a new key.", keyfile.display());
    }
    if let Some(parent) = keyfile.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
    let address = Address::from_bytes(signing_key.verifying_key().to_bytes());
    let record = WalletKeyfile {
        secret_hex: hex::encode(signing_key.to_bytes()),
        address: address.to_base58(),
    };
    std::fs::write(keyfile, serde_json::to_string_pretty(&record)?)
        .with_context(|| format!("writing keyfile to {}", keyfile.display()))?;

    println!("Generated new keypair.");
    println!("Address: {}", record.address);
    println!("Keyfile: {}", keyfile.display());
    println!("\nBACK UP YOUR KEYFILE. Loss = permanent loss of claim rights.");
    Ok(())
}

async fn cmd_claim(
    client: &ClaimApiClient,
    keyfile: &PathBuf,
    token: &str,
    amount: &str,
) -> anyhow::Result<()> {
    let (signing_key, wallet) = load_keypair(keyfile)?;

    info!(%token, %wallet, %amount, "preparing claim");
    let mint_resp = client.mint(token, &wallet.to_base58(), amount).await?;
    if mint_resp["success"].as_bool() != Some(true) {
        bail!("mint request did not report success: {mint_resp}");
    }

    let tx_b58 = mint_resp["transaction"].as_str().context("missing transaction field")?;
    let tx_bytes = bs58::decode(tx_b58).into_vec().context("decoding transaction base58")?;
    let message: Message = bincode::deserialize(&tx_bytes).context("decoding transaction message")?;

    let signature = signing_key.sign(&message.canonical_bytes()).to_bytes();
    let signed = SignedTransaction { message, signature };
    let signed_bytes = bincode::serialize(&signed).context("serializing signed transaction")?;
    let signed_b58 = bs58::encode(signed_bytes).into_string();

    info!("submitting signed transaction");
    let confirm_resp = client.confirm(&signed_b58, &mint_resp["transactionKey"]).await?;

    println!("{}", serde_json::to_string_pretty(&confirm_resp)?);
    Ok(())
}

fn load_keypair(keyfile: &PathBuf) -> anyhow::Result<(SigningKey, Address)> {
    let json = std::fs::read_to_string(keyfile)
        .with_context(|| format!("reading keyfile {} — run `emit-cli keygen` first", keyfile.display()))?;
    let record: WalletKeyfile =
        serde_json::from_str(&json).context("parsing keyfile — is it a valid emit-cli keyfile?")?;

    let seed_bytes = hex::decode(&record.secret_hex).context("decoding keyfile secret hex")?;
    let seed: [u8; 32] =
        seed_bytes.try_into().map_err(|_| anyhow::anyhow!("keyfile secret must be 32 bytes"))?;
    let signing_key = SigningKey::from_bytes(&seed);
    let address = record.address.parse::<Address>().context("parsing keyfile address")?;

    Ok((signing_key, address))
}

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.clone()
}
