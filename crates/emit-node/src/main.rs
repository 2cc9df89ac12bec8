//! emit-node — the Emission Claim Engine HTTP service.
//!
//! Startup sequence:
//!   1. Initialize structured logging
//!   2. Load engine config (flags + optional JSON file) and the protocol
//!      mint-authority keypair (env var, never a flag)
//!   3. Wire the three collaborators (chain gateway, identity registry,
//!      audit store), seeded from a demo-seed file or an ephemeral token
//!      when none is given
//!   4. Build the `ClaimEngine` and start the HTTP server until Ctrl-C

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use emit_core::{Address, Amount, EngineConfig};
use emit_crypto::MintAuthorityKeypair;
use emit_engine::collaborators::MintInfo;
use emit_engine::testing::{FakeAuditStore, FakeChainGateway, FakeIdentityRegistry};
use emit_engine::ClaimEngine;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "emit-node",
    version,
    about = "Emission Claim Engine — server-side claim state machine"
)]
struct Args {
    /// HTTP listen address for the claims API.
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen_addr: SocketAddr,

    /// Path to a JSON file overlaying the default `EngineConfig`.
    #[arg(long)]
    config_path: Option<PathBuf>,

    /// Path to a JSON file seeding the in-memory identity/chain collaborators
    /// with one or more claimable tokens. Only required on first run against
    /// a fresh in-memory backend; without it an ephemeral demo token is
    /// generated.
    #[arg(long)]
    demo_seed: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct DemoSeed {
    tokens: Vec<DemoToken>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DemoToken {
    token_address: String,
    creator_wallet: String,
    #[serde(default)]
    launch_time: i64,
    #[serde(default)]
    decimals: u8,
    #[serde(default)]
    total_minted: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,emit=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    info!("emission claim engine starting");

    let config = EngineConfig::load(args.config_path.as_deref()).context("loading engine config")?;

    let authority = load_or_generate_authority(&config.mint_authority_secret_env);

    // ── Collaborators ─────────────────────────────────────────────────────
    // No real chain/identity/audit backend is in scope for this engine (it
    // signs against invariants, it does not observe chain state beyond
    // confirmation) — the in-memory fakes play that role here, the same way
    // `emit-engine`'s own test suite wires them, just seeded from a file
    // instead of hand-written per test.
    let chain = Arc::new(FakeChainGateway::new());
    let identity = Arc::new(FakeIdentityRegistry::new());
    let audit = Arc::new(FakeAuditStore::new());

    chain.set_blockhash(random_blockhash());
    seed_demo_tokens(args.demo_seed.as_deref(), &chain, &identity, authority.address)
        .context("seeding demo collaborators")?;

    let rotate_chain = Arc::clone(&chain);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(30));
        loop {
            interval.tick().await;
            rotate_chain.set_blockhash(random_blockhash());
        }
    });

    let engine = Arc::new(ClaimEngine::new(chain, identity, audit, authority, config));
    let state = Arc::new(emit_api::AppState::new(engine));

    info!(addr = %args.listen_addr, "engine ready");
    run_server(args.listen_addr, state).await
}

async fn run_server(addr: SocketAddr, state: Arc<emit_api::AppState>) -> anyhow::Result<()> {
    let app = emit_api::router(state);
    let listener = tokio::net::TcpListener::bind(addr).await.context("binding listen address")?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running HTTP server")?;
    info!("emit-node shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

/// Load the protocol mint-authority secret from the configured environment
/// variable, or generate an ephemeral one with a loud warning. Mirrors the
/// reference node's fallback to ephemeral genesis keys when no genesis file
/// is given: convenient for local development, useless for a shared chain.
fn load_or_generate_authority(env_var: &str) -> MintAuthorityKeypair {
    match MintAuthorityKeypair::load_from_env(env_var) {
        Ok(kp) => kp,
        Err(err) => {
            warn!(
                %err,
                "no usable {env_var} in the environment — generating an ephemeral mint authority. \
                 DO NOT USE IN PRODUCTION: this key cannot co-sign against any real chain's mint."
            );
            MintAuthorityKeypair::generate()
        }
    }
}

fn seed_demo_tokens(
    path: Option<&std::path::Path>,
    chain: &FakeChainGateway,
    identity: &FakeIdentityRegistry,
    mint_authority: Address,
) -> anyhow::Result<()> {
    let seed = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("reading demo seed {}", p.display()))?;
            serde_json::from_str(&text).context("parsing demo seed JSON")?
        }
        None => {
            warn!(
                "no --demo-seed provided — generating one ephemeral demo token. Its address is \
                 logged below; it exists only in this process's memory and is gone on restart."
            );
            ephemeral_seed()
        }
    };

    for token in seed.tokens {
        let token_address = token
            .token_address
            .parse::<Address>()
            .with_context(|| format!("invalid tokenAddress {}", token.token_address))?;
        let creator_wallet = token
            .creator_wallet
            .parse::<Address>()
            .with_context(|| format!("invalid creatorWallet {}", token.creator_wallet))?;
        let total_minted = token
            .total_minted
            .as_deref()
            .map(Amount::parse_decimal)
            .transpose()
            .context("invalid totalMinted")?
            .unwrap_or_else(Amount::zero);

        identity.set_launch_time(token_address, token.launch_time);
        identity.set_creator(token_address, creator_wallet);
        identity.set_total_minted(token_address, total_minted);
        chain.set_mint(token_address, MintInfo { decimals: token.decimals, mint_authority });

        info!(token = %token_address, creator = %creator_wallet, "demo token seeded");
    }

    Ok(())
}

/// A single placeholder token with no controllable creator wallet — enough
/// to exercise `GET /health` and `GET /claims/{token}` against a fresh
/// in-memory backend. Exercising `mint`/`confirm` end-to-end requires a real
/// `--demo-seed` file naming a creator wallet whose private key the caller
/// holds.
fn ephemeral_seed() -> DemoSeed {
    let token_address = Address::from_bytes(rand_bytes());
    let creator_wallet = Address::from_bytes(rand_bytes());

    DemoSeed {
        tokens: vec![DemoToken {
            token_address: token_address.to_base58(),
            creator_wallet: creator_wallet.to_base58(),
            launch_time: 0,
            decimals: 6,
            total_minted: Some("0".to_string()),
        }],
    }
}

fn rand_bytes() -> [u8; 32] {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes
}

fn random_blockhash() -> [u8; 32] {
    rand_bytes()
}
