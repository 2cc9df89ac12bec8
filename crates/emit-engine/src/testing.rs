//! In-memory fakes for the three collaborator traits, shared by every
//! module's test suite in this crate. Exposed outside the crate behind the
//! `testing` feature so `emit-node`'s integration tests can reuse them too.

use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;
use emit_core::{Address, Amount, EmissionError, Timestamp};

use crate::collaborators::{
    AuditStore, ChainGateway, Commitment, ConfirmationStatus, DesignatedClaim, IdentityRegistry,
    MintInfo, SendOptions,
};

#[derive(Default)]
pub struct FakeIdentityRegistry {
    launch_times: DashMap<Address, Timestamp>,
    creators: DashMap<Address, Address>,
    designated: DashMap<Address, DesignatedClaim>,
    total_minted: DashMap<Address, Amount>,
}

impl FakeIdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_launch_time(&self, token: Address, launch: Timestamp) {
        self.launch_times.insert(token, launch);
    }

    pub fn set_creator(&self, token: Address, creator: Address) {
        self.creators.insert(token, creator);
    }

    pub fn set_designated(
        &self,
        token: Address,
        original_launcher: Address,
        verified_external_wallet: Option<Address>,
        verified_embedded_wallet: Option<Address>,
    ) {
        self.designated.insert(
            token,
            DesignatedClaim {
                original_launcher,
                verified_external_wallet,
                verified_embedded_wallet,
            },
        );
    }

    pub fn set_total_minted(&self, token: Address, amount: Amount) {
        self.total_minted.insert(token, amount);
    }
}

#[async_trait]
impl IdentityRegistry for FakeIdentityRegistry {
    async fn get_token_launch_time(&self, token: &Address) -> Result<Option<Timestamp>, EmissionError> {
        Ok(self.launch_times.get(token).map(|v| *v))
    }

    async fn get_token_creator_wallet(&self, token: &Address) -> Result<Option<Address>, EmissionError> {
        Ok(self.creators.get(token).map(|v| *v))
    }

    async fn get_designated_claim(
        &self,
        token: &Address,
    ) -> Result<Option<DesignatedClaim>, EmissionError> {
        Ok(self.designated.get(token).map(|v| *v))
    }

    async fn get_total_minted(&self, token: &Address) -> Result<Amount, EmissionError> {
        Ok(self
            .total_minted
            .get(token)
            .map(|v| v.clone())
            .unwrap_or_else(Amount::zero))
    }
}

/// A submission outcome queued ahead of time, reported back in order as
/// `send_raw_transaction` hands out signatures and `get_signature_status`
/// is polled.
pub struct FakeChainGateway {
    pub blockhash: Mutex<[u8; 32]>,
    pub mints: DashMap<Address, MintInfo>,
    pub statuses: DashMap<String, ConfirmationStatus>,
    pub next_signature: Mutex<u64>,
    pub sent: Mutex<Vec<Vec<u8>>>,
    pub fail_send: Mutex<Option<EmissionError>>,
}

impl Default for FakeChainGateway {
    fn default() -> Self {
        Self {
            blockhash: Mutex::new([1u8; 32]),
            mints: DashMap::new(),
            statuses: DashMap::new(),
            next_signature: Mutex::new(0),
            sent: Mutex::new(Vec::new()),
            fail_send: Mutex::new(None),
        }
    }
}

impl FakeChainGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mint(&self, token: Address, info: MintInfo) {
        self.mints.insert(token, info);
    }

    pub fn set_blockhash(&self, hash: [u8; 32]) {
        *self.blockhash.lock().unwrap() = hash;
    }

    /// Registers the terminal status that will be reported for the
    /// `n`th signature this gateway hands out (0-indexed), so tests can
    /// pre-arrange an outcome before calling `send_raw_transaction`.
    pub fn queue_status_for_next(
        &self,
        confirmation_status: Option<&str>,
        err: Option<&str>,
    ) {
        let n = *self.next_signature.lock().unwrap();
        self.statuses.insert(
            format!("fake-sig-{n}"),
            ConfirmationStatus {
                err: err.map(str::to_string),
                confirmation_status: confirmation_status.map(str::to_string),
            },
        );
    }

    pub fn set_fail_send(&self, err: EmissionError) {
        *self.fail_send.lock().unwrap() = Some(err);
    }
}

#[async_trait]
impl ChainGateway for FakeChainGateway {
    async fn get_latest_blockhash(&self) -> Result<[u8; 32], EmissionError> {
        Ok(*self.blockhash.lock().unwrap())
    }

    async fn is_blockhash_valid(&self, blockhash: &[u8; 32]) -> Result<bool, EmissionError> {
        Ok(*blockhash == *self.blockhash.lock().unwrap())
    }

    async fn get_mint(&self, token: &Address) -> Result<MintInfo, EmissionError> {
        self.mints
            .get(token)
            .map(|v| *v)
            .ok_or_else(|| EmissionError::ChainUnavailable("no mint on file in fake".into()))
    }

    async fn send_raw_transaction(
        &self,
        signed_tx_bytes: &[u8],
        _opts: SendOptions,
    ) -> Result<String, EmissionError> {
        if let Some(err) = self.fail_send.lock().unwrap().take() {
            return Err(err);
        }
        self.sent.lock().unwrap().push(signed_tx_bytes.to_vec());
        let mut n = self.next_signature.lock().unwrap();
        let sig = format!("fake-sig-{n}");
        *n += 1;
        Ok(sig)
    }

    async fn get_signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<ConfirmationStatus>, EmissionError> {
        Ok(self.statuses.get(signature).map(|v| v.clone()))
    }
}

#[derive(Default)]
pub struct FakeAuditStore {
    recent: DashMap<Address, bool>,
    recorded: Mutex<Vec<(Address, Address, Amount)>>,
}

impl FakeAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_recent_claim(&self, token: Address, recent: bool) {
        self.recent.insert(token, recent);
    }

    pub fn recorded_claims(&self) -> Vec<(Address, Address, Amount)> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditStore for FakeAuditStore {
    async fn has_recent_claim(&self, token: &Address, _window_secs: i64) -> Result<bool, EmissionError> {
        Ok(self.recent.get(token).map(|v| *v).unwrap_or(false))
    }

    async fn pre_record_claim(
        &self,
        user: &Address,
        token: &Address,
        amount: &Amount,
    ) -> Result<(), EmissionError> {
        self.recorded
            .lock()
            .unwrap()
            .push((*user, *token, amount.clone()));
        Ok(())
    }
}

/// Convenience for tests that only care about `SendOptions`'s shape.
pub fn default_send_options() -> SendOptions {
    SendOptions {
        skip_preflight: false,
        preflight_commitment: Commitment::Processed,
    }
}
