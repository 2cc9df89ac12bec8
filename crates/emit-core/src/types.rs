//! Wire-agnostic value types shared by every crate in the workspace.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 32-byte on-chain identity: a token mint or a wallet. The engine never
/// parses the bytes beyond equality and base58 round-tripping — it is a key,
/// not a structured record.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    pub fn from_base58(s: &str) -> Result<Self, AddressParseError> {
        let trimmed = s.trim();
        let bytes = bs58::decode(trimmed)
            .into_vec()
            .map_err(|_| AddressParseError::InvalidBase58)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AddressParseError::WrongLength)?;
        Ok(Self(arr))
    }

    /// True if these bytes decompress to a valid point on the Ed25519 curve —
    /// the on-curve validity check the spec requires before a wallet address
    /// is used as a split recipient.
    pub fn is_on_curve(&self) -> bool {
        ed25519_on_curve(&self.0)
    }
}

/// Delegates to `ed25519-dalek`'s compressed-point decompression, which fails
/// iff the bytes are not a valid point on the curve. Kept as a free function
/// (rather than a `emit-crypto` dependency) so `emit-core` stays leaf-level;
/// `emit-crypto` re-exports the same check for callers that prefer it there.
fn ed25519_on_curve(bytes: &[u8; 32]) -> bool {
    // A constant-size curve point check is cheap enough to inline here
    // without pulling in the signature-verification machinery.
    curve25519_dalek_compressed_y_is_valid(bytes)
}

// Minimal, self-contained compressed-Edwards-y validity check: a 32-byte
// string decompresses to a curve point iff its high bit encodes the sign and
// the remaining 255 bits are less than the field prime (2^255 - 19), and the
// resulting y together with the sign bit yields a valid x via the curve
// equation. We defer to ed25519-dalek's own `VerifyingKey::from_bytes`,
// which performs exactly this check, to avoid re-implementing field
// arithmetic here.
fn curve25519_dalek_compressed_y_is_valid(bytes: &[u8; 32]) -> bool {
    ed25519_dalek::VerifyingKey::from_bytes(bytes).is_ok()
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl FromStr for Address {
    type Err = AddressParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::from_base58(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    #[error("address is not valid base58")]
    InvalidBase58,
    #[error("address must decode to exactly 32 bytes")]
    WrongLength,
}

// ── Amount ────────────────────────────────────────────────────────────────

/// An arbitrary-precision, non-negative token amount. Transported on the
/// wire as a decimal string (never a JSON number, to avoid precision loss);
/// never involved in floating-point arithmetic.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(pub BigUint);

impl Amount {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn from_u64(v: u64) -> Self {
        Self(BigUint::from(v))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parse a decimal-string amount. Rejects empty strings, non-digit
    /// characters, and leading `-` (amounts are unsigned); does not enforce
    /// any upper bound — callers apply `AmountTooLarge` themselves against a
    /// configured safe maximum.
    pub fn parse_decimal(s: &str) -> Result<Self, AmountParseError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountParseError::Empty);
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountParseError::NotDecimal);
        }
        // Reject leading zeros beyond a bare "0" to keep the canonical
        // decimal representation unambiguous.
        if trimmed.len() > 1 && trimmed.starts_with('0') {
            return Err(AmountParseError::NotDecimal);
        }
        let value = trimmed
            .parse::<BigUint>()
            .map_err(|_| AmountParseError::NotDecimal)?;
        Ok(Self(value))
    }

    pub fn saturating_sub(&self, other: &Amount) -> Amount {
        if self.0 >= other.0 {
            Amount(&self.0 - &other.0)
        } else {
            Amount::zero()
        }
    }

    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        if self.0 >= other.0 {
            Some(Amount(&self.0 - &other.0))
        } else {
            None
        }
    }

    pub fn exceeds(&self, max: &Amount) -> bool {
        self.0 > max.0
    }

    /// `self * numerator / denominator`, integer division, truncating.
    pub fn mul_div_floor(&self, numerator: u64, denominator: u64) -> Amount {
        let n = BigUint::from(numerator);
        let d = BigUint::from(denominator);
        Amount((&self.0 * n) / d)
    }

    /// `self * n`, exact (no division).
    pub fn mul_u64(&self, n: u64) -> Amount {
        Amount(&self.0 * BigUint::from(n))
    }

    /// Scale by `10^decimals` — converts a claim-portion unit amount into raw
    /// on-chain base units.
    pub fn scale_by_decimals(&self, decimals: u8) -> Amount {
        let factor = BigUint::from(10u64).pow(decimals as u32);
        Amount(&self.0 * factor)
    }
}

impl std::ops::Add for Amount {
    type Output = Amount;
    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl std::ops::Add for &Amount {
    type Output = Amount;
    fn add(self, rhs: &Amount) -> Amount {
        Amount(&self.0 + &rhs.0)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::parse_decimal(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AmountParseError {
    #[error("amount is empty")]
    Empty,
    #[error("amount is not a plain decimal integer")]
    NotDecimal,
}

// ── Timestamps ───────────────────────────────────────────────────────────

/// Absolute wall-clock instant, Unix seconds UTC. Read once per operation
/// by the caller and threaded through explicitly — components never read
/// the clock mid-operation (see design notes on reproducible eligibility).
pub type Timestamp = i64;

/// Monotonic milliseconds since an arbitrary process-local epoch. Used only
/// for registry TTL bookkeeping, never serialized across processes.
pub type MonotonicMs = u64;

// ── TransactionKey ───────────────────────────────────────────────────────

/// `token (32) || prepared_at_ms (8, big-endian) || random (8)`. Globally
/// unique; collisions are computationally infeasible given the random tail.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionKey([u8; 48]);

impl TransactionKey {
    pub fn new(token: &Address, prepared_at_ms: MonotonicMs, rng: &mut impl rand::RngCore) -> Self {
        let mut buf = [0u8; 48];
        buf[0..32].copy_from_slice(token.as_bytes());
        buf[32..40].copy_from_slice(&prepared_at_ms.to_be_bytes());
        rng.fill_bytes(&mut buf[40..48]);
        Self(buf)
    }

    pub fn token(&self) -> Address {
        let mut b = [0u8; 32];
        b.copy_from_slice(&self.0[0..32]);
        Address(b)
    }

    pub fn prepared_at_ms(&self) -> MonotonicMs {
        let mut b = [0u8; 8];
        b.copy_from_slice(&self.0[32..40]);
        MonotonicMs::from_be_bytes(b)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, TransactionKeyParseError> {
        let bytes = hex::decode(s.trim()).map_err(|_| TransactionKeyParseError::InvalidHex)?;
        let arr: [u8; 48] = bytes
            .try_into()
            .map_err(|_| TransactionKeyParseError::WrongLength)?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for TransactionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionKey({})", self.to_hex())
    }
}

impl fmt::Display for TransactionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for TransactionKey {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TransactionKey {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransactionKeyParseError {
    #[error("transaction key is not valid hex")]
    InvalidHex,
    #[error("transaction key must decode to exactly 48 bytes")]
    WrongLength,
}

// ── Fingerprint ──────────────────────────────────────────────────────────

/// SHA-256 of the canonical serialized unsigned transaction message.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint(pub [u8; 32]);

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", hex::encode(self.0))
    }
}

// ── Claim mode / authorization ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimMode {
    Creator,
    Designated,
}

/// The outcome of a successful `Authorizer` decision: exactly one wallet is
/// permitted to claim, under exactly one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authorization {
    pub authorized_wallet: Address,
    pub mode: ClaimMode,
}

// ── Split recipients ─────────────────────────────────────────────────────

/// One recipient of a portion of the claimers' share. Constructed fresh per
/// `Prepare` call; never persisted.
#[derive(Debug, Clone)]
pub struct SplitRecipient {
    pub wallet: Address,
    pub raw_amount: Amount,
    pub label: Option<String>,
}

// ── Eligibility ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Eligibility {
    pub total_minted: Amount,
    pub available_to_claim: Amount,
    pub max_claimable_now: Amount,
    pub inflation_periods: u64,
    pub next_inflation_time: Timestamp,
    pub can_claim_now: bool,
}

// ── PreparedClaim ────────────────────────────────────────────────────────

/// The registry value. Owned exclusively by `PendingClaimRegistry`.
#[derive(Debug, Clone)]
pub struct PreparedClaim {
    pub token: Address,
    pub user_wallet: Address,
    pub requested_amount: Amount,
    pub decimals: u8,
    pub prepared_at_ms: MonotonicMs,
    pub fingerprint: Fingerprint,
    pub mode: ClaimMode,
}
