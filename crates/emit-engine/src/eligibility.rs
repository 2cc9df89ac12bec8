//! Pure, deterministic eligibility arithmetic (spec §4.1). No I/O, no
//! clock reads — `now` is supplied by the caller exactly once per
//! operation so a reported `next_inflation_time` always agrees with the
//! decision it was computed alongside.

use emit_core::{Amount, Eligibility, EngineConfig, Timestamp};

pub struct EligibilityCalculator;

impl EligibilityCalculator {
    /// `launch`: token launch instant (`L`). `now`: the instant this
    /// operation reads the clock (`N`). `total_minted`: observed on-chain
    /// total minted so far (`M`).
    pub fn compute(
        launch: Timestamp,
        now: Timestamp,
        total_minted: &Amount,
        config: &EngineConfig,
    ) -> Eligibility {
        let delta = config.inflation_period_secs.max(1);
        let elapsed = (now - launch).max(0);
        let inflation_periods = (elapsed / delta) as u64;

        let max_claimable_now = config.tokens_per_period.mul_u64(inflation_periods);
        let available_to_claim = max_claimable_now.saturating_sub(total_minted);
        let next_inflation_time = launch + (inflation_periods as i64 + 1) * delta;
        let can_claim_now = !available_to_claim.is_zero();

        Eligibility {
            total_minted: total_minted.clone(),
            available_to_claim,
            max_claimable_now,
            inflation_periods,
            next_inflation_time,
            can_claim_now,
        }
    }
}
