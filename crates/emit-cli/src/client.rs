use anyhow::{bail, Context};
use serde_json::Value;

/// Thin HTTP client for a running `emit-node`, used the way the reference
/// wallet's RPC client talks to a node — raw `reqwest` calls against plain
/// JSON, no generated client.
pub struct ClaimApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ClaimApiClient {
    pub fn new(base_url: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), client: reqwest::Client::new() }
    }

    pub async fn get_eligibility(&self, token_b58: &str, wallet_b58: &str) -> anyhow::Result<Value> {
        let url = format!("{}/claims/{}", self.base_url, token_b58);
        let resp = self
            .client
            .get(&url)
            .query(&[("wallet", wallet_b58)])
            .send()
            .await
            .with_context(|| format!("connecting to {url}"))?;
        Self::unwrap_json(resp).await
    }

    pub async fn mint(&self, token_b58: &str, wallet_b58: &str, claim_amount: &str) -> anyhow::Result<Value> {
        let url = format!("{}/claims/mint", self.base_url);
        let body = serde_json::json!({
            "tokenAddress": token_b58,
            "userWallet": wallet_b58,
            "claimAmount": claim_amount,
        });
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("connecting to {url}"))?;
        Self::unwrap_json(resp).await
    }

    pub async fn confirm(&self, signed_transaction_b58: &str, transaction_key: &Value) -> anyhow::Result<Value> {
        let url = format!("{}/claims/confirm", self.base_url);
        let body = serde_json::json!({
            "signedTransaction": signed_transaction_b58,
            "transactionKey": transaction_key,
        });
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("connecting to {url}"))?;
        Self::unwrap_json(resp).await
    }

    async fn unwrap_json(resp: reqwest::Response) -> anyhow::Result<Value> {
        let status = resp.status();
        let json: Value = resp.json().await.context("parsing JSON response")?;
        if !status.is_success() {
            bail!("request failed ({status}): {json}");
        }
        Ok(json)
    }
}
