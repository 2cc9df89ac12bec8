//! Decides which wallet, if any, may claim for a given token right now
//! (spec §4.2). Invoked twice per claim lifecycle — once at Prepare, once
//! (authoritatively) at Confirm, since the designated record or creator
//! can change between the two calls.

use emit_core::{Address, Authorization, ClaimMode, EmissionError};

use crate::collaborators::IdentityRegistry;

pub struct Authorizer;

impl Authorizer {
    pub async fn authorize(
        token: &Address,
        user: &Address,
        identity_registry: &(dyn IdentityRegistry),
    ) -> Result<Authorization, EmissionError> {
        if let Some(designated) = identity_registry.get_designated_claim(token).await? {
            if *user == designated.original_launcher {
                return Err(EmissionError::DesignatedDeniedToLauncher);
            }
            if !designated.has_any_verified_wallet() {
                return Err(EmissionError::DesignatedUnverified);
            }
            if designated.is_verified_wallet(user) {
                return Ok(Authorization {
                    authorized_wallet: *user,
                    mode: ClaimMode::Designated,
                });
            }
            return Err(EmissionError::DesignatedForbidden);
        }

        let creator = identity_registry
            .get_token_creator_wallet(token)
            .await?
            .ok_or(EmissionError::CreatorUnknown)?;

        if *user == creator {
            Ok(Authorization {
                authorized_wallet: *user,
                mode: ClaimMode::Creator,
            })
        } else {
            Err(EmissionError::CreatorForbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeIdentityRegistry;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 32])
    }

    #[tokio::test]
    async fn creator_mode_allows_creator() {
        let registry = FakeIdentityRegistry::new();
        let token = addr(1);
        let creator = addr(2);
        registry.set_creator(token, creator);

        let auth = Authorizer::authorize(&token, &creator, &registry).await.unwrap();
        assert_eq!(auth.mode, ClaimMode::Creator);
        assert_eq!(auth.authorized_wallet, creator);
    }

    #[tokio::test]
    async fn creator_mode_forbids_non_creator() {
        let registry = FakeIdentityRegistry::new();
        let token = addr(1);
        registry.set_creator(token, addr(2));

        let err = Authorizer::authorize(&token, &addr(3), &registry).await.unwrap_err();
        assert!(matches!(err, EmissionError::CreatorForbidden));
    }

    #[tokio::test]
    async fn creator_unknown_when_no_creator_on_file() {
        let registry = FakeIdentityRegistry::new();
        let err = Authorizer::authorize(&addr(1), &addr(2), &registry).await.unwrap_err();
        assert!(matches!(err, EmissionError::CreatorUnknown));
    }

    #[tokio::test]
    async fn designated_denies_launcher() {
        let registry = FakeIdentityRegistry::new();
        let token = addr(1);
        let launcher = addr(2);
        let verified = addr(3);
        registry.set_designated(token, launcher, Some(verified), None);

        let err = Authorizer::authorize(&token, &launcher, &registry).await.unwrap_err();
        assert!(matches!(err, EmissionError::DesignatedDeniedToLauncher));
    }

    #[tokio::test]
    async fn designated_unverified_when_no_wallets_on_file() {
        let registry = FakeIdentityRegistry::new();
        let token = addr(1);
        registry.set_designated(token, addr(2), None, None);

        let err = Authorizer::authorize(&token, &addr(9), &registry).await.unwrap_err();
        assert!(matches!(err, EmissionError::DesignatedUnverified));
    }

    #[tokio::test]
    async fn designated_allows_verified_external_or_embedded() {
        let registry = FakeIdentityRegistry::new();
        let token = addr(1);
        let ext = addr(3);
        let emb = addr(4);
        registry.set_designated(token, addr(2), Some(ext), Some(emb));

        let a = Authorizer::authorize(&token, &ext, &registry).await.unwrap();
        assert_eq!(a.mode, ClaimMode::Designated);
        let b = Authorizer::authorize(&token, &emb, &registry).await.unwrap();
        assert_eq!(b.mode, ClaimMode::Designated);
    }

    #[tokio::test]
    async fn designated_forbids_unrelated_wallet() {
        let registry = FakeIdentityRegistry::new();
        let token = addr(1);
        registry.set_designated(token, addr(2), Some(addr(3)), None);

        let err = Authorizer::authorize(&token, &addr(99), &registry).await.unwrap_err();
        assert!(matches!(err, EmissionError::DesignatedForbidden));
    }
}
