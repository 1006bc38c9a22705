//! Authorize a transaction with the zero-knowledge proof and submit it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::Arc;
use zkvote_identity::IdentityClaims;
use zkvote_ledger::LedgerClient;
use zkvote_prover::{ZkProofArtifact, KEY_CLAIM_NAME};
use zkvote_types::{Epoch, KeyPair, TxDigest};

use crate::{
    user_signature, GasConfig, TransactionBuilder, TransactionIntent, TxError,
    ZkLoginAuthenticator,
};

/// Everything the authorization binds together for one session.
pub struct AuthorizationContext<'a> {
    pub proof: &'a ZkProofArtifact,
    pub keypair: &'a KeyPair,
    pub max_epoch: Epoch,
    pub claims: &'a IdentityClaims,
    pub salt: &'a str,
}

/// A transaction ready for submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    pub tx_bytes: Vec<u8>,
    /// Base64 composite authorization.
    pub authorization: String,
}

pub struct TransactionAuthorizer {
    ledger: Arc<dyn LedgerClient>,
    builder: TransactionBuilder,
}

impl TransactionAuthorizer {
    pub fn new(ledger: Arc<dyn LedgerClient>, gas: GasConfig) -> Self {
        let builder = TransactionBuilder::new(ledger.clone(), gas);
        Self { ledger, builder }
    }

    /// Build the transaction for `intent` and attach the authorization.
    pub async fn authorize(
        &self,
        ctx: &AuthorizationContext<'_>,
        intent: &TransactionIntent,
    ) -> Result<SignedTransaction, TxError> {
        let claims = ctx.claims;
        let seed =
            zkvote_crypto::gen_address_seed(ctx.salt, KEY_CLAIM_NAME, &claims.sub, &claims.aud)?;
        let sender = zkvote_crypto::derive_address(&claims.iss, &seed)?;

        let tx = self.builder.build(intent, sender, ctx.max_epoch).await?;
        let tx_bytes = tx.to_bytes()?;

        let digest = zkvote_crypto::intent_digest(&tx_bytes);
        let signature = zkvote_crypto::sign_message(&digest, &ctx.keypair.private);
        if !zkvote_crypto::verify_signature(&digest, &signature, &ctx.keypair.public) {
            return Err(TxError::Signing(
                "ephemeral public key does not match its private key".into(),
            ));
        }

        let authenticator = ZkLoginAuthenticator::new(
            ctx.proof,
            &seed,
            ctx.max_epoch,
            user_signature(&signature, &ctx.keypair.public),
        );
        Ok(SignedTransaction {
            tx_bytes,
            authorization: authenticator.to_base64()?,
        })
    }

    /// Authorize and submit. Submission is attempted once; a non-success
    /// effects status is a `Submission` error carrying the reason.
    pub async fn authorize_and_submit(
        &self,
        ctx: &AuthorizationContext<'_>,
        intent: &TransactionIntent,
    ) -> Result<TxDigest, TxError> {
        let signed = self.authorize(ctx, intent).await?;
        let response = self
            .ledger
            .execute_transaction(&STANDARD.encode(&signed.tx_bytes), &[signed.authorization])
            .await?;

        match response.outcome() {
            Ok(()) => {
                tracing::info!(action = intent.label(), digest = %response.digest, "transaction succeeded");
                Ok(response.digest)
            }
            Err(reason) => {
                tracing::warn!(action = intent.label(), digest = %response.digest, %reason, "transaction failed");
                Err(TxError::Submission(reason))
            }
        }
    }
}
