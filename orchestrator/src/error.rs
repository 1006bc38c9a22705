use thiserror::Error;
use zkvote_crypto::CryptoError;
use zkvote_groups::GroupError;
use zkvote_identity::IdentityError;
use zkvote_ledger::LedgerError;
use zkvote_prover::ProverError;
use zkvote_salt::SaltError;
use zkvote_session::StoreError;
use zkvote_transactions::TxError;
use zkvote_types::AccountAddress;

use crate::SessionPhase;

/// Every failure a session can surface. Component errors are folded into
/// these variants; the display string is what the snapshot's `error` shows.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no session found; log in first")]
    MissingSession,

    #[error("malformed identity token: {0}")]
    MalformedToken(String),

    #[error("token nonce does not match the ephemeral key (expected {expected}, got {actual})")]
    NonceMismatch { expected: String, actual: String },

    #[error("no id_token found in the callback")]
    MissingToken,

    #[error("wrong body format: {0}")]
    RequestValidation(String),

    #[error("salt unavailable: {0}")]
    SaltUnavailable(String),

    #[error("invalid salt: {0}")]
    InvalidSalt(String),

    #[error("proof unavailable: {0}")]
    ProofUnavailable(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("transaction failed: {0}")]
    Submission(String),

    #[error("ledger error: {0}")]
    Ledger(String),

    #[error("session store error: {0}")]
    Store(String),

    #[error("another operation is in progress ({0:?})")]
    SessionBusy(SessionPhase),

    #[error("session is not ready for actions ({0:?})")]
    NotReady(SessionPhase),

    #[error("this account holds no voting pass")]
    NotEligible,

    #[error("{0} is not an eligible candidate")]
    UnknownCandidate(AccountAddress),

    #[error("no OpenID provider configured")]
    NoProvider,

    #[error("config error: {0}")]
    Config(String),
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::MissingSession => SessionError::MissingSession,
            StoreError::Crypto(e) => e.into(),
            other => SessionError::Store(other.to_string()),
        }
    }
}

impl From<CryptoError> for SessionError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::InvalidSalt(salt) => SessionError::InvalidSalt(salt),
            CryptoError::IssuerTooLong(_) => SessionError::MalformedToken(e.to_string()),
            other => SessionError::Store(other.to_string()),
        }
    }
}

impl From<IdentityError> for SessionError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::MalformedToken(msg) => SessionError::MalformedToken(msg),
            IdentityError::NonceMismatch { expected, actual } => {
                SessionError::NonceMismatch { expected, actual }
            }
            IdentityError::MissingToken => SessionError::MissingToken,
            IdentityError::Derivation(e) => e.into(),
        }
    }
}

impl From<SaltError> for SessionError {
    fn from(e: SaltError) -> Self {
        match e {
            SaltError::InvalidSalt(salt) => SessionError::InvalidSalt(salt),
            SaltError::RequestValidation(msg) => SessionError::RequestValidation(msg),
            SaltError::SaltUnavailable(msg) => SessionError::SaltUnavailable(msg),
            SaltError::Cache(msg) => SessionError::Store(msg),
            other => SessionError::SaltUnavailable(other.to_string()),
        }
    }
}

impl From<ProverError> for SessionError {
    fn from(e: ProverError) -> Self {
        match e {
            ProverError::ProofUnavailable(msg) => SessionError::ProofUnavailable(msg),
            other => SessionError::ProofUnavailable(other.to_string()),
        }
    }
}

impl From<TxError> for SessionError {
    fn from(e: TxError) -> Self {
        match e {
            TxError::Signing(msg) => SessionError::Signing(msg),
            TxError::Submission(msg) => SessionError::Submission(msg),
            TxError::Build(_) => SessionError::Submission(e.to_string()),
            TxError::Ledger(e) => e.into(),
            TxError::Crypto(e) => e.into(),
        }
    }
}

impl From<LedgerError> for SessionError {
    fn from(e: LedgerError) -> Self {
        SessionError::Ledger(e.to_string())
    }
}

impl From<GroupError> for SessionError {
    fn from(e: GroupError) -> Self {
        SessionError::Ledger(e.to_string())
    }
}
