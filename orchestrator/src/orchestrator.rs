//! The session orchestrator: drives the login flow and the mint and vote
//! actions, and keeps the observable session state.
//!
//! State lives behind a `std::sync::Mutex` that is only held for short,
//! synchronous updates, never across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use zkvote_groups::{VotingConfig, VotingContext, VotingGroupReader};
use zkvote_identity::{IdentityClaims, OAuthProvider};
use zkvote_ledger::{
    FaucetClient, FundingSource, JsonRpcLedgerClient, LedgerClient, NATIVE_COIN_TYPE,
};
use zkvote_prover::{CachingProver, ProofProvider, ProofRequest, ProverClient};
use zkvote_salt::{
    FileSaltCache, MemorySaltCache, SaltApiClient, SaltCache, SaltIssuerClient, SaltProvider,
    SaltResolver, SaltSource, StoreUserRequest, UserRegistry,
};
use zkvote_session::{
    EphemeralKeyData, EphemeralKeyManager, FileSessionStore, SessionStore, UserRecord,
};
use zkvote_transactions::{
    AuthorizationContext, GasConfig, TransactionAuthorizer, TransactionIntent, VoteCall,
};
use zkvote_types::{AccountAddress, NetworkId, Timestamp, TxDigest};

use crate::{MintConfig, SessionConfig, SessionError, SessionPhase, SessionSnapshot};

/// The external collaborators of a session.
pub struct SessionDeps {
    pub store: Arc<dyn SessionStore>,
    pub salt: Arc<dyn SaltProvider>,
    /// Salt service told about each resolved user, when one is configured.
    pub registry: Option<Arc<dyn UserRegistry>>,
    pub prover: Arc<dyn ProofProvider>,
    pub ledger: Arc<dyn LedgerClient>,
    pub faucet: Option<Arc<dyn FundingSource>>,
}

/// The non-collaborator part of [`SessionConfig`].
#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub network: NetworkId,
    pub epoch_window: u64,
    pub gas: GasConfig,
    pub mint: MintConfig,
    pub voting: VotingConfig,
    pub oauth: Option<OAuthProvider>,
}

impl From<&SessionConfig> for SessionSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            network: config.network,
            epoch_window: config.epoch_window,
            gas: config.gas.clone(),
            mint: config.mint.clone(),
            voting: config.voting.clone(),
            oauth: config.oauth.clone(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

/// What a successful load establishes. Immutable for the rest of the session.
struct LoadedSession {
    ephemeral: EphemeralKeyData,
    claims: IdentityClaims,
    salt: String,
}

#[derive(Default)]
struct SessionState {
    snapshot: SessionSnapshot,
    loaded: Option<Arc<LoadedSession>>,
}

/// Clears `in_progress` when an operation ends, including when its future
/// is dropped mid-flight.
struct InFlight<'a> {
    state: &'a Mutex<SessionState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.state).snapshot.in_progress = false;
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SessionOrchestrator {
    keys: EphemeralKeyManager,
    salt: Arc<dyn SaltProvider>,
    registry: Option<Arc<dyn UserRegistry>>,
    prover: Arc<dyn ProofProvider>,
    ledger: Arc<dyn LedgerClient>,
    faucet: Option<Arc<dyn FundingSource>>,
    authorizer: TransactionAuthorizer,
    groups: VotingGroupReader,
    settings: SessionSettings,
    state: Mutex<SessionState>,
}

impl SessionOrchestrator {
    pub fn new(deps: SessionDeps, settings: SessionSettings) -> Self {
        let authorizer = TransactionAuthorizer::new(deps.ledger.clone(), settings.gas.clone());
        let groups = VotingGroupReader::new(deps.ledger.clone(), settings.voting.clone());
        Self {
            keys: EphemeralKeyManager::new(deps.store),
            salt: deps.salt,
            registry: deps.registry,
            prover: deps.prover,
            ledger: deps.ledger,
            faucet: deps.faucet,
            authorizer,
            groups,
            settings,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Wire the networked collaborators described by `config`.
    pub fn from_config(config: &SessionConfig) -> Result<Self, SessionError> {
        let ledger: Arc<dyn LedgerClient> = Arc::new(JsonRpcLedgerClient::with_timeout(
            config.rpc_url(),
            Duration::from_secs(config.ledger_timeout_secs),
        ));

        let (salt, registry): (Arc<dyn SaltProvider>, Option<Arc<dyn UserRegistry>>) =
            match &config.salt_service_url {
                Some(url) => {
                    let client = Arc::new(
                        SaltApiClient::new(url.clone())
                            .with_placeholder_salt(config.salt.placeholder_salt.clone()),
                    );
                    let registry: Arc<dyn UserRegistry> = client.clone();
                    let provider: Arc<dyn SaltProvider> = client;
                    (provider, Some(registry))
                }
                None => {
                    let cache: Arc<dyn SaltCache> = match &config.salt_cache_file {
                        Some(path) => Arc::new(FileSaltCache::open(path.clone())?),
                        None => Arc::new(MemorySaltCache::new()),
                    };
                    let resolver = SaltResolver::new(
                        cache,
                        Arc::new(SaltIssuerClient::new(config.salt_issuer_url.clone())),
                        config.salt.clone(),
                    );
                    let provider: Arc<dyn SaltProvider> = Arc::new(resolver);
                    (provider, None)
                }
            };

        let prover = Arc::new(CachingProver::new(Arc::new(ProverClient::new(
            &config.prover,
        ))));
        let faucet = config
            .faucet_url()
            .map(|url| Arc::new(FaucetClient::new(url)) as Arc<dyn FundingSource>);

        tracing::info!(
            network = config.network.as_str(),
            rpc = %config.rpc_url(),
            faucet = faucet.is_some(),
            "session collaborators configured"
        );

        Ok(Self::new(
            SessionDeps {
                store: Arc::new(FileSessionStore::new(config.session_file.clone())),
                salt,
                registry,
                prover,
                ledger,
                faucet,
            },
            SessionSettings::from(config),
        ))
    }

    /// A copy of the current session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        lock(&self.state).snapshot.clone()
    }

    // ── Login ─────────────────────────────────────────────────────────

    /// Create a fresh ephemeral key and return the provider URL the user
    /// must visit. Replaces any previous session.
    pub async fn start_login(&self) -> Result<String, SessionError> {
        let provider = self
            .settings
            .oauth
            .as_ref()
            .ok_or(SessionError::NoProvider)?;
        self.ensure_idle()?;

        let epoch = self.ledger.current_epoch().await?;
        let ephemeral = self.keys.create(epoch, self.settings.epoch_window)?;
        *lock(&self.state) = SessionState::default();

        Ok(zkvote_identity::authorization_url(provider, &ephemeral.nonce))
    }

    /// Forget the session, including the persisted record.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.keys.clear()?;
        *lock(&self.state) = SessionState::default();
        Ok(())
    }

    /// Run the load flow for an identity token: check it against the
    /// ephemeral key, resolve the salt, derive the account, fund it if
    /// empty and read the voting group.
    pub async fn load(&self, token_raw: &str) -> Result<SessionSnapshot, SessionError> {
        let _flight = {
            let mut state = lock(&self.state);
            if state.snapshot.in_progress {
                return Err(SessionError::SessionBusy(state.snapshot.phase));
            }
            *state = SessionState::default();
            state.snapshot.in_progress = true;
            state.snapshot.phase = SessionPhase::DecodingToken;
            InFlight { state: &self.state }
        };

        match self.run_load(token_raw).await {
            Ok(loaded) => {
                let mut state = lock(&self.state);
                state.loaded = Some(loaded);
                state.snapshot.phase = SessionPhase::Ready;
                state.snapshot.in_progress = false;
                Ok(state.snapshot.clone())
            }
            Err(e) => {
                tracing::warn!(error = %e, "session load failed");
                self.fail(&e);
                Err(e)
            }
        }
    }

    async fn run_load(&self, token_raw: &str) -> Result<Arc<LoadedSession>, SessionError> {
        let ephemeral = self.keys.load()?;
        let claims = zkvote_identity::decode(token_raw)?;
        zkvote_identity::verify_nonce(&claims, &ephemeral.expected_nonce()?)?;
        if zkvote_identity::is_expired(&claims, Timestamp::now()) {
            tracing::warn!(exp = claims.exp, "identity token has expired");
        }

        self.set_phase(SessionPhase::ResolvingSalt);
        let (salt, placeholder_salt) = match self.keys.recorded_salt(&claims.sub)? {
            Some(salt) => {
                tracing::debug!(subject = %claims.sub, "reusing the recorded salt");
                (salt, false)
            }
            None => {
                let (resolved, source) =
                    self.salt.salt_with_source(&claims.sub, token_raw).await?;
                (resolved.salt, source == SaltSource::Placeholder)
            }
        };
        self.keys.store_user(UserRecord {
            subject: claims.sub.clone(),
            salt: salt.clone(),
            jwt: Some(token_raw.to_string()),
            placeholder_salt,
        })?;
        if !placeholder_salt {
            self.register_user(&claims, &salt, &ephemeral).await;
        }

        self.set_phase(SessionPhase::DerivingAddress);
        let address =
            zkvote_crypto::derive_address_for_claims(&claims.iss, &claims.aud, &claims.sub, &salt)?;
        tracing::info!(subject = %claims.sub, %address, "account derived");
        self.update(|s| {
            s.subject = Some(claims.sub.clone());
            s.address = Some(address);
        });

        self.set_phase(SessionPhase::CheckingBalance);
        let mut balance = self.balance_of(&address).await?;
        if balance == 0 {
            if let Some(faucet) = &self.faucet {
                self.set_phase(SessionPhase::FundingIfNeeded);
                match faucet.request_funds(&address).await {
                    Ok(()) => balance = self.balance_of(&address).await?,
                    Err(e) => {
                        tracing::warn!(%address, error = %e, "faucet funding failed");
                        self.update(|s| s.notice = Some(e.to_string()));
                    }
                }
            }
        }
        self.update(|s| s.balance_mist = Some(balance));

        self.set_phase(SessionPhase::CheckingVotingEligibility);
        let voting = match self.groups.voting_context(&address).await {
            Ok(voting) => voting,
            Err(e) => {
                tracing::warn!(%address, error = %e, "could not read the voting group");
                self.update(|s| s.notice = Some(e.to_string()));
                VotingContext::default()
            }
        };
        self.update(|s| s.voting = voting);

        Ok(Arc::new(LoadedSession {
            ephemeral,
            claims,
            salt,
        }))
    }

    /// Tell the salt service about the resolved user. Failures are notices.
    async fn register_user(
        &self,
        claims: &IdentityClaims,
        salt: &str,
        ephemeral: &EphemeralKeyData,
    ) {
        let Some(registry) = &self.registry else {
            return;
        };
        let request = StoreUserRequest {
            subject: claims.sub.clone(),
            salt: salt.to_string(),
            jwt: claims.jwt_raw.clone(),
            ephemeral_public_key: Some(ephemeral.public_key.clone()),
        };
        if let Err(e) = registry.store_user(&request).await {
            tracing::warn!(subject = %claims.sub, error = %e, "could not store the user record");
            self.update(|s| s.notice = Some(e.to_string()));
        }
    }

    async fn balance_of(&self, address: &AccountAddress) -> Result<u128, SessionError> {
        let coins = self.ledger.get_coins(address, NATIVE_COIN_TYPE).await?;
        Ok(zkvote_ledger::total_balance(&coins)?)
    }

    // ── Actions ───────────────────────────────────────────────────────

    /// Submit the demo mint call.
    pub async fn mint(&self) -> Result<TxDigest, SessionError> {
        let call = self.settings.mint.call();
        self.run_action(|_| Ok(TransactionIntent::Mint(call))).await
    }

    /// Vote for `candidate`, who must be one of the eligible members.
    pub async fn vote(&self, candidate: AccountAddress) -> Result<TxDigest, SessionError> {
        let voting = &self.settings.voting;
        self.run_action(|snapshot| {
            let voting_pass = snapshot
                .voting
                .voting_pass_id
                .ok_or(SessionError::NotEligible)?;
            if !snapshot.voting.eligible_member_addresses.contains(&candidate) {
                return Err(SessionError::UnknownCandidate(candidate));
            }
            Ok(TransactionIntent::Vote(VoteCall {
                package: voting.package,
                group: voting.group,
                voting_pass,
                candidate,
            }))
        })
        .await
    }

    async fn run_action(
        &self,
        intent_for: impl FnOnce(&SessionSnapshot) -> Result<TransactionIntent, SessionError>,
    ) -> Result<TxDigest, SessionError> {
        let (_flight, loaded, intent) = {
            let mut state = lock(&self.state);
            let phase = state.snapshot.phase;
            if state.snapshot.in_progress {
                return Err(SessionError::SessionBusy(phase));
            }
            let loaded = match &state.loaded {
                Some(loaded) if phase.accepts_actions() => loaded.clone(),
                _ => return Err(SessionError::NotReady(phase)),
            };
            let intent = intent_for(&state.snapshot)?;
            state.snapshot.in_progress = true;
            state.snapshot.phase = SessionPhase::RequestingProof;
            state.snapshot.error = None;
            state.snapshot.last_digest = None;
            state.snapshot.explorer_url = None;
            (InFlight { state: &self.state }, loaded, intent)
        };

        match self.authorize(&loaded, &intent).await {
            Ok(digest) => {
                let mut state = lock(&self.state);
                let snapshot = &mut state.snapshot;
                if let TransactionIntent::Vote(call) = &intent {
                    snapshot.voting.record_vote(call.candidate);
                }
                snapshot.explorer_url = Some(self.settings.network.explorer_url(digest.as_str()));
                snapshot.last_digest = Some(digest.clone());
                snapshot.phase = SessionPhase::Submitted;
                snapshot.in_progress = false;
                Ok(digest)
            }
            Err(e) => {
                tracing::warn!(action = intent.label(), error = %e, "action failed");
                self.fail(&e);
                Err(e)
            }
        }
    }

    async fn authorize(
        &self,
        loaded: &LoadedSession,
        intent: &TransactionIntent,
    ) -> Result<TxDigest, SessionError> {
        let ephemeral = &loaded.ephemeral;
        let request = ProofRequest::new(
            ephemeral.extended_public_key()?,
            loaded.claims.jwt_raw.clone(),
            ephemeral.randomness.clone(),
            ephemeral.max_epoch,
            loaded.salt.clone(),
        );
        let proof = self.prover.request_proof(&request).await?;

        self.set_phase(SessionPhase::Authorizing);
        let keypair = ephemeral
            .keypair()
            .map_err(|e| SessionError::Signing(e.to_string()))?;
        let ctx = AuthorizationContext {
            proof: &proof,
            keypair: &keypair,
            max_epoch: ephemeral.max_epoch,
            claims: &loaded.claims,
            salt: &loaded.salt,
        };
        Ok(self.authorizer.authorize_and_submit(&ctx, intent).await?)
    }

    // ── State helpers ─────────────────────────────────────────────────

    fn ensure_idle(&self) -> Result<(), SessionError> {
        let state = lock(&self.state);
        if state.snapshot.in_progress {
            return Err(SessionError::SessionBusy(state.snapshot.phase));
        }
        Ok(())
    }

    fn set_phase(&self, phase: SessionPhase) {
        tracing::debug!(?phase, "session phase");
        self.update(|s| s.phase = phase);
    }

    fn update(&self, f: impl FnOnce(&mut SessionSnapshot)) {
        f(&mut lock(&self.state).snapshot);
    }

    fn fail(&self, e: &SessionError) {
        self.update(|s| {
            s.phase = SessionPhase::Failed;
            s.error = Some(e.to_string());
            s.in_progress = false;
        });
    }
}
