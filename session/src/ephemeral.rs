//! Ephemeral key manager: creates and reads the login session's keypair.

use std::sync::Arc;
use zkvote_types::Epoch;

use crate::{EphemeralKeyData, SessionRecord, SessionStore, StoreError, UserRecord};

pub struct EphemeralKeyManager {
    store: Arc<dyn SessionStore>,
}

impl EphemeralKeyManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Read the current ephemeral key data. No network access.
    pub fn load(&self) -> Result<EphemeralKeyData, StoreError> {
        self.store
            .load()?
            .map(|record| record.ephemeral.clone())
            .ok_or(StoreError::MissingSession)
    }

    /// The full record, including user data if it has been written.
    pub fn record(&self) -> Result<SessionRecord, StoreError> {
        self.store.load()?.ok_or(StoreError::MissingSession)
    }

    /// Generate a fresh ephemeral keypair valid until
    /// `current_epoch + epoch_window`, and persist it in place of any
    /// previous session.
    pub fn create(
        &self,
        current_epoch: Epoch,
        epoch_window: u64,
    ) -> Result<EphemeralKeyData, StoreError> {
        let kp = zkvote_crypto::generate_keypair();
        let randomness = zkvote_crypto::generate_randomness();
        let max_epoch = current_epoch.saturating_add(epoch_window);
        let nonce = zkvote_crypto::compute_nonce(&kp.public, max_epoch, &randomness)?;

        let ephemeral = EphemeralKeyData::from_keypair(&kp, randomness, max_epoch, nonce);
        self.store.save(&SessionRecord {
            ephemeral: ephemeral.clone(),
            user: None,
        })?;
        tracing::info!(max_epoch, nonce = %ephemeral.nonce, "created ephemeral session key");
        Ok(ephemeral)
    }

    /// Attach the user's subject, salt and token to the current session.
    ///
    /// An issued salt already recorded for the same subject is never
    /// replaced by a placeholder.
    pub fn store_user(&self, user: UserRecord) -> Result<(), StoreError> {
        let mut record = self.record()?;
        if user.placeholder_salt {
            if let Some(held) = &record.user {
                if held.subject == user.subject && !held.placeholder_salt {
                    tracing::warn!(subject = %user.subject, "keeping the recorded salt over a placeholder");
                    return Ok(());
                }
            }
        }
        record.user = Some(user);
        self.store.save(&record)
    }

    /// The issued salt recorded for `subject` in the current session, if any.
    /// Placeholder salts are not returned.
    pub fn recorded_salt(&self, subject: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .store
            .load()?
            .and_then(|record| record.user)
            .filter(|user| user.subject == subject && !user.placeholder_salt)
            .map(|user| user.salt))
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.clear()
    }
}
