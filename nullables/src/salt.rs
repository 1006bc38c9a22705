//! Nullable salt issuer: scripted answers, recorded calls.

use async_trait::async_trait;
use std::sync::Mutex;
use zkvote_salt::{SaltError, SaltIssuer};

enum Answer {
    Salt(String),
    Unreachable,
    Missing,
}

pub struct NullSaltIssuer {
    answer: Mutex<Answer>,
    /// Tokens received, in call order.
    calls: Mutex<Vec<String>>,
}

impl NullSaltIssuer {
    fn with(answer: Answer) -> Self {
        Self {
            answer: Mutex::new(answer),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always issues `salt`.
    pub fn issuing(salt: &str) -> Self {
        Self::with(Answer::Salt(salt.to_string()))
    }

    /// Always fails as if the service were down.
    pub fn unreachable() -> Self {
        Self::with(Answer::Unreachable)
    }

    /// Answers without a salt.
    pub fn without_salt() -> Self {
        Self::with(Answer::Missing)
    }

    pub fn set_salt(&self, salt: &str) {
        *self.answer.lock().unwrap() = Answer::Salt(salt.to_string());
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SaltIssuer for NullSaltIssuer {
    async fn issue(&self, token_raw: &str) -> Result<String, SaltError> {
        self.calls.lock().unwrap().push(token_raw.to_string());
        match &*self.answer.lock().unwrap() {
            Answer::Salt(salt) => Ok(salt.clone()),
            Answer::Unreachable => Err(SaltError::Unreachable("null issuer is down".into())),
            Answer::Missing => Err(SaltError::MissingSalt),
        }
    }
}
