//! Salt resolution: cache, then issuer, then the fallback policy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use zkvote_utils::RetryPolicy;

use crate::{SaltCache, SaltError, SaltIssuer};

/// Placeholder salt (`0xcafecafe`) used when the issuer cannot answer and
/// availability is preferred.
pub const PLACEHOLDER_SALT: &str = "3405695742";

/// What to do when the issuer fails or returns no salt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaltFallback {
    /// Answer with the placeholder salt. The account derived from it is not
    /// the user's real account.
    #[default]
    AvailabilityOverConsistency,
    /// Fail the lookup.
    ConsistencyOverAvailability,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaltResolverConfig {
    #[serde(default)]
    pub fallback: SaltFallback,
    #[serde(default = "default_placeholder_salt")]
    pub placeholder_salt: String,
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_placeholder_salt() -> String {
    PLACEHOLDER_SALT.to_string()
}

impl Default for SaltResolverConfig {
    fn default() -> Self {
        Self {
            fallback: SaltFallback::default(),
            placeholder_salt: default_placeholder_salt(),
            retry: RetryPolicy::default(),
        }
    }
}

/// A subject's salt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSalt {
    pub subject: String,
    pub salt: String,
}

/// Where a resolved salt came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaltSource {
    Cache,
    Issuer,
    Placeholder,
}

/// Anything that can produce the salt for a subject.
#[async_trait]
pub trait SaltProvider: Send + Sync {
    /// Resolve the salt and report where it came from. A
    /// [`SaltSource::Placeholder`] salt is not the subject's real salt and
    /// must not be persisted as such.
    async fn salt_with_source(
        &self,
        subject: &str,
        token_raw: &str,
    ) -> Result<(UserSalt, SaltSource), SaltError>;

    async fn salt_for(&self, subject: &str, token_raw: &str) -> Result<UserSalt, SaltError> {
        self.salt_with_source(subject, token_raw)
            .await
            .map(|(salt, _)| salt)
    }
}

pub struct SaltResolver {
    cache: Arc<dyn SaltCache>,
    issuer: Arc<dyn SaltIssuer>,
    config: SaltResolverConfig,
}

impl SaltResolver {
    pub fn new(
        cache: Arc<dyn SaltCache>,
        issuer: Arc<dyn SaltIssuer>,
        config: SaltResolverConfig,
    ) -> Self {
        Self {
            cache,
            issuer,
            config,
        }
    }

    pub fn config(&self) -> &SaltResolverConfig {
        &self.config
    }

    /// Resolve the salt for `subject`.
    pub async fn resolve(&self, subject: &str, token_raw: &str) -> Result<UserSalt, SaltError> {
        self.resolve_with_source(subject, token_raw)
            .await
            .map(|(salt, _)| salt)
    }

    /// Resolve the salt for `subject` and report where it came from.
    ///
    /// A cached salt is returned without contacting the issuer. An issued
    /// salt is validated and cached; a malformed one counts as an issuer
    /// failure. The placeholder is never cached.
    pub async fn resolve_with_source(
        &self,
        subject: &str,
        token_raw: &str,
    ) -> Result<(UserSalt, SaltSource), SaltError> {
        if let Some(salt) = self.cache.get(subject)? {
            tracing::debug!(subject, "salt cache hit");
            return Ok((user_salt(subject, salt), SaltSource::Cache));
        }

        let issuer = &self.issuer;
        let issued = self
            .config
            .retry
            .run("salt_issue", SaltError::is_retryable, move || {
                issuer.issue(token_raw)
            })
            .await;

        match issued {
            Ok(salt) if zkvote_crypto::parse_decimal(&salt).is_none() => {
                self.fallback(subject, SaltError::InvalidSalt(salt))
            }
            Ok(salt) => {
                let held = self.cache.put(subject, &salt)?;
                if held != salt {
                    // Another writer cached a salt for this subject first.
                    tracing::debug!(subject, "keeping previously cached salt");
                    return Ok((user_salt(subject, held), SaltSource::Cache));
                }
                tracing::info!(subject, "salt issued and cached");
                Ok((user_salt(subject, salt), SaltSource::Issuer))
            }
            Err(e) => self.fallback(subject, e),
        }
    }

    fn fallback(
        &self,
        subject: &str,
        cause: SaltError,
    ) -> Result<(UserSalt, SaltSource), SaltError> {
        match self.config.fallback {
            SaltFallback::AvailabilityOverConsistency => {
                tracing::warn!(
                    subject,
                    error = %cause,
                    "salt issuer failed, answering with placeholder salt; \
                     the derived address is not the user's real account"
                );
                Ok((
                    user_salt(subject, self.config.placeholder_salt.clone()),
                    SaltSource::Placeholder,
                ))
            }
            SaltFallback::ConsistencyOverAvailability => {
                tracing::warn!(subject, error = %cause, "salt issuer failed");
                Err(SaltError::SaltUnavailable(cause.to_string()))
            }
        }
    }
}

fn user_salt(subject: &str, salt: String) -> UserSalt {
    UserSalt {
        subject: subject.to_string(),
        salt,
    }
}

#[async_trait]
impl SaltProvider for SaltResolver {
    async fn salt_with_source(
        &self,
        subject: &str,
        token_raw: &str,
    ) -> Result<(UserSalt, SaltSource), SaltError> {
        self.resolve_with_source(subject, token_raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySaltCache;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Issuer answering from a fixed script, counting calls.
    struct ScriptedIssuer {
        answer: Result<&'static str, &'static str>,
        calls: AtomicU32,
    }

    impl ScriptedIssuer {
        fn ok(salt: &'static str) -> Arc<Self> {
            Arc::new(Self {
                answer: Ok(salt),
                calls: AtomicU32::new(0),
            })
        }

        fn down() -> Arc<Self> {
            Arc::new(Self {
                answer: Err("connection refused"),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SaltIssuer for ScriptedIssuer {
        async fn issue(&self, _token_raw: &str) -> Result<String, SaltError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .map(str::to_string)
                .map_err(|e| SaltError::Unreachable(e.to_string()))
        }
    }

    fn fast_config(fallback: SaltFallback) -> SaltResolverConfig {
        SaltResolverConfig {
            fallback,
            retry: RetryPolicy {
                max_attempts: 2,
                initial_interval_ms: 1,
                max_interval_ms: 1,
            },
            ..SaltResolverConfig::default()
        }
    }

    #[tokio::test]
    async fn cache_hit_skips_issuer() {
        let cache = Arc::new(MemorySaltCache::new());
        cache.put("abc", "42").unwrap();
        let issuer = ScriptedIssuer::ok("999");
        let resolver = SaltResolver::new(
            cache,
            issuer.clone(),
            fast_config(SaltFallback::default()),
        );

        let (salt, source) = resolver.resolve_with_source("abc", "t").await.unwrap();
        assert_eq!(salt.salt, "42");
        assert_eq!(source, SaltSource::Cache);
        assert_eq!(issuer.calls(), 0);
    }

    #[tokio::test]
    async fn issued_salt_is_cached() {
        let cache = Arc::new(MemorySaltCache::new());
        let issuer = ScriptedIssuer::ok("42");
        let resolver = SaltResolver::new(
            cache.clone(),
            issuer.clone(),
            fast_config(SaltFallback::default()),
        );

        let (first, source) = resolver.resolve_with_source("abc", "t").await.unwrap();
        assert_eq!(source, SaltSource::Issuer);
        assert_eq!(first.salt, "42");
        assert_eq!(cache.get("abc").unwrap().as_deref(), Some("42"));

        let (second, source) = resolver.resolve_with_source("abc", "t").await.unwrap();
        assert_eq!(source, SaltSource::Cache);
        assert_eq!(second, first);
        assert_eq!(issuer.calls(), 1);
    }

    #[tokio::test]
    async fn issuer_failure_falls_back_to_placeholder() {
        let cache = Arc::new(MemorySaltCache::new());
        let issuer = ScriptedIssuer::down();
        let resolver = SaltResolver::new(
            cache.clone(),
            issuer.clone(),
            fast_config(SaltFallback::AvailabilityOverConsistency),
        );

        let (salt, source) = resolver.resolve_with_source("abc", "t").await.unwrap();
        assert_eq!(salt.salt, PLACEHOLDER_SALT);
        assert_eq!(source, SaltSource::Placeholder);
        assert!(cache.is_empty());
        // Retried up to the policy's attempt budget.
        assert_eq!(issuer.calls(), 2);
    }

    #[tokio::test]
    async fn consistency_policy_fails_instead() {
        let resolver = SaltResolver::new(
            Arc::new(MemorySaltCache::new()),
            ScriptedIssuer::down(),
            fast_config(SaltFallback::ConsistencyOverAvailability),
        );
        assert!(matches!(
            resolver.resolve("abc", "t").await,
            Err(SaltError::SaltUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn non_decimal_issued_salt_takes_the_fallback() {
        let cache = Arc::new(MemorySaltCache::new());
        let resolver = SaltResolver::new(
            cache.clone(),
            ScriptedIssuer::ok("0xcafe"),
            fast_config(SaltFallback::AvailabilityOverConsistency),
        );
        let (salt, source) = resolver.resolve_with_source("abc", "t").await.unwrap();
        assert_eq!(salt.salt, PLACEHOLDER_SALT);
        assert_eq!(source, SaltSource::Placeholder);
        assert!(cache.is_empty());

        let strict = SaltResolver::new(
            cache.clone(),
            ScriptedIssuer::ok("0xcafe"),
            fast_config(SaltFallback::ConsistencyOverAvailability),
        );
        match strict.resolve("abc", "t").await {
            Err(SaltError::SaltUnavailable(reason)) => assert!(reason.contains("0xcafe")),
            other => panic!("expected SaltUnavailable, got {other:?}"),
        }
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn provider_reports_source() {
        let resolver = SaltResolver::new(
            Arc::new(MemorySaltCache::new()),
            ScriptedIssuer::ok("42"),
            fast_config(SaltFallback::default()),
        );
        let provider: &dyn SaltProvider = &resolver;
        let (_, first) = provider.salt_with_source("abc", "t").await.unwrap();
        let (salt, second) = provider.salt_with_source("abc", "t").await.unwrap();
        assert_eq!(first, SaltSource::Issuer);
        assert_eq!(second, SaltSource::Cache);
        assert_eq!(provider.salt_for("abc", "t").await.unwrap(), salt);
    }

    #[test]
    fn config_defaults_from_toml() {
        let config: SaltResolverConfig = toml::from_str("").unwrap();
        assert_eq!(config, SaltResolverConfig::default());
        assert_eq!(config.placeholder_salt, "3405695742");

        let strict: SaltResolverConfig =
            toml::from_str("fallback = \"consistency_over_availability\"").unwrap();
        assert_eq!(strict.fallback, SaltFallback::ConsistencyOverAvailability);
    }
}
