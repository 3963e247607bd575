//! API credential resolution.
//!
//! A Gemini key may come from three places, checked in order:
//!
//! 1. an explicit value (CLI flag or config file),
//! 2. the `GEMINI_API_KEY` process environment variable,
//! 3. a `GEMINI_API_KEY` injected at build time.
//!
//! Blank values count as absent. Having no key at all is a valid state.

use std::fmt;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Key baked in at compile time, if the build environment provided one.
const BUILD_TIME_KEY: Option<&str> = option_env!("GEMINI_API_KEY");

/// Where a resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Explicit,
    Environment,
    BuildTime,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Explicit => "explicit",
            Self::Environment => "environment",
            Self::BuildTime => "build-time",
        })
    }
}

/// A Gemini API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    secret: String,
    source: CredentialSource,
}

impl ApiKey {
    pub fn new(secret: impl Into<String>, source: CredentialSource) -> Self {
        Self {
            secret: secret.into(),
            source,
        }
    }

    pub fn expose(&self) -> &str {
        &self.secret
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("secret", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Resolve a key from the real process environment and build.
pub fn resolve_api_key(explicit: Option<&str>) -> Option<ApiKey> {
    resolve_api_key_with(explicit, |name| std::env::var(name).ok(), BUILD_TIME_KEY)
}

/// Resolve a key with injectable sources (used by tests).
pub fn resolve_api_key_with(
    explicit: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
    build_time: Option<&str>,
) -> Option<ApiKey> {
    if let Some(key) = explicit.and_then(non_blank) {
        return Some(ApiKey::new(key, CredentialSource::Explicit));
    }
    if let Some(key) = env(API_KEY_ENV).as_deref().and_then(non_blank) {
        return Some(ApiKey::new(key, CredentialSource::Environment));
    }
    build_time
        .and_then(non_blank)
        .map(|key| ApiKey::new(key, CredentialSource::BuildTime))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn explicit_wins_over_everything() {
        let key = resolve_api_key_with(
            Some("cli-key"),
            |_| Some("env-key".into()),
            Some("baked-key"),
        )
        .unwrap();
        assert_eq!(key.expose(), "cli-key");
        assert_eq!(key.source(), CredentialSource::Explicit);
    }

    #[test]
    fn environment_beats_build_time() {
        let key = resolve_api_key_with(None, |_| Some("env-key".into()), Some("baked")).unwrap();
        assert_eq!(key.expose(), "env-key");
        assert_eq!(key.source(), CredentialSource::Environment);
    }

    #[test]
    fn build_time_is_last_resort() {
        let key = resolve_api_key_with(None, no_env, Some("baked")).unwrap();
        assert_eq!(key.source(), CredentialSource::BuildTime);
    }

    #[test]
    fn blank_values_count_as_absent() {
        assert!(resolve_api_key_with(Some("  "), |_| Some("".into()), Some("\t")).is_none());
        assert!(resolve_api_key_with(None, no_env, None).is_none());
    }

    #[test]
    fn env_lookup_uses_gemini_variable_name() {
        let key = resolve_api_key_with(
            None,
            |name| (name == "GEMINI_API_KEY").then(|| "from-env".to_string()),
            None,
        );
        assert_eq!(key.unwrap().expose(), "from-env");
    }

    #[test]
    fn debug_redacts_secret() {
        let key = ApiKey::new("super-secret", CredentialSource::Explicit);
        let shown = format!("{key:?}");
        assert!(!shown.contains("super-secret"));
        assert!(shown.contains("redacted"));
    }
}
