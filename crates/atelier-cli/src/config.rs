//! Configuration file management for atelier.
//!
//! Provides a TOML-based config file at `~/.config/atelier/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use atelier_core::model::{
    HealthGoal, Persona, ProteinFocus, ReminderPreference, UserPreferences,
};
use atelier_core::synthesis::gemini::{BASE_URL_ENV, MODEL_ENV};
use atelier_core::synthesis::{API_KEY_ENV, GeminiConfig};

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub gemini: GeminiSection,
    #[serde(default)]
    pub preferences: PreferencesSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GeminiSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Stored preference overrides. Enum fields are kept as text and parsed
/// with the same rules as the CLI flags.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PreferencesSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dislikes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_focus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kitchen_tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooking_window: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_goal: Option<String>,
}

fn parse_field<T>(value: &Option<String>, field: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .as_deref()
        .map(|v| v.parse::<T>())
        .transpose()
        .with_context(|| format!("invalid preferences.{field} in config file"))
}

impl PreferencesSection {
    /// Overlay these settings onto `prefs`.
    pub fn apply(&self, prefs: &mut UserPreferences) -> Result<()> {
        if let Some(p) = parse_field::<Persona>(&self.persona, "persona")? {
            prefs.persona = p;
        }
        if let Some(d) = &self.diet {
            prefs.diet = d.clone();
        }
        if let Some(a) = &self.allergies {
            prefs.allergies = a.clone();
        }
        if let Some(d) = &self.dislikes {
            prefs.dislikes = d.clone();
        }
        if let Some(p) = parse_field::<ProteinFocus>(&self.protein_focus, "protein_focus")? {
            prefs.protein_focus = p;
        }
        if let Some(b) = self.budget_limit {
            prefs.budget_limit = b;
        }
        if let Some(t) = self.prep_time_limit {
            prefs.prep_time_limit = t;
        }
        if let Some(k) = &self.kitchen_tools {
            prefs.kitchen_tools = k.clone();
        }
        if let Some(w) = &self.cooking_window {
            prefs.cooking_window = w.clone();
        }
        if let Some(r) =
            parse_field::<ReminderPreference>(&self.reminder_preference, "reminder_preference")?
        {
            prefs.reminder_preference = r;
        }
        if let Some(g) = parse_field::<HealthGoal>(&self.health_goal, "health_goal")? {
            prefs.health_goal = Some(g);
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the atelier config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/atelier` or `~/.config/atelier`,
/// including on macOS.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("atelier");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("atelier")
}

/// Return the path to the atelier config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Load the config file if present. A file that exists but does not parse
/// is still an error.
pub fn load_config_if_present() -> Result<Option<ConfigFile>> {
    if config_path().exists() {
        load_config().map(Some)
    } else {
        Ok(None)
    }
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    // Owner read/write only: the file may hold an API key.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

fn env_non_blank(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct AtelierConfig {
    pub gemini: GeminiConfig,
    /// Key to hand to the core resolver as its explicit value. `None` lets
    /// the core fall through to `GEMINI_API_KEY` and the build-time key.
    pub explicit_api_key: Option<String>,
    pub preferences: UserPreferences,
}

impl AtelierConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - API key: `cli_api_key` > `GEMINI_API_KEY` > `gemini.api_key` > build-time key
    /// - Model: `cli_model` > `ATELIER_GEMINI_MODEL` > `gemini.model` > default
    /// - Base URL: `ATELIER_GEMINI_BASE_URL` > `gemini.base_url` > default
    /// - Preferences: defaults overlaid with `[preferences]`
    pub fn resolve(cli_api_key: Option<&str>, cli_model: Option<&str>) -> Result<Self> {
        let file_config = load_config_if_present()?.unwrap_or_default();

        let explicit_api_key = match cli_api_key {
            Some(k) => Some(k.to_string()),
            None if env_non_blank(API_KEY_ENV).is_some() => None,
            None => file_config.gemini.api_key.clone(),
        };

        let mut gemini = GeminiConfig::default();
        if let Some(model) = cli_model
            .map(String::from)
            .or_else(|| env_non_blank(MODEL_ENV))
            .or_else(|| file_config.gemini.model.clone())
        {
            gemini.model = model;
        }
        if let Some(url) =
            env_non_blank(BASE_URL_ENV).or_else(|| file_config.gemini.base_url.clone())
        {
            gemini.base_url = url;
        }

        let mut preferences = UserPreferences::default();
        file_config.preferences.apply(&mut preferences)?;

        Ok(Self {
            gemini,
            explicit_api_key,
            preferences,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::synthesis::DEFAULT_MODEL;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    /// Point XDG_CONFIG_HOME at a temp dir and clear the Gemini env vars.
    fn isolated() -> tempfile::TempDir {
        let tmp = tempfile::TempDir::new().unwrap();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };
        unsafe { std::env::remove_var(API_KEY_ENV) };
        unsafe { std::env::remove_var(MODEL_ENV) };
        unsafe { std::env::remove_var(BASE_URL_ENV) };
        tmp
    }

    fn write_config(contents: &str) {
        std::fs::create_dir_all(config_dir()).unwrap();
        std::fs::write(config_path(), contents).unwrap();
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let _lock = lock_env();
        let _tmp = isolated();

        let original = ConfigFile {
            gemini: GeminiSection {
                api_key: Some("file-key".into()),
                model: Some("gemini-flash".into()),
                base_url: None,
            },
            preferences: PreferencesSection {
                persona: Some("STUDENT".into()),
                budget_limit: Some(1500.0),
                ..PreferencesSection::default()
            },
        };
        save_config(&original).unwrap();

        let loaded = load_config().unwrap();
        assert_eq!(loaded.gemini.api_key.as_deref(), Some("file-key"));
        assert_eq!(loaded.gemini.model.as_deref(), Some("gemini-flash"));
        assert!(loaded.gemini.base_url.is_none());
        assert_eq!(loaded.preferences.persona.as_deref(), Some("STUDENT"));
        assert_eq!(loaded.preferences.budget_limit, Some(1500.0));
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let _lock = lock_env();
        let _tmp = isolated();

        save_config(&ConfigFile::default()).unwrap();
        let meta = std::fs::metadata(config_path()).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn resolve_defaults_when_nothing_set() {
        let _lock = lock_env();
        let _tmp = isolated();

        let config = AtelierConfig::resolve(None, None).unwrap();
        assert_eq!(config.gemini.model, DEFAULT_MODEL);
        assert!(config.explicit_api_key.is_none());
        assert_eq!(config.preferences, UserPreferences::default());
    }

    #[test]
    fn resolve_with_cli_flags_overrides_all() {
        let _lock = lock_env();
        let _tmp = isolated();
        write_config("[gemini]\napi_key = \"file-key\"\nmodel = \"file-model\"\n");
        unsafe { std::env::set_var(API_KEY_ENV, "env-key") };
        unsafe { std::env::set_var(MODEL_ENV, "env-model") };

        let config = AtelierConfig::resolve(Some("cli-key"), Some("cli-model")).unwrap();
        assert_eq!(config.explicit_api_key.as_deref(), Some("cli-key"));
        assert_eq!(config.gemini.model, "cli-model");

        unsafe { std::env::remove_var(API_KEY_ENV) };
        unsafe { std::env::remove_var(MODEL_ENV) };
    }

    #[test]
    fn resolve_with_env_var_overrides_config_file() {
        let _lock = lock_env();
        let _tmp = isolated();
        write_config(
            "[gemini]\napi_key = \"file-key\"\nmodel = \"file-model\"\nbase_url = \"http://file\"\n",
        );
        unsafe { std::env::set_var(API_KEY_ENV, "env-key") };
        unsafe { std::env::set_var(BASE_URL_ENV, "http://env") };

        let config = AtelierConfig::resolve(None, None).unwrap();
        // Left to the core resolver, which reads the env var itself.
        assert!(config.explicit_api_key.is_none());
        assert_eq!(config.gemini.model, "file-model");
        assert_eq!(config.gemini.base_url, "http://env");

        unsafe { std::env::remove_var(API_KEY_ENV) };
        unsafe { std::env::remove_var(BASE_URL_ENV) };
    }

    #[test]
    fn resolve_uses_config_file_key_when_env_unset() {
        let _lock = lock_env();
        let _tmp = isolated();
        write_config("[gemini]\napi_key = \"file-key\"\n");

        let config = AtelierConfig::resolve(None, None).unwrap();
        assert_eq!(config.explicit_api_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn preferences_section_overlays_defaults() {
        let _lock = lock_env();
        let _tmp = isolated();
        write_config(
            "[preferences]\npersona = \"gym-enthusiast\"\ndiet = \"Vegetarian\"\nbudget_limit = 2500\nhealth_goal = \"weight loss\"\n",
        );

        let prefs = AtelierConfig::resolve(None, None).unwrap().preferences;
        assert_eq!(prefs.persona, Persona::GymEnthusiast);
        assert_eq!(prefs.diet, "Vegetarian");
        assert_eq!(prefs.budget_limit, 2500.0);
        assert_eq!(prefs.health_goal, Some(HealthGoal::WeightLoss));
        assert_eq!(prefs.prep_time_limit, 25);
    }

    #[test]
    fn bad_preference_value_is_an_error() {
        let _lock = lock_env();
        let _tmp = isolated();
        write_config("[preferences]\npersona = \"astronaut\"\n");

        let err = AtelierConfig::resolve(None, None).unwrap_err();
        assert!(format!("{err:#}").contains("preferences.persona"), "{err:#}");
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("atelier/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
