//! Client configuration structures and loaders.
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use runtime::HostConfig;
use serde_json::Value;

const SETTING_PREFIX: &str = "LOF_SETTING_";

/// Configuration required to bootstrap a client host.
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    pub host: HostConfig,
    /// Directory for persisted module state. `None` uses the platform data
    /// directory.
    pub data_dir: Option<PathBuf>,
    /// Module activated right after startup.
    pub start_module: Option<String>,
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `LOF_PLAYER_ID` - Local player identifier (default: none)
    /// - `LOF_ROOM_ID` - Room identifier (default: none)
    /// - `LOF_LOCALE` - Display locale (default: en)
    /// - `LOF_FALLBACK_LOCALE` - Locale used for missing texts (default: en)
    /// - `LOF_PERSIST` - Persist module state between runs (default: false)
    /// - `LOF_DATA_DIR` - Directory for saved state (default: platform-specific)
    /// - `LOF_MODULE` - Module to activate at startup (default: none)
    /// - `LOF_MAX_CHAINED` - Queued actions processed per dispatch (default: 16)
    /// - `LOF_SETTING_<NAME>` - Module setting `<name>`; JSON values are parsed,
    ///   anything else is kept as a string
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    /// Same as [`from_env`](Self::from_env), reading from `vars` instead.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: BTreeMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let mut config = Self::default();

        config.host.player_id = read_string(&vars, "LOF_PLAYER_ID");
        config.host.room_id = read_string(&vars, "LOF_ROOM_ID");

        if let Some(locale) = read_string(&vars, "LOF_LOCALE") {
            config.host.module.locale = locale;
        }
        if let Some(locale) = read_string(&vars, "LOF_FALLBACK_LOCALE") {
            config.host.module.fallback_locale = locale;
        }

        if let Some(enable) = read_var::<bool>(&vars, "LOF_PERSIST") {
            config.host.persist_module_state = enable;
        } else if vars.contains_key("LOF_PERSIST") {
            // Also accept just setting the variable without value as "true"
            config.host.persist_module_state = true;
        }

        config.data_dir = read_string(&vars, "LOF_DATA_DIR").map(PathBuf::from);
        config.start_module = read_string(&vars, "LOF_MODULE");

        if let Some(limit) = read_var::<usize>(&vars, "LOF_MAX_CHAINED") {
            config.host.max_chained_dispatches = limit;
        }

        for (key, raw) in &vars {
            if let Some(name) = key.strip_prefix(SETTING_PREFIX)
                && !name.is_empty()
            {
                let value =
                    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()));
                config
                    .host
                    .module
                    .settings
                    .insert(name.to_ascii_lowercase(), value);
            }
        }

        config
    }

    /// Where persisted state lives.
    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(crate::dirs::data_dir)
    }
}

fn read_string(vars: &BTreeMap<String, String>, key: &str) -> Option<String> {
    vars.get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn read_var<T>(vars: &BTreeMap<String, String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    vars.get(key)?.trim().parse().ok()
}
