use std::path::{Path, PathBuf};

use moca_flow::config::FlowConfig;
use moca_storage::client::StoreConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::microphone::MicrophoneSource;

/// Overrides `store.base_url` when set.
pub const API_URL_ENV: &str = "MOCA_API_URL";

type Migration = fn(&mut Map<String, Value>) -> eyre::Result<()>;

/// Schema upgrades, oldest first. Entry `n` lifts a config from version `n`
/// to `n + 1`; the newest supported version is the table length.
const MIGRATIONS: &[Migration] = &[nest_store_and_add_microphone];

fn current_version() -> u32 {
    MIGRATIONS.len() as u32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KioskConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    pub store: StoreConfig,
    #[serde(default)]
    pub flow: FlowConfig,
    /// Added in v1; older configs record without a microphone.
    #[serde(default)]
    pub microphone: MicrophoneSource,
    pub created_at: jiff::Timestamp,
}

impl KioskConfig {
    pub fn new(store: StoreConfig) -> Self {
        Self {
            config_version: current_version(),
            store,
            flow: FlowConfig::default(),
            microphone: MicrophoneSource::default(),
            created_at: jiff::Timestamp::now(),
        }
    }

    /// Replace the store URL with `api_url`, if one was given.
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            tracing::debug!(url = %url, "store URL overridden");
            self.store.base_url = url;
        }
        self
    }
}

/// `<platform config dir>/org.moca.kiosk`.
pub fn default_dir() -> eyre::Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join("org.moca.kiosk"))
        .ok_or_else(|| eyre::eyre!("platform has no config directory"))
}

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join("config.json")
}

pub fn has_config(dir: &Path) -> bool {
    config_path(dir).is_file()
}

/// Read the config in `dir`, upgrading older schemas on the way in.
pub fn load_config(dir: &Path) -> eyre::Result<KioskConfig> {
    let path = config_path(dir);
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| eyre::eyre!("cannot read {}: {e}", path.display()))?;

    let mut value: Value = serde_json::from_str(&raw)?;
    let fields = value
        .as_object_mut()
        .ok_or_else(|| eyre::eyre!("{} does not hold a JSON object", path.display()))?;
    upgrade(fields)?;

    Ok(serde_json::from_value(value)?)
}

/// Load the config if one exists, else a fresh default one.
pub fn load_or_default(dir: &Path) -> eyre::Result<KioskConfig> {
    if has_config(dir) {
        load_config(dir)
    } else {
        Ok(KioskConfig::new(StoreConfig::default()))
    }
}

fn upgrade(fields: &mut Map<String, Value>) -> eyre::Result<()> {
    let found = fields
        .get("config_version")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let newest = current_version();
    let found = u32::try_from(found)
        .ok()
        .filter(|v| *v <= newest)
        .ok_or_else(|| {
            eyre::eyre!(
                "config_version {found} is newer than this build supports ({newest}); update the kiosk"
            )
        })?;

    for (step, migration) in MIGRATIONS.iter().enumerate().skip(found as usize) {
        migration(fields)?;
        let to = step as u32 + 1;
        fields.insert("config_version".into(), Value::from(to));
        tracing::info!(from = step, to, "config migrated");
    }
    Ok(())
}

/// v0 kept the API root at the top level as `api_url` and had no
/// microphone setting.
fn nest_store_and_add_microphone(fields: &mut Map<String, Value>) -> eyre::Result<()> {
    if !fields.contains_key("store") {
        let base_url = fields
            .remove("api_url")
            .unwrap_or_else(|| Value::from(StoreConfig::default().base_url));
        fields.insert("store".into(), json!({ "base_url": base_url }));
    }
    fields
        .entry("microphone")
        .or_insert_with(|| json!({ "type": "disabled" }));
    Ok(())
}

/// Write `config` to `dir`, stamped with the current schema version.
/// Readers never see a half-written file.
pub fn save_config(dir: &Path, config: &KioskConfig) -> eyre::Result<()> {
    std::fs::create_dir_all(dir)?;

    let stamped = KioskConfig {
        config_version: current_version(),
        ..config.clone()
    };
    let staging = dir.join("config.json.partial");
    std::fs::write(&staging, serde_json::to_vec_pretty(&stamped)?)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&staging, std::fs::Permissions::from_mode(0o600))?;
    }

    let path = config_path(dir);
    std::fs::rename(&staging, &path)?;
    tracing::info!(path = %path.display(), "kiosk config written");
    Ok(())
}

pub fn delete_config(dir: &Path) -> eyre::Result<()> {
    let path = config_path(dir);
    match std::fs::remove_file(&path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "kiosk config removed");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
