//! Data model shared by every store component.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Version written into fresh store indexes.
pub const STORE_VERSION: &str = "1.0.0";

/// Default age, in days, after which backups are pruned.
pub const DEFAULT_BACKUP_RETENTION_DAYS: u32 = 30;

/// A profile's configuration document.
pub type ConfigObject = Map<String, Value>;

/// Current UTC time truncated to millisecond precision.
pub fn now_timestamp() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    let millis = now.nanosecond() / 1_000_000 * 1_000_000;
    now.replace_nanosecond(millis).unwrap_or(now)
}

/// A named, storable configuration document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    /// Snapshot taken when the profile entered the index. The standalone file
    /// under `configs/` may have been edited since and is authoritative for
    /// show/apply; this copy is only what `list` reports.
    #[serde(default)]
    pub config: ConfigObject,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Profile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, config: ConfigObject) -> Self {
        let now = now_timestamp();
        Self {
            id: id.into(),
            name: name.into(),
            config,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The global scope's profile index (`index.json`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreIndex {
    pub store_version: String,
    pub active_profile_id: Option<String>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Default for StoreIndex {
    fn default() -> Self {
        Self {
            store_version: STORE_VERSION.to_string(),
            active_profile_id: None,
            profiles: Vec::new(),
        }
    }
}

impl StoreIndex {
    pub fn find(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn active_profile(&self) -> Option<&Profile> {
        self.active_profile_id.as_deref().and_then(|id| self.find(id))
    }

    /// Inserts `profile`, or replaces the entry with the same id while keeping
    /// its original `created_at`.
    pub fn upsert_profile(&mut self, mut profile: Profile) {
        match self.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => {
                profile.created_at = existing.created_at;
                profile.updated_at = now_timestamp();
                *existing = profile;
            }
            None => self.profiles.push(profile),
        }
    }

    /// Points the active pointer at `id`. Returns false, leaving the index
    /// untouched, when no profile has that id.
    pub fn set_active(&mut self, id: Option<&str>) -> bool {
        match id {
            Some(id) if !self.contains(id) => false,
            Some(id) => {
                self.active_profile_id = Some(id.to_string());
                true
            }
            None => {
                self.active_profile_id = None;
                true
            }
        }
    }
}

/// Which of the two mutually exclusive on-disk schemas is in effect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfigType {
    /// One file per profile plus an index or run-control pointer.
    #[default]
    Omo,
    /// A single file holding named presets and an active preset field.
    #[serde(alias = "omos")]
    Slim,
}

impl ConfigType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigType::Omo => "omo",
            ConfigType::Slim => "slim",
        }
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown config type or scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKindError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} '{}': expected {}",
            self.kind, self.value, self.expected
        )
    }
}

impl std::error::Error for ParseKindError {}

impl FromStr for ConfigType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("omo") {
            Ok(ConfigType::Omo)
        } else if s.eq_ignore_ascii_case("slim") || s.eq_ignore_ascii_case("omos") {
            Ok(ConfigType::Slim)
        } else {
            Err(ParseKindError {
                kind: "config type",
                value: s.to_string(),
                expected: "'omo' or 'slim'",
            })
        }
    }
}

/// Where a profile lives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    User,
    Project,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::Project => "project",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = ParseKindError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("user") || s.eq_ignore_ascii_case("global") {
            Ok(Scope::User)
        } else if s.eq_ignore_ascii_case("project") {
            Ok(Scope::Project)
        } else {
            Err(ParseKindError {
                kind: "scope",
                value: s.to_string(),
                expected: "'user' or 'project'",
            })
        }
    }
}

/// Per-project run-control file (`.opencode/.omorc`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRc {
    #[serde(default)]
    pub active_profile_id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub config_type: Option<ConfigType>,
}

/// User-wide preferences (`settings.json`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    pub active_type: ConfigType,
    pub backup_retention_days: u32,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            active_type: ConfigType::Omo,
            backup_retention_days: DEFAULT_BACKUP_RETENTION_DAYS,
        }
    }
}

/// Where a cached asset came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheSource {
    Github,
    Bundled,
}

/// Sidecar written next to every cached asset (`meta.json`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheMeta {
    pub source: CacheSource,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Agent roles a slim preset can configure.
pub const PRESET_AGENT_ROLES: [&str; 6] = [
    "orchestrator",
    "oracle",
    "librarian",
    "explorer",
    "designer",
    "fixer",
];

/// Model assignment for one agent role inside a preset.
///
/// `variant` is kept as written (`low`, `high`, `xhigh`, ...) since the set of
/// reasoning levels belongs to the provider, not to this tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PresetAgentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcps: Option<Vec<String>>,
    /// Agent fields this tool does not model (`prompt`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PresetAgentConfig {
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Default::default()
        }
    }
}

/// One named preset: a model per agent role.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PresetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchestrator: Option<PresetAgentConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oracle: Option<PresetAgentConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub librarian: Option<PresetAgentConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer: Option<PresetAgentConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designer: Option<PresetAgentConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixer: Option<PresetAgentConfig>,
    /// Roles outside the six above, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PresetConfig {
    /// Same model for every agent role.
    pub fn uniform(model: &str) -> Self {
        let agent = || Some(PresetAgentConfig::with_model(model));
        Self {
            orchestrator: agent(),
            oracle: agent(),
            librarian: agent(),
            explorer: agent(),
            designer: agent(),
            fixer: agent(),
            extra: Map::new(),
        }
    }

    /// Number of agent roles that have a configuration.
    pub fn agent_count(&self) -> usize {
        [
            &self.orchestrator,
            &self.oracle,
            &self.librarian,
            &self.explorer,
            &self.designer,
            &self.fixer,
        ]
        .iter()
        .filter(|agent| agent.is_some())
        .count()
    }
}

/// tmux integration block. `layout` is a tmux layout name such as
/// `main-vertical` or `tiled`, passed through unchecked.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TmuxConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_pane_size: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The slim dialect's single config file.
///
/// `preset` is expected to name a key of `presets`, but that is not checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OmosConfig {
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub presets: IndexMap<String, PresetConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmux: Option<TmuxConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_mcps: Option<Vec<String>>,
    /// Fields this tool does not model, kept so a rewrite does not drop them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
