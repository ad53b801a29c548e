//! Configuration loading, validation, and management for gemfarm.
//!
//! Loads configuration from `~/.gemfarm/config.toml` with environment
//! variable overrides. Validates all settings at startup. A missing token or
//! channel is the only condition that stops the process before the loop runs.

use gemfarm_core::resource::CategoryTable;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.gemfarm/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Account token used for the `authorization` header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// File holding the token (checked before `DISCORD_TOKEN`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,

    /// Target channel and API settings
    #[serde(default)]
    pub channel: ChannelSettings,

    /// Remote DM alerting
    #[serde(default)]
    pub notify: NotifySettings,

    /// Command keywords and text markers
    #[serde(default)]
    pub commands: CommandSettings,

    /// Resource categories, in tie-break order
    #[serde(default)]
    pub categories: CategoryTable,

    /// Challenge detection
    #[serde(default)]
    pub challenge: ChallengeSettings,

    /// Cadence and break thresholds
    #[serde(default)]
    pub schedule: ScheduleSettings,

    /// Runtime limits
    #[serde(default)]
    pub runtime: RuntimeSettings,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("token", &redact(&self.token))
            .field("token_file", &self.token_file)
            .field("channel", &self.channel)
            .field("notify", &self.notify)
            .field("commands", &self.commands)
            .field("categories", &self.categories)
            .field("challenge", &self.challenge)
            .field("schedule", &self.schedule)
            .field("runtime", &self.runtime)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSettings {
    /// Channel the commands are posted into
    #[serde(default)]
    pub channel_id: String,

    /// Guild the channel lives in (only used for the referer header)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://discord.com/api/v9".into()
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.6045.105 Safari/537.36".into()
}
fn default_request_timeout() -> u64 {
    30
}

impl ChannelSettings {
    /// Browser URL of the channel, sent as the referer.
    pub fn channel_url(&self) -> String {
        let guild = self.guild_id.as_deref().unwrap_or("@me");
        format!("https://discord.com/channels/{guild}/{}", self.channel_id)
    }
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            channel_id: String::new(),
            guild_id: None,
            api_base: default_api_base(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct NotifySettings {
    /// Token of the secondary account that sends alert DMs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// File holding the sender token (checked before `DISCORD_NOTIFY_TOKEN`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,

    /// User that receives alert DMs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl NotifySettings {
    /// DM alerts need both a sender token and a recipient.
    pub fn dm_enabled(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
            && self.user_id.as_deref().is_some_and(|u| !u.is_empty())
    }

    /// Sender token file: configured path or `~/.gemfarm/notify_token.txt`.
    pub fn token_file_path(&self) -> PathBuf {
        self.token_file
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("notify_token.txt"))
    }
}

impl std::fmt::Debug for NotifySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifySettings")
            .field("token", &redact(&self.token))
            .field("token_file", &self.token_file)
            .field("user_id", &self.user_id)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSettings {
    /// Commands dispatched unconditionally every iteration
    #[serde(default = "default_farming")]
    pub farming: Vec<String>,

    /// Command that makes the service list the inventory
    #[serde(default = "default_inventory_command")]
    pub inventory: String,

    /// Keyword prefixed to the consume command
    #[serde(default = "default_consume_keyword")]
    pub consume_keyword: String,

    /// Marker token in active-buff short codes (`<letter><marker><index>`)
    #[serde(default = "default_active_marker")]
    pub active_marker: String,

    /// Phrase that introduces the active-buff announcement
    #[serde(default = "default_empowered_phrase")]
    pub empowered_phrase: String,

    /// Embed title fragments that identify an inventory listing
    #[serde(default = "default_inventory_markers")]
    pub inventory_title_markers: Vec<String>,
}

fn default_farming() -> Vec<String> {
    vec!["oh".into(), "ob".into(), "owo".into()]
}
fn default_inventory_command() -> String {
    "oinv".into()
}
fn default_consume_keyword() -> String {
    "ouse".into()
}
fn default_active_marker() -> String {
    "gem".into()
}
fn default_empowered_phrase() -> String {
    "hunt is empowered by".into()
}
fn default_inventory_markers() -> Vec<String> {
    vec!["inventory".into()]
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            farming: default_farming(),
            inventory: default_inventory_command(),
            consume_keyword: default_consume_keyword(),
            active_marker: default_active_marker(),
            empowered_phrase: default_empowered_phrase(),
            inventory_title_markers: default_inventory_markers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeSettings {
    /// Lowercase substrings that indicate a verification challenge
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// How many recent messages each check scans (5..=15)
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u8,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Upper bound on a single challenge pause
    #[serde(default = "default_max_wait")]
    pub max_wait_minutes: u64,
}

fn default_keywords() -> Vec<String> {
    [
        "captcha",
        "verify",
        "verification",
        "are you a real human",
        "verify that you are human",
        "please complete your captcha",
        "owobot.com/captcha",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_fetch_limit() -> u8 {
    15
}
fn default_poll_interval() -> u64 {
    30
}
fn default_max_wait() -> u64 {
    360
}

impl ChallengeSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_minutes.saturating_mul(60))
    }
}

impl Default for ChallengeSettings {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            fetch_limit: default_fetch_limit(),
            poll_interval_secs: default_poll_interval(),
            max_wait_minutes: default_max_wait(),
        }
    }
}

/// An inclusive range of whole seconds a randomized pause is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl DelayRange {
    pub const fn new(min_secs: u64, max_secs: u64) -> Self {
        Self { min_secs, max_secs }
    }

    fn check(&self, name: &str) -> Result<(), ConfigError> {
        if self.min_secs > self.max_secs {
            return Err(ConfigError::ValidationError(format!(
                "{name}: min_secs ({}) must not exceed max_secs ({})",
                self.min_secs, self.max_secs
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSettings {
    /// Pause after the farming commands before checking for a challenge
    #[serde(default = "default_settle")]
    pub settle_delay_secs: u64,

    /// Pause after the inventory command before reading the listing
    #[serde(default = "default_inventory_settle")]
    pub inventory_settle_secs: u64,

    /// Messages read when looking for buff status and inventory listings
    #[serde(default = "default_scan_fetch_limit")]
    pub scan_fetch_limit: u8,

    #[serde(default = "default_iteration_delay")]
    pub iteration_delay: DelayRange,

    #[serde(default = "default_short_break")]
    pub short_break: DelayRange,

    #[serde(default = "default_long_break")]
    pub long_break: DelayRange,

    /// How much each iteration adds to the short-break message counter
    #[serde(default = "default_messages_per_iteration")]
    pub messages_per_iteration: u32,

    #[serde(default = "default_short_break_after")]
    pub short_break_after_messages: u32,

    /// Iterations that make up one cycle
    #[serde(default = "default_actions_per_cycle")]
    pub actions_per_cycle: u32,

    #[serde(default = "default_long_break_after")]
    pub long_break_after_cycles: u32,

    /// Run the resource maintenance pass every N iterations
    #[serde(default = "default_resource_check_every")]
    pub resource_check_every: u32,
}

fn default_settle() -> u64 {
    1
}
fn default_inventory_settle() -> u64 {
    3
}
fn default_scan_fetch_limit() -> u8 {
    15
}
fn default_iteration_delay() -> DelayRange {
    DelayRange::new(30, 60)
}
fn default_short_break() -> DelayRange {
    DelayRange::new(60, 300)
}
fn default_long_break() -> DelayRange {
    DelayRange::new(30 * 60, 60 * 60)
}
fn default_messages_per_iteration() -> u32 {
    2
}
fn default_short_break_after() -> u32 {
    30
}
fn default_actions_per_cycle() -> u32 {
    75
}
fn default_long_break_after() -> u32 {
    2
}
fn default_resource_check_every() -> u32 {
    10
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            settle_delay_secs: default_settle(),
            inventory_settle_secs: default_inventory_settle(),
            scan_fetch_limit: default_scan_fetch_limit(),
            iteration_delay: default_iteration_delay(),
            short_break: default_short_break(),
            long_break: default_long_break(),
            messages_per_iteration: default_messages_per_iteration(),
            short_break_after_messages: default_short_break_after(),
            actions_per_cycle: default_actions_per_cycle(),
            long_break_after_cycles: default_long_break_after(),
            resource_check_every: default_resource_check_every(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeSettings {
    /// Stop after this many minutes (unbounded when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_runtime_minutes: Option<u64>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.gemfarm/config.toml).
    ///
    /// Then applies process-environment overrides, see [`AppConfig::apply_env`].
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Fill unset secrets and identifiers from the environment.
    ///
    /// Token resolution order: config value, token file, `DISCORD_TOKEN`.
    /// `GEMFARM_CHANNEL_ID` always wins over the file. Notify settings come
    /// from `DISCORD_NOTIFY_TOKEN` and `GEMFARM_NOTIFY_USER_ID` when unset.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |v: String| {
            let v = v.trim().to_string();
            (!v.is_empty()).then_some(v)
        };

        if self.token.is_none() {
            let token_file = self.token_file_path();
            self.token = read_token_file(&token_file)
                .or_else(|| lookup("DISCORD_TOKEN").and_then(non_empty));
        }

        if let Some(channel_id) = lookup("GEMFARM_CHANNEL_ID").and_then(non_empty) {
            self.channel.channel_id = channel_id;
        }

        if self.notify.token.is_none() {
            let token_file = self.notify.token_file_path();
            self.notify.token = read_token_file(&token_file)
                .or_else(|| lookup("DISCORD_NOTIFY_TOKEN").and_then(non_empty));
        }
        if self.notify.user_id.is_none() {
            self.notify.user_id = lookup("GEMFARM_NOTIFY_USER_ID").and_then(non_empty);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".gemfarm")
    }

    /// Token file location: configured path or `~/.gemfarm/token.txt`.
    pub fn token_file_path(&self) -> PathBuf {
        self.token_file
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("token.txt"))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let schedule = &self.schedule;
        schedule.iteration_delay.check("schedule.iteration_delay")?;
        schedule.short_break.check("schedule.short_break")?;
        schedule.long_break.check("schedule.long_break")?;

        for (name, value) in [
            ("schedule.short_break_after_messages", schedule.short_break_after_messages),
            ("schedule.actions_per_cycle", schedule.actions_per_cycle),
            ("schedule.long_break_after_cycles", schedule.long_break_after_cycles),
            ("schedule.resource_check_every", schedule.resource_check_every),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!("{name} must be > 0")));
            }
        }

        if schedule.messages_per_iteration == 0 {
            return Err(ConfigError::ValidationError(
                "schedule.messages_per_iteration must be > 0".into(),
            ));
        }

        if self.challenge.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "challenge.poll_interval_secs must be > 0".into(),
            ));
        }

        if !(5..=15).contains(&self.challenge.fetch_limit) {
            return Err(ConfigError::ValidationError(
                "challenge.fetch_limit must be between 5 and 15".into(),
            ));
        }

        if self.schedule.scan_fetch_limit == 0 || self.schedule.scan_fetch_limit > 100 {
            return Err(ConfigError::ValidationError(
                "schedule.scan_fetch_limit must be between 1 and 100".into(),
            ));
        }

        if self.challenge.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "challenge.keywords must contain at least one keyword".into(),
            ));
        }

        if self.commands.consume_keyword.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "commands.consume_keyword must not be empty".into(),
            ));
        }

        let mut names = std::collections::HashSet::new();
        for category in self.categories.iter() {
            if category.start >= category.end {
                return Err(ConfigError::ValidationError(format!(
                    "category {}: start ({}) must be below end ({})",
                    category.name, category.start, category.end
                )));
            }
            if category.end > 1000 {
                return Err(ConfigError::ValidationError(format!(
                    "category {}: ids must fit in three digits",
                    category.name
                )));
            }
            if !names.insert(category.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate category name: {}",
                    category.name
                )));
            }
        }

        for (a, b) in self.categories.overlapping_pairs() {
            tracing::warn!(first = a, second = b, "Category ranges overlap; first declared wins");
        }

        Ok(())
    }

    /// The account token, or the startup-fatal [`ConfigError::MissingToken`].
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        match self.token.as_deref() {
            Some(t) if !t.trim().is_empty() => Ok(t),
            _ => Err(ConfigError::MissingToken),
        }
    }

    /// The target channel, or the startup-fatal [`ConfigError::MissingChannel`].
    pub fn require_channel(&self) -> Result<&str, ConfigError> {
        let id = self.channel.channel_id.trim();
        if id.is_empty() {
            Err(ConfigError::MissingChannel)
        } else {
            Ok(id)
        }
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_file: None,
            channel: ChannelSettings::default(),
            notify: NotifySettings::default(),
            commands: CommandSettings::default(),
            categories: CategoryTable::default(),
            challenge: ChallengeSettings::default(),
            schedule: ScheduleSettings::default(),
            runtime: RuntimeSettings::default(),
        }
    }
}

fn read_token_file(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let token = content.trim();
            if token.is_empty() {
                None
            } else {
                tracing::info!("Loaded token from {}", path.display());
                Some(token.to_string())
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!("Error reading token file {}: {e}", path.display());
            None
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Token not found: set `token`, create the token file, or export DISCORD_TOKEN")]
    MissingToken,

    #[error("No channel configured: set channel.channel_id or GEMFARM_CHANNEL_ID")]
    MissingChannel,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemfarm_core::resource::ResourceCategory;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn isolated() -> AppConfig {
        let mut config = AppConfig {
            token_file: Some(PathBuf::from("/nonexistent/gemfarm/token.txt")),
            ..AppConfig::default()
        };
        config.notify.token_file = Some(PathBuf::from("/nonexistent/gemfarm/notify_token.txt"));
        config
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.commands.farming, vec!["oh", "ob", "owo"]);
        assert_eq!(config.schedule.short_break_after_messages, 30);
        assert_eq!(config.schedule.actions_per_cycle, 75);
        assert_eq!(config.challenge.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.challenge.max_wait(), Duration::from_secs(360 * 60));
        assert_eq!(config.categories.len(), 5);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.categories, config.categories);
        assert_eq!(parsed.schedule.long_break, config.schedule.long_break);
    }

    #[test]
    fn inverted_delay_range_rejected() {
        let mut config = AppConfig::default();
        config.schedule.short_break = DelayRange::new(300, 60);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("short_break"));
    }

    #[test]
    fn zero_threshold_rejected() {
        let mut config = AppConfig::default();
        config.schedule.resource_check_every = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let mut config = AppConfig::default();
        config.challenge.poll_interval_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("poll_interval_secs"));
    }

    #[test]
    fn zero_messages_per_iteration_rejected() {
        let mut config = AppConfig::default();
        config.schedule.messages_per_iteration = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("messages_per_iteration"));
    }

    #[test]
    fn huge_max_wait_saturates() {
        let config = ChallengeSettings {
            max_wait_minutes: u64::MAX,
            ..ChallengeSettings::default()
        };
        assert_eq!(config.max_wait(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn fetch_limit_outside_window_rejected() {
        let mut config = AppConfig::default();
        config.challenge.fetch_limit = 50;
        assert!(config.validate().is_err());
        config.challenge.fetch_limit = 5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_category_range_rejected() {
        let mut config = AppConfig::default();
        config.categories = CategoryTable::new(vec![ResourceCategory::new("a", 1, 20, 20)]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn overlapping_categories_tolerated() {
        let mut config = AppConfig::default();
        config.categories = CategoryTable::new(vec![
            ResourceCategory::new("a", 1, 10, 25),
            ResourceCategory::new("b", 2, 20, 30),
        ]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().commands.consume_keyword, "ouse");
    }

    #[test]
    fn load_from_file_with_partial_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[channel]
channel_id = "1292058301760143392"
guild_id = "1287742668939464736"

[schedule]
iteration_delay = { min_secs = 5, max_secs = 10 }

[[categories]]
name = "A"
index = 1
start = 10
end = 20

[[categories]]
name = "B"
index = 2
start = 20
end = 30
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.require_channel().unwrap(), "1292058301760143392");
        assert_eq!(
            config.channel.channel_url(),
            "https://discord.com/channels/1287742668939464736/1292058301760143392"
        );
        assert_eq!(config.schedule.iteration_delay, DelayRange::new(5, 10));
        assert_eq!(config.schedule.short_break, DelayRange::new(60, 300));
        assert_eq!(config.categories.len(), 2);
        assert_eq!(config.categories.by_index(2).unwrap().name, "B");
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "channel = [").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn token_from_env_when_no_file() {
        let mut config = isolated();
        config.apply_env(env(&[("DISCORD_TOKEN", "  abc.def  ")]));
        assert_eq!(config.require_token().unwrap(), "abc.def");
    }

    #[test]
    fn token_file_takes_precedence_over_env() {
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.txt");
        std::fs::write(&token_path, "from-file\n").unwrap();

        let mut config = AppConfig {
            token_file: Some(token_path),
            ..AppConfig::default()
        };
        config.apply_env(env(&[("DISCORD_TOKEN", "from-env")]));
        assert_eq!(config.token.as_deref(), Some("from-file"));
    }

    #[test]
    fn notify_token_file_takes_precedence_over_env() {
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("notify_token.txt");
        std::fs::write(&token_path, "  notify-from-file\n").unwrap();

        let mut config = isolated();
        config.notify.token_file = Some(token_path);
        config.apply_env(env(&[
            ("DISCORD_NOTIFY_TOKEN", "notify-from-env"),
            ("GEMFARM_NOTIFY_USER_ID", "7"),
        ]));
        assert_eq!(config.notify.token.as_deref(), Some("notify-from-file"));
        assert!(config.notify.dm_enabled());
    }

    #[test]
    fn missing_token_is_fatal() {
        let mut config = isolated();
        config.apply_env(env(&[("DISCORD_TOKEN", "   ")]));
        assert!(matches!(config.require_token(), Err(ConfigError::MissingToken)));
        assert!(matches!(config.require_channel(), Err(ConfigError::MissingChannel)));
    }

    #[test]
    fn env_overrides_channel_and_notify() {
        let mut config = isolated();
        config.apply_env(env(&[
            ("GEMFARM_CHANNEL_ID", "42"),
            ("DISCORD_NOTIFY_TOKEN", "notify"),
            ("GEMFARM_NOTIFY_USER_ID", "7"),
        ]));
        assert_eq!(config.require_channel().unwrap(), "42");
        assert!(config.notify.dm_enabled());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = AppConfig::default();
        config.token = Some("super-secret".into());
        config.notify.token = Some("also-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("also-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("ouse"));
        assert!(toml_str.contains("hunt is empowered by"));
    }
}
