//! Configuration loading and validation.
//!
//! The top-level [`SpoutConfig`] mirrors the on-disk configuration file,
//! which may be JSON or YAML (selected by file extension). Keys are
//! kebab-case. The replacement and output sections are adjacently tagged
//! (`type` / `attrs`) so each entry names its variant explicitly.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::replacer::Method;

/// The maximum configuration file size in bytes.
const MAX_CONFIG_BYTES: u64 = 1_048_576;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config file {path} is too large ({size} bytes, limit {limit})")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },

    #[error("unsupported config file extension: {0:?}")]
    UnsupportedExtension(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("min-interval ({min}ms) must not exceed max-interval ({max}ms)")]
    IntervalOrder { min: u64, max: u64 },

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("at least one pattern is required")]
    NoPatterns,

    #[error("at least one output destination is required")]
    NoOutputs,
}

/// The top-level logspray configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SpoutConfig {
    /// The type of the logs, e.g. the application name. Informational.
    #[serde(default)]
    pub log_type: Option<String>,

    /// Where the seed log events are read from. Events are delimited by
    /// blank lines, so one event may span multiple lines.
    pub sample_file: PathBuf,

    /// One regex per seed event. Named capture groups mark the fields to be
    /// replaced by the policies in `replacement`.
    pub pattern: Vec<String>,

    /// Number of workers generating logs concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Minimum think time between two transactions, in milliseconds.
    #[serde(default = "default_interval")]
    pub min_interval: u64,

    /// Maximum think time between two transactions, in milliseconds.
    #[serde(default = "default_interval")]
    pub max_interval: u64,

    /// How long to run, in seconds. 0 means unbounded.
    #[serde(default)]
    pub duration: u64,

    /// Total number of events to generate across all workers. Absent means
    /// unbounded.
    #[serde(default)]
    pub max_events: Option<u64>,

    /// Port for the management console. 0 disables the console.
    #[serde(default)]
    pub console_port: u16,

    /// Generate events as fast as possible, skipping every think-time sleep.
    #[serde(default)]
    pub burst_mode: bool,

    /// Spread the inter-transaction think time uniformly in
    /// `[min-interval, max-interval]` instead of following the diurnal
    /// traffic curve.
    #[serde(default = "default_true")]
    pub uniform_load: bool,

    /// Fields that correlate the lines of one transaction: their value is
    /// rendered once on the first line and reused on the rest.
    #[serde(default)]
    pub transaction_ids: Vec<String>,

    /// Upper bound for the pause between two lines of one transaction, in
    /// milliseconds.
    #[serde(default = "default_intra_latency")]
    pub max_intra_transaction_latency: u64,

    /// Replacement policy per substitutable field name.
    #[serde(default)]
    pub replacement: HashMap<String, ReplacerConfig>,

    /// Output destinations, keyed by an arbitrary name.
    pub output: HashMap<String, OutputConfig>,
}

fn default_concurrency() -> usize {
    1
}

fn default_interval() -> u64 {
    1000
}

fn default_intra_latency() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

impl SpoutConfig {
    /// Load and validate a configuration file, dispatching on the file
    /// extension (`.json`, `.yml`, `.yaml`).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let size = std::fs::metadata(path)
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        if size > MAX_CONFIG_BYTES {
            return Err(ConfigError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit: MAX_CONFIG_BYTES,
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let config: SpoutConfig = match ext {
            "json" => serde_json::from_str(&raw)?,
            "yml" | "yaml" => serde_yaml::from_str(&raw)?,
            other => return Err(ConfigError::UnsupportedExtension(other.to_string())),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_interval > self.max_interval {
            return Err(ConfigError::IntervalOrder {
                min: self.min_interval,
                max: self.max_interval,
            });
        }
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.pattern.is_empty() {
            return Err(ConfigError::NoPatterns);
        }
        if self.output.is_empty() {
            return Err(ConfigError::NoOutputs);
        }
        Ok(())
    }
}

/// Replacement policy configuration, adjacently tagged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "attrs", rename_all = "kebab-case")]
pub enum ReplacerConfig {
    FixedList(FixedListAttrs),
    Timestamp(TimestampAttrs),
    Integer(IntegerAttrs),
    Float(FloatAttrs),
    String(StringAttrs),
    LooksReal(LooksRealAttrs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FixedListAttrs {
    pub method: Method,
    /// Inline value list. Mutually exclusive with `list-file`.
    #[serde(default)]
    pub list: Vec<String>,
    /// Path to a file holding one value per line.
    #[serde(default)]
    pub list_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TimestampAttrs {
    /// A chrono `strftime` pattern, e.g. `%b %d %H:%M:%S`.
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IntegerAttrs {
    pub method: Method,
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FloatAttrs {
    pub min: f64,
    pub max: f64,
    pub precision: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StringAttrs {
    pub min: usize,
    pub max: usize,
    /// Character set to draw from; alphanumeric when absent.
    #[serde(default)]
    pub chars: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LooksRealAttrs {
    /// Semantic-data kind, e.g. `ipv4`, `user-agent`, `uuid`, `xml`.
    pub method: String,
    /// Maximum tree depth for the xml/json kinds.
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Per-level element cap for the xml/json kinds.
    #[serde(default)]
    pub max_elements: Option<usize>,
    /// Tag vocabulary for the xml/json kinds. Mandatory for those kinds.
    #[serde(default)]
    pub tag_seed: Vec<String>,
}

/// Output destination configuration, adjacently tagged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "attrs", rename_all = "kebab-case")]
pub enum OutputConfig {
    Console(ConsoleAttrs),
    File(FileAttrs),
    Syslog(SyslogAttrs),
    Kafka(KafkaAttrs),
    Discard(DiscardAttrs),
}

/// Which standard stream a console output writes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleAttrs {
    #[serde(default)]
    pub target: ConsoleTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileAttrs {
    /// Directory the log file lives in, created on activation if missing.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_name() -> String {
    "logspray_default.log".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SyslogAttrs {
    /// `udp` or `tcp`.
    #[serde(default = "default_syslog_protocol")]
    pub protocol: String,
    #[serde(default = "default_syslog_netaddr")]
    pub netaddr: String,
    #[serde(default = "default_syslog_tag")]
    pub tag: String,
}

fn default_syslog_protocol() -> String {
    "udp".to_string()
}

fn default_syslog_netaddr() -> String {
    "localhost:514".to_string()
}

fn default_syslog_tag() -> String {
    "logspray".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KafkaAttrs {
    /// Bootstrap servers, comma separated.
    pub brokers: String,
    pub topic: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DiscardAttrs {}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
log-type: access_log
sample-file: sample.log
pattern:
  - 'user=(?P<user>\w+)'
concurrency: 2
min-interval: 100
max-interval: 1000
max-events: 50
transaction-ids: [user]
replacement:
  user: { type: fixed-list, attrs: { method: next, list: [alice, bob] } }
  ip: { type: looks-real, attrs: { method: ipv4 } }
  latency: { type: float, attrs: { min: 0.1, max: 9.9, precision: 2 } }
output:
  stdout: { type: console, attrs: {} }
  sink: { type: discard, attrs: {} }
"#;

    const JSON: &str = r#"{
  "log-type": "access_log",
  "sample-file": "sample.log",
  "pattern": ["user=(?P<user>\\w+)"],
  "concurrency": 2,
  "min-interval": 100,
  "max-interval": 1000,
  "max-events": 50,
  "transaction-ids": ["user"],
  "replacement": {
    "user": { "type": "fixed-list", "attrs": { "method": "next", "list": ["alice", "bob"] } },
    "ip": { "type": "looks-real", "attrs": { "method": "ipv4" } },
    "latency": { "type": "float", "attrs": { "min": 0.1, "max": 9.9, "precision": 2 } }
  },
  "output": {
    "stdout": { "type": "console", "attrs": {} },
    "sink": { "type": "discard", "attrs": {} }
  }
}"#;

    #[test]
    fn test_yaml_and_json_parse_identically() {
        let from_yaml: SpoutConfig = serde_yaml::from_str(YAML).unwrap();
        let from_json: SpoutConfig = serde_json::from_str(JSON).unwrap();

        assert_eq!(from_yaml.concurrency, from_json.concurrency);
        assert_eq!(from_yaml.max_events, Some(50));
        assert_eq!(from_yaml.pattern, from_json.pattern);
        assert_eq!(from_yaml.replacement.len(), 3);
        assert_eq!(from_json.replacement.len(), 3);
        assert_eq!(from_yaml.output.len(), 2);

        assert!(matches!(
            from_yaml.replacement.get("user"),
            Some(ReplacerConfig::FixedList(_))
        ));
        assert!(matches!(
            from_yaml.output.get("sink"),
            Some(OutputConfig::Discard(_))
        ));
    }

    #[test]
    fn test_defaults() {
        let minimal: SpoutConfig = serde_yaml::from_str(
            r#"
sample-file: sample.log
pattern: ['x']
output:
  stdout: { type: console, attrs: {} }
"#,
        )
        .unwrap();

        assert_eq!(minimal.concurrency, 1);
        assert_eq!(minimal.min_interval, 1000);
        assert_eq!(minimal.max_interval, 1000);
        assert_eq!(minimal.duration, 0);
        assert_eq!(minimal.max_events, None);
        assert_eq!(minimal.console_port, 0);
        assert!(!minimal.burst_mode);
        assert!(minimal.uniform_load);
        assert_eq!(minimal.max_intra_transaction_latency, 10);
    }

    #[test]
    fn test_unknown_type_tags_are_rejected() {
        let bad = r#"
sample-file: sample.log
pattern: ['x']
replacement:
  f: { type: telepathy, attrs: {} }
output:
  stdout: { type: console, attrs: {} }
"#;
        assert!(serde_yaml::from_str::<SpoutConfig>(bad).is_err());

        let bad = r#"
sample-file: sample.log
pattern: ['x']
output:
  q: { type: carrier-pigeon, attrs: {} }
"#;
        assert!(serde_yaml::from_str::<SpoutConfig>(bad).is_err());
    }

    #[test]
    fn test_interval_order_is_validated() {
        let mut config: SpoutConfig = serde_yaml::from_str(YAML).unwrap();
        config.min_interval = 2000;
        config.max_interval = 100;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::IntervalOrder { .. })
        ));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let mut config: SpoutConfig = serde_yaml::from_str(YAML).unwrap();
        config.concurrency = 0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroConcurrency)
        ));
    }

    #[test]
    fn test_missing_patterns_are_rejected() {
        let mut config: SpoutConfig = serde_yaml::from_str(YAML).unwrap();
        config.pattern.clear();

        assert!(matches!(config.validate(), Err(ConfigError::NoPatterns)));
    }

    #[test]
    fn test_missing_outputs_are_rejected() {
        let mut config: SpoutConfig = serde_yaml::from_str(YAML).unwrap();
        config.output.clear();

        assert!(matches!(config.validate(), Err(ConfigError::NoOutputs)));
    }

    #[test]
    fn test_from_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("spout.json");
        std::fs::write(&json_path, JSON).unwrap();
        assert!(SpoutConfig::from_file(&json_path).is_ok());

        let yaml_path = dir.path().join("spout.yaml");
        std::fs::write(&yaml_path, YAML).unwrap();
        assert!(SpoutConfig::from_file(&yaml_path).is_ok());

        let toml_path = dir.path().join("spout.toml");
        std::fs::write(&toml_path, "x = 1").unwrap();
        assert!(matches!(
            SpoutConfig::from_file(&toml_path),
            Err(ConfigError::UnsupportedExtension(_))
        ));
    }
}
