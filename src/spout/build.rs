//! The one-time build phase: configuration to runnable parts.
//!
//! Everything here is fatal on failure. The process reports the diagnostic
//! and exits before any worker starts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{ReplacerConfig, SpoutConfig};
use crate::output::{self, Registry};
use crate::pattern::{Pattern, Template};
use crate::replacer::{
    timestamp, DocumentOpts, FixedListReplacer, FloatReplacer, IntegerReplacer, LooksRealReplacer,
    Replacer, Replacers, StringReplacer, TimestampReplacer,
};

/// Error type for the build phase.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("{seeds} sample event(s) but {patterns} pattern(s) found")]
    TooFewSeedLogs { seeds: usize, patterns: usize },

    #[error("pattern #{index} does not match its sample event")]
    PatternMismatch { index: usize },

    #[error("invalid pattern #{index}: {source}")]
    BadPattern {
        index: usize,
        source: regex::Error,
    },

    #[error("failed to read sample file {path}: {source}")]
    SampleFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("replacement {field}: fixed list is empty")]
    EmptyList { field: String },

    #[error("replacement {field}: missing list or list-file")]
    MissingList { field: String },

    #[error("replacement {field}: failed to read list-file {path}: {source}")]
    ListFile {
        field: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("replacement {field}: min {min} exceeds max {max}")]
    InvertedRange { field: String, min: i64, max: i64 },

    #[error("replacement {field}: invalid timestamp format {format:?}")]
    BadTimestampFormat { field: String, format: String },

    #[error("replacement {field}: {method} requires a non-empty tag-seed")]
    MissingTagSeed { field: String, method: String },
}

/// Read the seed events from the sample file. Events are delimited by blank
/// lines, so one event may span several physical lines.
pub fn load_seed_events(path: &Path) -> Result<Vec<String>, BuildError> {
    let raw = std::fs::read_to_string(path).map_err(|source| BuildError::SampleFile {
        path: path.to_path_buf(),
        source,
    })?;

    let mut events = Vec::new();
    let mut buffer = String::new();
    for line in raw.lines() {
        if line.is_empty() {
            if !buffer.is_empty() {
                events.push(buffer.trim_end_matches('\n').to_string());
                buffer.clear();
            }
            continue;
        }
        buffer.push_str(line);
        buffer.push('\n');
    }
    if !buffer.is_empty() {
        events.push(buffer.trim_end_matches('\n').to_string());
    }

    for (idx, event) in events.iter().enumerate() {
        debug!(idx, event = %event, "loaded sample event");
    }
    Ok(events)
}

/// Compile every pattern and tokenize it against its seed event.
pub fn build_templates(patterns: &[String], seeds: &[String]) -> Result<Vec<Template>, BuildError> {
    if patterns.len() != seeds.len() {
        return Err(BuildError::TooFewSeedLogs {
            seeds: seeds.len(),
            patterns: patterns.len(),
        });
    }

    patterns
        .iter()
        .zip(seeds)
        .enumerate()
        .map(|(index, (pattern, seed))| {
            let compiled =
                Pattern::new(pattern).map_err(|source| BuildError::BadPattern { index, source })?;
            compiled
                .tokenize(seed)
                .ok_or(BuildError::PatternMismatch { index })
        })
        .collect()
}

/// Build the canonical replacer set from configuration. The table is keyed by
/// the config type tag; workers clone the resulting set.
pub fn build_replacers(
    configs: &std::collections::HashMap<String, ReplacerConfig>,
) -> Result<Replacers, BuildError> {
    let mut replacers = Replacers::new();

    for (field, config) in configs {
        let replacer = match config {
            ReplacerConfig::FixedList(attrs) => {
                let values = if !attrs.list.is_empty() {
                    attrs.list.clone()
                } else if let Some(path) = &attrs.list_file {
                    let raw =
                        std::fs::read_to_string(path).map_err(|source| BuildError::ListFile {
                            field: field.clone(),
                            path: path.clone(),
                            source,
                        })?;
                    raw.lines().map(str::to_string).collect()
                } else {
                    return Err(BuildError::MissingList {
                        field: field.clone(),
                    });
                };
                if values.is_empty() {
                    return Err(BuildError::EmptyList {
                        field: field.clone(),
                    });
                }
                Replacer::FixedList(FixedListReplacer::new(attrs.method, values))
            }

            ReplacerConfig::Timestamp(attrs) => {
                if !timestamp::is_valid_format(&attrs.format) {
                    return Err(BuildError::BadTimestampFormat {
                        field: field.clone(),
                        format: attrs.format.clone(),
                    });
                }
                Replacer::Timestamp(TimestampReplacer::new(&attrs.format))
            }

            ReplacerConfig::Integer(attrs) => {
                if attrs.min > attrs.max {
                    return Err(BuildError::InvertedRange {
                        field: field.clone(),
                        min: attrs.min,
                        max: attrs.max,
                    });
                }
                Replacer::Integer(IntegerReplacer::new(attrs.method, attrs.min, attrs.max))
            }

            ReplacerConfig::Float(attrs) => {
                if attrs.min > attrs.max {
                    return Err(BuildError::InvertedRange {
                        field: field.clone(),
                        min: attrs.min as i64,
                        max: attrs.max as i64,
                    });
                }
                Replacer::Float(FloatReplacer::new(attrs.min, attrs.max, attrs.precision))
            }

            ReplacerConfig::String(attrs) => {
                if attrs.min > attrs.max {
                    return Err(BuildError::InvertedRange {
                        field: field.clone(),
                        min: attrs.min as i64,
                        max: attrs.max as i64,
                    });
                }
                Replacer::String(StringReplacer::new(
                    attrs.chars.as_deref().unwrap_or_default(),
                    attrs.min,
                    attrs.max,
                ))
            }

            ReplacerConfig::LooksReal(attrs) => {
                let mut opts = DocumentOpts::default();
                if let Some(depth) = attrs.max_depth {
                    opts.max_depth = depth;
                }
                if let Some(elements) = attrs.max_elements {
                    opts.max_elements = elements;
                }
                opts.tag_seed = attrs.tag_seed.clone();

                // The document kinds cannot produce anything without a tag
                // vocabulary; fail the build rather than emit empty strings.
                if matches!(attrs.method.as_str(), "xml" | "json") && opts.tag_seed.is_empty() {
                    return Err(BuildError::MissingTagSeed {
                        field: field.clone(),
                        method: attrs.method.clone(),
                    });
                }
                Replacer::LooksReal(LooksRealReplacer::new(&attrs.method, opts))
            }
        };

        replacers.insert(field.clone(), replacer);
    }

    Ok(replacers)
}

/// Build the registry and register one destination per output entry.
/// Duplicate identities (two entries rendering to the same configuration)
/// are logged and skipped; the first registration wins.
pub async fn build_registry(config: &SpoutConfig) -> Arc<Registry> {
    let registry = Arc::new(Registry::new());

    for (name, output_config) in &config.output {
        let output = output::from_config(output_config);
        if let Err(e) = registry.register(output).await {
            warn!(name = %name, error = %e, "skipping output");
        }
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FixedListAttrs, IntegerAttrs, LooksRealAttrs, TimestampAttrs};
    use crate::replacer::Method;
    use std::collections::HashMap;

    #[test]
    fn test_seed_pattern_count_mismatch() {
        let patterns = vec!["a".to_string(), "b".to_string()];
        let seeds = vec!["a".to_string()];

        let err = build_templates(&patterns, &seeds).unwrap_err();
        assert!(matches!(
            err,
            BuildError::TooFewSeedLogs {
                seeds: 1,
                patterns: 2
            }
        ));
    }

    #[test]
    fn test_unmatched_pattern() {
        let patterns = vec![r"user=(?P<user>\w+)".to_string()];
        let seeds = vec!["no fields here".to_string()];

        let err = build_templates(&patterns, &seeds).unwrap_err();
        assert!(matches!(err, BuildError::PatternMismatch { index: 0 }));
    }

    #[test]
    fn test_templates_built_in_order() {
        let patterns = vec![
            r"user=(?P<user>\w+)".to_string(),
            r"order=(?P<order>\d+)".to_string(),
        ];
        let seeds = vec!["user=alice".to_string(), "order=42".to_string()];

        let templates = build_templates(&patterns, &seeds).unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].fragments().concat(), "user=alice");
        assert_eq!(templates[1].fragments().concat(), "order=42");
    }

    #[test]
    fn test_empty_fixed_list_is_rejected() {
        let mut configs = HashMap::new();
        configs.insert(
            "user".to_string(),
            ReplacerConfig::FixedList(FixedListAttrs {
                method: Method::Next,
                list: vec![],
                list_file: None,
            }),
        );

        let err = build_replacers(&configs).unwrap_err();
        assert!(matches!(err, BuildError::MissingList { .. }));
    }

    #[test]
    fn test_list_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.txt");
        std::fs::write(&path, "alice\nbob\n").unwrap();

        let mut configs = HashMap::new();
        configs.insert(
            "user".to_string(),
            ReplacerConfig::FixedList(FixedListAttrs {
                method: Method::Next,
                list: vec![],
                list_file: Some(path),
            }),
        );

        let replacers = build_replacers(&configs).unwrap();
        assert!(matches!(
            replacers.get("user"),
            Some(Replacer::FixedList(_))
        ));
    }

    #[test]
    fn test_inverted_integer_range_is_rejected() {
        let mut configs = HashMap::new();
        configs.insert(
            "n".to_string(),
            ReplacerConfig::Integer(IntegerAttrs {
                method: Method::Random,
                min: 10,
                max: 5,
            }),
        );

        let err = build_replacers(&configs).unwrap_err();
        assert!(matches!(err, BuildError::InvertedRange { .. }));
    }

    #[test]
    fn test_bad_timestamp_format_is_rejected() {
        let mut configs = HashMap::new();
        configs.insert(
            "ts".to_string(),
            ReplacerConfig::Timestamp(TimestampAttrs {
                format: "%Q".to_string(),
            }),
        );

        let err = build_replacers(&configs).unwrap_err();
        assert!(matches!(err, BuildError::BadTimestampFormat { .. }));
    }

    #[test]
    fn test_xml_without_tag_seed_is_rejected() {
        let mut configs = HashMap::new();
        configs.insert(
            "doc".to_string(),
            ReplacerConfig::LooksReal(LooksRealAttrs {
                method: "xml".to_string(),
                max_depth: None,
                max_elements: None,
                tag_seed: vec![],
            }),
        );

        let err = build_replacers(&configs).unwrap_err();
        assert!(matches!(err, BuildError::MissingTagSeed { .. }));
    }

    #[test]
    fn test_unknown_looks_real_kind_is_not_a_build_error() {
        // Unknown kinds surface at render time, where the worker logs and
        // keeps the previous value.
        let mut configs = HashMap::new();
        configs.insert(
            "x".to_string(),
            ReplacerConfig::LooksReal(LooksRealAttrs {
                method: "telepathy".to_string(),
                max_depth: None,
                max_elements: None,
                tag_seed: vec![],
            }),
        );

        assert!(build_replacers(&configs).is_ok());
    }
}
