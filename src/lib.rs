//! logspray library
//!
//! A library for synthesizing high-volume streams of realistic machine log
//! events, used to load-test downstream log-processing pipelines (collectors,
//! indexers, alerting systems).
//!
//! # How it works
//!
//! Given one or more seed log lines, a regex pattern per seed, and a set of
//! per-field replacement policies, logspray repeatedly re-renders the captured
//! fields with fresh synthetic values and fans the events out to one or more
//! live destinations (console, file, syslog, Kafka, discard), at a shaped and
//! optionally time-varying rate.
//!
//! # Components
//!
//! - [`replacer`] - typed value generators (fixed lists, numbers, strings,
//!   timestamps, "looks-real" semantic data, random structured documents)
//! - [`output`] - the destination contract and the concurrent fan-out registry
//! - [`pattern`] - the regex façade that turns a seed line into a token template
//! - [`spout`] - the orchestrator and its production workers
//! - [`metrics`] - per-worker throughput cells read by the management console
//! - [`console`] - the HTTP management endpoints
//!
//! # CLI Usage
//!
//! ```bash
//! # Generate logs per the policies in logspray.json
//! logspray -f logspray.json
//!
//! # Same configuration expressed as YAML, with debug logging
//! logspray -f logspray.yaml -v debug
//! ```

pub mod cli;
pub mod config;
pub mod console;
pub mod metrics;
pub mod output;
pub mod pattern;
pub mod replacer;
pub mod spout;
