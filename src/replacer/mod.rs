//! Replacement policies for the substitutable fields of a seed log line.
//!
//! A [`Replacer`] produces a new value every time a field is re-rendered. The
//! generated values are concatenated with the literal fragments of the token
//! template into one log event, which is then sent to the output destinations.
//!
//! Replacers are stateful (sequential methods advance a cursor on every call)
//! and are therefore never shared between workers: each worker receives a
//! deep [`Clone`] of the canonical set at spawn time.

pub mod document;
pub mod fixed_list;
pub mod gauss;
pub mod looks_real;
pub mod numeric;
pub mod string;
pub mod timestamp;

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub use document::DocumentOpts;
pub use fixed_list::FixedListReplacer;
pub use gauss::simple_gaussian;
pub use looks_real::LooksRealReplacer;
pub use numeric::{FloatReplacer, IntegerReplacer};
pub use string::StringReplacer;
pub use timestamp::TimestampReplacer;

/// Error type for render operations.
#[derive(Debug, thiserror::Error)]
pub enum ReplacerError {
    /// The looks-real variant was configured with a semantic kind it does
    /// not recognize.
    #[error("unknown looks-real method: {0}")]
    UnknownMethod(String),
}

/// Value selection method for the cursor-based replacers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Advance the cursor forward, wrapping at the end of the range.
    Next,
    /// Advance the cursor backward, wrapping at the start of the range.
    Prev,
    /// Pick pseudo-randomly (Gaussian, clustered around the middle).
    Random,
}

/// A replacement policy for one substitutable field.
///
/// The set of variants is closed and known at build time; construction from
/// configuration happens in a single factory keyed by the type tag (see
/// `spout::build`).
#[derive(Debug, Clone)]
pub enum Replacer {
    FixedList(FixedListReplacer),
    Integer(IntegerReplacer),
    Float(FloatReplacer),
    String(StringReplacer),
    Timestamp(TimestampReplacer),
    LooksReal(LooksRealReplacer),
}

impl Replacer {
    /// Render the next replacement value, advancing any cursor state.
    ///
    /// Only the looks-real variant can fail, with
    /// [`ReplacerError::UnknownMethod`].
    pub fn render<R: Rng>(&mut self, rng: &mut R) -> Result<String, ReplacerError> {
        match self {
            Replacer::FixedList(r) => Ok(r.render(rng)),
            Replacer::Integer(r) => Ok(r.render(rng)),
            Replacer::Float(r) => Ok(r.render(rng)),
            Replacer::String(r) => Ok(r.render(rng)),
            Replacer::Timestamp(r) => Ok(r.render()),
            Replacer::LooksReal(r) => r.render(rng),
        }
    }
}

/// The full replacement policy set, keyed by field name.
///
/// `Clone` yields deep, independent copies of every policy, which is how each
/// worker gets its own mutable set from the canonical one.
pub type Replacers = HashMap<String, Replacer>;
