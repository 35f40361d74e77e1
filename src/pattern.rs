//! Thin façade over regex matching with named capture groups.
//!
//! A [`Pattern`] applied to its seed line yields a [`Template`]: the seed
//! split into an ordered list of fragments with a parallel list of field
//! names, where an empty name marks a literal fragment and a non-empty name
//! marks a substitutable field. Workers clone the template and overwrite the
//! field fragments in place on every render.

use regex::Regex;

/// A compiled field-extraction pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    re: Regex,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            re: Regex::new(pattern)?,
        })
    }

    /// Split a seed line into a token template. Returns `None` when the
    /// pattern does not match the seed.
    pub fn tokenize(&self, seed: &str) -> Option<Template> {
        let caps = self.re.captures(seed)?;

        // Named groups, ordered by their position in the seed.
        let mut spans: Vec<(usize, usize, &str)> = self
            .re
            .capture_names()
            .flatten()
            .filter_map(|name| caps.name(name).map(|m| (m.start(), m.end(), name)))
            .collect();
        spans.sort_by_key(|&(start, _, _)| start);

        let mut fragments = Vec::new();
        let mut names = Vec::new();
        let mut pos = 0;

        for (start, end, name) in spans {
            if start > pos {
                fragments.push(seed[pos..start].to_string());
                names.push(String::new());
            }
            fragments.push(seed[start..end].to_string());
            names.push(name.to_string());
            pos = end;
        }
        if pos < seed.len() {
            fragments.push(seed[pos..].to_string());
            names.push(String::new());
        }

        Some(Template { fragments, names })
    }
}

/// One seed line split into substitutable and literal fragments.
#[derive(Debug, Clone)]
pub struct Template {
    fragments: Vec<String>,
    names: Vec<String>,
}

impl Template {
    /// The fragment texts. Same length as [`Template::names`].
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// The field name per fragment; empty for literals.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments_and_names_are_parallel() {
        let p = Pattern::new(r"user=(?P<user>\w+) ip=(?P<ip>[\d.]+)").unwrap();
        let t = p.tokenize("user=alice ip=10.0.0.1").unwrap();

        assert_eq!(t.fragments().len(), t.names().len());
        assert_eq!(t.fragments(), &["user=", "alice", " ip=", "10.0.0.1"]);
        assert_eq!(t.names(), &["", "user", "", "ip"]);
    }

    #[test]
    fn test_literals_reproduce_the_seed() {
        let p = Pattern::new(r"\[(?P<ts>[^\]]+)\] (?P<level>\w+)").unwrap();
        let seed = "[2024-01-01] INFO request served";
        let t = p.tokenize(seed).unwrap();

        assert_eq!(t.fragments().concat(), seed);
    }

    #[test]
    fn test_no_match_is_none() {
        let p = Pattern::new(r"user=(?P<user>\w+)").unwrap();
        assert!(p.tokenize("nothing to see here").is_none());
    }

    #[test]
    fn test_seed_without_any_fields() {
        let p = Pattern::new(r"heartbeat").unwrap();
        let t = p.tokenize("heartbeat ok").unwrap();

        assert_eq!(t.fragments().concat(), "heartbeat ok");
        assert!(t.names().iter().all(String::is_empty));
    }

    #[test]
    fn test_bad_pattern_is_an_error() {
        assert!(Pattern::new(r"user=(?P<user>").is_err());
    }
}
