//! PHI redaction
//!
//! Rule-based scrubbing of personally identifiable/health information from
//! text before it leaves the system. Rules are declarative data: an ordered
//! list of (pattern, replacement) pairs, compiled once when the `Redactor`
//! is constructed and applied sequentially, so a later rule sees the output
//! of earlier rules.

use crate::error::AppError;
use anyhow::Context;
use regex::Regex;

/// Replacement token inserted in place of matched PHI
pub const REDACTED_TOKEN: &str = "[REDACTED]";

/// Definition of a single PHI pattern.
///
/// This table is the single source of truth for the redaction rule set:
/// runtime scrubbing, tests, and documentation all read from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhiPatternDef {
    /// Unique identifier for the pattern (e.g., "ssn")
    pub id: &'static str,
    /// The regex pattern string
    pub regex: &'static str,
    /// Fixed replacement token
    pub replacement: &'static str,
}

/// Ordered list of built-in PHI patterns.
///
/// Order matters: the hyphenated SSN shape runs before the bare digit-run
/// rule so an SSN is never partially consumed as a phone number. Digits
/// inside an already-redacted token are not re-matched because the token
/// text contains no digits.
pub static PHI_PATTERNS: &[PhiPatternDef] = &[
    PhiPatternDef {
        id: "ssn",
        regex: r"\b\d{3}-\d{2}-\d{4}\b",
        replacement: REDACTED_TOKEN,
    },
    PhiPatternDef {
        id: "phone",
        regex: r"\b\d{10}\b",
        replacement: REDACTED_TOKEN,
    },
    PhiPatternDef {
        id: "email",
        regex: r"[\w.-]+@[\w.-]+",
        replacement: REDACTED_TOKEN,
    },
];

/// Stateless PHI text scrubber with pre-compiled rules
#[derive(Debug, Clone)]
pub struct Redactor {
    rules: Vec<(Regex, &'static str)>,
}

impl Redactor {
    /// Compile the built-in rule table.
    ///
    /// The patterns are static, but compilation failures are still
    /// propagated rather than panicking so a bad rule is a startup fault,
    /// not a crash mid-request.
    pub fn new() -> Result<Self, AppError> {
        let rules = PHI_PATTERNS
            .iter()
            .map(|def| {
                let regex = Regex::new(def.regex)
                    .with_context(|| format!("invalid PHI pattern '{}'", def.id))?;
                Ok((regex, def.replacement))
            })
            .collect::<Result<Vec<_>, anyhow::Error>>()?;
        Ok(Self { rules })
    }

    /// Apply every rule in order over the progressively-redacted string.
    pub fn redact(&self, text: &str) -> String {
        let mut redacted = text.to_string();
        for (regex, replacement) in &self.rules {
            redacted = regex.replace_all(&redacted, *replacement).into_owned();
        }
        redacted
    }
}
