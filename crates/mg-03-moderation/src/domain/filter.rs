//! # Moderation Filter
//!
//! Regex rules for known-bad phrasing plus a Shannon-entropy scan for
//! secret-looking tokens.

use super::entities::*;
use super::errors::ModerationError;
use super::patterns::{MISSION_RULES, PROOF_RULES};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Filter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// Bits per character at or above which a token is suspicious.
    pub entropy_threshold: f64,
    /// Shortest token considered for the entropy scan.
    pub min_token_len: usize,
    /// Extra mission-blocking regexes supplied by operators.
    pub extra_blocked_patterns: Vec<String>,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            entropy_threshold: 4.0,
            min_token_len: 20,
            extra_blocked_patterns: Vec::new(),
        }
    }
}

/// Compiled moderation rules.
#[derive(Debug, Clone)]
pub struct ModerationFilter {
    mission_rules: Vec<(ModerationReason, Regex)>,
    proof_rules: Vec<(ModerationReason, Regex)>,
    entropy_threshold: f64,
    min_token_len: usize,
}

fn compile(pattern: &str) -> Result<Regex, ModerationError> {
    Regex::new(pattern).map_err(|e| ModerationError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

impl ModerationFilter {
    /// Compile the built-in rules plus any configured extras.
    pub fn new(config: ModerationConfig) -> Result<Self, ModerationError> {
        if !config.entropy_threshold.is_finite() || config.entropy_threshold <= 0.0 {
            return Err(ModerationError::InvalidEntropyThreshold(
                config.entropy_threshold,
            ));
        }

        let mut mission_rules = MISSION_RULES
            .iter()
            .map(|(reason, pattern)| Ok((*reason, compile(pattern)?)))
            .collect::<Result<Vec<_>, ModerationError>>()?;
        for pattern in &config.extra_blocked_patterns {
            mission_rules.push((ModerationReason::CustomRule, compile(pattern)?));
        }

        let proof_rules = PROOF_RULES
            .iter()
            .map(|(reason, pattern)| Ok((*reason, compile(pattern)?)))
            .collect::<Result<Vec<_>, ModerationError>>()?;

        Ok(Self {
            mission_rules,
            proof_rules,
            entropy_threshold: config.entropy_threshold,
            min_token_len: config.min_token_len,
        })
    }

    /// Screen a mission title/description. Any match blocks creation.
    #[must_use]
    pub fn screen_mission_content(&self, text: &str) -> MissionScreen {
        let reasons = self
            .mission_rules
            .iter()
            .filter(|(_, rule)| rule.is_match(text))
            .map(|(reason, _)| *reason)
            .collect();
        let screen = MissionScreen::from_reasons(reasons);
        if screen.blocked {
            warn!(reasons = %screen.summary(), "[mg-03] Mission content blocked");
        }
        screen
    }

    /// Screen proof notes. Matches flag the submission for audit.
    #[must_use]
    pub fn screen_proof_content(&self, text: &str) -> ProofScreen {
        let mut reasons: Vec<ModerationReason> = self
            .proof_rules
            .iter()
            .filter(|(_, rule)| rule.is_match(text))
            .map(|(reason, _)| *reason)
            .collect();
        if self.has_high_entropy_token(text) {
            reasons.push(ModerationReason::HighEntropyToken);
        }
        let screen = ProofScreen::from_reasons(reasons);
        if screen.flagged {
            debug!(reasons = %screen.summary(), "[mg-03] Proof content flagged");
        }
        screen
    }

    fn has_high_entropy_token(&self, text: &str) -> bool {
        text.split_whitespace()
            .filter(|token| token.len() >= self.min_token_len && is_token_like(token))
            .any(|token| shannon_entropy(token) >= self.entropy_threshold)
    }
}

/// Characters found in API keys, base64 and base58 secrets.
fn is_token_like(token: &str) -> bool {
    token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=' | '_' | '-'))
}

/// Shannon entropy in bits per character.
pub fn shannon_entropy(token: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for c in token.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}
