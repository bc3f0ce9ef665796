//! Screening verdicts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why content was blocked or flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationReason {
    /// Asks for passwords, seed phrases or similar credentials.
    CredentialPhishing,
    /// Solicits wallet approvals or fund transfers.
    WalletDrain,
    /// Attempts to override agent instructions.
    PromptInjection,
    /// Matched an operator-supplied rule.
    CustomRule,
    /// Long random-looking token.
    HighEntropyToken,
    /// 64 hex digits, optionally `0x`-prefixed.
    HexPrivateKey,
    /// Base58 string of WIF or keypair length.
    Base58Secret,
    /// PEM private key header.
    PemPrivateKey,
}

impl ModerationReason {
    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CredentialPhishing => "credential_phishing",
            Self::WalletDrain => "wallet_drain",
            Self::PromptInjection => "prompt_injection",
            Self::CustomRule => "custom_rule",
            Self::HighEntropyToken => "high_entropy_token",
            Self::HexPrivateKey => "hex_private_key",
            Self::Base58Secret => "base58_secret",
            Self::PemPrivateKey => "pem_private_key",
        }
    }
}

impl fmt::Display for ModerationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of screening mission content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MissionScreen {
    /// Creation must be refused.
    pub blocked: bool,
    /// Matched reasons, sorted and deduplicated.
    pub reasons: Vec<ModerationReason>,
}

impl MissionScreen {
    pub(crate) fn from_reasons(mut reasons: Vec<ModerationReason>) -> Self {
        reasons.sort();
        reasons.dedup();
        Self {
            blocked: !reasons.is_empty(),
            reasons,
        }
    }

    /// Reasons joined for error messages.
    #[must_use]
    pub fn summary(&self) -> String {
        join(&self.reasons)
    }
}

/// Result of screening proof content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProofScreen {
    /// Submission must be audited.
    pub flagged: bool,
    /// Matched reasons, sorted and deduplicated.
    pub reasons: Vec<ModerationReason>,
}

impl ProofScreen {
    pub(crate) fn from_reasons(mut reasons: Vec<ModerationReason>) -> Self {
        reasons.sort();
        reasons.dedup();
        Self {
            flagged: !reasons.is_empty(),
            reasons,
        }
    }

    /// Reasons joined for audit notes.
    #[must_use]
    pub fn summary(&self) -> String {
        join(&self.reasons)
    }
}

fn join(reasons: &[ModerationReason]) -> String {
    reasons
        .iter()
        .map(ModerationReason::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
