//! Built-in rule sources.

use super::entities::ModerationReason;

/// Mission rules that hard-block creation.
pub(crate) const MISSION_RULES: &[(ModerationReason, &str)] = &[
    (
        ModerationReason::CredentialPhishing,
        r"(?i)\b(enter|send|share|provide|submit|give|type|paste)\b.{0,40}\b(password|passphrase|seed\s+phrase|recovery\s+phrase|mnemonic|private\s+key|2fa\s+code|otp|login\s+credentials)\b",
    ),
    (
        ModerationReason::CredentialPhishing,
        r"(?i)\b(verify|confirm|validate)\s+your\s+(wallet|account)\b.{0,40}\b(seed|phrase|password|key)\b",
    ),
    (
        ModerationReason::WalletDrain,
        r"(?i)\b(setApprovalForAll|unlimited\s+(allowance|approval)|approve\s+all\s+tokens)\b",
    ),
    (
        ModerationReason::WalletDrain,
        r"(?i)\b(send|transfer|deposit)\b.{0,30}\b(all|your\s+entire|every)\b.{0,20}\b(funds|tokens|balance|eth|sol|btc|crypto)\b",
    ),
    (
        ModerationReason::WalletDrain,
        r"(?i)\bconnect\s+(your\s+)?wallet\b.{0,60}\b(claim|airdrop|sign)\b",
    ),
    (
        ModerationReason::PromptInjection,
        r"(?i)\b(ignore|disregard|forget|override)\b.{0,30}\b(previous|prior|above|all|your)\b.{0,20}\b(instructions|prompts?|rules|guidelines)\b",
    ),
    (
        ModerationReason::PromptInjection,
        r"(?i)\b(you\s+are\s+now|act\s+as|pretend\s+to\s+be)\b.{0,40}\b(unrestricted|jailbroken|dan|developer\s+mode)\b",
    ),
    (
        ModerationReason::PromptInjection,
        r"(?i)\b(reveal|print|output|leak)\b.{0,30}\b(system\s+prompt|api\s+keys?|hidden\s+instructions)\b",
    ),
];

/// Proof rules that flag for audit.
pub(crate) const PROOF_RULES: &[(ModerationReason, &str)] = &[
    (
        ModerationReason::PemPrivateKey,
        r"-----BEGIN (?:[A-Z0-9]+ )*PRIVATE KEY-----",
    ),
    (ModerationReason::HexPrivateKey, r"\b(?:0x)?[0-9a-fA-F]{64}\b"),
    (
        ModerationReason::Base58Secret,
        r"\b(?:[1-9A-HJ-NP-Za-km-z]{87,88}|[1-9A-HJ-NP-Za-km-z]{51,52})\b",
    ),
];
