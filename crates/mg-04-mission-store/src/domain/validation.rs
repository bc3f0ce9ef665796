//! Mission request validation.

use super::mission::{MissionKind, MissionSpec, Timestamp};
use crate::error::{MissionError, MissionResult};
use crate::service::MissionStoreConfig;

/// Check a mission request before any side effect.
pub fn validate_spec(
    spec: &MissionSpec,
    config: &MissionStoreConfig,
    now: Timestamp,
) -> MissionResult<()> {
    let invalid = |msg: String| Err(MissionError::Invalid(msg));

    if spec.title.trim().is_empty() {
        return invalid("title is required".into());
    }
    if spec.title.chars().count() > config.max_title_len {
        return invalid(format!("title exceeds {} characters", config.max_title_len));
    }
    if spec.description.chars().count() > config.max_description_len {
        return invalid(format!(
            "description exceeds {} characters",
            config.max_description_len
        ));
    }
    if spec.max_claims == 0 {
        return invalid("max_claims must be at least 1".into());
    }
    if spec.max_claims > config.max_claims_limit {
        return invalid(format!(
            "max_claims exceeds limit of {}",
            config.max_claims_limit
        ));
    }
    if spec.reward.is_zero() {
        return invalid("reward must carry XP or USD".into());
    }
    if spec
        .reward
        .usd_cents
        .checked_mul(u64::from(spec.max_claims))
        .is_none()
    {
        return invalid("USD budget overflows".into());
    }
    if spec.expires_at.is_some_and(|at| at <= now) {
        return invalid("expiry must be in the future".into());
    }
    match &spec.kind {
        MissionKind::Outreach { template, targets } => {
            if template.trim().is_empty() {
                return invalid("outreach template is required".into());
            }
            if targets.is_empty() || targets.iter().any(|t| t.trim().is_empty()) {
                return invalid("outreach needs at least one non-empty target".into());
            }
        }
        MissionKind::Custom { instructions } if instructions.trim().is_empty() => {
            return invalid("custom missions need instructions".into());
        }
        _ => {}
    }
    Ok(())
}
