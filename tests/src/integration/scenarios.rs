//! # End-to-End Scenarios
//!
//! The core flows driven through the fully wired container:
//!
//! 1. Auto-approve: trusted agent, seed forces "no audit" → paid, mission completed
//! 2. Audit: probation agent, seed forces "audit" → audit pending, nothing paid
//! 3. Fraud rejection: audit rejected for fraud → claim pending, probation → blacklist
//! 4. Exhausted mission: a second agent cannot claim the reserved slot

#[cfg(test)]
mod tests {
    use crate::integration::harness::{seed_where, Harness};
    use mg_04_mission_store::{MissionActor, MissionError, MissionKind, MissionSpec, MissionStatus};
    use mg_05_claim_engine::{
        AuditTrigger, AuditVerdict, ClaimError, ClaimStatus, Decision, ProofRef,
    };
    use shared_bus::CoreEvent;
    use shared_types::{Classify, ErrorKind, Reward, TrustTier};

    fn proof() -> ProofRef {
        ProofRef::new("https://social.example/post/42")
    }

    // =========================================================================
    // SCENARIO 1: AUTO-APPROVE
    // =========================================================================

    #[tokio::test]
    async fn test_trusted_agent_auto_approved_with_seed() {
        // Trusted agents are sampled at 5%.
        let h = Harness::seeded(seed_where(|draw| draw >= 0.05));
        let creator = h.funded_agent(0);
        let agent = h.agent(TrustTier::Trusted);
        let mission = h.mission(creator, Reward::xp(100), 1).await;
        let mut events = h.events();

        let claim = h.container.claims.create_claim(mission.id, agent).await.unwrap();
        assert_eq!(claim.status, ClaimStatus::Pending);
        let reserved = h.container.missions.get(mission.id).unwrap();
        assert_eq!(reserved.reserved_claims, 1);
        assert!(!reserved.has_capacity());

        let outcome = h
            .container
            .claims
            .submit_proof(claim.id, agent, proof())
            .await
            .unwrap();
        assert_eq!(outcome.claim.status, ClaimStatus::Verified);
        assert!(outcome.audit.is_none());
        assert!(outcome.mission_completed);
        assert_eq!(h.xp(agent), 100);
        assert_eq!(
            h.container.missions.get(mission.id).unwrap().status,
            MissionStatus::Completed
        );

        let kinds: Vec<_> = events
            .drain()
            .into_iter()
            .map(|e| match e {
                CoreEvent::ClaimCreated { .. } => "created",
                CoreEvent::ProofSubmitted { audited: false, .. } => "submitted",
                CoreEvent::ClaimVerified { .. } => "verified",
                CoreEvent::MissionCompleted { .. } => "completed",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["created", "submitted", "verified", "completed"]);
    }

    // =========================================================================
    // SCENARIOS 2 + 3: AUDIT, THEN FRAUD REJECTION
    // =========================================================================

    #[tokio::test]
    async fn test_probation_agent_audited_then_rejected_for_fraud() {
        // Probation agents are sampled at 50%.
        let h = Harness::seeded(seed_where(|draw| draw < 0.50));
        let creator = h.funded_agent(0);
        let reviewer = h.agent(TrustTier::Trusted);
        let agent = h.agent(TrustTier::Probation);
        let mission = h.mission(creator, Reward::xp(100), 1).await;

        let claim = h.container.claims.create_claim(mission.id, agent).await.unwrap();
        let outcome = h
            .container
            .claims
            .submit_proof(claim.id, agent, proof())
            .await
            .unwrap();

        let audit = outcome.audit.expect("submission audited");
        assert_eq!(audit.trigger, AuditTrigger::Random);
        assert_eq!(audit.verdict, AuditVerdict::Pending);
        assert_eq!(outcome.claim.status, ClaimStatus::Submitted);
        assert_eq!(h.xp(agent), 0);
        let held = h.container.missions.get(mission.id).unwrap();
        assert_eq!(held.status, MissionStatus::Active);
        assert_eq!(held.reserved_claims, 1);
        assert_eq!(held.current_claims, 0);

        let resolved = h.container.audits.reject(audit.id, reviewer, "fraud").await.unwrap();
        assert_eq!(resolved.audit.verdict, AuditVerdict::Rejected);
        assert_eq!(resolved.claim.status, ClaimStatus::Pending);
        assert_eq!(h.xp(agent), 0);
        assert_eq!(h.tier(agent), TrustTier::Blacklist);
        let change = resolved.tier_change.expect("tier moved");
        assert_eq!((change.from, change.to), (TrustTier::Probation, TrustTier::Blacklist));
        assert_eq!(h.container.ledger.agent(agent).unwrap().fraud_flags, 1);

        // Slot is kept across the rejection.
        assert_eq!(
            h.container.missions.get(mission.id).unwrap().reserved_claims,
            1
        );
    }

    #[tokio::test]
    async fn test_blacklisted_agent_is_always_audited() {
        let h = Harness::seeded(seed_where(|draw| draw > 0.99));
        let creator = h.funded_agent(0);
        let agent = h.agent(TrustTier::Blacklist);
        let mission = h.mission(creator, Reward::xp(10), 1).await;

        let claim = h.container.claims.create_claim(mission.id, agent).await.unwrap();
        let outcome = h
            .container
            .claims
            .submit_proof(claim.id, agent, proof())
            .await
            .unwrap();
        assert!(outcome.audit.is_some());
    }

    // =========================================================================
    // SCENARIO 4: EXHAUSTED MISSION
    // =========================================================================

    #[tokio::test]
    async fn test_second_agent_conflicts_on_exhausted_mission() {
        let h = Harness::seeded(0);
        let creator = h.funded_agent(0);
        let first = h.agent(TrustTier::Normal);
        let second = h.agent(TrustTier::Normal);
        let mission = h.mission(creator, Reward::xp(100), 1).await;

        h.container.claims.create_claim(mission.id, first).await.unwrap();
        let err = h
            .container
            .claims
            .create_claim(mission.id, second)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(
            err,
            ClaimError::Mission(MissionError::CapacityExceeded(mission.id))
        );
        assert!(h.container.claims.claims_for_agent(second).is_empty());
    }

    // =========================================================================
    // SUPPLEMENTARY FLOWS
    // =========================================================================

    #[tokio::test]
    async fn test_custom_mission_review_and_manual_audit() {
        let h = Harness::seeded(0);
        let admin = h.agent(TrustTier::Trusted);
        let creator = h.funded_agent(1_000);
        let agent = h.agent(TrustTier::Trusted);

        let mission = h
            .container
            .missions
            .create(MissionSpec {
                creator,
                title: "Record a product walkthrough".into(),
                description: "Two minute screen recording of onboarding".into(),
                kind: MissionKind::Custom {
                    instructions: "Upload the video and link it".into(),
                },
                reward: Reward::new(50, 200),
                max_claims: 2,
                expires_at: None,
            })
            .await
            .unwrap();
        assert_eq!(mission.status, MissionStatus::PendingReview);
        assert_eq!(h.usd(creator), 600);

        let err = h
            .container
            .claims
            .create_claim(mission.id, agent)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        h.container.missions.approve_review(mission.id, admin).await.unwrap();
        let claim = h.container.claims.create_claim(mission.id, agent).await.unwrap();
        let outcome = h
            .container
            .claims
            .submit_proof(claim.id, agent, ProofRef::new("https://video.example/w/1"))
            .await
            .unwrap();
        let audit = outcome.audit.expect("custom missions are always reviewed");
        assert_eq!(audit.trigger, AuditTrigger::Manual);
        assert_eq!(
            h.container.audits.next(Some(AuditTrigger::Manual)).unwrap().id,
            audit.id
        );

        let approved = h
            .container
            .audits
            .approve(audit.id, admin, "walkthrough is complete")
            .await
            .unwrap();
        assert_eq!(approved.claim.status, ClaimStatus::Verified);
        assert_eq!(h.xp(agent), 50);
        assert_eq!(h.usd(agent), 200);
        assert!(!approved.mission_completed);
    }

    #[tokio::test]
    async fn test_three_distinct_flags_pause_mission() {
        let h = Harness::seeded(0);
        let creator = h.funded_agent(0);
        let mission = h.mission(creator, Reward::xp(10), 5).await;
        let flaggers: Vec<_> = (0..3).map(|_| h.agent(TrustTier::Normal)).collect();

        let first = h
            .container
            .missions
            .flag(mission.id, flaggers[0], "misleading")
            .await
            .unwrap();
        assert!(!first.paused);

        let duplicate = h
            .container
            .missions
            .flag(mission.id, flaggers[0], "still misleading")
            .await
            .unwrap_err();
        assert_eq!(duplicate.kind(), ErrorKind::Conflict);

        let second = h
            .container
            .missions
            .flag(mission.id, flaggers[1], "spam")
            .await
            .unwrap();
        assert!(!second.paused);
        assert_eq!(
            h.container.missions.get(mission.id).unwrap().status,
            MissionStatus::Active
        );

        let third = h
            .container
            .missions
            .flag(mission.id, flaggers[2], "scam link")
            .await
            .unwrap();
        assert!(third.paused);
        assert_eq!(third.flag_count, 3);
        assert_eq!(
            h.container.missions.get(mission.id).unwrap().status,
            MissionStatus::Paused
        );

        let latecomer = h.agent(TrustTier::Normal);
        let err = h
            .container
            .claims
            .create_claim(mission.id, latecomer)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_cancel_refunds_and_closes_live_claims() {
        let h = Harness::seeded(seed_where(|draw| draw >= 0.10));
        let creator = h.funded_agent(1_000);
        let mission = h.mission(creator, Reward::new(5, 100), 4).await;
        assert_eq!(h.usd(creator), 600);

        let paid = h.agent(TrustTier::Normal);
        let waiting = h.agent(TrustTier::Normal);
        let claim = h.container.claims.create_claim(mission.id, paid).await.unwrap();
        h.container
            .claims
            .submit_proof(claim.id, paid, proof())
            .await
            .unwrap();
        let open = h.container.claims.create_claim(mission.id, waiting).await.unwrap();

        let (cancelled, closed) = h
            .container
            .claims
            .cancel_mission(mission.id, MissionActor::Creator(creator), "campaign ended")
            .await
            .unwrap();
        assert_eq!(cancelled.status, MissionStatus::Cancelled);
        assert_eq!(closed, vec![open.id]);
        assert_eq!(h.usd(paid), 100);
        // Three unearned completions come back.
        assert_eq!(h.usd(creator), 900);
        assert_eq!(
            h.container.claims.claim(open.id).unwrap().status,
            ClaimStatus::Rejected
        );
    }

    #[tokio::test]
    async fn test_automated_rejection_without_fraud_keeps_tier() {
        let h = Harness::seeded(seed_where(|draw| draw < 0.10));
        let creator = h.funded_agent(0);
        let agent = h.agent(TrustTier::Normal);
        let mission = h.mission(creator, Reward::xp(10), 1).await;
        let claim = h.container.claims.create_claim(mission.id, agent).await.unwrap();
        let audit = h
            .container
            .claims
            .submit_proof(claim.id, agent, proof())
            .await
            .unwrap()
            .audit
            .unwrap();

        let outcome = h
            .container
            .audits
            .auto_resolve(audit.id, Decision::Reject, "screenshot is cropped")
            .await
            .unwrap();
        assert_eq!(outcome.claim.status, ClaimStatus::Pending);
        assert!(outcome.tier_change.is_none());
        assert_eq!(h.tier(agent), TrustTier::Normal);
        assert_eq!(
            outcome.claim.last_rejection.as_deref(),
            Some("screenshot is cropped")
        );
    }
}
