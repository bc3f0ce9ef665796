//! # Concurrency Suites
//!
//! Racing callers on a multi-threaded runtime. Every test checks that the
//! per-entity locks keep the invariants a sequential run would:
//!
//! - one live claim per (mission, agent)
//! - never more reservations than `max_claims`
//! - an audit resolves exactly once, and pays at most once

#[cfg(test)]
mod tests {
    use crate::integration::harness::{seed_where, Harness};
    use futures::future::join_all;
    use mg_04_mission_store::{MissionError, MissionStatus};
    use mg_05_claim_engine::{ClaimError, ClaimStatus, Decision, ProofRef};
    use node_runtime::NodeConfig;
    use shared_types::{Reward, TrustTier};

    fn always_audit() -> Harness {
        let mut config = NodeConfig::default();
        config.trust.trusted_rate = 100;
        config.trust.normal_rate = 100;
        config.trust.probation_rate = 100;
        config.random_seed = Some(7);
        Harness::with_config(config)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_by_one_agent_yield_one_claim() {
        let h = Harness::unthrottled(0);
        let creator = h.funded_agent(0);
        let agent = h.agent(TrustTier::Normal);
        let mission = h.mission(creator, Reward::xp(10), 10).await;
        let mission_id = mission.id;

        let tasks = (0..16).map(|_| {
            let claims = h.container.claims.clone();
            tokio::spawn(async move { claims.create_claim(mission_id, agent).await })
        });
        let results: Vec<_> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().filter_map(|r| r.as_ref().err()).all(|e| {
            *e == ClaimError::DuplicateClaim {
                mission: mission.id,
                agent,
            }
        }));
        assert_eq!(h.container.claims.claims_for_mission(mission.id).len(), 1);
        assert_eq!(
            h.container.missions.get(mission.id).unwrap().reserved_claims,
            1
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_agents_never_exceed_capacity() {
        let h = Harness::unthrottled(0);
        let creator = h.funded_agent(0);
        let mission = h.mission(creator, Reward::xp(10), 10).await;
        let mission_id = mission.id;
        let agents: Vec<_> = (0..50).map(|_| h.agent(TrustTier::Normal)).collect();

        let tasks = agents.into_iter().map(|agent| {
            let claims = h.container.claims.clone();
            tokio::spawn(async move { claims.create_claim(mission_id, agent).await })
        });
        let results: Vec<_> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 10);
        assert!(results.iter().filter_map(|r| r.as_ref().err()).all(|e| {
            *e == ClaimError::Mission(MissionError::CapacityExceeded(mission.id))
        }));
        assert_eq!(
            h.container.missions.get(mission.id).unwrap().reserved_claims,
            10
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_complete_mission_exactly() {
        // Sampling off so every submission settles.
        let mut config = NodeConfig::default();
        config.trust.trusted_rate = 0;
        config.trust.normal_rate = 0;
        config.rate_limits.claims_per_hour = 1_000;
        config.rate_limits.submissions_per_hour = 1_000;
        let h = Harness::with_config(config);
        let creator = h.funded_agent(10_000);
        let mission = h.mission(creator, Reward::new(3, 50), 20).await;
        let before = h.usd_in_system();

        let mut pairs = Vec::new();
        for _ in 0..20 {
            let agent = h.agent(TrustTier::Normal);
            let claim = h.container.claims.create_claim(mission.id, agent).await.unwrap();
            pairs.push((agent, claim.id));
        }

        let tasks = pairs.iter().map(|&(agent, claim)| {
            let claims = h.container.claims.clone();
            tokio::spawn(async move {
                claims
                    .submit_proof(claim, agent, ProofRef::new("https://social.example/p"))
                    .await
            })
        });
        let results: Vec<_> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        assert_eq!(results.iter().filter(|o| o.mission_completed).count(), 1);
        let done = h.container.missions.get(mission.id).unwrap();
        assert_eq!(done.status, MissionStatus::Completed);
        assert_eq!(done.current_claims, 20);
        for (agent, _) in &pairs {
            assert_eq!(h.xp(*agent), 3);
            assert_eq!(h.usd(*agent), 50);
        }
        assert_eq!(h.usd_in_system(), before);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_double_submit_settles_once() {
        let h = Harness::seeded(seed_where(|draw| draw >= 0.10));
        let creator = h.funded_agent(0);
        let agent = h.agent(TrustTier::Normal);
        let mission = h.mission(creator, Reward::xp(25), 3).await;
        let claim_id = h.container.claims.create_claim(mission.id, agent).await.unwrap().id;

        let tasks = (0..2).map(|_| {
            let claims = h.container.claims.clone();
            tokio::spawn(async move {
                claims
                    .submit_proof(claim_id, agent, ProofRef::new("https://social.example/p"))
                    .await
            })
        });
        let results: Vec<_> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, ClaimError::InvalidTransition { .. })));
        assert_eq!(h.xp(agent), 25);
        assert_eq!(
            h.container.missions.get(mission.id).unwrap().current_claims,
            1
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_reviewers_resolve_audit_once() {
        let h = always_audit();
        let creator = h.funded_agent(1_000);
        let agent = h.agent(TrustTier::Normal);
        let mission = h.mission(creator, Reward::new(10, 100), 1).await;
        let claim = h.container.claims.create_claim(mission.id, agent).await.unwrap();
        let audit = h
            .container
            .claims
            .submit_proof(claim.id, agent, ProofRef::new("https://social.example/p"))
            .await
            .unwrap()
            .audit
            .unwrap();
        let audit_id = audit.id;
        let reviewers: Vec<_> = (0..8).map(|_| h.agent(TrustTier::Trusted)).collect();

        let tasks = reviewers.into_iter().enumerate().map(|(i, reviewer)| {
            let audits = h.container.audits.clone();
            tokio::spawn(async move {
                if i % 2 == 0 {
                    audits.approve(audit_id, reviewer, "looks right").await
                } else {
                    audits.reject(audit_id, reviewer, "wrong post").await
                }
            })
        });
        let results: Vec<_> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| *e == ClaimError::AuditAlreadyResolved(audit.id)));

        let status = h.container.claims.claim(claim.id).unwrap().status;
        match status {
            ClaimStatus::Verified => assert_eq!(h.xp(agent), 10),
            ClaimStatus::Pending => assert_eq!(h.xp(agent), 0),
            other => panic!("unexpected claim status {other}"),
        }
        assert!(h.container.audits.list_open(None).is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_review_races_hard_block() {
        let h = always_audit();
        let admin = h.agent(TrustTier::Trusted);
        let creator = h.funded_agent(1_000);
        let agent = h.agent(TrustTier::Normal);
        let mission = h.mission(creator, Reward::new(10, 100), 1).await;
        let claim = h.container.claims.create_claim(mission.id, agent).await.unwrap();
        let audit = h
            .container
            .claims
            .submit_proof(claim.id, agent, ProofRef::new("https://social.example/p"))
            .await
            .unwrap()
            .audit
            .unwrap();
        let before = h.usd_in_system();
        let (audit_id, claim_id) = (audit.id, claim.id);

        let review = {
            let audits = h.container.audits.clone();
            tokio::spawn(async move {
                audits
                    .auto_resolve(audit_id, Decision::Approve, "automated check")
                    .await
            })
        };
        let block = {
            let claims = h.container.claims.clone();
            tokio::spawn(async move { claims.reject_claim(claim_id, admin, "duplicate account").await })
        };
        let (review, block) = (review.await.unwrap(), block.await.unwrap());

        // Whichever ran second sees a settled claim or a closed audit.
        assert!(review.is_ok() != block.is_ok());
        let final_claim = h.container.claims.claim(claim_id).unwrap();
        let mission_now = h.container.missions.get(mission.id).unwrap();
        if review.is_ok() {
            assert_eq!(final_claim.status, ClaimStatus::Verified);
            assert_eq!(h.usd(agent), 100);
        } else {
            assert_eq!(final_claim.status, ClaimStatus::Rejected);
            assert_eq!(h.usd(agent), 0);
            assert_eq!(mission_now.reserved_claims, 0);
        }
        assert_eq!(h.usd_in_system(), before);
    }
}
