//! # Property Suites
//!
//! Randomized operation sequences against the wired container:
//!
//! - USD is conserved: agent balances plus unreleased escrow never change
//! - audit sampling never favours a less trusted tier
//! - a mission pauses exactly when it has three distinct flaggers

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::integration::harness::Harness;
    use mg_02_trust_policy::{SeededRandom, TrustPolicy, TrustPolicyConfig};
    use mg_04_mission_store::{MissionActor, MissionStatus};
    use mg_05_claim_engine::{ClaimStatus, ProofRef};
    use proptest::prelude::*;
    use shared_types::{Reward, TimeSource, TrustTier, DAY_MS};

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    // =========================================================================
    // ESCROW CONSERVATION
    // =========================================================================

    #[derive(Debug, Clone)]
    enum Op {
        Claim { agent: usize, mission: usize },
        Submit { agent: usize, mission: usize },
        Review { approve: bool },
        Expire,
        Cancel { mission: usize },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0..4usize, 0..2usize).prop_map(|(agent, mission)| Op::Claim { agent, mission }),
            4 => (0..4usize, 0..2usize).prop_map(|(agent, mission)| Op::Submit { agent, mission }),
            2 => any::<bool>().prop_map(|approve| Op::Review { approve }),
            1 => Just(Op::Expire),
            1 => (0..2usize).prop_map(|mission| Op::Cancel { mission }),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_usd_is_conserved(seed in any::<u64>(), ops in prop::collection::vec(op(), 1..40)) {
            block_on(async move {
                let h = Harness::unthrottled(seed);
                let creator = h.funded_agent(10_000);
                let reviewer = h.agent(TrustTier::Trusted);
                let agents = [
                    h.agent(TrustTier::Trusted),
                    h.agent(TrustTier::Normal),
                    h.agent(TrustTier::Probation),
                    h.agent(TrustTier::Blacklist),
                ];
                let missions = [
                    h.mission(creator, Reward::new(5, 100), 3).await.id,
                    h.mission(creator, Reward::new(1, 250), 2).await.id,
                ];
                let total = h.usd_in_system();
                assert_eq!(total, 10_000);

                for op in ops {
                    match op {
                        Op::Claim { agent, mission } => {
                            let _ = h.container.claims.create_claim(missions[mission], agents[agent]).await;
                        }
                        Op::Submit { agent, mission } => {
                            let pending = h.container.claims.claims_where(|c| {
                                c.agent_id == agents[agent]
                                    && c.mission_id == missions[mission]
                                    && c.status == ClaimStatus::Pending
                            });
                            if let Some(claim) = pending.first() {
                                let _ = h
                                    .container
                                    .claims
                                    .submit_proof(claim.id, agents[agent], ProofRef::new("https://social.example/p"))
                                    .await;
                            }
                        }
                        Op::Review { approve } => {
                            if let Some(audit) = h.container.audits.next(None) {
                                let _ = if approve {
                                    h.container.audits.approve(audit.id, reviewer, "confirmed").await
                                } else {
                                    h.container.audits.reject(audit.id, reviewer, "blurry screenshot").await
                                };
                            }
                        }
                        Op::Expire => {
                            h.clock.advance(8 * DAY_MS);
                            h.container.claims.run_maintenance(h.clock.now()).await;
                        }
                        Op::Cancel { mission } => {
                            let _ = h
                                .container
                                .claims
                                .cancel_mission(missions[mission], MissionActor::Creator(creator), "budget moved")
                                .await;
                        }
                    }
                    assert_eq!(h.usd_in_system(), total);
                }

                for mission in h.all_missions() {
                    assert!(mission.current_claims <= mission.max_claims);
                    assert!(mission.reserved_claims <= mission.max_claims);
                }
            });
        }
    }

    // =========================================================================
    // TIER-ORDERED SAMPLING
    // =========================================================================

    fn audits_over(policy: &TrustPolicy, tier: TrustTier, seed: u64, draws: usize) -> usize {
        let rng = SeededRandom::new(seed);
        (0..draws)
            .filter(|_| policy.should_audit(tier, false, &rng).is_audit())
            .count()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_less_trusted_tiers_are_audited_at_least_as_often(
            seed in any::<u64>(),
            trusted in 0u8..=100,
            normal_gap in 0u8..=100,
            probation_gap in 0u8..=100,
        ) {
            let normal = trusted.saturating_add(normal_gap).min(100);
            let probation = normal.saturating_add(probation_gap).min(100);
            let config = TrustPolicyConfig {
                trusted_rate: trusted,
                normal_rate: normal,
                probation_rate: probation,
                ..TrustPolicyConfig::default()
            };
            let policy = TrustPolicy::new(config).unwrap();

            // Same seed per tier, so each tier sees the same draws.
            let counts: Vec<_> = [
                TrustTier::Trusted,
                TrustTier::Normal,
                TrustTier::Probation,
                TrustTier::Blacklist,
            ]
            .into_iter()
            .map(|tier| audits_over(&policy, tier, seed, 200))
            .collect();

            prop_assert!(counts.windows(2).all(|pair| pair[0] <= pair[1]));
            prop_assert_eq!(counts[3], 200);
        }
    }

    #[test]
    fn test_default_rates_order_observed_audit_share() {
        let policy = TrustPolicy::new(TrustPolicyConfig::default()).unwrap();
        let trusted = audits_over(&policy, TrustTier::Trusted, 11, 4_000);
        let normal = audits_over(&policy, TrustTier::Normal, 12, 4_000);
        let probation = audits_over(&policy, TrustTier::Probation, 13, 4_000);

        // 5%, 10% and 50% of 4000 with generous slack.
        assert!((100..=300).contains(&trusted), "trusted audited {trusted}");
        assert!((280..=520).contains(&normal), "normal audited {normal}");
        assert!((1_800..=2_200).contains(&probation), "probation audited {probation}");
    }

    // =========================================================================
    // FLAG THRESHOLD
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_mission_pauses_iff_three_distinct_flaggers(
            flaggers in prop::collection::vec(0..5usize, 0..10),
        ) {
            block_on(async move {
                let h = Harness::seeded(0);
                let creator = h.funded_agent(0);
                let agents: Vec<_> = (0..5).map(|_| h.agent(TrustTier::Normal)).collect();
                let mission = h.mission(creator, Reward::xp(10), 5).await;

                let mut seen = HashSet::new();
                let mut paused_events = 0;
                for index in flaggers {
                    let result = h.container.missions.flag(mission.id, agents[index], "looks off").await;
                    if seen.insert(index) {
                        let outcome = result.unwrap();
                        assert_eq!(outcome.flag_count, seen.len());
                        if outcome.paused {
                            paused_events += 1;
                        }
                    } else {
                        assert!(result.is_err());
                    }
                }

                let status = h.container.missions.get(mission.id).unwrap().status;
                if seen.len() >= 3 {
                    assert_eq!(status, MissionStatus::Paused);
                    assert_eq!(paused_events, 1);
                } else {
                    assert_eq!(status, MissionStatus::Active);
                    assert_eq!(paused_events, 0);
                }
            });
        }
    }
}
