//! # Ledger
//!
//! Per-agent accounts guarded by their own mutex. A journal entry and the
//! cached balance it affects are written under the same guard.

use super::entities::*;
use super::errors::LedgerError;
use dashmap::DashMap;
use parking_lot::Mutex;
use shared_types::TimeSource;
use std::sync::Arc;
use tracing::{debug, info};

/// Internal account state: snapshot fields plus the append-only logs.
#[derive(Debug)]
struct Account {
    agent: Agent,
    journal: Vec<Transaction>,
    tier_history: Vec<TierChange>,
}

impl Account {
    /// Check that a signed posting can be applied without going negative
    /// or overflowing.
    fn check(&self, currency: Currency, amount: i64) -> Result<(), LedgerError> {
        let balance = self.agent.balance(currency);
        if amount >= 0 {
            balance
                .checked_add(amount.unsigned_abs())
                .ok_or(LedgerError::BalanceOverflow {
                    agent: self.agent.id,
                    currency,
                })?;
        } else if balance < amount.unsigned_abs() {
            return Err(LedgerError::InsufficientFunds {
                agent: self.agent.id,
                currency,
                required: amount.unsigned_abs(),
                available: balance,
            });
        }
        Ok(())
    }

    /// Apply a posting already validated by `check`.
    fn post(
        &mut self,
        currency: Currency,
        amount: i64,
        action: LedgerAction,
        refs: TxRefs,
        now: Timestamp,
    ) -> TransactionId {
        let slot = match currency {
            Currency::Xp => &mut self.agent.xp_balance,
            Currency::Usd => &mut self.agent.usd_balance,
        };
        if amount >= 0 {
            *slot += amount.unsigned_abs();
        } else {
            *slot -= amount.unsigned_abs();
        }
        let id = TransactionId::new();
        self.journal.push(Transaction {
            id,
            agent: self.agent.id,
            amount,
            currency,
            action,
            refs,
            timestamp: now,
        });
        id
    }

    fn journal_sum(&self, currency: Currency) -> i128 {
        self.journal
            .iter()
            .filter(|tx| tx.currency == currency)
            .map(|tx| i128::from(tx.amount))
            .sum()
    }
}

fn signed(agent: AgentId, currency: Currency, amount: u64) -> Result<i64, LedgerError> {
    i64::try_from(amount).map_err(|_| LedgerError::BalanceOverflow { agent, currency })
}

/// The agent ledger.
pub struct Ledger {
    accounts: DashMap<AgentId, Arc<Mutex<Account>>>,
    clock: Arc<dyn TimeSource>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            accounts: DashMap::new(),
            clock,
        }
    }

    fn account(&self, agent: AgentId) -> Result<Arc<Mutex<Account>>, LedgerError> {
        // Clone the Arc out so the shard guard is released before locking.
        self.accounts
            .get(&agent)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(LedgerError::AgentNotFound(agent))
    }

    /// Register a new agent with zero balances.
    pub fn register_agent(&self, agent: AgentId, tier: TrustTier) -> Result<Agent, LedgerError> {
        let now = self.clock.now();
        let snapshot = Agent {
            id: agent,
            xp_balance: 0,
            usd_balance: 0,
            tier,
            fraud_flags: 0,
            total_claims: 0,
            verified_claims: 0,
            probation_expires_at: None,
            created_at: now,
        };
        match self.accounts.entry(agent) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(LedgerError::AgentExists(agent)),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(Account {
                    agent: snapshot.clone(),
                    journal: Vec::new(),
                    tier_history: Vec::new(),
                })));
                info!("[mg-01] Registered agent {} at tier {}", agent, tier);
                Ok(snapshot)
            }
        }
    }

    /// Whether an account exists.
    #[must_use]
    pub fn contains(&self, agent: AgentId) -> bool {
        self.accounts.contains_key(&agent)
    }

    /// Number of registered agents.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.accounts.len()
    }

    /// Snapshot of an agent account.
    pub fn agent(&self, agent: AgentId) -> Result<Agent, LedgerError> {
        Ok(self.account(agent)?.lock().agent.clone())
    }

    /// Current balance in one currency.
    pub fn balance(&self, agent: AgentId, currency: Currency) -> Result<u64, LedgerError> {
        Ok(self.account(agent)?.lock().agent.balance(currency))
    }

    /// Credit a positive amount.
    pub fn credit(
        &self,
        agent: AgentId,
        currency: Currency,
        amount: u64,
        action: LedgerAction,
        refs: TxRefs,
    ) -> Result<TransactionId, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let signed = signed(agent, currency, amount)?;
        let account = self.account(agent)?;
        let mut account = account.lock();
        account.check(currency, signed)?;
        let id = account.post(currency, signed, action, refs, self.clock.now());
        debug!(
            "[mg-01] Credit {} {} to {} ({})",
            amount,
            currency,
            agent,
            action.as_str()
        );
        Ok(id)
    }

    /// Debit a positive amount; fails rather than going negative.
    pub fn debit(
        &self,
        agent: AgentId,
        currency: Currency,
        amount: u64,
        action: LedgerAction,
        refs: TxRefs,
    ) -> Result<TransactionId, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let signed = -signed(agent, currency, amount)?;
        let account = self.account(agent)?;
        let mut account = account.lock();
        account.check(currency, signed)?;
        let id = account.post(currency, signed, action, refs, self.clock.now());
        debug!(
            "[mg-01] Debit {} {} from {} ({})",
            amount,
            currency,
            agent,
            action.as_str()
        );
        Ok(id)
    }

    /// Pay a claim reward: credits each non-zero currency part and bumps
    /// `verified_claims` as one unit. Nothing is applied if any part fails.
    pub fn credit_reward(
        &self,
        agent: AgentId,
        reward: Reward,
        refs: TxRefs,
    ) -> Result<Vec<TransactionId>, LedgerError> {
        let parts: Vec<(Currency, i64)> = [Currency::Xp, Currency::Usd]
            .into_iter()
            .filter(|c| reward.amount(*c) > 0)
            .map(|c| signed(agent, c, reward.amount(c)).map(|a| (c, a)))
            .collect::<Result<_, _>>()?;

        let account = self.account(agent)?;
        let mut account = account.lock();
        for (currency, amount) in &parts {
            account.check(*currency, *amount)?;
        }
        let now = self.clock.now();
        let ids = parts
            .into_iter()
            .map(|(currency, amount)| {
                account.post(currency, amount, LedgerAction::ClaimReward, refs, now)
            })
            .collect();
        account.agent.verified_claims += 1;
        debug!(
            "[mg-01] Reward {} XP / {} cents paid to {}",
            reward.xp, reward.usd_cents, agent
        );
        Ok(ids)
    }

    /// Count a newly opened claim against the agent.
    pub fn record_claim_opened(&self, agent: AgentId) -> Result<u64, LedgerError> {
        let account = self.account(agent)?;
        let mut account = account.lock();
        account.agent.total_claims += 1;
        Ok(account.agent.total_claims)
    }

    /// Record one fraud signal; returns the new count.
    pub fn record_fraud_flag(&self, agent: AgentId) -> Result<u32, LedgerError> {
        let account = self.account(agent)?;
        let mut account = account.lock();
        account.agent.fraud_flags = account.agent.fraud_flags.saturating_add(1);
        Ok(account.agent.fraud_flags)
    }

    /// Decide and apply a tier change under the account lock.
    ///
    /// `decide` sees the current snapshot and returns the update to apply,
    /// or `None` to leave the tier alone. Returns the applied change.
    pub fn update_tier<E, F>(&self, agent: AgentId, decide: F) -> Result<Option<TierChange>, E>
    where
        E: From<LedgerError>,
        F: FnOnce(&Agent) -> Result<Option<TierUpdate>, E>,
    {
        let account = self.account(agent)?;
        let mut account = account.lock();
        let Some(update) = decide(&account.agent)? else {
            return Ok(None);
        };
        if update.reason.trim().is_empty() {
            return Err(LedgerError::MissingReason(agent).into());
        }
        let change = TierChange {
            agent,
            from: account.agent.tier,
            to: update.to,
            reason: update.reason,
            actor: update.actor,
            at: self.clock.now(),
        };
        account.agent.tier = update.to;
        account.agent.probation_expires_at = if update.to == TrustTier::Probation {
            update.probation_until
        } else {
            None
        };
        account.tier_history.push(change.clone());
        info!(
            "[mg-01] Tier change for {}: {} -> {} ({})",
            agent, change.from, change.to, change.reason
        );
        Ok(Some(change))
    }

    /// Apply an already-decided tier change.
    pub fn apply_tier_change(
        &self,
        agent: AgentId,
        update: TierUpdate,
    ) -> Result<TierChange, LedgerError> {
        self.update_tier::<LedgerError, _>(agent, |_| Ok(Some(update)))?
            .ok_or(LedgerError::AgentNotFound(agent))
    }

    /// Transactions posted for an agent, oldest first.
    pub fn transactions(&self, agent: AgentId) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.account(agent)?.lock().journal.clone())
    }

    /// Tier history for an agent, oldest first.
    pub fn tier_history(&self, agent: AgentId) -> Result<Vec<TierChange>, LedgerError> {
        Ok(self.account(agent)?.lock().tier_history.clone())
    }

    /// Agents whose probation ended at or before `now`.
    #[must_use]
    pub fn expired_probations(&self, now: Timestamp) -> Vec<AgentId> {
        let accounts: Vec<_> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        accounts
            .into_iter()
            .filter_map(|account| {
                let account = account.lock();
                let due = account.agent.tier == TrustTier::Probation
                    && account
                        .agent
                        .probation_expires_at
                        .is_some_and(|until| until <= now);
                due.then_some(account.agent.id)
            })
            .collect()
    }

    /// Whether cached balances equal the journal sums for an agent.
    pub fn verify_balances(&self, agent: AgentId) -> Result<bool, LedgerError> {
        let account = self.account(agent)?;
        let account = account.lock();
        Ok([Currency::Xp, Currency::Usd].into_iter().all(|currency| {
            account.journal_sum(currency) == i128::from(account.agent.balance(currency))
        }))
    }

    /// Total balance held across all agents in one currency.
    #[must_use]
    pub fn total_balance(&self, currency: Currency) -> u128 {
        let accounts: Vec<_> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        accounts
            .into_iter()
            .map(|account| {
                let balance = account.lock().agent.balance(currency);
                u128::from(balance)
            })
            .sum()
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("agents", &self.accounts.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ManualClock;
    use std::thread;

    fn ledger() -> (Ledger, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000));
        (Ledger::new(clock.clone()), clock)
    }

    #[test]
    fn test_register_twice_conflicts() {
        let (ledger, _) = ledger();
        let agent = AgentId::new();
        ledger.register_agent(agent, TrustTier::Normal).unwrap();
        assert_eq!(
            ledger.register_agent(agent, TrustTier::Trusted),
            Err(LedgerError::AgentExists(agent))
        );
        assert_eq!(ledger.agent(agent).unwrap().tier, TrustTier::Normal);
    }

    #[test]
    fn test_credit_and_debit() {
        let (ledger, _) = ledger();
        let agent = AgentId::new();
        ledger.register_agent(agent, TrustTier::Normal).unwrap();
        ledger
            .credit(
                agent,
                Currency::Usd,
                1_000,
                LedgerAction::AdminAdjustment,
                TxRefs::none(),
            )
            .unwrap();
        ledger
            .debit(
                agent,
                Currency::Usd,
                400,
                LedgerAction::Withdrawal,
                TxRefs::none(),
            )
            .unwrap();
        assert_eq!(ledger.balance(agent, Currency::Usd).unwrap(), 600);
        let txs = ledger.transactions(agent).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[1].amount, -400);
        assert!(ledger.verify_balances(agent).unwrap());
    }

    #[test]
    fn test_debit_cannot_go_negative() {
        let (ledger, _) = ledger();
        let agent = AgentId::new();
        ledger.register_agent(agent, TrustTier::Normal).unwrap();
        let err = ledger
            .debit(
                agent,
                Currency::Xp,
                1,
                LedgerAction::Withdrawal,
                TxRefs::none(),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert!(ledger.transactions(agent).unwrap().is_empty());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let (ledger, _) = ledger();
        let agent = AgentId::new();
        ledger.register_agent(agent, TrustTier::Normal).unwrap();
        assert_eq!(
            ledger.credit(
                agent,
                Currency::Xp,
                0,
                LedgerAction::AdminAdjustment,
                TxRefs::none()
            ),
            Err(LedgerError::ZeroAmount)
        );
    }

    #[test]
    fn test_unknown_agent() {
        let (ledger, _) = ledger();
        let agent = AgentId::new();
        assert_eq!(
            ledger.balance(agent, Currency::Xp),
            Err(LedgerError::AgentNotFound(agent))
        );
    }

    #[test]
    fn test_credit_reward_posts_both_parts() {
        let (ledger, _) = ledger();
        let agent = AgentId::new();
        ledger.register_agent(agent, TrustTier::Normal).unwrap();
        let refs = TxRefs::claim(MissionId::new(), ClaimId::new());
        let ids = ledger
            .credit_reward(agent, Reward::new(50, 250), refs)
            .unwrap();
        assert_eq!(ids.len(), 2);
        let snapshot = ledger.agent(agent).unwrap();
        assert_eq!(snapshot.xp_balance, 50);
        assert_eq!(snapshot.usd_balance, 250);
        assert_eq!(snapshot.verified_claims, 1);
        assert!(ledger
            .transactions(agent)
            .unwrap()
            .iter()
            .all(|tx| tx.action == LedgerAction::ClaimReward && tx.refs == refs));
    }

    #[test]
    fn test_credit_reward_xp_only() {
        let (ledger, _) = ledger();
        let agent = AgentId::new();
        ledger.register_agent(agent, TrustTier::Normal).unwrap();
        let ids = ledger
            .credit_reward(agent, Reward::xp(10), TxRefs::none())
            .unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(ledger.balance(agent, Currency::Usd).unwrap(), 0);
    }

    #[test]
    fn test_update_tier_records_history() {
        let (ledger, clock) = ledger();
        let agent = AgentId::new();
        ledger.register_agent(agent, TrustTier::Normal).unwrap();
        clock.advance(500);
        let change = ledger
            .update_tier::<LedgerError, _>(agent, |current| {
                assert_eq!(current.tier, TrustTier::Normal);
                Ok(Some(TierUpdate {
                    to: TrustTier::Probation,
                    reason: "fraud".into(),
                    actor: TierActor::System,
                    probation_until: Some(10_000),
                }))
            })
            .unwrap()
            .unwrap();
        assert_eq!(change.from, TrustTier::Normal);
        assert_eq!(change.at, 1_500);
        let snapshot = ledger.agent(agent).unwrap();
        assert_eq!(snapshot.probation_expires_at, Some(10_000));
        assert_eq!(ledger.tier_history(agent).unwrap().len(), 1);
        assert!(ledger.expired_probations(9_999).is_empty());
        assert_eq!(ledger.expired_probations(10_000), vec![agent]);
    }

    #[test]
    fn test_update_tier_requires_reason() {
        let (ledger, _) = ledger();
        let agent = AgentId::new();
        ledger.register_agent(agent, TrustTier::Normal).unwrap();
        let result = ledger.update_tier::<LedgerError, _>(agent, |_| {
            Ok(Some(TierUpdate {
                to: TrustTier::Trusted,
                reason: "  ".into(),
                actor: TierActor::Admin(AgentId::new()),
                probation_until: None,
            }))
        });
        assert_eq!(result, Err(LedgerError::MissingReason(agent)));
        assert_eq!(ledger.agent(agent).unwrap().tier, TrustTier::Normal);
    }

    #[test]
    fn test_apply_tier_change_by_admin() {
        let (ledger, _) = ledger();
        let agent = AgentId::new();
        let admin = AgentId::new();
        ledger.register_agent(agent, TrustTier::Probation).unwrap();
        let change = ledger
            .apply_tier_change(
                agent,
                TierUpdate {
                    to: TrustTier::Trusted,
                    reason: "long track record".into(),
                    actor: TierActor::Admin(admin),
                    probation_until: None,
                },
            )
            .unwrap();
        assert_eq!(change.from, TrustTier::Probation);
        assert_eq!(change.actor, TierActor::Admin(admin));
        assert_eq!(ledger.agent(agent).unwrap().tier, TrustTier::Trusted);
    }

    #[test]
    fn test_update_tier_noop() {
        let (ledger, _) = ledger();
        let agent = AgentId::new();
        ledger.register_agent(agent, TrustTier::Normal).unwrap();
        let result = ledger
            .update_tier::<LedgerError, _>(agent, |_| Ok(None))
            .unwrap();
        assert!(result.is_none());
        assert!(ledger.tier_history(agent).unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_debits_never_overdraw() {
        let (ledger, _) = ledger();
        let ledger = Arc::new(ledger);
        let agent = AgentId::new();
        ledger.register_agent(agent, TrustTier::Normal).unwrap();
        ledger
            .credit(
                agent,
                Currency::Usd,
                100,
                LedgerAction::AdminAdjustment,
                TxRefs::none(),
            )
            .unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    ledger
                        .debit(
                            agent,
                            Currency::Usd,
                            10,
                            LedgerAction::Withdrawal,
                            TxRefs::none(),
                        )
                        .is_ok()
                })
            })
            .collect();
        let succeeded = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(succeeded, 10);
        assert_eq!(ledger.balance(agent, Currency::Usd).unwrap(), 0);
        assert!(ledger.verify_balances(agent).unwrap());
    }
}
