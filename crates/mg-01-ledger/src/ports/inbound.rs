//! Inbound port: the balance operations other subsystems call.

use crate::domain::{
    Agent, AgentId, Currency, Ledger, LedgerAction, LedgerError, TransactionId, TxRefs,
};

/// Object-safe balance API.
///
/// Mission funding and refunds go through this port so the mission store
/// can be exercised against a substitute ledger.
pub trait LedgerApi: Send + Sync {
    /// Snapshot of an agent account.
    fn agent(&self, agent: AgentId) -> Result<Agent, LedgerError>;

    /// Current balance in one currency.
    fn balance(&self, agent: AgentId, currency: Currency) -> Result<u64, LedgerError>;

    /// Credit a positive amount.
    fn credit(
        &self,
        agent: AgentId,
        currency: Currency,
        amount: u64,
        action: LedgerAction,
        refs: TxRefs,
    ) -> Result<TransactionId, LedgerError>;

    /// Debit a positive amount.
    fn debit(
        &self,
        agent: AgentId,
        currency: Currency,
        amount: u64,
        action: LedgerAction,
        refs: TxRefs,
    ) -> Result<TransactionId, LedgerError>;
}

impl LedgerApi for Ledger {
    fn agent(&self, agent: AgentId) -> Result<Agent, LedgerError> {
        Ledger::agent(self, agent)
    }

    fn balance(&self, agent: AgentId, currency: Currency) -> Result<u64, LedgerError> {
        Ledger::balance(self, agent, currency)
    }

    fn credit(
        &self,
        agent: AgentId,
        currency: Currency,
        amount: u64,
        action: LedgerAction,
        refs: TxRefs,
    ) -> Result<TransactionId, LedgerError> {
        Ledger::credit(self, agent, currency, amount, action, refs)
    }

    fn debit(
        &self,
        agent: AgentId,
        currency: Currency,
        amount: u64,
        action: LedgerAction,
        refs: TxRefs,
    ) -> Result<TransactionId, LedgerError> {
        Ledger::debit(self, agent, currency, amount, action, refs)
    }
}
