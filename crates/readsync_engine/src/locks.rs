//! Per-account serialization.

use parking_lot::Mutex;
use readsync_store::AccountId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// One mutex per account, created on first use.
#[derive(Debug, Default)]
pub(crate) struct AccountLocks {
    locks: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    /// Returns the mutex guarding `id`. Callers hold its guard for the
    /// duration of the operation.
    pub fn get(&self, id: AccountId) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.lock().entry(id).or_default())
    }
}

/// Accounts with a sync currently in flight.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    accounts: Mutex<HashSet<AccountId>>,
}

impl InFlight {
    pub fn enter(&self, id: AccountId) -> InFlightGuard<'_> {
        self.accounts.lock().insert(id);
        InFlightGuard { set: self, id }
    }

    pub fn contains(&self, id: AccountId) -> bool {
        self.accounts.lock().contains(&id)
    }
}

pub(crate) struct InFlightGuard<'a> {
    set: &'a InFlight,
    id: AccountId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.accounts.lock().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_account_shares_a_lock() {
        let locks = AccountLocks::default();
        let a = locks.get(AccountId::new(1));
        let b = locks.get(AccountId::new(1));
        let c = locks.get(AccountId::new(2));

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));

        let _guard = a.lock();
        assert!(b.try_lock().is_none());
        assert!(c.try_lock().is_some());
    }

    #[test]
    fn in_flight_guard_clears_on_drop() {
        let in_flight = InFlight::default();
        {
            let _guard = in_flight.enter(AccountId::new(5));
            assert!(in_flight.contains(AccountId::new(5)));
        }
        assert!(!in_flight.contains(AccountId::new(5)));
    }
}
