use std::collections::{BTreeMap, BTreeSet};

use super::account::{Account, AccountId, Username};

/// This keeps track of the registered usernames and the accounts indexed by id
#[derive(Debug, Default)]
pub(crate) struct Store {
    pub(crate) accounts: BTreeMap<AccountId, Account>,
    pub(crate) usernames: BTreeSet<Username>,
}

impl Store {
    pub(crate) fn new(usernames: impl IntoIterator<Item = Username>) -> Self {
        Self {
            accounts: BTreeMap::new(),
            usernames: usernames.into_iter().collect(),
        }
    }

    pub(crate) fn is_registered(&self, username: &str) -> bool {
        self.usernames.contains(username)
    }

    /// Looks an account up by number; anything that is not a valid id cannot be stored
    pub(crate) fn find(&self, number: u64) -> Option<&Account> {
        let id = AccountId::parse(number).ok()?;
        self.accounts.get(&id)
    }

    pub(crate) fn find_mut(&mut self, number: u64) -> Option<&mut Account> {
        let id = AccountId::parse(number).ok()?;
        self.accounts.get_mut(&id)
    }
}
