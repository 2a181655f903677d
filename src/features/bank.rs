use super::account::{Account, AccountId, Username};
use super::notifier::{LogNotifier, Notification, Notifier};
use super::store::Store;
use rust_decimal::prelude::*;
use std::collections::btree_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Youngest age allowed to open an account
pub const MINIMUM_AGE: u32 = 18;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    #[error("Invalid account number: {0} is not ten digits long")]
    InvalidAccountNumber(u64),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User is under 18 (age {0})")]
    UnderageUser(u32),

    #[error("Account already exists: {0}")]
    AccountAlreadyExists(AccountId),

    #[error("Account not found: {0}")]
    AccountNotFound(u64),

    #[error("Unauthorized access: {username} does not own account {account}")]
    Unauthorized { username: String, account: AccountId },

    #[error("Invalid amount, must be positive: {0}")]
    InvalidAmount(Decimal),

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },
}

pub type BankResult<T> = Result<T, BankError>;

/// In-memory ledger of accounts owned by registered users
///
/// Every operation runs its whole validation chain before touching a balance,
/// so a failed call never leaves a partial update behind.
#[derive(Debug)]
pub struct Bank<N = LogNotifier> {
    store: Store,
    notifier: N,
}

impl Bank<LogNotifier> {
    /// Creates a bank that reports successful operations to the log
    pub fn new<U>(
        accounts: impl IntoIterator<Item = Account>,
        usernames: impl IntoIterator<Item = U>,
    ) -> BankResult<Self>
    where
        U: Into<Username>,
    {
        Self::with_notifier(accounts, usernames, LogNotifier)
    }
}

impl<N: Notifier> Bank<N> {
    /// Creates a bank from pre-seeded state.
    ///
    /// Seed accounts must satisfy the same invariants as created ones: the owner
    /// is registered, the id is unique and the balance is not negative.
    pub fn with_notifier<U>(
        accounts: impl IntoIterator<Item = Account>,
        usernames: impl IntoIterator<Item = U>,
        notifier: N,
    ) -> BankResult<Self>
    where
        U: Into<Username>,
    {
        let mut store = Store::new(usernames.into_iter().map(Into::into));

        for account in accounts {
            if !store.is_registered(account.owner().as_str()) {
                return Err(BankError::UserNotFound(account.owner().to_string()));
            }
            if account.balance() < Decimal::ZERO {
                return Err(BankError::InvalidAmount(account.balance()));
            }
            match store.accounts.entry(account.id()) {
                Entry::Vacant(v) => {
                    v.insert(account);
                }
                Entry::Occupied(o) => return Err(BankError::AccountAlreadyExists(*o.key())),
            }
        }

        debug!(
            "bank seeded with {} accounts and {} users",
            store.accounts.len(),
            store.usernames.len()
        );
        Ok(Self { store, notifier })
    }

    /// Opens a new account with a zero balance and returns a snapshot of it
    pub fn create_account(
        &mut self,
        username: &str,
        age: u32,
        account_number: u64,
    ) -> BankResult<Account> {
        let id = AccountId::parse(account_number)?;
        self.check_registered(username)?;
        if age < MINIMUM_AGE {
            return Err(BankError::UnderageUser(age));
        }

        match self.store.accounts.entry(id) {
            Entry::Occupied(_) => Err(BankError::AccountAlreadyExists(id)),
            Entry::Vacant(v) => {
                let account = v.insert(Account::open(id, username.into()));
                debug!("account {id} opened for {username}");
                Ok(account.clone())
            }
        }
    }

    /// Adds `amount` to the account and returns the new balance
    pub fn deposit(
        &mut self,
        username: &str,
        account_number: u64,
        amount: Decimal,
    ) -> BankResult<Decimal> {
        let account = Self::authorized_mut(&mut self.store, username, account_number)?;
        ensure_positive(amount)?;

        let balance = account.credit(amount)?;
        self.notifier.notify(&Notification::Deposit {
            account: account.id(),
            balance,
        });
        Ok(balance)
    }

    /// Takes `amount` from the account and returns the new balance
    pub fn withdraw(
        &mut self,
        username: &str,
        account_number: u64,
        amount: Decimal,
    ) -> BankResult<Decimal> {
        let account = Self::authorized_mut(&mut self.store, username, account_number)?;
        ensure_positive(amount)?;

        let balance = account.debit(amount)?;
        self.notifier.notify(&Notification::Withdrawal {
            account: account.id(),
            balance,
        });
        Ok(balance)
    }

    pub fn get_balance(&self, username: &str, account_number: u64) -> BankResult<Decimal> {
        let account = Self::authorized(&self.store, username, account_number)?;

        let balance = account.balance();
        self.notifier.notify(&Notification::BalanceCheck {
            account: account.id(),
            balance,
        });
        Ok(balance)
    }

    /// Whether the account with this number exists and belongs to `username`
    pub fn can_access_account(&self, username: &str, account_number: u64) -> bool {
        self.store
            .find(account_number)
            .map_or(false, |account| account.is_owned_by(username))
    }

    pub fn is_registered(&self, username: &str) -> bool {
        self.store.is_registered(username)
    }

    /// A snapshot of the account, if it exists
    pub fn account(&self, account_number: u64) -> Option<Account> {
        self.store.find(account_number).cloned()
    }

    /// All accounts ordered by id
    pub fn accounts(&self) -> impl Iterator<Item = &Account> + '_ {
        self.store.accounts.values()
    }

    pub fn len(&self) -> usize {
        self.store.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.accounts.is_empty()
    }

    fn check_registered(&self, username: &str) -> BankResult<()> {
        if !self.store.is_registered(username) {
            return Err(BankError::UserNotFound(username.to_owned()));
        }

        Ok(())
    }

    fn authorized<'a>(
        store: &'a Store,
        username: &str,
        account_number: u64,
    ) -> BankResult<&'a Account> {
        if !store.is_registered(username) {
            return Err(BankError::UserNotFound(username.to_owned()));
        }
        let account = store
            .find(account_number)
            .ok_or(BankError::AccountNotFound(account_number))?;
        check_owner(account, username)?;

        Ok(account)
    }

    fn authorized_mut<'a>(
        store: &'a mut Store,
        username: &str,
        account_number: u64,
    ) -> BankResult<&'a mut Account> {
        if !store.is_registered(username) {
            return Err(BankError::UserNotFound(username.to_owned()));
        }
        let account = store
            .find_mut(account_number)
            .ok_or(BankError::AccountNotFound(account_number))?;
        check_owner(account, username)?;

        Ok(account)
    }
}

fn check_owner(account: &Account, username: &str) -> BankResult<()> {
    if !account.is_owned_by(username) {
        return Err(BankError::Unauthorized {
            username: username.to_owned(),
            account: account.id(),
        });
    }

    Ok(())
}

fn ensure_positive(amount: Decimal) -> BankResult<()> {
    if amount <= Decimal::ZERO {
        return Err(BankError::InvalidAmount(amount));
    }

    Ok(())
}

/// A [`Bank`] that can be handed to several callers.
///
/// Each operation holds the lock for its whole check-then-mutate sequence.
#[derive(Debug)]
pub struct SharedBank<N = LogNotifier>(Arc<Mutex<Bank<N>>>);

impl<N> Clone for SharedBank<N> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<N: Notifier> SharedBank<N> {
    pub fn new(bank: Bank<N>) -> Self {
        Self(Arc::new(Mutex::new(bank)))
    }

    pub fn create_account(
        &self,
        username: &str,
        age: u32,
        account_number: u64,
    ) -> BankResult<Account> {
        self.lock().create_account(username, age, account_number)
    }

    pub fn deposit(
        &self,
        username: &str,
        account_number: u64,
        amount: Decimal,
    ) -> BankResult<Decimal> {
        self.lock().deposit(username, account_number, amount)
    }

    pub fn withdraw(
        &self,
        username: &str,
        account_number: u64,
        amount: Decimal,
    ) -> BankResult<Decimal> {
        self.lock().withdraw(username, account_number, amount)
    }

    pub fn get_balance(&self, username: &str, account_number: u64) -> BankResult<Decimal> {
        self.lock().get_balance(username, account_number)
    }

    pub fn account(&self, account_number: u64) -> Option<Account> {
        self.lock().account(account_number)
    }

    // operations validate before mutating, so a poisoned bank is still consistent
    fn lock(&self) -> MutexGuard<'_, Bank<N>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
