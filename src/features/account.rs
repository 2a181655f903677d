use super::bank::{BankError, BankResult};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Ten-digit account number
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[serde(try_from = "u64", into = "u64")]
pub struct AccountId(u64);

impl AccountId {
    const MIN: u64 = 1_000_000_000;
    const MAX: u64 = 9_999_999_999;

    /// Accepts only numbers whose decimal representation is exactly ten digits long.
    pub fn parse(number: u64) -> BankResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&number) {
            Ok(Self(number))
        } else {
            Err(BankError::InvalidAccountNumber(number))
        }
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for AccountId {
    type Error = BankError;

    fn try_from(number: u64) -> BankResult<Self> {
        Self::parse(number)
    }
}

impl From<AccountId> for u64 {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name a user is registered under. Trusted as given, never authenticated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Username {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Username {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for Username {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A ledger record.
///
/// Values handed out by the bank are snapshots: changing the balance is only
/// possible through [`Bank::deposit`](super::Bank::deposit) and
/// [`Bank::withdraw`](super::Bank::withdraw).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    balance: Decimal,
    #[serde(rename = "username")]
    owner: Username,
}

impl Account {
    /// Builds an account record, e.g. for seeding a bank.
    pub fn new(id: AccountId, balance: Decimal, owner: impl Into<Username>) -> Self {
        Self {
            id,
            balance,
            owner: owner.into(),
        }
    }

    pub(crate) fn open(id: AccountId, owner: Username) -> Self {
        Self {
            id,
            balance: dec!(0),
            owner,
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn owner(&self) -> &Username {
        &self.owner
    }

    pub(crate) fn is_owned_by(&self, username: &str) -> bool {
        self.owner.as_str() == username
    }

    pub(crate) fn credit(&mut self, amount: Decimal) -> BankResult<Decimal> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(BankError::InvalidAmount(amount))?;

        Ok(self.balance)
    }

    pub(crate) fn debit(&mut self, amount: Decimal) -> BankResult<Decimal> {
        if self.balance < amount {
            return Err(BankError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }

        self.balance -= amount;
        Ok(self.balance)
    }
}
