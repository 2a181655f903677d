//! In-memory bank ledger.
//!
//! A [`Bank`] holds a registry of usernames and the accounts they own. Accounts
//! are opened with [`Bank::create_account`] and their balances only ever change
//! through [`Bank::deposit`] and [`Bank::withdraw`]. Every failure is reported
//! as a [`BankError`]; successful deposits, withdrawals and balance checks are
//! reported to a [`Notifier`].
//!
//! ```
//! use bank_ledger::{Account, AccountId, Bank, BankError};
//! use rust_decimal_macros::dec;
//!
//! let id = AccountId::parse(1234567890)?;
//! let mut bank = Bank::new([Account::new(id, dec!(5000), "user1")], ["user1", "user2"])?;
//!
//! assert_eq!(bank.deposit("user1", 1234567890, dec!(500))?, dec!(5500));
//! assert_eq!(bank.withdraw("user1", 1234567890, dec!(500))?, dec!(5000));
//! assert!(matches!(
//!     bank.deposit("user2", 1234567890, dec!(1)),
//!     Err(BankError::Unauthorized { .. })
//! ));
//! # Ok::<(), BankError>(())
//! ```

#[macro_use]
extern crate log;

pub mod features;

pub use features::*;
