mod account;
mod bank;
mod notifier;
mod operation;
mod seed;
mod store;

pub use self::{
    account::{Account, AccountId, Username},
    bank::{Bank, BankError, BankResult, SharedBank, MINIMUM_AGE},
    notifier::{LogNotifier, Notification, Notifier},
    operation::{replay, Operation, OperationError, OperationType, Outcome, Report},
    seed::Seed,
};
