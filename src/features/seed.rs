use super::account::Account;
use super::bank::{Bank, BankResult};
use super::notifier::Notifier;
use serde::Deserialize;

/// Initial state a bank is built from
#[derive(Deserialize, Debug, Clone)]
pub struct Seed {
    pub usernames: Vec<String>,
    #[serde(default)]
    pub accounts: Vec<Account>,
}

impl Seed {
    pub fn into_bank<N: Notifier>(self, notifier: N) -> BankResult<Bank<N>> {
        Bank::with_notifier(self.accounts, self.usernames, notifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{BankError, LogNotifier};
    use rust_decimal_macros::dec;

    #[test]
    fn builds_bank_from_json() {
        let seed: Seed = serde_json::from_str(
            r#"{
                "usernames": ["user1", "user2"],
                "accounts": [
                    { "id": 1234567890, "balance": 5000, "username": "user1" },
                    { "id": 1234567891, "balance": 10000, "username": "user1" }
                ]
            }"#,
        )
        .unwrap();

        let bank = seed.into_bank(LogNotifier).unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.get_balance("user1", 1_234_567_891), Ok(dec!(10000)));
    }

    #[test]
    fn accounts_are_optional() {
        let seed: Seed = serde_json::from_str(r#"{ "usernames": ["user1"] }"#).unwrap();

        let bank = seed.into_bank(LogNotifier).unwrap();
        assert!(bank.is_empty());
        assert!(bank.is_registered("user1"));
    }

    #[test]
    fn rejects_accounts_of_unknown_users() {
        let seed: Seed = serde_json::from_str(
            r#"{
                "usernames": ["user1"],
                "accounts": [{ "id": 1234567890, "balance": 1, "username": "user9" }]
            }"#,
        )
        .unwrap();

        assert_eq!(
            seed.into_bank(LogNotifier).unwrap_err(),
            BankError::UserNotFound("user9".into())
        );
    }
}
