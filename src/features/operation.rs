use super::bank::{Bank, BankError};
use super::notifier::Notifier;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize, Serializer};
use std::io;
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Opens a new, empty account for a registered user who is at least 18
    Create,

    /// Credits a strictly positive amount to an account the user owns
    Deposit,

    /// Debits a strictly positive amount from an account the user owns.
    /// Fails without touching the balance if the account does not hold enough funds
    Withdraw,

    /// Reads the balance of an account the user owns
    Balance,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum OperationError {
    #[error(transparent)]
    Bank(#[from] BankError),

    #[error("Invalid input - missing {0}")]
    MissingField(&'static str),
}

type OperationResult<T> = Result<T, OperationError>;

/// One row of an operations batch
#[derive(Deserialize, Debug, Clone)]
pub struct Operation {
    #[serde(rename = "type")]
    operation_type: OperationType,

    #[serde(rename = "user")]
    username: String,

    /// Raw number as supplied; validated by the bank
    #[serde(rename = "account")]
    account_number: u64,

    /// Only read by deposits and withdrawals
    amount: Option<Decimal>,

    /// Only read when creating an account
    age: Option<u32>,
}

/// What a successful operation left behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub operation_type: OperationType,
    pub account_number: u64,
    pub balance: Decimal,
}

/// Output row for one applied operation, successful or not
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Report<'a> {
    #[serde(rename = "type")]
    operation_type: OperationType,

    user: &'a str,

    account: u64,

    #[serde(serialize_with = "round_serialize")]
    balance: Option<Decimal>,

    error: Option<String>,
}

fn round_serialize<S>(amount: &Option<Decimal>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match amount {
        // Serialize to 4 decimal
        Some(amount) => s.serialize_str(amount.round_dp(4).to_string().as_str()),
        None => s.serialize_none(),
    }
}

impl Operation {
    pub fn new(
        operation_type: OperationType,
        username: impl Into<String>,
        account_number: u64,
    ) -> Self {
        Self {
            operation_type,
            username: username.into(),
            account_number,
            amount: None,
            age: None,
        }
    }

    pub fn with_amount(self, amount: Decimal) -> Self {
        Self {
            amount: Some(amount),
            ..self
        }
    }

    pub fn with_age(self, age: u32) -> Self {
        Self {
            age: Some(age),
            ..self
        }
    }

    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn account_number(&self) -> u64 {
        self.account_number
    }

    /// Runs the operation against the bank
    pub fn apply<N: Notifier>(&self, bank: &mut Bank<N>) -> OperationResult<Outcome> {
        use OperationType::*;

        let user = self.username.as_str();
        let number = self.account_number;

        let balance = match self.operation_type {
            Create => {
                let age = self.age.ok_or(OperationError::MissingField("age"))?;
                bank.create_account(user, age, number)?.balance()
            }
            Deposit => bank.deposit(user, number, self.required_amount()?)?,
            Withdraw => bank.withdraw(user, number, self.required_amount()?)?,
            Balance => bank.get_balance(user, number)?,
        };

        Ok(Outcome {
            operation_type: self.operation_type,
            account_number: number,
            balance,
        })
    }

    /// Describes how applying this operation went
    pub fn report(&self, result: &OperationResult<Outcome>) -> Report<'_> {
        let (balance, error) = match result {
            Ok(outcome) => (Some(outcome.balance), None),
            Err(e) => (None, Some(e.to_string())),
        };

        Report {
            operation_type: self.operation_type,
            user: &self.username,
            account: self.account_number,
            balance,
            error,
        }
    }

    fn required_amount(&self) -> OperationResult<Decimal> {
        self.amount.ok_or(OperationError::MissingField("amount"))
    }
}

/// Applies every row of `reader` to the bank, writing one report per applied row.
///
/// Rows that cannot be read as an [`Operation`] are logged and skipped; their
/// count is returned.
pub fn replay<R, W, N>(
    reader: &mut csv::Reader<R>,
    bank: &mut Bank<N>,
    writer: &mut csv::Writer<W>,
) -> csv::Result<usize>
where
    R: io::Read,
    W: io::Write,
    N: Notifier,
{
    let mut skipped = 0;

    for result in reader.deserialize::<Operation>() {
        let operation = match result {
            Ok(operation) => operation,
            Err(e) if e.is_io_error() => return Err(e),
            Err(e) => {
                warn!("Skipping malformed row - {e}");
                skipped += 1;
                continue;
            }
        };

        let outcome = operation.apply(bank);
        if let Err(e) = &outcome {
            warn!("{e}");
        }
        writer.serialize(operation.report(&outcome))?;
    }

    writer.flush()?;
    Ok(skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::account::{Account, AccountId};
    use rust_decimal_macros::dec;
    use test_case::test_case;

    fn bank() -> Bank {
        let id = AccountId::parse(1_234_567_890).unwrap();
        Bank::new([Account::new(id, dec!(5000), "user1")], ["user1", "user2"]).unwrap()
    }

    fn read(data: &str) -> Vec<Operation> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes())
            .deserialize()
            .map(Result::unwrap)
            .collect()
    }

    #[test]
    fn replays_a_csv_batch() {
        let operations = read(
            "\
type, user, account, amount, age
create, user2, 2222222222, , 30
deposit, user2, 2222222222, 12.5,
deposit, user1, 1234567890, 500,
withdraw, user1, 1234567890, 500,
balance, user1, 1234567890, ,
",
        );
        let mut bank = bank();

        let balances: Vec<Decimal> = operations
            .iter()
            .map(|op| op.apply(&mut bank).unwrap().balance)
            .collect();

        assert_eq!(
            balances,
            vec![dec!(0), dec!(12.5), dec!(5500), dec!(5000), dec!(5000)]
        );
    }

    #[test]
    fn malformed_rows_do_not_stop_the_batch() {
        let data = "\
type, user, account, amount, age
create, user1, 2222222222, , -1
deposit, user1, 1234567890, lots,
deposit, user1, 1234567890, 500,
balance, user1, 1234567890, ,
";
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes());
        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .from_writer(vec![]);
        let mut bank = bank();

        let skipped = replay(&mut reader, &mut bank, &mut writer).unwrap();

        assert_eq!(skipped, 2);
        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(
            output,
            "type,user,account,balance,error\n\
             deposit,user1,1234567890,5500,\n\
             balance,user1,1234567890,5500,\n"
        );
        assert!(bank.account(2_222_222_222).is_none());
    }

    #[test]
    fn demo_batch_matches_expected_errors() {
        let seed: crate::features::Seed =
            serde_json::from_str(include_str!("../../demos/seed.json")).unwrap();
        let mut bank = seed.into_bank(crate::features::LogNotifier).unwrap();

        let errors: Vec<Option<String>> = read(include_str!("../../demos/operations.csv"))
            .iter()
            .map(|op| op.apply(&mut bank).err().map(|e| e.to_string()))
            .collect();

        let expected = [
            None,
            Some("Account already exists: 1234567892"),
            Some("User is under 18 (age 17)"),
            Some("User not found: user3"),
            None,
            Some("User not found: user3"),
            Some("Account not found: 1111111111"),
            Some("Unauthorized access: user2 does not own account 1234567891"),
            Some("Invalid amount, must be positive: -10"),
            None,
            Some("User not found: user3"),
            Some("Account not found: 1111111111"),
            Some("Unauthorized access: user2 does not own account 1234567891"),
            Some("Invalid amount, must be positive: -10"),
            Some("Insufficient funds: requested 6000, available 5000"),
            None,
        ]
        .map(|e| e.map(String::from));
        assert_eq!(errors, expected);
        assert_eq!(bank.get_balance("user1", 1_234_567_890), Ok(dec!(5000)));
    }

    #[test_case(Operation::new(OperationType::Create, "user1", 2_000_000_000), "age")]
    #[test_case(Operation::new(OperationType::Deposit, "user1", 1_234_567_890), "amount")]
    #[test_case(Operation::new(OperationType::Withdraw, "user1", 1_234_567_890), "amount")]
    fn missing_fields_are_reported(operation: Operation, field: &'static str) {
        let mut bank = bank();

        assert_eq!(
            operation.apply(&mut bank),
            Err(OperationError::MissingField(field))
        );
    }

    #[test]
    fn bank_errors_pass_through() {
        let mut bank = bank();
        let operation =
            Operation::new(OperationType::Withdraw, "user1", 1_234_567_890).with_amount(dec!(6000));

        let err = operation.apply(&mut bank).unwrap_err();
        assert!(matches!(
            err,
            OperationError::Bank(BankError::InsufficientFunds { .. })
        ));
        assert_eq!(
            err.to_string(),
            "Insufficient funds: requested 6000, available 5000"
        );
    }

    #[test]
    fn balance_ignores_amount_and_age() {
        let mut bank = bank();
        let operation = Operation::new(OperationType::Balance, "user1", 1_234_567_890)
            .with_amount(dec!(1))
            .with_age(3);

        assert_eq!(operation.apply(&mut bank).unwrap().balance, dec!(5000));
    }

    #[test]
    fn reports_round_balances_and_carry_errors() {
        let mut bank = bank();
        let deposit =
            Operation::new(OperationType::Deposit, "user1", 1_234_567_890).with_amount(dec!(0.123456));
        let foreign = Operation::new(OperationType::Balance, "user3", 1_234_567_890);

        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .from_writer(vec![]);
        for operation in [&deposit, &foreign] {
            let result = operation.apply(&mut bank);
            writer.serialize(operation.report(&result)).unwrap();
        }

        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(
            output,
            "type,user,account,balance,error\n\
             deposit,user1,1234567890,5000.1235,\n\
             balance,user3,1234567890,,User not found: user3\n"
        );
    }
}
