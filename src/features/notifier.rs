use super::account::AccountId;
use rust_decimal::Decimal;
use std::fmt;

/// Emitted after an operation went through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    Deposit { account: AccountId, balance: Decimal },
    Withdrawal { account: AccountId, balance: Decimal },
    BalanceCheck { account: AccountId, balance: Decimal },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Deposit { account, .. } => write!(f, "successful deposit on {account}"),
            Notification::Withdrawal { account, .. } => {
                write!(f, "successful withdrawal from {account}")
            }
            Notification::BalanceCheck { account, balance } => {
                write!(f, "successful balance check on {account}: {balance}")
            }
        }
    }
}

/// Sink for success notifications. Must not fail or block.
pub trait Notifier {
    fn notify(&self, notification: &Notification);
}

/// Forwards notifications to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        info!("{notification}");
    }
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, notification: &Notification) {
        (**self).notify(notification)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Keeps every notification for later inspection
    #[derive(Debug, Default)]
    pub(crate) struct Recorder(pub(crate) RefCell<Vec<Notification>>);

    impl Notifier for Recorder {
        fn notify(&self, notification: &Notification) {
            self.0.borrow_mut().push(*notification);
        }
    }

    #[test]
    fn balance_check_message_carries_balance() {
        let account = AccountId::parse(1_234_567_890).unwrap();
        let notification = Notification::BalanceCheck {
            account,
            balance: rust_decimal_macros::dec!(5000),
        };

        assert_eq!(
            notification.to_string(),
            "successful balance check on 1234567890: 5000"
        );
    }
}
