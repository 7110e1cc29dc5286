//! Conversation flows.
//!
//! Two independent flows are driven by a pending state stored per session:
//!
//! - expense: amount, then category;
//! - income: amount only.
//!
//! [`advance`] is the whole state machine: it takes the pending state and the
//! user's text and tells the caller what to do next. It never touches the
//! ledger, so every transition is testable without a bot.

use ledger::Amount;

use crate::parsing::{ParseError, parse_amount, parse_category};

/// What the bot is waiting for in a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Pending {
    ExpenseAmount,
    /// The amount is kept as typed and only parsed once the category arrives.
    ExpenseCategory { raw_amount: String },
    IncomeAmount,
}

/// A completed flow, ready to be applied to the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Entry {
    Expense { amount: Amount, category: String },
    Income { amount: Amount },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// The flow goes on: store the new state and prompt for it.
    Ask(Pending),
    /// The flow is over: clear the state and record the entry.
    Commit(Entry),
    /// The input was rejected: report the error and prompt for `retry`.
    Retry { retry: Pending, error: ParseError },
}

pub(crate) fn advance(pending: Pending, text: &str) -> Step {
    match pending {
        Pending::ExpenseAmount => Step::Ask(Pending::ExpenseCategory {
            raw_amount: text.to_string(),
        }),
        Pending::ExpenseCategory { raw_amount } => {
            let amount = match parse_amount(&raw_amount) {
                Ok(amount) => amount,
                Err(error) => {
                    return Step::Retry {
                        retry: Pending::ExpenseAmount,
                        error,
                    };
                }
            };
            match parse_category(text) {
                Ok(category) => Step::Commit(Entry::Expense { amount, category }),
                Err(error) => Step::Retry {
                    retry: Pending::ExpenseCategory { raw_amount },
                    error,
                },
            }
        }
        Pending::IncomeAmount => match parse_amount(text) {
            Ok(amount) => Step::Commit(Entry::Income { amount }),
            Err(error) => Step::Retry {
                retry: Pending::IncomeAmount,
                error,
            },
        },
    }
}
