use serde::{Deserialize, Serialize};

use crate::{Amount, LedgerError, ResultLedger};

/// A single recorded expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(alias = "cantidad")]
    pub amount: Amount,
    #[serde(rename = "categoria")]
    pub category: String,
}

/// Balance plus the ordered list of expenses of the shared account.
///
/// The balance is kept up to date on every mutation and is never re-derived
/// from the expense list: setting an initial balance or adding income moves it
/// without leaving a trace in `expenses`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(rename = "saldo")]
    balance: Amount,
    #[serde(rename = "gastos", default)]
    expenses: Vec<Expense>,
}

impl Ledger {
    pub fn new(balance: Amount, expenses: Vec<Expense>) -> Self {
        Self { balance, expenses }
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Records an expense and lowers the balance by `amount`.
    pub fn add_expense(&mut self, amount: Amount, category: &str) -> ResultLedger<()> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(format!(
                "expense must be greater than zero, got {amount}"
            )));
        }
        let category = category.trim();
        if category.is_empty() {
            return Err(LedgerError::InvalidCategory("empty category".to_string()));
        }

        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)?;
        self.expenses.push(Expense {
            amount,
            category: category.to_string(),
        });
        Ok(())
    }

    /// Raises the balance by `amount`. The expense list is untouched.
    pub fn add_income(&mut self, amount: Amount) -> ResultLedger<()> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(format!(
                "income must be greater than zero, got {amount}"
            )));
        }
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Overwrites the balance. Negative values are allowed.
    pub fn set_initial_balance(&mut self, amount: Amount) {
        self.balance = amount;
    }

    /// Clears the month: zero balance, no expenses.
    pub fn reset_month(&mut self) {
        self.balance = Amount::ZERO;
        self.expenses.clear();
    }

    pub fn summary(&self) -> Summary<'_> {
        Summary { ledger: self }
    }
}

/// Read-only view over a [`Ledger`] used to render the monthly summary.
#[derive(Clone, Copy, Debug)]
pub struct Summary<'a> {
    ledger: &'a Ledger,
}

impl<'a> Summary<'a> {
    pub fn balance(&self) -> Amount {
        self.ledger.balance
    }

    /// Expenses in insertion order.
    pub fn expenses(&self) -> std::slice::Iter<'a, Expense> {
        self.ledger.expenses.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.expenses.is_empty()
    }

    /// Sum of the recorded expenses, `None` on overflow.
    pub fn total_spent(&self) -> Option<Amount> {
        self.expenses()
            .try_fold(Amount::ZERO, |acc, e| acc.checked_add(e.amount))
    }
}
