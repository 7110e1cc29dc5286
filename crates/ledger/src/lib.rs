//! Ledger of the shared account: a balance plus the list of expenses of the
//! current month, persisted as a single JSON file.

pub use amount::Amount;
pub use error::LedgerError;
pub use ledger::{Expense, Ledger, Summary};
pub use store::{LedgerStore, LedgerStoreBuilder, load, save};

mod amount;
mod error;
mod ledger;
mod store;

type ResultLedger<T> = Result<T, LedgerError>;
