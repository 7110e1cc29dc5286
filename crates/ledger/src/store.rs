use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::sync::Mutex;

use crate::{Amount, Ledger, ResultLedger};

const DEFAULT_LEDGER_PATH: &str = "data.json";

/// Reads the persisted ledger.
///
/// A missing file is the normal first-run case and yields an empty ledger. An
/// unreadable or corrupt file also yields an empty ledger, with a warning.
pub fn load(path: &Path) -> Ledger {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::info!("No ledger at {}, starting empty", path.display());
            return Ledger::default();
        }
        Err(err) => {
            tracing::warn!("failed to read ledger {}: {err}", path.display());
            return Ledger::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(ledger) => ledger,
        Err(err) => {
            tracing::warn!("corrupt ledger {}: {err}", path.display());
            Ledger::default()
        }
    }
}

/// Overwrites the persisted ledger.
///
/// The file is written next to its final location and then renamed over it,
/// so a crash mid-write leaves the previous version in place.
pub fn save(path: &Path, ledger: &Ledger) -> ResultLedger<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(ledger)?;

    let tmp = path.with_extension("tmp");
    let written = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, path));
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    Ok(())
}

/// Shared, file-backed ledger.
///
/// Every mutation goes through one mutex: it is applied to a copy, the copy is
/// written to disk and only then becomes the current ledger. A failed write
/// leaves the in-memory state untouched.
#[derive(Clone, Debug)]
pub struct LedgerStore {
    path: PathBuf,
    inner: Arc<Mutex<Ledger>>,
}

impl LedgerStore {
    /// Return a builder for `LedgerStore`.
    pub fn builder() -> LedgerStoreBuilder {
        LedgerStoreBuilder::default()
    }

    pub fn load_or_empty(path: PathBuf) -> Self {
        let ledger = load(&path);
        tracing::info!(
            "Ledger loaded: balance {}, {} expenses",
            ledger.balance(),
            ledger.expenses().len()
        );
        Self {
            path,
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current ledger.
    pub async fn snapshot(&self) -> Ledger {
        self.inner.lock().await.clone()
    }

    pub async fn add_expense(&self, amount: Amount, category: &str) -> ResultLedger<Ledger> {
        tracing::debug!("add expense {amount} ({category})");
        self.mutate(|ledger| ledger.add_expense(amount, category))
            .await
    }

    pub async fn add_income(&self, amount: Amount) -> ResultLedger<Ledger> {
        tracing::debug!("add income {amount}");
        self.mutate(|ledger| ledger.add_income(amount)).await
    }

    pub async fn set_initial_balance(&self, amount: Amount) -> ResultLedger<Ledger> {
        tracing::debug!("set initial balance {amount}");
        self.mutate(|ledger| {
            ledger.set_initial_balance(amount);
            Ok(())
        })
        .await
    }

    pub async fn reset_month(&self) -> ResultLedger<Ledger> {
        tracing::debug!("reset month");
        self.mutate(|ledger| {
            ledger.reset_month();
            Ok(())
        })
        .await
    }

    async fn mutate<F>(&self, f: F) -> ResultLedger<Ledger>
    where
        F: FnOnce(&mut Ledger) -> ResultLedger<()>,
    {
        let mut guard = self.inner.lock().await;
        let mut next = guard.clone();
        f(&mut next)?;

        if let Err(err) = save(&self.path, &next) {
            tracing::error!("failed to persist ledger {}: {err}", self.path.display());
            return Err(err);
        }

        *guard = next.clone();
        Ok(next)
    }
}

#[derive(Default, Debug)]
pub struct LedgerStoreBuilder {
    path: Option<PathBuf>,
}

impl LedgerStoreBuilder {
    pub fn path(mut self, path: impl Into<PathBuf>) -> LedgerStoreBuilder {
        self.path = Some(path.into());
        self
    }

    pub fn build(self) -> LedgerStore {
        let path = self
            .path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER_PATH));
        LedgerStore::load_or_empty(path)
    }
}
