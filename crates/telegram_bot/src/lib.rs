//! Telegram bot.
//!
//! The bot owns no money logic: it drives the conversation flows and hands
//! every mutation to the shared [`LedgerStore`].

use std::time::Duration;

use ledger::LedgerStore;
use teloxide::{prelude::*, utils::command::BotCommands};

mod commands;
mod flow;
mod handlers;
mod parsing;
mod state;
mod ui;

pub use commands::MenuCommands;
pub use teloxide::types::UserId;

#[derive(Clone)]
pub struct ConfigParameters {
    allowed_users: Option<Vec<UserId>>,
    ledger: LedgerStore,
    sessions: state::SessionStore,
}

pub struct Bot {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    ledger: LedgerStore,
    session_ttl: Duration,
}

impl Bot {
    pub fn new(
        token: &str,
        allowed_users: Option<Vec<UserId>>,
        ledger: LedgerStore,
        session_ttl: Duration,
    ) -> Result<Self, String> {
        let token = token.trim();
        if token.is_empty() {
            return Err("missing telegram token".to_string());
        }
        if session_ttl.is_zero() {
            return Err("session ttl must be greater than zero".to_string());
        }

        Ok(Self {
            token: token.to_string(),
            allowed_users,
            ledger,
            session_ttl,
        })
    }

    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);
        if let Err(err) = bot.set_my_commands(MenuCommands::bot_commands()).await {
            tracing::warn!("failed to register bot commands: {err}");
        }

        let parameters = ConfigParameters {
            allowed_users: self.allowed_users.clone(),
            ledger: self.ledger.clone(),
            sessions: state::SessionStore::new(self.session_ttl),
        };

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handlers::handle_message))
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default, Debug)]
pub struct BotBuilder {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    ledger: Option<LedgerStore>,
    session_ttl: Option<Duration>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    pub fn allowed_users(mut self, allowed_users: Vec<UserId>) -> BotBuilder {
        if !allowed_users.is_empty() {
            self.allowed_users = Some(allowed_users);
        }
        self
    }

    pub fn ledger(mut self, ledger: LedgerStore) -> BotBuilder {
        self.ledger = Some(ledger);
        self
    }

    pub fn session_ttl(mut self, ttl: Duration) -> BotBuilder {
        self.session_ttl = Some(ttl);
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        let ledger = self
            .ledger
            .ok_or_else(|| "missing ledger store".to_string())?;
        let session_ttl = self.session_ttl.unwrap_or(state::DEFAULT_SESSION_TTL);
        Bot::new(&self.token, self.allowed_users, ledger, session_ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> LedgerStore {
        // Never written to: building a store only reads the file.
        LedgerStore::builder()
            .path("target/test_bot/unused.json")
            .build()
    }

    #[test]
    fn empty_token_is_rejected() {
        let err = Bot::builder().token("   ").ledger(ledger()).build().err();
        assert_eq!(err.as_deref(), Some("missing telegram token"));
    }

    #[test]
    fn missing_ledger_is_rejected() {
        let err = Bot::builder().token("123:abc").build().err();
        assert_eq!(err.as_deref(), Some("missing ledger store"));
    }

    #[test]
    fn builder_uses_default_ttl() {
        let bot = Bot::builder().token("123:abc").ledger(ledger()).build().unwrap();
        assert_eq!(bot.session_ttl, state::DEFAULT_SESSION_TTL);
        assert_eq!(bot.ledger.path(), std::path::Path::new("target/test_bot/unused.json"));
    }

    #[test]
    fn empty_allow_list_means_everyone() {
        let builder = Bot::builder().allowed_users(Vec::new());
        assert!(builder.allowed_users.is_none());
    }
}
