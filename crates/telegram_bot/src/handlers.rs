use ledger::{Ledger, LedgerError};
use teloxide::{
    prelude::*,
    types::{CallbackQuery, ChatId, InlineKeyboardMarkup, MessageId, User},
};

use crate::{
    ConfigParameters,
    commands::help_text,
    flow::{Entry, Pending, Step, advance},
    parsing::{Command, ParseError, parse_balance, parse_command},
    state::SessionKey,
    ui::{self, MenuAction},
};

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, msg.from.as_ref()) {
        return Ok(());
    }

    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    let key = SessionKey::new(chat_id, from.id);

    let Some(text) = msg.text() else {
        return Ok(());
    };

    // Commands are never taken as flow input and cancel any open flow.
    if let Some(cmd) = parse_command(text) {
        if let Some(pending) = cfg.sessions.get(key).await.pending {
            tracing::debug!("command cancels pending flow {pending:?}");
            cfg.sessions.update(key, |s| s.pending = None).await;
        }
        return handle_command(&bot, chat_id, &cfg, cmd).await;
    }

    let Some(pending) = cfg.sessions.get(key).await.pending else {
        return Ok(());
    };
    handle_pending_message(&bot, chat_id, &cfg, key, pending, text).await
}

async fn handle_command(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    cmd: Command,
) -> ResponseResult<()> {
    match cmd {
        Command::Inicio { amount } => {
            let amount = match parse_balance(amount.as_deref()) {
                Ok(amount) => amount,
                Err(err) => {
                    return show_menu(bot, chat_id, user_message_for_parse_error(&err)).await;
                }
            };
            let text = match cfg.ledger.set_initial_balance(amount).await {
                Ok(ledger) => ui::render_initial_balance(&ledger),
                Err(err) => user_message_for_ledger_error(&err),
            };
            show_menu(bot, chat_id, text).await
        }
        other => {
            if let Command::Unknown(name) = &other {
                tracing::debug!("unknown command /{name}");
            }
            show_menu(bot, chat_id, command_reply(&other)).await
        }
    }
}

/// Text shown above the menu for commands that leave the ledger alone.
fn command_reply(cmd: &Command) -> String {
    match cmd {
        Command::Start => ui::MENU_TEXT.to_string(),
        Command::Help => help_text(),
        Command::Inicio { .. } => ui::inicio_hint().to_string(),
        Command::Unknown(name) => format!("Comando desconocido: /{name}\n\n{}", ui::MENU_TEXT),
    }
}

pub(crate) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, Some(&q.from)) {
        return Ok(());
    }

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();
    let key = SessionKey::new(chat_id, q.from.id);

    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(action) = q.data.as_deref().and_then(MenuAction::from_tag) else {
        tracing::warn!("Unknown callback data: {:?}", q.data);
        return Ok(());
    };

    match action {
        MenuAction::Expense => {
            start_flow(&bot, chat_id, message_id, &cfg, key, Pending::ExpenseAmount).await
        }
        MenuAction::Income => {
            start_flow(&bot, chat_id, message_id, &cfg, key, Pending::IncomeAmount).await
        }
        MenuAction::Balance => {
            let ledger = cfg.ledger.snapshot().await;
            let text = ui::render_balance(&ledger);
            edit_or_send(&bot, chat_id, Some(message_id), text, Some(ui::render_menu())).await
        }
        MenuAction::Summary => {
            let ledger = cfg.ledger.snapshot().await;
            let text = ui::render_summary(&ledger);
            edit_or_send(&bot, chat_id, Some(message_id), text, Some(ui::render_menu())).await
        }
        MenuAction::InitialBalance => {
            let text = ui::inicio_hint().to_string();
            edit_or_send(&bot, chat_id, Some(message_id), text, Some(ui::render_menu())).await
        }
        MenuAction::Reset => {
            cfg.sessions.update(key, |s| s.pending = None).await;
            let text = match cfg.ledger.reset_month().await {
                Ok(_) => ui::render_reset().to_string(),
                Err(err) => user_message_for_ledger_error(&err),
            };
            edit_or_send(&bot, chat_id, Some(message_id), text, Some(ui::render_menu())).await
        }
    }
}

/// Opens a flow. A flow already pending in the same session is replaced.
async fn start_flow(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    cfg: &ConfigParameters,
    key: SessionKey,
    pending: Pending,
) -> ResponseResult<()> {
    let prompt = ui::prompt(&pending);
    let previous = cfg.sessions.get(key).await.pending;
    if let Some(previous) = previous {
        tracing::debug!("replacing pending flow {previous:?} with {pending:?}");
    }
    cfg.sessions.update(key, |s| s.pending = Some(pending)).await;
    edit_or_send(bot, chat_id, Some(message_id), prompt.to_string(), None).await
}

async fn handle_pending_message(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    key: SessionKey,
    pending: Pending,
    text: &str,
) -> ResponseResult<()> {
    match advance(pending, text) {
        Step::Ask(next) => {
            let prompt = ui::prompt(&next);
            cfg.sessions.update(key, |s| s.pending = Some(next)).await;
            bot.send_message(chat_id, prompt).await?;
            Ok(())
        }
        Step::Retry { retry, error } => {
            let text = format!(
                "{}\n{}",
                user_message_for_parse_error(&error),
                ui::prompt(&retry)
            );
            cfg.sessions.update(key, |s| s.pending = Some(retry)).await;
            bot.send_message(chat_id, text).await?;
            Ok(())
        }
        Step::Commit(entry) => {
            cfg.sessions.update(key, |s| s.pending = None).await;
            let text = match record(cfg, &entry).await {
                Ok(ledger) => match &entry {
                    Entry::Expense { amount, category } => {
                        ui::render_expense_saved(*amount, category, &ledger)
                    }
                    Entry::Income { amount } => ui::render_income_saved(*amount, &ledger),
                },
                Err(err) => user_message_for_ledger_error(&err),
            };
            show_menu(bot, chat_id, text).await
        }
    }
}

async fn record(cfg: &ConfigParameters, entry: &Entry) -> Result<Ledger, LedgerError> {
    match entry {
        Entry::Expense { amount, category } => cfg.ledger.add_expense(*amount, category).await,
        Entry::Income { amount } => cfg.ledger.add_income(*amount).await,
    }
}

async fn show_menu(bot: &Bot, chat_id: ChatId, text: String) -> ResponseResult<()> {
    edit_or_send(bot, chat_id, None, text, Some(ui::render_menu())).await
}

/// Edits the message the button belongs to, or sends a new one when there is
/// nothing to edit or the edit fails (e.g. the message is too old).
async fn edit_or_send(
    bot: &Bot,
    chat_id: ChatId,
    message_id: Option<MessageId>,
    text: String,
    kb: Option<InlineKeyboardMarkup>,
) -> ResponseResult<()> {
    if let Some(message_id) = message_id {
        let mut edit = bot.edit_message_text(chat_id, message_id, text.clone());
        if let Some(kb) = kb.clone() {
            edit = edit.reply_markup(kb);
        }
        match edit.await {
            Ok(_) => return Ok(()),
            Err(err) => tracing::debug!("edit failed, sending a new message: {err}"),
        }
    }

    let mut send = bot.send_message(chat_id, text);
    if let Some(kb) = kb {
        send = send.reply_markup(kb);
    }
    send.await?;
    Ok(())
}

fn is_allowed(cfg: &ConfigParameters, from: Option<&User>) -> bool {
    let Some(from) = from else {
        return false;
    };
    match &cfg.allowed_users {
        None => true,
        Some(ids) => ids.contains(&from.id),
    }
}

fn user_message_for_parse_error(err: &ParseError) -> String {
    match err {
        ParseError::InvalidAmount => {
            "Cantidad no válida: escribe un número entero (ej: 200) ❌".to_string()
        }
        ParseError::MissingArgument => {
            format!("Falta la cantidad ❌\n{}", ui::inicio_hint())
        }
        ParseError::Empty => "El texto está vacío ❌".to_string(),
    }
}

fn user_message_for_ledger_error(err: &LedgerError) -> String {
    match err {
        LedgerError::InvalidAmount(_) => {
            "Cantidad no válida: debe ser mayor que cero ❌".to_string()
        }
        LedgerError::InvalidCategory(_) => "La categoría no puede estar vacía ❌".to_string(),
        LedgerError::Overflow => "Cantidad demasiado grande ❌".to_string(),
        LedgerError::Io(_) | LedgerError::Serialize(_) => {
            "No se pudo guardar la operación, inténtalo de nuevo ⚠️".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_commands() {
        let text = command_reply(&Command::Help);
        assert_eq!(text, help_text());
        assert!(text.contains("/inicio"));
        assert!(text.contains("/start"));
    }

    #[test]
    fn start_and_unknown_show_the_menu_text() {
        assert_eq!(command_reply(&Command::Start), ui::MENU_TEXT);
        let text = command_reply(&Command::Unknown("foo".to_string()));
        assert!(text.starts_with("Comando desconocido: /foo"));
        assert!(text.ends_with(ui::MENU_TEXT));
    }

    #[test]
    fn failed_save_is_reported_as_retryable() {
        let err = LedgerError::Io(std::io::Error::other("disk full"));
        assert!(user_message_for_ledger_error(&err).contains("inténtalo de nuevo"));
    }
}
