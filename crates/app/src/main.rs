use telegram_bot::{Bot, UserId};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "gastos={level},telegram_bot={level},ledger={level}",
            level = settings.app.level
        ))
        .init();

    let ledger = ledger::LedgerStore::builder()
        .path(&settings.ledger.path)
        .build();

    let allowed_users = settings
        .telegram
        .allowed_users
        .iter()
        .map(|id| UserId(*id))
        .collect();

    let bot = Bot::builder()
        .token(&settings.telegram.token)
        .allowed_users(allowed_users)
        .ledger(ledger)
        .session_ttl(settings.telegram.session_ttl())
        .build()?;

    bot.run().await;

    Ok(())
}
