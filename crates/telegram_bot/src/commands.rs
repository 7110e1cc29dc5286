//! Commands advertised to Telegram clients.

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "Comandos para gestionar la cuenta compartida:"
)]
pub enum MenuCommands {
    #[command(description = "Muestra el menú principal.")]
    Start,
    #[command(description = "Configura el saldo inicial, ej: /inicio 1000.")]
    Inicio { amount: String },
    #[command(description = "Muestra este mensaje.")]
    Help,
}

pub(crate) fn help_text() -> String {
    format!(
        "{}\n\nUsa los botones del menú para registrar gastos e ingresos.",
        MenuCommands::descriptions()
    )
}
