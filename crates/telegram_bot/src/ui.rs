use ledger::{Amount, Ledger};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::flow::Pending;

pub(crate) const MENU_TEXT: &str = "Selecciona una opción:";

/// Buttons of the main menu, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MenuAction {
    Expense,
    Income,
    Balance,
    Summary,
    InitialBalance,
    Reset,
}

impl MenuAction {
    pub(crate) const ALL: [MenuAction; 6] = [
        MenuAction::Expense,
        MenuAction::Income,
        MenuAction::Balance,
        MenuAction::Summary,
        MenuAction::InitialBalance,
        MenuAction::Reset,
    ];

    /// Callback data carried by the button.
    pub(crate) fn tag(self) -> &'static str {
        match self {
            MenuAction::Expense => "gasto",
            MenuAction::Income => "ingreso",
            MenuAction::Balance => "saldo",
            MenuAction::Summary => "resumen",
            MenuAction::InitialBalance => "inicio",
            MenuAction::Reset => "reset",
        }
    }

    pub(crate) fn from_tag(tag: &str) -> Option<MenuAction> {
        Self::ALL.into_iter().find(|a| a.tag() == tag)
    }

    fn label(self) -> &'static str {
        match self {
            MenuAction::Expense => "Registrar gasto 📝",
            MenuAction::Income => "Añadir ingreso 💵",
            MenuAction::Balance => "Ver saldo 💰",
            MenuAction::Summary => "Resumen mensual 📊",
            MenuAction::InitialBalance => "Configurar saldo inicial ⚙️",
            MenuAction::Reset => "Reiniciar mes 🔄",
        }
    }
}

pub(crate) fn render_menu() -> InlineKeyboardMarkup {
    let rows = MenuAction::ALL
        .into_iter()
        .map(|action| vec![InlineKeyboardButton::callback(action.label(), action.tag())])
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

pub(crate) fn prompt(pending: &Pending) -> &'static str {
    match pending {
        Pending::ExpenseAmount => "Ingresa la cantidad del gasto:",
        Pending::ExpenseCategory { .. } => "Ahora ingresa la categoría del gasto:",
        Pending::IncomeAmount => "Ingresa la cantidad del ingreso:",
    }
}

pub(crate) fn render_balance(ledger: &Ledger) -> String {
    format!("Saldo actual: {} 💰", ledger.balance())
}

pub(crate) fn render_summary(ledger: &Ledger) -> String {
    let summary = ledger.summary();
    if summary.is_empty() {
        return "No tienes gastos registrados aún 📝".to_string();
    }

    let mut text = String::from("📊 Resumen mensual:\n");
    for expense in summary.expenses() {
        text.push_str(&format!("- {} en {}\n", expense.amount, expense.category));
    }
    if let Some(total) = summary.total_spent() {
        text.push_str(&format!("\nTotal gastado: {total}"));
    }
    text.push_str(&format!("\nSaldo restante: {} 💰", summary.balance()));
    text
}

pub(crate) fn render_expense_saved(amount: Amount, category: &str, ledger: &Ledger) -> String {
    format!(
        "Gasto registrado: {amount} en {category} ✅\nSaldo restante: {} 💰",
        ledger.balance()
    )
}

pub(crate) fn render_income_saved(amount: Amount, ledger: &Ledger) -> String {
    format!(
        "Ingreso registrado: {amount} ✅\nSaldo actual: {} 💰",
        ledger.balance()
    )
}

pub(crate) fn render_initial_balance(ledger: &Ledger) -> String {
    format!("Saldo inicial configurado en {} 💰", ledger.balance())
}

pub(crate) fn render_reset() -> &'static str {
    "Mes reiniciado: saldo en 0 y sin gastos 🔄"
}

pub(crate) fn inicio_hint() -> &'static str {
    "Usa /inicio <cantidad> para configurar tu saldo inicial ⚙️"
}
