use ledger::Amount;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Start,
    Help,
    Inicio { amount: Option<String> },
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ParseError {
    #[error("cantidad no válida")]
    InvalidAmount,
    #[error("falta la cantidad")]
    MissingArgument,
    #[error("texto vacío")]
    Empty,
}

/// Parses a slash command. Returns `None` for plain text.
///
/// A `@botname` suffix on the command (sent in group chats) is ignored.
pub(crate) fn parse_command(text: &str) -> Option<Command> {
    let trimmed = text.trim();
    let rest = trimmed.strip_prefix('/')?;

    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("");
    let name = name.split('@').next().unwrap_or(name).to_ascii_lowercase();
    let arg = parts
        .next()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string);

    let cmd = match name.as_str() {
        "start" | "menu" => Command::Start,
        "help" => Command::Help,
        "inicio" => Command::Inicio { amount: arg },
        _ => Command::Unknown(name),
    };
    Some(cmd)
}

/// Amount of an expense or an income: a strictly positive integer.
pub(crate) fn parse_amount(input: &str) -> Result<Amount, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    Amount::parse_positive(input).map_err(|_| ParseError::InvalidAmount)
}

/// Argument of `/inicio`: any integer, the balance may start negative.
pub(crate) fn parse_balance(arg: Option<&str>) -> Result<Amount, ParseError> {
    let Some(arg) = arg else {
        return Err(ParseError::MissingArgument);
    };
    // Only the first token counts, like `/inicio 1000 euros`.
    let first = arg.split_whitespace().next().ok_or(ParseError::MissingArgument)?;
    first.parse().map_err(|_| ParseError::InvalidAmount)
}

pub(crate) fn parse_category(input: &str) -> Result<String, ParseError> {
    let category = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if category.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(category)
}
