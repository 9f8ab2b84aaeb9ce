//! Bot commands.

use teloxide::utils::command::BotCommands;

/// Commands advertised to Telegram clients.
#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(
    rename_rule = "lowercase",
    description = "Comandos para registrar lançamentos:"
)]
pub enum Command {
    #[command(description = "Inicia o cadastro de um lançamento.")]
    Start,
    #[command(description = "Inicia o cadastro de um lançamento.")]
    Novo,
    #[command(description = "Mostra os últimos 10 lançamentos.")]
    Lista,
    #[command(description = "Cancela o cadastro em andamento.")]
    Cancelar,
    #[command(description = "Mostra esta mensagem.")]
    Ajuda,
}

/// Result of looking at a message that starts with `/`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Parsed {
    Known(Command),
    Unknown,
}

/// Parses a command, accepting the English aliases and an `@botname` suffix.
///
/// Returns `None` when `text` is not a command at all.
pub(crate) fn parse_command(text: &str) -> Option<Parsed> {
    let trimmed = text.trim();
    let name = trimmed.strip_prefix('/')?;
    let name = name.split_whitespace().next().unwrap_or("");
    let name = name.split_once('@').map_or(name, |(name, _)| name);

    let command = match name.to_lowercase().as_str() {
        "start" => Command::Start,
        "novo" | "new" => Command::Novo,
        "lista" | "list" => Command::Lista,
        "cancelar" | "cancel" => Command::Cancelar,
        "ajuda" | "help" => Command::Ajuda,
        _ => return Some(Parsed::Unknown),
    };
    Some(Parsed::Known(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_map_to_same_command() {
        assert_eq!(parse_command("/novo"), Some(Parsed::Known(Command::Novo)));
        assert_eq!(parse_command("/new"), Some(Parsed::Known(Command::Novo)));
        assert_eq!(parse_command(" /list "), Some(Parsed::Known(Command::Lista)));
        assert_eq!(
            parse_command("/cancel@financeiro_bot"),
            Some(Parsed::Known(Command::Cancelar))
        );
        assert_eq!(parse_command("/HELP"), Some(Parsed::Known(Command::Ajuda)));
    }

    #[test]
    fn unknown_and_plain_text() {
        assert_eq!(parse_command("/foo"), Some(Parsed::Unknown));
        assert_eq!(parse_command("Aluguel"), None);
    }
}
