use api_types::entry::EntryView;
use engine::{Direction, EntryKind, Money};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::conversation::{Button, Draft};

pub(crate) const NO_COST_CENTER: &str = "Sem centro de custo";
pub(crate) const RECENT_LIMIT: u64 = 10;

const DATE_FORMAT: &str = "%d/%m/%Y";
const MISSING: &str = "-";

/// Confirmation text for a completed draft.
pub(crate) fn render_summary(draft: &Draft) -> String {
    let direction = draft.direction.unwrap_or(Direction::Receiving);
    let kind = match direction {
        Direction::Receiving => EntryKind::Receivable,
        Direction::Paying => EntryKind::Payable,
    };
    let value = draft
        .original_value
        .map(|v| direction.apply(v).to_string())
        .unwrap_or_else(|| MISSING.to_string());
    let due_date = draft
        .due_date
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| MISSING.to_string());
    let payment = match draft.payment_date {
        Some(date) => date.format(DATE_FORMAT).to_string(),
        None => "Em aberto".to_string(),
    };

    let mut lines = vec![
        "Confirma este lançamento?".to_string(),
        String::new(),
        format!("Tipo: {}", kind.label()),
        format!("Descrição: {}", draft.description.as_deref().unwrap_or(MISSING)),
        format!(
            "Categoria: {}",
            draft.category.as_ref().map_or(MISSING, |c| c.label.as_str())
        ),
        format!(
            "Centro de custo: {}",
            draft
                .cost_center
                .as_ref()
                .map_or(NO_COST_CENTER, |c| c.label.as_str())
        ),
        format!(
            "Forma de pagamento: {}",
            draft.payment_method.map_or(MISSING, |m| m.label())
        ),
        format!("Vencimento: {due_date}"),
        format!("Valor: {value}"),
        format!("Pagamento: {payment}"),
    ];
    if draft.payment_date.is_some()
        && let Some(received) = draft.received_value
    {
        lines.push(format!("Valor liquidado: {}", direction.apply(received)));
    }
    lines.join("\n")
}

/// One line per entry, newest first as received from the server.
pub(crate) fn render_recent(entries: &[EntryView]) -> String {
    if entries.is_empty() {
        return "Nenhum lançamento encontrado.".to_string();
    }

    let mut text = format!("Últimos {RECENT_LIMIT} lançamentos:");
    for entry in entries {
        text.push_str(&format!(
            "\n- {} | {} | {}",
            entry.description,
            entry.due_date.format(DATE_FORMAT),
            Money::new(entry.original_minor)
        ));
    }
    text
}

pub(crate) fn help_text() -> &'static str {
    "Comandos disponíveis:\n\
     /novo - cadastrar um lançamento\n\
     /lista - ver os últimos 10 lançamentos\n\
     /cancelar - cancelar o cadastro em andamento\n\
     /ajuda - mostrar esta mensagem"
}

pub(crate) fn keyboard(rows: &[Vec<Button>]) -> Option<InlineKeyboardMarkup> {
    if rows.is_empty() {
        return None;
    }
    Some(InlineKeyboardMarkup::new(rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.token.clone()))
            .collect::<Vec<_>>()
    })))
}
