use chrono::NaiveDate;
use engine::{Direction, Money, PaymentMethod};
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ParseError {
    #[error("data inválida")]
    InvalidDate,
    #[error("valor inválido")]
    InvalidAmount,
    #[error("opção inválida")]
    InvalidChoice,
}

const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%Y-%m-%d"];

/// Parses `DD/MM/YYYY` or `YYYY-MM-DD`, first match wins.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, ParseError> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .ok_or(ParseError::InvalidDate)
}

/// Parses a strictly positive pt-BR amount.
pub(crate) fn parse_amount(raw: &str) -> Result<Money, ParseError> {
    Money::parse_brl(raw).ok_or(ParseError::InvalidAmount)
}

/// A button press, decoded from its `"<namespace>:<value>"` callback data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Choice {
    Kind(Direction),
    Category(Uuid),
    /// `None` is "no cost center".
    CostCenter(Option<Uuid>),
    PaymentMethod(PaymentMethod),
    DueToday(bool),
    SettledInCash(bool),
    Settled(bool),
    /// `true` confirms, `false` cancels.
    Confirm(bool),
}

fn yes_no(value: &str) -> Result<bool, ParseError> {
    match value {
        "yes" => Ok(true),
        "no" => Ok(false),
        _ => Err(ParseError::InvalidChoice),
    }
}

fn yes_no_token(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

impl Choice {
    pub(crate) fn decode(data: &str) -> Result<Choice, ParseError> {
        let (namespace, value) = data.split_once(':').ok_or(ParseError::InvalidChoice)?;
        match namespace {
            "kind" => match value {
                "receiving" => Ok(Choice::Kind(Direction::Receiving)),
                "paying" => Ok(Choice::Kind(Direction::Paying)),
                _ => Err(ParseError::InvalidChoice),
            },
            "cat" => Uuid::parse_str(value)
                .map(Choice::Category)
                .map_err(|_| ParseError::InvalidChoice),
            "cc" if value == "none" => Ok(Choice::CostCenter(None)),
            "cc" => Uuid::parse_str(value)
                .map(|id| Choice::CostCenter(Some(id)))
                .map_err(|_| ParseError::InvalidChoice),
            "pm" => value
                .parse::<usize>()
                .ok()
                .and_then(|idx| PaymentMethod::ALL.get(idx).copied())
                .map(Choice::PaymentMethod)
                .ok_or(ParseError::InvalidChoice),
            "due_today" => yes_no(value).map(Choice::DueToday),
            "settled_cash" => yes_no(value).map(Choice::SettledInCash),
            "settled" => yes_no(value).map(Choice::Settled),
            "confirm" => match value {
                "ok" => Ok(Choice::Confirm(true)),
                "cancel" => Ok(Choice::Confirm(false)),
                _ => Err(ParseError::InvalidChoice),
            },
            _ => Err(ParseError::InvalidChoice),
        }
    }

    pub(crate) fn token(&self) -> String {
        match self {
            Choice::Kind(Direction::Receiving) => "kind:receiving".to_string(),
            Choice::Kind(Direction::Paying) => "kind:paying".to_string(),
            Choice::Category(id) => format!("cat:{id}"),
            Choice::CostCenter(None) => "cc:none".to_string(),
            Choice::CostCenter(Some(id)) => format!("cc:{id}"),
            Choice::PaymentMethod(method) => {
                let idx = PaymentMethod::ALL
                    .iter()
                    .position(|m| m == method)
                    .unwrap_or_default();
                format!("pm:{idx}")
            }
            Choice::DueToday(v) => format!("due_today:{}", yes_no_token(*v)),
            Choice::SettledInCash(v) => format!("settled_cash:{}", yes_no_token(*v)),
            Choice::Settled(v) => format!("settled:{}", yes_no_token(*v)),
            Choice::Confirm(true) => "confirm:ok".to_string(),
            Choice::Confirm(false) => "confirm:cancel".to_string(),
        }
    }
}
