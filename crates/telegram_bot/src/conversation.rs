//! Step-by-step wizard collecting one entry.
//!
//! The conversation is transport agnostic: it consumes [`Input`] values and
//! produces [`Reply`] values. Telegram specifics live in `handlers`.

use api_types::{
    category::CategoryView,
    cost_center::CostCenterView,
    entry::{self, EntryNew},
};
use chrono::NaiveDate;
use engine::{Direction, Money, PaymentMethod, validation::DESCRIPTION_MAX_CHARS};

use crate::{
    parsing::{Choice, parse_amount, parse_date},
    store::{LedgerStore, StoreError},
    ui,
};

const SAME_AS_ORIGINAL: &str = "mesmo";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Kind,
    Description,
    Category,
    CostCenter,
    PaymentMethod,
    DueDateToday,
    DueDate,
    OriginalValue,
    SettledInCash,
    Settled,
    PaymentDate,
    ReceivedValue,
    Confirmation,
}

/// Values collected so far. Amounts are positive magnitudes until the
/// payload is built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Draft {
    pub direction: Option<Direction>,
    pub description: Option<String>,
    pub category: Option<CategoryView>,
    pub cost_center: Option<CostCenterView>,
    pub payment_method: Option<PaymentMethod>,
    pub due_date: Option<NaiveDate>,
    pub original_value: Option<Money>,
    pub received_value: Option<Money>,
    pub payment_date: Option<NaiveDate>,
}

impl Draft {
    /// Builds the create payload, applying the sign of the chosen direction.
    pub(crate) fn to_payload(&self) -> Option<EntryNew> {
        let direction = self.direction?;
        Some(EntryNew {
            description: self.description.clone()?,
            category_id: self.category.as_ref()?.id,
            cost_center_id: self.cost_center.as_ref().map(|c| c.id),
            payment_method: wire_payment_method(self.payment_method?),
            due_date: self.due_date?,
            original_minor: direction.apply(self.original_value?).minor(),
            received_minor: self.received_value.map(|v| direction.apply(v).minor()),
            payment_date: self.payment_date,
        })
    }
}

fn wire_payment_method(method: PaymentMethod) -> entry::PaymentMethod {
    match method {
        PaymentMethod::Pix => entry::PaymentMethod::Pix,
        PaymentMethod::Cash => entry::PaymentMethod::Cash,
        PaymentMethod::Credit => entry::PaymentMethod::Credit,
        PaymentMethod::Debit => entry::PaymentMethod::Debit,
    }
}

/// What the user sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Input {
    Text(String),
    Choice(Choice),
    /// A button press whose data could not be decoded.
    Malformed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    fn new(label: impl Into<String>, choice: Choice) -> Self {
        Self {
            label: label.into(),
            token: choice.token(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Reply {
    pub text: String,
    /// Inline keyboard rows, empty for plain text.
    pub buttons: Vec<Vec<Button>>,
}

impl Reply {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    fn with_buttons(text: impl Into<String>, buttons: Vec<Vec<Button>>) -> Self {
        Self {
            text: text.into(),
            buttons,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Keep the conversation and show this reply.
    Continue(Reply),
    /// The conversation is over; the draft must be discarded.
    Finished(Reply),
}

impl Outcome {
    #[cfg(test)]
    pub(crate) fn reply(&self) -> &Reply {
        match self {
            Outcome::Continue(reply) | Outcome::Finished(reply) => reply,
        }
    }
}

fn yes_no_buttons(choice: fn(bool) -> Choice) -> Vec<Vec<Button>> {
    vec![vec![
        Button::new("Sim", choice(true)),
        Button::new("Não", choice(false)),
    ]]
}

#[derive(Clone, Debug)]
pub(crate) struct Conversation {
    step: Step,
    draft: Draft,
    categories: Vec<CategoryView>,
    cost_centers: Vec<CostCenterView>,
}

impl Conversation {
    /// A fresh conversation on the first step, with its opening prompt.
    pub(crate) fn start() -> (Self, Reply) {
        let conversation = Self {
            step: Step::Kind,
            draft: Draft::default(),
            categories: Vec::new(),
            cost_centers: Vec::new(),
        };
        let reply = conversation.prompt();
        (conversation, reply)
    }

    pub(crate) fn step(&self) -> Step {
        self.step
    }

    #[cfg(test)]
    pub(crate) fn draft(&self) -> &Draft {
        &self.draft
    }

    /// The question for the current step, with its buttons.
    pub(crate) fn prompt(&self) -> Reply {
        match self.step {
            Step::Kind => Reply::with_buttons(
                "Vamos cadastrar um lançamento.\n\
                 Você está pagando ou recebendo?\n\
                 Use /lista para ver os últimos 10 lançamentos.",
                vec![vec![
                    Button::new("Recebendo", Choice::Kind(Direction::Receiving)),
                    Button::new("Pagando", Choice::Kind(Direction::Paying)),
                ]],
            ),
            Step::Description => Reply::text("Informe a descrição do lançamento:"),
            Step::Category => Reply::with_buttons(
                "Selecione a categoria:",
                self.categories
                    .iter()
                    .map(|c| vec![Button::new(c.label.clone(), Choice::Category(c.id))])
                    .collect(),
            ),
            Step::CostCenter => {
                let mut rows: Vec<Vec<Button>> = self
                    .cost_centers
                    .iter()
                    .map(|c| vec![Button::new(c.label.clone(), Choice::CostCenter(Some(c.id)))])
                    .collect();
                rows.push(vec![Button::new(
                    ui::NO_COST_CENTER,
                    Choice::CostCenter(None),
                )]);
                Reply::with_buttons("Selecione o centro de custo:", rows)
            }
            Step::PaymentMethod => Reply::with_buttons(
                "Escolha a forma de pagamento:",
                PaymentMethod::ALL
                    .iter()
                    .map(|m| vec![Button::new(m.label(), Choice::PaymentMethod(*m))])
                    .collect(),
            ),
            Step::DueDateToday => {
                Reply::with_buttons("O vencimento foi hoje?", yes_no_buttons(Choice::DueToday))
            }
            Step::DueDate => Reply::text("Informe a data de vencimento (DD/MM/AAAA):"),
            Step::OriginalValue => {
                Reply::text("Informe o valor (apenas número positivo, ex: 250,90):")
            }
            Step::SettledInCash => Reply::with_buttons(
                "Foi liquidado à vista?",
                yes_no_buttons(Choice::SettledInCash),
            ),
            Step::Settled => Reply::with_buttons(
                "Esse lançamento foi liquidado?",
                yes_no_buttons(Choice::Settled),
            ),
            Step::PaymentDate => {
                Reply::text("Informe a data do pagamento/recebimento (DD/MM/AAAA):")
            }
            Step::ReceivedValue => Reply::text(
                "Informe o valor liquidado (positivo). \
                 Você pode enviar 'mesmo' para usar o valor original.",
            ),
            Step::Confirmation => Reply::with_buttons(
                ui::render_summary(&self.draft),
                vec![vec![
                    Button::new("Confirmar", Choice::Confirm(true)),
                    Button::new("Cancelar", Choice::Confirm(false)),
                ]],
            ),
        }
    }

    /// Error message shown when the current step gets unusable input.
    fn invalid_message(&self) -> &'static str {
        match self.step {
            Step::Kind => "Opção inválida. Escolha Recebendo ou Pagando.",
            Step::Description => "Descrição não pode ficar vazia. Tente novamente.",
            Step::Category => "Categoria inválida. Tente novamente.",
            Step::CostCenter => "Centro de custo inválido. Tente novamente.",
            Step::PaymentMethod => "Forma de pagamento inválida. Tente novamente.",
            Step::DueDateToday | Step::SettledInCash | Step::Settled => {
                "Opção inválida. Responda Sim ou Não."
            }
            Step::DueDate | Step::PaymentDate => "Data inválida. Use DD/MM/AAAA.",
            Step::OriginalValue => "Valor inválido. Envie um número positivo.",
            Step::ReceivedValue => "Valor inválido. Envie um número positivo ou 'mesmo'.",
            Step::Confirmation => "Opção inválida. Confirme ou cancele o lançamento.",
        }
    }

    fn reprompt(&self, error: &str) -> Outcome {
        let prompt = self.prompt();
        Outcome::Continue(Reply {
            text: format!("{error}\n\n{}", prompt.text),
            buttons: prompt.buttons,
        })
    }

    fn invalid(&self) -> Outcome {
        self.reprompt(self.invalid_message())
    }

    fn advance(&mut self, step: Step) -> Outcome {
        self.step = step;
        Outcome::Continue(self.prompt())
    }

    fn store_unavailable(&self, err: StoreError) -> Outcome {
        tracing::warn!("failed to load options from the ledger: {err}");
        self.reprompt("Não foi possível carregar as opções. Tente novamente.")
    }

    /// Feeds one user input to the current step.
    ///
    /// Unusable input re-prompts the same step and leaves the draft alone.
    pub(crate) async fn handle<S: LedgerStore>(
        &mut self,
        input: Input,
        store: &S,
        today: NaiveDate,
    ) -> Outcome {
        match (self.step, input) {
            (Step::Kind, Input::Choice(Choice::Kind(direction))) => {
                self.draft.direction = Some(direction);
                self.advance(Step::Description)
            }
            (Step::Description, Input::Text(text)) => {
                let description = text.trim();
                if description.is_empty() {
                    return self.invalid();
                }
                if description.chars().count() > DESCRIPTION_MAX_CHARS {
                    return self.reprompt(&format!(
                        "Descrição deve ter no máximo {DESCRIPTION_MAX_CHARS} caracteres."
                    ));
                }
                let categories = match store.list_categories().await {
                    Ok(categories) => categories,
                    Err(err) => return self.store_unavailable(err),
                };
                if categories.is_empty() {
                    return Outcome::Finished(Reply::text(
                        "Nenhuma categoria cadastrada. \
                         Cadastre uma categoria no sistema web e tente novamente.",
                    ));
                }
                self.draft.description = Some(description.to_string());
                self.categories = categories;
                self.advance(Step::Category)
            }
            (Step::Category, Input::Choice(Choice::Category(id))) => {
                let Some(category) = self.categories.iter().find(|c| c.id == id).cloned() else {
                    return self.invalid();
                };
                let cost_centers = match store.list_cost_centers().await {
                    Ok(cost_centers) => cost_centers,
                    Err(err) => return self.store_unavailable(err),
                };
                self.draft.category = Some(category);
                self.cost_centers = cost_centers;
                self.advance(Step::CostCenter)
            }
            (Step::CostCenter, Input::Choice(Choice::CostCenter(selection))) => {
                match selection {
                    None => self.draft.cost_center = None,
                    Some(id) => {
                        let Some(cost_center) =
                            self.cost_centers.iter().find(|c| c.id == id).cloned()
                        else {
                            return self.invalid();
                        };
                        self.draft.cost_center = Some(cost_center);
                    }
                }
                self.advance(Step::PaymentMethod)
            }
            (Step::PaymentMethod, Input::Choice(Choice::PaymentMethod(method))) => {
                self.draft.payment_method = Some(method);
                self.advance(Step::DueDateToday)
            }
            (Step::DueDateToday, Input::Choice(Choice::DueToday(true))) => {
                self.draft.due_date = Some(today);
                self.advance(Step::OriginalValue)
            }
            (Step::DueDateToday, Input::Choice(Choice::DueToday(false))) => {
                self.advance(Step::DueDate)
            }
            (Step::DueDate, Input::Text(text)) => match parse_date(&text) {
                Ok(date) => {
                    self.draft.due_date = Some(date);
                    self.advance(Step::OriginalValue)
                }
                Err(_) => self.invalid(),
            },
            (Step::OriginalValue, Input::Text(text)) => match parse_amount(&text) {
                Ok(amount) => {
                    self.draft.original_value = Some(amount);
                    self.advance(Step::SettledInCash)
                }
                Err(_) => self.invalid(),
            },
            (Step::SettledInCash, Input::Choice(Choice::SettledInCash(true))) => {
                self.draft.payment_date = self.draft.due_date;
                self.draft.received_value = self.draft.original_value;
                self.advance(Step::Confirmation)
            }
            (Step::SettledInCash, Input::Choice(Choice::SettledInCash(false))) => {
                self.advance(Step::Settled)
            }
            (Step::Settled, Input::Choice(Choice::Settled(true))) => {
                self.advance(Step::PaymentDate)
            }
            (Step::Settled, Input::Choice(Choice::Settled(false))) => {
                self.draft.payment_date = None;
                self.draft.received_value = None;
                self.advance(Step::Confirmation)
            }
            (Step::PaymentDate, Input::Text(text)) => match parse_date(&text) {
                Ok(date) => {
                    self.draft.payment_date = Some(date);
                    self.advance(Step::ReceivedValue)
                }
                Err(_) => self.invalid(),
            },
            (Step::ReceivedValue, Input::Text(text)) => {
                let received = if text.trim().eq_ignore_ascii_case(SAME_AS_ORIGINAL) {
                    self.draft.original_value
                } else {
                    parse_amount(&text).ok()
                };
                match received {
                    Some(amount) => {
                        self.draft.received_value = Some(amount);
                        self.advance(Step::Confirmation)
                    }
                    None => self.invalid(),
                }
            }
            (Step::Confirmation, Input::Choice(Choice::Confirm(false))) => Outcome::Finished(
                Reply::text("Cadastro cancelado. Use /novo para iniciar novamente."),
            ),
            (Step::Confirmation, Input::Choice(Choice::Confirm(true))) => {
                Outcome::Finished(self.submit(store).await)
            }
            _ => self.invalid(),
        }
    }

    async fn submit<S: LedgerStore>(&self, store: &S) -> Reply {
        let Some(payload) = self.draft.to_payload() else {
            tracing::warn!("confirmation reached with an incomplete draft");
            return Reply::text(
                "Não foi possível salvar o lançamento. Use /novo para tentar novamente.",
            );
        };

        match store.create_entry(&payload).await {
            Ok(entry) => Reply::text(format!(
                "Lançamento '{}' criado com sucesso. Use /novo para cadastrar outro.",
                entry.description
            )),
            Err(StoreError::Invalid(fields)) => {
                let mut lines = vec!["Não foi possível salvar o lançamento:".to_string()];
                lines.extend(
                    fields
                        .iter()
                        .map(|f| format!("- {}: {}", f.field, f.message)),
                );
                Reply::text(lines.join("\n"))
            }
            Err(err) => {
                tracing::warn!("failed to create entry: {err}");
                Reply::text(
                    "Não foi possível salvar o lançamento. Tente novamente mais tarde.",
                )
            }
        }
    }
}
