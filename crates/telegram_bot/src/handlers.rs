use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use teloxide::{
    prelude::*,
    types::{CallbackQuery, ChatId, MessageId},
};

use crate::{
    access::{AccessGuard, REJECTION},
    api::ApiClient,
    commands::{Command, Parsed, parse_command},
    conversation::{Conversation, Input, Outcome, Reply},
    parsing::Choice,
    state::SessionStore,
    store::LedgerStore,
    ui,
};

/// Everything a handler needs, injected by the dispatcher.
#[derive(Clone)]
pub(crate) struct BotContext<S> {
    pub guard: AccessGuard,
    pub store: S,
    pub sessions: SessionStore,
    pub timezone: Tz,
}

pub(crate) type ConfigParameters = BotContext<ApiClient>;

impl<S> BotContext<S> {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }
}

/// An update reduced to what the bot reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Inbound {
    Command(Command),
    UnknownCommand,
    Text(String),
    /// Raw callback data of a pressed button.
    Callback(String),
    /// A message without text (photo, sticker...).
    Unsupported,
}

impl Inbound {
    fn from_text(text: &str) -> Self {
        match parse_command(text) {
            Some(Parsed::Known(command)) => Inbound::Command(command),
            Some(Parsed::Unknown) => Inbound::UnknownCommand,
            None => Inbound::Text(text.to_string()),
        }
    }
}

const NO_SESSION_HINT: &str = "Use /novo para cadastrar um lançamento.";

/// Routes one inbound update for `user` and returns the reply to show.
///
/// The session lock is never held across store calls.
pub(crate) async fn dispatch<S: LedgerStore>(
    ctx: &BotContext<S>,
    user: UserId,
    inbound: Inbound,
) -> Reply {
    if !ctx.guard.is_allowed(user) {
        tracing::debug!(user = user.0, "rejected unauthorized user");
        return Reply::text(REJECTION);
    }

    let input = match inbound {
        Inbound::Command(Command::Start | Command::Novo) => {
            let (conversation, reply) = Conversation::start();
            ctx.sessions.put(user, conversation).await;
            return reply;
        }
        Inbound::Command(Command::Lista) => return recent_entries(&ctx.store).await,
        Inbound::Command(Command::Cancelar) => {
            ctx.sessions.clear(user).await;
            return Reply::text("Cadastro cancelado.");
        }
        Inbound::Command(Command::Ajuda) => return Reply::text(ui::help_text()),
        Inbound::UnknownCommand => {
            return Reply::text("Comando não reconhecido. Use /ajuda para ver os comandos.");
        }
        Inbound::Unsupported => {
            return Reply::text("Envie uma mensagem de texto ou use os botões.");
        }
        Inbound::Text(text) => Input::Text(text),
        Inbound::Callback(data) => match Choice::decode(&data) {
            Ok(choice) => Input::Choice(choice),
            Err(err) => {
                tracing::debug!("undecodable callback data {data:?}: {err}");
                Input::Malformed
            }
        },
    };

    let Some(mut conversation) = ctx.sessions.get(user).await else {
        return Reply::text(NO_SESSION_HINT);
    };

    tracing::debug!(user = user.0, step = ?conversation.step(), "conversation input");
    match conversation.handle(input, &ctx.store, ctx.today()).await {
        Outcome::Continue(reply) => {
            ctx.sessions.put(user, conversation).await;
            reply
        }
        Outcome::Finished(reply) => {
            ctx.sessions.clear(user).await;
            reply
        }
    }
}

async fn recent_entries<S: LedgerStore>(store: &S) -> Reply {
    match store.list_recent_entries(ui::RECENT_LIMIT).await {
        Ok(entries) => Reply::text(ui::render_recent(&entries)),
        Err(err) => {
            tracing::warn!("failed to list recent entries: {err}");
            Reply::text("Não foi possível carregar os lançamentos. Tente novamente mais tarde.")
        }
    }
}

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let inbound = match msg.text() {
        Some(text) => Inbound::from_text(text),
        None => Inbound::Unsupported,
    };

    let reply = dispatch(&cfg, from.id, inbound).await;
    send(&bot, msg.chat.id, reply).await
}

pub(crate) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let inbound = match q.data.as_deref() {
        Some(data) => Inbound::Callback(data.to_string()),
        None => Inbound::Callback(String::new()),
    };

    let reply = dispatch(&cfg, q.from.id, inbound).await;
    edit_or_send(&bot, chat_id, message.id(), reply).await
}

async fn send(bot: &Bot, chat_id: ChatId, reply: Reply) -> ResponseResult<()> {
    let mut request = bot.send_message(chat_id, reply.text);
    if let Some(kb) = ui::keyboard(&reply.buttons) {
        request = request.reply_markup(kb);
    }
    request.await?;
    Ok(())
}

/// Replaces the message holding the pressed keyboard, or sends a new one
/// when it can no longer be edited.
async fn edit_or_send(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    reply: Reply,
) -> ResponseResult<()> {
    let mut request = bot.edit_message_text(chat_id, message_id, reply.text.clone());
    if let Some(kb) = ui::keyboard(&reply.buttons) {
        request = request.reply_markup(kb);
    }
    if request.await.is_ok() {
        return Ok(());
    }

    send(bot, chat_id, reply).await
}

#[cfg(test)]
mod tests {
    use engine::Direction;

    use super::*;
    use crate::store::fake::FakeStore;

    const OWNER: UserId = UserId(42);

    fn context(store: FakeStore) -> BotContext<FakeStore> {
        BotContext {
            guard: AccessGuard::new([OWNER]),
            store,
            sessions: SessionStore::default(),
            timezone: chrono_tz::America::Fortaleza,
        }
    }

    fn command(command: Command) -> Inbound {
        Inbound::Command(command)
    }

    fn text(value: &str) -> Inbound {
        Inbound::Text(value.to_string())
    }

    fn callback(choice: Choice) -> Inbound {
        Inbound::Callback(choice.token())
    }

    #[tokio::test]
    async fn outsiders_are_rejected_without_state() {
        let (store, _) = FakeStore::with_category("Moradia");
        let ctx = context(store);
        let stranger = UserId(7);

        for inbound in [
            command(Command::Novo),
            command(Command::Lista),
            text("Aluguel"),
            Inbound::Callback("kind:paying".to_string()),
        ] {
            let reply = dispatch(&ctx, stranger, inbound).await;
            assert_eq!(reply.text, REJECTION);
            assert!(reply.buttons.is_empty());
        }
        assert!(ctx.sessions.get(stranger).await.is_none());
    }

    #[tokio::test]
    async fn open_guard_lets_everybody_in() {
        let (store, _) = FakeStore::with_category("Moradia");
        let mut ctx = context(store);
        ctx.guard = AccessGuard::default();

        let reply = dispatch(&ctx, UserId(7), command(Command::Novo)).await;
        assert!(reply.text.starts_with("Vamos cadastrar um lançamento."));
    }

    #[tokio::test]
    async fn input_without_session_gets_hint() {
        let (store, _) = FakeStore::with_category("Moradia");
        let ctx = context(store);

        let reply = dispatch(&ctx, OWNER, text("Aluguel")).await;
        assert_eq!(reply.text, NO_SESSION_HINT);
        let reply = dispatch(&ctx, OWNER, callback(Choice::Confirm(true))).await;
        assert_eq!(reply.text, NO_SESSION_HINT);
    }

    #[tokio::test]
    async fn start_replaces_running_conversation() {
        let (store, _) = FakeStore::with_category("Moradia");
        let ctx = context(store);

        dispatch(&ctx, OWNER, command(Command::Novo)).await;
        dispatch(&ctx, OWNER, callback(Choice::Kind(Direction::Paying))).await;
        let reply = dispatch(&ctx, OWNER, command(Command::Start)).await;

        assert_eq!(reply.buttons.len(), 1);
        assert_eq!(reply.buttons[0].len(), 2);
        let conversation = ctx.sessions.get(OWNER).await.unwrap();
        assert_eq!(conversation.draft().direction, None);
    }

    #[tokio::test]
    async fn cancel_discards_the_draft() {
        let (store, _) = FakeStore::with_category("Moradia");
        let ctx = context(store);

        dispatch(&ctx, OWNER, command(Command::Novo)).await;
        dispatch(&ctx, OWNER, callback(Choice::Kind(Direction::Paying))).await;
        dispatch(&ctx, OWNER, text("Aluguel")).await;
        let reply = dispatch(&ctx, OWNER, command(Command::Cancelar)).await;
        assert_eq!(reply.text, "Cadastro cancelado.");
        assert!(ctx.sessions.get(OWNER).await.is_none());

        dispatch(&ctx, OWNER, command(Command::Novo)).await;
        let conversation = ctx.sessions.get(OWNER).await.unwrap();
        assert_eq!(conversation.draft(), &Default::default());
    }

    #[tokio::test]
    async fn cancel_without_conversation_is_harmless() {
        let (store, _) = FakeStore::with_category("Moradia");
        let ctx = context(store);

        let reply = dispatch(&ctx, OWNER, command(Command::Cancelar)).await;
        assert_eq!(reply.text, "Cadastro cancelado.");
        assert!(ctx.sessions.get(OWNER).await.is_none());
    }

    #[tokio::test]
    async fn allow_list_of_one() {
        let (store, _) = FakeStore::with_category("Moradia");
        let mut ctx = context(store);
        ctx.guard = AccessGuard::new(crate::access::parse_allow_list("111"));

        let reply = dispatch(&ctx, UserId(222), command(Command::Start)).await;
        assert_eq!(reply.text, REJECTION);
        assert!(ctx.sessions.get(UserId(222)).await.is_none());

        let reply = dispatch(&ctx, UserId(111), command(Command::Start)).await;
        assert!(reply.text.contains("Você está pagando ou recebendo?"));
        assert!(ctx.sessions.get(UserId(111)).await.is_some());
    }

    #[tokio::test]
    async fn malformed_callback_reprompts() {
        let (store, _) = FakeStore::with_category("Moradia");
        let ctx = context(store);

        dispatch(&ctx, OWNER, command(Command::Novo)).await;
        let reply = dispatch(&ctx, OWNER, Inbound::Callback("kind:maybe".to_string())).await;
        assert!(reply.text.contains("Você está pagando ou recebendo?"));
        assert!(ctx.sessions.get(OWNER).await.is_some());
    }

    #[tokio::test]
    async fn full_conversation_creates_entry_and_ends_session() {
        let (store, category) = FakeStore::with_category("Moradia");
        let ctx = context(store.clone());

        for inbound in [
            command(Command::Novo),
            callback(Choice::Kind(Direction::Receiving)),
            text("Consultoria"),
            callback(Choice::Category(category)),
            callback(Choice::CostCenter(None)),
            callback(Choice::PaymentMethod(engine::PaymentMethod::Credit)),
            callback(Choice::DueToday(false)),
            text("05/07/2024"),
            text("1.500,00"),
            callback(Choice::SettledInCash(false)),
            callback(Choice::Settled(false)),
        ] {
            dispatch(&ctx, OWNER, inbound).await;
        }
        let reply = dispatch(&ctx, OWNER, callback(Choice::Confirm(true))).await;

        assert_eq!(
            reply.text,
            "Lançamento 'Consultoria' criado com sucesso. Use /novo para cadastrar outro."
        );
        assert!(ctx.sessions.get(OWNER).await.is_none());
        let created = store.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].original_minor, 150_000);
        assert_eq!(created[0].received_minor, None);
        assert_eq!(created[0].payment_date, None);

        let reply = dispatch(&ctx, OWNER, command(Command::Lista)).await;
        assert!(reply.text.starts_with("Últimos 10 lançamentos:"));
        assert!(reply.text.contains("- Consultoria | 05/07/2024 | R$ 1500,00"));
    }

    #[tokio::test]
    async fn empty_list_and_store_failure() {
        let (store, _) = FakeStore::with_category("Moradia");
        let ctx = context(store.clone());

        let reply = dispatch(&ctx, OWNER, command(Command::Lista)).await;
        assert_eq!(reply.text, "Nenhum lançamento encontrado.");

        store.fail_listing(true);
        let reply = dispatch(&ctx, OWNER, command(Command::Lista)).await;
        assert!(reply.text.starts_with("Não foi possível carregar"));
    }

    #[test]
    fn text_is_classified() {
        assert_eq!(Inbound::from_text("/lista"), command(Command::Lista));
        assert_eq!(Inbound::from_text("/xyz"), Inbound::UnknownCommand);
        assert_eq!(Inbound::from_text("Aluguel"), text("Aluguel"));
    }
}
