//! Telegram bot.
//!
//! The bot is a thin client: it talks only to the HTTP server API and never
//! accesses the database directly. Entries are collected through a guided
//! conversation, one per user, kept in memory.

use base64::Engine;
use chrono_tz::Tz;
use reqwest::{Client, header};
use teloxide::{prelude::*, utils::command::BotCommands};

mod access;
mod api;
mod commands;
mod conversation;
mod handlers;
mod parsing;
mod state;
mod store;
mod ui;

pub use access::{AccessGuard, REJECTION, parse_allow_list};
pub use commands::Command;

pub struct Bot {
    token: String,
    guard: AccessGuard,
    server: String,
    client: Client,
    timezone: Tz,
}

impl Bot {
    pub fn new(
        token: &str,
        guard: AccessGuard,
        server: &str,
        username: &str,
        password: &str,
        timezone: Tz,
    ) -> Result<Self, String> {
        if token.trim().is_empty() {
            return Err("telegram bot token is empty".to_string());
        }

        // Basic authorization is in the form "Basic `secret`" where `secret` is
        // the base64 of the string "username:password".
        let secret = format!("{username}:{password}");
        let secret = format!("Basic {}", base64::prelude::BASE64_STANDARD.encode(secret));

        let mut auth = header::HeaderValue::try_from(secret)
            .map_err(|err| format!("invalid auth header value: {err}"))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;

        Ok(Self {
            token: token.to_string(),
            guard,
            server: server.to_string(),
            client,
            timezone,
        })
    }

    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");
        if self.guard.is_open() {
            tracing::warn!("no allowed users configured: the bot answers everybody");
        }

        let bot = teloxide::Bot::new(&self.token);
        if let Err(err) = bot.set_my_commands(Command::bot_commands()).await {
            tracing::warn!("failed to register bot commands: {err}");
        }

        let parameters = handlers::ConfigParameters {
            guard: self.guard.clone(),
            store: api::ApiClient::new(self.client.clone(), self.server.clone()),
            sessions: state::SessionStore::default(),
            timezone: self.timezone,
        };

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handlers::handle_message))
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Debug)]
pub struct BotBuilder {
    token: String,
    allowed_users: Vec<UserId>,
    server: String,
    username: String,
    password: String,
    timezone: Tz,
}

impl Default for BotBuilder {
    fn default() -> Self {
        Self {
            token: String::new(),
            allowed_users: Vec::new(),
            server: String::new(),
            username: String::new(),
            password: String::new(),
            timezone: chrono_tz::America::Fortaleza,
        }
    }
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    /// Telegram users allowed to talk to the bot. Empty means everybody.
    pub fn allowed_users(mut self, allowed_users: Vec<UserId>) -> BotBuilder {
        self.allowed_users = allowed_users;
        self
    }

    pub fn server(mut self, server: &str, username: &str, password: &str) -> BotBuilder {
        self.server = server.to_string();
        self.username = username.to_string();
        self.password = password.to_string();
        self
    }

    /// Zone used to resolve "today" when the due date is today.
    pub fn timezone(mut self, timezone: Tz) -> BotBuilder {
        self.timezone = timezone;
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        Bot::new(
            &self.token,
            AccessGuard::new(self.allowed_users),
            &self.server,
            &self.username,
            &self.password,
            self.timezone,
        )
    }
}
