use migration::{Migrator, MigratorTrait};
use server::{Credentials, ServerState};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let timezone = settings.timezone()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "financeiro={level},telegram_bot={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = connect_database(&settings.database.url).await?;
    let engine = engine::Engine::builder().database(db).build().await?;
    let state = ServerState::new(
        engine,
        Credentials {
            username: settings.server.username.clone(),
            password: settings.server.password.clone(),
        },
        timezone,
    );

    let address = settings.address();
    tasks.spawn(async move {
        server::run(state, &address).await;
    });

    let bot = telegram_bot::Bot::builder()
        .token(&settings.telegram.token)
        .allowed_users(telegram_bot::parse_allow_list(
            &settings.telegram.allowed_users,
        ))
        .server(
            &settings.telegram.server_url,
            &settings.server.username,
            &settings.server.password,
        )
        .timezone(timezone)
        .build()?;
    tasks.spawn(async move {
        bot.run().await;
    });

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn connect_database(
    url: &str,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!("Connecting to {url}...");
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
