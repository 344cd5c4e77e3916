//! Application state wiring the session together.
//!
//! AppState holds the single chat session shared by the web handlers and the
//! terminal chat. The controller is generic over its key-value store; here it
//! is pinned to the SQLite implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use shelfchat_core::chat::history::HistoryStore;
use shelfchat_core::chat::relay::CompletionRelay;
use shelfchat_core::chat::session::SessionController;
use shelfchat_core::llm::provider::LlmProvider;
use shelfchat_infra::config::load_chat_config;
use shelfchat_infra::filesystem::{ensure_data_dir, resolve_data_dir};
use shelfchat_infra::llm::openai_compat::OpenAiCompatibleProvider;
use shelfchat_infra::llm::openai_compat::config::from_chat_config;
use shelfchat_infra::secret::env::{EnvCredentialProvider, missing_credential_message};
use shelfchat_infra::sqlite::kv::SqliteKvStore;
use shelfchat_infra::sqlite::pool::{DatabasePool, database_url};
use shelfchat_types::config::ChatConfig;

/// Session controller pinned to the SQLite key-value file.
pub type ConcreteSession = SessionController<SqliteKvStore>;

/// Shared application state.
///
/// The session sits behind an async mutex: one turn holds it for its whole
/// duration, so turns never overlap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ChatConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
    pub session: Arc<Mutex<ConcreteSession>>,
}

impl AppState {
    /// Resolve the data dir, load config, open the history file and start the
    /// session. A missing credential yields a halted session, not an error.
    pub async fn init(model_override: Option<String>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        ensure_data_dir(&data_dir).await?;

        let mut config = load_chat_config(&data_dir).await;
        if let Some(model) = model_override {
            config.model = model;
        }

        let db_pool = open_database(&data_dir).await?;

        let provider = EnvCredentialProvider::new()
            .get(&config.api_key_env)
            .map(|api_key| OpenAiCompatibleProvider::new(from_chat_config(&config, api_key)));

        Self::assemble(config, data_dir, db_pool, provider).await
    }

    /// Build the state from already resolved parts.
    ///
    /// `provider == None` means no credential: the session is halted.
    pub async fn assemble<P: LlmProvider + 'static>(
        config: ChatConfig,
        data_dir: PathBuf,
        db_pool: DatabasePool,
        provider: Option<P>,
    ) -> anyhow::Result<Self> {
        let history = HistoryStore::new(SqliteKvStore::new(db_pool.clone()));

        let session = match provider {
            Some(provider) => {
                let relay = CompletionRelay::new(provider, config.model.clone())
                    .with_max_tokens(config.max_tokens)
                    .with_temperature(config.temperature);
                SessionController::start(history, relay).await?
            }
            None => SessionController::halted(
                history,
                config.model.clone(),
                missing_credential_message(&config.api_key_env),
            ),
        };

        Ok(Self {
            config: Arc::new(config),
            data_dir,
            db_pool,
            session: Arc::new(Mutex::new(session)),
        })
    }
}

/// Open (creating and migrating if needed) the history database.
pub async fn open_database(data_dir: &Path) -> anyhow::Result<DatabasePool> {
    Ok(DatabasePool::new(&database_url(data_dir)).await?)
}

/// History store on its own, for commands that never talk to the model.
pub async fn open_history() -> anyhow::Result<HistoryStore<SqliteKvStore>> {
    let data_dir = resolve_data_dir();
    ensure_data_dir(&data_dir).await?;
    let db_pool = open_database(&data_dir).await?;
    Ok(HistoryStore::new(SqliteKvStore::new(db_pool)))
}
