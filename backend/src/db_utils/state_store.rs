use std::future::Future;
use std::sync::Arc;

use common::ui_state::UserInterfaceState;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::db_utils::clickhouse_utils::get_clickhouse_client;
use crate::settings::Settings;

/// Storage for encoded UI state, keyed by state name.
pub trait StateStore {
    fn load_encoded(&self, name: &str) -> impl Future<Output = anyhow::Result<Option<String>>> + Send;

    fn save_encoded(&self, name: &str, encoded: String) -> impl Future<Output = anyhow::Result<()>> + Send;
}

impl<T: StateStore + Sync> StateStore for Arc<T> {
    fn load_encoded(&self, name: &str) -> impl Future<Output = anyhow::Result<Option<String>>> + Send {
        (**self).load_encoded(name)
    }

    fn save_encoded(&self, name: &str, encoded: String) -> impl Future<Output = anyhow::Result<()>> + Send {
        (**self).save_encoded(name, encoded)
    }
}

/// Append-only state table; the newest row per name wins.
pub struct ClickHouseStateStore {
    client: clickhouse::Client,
}

impl ClickHouseStateStore {
    pub fn new(settings: &Settings) -> Self {
        Self { client: get_clickhouse_client(settings) }
    }

    pub async fn create_table(&self) -> anyhow::Result<()> {
        let sql = "
        CREATE TABLE IF NOT EXISTS dashboard_ui_state (
            name String,
            state_encoded String,
            date_created DateTime DEFAULT now()
        )
        ENGINE = MergeTree
        ORDER BY (name, date_created)
        ";
        self.client.query(sql).execute().await?;
        Ok(())
    }
}

impl StateStore for ClickHouseStateStore {
    async fn load_encoded(&self, name: &str) -> anyhow::Result<Option<String>> {
        let sql = "
        SELECT state_encoded
        FROM dashboard_ui_state
        WHERE name = ?
        ORDER BY date_created DESC
        LIMIT 1
        ";
        let rows = self
            .client
            .query(sql)
            .bind(name)
            .fetch_all::<String>()
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn save_encoded(&self, name: &str, encoded: String) -> anyhow::Result<()> {
        let sql = "
        INSERT INTO dashboard_ui_state (name, state_encoded)
        VALUES (?, ?)
        ";
        self.client
            .query(sql)
            .bind(name)
            .bind(encoded)
            .execute()
            .await?;
        Ok(())
    }
}

enum SaveCommand {
    Save(UserInterfaceState),
    Flush(oneshot::Sender<()>),
}

/// Fire-and-forget saves, written one at a time in call order.
///
/// A single worker task owns the write path, so two quick saves can never interleave at the
/// store and the last call always wins.
pub struct StateSaver<S> {
    store: Arc<S>,
    sender: mpsc::UnboundedSender<SaveCommand>,
}

impl<S: StateStore + Send + Sync + 'static> StateSaver<S> {
    /// Must be called inside a tokio runtime.
    pub fn new(store: S) -> Self {
        let store = Arc::new(store);
        let (sender, mut receiver) = mpsc::unbounded_channel::<SaveCommand>();
        let worker_store = store.clone();
        tokio::spawn(async move {
            while let Some(command) = receiver.recv().await {
                match command {
                    SaveCommand::Save(state) => {
                        if let Err(err) = write_state(worker_store.as_ref(), &state).await {
                            warn!("Saving UI state {} failed: {:#}", state.name, err);
                        }
                    }
                    SaveCommand::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
        });
        Self { store, sender }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the saved state. Unreadable state is treated as absent; store errors propagate.
    pub async fn load(&self, name: &str) -> anyhow::Result<Option<UserInterfaceState>> {
        let Some(encoded) = self.store.load_encoded(name).await? else {
            return Ok(None);
        };
        match UserInterfaceState::decode(&encoded) {
            Ok(state) => Ok(Some(state)),
            Err(err) => {
                info!("Discarding unreadable UI state {}: {}", name, err);
                Ok(None)
            }
        }
    }

    pub fn save(&self, state: UserInterfaceState) {
        if self.sender.send(SaveCommand::Save(state)).is_err() {
            warn!("UI state writer has stopped; save dropped");
        }
    }

    /// Wait until every save queued before this call has been written.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.sender.send(SaveCommand::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

async fn write_state<S: StateStore>(store: &S, state: &UserInterfaceState) -> anyhow::Result<()> {
    let encoded = state.encode()?;
    store.save_encoded(&state.name, encoded).await
}
