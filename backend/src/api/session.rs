//! One dashboard session: filter model, saved UI state and the collaborators behind them.

use common::{
    dashboard_config::DashboardConfig,
    dimension_filter_model::{DimensionFilterModel, FilterModelError},
    ui_state::{UserInterfaceState, WidgetState, CURRENT_STATE_VERSION, DEFAULT_STATE_NAME},
};
use tracing::info;

use crate::api::dimension_filters::{populate_dimension_filter_model, replace_property_placeholders};
use crate::db_utils::mondrian_utils::{QueryExecutor, QueryResult};
use crate::db_utils::state_store::{StateSaver, StateStore};

pub struct DashboardSession<E, S> {
    executor: E,
    saver: StateSaver<S>,
    config: DashboardConfig,
    model: DimensionFilterModel,
    ui_state: UserInterfaceState,
    first_visit: bool,
}

impl<E, S> DashboardSession<E, S>
where
    E: QueryExecutor,
    S: StateStore + Send + Sync + 'static,
{
    /// Restore saved state, build a fresh filter model and overlay the saved selections on it.
    ///
    /// Saved state from an older layout is discarded. The reconciled state is saved right away.
    pub async fn init(executor: E, store: S, mut config: DashboardConfig) -> anyhow::Result<Self> {
        let saver = StateSaver::new(store);

        let (ui_state, first_visit) = match saver.load(DEFAULT_STATE_NAME).await? {
            Some(saved) if saved.is_compatible() => (saved, false),
            Some(saved) => {
                info!(
                    "Discarding saved UI state with version {:?} (current is {})",
                    saved.version, CURRENT_STATE_VERSION
                );
                (UserInterfaceState::default(), true)
            }
            None => (UserInterfaceState::default(), true),
        };

        if let Some(caveat) = replace_property_placeholders(&executor, &config).await {
            config.data_caveat_text = Some(caveat);
        }

        let mut model = populate_dimension_filter_model(&executor, &config).await?;
        if let Some(saved_model) = ui_state.dimension_filter_model.as_ref() {
            model.sync_with(Some(saved_model));
            // keep the user on the dimension they were editing when it still exists
            if let Some(index) = saved_model
                .selected_dimension()
                .and_then(|d| model.position(&d.path))
            {
                model.select_dimension(index)?;
            }
        }

        let mut session = Self {
            executor,
            saver,
            config,
            model,
            ui_state,
            first_visit,
        };
        session.save();
        Ok(session)
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn model(&self) -> &DimensionFilterModel {
        &self.model
    }

    pub fn ui_state(&self) -> &UserInterfaceState {
        &self.ui_state
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn first_visit(&self) -> bool {
        self.first_visit
    }

    pub fn select_dimension(&mut self, index: usize) -> Result<(), FilterModelError> {
        self.model.select_dimension(index)?;
        self.save();
        Ok(())
    }

    pub fn toggle_member(&mut self, member: &str) -> Option<bool> {
        let included = self.model.toggle_selected_dimension_value(member)?;
        self.save();
        Some(included)
    }

    pub fn toggle_all(&mut self) {
        self.model.toggle_all_selected_dimension_level_values();
        self.save();
    }

    pub fn set_widget_grid(&mut self, widget_state_grid: Vec<Vec<WidgetState>>) {
        self.ui_state.widget_state_grid = widget_state_grid;
        self.save();
    }

    /// Queue the current state for persistence without waiting for it.
    pub fn save(&mut self) {
        self.ui_state.version = Some(CURRENT_STATE_VERSION);
        self.ui_state.dimension_filter_model = Some(self.model.clone());
        self.saver.save(self.ui_state.clone());
    }

    /// Wait for queued saves to reach the store.
    pub async fn flush(&self) {
        self.saver.flush().await;
    }

    /// Run `mdx` restricted by the current filter state.
    pub async fn execute_filtered_query(
        &self,
        mdx: &str,
        connection: &str,
        unfiltered_dimensions: &[String],
    ) -> anyhow::Result<QueryResult> {
        let filtered = self.model.filter_query(mdx, unfiltered_dimensions);
        self.executor.execute_query(&filtered, connection, false).await
    }
}
