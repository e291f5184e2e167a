mod support;

use std::sync::Arc;

use backend::db_utils::state_store::{StateSaver, StateStore};
use common::ui_state::{UserInterfaceState, WidgetState};

use support::InMemoryStateStore;

fn state_with_viz(viz_id: &str) -> UserInterfaceState {
    UserInterfaceState {
        widget_state_grid: vec![vec![WidgetState::new(viz_id)]],
        ..Default::default()
    }
}

#[tokio::test]
async fn saves_are_written_in_call_order() {
    let store = Arc::new(InMemoryStateStore::new());
    let saver = StateSaver::new(store.clone());

    for i in 0..20 {
        saver.save(state_with_viz(&format!("viz{}", i)));
    }
    saver.flush().await;

    let writes = store.writes();
    assert_eq!(writes.len(), 20);
    for (i, encoded) in writes.iter().enumerate() {
        let state = UserInterfaceState::decode(encoded).unwrap();
        assert_eq!(state.widget(0, 0).unwrap().viz_id, Some(format!("viz{}", i)));
    }
    let latest = saver.load("default").await.unwrap().unwrap();
    assert_eq!(latest.widget(0, 0).unwrap().viz_id.as_deref(), Some("viz19"));
}

#[tokio::test]
async fn unreadable_state_loads_as_absent() {
    let store = InMemoryStateStore::new();
    store.save_encoded("default", "%%%".to_string()).await.unwrap();
    let saver = StateSaver::new(store);
    assert!(saver.load("default").await.unwrap().is_none());
    assert!(saver.load("other").await.unwrap().is_none());
}
