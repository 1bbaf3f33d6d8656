use idbridge_capture::{BridgeError, MethodCall};
use serde_json::{Map, Value};
use tauri::State;

use crate::IdBridgeState;

/// Run one bridge method.
///
/// Mode operations may wait on the view thread, so they never run on the
/// async runtime's workers.
#[tauri::command]
pub async fn execute_method(
    state: State<'_, IdBridgeState>,
    method: String,
    arguments: Option<Map<String, Value>>,
) -> Result<Option<Value>, BridgeError> {
    let module = state.module().clone();
    let call = MethodCall {
        method,
        arguments: arguments.unwrap_or_default(),
    };

    tauri::async_runtime::spawn_blocking(move || module.execute_method(&call))
        .await
        .map_err(|e| BridgeError::Runtime(e.to_string()))?
}

#[tauri::command]
pub fn get_defaults(state: State<'_, IdBridgeState>) -> Value {
    state.module().defaults()
}

/// Subscribe the host to event names for every mode.
#[tauri::command]
pub fn subscribe_events(state: State<'_, IdBridgeState>, events: Vec<String>) {
    tracing::debug!(?events, "Host subscribed");
    state.module().emitter().register_listener(&events);
}

#[tauri::command]
pub fn unsubscribe_events(state: State<'_, IdBridgeState>, events: Vec<String>) {
    tracing::debug!(?events, "Host unsubscribed");
    state.module().emitter().unregister_listener(&events);
}
