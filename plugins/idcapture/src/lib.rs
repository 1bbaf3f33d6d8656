//! Tauri plugin exposing the ID capture bridge to the webview.
//!
//! The plugin owns the [`IdCaptureModule`] and the [`LifecycleDispatcher`] it
//! observes. Descriptor-only lifecycle steps arrive as app events; steps that
//! carry native objects (the capture context, a view) are driven by the host
//! through [`IdBridgeState::lifecycle`].
//!
//! Outbound callbacks reach the webview on [`tauri_event_name`] channels,
//! e.g. `IdCaptureListener:didCaptureId`. Subscriptions keep the dotted names.

use std::sync::Arc;

use idbridge_capture::{BridgeConfig, IdCaptureModule, LifecycleDispatcher, NativeBindings};
use idbridge_events::Emitter;
use serde_json::Value;
use tauri::plugin::{Builder, TauriPlugin};
use tauri::{AppHandle, Listener, Manager, Runtime};

mod adapters;
mod commands;

pub use adapters::{tauri_event_name, TauriEventBus};

const PLUGIN_NAME: &str = "idbridge";

/// App events carrying lifecycle descriptors.
pub mod lifecycle_events {
    pub const MODE_ADDED: &str = "idbridge://context/mode-added";
    pub const MODE_REMOVED: &str = "idbridge://context/mode-removed";
    pub const ALL_MODES_REMOVED: &str = "idbridge://context/all-modes-removed";
    pub const OVERLAY_REMOVED: &str = "idbridge://context/overlay-removed";
    pub const ALL_OVERLAYS_REMOVED: &str = "idbridge://context/all-overlays-removed";
}

/// Managed plugin state.
pub struct IdBridgeState {
    module: Arc<IdCaptureModule>,
    lifecycle: Arc<LifecycleDispatcher>,
}

impl IdBridgeState {
    pub fn module(&self) -> &Arc<IdCaptureModule> {
        &self.module
    }

    /// Dispatcher for lifecycle steps the host drives natively, such as
    /// `notify_context_deserialized` and `notify_overlay_added`.
    pub fn lifecycle(&self) -> &Arc<LifecycleDispatcher> {
        &self.lifecycle
    }
}

/// Event payloads are either the descriptor object or the descriptor as a
/// JSON string.
fn descriptor(payload: &str) -> String {
    match serde_json::from_str::<Value>(payload) {
        Ok(Value::String(inner)) => inner,
        _ => payload.to_string(),
    }
}

fn forward_lifecycle_events<R: Runtime>(app: &AppHandle<R>, lifecycle: &Arc<LifecycleDispatcher>) {
    let dispatcher = Arc::clone(lifecycle);
    app.listen_any(lifecycle_events::MODE_ADDED, move |event| {
        dispatcher.notify_mode_added(&descriptor(event.payload()));
    });

    let dispatcher = Arc::clone(lifecycle);
    app.listen_any(lifecycle_events::MODE_REMOVED, move |event| {
        dispatcher.notify_mode_removed(&descriptor(event.payload()));
    });

    let dispatcher = Arc::clone(lifecycle);
    app.listen_any(lifecycle_events::ALL_MODES_REMOVED, move |_| {
        dispatcher.notify_all_modes_removed();
    });

    let dispatcher = Arc::clone(lifecycle);
    app.listen_any(lifecycle_events::OVERLAY_REMOVED, move |event| {
        dispatcher.notify_overlay_removed(&descriptor(event.payload()));
    });

    let dispatcher = Arc::clone(lifecycle);
    app.listen_any(lifecycle_events::ALL_OVERLAYS_REMOVED, move |_| {
        dispatcher.notify_all_overlays_removed();
    });
}

/// Build the plugin around the host's native SDK bindings.
///
/// Configuration is read from `plugins.idbridge` in the app config.
pub fn init<R: Runtime>(bindings: NativeBindings) -> TauriPlugin<R, Option<BridgeConfig>> {
    Builder::<R, Option<BridgeConfig>>::new(PLUGIN_NAME)
        .invoke_handler(tauri::generate_handler![
            commands::execute_method,
            commands::get_defaults,
            commands::subscribe_events,
            commands::unsubscribe_events,
        ])
        .setup(move |app, api| {
            let config = api.config().clone().unwrap_or_default();
            tracing::info!(?config, "Initializing ID bridge");

            let event_bus = Arc::new(TauriEventBus::new(app.clone()));
            let module = Arc::new(IdCaptureModule::new(
                Arc::new(Emitter::new(event_bus)),
                bindings,
                &config,
            ));
            let lifecycle = Arc::new(LifecycleDispatcher::new());
            module.did_start(&lifecycle);

            forward_lifecycle_events(app, &lifecycle);
            app.manage(IdBridgeState { module, lifecycle });
            Ok(())
        })
        .on_drop(|app| {
            if let Some(state) = app.try_state::<IdBridgeState>() {
                state.module.did_stop(&state.lifecycle);
            }
        })
        .build()
}
