//! Adapters that bridge Tauri to the bridge's internal abstractions.

mod event_bus;

pub use event_bus::{tauri_event_name, TauriEventBus};
