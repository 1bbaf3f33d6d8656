//! ID capture bridge core.
//!
//! This crate translates between a host runtime and a native ID document
//! capture SDK. It tracks:
//! - Live capture modes, keyed by host-assigned mode ids
//! - Work deferred until a mode with a given id or parent exists
//! - Recognition callbacks held until the host answers (or a timeout fires)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  settings.rs, defaults.rs, types.rs - data model (pure)     │
//! │  creation.rs - mode/overlay descriptors                     │
//! │  native.rs   - Traits for the native SDK                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Bridge Layer                              │
//! │  registry.rs     - Modes and pending actions                │
//! │  mode.rs         - Adapter around one native mode           │
//! │  listener.rs     - Native callbacks to host events          │
//! │  event_result.rs - Held emission with timeout               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Application Layer                          │
//! │  module.rs   - Lifecycle handling and mode operations       │
//! │  commands.rs - Method call decoding and execution           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use idbridge_capture::{
//!     BridgeConfig, IdCaptureModule, InlineDispatcher, LifecycleDispatcher, MethodCall,
//!     NativeBindings,
//! };
//! use idbridge_events::{Emitter, InMemoryEventBus};
//! use std::sync::Arc;
//!
//! let emitter = Arc::new(Emitter::new(Arc::new(InMemoryEventBus::new())));
//! let module = Arc::new(IdCaptureModule::new(emitter, bindings, &BridgeConfig::default()));
//! let lifecycle = LifecycleDispatcher::new();
//! module.did_start(&lifecycle);
//!
//! lifecycle.notify_mode_added(r#"{"type":"idCapture","modeId":1,"enabled":true}"#);
//! module.execute_method(&MethodCall::new("addIdCaptureListener", json!({"modeId": 1})))?;
//! ```

mod commands;
mod config;
mod creation;
mod defaults;
mod dispatch;
mod error;
mod event_result;
mod image_cache;
mod lifecycle;
mod listener;
mod mode;
mod module;
mod native;
mod registry;
mod settings;
mod types;

pub mod testing;

// Re-export main types
pub use commands::{methods, IdCaptureCommand, MethodCall};
pub use config::{
    BridgeConfig, CallbackTimeouts, ASYNC_CALLBACK_TIMEOUT_MS, DEFAULT_CALLBACK_TIMEOUT_MS,
};
pub use creation::{removed_mode_id, ModeCreationData, OverlayCreationData, ID_CAPTURE_TYPE};
pub use defaults::{BrushDefaults, CameraSettingsDefaults, IdCaptureDefaults, OverlayDefaults};
pub use dispatch::{run_on_view, InlineDispatcher, ThreadDispatcher, ViewDispatcher, ViewTask};
pub use error::{BridgeError, NativeError, Result};
pub use event_result::EventWithResult;
pub use image_cache::{FileImageCache, ImageStore, InlineImages};
pub use lifecycle::{LifecycleDispatcher, LifecycleObserver};
pub use listener::IdCaptureListener;
pub use mode::{IdCaptureMode, ModeFactory};
pub use module::{IdCaptureModule, NativeBindings, PendingAction};
pub use native::{
    BarcodeVerifier, CaptureView, DataCaptureContext, IdCaptureDeserializer, IdCaptureObserver,
    NativeIdCapture, NativeOverlay, VerificationProvider,
};
pub use registry::{ModeRegistry, ModeTarget, RegisteredMode};
pub use settings::{
    AnonymizationMode, ExpiryWindow, Feedback, IdCaptureFeedback, IdCaptureSettings, Sound,
    Vibration,
};
pub use types::{CapturedId, IdImages, ImageBytes, TextHintPosition};

// Re-export event contracts the bridge emits
pub use idbridge_events::{event_names, RejectionReason};
