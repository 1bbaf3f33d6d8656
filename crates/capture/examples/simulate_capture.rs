//! Example: Drive the bridge through one capture and one rejection.
//!
//! Run with: cargo run -p idbridge-capture --example simulate_capture

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use idbridge_capture::event_names::{DID_CAPTURE_ID, DID_REJECT_ID};
use idbridge_capture::testing::{FakeContext, FakeDeserializer, FakeView};
use idbridge_capture::{
    BridgeConfig, CapturedId, IdCaptureModule, LifecycleDispatcher, MethodCall, NativeBindings,
    RejectionReason, ThreadDispatcher,
};
use idbridge_events::{Emitter, InMemoryEventBus};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,idbridge=debug")),
        )
        .init();

    println!("=== ID Capture Bridge Example ===\n");

    let bus = Arc::new(InMemoryEventBus::new());
    let deserializer = Arc::new(FakeDeserializer::new());
    let config = BridgeConfig {
        default_callback_timeout_ms: 500,
        ..BridgeConfig::default()
    };
    let module = Arc::new(IdCaptureModule::new(
        Arc::new(Emitter::new(bus.clone())),
        NativeBindings {
            deserializer: deserializer.clone(),
            dispatcher: Arc::new(ThreadDispatcher::spawn("idbridge-view")?),
            verification: None,
        },
        &config,
    ));

    let lifecycle = LifecycleDispatcher::new();
    module.did_start(&lifecycle);
    lifecycle.notify_context_deserialized(Arc::new(FakeContext::new()));

    // The overlay arrives before its mode and waits for it.
    let view = Arc::new(FakeView::new(Some(1)));
    lifecycle.notify_overlay_added(
        r#"{"type":"idCapture","frontSideTextHint":"Scan the front"}"#,
        view.clone(),
    );
    lifecycle.notify_mode_added(r#"{"type":"idCapture","modeId":7,"parentId":1,"enabled":true}"#);
    println!("Overlays attached to the view: {}", view.overlay_count());

    module.execute_method(&MethodCall::new("addIdCaptureListener", json!({"modeId": 7})))?;
    let native = deserializer.last_mode().ok_or("mode was not created")?;

    // The engine reports from its own thread and waits for the host's answer.
    let engine = {
        let native = native.clone();
        thread::spawn(move || {
            let captured = CapturedId::from_json(r#"{"firstName":"Ada","lastName":"Lovelace"}"#);
            let keep_capturing = native.trigger_captured(&captured);
            let after_reject = native.trigger_rejected(None, RejectionReason::DocumentExpired);
            (keep_capturing, after_reject)
        })
    };

    if bus.wait_for(DID_CAPTURE_ID, 1, Duration::from_secs(5)) {
        let event = &bus.events_for(DID_CAPTURE_ID)[0];
        println!("Host received {}: {}", event.topic, event.payload);
        module.execute_method(&MethodCall::new(
            "finishDidCaptureCallback",
            json!({"modeId": 7, "enabled": true}),
        ))?;
    }

    if bus.wait_for(DID_REJECT_ID, 1, Duration::from_secs(5)) {
        let event = &bus.events_for(DID_REJECT_ID)[0];
        println!("Host received {}: {}", event.topic, event.payload);
        module.execute_method(&MethodCall::new(
            "finishDidRejectCallback",
            json!({"modeId": 7, "enabled": false}),
        ))?;
    }

    let (keep_capturing, after_reject) = engine
        .join()
        .map_err(|_| "engine thread panicked")?;
    println!("Engine continued after capture: {:?}", keep_capturing);
    println!("Engine continued after rejection: {:?}", after_reject);

    module.did_stop(&lifecycle);
    println!("\nModes left after stop: {}", module.modes().len());
    Ok(())
}
