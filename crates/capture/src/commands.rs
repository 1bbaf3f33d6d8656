//! Host method calls decoded into typed commands.
//!
//! Decoding checks every argument up front, so a command that made it to
//! [`IdCaptureCommand::execute`] performs exactly one module operation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use idbridge_events::event_names::ID_CAPTURE_LISTENER_EVENTS;

use crate::error::{BridgeError, Result};
use crate::module::IdCaptureModule;

/// Method names as constants to prevent typos.
pub mod methods {
    pub const RESET_ID_CAPTURE_MODE: &str = "resetIdCaptureMode";
    pub const SET_MODE_ENABLED_STATE: &str = "setModeEnabledState";
    pub const UPDATE_ID_CAPTURE_MODE: &str = "updateIdCaptureMode";
    pub const APPLY_ID_CAPTURE_MODE_SETTINGS: &str = "applyIdCaptureModeSettings";
    pub const UPDATE_FEEDBACK: &str = "updateFeedback";
    pub const UPDATE_ID_CAPTURE_OVERLAY: &str = "updateIdCaptureOverlay";
    pub const FINISH_DID_CAPTURE_CALLBACK: &str = "finishDidCaptureCallback";
    pub const FINISH_DID_REJECT_CALLBACK: &str = "finishDidRejectCallback";
    pub const ADD_ID_CAPTURE_LISTENER: &str = "addIdCaptureListener";
    pub const REMOVE_ID_CAPTURE_LISTENER: &str = "removeIdCaptureListener";
    pub const IS_MODE_ENABLED: &str = "isModeEnabled";
    pub const IS_TOPMOST_MODE_ENABLED: &str = "isTopmostModeEnabled";
    pub const SET_TOPMOST_MODE_ENABLED: &str = "setTopmostModeEnabled";
    pub const CREATE_AAMVA_BARCODE_VERIFIER: &str = "createAamvaBarcodeVerifier";
    pub const VERIFY_CAPTURED_ID_WITH_CLOUD: &str = "verifyCapturedIdWithCloud";
    pub const VERIFY_CAPTURED_ID_AAMVA_VIZ: &str = "verifyCapturedIdAamvaViz";
    pub const VERIFY_CAPTURED_ID_MRZ_VIZ: &str = "verifyCapturedIdMrzViz";
    pub const GET_ID_CAPTURE_DEFAULTS: &str = "getIdCaptureDefaults";
}

/// `{method, arguments}` envelope sent by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            method: method.into(),
            arguments,
        }
    }

    fn argument(&self, key: &str) -> Option<&Value> {
        self.arguments.get(key).filter(|value| !value.is_null())
    }

    /// A non-empty string argument.
    fn required_string(&self, key: &str) -> Result<String> {
        match self.argument(key) {
            None => Err(BridgeError::MissingParameter(key.to_string())),
            Some(Value::String(s)) if s.is_empty() => {
                Err(BridgeError::MissingParameter(key.to_string()))
            }
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(invalid(key, "a string")),
        }
    }

    /// An integer argument, 0 when absent.
    fn int_or_default(&self, key: &str) -> Result<i64> {
        match self.argument(key) {
            None => Ok(0),
            Some(value) => value.as_i64().ok_or_else(|| invalid(key, "an integer")),
        }
    }

    /// A boolean argument, false when absent.
    fn bool_or_default(&self, key: &str) -> Result<bool> {
        match self.argument(key) {
            None => Ok(false),
            Some(value) => value.as_bool().ok_or_else(|| invalid(key, "a boolean")),
        }
    }
}

fn invalid(name: &str, expected: &'static str) -> BridgeError {
    BridgeError::InvalidParameter {
        name: name.to_string(),
        expected,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IdCaptureCommand {
    ResetIdCaptureMode { mode_id: i64 },
    SetModeEnabledState { mode_id: i64, enabled: bool },
    UpdateIdCaptureMode { mode_id: i64, mode_json: String },
    ApplyIdCaptureModeSettings { mode_id: i64, settings_json: String },
    UpdateFeedback { mode_id: i64, feedback_json: String },
    UpdateIdCaptureOverlay { overlay_json: String },
    FinishDidCaptureCallback { mode_id: i64, enabled: bool },
    FinishDidRejectCallback { mode_id: i64, enabled: bool },
    AddIdCaptureListener { mode_id: i64 },
    RemoveIdCaptureListener { mode_id: i64 },
    IsModeEnabled { mode_id: i64 },
    IsTopmostModeEnabled,
    SetTopmostModeEnabled { enabled: bool },
    CreateAamvaBarcodeVerifier,
    VerifyCapturedIdWithCloud { captured_id_json: String },
    VerifyCapturedIdAamvaViz { captured_id_json: String },
    VerifyCapturedIdMrzViz { captured_id_json: String },
    GetIdCaptureDefaults,
}

impl IdCaptureCommand {
    /// Decode a method call. `Ok(None)` means the method is not ours.
    pub fn from_method_call(call: &MethodCall) -> Result<Option<Self>> {
        use IdCaptureCommand::*;

        let mode_id = || call.int_or_default("modeId");
        let enabled = || call.bool_or_default("enabled");

        let command = match call.method.as_str() {
            methods::RESET_ID_CAPTURE_MODE => ResetIdCaptureMode { mode_id: mode_id()? },
            methods::SET_MODE_ENABLED_STATE => SetModeEnabledState {
                mode_id: mode_id()?,
                enabled: enabled()?,
            },
            methods::UPDATE_ID_CAPTURE_MODE => UpdateIdCaptureMode {
                mode_json: call.required_string("modeJson")?,
                mode_id: mode_id()?,
            },
            methods::APPLY_ID_CAPTURE_MODE_SETTINGS => ApplyIdCaptureModeSettings {
                settings_json: call.required_string("settingsJson")?,
                mode_id: mode_id()?,
            },
            methods::UPDATE_FEEDBACK => UpdateFeedback {
                feedback_json: call.required_string("feedbackJson")?,
                mode_id: mode_id()?,
            },
            methods::UPDATE_ID_CAPTURE_OVERLAY => UpdateIdCaptureOverlay {
                overlay_json: call.required_string("overlayJson")?,
            },
            methods::FINISH_DID_CAPTURE_CALLBACK => FinishDidCaptureCallback {
                mode_id: mode_id()?,
                enabled: enabled()?,
            },
            methods::FINISH_DID_REJECT_CALLBACK => FinishDidRejectCallback {
                mode_id: mode_id()?,
                enabled: enabled()?,
            },
            methods::ADD_ID_CAPTURE_LISTENER => AddIdCaptureListener { mode_id: mode_id()? },
            methods::REMOVE_ID_CAPTURE_LISTENER => RemoveIdCaptureListener { mode_id: mode_id()? },
            methods::IS_MODE_ENABLED => IsModeEnabled { mode_id: mode_id()? },
            methods::IS_TOPMOST_MODE_ENABLED => IsTopmostModeEnabled,
            methods::SET_TOPMOST_MODE_ENABLED => SetTopmostModeEnabled { enabled: enabled()? },
            methods::CREATE_AAMVA_BARCODE_VERIFIER => CreateAamvaBarcodeVerifier,
            methods::VERIFY_CAPTURED_ID_WITH_CLOUD => VerifyCapturedIdWithCloud {
                captured_id_json: call.required_string("capturedIdJson")?,
            },
            methods::VERIFY_CAPTURED_ID_AAMVA_VIZ => VerifyCapturedIdAamvaViz {
                captured_id_json: call.required_string("capturedIdJson")?,
            },
            methods::VERIFY_CAPTURED_ID_MRZ_VIZ => VerifyCapturedIdMrzViz {
                captured_id_json: call.required_string("capturedIdJson")?,
            },
            methods::GET_ID_CAPTURE_DEFAULTS => GetIdCaptureDefaults,
            _ => return Ok(None),
        };
        Ok(Some(command))
    }

    /// Run the command. `Ok(None)` is a success without payload.
    pub fn execute(self, module: &IdCaptureModule) -> Result<Option<Value>> {
        use IdCaptureCommand::*;

        match self {
            ResetIdCaptureMode { mode_id } => module.reset_id_capture_mode(mode_id),
            SetModeEnabledState { mode_id, enabled } => {
                module.set_mode_enabled_state(mode_id, enabled)
            }
            UpdateIdCaptureMode { mode_id, mode_json } => {
                module.update_id_capture_mode(&mode_json, mode_id)?
            }
            ApplyIdCaptureModeSettings {
                mode_id,
                settings_json,
            } => module.apply_id_capture_mode_settings(&settings_json, mode_id)?,
            UpdateFeedback {
                mode_id,
                feedback_json,
            } => module.update_feedback(&feedback_json, mode_id)?,
            UpdateIdCaptureOverlay { overlay_json } => {
                module.update_id_capture_overlay(&overlay_json)?
            }
            FinishDidCaptureCallback { mode_id, enabled } => {
                module.finish_did_capture_callback(mode_id, enabled)
            }
            FinishDidRejectCallback { mode_id, enabled } => {
                module.finish_did_reject_callback(mode_id, enabled)
            }
            AddIdCaptureListener { mode_id } => {
                module
                    .emitter()
                    .register_mode_listener(mode_id, ID_CAPTURE_LISTENER_EVENTS);
                module.add_id_capture_listener(mode_id);
            }
            RemoveIdCaptureListener { mode_id } => {
                module
                    .emitter()
                    .unregister_mode_listener(mode_id, ID_CAPTURE_LISTENER_EVENTS);
                module.remove_id_capture_listener(mode_id);
            }
            IsModeEnabled { mode_id } => {
                return Ok(Some(Value::Bool(module.is_mode_enabled(mode_id))));
            }
            IsTopmostModeEnabled => {
                return Ok(Some(Value::Bool(module.is_topmost_mode_enabled())));
            }
            SetTopmostModeEnabled { enabled } => module.set_topmost_mode_enabled(enabled),
            CreateAamvaBarcodeVerifier => module.create_aamva_barcode_verifier()?,
            VerifyCapturedIdWithCloud { captured_id_json } => {
                let result = module.verify_captured_id_with_cloud(&captured_id_json)?;
                return Ok(Some(Value::String(result)));
            }
            VerifyCapturedIdAamvaViz { captured_id_json } => {
                let result = module.verify_captured_id_aamva_viz(&captured_id_json)?;
                return Ok(Some(Value::String(result)));
            }
            VerifyCapturedIdMrzViz { captured_id_json } => {
                let result = module.verify_captured_id_mrz_viz(&captured_id_json)?;
                return Ok(Some(Value::String(result)));
            }
            GetIdCaptureDefaults => return Ok(Some(module.defaults())),
        }
        Ok(None)
    }
}

impl IdCaptureModule {
    /// Decode and run one host method call.
    pub fn execute_method(&self, call: &MethodCall) -> Result<Option<Value>> {
        let command = IdCaptureCommand::from_method_call(call)?
            .ok_or_else(|| BridgeError::MethodNotRecognized(call.method.clone()))?;
        tracing::debug!(method = %call.method, "Executing command");
        command.execute(self)
    }
}
