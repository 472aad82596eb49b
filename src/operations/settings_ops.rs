use serde_json::Value;
use std::sync::Arc;
use tracing::error;

use super::{ArgValidation, Operation, OperationParameter, OperationRoute};
use crate::error::SettingsError;
use crate::response::{OperationResult, ResponseBuilder};
use crate::settings::{SettingsStore, SettingsUpdate};

fn settings_failure(action: &str, e: SettingsError) -> Value {
    error!("Failed to {}: {}", action, e);
    OperationResult::failure(format!("Failed to {action}: {e}")).to_value()
}

/// Reads the folder the browser last saved
pub struct GetConfigPathOperation {
    settings: Arc<SettingsStore>,
}

impl GetConfigPathOperation {
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self { settings }
    }
}

impl Operation for GetConfigPathOperation {
    fn name(&self) -> &'static str {
        "get_config_path"
    }

    fn description(&self) -> &'static str {
        "Return the saved browsing path as {success, path}"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![
            OperationRoute::get("/api/get_config_path"),
            OperationRoute::post("/api/get_config_path"),
        ]
    }

    fn execute(&self, _args: &[Value]) -> Value {
        OperationResult::ok()
            .with_field("path", self.settings.saved_path())
            .to_value()
    }
}

pub struct SavePathOperation {
    settings: Arc<SettingsStore>,
}

impl SavePathOperation {
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self { settings }
    }
}

impl Operation for SavePathOperation {
    fn name(&self) -> &'static str {
        "save_path"
    }

    fn description(&self) -> &'static str {
        "Persist the browsing path"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![OperationParameter::required("path", "Path to remember")]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![OperationRoute::post("/api/save_path")]
    }

    fn execute(&self, args: &[Value]) -> Value {
        let path = match ArgValidation::extract_string(args, 0, "path") {
            Ok(path) => path,
            Err(e) => return OperationResult::from(e).to_value(),
        };
        match self.settings.save_path(&path) {
            Ok(()) => OperationResult::ok()
                .with_message("Path saved")
                .with_field("path", path)
                .to_value(),
            Err(e) => settings_failure("save path", e),
        }
    }
}

pub struct GetSettingsOperation {
    settings: Arc<SettingsStore>,
}

impl GetSettingsOperation {
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self { settings }
    }
}

impl Operation for GetSettingsOperation {
    fn name(&self) -> &'static str {
        "get_settings"
    }

    fn description(&self) -> &'static str {
        "Return the git, path and ui settings groups"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![
            OperationRoute::get("/api/get_settings"),
            OperationRoute::post("/api/get_settings"),
        ]
    }

    fn execute(&self, _args: &[Value]) -> Value {
        let groups = serde_json::to_value(self.settings.groups()).unwrap_or_default();
        // Object data is flattened next to `success`
        ResponseBuilder::new().success(true).data(groups).build().to_value()
    }
}

pub struct UpdateSettingsOperation {
    settings: Arc<SettingsStore>,
}

impl UpdateSettingsOperation {
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self { settings }
    }
}

impl Operation for UpdateSettingsOperation {
    fn name(&self) -> &'static str {
        "update_settings"
    }

    fn description(&self) -> &'static str {
        "Write any of the git, path and ui groups; only the keys given are changed"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![OperationParameter::required(
            "groups",
            "Object with optional git {repo, name}, path {path, allowed_extensions} and ui {theme, language, show_hidden_files, default_view}",
        )]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![OperationRoute::post("/api/update_settings")]
    }

    fn execute(&self, args: &[Value]) -> Value {
        let groups = match ArgValidation::extract_object(args, 0, "groups") {
            Ok(groups) => groups,
            Err(e) => return OperationResult::from(e).to_value(),
        };
        let update: SettingsUpdate = match serde_json::from_value(Value::Object(groups)) {
            Ok(update) => update,
            Err(e) => return OperationResult::failure(format!("Invalid settings: {e}")).to_value(),
        };
        match self.settings.update_groups(&update) {
            Ok(()) => OperationResult::ok().with_message("Settings saved").to_value(),
            Err(e) => settings_failure("save settings", e),
        }
    }
}

pub struct AddAllowedExtensionOperation {
    settings: Arc<SettingsStore>,
}

impl AddAllowedExtensionOperation {
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self { settings }
    }
}

impl Operation for AddAllowedExtensionOperation {
    fn name(&self) -> &'static str {
        "add_allowed_extension"
    }

    fn description(&self) -> &'static str {
        "Add a file extension to the allowed list"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![OperationParameter::required("extension", "Extension, with or without the leading dot")]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![OperationRoute::post("/api/add_allowed_extension")]
    }

    fn execute(&self, args: &[Value]) -> Value {
        let ext = match ArgValidation::extract_string(args, 0, "extension") {
            Ok(ext) => ext,
            Err(e) => return OperationResult::from(e).to_value(),
        };
        match self.settings.add_allowed_extension(&ext) {
            Ok(exts) => OperationResult::ok()
                .with_field("allowed_extensions", exts)
                .to_value(),
            Err(e) => settings_failure("add extension", e),
        }
    }
}

pub struct RemoveAllowedExtensionOperation {
    settings: Arc<SettingsStore>,
}

impl RemoveAllowedExtensionOperation {
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self { settings }
    }
}

impl Operation for RemoveAllowedExtensionOperation {
    fn name(&self) -> &'static str {
        "remove_allowed_extension"
    }

    fn description(&self) -> &'static str {
        "Remove a file extension from the allowed list"
    }

    fn parameters(&self) -> Vec<OperationParameter> {
        vec![OperationParameter::required("extension", "Extension, with or without the leading dot")]
    }

    fn routes(&self) -> Vec<OperationRoute> {
        vec![OperationRoute::post("/api/remove_allowed_extension")]
    }

    fn execute(&self, args: &[Value]) -> Value {
        let ext = match ArgValidation::extract_string(args, 0, "extension") {
            Ok(ext) => ext,
            Err(e) => return OperationResult::from(e).to_value(),
        };
        match self.settings.remove_allowed_extension(&ext) {
            Ok(exts) => OperationResult::ok()
                .with_field("allowed_extensions", exts)
                .to_value(),
            Err(e) => settings_failure("remove extension", e),
        }
    }
}
