//! YAML-backed user settings.
//!
//! The document lives at a single path and is cached after the first successful load.
//! Every successful write invalidates the cache so the next read sees the file again.
//! A missing or unparseable file reads as an empty document and is never cached.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{SettingsError, SettingsResult};

/// Top-level key holding everything the UI persists
pub const USER_SETTINGS_KEY: &str = "userSettings";

/// Key path of the auto-commit interval, stored as text in seconds
pub const AUTO_COMMIT_INTERVAL_KEY: &str = "userSettings.auto.auto_submit_and_push.time";

const ALLOWED_EXTENSIONS_KEY: &str = "userSettings.allowed_extensions";

/// Interval used when the settings hold no usable value
pub const FALLBACK_INTERVAL_SECONDS: u64 = 60;

const DEFAULT_INTERVAL_TEXT: &str = "10";

pub fn default_allowed_extensions() -> Vec<String> {
    [".txt", ".md", ".json", ".yaml", ".yml"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Typed view of the `userSettings` mapping with defaults for absent keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub path: String,
    pub allowed_extensions: Vec<String>,
    pub theme: String,
    pub language: String,
    pub show_hidden_files: bool,
    pub default_view: String,
    pub github_repo: String,
    pub name: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            path: String::new(),
            allowed_extensions: default_allowed_extensions(),
            theme: "default".to_string(),
            language: "zh-CN".to_string(),
            show_hidden_files: false,
            default_view: "list".to_string(),
            github_repo: String::new(),
            name: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitSettings {
    pub repo: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    pub path: String,
    pub allowed_extensions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiSettings {
    pub theme: String,
    pub language: String,
    pub show_hidden_files: bool,
    pub default_view: String,
}

/// The settings grouped the way the settings page edits them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsGroups {
    pub git: GitSettings,
    pub path: PathSettings,
    pub ui: UiSettings,
}

impl From<UserSettings> for SettingsGroups {
    fn from(user: UserSettings) -> Self {
        Self {
            git: GitSettings {
                repo: user.github_repo,
                name: user.name,
            },
            path: PathSettings {
                path: user.path,
                allowed_extensions: user.allowed_extensions,
            },
            ui: UiSettings {
                theme: user.theme,
                language: user.language,
                show_hidden_files: user.show_hidden_files,
                default_view: user.default_view,
            },
        }
    }
}

/// Partial update of the settings groups. Only the keys present are written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsUpdate {
    pub git: Option<GitUpdate>,
    pub path: Option<PathUpdate>,
    pub ui: Option<UiUpdate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GitUpdate {
    pub repo: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathUpdate {
    pub path: Option<String>,
    pub allowed_extensions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UiUpdate {
    pub theme: Option<String>,
    pub language: Option<String>,
    pub show_hidden_files: Option<bool>,
    pub default_view: Option<String>,
}

impl SettingsUpdate {
    /// `userSettings` keys and values this update writes
    fn entries(&self) -> Vec<(&'static str, Value)> {
        let mut entries = Vec::new();
        let mut push = |key: &'static str, value: Option<Value>| {
            if let Some(value) = value {
                entries.push((key, value));
            }
        };

        if let Some(git) = &self.git {
            push("github_repo", git.repo.clone().map(Value::from));
            push("name", git.name.clone().map(Value::from));
        }
        if let Some(path) = &self.path {
            push("path", path.path.clone().map(Value::from));
            push(
                "allowed_extensions",
                path.allowed_extensions
                    .as_ref()
                    .map(|exts| Value::Sequence(exts.iter().map(|e| Value::from(normalize_extension(e))).collect())),
            );
        }
        if let Some(ui) = &self.ui {
            push("theme", ui.theme.clone().map(Value::from));
            push("language", ui.language.clone().map(Value::from));
            push("show_hidden_files", ui.show_hidden_files.map(Value::from));
            push("default_view", ui.default_view.clone().map(Value::from));
        }
        entries
    }
}

/// Lower-cased extension with exactly one leading dot
pub fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim().trim_start_matches('.');
    format!(".{}", trimmed.to_lowercase())
}

/// Cached document plus a counter bumped on every invalidation
#[derive(Debug, Default)]
struct Cached {
    doc: Option<Value>,
    generation: u64,
}

/// Owner of the settings file and its cached contents.
/// Writers are serialized so each read-modify-write sees the previous one's result.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    cache: RwLock<Cached>,
    write_lock: Mutex<()>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        debug!("Settings file: {:?}", path);
        Self {
            path,
            cache: RwLock::new(Cached::default()),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop the cached document so the next read goes back to disk
    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.doc = None;
            cache.generation = cache.generation.wrapping_add(1);
        }
    }

    /// The whole document, from cache when fresh
    pub fn load(&self) -> Value {
        let generation = match self.cache.read() {
            Ok(cache) => match cache.doc.as_ref() {
                Some(doc) => return doc.clone(),
                None => Some(cache.generation),
            },
            Err(_) => None,
        };

        match self.read_from_disk() {
            Ok(doc) => {
                // An invalidation since the read began means `doc` may predate a save
                if let (Some(generation), Ok(mut cache)) = (generation, self.cache.write())
                    && cache.generation == generation
                {
                    cache.doc = Some(doc.clone());
                }
                doc
            }
            Err(SettingsError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {:?}", self.path);
                Value::Mapping(Mapping::new())
            }
            Err(e) => {
                warn!("Could not load settings from {:?}: {}", self.path, e);
                Value::Mapping(Mapping::new())
            }
        }
    }

    fn read_from_disk(&self) -> SettingsResult<Value> {
        let text = std::fs::read_to_string(&self.path)?;
        let doc: Value = serde_yaml::from_str(&text)?;
        // An empty file parses as null
        Ok(match doc {
            Value::Null => Value::Mapping(Mapping::new()),
            other => other,
        })
    }

    /// The on-disk document for a write. A missing file is empty; a file that
    /// does not parse is an error, so it is never replaced.
    fn load_for_write(&self) -> SettingsResult<Value> {
        match self.read_from_disk() {
            Err(SettingsError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Value::Mapping(Mapping::new()))
            }
            Err(SettingsError::YamlError(e)) => {
                warn!("Refusing to overwrite unparseable settings file {:?}: {}", self.path, e);
                Err(SettingsError::Corrupt(self.path.clone(), e))
            }
            other => other,
        }
    }

    /// Read, change and write the document under the write lock.
    /// Nothing is written when `change` leaves the document as it was.
    fn modify<R>(&self, change: impl FnOnce(&mut Value) -> SettingsResult<R>) -> SettingsResult<R> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut doc = self.load_for_write()?;
        let before = doc.clone();
        let result = change(&mut doc)?;
        if doc != before {
            self.write_to_disk(&doc)?;
        }
        Ok(result)
    }

    /// Write `doc` to disk, creating parent directories, then invalidate the cache
    pub fn save(&self, doc: &Value) -> SettingsResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_to_disk(doc)
    }

    /// Readers see either the old file or the new one, never a partial write
    fn write_to_disk(&self, doc: &Value) -> SettingsResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_yaml::to_string(doc)?;

        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "settings".to_string());
        let temp_path = self
            .path
            .with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));
        std::fs::write(&temp_path, text)?;
        if let Err(e) = std::fs::rename(&temp_path, &self.path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }

        self.invalidate();
        info!("Saved settings to {:?}", self.path);
        Ok(())
    }

    /// Value at a dotted key path such as `userSettings.theme`
    pub fn get(&self, key_path: &str) -> Option<Value> {
        lookup(&self.load(), key_path).cloned()
    }

    /// Scalar at `key_path` rendered as text
    pub fn get_str(&self, key_path: &str) -> Option<String> {
        match self.get(key_path)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Sequence of scalars at `key_path`; anything else yields an empty list
    pub fn get_list(&self, key_path: &str) -> Vec<String> {
        match self.get(key_path) {
            Some(Value::Sequence(items)) => scalars(&items),
            _ => Vec::new(),
        }
    }

    /// Set the value at a dotted key path, creating intermediate mappings, and persist
    pub fn set<T: Serialize>(&self, key_path: &str, value: T) -> SettingsResult<()> {
        let value = serde_yaml::to_value(value)?;
        self.modify(|doc| set_path(doc, key_path, value))
    }

    pub fn user_settings(&self) -> UserSettings {
        match self.get(USER_SETTINGS_KEY) {
            None | Some(Value::Null) => UserSettings::default(),
            Some(value) => serde_yaml::from_value(value).unwrap_or_else(|e| {
                warn!("Malformed {} in {:?}: {}", USER_SETTINGS_KEY, self.path, e);
                UserSettings::default()
            }),
        }
    }

    pub fn groups(&self) -> SettingsGroups {
        self.user_settings().into()
    }

    /// Apply a partial group update in a single write
    pub fn update_groups(&self, update: &SettingsUpdate) -> SettingsResult<()> {
        let entries = update.entries();
        if entries.is_empty() {
            return Ok(());
        }
        self.modify(|doc| {
            for (key, value) in entries {
                set_path(doc, &format!("{USER_SETTINGS_KEY}.{key}"), value)?;
            }
            Ok(())
        })
    }

    /// The folder the browser last saved, empty when none
    pub fn saved_path(&self) -> String {
        self.get_str(&format!("{USER_SETTINGS_KEY}.path")).unwrap_or_default()
    }

    pub fn save_path(&self, path: &str) -> SettingsResult<()> {
        self.set(&format!("{USER_SETTINGS_KEY}.path"), path)
    }

    pub fn allowed_extensions(&self) -> Vec<String> {
        extensions_in(&self.load())
    }

    /// Add an extension; returns the resulting list. Adding a present extension is a no-op.
    pub fn add_allowed_extension(&self, ext: &str) -> SettingsResult<Vec<String>> {
        let ext = normalize_extension(ext);
        if ext == "." {
            return Err(SettingsError::InvalidValue("extension is empty".to_string()));
        }
        self.modify(|doc| {
            let mut exts = extensions_in(doc);
            if !exts.iter().any(|e| normalize_extension(e) == ext) {
                exts.push(ext);
                set_path(doc, ALLOWED_EXTENSIONS_KEY, serde_yaml::to_value(&exts)?)?;
            }
            Ok(exts)
        })
    }

    /// Remove an extension; returns the resulting list
    pub fn remove_allowed_extension(&self, ext: &str) -> SettingsResult<Vec<String>> {
        let ext = normalize_extension(ext);
        self.modify(|doc| {
            let mut exts = extensions_in(doc);
            let before = exts.len();
            exts.retain(|e| normalize_extension(e) != ext);
            if exts.len() != before {
                set_path(doc, ALLOWED_EXTENSIONS_KEY, serde_yaml::to_value(&exts)?)?;
            }
            Ok(exts)
        })
    }

    /// Auto-commit interval from the settings, defaulting to ten seconds.
    /// Values that are not positive integers fall back to a minute.
    pub fn auto_commit_interval(&self) -> u64 {
        let raw = self
            .get_str(AUTO_COMMIT_INTERVAL_KEY)
            .unwrap_or_else(|| DEFAULT_INTERVAL_TEXT.to_string());
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                warn!("Invalid auto-commit interval {:?}, using {}s", raw, FALLBACK_INTERVAL_SECONDS);
                FALLBACK_INTERVAL_SECONDS
            }
        }
    }
}

fn lookup<'a>(doc: &'a Value, key_path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for key in key_path.split('.') {
        current = current.as_mapping()?.get(key)?;
    }
    Some(current)
}

fn scalars(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

/// The configured extension list, or the defaults when none is set
fn extensions_in(doc: &Value) -> Vec<String> {
    match lookup(doc, ALLOWED_EXTENSIONS_KEY) {
        Some(Value::Sequence(items)) => scalars(items),
        _ => default_allowed_extensions(),
    }
}

fn set_path(doc: &mut Value, key_path: &str, value: Value) -> SettingsResult<()> {
    let keys: Vec<&str> = key_path.split('.').collect();
    if keys.iter().any(|k| k.is_empty()) {
        return Err(SettingsError::InvalidKeyPath(key_path.to_string()));
    }
    let Some((last, parents)) = keys.split_last() else {
        return Err(SettingsError::InvalidKeyPath(key_path.to_string()));
    };

    if doc.is_null() {
        *doc = Value::Mapping(Mapping::new());
    }
    let mut current = doc;
    for key in parents {
        let map = current
            .as_mapping_mut()
            .ok_or_else(|| SettingsError::InvalidKeyPath(key_path.to_string()))?;
        let child = map
            .entry(Value::from(*key))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if child.is_null() {
            *child = Value::Mapping(Mapping::new());
        }
        current = child;
    }

    current
        .as_mapping_mut()
        .ok_or_else(|| SettingsError::InvalidKeyPath(key_path.to_string()))?
        .insert(Value::from(*last), value);
    Ok(())
}
