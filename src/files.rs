//! Filesystem helpers behind the browser pane: directory listings, file reads,
//! well-known locations and repository detection.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::FileError;
use crate::response::OperationResult;

const SIZE_UNITS: [&str; 6] = ["Bytes", "KB", "MB", "GB", "TB", "PB"];
const MTIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const UNIX_MOUNTS: [&str; 8] = ["/", "/home", "/usr", "/var", "/tmp", "/opt", "/mnt", "/media"];
const UNIX_SYSTEM_DIRS: [&str; 3] = ["/bin", "/sbin", "/etc"];

/// One row of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub size_formatted: String,
    pub modified_time: String,
    pub is_file: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    Directory,
    Drive,
}

/// A location offered in the sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonPath {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: PathKind,
}

impl CommonPath {
    fn directory(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            path: path.as_ref().to_string_lossy().into_owned(),
            kind: PathKind::Directory,
        }
    }
}

/// Human readable size with two decimals, e.g. `1.50 KB`
pub fn format_size(size: u64) -> String {
    if size == 0 {
        return format!("0 {}", SIZE_UNITS[0]);
    }
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, SIZE_UNITS[unit])
}

/// Total size of the regular files below `path`. Unreadable entries are skipped.
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

fn format_mtime(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format(MTIME_FORMAT).to_string()
}

fn check_directory(path: &Path) -> Result<(), FileError> {
    if !path.exists() {
        return Err(FileError::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(FileError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Entries of `path`, directories first, each group sorted by name
pub fn list_directory(path: &Path) -> Result<Vec<FileEntry>, FileError> {
    check_directory(path)?;

    let reader = fs::read_dir(path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => FileError::PermissionDenied(path.to_path_buf()),
        _ => FileError::IoError(e),
    })?;

    let mut entries = Vec::new();
    for item in reader {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                debug!("Skipping unreadable entry in {:?}: {}", path, e);
                continue;
            }
        };
        let item_path = item.path();
        // Follows symlinks; dangling links have no metadata and are skipped
        let meta = match fs::metadata(&item_path) {
            Ok(meta) => meta,
            Err(e) => {
                debug!("Skipping {:?}: {}", item_path, e);
                continue;
            }
        };

        let is_file = meta.is_file();
        let size = if is_file { meta.len() } else { dir_size(&item_path) };
        let size_formatted = if is_file {
            format_size(size)
        } else {
            format!("{} (directory)", format_size(size))
        };

        entries.push(FileEntry {
            name: item.file_name().to_string_lossy().into_owned(),
            path: item_path.to_string_lossy().into_owned(),
            size,
            size_formatted,
            modified_time: meta.modified().map(format_mtime).unwrap_or_default(),
            is_file,
        });
    }

    entries.sort_by(|a, b| {
        a.is_file
            .cmp(&b.is_file)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    Ok(entries)
}

/// Listing of `path` as an operation result with `path` and `contents`
pub fn get_files(path: &str) -> OperationResult {
    match list_directory(Path::new(path)) {
        Ok(entries) => OperationResult::ok()
            .with_field("path", path)
            .with_field("contents", serde_json::to_value(entries).unwrap_or_default()),
        Err(e) => {
            warn!("Could not list {}: {}", path, e);
            OperationResult::failure(e.to_string())
        }
    }
}

/// UTF-8 contents of a regular file
pub fn read_file(path: &Path) -> Result<String, FileError> {
    if !path.exists() {
        return Err(FileError::NotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(FileError::NotAFile(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(FileError::ReadFailed)
}

/// File text, or the error text when it cannot be read
pub fn read(path: &str) -> String {
    read_file(Path::new(path)).unwrap_or_else(|e| {
        debug!("Read of {} failed: {}", path, e);
        e.to_string()
    })
}

/// True when `path` is a directory holding a `.git` directory
pub fn is_git_repository(path: &str) -> bool {
    let path = Path::new(path);
    path.is_dir() && path.join(".git").is_dir()
}

/// Well-known locations that exist on this machine
pub fn common_paths() -> Vec<CommonPath> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(CommonPath::directory("Current directory", cwd));
    }
    if let Some(home) = dirs::home_dir() {
        paths.push(CommonPath::directory("Home directory", home));
    }

    let user_dirs: [(&str, Option<PathBuf>); 6] = [
        ("Desktop", dirs::desktop_dir()),
        ("Documents", dirs::document_dir()),
        ("Downloads", dirs::download_dir()),
        ("Music", dirs::audio_dir()),
        ("Pictures", dirs::picture_dir()),
        ("Videos", dirs::video_dir()),
    ];
    for (name, dir) in user_dirs {
        if let Some(dir) = dir.filter(|d| d.is_dir()) {
            paths.push(CommonPath::directory(name, dir));
        }
    }

    if cfg!(windows) {
        paths.extend(windows_drives());
    } else {
        paths.extend(unix_locations());
    }
    paths
}

fn windows_drives() -> Vec<CommonPath> {
    ('A'..='Z')
        .map(|letter| format!("{letter}:\\"))
        .filter(|drive| Path::new(drive).exists())
        .map(|drive| CommonPath {
            name: format!("Local Disk ({})", &drive[..2]),
            path: drive,
            kind: PathKind::Drive,
        })
        .collect()
}

fn unix_locations() -> Vec<CommonPath> {
    let mut paths: Vec<CommonPath> = UNIX_MOUNTS
        .iter()
        .filter(|mount| Path::new(mount).is_dir())
        .map(|mount| CommonPath::directory(*mount, mount))
        .collect();

    if let Ok(media) = fs::read_dir("/media") {
        let mut mounted: Vec<PathBuf> = media
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        mounted.sort();
        for path in mounted {
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            paths.push(CommonPath::directory(format!("media/{name}"), path));
        }
    }

    for dir in UNIX_SYSTEM_DIRS {
        if Path::new(dir).exists() {
            paths.push(CommonPath::directory(&dir[1..], dir));
        }
    }
    paths
}

/// Common locations as an operation result with `paths`
pub fn list_paths() -> OperationResult {
    let paths = common_paths();
    debug!("Listing {} common paths", paths.len());
    OperationResult::ok().with_field("paths", serde_json::to_value(paths).unwrap_or_default())
}
