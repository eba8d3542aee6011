// Author: godot-tscn contributors
// License: MIT

//! File and reader entry points, plus Godot path resolution.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ast::{Document, Value};
use crate::godot::{Import, Project, Resource, Scene};
use crate::options::AssembleOptions;
use crate::parser;
use crate::TscnError;

pub const PROJECT_FILE: &str = "project.godot";

/// Read and parse a file of any of the supported kinds.
///
/// # Example
/// ```no_run
/// let doc = godot_tscn::loader::load_document("Main.tscn")?;
/// assert_eq!(doc.header_key(), Some("gd_scene"));
/// # Ok::<(), godot_tscn::TscnError>(())
/// ```
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document, TscnError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| TscnError::FileError {
        path: path.to_string_lossy().to_string(),
        message: format!("Failed to read file: {}", e),
    })?;
    debug!(path = %path.display(), bytes = content.len(), "loaded file");
    parser::parse(&content)
}

/// Parse everything `reader` yields.
pub fn read_document<R: Read>(mut reader: R) -> Result<Document, TscnError> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(|e| TscnError::FileError {
            path: "<reader>".into(),
            message: format!("Failed to read input: {}", e),
        })?;
    parser::parse(&content)
}

pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, TscnError> {
    load_scene_with(path, &AssembleOptions::default())
}

pub fn load_scene_with<P: AsRef<Path>>(path: P, options: &AssembleOptions) -> Result<Scene, TscnError> {
    Scene::from_document_with(&load_document(path)?, options)
}

pub fn load_resource<P: AsRef<Path>>(path: P) -> Result<Resource, TscnError> {
    Resource::from_document(&load_document(path)?)
}

/// Load `project.godot`, either given directly or as the directory holding it.
pub fn load_project<P: AsRef<Path>>(path: P) -> Result<Project, TscnError> {
    let path = path.as_ref();
    let file = if path.is_dir() {
        path.join(PROJECT_FILE)
    } else {
        path.to_path_buf()
    };
    Project::from_document(&load_document(file)?)
}

pub fn load_import<P: AsRef<Path>>(path: P) -> Result<Import, TscnError> {
    Import::from_document(&load_document(path)?)
}

/// Nearest directory at or above `start` that contains `project.godot`.
pub fn find_project_root<P: AsRef<Path>>(start: P) -> Option<PathBuf> {
    let start = start.as_ref();
    let mut dir = if start.is_file() { start.parent()? } else { start };
    loop {
        if dir.join(PROJECT_FILE).is_file() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

/// Map a path as written in Godot files to a filesystem path.
///
/// - `res://a/b.tscn` is relative to `project_dir`
/// - `user://save.dat` is below the per-project user data directory
///   (`<data dir>/godot/app_userdata/<name>`), where `<name>` is
///   `application/config/name` from `project_dir/project.godot`, or the
///   directory name when that setting can't be read
/// - `~/x` is relative to the home directory
/// - absolute paths are kept, other relative paths are joined to `project_dir`
pub fn resolve_res_path<P: AsRef<Path>>(raw_path: &str, project_dir: P) -> Result<PathBuf, TscnError> {
    let project_dir = project_dir.as_ref();

    if let Some(rest) = raw_path.strip_prefix("res://") {
        return Ok(project_dir.join(rest));
    }

    if let Some(rest) = raw_path.strip_prefix("user://") {
        let data = dirs::data_dir().ok_or_else(|| TscnError::FileError {
            path: raw_path.to_string(),
            message: "Could not determine the user data directory for user:// expansion".into(),
        })?;
        return Ok(data
            .join("godot")
            .join("app_userdata")
            .join(project_name(project_dir))
            .join(rest));
    }

    let mut p = if let Some(rest) = raw_path.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(|| TscnError::FileError {
            path: raw_path.to_string(),
            message: "Could not determine home directory for ~ expansion".into(),
        })?;
        home.join(rest)
    } else {
        PathBuf::from(raw_path)
    };

    if p.is_relative() {
        p = project_dir.join(p);
    }
    Ok(p)
}

fn project_name(project_dir: &Path) -> String {
    let configured = load_project(project_dir).ok().and_then(|project| {
        project
            .setting("application", "config/name")
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    configured.unwrap_or_else(|| {
        project_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    })
}
