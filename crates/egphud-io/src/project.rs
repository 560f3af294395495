use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use egphud_core::Project;

/// Suffix the designer gives saved projects.
pub const PROJECT_EXTENSION: &str = ".e2hud.json";

#[derive(Error, Debug)]
pub enum ProjectFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid project JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Append [`PROJECT_EXTENSION`] unless the path already ends in `.json`.
pub fn with_project_extension(path: &Path) -> PathBuf {
    let name = path.to_string_lossy();
    if name.to_ascii_lowercase().ends_with(".json") {
        path.to_path_buf()
    } else {
        PathBuf::from(format!("{}{}", name, PROJECT_EXTENSION))
    }
}

/// Serialize a project as pretty-printed JSON.
pub fn write_project<W: Write>(project: &Project, writer: W) -> Result<(), ProjectFileError> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, project)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Parse a project, then repair missing layers and a dangling active layer.
pub fn read_project<R: Read>(reader: R) -> Result<Project, ProjectFileError> {
    let mut project: Project = serde_json::from_reader(BufReader::new(reader))?;
    if project.repair() {
        log::warn!("Project needed structural repair on load");
    }
    Ok(project)
}

pub fn save_project(project: &Project, path: &Path) -> Result<(), ProjectFileError> {
    let file = File::create(path)?;
    write_project(project, file)?;
    log::info!(
        "Saved project ({} layers, {} shapes) to {}",
        project.layers.len(),
        project.shape_count(),
        path.display()
    );
    Ok(())
}

pub fn load_project(path: &Path) -> Result<Project, ProjectFileError> {
    let file = File::open(path)?;
    let project = read_project(file)?;
    log::info!(
        "Loaded project {}x{} from {}",
        project.resolution.0,
        project.resolution.1,
        path.display()
    );
    Ok(project)
}
