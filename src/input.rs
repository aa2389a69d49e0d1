//! Seeds the session's input queue from standard input or a directory walk.

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, trace};

use crate::flow_file_store::FlowFileStore;
use crate::session::Session;
use crate::types::{Attributes, FILENAME_ATTRIBUTE};

/// Failures while seeding input.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum InputError {
  #[error("Input file directory does not exist: {}", path.display())]
  DirectoryNotFound { path: PathBuf },
  #[error("Input file location is not a directory: {}", path.display())]
  NotADirectory { path: PathBuf },
  #[error("Could not read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("Could not read standard input: {source}")]
  Stdin {
    #[source]
    source: std::io::Error,
  },
}

/// Reads `reader` to end-of-stream and enqueues the bytes as one flow file.
/// Empty input seeds nothing. Returns the number of flow files seeded.
#[instrument(level = "trace", skip(store, session, reader, attributes))]
pub fn seed_from_reader(
  store: &mut FlowFileStore,
  session: &mut Session,
  reader: &mut dyn Read,
  attributes: &Attributes,
) -> Result<usize, InputError> {
  let mut buf = Vec::new();
  reader
    .read_to_end(&mut buf)
    .map_err(|source| InputError::Stdin { source })?;
  if buf.is_empty() {
    debug!("standard input is empty; nothing seeded");
    return Ok(0);
  }
  let flow_file = store.create(buf, attributes);
  trace!(id = %flow_file.id(), size = flow_file.size(), "seeded flow file from standard input");
  session.enqueue(flow_file);
  Ok(1)
}

/// Enqueues one flow file per regular file under `dir`, with `filename` set
/// to the file's base name over `attributes`. Returns the number seeded.
#[instrument(level = "trace", skip(store, session, attributes))]
pub fn seed_from_directory(
  store: &mut FlowFileStore,
  session: &mut Session,
  dir: &Path,
  attributes: &Attributes,
) -> Result<usize, InputError> {
  let files = collect_files(dir)?;
  for path in &files {
    let content = std::fs::read(path).map_err(|source| InputError::Read {
      path: path.clone(),
      source,
    })?;
    let mut attrs = attributes.clone();
    if let Some(name) = path.file_name() {
      attrs.insert(
        FILENAME_ATTRIBUTE.to_string(),
        name.to_string_lossy().into_owned(),
      );
    }
    let flow_file = store.create(content, &attrs);
    trace!(id = %flow_file.id(), path = %path.display(), "seeded flow file");
    session.enqueue(flow_file);
  }
  info!(dir = %dir.display(), count = files.len(), "seeded flow files from directory");
  Ok(files.len())
}

/// Walks `dir` recursively and returns every regular file, sorted by name
/// within each directory. Symlinks count only when they point at a regular
/// file; symlinked directories are not descended.
pub fn collect_files(dir: &Path) -> Result<Vec<PathBuf>, InputError> {
  if !dir.exists() {
    return Err(InputError::DirectoryNotFound {
      path: dir.to_path_buf(),
    });
  }
  if !dir.is_dir() {
    return Err(InputError::NotADirectory {
      path: dir.to_path_buf(),
    });
  }
  let mut files = Vec::new();
  walk(dir, &mut files)?;
  Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), InputError> {
  let read_err = |source| InputError::Read {
    path: dir.to_path_buf(),
    source,
  };
  let mut entries = std::fs::read_dir(dir)
    .map_err(read_err)?
    .collect::<Result<Vec<_>, _>>()
    .map_err(read_err)?;
  entries.sort_by_key(|e| e.file_name());

  for entry in entries {
    let path = entry.path();
    let file_type = entry.file_type().map_err(|source| InputError::Read {
      path: path.clone(),
      source,
    })?;
    if file_type.is_dir() {
      walk(&path, files)?;
    } else if file_type.is_file() {
      files.push(path);
    } else if file_type.is_symlink() {
      match std::fs::metadata(&path) {
        Ok(meta) if meta.is_file() => files.push(path),
        _ => trace!(path = %path.display(), "skipping symlink to non-file"),
      }
    } else {
      trace!(path = %path.display(), "skipping non-regular entry");
    }
  }
  Ok(())
}
