//! Recursive file processing
//!
//! Walks a file or directory tree depth-first, streaming every accepted file
//! line by line through a [`TransformStrategy`] into the output directory.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::strategy::TransformStrategy;
use super::target::create_target_file;
use crate::cli::Output;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to inspect {path}: {source}")]
    Stat { path: PathBuf, source: io::Error },

    #[error("Failed to list directory {path}: {source}")]
    ReadDir { path: PathBuf, source: io::Error },

    #[error("Failed to open {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to create target file {path}: {source}")]
    CreateTarget { path: PathBuf, source: io::Error },

    #[error("Failed to write target file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// What a traversal did, in visiting order
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineSummary {
    /// Target files created
    pub written: Vec<PathBuf>,

    /// Files rejected by the strategy
    pub skipped: Vec<PathBuf>,

    /// Entries that vanished between listing and inspection
    pub missing: Vec<PathBuf>,

    /// Files whose output was discarded for lack of a target name
    pub discarded: Vec<PathBuf>,
}

/// Drives a transform strategy over files and directories
pub struct FilePipeline<'a> {
    output: &'a Output,
    output_dir: PathBuf,
    summary: PipelineSummary,
}

impl<'a> FilePipeline<'a> {
    /// Creates a pipeline writing target files into `output_dir`
    pub fn new(output: &'a Output, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output,
            output_dir: output_dir.into(),
            summary: PipelineSummary::default(),
        }
    }

    pub fn summary(&self) -> &PipelineSummary {
        &self.summary
    }

    pub fn into_summary(self) -> PipelineSummary {
        self.summary
    }

    /// Processes a file or, recursively, a directory
    ///
    /// A path that does not exist is reported and treated as empty. A file
    /// named directly is processed even if the strategy would not accept it
    /// during a directory walk.
    pub fn process_path<S>(&mut self, path: &Path, strategy: &mut S) -> Result<(), PipelineError>
    where
        S: TransformStrategy + ?Sized,
    {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.output
                    .normal(&format!("Item {} does not exist.", path.display()));
                self.summary.missing.push(path.to_path_buf());
                return Ok(());
            }
            Err(source) => {
                return Err(PipelineError::Stat {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if metadata.is_dir() {
            self.process_directory(path, strategy)
        } else {
            self.process_file(path, strategy).map(|_| ())
        }
    }

    /// Processes every accepted file below `source_dir`
    pub fn process_directory<S>(
        &mut self,
        source_dir: &Path,
        strategy: &mut S,
    ) -> Result<(), PipelineError>
    where
        S: TransformStrategy + ?Sized,
    {
        let read_dir_err = |source| PipelineError::ReadDir {
            path: source_dir.to_path_buf(),
            source,
        };

        // Snapshot the listing so targets written below are never revisited
        let entries = fs::read_dir(source_dir)
            .map_err(read_dir_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_dir_err)?;

        for entry in entries {
            let name = entry.file_name().to_string_lossy().into_owned();
            self.output.detailed(&name);

            let child = entry.path();
            let metadata = match fs::metadata(&child) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    self.output
                        .normal(&format!("File {} does not exist.", child.display()));
                    self.summary.missing.push(child);
                    continue;
                }
                Err(source) => return Err(PipelineError::Stat { path: child, source }),
            };

            if metadata.is_dir() {
                self.process_directory(&child, strategy)?;
            } else if strategy.should_process(&name) {
                self.process_file(&child, strategy)?;
            } else {
                self.output.normal(&format!("Skipping: {}", name));
                self.summary.skipped.push(child);
            }
        }

        Ok(())
    }

    /// Streams one file through the strategy
    ///
    /// The target file is created when the first line has been read, so an
    /// empty input produces no target. Returns the created target, if any.
    pub fn process_file<S>(
        &mut self,
        path: &Path,
        strategy: &mut S,
    ) -> Result<Option<PathBuf>, PipelineError>
    where
        S: TransformStrategy + ?Sized,
    {
        let input = File::open(path).map_err(|source| PipelineError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let target_name = if strategy.uses_generated_names() {
            strategy.target_name()
        } else {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };

        strategy.reset();

        let mut reader = BufReader::new(input);
        let mut buf = Vec::new();
        let mut target: Option<(BufWriter<File>, PathBuf)> = None;
        for index in 0usize.. {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| PipelineError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
            if read == 0 {
                break;
            }
            let line = String::from_utf8_lossy(strip_terminator(&buf));
            let processed = strategy.process_line(&line);

            if index == 0 {
                if target_name.is_empty() {
                    self.output.normal(&format!(
                        "No target file name for {}; discarding output.",
                        path.display()
                    ));
                    self.summary.discarded.push(path.to_path_buf());
                } else {
                    target = Some(self.open_target(&target_name, strategy)?);
                }
            }

            self.output.verbose(&processed);
            if let Some((writer, target_path)) = target.as_mut() {
                writer
                    .write_all(processed.as_bytes())
                    .map_err(|source| PipelineError::Write {
                        path: target_path.clone(),
                        source,
                    })?;
            }
        }

        match target {
            Some((mut writer, target_path)) => {
                writer.flush().map_err(|source| PipelineError::Write {
                    path: target_path.clone(),
                    source,
                })?;
                self.summary.written.push(target_path.clone());
                Ok(Some(target_path))
            }
            None => Ok(None),
        }
    }

    fn open_target<S>(
        &self,
        target_name: &str,
        strategy: &mut S,
    ) -> Result<(BufWriter<File>, PathBuf), PipelineError>
    where
        S: TransformStrategy + ?Sized,
    {
        let desired = self.output_dir.join(target_name);
        let (mut file, target_path) =
            create_target_file(&desired).map_err(|source| PipelineError::CreateTarget {
                path: desired.clone(),
                source,
            })?;
        self.output
            .detailed(&format!("Writing {}", target_path.display()));

        strategy
            .prepare_target(&mut file)
            .map_err(|source| PipelineError::Write {
                path: target_path.clone(),
                source,
            })?;

        Ok((BufWriter::new(file), target_path))
    }
}

/// Drops a trailing `\n` or `\r\n`
fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
