//! Transform strategy contract
//!
//! A strategy decides which files are processed, how their target files are
//! named and what each line becomes. Plugins supply strategies; the
//! [`FilePipeline`](super::FilePipeline) drives them.

use std::fs::File;
use std::io;

/// Per-file, per-line transformation driven by the file pipeline
///
/// One instance is reused for every file found during a single traversal.
/// [`reset`](TransformStrategy::reset) is called once per file, before the
/// first line is read, and is the only point where per-file state should be
/// cleared.
pub trait TransformStrategy {
    /// Returns true if a file discovered while walking a directory should be
    /// processed. Files named explicitly on the command line bypass this.
    fn should_process(&self, file_name: &str) -> bool;

    /// Returns true if the target file name comes from
    /// [`target_name`](TransformStrategy::target_name) rather than the
    /// input file name.
    fn uses_generated_names(&self) -> bool {
        false
    }

    /// Generated target file name. An empty name discards the output.
    fn target_name(&self) -> String {
        String::new()
    }

    /// Called once, right after the target file is created and before any
    /// line is written to it.
    fn prepare_target(&mut self, _target: &mut File) -> io::Result<()> {
        Ok(())
    }

    /// Transforms one input line (without its terminator). The returned
    /// string is written verbatim, so it must carry its own newline.
    fn process_line(&mut self, line: &str) -> String;

    /// Clears per-file state
    fn reset(&mut self) {}
}

impl<S: TransformStrategy + ?Sized> TransformStrategy for Box<S> {
    fn should_process(&self, file_name: &str) -> bool {
        (**self).should_process(file_name)
    }

    fn uses_generated_names(&self) -> bool {
        (**self).uses_generated_names()
    }

    fn target_name(&self) -> String {
        (**self).target_name()
    }

    fn prepare_target(&mut self, target: &mut File) -> io::Result<()> {
        (**self).prepare_target(target)
    }

    fn process_line(&mut self, line: &str) -> String {
        (**self).process_line(line)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
