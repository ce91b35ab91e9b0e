//! Target file creation
//!
//! Target files are never overwritten. When the desired name is taken, a
//! numeric suffix is inserted before the extension: `notes.md`,
//! `notes 1.md`, `notes 2.md`, ...

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};

use crate::cli::Output;

/// Returns `name` with ` <index>` inserted before its extension
///
/// Index 0 returns the name unchanged.
pub fn unique_file_name(name: &str, index: u32) -> String {
    if index == 0 {
        return name.to_string();
    }

    let path = Path::new(name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => {
            let stem = stem.to_string_lossy();
            let ext = ext.to_string_lossy();
            let file_name = format!("{} {}.{}", stem, index, ext);
            match path.parent().filter(|p| !p.as_os_str().is_empty()) {
                Some(parent) => parent.join(file_name).to_string_lossy().into_owned(),
                None => file_name,
            }
        }
        _ => format!("{} {}", name, index),
    }
}

/// Creates a new target file at `desired`, or at the first free suffixed
/// variant of it
///
/// Returns the open handle and the path actually created.
pub fn create_target_file(desired: &Path) -> io::Result<(File, PathBuf)> {
    let file_name = desired
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            io::Error::new(
                ErrorKind::InvalidInput,
                format!("Target path has no file name: {}", desired.display()),
            )
        })?;
    let dir = desired.parent().unwrap_or_else(|| Path::new(""));

    let mut index = 0;
    loop {
        let candidate = dir.join(unique_file_name(&file_name, index));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((file, candidate)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => index += 1,
            Err(e) => return Err(e),
        }
    }
}

/// Seeds a target file with an unmodified copy of `source` and opens it for
/// appending
///
/// If the copy cannot be made (typically because the destination already
/// exists), a fresh target is created from scratch instead.
pub fn copy_then_open_for_append(
    output_dir: &Path,
    source: &Path,
    output: &Output,
) -> io::Result<(File, PathBuf)> {
    let file_name = source.file_name().ok_or_else(|| {
        io::Error::new(
            ErrorKind::InvalidInput,
            format!("Source path has no file name: {}", source.display()),
        )
    })?;
    let destination = output_dir.join(file_name);

    match copy_file(source, &destination) {
        Ok(()) => {
            output.detailed(&format!(
                "Opening output copy of source file: {}",
                file_name.to_string_lossy()
            ));
            let file = OpenOptions::new().append(true).open(&destination)?;
            Ok((file, destination))
        }
        Err(e) => {
            output.detailed(&format!("Source file not copied ({}). Creating from scratch.", e));
            create_target_file(&destination)
        }
    }
}

/// Copies a regular file, refusing to replace an existing destination
fn copy_file(source: &Path, destination: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;
    if !metadata.is_file() {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            format!("{} is not a regular file", source.display()),
        ));
    }

    copy_into(&mut File::open(source)?, destination)
}

/// Streams `reader` into a new file, removing it again if the copy fails
fn copy_into(reader: &mut impl Read, destination: &Path) -> io::Result<()> {
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)?;
    if let Err(e) = io::copy(reader, &mut writer) {
        drop(writer);
        let _ = fs::remove_file(destination);
        return Err(e);
    }
    Ok(())
}

/// Creates the output directory tree if it does not exist yet
pub fn create_output_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn unique_name_inserts_index_before_extension() {
        assert_eq!(unique_file_name("a.md", 0), "a.md");
        assert_eq!(unique_file_name("a.md", 1), "a 1.md");
        assert_eq!(unique_file_name("archive.tar.gz", 2), "archive.tar 2.gz");
        assert_eq!(unique_file_name("README", 3), "README 3");
        assert_eq!(unique_file_name(".bashrc", 1), ".bashrc 1");
    }

    #[test]
    fn create_target_uses_desired_name_when_free() {
        let dir = TempDir::new().unwrap();
        let desired = dir.path().join("a.md");

        let (_, path) = create_target_file(&desired).unwrap();

        assert_eq!(path, desired);
        assert!(path.is_file());
    }

    #[test]
    fn create_target_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let desired = dir.path().join("a.md");
        fs::write(&desired, "first").unwrap();
        fs::write(dir.path().join("a 1.md"), "second").unwrap();

        let (_, path) = create_target_file(&desired).unwrap();

        assert_eq!(path, dir.path().join("a 2.md"));
        assert_eq!(fs::read_to_string(&desired).unwrap(), "first");
        assert_eq!(fs::read_to_string(dir.path().join("a 1.md")).unwrap(), "second");
    }

    #[test]
    fn create_target_fails_for_missing_directory() {
        let dir = TempDir::new().unwrap();
        let desired = dir.path().join("missing").join("a.md");

        assert!(create_target_file(&desired).is_err());
    }

    #[test]
    fn copy_then_append_seeds_with_source() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        let source = dir.path().join("page.md");
        fs::write(&source, "original\n").unwrap();

        let (mut file, path) = copy_then_open_for_append(&out, &source, &Output::default()).unwrap();
        file.write_all(b"appended\n").unwrap();
        drop(file);

        assert_eq!(path, out.join("page.md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "original\nappended\n");
    }

    #[test]
    fn copy_then_append_starts_fresh_when_destination_exists() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        let source = dir.path().join("page.md");
        fs::write(&source, "original\n").unwrap();
        fs::write(out.join("page.md"), "previous run\n").unwrap();

        let (_, path) = copy_then_open_for_append(&out, &source, &Output::default()).unwrap();

        assert_eq!(path, out.join("page 1.md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        assert_eq!(fs::read_to_string(out.join("page.md")).unwrap(), "previous run\n");
    }

    #[test]
    fn create_output_dir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("a").join("b");

        create_output_dir(&out).unwrap();
        create_output_dir(&out).unwrap();

        assert!(out.is_dir());
    }

    /// Yields some bytes, then fails
    struct Truncated(bool);

    impl Read for Truncated {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0 {
                return Err(io::Error::new(ErrorKind::Other, "disk went away"));
            }
            self.0 = true;
            buf[..4].copy_from_slice(b"part");
            Ok(4)
        }
    }

    #[test]
    fn failed_copy_leaves_no_partial_file() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("a.md");

        let err = copy_into(&mut Truncated(false), &destination).unwrap_err();

        assert_eq!(err.to_string(), "disk went away");
        assert!(!destination.exists());
    }

    proptest! {
        #[test]
        fn collision_suffix_is_first_free_index(taken in 0u32..6) {
            let dir = TempDir::new().unwrap();
            let desired = dir.path().join("note.txt");
            for index in 0..taken {
                fs::write(dir.path().join(unique_file_name("note.txt", index)), "x").unwrap();
            }

            let (_, path) = create_target_file(&desired).unwrap();

            prop_assert_eq!(path, dir.path().join(unique_file_name("note.txt", taken)));
        }

        #[test]
        fn suffixed_names_keep_extension(stem in "[a-z]{1,8}", ext in "[a-z]{1,4}", index in 1u32..1000) {
            let name = format!("{}.{}", stem, ext);
            let unique = unique_file_name(&name, index);

            prop_assert_eq!(unique, format!("{} {}.{}", stem, index, ext));
        }
    }
}
