//! Recursive template tree copying

use crate::error::{Result, TemplateError};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Size of the buffer file contents are streamed through
pub const COPY_BUFFER_SIZE: usize = 8192;

/// Longest source or destination path the copier will build, in bytes
pub const MAX_PATH_LEN: usize = 4096;

/// Copy the contents of `src` into `dst`, recursing into subdirectories.
///
/// `dst` must already exist; nested directories are created as they are
/// encountered and tolerated if already present. Files with the same name
/// are overwritten. Symlinks are followed, and a directory that resolves to
/// one of its own ancestors aborts the copy with [`TemplateError::SymlinkLoop`].
///
/// The first failure aborts the whole copy; whatever was written before it
/// stays in place. On success, returns the copied files relative to `dst`.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<Vec<PathBuf>> {
    let root = fs::canonicalize(src).map_err(|source| TemplateError::SourceOpen {
        path: src.to_path_buf(),
        source,
    })?;

    let mut ancestors = vec![root];
    let mut copied = Vec::new();
    copy_dir(src, dst, Path::new(""), &mut ancestors, &mut copied)?;
    Ok(copied)
}

fn copy_dir(
    src: &Path,
    dst: &Path,
    relative: &Path,
    ancestors: &mut Vec<PathBuf>,
    copied: &mut Vec<PathBuf>,
) -> Result<()> {
    let source_open = |source| TemplateError::SourceOpen {
        path: src.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(src).map_err(source_open)? {
        let name = entry.map_err(source_open)?.file_name();
        let src_path = checked_join(src, &name)?;
        let dst_path = checked_join(dst, &name)?;
        let relative = relative.join(&name);

        let metadata = fs::metadata(&src_path).map_err(|source| TemplateError::Stat {
            path: src_path.clone(),
            source,
        })?;

        if metadata.is_dir() {
            let real = fs::canonicalize(&src_path).map_err(|source| TemplateError::Stat {
                path: src_path.clone(),
                source,
            })?;
            if let Some(ancestor) = ancestors.iter().find(|ancestor| **ancestor == real) {
                return Err(TemplateError::SymlinkLoop {
                    path: src_path,
                    ancestor: ancestor.clone(),
                });
            }

            create_dir(&dst_path)?;
            trace!(dir = %relative.display(), "created directory");

            ancestors.push(real);
            copy_dir(&src_path, &dst_path, &relative, ancestors, copied)?;
            ancestors.pop();
        } else {
            copy_file(&src_path, &dst_path)?;
            trace!(file = %relative.display(), "copied file");
            copied.push(relative);
        }
    }

    Ok(())
}

fn checked_join(base: &Path, name: &OsStr) -> Result<PathBuf> {
    let path = base.join(name);
    if path.as_os_str().len() > MAX_PATH_LEN {
        return Err(TemplateError::PathTooLong {
            path,
            limit: MAX_PATH_LEN,
        });
    }
    Ok(path)
}

/// Create a single directory, accepting one that already exists
fn create_dir(path: &Path) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(source) => Err(TemplateError::Mkdir {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    let input = File::open(from).map_err(|source| TemplateError::FileOpen {
        path: from.to_path_buf(),
        source,
    })?;
    let mut output = File::create(to).map_err(|source| TemplateError::FileOpen {
        path: to.to_path_buf(),
        source,
    })?;

    let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, input);
    io::copy(&mut reader, &mut output).map_err(|source| TemplateError::FileCopy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;
    use walkdir::WalkDir;

    /// Relative path -> file contents (None for directories)
    fn snapshot(root: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
        WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .map(|entry| {
                let entry = entry.unwrap();
                let relative = entry.path().strip_prefix(root).unwrap().to_path_buf();
                let contents = if entry.file_type().is_dir() {
                    None
                } else {
                    Some(fs::read(entry.path()).unwrap())
                };
                (relative, contents)
            })
            .collect()
    }

    fn sample_tree() -> TempDir {
        let src = TempDir::new().unwrap();
        let root = src.path();
        fs::write(root.join("README.md"), "# Project\n").unwrap();
        fs::write(root.join(".gitignore"), "target/\n").unwrap();
        fs::create_dir_all(root.join("src/bin")).unwrap();
        fs::write(root.join("src/main.c"), "int main(void) { return 0; }\n").unwrap();
        fs::write(root.join("src/bin/tool.c"), [0u8, 159, 146, 150, 255]).unwrap();
        fs::create_dir(root.join("empty")).unwrap();
        src
    }

    #[test]
    fn test_copies_file_byte_for_byte() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::write(src.path().join("test.txt"), "This is a test.").unwrap();

        let copied = copy_tree(src.path(), dst.path()).unwrap();

        assert_eq!(copied, vec![PathBuf::from("test.txt")]);
        let contents = fs::read(dst.path().join("test.txt")).unwrap();
        assert_eq!(contents, b"This is a test.");
        assert_eq!(contents.len(), "This is a test.".len());
    }

    #[test]
    fn test_copies_nested_tree() {
        let src = sample_tree();
        let dst = TempDir::new().unwrap();

        let mut copied = copy_tree(src.path(), dst.path()).unwrap();
        copied.sort();

        assert_eq!(snapshot(src.path()), snapshot(dst.path()));
        assert_eq!(
            copied,
            vec![
                PathBuf::from(".gitignore"),
                PathBuf::from("README.md"),
                PathBuf::from("src/bin/tool.c"),
                PathBuf::from("src/main.c"),
            ]
        );
    }

    #[test]
    fn test_copy_twice_is_idempotent() {
        let src = sample_tree();
        let dst = TempDir::new().unwrap();

        copy_tree(src.path(), dst.path()).unwrap();
        copy_tree(src.path(), dst.path()).unwrap();

        assert_eq!(snapshot(src.path()), snapshot(dst.path()));
    }

    #[test]
    fn test_large_file_spans_many_buffers() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let data: Vec<u8> = (0..COPY_BUFFER_SIZE * 5 + 17)
            .map(|i| (i % 251) as u8)
            .collect();
        fs::write(src.path().join("blob.bin"), &data).unwrap();

        copy_tree(src.path(), dst.path()).unwrap();

        assert_eq!(fs::read(dst.path().join("blob.bin")).unwrap(), data);
    }

    #[test]
    fn test_overwrites_existing_files_and_keeps_others() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::write(src.path().join("config.toml"), "fresh").unwrap();
        fs::write(dst.path().join("config.toml"), "stale and much longer").unwrap();
        fs::write(dst.path().join("local.txt"), "mine").unwrap();

        copy_tree(src.path(), dst.path()).unwrap();

        assert_eq!(
            fs::read_to_string(dst.path().join("config.toml")).unwrap(),
            "fresh"
        );
        assert_eq!(
            fs::read_to_string(dst.path().join("local.txt")).unwrap(),
            "mine"
        );
    }

    #[test]
    fn test_missing_source_leaves_destination_untouched() {
        let dir = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();

        let err = copy_tree(&dir.path().join("missing"), dst.path()).unwrap_err();

        assert!(matches!(err, TemplateError::SourceOpen { .. }));
        assert!(snapshot(dst.path()).is_empty());
    }

    #[test]
    fn test_destination_root_is_not_created() {
        let src = TempDir::new().unwrap();
        let parent = TempDir::new().unwrap();
        fs::write(src.path().join("main.rs"), "fn main() {}").unwrap();
        let dst = parent.path().join("project");

        let err = copy_tree(src.path(), &dst).unwrap_err();

        assert!(matches!(err, TemplateError::FileOpen { .. }));
        assert!(!dst.exists());
    }

    #[test]
    fn test_file_in_place_of_directory_fails() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir(src.path().join("src")).unwrap();
        fs::write(src.path().join("src/lib.rs"), "").unwrap();
        fs::write(dst.path().join("src"), "a file").unwrap();

        let err = copy_tree(src.path(), dst.path()).unwrap_err();
        assert!(matches!(err, TemplateError::Mkdir { .. }));
    }

    #[test]
    fn test_overlong_destination_path_aborts() {
        let src = TempDir::new().unwrap();
        fs::write(src.path().join("a.txt"), "a").unwrap();
        let dst = PathBuf::from("/").join("d".repeat(MAX_PATH_LEN));

        let err = copy_tree(src.path(), &dst).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::PathTooLong {
                limit: MAX_PATH_LEN,
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_followed() {
        use std::os::unix::fs::symlink;

        let src = TempDir::new().unwrap();
        let shared = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::write(shared.path().join("LICENSE"), "MIT").unwrap();
        symlink(shared.path().join("LICENSE"), src.path().join("LICENSE")).unwrap();
        symlink(shared.path(), src.path().join("shared")).unwrap();

        copy_tree(src.path(), dst.path()).unwrap();

        let license = dst.path().join("LICENSE");
        assert!(!fs::symlink_metadata(&license).unwrap().is_symlink());
        assert_eq!(fs::read_to_string(&license).unwrap(), "MIT");
        assert_eq!(
            fs::read_to_string(dst.path().join("shared/LICENSE")).unwrap(),
            "MIT"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_is_detected() {
        use std::os::unix::fs::symlink;

        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir(src.path().join("nested")).unwrap();
        symlink(src.path(), src.path().join("nested/back")).unwrap();

        let err = copy_tree(src.path(), dst.path()).unwrap_err();
        assert!(matches!(err, TemplateError::SymlinkLoop { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_symlink_aborts_copy() {
        use std::os::unix::fs::symlink;

        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        symlink(src.path().join("nowhere"), src.path().join("dangling")).unwrap();

        let err = copy_tree(src.path(), dst.path()).unwrap_err();
        assert!(matches!(err, TemplateError::Stat { .. }));
    }
}
