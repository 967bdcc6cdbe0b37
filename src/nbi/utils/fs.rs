//! File system utilities for NBI builds.
//!
//! Provides idempotent directory handling and a recursive copy that keeps
//! symlinks intact, which the NetInstall volume relies on.

use crate::nbi::error::{Error, ErrorExt, Result};
use std::{io, path::Path, time::SystemTime};
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }

    // create_dir_all is already idempotent - succeeds even if dir exists
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()), // Idempotent
        Err(e) => Err(e).fs_context("removing directory", path),
    }
}

/// Removes the file if it exists.
pub async fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing file", path),
    }
}

/// Moves a file, copying across filesystems when a rename is not possible.
pub async fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).await.is_ok() {
        return Ok(());
    }

    log::debug!("Copying {} to {}", from.display(), to.display());
    fs::copy(from, to).await.fs_context("copying", from)?;
    remove_file(from).await
}

/// Makes a symbolic link.
#[cfg(unix)]
fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(not(unix))]
fn symlink(_src: &Path, dst: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("cannot create symlink {}", dst.display()),
    ))
}

/// Copies a file, keeping its permissions and modification time.
fn copy_file(from: &Path, to: &Path) -> Result<()> {
    std::fs::copy(from, to).fs_context("copying", from)?;
    let modified = std::fs::metadata(from)
        .and_then(|metadata| metadata.modified())
        .fs_context("reading metadata of", from)?;
    set_modified(to, modified).fs_context("setting modification time on", to)
}

#[cfg(unix)]
fn set_modified(path: &Path, modified: SystemTime) -> io::Result<()> {
    std::fs::File::open(path)?.set_modified(modified)
}

#[cfg(not(unix))]
fn set_modified(path: &Path, modified: SystemTime) -> io::Result<()> {
    std::fs::File::options()
        .write(true)
        .open(path)?
        .set_modified(modified)
}

/// Recursively copies a directory from one path to another, creating any
/// parent directories of the destination path as necessary.
///
/// Preserves symlinks. Fails if the source path is not a directory or doesn't
/// exist. Copying into an existing directory merges into it.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(Error::GenericError(format!("{from:?} does not exist")));
    }
    if !from.is_dir() {
        return Err(Error::GenericError(format!("{from:?} is not a Directory")));
    }

    let from = from.to_path_buf();
    let to = to.to_path_buf();

    // Offload blocking work to dedicated thread pool
    tokio::task::spawn_blocking(move || -> Result<()> {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent).fs_context("creating directory", parent)?;
        }

        for entry in walkdir::WalkDir::new(&from) {
            let entry = entry?;
            let rel_path = entry.path().strip_prefix(&from)?;
            let dest_path = to.join(rel_path);

            if entry.file_type().is_symlink() {
                let target = std::fs::read_link(entry.path())
                    .fs_context("reading symlink", entry.path())?;
                symlink(&target, &dest_path).fs_context("creating symlink", &dest_path)?;
            } else if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dest_path).fs_context("creating directory", &dest_path)?;
            } else {
                copy_file(entry.path(), &dest_path)?;
            }
        }

        Ok(())
    })
    .await
    .map_err(|e| Error::GenericError(format!("Directory copy task panicked: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn copy_dir_preserves_tree_and_symlinks() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("a/b")).unwrap();
        std::fs::write(src.path().join("a/b/rc.imaging"), "#!/bin/sh").unwrap();
        #[cfg(unix)]
        std::os::unix::fs::symlink("b/rc.imaging", src.path().join("a/link")).unwrap();

        let target = dst.path().join("copy");
        copy_dir(src.path(), &target).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(target.join("a/b/rc.imaging")).unwrap(),
            "#!/bin/sh"
        );
        #[cfg(unix)]
        assert_eq!(
            std::fs::read_link(target.join("a/link")).unwrap(),
            Path::new("b/rc.imaging")
        );
    }

    #[tokio::test]
    async fn move_file_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("BaseSystemNew.dmg");
        let to = dir.path().join("BaseSystem.dmg");
        std::fs::write(&from, "new").unwrap();
        std::fs::write(&to, "old").unwrap();

        move_file(&from, &to).await.unwrap();

        assert!(!from.exists());
        assert_eq!(std::fs::read_to_string(&to).unwrap(), "new");
    }

    #[tokio::test]
    async fn copy_dir_keeps_modification_times() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let stamp = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_400_000_000);
        let file = src.path().join("rc.imaging");
        std::fs::write(&file, "#!/bin/sh").unwrap();
        std::fs::File::options()
            .write(true)
            .open(&file)
            .unwrap()
            .set_modified(stamp)
            .unwrap();

        copy_dir(src.path(), &dst.path().join("copy")).await.unwrap();

        let copied = std::fs::metadata(dst.path().join("copy/rc.imaging")).unwrap();
        assert_eq!(copied.modified().unwrap(), stamp);
    }

    #[tokio::test]
    async fn copy_dir_rejects_files() {
        let src = tempfile::NamedTempFile::new().unwrap();
        let dst = tempfile::tempdir().unwrap();
        assert!(copy_dir(src.path(), dst.path()).await.is_err());
    }

    #[tokio::test]
    async fn removals_are_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("gone");
        remove_dir_all(&dir).await.unwrap();
        remove_file(&dir.join("file")).await.unwrap();

        create_dir_all(&dir, false).await.unwrap();
        std::fs::write(dir.join("keep"), "x").unwrap();
        create_dir_all(&dir, true).await.unwrap();
        assert!(dir.is_dir());
        assert!(!dir.join("keep").exists());
    }
}
