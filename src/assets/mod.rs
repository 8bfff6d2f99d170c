//! Assets directory — where pasted images land on disk.
//!
//! Images are saved as `<dir_name>/<name>.<extension>` next to the
//! document. Existing files are overwritten without warning.

use std::io;
use std::path::{Path, PathBuf};

/// Errors from materializing an image asset.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("cannot create assets directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write image {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Naming scheme for saved images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLayout {
    /// Directory created as a sibling of the document.
    pub dir_name: String,
    /// File extension appended to the user-supplied name.
    pub extension: String,
}

impl Default for AssetLayout {
    fn default() -> Self {
        Self {
            dir_name: "figs".into(),
            extension: "png".into(),
        }
    }
}

/// Resolved locations for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    /// The assets directory itself.
    pub assets_dir: PathBuf,
    /// Where the image is written.
    pub absolute_path: PathBuf,
    /// Path inserted into the document, relative to the document's
    /// directory and always `/`-separated.
    pub relative_path: String,
}

impl AssetLayout {
    /// Resolve the asset paths for `name` next to `document`.
    ///
    /// `name` is used as-is; callers validate it first.
    pub fn resolve(&self, document: &Path, name: &str) -> AssetPaths {
        let document_dir = document.parent().unwrap_or_else(|| Path::new(""));
        let assets_dir = document_dir.join(&self.dir_name);
        let file_name = format!("{name}.{}", self.extension);

        AssetPaths {
            absolute_path: assets_dir.join(&file_name),
            relative_path: format!("{}/{file_name}", self.dir_name),
            assets_dir,
        }
    }
}

/// Create the assets directory if it does not exist yet.
///
/// Single level only: fails when the document's directory is missing.
/// An existing directory is not an error, so repeated pastes into the
/// same document never trip over it.
pub async fn ensure_assets_dir(dir: &Path) -> Result<(), AssetError> {
    match tokio::fs::create_dir(dir).await {
        Ok(()) => {
            tracing::info!(dir = %dir.display(), "created assets directory");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(source) => Err(AssetError::CreateDir {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Write image bytes to `path`, replacing whatever is there.
pub async fn write_image(path: &Path, image: &[u8]) -> Result<(), AssetError> {
    let write_err = |source| AssetError::Write {
        path: path.to_path_buf(),
        source,
    };

    clear_destination(path).await.map_err(write_err)?;
    tokio::fs::write(path, image).await.map_err(write_err)
}

/// Duplicate the file or directory tree at `from` to `to`.
///
/// Whatever sits at `to` is replaced. A symlink passed as `from` is
/// followed; symlinks inside a copied tree are recreated as links.
/// Copying a file onto itself is a no-op, and copying a directory into
/// itself is refused before anything is touched. Runs on the blocking
/// pool.
pub async fn copy_path(from: &Path, to: &Path) -> Result<(), AssetError> {
    let copy_err = |source| AssetError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if is_same_file(from, to) {
        tracing::debug!(path = %from.display(), "source is already the asset");
        return Ok(());
    }
    if let Some(reason) = overlap(from, to) {
        return Err(copy_err(io::Error::new(io::ErrorKind::InvalidInput, reason)));
    }

    clear_destination(to).await.map_err(copy_err)?;

    let (src, dst) = (from.to_path_buf(), to.to_path_buf());
    tokio::task::spawn_blocking(move || copy_tree(&src, &dst))
        .await
        .unwrap_or_else(|join| Err(io::Error::other(join)))
        .map_err(copy_err)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Why `from` cannot be copied to `to`, if one contains the other.
fn overlap(from: &Path, to: &Path) -> Option<&'static str> {
    let from = from.canonicalize().ok()?;
    let to = canonical_destination(to)?;

    if to.starts_with(&from) {
        Some("cannot copy a directory into itself")
    } else if from.starts_with(&to) {
        Some("source lies inside the destination")
    } else {
        None
    }
}

/// Canonical form of a path that may not exist yet.
fn canonical_destination(to: &Path) -> Option<PathBuf> {
    match to.canonicalize() {
        Ok(path) => Some(path),
        Err(_) => Some(to.parent()?.canonicalize().ok()?.join(to.file_name()?)),
    }
}

/// Remove an existing file, link or directory tree at `path`.
async fn clear_destination(path: &Path) -> io::Result<()> {
    match tokio::fs::symlink_metadata(path).await {
        Ok(meta) if meta.is_dir() => {
            tracing::debug!(path = %path.display(), "replacing directory asset");
            tokio::fs::remove_dir_all(path).await
        }
        Ok(_) => tokio::fs::remove_file(path).await,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    if from.is_dir() {
        std::fs::create_dir(to)?;
        copy_entries(from, to)
    } else {
        std::fs::copy(from, to).map(|_| ())
    }
}

fn copy_entries(from: &Path, to: &Path) -> io::Result<()> {
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let (src, dst) = (entry.path(), to.join(entry.file_name()));
        let file_type = entry.file_type()?;

        if file_type.is_symlink() {
            copy_link(&src, &dst)?;
        } else if file_type.is_dir() {
            std::fs::create_dir(&dst)?;
            copy_entries(&src, &dst)?;
        } else {
            std::fs::copy(&src, &dst)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_link(from: &Path, to: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(std::fs::read_link(from)?, to)
}

#[cfg(not(unix))]
fn copy_link(from: &Path, _to: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("cannot copy symlink {}", from.display()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_places_image_next_to_document() {
        let paths = AssetLayout::default().resolve(Path::new("/notes/week1/log.md"), "foo");
        assert_eq!(paths.assets_dir, Path::new("/notes/week1/figs"));
        assert_eq!(paths.absolute_path, Path::new("/notes/week1/figs/foo.png"));
        assert_eq!(paths.relative_path, "figs/foo.png");
    }

    #[test]
    fn resolve_honours_custom_layout() {
        let layout = AssetLayout {
            dir_name: "img".into(),
            extension: "png".into(),
        };
        let paths = layout.resolve(Path::new("/a/b.txt"), "shot 1");
        assert_eq!(paths.absolute_path, Path::new("/a/img/shot 1.png"));
        assert_eq!(paths.relative_path, "img/shot 1.png");
    }

    #[test]
    fn resolve_relative_document() {
        let paths = AssetLayout::default().resolve(Path::new("README.md"), "x");
        assert_eq!(paths.assets_dir, Path::new("figs"));
        assert_eq!(paths.absolute_path, Path::new("figs/x.png"));
    }

    #[tokio::test]
    async fn ensure_assets_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let figs = dir.path().join("figs");

        ensure_assets_dir(&figs).await.unwrap();
        ensure_assets_dir(&figs).await.unwrap();
        assert!(figs.is_dir());
    }

    #[tokio::test]
    async fn ensure_assets_dir_does_not_create_parents() {
        let dir = tempfile::tempdir().unwrap();
        let figs = dir.path().join("missing").join("figs");

        let err = ensure_assets_dir(&figs).await.unwrap_err();
        assert!(matches!(err, AssetError::CreateDir { .. }));
        assert!(!dir.path().join("missing").exists());
    }

    #[tokio::test]
    async fn ensure_assets_dir_rejects_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let figs = dir.path().join("figs");
        std::fs::write(&figs, b"not a dir").unwrap();

        assert!(ensure_assets_dir(&figs).await.is_err());
    }

    #[tokio::test]
    async fn write_image_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foo.png");

        write_image(&path, b"first").await.unwrap();
        write_image(&path, b"second").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }

    #[tokio::test]
    async fn write_image_bad_path() {
        let err = write_image(Path::new("/nonexistent/dir/foo.png"), b"data")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dir/foo.png"));
    }

    #[tokio::test]
    async fn copy_path_duplicates_file_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("shot.png");
        let dst = dir.path().join("copy.png");
        std::fs::write(&src, b"\x89PNG\r\n\x1a\nrest").unwrap();
        std::fs::write(&dst, b"stale").unwrap();

        copy_path(&src, &dst).await.unwrap();
        assert_eq!(std::fs::read(&dst).unwrap(), b"\x89PNG\r\n\x1a\nrest");
    }

    #[tokio::test]
    async fn copy_path_duplicates_directory_tree() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("bundle");
        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::write(src.join("a.txt"), b"a").unwrap();
        std::fs::write(src.join("nested").join("b.txt"), b"b").unwrap();

        let dst = dir.path().join("out.png");
        copy_path(&src, &dst).await.unwrap();

        assert_eq!(std::fs::read(dst.join("a.txt")).unwrap(), b"a");
        assert_eq!(std::fs::read(dst.join("nested").join("b.txt")).unwrap(), b"b");
    }

    #[tokio::test]
    async fn copy_path_onto_itself_keeps_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foo.png");
        std::fs::write(&path, b"keep me").unwrap();

        copy_path(&path, &dir.path().join(".").join("foo.png"))
            .await
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"keep me");
    }

    #[tokio::test]
    async fn write_image_replaces_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foo.png");
        std::fs::create_dir_all(path.join("old")).unwrap();

        write_image(&path, b"image").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"image");
    }

    #[tokio::test]
    async fn copy_path_replaces_directory_without_stale_entries() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("foo.png");
        std::fs::create_dir(&dst).unwrap();
        std::fs::write(dst.join("stale.txt"), b"old").unwrap();

        let src = dir.path().join("bundle");
        std::fs::create_dir(&src).unwrap();
        std::fs::write(src.join("fresh.txt"), b"new").unwrap();

        copy_path(&src, &dst).await.unwrap();
        assert_eq!(std::fs::read(dst.join("fresh.txt")).unwrap(), b"new");
        assert!(!dst.join("stale.txt").exists());
    }

    #[tokio::test]
    async fn copy_path_file_replaces_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("foo.png");
        std::fs::create_dir(&dst).unwrap();
        let src = dir.path().join("shot.png");
        std::fs::write(&src, b"file").unwrap();

        copy_path(&src, &dst).await.unwrap();
        assert_eq!(std::fs::read(&dst).unwrap(), b"file");
    }

    #[tokio::test]
    async fn copy_path_refuses_directory_into_itself() {
        let dir = tempfile::tempdir().unwrap();
        let figs = dir.path().join("figs");
        std::fs::create_dir(&figs).unwrap();
        let dst = figs.join("foo.png");

        let err = copy_path(dir.path(), &dst).await.unwrap_err();
        assert!(matches!(err, AssetError::Copy { .. }));
        assert!(err.to_string().contains("into itself"));
        assert!(!dst.exists());
    }

    #[tokio::test]
    async fn copy_path_refuses_source_inside_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("foo.png");
        std::fs::create_dir(&dst).unwrap();
        let src = dst.join("inner.png");
        std::fs::write(&src, b"keep").unwrap();

        assert!(copy_path(&src, &dst).await.is_err());
        assert_eq!(std::fs::read(&src).unwrap(), b"keep");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn copy_path_keeps_symlinks_as_links() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("bundle");
        std::fs::create_dir(&src).unwrap();
        std::fs::write(src.join("a.txt"), b"a").unwrap();
        // Points back at its own directory.
        std::os::unix::fs::symlink("..", src.join("loop")).unwrap();

        let dst = dir.path().join("out.png");
        copy_path(&src, &dst).await.unwrap();

        let link = dst.join("loop");
        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_link(&link).unwrap(), Path::new(".."));
        assert_eq!(std::fs::read(dst.join("a.txt")).unwrap(), b"a");
    }

    #[tokio::test]
    async fn copy_path_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = copy_path(&dir.path().join("gone"), &dir.path().join("x.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, AssetError::Copy { .. }));
    }
}
