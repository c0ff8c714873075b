//! Uploaded image storage
//!
//! Images are written into a single upload folder under a sanitized version
//! of the client's filename. An upload with the same sanitized name replaces
//! the earlier file. Nothing is ever deleted.

use moodlog_common::db::MAX_IMAGE_FILENAME_LEN;
use moodlog_common::Result;
use std::path::{Path, PathBuf};
use tracing::info;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// Device names Windows refuses as file names, regardless of extension
const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Filesystem store for uploaded images
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Upload folder
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a stored image
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Create the upload folder if missing
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Save uploaded bytes and return the sanitized filename
    pub async fn save(&self, client_filename: &str, contents: &[u8]) -> Result<String> {
        let filename = sanitize_filename(client_filename);
        self.ensure_dir().await?;

        let path = self.path_for(&filename);
        tokio::fs::write(&path, contents).await?;

        info!(
            path = %path.display(),
            bytes = contents.len(),
            "File saved"
        );
        Ok(filename)
    }
}

/// Make a client-supplied filename safe to store
///
/// Accented letters are folded to their ASCII base (`Café` → `Cafe`). Drops
/// directory components and anything outside `[A-Za-z0-9_.-]`, so the
/// result can never escape the upload folder. Never returns an empty
/// string and never exceeds the `image_filename` column limit.
pub fn sanitize_filename(raw: &str) -> String {
    let ascii: String = raw
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let mut name = trim_separators(&kept).to_string();

    if name.is_empty() {
        return format!("upload_{}", Uuid::new_v4().simple());
    }

    let stem = name.split('.').next().unwrap_or_default().to_ascii_uppercase();
    if WINDOWS_DEVICE_NAMES.contains(&stem.as_str()) {
        name.insert(0, '_');
    }

    truncate_keeping_extension(name, MAX_IMAGE_FILENAME_LEN)
}

fn trim_separators(name: &str) -> &str {
    name.trim_matches(|c| c == '.' || c == '_')
}

// Input is ASCII by this point, so byte offsets are char boundaries.
fn truncate_keeping_extension(name: String, max: usize) -> String {
    if name.len() <= max {
        return name;
    }
    let truncated = match name.rfind('.') {
        Some(dot) if name.len() - dot < max => {
            let ext = &name[dot..];
            format!("{}{}", &name[..max - ext.len()], ext)
        }
        _ => name[..max].to_string(),
    };
    trim_separators(&truncated).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_are_kept() {
        assert_eq!(sanitize_filename("face.jpg"), "face.jpg");
        assert_eq!(sanitize_filename("my-photo_01.PNG"), "my-photo_01.PNG");
    }

    #[test]
    fn test_spaces_become_underscores() {
        assert_eq!(sanitize_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(sanitize_filename("  two   spaces .jpg"), "two_spaces_.jpg");
    }

    #[test]
    fn test_path_components_are_flattened() {
        assert_eq!(sanitize_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("/absolute/path/img.png"), "absolute_path_img.png");
        assert_eq!(sanitize_filename("C:\\Users\\me\\face.jpg"), "C_Users_me_face.jpg");
    }

    #[test]
    fn test_unsafe_characters_are_removed() {
        assert_eq!(sanitize_filename("i<3\"you\".jpg"), "i3you.jpg");
        assert_eq!(sanitize_filename("smile😀.png"), "smile.png");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
    }

    #[test]
    fn test_accents_are_folded() {
        assert_eq!(sanitize_filename("Café.jpg"), "Cafe.jpg");
        assert_eq!(sanitize_filename("naïve résumé.png"), "naive_resume.png");
    }

    #[test]
    fn test_windows_device_names_are_prefixed() {
        assert_eq!(sanitize_filename("con.jpg"), "_con.jpg");
        assert_eq!(sanitize_filename("LPT1"), "_LPT1");
        assert_eq!(sanitize_filename("console.jpg"), "console.jpg");
    }

    #[test]
    fn test_empty_result_gets_generated_name() {
        for raw in ["", "...", "😀😀", "/"] {
            let name = sanitize_filename(raw);
            assert!(name.starts_with("upload_"), "{raw:?} -> {name}");
            assert!(name.len() > "upload_".len());
        }
    }

    #[test]
    fn test_long_names_keep_extension() {
        let raw = format!("{}.jpeg", "a".repeat(300));
        let name = sanitize_filename(&raw);
        assert_eq!(name.len(), MAX_IMAGE_FILENAME_LEN);
        assert!(name.ends_with(".jpeg"));

        let no_ext = "b".repeat(250);
        assert_eq!(sanitize_filename(&no_ext).len(), MAX_IMAGE_FILENAME_LEN);
    }

    #[test]
    fn test_truncation_does_not_leave_trailing_dot() {
        // Extension too long to keep, cut lands right after a dot
        let raw = format!("{}.c.{}", "b".repeat(199), "d".repeat(300));
        let name = sanitize_filename(&raw);
        assert_eq!(name, "b".repeat(199));

        let raw = format!("{}_{}", "e".repeat(199), "f".repeat(100));
        assert_eq!(sanitize_filename(&raw), "e".repeat(199));
    }

    #[tokio::test]
    async fn test_save_creates_directory_and_writes() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = ImageStore::new(dir.path().join("static").join("uploads"));

        let name = store.save("../face.jpg", b"image-bytes").await.unwrap();

        assert_eq!(name, "face.jpg");
        let written = std::fs::read(store.path_for(&name)).unwrap();
        assert_eq!(written, b"image-bytes");
    }

    #[tokio::test]
    async fn test_save_overwrites_same_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = ImageStore::new(dir.path());

        store.save("face.jpg", b"first").await.unwrap();
        store.save("face.jpg", b"second").await.unwrap();

        assert_eq!(std::fs::read(store.path_for("face.jpg")).unwrap(), b"second");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_save_reports_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        // A regular file where the upload folder should be
        let blocker = dir.path().join("uploads");
        std::fs::write(&blocker, b"").unwrap();
        let store = ImageStore::new(&blocker);

        let err = store.save("face.jpg", b"bytes").await.unwrap_err();
        assert!(matches!(err, moodlog_common::Error::Io(_)), "got {err:?}");
    }
}
