/// Extension-based file categorization.
///
/// This module maps file extensions to category folder names (e.g. "Images",
/// "Documents"). The mapping is an explicit value so callers and tests can
/// substitute their own table.
///
/// # Examples
///
/// ```
/// use desksort::file_category::CategoryTable;
///
/// let table = CategoryTable::default();
/// assert_eq!(table.classify("png"), Some("Images"));
/// assert_eq!(table.classify(".MP3"), Some("Audio"));
/// assert_eq!(table.classify("xyz"), None);
/// ```
use std::collections::HashSet;
use std::path::Path;

/// Folder name used for files whose extension matches no category.
pub const FALLBACK_CATEGORY: &str = "Other";

/// A named category and the extensions that belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// The folder name for this category.
    pub name: String,
    /// Lowercase extensions without the leading dot.
    pub extensions: HashSet<String>,
}

/// Ordered mapping from category name to its set of extensions.
///
/// When two categories claim the same extension, the one added first wins.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl CategoryTable {
    /// Creates an empty table. Every file classifies as [`FALLBACK_CATEGORY`].
    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    /// Creates the standard desktop table.
    pub fn standard() -> Self {
        Self::empty()
            .with_category("Images", &["png", "jpg", "jpeg", "gif", "bmp", "svg", "webp"])
            .with_category(
                "Documents",
                &["pdf", "docx", "doc", "txt", "md", "pptx", "xlsx", "csv"],
            )
            .with_category("Archives", &["zip", "tar", "gz", "rar", "7z"])
            .with_category(
                "Code",
                &["py", "js", "ts", "java", "c", "cpp", "go", "rb", "rs"],
            )
            .with_category("Audio", &["mp3", "wav", "flac", "m4a"])
            .with_category("Video", &["mp4", "mkv", "mov", "avi"])
            .with_category("Installers", &["exe", "msi", "dmg", "deb", "apk"])
    }

    /// Appends a category. Extensions are normalized to lowercase without a dot.
    pub fn with_category(mut self, name: &str, extensions: &[&str]) -> Self {
        self.categories.push(Category {
            name: name.to_string(),
            extensions: extensions.iter().map(|ext| normalize(ext)).collect(),
        });
        self
    }

    /// Returns the categories in table order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Returns the category owning `ext`, or `None` if it is uncategorized.
    ///
    /// Matching is case-insensitive and a leading dot is ignored.
    pub fn classify(&self, ext: &str) -> Option<&str> {
        let ext = normalize(ext);
        self.categories
            .iter()
            .find(|category| category.extensions.contains(&ext))
            .map(|category| category.name.as_str())
    }

    /// Returns the folder name for a file path, falling back to
    /// [`FALLBACK_CATEGORY`] when the extension is missing or unknown.
    pub fn category_for(&self, path: &Path) -> &str {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.classify(ext))
            .unwrap_or(FALLBACK_CATEGORY)
    }

    /// Returns true if `name` is a folder this table produces.
    pub fn is_category_dir(&self, name: &str) -> bool {
        name == FALLBACK_CATEGORY || self.categories.iter().any(|c| c.name == name)
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn normalize(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_extensions() {
        let table = CategoryTable::standard();
        assert_eq!(table.classify("png"), Some("Images"));
        assert_eq!(table.classify("pdf"), Some("Documents"));
        assert_eq!(table.classify("7z"), Some("Archives"));
        assert_eq!(table.classify("rs"), Some("Code"));
        assert_eq!(table.classify("flac"), Some("Audio"));
        assert_eq!(table.classify("mkv"), Some("Video"));
        assert_eq!(table.classify("dmg"), Some("Installers"));
    }

    #[test]
    fn test_classify_case_insensitive() {
        let table = CategoryTable::standard();
        assert_eq!(table.classify("JPG"), Some("Images"));
        assert_eq!(table.classify("Mp4"), Some("Video"));
        assert_eq!(table.classify(".DOCX"), Some("Documents"));
    }

    #[test]
    fn test_every_table_extension_maps_to_its_owner() {
        let table = CategoryTable::standard();
        for category in table.categories() {
            for ext in &category.extensions {
                assert_eq!(table.classify(ext), Some(category.name.as_str()));
                assert_eq!(
                    table.classify(&ext.to_uppercase()),
                    Some(category.name.as_str())
                );
            }
        }
    }

    #[test]
    fn test_classify_unknown() {
        let table = CategoryTable::standard();
        assert_eq!(table.classify("xyz"), None);
        assert_eq!(table.classify(""), None);
    }

    #[test]
    fn test_category_for_path() {
        let table = CategoryTable::standard();
        assert_eq!(table.category_for(Path::new("/a/photo.PNG")), "Images");
        assert_eq!(table.category_for(Path::new("/a/backup.tar.gz")), "Archives");
        assert_eq!(table.category_for(Path::new("/a/README")), FALLBACK_CATEGORY);
        assert_eq!(table.category_for(Path::new("/a/.bashrc")), FALLBACK_CATEGORY);
        assert_eq!(table.category_for(Path::new("/a/data.bin")), FALLBACK_CATEGORY);
    }

    #[test]
    fn test_first_category_wins() {
        let table = CategoryTable::empty()
            .with_category("First", &["dat"])
            .with_category("Second", &["DAT"]);
        assert_eq!(table.classify("dat"), Some("First"));
    }

    #[test]
    fn test_is_category_dir() {
        let table = CategoryTable::standard();
        assert!(table.is_category_dir("Images"));
        assert!(table.is_category_dir(FALLBACK_CATEGORY));
        assert!(!table.is_category_dir("images"));
        assert!(!table.is_category_dir("Projects"));
    }

    #[test]
    fn test_empty_table_falls_back() {
        let table = CategoryTable::empty();
        assert!(table.categories().is_empty());
        assert_eq!(table.category_for(Path::new("photo.png")), FALLBACK_CATEGORY);
    }
}
