//! `<storage-name-or-id>/<relative-path>` strings as typed by users.

/// A user supplied storage path, split once on the first `/`.
///
/// `s3test/dir1/a.txt` names storage `s3test` and path `dir1/a.txt` inside it. A string with no
/// `/` at all names the storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath {
    storage: String,
    relative_path: String,
    trailing_separator: bool,
}

impl StoragePath {
    pub fn parse(raw: &str) -> Self {
        let trailing_separator = raw.ends_with('/');
        match raw.split_once('/') {
            Some((storage, relative_path)) => Self {
                storage: storage.to_string(),
                relative_path: relative_path.to_string(),
                trailing_separator,
            },
            None => Self {
                storage: raw.to_string(),
                relative_path: String::new(),
                trailing_separator,
            },
        }
    }

    /// Storage name or id
    pub fn storage(&self) -> &str {
        &self.storage
    }

    /// Path inside the storage, empty for the root
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn is_root(&self) -> bool {
        self.relative_path.is_empty()
    }

    /// Whether the raw string ended with `/`
    pub fn ends_with_separator(&self) -> bool {
        self.trailing_separator
    }

    /// True when the path denotes a directory to copy INTO: it ends with `/` or names the root.
    pub fn is_directory_target(&self) -> bool {
        self.is_root() || self.trailing_separator
    }

    /// Appends `name` to the path, e.g. `dest/` + `file.txt` becomes `dest/file.txt`.
    pub fn join(&self, name: &str) -> Self {
        let relative_path = if self.is_root() || self.relative_path.ends_with('/') {
            format!("{}{}", self.relative_path, name)
        } else {
            format!("{}/{}", self.relative_path, name)
        };
        Self {
            storage: self.storage.clone(),
            trailing_separator: name.ends_with('/'),
            relative_path,
        }
    }
}

impl std::fmt::Display for StoragePath {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.storage, self.relative_path)
    }
}
