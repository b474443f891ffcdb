use std::fmt;
use std::path::PathBuf;

/// Where the dictionary is loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DictionarySource {
    /// The word list compiled into the binary.
    #[default]
    Bundled,
    File(PathBuf),
    /// An `http://` or `https://` URL, fetched once.
    Url(String),
}

impl DictionarySource {
    /// Reads a configured value: URLs by scheme, anything else as a path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match path.to_str() {
            Some(value) if is_remote(value) => Self::Url(value.to_string()),
            _ => Self::File(path),
        }
    }
}

impl From<&str> for DictionarySource {
    fn from(value: &str) -> Self {
        Self::from_path(value)
    }
}

impl fmt::Display for DictionarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bundled => f.write_str("bundled dictionary"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

fn is_remote(value: &str) -> bool {
    let lower = value.get(..8).unwrap_or(value).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
