/// Stable track identity
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Path-normalized identity of a track
///
/// Queue entries and engine notifications are matched by fingerprint, never
/// by database id. The same file reached through different spellings
/// (`C:\Music\a.mp3`, `C:/Music/a.mp3`, `\\?\C:\Music\a.mp3`,
/// `file:///C:/Music/a.mp3`) yields the same fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Build a fingerprint from any path-like string
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize(raw.as_ref()))
    }

    /// Build a fingerprint from a filesystem path
    pub fn from_path(path: &Path) -> Self {
        Self::new(path.to_string_lossy())
    }

    /// Normalized string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Fingerprint {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Fingerprint {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&Path> for Fingerprint {
    fn from(path: &Path) -> Self {
        Self::from_path(path)
    }
}

fn normalize(raw: &str) -> String {
    let mut value = raw.trim().to_string();

    // Windows verbatim prefix: \\?\C:\... and \\?\UNC\server\share
    if let Some(rest) = value.strip_prefix(r"\\?\") {
        value = match rest.strip_prefix(r"UNC\") {
            Some(unc) => format!(r"\\{unc}"),
            None => rest.to_string(),
        };
    }

    if value
        .get(..7)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("file://"))
    {
        let rest = &value[7..];
        // file:///C:/x keeps the drive, file:///home/x keeps the root
        value = if is_slash_drive(rest) {
            rest[1..].to_string()
        } else {
            rest.to_string()
        };
    }

    value.replace('\\', "/")
}

fn is_slash_drive(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 3 && bytes[0] == b'/' && bytes[1].is_ascii_alphabetic() && bytes[2] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backslashes_and_slashes_match() {
        assert_eq!(
            Fingerprint::new(r"C:\Music\a.mp3"),
            Fingerprint::new("C:/Music/a.mp3")
        );
    }

    #[test]
    fn verbatim_prefix_is_stripped() {
        assert_eq!(Fingerprint::new(r"\\?\C:\Music\a.mp3").as_str(), "C:/Music/a.mp3");
        assert_eq!(
            Fingerprint::new(r"\\?\UNC\server\share\a.mp3").as_str(),
            "//server/share/a.mp3"
        );
    }

    #[test]
    fn file_scheme_is_stripped() {
        assert_eq!(Fingerprint::new("file:///home/u/a.mp3").as_str(), "/home/u/a.mp3");
        assert_eq!(Fingerprint::new("FILE:///C:/Music/a.mp3").as_str(), "C:/Music/a.mp3");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(Fingerprint::new("  /music/a.mp3 \n").as_str(), "/music/a.mp3");
    }

    #[test]
    fn different_files_differ() {
        assert_ne!(Fingerprint::new("/music/a.mp3"), Fingerprint::new("/music/b.mp3"));
    }

    #[test]
    fn short_and_non_ascii_inputs_do_not_panic() {
        assert_eq!(Fingerprint::new("fi").as_str(), "fi");
        assert_eq!(Fingerprint::new("음악/노래.mp3").as_str(), "음악/노래.mp3");
    }
}
