//! Frame identifiers, kinds and the ordered manifest.
//!
//! A frame is named by the file it lives in on the origin (`0619_1430.webp`,
//! `0619_13.mp4`). The name is also the cache file name, and its suffix is the
//! only thing that says whether the frame is a still image or a clip.

use std::fmt;

/// Identifier of one radar frame (file name on the origin).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(String);

impl FrameId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Kind derived from the file suffix, `None` for anything unrecognised.
    pub fn kind(&self) -> Option<FrameKind> {
        FrameKind::from_name(&self.0)
    }

    /// Whether the identifier is usable as a single file name.
    ///
    /// Rejects empty names, `.`/`..` and anything with a path separator so a
    /// manifest entry can never address a file outside the cache directory.
    pub fn is_plain_name(&self) -> bool {
        !self.0.is_empty()
            && self.0 != "."
            && self.0 != ".."
            && !self.0.contains(['/', '\\'])
            && !self.0.contains('\0')
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FrameId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FrameId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for FrameId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// What a frame decodes as, and therefore how it is validated and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Single WebP image
    Still,
    /// Short MP4 clip with a video track
    Clip,
}

impl FrameKind {
    /// Map a file name to its kind by suffix (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "webp" => Some(FrameKind::Still),
            "mp4" => Some(FrameKind::Clip),
            _ => None,
        }
    }

    /// Mime type of the payload served for this kind.
    pub fn mime_type(self) -> &'static str {
        match self {
            FrameKind::Still => "image/webp",
            FrameKind::Clip => "video/mp4",
        }
    }
}

/// Ordered, immutable list of frames for one session.
///
/// Order is the temporal order of the radar sweeps as published by the origin.
/// An empty manifest is valid and simply means there is nothing to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    frames: Vec<FrameId>,
}

impl Manifest {
    pub fn new(frames: Vec<FrameId>) -> Self {
        Self { frames }
    }

    /// Parse a newline separated listing.
    ///
    /// Every line is trimmed and kept in order. Blank lines (including the one
    /// produced by a trailing newline) are kept as empty identifiers.
    pub fn parse(body: &str) -> Self {
        let frames = body.split('\n').map(|line| FrameId::new(line.trim())).collect();
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FrameId> {
        self.frames.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameId> {
        self.frames.iter()
    }

    pub fn frames(&self) -> &[FrameId] {
        &self.frames
    }
}

impl FromIterator<FrameId> for Manifest {
    fn from_iter<I: IntoIterator<Item = FrameId>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_suffix() {
        assert_eq!(FrameKind::from_name("0619_1430.webp"), Some(FrameKind::Still));
        assert_eq!(FrameKind::from_name("0619_13.mp4"), Some(FrameKind::Clip));
        assert_eq!(FrameKind::from_name("0619_13.MP4"), Some(FrameKind::Clip));
        assert_eq!(FrameKind::from_name("0619_1430.png"), None);
        assert_eq!(FrameKind::from_name("webp"), None);
        assert_eq!(FrameKind::from_name(""), None);
    }

    #[test]
    fn test_parse_keeps_order_and_blank_lines() {
        let manifest = Manifest::parse("b.mp4\r\n  a.webp \nc.webp\n");
        let names: Vec<&str> = manifest.iter().map(FrameId::as_str).collect();
        assert_eq!(names, vec!["b.mp4", "a.webp", "c.webp", ""]);
    }

    #[test]
    fn test_parse_does_not_dedup() {
        let manifest = Manifest::parse("a.webp\na.webp");
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn test_parse_empty_body() {
        // An empty body is a single blank line, same as splitting ""
        let manifest = Manifest::parse("");
        assert_eq!(manifest.len(), 1);
        assert!(manifest.get(0).unwrap().is_empty());
    }

    #[test]
    fn test_plain_name() {
        assert!(FrameId::from("0619_1430.webp").is_plain_name());
        assert!(!FrameId::from("").is_plain_name());
        assert!(!FrameId::from("..").is_plain_name());
        assert!(!FrameId::from("../etc/passwd").is_plain_name());
        assert!(!FrameId::from("a\\b.webp").is_plain_name());
    }
}
