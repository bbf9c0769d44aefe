/// How a fetched file is re-uploaded to the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
    Document,
}

impl MediaKind {
    /// Classify by substring of the declared content type, so `image/svg+xml`
    /// is a photo too.
    pub fn classify(content_type: &str) -> Self {
        if content_type.contains("image") {
            MediaKind::Photo
        } else if content_type.contains("video") {
            MediaKind::Video
        } else {
            MediaKind::Document
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Photo => write!(f, "photo"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Document => write!(f, "document"),
        }
    }
}
