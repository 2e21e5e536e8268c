use std::fmt;

use serde_json::Value;

// ============================================================================
// Inbound events
// ============================================================================

/// Type tag of an inbound Events API callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A `message` event in a direct-message (`im`) channel.
    DirectMessage,
    /// A `file_shared` event.
    FileShared,
    /// Anything else, keeping the raw `type` for logging.
    Other(String),
}

/// A single Slack event accepted by the dispatcher.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub event_id: String,
    pub kind: EventKind,
    pub sender_id: Option<String>,
    pub channel_id: Option<String>,
    pub channel_type: Option<String>,
    pub subtype: Option<String>,
    pub bot_id: Option<String>,
    pub text: String,
    pub file_id: Option<String>,
}

impl InboundEvent {
    /// Build an event from the `event` object of an `event_callback` payload.
    ///
    /// Missing fields are tolerated; a missing or non-object `event` yields an
    /// `Other` event that the processor ignores.
    #[must_use]
    pub fn from_callback(event_id: &str, event: &Value) -> Self {
        let field = |name: &str| {
            event
                .get(name)
                .and_then(Value::as_str)
                .map(ToString::to_string)
        };

        let event_type = field("type").unwrap_or_default();
        let channel_type = field("channel_type");

        let kind = match event_type.as_str() {
            "message" if channel_type.as_deref() == Some("im") => EventKind::DirectMessage,
            "file_shared" => EventKind::FileShared,
            other => EventKind::Other(other.to_string()),
        };

        // file_shared carries `user_id` / `channel_id`, message events carry `user` / `channel`
        let sender_id = field("user").or_else(|| field("user_id"));
        let channel_id = field("channel").or_else(|| field("channel_id"));
        let file_id = field("file_id").or_else(|| {
            event
                .get("file")
                .and_then(|f| f.get("id"))
                .and_then(Value::as_str)
                .map(ToString::to_string)
        });

        Self {
            event_id: event_id.to_string(),
            kind,
            sender_id,
            channel_id,
            channel_type,
            subtype: field("subtype"),
            bot_id: field("bot_id"),
            text: field("text").unwrap_or_default(),
            file_id,
        }
    }
}

// ============================================================================
// Slash command rewrites
// ============================================================================

/// Tone applied by the `/lucidlayer` rewrite command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RewriteMode {
    #[default]
    Simple,
    GenZ,
    Humor,
    Corporate,
}

impl RewriteMode {
    pub const ALL: [RewriteMode; 4] = [
        RewriteMode::Simple,
        RewriteMode::GenZ,
        RewriteMode::Humor,
        RewriteMode::Corporate,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RewriteMode::Simple => "simple",
            RewriteMode::GenZ => "genz",
            RewriteMode::Humor => "humor",
            RewriteMode::Corporate => "corporate",
        }
    }

    /// Case-insensitive lookup of a mode tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(tag))
    }

    /// Split command text into a mode and the message body.
    ///
    /// A leading mode tag is consumed; otherwise the mode is `Simple` and the
    /// whole text is the body. Whitespace before the tag and between the tag
    /// and the body is dropped; the body itself is kept verbatim.
    #[must_use]
    pub fn split_command_text(text: &str) -> (Self, String) {
        let trimmed = text.trim_start();
        let (first, rest) = trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, ""));

        match Self::from_tag(first) {
            Some(mode) => (mode, rest.trim_start().to_string()),
            None => (Self::Simple, text.to_string()),
        }
    }
}

impl fmt::Display for RewriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Work item for one slash-command rewrite.
#[derive(Debug, Clone)]
pub struct RewriteRequest {
    pub correlation_id: String,
    pub message: String,
    pub mode: RewriteMode,
    pub user_id: String,
    pub response_url: String,
}

// ============================================================================
// File annotation
// ============================================================================

/// Metadata returned by Slack `files.info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub download_url: String,
    pub file_type: String,
    pub file_name: String,
    pub owner_id: Option<String>,
}

/// Work item for annotating one shared file.
#[derive(Debug, Clone)]
pub struct AnnotationJob {
    pub file_name: String,
    pub file_type: String,
    pub content: Vec<u8>,
    pub user_id: String,
}

/// Document formats the text extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    #[must_use]
    pub fn from_file_type(file_type: &str) -> Option<Self> {
        match file_type.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Docx => "DOCX",
        }
    }
}

/// How the bytes of a shared file are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedContent {
    Document(DocumentKind),
    RawText,
}

impl SharedContent {
    #[must_use]
    pub fn classify(file_type: &str) -> Self {
        DocumentKind::from_file_type(file_type).map_or(SharedContent::RawText, SharedContent::Document)
    }

    #[must_use]
    pub fn profile(self) -> ContentProfile {
        match self {
            SharedContent::Document(_) => ContentProfile::General,
            SharedContent::RawText => ContentProfile::Code,
        }
    }
}

/// Which model configuration handles a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentProfile {
    General,
    Code,
}
