use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use unicode_normalization::UnicodeNormalization;

/// Fallback when nothing of the client-supplied name survives sanitising.
const FALLBACK_NAME: &str = "upload";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Image,
    Video,
}

impl FileType {
    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Video => "video",
        }
    }
}

/// Reduces a client filename to `[A-Za-z0-9_.-]`. Accented letters fold to
/// their ASCII base, separators become spaces, whitespace runs collapse to `_`,
/// and leading/trailing dots and underscores go.
pub fn sanitize(name: &str) -> String {
    lazy_static! {
        static ref UNSAFE: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();
    }
    let folded: String = name.nfkd().filter(char::is_ascii).collect();
    let spaced = folded.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `<unix secs>.<nanos>_<sanitised name>`. Unique per instant, not guaranteed.
pub fn stored_name(original: &str, now: OffsetDateTime) -> String {
    format!(
        "{}.{:09}_{}",
        now.unix_timestamp(),
        now.nanosecond(),
        sanitize(original)
    )
}

/// Extension sniff only; the bytes are never inspected.
pub fn classify(name: &str, video_extensions: &[String]) -> FileType {
    let ext = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => return FileType::Image,
    };
    if video_extensions.iter().any(|v| *v == ext) {
        FileType::Video
    } else {
        FileType::Image
    }
}
