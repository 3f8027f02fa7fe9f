use std::path::PathBuf;

use anyhow::Context;

pub const DEFAULT_VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mov", "avi", "webm"];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Lower-case extensions, without the dot, that classify an upload as video.
    pub video_extensions: Vec<String>,
    pub cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://bubbles.db".into());
        let upload_dir = std::env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("static/uploads"));
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse::<u16>()
            .context("invalid APP_PORT")?;
        let max_upload_mb = std::env::var("MAX_UPLOAD_MB")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(20);
        let video_extensions = std::env::var("VIDEO_EXTENSIONS")
            .map(|v| parse_extensions(&v))
            .unwrap_or_else(|_| default_video_extensions());
        let cookie_secure = std::env::var("SESSION_COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            database_url,
            upload_dir,
            host,
            port,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            video_extensions,
            cookie_secure,
        })
    }
}

pub fn default_video_extensions() -> Vec<String> {
    DEFAULT_VIDEO_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

/// Accepts `mp4,.MOV, avi` style lists.
fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_extensions_normalises_entries() {
        assert_eq!(
            parse_extensions("mp4, .MOV,,webm "),
            vec!["mp4".to_string(), "mov".to_string(), "webm".to_string()]
        );
    }

    #[test]
    fn default_video_set() {
        assert_eq!(default_video_extensions(), vec!["mp4", "mov", "avi", "webm"]);
    }
}
