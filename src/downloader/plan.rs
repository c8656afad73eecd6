//! Everything the downloader needs to know about one request, resolved up
//! front: which streams to ask for, what the files will be called, and the
//! exact argument vector.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Whether the URL names a single item or a playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadKind {
    #[default]
    Single,
    Playlist,
}

impl DownloadKind {
    /// Lenient parse: anything other than `playlist` is a single item.
    pub fn from_request(value: Option<&str>) -> Self {
        match value {
            Some("playlist") => Self::Playlist,
            Some("single") | None => Self::Single,
            Some(other) => {
                tracing::warn!(value = other, "Unknown download type, treating as single");
                Self::Single
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Playlist => "playlist",
        }
    }
}

/// Requested media flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    #[default]
    Video,
    Audio,
}

impl MediaFormat {
    /// Lenient parse: anything other than `audio` is video.
    pub fn from_request(value: Option<&str>) -> Self {
        match value {
            Some("audio") => Self::Audio,
            Some("video") | None => Self::Video,
            Some(other) => {
                tracing::warn!(value = other, "Unknown format, treating as video");
                Self::Video
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }

    /// Format selection, file extension and MIME type for this flavour
    pub fn profile(&self) -> FormatProfile {
        match self {
            // Single-file m4a avoids an ffmpeg merge step.
            Self::Audio => FormatProfile {
                selector: "bestaudio[ext=m4a]/bestaudio",
                extension: ".m4a",
                mime_type: "audio/m4a",
            },
            // Pre-muxed audio+video, again so ffmpeg is not required.
            Self::Video => FormatProfile {
                selector: "best[ext=mp4]/best",
                extension: ".mp4",
                mime_type: "video/mp4",
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatProfile {
    /// Format-selection expression, preferred first with `/` fallbacks
    pub selector: &'static str,
    /// Extension of produced files, including the dot
    pub extension: &'static str,
    /// Content-Type used when a single file is served
    pub mime_type: &'static str,
}

/// One fully-resolved call to the external tool
#[derive(Debug, Clone)]
pub struct Invocation {
    pub url: String,
    pub kind: DownloadKind,
    pub profile: FormatProfile,
    /// Directory the tool writes into
    pub output_dir: PathBuf,
}

impl Invocation {
    pub fn new(url: impl Into<String>, kind: DownloadKind, format: MediaFormat, output_dir: &Path) -> Self {
        Self {
            url: url.into(),
            kind,
            profile: format.profile(),
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Output path template understood by yt-dlp
    pub fn output_template(&self) -> PathBuf {
        let ext = self.profile.extension;
        match self.kind {
            DownloadKind::Single => self.output_dir.join(format!("%(title)s{ext}")),
            DownloadKind::Playlist => self
                .output_dir
                .join("%(playlist)s")
                .join(format!("%(playlist_index)s - %(title)s{ext}")),
        }
    }

    /// Arguments after the program and its configured base args; URL last
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--format".into(),
            self.profile.selector.into(),
            // Skip unavailable playlist entries instead of aborting the batch.
            "--ignore-errors".into(),
            "--output".into(),
            self.output_template().into_os_string(),
        ];
        if self.kind == DownloadKind::Playlist {
            args.push("--yes-playlist".into());
        }
        args.push(self.url.as_str().into());
        args
    }
}
