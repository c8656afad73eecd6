//! Turning whatever the tool left on disk into exactly one servable file

use std::fs::{self, FileType};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{WorkspaceError, zip_directory};
use crate::downloader::FormatProfile;

const ZIP_MIME: &str = "application/zip";
const FALLBACK_ARCHIVE: &str = "Playlist_Content";

/// File ready to be returned to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    /// Name offered to the client in Content-Disposition
    pub filename: String,
    pub mime_type: &'static str,
}

struct Entry {
    name: String,
    path: PathBuf,
    file_type: FileType,
}

/// Directory children sorted by name. Directory iteration order is
/// filesystem-defined; sorting keeps the choice among several candidates stable.
fn sorted_entries(dir: &Path) -> Result<Vec<Entry>, WorkspaceError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
            file_type: entry.file_type()?,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Pick the single-item download out of `media_dir` by extension.
pub fn locate_single(media_dir: &Path, profile: &FormatProfile) -> Result<Artifact, WorkspaceError> {
    let candidates: Vec<Entry> = sorted_entries(media_dir)?
        .into_iter()
        .filter(|e| e.file_type.is_file() && e.name.ends_with(profile.extension))
        .collect();

    if candidates.len() > 1 {
        warn!(
            count = candidates.len(),
            chosen = %candidates[0].name,
            "Several downloaded files match, serving the first by name"
        );
    }

    let chosen = candidates
        .into_iter()
        .next()
        .ok_or(WorkspaceError::MissingFile(profile.extension))?;

    Ok(Artifact {
        path: chosen.path,
        filename: chosen.name,
        mime_type: profile.mime_type,
    })
}

/// Zip the playlist folder (or, without one, everything in `media_dir`) into
/// `workspace_dir`. Blocking.
pub fn package_playlist(workspace_dir: &Path, media_dir: &Path) -> Result<Artifact, WorkspaceError> {
    let entries = sorted_entries(media_dir)?;
    if entries.is_empty() {
        return Err(WorkspaceError::EmptyPlaylist);
    }

    let folders: Vec<&Entry> = entries.iter().filter(|e| e.file_type.is_dir()).collect();

    let (source, display_name, archive_stem) = match folders.as_slice() {
        [] => {
            info!("No playlist folder produced, archiving all output");
            (
                media_dir.to_path_buf(),
                FALLBACK_ARCHIVE.to_string(),
                FALLBACK_ARCHIVE.to_string(),
            )
        }
        [first, rest @ ..] => {
            if !rest.is_empty() {
                warn!(
                    count = folders.len(),
                    chosen = %first.name,
                    "Several playlist folders produced, archiving the first by name"
                );
            }
            let stem = match secure_filename(&first.name) {
                s if s.is_empty() => "playlist".to_string(),
                s => s,
            };
            (first.path.clone(), first.name.clone(), stem)
        }
    };

    // The archive sits beside media/, never inside the tree being zipped.
    let archive_path = workspace_dir.join(format!("{archive_stem}.zip"));
    let files = zip_directory(&source, &archive_path)?;
    info!(archive = %archive_path.display(), files, "Playlist archived");

    Ok(Artifact {
        path: archive_path,
        filename: format!("{display_name}.zip"),
        mime_type: ZIP_MIME,
    })
}

/// ASCII-only, separator-free version of `name` that is safe as a single path
/// component. May return an empty string.
fn secure_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::MediaFormat;
    use std::fs::File;
    use tempfile::TempDir;

    fn layout() -> (TempDir, PathBuf, PathBuf) {
        let temp = TempDir::new().unwrap();
        let workspace = temp.path().to_path_buf();
        let media = workspace.join("media");
        fs::create_dir(&media).unwrap();
        (temp, workspace, media)
    }

    #[test]
    fn secure_filename_strips_unsafe_characters() {
        assert_eq!(secure_filename("My Playlist"), "My_Playlist");
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("Mix: Best of 2024!"), "Mix_Best_of_2024");
        assert_eq!(secure_filename("Café Sessions"), "Caf_Sessions");
        assert_eq!(secure_filename("..."), "");
    }

    #[test]
    fn single_file_matches_extension() {
        let (_temp, _workspace, media) = layout();
        fs::write(media.join("My Video.mp4"), b"video").unwrap();
        fs::write(media.join("My Video.webm.part"), b"partial").unwrap();

        let artifact = locate_single(&media, &MediaFormat::Video.profile()).unwrap();
        assert_eq!(artifact.filename, "My Video.mp4");
        assert_eq!(artifact.mime_type, "video/mp4");
        assert_eq!(artifact.path, media.join("My Video.mp4"));
    }

    #[test]
    fn single_file_ambiguity_resolves_by_name() {
        let (_temp, _workspace, media) = layout();
        fs::write(media.join("b.m4a"), b"b").unwrap();
        fs::write(media.join("a.m4a"), b"a").unwrap();

        let artifact = locate_single(&media, &MediaFormat::Audio.profile()).unwrap();
        assert_eq!(artifact.filename, "a.m4a");
    }

    #[test]
    fn single_file_ignores_directories_and_other_formats() {
        let (_temp, _workspace, media) = layout();
        fs::create_dir(media.join("folder.mp4")).unwrap();
        fs::write(media.join("song.m4a"), b"audio").unwrap();

        let err = locate_single(&media, &MediaFormat::Video.profile()).unwrap_err();
        assert!(matches!(err, WorkspaceError::MissingFile(".mp4")));
    }

    #[test]
    fn playlist_folder_is_archived_with_original_name() {
        let (_temp, workspace, media) = layout();
        let folder = media.join("My Playlist");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("1 - Intro.mp4"), b"intro").unwrap();
        fs::write(folder.join("2 - Outro.mp4"), b"outro").unwrap();

        let artifact = package_playlist(&workspace, &media).unwrap();
        assert_eq!(artifact.filename, "My Playlist.zip");
        assert_eq!(artifact.path, workspace.join("My_Playlist.zip"));
        assert_eq!(artifact.mime_type, "application/zip");

        let archive = zip::ZipArchive::new(File::open(&artifact.path).unwrap()).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();
        assert_eq!(names, vec!["1 - Intro.mp4", "2 - Outro.mp4"]);
    }

    #[test]
    fn loose_playlist_files_use_fallback_archive() {
        let (_temp, workspace, media) = layout();
        fs::write(media.join("NA - Untitled.mp4"), b"x").unwrap();

        let artifact = package_playlist(&workspace, &media).unwrap();
        assert_eq!(artifact.filename, "Playlist_Content.zip");
        assert_eq!(artifact.path, workspace.join("Playlist_Content.zip"));

        let archive = zip::ZipArchive::new(File::open(&artifact.path).unwrap()).unwrap();
        assert_eq!(archive.file_names().collect::<Vec<_>>(), vec!["NA - Untitled.mp4"]);
    }

    #[test]
    fn first_playlist_folder_by_name_wins() {
        let (_temp, workspace, media) = layout();
        fs::create_dir(media.join("Zeta")).unwrap();
        fs::create_dir(media.join("Alpha")).unwrap();
        fs::write(media.join("Alpha").join("1 - a.mp4"), b"a").unwrap();

        let artifact = package_playlist(&workspace, &media).unwrap();
        assert_eq!(artifact.filename, "Alpha.zip");
    }

    #[test]
    fn empty_playlist_output_is_resolution_error() {
        let (_temp, workspace, media) = layout();

        let err = package_playlist(&workspace, &media).unwrap_err();
        assert!(matches!(err, WorkspaceError::EmptyPlaylist));
    }

    #[test]
    fn unsanitizable_folder_name_gets_generic_archive_name() {
        let (_temp, workspace, media) = layout();
        fs::create_dir(media.join("日本語")).unwrap();

        let artifact = package_playlist(&workspace, &media).unwrap();
        assert_eq!(artifact.path, workspace.join("playlist.zip"));
        assert_eq!(artifact.filename, "日本語.zip");
    }
}
