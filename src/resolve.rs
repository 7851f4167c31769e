//! Reverse lookup from a media title to the file the downloader wrote.

use std::path::{Path, PathBuf};

use crate::error::{FetchError, FetchResult};

/// MIME substring a candidate file must carry to be accepted.
pub const DEFAULT_MIME_FILTER: &str = "video";

const MIME_TYPES: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("webm", "video/webm"),
    ("mkv", "video/x-matroska"),
    ("mov", "video/quicktime"),
    ("avi", "video/x-msvideo"),
    ("flv", "video/x-flv"),
    ("3gp", "video/3gpp"),
    ("mpeg", "video/mpeg"),
    ("mpg", "video/mpeg"),
    ("ts", "video/mp2t"),
    ("ogv", "video/ogg"),
    ("wmv", "video/x-ms-wmv"),
    ("mp3", "audio/mpeg"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("ogg", "audio/ogg"),
    ("oga", "audio/ogg"),
    ("opus", "audio/opus"),
    ("wav", "audio/x-wav"),
    ("flac", "audio/flac"),
    ("weba", "audio/webm"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub basename: String,
    pub absolute_path: PathBuf,
}

/// Guess a MIME type from the file extension.
pub fn guess_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

#[derive(Clone, Copy, PartialEq)]
enum Piece {
    Char(char),
    /// Stand-in for a character that had no safe spelling.
    Substitute(char),
}

/// Make a title safe to use as a filename, the way the downloader does when
/// asked for Windows-compatible names.
pub fn sanitize_filename(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    let mut pieces: Vec<Piece> = Vec::new();
    for c in replace_timestamp_colons(name) {
        let piece = match c {
            '\n' => Piece::Substitute(' '),
            '/' => Piece::Char('\u{29F8}'),
            '\\' => Piece::Char('\u{29F9}'),
            // full-width counterparts
            '"' | '*' | ':' | '<' | '>' | '?' | '|' => match char::from_u32(c as u32 + 0xFEE0) {
                Some(wide) => Piece::Char(wide),
                None => continue,
            },
            c if (c as u32) < 32 || c as u32 == 127 => continue,
            c => Piece::Char(c),
        };
        // runs of the same substitute collapse to one
        if matches!(piece, Piece::Substitute(_)) && pieces.last() == Some(&piece) {
            continue;
        }
        pieces.push(piece);
    }

    let strippable =
        |p: &Piece| matches!(p, Piece::Substitute(_) | Piece::Char(' ' | '_' | '-'));
    if matches!(pieces.first(), Some(Piece::Substitute(_))) {
        let keep_from = pieces.iter().position(|p| !strippable(p)).unwrap_or(pieces.len());
        pieces.drain(..keep_from);
    }
    if matches!(pieces.last(), Some(Piece::Substitute(_))) {
        let keep_to = pieces.iter().rposition(|p| !strippable(p)).map_or(0, |i| i + 1);
        pieces.truncate(keep_to);
    }

    let result: String = pieces
        .into_iter()
        .map(|p| match p {
            Piece::Char(c) | Piece::Substitute(c) => c,
        })
        .collect();
    if result.is_empty() {
        "_".to_string()
    } else {
        result
    }
}

/// `12:34:56` style runs keep their digits apart with `_` instead of `:`.
fn replace_timestamp_colons(name: &str) -> Vec<char> {
    let mut chars: Vec<char> = name.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        while i + 1 < chars.len() && chars[i] == ':' && chars[i + 1].is_ascii_digit() {
            chars[i] = '_';
            i += 1;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
        }
    }
    chars
}

/// Find the entry in `dir` whose stem matches `basename`.
///
/// Directory order is whatever the filesystem returns; the first match that
/// passes the MIME filter wins.
pub fn match_file(
    dir: &Path,
    basename: &str,
    mime_filter: &str,
    restrict_filenames: bool,
) -> FetchResult<PathBuf> {
    let sanitized = restrict_filenames.then(|| sanitize_filename(basename));

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let matched = stem == basename || sanitized.as_deref() == Some(stem);
        if !matched {
            continue;
        }

        match guess_mime_type(&path) {
            Some(mime) if mime.contains(mime_filter) => {
                log::debug!("Matched '{}' to {}", basename, path.display());
                return Ok(path);
            }
            other => {
                log::debug!(
                    "Skipping {} for '{}': MIME type {:?} lacks '{}'",
                    path.display(),
                    basename,
                    other,
                    mime_filter
                );
            }
        }
    }

    Err(FetchError::FileNotFound {
        dir: dir.to_path_buf(),
        basename: basename.to_string(),
    })
}

/// Resolve `basename` to an absolute path inside `dir`.
pub fn resolve_path(dir: &Path, basename: &str, restrict_filenames: bool) -> FetchResult<ResolvedFile> {
    let path = match_file(dir, basename, DEFAULT_MIME_FILTER, restrict_filenames)?;
    let absolute_path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(ResolvedFile {
        basename: basename.to_string(),
        absolute_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_resolves_matching_stem() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("My Video.mp4"), b"").unwrap();
        fs::write(dir.path().join("Other.mp4"), b"").unwrap();

        let resolved = resolve_path(dir.path(), "My Video", false).unwrap();
        assert_eq!(resolved.basename, "My Video");
        assert_eq!(resolved.absolute_path, dir.path().join("My Video.mp4"));
        assert!(resolved.absolute_path.is_absolute());
    }

    #[test]
    fn test_not_found_names_basename() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Something Else.mp4"), b"").unwrap();

        let err = resolve_path(dir.path(), "My Video", false).unwrap_err();
        assert!(matches!(err, FetchError::FileNotFound { .. }));
        let msg = err.to_string();
        assert!(msg.contains("My Video"));
        assert!(msg.contains(&dir.path().display().to_string()));
    }

    #[test]
    fn test_audio_extension_fails_video_filter() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Song.m4a"), b"").unwrap();
        fs::write(dir.path().join("Song.txt"), b"").unwrap();

        assert!(matches!(
            resolve_path(dir.path(), "Song", false),
            Err(FetchError::FileNotFound { .. })
        ));
        assert_eq!(
            match_file(dir.path(), "Song", "audio", false).unwrap(),
            dir.path().join("Song.m4a")
        );
    }

    #[test]
    fn test_sanitized_stem_only_when_restricted() {
        let dir = tempfile::tempdir().unwrap();
        let on_disk = sanitize_filename("What? A/B: \"live\"");
        fs::write(dir.path().join(format!("{}.webm", on_disk)), b"").unwrap();

        assert!(resolve_path(dir.path(), "What? A/B: \"live\"", false).is_err());
        let resolved = resolve_path(dir.path(), "What? A/B: \"live\"", true).unwrap();
        assert_eq!(
            resolved.absolute_path,
            dir.path().join(format!("{}.webm", on_disk))
        );
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a?b"), "a\u{FF1F}b");
        assert_eq!(sanitize_filename("x/y\\z"), "x\u{29F8}y\u{29F9}z");
        assert_eq!(sanitize_filename("line\nbreak\u{7}"), "line break");
        assert_eq!(sanitize_filename("plain title"), "plain title");
    }

    #[test]
    fn test_sanitize_timestamps_use_underscores() {
        assert_eq!(sanitize_filename("Mix 10:00:00"), "Mix 10_00_00");
        assert_eq!(sanitize_filename("Live 10:00"), "Live 10_00");
        assert_eq!(sanitize_filename("Part 2: Live"), "Part 2\u{FF1A} Live");
        assert_eq!(sanitize_filename("a:1"), "a\u{FF1A}1");
    }

    #[test]
    fn test_sanitize_strips_edge_substitutes() {
        assert_eq!(sanitize_filename("\nLead"), "Lead");
        assert_eq!(sanitize_filename("Trail -\n"), "Trail");
        assert_eq!(sanitize_filename("a\n\n\nb"), "a b");
        assert_eq!(sanitize_filename(" keep - me "), " keep - me ");
        assert_eq!(sanitize_filename("\n"), "_");
        assert_eq!(sanitize_filename(""), "");
    }

    #[test]
    fn test_restricted_resolution_of_timestamp_title() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Live 10_00.mp4"), b"").unwrap();
        let resolved = resolve_path(dir.path(), "Live 10:00", true).unwrap();
        assert_eq!(resolved.absolute_path, dir.path().join("Live 10_00.mp4"));
    }

    #[test]
    fn test_guess_mime_type() {
        assert_eq!(guess_mime_type(Path::new("a.MP4")), Some("video/mp4"));
        assert_eq!(guess_mime_type(Path::new("a.flac")), Some("audio/flac"));
        assert_eq!(guess_mime_type(Path::new("a")), None);
        assert_eq!(guess_mime_type(Path::new("a.xyz")), None);
    }
}
