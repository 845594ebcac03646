use std::path::Path;

use rand::{Rng, distr::Alphanumeric};

pub const RANDOM_SUFFIX_LEN: usize = 20;

/// Random alphanumeric string of `length` characters.
pub fn random_name(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Splits `text` into trimmed, non-empty lines.
pub fn lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Default playlist name for an input file: its file name without extension.
pub fn playlist_name_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Builds the final playlist name, optionally with a random suffix.
pub fn playlist_name(base: &str, random_suffix: bool) -> String {
    if random_suffix {
        format!("{} {}", base, random_name(RANDOM_SUFFIX_LEN))
    } else {
        base.to_string()
    }
}

/// Formats a candidate as `Artist A, Artist B - Title <Album>`.
///
/// Empty parts are left out.
pub fn display_name(artists: &[&str], title: &str, album: &str) -> String {
    let artists = artists
        .iter()
        .filter(|a| !a.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = match (artists.is_empty(), title.is_empty()) {
        (false, false) => format!("{} - {}", artists, title),
        (false, true) => artists,
        _ => title.to_string(),
    };

    if !album.is_empty() {
        out.push_str(&format!(" <{}>", album));
    }

    out
}

/// Shortens `text` to at most `max` characters, marking the cut with `…`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
