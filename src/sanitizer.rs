//! Lyric sanitizing
//!
//! Lyrics coming out of the lyric-generation step carry section headers
//! ("Verse 1", "Chorus") and production notes ("(Soft Piano)"). The music
//! provider sings whatever it is given, so these lines are removed before
//! submission.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Section headers anchored at line start, optionally numbered
///
/// A header may carry a qualifier introduced by punctuation ("Chorus (Repeat)",
/// "Verse 1 - Mukhda", "Bridge:"). A label followed by more words ("Chorus of
/// birds") or running into a longer word ("Introduction") is a lyric line.
const SECTION_HEADER_PATTERN: &str =
    r"(?i)^(?:final\s+chorus|verse|chorus|intro|outro|bridge)(?:\s*\d+)?(?:\s*[^\w\s].*)?$";

fn section_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(SECTION_HEADER_PATTERN).expect("section header pattern is valid")
    })
}

/// Whether a trimmed line is a section header such as "Verse 1" or "FINAL CHORUS"
fn is_section_header(line: &str) -> bool {
    section_header().is_match(line)
}

/// Whether a trimmed line is a production note such as "(Soft Piano)"
fn is_production_note(line: &str) -> bool {
    line.starts_with('(') && line.ends_with(')')
}

/// Strip section headers, production notes and blank lines from lyrics
///
/// Each line is trimmed; the surviving lines keep their original order and
/// are joined with `\n`.
///
/// Returns [`Error::EmptyLyrics`] when nothing singable remains.
///
/// # Examples
///
/// ```
/// use sur_sangam::sanitizer::sanitize;
///
/// let raw = "Verse 1\n(Soft Piano)\n  Tu jab aayi  \n\nChorus\nDil mera gaaye";
/// assert_eq!(sanitize(raw).unwrap(), "Tu jab aayi\nDil mera gaaye");
/// assert!(sanitize("Verse 1\n(Soft Piano)\n").is_err());
/// ```
pub fn sanitize(raw_lyrics: &str) -> Result<String> {
    let cleaned = raw_lyrics
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !is_section_header(line))
        .filter(|line| !is_production_note(line))
        .collect::<Vec<_>>()
        .join("\n");

    if cleaned.is_empty() {
        return Err(Error::EmptyLyrics);
    }
    Ok(cleaned)
}
