//! Verse identity: verse keys, citations and preview selection.
//!
//! A verse key is the `book-chapter-verse` string form of a [`VerseId`], e.g.
//! `1-1-1` for Genesis 1:1. It is what callers pass on the command line and
//! what identifies a verse independently of its row id.

use std::fmt;
use std::str::FromStr;

use crate::error::{VerseError, VerseResult};
use crate::model::{Verse, VerseId, VerseRef};

/// A Wagstaff prime; any fixed large prime gives the same stability.
pub const PREVIEW_MODULUS: u64 = 2_932_031_007_403;

pub fn parse_verse_key(key: &str) -> VerseResult<VerseId> {
    let malformed = || VerseError::MalformedKey {
        key: key.to_string(),
    };

    let mut numbers = [0_u32; 3];
    let mut segments = key.split('-');
    for slot in numbers.iter_mut() {
        let segment = segments.next().ok_or_else(malformed)?;
        if segment.is_empty() || !segment.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(malformed());
        }
        *slot = segment.parse().map_err(|_| malformed())?;
    }
    if segments.next().is_some() {
        return Err(malformed());
    }

    let [book_num, chapter_num, verse_num] = numbers;
    Ok(VerseId::new(book_num, chapter_num, verse_num))
}

pub fn format_verse_key(verse: &impl VerseRef) -> String {
    format!(
        "{}-{}-{}",
        verse.book_num(),
        verse.chapter_num(),
        verse.verse_num()
    )
}

/// Whether two values reference the same verse, whatever else they carry.
pub fn is_same_verse(a: &impl VerseRef, b: &impl VerseRef) -> bool {
    a.verse_id() == b.verse_id()
}

/// "Genesis 1:1"
pub fn citation(verse: &Verse) -> String {
    format!(
        "{} {}:{}",
        verse.book_name, verse.chapter_num, verse.verse_num
    )
}

/// Picks one verse to stand for a whole result list.
///
/// The same list always yields the same verse. Returns `None` for an empty list.
pub fn choose_preview_verse<T>(verses: &[T]) -> Option<&T> {
    let last = verses.len().checked_sub(1)?;
    let index = (last as u64 % PREVIEW_MODULUS) as usize;
    verses.get(index)
}

impl fmt::Display for VerseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_verse_key(self))
    }
}

impl FromStr for VerseId {
    type Err = VerseError;

    fn from_str(key: &str) -> VerseResult<Self> {
        parse_verse_key(key)
    }
}
