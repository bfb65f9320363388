use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{VerseError, VerseResult};

static TABLE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid table name regex"));

/// One verse of the source text, flattened out of the book/chapter/verse nesting.
///
/// `id` is the zero-based document-order ordinal and the primary key of the
/// stored row; ordering by it is ordering by scripture position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    pub id: i64,
    pub book_num: u32,
    pub chapter_num: u32,
    pub verse_num: u32,
    pub book_name: String,
    pub book_short_name: String,
    pub verse_text: String,
}

/// The book/chapter/verse triple identifying a verse independently of its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseId {
    pub book_num: u32,
    pub chapter_num: u32,
    pub verse_num: u32,
}

impl VerseId {
    pub fn new(book_num: u32, chapter_num: u32, verse_num: u32) -> Self {
        Self {
            book_num,
            chapter_num,
            verse_num,
        }
    }
}

/// Anything that can name a verse by book, chapter and verse number.
pub trait VerseRef {
    fn book_num(&self) -> u32;
    fn chapter_num(&self) -> u32;
    fn verse_num(&self) -> u32;

    fn verse_id(&self) -> VerseId {
        VerseId::new(self.book_num(), self.chapter_num(), self.verse_num())
    }
}

impl VerseRef for VerseId {
    fn book_num(&self) -> u32 {
        self.book_num
    }

    fn chapter_num(&self) -> u32 {
        self.chapter_num
    }

    fn verse_num(&self) -> u32 {
        self.verse_num
    }
}

impl VerseRef for Verse {
    fn book_num(&self) -> u32 {
        self.book_num
    }

    fn chapter_num(&self) -> u32 {
        self.chapter_num
    }

    fn verse_num(&self) -> u32 {
        self.verse_num
    }
}

/// Name of the load bookkeeping table, never a valid destination.
pub const METADATA_TABLE: &str = "metadata";

/// Destination table name, checked before it is interpolated into SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    pub fn parse(name: &str) -> VerseResult<Self> {
        let lower = name.to_ascii_lowercase();
        let reserved = lower == METADATA_TABLE || lower.starts_with("sqlite_");
        if TABLE_NAME_RE.is_match(name) && !reserved {
            Ok(Self(name.to_string()))
        } else {
            Err(VerseError::InvalidTableName {
                name: name.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as a double-quoted SQL identifier.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersesDocument {
    pub verses: Vec<Verse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub started_at: String,
    pub updated_at: String,
    pub xml_path: String,
    pub db_path: String,
    pub table_name: String,
    pub source_sha256: Option<String>,
    pub verse_count: usize,
    pub skipped: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_name_accepts_identifiers() {
        assert_eq!(TableName::parse("kjv").expect("valid").as_str(), "kjv");
        assert_eq!(TableName::parse("_kjv_1611").expect("valid").as_str(), "_kjv_1611");
    }

    #[test]
    fn table_name_rejects_sql_fragments() {
        for bad in [
            "",
            "1kjv",
            "kjv; DROP TABLE x",
            "kjv-verses",
            "\"kjv\"",
            "metadata",
            "METADATA",
            "sqlite_master",
            "SQLite_kjv",
        ] {
            let err = TableName::parse(bad).expect_err("should reject");
            assert!(matches!(err, VerseError::InvalidTableName { .. }), "{bad}");
        }
    }

    #[test]
    fn table_name_quotes_keywords() {
        let table = TableName::parse("select").expect("keywords are valid names");
        assert_eq!(table.quoted(), "\"select\"");
        assert_eq!(table.to_string(), "select");
    }

    #[test]
    fn verse_serializes_with_camel_case_columns() {
        let verse = Verse {
            id: 0,
            book_num: 1,
            chapter_num: 1,
            verse_num: 1,
            book_name: "Genesis".to_string(),
            book_short_name: "Gen".to_string(),
            verse_text: "In the beginning...".to_string(),
        };
        let value = serde_json::to_value(&verse).expect("serializes");
        assert_eq!(value["bookShortName"], "Gen");
        assert_eq!(value["verseText"], "In the beginning...");
        assert_eq!(value["id"], 0);
    }
}
