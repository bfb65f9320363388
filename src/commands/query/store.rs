use std::path::Path;

use rusqlite::{Connection, OpenFlags, Row, params};
use tracing::{error, warn};

use crate::error::{VerseError, VerseResult};
use crate::model::{TableName, Verse, VerseId};
use crate::verse::is_same_verse;

const VERSE_COLUMNS: &str = "id, bookNum, chapterNum, verseNum, bookName, bookShortName, verseText";

/// How concordance patterns are compared against verse text.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum CaseMode {
    /// Byte-exact substring match, no case folding or Unicode normalization.
    Sensitive,
    /// SQLite `LIKE`, which folds ASCII letters only.
    AsciiInsensitive,
}

impl CaseMode {
    fn text_filter(self, placeholder: &str) -> String {
        match self {
            Self::Sensitive => format!("instr(verseText, {placeholder}) > 0"),
            Self::AsciiInsensitive => format!("verseText LIKE {placeholder} ESCAPE '\\'"),
        }
    }

    fn text_param(self, pattern: &str) -> String {
        match self {
            Self::Sensitive => pattern.to_string(),
            Self::AsciiInsensitive => format!("%{}%", escape_like(pattern)),
        }
    }
}

/// Read-only access to a loaded verse table.
pub(crate) struct VerseStore {
    connection: Connection,
    table: TableName,
}

impl VerseStore {
    pub(crate) fn open_read_only(db_path: &Path, table: TableName) -> VerseResult<Self> {
        let connection = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self::from_connection(connection, table))
    }

    pub(crate) fn from_connection(connection: Connection, table: TableName) -> Self {
        Self { connection, table }
    }

    /// All verses whose text contains `pattern`, in id order.
    pub(crate) fn concordance(&self, pattern: &str, case: CaseMode) -> VerseResult<Vec<Verse>> {
        let sql = format!(
            "SELECT {VERSE_COLUMNS} FROM {} WHERE {} ORDER BY id",
            self.table.quoted(),
            case.text_filter("?1")
        );
        self.select_verses(&sql, params![case.text_param(pattern)])
    }

    /// Like [`Self::concordance`], restricted to the passage from `start` to `end`.
    pub(crate) fn concordance_between(
        &self,
        pattern: &str,
        case: CaseMode,
        start: &VerseId,
        end: &VerseId,
    ) -> VerseResult<Vec<Verse>> {
        let (from_id, to_id) = self.resolve_range(start, end)?;
        let sql = format!(
            "SELECT {VERSE_COLUMNS} FROM {} WHERE {} AND id >= ?2 AND id <= ?3 ORDER BY id",
            self.table.quoted(),
            case.text_filter("?1")
        );
        self.select_verses(&sql, params![case.text_param(pattern), from_id, to_id])
    }

    pub(crate) fn lookup_by_identity(&self, key: &VerseId) -> VerseResult<Verse> {
        let sql = format!(
            "SELECT {VERSE_COLUMNS} FROM {} WHERE bookNum = ?1 AND chapterNum = ?2 AND verseNum = ?3 ORDER BY id LIMIT 2",
            self.table.quoted()
        );
        let mut matches =
            self.select_verses(&sql, params![key.book_num, key.chapter_num, key.verse_num])?;

        match matches.len() {
            0 => Err(VerseError::VerseNotFound {
                key: key.to_string(),
            }),
            1 => Ok(matches.remove(0)),
            _ => {
                error!(
                    table = %self.table,
                    verse = %key,
                    "verse identity matches 2 or more rows"
                );
                Err(VerseError::StoreIntegrity {
                    key: key.to_string(),
                })
            }
        }
    }

    /// Every verse from `start` through `end` inclusive, in scripture order.
    ///
    /// Endpoints given in reverse order yield an empty passage.
    pub(crate) fn lookup_passage(&self, start: &VerseId, end: &VerseId) -> VerseResult<Vec<Verse>> {
        let (from_id, to_id) = self.resolve_range(start, end)?;
        let sql = format!(
            "SELECT {VERSE_COLUMNS} FROM {} WHERE id >= ?1 AND id <= ?2 ORDER BY id",
            self.table.quoted()
        );
        self.select_verses(&sql, params![from_id, to_id])
    }

    fn resolve_range(&self, start: &VerseId, end: &VerseId) -> VerseResult<(i64, i64)> {
        let from_id = self.lookup_by_identity(start)?.id;
        let to_id = if is_same_verse(start, end) {
            from_id
        } else {
            self.lookup_by_identity(end)?.id
        };
        if from_id > to_id {
            warn!(
                start = %start,
                end = %end,
                from_id,
                to_id,
                "passage endpoints are reversed, range is empty"
            );
        }
        Ok((from_id, to_id))
    }

    fn select_verses(&self, sql: &str, params: impl rusqlite::Params) -> VerseResult<Vec<Verse>> {
        let mut statement = self.connection.prepare(sql)?;
        let verses = statement
            .query_map(params, verse_from_row)?
            .collect::<rusqlite::Result<Vec<Verse>>>()?;
        Ok(verses)
    }
}

fn verse_from_row(row: &Row<'_>) -> rusqlite::Result<Verse> {
    Ok(Verse {
        id: row.get(0)?,
        book_num: row.get(1)?,
        chapter_num: row.get(2)?,
        verse_num: row.get(3)?,
        book_name: row.get(4)?,
        book_short_name: row.get(5)?,
        verse_text: row.get(6)?,
    })
}

fn escape_like(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for ch in pattern.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
