use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::info;

use crate::error::VerseResult;
use crate::model::{TableName, Verse};
use crate::util::now_utc_string;

const DB_SCHEMA_VERSION: &str = "1.0.0";

pub(crate) fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

pub(crate) fn table_exists(connection: &Connection, table: &TableName) -> VerseResult<bool> {
    let found = connection
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table.as_str()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Replaces `table` with exactly `verses`, one row per verse keyed by its id.
///
/// Drop, create, insert and the metadata update share one transaction, so a
/// failed load leaves whatever was there before untouched.
pub(crate) fn load_verses(
    connection: &mut Connection,
    table: &TableName,
    verses: &[Verse],
    source_sha256: Option<&str>,
) -> VerseResult<usize> {
    let tx = connection.transaction()?;
    let quoted = table.quoted();
    let index = format!("\"{table}_identity\"");

    tx.execute_batch(&format!(
        "
        DROP TABLE IF EXISTS {quoted};

        CREATE TABLE {quoted} (
          id INTEGER PRIMARY KEY,
          bookNum INTEGER,
          chapterNum INTEGER,
          verseNum INTEGER,
          bookName TEXT,
          bookShortName TEXT,
          verseText TEXT
        );

        CREATE INDEX {index} ON {quoted}(bookNum, chapterNum, verseNum);
        "
    ))?;

    {
        let mut statement = tx.prepare(&format!(
            "
            INSERT INTO {quoted}(id, bookNum, chapterNum, verseNum, bookName, bookShortName, verseText)
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "
        ))?;

        for verse in verses {
            statement.execute(params![
                verse.id,
                verse.book_num,
                verse.chapter_num,
                verse.verse_num,
                &verse.book_name,
                &verse.book_short_name,
                &verse.verse_text,
            ])?;
        }
    }

    write_metadata(&tx, table, verses.len(), source_sha256)?;
    tx.commit()?;

    info!(table = %table, verses = verses.len(), "loaded verses");
    Ok(verses.len())
}

fn write_metadata(
    connection: &Connection,
    table: &TableName,
    verse_count: usize,
    source_sha256: Option<&str>,
) -> VerseResult<()> {
    connection.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );
        ",
    )?;

    let mut entries = vec![
        ("db_schema_version".to_string(), DB_SCHEMA_VERSION.to_string()),
        (format!("{table}.verse_count"), verse_count.to_string()),
        (format!("{table}.loaded_at"), now_utc_string()),
    ];
    let hash_key = format!("{table}.source_sha256");
    match source_sha256 {
        Some(hash) => entries.push((hash_key, hash.to_string())),
        None => {
            connection.execute("DELETE FROM metadata WHERE key = ?1", [&hash_key])?;
        }
    }

    let mut statement = connection.prepare(
        "INSERT INTO metadata(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
    )?;
    for (key, value) in &entries {
        statement.execute([key, value])?;
    }

    Ok(())
}
