use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use tracing::{info, warn};

use crate::cli::StoreArgs;
use crate::commands::convert::table_exists;
use crate::model::TableName;

#[derive(Debug, Clone, PartialEq, Eq)]
enum TableStatus {
    DatabaseMissing,
    TableMissing,
    Loaded {
        rows: i64,
        recorded_verses: String,
        loaded_at: String,
        source_sha256: String,
        db_schema_version: String,
    },
}

pub fn run(args: StoreArgs) -> Result<()> {
    let table = TableName::parse(&args.table_name)?;
    let db_path = &args.db_path;

    info!(db = %db_path.display(), table = %table, "status requested");

    match inspect(db_path, &table)? {
        TableStatus::DatabaseMissing => {
            warn!(path = %db_path.display(), "database file missing");
        }
        TableStatus::TableMissing => {
            warn!(path = %db_path.display(), table = %table, "verse table missing");
        }
        TableStatus::Loaded {
            rows,
            recorded_verses,
            loaded_at,
            source_sha256,
            db_schema_version,
        } => {
            info!(
                path = %db_path.display(),
                table = %table,
                rows,
                recorded_verses = %recorded_verses,
                loaded_at = %loaded_at,
                source_sha256 = %source_sha256,
                db_schema_version = %db_schema_version,
                "database status"
            );
        }
    }

    Ok(())
}

fn inspect(db_path: &Path, table: &TableName) -> Result<TableStatus> {
    if !db_path.exists() {
        return Ok(TableStatus::DatabaseMissing);
    }

    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open database read-only: {}", db_path.display()))?;

    if !table_exists(&conn, table)? {
        return Ok(TableStatus::TableMissing);
    }

    let rows = query_count(&conn, &format!("SELECT COUNT(*) FROM {}", table.quoted()))?;
    let metadata = table_metadata(&conn, table).unwrap_or_default();
    let lookup = |key: &str| {
        metadata
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
            .unwrap_or_default()
    };

    Ok(TableStatus::Loaded {
        rows,
        recorded_verses: lookup(&format!("{table}.verse_count")),
        loaded_at: lookup(&format!("{table}.loaded_at")),
        source_sha256: lookup(&format!("{table}.source_sha256")),
        db_schema_version: lookup("db_schema_version"),
    })
}

fn query_count(conn: &Connection, sql: &str) -> Result<i64> {
    let count = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}

fn table_metadata(conn: &Connection, table: &TableName) -> Result<Vec<(String, String)>> {
    let mut statement = conn.prepare(
        "SELECT key, value FROM metadata WHERE key = 'db_schema_version' OR key LIKE ?1 || '.%'",
    )?;
    let entries = statement
        .query_map([table.as_str()], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<(String, String)>>>()?;
    Ok(entries)
}
