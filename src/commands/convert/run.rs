use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OpenFlags};
use tracing::info;

use crate::cli::{Xml2dbArgs, Xml2jsonArgs};
use crate::model::{ConvertRunManifest, TableName, Verse, VersesDocument};
use crate::util::{
    ensure_parent_directory, now_utc_string, read_source, sha256_hex, utc_compact_string,
    write_json_pretty,
};

use super::{configure_connection, load_verses, normalize_document, table_exists};

pub fn run_xml2json(args: Xml2jsonArgs) -> Result<()> {
    info!(xml = %args.xml_path.display(), json = %args.json_path.display(), "starting xml2json");

    let (verses, _) = read_verses(&args.xml_path)?;
    let verse_count = verses.len();
    write_json_pretty(&args.json_path, &VersesDocument { verses })?;

    info!(path = %args.json_path.display(), verses = verse_count, "wrote verses json");
    Ok(())
}

pub fn run_xml2db(args: Xml2dbArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));
    let table = TableName::parse(&args.table_name)?;

    info!(
        run_id = %run_id,
        xml = %args.xml_path.display(),
        db = %args.db_path.display(),
        table = %table,
        "starting xml2db"
    );

    let (verse_count, source_sha256, skipped) =
        if args.skip_if_exists && destination_exists(&args.db_path, &table)? {
            info!(
                path = %args.db_path.display(),
                table = %table,
                "database already holds table, skipping"
            );
            (0, None, true)
        } else {
            let (verses, source_sha256) = read_verses(&args.xml_path)?;
            let loaded = write_database(&args.db_path, &table, &verses, &source_sha256)?;
            (loaded, Some(source_sha256), false)
        };

    if let Some(manifest_path) = &args.manifest_path {
        let manifest = ConvertRunManifest {
            manifest_version: 1,
            run_id,
            started_at,
            updated_at: now_utc_string(),
            xml_path: args.xml_path.display().to_string(),
            db_path: args.db_path.display().to_string(),
            table_name: table.to_string(),
            source_sha256,
            verse_count,
            skipped,
        };
        write_json_pretty(manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote convert run manifest");
    }

    Ok(())
}

/// Reads and normalizes the XML source, returning the verses and the source hash.
fn read_verses(xml_path: &Path) -> Result<(Vec<Verse>, String)> {
    let source = read_source(xml_path)?;
    let source_sha256 = sha256_hex(source.as_bytes());
    let verses = normalize_document(&source)
        .with_context(|| format!("failed to normalize {}", xml_path.display()))?;

    info!(path = %xml_path.display(), verses = verses.len(), "normalized xml source");
    Ok((verses, source_sha256))
}

fn write_database(
    db_path: &Path,
    table: &TableName,
    verses: &[Verse],
    source_sha256: &str,
) -> Result<usize> {
    ensure_parent_directory(db_path)?;
    let mut connection = Connection::open(db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    configure_connection(&connection)?;

    load_verses(&mut connection, table, verses, Some(source_sha256))
        .with_context(|| format!("failed to load table {table} in {}", db_path.display()))
}

fn destination_exists(db_path: &Path, table: &TableName) -> Result<bool> {
    if !db_path.exists() {
        return Ok(false);
    }

    let connection = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open database read-only: {}", db_path.display()))?;

    table_exists(&connection, table)
        .with_context(|| format!("failed to inspect {}", db_path.display()))
}
