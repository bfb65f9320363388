use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::{ConcordanceArgs, LookupArgs, PassageArgs, StoreArgs};
use crate::model::{TableName, Verse, VerseId};
use crate::verse::{choose_preview_verse, parse_verse_key};

use super::output::{write_single_verse, write_verse_list};
use super::store::{CaseMode, VerseStore};

pub fn run_concordance(args: ConcordanceArgs) -> Result<()> {
    if args.pattern.is_empty() {
        bail!("pattern must not be empty");
    }

    let store = open_store(&args.store)?;
    let case = if args.ignore_case {
        CaseMode::AsciiInsensitive
    } else {
        CaseMode::Sensitive
    };

    let verses = match (args.from.as_deref(), args.to.as_deref()) {
        (Some(from), Some(to)) => {
            let (start, end) = parse_endpoints(from, to)?;
            store
                .concordance_between(&args.pattern, case, &start, &end)
                .with_context(|| {
                    format!(
                        "concordance for {:?} between {start} and {end} failed",
                        args.pattern
                    )
                })?
        }
        _ => store
            .concordance(&args.pattern, case)
            .with_context(|| format!("concordance for {:?} failed", args.pattern))?,
    };

    info!(pattern = %args.pattern, results = verses.len(), "concordance completed");
    emit(&args.pattern, verses, args.preview, args.json)
}

pub fn run_lookup(args: LookupArgs) -> Result<()> {
    let key = parse_verse_key(&args.verse)?;
    let store = open_store(&args.store)?;
    let verse = store
        .lookup_by_identity(&key)
        .with_context(|| format!("lookup of verse {key} failed"))?;

    write_single_verse(&verse, args.json)
}

pub fn run_passage(args: PassageArgs) -> Result<()> {
    let (start, end) = parse_endpoints(&args.from, &args.to)?;
    let store = open_store(&args.store)?;
    let verses = store
        .lookup_passage(&start, &end)
        .with_context(|| format!("passage lookup from {start} to {end} failed"))?;

    info!(start = %start, end = %end, results = verses.len(), "passage lookup completed");
    emit(&format!("{start}..{end}"), verses, args.preview, args.json)
}

fn open_store(args: &StoreArgs) -> Result<VerseStore> {
    let table = TableName::parse(&args.table_name)?;
    VerseStore::open_read_only(&args.db_path, table)
        .with_context(|| format!("failed to open database read-only: {}", args.db_path.display()))
}

fn parse_endpoints(from: &str, to: &str) -> Result<(VerseId, VerseId)> {
    Ok((parse_verse_key(from)?, parse_verse_key(to)?))
}

fn emit(query: &str, verses: Vec<Verse>, preview: bool, json: bool) -> Result<()> {
    let shown = select_output(verses, preview);
    write_verse_list(query, &shown, preview, json)
}

/// With `preview`, narrows the result to its single representative verse.
pub(super) fn select_output(verses: Vec<Verse>, preview: bool) -> Vec<Verse> {
    if !preview {
        return verses;
    }

    choose_preview_verse(&verses).cloned().into_iter().collect()
}
