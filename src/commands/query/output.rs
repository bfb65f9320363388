use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::model::Verse;
use crate::verse::{citation, format_verse_key};

#[derive(Debug, Serialize)]
struct VerseListResponse<'a> {
    query: &'a str,
    returned: usize,
    preview: bool,
    verses: &'a [Verse],
}

pub(super) fn write_verse_list(
    query: &str,
    verses: &[Verse],
    preview: bool,
    json: bool,
) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    render_verse_list(&mut output, query, verses, preview, json)?;
    output.flush()?;
    Ok(())
}

pub(super) fn render_verse_list(
    output: &mut impl Write,
    query: &str,
    verses: &[Verse],
    preview: bool,
    json: bool,
) -> Result<()> {
    if json {
        let response = VerseListResponse {
            query,
            returned: verses.len(),
            preview,
            verses,
        };
        serde_json::to_writer_pretty(&mut *output, &response)
            .context("failed to serialize verse json output")?;
        writeln!(output)?;
    } else {
        for verse in verses {
            write_verse_line(output, verse)?;
        }
    }

    Ok(())
}

pub(super) fn write_single_verse(verse: &Verse, json: bool) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    if json {
        serde_json::to_writer_pretty(&mut output, verse)
            .context("failed to serialize verse json output")?;
        writeln!(output)?;
    } else {
        write_verse_line(&mut output, verse)?;
    }

    output.flush()?;
    Ok(())
}

fn write_verse_line(output: &mut impl Write, verse: &Verse) -> Result<()> {
    writeln!(
        output,
        "{}\t{}\t{}",
        format_verse_key(verse),
        citation(verse),
        verse.verse_text
    )?;
    Ok(())
}
