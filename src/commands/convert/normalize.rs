use roxmltree::{Document, Node, NodeType, ParsingOptions};
use tracing::debug;

use crate::error::{VerseError, VerseResult};
use crate::model::Verse;

const ROOT_TAG: &str = "XMLBIBLE";
const BOOK_TAG: &str = "BIBLEBOOK";
const CHAPTER_TAG: &str = "CHAPTER";
const VERSE_TAG: &str = "VERS";

/// The nodes the normalizer cares about, resolved once per child.
enum Markup<'a, 'input> {
    Book(Node<'a, 'input>),
    Chapter(Node<'a, 'input>),
    Verse(Node<'a, 'input>),
    Text(&'a str),
    Other,
}

impl<'a, 'input> Markup<'a, 'input> {
    fn classify(node: Node<'a, 'input>) -> Self {
        match node.node_type() {
            NodeType::Element => match node.tag_name().name() {
                BOOK_TAG => Self::Book(node),
                CHAPTER_TAG => Self::Chapter(node),
                VERSE_TAG => Self::Verse(node),
                _ => Self::Other,
            },
            NodeType::Text => Self::Text(node.text().unwrap_or_default()),
            NodeType::Root | NodeType::Comment | NodeType::PI => Self::Other,
        }
    }
}

struct BookHeader<'a> {
    name: &'a str,
    number: u32,
    short_name: &'a str,
}

/// Flattens a Zefania XML bible into verses in document order.
///
/// Ids are assigned from a single counter that runs across the whole document,
/// so `verses[i].id == i`. Any structural defect aborts the run.
pub(crate) fn normalize_document(xml: &str) -> VerseResult<Vec<Verse>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document = Document::parse_with_options(xml, options).map_err(|err| {
        let pos = err.pos();
        VerseError::MalformedDocument {
            position: format!("{}:{}", pos.row, pos.col),
            reason: err.to_string(),
        }
    })?;

    let root = document.root_element();
    if root.tag_name().name() != ROOT_TAG {
        return Err(malformed(
            &document,
            root,
            format!(
                "expected root element {ROOT_TAG}, found {}",
                root.tag_name().name()
            ),
        ));
    }

    let mut verses = Vec::new();
    for child in root.children() {
        match Markup::classify(child) {
            Markup::Book(book) => collect_book(&document, book, &mut verses)?,
            Markup::Chapter(node) | Markup::Verse(node) => {
                return Err(misplaced(&document, node, ROOT_TAG));
            }
            Markup::Text(_) | Markup::Other => {}
        }
    }

    Ok(verses)
}

fn collect_book(document: &Document, book: Node, verses: &mut Vec<Verse>) -> VerseResult<()> {
    let header = BookHeader {
        name: required_attribute(document, book, "bname")?,
        number: numeric_attribute(document, book, "bnumber")?,
        short_name: required_attribute(document, book, "bsname")?,
    };
    let first_id = verses.len();

    for child in book.children() {
        match Markup::classify(child) {
            Markup::Chapter(chapter) => collect_chapter(document, &header, chapter, verses)?,
            Markup::Book(node) | Markup::Verse(node) => {
                return Err(misplaced(document, node, BOOK_TAG));
            }
            Markup::Text(_) | Markup::Other => {}
        }
    }

    debug!(
        book = header.name,
        number = header.number,
        verses = verses.len() - first_id,
        "normalized book"
    );
    Ok(())
}

fn collect_chapter(
    document: &Document,
    header: &BookHeader,
    chapter: Node,
    verses: &mut Vec<Verse>,
) -> VerseResult<()> {
    let chapter_num = numeric_attribute(document, chapter, "cnumber")?;

    for child in chapter.children() {
        match Markup::classify(child) {
            Markup::Verse(verse) => {
                let verse_num = numeric_attribute(document, verse, "vnumber")?;
                let text = verse_text(document, verse)?;
                verses.push(Verse {
                    id: verses.len() as i64,
                    book_num: header.number,
                    chapter_num,
                    verse_num,
                    book_name: header.name.to_string(),
                    book_short_name: header.short_name.to_string(),
                    verse_text: text.to_string(),
                });
            }
            Markup::Book(node) | Markup::Chapter(node) => {
                return Err(misplaced(document, node, CHAPTER_TAG));
            }
            Markup::Text(_) | Markup::Other => {}
        }
    }

    Ok(())
}

/// The first text child with non-whitespace content holds the verse, kept verbatim.
/// Inline elements and indentation before it are skipped.
fn verse_text<'a>(document: &Document, verse: Node<'a, '_>) -> VerseResult<&'a str> {
    for child in verse.children() {
        match Markup::classify(child) {
            Markup::Text(text) if text.trim().is_empty() => {}
            Markup::Text(text) => return Ok(text),
            Markup::Book(node) | Markup::Chapter(node) | Markup::Verse(node) => {
                return Err(misplaced(document, node, VERSE_TAG));
            }
            Markup::Other => {}
        }
    }

    Err(malformed(
        document,
        verse,
        format!("{VERSE_TAG} element has no text content"),
    ))
}

fn required_attribute<'a>(
    document: &Document,
    node: Node<'a, '_>,
    name: &str,
) -> VerseResult<&'a str> {
    node.attribute(name).ok_or_else(|| {
        malformed(
            document,
            node,
            format!(
                "{} element is missing attribute {name}",
                node.tag_name().name()
            ),
        )
    })
}

fn numeric_attribute(document: &Document, node: Node, name: &str) -> VerseResult<u32> {
    let raw = required_attribute(document, node, name)?;
    raw.trim().parse::<u32>().map_err(|_| {
        malformed(
            document,
            node,
            format!(
                "{} attribute {name}={raw:?} is not a non-negative integer",
                node.tag_name().name()
            ),
        )
    })
}

fn misplaced(document: &Document, node: Node, parent_tag: &str) -> VerseError {
    malformed(
        document,
        node,
        format!(
            "{} element is not allowed directly inside {parent_tag}",
            node.tag_name().name()
        ),
    )
}

fn malformed(document: &Document, node: Node, reason: String) -> VerseError {
    let pos = document.text_pos_at(node.range().start);
    VerseError::MalformedDocument {
        position: format!("{}:{}", pos.row, pos.col),
        reason,
    }
}
