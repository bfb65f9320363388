use rusqlite::Connection;

use super::output::render_verse_list;
use super::run::select_output;
use super::store::{CaseMode, VerseStore};
use crate::commands::convert::{load_verses, normalize_document};
use crate::error::VerseError;
use crate::model::{TableName, VerseId};
use crate::verse::{choose_preview_verse, is_same_verse};

const SAMPLE_XML: &str = r#"<XMLBIBLE>
  <BIBLEBOOK bnumber="1" bname="Genesis" bsname="Gen">
    <CHAPTER cnumber="1">
      <VERS vnumber="1">In the beginning God created the heaven and the earth.</VERS>
      <VERS vnumber="2">And the earth was without form, and void.</VERS>
      <VERS vnumber="3">And God said, Let there be light: and there was light.</VERS>
    </CHAPTER>
    <CHAPTER cnumber="2">
      <VERS vnumber="1">Thus the heavens and the earth were finished.</VERS>
    </CHAPTER>
  </BIBLEBOOK>
  <BIBLEBOOK bnumber="43" bname="John" bsname="Jhn">
    <CHAPTER cnumber="11">
      <VERS vnumber="35">Jesus wept.</VERS>
      <VERS vnumber="36">Then said the Jews, Behold how he loved him! 100% love_</VERS>
    </CHAPTER>
  </BIBLEBOOK>
</XMLBIBLE>
"#;

fn loaded_store(xml: &str) -> VerseStore {
    let table = TableName::parse("kjv").expect("valid table name");
    let verses = normalize_document(xml).expect("document should normalize");
    let mut connection = Connection::open_in_memory().expect("in-memory DB should open");
    load_verses(&mut connection, &table, &verses, None).expect("load should succeed");
    VerseStore::from_connection(connection, table)
}

fn ids(verses: &[crate::model::Verse]) -> Vec<i64> {
    verses.iter().map(|verse| verse.id).collect()
}

#[test]
fn end_to_end_genesis_lookup_and_passage() {
    let xml = r#"<XMLBIBLE><BIBLEBOOK bnumber="1" bname="Genesis" bsname="Gen"><CHAPTER cnumber="1"><VERS vnumber="1">In the beginning...</VERS><VERS vnumber="2">And the earth...</VERS></CHAPTER></BIBLEBOOK></XMLBIBLE>"#;
    let store = loaded_store(xml);

    let first = store
        .lookup_by_identity(&VerseId::new(1, 1, 1))
        .expect("Genesis 1:1 should resolve");
    assert_eq!(first.id, 0);
    assert_eq!(first.verse_text, "In the beginning...");

    let passage = store
        .lookup_passage(&VerseId::new(1, 1, 1), &VerseId::new(1, 1, 2))
        .expect("passage should resolve");
    assert_eq!(ids(&passage), vec![0, 1]);
    assert_eq!(passage[1].verse_text, "And the earth...");
}

#[test]
fn lookup_by_identity_reports_missing_verse() {
    let store = loaded_store(SAMPLE_XML);

    let err = store
        .lookup_by_identity(&VerseId::new(99, 1, 1))
        .expect_err("book 99 does not exist");
    match err {
        VerseError::VerseNotFound { key } => assert_eq!(key, "99-1-1"),
        other => panic!("expected VerseNotFound, got {other:?}"),
    }
}

#[test]
fn every_loaded_identity_matches_exactly_one_row() {
    let store = loaded_store(SAMPLE_XML);
    let verses = normalize_document(SAMPLE_XML).expect("document should normalize");

    for verse in &verses {
        let found = store
            .lookup_by_identity(&VerseId::new(verse.book_num, verse.chapter_num, verse.verse_num))
            .expect("loaded verse should resolve");
        assert_eq!(&found, verse);
        assert!(is_same_verse(&found, verse));
    }
}

#[test]
fn lookup_passage_spans_chapter_and_book_boundaries() {
    let store = loaded_store(SAMPLE_XML);

    let passage = store
        .lookup_passage(&VerseId::new(1, 1, 2), &VerseId::new(43, 11, 35))
        .expect("passage should resolve");

    assert_eq!(ids(&passage), vec![1, 2, 3, 4]);
    assert_eq!(passage.len() as i64, 4 - 1 + 1);
    assert_eq!(passage.last().map(|verse| verse.book_name.as_str()), Some("John"));
}

#[test]
fn lookup_passage_single_verse_and_reversed_endpoints() {
    let store = loaded_store(SAMPLE_XML);
    let single = store
        .lookup_passage(&VerseId::new(1, 2, 1), &VerseId::new(1, 2, 1))
        .expect("single verse passage");
    assert_eq!(ids(&single), vec![3]);

    let reversed = store
        .lookup_passage(&VerseId::new(43, 11, 35), &VerseId::new(1, 1, 1))
        .expect("reversed endpoints are not an error");
    assert!(reversed.is_empty());
}

#[test]
fn lookup_passage_fails_when_an_endpoint_is_missing() {
    let store = loaded_store(SAMPLE_XML);

    let err = store
        .lookup_passage(&VerseId::new(1, 1, 1), &VerseId::new(1, 50, 1))
        .expect_err("end does not exist");
    assert!(matches!(err, VerseError::VerseNotFound { .. }));
}

#[test]
fn concordance_finds_substring_matches_in_id_order() {
    let store = loaded_store(SAMPLE_XML);

    let wept = store
        .concordance("wept", CaseMode::Sensitive)
        .expect("concordance should run");
    assert_eq!(wept.len(), 1);
    assert_eq!(wept[0].verse_text, "Jesus wept.");

    let earth = store
        .concordance("earth", CaseMode::Sensitive)
        .expect("concordance should run");
    assert_eq!(ids(&earth), vec![0, 1, 3]);

    let missing = store
        .concordance("zzz_not_present", CaseMode::Sensitive)
        .expect("concordance should run");
    assert!(missing.is_empty());
}

#[test]
fn concordance_case_modes() {
    let store = loaded_store(SAMPLE_XML);

    let sensitive = store
        .concordance("JESUS", CaseMode::Sensitive)
        .expect("concordance should run");
    assert!(sensitive.is_empty());

    let insensitive = store
        .concordance("JESUS", CaseMode::AsciiInsensitive)
        .expect("concordance should run");
    assert_eq!(ids(&insensitive), vec![4]);
}

#[test]
fn concordance_treats_like_wildcards_literally() {
    let store = loaded_store(SAMPLE_XML);

    for case in [CaseMode::Sensitive, CaseMode::AsciiInsensitive] {
        let percent = store.concordance("100%", case).expect("concordance should run");
        assert_eq!(ids(&percent), vec![5], "{case:?}");

        let underscore = store.concordance("e_", case).expect("concordance should run");
        assert_eq!(ids(&underscore), vec![5], "{case:?}");

        let wildcard = store.concordance("%", case).expect("concordance should run");
        assert_eq!(ids(&wildcard), vec![5], "{case:?}");
    }
}

#[test]
fn concordance_between_limits_to_passage() {
    let store = loaded_store(SAMPLE_XML);

    let within_genesis_one = store
        .concordance_between(
            "earth",
            CaseMode::Sensitive,
            &VerseId::new(1, 1, 1),
            &VerseId::new(1, 1, 3),
        )
        .expect("bounded concordance should run");
    assert_eq!(ids(&within_genesis_one), vec![0, 1]);

    let err = store
        .concordance_between(
            "earth",
            CaseMode::Sensitive,
            &VerseId::new(1, 1, 1),
            &VerseId::new(2, 1, 1),
        )
        .expect_err("Exodus is not loaded");
    assert!(matches!(err, VerseError::VerseNotFound { .. }));
}

#[test]
fn concordance_between_reversed_endpoints_is_empty() {
    let store = loaded_store(SAMPLE_XML);

    for case in [CaseMode::Sensitive, CaseMode::AsciiInsensitive] {
        let reversed = store
            .concordance_between("earth", case, &VerseId::new(1, 2, 1), &VerseId::new(1, 1, 1))
            .expect("reversed endpoints are not an error");
        assert!(reversed.is_empty(), "{case:?}");
    }
}

#[test]
fn concordance_between_ignoring_case() {
    let store = loaded_store(SAMPLE_XML);

    let sensitive = store
        .concordance_between(
            "AND",
            CaseMode::Sensitive,
            &VerseId::new(1, 1, 1),
            &VerseId::new(1, 2, 1),
        )
        .expect("bounded concordance should run");
    assert!(sensitive.is_empty());

    let insensitive = store
        .concordance_between(
            "AND",
            CaseMode::AsciiInsensitive,
            &VerseId::new(1, 1, 2),
            &VerseId::new(1, 2, 1),
        )
        .expect("bounded concordance should run");
    assert_eq!(ids(&insensitive), vec![1, 2, 3]);
}

#[test]
fn keyword_table_name_loads_and_queries() {
    let table = TableName::parse("select").expect("valid table name");
    let verses = normalize_document(SAMPLE_XML).expect("document should normalize");
    let mut connection = Connection::open_in_memory().expect("in-memory DB should open");
    load_verses(&mut connection, &table, &verses, None).expect("load should succeed");
    let store = VerseStore::from_connection(connection, table);

    let wept = store
        .concordance("wept", CaseMode::Sensitive)
        .expect("concordance should run");
    assert_eq!(ids(&wept), vec![4]);
    let verse = store
        .lookup_by_identity(&VerseId::new(1, 1, 1))
        .expect("lookup should run");
    assert_eq!(verse.id, 0);
}

#[test]
fn preview_of_empty_result_prints_nothing() {
    let shown = select_output(Vec::new(), true);
    assert!(shown.is_empty());

    let mut text = Vec::new();
    render_verse_list(&mut text, "zzz", &shown, true, false).expect("render should succeed");
    assert!(text.is_empty());

    let mut json = Vec::new();
    render_verse_list(&mut json, "zzz", &shown, true, true).expect("render should succeed");
    let value: serde_json::Value = serde_json::from_slice(&json).expect("json should parse");
    assert_eq!(value["returned"], 0);
    assert_eq!(value["preview"], true);
    assert_eq!(value["verses"], serde_json::json!([]));
}

#[test]
fn preview_output_keeps_only_the_chosen_verse() {
    let store = loaded_store(SAMPLE_XML);
    let earth = store
        .concordance("earth", CaseMode::Sensitive)
        .expect("concordance should run");

    let shown = select_output(earth.clone(), true);
    assert_eq!(ids(&shown), vec![3]);
    assert_eq!(select_output(earth, false).len(), 3);

    let mut text = Vec::new();
    render_verse_list(&mut text, "earth", &shown, true, false).expect("render should succeed");
    assert_eq!(
        String::from_utf8(text).expect("utf-8 output"),
        "1-2-1\tGenesis 2:1\tThus the heavens and the earth were finished.\n"
    );
}

#[test]
fn duplicated_identity_is_an_integrity_error() {
    let table = TableName::parse("kjv").expect("valid table name");
    let verses = normalize_document(SAMPLE_XML).expect("document should normalize");
    let mut connection = Connection::open_in_memory().expect("in-memory DB should open");
    load_verses(&mut connection, &table, &verses, None).expect("load should succeed");
    connection
        .execute(
            "INSERT INTO kjv(id, bookNum, chapterNum, verseNum, bookName, bookShortName, verseText)
             VALUES(100, 43, 11, 35, 'John', 'Jhn', 'Jesus wept.')",
            [],
        )
        .expect("duplicate identity row should insert");
    let store = VerseStore::from_connection(connection, table);

    let err = store
        .lookup_by_identity(&VerseId::new(43, 11, 35))
        .expect_err("two rows share the identity");
    match err {
        VerseError::StoreIntegrity { key } => assert_eq!(key, "43-11-35"),
        other => panic!("expected StoreIntegrity, got {other:?}"),
    }
}

#[test]
fn preview_of_passage_is_its_last_verse() {
    let store = loaded_store(SAMPLE_XML);
    let passage = store
        .lookup_passage(&VerseId::new(1, 1, 1), &VerseId::new(43, 11, 35))
        .expect("passage should resolve");
    assert_eq!(passage.len(), 5);

    let preview = choose_preview_verse(&passage).expect("non-empty passage");
    assert_eq!(preview.id, 4);
    assert_eq!(preview.verse_text, "Jesus wept.");
}

#[test]
fn queries_against_missing_table_surface_store_errors() {
    let connection = Connection::open_in_memory().expect("in-memory DB should open");
    let store = VerseStore::from_connection(connection, TableName::parse("kjv").expect("valid"));

    let err = store
        .concordance("wept", CaseMode::Sensitive)
        .expect_err("table does not exist");
    assert!(matches!(err, VerseError::Store(_)));
}
