mod load;
mod normalize;
mod run;

pub use run::{run_xml2db, run_xml2json};

pub(crate) use load::{configure_connection, load_verses, table_exists};
pub(crate) use normalize::normalize_document;
