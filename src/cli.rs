use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "biblemunger",
    version,
    about = "Convert the Zefania Project XML KJV to other formats and query the result"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert to a JSON file
    Xml2json(Xml2jsonArgs),
    /// Convert to a sqlite database
    Xml2db(Xml2dbArgs),
    /// Find all verses containing a string
    Concordance(ConcordanceArgs),
    /// Look up a single verse by its verse key
    Lookup(LookupArgs),
    /// Return the whole passage between two verses
    Passage(PassageArgs),
    /// Report what has been loaded into a table
    Status(StoreArgs),
}

#[derive(Args, Debug, Clone)]
pub struct Xml2jsonArgs {
    /// The location of the Zefania XML KJV
    #[arg(long = "kjvxml")]
    pub xml_path: PathBuf,

    /// Location of the JSON output file
    #[arg(long = "jsonfile")]
    pub json_path: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct Xml2dbArgs {
    /// The location of the Zefania XML KJV
    #[arg(long = "kjvxml")]
    pub xml_path: PathBuf,

    /// Location of the sqlite output file
    #[arg(long = "dbfile")]
    pub db_path: PathBuf,

    /// The name for the database table (will be dropped if it already exists)
    #[arg(long = "tablename")]
    pub table_name: String,

    /// Do not regenerate the database if --dbfile already holds the table
    #[arg(long, default_value_t = false)]
    pub skip_if_exists: bool,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    #[arg(long = "dbfile", default_value = "kjv.sqlite")]
    pub db_path: PathBuf,

    #[arg(long = "tablename", default_value = "kjv")]
    pub table_name: String,
}

#[derive(Args, Debug, Clone)]
pub struct ConcordanceArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long)]
    pub pattern: String,

    /// Verse key (book-chapter-verse) opening the searched range
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// Verse key (book-chapter-verse) closing the searched range
    #[arg(long, requires = "from")]
    pub to: Option<String>,

    /// Fold ASCII letters when matching
    #[arg(long, default_value_t = false)]
    pub ignore_case: bool,

    /// Print only the representative preview verse of the result
    #[arg(long, default_value_t = false)]
    pub preview: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long)]
    pub verse: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PassageArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long)]
    pub from: String,

    #[arg(long)]
    pub to: String,

    #[arg(long, default_value_t = false)]
    pub preview: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}
