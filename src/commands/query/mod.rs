mod output;
mod run;
mod store;
#[cfg(test)]
mod tests;

pub use run::{run_concordance, run_lookup, run_passage};
