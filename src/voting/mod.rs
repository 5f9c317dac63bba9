pub mod combinations;
pub mod ledger;
pub mod tally;

pub use combinations::{Merge, Pair, deduplicate_and_merge, generate_all_pairs};
