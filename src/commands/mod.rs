pub mod extract;

pub use extract::{run_extract, ExtractArgs};
