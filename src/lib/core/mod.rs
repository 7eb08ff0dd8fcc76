pub mod errors;
pub mod io;
