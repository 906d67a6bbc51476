pub mod holder;
pub mod limit;
pub mod parse;
