pub mod config;
pub mod error;
pub mod extract;
pub mod keywords;
pub mod lower;
pub mod model;
pub mod parse;
pub mod validate;
pub mod wasm;
