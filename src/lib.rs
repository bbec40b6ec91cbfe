pub mod config;
pub mod derived;
pub mod document;
pub mod fetch;
pub mod output;
pub mod parser;
