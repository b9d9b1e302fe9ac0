#[macro_use]
mod util;

mod tokenizer;
mod parser;
mod number;
mod document;
