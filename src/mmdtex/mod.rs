//! Compiles Scrivener multimarkdown exports into typesettable documents.

pub mod args;
pub mod errors;
pub mod layout;
pub mod pipeline;
pub mod settings;
pub mod tex;
pub mod tools;
