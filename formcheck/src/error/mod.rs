//! Error types

mod form;
mod schema;

pub use form::*;
pub use schema::*;
