//! Form value model

mod form_data;
mod value;

pub use form_data::*;
pub use value::*;
