//! Shared response types.

mod envelope;
mod pagination;

pub use envelope::{Envelope, Meta};
pub use pagination::{PageRequest, Paginated};
