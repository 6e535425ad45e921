pub mod envelope;
pub mod errors;
pub mod outcome;

pub use envelope::{Envelope, Message, Pipe, CONTENT_TYPE_PROPERTY, DEFAULT_CONTENT_TYPE};
pub use errors::{RuntimeError, SendableError};
pub use outcome::Outcome;
