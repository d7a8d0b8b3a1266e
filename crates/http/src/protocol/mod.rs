//! Protocol types shared by the codec and connection layers.
//!
//! - [`Request`]: the per-request record handed to the dispatcher
//! - [`Environ`]: the request metadata mapping, with its fixed keys in
//!   [`environ::keys`]
//! - [`Method`]: method recognition against a static verb catalog
//! - [`body`]: in-memory or file-backed body storage
//! - [`ParseError`]: everything that can go wrong while ingesting a request,
//!   with its status code

mod error;
pub use error::ParseError;

pub mod environ;
pub use environ::Environ;

mod method;
pub use method::Method;

mod request;
pub use request::ConnectionId;
pub use request::Request;

pub mod body;
