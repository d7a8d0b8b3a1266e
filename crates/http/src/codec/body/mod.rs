//! Request body ingestion.
//!
//! - [`BodyDecoder`]: moves exactly the declared number of body bytes out of
//!   the read buffer into the request's storage, across as many reads as it
//!   takes, leaving any following bytes in place

mod body_decoder;

pub use body_decoder::BodyDecoder;
