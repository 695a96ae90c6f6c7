//! Text encodings that cross the out-of-band channel
//!
//! - [`link`]: the requestor's public key as a URL parameter
//! - [`payload`]: the sender's wrapped key and ciphertext as one token

pub mod link;
pub mod payload;

pub use link::{LinkError, KEY_PARAM};
pub use payload::{PayloadError, TransportPayload};
