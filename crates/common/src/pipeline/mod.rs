//! The two halves of the protocol, run off the async executor
//!
//! - [`keypair`]: requestor key generation and export
//! - [`sender`]: prepare a wrapped key and encrypt a secret
//! - [`receiver`]: decode, unwrap and decrypt a payload
//!
//! Every primitive call goes through `spawn_blocking`, so the caller's
//! executor stays responsive while keys are generated or payloads decrypted.

pub mod keypair;
pub mod receiver;
pub mod sender;

pub use keypair::{export_public_key, generate_keypair};
pub use receiver::{Decrypt, ReceiveError, Receiver};
pub use sender::{prepare, SendError, Sender, WrapContext};
