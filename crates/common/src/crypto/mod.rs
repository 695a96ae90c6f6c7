//! Cryptographic primitives for hush
//!
//! - **Requestor keys**: an X25519 keypair per requestor session (`Keypair`)
//! - **Content encryption**: AES-256-GCM under a fresh per-message `Secret`
//! - **Key wrapping**: ECDH + AES-KW to wrap that `Secret` for the requestor
//!
//! # Protocol
//!
//! The sender:
//! 1. Imports the requestor's public key from the share link
//! 2. Generates a fresh `Secret`
//! 3. Wraps the `Secret` for the requestor (`WrappedKey`)
//! 4. Encrypts the message with the `Secret`, using the wrapped key as associated data
//!
//! The requestor recovers the `Secret` with its private key and decrypts.
//! Everything here is synchronous; [`crate::pipeline`] runs it off the async
//! executor.

mod keys;
mod secret;
mod wrapped_key;

pub use keys::{Keypair, KeyError, PublicKey, SecretKey, PUBLIC_KEY_SIZE, SPKI_SIZE};
pub use secret::{Secret, SecretError, NONCE_SIZE, SECRET_SIZE, TAG_SIZE};
pub use wrapped_key::{WrapError, WrappedKey, WRAPPED_KEY_SIZE};
