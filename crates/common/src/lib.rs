/**
 * Text encodings that cross the out-of-band channel.
 *  - Share links carrying the requestor's public key
 *  - Transport payloads carrying a wrapped key and ciphertext
 */
pub mod codec;
/**
 * Cryptographic types and operations.
 *  - Requestor keypairs
 *  - Per-message symmetric secrets
 *  - Key wrapping for the requestor
 */
pub mod crypto;
/**
 * User-facing classification of failures.
 */
pub mod error;
/**
 * Async sender and receiver pipelines
 *  built on top of the crypto primitives.
 */
pub mod pipeline;
/**
 * Requestor session state: background key
 *  generation and the last-write-wins
 *  decrypt input.
 */
pub mod session;

pub mod prelude {
    pub use crate::codec::{LinkError, PayloadError, TransportPayload};
    pub use crate::crypto::{Keypair, PublicKey};
    pub use crate::error::ErrorKind;
    pub use crate::pipeline::{Decrypt, ReceiveError, Receiver, SendError, Sender};
    pub use crate::session::{
        DecryptSlot, DecryptState, DecryptView, RequestorSession, Resource, SessionError,
    };
}
