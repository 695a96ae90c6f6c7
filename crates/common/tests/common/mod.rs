//! Shared test utilities for protocol integration tests
#![allow(dead_code)]

use std::sync::Arc;

use common::codec::link;
use common::crypto::Keypair;
use common::pipeline::{Receiver, Sender};

/// A requestor keypair with a receiver for it, and a sender holding its link
pub async fn setup_pair() -> (Receiver, Sender) {
    let keypair = Arc::new(Keypair::generate().unwrap());
    let token = link::encode(&keypair.public().to_spki());
    let sender = Sender::from_link(&token).await.unwrap();
    (Receiver::new(keypair), sender)
}

/// Flip one bit of `bytes[index]`
pub fn flip(bytes: &[u8], index: usize) -> Vec<u8> {
    let mut out = bytes.to_vec();
    out[index] ^= 0x01;
    out
}
