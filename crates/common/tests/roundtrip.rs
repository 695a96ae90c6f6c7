//! Integration tests for the full requestor/sender exchange

mod common;

use ::common::codec::link;
use ::common::pipeline::{export_public_key, generate_keypair, prepare, Decrypt, Receiver};
use std::sync::Arc;

#[tokio::test]
async fn test_roundtrip_through_share_link() {
    let keypair = Arc::new(generate_keypair().await.unwrap());
    let exported = export_public_key(&keypair).await.unwrap();
    let base = url::Url::parse("https://hush.example/").unwrap();
    let url = link::share_url(&base, &exported);

    // sender side: only the link crosses over
    let token = link::token_from_input(url.as_str()).unwrap();
    let context = prepare(&link::decode(&token).unwrap()).await.unwrap();
    let payload = context.encrypt("correct horse battery staple").await.unwrap();
    let message = payload.encode().unwrap();

    let receiver = Receiver::new(keypair);
    assert_eq!(
        receiver.decrypt(&message).await.unwrap(),
        "correct horse battery staple"
    );
}

#[tokio::test]
async fn test_roundtrip_various_plaintexts() {
    let (receiver, sender) = common::setup_pair().await;

    let long = "0123456789abcdef".repeat(16 * 1024);
    let plaintexts = [
        "",
        "a",
        "hunter2",
        "pässwörd – ünïcödé ✓",
        "日本語のパスワード",
        "emoji 🔐🗝️ and\nnew\r\nlines\tand tabs",
        "\u{0}null byte",
        long.as_str(),
    ];

    for plaintext in plaintexts {
        let token = sender.seal(plaintext).await.unwrap().encode().unwrap();
        assert_eq!(receiver.decrypt(&token).await.unwrap(), plaintext);
    }
}

#[tokio::test]
async fn test_same_plaintext_twice_gives_different_payloads() {
    let (receiver, sender) = common::setup_pair().await;

    let a = sender.seal("same secret").await.unwrap();
    let b = sender.seal("same secret").await.unwrap();
    assert_ne!(a.wrapped_key, b.wrapped_key);
    assert_ne!(a.ciphertext, b.ciphertext);

    assert_eq!(
        receiver.decrypt(&a.encode().unwrap()).await.unwrap(),
        "same secret"
    );
    assert_eq!(
        receiver.decrypt(&b.encode().unwrap()).await.unwrap(),
        "same secret"
    );
}

#[tokio::test]
async fn test_payload_survives_whitespace_from_chat_clients() {
    let (receiver, sender) = common::setup_pair().await;
    let token = sender.seal("wrapped").await.unwrap().encode().unwrap();

    let mangled = format!("\n  {}\n{}  \n", &token[..30], &token[30..]);
    assert_eq!(receiver.decrypt(&mangled).await.unwrap(), "wrapped");
}
