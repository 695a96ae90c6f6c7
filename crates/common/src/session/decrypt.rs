//! The requestor's payload input, as a last-write-wins state machine
//!
//! ```text
//! Idle --submit(non-empty)--> Decrypting --> Decrypted | Failed(kind)
//!   ^                             |
//!   +------ submit(empty) --------+      any submit restarts from Decrypting
//! ```
//!
//! Every submission bumps a generation number. An attempt only applies its
//! outcome if its generation is still the current one; the comparison and the
//! write happen under the watch channel's lock, so a slow, superseded attempt
//! can never overwrite the state of a newer one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::pipeline::{Decrypt, ReceiveError, Receiver};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptState {
    Idle,
    Decrypting,
    Decrypted(String),
    Failed(ReceiveError),
}

/// State of the slot together with the submission it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptView {
    pub generation: u64,
    pub state: DecryptState,
}

pub struct DecryptSlot<D: Decrypt = Receiver> {
    decryptor: Arc<D>,
    state: Arc<watch::Sender<DecryptView>>,
    debounce: Option<Duration>,
}

impl<D: Decrypt> Clone for DecryptSlot<D> {
    fn clone(&self) -> Self {
        Self {
            decryptor: self.decryptor.clone(),
            state: self.state.clone(),
            debounce: self.debounce,
        }
    }
}

impl<D: Decrypt> DecryptSlot<D> {
    pub fn new(decryptor: D) -> Self {
        let (state, _) = watch::channel(DecryptView {
            generation: 0,
            state: DecryptState::Idle,
        });
        Self {
            decryptor: Arc::new(decryptor),
            state: Arc::new(state),
            debounce: None,
        }
    }

    /// Wait `delay` before starting an attempt, skipping it if superseded meanwhile
    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce = (!delay.is_zero()).then_some(delay);
        self
    }

    /// Replace the current input, returning its generation
    ///
    /// Empty (or whitespace-only) input resets the slot to `Idle`. Anything
    /// else starts a decrypt attempt in the background.
    pub fn submit(&self, input: impl Into<String>) -> u64 {
        let input = input.into();
        let empty = input.trim().is_empty();

        let mut generation = 0;
        self.state.send_modify(|view| {
            view.generation += 1;
            generation = view.generation;
            view.state = if empty {
                DecryptState::Idle
            } else {
                DecryptState::Decrypting
            };
        });
        if empty {
            return generation;
        }

        let decryptor = self.decryptor.clone();
        let state = self.state.clone();
        let debounce = self.debounce;
        tokio::spawn(async move {
            if let Some(delay) = debounce {
                tokio::time::sleep(delay).await;
                if state.borrow().generation != generation {
                    tracing::trace!(generation, "skipping superseded input");
                    return;
                }
            }
            let outcome = decryptor.decrypt(&input).await;
            apply(&state, generation, outcome);
        });

        generation
    }

    pub fn current(&self) -> DecryptView {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DecryptView> {
        self.state.subscribe()
    }

    /// Wait until the latest submission has produced an outcome
    pub async fn settled(&self) -> DecryptView {
        let mut rx = self.state.subscribe();
        let settled = rx
            .wait_for(|view| view.state != DecryptState::Decrypting)
            .await
            .map(|view| view.clone());
        // the sender lives as long as `self`, so the channel cannot close here
        settled.unwrap_or_else(|_| self.current())
    }
}

fn apply(
    state: &watch::Sender<DecryptView>,
    generation: u64,
    outcome: Result<String, ReceiveError>,
) -> bool {
    state.send_if_modified(|view| {
        if view.generation != generation {
            tracing::debug!(
                generation,
                current = view.generation,
                "discarding superseded decrypt result"
            );
            return false;
        }
        view.state = match outcome {
            Ok(plaintext) => DecryptState::Decrypted(plaintext),
            Err(e) => DecryptState::Failed(e),
        };
        true
    })
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Decrypts `"<delay ms>:<plaintext>"` after the delay; `"<delay>:!"` fails
    #[derive(Default)]
    struct Scripted {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Decrypt for Scripted {
        async fn decrypt(&self, token: &str) -> Result<String, ReceiveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (delay, result) = token
                .split_once(':')
                .ok_or_else(|| ReceiveError::Decoding("bad script".into()))?;
            let delay: u64 = delay
                .parse()
                .map_err(|_| ReceiveError::Decoding("bad delay".into()))?;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            match result {
                "!" => Err(ReceiveError::Decryption),
                plaintext => Ok(plaintext.to_string()),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt() {
        let slot = DecryptSlot::new(Scripted::default());
        assert_eq!(slot.current().state, DecryptState::Idle);

        let generation = slot.submit("10:hello");
        assert_eq!(slot.current().state, DecryptState::Decrypting);

        let view = slot.settled().await;
        assert_eq!(view.generation, generation);
        assert_eq!(view.state, DecryptState::Decrypted("hello".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_state() {
        let slot = DecryptSlot::new(Scripted::default());
        slot.submit("5:!");
        assert_eq!(
            slot.settled().await.state,
            DecryptState::Failed(ReceiveError::Decryption)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_result_never_overwrites_newer_input() {
        let slot = DecryptSlot::new(Scripted::default());
        slot.submit("100:stale");
        let latest = slot.submit("10:fresh");

        let view = slot.settled().await;
        assert_eq!(view.generation, latest);
        assert_eq!(view.state, DecryptState::Decrypted("fresh".into()));

        // let the slow attempt finish; it must be ignored
        tokio::time::sleep(Duration::from_millis(200)).await;
        let view = slot.current();
        assert_eq!(view.generation, latest);
        assert_eq!(view.state, DecryptState::Decrypted("fresh".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_error_never_overwrites_newer_input() {
        let slot = DecryptSlot::new(Scripted::default());
        slot.submit("100:!");
        slot.submit("10:fresh");
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(slot.current().state, DecryptState::Decrypted("fresh".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_input_pending_while_older_finishes() {
        let slot = DecryptSlot::new(Scripted::default());
        slot.submit("10:old");
        slot.submit("100:new");

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(slot.current().state, DecryptState::Decrypting);

        assert_eq!(
            slot.settled().await.state,
            DecryptState::Decrypted("new".into())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_input_resets_to_idle() {
        let slot = DecryptSlot::new(Scripted::default());
        slot.submit("50:secret");
        slot.submit("   ");
        assert_eq!(slot.current().state, DecryptState::Idle);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(slot.current().state, DecryptState::Idle);
        assert_eq!(slot.current().generation, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_skips_superseded_input() {
        let slot = DecryptSlot::new(Scripted::default()).with_debounce(Duration::from_millis(30));
        slot.submit("0:a");
        slot.submit("0:ab");
        slot.submit("0:abc");

        assert_eq!(
            slot.settled().await.state,
            DecryptState::Decrypted("abc".into())
        );
        assert_eq!(slot.decryptor.calls.load(Ordering::SeqCst), 1);
    }
}
