//! One-shot effects delivered from a reducer to the presentation layer.
//!
//! Effects travel over a bounded channel and are consumed by whoever holds
//! the receiver, so each emitted effect is seen at most once. Nothing is
//! replayed to late subscribers.

use std::fmt::Debug;

use tokio::sync::mpsc;

/// Default buffer for effect channels.
pub const DEFAULT_EFFECT_BUFFER: usize = 16;

/// Handle for emitting effects.
///
/// Cheaply cloneable so spawned reducer tasks can emit too. A full or closed
/// channel is logged and the effect is dropped; the caller is never failed.
#[derive(Debug)]
pub struct EffectSender<E> {
    tx: mpsc::Sender<E>,
}

impl<E> Clone for EffectSender<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<E: Debug + Send> EffectSender<E> {
    /// Create a new effect sender from a channel sender
    pub fn new(tx: mpsc::Sender<E>) -> Self {
        Self { tx }
    }

    /// Emit an effect, waiting for buffer space if needed.
    pub async fn emit(&self, effect: E) {
        if let Err(e) = self.tx.send(effect).await {
            tracing::warn!("Dropped effect {:?}: receiver is gone", e.0);
        }
    }

    /// Emit an effect without waiting. Returns true if it was queued.
    pub fn try_emit(&self, effect: E) -> bool {
        match self.tx.try_send(effect) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to emit effect: {}", e);
                false
            }
        }
    }
}

/// Create an effect channel.
pub fn effect_channel<E: Debug + Send>(buffer: usize) -> (EffectSender<E>, mpsc::Receiver<E>) {
    let (tx, rx) = mpsc::channel(buffer);
    (EffectSender::new(tx), rx)
}
