use std::{
    io::{self, Write},
    sync::{Mutex, PoisonError},
};

use crate::{Handler, Message};

#[derive(thiserror::Error, Debug)]
pub enum HandlerError {
    #[error("Failed to write message to output: {0}")]
    Output(#[from] io::Error),
}

/// What became of a message passed to [`TailHandler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handled {
    /// Written to the output; keep consuming.
    Shown,
    /// Written to the output, and it was the last one wanted.
    Exhausted,
    /// The bound had already been reached; nothing was written.
    Dropped,
}

#[derive(Debug)]
struct TailState<W> {
    messages_shown: u64,
    output: W,
}

/// Writes each message body on its own line and counts how many were shown.
///
/// Write, count and bound check happen under one lock, so concurrent delivery
/// can never show more than `total_messages`.
#[derive(Debug)]
pub struct TailHandler<W> {
    /// `0` means unbounded.
    total_messages: u64,
    state: Mutex<TailState<W>>,
}

impl<W: Write> TailHandler<W> {
    pub fn new(total_messages: u64, output: W) -> Self {
        Self {
            total_messages,
            state: Mutex::new(TailState {
                messages_shown: 0,
                output,
            }),
        }
    }

    pub fn total_messages(&self) -> u64 {
        self.total_messages
    }

    pub fn messages_shown(&self) -> u64 {
        self.lock().messages_shown
    }

    pub fn into_output(self) -> W {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .output
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TailState<W>> {
        // A panic mid-write leaves the counter consistent with what was written
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bound_reached(&self, messages_shown: u64) -> bool {
        self.total_messages > 0 && messages_shown >= self.total_messages
    }

    fn show(&self, message: &Message) -> Result<Handled, HandlerError> {
        let mut state = self.lock();
        if self.bound_reached(state.messages_shown) {
            log::trace!("Bound of {} reached; dropping {message:?}", self.total_messages);
            return Ok(Handled::Dropped);
        }

        log::debug!("incoming message: {message:?}");
        state.output.write_all(&message.body)?;
        state.output.write_all(b"\n")?;
        state.output.flush()?;
        state.messages_shown += 1;

        if self.bound_reached(state.messages_shown) {
            log::info!("Shown {} of {} messages", state.messages_shown, self.total_messages);
            Ok(Handled::Exhausted)
        } else {
            Ok(Handled::Shown)
        }
    }
}

impl<W: Write + Send> Handler for TailHandler<W> {
    fn handle_message(&self, message: &Message) -> Result<Handled, HandlerError> {
        self.show(message)
    }
}
