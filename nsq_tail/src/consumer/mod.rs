mod lookupd;
mod nsq;

pub use lookupd::lookupd_url;
pub use nsq::{NsqConsumer, USER_AGENT};

use std::sync::Arc;

use nsq_tail_core::{Handled, Handler, HandlerError};
use tokio::sync::oneshot;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("Invalid topic name {0:?}")]
    InvalidTopic(String),

    #[error("Invalid channel name {0:?}")]
    InvalidChannel(String),

    #[error("Invalid lookupd HTTP address {0:?}")]
    InvalidLookupd(String),

    #[error("No lookupd HTTP addresses given")]
    NoLookupds,

    #[error("No handler registered before connecting")]
    NoHandler,

    #[error("Consumer is already connected")]
    AlreadyConnected,
}

/// Why a consumer stopped delivering.
#[derive(Debug)]
pub enum StopCause {
    /// [`Consumer::stop`] was called.
    Requested,
    /// The handler has shown every message that was asked for.
    Exhausted,
    /// The handler could not write a message.
    Failed(HandlerError),
    /// The client's message stream ended on its own.
    Disconnected,
}

/// How a delivered message is answered to the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ack {
    /// FIN: the message was shown.
    Finish,
    /// REQ with no delay: not shown, but another consumer may take it.
    Requeue,
    /// REQ with the client's default delay: showing it failed.
    RequeueDelayed,
}

/// Decides the answer for one handler result, and whether delivery must stop after it.
pub fn settle(handled: Result<Handled, HandlerError>) -> (Ack, Option<StopCause>) {
    match handled {
        Ok(Handled::Shown) => (Ack::Finish, None),
        Ok(Handled::Exhausted) => (Ack::Finish, Some(StopCause::Exhausted)),
        Ok(Handled::Dropped) => (Ack::Requeue, None),
        Err(e) => (Ack::RequeueDelayed, Some(StopCause::Failed(e))),
    }
}

/// Fires once when the consumer has fully ceased delivering.
pub type StopChan = oneshot::Receiver<StopCause>;

/// A broker client the tail drives.
pub trait Consumer {
    /// Registers the handler invoked for every delivered message.
    fn add_handler(&mut self, handler: Arc<dyn Handler>);

    /// Discovers nodes hosting the topic through lookupd and starts delivering.
    fn connect_to_lookupds(&mut self, addresses: &[String]) -> Result<(), ConnectError>;

    /// Asks the consumer to stop; returns immediately, completion arrives on [`Consumer::stop_chan`].
    /// Calling it more than once is harmless.
    fn stop(&self);

    fn stop_chan(&mut self) -> &mut StopChan;
}

#[cfg(test)]
mod tests {
    use std::io;

    use nsq_tail_core::{Handled, HandlerError};

    use super::{settle, Ack, StopCause};

    #[test]
    fn shown_is_finished() {
        assert!(matches!(settle(Ok(Handled::Shown)), (Ack::Finish, None)));
    }

    #[test]
    fn exhausted_is_finished_then_stops() {
        assert!(matches!(
            settle(Ok(Handled::Exhausted)),
            (Ack::Finish, Some(StopCause::Exhausted))
        ));
    }

    #[test]
    fn dropped_is_requeued_and_delivery_continues() {
        assert!(matches!(settle(Ok(Handled::Dropped)), (Ack::Requeue, None)));
    }

    #[test]
    fn failure_is_requeued_then_stops() {
        let error = HandlerError::Output(io::ErrorKind::BrokenPipe.into());
        let (ack, cause) = settle(Err(error));

        assert_eq!(ack, Ack::RequeueDelayed);
        let Some(StopCause::Failed(HandlerError::Output(e))) = &cause else {
            panic!("Expected a failure, got {cause:?}");
        };
        assert_eq!(e.kind(), io::ErrorKind::BrokenPipe);
    }
}
