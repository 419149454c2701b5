use futures::{Stream, StreamExt as _};
use nsq_tail_core::{Action, Shutdown, ShutdownEvent, Signal};
use tokio::sync::oneshot::error::RecvError;

use crate::{
    consumer::{Consumer, StopCause},
    TailError,
};

/// Waits for `consumer` to stop, asking it to stop on every signal.
///
/// Returns once the consumer confirms it has stopped, whether that was because
/// it was asked to, because every wanted message was shown, or because writing
/// a message failed. There is no timeout.
pub async fn run<C, S>(mut consumer: C, signals: S) -> Result<(), TailError>
where
    C: Consumer,
    S: Stream<Item = Signal> + Unpin,
{
    let mut shutdown = Shutdown::new();
    let mut signals = signals.fuse();

    loop {
        tokio::select! {
            stopped = consumer.stop_chan() => {
                if shutdown.handle(ShutdownEvent::BrokerStopped) == Some(Action::Exit) {
                    return conclude(stopped);
                }
                unreachable!("a running tail always exits once the consumer stops");
            }
            Some(signal) = signals.next() => {
                if shutdown.handle(ShutdownEvent::Signal(signal)) == Some(Action::RequestStop) {
                    consumer.stop();
                }
            }
        }
    }
}

fn conclude(stopped: Result<StopCause, RecvError>) -> Result<(), TailError> {
    match stopped {
        Ok(StopCause::Requested) => {
            log::info!("Consumer stopped on request");
            Ok(())
        }
        Ok(StopCause::Exhausted) => Ok(()),
        Ok(StopCause::Disconnected) => {
            log::warn!("Consumer disconnected on its own");
            Ok(())
        }
        Ok(StopCause::Failed(e)) => Err(e.into()),
        Err(_) => Err(TailError::ConsumerVanished),
    }
}
