//! OS signals that ask the tail to stop, as a single stream.
//!
//! On unix both SIGINT and SIGTERM are delivered; elsewhere only Ctrl-C.
//! Every occurrence is yielded, not just the first.

use futures::stream::{BoxStream, StreamExt as _};
use nsq_tail_core::Signal;

#[cfg(unix)]
pub fn listen() -> std::io::Result<BoxStream<'static, Signal>> {
    use tokio::signal::unix::{signal, SignalKind};
    use tokio_stream::wrappers::SignalStream;

    let interrupt = SignalStream::new(signal(SignalKind::interrupt())?).map(|()| Signal::Interrupt);
    let terminate = SignalStream::new(signal(SignalKind::terminate())?).map(|()| Signal::Terminate);

    Ok(futures::stream::select(interrupt, terminate).boxed())
}

#[cfg(not(unix))]
pub fn listen() -> std::io::Result<BoxStream<'static, Signal>> {
    let ctrl_c = futures::stream::unfold((), |()| async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some((Signal::Interrupt, ())),
            Err(e) => {
                log::error!("Stopped listening for Ctrl-C: {e}");
                None
            }
        }
    });

    Ok(ctrl_c.boxed())
}
