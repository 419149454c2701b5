/// OS signals that ask the tail to stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Terminate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownEvent {
    /// The broker client has ceased delivering and disconnected.
    BrokerStopped,
    Signal(Signal),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownState {
    Running {
        /// Signals received so far, each of which requested a stop.
        stop_requests: usize,
    },
    Stopped,
}

/// What the caller must do in response to an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Ask the broker client to stop; it confirms later with [`ShutdownEvent::BrokerStopped`].
    RequestStop,
    /// Leave the event loop.
    Exit,
}

/// Multiplexes broker stop confirmations against OS signals.
///
/// Signals never end the loop by themselves; only the broker's confirmation does,
/// so nothing it has already acknowledged is cut short.
#[derive(Debug)]
pub struct Shutdown {
    state: ShutdownState,
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            state: ShutdownState::Running { stop_requests: 0 },
        }
    }

    pub fn state(&self) -> ShutdownState {
        self.state
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self.state, ShutdownState::Stopped)
    }

    pub fn handle(&mut self, event: ShutdownEvent) -> Option<Action> {
        match (&mut self.state, event) {
            (ShutdownState::Running { stop_requests }, ShutdownEvent::Signal(signal)) => {
                *stop_requests += 1;
                if *stop_requests == 1 {
                    log::info!("Received {signal:?}; stopping consumer");
                } else {
                    log::warn!(
                        "Received {signal:?} while already stopping ({stop_requests} requests so far)"
                    );
                }
                Some(Action::RequestStop)
            }
            (ShutdownState::Running { stop_requests }, ShutdownEvent::BrokerStopped) => {
                log::debug!("Consumer stopped after {stop_requests} stop request(s)");
                self.state = ShutdownState::Stopped;
                Some(Action::Exit)
            }
            (ShutdownState::Stopped, event) => {
                log::trace!("Ignoring {event:?}; already stopped");
                None
            }
        }
    }
}

impl std::default::Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
