//! Session controller.
//!
//! Runs a [`QuoteSession`] on its own tokio task. Edits arrive over a command
//! channel; debounce and expiry timers and completed pricing calls arrive over
//! an internal channel. Each message is applied to the session in turn, so the
//! session state has a single owner and never needs a lock. Every applied
//! message publishes a fresh [`SessionSnapshot`].

use std::collections::VecDeque;
use std::sync::Arc;

use fxquote_common::{Currency, FixedSide, SessionId};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::debounce::{DebounceAction, Debouncer};
use crate::error::{ClientError, ClientResult};
use crate::schedule::ScheduledTask;
use crate::session::{Effect, QuoteSession, SessionEvent, SessionSnapshot};
use crate::transport::QuoteTransport;

/// Commands from the presentation layer.
#[derive(Debug)]
enum Command {
    EditAmount { side: FixedSide, raw: String },
    EditCurrency { side: FixedSide, currency: Currency },
    Retry,
    Shutdown,
}

/// Messages the controller sends itself.
#[derive(Debug)]
enum Internal {
    DebounceElapsed,
    ExpiryElapsed,
    FetchCompleted(SessionEvent),
}

/// Handle to a running quote session.
///
/// Cheap to clone. The session stops when [`QuoteHandle::shutdown`] is called
/// or every handle has been dropped.
#[derive(Debug, Clone)]
pub struct QuoteHandle {
    session_id: SessionId,
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl QuoteHandle {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Type into the sell amount field; makes sell the fixed leg.
    pub fn edit_sell_amount(&self, raw: impl Into<String>) -> ClientResult<()> {
        self.send(Command::EditAmount {
            side: FixedSide::Sell,
            raw: raw.into(),
        })
    }

    /// Type into the buy amount field; makes buy the fixed leg.
    pub fn edit_buy_amount(&self, raw: impl Into<String>) -> ClientResult<()> {
        self.send(Command::EditAmount {
            side: FixedSide::Buy,
            raw: raw.into(),
        })
    }

    /// Pick the sell currency; makes sell the fixed leg.
    pub fn edit_sell_currency(&self, currency: impl Into<Currency>) -> ClientResult<()> {
        self.send(Command::EditCurrency {
            side: FixedSide::Sell,
            currency: currency.into(),
        })
    }

    /// Pick the buy currency; makes buy the fixed leg.
    pub fn edit_buy_currency(&self, currency: impl Into<Currency>) -> ClientResult<()> {
        self.send(Command::EditCurrency {
            side: FixedSide::Buy,
            currency: currency.into(),
        })
    }

    /// Ask for a new quote after a failed fetch.
    pub fn retry(&self) -> ClientResult<()> {
        self.send(Command::Retry)
    }

    /// Stop the session. Pricing calls already in flight are left to finish
    /// and their results dropped.
    pub fn shutdown(&self) -> ClientResult<()> {
        self.send(Command::Shutdown)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    fn send(&self, command: Command) -> ClientResult<()> {
        self.commands
            .send(command)
            .map_err(|_| ClientError::ControllerClosed)
    }
}

/// Start a quote session on the current tokio runtime.
pub fn spawn_session(
    config: SessionConfig,
    transport: Arc<dyn QuoteTransport>,
) -> (QuoteHandle, JoinHandle<()>) {
    let session_id = SessionId::new();
    let session = QuoteSession::new(&config);

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (internal_tx, internal_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());

    let controller = Controller {
        session_id,
        session,
        transport,
        debouncer: Debouncer::new(config.requote_spacing),
        debounce_timer: None,
        expiry_timer: None,
        internal_tx,
        snapshots: snapshot_tx,
    };

    let task = tokio::spawn(controller.run(command_rx, internal_rx));

    let handle = QuoteHandle {
        session_id,
        commands: command_tx,
        snapshots: snapshot_rx,
    };

    (handle, task)
}

struct Controller {
    session_id: SessionId,
    session: QuoteSession,
    transport: Arc<dyn QuoteTransport>,
    debouncer: Debouncer,
    debounce_timer: Option<ScheduledTask>,
    expiry_timer: Option<ScheduledTask>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl Controller {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut internal: mpsc::UnboundedReceiver<Internal>,
    ) {
        info!(session_id = %self.session_id, "Quote session started");

        let effects = self.session.start();
        self.execute(effects);
        self.publish();

        loop {
            tokio::select! {
                // Edits win over timers and responses that raced them.
                biased;

                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(message) = internal.recv() => self.handle_internal(message),
            }

            self.publish();
        }

        info!(session_id = %self.session_id, "Quote session stopped");
    }

    fn handle_command(&mut self, command: Command) {
        debug!(session_id = %self.session_id, command = ?command, "Handling command");

        let event = match command {
            Command::EditAmount { side, raw } => SessionEvent::AmountEdited { side, raw },
            Command::EditCurrency { side, currency } => {
                SessionEvent::CurrencyChanged { side, currency }
            }
            Command::Retry => SessionEvent::RetryRequested,
            Command::Shutdown => return,
        };

        self.dispatch(event);
    }

    fn handle_internal(&mut self, message: Internal) {
        let now = Instant::now();

        match message {
            Internal::DebounceElapsed => {
                clear_elapsed(&mut self.debounce_timer, now);
                if self.debouncer.deadline_reached(now) {
                    self.dispatch(SessionEvent::FetchDue);
                }
            }
            Internal::ExpiryElapsed => {
                clear_elapsed(&mut self.expiry_timer, now);
                debug!(session_id = %self.session_id, "Quote expired");
                self.dispatch(SessionEvent::QuoteExpired { at: now });
            }
            Internal::FetchCompleted(event) => self.dispatch(event),
        }
    }

    fn dispatch(&mut self, event: SessionEvent) {
        let effects = self.session.apply(event);
        self.execute(effects);
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::RequestFetch => match self.debouncer.call(Instant::now()) {
                    DebounceAction::FireNow => {
                        queue.extend(self.session.apply(SessionEvent::FetchDue));
                    }
                    DebounceAction::FireAt(deadline) => {
                        self.debounce_timer = Some(ScheduledTask::at(
                            deadline,
                            self.internal_tx.clone(),
                            Internal::DebounceElapsed,
                        ));
                    }
                },
                Effect::StartFetch {
                    generation,
                    request,
                } => {
                    info!(
                        session_id = %self.session_id,
                        generation,
                        sell = %request.sell,
                        buy = %request.buy,
                        amount = %request.amount,
                        fixed = %request.fixed,
                        "Requesting quote"
                    );

                    let transport = Arc::clone(&self.transport);
                    let tx = self.internal_tx.clone();
                    let session_id = self.session_id;

                    tokio::spawn(async move {
                        let event = match transport.fetch_quote(&request).await {
                            Ok(quote) => SessionEvent::FetchSucceeded {
                                generation,
                                quote,
                                received_at: Instant::now(),
                            },
                            Err(e) => {
                                warn!(session_id = %session_id, generation, error = %e, "Quote request failed");
                                SessionEvent::FetchFailed {
                                    generation,
                                    message: e.to_string(),
                                }
                            }
                        };
                        let _ = tx.send(Internal::FetchCompleted(event));
                    });
                }
                Effect::ArmExpiry { deadline } => {
                    self.expiry_timer = Some(ScheduledTask::at(
                        deadline,
                        self.internal_tx.clone(),
                        Internal::ExpiryElapsed,
                    ));
                }
                Effect::CancelExpiry => {
                    if let Some(timer) = self.expiry_timer.take() {
                        timer.cancel();
                    }
                }
            }
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.session.snapshot());
    }
}

/// Drop a timer slot only if it holds the timer that just fired; a message
/// from a superseded timer can still be queued after its replacement is armed.
fn clear_elapsed(slot: &mut Option<ScheduledTask>, now: Instant) {
    if slot.as_ref().is_some_and(|timer| timer.deadline() <= now) {
        *slot = None;
    }
}
