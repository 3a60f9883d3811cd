//! Turn coordination between the human, the session and the oracle.
//!
//! [`TurnCoordinator`] owns the [`GameSession`] on a single task. Callers
//! talk to it through a cloneable [`SessionHandle`] and observe it through a
//! stream of [`GameEvent`]s. Computer moves are computed on the blocking pool
//! and posted back to the coordinator's own queue, so the session keeps
//! answering commands (reset included) while the oracle searches.

use crate::error::SessionError;
use crate::games::chess::{Color, GameResult, GameState, Move, MoveOutcome, PieceType, Square};
use crate::oracle::{Oracle, OracleError};
use crate::session::{
    AcceptOutcome, GameSession, HumanSide, InteractionOutcome, SessionSnapshot, TurnAction,
    TurnTicket,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

const COMMAND_BUFFER: usize = 32;

/// Requests accepted by the coordinator.
#[derive(Debug)]
pub enum SessionCommand {
    /// Start a game with the human on the given side.
    Start(HumanSide),
    /// Abandon the current game.
    Reset,
    /// Click, drag start or drop on a square.
    Interact(Square),
    /// Drag a piece from one square to another.
    Drag {
        /// Square the drag started on.
        from: Square,
        /// Square the piece was dropped on.
        to: Square,
    },
    /// Pick the piece for a pending promotion.
    ResolvePromotion(PieceType),
    /// Abandon a pending promotion.
    CancelPromotion,
    /// Ask for the current session view.
    Snapshot(oneshot::Sender<SessionSnapshot>),
}

/// Messages sent from the coordinator to presentation layers.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Session state updated.
    StateChanged(SessionSnapshot),
    /// A move was played.
    MoveApplied {
        /// The move.
        mv: Move,
        /// Side that played it.
        by: Color,
    },
    /// The computer is choosing a move.
    ComputerThinking,
    /// The human's selection changed.
    SelectionChanged {
        /// Picked-up square.
        selected: Option<Square>,
        /// Outstanding promotion choices.
        promotion_candidates: Vec<Move>,
    },
    /// Game ended.
    GameOver {
        /// How it ended.
        result: GameResult,
        /// Result phrased for the human.
        message: String,
    },
    /// A computer reply arrived for a superseded state.
    StaleReplyDiscarded(TurnTicket),
    /// A command or reply failed.
    Error(String),
}

struct ComputerReply {
    ticket: TurnTicket,
    result: Result<MoveOutcome, OracleError>,
}

/// Cloneable handle for sending commands to a running coordinator.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Starts a game.
    pub async fn start(&self, side: HumanSide) -> Result<(), SessionError> {
        self.send(SessionCommand::Start(side)).await
    }

    /// Resets the session.
    pub async fn reset(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Reset).await
    }

    /// Interacts with a square.
    pub async fn interact(&self, square: Square) -> Result<(), SessionError> {
        self.send(SessionCommand::Interact(square)).await
    }

    /// Drags a piece.
    pub async fn drag(&self, from: Square, to: Square) -> Result<(), SessionError> {
        self.send(SessionCommand::Drag { from, to }).await
    }

    /// Picks a promotion piece.
    pub async fn resolve_promotion(&self, kind: PieceType) -> Result<(), SessionError> {
        self.send(SessionCommand::ResolvePromotion(kind)).await
    }

    /// Abandons a pending promotion.
    pub async fn cancel_promotion(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::CancelPromotion).await
    }

    /// Fetches the current session view.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::Snapshot(tx)).await?;
        rx.await.map_err(|_| SessionError::Closed)
    }
}

/// Actor owning a [`GameSession`].
pub struct TurnCoordinator {
    session: GameSession,
    oracle: Arc<dyn Oracle>,
    rng: StdRng,
    thinking_delay: Duration,
    commands: mpsc::Receiver<SessionCommand>,
    replies_tx: mpsc::UnboundedSender<ComputerReply>,
    replies_rx: mpsc::UnboundedReceiver<ComputerReply>,
    event_tx: mpsc::UnboundedSender<GameEvent>,
}

impl TurnCoordinator {
    /// Creates a coordinator, its command handle and its event stream.
    ///
    /// `seed` makes the "random" side choice reproducible.
    pub fn new(
        oracle: Arc<dyn Oracle>,
        thinking_delay: Duration,
        seed: Option<u64>,
    ) -> (Self, SessionHandle, mpsc::UnboundedReceiver<GameEvent>) {
        let (command_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (replies_tx, replies_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let coordinator = Self {
            session: GameSession::new(),
            oracle,
            rng,
            thinking_delay,
            commands,
            replies_tx,
            replies_rx,
            event_tx,
        };
        (
            coordinator,
            SessionHandle {
                commands: command_tx,
            },
            event_rx,
        )
    }

    /// Creates a coordinator and runs it on a new task.
    pub fn spawn(
        oracle: Arc<dyn Oracle>,
        thinking_delay: Duration,
        seed: Option<u64>,
    ) -> (
        SessionHandle,
        mpsc::UnboundedReceiver<GameEvent>,
        JoinHandle<()>,
    ) {
        let (coordinator, handle, events) = Self::new(oracle, thinking_delay, seed);
        let task = tokio::spawn(coordinator.run());
        (handle, events, task)
    }

    /// Processes commands and computer replies until every handle is dropped.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        info!("Starting turn coordinator");
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(reply) = self.replies_rx.recv() => self.handle_reply(reply),
            }
            self.drain_turns();
        }
        info!("Turn coordinator stopped");
    }

    fn emit(&self, event: GameEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("No event listener");
        }
    }

    fn emit_state(&self) {
        self.emit(GameEvent::StateChanged(self.session.snapshot()));
    }

    fn emit_selection(&self) {
        let snapshot = self.session.snapshot();
        self.emit(GameEvent::SelectionChanged {
            selected: *snapshot.selected_square(),
            promotion_candidates: snapshot.promotion_candidates().clone(),
        });
    }

    #[instrument(skip(self))]
    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Start(side) => {
                let human = side.resolve(&mut self.rng);
                match self.session.start_session(human) {
                    Ok(()) => self.emit_state(),
                    Err(e) => self.emit(GameEvent::Error(e.to_string())),
                }
            }
            SessionCommand::Reset => {
                self.session.reset_session();
                self.emit_state();
            }
            SessionCommand::Interact(square) => {
                let result = self
                    .session
                    .handle_square_interaction(square, self.oracle.as_ref());
                self.report_interaction(result);
            }
            SessionCommand::Drag { from, to } => {
                let result = self.session.handle_drag(from, to, self.oracle.as_ref());
                self.report_interaction(result);
            }
            SessionCommand::ResolvePromotion(kind) => {
                let outcome = self.session.resolve_promotion(kind);
                self.report_interaction(Ok(outcome));
            }
            SessionCommand::CancelPromotion => {
                let outcome = self.session.cancel_promotion();
                self.report_interaction(Ok(outcome));
            }
            SessionCommand::Snapshot(reply) => {
                if reply.send(self.session.snapshot()).is_err() {
                    debug!("Snapshot requester went away");
                }
            }
        }
    }

    fn report_interaction(&mut self, result: Result<InteractionOutcome, SessionError>) {
        match result {
            Ok(InteractionOutcome::Ignored) => {}
            Ok(InteractionOutcome::Applied(mv)) => {
                self.emit(GameEvent::MoveApplied {
                    mv,
                    by: self.session.human_color(),
                });
                self.emit_state();
            }
            Ok(_) => self.emit_selection(),
            Err(e) => {
                warn!(error = %e, "Interaction failed");
                self.emit(GameEvent::Error(e.to_string()));
                self.emit_selection();
            }
        }
    }

    /// Runs deferred turn checks queued by the last state change.
    fn drain_turns(&mut self) {
        while let Some(ticket) = self.session.next_turn() {
            match self.session.process_turn(ticket, self.oracle.as_ref()) {
                Ok(TurnAction::Stale | TurnAction::HumanToMove) => {}
                Ok(TurnAction::Finished(result)) => {
                    let message = result.describe_for(self.session.human_color());
                    self.emit(GameEvent::GameOver { result, message });
                }
                Ok(TurnAction::ComputerToMove { ticket, state }) => {
                    self.request_computer_move(ticket, state);
                }
                Err(e) => {
                    warn!(error = %e, "Turn check failed");
                    self.emit(GameEvent::Error(e.to_string()));
                }
            }
        }
    }

    #[instrument(skip(self, state))]
    fn request_computer_move(&self, ticket: TurnTicket, state: GameState) {
        self.emit(GameEvent::ComputerThinking);
        let oracle = Arc::clone(&self.oracle);
        let replies = self.replies_tx.clone();
        let delay = self.thinking_delay;
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let result = tokio::task::spawn_blocking(move || oracle.computer_move(&state))
                .await
                .unwrap_or_else(|e| Err(OracleError::new(format!("Computer move task failed: {e}"))));
            if replies.send(ComputerReply { ticket, result }).is_err() {
                debug!("Coordinator gone before computer reply");
            }
        });
    }

    #[instrument(skip(self, reply), fields(ticket = ?reply.ticket))]
    fn handle_reply(&mut self, reply: ComputerReply) {
        let ComputerReply { ticket, result } = reply;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(_) if !self.session.is_current(ticket) => {
                self.emit(GameEvent::StaleReplyDiscarded(ticket));
                return;
            }
            Err(e) => {
                warn!(error = %e, "Oracle failed to produce a computer move");
                self.emit(GameEvent::Error(SessionError::from(e).to_string()));
                return;
            }
        };

        let mv = outcome.mv;
        match self
            .session
            .accept_computer_move(ticket, outcome, self.oracle.as_ref())
        {
            Ok(AcceptOutcome::Applied) => {
                self.emit(GameEvent::MoveApplied {
                    mv,
                    by: self.session.human_color().opponent(),
                });
                self.emit_state();
            }
            Ok(AcceptOutcome::Discarded) => {
                self.emit(GameEvent::StaleReplyDiscarded(ticket));
            }
            Err(e) => {
                warn!(error = %e, "Computer move rejected");
                self.emit(GameEvent::Error(e.to_string()));
            }
        }
    }
}
