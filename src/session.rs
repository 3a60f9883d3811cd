//! Game session: the single owner of the authoritative game state.
//!
//! A [`GameSession`] holds the current [`GameState`], the human's selection
//! and the session status. State only changes by installing an
//! oracle-produced [`MoveOutcome`] wholesale. Every installed state queues a
//! [`TurnTicket`]; tickets are processed after the change has been made
//! visible, which decides whether the game is over, whether the computer
//! must reply, or whether the human is up.
//!
//! Tickets and computer replies carry the session generation and ply they
//! were issued for. A reset bumps the generation, so anything still in flight
//! from the previous game is recognised as stale and dropped.

use crate::error::SessionError;
use crate::games::chess::rules;
use crate::games::chess::selection::candidate_moves;
use crate::games::chess::{
    Color, GameResult, GameState, Move, MoveOutcome, PieceType, Selection, SelectionStep, Square,
};
use crate::oracle::Oracle;
use derive_getters::Getters;
use derive_new::new;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, instrument, warn};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Waiting for the human to pick a side.
    NotStarted,
    /// Moves are being played.
    InProgress,
    /// The game ended.
    Finished(GameResult),
}

/// Side the human asks to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HumanSide {
    /// Play White.
    #[default]
    White,
    /// Play Black.
    Black,
    /// Let a coin flip decide.
    Random,
}

impl HumanSide {
    /// Resolves the choice to a concrete color.
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> Color {
        match self {
            HumanSide::White => Color::White,
            HumanSide::Black => Color::Black,
            HumanSide::Random if rng.gen_bool(0.5) => Color::White,
            HumanSide::Random => Color::Black,
        }
    }
}

impl std::str::FromStr for HumanSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(HumanSide::White),
            "black" | "b" => Ok(HumanSide::Black),
            "random" | "r" => Ok(HumanSide::Random),
            other => Err(format!("Unknown side {other:?} (expected white, black or random)")),
        }
    }
}

/// Identifies the state a deferred turn check or computer reply belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct TurnTicket {
    /// Session generation, bumped by every reset.
    pub generation: u64,
    /// Move number of the state the ticket was issued for.
    pub ply: u32,
}

/// What processing a turn ticket decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnAction {
    /// The ticket belongs to a superseded state.
    Stale,
    /// The game just ended.
    Finished(GameResult),
    /// The computer must move from `state`; reply with the same ticket.
    ComputerToMove {
        /// Ticket the reply must carry.
        ticket: TurnTicket,
        /// State to move from.
        state: GameState,
    },
    /// Waiting for human input.
    HumanToMove,
}

/// Whether a computer reply was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// The reply was installed.
    Applied,
    /// The reply belonged to a superseded state and was dropped.
    Discarded,
}

/// Result of a human interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// No effect (not the human's turn, empty or enemy square, …).
    Ignored,
    /// A piece was picked up.
    Selected(Square),
    /// The picked-up piece was put back.
    Deselected,
    /// Illegal destination; the selection was dropped.
    Rejected,
    /// A move was played.
    Applied(Move),
    /// A promotion piece must be chosen.
    AwaitingPromotion(Vec<Move>),
    /// A pending promotion was abandoned.
    PromotionCancelled,
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct SessionSnapshot {
    /// Session status.
    status: SessionStatus,
    /// Color the human plays.
    human_color: Color,
    /// Side to move in the current state.
    side_to_move: Color,
    /// Half-moves played.
    move_number: u32,
    /// Current position as FEN.
    fen: String,
    /// Plain-text board, rank 8 on top.
    board: String,
    /// Picked-up square.
    selected_square: Option<Square>,
    /// Outstanding promotion choices.
    promotion_candidates: Vec<Move>,
    /// Most recent move.
    last_move: Option<Move>,
    /// Moves played so far.
    move_log: Vec<Move>,
}

/// A single human-versus-computer chess session.
#[derive(Debug, Clone)]
pub struct GameSession {
    status: SessionStatus,
    human: Color,
    state: GameState,
    last_move: Option<Move>,
    move_log: Vec<Move>,
    selection: Selection,
    generation: u64,
    pending: VecDeque<TurnTicket>,
}

impl GameSession {
    /// Creates a session that has not been started yet.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating new game session");
        Self {
            status: SessionStatus::NotStarted,
            human: Color::White,
            state: GameState::initial(),
            last_move: None,
            move_log: Vec::new(),
            selection: Selection::Idle,
            generation: 0,
            pending: VecDeque::new(),
        }
    }

    /// Returns the current game state.
    pub fn current_state(&self) -> &GameState {
        &self.state
    }

    /// Returns the session status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Color the human plays.
    pub fn human_color(&self) -> Color {
        self.human
    }

    /// Returns the selection protocol state.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Square the human has picked up, if any.
    pub fn selected_square(&self) -> Option<Square> {
        self.selection.selected_square()
    }

    /// The most recently applied move.
    pub fn last_applied_move(&self) -> Option<Move> {
        self.last_move
    }

    /// Every move applied in this game, in order.
    pub fn move_log(&self) -> &[Move] {
        &self.move_log
    }

    /// Current generation; bumped on every reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether turn tickets are waiting to be processed.
    pub fn has_pending_turns(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Whether the human may interact right now.
    pub fn is_humans_turn(&self) -> bool {
        self.status == SessionStatus::InProgress && self.state.side_to_move() == self.human
    }

    fn ticket(&self) -> TurnTicket {
        TurnTicket::new(self.generation, self.state.move_number())
    }

    /// Serializable view of the session for presentation layers.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            human_color: self.human,
            side_to_move: self.state.side_to_move(),
            move_number: self.state.move_number(),
            fen: self.state.to_fen(),
            board: self.state.board().display(),
            selected_square: self.selection.selected_square(),
            promotion_candidates: candidate_moves(&self.selection),
            last_move: self.last_move,
            move_log: self.move_log.clone(),
        }
    }

    /// Whether `ticket` was issued for the current state of this game.
    pub fn is_current(&self, ticket: TurnTicket) -> bool {
        ticket == self.ticket()
    }

    /// Starts the game with the human playing `human`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyStarted`] unless the session is
    /// `NotStarted`.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn start_session(&mut self, human: Color) -> Result<(), SessionError> {
        if self.status != SessionStatus::NotStarted {
            warn!(status = ?self.status, "Start requested on a running session");
            return Err(SessionError::AlreadyStarted);
        }
        info!(%human, "Starting session");
        self.human = human;
        self.status = SessionStatus::InProgress;
        self.pending.push_back(self.ticket());
        Ok(())
    }

    /// Throws the current game away and returns to the initial position.
    ///
    /// Any computer reply still in flight becomes stale.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn reset_session(&mut self) {
        self.generation += 1;
        info!(generation = self.generation, "Resetting session");
        self.status = SessionStatus::NotStarted;
        self.human = Color::White;
        self.state = GameState::initial();
        self.last_move = None;
        self.move_log.clear();
        self.selection = Selection::Idle;
        self.pending.clear();
    }

    /// Installs an oracle-produced outcome as the current state.
    ///
    /// Legality is not re-checked; callers pass outcomes picked from the
    /// oracle's legal set. Queues exactly one turn ticket.
    #[instrument(skip(self, outcome), fields(mv = %outcome.mv, generation = self.generation))]
    pub fn apply(&mut self, outcome: MoveOutcome) {
        let MoveOutcome {
            mv,
            resulting_state,
        } = outcome;
        self.state = resulting_state;
        self.last_move = Some(mv);
        self.move_log.push(mv);
        self.selection = Selection::Idle;
        self.pending.push_back(self.ticket());
        debug!(
            move_number = self.state.move_number(),
            side = %self.state.side_to_move(),
            "Move applied"
        );
    }

    // ─────────────────────────────────────────────────────────────
    //  Human input
    // ─────────────────────────────────────────────────────────────

    /// Handles a click, drag start or drop on `square`.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotStarted`] before `start_session`. Protocol
    /// violations and oracle failures leave the game state untouched and
    /// drop the selection.
    #[instrument(skip(self, oracle))]
    pub fn handle_square_interaction(
        &mut self,
        square: Square,
        oracle: &dyn Oracle,
    ) -> Result<InteractionOutcome, SessionError> {
        if self.status == SessionStatus::NotStarted {
            return Err(SessionError::NotStarted);
        }
        if !self.is_humans_turn() {
            debug!("Interaction outside the human's turn ignored");
            return Ok(InteractionOutcome::Ignored);
        }
        let result = self
            .selection
            .on_square(square, &self.state, self.human, oracle);
        match result {
            Ok((next, step)) => Ok(self.execute(next, step)),
            Err(e) => {
                self.selection = Selection::Idle;
                Err(e)
            }
        }
    }

    /// Drag-and-drop of the piece on `source` onto `destination`.
    ///
    /// # Errors
    ///
    /// As for [`GameSession::handle_square_interaction`].
    #[instrument(skip(self, oracle))]
    pub fn handle_drag(
        &mut self,
        source: Square,
        destination: Square,
        oracle: &dyn Oracle,
    ) -> Result<InteractionOutcome, SessionError> {
        if self.status == SessionStatus::NotStarted {
            return Err(SessionError::NotStarted);
        }
        if !self.is_humans_turn() {
            return Ok(InteractionOutcome::Ignored);
        }
        self.selection = Selection::Idle;
        match self.handle_square_interaction(source, oracle)? {
            InteractionOutcome::Selected(_) => self.handle_square_interaction(destination, oracle),
            other => Ok(other),
        }
    }

    /// Chooses the piece for a pending promotion.
    #[instrument(skip(self))]
    pub fn resolve_promotion(&mut self, kind: PieceType) -> InteractionOutcome {
        if !self.is_humans_turn() {
            return InteractionOutcome::Ignored;
        }
        let (next, step) = self.selection.on_promotion(kind);
        self.execute(next, step)
    }

    /// Abandons a pending promotion (or puts back a picked-up piece).
    #[instrument(skip(self))]
    pub fn cancel_promotion(&mut self) -> InteractionOutcome {
        let (next, step) = self.selection.on_cancel();
        self.execute(next, step)
    }

    fn execute(&mut self, next: Selection, step: SelectionStep) -> InteractionOutcome {
        self.selection = next;
        match step {
            SelectionStep::Ignored => InteractionOutcome::Ignored,
            SelectionStep::Selected(square) => InteractionOutcome::Selected(square),
            SelectionStep::Deselected => InteractionOutcome::Deselected,
            SelectionStep::Rejected => InteractionOutcome::Rejected,
            SelectionStep::PromotionCancelled => InteractionOutcome::PromotionCancelled,
            SelectionStep::AwaitPromotion => {
                InteractionOutcome::AwaitingPromotion(candidate_moves(&self.selection))
            }
            SelectionStep::Apply(outcome) => {
                let mv = outcome.mv;
                self.apply(outcome);
                InteractionOutcome::Applied(mv)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    //  Turn coordination
    // ─────────────────────────────────────────────────────────────

    /// Takes the oldest queued turn ticket.
    pub fn next_turn(&mut self) -> Option<TurnTicket> {
        self.pending.pop_front()
    }

    /// Decides what follows the state a ticket was issued for.
    ///
    /// Marks the session finished when the state is terminal.
    ///
    /// # Errors
    ///
    /// Oracle failures while checking for mate or stalemate.
    #[instrument(skip(self, oracle), fields(current = self.generation))]
    pub fn process_turn(
        &mut self,
        ticket: TurnTicket,
        oracle: &dyn Oracle,
    ) -> Result<TurnAction, SessionError> {
        if !self.is_current(ticket) || self.status != SessionStatus::InProgress {
            debug!(?ticket, "Stale turn ticket dropped");
            return Ok(TurnAction::Stale);
        }

        let result = rules::detect(&self.state, oracle)?;
        if result.is_terminal() {
            info!(%result, "Game finished");
            self.status = SessionStatus::Finished(result);
            self.selection = Selection::Idle;
            return Ok(TurnAction::Finished(result));
        }

        if self.state.side_to_move() == self.human {
            Ok(TurnAction::HumanToMove)
        } else {
            debug!(?ticket, "Computer to move");
            Ok(TurnAction::ComputerToMove {
                ticket,
                state: self.state.clone(),
            })
        }
    }

    /// Installs the computer's reply for `ticket`.
    ///
    /// Replies for a superseded state are discarded without effect.
    ///
    /// # Errors
    ///
    /// [`SessionError::ProtocolViolation`] if the reply is not one of the
    /// oracle's legal outcomes for the current state.
    #[instrument(skip(self, outcome, oracle), fields(mv = %outcome.mv))]
    pub fn accept_computer_move(
        &mut self,
        ticket: TurnTicket,
        outcome: MoveOutcome,
        oracle: &dyn Oracle,
    ) -> Result<AcceptOutcome, SessionError> {
        if !self.is_current(ticket) || self.status != SessionStatus::InProgress {
            info!(?ticket, current = self.generation, "Stale computer reply discarded");
            return Ok(AcceptOutcome::Discarded);
        }
        if self.state.side_to_move() == self.human {
            return Err(SessionError::protocol(format!(
                "computer move {} offered on the human's turn",
                outcome.mv
            )));
        }

        let legal = oracle.possible_moves(&self.state)?;
        if !legal.contains(&outcome) {
            warn!("Computer move is not among the legal moves");
            return Err(SessionError::protocol(format!(
                "computer move {} is not a legal move",
                outcome.mv
            )));
        }

        self.apply(outcome);
        Ok(AcceptOutcome::Applied)
    }

    /// Processes queued turn tickets inline until the human is up or the
    /// game is over, asking the oracle for each computer move directly.
    ///
    /// # Errors
    ///
    /// Oracle failures and protocol violations; the last valid state stays
    /// installed.
    #[instrument(skip(self, oracle))]
    pub fn run_pending_turns(&mut self, oracle: &dyn Oracle) -> Result<SessionStatus, SessionError> {
        while let Some(ticket) = self.next_turn() {
            if let TurnAction::ComputerToMove { ticket, state } = self.process_turn(ticket, oracle)? {
                let outcome = oracle.computer_move(&state)?;
                self.accept_computer_move(ticket, outcome, oracle)?;
            }
        }
        Ok(self.status)
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
