//! Oracle adapter backed by the `shakmaty` move generator.
//!
//! `shakmaty` decides which moves are legal; this adapter translates between
//! its position type and [`GameState`] and performs the record-keeping the
//! session model carries (per-piece move counters, half-move clock,
//! repetition ledger).

use super::{Oracle, OracleError};
use crate::games::chess::{GameState, Move, MoveOutcome, PieceType, Square};
use crate::games::chess::{File, Rank};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Position, Role};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Oracle answering legality queries with `shakmaty` and picking computer
/// moves uniformly at random.
#[derive(Debug)]
pub struct ShakmatyOracle {
    rng: Mutex<StdRng>,
}

impl ShakmatyOracle {
    /// Creates an oracle with an entropy-seeded move picker.
    #[instrument]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates an oracle whose computer moves are reproducible.
    #[instrument]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Builds the engine position for a state.
    #[instrument(skip(state), fields(move_number = state.move_number()))]
    fn position(state: &GameState) -> Result<Chess, OracleError> {
        let fen_text = state.to_fen();
        let fen: Fen = fen_text
            .parse()
            .map_err(|e| OracleError::new(format!("Unparseable FEN {fen_text:?}: {e}")))?;
        fen.into_position(CastlingMode::Standard)
            .map_err(|e| OracleError::new(format!("Illegal position {fen_text:?}: {e}")))
    }

    /// Translates an engine move into session notation.
    fn translate(engine_move: &shakmaty::Move) -> Result<Move, OracleError> {
        let from = engine_move
            .from()
            .ok_or_else(|| OracleError::new(format!("Drop move {engine_move:?} in standard chess")))?;
        let source = convert_square(from)?;

        let destination = match engine_move {
            // The engine names the rook's square; the session names the king's.
            shakmaty::Move::Castle { king, rook } => {
                let file = if rook.file() > king.file() {
                    File::G
                } else {
                    File::C
                };
                Square::new(file, source.rank())
            }
            other => convert_square(other.to())?,
        };

        let promotion = engine_move.promotion().map(convert_role);
        Ok(Move {
            source,
            destination,
            promotion,
        })
    }
}

impl Default for ShakmatyOracle {
    fn default() -> Self {
        Self::new()
    }
}

fn convert_square(square: shakmaty::Square) -> Result<Square, OracleError> {
    square
        .to_string()
        .parse()
        .map_err(|e| OracleError::new(format!("Unmappable square {square:?}: {e}")))
}

fn convert_role(role: Role) -> PieceType {
    match role {
        Role::Pawn => PieceType::Pawn,
        Role::Knight => PieceType::Knight,
        Role::Bishop => PieceType::Bishop,
        Role::Rook => PieceType::Rook,
        Role::Queen => PieceType::Queen,
        Role::King => PieceType::King,
    }
}

/// Plays a legal move on the session model and returns the resulting state.
#[instrument(skip(state), fields(move_number = state.move_number()))]
fn play(state: &GameState, mv: Move) -> Result<GameState, OracleError> {
    let mut board = state.board().clone();
    let index = state.move_number() + 1;

    let mut piece = board
        .take(mv.source)
        .ok_or_else(|| OracleError::new(format!("No piece on {} for move {mv}", mv.source)))?;
    let mut capture = board.take(mv.destination).is_some();
    let file_delta = mv.destination.file().index() as isize - mv.source.file().index() as isize;

    match piece.kind {
        // Diagonal pawn step onto an empty square: en passant.
        PieceType::Pawn if file_delta != 0 && !capture => {
            let victim = Square::new(mv.destination.file(), mv.source.rank());
            capture = board.take(victim).is_some();
        }
        PieceType::King if file_delta.abs() == 2 => {
            let (rook_from, rook_to) = if file_delta > 0 {
                (File::H, File::F)
            } else {
                (File::A, File::D)
            };
            let rank: Rank = mv.source.rank();
            let mut rook = board
                .take(Square::new(rook_from, rank))
                .ok_or_else(|| OracleError::new(format!("Castling {mv} without a rook")))?;
            rook.move_count += 1;
            rook.last_move_index = index;
            board.set(Square::new(rook_to, rank), Some(rook));
        }
        _ => {}
    }

    let resets_clock = capture || piece.kind == PieceType::Pawn;
    piece.move_count += 1;
    piece.last_move_index = index;
    if let Some(kind) = mv.promotion {
        piece.kind = kind;
    }
    board.set(mv.destination, Some(piece));

    Ok(state.successor(board, resets_clock))
}

impl Oracle for ShakmatyOracle {
    #[instrument(skip_all, fields(move_number = state.move_number(), side = %state.side_to_move()))]
    fn possible_moves(&self, state: &GameState) -> Result<Vec<MoveOutcome>, OracleError> {
        let position = Self::position(state)?;
        let outcomes = position
            .legal_moves()
            .iter()
            .map(|engine_move| {
                let mv = Self::translate(engine_move)?;
                Ok(MoveOutcome::new(mv, play(state, mv)?))
            })
            .collect::<Result<Vec<_>, OracleError>>()?;
        debug!(count = outcomes.len(), "Generated legal moves");
        Ok(outcomes)
    }

    #[instrument(skip_all, fields(move_number = state.move_number(), side = %state.side_to_move()))]
    fn computer_move(&self, state: &GameState) -> Result<MoveOutcome, OracleError> {
        let outcomes = self.possible_moves(state)?;
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| OracleError::new("Move picker lock poisoned"))?;
        let choice = outcomes.choose(&mut *rng).cloned().ok_or_else(|| {
            warn!("Computer asked to move without legal moves");
            OracleError::new("No legal moves available")
        })?;
        debug!(mv = %choice.mv, "Computer chose move");
        Ok(choice)
    }

    #[instrument(skip_all, fields(move_number = state.move_number()))]
    fn is_checkmate(&self, state: &GameState) -> Result<bool, OracleError> {
        Ok(Self::position(state)?.is_checkmate())
    }

    #[instrument(skip_all, fields(move_number = state.move_number()))]
    fn is_stalemate(&self, state: &GameState) -> Result<bool, OracleError> {
        Ok(Self::position(state)?.is_stalemate())
    }
}
