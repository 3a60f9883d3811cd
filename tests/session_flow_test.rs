//! Tests for the session's selection protocol and turn handling against a
//! scripted oracle.

use chess_session::{
    AcceptOutcome, Color, GameResult, GameSession, GameState, InteractionOutcome, Move,
    MoveOutcome, Oracle, OracleError, PieceType, SessionError, SessionStatus, Square, TurnAction,
};

/// Oracle that reports a fixed move list for every state.
#[derive(Default)]
struct ScriptedOracle {
    moves: Vec<Move>,
    reply: Option<Move>,
    checkmate: bool,
    stalemate: bool,
}

impl ScriptedOracle {
    fn with_moves(moves: Vec<Move>) -> Self {
        Self {
            moves,
            ..Self::default()
        }
    }

    fn replying(mut self, reply: Move) -> Self {
        self.reply = Some(reply);
        self
    }
}

/// Moves the piece without any legality checks.
fn outcome(state: &GameState, mv: Move) -> MoveOutcome {
    let mut board = state.board().clone();
    let mut piece = board.take(mv.source);
    if let (Some(p), Some(kind)) = (piece.as_mut(), mv.promotion) {
        p.kind = kind;
    }
    board.set(mv.destination, piece);
    MoveOutcome::new(mv, state.successor(board, false))
}

impl Oracle for ScriptedOracle {
    fn possible_moves(&self, state: &GameState) -> Result<Vec<MoveOutcome>, OracleError> {
        Ok(self.moves.iter().map(|mv| outcome(state, *mv)).collect())
    }

    fn computer_move(&self, state: &GameState) -> Result<MoveOutcome, OracleError> {
        self.reply
            .map(|mv| outcome(state, mv))
            .ok_or_else(|| OracleError::new("no scripted reply"))
    }

    fn is_checkmate(&self, _state: &GameState) -> Result<bool, OracleError> {
        Ok(self.checkmate)
    }

    fn is_stalemate(&self, _state: &GameState) -> Result<bool, OracleError> {
        Ok(self.stalemate)
    }
}

fn sq(text: &str) -> Square {
    text.parse().unwrap()
}

fn mv(text: &str) -> Move {
    text.parse().unwrap()
}

fn promotions(source: &str, destination: &str, kinds: &[PieceType]) -> Vec<Move> {
    kinds
        .iter()
        .map(|kind| Move::promoting(sq(source), sq(destination), *kind))
        .collect()
}

/// A session started with the human on `human`, initial turn processed.
fn started(human: Color, oracle: &ScriptedOracle) -> GameSession {
    let mut session = GameSession::new();
    session.start_session(human).unwrap();
    session.run_pending_turns(oracle).unwrap();
    session
}

#[test]
fn test_interaction_before_start_fails() {
    let oracle = ScriptedOracle::default();
    let mut session = GameSession::new();
    let result = session.handle_square_interaction(sq("e2"), &oracle);
    assert!(matches!(result, Err(SessionError::NotStarted)));
}

#[test]
fn test_select_then_destination_applies_move() {
    let oracle = ScriptedOracle::with_moves(vec![mv("e2e4"), mv("d2d4")]);
    let mut session = started(Color::White, &oracle);
    let expected = outcome(session.current_state(), mv("e2e4"));

    let first = session.handle_square_interaction(sq("e2"), &oracle).unwrap();
    assert_eq!(first, InteractionOutcome::Selected(sq("e2")));
    assert_eq!(session.selected_square(), Some(sq("e2")));

    let second = session.handle_square_interaction(sq("e4"), &oracle).unwrap();
    assert_eq!(second, InteractionOutcome::Applied(mv("e2e4")));
    assert_eq!(session.current_state(), &expected.resulting_state);
    assert_eq!(session.last_applied_move(), Some(mv("e2e4")));
    assert_eq!(session.selected_square(), None);
    assert!(session.has_pending_turns());
}

#[test]
fn test_empty_and_enemy_squares_ignored() {
    let oracle = ScriptedOracle::with_moves(vec![mv("e2e4")]);
    let mut session = started(Color::White, &oracle);

    let empty = session.handle_square_interaction(sq("e4"), &oracle).unwrap();
    assert_eq!(empty, InteractionOutcome::Ignored);
    let enemy = session.handle_square_interaction(sq("e7"), &oracle).unwrap();
    assert_eq!(enemy, InteractionOutcome::Ignored);
    assert_eq!(session.selected_square(), None);
}

#[test]
fn test_same_square_twice_deselects() {
    let oracle = ScriptedOracle::with_moves(vec![mv("e2e4")]);
    let mut session = started(Color::White, &oracle);

    session.handle_square_interaction(sq("e2"), &oracle).unwrap();
    let again = session.handle_square_interaction(sq("e2"), &oracle).unwrap();
    assert_eq!(again, InteractionOutcome::Deselected);
    assert_eq!(session.selected_square(), None);
}

#[test]
fn test_illegal_destination_rejected() {
    let oracle = ScriptedOracle::with_moves(vec![mv("e2e4")]);
    let mut session = started(Color::White, &oracle);
    let before = session.current_state().clone();

    session.handle_square_interaction(sq("e2"), &oracle).unwrap();
    let result = session.handle_square_interaction(sq("e5"), &oracle).unwrap();
    assert_eq!(result, InteractionOutcome::Rejected);
    assert_eq!(session.current_state(), &before);
    assert_eq!(session.selected_square(), None);
    assert!(session.move_log().is_empty());
}

#[test]
fn test_two_matching_moves_is_protocol_violation() {
    let oracle = ScriptedOracle::with_moves(vec![mv("e2e4"), mv("e2e4")]);
    let mut session = started(Color::White, &oracle);
    let before = session.current_state().clone();

    session.handle_square_interaction(sq("e2"), &oracle).unwrap();
    let result = session.handle_square_interaction(sq("e4"), &oracle);
    assert!(matches!(result, Err(SessionError::ProtocolViolation(_))));
    assert_eq!(session.current_state(), &before);
    assert_eq!(session.selected_square(), None);
}

#[test]
fn test_three_promotion_candidates_is_protocol_violation() {
    let oracle = ScriptedOracle::with_moves(promotions(
        "e2",
        "e4",
        &[PieceType::Queen, PieceType::Rook, PieceType::Bishop],
    ));
    let mut session = started(Color::White, &oracle);

    session.handle_square_interaction(sq("e2"), &oracle).unwrap();
    let result = session.handle_square_interaction(sq("e4"), &oracle);
    assert!(matches!(result, Err(SessionError::ProtocolViolation(_))));
    assert!(!session.selection().is_promotion_pending());
}

#[test]
fn test_four_candidates_missing_a_kind_is_protocol_violation() {
    let oracle = ScriptedOracle::with_moves(promotions(
        "e2",
        "e4",
        &[
            PieceType::Queen,
            PieceType::Queen,
            PieceType::Rook,
            PieceType::Bishop,
        ],
    ));
    let mut session = started(Color::White, &oracle);

    session.handle_square_interaction(sq("e2"), &oracle).unwrap();
    let result = session.handle_square_interaction(sq("e4"), &oracle);
    assert!(matches!(result, Err(SessionError::ProtocolViolation(_))));
}

#[test]
fn test_promotion_pending_then_resolved() {
    let oracle = ScriptedOracle::with_moves(promotions("e2", "e4", &PieceType::PROMOTIONS));
    let mut session = started(Color::White, &oracle);

    session.handle_square_interaction(sq("e2"), &oracle).unwrap();
    let pending = session.handle_square_interaction(sq("e4"), &oracle).unwrap();
    match pending {
        InteractionOutcome::AwaitingPromotion(candidates) => assert_eq!(candidates.len(), 4),
        other => panic!("Expected pending promotion, got {other:?}"),
    }
    assert!(session.selection().is_promotion_pending());
    assert!(session.move_log().is_empty());

    // King is not a candidate: nothing happens
    assert_eq!(
        session.resolve_promotion(PieceType::King),
        InteractionOutcome::Ignored
    );
    assert!(session.selection().is_promotion_pending());

    let applied = session.resolve_promotion(PieceType::Knight);
    let knight = Move::promoting(sq("e2"), sq("e4"), PieceType::Knight);
    assert_eq!(applied, InteractionOutcome::Applied(knight));
    assert_eq!(session.last_applied_move(), Some(knight));
    assert_eq!(
        session.current_state().board().get(sq("e4")).map(|p| p.kind),
        Some(PieceType::Knight)
    );
}

#[test]
fn test_promotion_cancelled() {
    let oracle = ScriptedOracle::with_moves(promotions("e2", "e4", &PieceType::PROMOTIONS));
    let mut session = started(Color::White, &oracle);
    let before = session.current_state().clone();

    session.handle_square_interaction(sq("e2"), &oracle).unwrap();
    session.handle_square_interaction(sq("e4"), &oracle).unwrap();
    assert_eq!(
        session.cancel_promotion(),
        InteractionOutcome::PromotionCancelled
    );
    assert!(!session.selection().is_promotion_pending());
    assert_eq!(session.current_state(), &before);

    // A square interaction abandons a pending promotion too
    session.handle_square_interaction(sq("e2"), &oracle).unwrap();
    session.handle_square_interaction(sq("e4"), &oracle).unwrap();
    let abandoned = session.handle_square_interaction(sq("a2"), &oracle).unwrap();
    assert_eq!(abandoned, InteractionOutcome::PromotionCancelled);
    assert_eq!(session.current_state(), &before);
}

#[test]
fn test_drag_applies_move() {
    let oracle = ScriptedOracle::with_moves(vec![mv("g1f3")]);
    let mut session = started(Color::White, &oracle);

    let result = session.handle_drag(sq("g1"), sq("f3"), &oracle).unwrap();
    assert_eq!(result, InteractionOutcome::Applied(mv("g1f3")));
}

#[test]
fn test_computer_replies_after_human_move() {
    let human_moves = ScriptedOracle::with_moves(vec![mv("e2e4")]);
    let mut session = started(Color::White, &human_moves);
    session.handle_square_interaction(sq("e2"), &human_moves).unwrap();
    session.handle_square_interaction(sq("e4"), &human_moves).unwrap();

    let computer = ScriptedOracle::with_moves(vec![mv("e7e5")]).replying(mv("e7e5"));
    let status = session.run_pending_turns(&computer).unwrap();

    assert_eq!(status, SessionStatus::InProgress);
    assert_eq!(session.move_log(), &[mv("e2e4"), mv("e7e5")]);
    assert!(session.is_humans_turn());
    assert_eq!(session.current_state().move_number(), 2);
}

#[test]
fn test_interaction_on_computer_turn_ignored() {
    let oracle = ScriptedOracle::with_moves(vec![mv("e2e4")]);
    let mut session = GameSession::new();
    session.start_session(Color::Black).unwrap();

    let result = session.handle_square_interaction(sq("e7"), &oracle).unwrap();
    assert_eq!(result, InteractionOutcome::Ignored);
}

#[test]
fn test_computer_opens_when_human_plays_black() {
    let oracle = ScriptedOracle::with_moves(vec![mv("d2d4")]).replying(mv("d2d4"));
    let session = started(Color::Black, &oracle);

    assert_eq!(session.move_log(), &[mv("d2d4")]);
    assert_eq!(session.current_state().side_to_move(), Color::Black);
    assert!(session.is_humans_turn());
}

#[test]
fn test_illegal_computer_move_is_protocol_violation() {
    let oracle = ScriptedOracle::with_moves(vec![mv("d2d4")]).replying(mv("d2d3"));
    let mut session = GameSession::new();
    session.start_session(Color::Black).unwrap();

    let result = session.run_pending_turns(&oracle);
    assert!(matches!(result, Err(SessionError::ProtocolViolation(_))));
    assert_eq!(session.current_state(), &GameState::initial());
    assert!(session.move_log().is_empty());
}

#[test]
fn test_reply_after_reset_is_discarded() {
    let oracle = ScriptedOracle::with_moves(vec![mv("e2e4")]).replying(mv("e2e4"));
    let mut session = GameSession::new();
    session.start_session(Color::Black).unwrap();

    let ticket = session.next_turn().unwrap();
    let TurnAction::ComputerToMove { ticket, state } = session.process_turn(ticket, &oracle).unwrap()
    else {
        panic!("Computer should be to move");
    };
    let reply = oracle.computer_move(&state).unwrap();

    session.reset_session();
    session.start_session(Color::Black).unwrap();

    let accepted = session.accept_computer_move(ticket, reply, &oracle).unwrap();
    assert_eq!(accepted, AcceptOutcome::Discarded);
    assert_eq!(session.current_state(), &GameState::initial());
    assert!(session.move_log().is_empty());
}

#[test]
fn test_duplicate_reply_is_discarded() {
    let oracle = ScriptedOracle::with_moves(vec![mv("e2e4")]).replying(mv("e2e4"));
    let mut session = GameSession::new();
    session.start_session(Color::Black).unwrap();

    let ticket = session.next_turn().unwrap();
    let TurnAction::ComputerToMove { ticket, state } = session.process_turn(ticket, &oracle).unwrap()
    else {
        panic!("Computer should be to move");
    };
    let reply = oracle.computer_move(&state).unwrap();

    assert_eq!(
        session.accept_computer_move(ticket, reply.clone(), &oracle).unwrap(),
        AcceptOutcome::Applied
    );
    assert_eq!(
        session.accept_computer_move(ticket, reply, &oracle).unwrap(),
        AcceptOutcome::Discarded
    );
    assert_eq!(session.move_log().len(), 1);
}

#[test]
fn test_checkmate_finishes_game() {
    let oracle = ScriptedOracle::with_moves(vec![mv("e2e4")]);
    let mut session = started(Color::White, &oracle);
    session.handle_drag(sq("e2"), sq("e4"), &oracle).unwrap();

    let mated = ScriptedOracle {
        checkmate: true,
        ..ScriptedOracle::default()
    };
    let status = session.run_pending_turns(&mated).unwrap();
    let expected = GameResult::Checkmate {
        winner: Color::White,
    };
    assert_eq!(status, SessionStatus::Finished(expected));
    assert_eq!(expected.describe_for(session.human_color()), "You won by checkmate.");

    // Finished games ignore input
    let result = session.handle_square_interaction(sq("d2"), &oracle).unwrap();
    assert_eq!(result, InteractionOutcome::Ignored);
}

#[test]
fn test_stalemate_finishes_game() {
    let oracle = ScriptedOracle {
        stalemate: true,
        ..ScriptedOracle::default()
    };
    let mut session = GameSession::new();
    session.start_session(Color::White).unwrap();
    let status = session.run_pending_turns(&oracle).unwrap();
    assert_eq!(status, SessionStatus::Finished(GameResult::Stalemate));
}

#[test]
fn test_start_twice_and_reset() {
    let oracle = ScriptedOracle::with_moves(vec![mv("e2e4")]);
    let mut session = started(Color::White, &oracle);
    session.handle_drag(sq("e2"), sq("e4"), &oracle).unwrap();

    assert!(matches!(
        session.start_session(Color::Black),
        Err(SessionError::AlreadyStarted)
    ));

    session.reset_session();
    assert_eq!(session.status(), SessionStatus::NotStarted);
    assert_eq!(session.current_state(), &GameState::initial());
    assert_eq!(session.last_applied_move(), None);
    assert!(session.move_log().is_empty());
    assert_eq!(session.human_color(), Color::White);
    assert_eq!(
        session.current_state().board().get(sq("e2")).map(|p| p.kind),
        Some(PieceType::Pawn)
    );
}
