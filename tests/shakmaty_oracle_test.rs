//! Tests for the shakmaty-backed oracle and full games played through it.

use chess_session::rules;
use chess_session::{
    Board, Color, GameResult, GameSession, GameState, Move, MoveOutcome, Oracle, Piece, PieceType,
    SessionStatus, ShakmatyOracle, Square,
};

fn sq(text: &str) -> Square {
    text.parse().unwrap()
}

/// Plays `moves` (coordinate notation) from `state`, panicking on an illegal one.
fn play(oracle: &ShakmatyOracle, state: GameState, moves: &[&str]) -> GameState {
    moves.iter().fold(state, |state, text| {
        let wanted: Move = text.parse().unwrap();
        oracle
            .possible_moves(&state)
            .unwrap()
            .into_iter()
            .find(|outcome| outcome.mv == wanted)
            .unwrap_or_else(|| panic!("{text} should be legal"))
            .resulting_state
    })
}

fn board_with(pieces: &[(&str, Color, PieceType)]) -> Board {
    let mut board = Board::empty();
    for (square, color, kind) in pieces {
        board.set(sq(square), Some(Piece::new(*color, *kind)));
    }
    board
}

#[test]
fn test_opening_has_twenty_moves() {
    let oracle = ShakmatyOracle::seeded(1);
    let moves = oracle.possible_moves(&GameState::initial()).unwrap();
    assert_eq!(moves.len(), 20);
    assert!(moves.iter().all(|o| o.resulting_state.side_to_move() == Color::Black));
}

#[test]
fn test_pawn_and_knight_moves_update_clock() {
    let oracle = ShakmatyOracle::seeded(1);
    let after_pawn = play(&oracle, GameState::initial(), &["e2e4"]);
    assert_eq!(after_pawn.move_number(), 1);
    assert_eq!(after_pawn.halfmove_clock(), 0);
    let pawn = after_pawn.board().get(sq("e4")).unwrap();
    assert_eq!(pawn.move_count, 1);
    assert_eq!(pawn.last_move_index, 1);

    let after_knights = play(&oracle, after_pawn, &["g8f6", "g1f3"]);
    assert_eq!(after_knights.halfmove_clock(), 2);
    assert_eq!(after_knights.last_capture_or_pawn_move(), 1);
}

#[test]
fn test_kingside_castling_moves_rook() {
    let oracle = ShakmatyOracle::seeded(1);
    let state = play(
        &oracle,
        GameState::initial(),
        &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6"],
    );
    let castled = play(&oracle, state, &["e1g1"]);

    let board = castled.board();
    assert_eq!(board.get(sq("g1")).map(|p| p.kind), Some(PieceType::King));
    assert_eq!(board.get(sq("f1")).map(|p| p.kind), Some(PieceType::Rook));
    assert!(board.is_empty(sq("h1")));
    assert!(board.is_empty(sq("e1")));
    assert_eq!(castled.castling_rights(), "kq");
}

#[test]
fn test_en_passant_capture_removes_pawn() {
    let oracle = ShakmatyOracle::seeded(1);
    let state = play(
        &oracle,
        GameState::initial(),
        &["e2e4", "a7a6", "e4e5", "d7d5"],
    );
    assert_eq!(state.en_passant_target(), Some(sq("d6")));
    assert!(state.position_key().ends_with("d6"));

    let captured = play(&oracle, state, &["e5d6"]);
    assert!(captured.board().is_empty(sq("d5")));
    assert!(captured.board().is_empty(sq("e5")));
    assert_eq!(
        captured.board().get(sq("d6")).map(|p| (p.color, p.kind)),
        Some((Color::White, PieceType::Pawn))
    );
    assert_eq!(captured.halfmove_clock(), 0);
}

#[test]
fn test_en_passant_expires_after_one_move() {
    let oracle = ShakmatyOracle::seeded(1);
    let state = play(
        &oracle,
        GameState::initial(),
        &["e2e4", "a7a6", "e4e5", "d7d5", "g1f3", "a6a5"],
    );
    assert_eq!(state.en_passant_target(), None);
    let capture: Move = "e5d6".parse().unwrap();
    let moves = oracle.possible_moves(&state).unwrap();
    assert!(moves.iter().all(|o| o.mv != capture));
}

#[test]
fn test_promotion_offers_four_candidates() {
    let oracle = ShakmatyOracle::seeded(1);
    let board = board_with(&[
        ("a1", Color::White, PieceType::King),
        ("b7", Color::White, PieceType::Pawn),
        ("h5", Color::Black, PieceType::King),
    ]);
    let state = GameState::from_board(board, Color::White);

    let candidates: Vec<MoveOutcome> = oracle
        .possible_moves(&state)
        .unwrap()
        .into_iter()
        .filter(|o| o.mv.connects(sq("b7"), sq("b8")))
        .collect();
    assert_eq!(candidates.len(), 4);
    for kind in PieceType::PROMOTIONS {
        let outcome = candidates
            .iter()
            .find(|o| o.mv.promotion == Some(kind))
            .unwrap();
        let piece = outcome.resulting_state.board().get(sq("b8")).unwrap();
        assert_eq!((piece.color, piece.kind), (Color::White, kind));
        assert!(outcome.resulting_state.board().is_empty(sq("b7")));
    }
}

#[test]
fn test_fools_mate_is_checkmate() {
    let oracle = ShakmatyOracle::seeded(1);
    let state = play(
        &oracle,
        GameState::initial(),
        &["f2f3", "e7e5", "g2g4", "d8h4"],
    );
    assert!(oracle.is_checkmate(&state).unwrap());
    assert!(!oracle.is_stalemate(&state).unwrap());
    assert!(oracle.possible_moves(&state).unwrap().is_empty());
    assert_eq!(
        rules::detect(&state, &oracle).unwrap(),
        GameResult::Checkmate {
            winner: Color::Black
        }
    );
}

#[test]
fn test_stalemate_detected() {
    let oracle = ShakmatyOracle::seeded(1);
    let board = board_with(&[
        ("h1", Color::White, PieceType::King),
        ("b6", Color::White, PieceType::Queen),
        ("a8", Color::Black, PieceType::King),
    ]);
    let state = GameState::from_board(board, Color::Black);
    assert!(oracle.is_stalemate(&state).unwrap());
    assert!(!oracle.is_checkmate(&state).unwrap());
    assert_eq!(rules::detect(&state, &oracle).unwrap(), GameResult::Stalemate);
}

#[test]
fn test_bare_kings_are_insufficient_material() {
    let oracle = ShakmatyOracle::seeded(1);
    let board = board_with(&[
        ("a1", Color::White, PieceType::King),
        ("h8", Color::Black, PieceType::King),
    ]);
    let state = GameState::from_board(board, Color::White);
    assert_eq!(
        rules::detect(&state, &oracle).unwrap(),
        GameResult::InsufficientMaterial
    );
}

#[test]
fn test_missing_king_is_oracle_error() {
    let oracle = ShakmatyOracle::seeded(1);
    let board = board_with(&[("a1", Color::White, PieceType::King)]);
    let state = GameState::from_board(board, Color::White);
    assert!(oracle.possible_moves(&state).is_err());
}

#[test]
fn test_seeded_computer_moves_are_reproducible_and_legal() {
    let state = GameState::initial();
    let first = ShakmatyOracle::seeded(42).computer_move(&state).unwrap();
    let second = ShakmatyOracle::seeded(42).computer_move(&state).unwrap();
    assert_eq!(first, second);

    let legal = ShakmatyOracle::seeded(42).possible_moves(&state).unwrap();
    assert!(legal.contains(&first));
}

#[test]
fn test_human_move_and_computer_reply_through_session() {
    let oracle = ShakmatyOracle::seeded(7);
    let mut session = GameSession::new();
    session.start_session(Color::White).unwrap();
    session.run_pending_turns(&oracle).unwrap();

    session.handle_square_interaction(sq("e2"), &oracle).unwrap();
    session.handle_square_interaction(sq("e4"), &oracle).unwrap();
    let status = session.run_pending_turns(&oracle).unwrap();

    assert_eq!(status, SessionStatus::InProgress);
    assert_eq!(session.move_log().len(), 2);
    assert_eq!(session.move_log()[0], "e2e4".parse::<Move>().unwrap());
    assert_eq!(session.current_state().side_to_move(), Color::White);
    assert!(session.is_humans_turn());
}

#[test]
fn test_random_games_stay_consistent() {
    for seed in 0..3 {
        let oracle = ShakmatyOracle::seeded(seed);
        let mut state = GameState::initial();
        for _ in 0..400 {
            if rules::detect(&state, &oracle).unwrap().is_terminal() {
                break;
            }
            let next = oracle.computer_move(&state).unwrap();
            assert_eq!(next.resulting_state.move_number(), state.move_number() + 1);
            assert!(next.resulting_state.board().king_square(Color::White).is_some());
            assert!(next.resulting_state.board().king_square(Color::Black).is_some());
            state = next.resulting_state;
        }
    }
}
