//! Line-oriented console front end.
//!
//! Commands are read from stdin and forwarded to a [`TurnCoordinator`];
//! coordinator events are rendered to stdout as they arrive.

use crate::config::SessionConfig;
use crate::coordinator::{GameEvent, SessionHandle, TurnCoordinator};
use crate::games::chess::{Move, PieceType, Square};
use crate::oracle::{Oracle, ShakmatyOracle};
use crate::session::{HumanSide, SessionSnapshot, SessionStatus};
use anyhow::Result;
use derive_more::{Display, Error};
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument};

/// Help text printed at startup and on `help`.
pub const HELP: &str = "\
Commands:
  e2          select / move to a square
  e2e4        move a piece (append q, r, b or n to promote)
  q r b n     choose a promotion piece
  cancel      abandon a pending promotion
  new [side]  start over as white, black or random
  board       show the board
  state       dump the session as JSON
  help        show this text
  quit        leave";

/// A parsed console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Interact with one square.
    Square(Square),
    /// Drag a piece, optionally naming the promotion piece up front.
    Drag {
        /// Source square.
        from: Square,
        /// Destination square.
        to: Square,
        /// Promotion piece, if given.
        promotion: Option<PieceType>,
    },
    /// Resolve a pending promotion.
    Promote(PieceType),
    /// Cancel a pending promotion.
    Cancel,
    /// Reset and start again.
    New(Option<HumanSide>),
    /// Print the board.
    Board,
    /// Print the session as JSON.
    State,
    /// Print the help text.
    Help,
    /// Exit.
    Quit,
}

/// Input that is not a console command.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Unrecognised command {:?} (type help)", input)]
pub struct ParseCommandError {
    /// The offending line.
    pub input: String,
}

impl FromStr for ConsoleCommand {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCommandError {
            input: s.trim().to_string(),
        };
        let lowered = s.trim().to_ascii_lowercase();
        let mut words = lowered.split_whitespace();
        let Some(head) = words.next() else {
            return Err(err());
        };
        let rest: Vec<&str> = words.collect();

        let command = match (head, rest.as_slice()) {
            ("quit" | "exit", []) => ConsoleCommand::Quit,
            ("help" | "?", []) => ConsoleCommand::Help,
            ("board", []) => ConsoleCommand::Board,
            ("state", []) => ConsoleCommand::State,
            ("cancel", []) => ConsoleCommand::Cancel,
            ("new", []) => ConsoleCommand::New(None),
            ("new", [side]) => ConsoleCommand::New(Some(side.parse().map_err(|_| err())?)),
            (word, []) if word.len() == 1 => {
                let kind = word
                    .chars()
                    .next()
                    .and_then(PieceType::from_char)
                    .filter(|kind| kind.is_promotable())
                    .ok_or_else(err)?;
                ConsoleCommand::Promote(kind)
            }
            (word, []) if word.len() == 2 => {
                ConsoleCommand::Square(word.parse().map_err(|_| err())?)
            }
            (word, []) => {
                let mv: Move = word.parse().map_err(|_| err())?;
                ConsoleCommand::Drag {
                    from: mv.source,
                    to: mv.destination,
                    promotion: mv.promotion,
                }
            }
            _ => return Err(err()),
        };
        Ok(command)
    }
}

/// Formats a coordinator event for the console, if it is worth showing.
pub fn render_event(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::StateChanged(snapshot) => Some(render_snapshot(snapshot)),
        GameEvent::MoveApplied { mv, by } => Some(format!("{by} plays {mv}")),
        GameEvent::ComputerThinking => Some("Computer is thinking...".to_string()),
        GameEvent::SelectionChanged {
            promotion_candidates,
            ..
        } if !promotion_candidates.is_empty() => {
            Some("Promote to which piece? (q, r, b, n or cancel)".to_string())
        }
        GameEvent::SelectionChanged {
            selected: Some(square),
            ..
        } => Some(format!("Selected {square}")),
        GameEvent::SelectionChanged { selected: None, .. } => {
            Some("Selection cleared".to_string())
        }
        GameEvent::GameOver { message, .. } => Some(message.clone()),
        GameEvent::StaleReplyDiscarded(_) => None,
        GameEvent::Error(message) => Some(format!("Error: {message}")),
    }
}

/// Board diagram followed by a one-line status.
pub fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let status = match snapshot.status() {
        SessionStatus::NotStarted => "Not started (type new)".to_string(),
        SessionStatus::InProgress if snapshot.side_to_move() == snapshot.human_color() => {
            format!("{} to move (you)", snapshot.side_to_move())
        }
        SessionStatus::InProgress => format!("{} to move (computer)", snapshot.side_to_move()),
        SessionStatus::Finished(result) => result.describe_for(*snapshot.human_color()),
    };
    format!("\n{}\n{status}", snapshot.board())
}

/// Runs an interactive game on stdin/stdout until `quit` or end of input.
#[instrument(skip(config))]
pub async fn run_console(config: &SessionConfig) -> Result<()> {
    let oracle: Arc<dyn Oracle> = match config.seed() {
        Some(seed) => Arc::new(ShakmatyOracle::seeded(*seed)),
        None => Arc::new(ShakmatyOracle::new()),
    };
    let (handle, mut events, coordinator) =
        TurnCoordinator::spawn(oracle, config.computer_delay(), *config.seed());

    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Some(text) = render_event(&event) {
                println!("{text}");
            }
        }
    });

    println!("{HELP}");
    handle.start(*config.human_side()).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<ConsoleCommand>() {
            Ok(ConsoleCommand::Quit) => break,
            Ok(command) => execute(&handle, command, config).await?,
            Err(e) => println!("{e}"),
        }
    }

    info!("Console closed");
    drop(handle);
    coordinator.await?;
    printer.await?;
    Ok(())
}

#[instrument(skip(handle, config))]
async fn execute(handle: &SessionHandle, command: ConsoleCommand, config: &SessionConfig) -> Result<()> {
    debug!(?command, "Console command");
    match command {
        ConsoleCommand::Square(square) => handle.interact(square).await?,
        ConsoleCommand::Drag {
            from,
            to,
            promotion,
        } => {
            handle.drag(from, to).await?;
            if let Some(kind) = promotion {
                handle.resolve_promotion(kind).await?;
            }
        }
        ConsoleCommand::Promote(kind) => handle.resolve_promotion(kind).await?,
        ConsoleCommand::Cancel => handle.cancel_promotion().await?,
        ConsoleCommand::New(side) => {
            handle.reset().await?;
            handle.start(side.unwrap_or(*config.human_side())).await?;
        }
        ConsoleCommand::Board => {
            let snapshot = handle.snapshot().await?;
            println!("{}", render_snapshot(&snapshot));
        }
        ConsoleCommand::State => {
            let snapshot = handle.snapshot().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        ConsoleCommand::Help => println!("{HELP}"),
        ConsoleCommand::Quit => {}
    }
    Ok(())
}
