//! Stockfish engine wrapper for position analysis.

use crate::Evaluation;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Duration;
use thiserror::Error;

/// Maximum number of lines to read before giving up on a UCI response.
pub const MAX_UCI_LINES: usize = 10_000;

/// Errors that can occur when working with chess engines.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to spawn the engine process.
    #[error("Failed to spawn engine: {0}")]
    SpawnError(#[from] std::io::Error),
    /// Engine failed to initialize properly (UCI handshake failed).
    #[error("Engine initialization failed")]
    InitFailed,
    /// Engine returned an invalid or unexpected response.
    #[error("Invalid engine response: {0}")]
    InvalidResponse(String),
}

/// How long the engine searches each position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    /// Fixed search depth in plies (`go depth N`).
    Depth(u32),
    /// Fixed thinking time per position (`go movetime MS`).
    MoveTime(Duration),
}

impl Default for SearchLimit {
    fn default() -> Self {
        SearchLimit::MoveTime(Duration::from_millis(500))
    }
}

impl SearchLimit {
    fn go_command(self) -> String {
        match self {
            SearchLimit::Depth(depth) => format!("go depth {}", depth),
            SearchLimit::MoveTime(time) => format!("go movetime {}", time.as_millis().max(1)),
        }
    }
}

/// Result of analyzing a chess position.
#[derive(Debug, Clone)]
pub struct PositionAnalysis {
    /// The best move found (in UCI notation, e.g., "e2e4"), or "(none)" in
    /// a position without legal moves.
    pub best_move: String,
    /// The position evaluation, from the side to move.
    pub evaluation: Evaluation,
    /// The search depth reached.
    pub depth: u32,
    /// The number of nodes searched.
    pub nodes: u64,
    /// The principal variation (sequence of best moves).
    pub pv: Vec<String>,
}

/// Wrapper for UCI-compatible analysis engines like Stockfish.
///
/// This struct manages communication with an external chess engine
/// to obtain position evaluations and best move recommendations.
pub struct AnalysisEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    /// The engine's name (reported via UCI id).
    name: String,
}

impl AnalysisEngine {
    /// Create a new analysis engine.
    ///
    /// Spawns the engine process and performs UCI initialization handshake.
    /// `engine_path` may be a bare command name resolved through `PATH`.
    ///
    /// # Errors
    ///
    /// - `EngineError::SpawnError` if the engine process fails to start
    /// - `EngineError::InitFailed` if UCI initialization fails
    pub fn new(engine_path: &str) -> Result<Self, EngineError> {
        let mut process = Command::new(engine_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = process.stdin.take().ok_or(EngineError::InitFailed)?;
        let stdout = process.stdout.take().ok_or(EngineError::InitFailed)?;
        let stdout = BufReader::new(stdout);

        let mut engine = Self {
            process,
            stdin,
            stdout,
            name: String::new(),
        };

        engine.init_uci()?;

        Ok(engine)
    }

    fn init_uci(&mut self) -> Result<(), EngineError> {
        self.send_command("uci")?;

        let mut name = String::new();
        let mut lines_read = 0;
        loop {
            if lines_read > MAX_UCI_LINES {
                return Err(EngineError::InitFailed);
            }
            lines_read += 1;
            let line = self.read_line()?;
            if let Some(id) = line.strip_prefix("id name ") {
                name = id.to_string();
            } else if line == "uciok" {
                break;
            }
        }

        self.name = if name.is_empty() {
            "Unknown Engine".to_string()
        } else {
            name
        };

        self.wait_ready()
    }

    /// Returns the engine's name as reported via UCI protocol.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Analyze a position given in FEN notation.
    pub fn analyze_fen(
        &mut self,
        fen: &str,
        limit: SearchLimit,
    ) -> Result<PositionAnalysis, EngineError> {
        self.send_command(&format!("position fen {}", fen))?;
        self.run_analysis(limit)
    }

    /// Analyze a position given as a sequence of moves from the starting position.
    ///
    /// # Arguments
    ///
    /// * `moves` - Sequence of moves in UCI notation (e.g., ["e2e4", "e7e5"])
    /// * `limit` - Search depth or time per position
    pub fn analyze_moves(
        &mut self,
        moves: &[String],
        limit: SearchLimit,
    ) -> Result<PositionAnalysis, EngineError> {
        if moves.is_empty() {
            self.send_command("position startpos")?;
        } else {
            self.send_command(&format!("position startpos moves {}", moves.join(" ")))?;
        }
        self.run_analysis(limit)
    }

    fn run_analysis(&mut self, limit: SearchLimit) -> Result<PositionAnalysis, EngineError> {
        self.send_command(&limit.go_command())?;

        let mut best_move = String::new();
        let mut evaluation = None;
        let mut best_depth: u32 = 0;
        let mut nodes: u64 = 0;
        let mut pv: Vec<String> = Vec::new();

        let mut lines_read = 0;
        loop {
            if lines_read > MAX_UCI_LINES {
                return Err(EngineError::InvalidResponse(
                    "Too many lines without bestmove".to_string(),
                ));
            }
            lines_read += 1;
            let line = self.read_line()?;

            if line.starts_with("info depth ") {
                // Bound scores come from aspiration windows and are not final.
                if line.contains("lowerbound") || line.contains("upperbound") {
                    continue;
                }
                if let Some(parsed) = Self::parse_info_line(&line) {
                    best_depth = parsed.0;
                    evaluation = Some(parsed.1);
                    nodes = parsed.2;
                    pv = parsed.3;
                }
            } else if let Some(rest) = line.strip_prefix("bestmove ") {
                best_move = rest.split_whitespace().next().unwrap_or("").to_string();
                break;
            }
        }

        if best_move.is_empty() {
            return Err(EngineError::InvalidResponse(
                "No best move received".to_string(),
            ));
        }
        let evaluation = evaluation
            .ok_or_else(|| EngineError::InvalidResponse("No score received".to_string()))?;

        Ok(PositionAnalysis {
            best_move,
            evaluation,
            depth: best_depth,
            nodes,
            pv,
        })
    }

    /// Parse a UCI info line to extract depth, score, nodes, and PV.
    ///
    /// Format: "info depth X score cp Y nodes Z pv move1 move2 ..."
    /// or: "info depth X score mate Y nodes Z pv move1 move2 ..."
    fn parse_info_line(line: &str) -> Option<(u32, Evaluation, u64, Vec<String>)> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        let mut depth: Option<u32> = None;
        let mut cp: Option<i32> = None;
        let mut mate: Option<i32> = None;
        let mut nodes: u64 = 0;
        let mut pv: Vec<String> = Vec::new();

        let mut i = 0;
        while i < parts.len() {
            match parts[i] {
                "depth" => {
                    depth = parts.get(i + 1).and_then(|s| s.parse().ok());
                    i += 1;
                }
                "score" => match parts.get(i + 1).copied() {
                    Some("cp") => {
                        cp = parts.get(i + 2).and_then(|s| s.parse().ok());
                        i += 2;
                    }
                    Some("mate") => {
                        mate = parts.get(i + 2).and_then(|s| s.parse().ok());
                        i += 2;
                    }
                    _ => {}
                },
                "nodes" => {
                    nodes = parts.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(0);
                    i += 1;
                }
                "pv" => {
                    pv = parts[i + 1..].iter().map(|s| s.to_string()).collect();
                    break;
                }
                _ => {}
            }
            i += 1;
        }

        let d = depth?;
        let eval = Evaluation::from_uci_score(cp, mate)?;

        Some((d, eval, nodes, pv))
    }

    /// Clear the engine's hash tables and prepare for a new game.
    pub fn new_game(&mut self) -> Result<(), EngineError> {
        self.send_command("ucinewgame")?;
        self.wait_ready()
    }

    fn wait_ready(&mut self) -> Result<(), EngineError> {
        self.send_command("isready")?;
        let mut lines_read = 0;
        loop {
            if lines_read > MAX_UCI_LINES {
                return Err(EngineError::InitFailed);
            }
            lines_read += 1;
            if self.read_line()? == "readyok" {
                return Ok(());
            }
        }
    }

    fn send_command(&mut self, command: &str) -> Result<(), EngineError> {
        writeln!(self.stdin, "{}", command)?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        let bytes = self.stdout.read_line(&mut line)?;
        if bytes == 0 {
            return Err(EngineError::InvalidResponse(
                "Engine closed unexpectedly".to_string(),
            ));
        }
        Ok(line.trim().to_string())
    }
}

impl Drop for AnalysisEngine {
    fn drop(&mut self) {
        let _ = self.send_command("quit");
        let _ = self.process.wait();
    }
}
