//! Deep links to third-party analysis boards.

/// Lichess analysis board; the encoded FEN is appended as a path segment.
pub const LICHESS_ANALYSIS: &str = "https://lichess.org/analysis/standard/";

/// Chess.com analysis board; the encoded FEN is the `fen` query parameter.
pub const CHESSCOM_ANALYSIS: &str = "https://www.chess.com/analysis?fen=";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisLinks {
    pub lichess: String,
    pub chess_com: String,
}

impl AnalysisLinks {
    pub fn for_fen(fen: &str) -> Self {
        let encoded = urlencoding::encode(fen);
        Self {
            lichess: format!("{LICHESS_ANALYSIS}{encoded}"),
            chess_com: format!("{CHESSCOM_ANALYSIS}{encoded}"),
        }
    }
}
