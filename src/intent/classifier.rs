//! Intent classification seam
//!
//! Natural-language understanding runs outside the engine. The
//! [`IntentClassifier`] trait is the boundary; [`CommandClassifier`] is a
//! rule-based stand-in for typed console input:
//!
//! ```text
//! MOVE_PIECE to=f3 piece=knight   explicit intent with key=value slots
//! e2 e4 / e2e4                    a move by squares
//! knight to f3                    a move by piece and destination
//! white / black                   side choice
//! ```

use super::{Intent, IntentParams};
use crate::chess::PieceKind;
use async_trait::async_trait;

/// Classifier output: an intent identifier and its extracted slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub intent_id: String,
    pub params: IntentParams,
}

impl Classification {
    pub fn new(intent: Intent, params: IntentParams) -> Self {
        Self {
            intent_id: intent.name().to_string(),
            params,
        }
    }
}

#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, utterance: &str) -> Classification;
}

/// Keyword and notation classifier for typed commands
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandClassifier;

impl CommandClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous core of [`IntentClassifier::classify`]
    pub fn classify_line(&self, line: &str) -> Classification {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some(first) = words.first() else {
            return Classification::new(Intent::Fallback, IntentParams::default());
        };

        // Explicit form: an upper-case intent name followed by key=value slots
        let explicit = first.contains('_') || first.chars().all(|c| c.is_ascii_uppercase());
        if let Some(intent) = Intent::resolve(first).filter(|_| explicit) {
            let pairs = words[1..].iter().filter_map(|w| w.split_once('='));
            return Classification::new(intent, IntentParams::from_pairs(pairs));
        }

        let lowered: Vec<String> = words
            .iter()
            .map(|w| w.trim_matches(|c: char| !c.is_ascii_alphanumeric()).to_ascii_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        classify_words(&lowered)
    }
}

#[async_trait]
impl IntentClassifier for CommandClassifier {
    async fn classify(&self, utterance: &str) -> Classification {
        self.classify_line(utterance)
    }
}

fn is_square(word: &str) -> bool {
    let bytes = word.as_bytes();
    bytes.len() == 2 && (b'a'..=b'h').contains(&bytes[0]) && (b'1'..=b'8').contains(&bytes[1])
}

fn classify_words(words: &[String]) -> Classification {
    let squares: Vec<&str> = words
        .iter()
        .filter(|w| is_square(w))
        .map(String::as_str)
        .collect();
    let has = |needle: &str| words.iter().any(|w| w == needle);

    // "e2e4"
    if let [single] = words {
        if single.len() == 4 && is_square(&single[..2]) && is_square(&single[2..]) {
            let params = IntentParams::from_pairs([("from", &single[..2]), ("to", &single[2..])]);
            return Classification::new(Intent::MovePiece, params);
        }
    }

    if let Some(piece) = words.iter().find(|w| PieceKind::from_spoken(w).is_some()) {
        if has("how") {
            return Classification::new(
                Intent::HowPieceMoves,
                IntentParams::from_pairs([("piece", piece.as_str())]),
            );
        }
        if let Some(to) = squares.last() {
            let mut pairs = vec![("piece", piece.as_str()), ("to", *to)];
            if squares.len() > 1 {
                pairs.push(("from", squares[0]));
            }
            return Classification::new(Intent::MovePiece, IntentParams::from_pairs(pairs));
        }
    }

    match squares.as_slice() {
        [from, to, ..] => {
            return Classification::new(
                Intent::MovePiece,
                IntentParams::from_pairs([("from", *from), ("to", *to)]),
            )
        }
        [only] => {
            let slot = if has("from") { "from" } else { "to" };
            return Classification::new(
                Intent::MovePiece,
                IntentParams::from_pairs([(slot, *only)]),
            );
        }
        [] => {}
    }

    for side in ["white", "black"] {
        if has(side) {
            return Classification::new(
                Intent::ChooseSide,
                IntentParams::from_pairs([("side", side)]),
            );
        }
    }

    let intent = if has("undo") || has("takeback") {
        Intent::UndoMove
    } else if has("restart") || has("reset") {
        Intent::RestartGame
    } else if has("best") || has("hint") || has("suggest") {
        Intent::BestMove
    } else if has("start") || has("play") {
        Intent::StartGame
    } else if has("yes") || has("yeah") || has("sure") {
        Intent::RestartGameYes
    } else if has("no") || has("nope") {
        Intent::RestartGameNo
    } else if has("help") || (has("what") && has("can")) {
        Intent::PossibleActions
    } else if has("hello") || has("hi") || has("hey") {
        Intent::Hello
    } else {
        Intent::Fallback
    };
    Classification::new(intent, IntentParams::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::Color;

    fn classify(line: &str) -> Classification {
        CommandClassifier::new().classify_line(line)
    }

    #[test]
    fn test_explicit_intent_with_slots() {
        let c = classify("MOVE_PIECE to=f3 piece=knight");
        assert_eq!(c.intent_id, "MOVE_PIECE");
        assert_eq!(c.params.destination(), Some("f3".parse().unwrap()));
        assert_eq!(c.params.piece_kind(), Some(PieceKind::Knight));
    }

    #[test]
    fn test_square_pair_moves() {
        for line in ["e2 e4", "e2e4", "move e2 to e4"] {
            let c = classify(line);
            assert_eq!(c.intent_id, "MOVE_PIECE", "{}", line);
            assert_eq!(c.params.origin(), Some("e2".parse().unwrap()));
            assert_eq!(c.params.destination(), Some("e4".parse().unwrap()));
        }
    }

    #[test]
    fn test_piece_to_square() {
        let c = classify("knight to f3");
        assert_eq!(c.intent_id, "MOVE_PIECE");
        assert_eq!(c.params.origin(), None);
        assert_eq!(c.params.destination(), Some("f3".parse().unwrap()));
        assert_eq!(c.params.piece_kind(), Some(PieceKind::Knight));
    }

    #[test]
    fn test_side_choice_and_keywords() {
        let c = classify("I'll play white");
        assert_eq!(c.intent_id, "CHOOSE_SIDE");
        assert_eq!(c.params.color(), Some(Color::White));

        assert_eq!(classify("undo that").intent_id, "UNDO_MOVE");
        assert_eq!(classify("how does the bishop move").intent_id, "HOW_PIECE_MOVES");
        assert_eq!(classify("hello there").intent_id, "HELLO");
        assert_eq!(classify("").intent_id, "FALLBACK");
        assert_eq!(classify("banana").intent_id, "FALLBACK");
    }
}
