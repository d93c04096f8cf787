//! Response phrasing
//!
//! Handlers decide *what* happened and name it as a [`ResponseCategory`];
//! this module decides how Andy says it. Each category has one or more
//! template variants, and a [`PhrasePicker`] chooses between them. Production
//! uses [`RandomPicker`]; tests inject [`FirstPicker`] so replies are stable.
//!
//! Templates may reference `{from}`, `{to}`, `{piece}` and `{side}`.

use crate::chess::{ChessMove, Color, PieceKind, Square};
use rand::Rng;
use std::sync::Arc;

/// What a reply is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCategory {
    Hello,
    Fallback,
    WakeUpPrompt,
    WakeUpYes,
    WakeUpNo,
    SidePrompt,
    SideChosen,
    MoveSuccess,
    Check,
    Checkmate,
    EmptySquare,
    WrongSide,
    IllegalMove,
    MissingOrigin,
    MissingDestination,
    NoLegalSource,
    AmbiguousMove,
    HowPieceMoves(PieceKind),
    UnknownPiece,
    PossibleActions,
    BestMove,
    RecommenderApology,
    RestartPrompt,
    RestartConfirmed,
    RestartCancelled,
    NoRestartPending,
    UndoSuccess,
    NothingToUndo,
    AndyMove,
    AndyCheck,
    AndyCheckmate,
    AndyStuck,
}

impl ResponseCategory {
    pub fn templates(self) -> &'static [&'static str] {
        match self {
            ResponseCategory::Hello => &["Hi! How are you?", "Hey, what's up?", "Yo, how's it going?"],
            ResponseCategory::Fallback => &[
                "I didn't get that. Can you say it again?",
                "I missed what you said. What was that?",
                "Sorry, could you say that again?",
                "Can you say that again?",
                "One more time?",
                "What was that?",
                "Say that one more time?",
                "I'm not sure I understood that.",
            ],
            ResponseCategory::WakeUpPrompt => &[
                "Hey there, I'm Andy! Want to play a game of chess?",
                "Hi, I'm Andy! Up for a game of chess?",
            ],
            ResponseCategory::WakeUpYes => &[
                "Awesome! Which side would you like to play, white or black?",
                "Great! Do you want to be white or black?",
            ],
            ResponseCategory::WakeUpNo => &[
                "No worries, just say hi whenever you're ready to play.",
                "Alright, I'll be here if you change your mind.",
            ],
            ResponseCategory::SidePrompt => &[
                "Which side would you like to play, white or black?",
                "Pick a side: white or black?",
            ],
            ResponseCategory::SideChosen => &[
                "Great, you'll play {side} side then!",
                "Alright, you're {side}. Let's play!",
            ],
            ResponseCategory::MoveSuccess => &[
                "Okay, moving {from} to {to}.",
                "Great, {from} will go to {to}.",
            ],
            ResponseCategory::Check => &["That puts me in check!"],
            ResponseCategory::Checkmate => &["And that puts me in checkmate, you win!"],
            ResponseCategory::EmptySquare => &[
                "I don't see a piece at {from}, Perhaps I misunderstood?",
                "It seems like there is no piece at {from}, Perhaps I misunderstood?",
            ],
            ResponseCategory::WrongSide => &[
                "Don't touch my pieces!",
                "You can win without cheating- move your own colored piece!",
            ],
            ResponseCategory::IllegalMove => &[
                "I heard ya, but that move is illegal.",
                "I would let ya make that move, but there are rules to this game!",
            ],
            ResponseCategory::MissingOrigin => &[
                "Which piece did you want to move?",
                "You wanted to move the piece at which location?",
            ],
            ResponseCategory::MissingDestination => &[
                "You wanted to move your piece at {from} to where?",
                "Where did you want to move your piece at {from} to?",
            ],
            ResponseCategory::NoLegalSource => &[
                "I don't see a piece that can get to {to}. Which piece did you mean?",
                "Nothing can move to {to} right now. Which piece did you mean?",
            ],
            ResponseCategory::AmbiguousMove => &[
                "More than one piece can go to {to}. Which one did you mean?",
                "A few pieces can reach {to}. Which one should I move?",
            ],
            ResponseCategory::HowPieceMoves(kind) => match kind {
                PieceKind::Pawn => &["A pawn moves one square forward, or two from its starting square, and captures one square diagonally forward."],
                PieceKind::Knight => &["A knight moves in an L shape: two squares one way and one square to the side. It can jump over other pieces."],
                PieceKind::Bishop => &["A bishop moves any number of squares diagonally."],
                PieceKind::Rook => &["A rook moves any number of squares along a rank or file."],
                PieceKind::Queen => &["A queen moves any number of squares in a straight line, along ranks, files or diagonals."],
                PieceKind::King => &["A king moves one square in any direction, and can castle with a rook that hasn't moved yet."],
            },
            ResponseCategory::UnknownPiece => &[
                "Which piece would you like to know about?",
                "Tell me which piece you're curious about.",
            ],
            ResponseCategory::PossibleActions => &[
                "You can tell me a move like e2 to e4 or knight to f3, ask how a piece moves, ask for the best move, undo your last move, or restart the game.",
            ],
            ResponseCategory::BestMove => &[
                "If I were you, I'd move the {piece} from {from} to {to}.",
                "Try moving your {piece} from {from} to {to}.",
            ],
            ResponseCategory::RecommenderApology => &[
                "Sorry, I couldn't come up with a move in time.",
                "My mind's a little foggy right now. Ask me again in a moment?",
            ],
            ResponseCategory::RestartPrompt => &[
                "Are you sure you'd like to restart the game?",
                "Would you really like to start another round?",
            ],
            ResponseCategory::RestartConfirmed => &[
                "Alright, fresh board! Which side would you like to play?",
                "Okay, let's start over. White or black?",
            ],
            ResponseCategory::RestartCancelled => &[
                "Okay, let's keep playing!",
                "No problem, the game goes on.",
            ],
            ResponseCategory::NoRestartPending => &["There's nothing to confirm right now."],
            ResponseCategory::UndoSuccess => &[
                "Okay, I took back the last move.",
                "Alright, let's rewind that move.",
            ],
            ResponseCategory::NothingToUndo => &[
                "There's no move to take back yet.",
                "We haven't made any moves I can undo.",
            ],
            ResponseCategory::AndyMove => &[
                "I'll move my {piece} at {from} to {to}",
                "Let me move my {piece} from {from} to {to}",
            ],
            ResponseCategory::AndyCheck => &["I'll move my {piece} at {from} to {to}... I got ya in check!"],
            ResponseCategory::AndyCheckmate => &["Let me move my {piece} from {from} to {to}... And... I win!"],
            ResponseCategory::AndyStuck => &[
                "Hmm, I can't settle on my move right now. Give me a moment.",
                "Sorry, I'm still thinking about my move.",
            ],
        }
    }
}

/// Chooses which variant of a category to use
pub trait PhrasePicker: Send + Sync {
    /// Index in `0..variants`; `variants` is never zero
    fn pick(&self, category: ResponseCategory, variants: usize) -> usize;
}

/// Uniformly random choice
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl PhrasePicker for RandomPicker {
    fn pick(&self, _category: ResponseCategory, variants: usize) -> usize {
        rand::rng().random_range(0..variants)
    }
}

/// Always the first variant
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstPicker;

impl PhrasePicker for FirstPicker {
    fn pick(&self, _category: ResponseCategory, _variants: usize) -> usize {
        0
    }
}

/// Values substituted into a template
#[derive(Debug, Default, Clone)]
pub struct Slots {
    pub from: Option<String>,
    pub to: Option<String>,
    pub piece: Option<String>,
    pub side: Option<String>,
}

impl Slots {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn for_move(mv: &ChessMove) -> Self {
        Self::squares(Some(mv.from), Some(mv.to))
    }

    pub fn squares(from: Option<Square>, to: Option<Square>) -> Self {
        Self {
            from: from.map(|s| s.to_string()),
            to: to.map(|s| s.to_string()),
            ..Self::default()
        }
    }

    pub fn with_piece(mut self, kind: PieceKind) -> Self {
        self.piece = Some(kind.name().to_string());
        self
    }

    pub fn side(color: Color) -> Self {
        Self {
            side: Some(color.name().to_string()),
            ..Self::default()
        }
    }
}

pub fn render(template: &str, slots: &Slots) -> String {
    let value = |slot: &Option<String>| slot.clone().unwrap_or_default();
    template
        .replace("{from}", &value(&slots.from))
        .replace("{to}", &value(&slots.to))
        .replace("{piece}", &value(&slots.piece))
        .replace("{side}", &value(&slots.side))
}

/// Phrase book bound to a picker
#[derive(Clone)]
pub struct Phrasebook {
    picker: Arc<dyn PhrasePicker>,
}

impl Phrasebook {
    pub fn new(picker: Arc<dyn PhrasePicker>) -> Self {
        Self { picker }
    }

    pub fn random() -> Self {
        Self::new(Arc::new(RandomPicker))
    }

    pub fn first() -> Self {
        Self::new(Arc::new(FirstPicker))
    }

    pub fn phrase(&self, category: ResponseCategory, slots: &Slots) -> String {
        let templates = category.templates();
        let index = self.picker.pick(category, templates.len()).min(templates.len() - 1);
        render(templates[index], slots)
    }

    pub fn say(&self, category: ResponseCategory) -> String {
        self.phrase(category, &Slots::none())
    }
}

impl std::fmt::Debug for Phrasebook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Phrasebook").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_a_template() {
        let mut categories = vec![
            ResponseCategory::Hello,
            ResponseCategory::Fallback,
            ResponseCategory::MoveSuccess,
            ResponseCategory::AmbiguousMove,
            ResponseCategory::AndyStuck,
        ];
        categories.extend(PieceKind::ALL.map(ResponseCategory::HowPieceMoves));
        for category in categories {
            assert!(!category.templates().is_empty(), "{:?}", category);
        }
    }

    #[test]
    fn test_render_fills_slots() {
        let slots = Slots::squares("e2".parse().ok(), "e4".parse().ok());
        assert_eq!(
            render("Okay, moving {from} to {to}.", &slots),
            "Okay, moving e2 to e4."
        );
    }

    #[test]
    fn test_first_picker_is_deterministic() {
        let book = Phrasebook::first();
        assert_eq!(book.say(ResponseCategory::Hello), "Hi! How are you?");
        assert_eq!(
            book.phrase(ResponseCategory::SideChosen, &Slots::side(Color::Black)),
            "Great, you'll play black side then!"
        );
    }

    #[test]
    fn test_random_picker_stays_in_range() {
        let book = Phrasebook::random();
        let options = ResponseCategory::Fallback.templates();
        for _ in 0..50 {
            assert!(options.contains(&book.say(ResponseCategory::Fallback).as_str()));
        }
    }
}
