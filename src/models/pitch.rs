//! Treble-clef pitch names for staff positions
use std::fmt;

/// Note letter
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }
}

/// Diatonic pitch in scientific notation, e.g. `B4`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    /// Note letter
    pub letter: Letter,
    /// Octave number (middle C is C4)
    pub octave: u8,
}

impl Pitch {
    /// Create a pitch
    pub const fn new(letter: Letter, octave: u8) -> Self {
        Self { letter, octave }
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter.as_char(), self.octave)
    }
}

const fn p(letter: Letter, octave: u8) -> Pitch {
    Pitch::new(letter, octave)
}

/// Positions inside a treble staff, top line first, alternating line/space
pub const TREBLE_STAFF: [Pitch; 9] = [
    p(Letter::F, 5),
    p(Letter::E, 5),
    p(Letter::D, 5),
    p(Letter::C, 5),
    p(Letter::B, 4),
    p(Letter::A, 4),
    p(Letter::G, 4),
    p(Letter::F, 4),
    p(Letter::E, 4),
];

/// Ledger lines above the top line; index 0 is the top staff line itself
const ABOVE_LINES: [Pitch; 6] = [
    p(Letter::F, 5),
    p(Letter::A, 5),
    p(Letter::C, 6),
    p(Letter::E, 6),
    p(Letter::G, 6),
    p(Letter::B, 6),
];

/// Space directly above ledger line `i` (index 0 sits on the top line)
const ABOVE_SPACES: [Pitch; 6] = [
    p(Letter::G, 5),
    p(Letter::B, 5),
    p(Letter::D, 6),
    p(Letter::F, 6),
    p(Letter::A, 6),
    p(Letter::C, 7),
];

/// Ledger lines below the bottom line; index 0 is the bottom staff line itself
const BELOW_LINES: [Pitch; 6] = [
    p(Letter::E, 4),
    p(Letter::C, 4),
    p(Letter::A, 3),
    p(Letter::F, 3),
    p(Letter::D, 3),
    p(Letter::B, 2),
];

/// Space directly below ledger line `i`
const BELOW_SPACES: [Pitch; 6] = [
    p(Letter::D, 4),
    p(Letter::B, 3),
    p(Letter::G, 3),
    p(Letter::E, 3),
    p(Letter::C, 3),
    p(Letter::A, 2),
];

/// Which side of the staff a ledger lookup is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerSide {
    /// Above the top line
    Above,
    /// Below the bottom line
    Below,
}

/// Pitch of ledger step `steps` on `side`; `space` selects the space beyond
/// that ledger line instead of the line itself
pub fn ledger_pitch(side: LedgerSide, steps: i32, space: bool) -> Option<Pitch> {
    let idx = usize::try_from(steps).ok()?;
    let table = match (side, space) {
        (LedgerSide::Above, false) => &ABOVE_LINES,
        (LedgerSide::Above, true) => &ABOVE_SPACES,
        (LedgerSide::Below, false) => &BELOW_LINES,
        (LedgerSide::Below, true) => &BELOW_SPACES,
    };
    table.get(idx).copied()
}
