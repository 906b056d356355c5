use strum::{EnumIter, VariantArray};

use crate::grid::{Grid, Pos};

/// Probability that a move reaches the intended square
pub const P_INTENDED: f64 = 0.8;
/// Probability of each orthogonal deflection
pub const P_DEFLECT: f64 = 0.1;

/// The four movement actions, in tie-break order
///
/// Every argmax over actions scans in declaration order and keeps the first
/// maximum, so equal expected utilities always resolve to the earlier
/// variant.
#[derive(EnumIter, VariantArray, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Action {
    /// `(dcol, drow)` offset of the square this action aims at
    pub const fn offset(self) -> (isize, isize) {
        OFFSETS[self as usize]
    }

    /// The two actions a noisy move can deflect into, as
    /// `(left-of-heading, right-of-heading)`
    pub const fn deflections(self) -> (Action, Action) {
        DEFLECTIONS[self as usize]
    }

    /// Arrow symbol for rendering policies
    pub const fn symbol(self) -> char {
        match self {
            Self::Up => '^',
            Self::Down => 'v',
            Self::Left => '<',
            Self::Right => '>',
        }
    }
}

const OFFSETS: [(isize, isize); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

// Deflections are relative to the heading: facing down, "left" is east.
const DEFLECTIONS: [(Action, Action); 4] = [
    (Action::Left, Action::Right),
    (Action::Right, Action::Left),
    (Action::Down, Action::Up),
    (Action::Up, Action::Down),
];

/// The noisy movement model over a grid
///
/// An attempted move reaches the intended square with probability 0.8 and is
/// deflected 90° to either side with probability 0.1 each. A move that would
/// leave the grid or enter a wall leaves the agent in place; one substitution
/// rule covers both cases.
#[derive(Debug, Clone, Copy)]
pub struct TransitionModel<'a> {
    grid: &'a Grid,
}

impl<'a> TransitionModel<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// The three squares a move from `pos` can land on, as
    /// `[intended, left deflection, right deflection]`
    ///
    /// Each entry is already resolved through the stay-in-place rule, so the
    /// result never contains an out-of-bounds or blocked square.
    pub fn neighbors(&self, pos: Pos, action: Action) -> [Pos; 3] {
        let (left, right) = action.deflections();
        [
            self.resolve(pos, action.offset()),
            self.resolve(pos, left.offset()),
            self.resolve(pos, right.offset()),
        ]
    }

    /// Expected utility of taking `action` at `pos` against a fixed utility
    /// snapshot
    ///
    /// Reads only the snapshot it is given; for one `(pos, action, snapshot)`
    /// triple the result is exactly reproducible.
    pub fn expected_utility(&self, pos: Pos, action: Action, utilities: &[f64]) -> f64 {
        let [intended, left, right] = self.neighbors(pos, action);
        P_INTENDED * utilities[self.grid.offset(intended)]
            + P_DEFLECT * utilities[self.grid.offset(left)]
            + P_DEFLECT * utilities[self.grid.offset(right)]
    }

    fn resolve(&self, (col, row): Pos, (dcol, drow): (isize, isize)) -> Pos {
        let col_t = col as isize + dcol;
        let row_t = row as isize + drow;
        if col_t < 0 || row_t < 0 {
            return (col, row);
        }
        let target = (col_t as usize, row_t as usize);
        if !self.grid.contains(target) || self.grid.is_blocked(target) {
            return (col, row);
        }
        target
    }
}
