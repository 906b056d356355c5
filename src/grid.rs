use std::collections::HashMap;

use rand::Rng;

use crate::error::{MdpError, MdpResult};

/// Grid position as `(col, row)`, with `(0, 0)` the top-left square
pub type Pos = (usize, usize);

/// Classification of a grid square
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Neutral,
    Reward,
    Penalty,
    Blocked,
}

impl CellKind {
    /// Parse a single-character map code
    ///
    /// `'-'` neutral, `'G'` reward, `'B'` penalty, `'W'` or `'#'` blocked.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            '-' => Some(Self::Neutral),
            'G' => Some(Self::Reward),
            'B' => Some(Self::Penalty),
            'W' | '#' => Some(Self::Blocked),
            _ => None,
        }
    }

    /// The map code this kind renders as
    pub fn code(self) -> char {
        match self {
            Self::Neutral => '-',
            Self::Reward => 'G',
            Self::Penalty => 'B',
            Self::Blocked => 'W',
        }
    }
}

/// Immediate reward for each cell kind
///
/// Blocked squares are never entered and always yield 0, so the table only
/// needs entries for the kinds a grid actually uses. Totality over those
/// kinds is checked when the grid is built.
#[derive(Debug, Clone)]
pub struct Rewards {
    table: HashMap<CellKind, f64>,
}

impl Rewards {
    pub fn new(table: HashMap<CellKind, f64>) -> Self {
        Self { table }
    }

    /// Table with one value per non-blocked kind
    pub fn of(neutral: f64, reward: f64, penalty: f64) -> Self {
        Self::new(HashMap::from([
            (CellKind::Neutral, neutral),
            (CellKind::Reward, reward),
            (CellKind::Penalty, penalty),
        ]))
    }

    /// Reward for a kind, or `None` if the table has no entry for it
    pub fn get(&self, kind: CellKind) -> Option<f64> {
        if kind == CellKind::Blocked {
            return Some(0.0);
        }
        self.table.get(&kind).copied()
    }
}

impl Default for Rewards {
    /// The textbook gridworld values: -0.04 per step, ±1 at reward and
    /// penalty squares
    fn default() -> Self {
        Self::of(-0.04, 1.0, -1.0)
    }
}

/// An immutable rectangular gridworld
///
/// Built once from a cell matrix, parsed text, or the random generator, and
/// never mutated afterwards. Solvers keep their utility and policy tables
/// outside the grid, so one grid can back any number of independent solves.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<CellKind>,
    rewards: Rewards,
}

impl Grid {
    /// Build a grid from a row-major cell matrix
    ///
    /// Fails with [`MdpError::GridFormat`] if the matrix is ragged and with
    /// [`MdpError::Configuration`] if it is empty or the reward table is
    /// missing a kind the matrix uses.
    pub fn new(rows: Vec<Vec<CellKind>>, rewards: Rewards) -> MdpResult<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        if width == 0 || height == 0 {
            return Err(MdpError::Configuration(
                "grid must have at least one cell".into(),
            ));
        }

        let mut cells = Vec::with_capacity(width * height);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(MdpError::GridFormat(format!(
                    "row {r} has {} cells, expected {width}",
                    row.len()
                )));
            }
            cells.extend_from_slice(row);
        }

        for &kind in &cells {
            if rewards.get(kind).is_none() {
                return Err(MdpError::Configuration(format!(
                    "no reward value for cell kind '{}'",
                    kind.code()
                )));
            }
        }

        Ok(Self {
            width,
            height,
            cells,
            rewards,
        })
    }

    /// Parse a grid from text, one character per cell and one line per row
    ///
    /// Whitespace inside a line is stripped and blank lines are skipped, so
    /// both `G-W` and `G - W` describe the same row.
    pub fn parse(text: &str, rewards: Rewards) -> MdpResult<Self> {
        let mut rows = Vec::new();
        for (n, line) in text.lines().enumerate() {
            let codes: String = line.chars().filter(|c| !c.is_whitespace()).collect();
            if codes.is_empty() {
                continue;
            }
            let row = codes
                .chars()
                .map(|code| {
                    CellKind::from_code(code).ok_or_else(|| {
                        MdpError::GridFormat(format!(
                            "unknown cell code '{code}' on line {}",
                            n + 1
                        ))
                    })
                })
                .collect::<MdpResult<Vec<_>>>()?;
            rows.push(row);
        }
        Self::new(rows, rewards)
    }

    /// Generate a random map
    ///
    /// Roughly half the squares stay neutral; the rest split evenly between
    /// blocked, penalty, and reward. All randomness in the crate lives here:
    /// solving a generated grid is as deterministic as solving any other.
    pub fn random<R: Rng>(
        width: usize,
        height: usize,
        rewards: Rewards,
        rng: &mut R,
    ) -> MdpResult<Self> {
        let mut rows = Vec::with_capacity(height);
        for _ in 0..height {
            let mut row = Vec::with_capacity(width);
            for _ in 0..width {
                let x: f64 = rng.gen();
                row.push(if x < 0.5 / 3.0 {
                    CellKind::Blocked
                } else if x < 1.0 / 3.0 {
                    CellKind::Penalty
                } else if x < 0.5 {
                    CellKind::Reward
                } else {
                    CellKind::Neutral
                });
            }
            rows.push(row);
        }
        Self::new(rows, rewards)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of squares, blocked included
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Row-major view of every square
    pub fn cells(&self) -> &[CellKind] {
        &self.cells
    }

    pub fn contains(&self, (col, row): Pos) -> bool {
        col < self.width && row < self.height
    }

    /// Kind of the square at `pos`
    pub fn kind(&self, pos: Pos) -> MdpResult<CellKind> {
        if !self.contains(pos) {
            return Err(MdpError::OutOfBounds(pos.0, pos.1));
        }
        Ok(self.cells[self.offset(pos)])
    }

    /// Immediate reward collected at `pos`
    pub fn reward(&self, pos: Pos) -> MdpResult<f64> {
        let kind = self.kind(pos)?;
        // totality over used kinds was checked at construction
        Ok(self.rewards.get(kind).unwrap_or(0.0))
    }

    /// Whether `pos` is a wall square
    ///
    /// Out-of-bounds positions are not walls; use [`Grid::contains`] for
    /// bounds.
    pub fn is_blocked(&self, pos: Pos) -> bool {
        self.contains(pos) && self.cells[self.offset(pos)] == CellKind::Blocked
    }

    /// Row-major index of `pos` into dense per-square tables
    pub fn offset(&self, (col, row): Pos) -> usize {
        row * self.width + col
    }

    /// All non-blocked positions in row-major order
    pub fn states(&self) -> impl Iterator<Item = Pos> + '_ {
        let width = self.width;
        (0..self.height)
            .flat_map(move |row| (0..width).map(move |col| (col, row)))
            .filter(move |&pos| !self.is_blocked(pos))
    }
}
