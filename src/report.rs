use std::fs::File;
use std::path::Path;

use crate::grid::{CellKind, Grid};
use crate::solver::Snapshot;

/// Consumer of per-sweep solver snapshots
///
/// The solver calls `sweep` once after every value-iteration sweep or
/// policy-iteration pass, with read-only views of the current tables. What
/// happens to them (printing, recording, nothing) is no concern of the
/// solver's.
pub trait Reporter {
    fn sweep(&mut self, grid: &Grid, snapshot: &Snapshot);
}

/// Reporter that discards every snapshot
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn sweep(&mut self, _grid: &Grid, _snapshot: &Snapshot) {}
}

/// Prints each sweep's utility and policy grid to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn sweep(&mut self, grid: &Grid, snapshot: &Snapshot) {
        println!("sweep {}", snapshot.sweep);
        print!("{}", render(grid, snapshot));
    }
}

/// Render a snapshot as one bordered text line per grid row
///
/// Non-blocked squares show their kind code, utility, and policy arrow;
/// walls are left blank.
pub fn render(grid: &Grid, snapshot: &Snapshot) -> String {
    let mut out = String::new();
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            let i = grid.offset((col, row));
            if grid.cells()[i] == CellKind::Blocked {
                out.push_str("|             ");
            } else {
                out.push_str(&format!(
                    "| {} {:>7.3} {} ",
                    grid.cells()[i].code(),
                    snapshot.utilities[i],
                    snapshot.policy[i].symbol()
                ));
            }
        }
        out.push_str("|\n");
    }
    out
}

/// Records one row of utilities per sweep for CSV export
///
/// Columns are cells (headed `"Kind: (col, row)"`), rows are sweeps. Rows
/// are buffered during the solve and written afterwards, keeping file I/O
/// out of the sweep loop.
#[derive(Debug, Clone)]
pub struct CsvRecorder {
    headers: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl CsvRecorder {
    pub fn new(grid: &Grid) -> Self {
        let mut headers = Vec::with_capacity(grid.size());
        for row in 0..grid.height() {
            for col in 0..grid.width() {
                let name = match grid.cells()[grid.offset((col, row))] {
                    CellKind::Neutral => "White",
                    CellKind::Reward => "Green",
                    CellKind::Penalty => "Brown",
                    CellKind::Blocked => "Wall",
                };
                headers.push(format!("{name}: ({col}, {row})"));
            }
        }
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Number of sweeps recorded so far
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the accumulated sweeps, one CSV record each
    pub fn write<W: std::io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(&self.headers)?;
        for row in &self.rows {
            out.write_record(row.iter().map(|u| u.to_string()))?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> csv::Result<()> {
        self.write(File::create(path).map_err(csv::Error::from)?)
    }
}

impl Reporter for CsvRecorder {
    fn sweep(&mut self, _grid: &Grid, snapshot: &Snapshot) {
        self.rows.push(snapshot.utilities.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Rewards;
    use crate::transition::Action;

    fn grid() -> Grid {
        Grid::parse("G W\n- B\n", Rewards::default()).unwrap()
    }

    fn snapshot<'a>(utilities: &'a [f64], policy: &'a [Action]) -> Snapshot<'a> {
        Snapshot {
            sweep: 1,
            utilities,
            policy,
        }
    }

    #[test]
    fn render_shows_cells_and_blanks_walls() {
        let grid = grid();
        let utilities = vec![1.0, 0.0, -0.04, -1.0];
        let policy = vec![Action::Up, Action::Up, Action::Left, Action::Down];
        let text = render(&grid, &snapshot(&utilities, &policy));

        assert_eq!(text.lines().count(), 2, "one line per grid row");
        assert!(text.contains("| G   1.000 ^ "), "got:\n{text}");
        assert!(text.contains("| - "), "neutral square rendered");
        assert!(text.contains('<'), "policy arrows rendered");
        assert!(!text.contains('W'), "walls are blank");
    }

    #[test]
    fn csv_headers_name_cells() {
        let recorder = CsvRecorder::new(&grid());
        assert_eq!(
            recorder.headers,
            vec![
                "Green: (0, 0)",
                "Wall: (1, 0)",
                "White: (0, 1)",
                "Brown: (1, 1)",
            ]
        );
    }

    #[test]
    fn csv_records_one_row_per_sweep() {
        let grid = grid();
        let mut recorder = CsvRecorder::new(&grid);
        let policy = vec![Action::Up; 4];
        recorder.sweep(&grid, &snapshot(&[1.0, 0.0, -0.04, -1.0], &policy));
        recorder.sweep(&grid, &snapshot(&[1.5, 0.0, 0.2, -0.5], &policy));
        assert_eq!(recorder.len(), 2);

        let mut buffer = Vec::new();
        recorder.write(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        // header fields contain the delimiter, so the writer quotes them
        assert_eq!(
            lines.next().unwrap(),
            "\"Green: (0, 0)\",\"Wall: (1, 0)\",\"White: (0, 1)\",\"Brown: (1, 1)\""
        );
        assert_eq!(lines.next().unwrap(), "1,0,-0.04,-1");
        assert_eq!(lines.next().unwrap(), "1.5,0,0.2,-0.5");
    }
}
