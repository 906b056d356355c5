use std::{env, error::Error, fs};

use gridmdp::grid::{Grid, Rewards};
use gridmdp::report::{render, CsvRecorder};
use gridmdp::solver::{Snapshot, SolveConfig, Solution, Solver};

/// 6×6 map solved when no file is given
const DEFAULT_MAP: &str = "\
G W G - - G
- B - G W B
- - B - G -
- - - B - G
- W W W B -
- - - - - -
";

fn main() -> Result<(), Box<dyn Error>> {
    let source = match env::args().nth(1) {
        Some(path) => fs::read_to_string(path)?,
        None => DEFAULT_MAP.to_string(),
    };

    let grid = Grid::parse(&source, Rewards::default())?;
    let solver = Solver::new(&grid, SolveConfig::default())?;

    fs::create_dir_all("out")?;

    let mut recorder = CsvRecorder::new(&grid);
    let solution = solver.value_iteration(&mut recorder)?;
    println!("value iteration converged in {} sweeps", solution.sweeps());
    print_solution(&grid, &solution);
    recorder.write_to_path("out/value_iteration.csv")?;

    let mut recorder = CsvRecorder::new(&grid);
    let solution = solver.policy_iteration(&mut recorder)?;
    println!("policy iteration converged in {} passes", solution.sweeps());
    print_solution(&grid, &solution);
    recorder.write_to_path("out/policy_iteration.csv")?;

    println!("utility traces written to out/");
    Ok(())
}

fn print_solution(grid: &Grid, solution: &Solution) {
    let snapshot = Snapshot {
        sweep: solution.sweeps(),
        utilities: solution.utilities(),
        policy: solution.policy(),
    };
    print!("{}", render(grid, &snapshot));
}
