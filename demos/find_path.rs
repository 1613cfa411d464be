use grid_astar::{path_cost, AstarEngine, GridMap, SearchError};
use std::{env, fs, process};

// Finds a path on a text map and prints it on top of the map. The map is read from the file given
// as first argument, or defaults to the one below, where
// - # marks a wall
// - S marks the start
// - E marks the end
//
// Set RUST_LOG=info to see what the search is doing.
const DEFAULT_MAP: &str = "\
S...#.....
.##.#.###.
..#...#...
..#####.#.
........#.
.######.#.
.#....#.#.
.#.##.#...
...#..###.
...#.....E
";

fn main() {
    env_logger::init();
    let text = match env::args().nth(1) {
        Some(file) => fs::read_to_string(&file).unwrap_or_else(|e| {
            eprintln!("Could not read {file}: {e}");
            process::exit(2);
        }),
        None => DEFAULT_MAP.to_owned(),
    };
    let map: GridMap = match text.parse() {
        Ok(map) => map,
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    };
    println!("{}", map);
    match AstarEngine::new(&map).search() {
        Ok(route) => {
            println!("{}", map.display_with_path(&route.path));
            println!(
                "Path of {} cells, cost {:.3} ({:.3} summed), {} cells expanded:",
                route.path.len(),
                route.cost,
                path_cost(&route.path),
                route.expanded
            );
            for p in route.path {
                println!("{:?}", p);
            }
        }
        Err(e @ SearchError::PathNotFound { .. }) => {
            println!("{e}");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    }
}
