use anyhow::{anyhow, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    passable: bool,
}

impl Tile {
    pub fn is_passable(&self) -> bool {
        self.passable
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    pub height: usize,
    pub width: usize,
    pub grid: Vec<Vec<Tile>>,
}

impl Map {
    /// An obstacle-free map of the given size.
    pub fn new(height: usize, width: usize) -> Self {
        Map {
            height,
            width,
            grid: vec![vec![Tile { passable: true }; width]; height],
        }
    }

    /// Builds a map from an in-memory layout, one string per row.
    /// `.` is free, `@`, `T`, `O` and `W` are blocked.
    pub fn from_rows(rows: &[&str]) -> anyhow::Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        if height == 0 || width == 0 {
            bail!("map layout must contain at least one cell");
        }

        let mut grid = Vec::with_capacity(height);
        for (x, row) in rows.iter().enumerate() {
            let tiles_row = row
                .chars()
                .enumerate()
                .map(|(y, ch)| match ch {
                    '.' => Ok(Tile { passable: true }),
                    '@' | 'T' | 'O' | 'W' => Ok(Tile { passable: false }),
                    other => Err(anyhow!("unknown tile {other:?} at ({x}, {y})")),
                })
                .collect::<anyhow::Result<Vec<Tile>>>()?;

            if tiles_row.len() != width {
                bail!(
                    "row {x} has {} tiles, expected {width}",
                    tiles_row.len()
                );
            }
            grid.push(tiles_row);
        }

        Ok(Map {
            height,
            width,
            grid,
        })
    }

    pub fn set_obstacle(&mut self, x: usize, y: usize) {
        self.grid[x][y].passable = false;
    }

    pub fn num_cells(&self) -> usize {
        self.height * self.width
    }

    pub fn is_in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.height && y < self.width
    }

    pub fn is_passable(&self, x: usize, y: usize) -> bool {
        self.is_in_bounds(x, y) && self.grid[x][y].is_passable()
    }

    /// Passable 4-connected neighbours of `(x, y)`, followed by `(x, y)`
    /// itself for the wait action.
    pub fn get_neighbors(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let directions = [(-1, 0), (1, 0), (0, -1), (0, 1), (0, 0)]; // Up, down, left, right, stay
        let mut neighbors = Vec::with_capacity(directions.len());

        for &(dx, dy) in &directions {
            let new_x = x as i64 + dx;
            let new_y = y as i64 + dy;
            if new_x >= 0
                && new_y >= 0
                && self.is_passable(new_x as usize, new_y as usize)
            {
                neighbors.push((new_x as usize, new_y as usize));
            }
        }

        neighbors
    }
}

pub fn manhattan_distance(a: (usize, usize), b: (usize, usize)) -> usize {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}
