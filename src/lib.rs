//! Generate perfect mazes with a randomized depth-first carver
//!
//! A perfect maze is one whose passages form a spanning tree over the room
//! cells: every room is reachable from every other room through exactly one
//! path, and there are no loops.
//!
//! # Examples
//! ```
//! use maze_carver::maze_builder::MazeBuilder;
//!
//! let maze = MazeBuilder::new(9, 7, Some(1))?.construct();
//! println!("{maze}");
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Walls render as `█` and open cells as spaces, so a 5×5 request yields
//! something like
//!
//! ```text
//! ███████
//! █   █ █
//! ███ █ █
//! █   █ █
//! █ ███ █
//! █     █
//! ███████
//! ```

use std::fmt;
use std::ops::{Add, Div};

use itertools::Itertools;

pub mod maze_builder;

/// Location on the grid
///
/// `x` is the column and `y` the row. During carving, coordinates are offsets
/// into the padded grid; in a finished [`Maze`] they index the trimmed grid.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Div<i32> for Point {
    type Output = Point;

    /// Component-wise integer division
    ///
    /// Only used to halve the even step vectors in [`Direction`], where the
    /// division is exact.
    fn div(self, divisor: i32) -> Point {
        Point {
            x: self.x / divisor,
            y: self.y / divisor,
        }
    }
}

/// State of a single grid cell
///
/// `Visited` only exists while the carver runs; a finished [`Maze`] contains
/// `Free` and `Wall` cells exclusively.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum CellState {
    /// Open cell: an uncarved room during construction, a passable cell after
    Free,
    /// Impassable cell
    Wall,
    /// Carved cell, or the sentinel ring around the grid under construction
    Visited,
}

/// Step vectors between adjacent room cells
///
/// Room cells sit on even coordinates, so each step covers distance 2 and
/// skips over the wall cell in between.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Coordinate delta to the next room cell in this direction
    pub fn delta(self) -> Point {
        match self {
            Direction::North => Point { x: 0, y: -2 },
            Direction::East => Point { x: 2, y: 0 },
            Direction::South => Point { x: 0, y: 2 },
            Direction::West => Point { x: -2, y: 0 },
        }
    }
}

/// Rectangular store of cell states
///
/// Plain bounds-checked storage; all carving logic lives in
/// [`maze_builder::MazeBuilder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Vec<CellState>>,
}

impl Grid {
    /// Build a `width` × `height` grid, filling each cell from `f(x, y)`
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> CellState) -> Self {
        let cells = (0..height)
            .map(|y| (0..width).map(|x| f(x, y)).collect())
            .collect();
        Grid { cells }
    }

    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    /// State of the cell at `point`
    ///
    /// Panics if `point` lies outside the grid. The carver's sentinel ring
    /// keeps every access in range, so an out-of-range coordinate is an
    /// algorithm bug, not a recoverable condition.
    pub fn get(&self, point: Point) -> CellState {
        self.check_bounds(point);
        self.cells[point.y as usize][point.x as usize]
    }

    /// Overwrite the cell at `point`
    ///
    /// Panics if `point` lies outside the grid, see [`Grid::get`].
    pub fn set(&mut self, point: Point, state: CellState) {
        self.check_bounds(point);
        self.cells[point.y as usize][point.x as usize] = state;
    }

    fn check_bounds(&self, point: Point) {
        assert!(
            point.x >= 0
                && point.y >= 0
                && (point.x as usize) < self.width()
                && (point.y as usize) < self.height(),
            "coordinate x={}, y={} outside {}×{} grid",
            point.x,
            point.y,
            self.width(),
            self.height(),
        );
    }

    pub(crate) fn into_rows(self) -> Vec<Vec<CellState>> {
        self.cells
    }
}

/// A finished maze
///
/// Produced by [`maze_builder::MazeBuilder::construct`]; immutable from then
/// on. The grid includes the one-cell wall border around the carved interior,
/// and holds only [`CellState::Free`] and [`CellState::Wall`] cells.
pub struct Maze {
    cells: Vec<Vec<CellState>>,
}

impl Maze {
    const C_FREE: char = ' ';
    const C_WALL: char = '█';

    pub(crate) fn from_cells(cells: Vec<Vec<CellState>>) -> Self {
        Maze { cells }
    }

    /// Total width, wall border included
    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    /// Total height, wall border included
    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn rows(&self) -> &[Vec<CellState>] {
        &self.cells
    }

    /// Render the maze as printable characters, row by row
    ///
    /// Open cells map to a space, walls to a solid block glyph. The match
    /// also covers the construction-time `Visited` state, rendering it as a
    /// wall; a finished maze never holds one, the arm only keeps the mapping
    /// total.
    pub fn to_char_rows(&self) -> Vec<Vec<char>> {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        CellState::Free => Self::C_FREE,
                        CellState::Wall | CellState::Visited => Self::C_WALL,
                    })
                    .collect()
            })
            .collect()
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self
            .to_char_rows()
            .iter()
            .map(|row| row.iter().join(""))
            .join("\n");
        write!(f, "{}", rows)
    }
}
