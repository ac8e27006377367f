use super::action::Heading;
use serde::{Deserialize, Serialize};

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position one cell in a heading
    pub fn moved_in(&self, heading: Heading) -> Self {
        let (dx, dy) = heading.delta();
        self.moved_by(dx, dy)
    }

    /// Euclidean distance to another position
    pub fn distance_to(&self, other: Position) -> f32 {
        let dx = (other.x - self.x) as f32;
        let dy = (other.y - self.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// What currently sits on a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Occupant {
    #[default]
    Empty,
    Food,
    Snake,
    Wall,
}

impl Occupant {
    /// Anything except empty space or food blocks movement
    pub fn is_blocking(self) -> bool {
        !matches!(self, Occupant::Empty | Occupant::Food)
    }
}

/// One cell of the grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridNode {
    pub position: Position,
    pub occupant: Occupant,
    /// Number of ticks the agent's head has landed on this cell
    pub stuck_count: u32,
}

/// Rectangular grid of cells, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    nodes: Vec<GridNode>,
}

impl Grid {
    /// Create an all-empty grid
    pub fn new(width: usize, height: usize) -> Self {
        let mut nodes = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                nodes.push(GridNode {
                    position: Position::new(x as i32, y as i32),
                    occupant: Occupant::Empty,
                    stuck_count: 0,
                });
            }
        }

        Self {
            width,
            height,
            nodes,
        }
    }

    /// Create a grid whose outermost ring is wall
    pub fn with_border_walls(width: usize, height: usize) -> Self {
        let mut grid = Self::new(width, height);
        for node in &mut grid.nodes {
            let Position { x, y } = node.position;
            if x == 0 || y == 0 || x == width as i32 - 1 || y == height as i32 - 1 {
                node.occupant = Occupant::Wall;
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Check if a position is within the grid bounds
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width as i32 && pos.y >= 0 && pos.y < self.height as i32
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.y as usize * self.width + pos.x as usize)
    }

    pub fn node(&self, pos: Position) -> Option<&GridNode> {
        self.index(pos).map(|i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, pos: Position) -> Option<&mut GridNode> {
        self.index(pos).map(move |i| &mut self.nodes[i])
    }

    /// Occupant at a position, `None` when off-grid
    pub fn occupant(&self, pos: Position) -> Option<Occupant> {
        self.node(pos).map(|node| node.occupant)
    }

    /// Set the occupant of a cell; off-grid writes are ignored
    pub fn set_occupant(&mut self, pos: Position, occupant: Occupant) {
        if let Some(node) = self.node_mut(pos) {
            node.occupant = occupant;
        }
    }

    pub fn increment_stuck(&mut self, pos: Position) {
        if let Some(node) = self.node_mut(pos) {
            node.stuck_count += 1;
        }
    }

    pub fn reset_stuck(&mut self, pos: Position) {
        if let Some(node) = self.node_mut(pos) {
            node.stuck_count = 0;
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GridNode> {
        self.nodes.iter()
    }

    /// Positions of every cell holding `occupant`, row-major
    pub fn positions_of(&self, occupant: Occupant) -> impl Iterator<Item = Position> + '_ {
        self.nodes
            .iter()
            .filter(move |node| node.occupant == occupant)
            .map(|node| node.position)
    }

    /// Food cell closest to `from`; ties resolve to the first in row-major order
    pub fn nearest_food(&self, from: Position) -> Option<Position> {
        self.positions_of(Occupant::Food)
            .map(|pos| (pos, from.distance_to(pos)))
            .fold(None, |best: Option<(Position, f32)>, (pos, dist)| match best {
                Some((_, best_dist)) if best_dist <= dist => best,
                _ => Some((pos, dist)),
            })
            .map(|(pos, _)| pos)
    }
}

/// What the sensor needs to know about the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentState {
    pub position: Position,
    pub heading: Heading,
}

impl AgentState {
    pub fn new(position: Position, heading: Heading) -> Self {
        Self { position, heading }
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Current heading
    pub heading: Heading,
}

impl Snake {
    /// Create a new snake with given starting position and heading
    pub fn new(head: Position, heading: Heading, length: usize) -> Self {
        let mut body = vec![head];

        // Add initial body segments behind the head
        let (dx, dy) = heading.delta();
        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev.moved_by(-dx, -dy));
        }

        Self { body, heading }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn agent_state(&self) -> AgentState {
        AgentState::new(self.head(), self.heading)
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub grid: Grid,
    pub snake: Snake,
    pub score: u32,
    pub ticks: u32,
    pub is_alive: bool,
}

impl GameState {
    /// Create a new game state, stamping the snake onto the grid
    pub fn new(mut grid: Grid, snake: Snake) -> Self {
        for &segment in &snake.body {
            grid.set_occupant(segment, Occupant::Snake);
        }

        Self {
            grid,
            snake,
            score: 0,
            ticks: 0,
            is_alive: true,
        }
    }

    pub fn agent(&self) -> AgentState {
        self.snake.agent_state()
    }
}
