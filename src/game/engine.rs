use super::{
    action::{Heading, RelativeDirection},
    config::GameConfig,
    state::{GameState, Grid, Occupant, Position, Snake},
};
use rand::{seq::SliceRandom, Rng};

/// Observed consequence of a single move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    /// The agent is still alive after the move
    pub survived: bool,
    /// The agent ate food this tick
    pub ate_food: bool,
    /// Distance to the nearest food before the move
    pub distance_before: Option<f32>,
    /// Distance to the food the agent was heading for, after the move
    pub distance_after: Option<f32>,
}

impl Outcome {
    /// True if the move strictly reduced the distance to food
    pub fn got_closer(&self) -> bool {
        match (self.distance_before, self.distance_after) {
            (Some(before), Some(after)) => after < before,
            _ => false,
        }
    }
}

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Left the grid or ran into a wall or the body
    Died,
    /// Hit the per-episode tick cap
    TickLimit,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub outcome: Outcome,
    /// Set when the episode is over
    pub termination: Option<Termination>,
}

impl StepResult {
    pub fn terminated(&self) -> bool {
        self.termination.is_some()
    }
}

/// Headless grid simulation that drives the decision pipeline
pub struct GameEngine<R: Rng> {
    config: GameConfig,
    rng: R,
}

impl<R: Rng> GameEngine<R> {
    /// Create a new game engine with the given configuration and randomness source
    pub fn new(config: GameConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reset the game to a fresh episode
    pub fn reset(&mut self) -> GameState {
        let grid = if self.config.border_walls {
            Grid::with_border_walls(self.config.grid_width, self.config.grid_height)
        } else {
            Grid::new(self.config.grid_width, self.config.grid_height)
        };

        let snake = self.spawn_snake(&grid);
        let mut state = GameState::new(grid, snake);
        self.spawn_food(&mut state.grid);
        state
    }

    /// Execute one tick: turn, move, and report what happened
    pub fn step(&mut self, state: &mut GameState, direction: RelativeDirection) -> StepResult {
        let head = state.snake.head();
        let target = state.grid.nearest_food(head);
        let distance_before = target.map(|food| head.distance_to(food));

        if !state.is_alive {
            return StepResult {
                outcome: Outcome {
                    survived: false,
                    ate_food: false,
                    distance_before,
                    distance_after: None,
                },
                termination: Some(Termination::Died),
            };
        }

        state.snake.heading = state.snake.heading.turn(direction);
        let new_head = head.moved_in(state.snake.heading);
        state.ticks += 1;

        if self.collides(state, new_head) {
            state.is_alive = false;
            return StepResult {
                outcome: Outcome {
                    survived: false,
                    ate_food: false,
                    distance_before,
                    distance_after: None,
                },
                termination: Some(Termination::Died),
            };
        }

        let ate_food = state.grid.occupant(new_head) == Some(Occupant::Food);

        state.snake.body.insert(0, new_head);
        if !ate_food {
            if let Some(tail) = state.snake.body.pop() {
                state.grid.set_occupant(tail, Occupant::Empty);
            }
        }
        state.grid.set_occupant(new_head, Occupant::Snake);
        state.grid.increment_stuck(new_head);

        if ate_food {
            state.score += 1;
            self.spawn_food(&mut state.grid);
        }

        let distance_after = if ate_food {
            Some(0.0)
        } else {
            target.map(|food| new_head.distance_to(food))
        };

        let termination = (state.ticks >= self.config.max_ticks).then_some(Termination::TickLimit);

        StepResult {
            outcome: Outcome {
                survived: true,
                ate_food,
                distance_before,
                distance_after,
            },
            termination,
        }
    }

    /// Check if moving the head to `pos` kills the snake
    fn collides(&self, state: &GameState, pos: Position) -> bool {
        match state.grid.occupant(pos) {
            None | Some(Occupant::Wall) => true,
            // The tail vacates its cell on this same tick
            Some(Occupant::Snake) => pos != state.snake.tail() || state.snake.len() == 1,
            Some(Occupant::Empty) | Some(Occupant::Food) => false,
        }
    }

    /// Place a snake on a random empty cell with room behind it
    fn spawn_snake(&mut self, grid: &Grid) -> Snake {
        let length = self.config.initial_snake_length;
        let mut candidates: Vec<(Position, Heading)> = grid
            .positions_of(Occupant::Empty)
            .flat_map(|pos| Heading::ALL.into_iter().map(move |heading| (pos, heading)))
            .filter(|&(pos, heading)| {
                let (dx, dy) = heading.delta();
                (0..length as i32).all(|i| {
                    grid.occupant(pos.moved_by(-dx * i, -dy * i)) == Some(Occupant::Empty)
                })
            })
            .collect();
        candidates.shuffle(&mut self.rng);

        let (head, heading) = candidates.first().copied().unwrap_or_else(|| {
            let center = Position::new(
                (self.config.grid_width / 2) as i32,
                (self.config.grid_height / 2) as i32,
            );
            (center, Heading::Up)
        });

        Snake::new(head, heading, length)
    }

    /// Put food on a random empty cell; does nothing on a full grid
    fn spawn_food(&mut self, grid: &mut Grid) {
        let empty: Vec<Position> = grid.positions_of(Occupant::Empty).collect();
        if let Some(&pos) = empty.choose(&mut self.rng) {
            grid.set_occupant(pos, Occupant::Food);
        }
    }
}
