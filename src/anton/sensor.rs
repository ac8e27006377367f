//! Local spatial sensing around the snake's head
//!
//! The sensor looks at the three cells reachable in one move (left, front and
//! right of the current heading) and reports which are blocked. Off-grid cells
//! count as blocked. It can also report the bearing to the nearest food and
//! whether the agent keeps landing on the same cell.

use std::f32::consts::{PI, TAU};

use crate::game::{AgentState, Grid, Position, RelativeDirection};

/// What the agent perceives on one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub left_blocked: bool,
    pub front_blocked: bool,
    pub right_blocked: bool,
    /// Signed bearing to the nearest food relative to the heading, in [-π, π)
    pub food_angle: Option<f32>,
    /// The agent's cell has been visited more than the stuck threshold
    pub stuck: bool,
}

impl SensorReading {
    pub fn is_blocked(&self, direction: RelativeDirection) -> bool {
        match direction {
            RelativeDirection::Left => self.left_blocked,
            RelativeDirection::Front => self.front_blocked,
            RelativeDirection::Right => self.right_blocked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialSensor {
    stuck_threshold: u32,
    sense_food: bool,
}

impl SpatialSensor {
    pub fn new(stuck_threshold: u32, sense_food: bool) -> Self {
        Self {
            stuck_threshold,
            sense_food,
        }
    }

    pub fn stuck_threshold(&self) -> u32 {
        self.stuck_threshold
    }

    /// Read the grid around the agent
    pub fn sense(&self, agent: &AgentState, grid: &Grid) -> SensorReading {
        SensorReading {
            left_blocked: is_blocked(grid, neighbour(agent, RelativeDirection::Left)),
            front_blocked: is_blocked(grid, neighbour(agent, RelativeDirection::Front)),
            right_blocked: is_blocked(grid, neighbour(agent, RelativeDirection::Right)),
            food_angle: if self.sense_food {
                food_angle(agent, grid)
            } else {
                None
            },
            stuck: self.is_stuck(agent, grid),
        }
    }

    /// True once the agent's cell has been landed on more than the threshold
    ///
    /// An agent that is off the grid is reported stuck.
    pub fn is_stuck(&self, agent: &AgentState, grid: &Grid) -> bool {
        grid.node(agent.position)
            .map_or(true, |node| node.stuck_count > self.stuck_threshold)
    }
}

/// Cell reached by one relative move
pub fn neighbour(agent: &AgentState, direction: RelativeDirection) -> Position {
    agent.position.moved_in(agent.heading.turn(direction))
}

/// Anything but empty space or food blocks; off-grid always blocks
pub fn is_blocked(grid: &Grid, pos: Position) -> bool {
    grid.occupant(pos).map_or(true, |occupant| occupant.is_blocking())
}

/// Bearing from the agent to the nearest food, relative to its heading
///
/// Positive angles are counter-clockwise (toward the agent's left). Standing
/// on the food yields 0. `None` when there is no food on the grid.
pub fn food_angle(agent: &AgentState, grid: &Grid) -> Option<f32> {
    let food = grid.nearest_food(agent.position)?;
    let dx = (food.x - agent.position.x) as f32;
    let dy = (food.y - agent.position.y) as f32;
    if dx == 0.0 && dy == 0.0 {
        return Some(0.0);
    }

    Some(wrap_angle(dy.atan2(dx) - agent.heading.angle()))
}

/// Euclidean distance from the agent to the nearest food
pub fn distance_to_food(agent: &AgentState, grid: &Grid) -> Option<f32> {
    grid.nearest_food(agent.position)
        .map(|food| agent.position.distance_to(food))
}

/// Fold an angle into [-π, π)
pub fn wrap_angle(radians: f32) -> f32 {
    let wrapped = (radians + PI).rem_euclid(TAU) - PI;
    // rem_euclid can land exactly on TAU through rounding
    if wrapped >= PI {
        wrapped - TAU
    } else {
        wrapped
    }
}
