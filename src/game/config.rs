use serde::{Deserialize, Serialize};

/// Configuration for the headless game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Surround the grid with a ring of wall cells
    pub border_walls: bool,
    /// Initial length of the snake
    pub initial_snake_length: usize,
    /// Visits to one cell after which the agent counts as stuck
    pub stuck_threshold: u32,
    /// Episode is cut off after this many ticks
    pub max_ticks: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            border_walls: true,
            initial_snake_length: 1,
            stuck_threshold: 5,
            max_ticks: 500,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    pub fn validate(&self) -> Result<(), String> {
        // Border walls eat one cell on each side; the snake needs room inside
        let min_side = if self.border_walls { 3 } else { 1 };
        if self.grid_width < min_side || self.grid_height < min_side {
            return Err(format!(
                "grid must be at least {}x{}, got {}x{}",
                min_side, min_side, self.grid_width, self.grid_height
            ));
        }

        if self.initial_snake_length == 0 {
            return Err("initial_snake_length must be at least 1".to_string());
        }

        if self.max_ticks == 0 {
            return Err("max_ticks must be at least 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_width, 20);
        assert_eq!(config.grid_height, 20);
        assert_eq!(config.initial_snake_length, 1);
        assert_eq!(config.stuck_threshold, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15, 12);
        assert_eq!(config.grid_width, 15);
        assert_eq!(config.grid_height, 12);
        assert!(config.border_walls);
    }

    #[test]
    fn test_validation_rejects_tiny_walled_grid() {
        let config = GameConfig::new(2, 10);
        assert!(config.validate().is_err());

        let config = GameConfig {
            border_walls: false,
            ..GameConfig::new(2, 2)
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"grid_width": 12}"#).unwrap();
        assert_eq!(config.grid_width, 12);
        assert_eq!(config.grid_height, 20);
    }
}
