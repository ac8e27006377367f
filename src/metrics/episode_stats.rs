//! Rolling statistics over played episodes
//!
//! Tracks how long episodes last, how much they score, how often the stuck
//! escape fired and how they ended, over a fixed window of recent episodes.

use std::collections::VecDeque;

use crate::game::Termination;

/// Episode statistics tracker with rolling averages
///
/// # Example
///
/// ```rust
/// use anton_snake::game::Termination;
/// use anton_snake::metrics::EpisodeStats;
///
/// let mut stats = EpisodeStats::new(100);
/// stats.record_episode(120, 4, 2, Termination::Died);
///
/// assert_eq!(stats.total_episodes(), 1);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct EpisodeStats {
    /// Ticks survived per episode (rolling window)
    episode_ticks: VecDeque<usize>,

    /// Food eaten per episode (rolling window)
    episode_scores: VecDeque<u32>,

    /// Random stuck escapes per episode (rolling window)
    episode_overrides: VecDeque<usize>,

    /// Total number of episodes completed
    total_episodes: usize,

    /// Total ticks across all episodes
    total_ticks: usize,

    /// Episodes that ended in a collision
    deaths: usize,

    /// Episodes cut off by the tick cap
    timeouts: usize,

    /// Feedback rows that could not be written
    dropped_rows: usize,

    best_score: u32,

    /// Window size for rolling averages
    window_size: usize,
}

impl EpisodeStats {
    /// Create a tracker keeping the last `window_size` episodes
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            episode_ticks: VecDeque::with_capacity(window_size),
            episode_scores: VecDeque::with_capacity(window_size),
            episode_overrides: VecDeque::with_capacity(window_size),
            total_episodes: 0,
            total_ticks: 0,
            deaths: 0,
            timeouts: 0,
            dropped_rows: 0,
            best_score: 0,
            window_size,
        }
    }

    /// Record the end of an episode
    pub fn record_episode(
        &mut self,
        ticks: usize,
        score: u32,
        overrides: usize,
        termination: Termination,
    ) {
        Self::push_deque(&mut self.episode_ticks, ticks, self.window_size);
        Self::push_deque(&mut self.episode_scores, score, self.window_size);
        Self::push_deque(&mut self.episode_overrides, overrides, self.window_size);
        self.total_episodes += 1;
        self.total_ticks += ticks;
        self.best_score = self.best_score.max(score);
        match termination {
            Termination::Died => self.deaths += 1,
            Termination::TickLimit => self.timeouts += 1,
        }
    }

    pub fn record_dropped_rows(&mut self, rows: usize) {
        self.dropped_rows += rows;
    }

    pub fn mean_ticks(&self) -> f32 {
        Self::mean(self.episode_ticks.iter().map(|&t| t as f32))
    }

    pub fn mean_score(&self) -> f32 {
        Self::mean(self.episode_scores.iter().map(|&s| s as f32))
    }

    pub fn mean_overrides(&self) -> f32 {
        Self::mean(self.episode_overrides.iter().map(|&o| o as f32))
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_ticks(&self) -> usize {
        self.total_ticks
    }

    pub fn deaths(&self) -> usize {
        self.deaths
    }

    pub fn timeouts(&self) -> usize {
        self.timeouts
    }

    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// One-line summary of the current statistics
    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Ticks: {} | Score: {:.2} (best {}) | Len: {:.1} | Overrides: {:.2} | Deaths: {} | Timeouts: {}",
            self.total_episodes,
            self.total_ticks,
            self.mean_score(),
            self.best_score,
            self.mean_ticks(),
            self.mean_overrides(),
            self.deaths,
            self.timeouts,
        )
    }

    fn mean(values: impl ExactSizeIterator<Item = f32>) -> f32 {
        let len = values.len();
        if len == 0 {
            0.0
        } else {
            values.sum::<f32>() / len as f32
        }
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let stats = EpisodeStats::new(100);
        assert_eq!(stats.window_size(), 100);
        assert_eq!(stats.total_episodes(), 0);
        assert_eq!(stats.total_ticks(), 0);
        assert_eq!(EpisodeStats::new(0).window_size(), 1);
    }

    #[test]
    fn test_record_episode() {
        let mut stats = EpisodeStats::new(100);
        stats.record_episode(50, 3, 1, Termination::Died);

        assert_eq!(stats.total_episodes(), 1);
        assert_eq!(stats.total_ticks(), 50);
        assert_eq!(stats.deaths(), 1);
        assert_eq!(stats.timeouts(), 0);
        assert!((stats.mean_ticks() - 50.0).abs() < 1e-5);
        assert!((stats.mean_score() - 3.0).abs() < 1e-5);
        assert!((stats.mean_overrides() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rolling_average() {
        let mut stats = EpisodeStats::new(3);

        stats.record_episode(10, 1, 0, Termination::Died);
        stats.record_episode(20, 2, 0, Termination::Died);
        stats.record_episode(30, 3, 0, Termination::TickLimit);
        assert!((stats.mean_score() - 2.0).abs() < 1e-5);

        // A 4th episode evicts the first
        stats.record_episode(40, 4, 0, Termination::Died);

        assert_eq!(stats.total_episodes(), 4);
        assert_eq!(stats.total_ticks(), 100);
        assert!((stats.mean_score() - 3.0).abs() < 1e-5);
        assert_eq!(stats.best_score(), 4);
        assert_eq!(stats.deaths(), 3);
        assert_eq!(stats.timeouts(), 1);
    }

    #[test]
    fn test_format_summary() {
        let mut stats = EpisodeStats::new(100);
        stats.record_episode(150, 5, 2, Termination::TickLimit);

        let summary = stats.format_summary();
        assert!(summary.contains("Episodes: 1"));
        assert!(summary.contains("Ticks: 150"));
        assert!(summary.contains("Score: 5.00 (best 5)"));
        assert!(summary.contains("Len: 150.0"));
        assert!(summary.contains("Overrides: 2.00"));
        assert!(summary.contains("Timeouts: 1"));
    }

    #[test]
    fn test_empty_stats() {
        let stats = EpisodeStats::new(100);
        assert_eq!(stats.mean_ticks(), 0.0);
        assert_eq!(stats.mean_score(), 0.0);
        assert_eq!(stats.mean_overrides(), 0.0);
    }

    #[test]
    fn test_dropped_rows_accumulate() {
        let mut stats = EpisodeStats::new(10);
        stats.record_dropped_rows(2);
        stats.record_dropped_rows(3);
        assert_eq!(stats.dropped_rows(), 5);
    }
}
