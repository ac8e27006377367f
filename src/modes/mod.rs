pub mod play;
pub mod run;
pub mod train;

pub use play::{EpisodeSummary, PlayConfig, PlayMode};
pub use run::RunMode;
pub use train::{TrainConfig, TrainMode};
