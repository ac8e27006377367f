//! End-to-end: sense, log, retrain and play again

use anton_snake::anton::{
    default_device, load_model, save_model, train_from_log, DecisionModel, FeatureSchema,
    FeatureVector, FeedbackLogger, InferenceBackend, Label, ModelConfig, Pilot, SpatialSensor,
    TrainerConfig, TrainingBackend,
};
use anton_snake::game::{AgentState, GameConfig, Grid, Heading, Occupant, Position, RelativeDirection};
use anton_snake::modes::{PlayConfig, PlayMode};
use burn::module::AutodiffModule;
use rand::{rngs::StdRng, SeedableRng};
use tempfile::TempDir;

fn trainer_config(epochs: usize) -> TrainerConfig {
    TrainerConfig {
        epochs,
        batch_size: 8,
        learning_rate: 2e-2,
        seed: Some(3),
        ..Default::default()
    }
}

#[test]
fn food_ahead_feedback_raises_front_preference() {
    let schema = FeatureSchema::ObstaclesWithFood;
    let mut grid = Grid::with_border_walls(10, 10);
    grid.set_occupant(Position::new(5, 8), Occupant::Food);
    let agent = AgentState::new(Position::new(5, 5), Heading::Up);

    let sensor = SpatialSensor::new(5, true);
    let reading = sensor.sense(&agent, &grid);
    assert!(!reading.left_blocked && !reading.front_blocked && !reading.right_blocked);
    assert!(reading.food_angle.unwrap().abs() < 1e-6);

    let front = FeatureVector::encode(schema, &reading, RelativeDirection::Front);
    assert!(front.values().iter().all(|v| v.abs() < 1e-6));

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("feedback.csv");
    let mut logger = FeedbackLogger::new(&log_path, schema);
    for _ in 0..24 {
        assert!(logger.record(&front, Label::Accept));
    }

    let model_config = ModelConfig::new(schema);
    let device = default_device();
    let initial = model_config.network().init::<TrainingBackend>(&device);
    let before = DecisionModel::new(initial.clone().valid(), model_config.clone(), device)
        .predict(&front)
        .unwrap();

    let (model, report) =
        train_from_log(&log_path, &model_config, &trainer_config(20), Some(initial)).unwrap();

    assert_eq!(report.examples, 24);
    assert_eq!(report.skipped_rows, 0);
    let after = model.predict(&front).unwrap();
    assert!(after > before, "front score {} -> {}", before, after);
}

#[test]
fn play_train_play_cycle() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("feedback.csv");
    let weights_path = dir.path().join("models").join("anton");

    let mut play = PlayConfig::new(3);
    play.log_path = Some(log_path.clone());
    play.weights_path = Some(weights_path.clone());
    play.seed = Some(21);
    play.game_config = GameConfig::small();
    play.game_config.max_ticks = 40;

    // First session has no model yet and plays with random weights
    let first_ticks = {
        let mut mode = PlayMode::from_config(play.clone()).unwrap();
        mode.run().unwrap().total_ticks()
    };
    assert!(first_ticks > 0);

    let model_config = ModelConfig::default();
    let (model, report) =
        train_from_log(&log_path, &model_config, &trainer_config(5), None).unwrap();
    assert_eq!(report.examples, first_ticks);
    save_model(&model, Some(&report), &weights_path).unwrap();

    // Second session loads the trained model and keeps appending
    let second_ticks = {
        let mut mode = PlayMode::from_config(play).unwrap();
        mode.run().unwrap().total_ticks()
    };

    let (_, report) = train_from_log(&log_path, &model_config, &trainer_config(1), None).unwrap();
    assert_eq!(report.examples, first_ticks + second_ticks);
}

#[test]
fn stuck_agent_escapes_and_counter_resets() {
    let model_config = ModelConfig::default();
    let device = default_device();
    let model = DecisionModel::<InferenceBackend>::random(model_config, device).unwrap();

    let mut grid = Grid::with_border_walls(10, 10);
    let agent = AgentState::new(Position::new(4, 4), Heading::Right);
    for _ in 0..6 {
        grid.increment_stuck(agent.position);
    }

    let decide = |seed: u64, mut grid: Grid| {
        let mut pilot = Pilot::new(
            SpatialSensor::new(5, true),
            model.clone(),
            StdRng::seed_from_u64(seed),
        );
        let (_, decision) = pilot.tick(&agent, &mut grid).unwrap();
        (decision, grid.node(agent.position).unwrap().stuck_count)
    };

    let (first, count) = decide(8, grid.clone());
    let (second, _) = decide(8, grid);

    assert!(first.is_override());
    assert_eq!(count, 0);
    assert_eq!(first, second);
}

#[test]
fn saved_model_survives_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("anton");
    let config = ModelConfig::new(FeatureSchema::Obstacles);
    let device = default_device();

    let model = DecisionModel::<InferenceBackend>::random(config.clone(), device).unwrap();
    save_model(&model, None, &path).unwrap();
    let (loaded, _) = load_model::<InferenceBackend>(&path, &config, &default_device()).unwrap();

    let grid = Grid::with_border_walls(6, 6);
    let agent = AgentState::new(Position::new(1, 1), Heading::Down);
    let reading = SpatialSensor::new(5, false).sense(&agent, &grid);
    let rows: Vec<FeatureVector> = RelativeDirection::ALL
        .iter()
        .map(|&dir| FeatureVector::encode(config.schema, &reading, dir))
        .collect();

    assert_eq!(model.rank(&rows).unwrap(), loaded.rank(&rows).unwrap());
}
