/*
 * Project::Outbreak, epidemic case forecasting with LSTM
 * Copyright (C) 2025 Athaariq A. Ramadhani <foss@athaariq.my.id>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use burn::{
	backend::{Autodiff, NdArray},
	config::Config,
	tensor::{backend::Backend, ElementConversion},
};
use std::path::Path;

use super::helper::*;
use super::model::*;
use super::typedef::*;
use crate::data::command::load_json;
use crate::error::{PipelineError, Result};
use crate::preprocess::typedef::DatasetSplit;
use crate::typedef::{Observation, PipelineConfig, Predictor};

pub(crate) type TrainBackend = Autodiff<NdArray>;
pub(crate) type InferBackend = NdArray;

const CONFIG_FILE: &str = "config.json";

/// Trains on the `train` half of a dataset artifact. Checkpoints land in
/// `<working_directory>/checkpoints`, the loss history in
/// `<working_directory>/logs/train_loss.csv`.
pub(crate) fn train(
	dataset: &Path,
	working_directory: &Path,
	save_frequency: usize,
	config: &PipelineConfig,
) -> Result<Vec<EpochReport>> {
	let split: DatasetSplit = load_json(dataset)?;
	if split.num_timesteps != config.num_timesteps {
		tracing::warn!(
			"Dataset was built with {} timesteps, configuration says {}",
			split.num_timesteps,
			config.num_timesteps
		);
	}
	tracing::info!(
		"Training on {} samples for {} epochs",
		split.train.len(),
		config.training.max_epoch
	);

	let checkpoints = working_directory.join("checkpoints");
	std::fs::create_dir_all(&checkpoints)?;
	config.training.save(checkpoints.join(CONFIG_FILE))?;

	TrainBackend::seed(config.training.seed);
	let device = Default::default();
	let (_, reports) = train_new_model::<TrainBackend>(
		&split.train,
		&config.training,
		save_frequency,
		working_directory,
		&device,
	)?;

	write_loss_log(&working_directory.join("logs").join("train_loss.csv"), &reports)?;
	Ok(reports)
}

/// A restored network answering one window at a time
pub(crate) struct LstmPredictor<B: Backend> {
	model: LstmNetwork<B>,
	device: B::Device,
}

impl<B: Backend> LstmPredictor<B> {
	/// Restores `model_path`. The network shape comes from the `config.json`
	/// written next to the checkpoints, or `fallback` when it is missing.
	pub fn load(model_path: &Path, fallback: &TrainingConfig) -> Result<Self> {
		let config_path = model_path.with_file_name(CONFIG_FILE);
		let config = if config_path.exists() {
			TrainingConfig::load(&config_path).map_err(|err| PipelineError::Recorder {
				path: config_path.clone(),
				message: err.to_string(),
			})?
		} else {
			fallback.clone()
		};

		let device = B::Device::default();
		let model = load_checkpoint(config.model.init::<B>(&device), model_path, &device)?;
		tracing::info!("Model restored from \"{}\"", model_path.display());

		Ok(Self { model, device })
	}
}

impl<B: Backend> Predictor for LstmPredictor<B> {
	fn predict(&self, window: &[Observation]) -> Result<f64> {
		if window.is_empty() {
			return Err(PipelineError::Predictor(String::from("empty window")));
		}

		let input = windows_to_tensor::<B>(&[window], &self.device);
		let output = self.model.forward(input).reshape([1]);
		Ok(output.into_scalar().elem::<f32>() as f64)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::data::command::save_json;
	use crate::typedef::Sample;

	#[test]
	fn trained_checkpoint_can_be_restored_for_prediction() {
		let dir = tempfile::tempdir().unwrap();
		let window = (0..3)
			.map(|day| Observation {
				count: day as f64,
				relative_lat: 0.1,
				relative_lon: -0.2,
			})
			.collect::<Vec<_>>();
		let split = DatasetSplit {
			num_timesteps: 3,
			train: vec![
				Sample {
					window: window.clone(),
					label: 3,
				};
				4
			],
			test: Vec::new(),
		};
		let dataset = dir.path().join("dataset.json");
		save_json(&dataset, &split).unwrap();

		let mut config = PipelineConfig::default();
		config.num_timesteps = 3;
		config.training = TrainingConfig::new()
			.with_model(LstmNetworkConfig::new().with_hidden_size(8))
			.with_max_epoch(2);

		let reports = train(&dataset, dir.path(), 1, &config).unwrap();
		assert_eq!(reports.len(), 2);
		assert!(dir.path().join("logs").join("train_loss.csv").exists());

		// Restored shape must come from the saved config, not the fallback
		let predictor = LstmPredictor::<InferBackend>::load(
			&dir.path().join("checkpoints").join("model-1"),
			&TrainingConfig::new(),
		)
		.unwrap();
		assert!(predictor.predict(&window).unwrap().is_finite());
		assert!(predictor.predict(&[]).is_err());
	}
}
