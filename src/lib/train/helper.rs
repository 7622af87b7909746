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
	module::Module,
	nn::loss::{MseLoss, Reduction::Mean},
	optim::{AdamConfig, GradientsParams, Optimizer},
	record::{CompactRecorder, Recorder},
	tensor::{backend::AutodiffBackend, backend::Backend, ElementConversion, Tensor, TensorData},
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::path::{Path, PathBuf};

use super::model::*;
use super::typedef::*;
use crate::error::{PipelineError, Result};
use crate::typedef::{Observation, Sample};

pub(super) fn windows_to_tensor<B: Backend>(windows: &[&[Observation]], device: &B::Device) -> Tensor<B, 3> {
	let timesteps = windows.first().map(|found| found.len()).unwrap_or_default();
	let flat = windows
		.iter()
		.flat_map(|each| each.iter())
		.flat_map(|each| [each.count as f32, each.relative_lat as f32, each.relative_lon as f32])
		.collect::<Vec<_>>();

	Tensor::<B, 3>::from_data(TensorData::new(flat, [windows.len(), timesteps, 3]), device)
}

pub(super) fn samples_to_batch<B: Backend>(samples: &[&Sample], device: &B::Device) -> TrainBatch<B> {
	let windows = samples
		.iter()
		.map(|each| each.window.as_slice())
		.collect::<Vec<_>>();
	let labels = samples
		.iter()
		.map(|each| each.label as f32)
		.collect::<Vec<_>>();

	TrainBatch {
		windows: windows_to_tensor(&windows, device),
		labels: Tensor::<B, 2>::from_data(TensorData::new(labels, [samples.len(), 1]), device),
	}
}

pub(super) fn checkpoint_path(working_directory: &Path, epoch: usize) -> PathBuf {
	working_directory
		.join("checkpoints")
		.join(format!("model-{}", epoch))
}

/// CompactRecorder appends its own extension to `path`
pub(super) fn save_checkpoint<B: Backend>(model: &LstmNetwork<B>, path: &Path) -> Result<()> {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}

	CompactRecorder::new()
		.record(model.clone().into_record(), path.to_path_buf())
		.map_err(|err| PipelineError::Recorder {
			path: path.to_path_buf(),
			message: err.to_string(),
		})
}

pub(super) fn load_checkpoint<B: Backend>(
	model: LstmNetwork<B>,
	path: &Path,
	device: &B::Device,
) -> Result<LstmNetwork<B>> {
	let record = CompactRecorder::new()
		.load(path.to_path_buf(), device)
		.map_err(|err| PipelineError::Recorder {
			path: path.to_path_buf(),
			message: err.to_string(),
		})?;

	Ok(model.load_record(record))
}

pub(super) fn write_loss_log(path: &Path, reports: &[EpochReport]) -> Result<()> {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}

	let mut writer = csv::Writer::from_path(path)?;
	writer.write_record(["Epoch", "Train Loss"])?;
	for each in reports {
		writer.write_record([each.epoch.to_string(), each.loss.to_string()])?;
	}

	writer.flush()?;
	Ok(())
}

/// Runs every epoch over the shuffled samples. The model is checkpointed
/// whenever `epoch % save_frequency == 0`, so the last epoch of the default
/// schedule (600) is always saved.
pub(super) fn train_new_model<B: AutodiffBackend>(
	samples: &[Sample],
	config: &TrainingConfig,
	save_frequency: usize,
	working_directory: &Path,
	device: &B::Device,
) -> Result<(LstmNetwork<B>, Vec<EpochReport>)> {
	let batch_size = config.batch_size.max(1);
	let save_frequency = save_frequency.max(1);

	let mut model = config.model.init::<B>(device);
	let mut optim = AdamConfig::new()
		.with_epsilon(config.adam_epsilon)
		.init::<B, LstmNetwork<B>>();
	let mut rng = StdRng::seed_from_u64(config.seed);
	let mut order = samples.iter().collect::<Vec<_>>();
	let mut reports = Vec::<EpochReport>::with_capacity(config.max_epoch);

	for epoch in 0..config.max_epoch {
		order.shuffle(&mut rng);

		let mut training_loss = 0f64;
		let mut updates = 0usize;
		for chunk in order.chunks(batch_size) {
			let batch = samples_to_batch::<B>(chunk, device);
			let output = model.forward(batch.windows);
			let loss = MseLoss::new()
				.forward(output, batch.labels, Mean)
				.div_scalar(chunk.len() as f32);
			training_loss += loss.clone().into_scalar().elem::<f32>() as f64;
			updates += 1;

			// Gradients for the current backward pass
			let grads = loss.backward();
			// Gradients linked to each parameter of the model
			let grads = GradientsParams::from_grads(grads, &model);
			model = optim.step(config.learning_rate, model, grads);
		}

		let report = EpochReport {
			epoch,
			loss: training_loss / updates.max(1) as f64,
		};
		tracing::info!("Epoch {} loss {:.6}", report.epoch, report.loss);
		reports.push(report);

		if epoch % save_frequency == 0 {
			let path = checkpoint_path(working_directory, epoch);
			save_checkpoint(&model, &path)?;
			tracing::info!("Checkpoint saved to \"{}\"", path.display());
		}
	}

	Ok((model, reports))
}

#[cfg(test)]
mod tests {
	use super::*;
	use burn::backend::{Autodiff, NdArray};

	fn sample(counts: &[f64], label: u64) -> Sample {
		Sample {
			window: counts
				.iter()
				.map(|count| Observation {
					count: *count,
					relative_lat: 0.5,
					relative_lon: -0.5,
				})
				.collect(),
			label,
		}
	}

	#[test]
	fn batch_keeps_sample_layout() {
		let device = Default::default();
		let first = sample(&[1.0, 2.0, 3.0], 4);
		let second = sample(&[5.0, 6.0, 7.0], 8);
		let batch = samples_to_batch::<NdArray>(&[&first, &second], &device);

		assert_eq!(batch.windows.dims(), [2, 3, 3]);
		assert_eq!(batch.labels.dims(), [2, 1]);

		let values = batch.windows.into_data().to_vec::<f32>().unwrap();
		assert_eq!(&values[0..3], &[1.0, 0.5, -0.5]);
		assert_eq!(values[9], 5.0);
		assert_eq!(batch.labels.into_data().to_vec::<f32>().unwrap(), vec![4.0, 8.0]);
	}

	#[test]
	fn short_run_checkpoints_on_schedule() {
		let dir = tempfile::tempdir().unwrap();
		let samples = vec![sample(&[1.0, 2.0], 3), sample(&[2.0, 3.0], 4), sample(&[3.0, 4.0], 5)];
		let config = TrainingConfig::new()
			.with_model(LstmNetworkConfig::new().with_hidden_size(4))
			.with_max_epoch(3)
			.with_batch_size(2);

		let (_, reports) =
			train_new_model::<Autodiff<NdArray>>(&samples, &config, 2, dir.path(), &Default::default())
				.unwrap();

		assert_eq!(reports.len(), 3);
		assert!(reports.iter().all(|each| each.loss.is_finite()));
		assert!(dir.path().join("checkpoints").join("model-0.mpk").exists());
		assert!(!dir.path().join("checkpoints").join("model-1.mpk").exists());
		assert!(dir.path().join("checkpoints").join("model-2.mpk").exists());
	}
}
