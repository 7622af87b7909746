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

use burn::tensor::{backend::Backend, Tensor};

/// Shape of the recurrent network. Input features are (count, rel_lat, rel_lon).
#[derive(burn::config::Config, Debug)]
pub(crate) struct LstmNetworkConfig {
	#[config(default = 3)]
	pub input_size: usize,
	#[config(default = 64)]
	pub hidden_size: usize,
	#[config(default = true)]
	pub bias: bool,
}

#[derive(burn::config::Config, Debug)]
pub(crate) struct TrainingConfig {
	#[config(default = "LstmNetworkConfig::new()")]
	pub model: LstmNetworkConfig,

	#[config(default = 1e-4)]
	pub learning_rate: f64,
	#[config(default = 1.0)]
	pub adam_epsilon: f32,
	#[config(default = 1)]
	pub batch_size: usize,
	#[config(default = 601)]
	pub max_epoch: usize,
	#[config(default = 0)]
	pub seed: u64,
}

impl Default for TrainingConfig {
	fn default() -> Self {
		Self::new()
	}
}

/// A chunk of samples already on the device
pub(super) struct TrainBatch<B: Backend> {
	pub windows: Tensor<B, 3>,
	pub labels: Tensor<B, 2>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct EpochReport {
	pub epoch: usize,
	pub loss: f64,
}
