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
	nn::{Linear, LinearConfig, Lstm, LstmConfig},
	prelude::*,
};

use super::typedef::LstmNetworkConfig;

#[derive(Module, Debug)]
pub(crate) struct LstmNetwork<B: Backend> {
	lstm: Lstm<B>,
	head: Linear<B>,
}

impl LstmNetworkConfig {
	pub fn init<B: Backend>(&self, device: &B::Device) -> LstmNetwork<B> {
		LstmNetwork {
			lstm: LstmConfig::new(self.input_size, self.hidden_size, self.bias).init(device),
			head: LinearConfig::new(self.hidden_size, 1).init(device),
		}
	}
}

impl<B: Backend> LstmNetwork<B> {
	/// `[batch, timesteps, features]` in, `[batch, 1]` out. Only the hidden
	/// state after the last timestep reaches the head.
	pub fn forward(&self, windows: Tensor<B, 3>) -> Tensor<B, 2> {
		let [batch_size, timesteps, _] = windows.dims();
		let (output, _) = self.lstm.forward(windows, None);
		let [_, _, hidden_size] = output.dims();

		let last = output
			.slice([0..batch_size, (timesteps - 1)..timesteps, 0..hidden_size])
			.reshape([batch_size, hidden_size]);

		self.head.forward(last)
	}
}
