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

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::typedef::Observation;

/// Rolling window of one province while its future is simulated. Lives only
/// for the duration of that province's extrapolation.
#[derive(Clone, Debug)]
pub(super) struct ExtrapolationState {
	pub window: VecDeque<Observation>,
	pub old_value: f64,
	pub lat: f64,
	pub lon: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct StepOutcome {
	pub raw_prediction: f64,
	pub adjusted: f64,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProvinceForecast {
	pub province: String,
	pub history: Vec<Observation>,
	pub extrapolated: Vec<f64>,
	pub adjusted: Vec<f64>,
}

#[derive(Default, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EvaluationReport {
	pub sample_count: usize,
	pub accuracy: f64,
	pub mean_rmse: f64,
	pub variance_rmse: f64,
}
