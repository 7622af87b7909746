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

use std::collections::VecDeque;

use super::typedef::*;
use crate::error::{PipelineError, Result};
use crate::preprocess::typedef::ExtrapolationSeed;
use crate::typedef::{Observation, Predictor};

/// Pulls the prediction towards the previous value. Intensity k keeps
/// `1 / (k + 3)` of the change, so stronger interventions flatten growth.
pub(super) fn damp(old_value: f64, raw_prediction: f64, intensity: Option<u32>) -> f64 {
	match intensity {
		Some(k) => old_value + (raw_prediction - old_value) * (1f64 / (k as f64 + 3f64)),
		None => raw_prediction,
	}
}

impl ExtrapolationState {
	pub fn from_seed(seed: &ExtrapolationSeed) -> Result<Self> {
		let (first, last) = match (seed.window.first(), seed.window.last()) {
			(Some(first), Some(last)) => (first, last),
			_ => {
				return Err(PipelineError::InsufficientHistory {
					province: seed.province.clone(),
					available: 0,
					needed: 1,
				})
			}
		};

		Ok(Self {
			window: VecDeque::from(seed.window.clone()),
			old_value: last.count,
			lat: first.relative_lat,
			lon: first.relative_lon,
		})
	}

	/// Predicts one day ahead and rolls the window forward. The window
	/// receives the adjusted value while `old_value` tracks the raw one.
	pub fn step<P: Predictor>(&mut self, predictor: &P, intensity: Option<u32>) -> Result<StepOutcome> {
		let raw_prediction = predictor.predict(self.window.make_contiguous())?.max(0f64);
		let adjusted = damp(self.old_value, raw_prediction, intensity);

		self.old_value = raw_prediction;
		self.window.pop_front();
		self.window.push_back(Observation {
			count: adjusted,
			relative_lat: self.lat,
			relative_lon: self.lon,
		});

		Ok(StepOutcome {
			raw_prediction,
			adjusted,
		})
	}
}

/// Accuracy counts rounded predictions that hit the label exactly; the
/// per-sample RMSE of a single prediction is its absolute error.
pub(super) fn summarize(pairs: &[(f64, u64)]) -> EvaluationReport {
	if pairs.is_empty() {
		return EvaluationReport::default();
	}

	let sample_count = pairs.len();
	let hits = pairs
		.iter()
		.filter(|(prediction, label)| prediction.round() == *label as f64)
		.count();
	let errors = pairs
		.iter()
		.map(|(prediction, label)| ((prediction - *label as f64).powi(2)).sqrt())
		.collect::<Vec<_>>();
	let mean_rmse = errors.iter().sum::<f64>() / sample_count as f64;
	let variance_rmse = errors
		.iter()
		.map(|each| (each - mean_rmse).powi(2))
		.sum::<f64>()
		/ sample_count as f64;

	EvaluationReport {
		sample_count,
		accuracy: hits as f64 / sample_count as f64,
		mean_rmse,
		variance_rmse,
	}
}
