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

use std::path::{Path, PathBuf};

use super::helper::*;
use super::typedef::*;
use crate::data::command::save_json;
use crate::error::Result;
use crate::preprocess::typedef::ExtrapolationSeed;
use crate::typedef::{InterventionMap, Predictor, Sample};

/// Intervention intensities used when `etc_user` is run without a map
pub(crate) fn default_intervention_map() -> InterventionMap {
	InterventionMap::from([
		(String::from("macenta"), 2),
		(String::from("coyah"), 1),
		(String::from("kerouane"), 1),
	])
}

/// Rolls each province `steps` days into the future. Provinces are handled
/// one after another, each from its own seed window, in seed order.
pub(crate) fn extrapolate<P: Predictor>(
	predictor: &P,
	seeds: &[ExtrapolationSeed],
	steps: usize,
	interventions: Option<&InterventionMap>,
) -> Result<Vec<ProvinceForecast>> {
	seeds
		.iter()
		.map(|seed| {
			let intensity = interventions.and_then(|found| found.get(&seed.province).copied());
			let mut state = ExtrapolationState::from_seed(seed)?;
			let mut extrapolated = Vec::<f64>::with_capacity(steps);
			let mut adjusted = Vec::<f64>::with_capacity(steps);

			for _ in 0..steps {
				let outcome = state.step(predictor, intensity)?;
				extrapolated.push(outcome.raw_prediction);
				adjusted.push(outcome.adjusted);
			}

			tracing::info!(
				"{}: {} steps, intensity {:?}, last adjusted {:.2}",
				seed.province,
				steps,
				intensity,
				adjusted.last().copied().unwrap_or_default()
			);

			Ok(ProvinceForecast {
				province: seed.province.clone(),
				history: seed.window.clone(),
				extrapolated,
				adjusted,
			})
		})
		.collect()
}

/// Scores single-step predictions against their labels
pub(crate) fn evaluate<P: Predictor>(predictor: &P, samples: &[Sample]) -> Result<EvaluationReport> {
	let pairs = samples
		.iter()
		.map(|each| Ok((predictor.predict(&each.window)?, each.label)))
		.collect::<Result<Vec<_>>>()?;

	let report = summarize(&pairs);
	tracing::info!("Accuracy: {}", report.accuracy);
	tracing::info!("Avg. RMSE: {}", report.mean_rmse);
	tracing::info!("Variance RMSE: {}", report.variance_rmse);

	Ok(report)
}

/// One row per province and step
pub(crate) fn write_forecasts(path: &Path, forecasts: &[ProvinceForecast]) -> Result<()> {
	if let Some(parent) = path.parent().filter(|found| !found.as_os_str().is_empty()) {
		std::fs::create_dir_all(parent)?;
	}

	let mut writer = csv::Writer::from_path(path)?;
	writer.write_record(["Province", "Step", "Extrapolated", "Adjusted"])?;

	for each in forecasts {
		for (step, (raw, adjusted)) in each.extrapolated.iter().zip(&each.adjusted).enumerate() {
			writer.write_record([
				each.province.clone(),
				(step + 1).to_string(),
				raw.to_string(),
				adjusted.to_string(),
			])?;
		}
	}

	writer.flush()?;
	Ok(())
}

/// Writes the step CSV at `path` and the full forecasts, seed history
/// included, as JSON next to it. Returns the JSON path.
pub(crate) fn write_forecast_report(path: &Path, forecasts: &[ProvinceForecast]) -> Result<PathBuf> {
	write_forecasts(path, forecasts)?;

	let history_path = path.with_extension("history.json");
	save_json(&history_path, &forecasts)?;
	Ok(history_path)
}
