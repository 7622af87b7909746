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

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::PathBuf, sync::Arc};

use crate::error::PipelineError;
use crate::train::typedef::TrainingConfig;

/// One normalized case-count row. Immutable once the clean pass has filled
/// in `day_offset` and the relative coordinates.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Record {
	pub province: Arc<String>,
	pub case_type: Arc<String>,
	pub count: u64,
	pub day_offset: u32,
	pub relative_lat: f64,
	pub relative_lon: f64,
}

impl Record {
	pub fn observation(&self) -> Observation {
		Observation {
			count: self.count as f64,
			relative_lat: self.relative_lat,
			relative_lon: self.relative_lon,
		}
	}
}

/// A single timestep as seen by the predictor: (count, rel_lat, rel_lon)
#[derive(Default, Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub(crate) struct Observation {
	pub count: f64,
	pub relative_lat: f64,
	pub relative_lon: f64,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub(crate) struct Sample {
	pub window: Vec<Observation>,
	pub label: u64,
}

/// Daily rows of one province. After alignment the rows are gap-free and
/// strictly increasing by `day_offset`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ProvinceSeries {
	pub province: Arc<String>,
	pub rows: Vec<Record>,
}

impl ProvinceSeries {
	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn first_day(&self) -> Option<u32> {
		self.rows.first().map(|found| found.day_offset)
	}

	pub fn last_day(&self) -> Option<u32> {
		self.rows.last().map(|found| found.day_offset)
	}
}

#[derive(Default, Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub(crate) struct LatLon {
	pub lat: f64,
	pub lon: f64,
}

/// Province name to intervention intensity (number of new treatment centres)
pub(crate) type InterventionMap = HashMap<String, u32>;

/// Anything that turns a window of observations into the next count.
pub(crate) trait Predictor {
	fn predict(&self, window: &[Observation]) -> Result<f64, PipelineError>;
}

impl<F> Predictor for F
where
	F: Fn(&[Observation]) -> f64,
{
	fn predict(&self, window: &[Observation]) -> Result<f64, PipelineError> {
		Ok(self(window))
	}
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct PipelineConfig {
	pub num_timesteps: usize,
	pub late_start_cutoff: u32,
	pub test_fraction: f64,
	pub split_seed: u64,
	pub num_extrapolate: usize,
	pub case_type: String,
	pub seed_anchor_day: Option<u32>,
	pub training: TrainingConfig,
}

impl Default for PipelineConfig {
	fn default() -> Self {
		Self {
			num_timesteps: 25,
			late_start_cutoff: 250,
			test_fraction: 0.10,
			split_seed: 42,
			num_extrapolate: 20,
			case_type: String::from("confirmed cases"),
			seed_anchor_day: None,
			training: TrainingConfig::default(),
		}
	}
}

impl PipelineConfig {
	/// Rejects values the pipeline cannot run with: an empty window, a test
	/// fraction outside `[0, 1]` and a network without hidden units.
	pub fn validate(&self) -> Result<(), PipelineError> {
		if self.num_timesteps == 0 {
			return Err(PipelineError::InvalidConfig(String::from(
				"numTimesteps must be at least 1",
			)));
		}

		if !(0f64..=1f64).contains(&self.test_fraction) {
			return Err(PipelineError::InvalidConfig(format!(
				"testFraction must be within [0, 1], found {}",
				self.test_fraction
			)));
		}

		if self.training.model.hidden_size == 0 {
			return Err(PipelineError::InvalidConfig(String::from(
				"hidden_size must be at least 1",
			)));
		}

		Ok(())
	}
}

#[derive(Parser, Debug)]
#[command(
	name = "project-outbreak",
	version,
	about = "Align epidemic case counts per province, train an LSTM and extrapolate with interventions"
)]
pub(crate) struct Cli {
	/// JSON file overriding the default pipeline configuration
	#[arg(long, global = true)]
	pub config: Option<PathBuf>,

	/// Directory for checkpoints and training logs
	#[arg(short = 'w', long, global = true, default_value = "trial")]
	pub working_directory: PathBuf,

	#[command(subcommand)]
	pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Mode {
	/// Convert raw rows into the clean format with day offsets and relative coordinates
	Clean(CleanArgs),
	/// Align the clean data and write training samples, extrapolation seeds and the coordinate map
	Preprocess(PreprocessArgs),
	Train(TrainArgs),
	Eval(EvalArgs),
	Extrapolate(ExtrapolateArgs),
	/// Extrapolate with a per-province intervention map
	#[command(name = "etc_user")]
	EtcUser(EtcUserArgs),
}

#[derive(Args, Debug)]
pub(crate) struct CleanArgs {
	#[arg(long)]
	pub raw: PathBuf,
	/// CSV of `province,lat,lon`
	#[arg(long)]
	pub coordinates: PathBuf,
	#[arg(long)]
	pub output: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct PreprocessArgs {
	#[arg(long)]
	pub clean: PathBuf,
	#[arg(long, default_value = "data/preprocessed")]
	pub output_dir: PathBuf,
	/// Name prefix of the written artifacts
	#[arg(long, default_value = "guinea")]
	pub dataset_name: String,
}

#[derive(Args, Debug)]
pub(crate) struct TrainArgs {
	#[arg(long, default_value = "data/preprocessed/guinea_25.json")]
	pub dataset: PathBuf,
	/// Number of epochs between checkpoints (also accepted as `--save_frequency`)
	#[arg(short = 's', long, visible_alias = "save_frequency", default_value_t = 10)]
	pub save_frequency: usize,
}

#[derive(Args, Debug)]
pub(crate) struct EvalArgs {
	#[arg(long, default_value = "data/preprocessed/guinea_25.json")]
	pub dataset: PathBuf,
	#[arg(long, default_value = "trial/checkpoints/model-600")]
	pub model_path: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ExtrapolateArgs {
	#[arg(long, default_value = "data/preprocessed/guinea_25_for_extrapolation.json")]
	pub seeds: PathBuf,
	#[arg(long, default_value = "trial/checkpoints/model-600")]
	pub model_path: PathBuf,
	#[arg(long, default_value = "extrapolated.csv")]
	pub output: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct EtcUserArgs {
	#[command(flatten)]
	pub extrapolate: ExtrapolateArgs,
	/// JSON object mapping province to intervention intensity
	#[arg(long)]
	pub interventions: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_config_is_valid() {
		assert!(PipelineConfig::default().validate().is_ok());
	}

	#[test]
	fn empty_window_is_rejected() {
		let config = PipelineConfig {
			num_timesteps: 0,
			..Default::default()
		};

		assert!(matches!(config.validate(), Err(PipelineError::InvalidConfig(_))));
	}

	#[test]
	fn test_fraction_must_be_a_fraction() {
		for test_fraction in [-0.1, 1.5, f64::NAN] {
			let config = PipelineConfig {
				test_fraction,
				..Default::default()
			};
			assert!(matches!(config.validate(), Err(PipelineError::InvalidConfig(_))));
		}

		for test_fraction in [0.0, 1.0] {
			let config = PipelineConfig {
				test_fraction,
				..Default::default()
			};
			assert!(config.validate().is_ok());
		}
	}

	#[test]
	fn save_frequency_accepts_underscore_spelling() {
		let cli = Cli::try_parse_from(["project-outbreak", "train", "--save_frequency", "5"]).unwrap();
		match cli.mode {
			Mode::Train(args) => assert_eq!(args.save_frequency, 5),
			other => panic!("expected train mode, got {other:?}"),
		}

		let cli = Cli::try_parse_from(["project-outbreak", "train", "-s", "3"]).unwrap();
		assert!(matches!(cli.mode, Mode::Train(TrainArgs { save_frequency: 3, .. })));
	}
}
