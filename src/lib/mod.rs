#![recursion_limit = "256"]

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

use anyhow::Context;
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

mod error;
mod typedef;
use typedef::*;

mod data;
mod evaluate;
mod preprocess;
mod train;

use data::command::*;
use evaluate::command::*;
use preprocess::command::*;
use train::command::*;

const DEFAULT_LOG_DIRECTIVE: &str = "project_outbreak=info";

/// `RUST_LOG`-style directives when given and parsable, otherwise info for
/// this crate only
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
	directives
		.filter(|found| !found.trim().is_empty())
		.and_then(|found| EnvFilter::try_new(found).ok())
		.unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
	let config = match path {
		Some(found) => load_json::<PipelineConfig>(found)
			.with_context(|| format!("Failed to load configuration from \"{}\"", found.display()))?,
		None => PipelineConfig::default(),
	};

	config.validate()?;
	Ok(config)
}

fn run_extrapolation(
	args: &ExtrapolateArgs,
	interventions: Option<&InterventionMap>,
	config: &PipelineConfig,
) -> anyhow::Result<()> {
	let seeds: Vec<preprocess::typedef::ExtrapolationSeed> = load_json(&args.seeds)
		.with_context(|| format!("Failed to load seeds from \"{}\"", args.seeds.display()))?;
	let predictor = LstmPredictor::<InferBackend>::load(&args.model_path, &config.training)
		.with_context(|| format!("Failed to restore \"{}\"", args.model_path.display()))?;

	let forecasts = extrapolate(&predictor, &seeds, config.num_extrapolate, interventions)?;
	let history_path = write_forecast_report(&args.output, &forecasts)
		.with_context(|| format!("Failed to write \"{}\"", args.output.display()))?;

	tracing::info!(
		"{} provinces extrapolated into \"{}\", history in \"{}\"",
		forecasts.len(),
		args.output.display(),
		history_path.display()
	);
	Ok(())
}

/// Parses the command line and runs the requested mode
pub fn run() -> anyhow::Result<()> {
	let cli = Cli::parse();
	let config = load_config(cli.config.as_deref())?;
	tracing::debug!("Configuration: {:?}", config);

	match &cli.mode {
		Mode::Clean(args) => {
			clean_dataset(&args.raw, &args.coordinates, &args.output)
				.context("Failed to clean the raw data")?;
		}
		Mode::Preprocess(args) => {
			let artifacts =
				preprocess_clean_file(&args.clean, &args.output_dir, &args.dataset_name, &config)
					.context("Failed to preprocess the clean data")?;

			tracing::info!("Training dataset: \"{}\"", artifacts.dataset.display());
			tracing::info!("Extrapolation seeds: \"{}\"", artifacts.seeds.display());
			tracing::info!("Coordinate map: \"{}\"", artifacts.coordinates.display());
		}
		Mode::Train(args) => {
			train(&args.dataset, &cli.working_directory, args.save_frequency, &config)
				.context("Training failed")?;
		}
		Mode::Eval(args) => {
			let split: preprocess::typedef::DatasetSplit = load_json(&args.dataset)
				.with_context(|| format!("Failed to load \"{}\"", args.dataset.display()))?;
			let predictor = LstmPredictor::<InferBackend>::load(&args.model_path, &config.training)
				.with_context(|| format!("Failed to restore \"{}\"", args.model_path.display()))?;

			let report = evaluate(&predictor, &split.test)?;
			println!("{}", serde_json::to_string_pretty(&report)?);
		}
		Mode::Extrapolate(args) => run_extrapolation(args, None, &config)?,
		Mode::EtcUser(args) => {
			let interventions = match &args.interventions {
				Some(path) => load_json::<InterventionMap>(path).with_context(|| {
					format!("Failed to load interventions from \"{}\"", path.display())
				})?,
				None => default_intervention_map(),
			};
			run_extrapolation(&args.extrapolate, Some(&interventions), &config)?;
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::PipelineError;
	use tracing::level_filters::LevelFilter;

	#[test]
	fn log_filter_prefers_given_directives() {
		assert_eq!(
			log_filter(Some("project_outbreak=debug")).max_level_hint(),
			Some(LevelFilter::DEBUG)
		);
		assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
		assert_eq!(log_filter(Some("  ")).max_level_hint(), Some(LevelFilter::INFO));
	}

	#[test]
	fn config_file_is_validated_on_load() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.json");
		std::fs::write(&path, r#"{"numTimesteps": 0}"#).unwrap();

		let error = load_config(Some(path.as_path())).unwrap_err();
		assert!(matches!(
			error.downcast_ref::<PipelineError>(),
			Some(PipelineError::InvalidConfig(_))
		));

		std::fs::write(&path, r#"{"numTimesteps": 7, "testFraction": 0.2}"#).unwrap();
		let config = load_config(Some(path.as_path())).unwrap();
		assert_eq!(config.num_timesteps, 7);
		assert_eq!(config.late_start_cutoff, 250);
	}
}
