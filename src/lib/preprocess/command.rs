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

use std::{
	collections::{BTreeMap, HashMap},
	path::Path,
	sync::Arc,
};

use super::helper::*;
use super::typedef::*;
use crate::data::command::{read_clean_records, save_json};
use crate::error::{PipelineError, Result};
use crate::typedef::{LatLon, PipelineConfig, ProvinceSeries, Record};

/// Looks up every province in `table` and maps it into the shared relative
/// frame computed over the distinct provinces.
pub(crate) fn normalize_coordinates<'a>(
	provinces: impl IntoIterator<Item = &'a str>,
	table: &HashMap<String, LatLon>,
) -> Result<BTreeMap<String, LatLon>> {
	let absolute = provinces
		.into_iter()
		.map(|province| match table.get(province) {
			Some(found) => Ok((province.to_string(), *found)),
			None => Err(PipelineError::MissingCoordinate(province.to_string())),
		})
		.collect::<Result<BTreeMap<_, _>>>()?;

	let frame = compute_spatial_frame(&absolute.values().cloned().collect::<Vec<_>>())?;
	tracing::debug!(
		"Spatial frame: lat mean {:.4} scale {:.4}, lon mean {:.4} scale {:.4}",
		frame.lat.mean,
		frame.lat.scale,
		frame.lon.mean,
		frame.lon.scale
	);

	Ok(absolute
		.into_iter()
		.map(|(province, coordinate)| (province, frame.relative(&coordinate)))
		.collect())
}

/// Resolves the per-province day ranges into one shared, gap-free daily grid.
pub(crate) fn align_by_time(
	records: Vec<Record>,
	config: &PipelineConfig,
) -> Result<AlignedDataset> {
	let mut by_province = BTreeMap::<Arc<String>, Vec<Record>>::new();
	for each in records {
		by_province
			.entry(each.province.clone())
			.or_default()
			.push(each);
	}

	let province_count = by_province.len();
	let surviving = by_province
		.into_iter()
		.filter_map(|(province, mut rows)| {
			rows.sort_by_key(|each| each.day_offset);
			let series = ProvinceSeries { province, rows };

			match series.first_day() {
				Some(first_day) if first_day <= config.late_start_cutoff => Some(series),
				_ => {
					tracing::debug!(
						"Skipping province {} which starts after day {}",
						series.province,
						config.late_start_cutoff
					);
					None
				}
			}
		})
		.collect::<Vec<_>>();

	tracing::info!(
		"{} of {} provinces start on or before day {}",
		surviving.len(),
		province_count,
		config.late_start_cutoff
	);

	let shared_range = surviving.iter().fold(None, |range, series| {
		let first_day = series.first_day().unwrap_or_default();
		let last_day = series.last_day().unwrap_or_default();
		match range {
			None => Some((first_day, last_day)),
			Some((first_shared, last_shared)) => {
				Some((u32::max(first_shared, first_day), u32::min(last_shared, last_day)))
			}
		}
	});

	let (first_shared_day, last_shared_day) = match shared_range {
		Some(found) => found,
		None => {
			return Err(PipelineError::NoSurvivingProvinces {
				case_type: config.case_type.clone(),
				cutoff: config.late_start_cutoff,
			})
		}
	};

	if first_shared_day > last_shared_day {
		return Err(PipelineError::NoAlignableData {
			first_shared_day,
			last_shared_day,
		});
	}

	let mut filled_days = 0usize;
	let series = surviving
		.into_iter()
		.map(|each| {
			let (rows, filled) = align_province(&each.rows, first_shared_day, last_shared_day);
			filled_days += filled;
			(
				each.province.clone(),
				ProvinceSeries {
					province: each.province,
					rows,
				},
			)
		})
		.collect::<BTreeMap<_, _>>();

	tracing::info!(
		"Aligned {} provinces over days {}..={}, filled {} missing days",
		series.len(),
		first_shared_day,
		last_shared_day,
		filled_days
	);

	Ok(AlignedDataset {
		first_shared_day,
		last_shared_day,
		series,
		filled_days,
	})
}

/// Windows every aligned province, concatenates in province order and
/// splits into train/test with the configured seed.
pub(crate) fn build_training_dataset(
	aligned: &AlignedDataset,
	config: &PipelineConfig,
) -> DatasetSplit {
	let samples = aligned
		.series
		.values()
		.flat_map(|each| extract_samples(each, config.num_timesteps))
		.collect::<Vec<_>>();

	let sample_count = samples.len();
	let (train, test) = split_train_test(samples, config.test_fraction, config.split_seed);

	tracing::info!(
		"Built {} samples of {} timesteps: {} train, {} test",
		sample_count,
		config.num_timesteps,
		train.len(),
		test.len()
	);

	DatasetSplit {
		num_timesteps: config.num_timesteps,
		train,
		test,
	}
}

pub(crate) fn build_extrapolation_seeds(
	aligned: &AlignedDataset,
	config: &PipelineConfig,
) -> Result<Vec<ExtrapolationSeed>> {
	aligned
		.series
		.values()
		.map(|each| {
			Ok(ExtrapolationSeed {
				province: each.province.to_string(),
				window: seed_window(each, config.num_timesteps, config.seed_anchor_day)?,
			})
		})
		.collect()
}

/// Province to relative (lat, lon), read from the first aligned row
pub(crate) fn relative_coordinate_map(aligned: &AlignedDataset) -> BTreeMap<String, LatLon> {
	aligned
		.series
		.values()
		.filter_map(|each| {
			let first = each.rows.first()?;
			Some((
				each.province.to_string(),
				LatLon {
					lat: first.relative_lat,
					lon: first.relative_lon,
				},
			))
		})
		.collect()
}

/// Clean file in, the three JSON artifacts out:
/// `<name>_<W>.json`, `<name>_<W>_for_extrapolation.json` and
/// `<name>_province_latlon.json`.
pub(crate) fn preprocess_clean_file(
	clean: &Path,
	output_dir: &Path,
	dataset_name: &str,
	config: &PipelineConfig,
) -> Result<PreprocessArtifacts> {
	let aligned = align_by_time(read_clean_records(clean, &config.case_type)?, config)?;

	let artifacts = PreprocessArtifacts {
		dataset: output_dir.join(format!("{}_{}.json", dataset_name, config.num_timesteps)),
		seeds: output_dir.join(format!(
			"{}_{}_for_extrapolation.json",
			dataset_name, config.num_timesteps
		)),
		coordinates: output_dir.join(format!("{}_province_latlon.json", dataset_name)),
	};

	save_json(&artifacts.dataset, &build_training_dataset(&aligned, config))?;
	save_json(&artifacts.seeds, &build_extrapolation_seeds(&aligned, config)?)?;
	save_json(&artifacts.coordinates, &relative_coordinate_map(&aligned))?;

	tracing::info!("Artifacts written to \"{}\"", output_dir.display());
	Ok(artifacts)
}
