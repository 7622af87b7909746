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

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use strum::IntoEnumIterator;

use super::typedef::*;
use crate::error::{PipelineError, Result};
use crate::typedef::{LatLon, Observation, ProvinceSeries, Record, Sample};

/// Mean-centers each axis and scales its full range onto a width of 2, so
/// relative coordinates land roughly in [-1, 1].
pub(super) fn compute_spatial_frame(coordinates: &[LatLon]) -> Result<SpatialFrame> {
	let mut frame = SpatialFrame::default();

	for axis in Axis::iter() {
		let mut values = coordinates
			.iter()
			.map(|each| axis.pick(each))
			.collect::<Vec<_>>();

		let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;

		values.sort_unstable_by(f64::total_cmp);
		values.dedup();
		let (min, max) = match (values.first(), values.last()) {
			(Some(min), Some(max)) if values.len() >= 2 => (*min, *max),
			_ => {
				return Err(PipelineError::DegenerateScale {
					axis,
					distinct: values.len(),
				})
			}
		};

		let axis_frame = AxisFrame {
			mean,
			scale: 2f64 / (max - min),
		};

		match axis {
			Axis::Latitude => frame.lat = axis_frame,
			Axis::Longitude => frame.lon = axis_frame,
		}
	}

	Ok(frame)
}

/// Expands sorted `rows` into one row per day of `[first_shared_day,
/// last_shared_day]`. Days without an exact record repeat the previously
/// emitted row, or the first record with zero cases when nothing was
/// emitted yet. Returns the aligned rows and how many days were filled.
pub(super) fn align_province(
	rows: &[Record],
	first_shared_day: u32,
	last_shared_day: u32,
) -> (Vec<Record>, usize) {
	let first_row = match rows.first() {
		Some(found) => found,
		None => return (Vec::new(), 0),
	};

	let day_count = last_shared_day.saturating_sub(first_shared_day) as usize + 1;
	let mut aligned = Vec::<Record>::with_capacity(day_count);
	let mut filled_days = 0usize;
	let mut cursor = 0usize;

	for day in first_shared_day..=last_shared_day {
		// `day` only grows, so the search resumes from the previous match
		while cursor < rows.len() && rows[cursor].day_offset < day {
			cursor += 1;
		}

		let row = match rows.get(cursor).filter(|found| found.day_offset == day) {
			Some(exact) => exact.clone(),
			None => {
				filled_days += 1;
				match aligned.last() {
					Some(previous) => Record {
						day_offset: day,
						..previous.clone()
					},
					None => Record {
						count: 0,
						day_offset: day,
						..first_row.clone()
					},
				}
			}
		};

		aligned.push(row);
	}

	(aligned, filled_days)
}

/// Slides a `num_timesteps` window over the series. The row right after the
/// window is the label and the final row is never used as a label, so a
/// series of length L yields `L - num_timesteps - 1` samples.
pub(super) fn extract_samples(series: &ProvinceSeries, num_timesteps: usize) -> Vec<Sample> {
	let sample_count = series.len().saturating_sub(num_timesteps + 1);

	(0..sample_count)
		.map(|i| Sample {
			window: series.rows[i..i + num_timesteps]
				.iter()
				.map(Record::observation)
				.collect::<Vec<_>>(),
			label: series.rows[i + num_timesteps].count,
		})
		.collect::<Vec<_>>()
}

/// Shuffles with a fixed seed, then takes the first `ceil(n * test_fraction)`
/// items as the test partition. Returns `(train, test)`.
pub(super) fn split_train_test<T>(
	mut samples: Vec<T>,
	test_fraction: f64,
	seed: u64,
) -> (Vec<T>, Vec<T>) {
	let mut rng = StdRng::seed_from_u64(seed);
	samples.shuffle(&mut rng);

	let total = samples.len();
	let test_count = ((total as f64) * test_fraction.clamp(0f64, 1f64)).ceil() as usize;
	let train = samples.split_off(test_count.min(total));

	(train, samples)
}

/// Picks the window that seeds extrapolation: the last `num_timesteps` rows,
/// or the rows starting at the first day on or after `anchor_day`.
pub(super) fn seed_window(
	series: &ProvinceSeries,
	num_timesteps: usize,
	anchor_day: Option<u32>,
) -> Result<Vec<Observation>> {
	let start = match anchor_day {
		None => series.len().checked_sub(num_timesteps),
		Some(anchor) => series
			.rows
			.iter()
			.position(|each| each.day_offset >= anchor)
			.filter(|found| found + num_timesteps <= series.len()),
	};

	match start {
		Some(start) => Ok(series.rows[start..start + num_timesteps]
			.iter()
			.map(Record::observation)
			.collect::<Vec<_>>()),
		None => {
			let available = match anchor_day {
				None => series.len(),
				Some(anchor) => series
					.rows
					.iter()
					.filter(|each| each.day_offset >= anchor)
					.count(),
			};

			Err(PipelineError::InsufficientHistory {
				province: series.province.to_string(),
				available,
				needed: num_timesteps,
			})
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;
	use std::sync::Arc;

	fn record(day_offset: u32, count: u64) -> Record {
		Record {
			province: Arc::new(String::from("conakry")),
			case_type: Arc::new(String::from("confirmed cases")),
			count,
			day_offset,
			relative_lat: 0.5,
			relative_lon: -0.25,
		}
	}

	fn series(counts: &[u64]) -> ProvinceSeries {
		ProvinceSeries {
			province: Arc::new(String::from("conakry")),
			rows: counts
				.iter()
				.enumerate()
				.map(|(day, count)| record(day as u32, *count))
				.collect(),
		}
	}

	#[test]
	fn spatial_frame_centers_and_scales_each_axis() {
		let coordinates = [10f64, 20f64, 30f64]
			.iter()
			.zip([-5f64, 0f64, 15f64])
			.map(|(lat, lon)| LatLon { lat: *lat, lon })
			.collect::<Vec<_>>();

		let frame = compute_spatial_frame(&coordinates).unwrap();
		assert_relative_eq!(frame.lat.mean, 20.0);
		assert_relative_eq!(frame.lat.scale, 0.1);
		assert_relative_eq!(frame.lat.relative(30.0), 1.0);
		assert_relative_eq!(frame.lon.scale, 0.1);
		assert_relative_eq!(frame.lon.mean, 10.0 / 3.0);
		assert_relative_eq!(frame.lon.relative(-5.0), 0.1 * (-5.0 - 10.0 / 3.0));
	}

	#[test]
	fn spatial_frame_rejects_single_latitude() {
		let coordinates = vec![
			LatLon { lat: 9.5, lon: -13.7 },
			LatLon { lat: 9.5, lon: -10.1 },
		];

		match compute_spatial_frame(&coordinates) {
			Err(PipelineError::DegenerateScale { axis, distinct }) => {
				assert_eq!(axis, Axis::Latitude);
				assert_eq!(distinct, 1);
			}
			other => panic!("expected degenerate latitude, got {other:?}"),
		}
	}

	#[test]
	fn spatial_frame_rejects_single_longitude() {
		let coordinates = vec![
			LatLon { lat: 9.5, lon: -10.1 },
			LatLon { lat: 8.5, lon: -10.1 },
			LatLon { lat: 10.7, lon: -10.1 },
		];

		match compute_spatial_frame(&coordinates) {
			Err(PipelineError::DegenerateScale { axis, distinct }) => {
				assert_eq!(axis, Axis::Longitude);
				assert_eq!(distinct, 1);
			}
			other => panic!("expected degenerate longitude, got {other:?}"),
		}
	}

	#[test]
	fn align_carries_forward_missing_days() {
		let rows = vec![record(0, 3), record(1, 5), record(3, 9)];
		let (aligned, filled) = align_province(&rows, 0, 3);

		assert_eq!(filled, 1);
		assert_eq!(
			aligned.iter().map(|each| each.day_offset).collect::<Vec<_>>(),
			vec![0, 1, 2, 3]
		);
		assert_eq!(aligned[2].count, aligned[1].count);
		assert_eq!(aligned[2].relative_lat, aligned[1].relative_lat);
		assert_eq!(aligned[3].count, 9);
	}

	#[test]
	fn align_zeroes_count_on_cold_start() {
		let rows = vec![record(4, 7), record(6, 8)];
		let (aligned, filled) = align_province(&rows, 2, 5);

		assert_eq!(filled, 3);
		assert_eq!(aligned.len(), 4);
		assert_eq!(aligned[0].count, 0);
		assert_eq!(aligned[0].day_offset, 2);
		assert_eq!(aligned[1].count, 0);
		assert_eq!(aligned[2].count, 7);
		assert_eq!(aligned[3].count, 7);
		assert_eq!(aligned[3].day_offset, 5);
	}

	#[test]
	fn align_repeats_a_single_record() {
		let rows = vec![record(3, 12)];
		let (aligned, filled) = align_province(&rows, 3, 3);

		assert_eq!(filled, 0);
		assert_eq!(aligned, rows);
	}

	#[test]
	fn samples_reserve_the_trailing_row() {
		let samples = extract_samples(&series(&[1, 2, 3, 4, 5, 6, 7]), 3);

		assert_eq!(samples.len(), 7 - 3 - 1);
		assert_eq!(
			samples[0].window.iter().map(|each| each.count).collect::<Vec<_>>(),
			vec![1f64, 2f64, 3f64]
		);
		assert_eq!(samples[0].label, 4);
		assert_eq!(samples.last().unwrap().label, 6);
	}

	#[test]
	fn short_series_yields_no_samples() {
		assert!(extract_samples(&series(&[1, 2, 3, 4]), 3).is_empty());
		assert!(extract_samples(&series(&[1, 2]), 3).is_empty());
	}

	#[test]
	fn split_is_deterministic_and_rounds_test_up() {
		let items = (0..25).collect::<Vec<u32>>();
		let (train, test) = split_train_test(items.clone(), 0.1, 42);
		let (train_again, test_again) = split_train_test(items, 0.1, 42);

		assert_eq!(test.len(), 3);
		assert_eq!(train.len(), 22);
		assert_eq!(train, train_again);
		assert_eq!(test, test_again);
	}

	#[test]
	fn seed_window_takes_last_rows_by_default() {
		let window = seed_window(&series(&[1, 2, 3, 4, 5]), 3, None).unwrap();
		assert_eq!(
			window.iter().map(|each| each.count).collect::<Vec<_>>(),
			vec![3f64, 4f64, 5f64]
		);
	}

	#[test]
	fn seed_window_starts_at_anchor_day() {
		let window = seed_window(&series(&[1, 2, 3, 4, 5]), 2, Some(1)).unwrap();
		assert_eq!(
			window.iter().map(|each| each.count).collect::<Vec<_>>(),
			vec![2f64, 3f64]
		);

		let error = seed_window(&series(&[1, 2, 3]), 2, Some(2)).unwrap_err();
		assert!(matches!(
			error,
			PipelineError::InsufficientHistory {
				available: 1,
				needed: 2,
				..
			}
		));
	}
}
