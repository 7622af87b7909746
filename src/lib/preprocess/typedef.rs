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
use std::{collections::BTreeMap, path::PathBuf, sync::Arc};
use strum_macros::{Display, EnumIter};

use crate::typedef::{LatLon, Observation, ProvinceSeries, Sample};

#[derive(PartialEq, Eq, EnumIter, Display, Clone, Copy, Debug)]
#[strum(serialize_all = "lowercase")]
pub enum Axis {
	Latitude,
	Longitude,
}

impl Axis {
	pub(crate) fn pick(&self, coordinate: &LatLon) -> f64 {
		match self {
			Axis::Latitude => coordinate.lat,
			Axis::Longitude => coordinate.lon,
		}
	}
}

/// Mean and scale of one axis, computed over the distinct province set
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub(crate) struct AxisFrame {
	pub mean: f64,
	pub scale: f64,
}

impl AxisFrame {
	pub fn relative(&self, value: f64) -> f64 {
		self.scale * (value - self.mean)
	}
}

#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub(crate) struct SpatialFrame {
	pub lat: AxisFrame,
	pub lon: AxisFrame,
}

impl SpatialFrame {
	pub fn relative(&self, coordinate: &LatLon) -> LatLon {
		LatLon {
			lat: self.lat.relative(coordinate.lat),
			lon: self.lon.relative(coordinate.lon),
		}
	}
}

/// Every province trimmed to the same gap-free day range
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct AlignedDataset {
	pub first_shared_day: u32,
	pub last_shared_day: u32,
	pub series: BTreeMap<Arc<String>, ProvinceSeries>,
	pub filled_days: usize,
}

impl AlignedDataset {
	pub fn day_count(&self) -> usize {
		(self.last_shared_day - self.first_shared_day) as usize + 1
	}
}

#[derive(Default, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DatasetSplit {
	pub num_timesteps: usize,
	pub train: Vec<Sample>,
	pub test: Vec<Sample>,
}

/// Last known window of one province, the starting point of extrapolation
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExtrapolationSeed {
	pub province: String,
	pub window: Vec<Observation>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PreprocessArtifacts {
	pub dataset: PathBuf,
	pub seeds: PathBuf,
	pub coordinates: PathBuf,
}
