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

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::typedef::LatLon;

// Positional columns of a raw row
pub(super) const RAW_PROVINCE: usize = 1;
pub(super) const RAW_CASE_TYPE: usize = 2;
pub(super) const RAW_COUNT: usize = 3;
pub(super) const RAW_DATE: usize = 4;

// Positional columns of a clean row
pub(super) const CLEAN_PROVINCE: usize = 1;
pub(super) const CLEAN_CASE_TYPE: usize = 2;
pub(super) const CLEAN_COUNT: usize = 3;
pub(super) const CLEAN_DAY: usize = 4;
pub(super) const CLEAN_LAT: usize = 5;
pub(super) const CLEAN_LON: usize = 6;

/// A raw row that passed the count check, before day offsets exist
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RawRecord {
	pub province: String,
	pub case_type: String,
	pub count: u64,
	pub date: NaiveDate,
}

/// Absolute latitude/longitude per province name
pub(crate) type CoordinateTable = HashMap<String, LatLon>;
