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
use csv::StringRecord;
use parse_datetime::parse_datetime;
use std::str::FromStr;

use crate::error::{PipelineError, Result};

pub(super) fn parse_count(cell: &str) -> Option<u64> {
	cell.trim().parse::<u64>().ok()
}

/// ISO dates first, anything the free-form parser understands second
pub(super) fn parse_date(cell: &str) -> Result<NaiveDate> {
	let cell = cell.trim();
	if let Ok(date) = NaiveDate::parse_from_str(cell, "%Y-%m-%d") {
		return Ok(date);
	}

	match parse_datetime(cell) {
		Ok(datetime) => Ok(datetime.date_naive()),
		Err(_) => Err(PipelineError::UnparsableDate(cell.to_string())),
	}
}

/// Whole calendar days from `first_date` to `date`
pub(super) fn day_offset(first_date: NaiveDate, date: NaiveDate) -> u32 {
	date.signed_duration_since(first_date).num_days().max(0) as u32
}

pub(super) fn line_of(row: &StringRecord) -> u64 {
	row.position().map(|found| found.line()).unwrap_or_default()
}

/// Reads column `index` of a row that must be well-formed
pub(super) fn parse_field<T: FromStr>(row: &StringRecord, index: usize, name: &str) -> Result<T> {
	let cell = row.get(index).ok_or_else(|| PipelineError::MalformedRow {
		line: line_of(row),
		reason: format!("missing {} column", name),
	})?;

	cell.trim()
		.parse::<T>()
		.map_err(|_| PipelineError::MalformedRow {
			line: line_of(row),
			reason: format!("cannot parse {} from \"{}\"", name, cell),
		})
}
