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

use std::path::PathBuf;

use crate::preprocess::typedef::Axis;

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
	#[error("I/O failure: {0}")]
	Io(#[from] std::io::Error),

	#[error("Cannot read or write CSV: {0}")]
	Csv(#[from] csv::Error),

	#[error("Cannot read or write JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Cannot record model at \"{path}\": {message}")]
	Recorder { path: PathBuf, message: String },

	#[error("Cannot parse \"{0}\" as a date")]
	UnparsableDate(String),

	#[error("Province \"{0}\" has no latitude/longitude entry")]
	MissingCoordinate(String),

	#[error("Cannot scale {axis}: need at least 2 distinct values, found {distinct}")]
	DegenerateScale { axis: Axis, distinct: usize },

	#[error("No alignable data: first shared day {first_shared_day} is after last shared day {last_shared_day}")]
	NoAlignableData {
		first_shared_day: u32,
		last_shared_day: u32,
	},

	#[error("No alignable data: no \"{case_type}\" province starts on or before day {cutoff}")]
	NoSurvivingProvinces { case_type: String, cutoff: u32 },

	#[error("Province \"{province}\" has {available} aligned rows, {needed} are needed")]
	InsufficientHistory {
		province: String,
		available: usize,
		needed: usize,
	},

	#[error("Malformed row at line {line}: {reason}")]
	MalformedRow { line: u64, reason: String },

	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("Predictor failed: {0}")]
	Predictor(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
