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

use serde::{de::DeserializeOwned, Serialize};
use std::{collections::HashMap, fs, io::BufWriter, path::Path, sync::Arc};

use super::helper::*;
use super::typedef::*;
use crate::error::{PipelineError, Result};
use crate::preprocess::command::normalize_coordinates;
use crate::typedef::{LatLon, Record};

fn headerless_reader(path: &Path) -> Result<csv::Reader<fs::File>> {
	Ok(csv::ReaderBuilder::new()
		.has_headers(false)
		.flexible(true)
		.from_path(path)?)
}

/// Reads `province,lat,lon` rows
pub(crate) fn load_coordinate_table(path: &Path) -> Result<CoordinateTable> {
	let mut reader = headerless_reader(path)?;

	reader
		.records()
		.map(|each| {
			let row = each?;
			let province = parse_field::<String>(&row, 0, "province")?;
			let lat = parse_field::<f64>(&row, 1, "latitude")?;
			let lon = parse_field::<f64>(&row, 2, "longitude")?;
			Ok((province, LatLon { lat, lon }))
		})
		.collect()
}

/// Reads `[_, province, case_type, count, date, ...]` rows. Rows that are too
/// short or whose count is not a non-negative integer are skipped.
pub(crate) fn load_raw_records(path: &Path) -> Result<Vec<RawRecord>> {
	let mut reader = headerless_reader(path)?;
	let mut skipped = 0usize;
	let mut records = Vec::<RawRecord>::new();

	for each in reader.records() {
		let row = each?;
		let count = match row.get(RAW_COUNT).and_then(parse_count) {
			Some(found) if row.len() > RAW_DATE => found,
			_ => {
				skipped += 1;
				continue;
			}
		};

		records.push(RawRecord {
			province: row[RAW_PROVINCE].trim().to_string(),
			case_type: row[RAW_CASE_TYPE].trim().to_string(),
			count,
			date: parse_date(&row[RAW_DATE])?,
		});
	}

	if skipped > 0 {
		tracing::warn!(
			"Skipped {} malformed rows in \"{}\"",
			skipped,
			path.display()
		);
	}
	tracing::info!("Loaded {} raw rows from \"{}\"", records.len(), path.display());

	Ok(records)
}

/// Turns dates into day offsets from the earliest row and attaches the
/// relative coordinates of each province. Output is grouped by province
/// (in name order) and sorted by day within each province.
pub(crate) fn clean_records(raw: Vec<RawRecord>, table: &CoordinateTable) -> Result<Vec<Record>> {
	let first_date = match raw.iter().map(|each| each.date).min() {
		Some(found) => found,
		None => return Ok(Vec::new()),
	};
	tracing::info!("First date: {}", first_date);

	let relative = normalize_coordinates(raw.iter().map(|each| each.province.as_str()), table)?;

	let mut names = HashMap::<String, Arc<String>>::new();
	let mut intern = |name: &str| {
		names
			.entry(name.to_string())
			.or_insert_with(|| Arc::new(name.to_string()))
			.clone()
	};

	let mut records = raw
		.iter()
		.map(|each| {
			let coordinate = relative
				.get(&each.province)
				.ok_or_else(|| PipelineError::MissingCoordinate(each.province.clone()))?;

			Ok(Record {
				province: intern(&each.province),
				case_type: intern(&each.case_type),
				count: each.count,
				day_offset: day_offset(first_date, each.date),
				relative_lat: coordinate.lat,
				relative_lon: coordinate.lon,
			})
		})
		.collect::<Result<Vec<_>>>()?;

	records.sort_by(|a, b| {
		a.province
			.cmp(&b.province)
			.then(a.day_offset.cmp(&b.day_offset))
	});

	Ok(records)
}

/// Writes `[index, province, case_type, count, day_offset, rel_lat, rel_lon]`
pub(crate) fn write_clean_records(path: &Path, records: &[Record]) -> Result<()> {
	create_parent_dir(path)?;
	let mut writer = csv::Writer::from_path(path)?;

	for (index, each) in records.iter().enumerate() {
		writer.write_record([
			index.to_string(),
			each.province.to_string(),
			each.case_type.to_string(),
			each.count.to_string(),
			each.day_offset.to_string(),
			each.relative_lat.to_string(),
			each.relative_lon.to_string(),
		])?;
	}

	writer.flush()?;
	Ok(())
}

/// Reads the clean file back, keeping only rows of `case_type`
pub(crate) fn read_clean_records(path: &Path, case_type: &str) -> Result<Vec<Record>> {
	let mut reader = headerless_reader(path)?;
	let mut names = HashMap::<String, Arc<String>>::new();
	let mut records = Vec::<Record>::new();

	for each in reader.records() {
		let row = each?;
		if row.len() <= CLEAN_LON {
			return Err(PipelineError::MalformedRow {
				line: line_of(&row),
				reason: format!("expected 7 columns, found {}", row.len()),
			});
		}

		if row[CLEAN_CASE_TYPE].trim() != case_type {
			continue;
		}

		let province = parse_field::<String>(&row, CLEAN_PROVINCE, "province")?;
		let province = names
			.entry(province.clone())
			.or_insert_with(|| Arc::new(province))
			.clone();
		let case_type_name = names
			.entry(case_type.to_string())
			.or_insert_with(|| Arc::new(case_type.to_string()))
			.clone();

		records.push(Record {
			province,
			case_type: case_type_name,
			count: parse_field(&row, CLEAN_COUNT, "count")?,
			day_offset: parse_field(&row, CLEAN_DAY, "day offset")?,
			relative_lat: parse_field(&row, CLEAN_LAT, "relative latitude")?,
			relative_lon: parse_field(&row, CLEAN_LON, "relative longitude")?,
		});
	}

	tracing::info!(
		"Read {} \"{}\" rows from \"{}\"",
		records.len(),
		case_type,
		path.display()
	);

	Ok(records)
}

/// Raw file plus coordinate table in, clean file out. Returns the row count.
pub(crate) fn clean_dataset(raw: &Path, coordinates: &Path, output: &Path) -> Result<usize> {
	let table = load_coordinate_table(coordinates)?;
	let records = clean_records(load_raw_records(raw)?, &table)?;
	write_clean_records(output, &records)?;

	tracing::info!("Wrote {} clean rows to \"{}\"", records.len(), output.display());
	Ok(records.len())
}

pub(crate) fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
	create_parent_dir(path)?;
	let writer = BufWriter::new(fs::File::create(path)?);
	serde_json::to_writer(writer, value)?;
	Ok(())
}

pub(crate) fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
	let reader = std::io::BufReader::new(fs::File::open(path)?);
	Ok(serde_json::from_reader(reader)?)
}

fn create_parent_dir(path: &Path) -> Result<()> {
	if let Some(parent) = path.parent().filter(|found| !found.as_os_str().is_empty()) {
		fs::create_dir_all(parent)?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::BTreeMap;

	const RAW: &str = "\
id,province,case_type,value,date
1,conakry,confirmed cases,3,2014-03-24
2,gueckedou,confirmed cases,7,2014-03-22
3,gueckedou,confirmed cases,n/a,2014-03-23
4,conakry,deaths,1,2014-03-25
5,macenta,confirmed cases,2,2014-03-26
6,short row
";

	const COORDINATES: &str = "\
conakry,9.5,-13.7
gueckedou,8.5,-10.1
macenta,8.5,-9.5
";

	fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
		let path = dir.join(name);
		fs::write(&path, content).unwrap();
		path
	}

	#[test]
	fn raw_loader_skips_malformed_rows() {
		let dir = tempfile::tempdir().unwrap();
		let records = load_raw_records(&write(dir.path(), "raw.csv", RAW)).unwrap();

		assert_eq!(records.len(), 4);
		assert_eq!(records[0].province, "conakry");
		assert_eq!(records[1].count, 7);
	}

	#[test]
	fn clean_round_trip_keeps_day_offsets_and_coordinates() {
		let dir = tempfile::tempdir().unwrap();
		let raw = write(dir.path(), "raw.csv", RAW);
		let coordinates = write(dir.path(), "latlon.csv", COORDINATES);
		let output = dir.path().join("out").join("clean.csv");

		assert_eq!(clean_dataset(&raw, &coordinates, &output).unwrap(), 4);

		let confirmed = read_clean_records(&output, "confirmed cases").unwrap();
		assert_eq!(confirmed.len(), 3);

		let by_province = confirmed
			.iter()
			.map(|each| (each.province.as_str(), each))
			.collect::<BTreeMap<_, _>>();
		assert_eq!(by_province["gueckedou"].day_offset, 0);
		assert_eq!(by_province["conakry"].day_offset, 2);
		assert_eq!(by_province["macenta"].day_offset, 4);

		// lat {9.5, 8.5, 8.5}: mean 26.5/3, scale 2
		let expected_lat = 2.0 * (9.5 - 26.5 / 3.0);
		assert!((by_province["conakry"].relative_lat - expected_lat).abs() < 1e-9);
		// lon {-13.7, -10.1, -9.5}: mean -11.1, scale 2 / 4.2
		let expected_lon = 2.0 / 4.2 * (-9.5 + 11.1);
		assert!((by_province["macenta"].relative_lon - expected_lon).abs() < 1e-9);

		let deaths = read_clean_records(&output, "deaths").unwrap();
		assert_eq!(deaths.len(), 1);
		assert_eq!(deaths[0].day_offset, 3);
	}

	#[test]
	fn clean_fails_on_unknown_province() {
		let dir = tempfile::tempdir().unwrap();
		let raw = write(dir.path(), "raw.csv", RAW);
		let coordinates = write(dir.path(), "latlon.csv", "conakry,9.5,-13.7\ngueckedou,8.5,-10.1\n");

		let error = clean_dataset(&raw, &coordinates, &dir.path().join("clean.csv")).unwrap_err();
		assert!(matches!(error, PipelineError::MissingCoordinate(name) if name == "macenta"));
	}

	#[test]
	fn short_clean_row_is_rejected() {
		let dir = tempfile::tempdir().unwrap();
		let clean = write(dir.path(), "clean.csv", "0,conakry,confirmed cases,3,2\n");

		assert!(matches!(
			read_clean_records(&clean, "confirmed cases"),
			Err(PipelineError::MalformedRow { line: 1, .. })
		));
	}

	#[test]
	fn coordinate_header_is_reported_by_line() {
		let dir = tempfile::tempdir().unwrap();
		let coordinates = write(dir.path(), "latlon.csv", "province,lat,lon\nconakry,9.5,-13.7\n");

		let error = load_coordinate_table(&coordinates).unwrap_err();
		assert!(matches!(error, PipelineError::MalformedRow { line: 1, .. }));
		let message = error.to_string();
		assert!(message.starts_with("Malformed row at line 1"));
		assert!(!message.contains("clean"));
	}

	#[test]
	fn json_artifacts_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("nested").join("map.json");
		let map = BTreeMap::from([(String::from("coyah"), LatLon { lat: 0.25, lon: -0.5 })]);

		save_json(&path, &map).unwrap();
		let loaded: BTreeMap<String, LatLon> = load_json(&path).unwrap();
		assert_eq!(loaded, map);
	}
}
