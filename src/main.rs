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

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
	let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
	tracing_subscriber::fmt()
		.with_env_filter(project_outbreak_lib::log_filter(directives.as_deref()))
		.init();

	project_outbreak_lib::run()
}
