//! Decoded acquisitions and their CSV files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Serialize, Deserialize};

use crate::error::ScopeError;

pub const TIME_HEADER:&str    = "Time (s)";
pub const VOLTAGE_HEADER:&str = "Voltage (V)";

#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
	time: Vec<f64>,
	voltage: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
struct Row {
	#[serde(rename = "Time (s)")]
	time: f64,
	#[serde(rename = "Voltage (V)")]
	voltage: f64,
}

impl Trace {

	pub(crate) fn from_parts(time:Vec<f64>, voltage:Vec<f64>) -> Self {
		debug_assert_eq!(time.len(), voltage.len());
		Self{ time, voltage }
	}

	pub fn new(time:Vec<f64>, voltage:Vec<f64>) -> Result<Self, ScopeError> {
		if time.len() != voltage.len() {
			return Err(ScopeError::LengthMismatch{ time: time.len(), voltage: voltage.len() });
		}
		Ok(Self{ time, voltage })
	}

	pub fn time(&self) -> &[f64] { &self.time }
	pub fn voltage(&self) -> &[f64] { &self.voltage }
	pub fn len(&self) -> usize { self.time.len() }
	pub fn is_empty(&self) -> bool { self.time.is_empty() }

	pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
		self.time.iter().copied().zip(self.voltage.iter().copied())
	}

	pub fn write_csv<W: std::io::Write>(&self, wtr:W) -> Result<(), ScopeError> {
		let mut wtr = csv::Writer::from_writer(wtr);
		if self.is_empty() {
			wtr.write_record(&[TIME_HEADER, VOLTAGE_HEADER])?;
		}
		for (time, voltage) in self.samples() {
			wtr.serialize(Row{ time, voltage })?;
		}
		wtr.flush()?;
		Ok(())
	}

	pub fn read_csv<R: std::io::Read>(rdr:R) -> Result<Self, ScopeError> {
		let mut rdr = csv::Reader::from_reader(rdr);
		let mut time:Vec<f64> = vec![];
		let mut voltage:Vec<f64> = vec![];
		for row in rdr.deserialize() {
			let row:Row = row?;
			time.push(row.time);
			voltage.push(row.voltage);
		}
		Ok(Self{ time, voltage })
	}

}

// How an acquired trace file gets named
#[derive(Debug, Clone, PartialEq)]
pub enum TraceName {
	Timestamp,
	Custom(String),
}

impl TraceName {

	pub fn file_name(&self) -> String { self.file_name_at(Local::now()) }

	pub fn file_name_at(&self, now:DateTime<Local>) -> String {
		match self {
			TraceName::Timestamp => format!("{}.csv", now.format("%Y%m%d_%H%M%S")),
			TraceName::Custom(name) if name.ends_with(".csv") => name.clone(),
			TraceName::Custom(name) => format!("{}.csv", name),
		}
	}

}

pub fn save_trace(dir:&Path, name:&TraceName, trace:&Trace) -> Result<PathBuf, ScopeError> {
	fs::create_dir_all(dir)?;
	let path = dir.join(name.file_name());
	trace.write_csv(fs::File::create(&path)?)?;
	log::info!("Saved {} samples to {}", trace.len(), path.display());
	Ok(path)
}

pub fn load_trace(path:&Path) -> Result<Trace, ScopeError> {
	let trace = Trace::read_csv(fs::File::open(path)?)?;
	log::debug!("Loaded {} samples from {}", trace.len(), path.display());
	Ok(trace)
}
