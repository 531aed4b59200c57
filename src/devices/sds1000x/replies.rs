//! Reply schema for the queries the scope answers.
//!
//! Every [`Setting`] knows the query that reads it, the pattern its reply must match and the unit
//! of the number in it.  A reply that doesn't fit the pattern decodes to `None`, never to a
//! partial number.

use std::fmt;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Serialize, Deserialize};

use super::Channel;

// Plain decimal or SCPI scientific notation, e.g. 1000.5, 5.00E-04, -2.4e+01
macro_rules! num { () => { r"([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)" } }

lazy_static! {
	static ref IDN_RE: Regex  = Regex::new(r"([^,]+),([^,]+),([^,]+),([^,\s]+)").unwrap();
	static ref TDIV_RE: Regex = Regex::new(concat!(r"TDIV\s+", num!(), r"\s*S")).unwrap();
	static ref VDIV_RE: Regex = Regex::new(concat!(r"C(\d):VDIV\s+", num!(), r"\s*V")).unwrap();
	static ref OFST_RE: Regex = Regex::new(concat!(r"C(\d):OFST\s+", num!(), r"\s*V")).unwrap();
	static ref SARA_RE: Regex = Regex::new(concat!(r"SARA\s+", num!(), r"\s*([kMG]?)Sa/s")).unwrap();
	static ref CYMT_RE: Regex = Regex::new(concat!(r"CYMT\s+", num!(), r"\s*([mkMG]?)Hz")).unwrap();
	static ref PAVA_RE: Regex = Regex::new(concat!(r"C(\d):PAVA\s+MAX,\s*", num!(), r"\s*V")).unwrap();
	static ref TRMD_RE: Regex = Regex::new(r"TRMD\s+(AUTO|NORM|SINGLE|STOP)").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Unit { Seconds, Volts, SamplesPerSecond, Hertz }

impl Unit {
	pub fn symbol(&self) -> &'static str {
		match self {
			Unit::Seconds          => "s",
			Unit::Volts            => "V",
			Unit::SamplesPerSecond => "Sa/s",
			Unit::Hertz            => "Hz",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Setting {
	TimeDivision,
	VoltsDivision(Channel),
	Offset(Channel),
	SampleRate,
	Frequency,
	PeakVoltage(Channel),
}

// A decoded setting.  Only valid until the next write to the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
	pub setting: Setting,
	pub value: f64,
	pub unit: Unit,
}

impl fmt::Display for Reading {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.value, self.unit.symbol())
	}
}

fn si_prefix(p:&str) -> Option<f64> {
	match p {
		""  => Some(1.0),
		"m" => Some(1e-3),
		"k" => Some(1e3),
		"M" => Some(1e6),
		"G" => Some(1e9),
		_   => None,
	}
}

fn number(cap:&Captures, idx:usize) -> Option<f64> {
	cap.get(idx)?.as_str().parse::<f64>().ok().filter(|x| x.is_finite())
}

// `Cn:` replies must echo the channel that was asked about
fn on_channel(cap:&Captures, ch:Channel) -> Option<()> {
	let n:u8 = cap.get(1)?.as_str().parse().ok()?;
	if n == ch.number() { Some(()) } else { None }
}

impl Setting {

	pub fn command(&self) -> String {
		match self {
			Setting::TimeDivision      => "TDIV?".to_owned(),
			Setting::VoltsDivision(ch) => format!("{}:VDIV?", ch),
			Setting::Offset(ch)        => format!("{}:OFST?", ch),
			Setting::SampleRate        => "SARA?".to_owned(),
			Setting::Frequency         => "CYMT?".to_owned(),
			Setting::PeakVoltage(ch)   => format!("{}:PAVA? MAX", ch),
		}
	}

	pub fn unit(&self) -> Unit {
		match self {
			Setting::TimeDivision      => Unit::Seconds,
			Setting::VoltsDivision(_)  => Unit::Volts,
			Setting::Offset(_)         => Unit::Volts,
			Setting::SampleRate        => Unit::SamplesPerSecond,
			Setting::Frequency         => Unit::Hertz,
			Setting::PeakVoltage(_)    => Unit::Volts,
		}
	}

	pub fn decode(&self, reply:&str) -> Option<f64> {
		match *self {
			Setting::TimeDivision => {
				let cap = TDIV_RE.captures(reply)?;
				number(&cap, 1)
			},
			Setting::VoltsDivision(ch) => {
				let cap = VDIV_RE.captures(reply)?;
				on_channel(&cap, ch)?;
				number(&cap, 2)
			},
			Setting::Offset(ch) => {
				let cap = OFST_RE.captures(reply)?;
				on_channel(&cap, ch)?;
				number(&cap, 2)
			},
			Setting::SampleRate => {
				let cap = SARA_RE.captures(reply)?;
				Some(number(&cap, 1)? * si_prefix(cap.get(2)?.as_str())?)
			},
			Setting::Frequency => {
				let cap = CYMT_RE.captures(reply)?;
				Some(number(&cap, 1)? * si_prefix(cap.get(2)?.as_str())?)
			},
			Setting::PeakVoltage(ch) => {
				let cap = PAVA_RE.captures(reply)?;
				on_channel(&cap, ch)?;
				number(&cap, 2)
			},
		}
	}

	pub fn reading(&self, reply:&str) -> Option<Reading> {
		self.decode(reply).map(|value| Reading{ setting: *self, value, unit: self.unit() })
	}

}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
	pub manufacturer: String,
	pub model: String,
	pub serial_num: String,
	pub fw_version: String,
}

impl Identity {
	pub fn decode(reply:&str) -> Option<Self> {
		let cap = IDN_RE.captures(reply.trim())?;
		let field = |i:usize| cap.get(i).map(|m| m.as_str().trim().to_owned());
		Some(Identity{ manufacturer: field(1)?, model: field(2)?, serial_num: field(3)?, fw_version: field(4)? })
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TriggerMode { Auto, Norm, Single, Stop }

impl TriggerMode {

	pub fn as_str(&self) -> &'static str {
		match self {
			TriggerMode::Auto   => "AUTO",
			TriggerMode::Norm   => "NORM",
			TriggerMode::Single => "SINGLE",
			TriggerMode::Stop   => "STOP",
		}
	}

	pub fn decode(reply:&str) -> Option<Self> {
		let cap = TRMD_RE.captures(reply)?;
		match cap.get(1)?.as_str() {
			"AUTO"   => Some(TriggerMode::Auto),
			"NORM"   => Some(TriggerMode::Norm),
			"SINGLE" => Some(TriggerMode::Single),
			"STOP"   => Some(TriggerMode::Stop),
			_        => None,
		}
	}

}
