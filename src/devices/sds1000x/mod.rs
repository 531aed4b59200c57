
use std::fmt;
use std::ops::Drop;
use std::thread;
use std::time::Duration;

use serde::{Serialize, Deserialize};

use crate::config::Config;
use crate::error::{InvalidLevel, ScopeError};
use crate::link::Link;
use crate::trace::Trace;
use crate::visa::{Resource, ResourceManager};
use crate::vxi11::CoreClient;

pub mod autofit;
pub mod levels;
pub mod replies;
pub mod waveform;

use replies::{Identity, Reading, Setting, TriggerMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel(u8);

impl Channel {
	pub const C1:Channel = Channel(1);
	pub const C2:Channel = Channel(2);
	pub const C3:Channel = Channel(3);
	pub const C4:Channel = Channel(4);

	pub fn number(&self) -> u8 { self.0 }
}

impl fmt::Display for Channel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "C{}", self.0) }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct State {
	pub identity: Identity,
	pub time_division: Option<f64>,
	pub sample_rate: Option<f64>,
	pub frequency: Option<f64>,
	pub trigger_mode: Option<TriggerMode>,
	pub channel: Channel,
	pub volts_division: Option<f64>,
	pub voltage_offset: Option<f64>,
	pub peak_voltage: Option<f64>,
}

// One open session with an SDS1000X-E series scope.
// Every exchange is a blocking round trip.  The first transport failure marks the session
// invalid; after that reads return `None` and writes `Err(InvalidLevel)` without touching the
// link, and the caller is expected to probe again.
pub struct SDS1000X<L: Link = CoreClient> {
	link: L,
	tx_throttle_duration: Duration,
	identity: Identity,
	valid: bool,
}

pub fn probe(cfg:&Config) -> Option<SDS1000X<CoreClient>> {
	let resource = match Resource::parse(&cfg.resource) {
		Ok(r) => r,
		Err(e) => {
			log::warn!("{}", e);
			return None;
		}
	};

	let rm = ResourceManager::new(cfg.io_timeout()).portmapper_port(cfg.portmapper_port);

	match rm.list_resources(&resource) {
		Ok(found) if found.is_empty() => {
			log::warn!("No instrument detected! ({} advertises no VXI-11 devices)", resource);
			return None;
		},
		Ok(found) => log::debug!("Resources: {:?}", found.iter().map(|r| r.to_string()).collect::<Vec<_>>()),
		Err(e) => {
			log::warn!("No instrument detected! ({}: {})", resource, e);
			return None;
		}
	}

	let core = match rm.open(&resource) {
		Ok(core) => core,
		Err(e) => {
			log::warn!("No instrument detected! ({}: {})", resource, e);
			return None;
		}
	};

	match SDS1000X::from_link(core, cfg.tx_throttle()) {
		Some(scope) => {
			log::info!("Found instrument: {} {}", scope.identity.manufacturer, scope.identity.model);
			Some(scope)
		},
		None => {
			log::warn!("{} answered but didn't identify itself", resource);
			None
		}
	}
}

impl<L: Link> SDS1000X<L> {

	pub fn from_link(link:L, tx_throttle_duration:Duration) -> Option<Self> {
		let mut scope = Self{ link, tx_throttle_duration, identity: Identity::default(), valid: true };

		let reply = scope.query("*IDN?")?;
		scope.identity = Identity::decode(&reply)?;
		if !scope.identity.model.starts_with("SDS") {
			log::warn!("Connected to a {} {}, which doesn't look like an SDS scope", scope.identity.manufacturer, scope.identity.model);
		}

		Some(scope)
	}

	pub fn identity(&self) -> &Identity { &self.identity }
	pub fn is_valid(&self) -> bool { self.valid }
	pub fn link(&self) -> &L { &self.link }

	fn throttle(&self) {
		if self.tx_throttle_duration > Duration::from_secs(0) {
			thread::sleep(self.tx_throttle_duration);
		}
	}

	// Raw reply to `cmd`, or `None` if the session is (or just became) invalid.
	pub fn query_raw(&mut self, cmd:&str) -> Option<Vec<u8>> {
		if !self.valid { return None; }
		self.throttle();

		match self.link.ask(cmd.as_bytes()) {
			Ok(reply) => Some(reply),
			Err(e) => {
				log::warn!("{:?} failed: {}; session is no longer valid", cmd, e);
				self.valid = false;
				None
			}
		}
	}

	pub fn query(&mut self, cmd:&str) -> Option<String> {
		let reply = self.query_raw(cmd)?;
		let text = String::from_utf8_lossy(&reply).into_owned();
		log::debug!("{} -> {:?}", cmd, text.trim_end());
		Some(text)
	}

	pub fn send(&mut self, cmd:&str) -> Result<(), InvalidLevel> {
		let rejected = || InvalidLevel{ command: cmd.to_owned() };
		if !self.valid { return Err(rejected()); }
		self.throttle();

		log::debug!("{}", cmd);
		self.link.write(cmd.as_bytes()).map_err(|e| {
			log::warn!("{:?} failed: {}; session is no longer valid", cmd, e);
			self.valid = false;
			rejected()
		})
	}

	pub fn read(&mut self, setting:Setting) -> Option<Reading> {
		let reply = self.query(&setting.command())?;
		let reading = setting.reading(&reply);
		if reading.is_none() {
			log::warn!("Unexpected reply to {}: {:?}", setting.command(), reply.trim_end());
		}
		reading
	}

	fn value(&mut self, setting:Setting) -> Option<f64> { self.read(setting).map(|r| r.value) }

	pub fn time_division(&mut self) -> Option<f64>            { self.value(Setting::TimeDivision) }
	pub fn volts_division(&mut self, ch:Channel) -> Option<f64> { self.value(Setting::VoltsDivision(ch)) }
	pub fn offset(&mut self, ch:Channel) -> Option<f64>         { self.value(Setting::Offset(ch)) }
	pub fn sample_rate(&mut self) -> Option<f64>              { self.value(Setting::SampleRate) }
	pub fn frequency(&mut self) -> Option<f64>                { self.value(Setting::Frequency) }
	pub fn peak_voltage(&mut self, ch:Channel) -> Option<f64>   { self.value(Setting::PeakVoltage(ch)) }

	pub fn trigger_mode(&mut self) -> Option<TriggerMode> {
		let reply = self.query("TRMD?")?;
		TriggerMode::decode(&reply)
	}

	pub fn set_volts_division(&mut self, ch:Channel, volts:f64) -> Result<(), InvalidLevel> {
		self.send(&format!("{}:VDIV {:.2E}V", ch, volts))
	}

	pub fn set_time_division(&mut self, seconds:f64) -> Result<(), InvalidLevel> {
		self.send(&format!("TDIV {:.2E}S", seconds))
	}

	pub fn set_trigger_level(&mut self, ch:Channel, volts:f64) -> Result<(), InvalidLevel> {
		self.send(&format!("{}:TRLV {:.2E}V", ch, volts))
	}

	pub fn set_trigger_mode(&mut self, trmd:TriggerMode) -> Result<(), InvalidLevel> {
		self.send(&format!("TRMD {}", trmd.as_str()))
	}

	pub fn arm_single(&mut self) -> Result<(), InvalidLevel> { self.set_trigger_mode(TriggerMode::Single) }

	pub fn state(&mut self, ch:Channel) -> State {
		State {
			identity: self.identity.clone(),
			time_division: self.time_division(),
			sample_rate: self.sample_rate(),
			frequency: self.frequency(),
			trigger_mode: self.trigger_mode(),
			channel: ch,
			volts_division: self.volts_division(ch),
			voltage_offset: self.offset(ch),
			peak_voltage: self.peak_voltage(ch),
		}
	}

	pub fn acquire(&mut self, ch:Channel) -> Result<Trace, ScopeError> {
		let vdiv = self.volts_division(ch).ok_or(ScopeError::MissingSetting(Setting::VoltsDivision(ch)))?;
		let ofst = self.offset(ch).ok_or(ScopeError::MissingSetting(Setting::Offset(ch)))?;
		let sara = self.sample_rate()
			.filter(|s| *s > 0.0)
			.ok_or(ScopeError::MissingSetting(Setting::SampleRate))?;

		let raw:Vec<u8> = self.query_raw(&format!("{}:WF? DAT2", ch)).ok_or(ScopeError::TransferFailed)?;
		let payload:&[u8] = waveform::frame_payload(&raw);
		log::debug!("Waveform reply {} bytes, {} samples", raw.len(), payload.len());

		Ok(waveform::decode_trace(payload, vdiv, ofst, sara))
	}

	// Destroys the link.  The session is invalid afterwards either way.
	pub fn close(&mut self) {
		if !self.valid { return; }
		self.valid = false;
		if let Err(e) = self.link.close() {
			log::warn!("Unable to close link to {}: {}", self.identity.model, e);
		}
	}

}

impl<L: Link> Drop for SDS1000X<L> {

	fn drop(&mut self) { self.close(); }

}
