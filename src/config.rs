
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Serialize, Deserialize};

use crate::error::ScopeError;
use crate::rpc::port_mapping::PMAP_PORT;

pub const DEFAULT_RESOURCE:&str = "TCPIP0::192.168.1.100::inst0::INSTR";
pub const DEFAULT_TX_THROTTLE_DURATION_SEC:f32 = 0.1;
pub const DEFAULT_IO_TIMEOUT_MS:u64 = 10000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub resource: String,
	pub data_dir: PathBuf,
	// Pause before every exchange; the SDS firmware drops commands that arrive back to back
	pub tx_throttle_sec: f32,
	// VXI-11 I/O timeout passed to the instrument; socket timeouts are a little longer
	pub io_timeout_ms: u64,
	// Where the host's portmapper listens
	pub portmapper_port: u16,
	pub autofit: AutoFitConfig,
	pub plot: PlotConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoFitConfig {
	// Volts/division used while measuring the peak, large enough not to clip
	pub safe_vdiv: f64,
	pub divisions: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
	pub max_samples: usize,
	pub width: u32,
	pub height: u32,
	pub fft_max_hz: f64,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			resource: DEFAULT_RESOURCE.to_owned(),
			data_dir: PathBuf::from("data"),
			tx_throttle_sec: DEFAULT_TX_THROTTLE_DURATION_SEC,
			io_timeout_ms: DEFAULT_IO_TIMEOUT_MS,
			portmapper_port: PMAP_PORT,
			autofit: AutoFitConfig::default(),
			plot: PlotConfig::default(),
		}
	}
}

impl Default for AutoFitConfig {
	fn default() -> Self { Self{ safe_vdiv: 10.0, divisions: 7.0 } }
}

impl Default for PlotConfig {
	fn default() -> Self { Self{ max_samples: 2_000_000, width: 1280, height: 720, fft_max_hz: 2.0e6 } }
}

impl Config {

	pub fn load(path:&Path) -> Result<Self, ScopeError> {
		let text = fs::read_to_string(path)?;
		let cfg:Config = serde_json::from_str(&text)?;
		log::debug!("Loaded config from {}", path.display());
		Ok(cfg)
	}

	pub fn tx_throttle(&self) -> Duration {
		Duration::from_secs_f32(self.tx_throttle_sec.max(0.0))
	}

	pub fn io_timeout(&self) -> Duration {
		Duration::from_millis(self.io_timeout_ms.max(1))
	}

}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_fields_take_defaults() {
		let cfg:Config = serde_json::from_str(r#"{ "resource": "TCPIP0::10.0.0.5::INSTR", "autofit": { "divisions": 5.0 } }"#).unwrap();
		assert_eq!(cfg.resource, "TCPIP0::10.0.0.5::INSTR");
		assert_eq!(cfg.data_dir, PathBuf::from("data"));
		assert_eq!(cfg.autofit.divisions, 5.0);
		assert_eq!(cfg.autofit.safe_vdiv, 10.0);
		assert_eq!(cfg.plot.fft_max_hz, 2.0e6);
		assert_eq!(cfg.portmapper_port, 111);
	}

	#[test]
	fn zero_timeout_is_bumped() {
		let cfg = Config{ io_timeout_ms: 0, ..Config::default() };
		assert_eq!(cfg.io_timeout(), Duration::from_millis(1));
	}
}
