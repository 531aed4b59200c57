//! Auto-scaling of one channel to the signal on it.

use serde::Serialize;

use crate::config::AutoFitConfig;
use crate::link::Link;

use super::{Channel, SDS1000X};
use super::levels::{self, Level};

// What `fit_wave` read and what it wrote.  The `*_set` fields are only `Some` when the write was
// delivered.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FitReport {
	pub frequency: Option<f64>,
	pub peak_voltage: Option<f64>,
	pub time_division: Option<&'static Level>,
	pub volts_division_set: Option<f64>,
	pub trigger_level_set: Option<f64>,
	pub armed: bool,
}

// Scales `ch` so one period spans `cfg.divisions` horizontal divisions and the peak fills the
// screen, then arms a single trigger at the peak.
// Runs each step once, in order.  Nothing is rolled back if a later step fails; a rejected write
// is logged and the routine carries on with the next one.
pub fn fit_wave<L: Link>(scope:&mut SDS1000X<L>, ch:Channel, cfg:&AutoFitConfig) -> FitReport {
	let mut report = FitReport::default();

	report.frequency = scope.frequency();

	// Measure the peak with a range that won't clip
	if let Err(e) = scope.set_volts_division(ch, cfg.safe_vdiv) {
		log::warn!("{}", e);
	}
	report.peak_voltage = scope.peak_voltage(ch);

	// Negative readings go on to the timebase lookup, which has nothing for them
	let freq = match report.frequency {
		Some(f) if f != 0.0 => f,
		other => {
			log::warn!("No usable frequency on {} ({:?}), leaving the timebase alone", ch, other);
			return report;
		}
	};

	let per_div = (1.0 / freq) / cfg.divisions;
	match levels::match_tdiv(per_div) {
		Some(level) => match scope.set_time_division(level.value) {
			Ok(()) => {
				log::info!("{}: {} Hz, time base {}", ch, freq, level);
				report.time_division = Some(level);
			},
			Err(e) => log::warn!("{}", e),
		},
		None => log::warn!("{:e} s/div is outside the time base table, leaving it unchanged", per_div),
	}

	match report.peak_voltage {
		Some(peak) => {
			match scope.set_volts_division(ch, peak) {
				Ok(()) => report.volts_division_set = Some(peak),
				Err(e) => log::warn!("{}", e),
			}
			match scope.set_trigger_level(ch, peak) {
				Ok(()) => report.trigger_level_set = Some(peak),
				Err(e) => log::warn!("{}", e),
			}
		},
		None => log::warn!("No peak voltage on {}, vertical scale stays at {} V/div", ch, cfg.safe_vdiv),
	}

	match scope.arm_single() {
		Ok(()) => report.armed = true,
		Err(e) => log::warn!("{}", e),
	}

	report
}
