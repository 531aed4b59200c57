
use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Level {
	pub label: &'static str,
	pub value: f64,
}

impl fmt::Display for Level {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label) }
}

const fn lvl(label:&'static str, value:f64) -> Level { Level{ label, value } }

pub static VDIV_LEVELS:[Level; 14] = [
	lvl("500 uV", 500.0e-6),
	lvl("1 mV",   1.0e-3),
	lvl("2 mV",   2.0e-3),
	lvl("5 mV",   5.0e-3),
	lvl("10 mV",  10.0e-3),
	lvl("20 mV",  20.0e-3),
	lvl("50 mV",  50.0e-3),
	lvl("100 mV", 100.0e-3),
	lvl("200 mV", 200.0e-3),
	lvl("500 mV", 500.0e-3),
	lvl("1 V",    1.0),
	lvl("2 V",    2.0),
	lvl("5 V",    5.0),
	lvl("10 V",   10.0),
];

pub static TDIV_LEVELS:[Level; 34] = [
	lvl("1 ns",   1.0e-9),
	lvl("2 ns",   2.0e-9),
	lvl("5 ns",   5.0e-9),
	lvl("10 ns",  10.0e-9),
	lvl("20 ns",  20.0e-9),
	lvl("50 ns",  50.0e-9),
	lvl("100 ns", 100.0e-9),
	lvl("200 ns", 200.0e-9),
	lvl("500 ns", 500.0e-9),
	lvl("1 us",   1.0e-6),
	lvl("2 us",   2.0e-6),
	lvl("5 us",   5.0e-6),
	lvl("10 us",  10.0e-6),
	lvl("20 us",  20.0e-6),
	lvl("50 us",  50.0e-6),
	lvl("100 us", 100.0e-6),
	lvl("200 us", 200.0e-6),
	lvl("500 us", 500.0e-6),
	lvl("1 ms",   1.0e-3),
	lvl("2 ms",   2.0e-3),
	lvl("5 ms",   5.0e-3),
	lvl("10 ms",  10.0e-3),
	lvl("20 ms",  20.0e-3),
	lvl("50 ms",  50.0e-3),
	lvl("100 ms", 100.0e-3),
	lvl("200 ms", 200.0e-3),
	lvl("500 ms", 500.0e-3),
	lvl("1 s",    1.0),
	lvl("2 s",    2.0),
	lvl("5 s",    5.0),
	lvl("10 s",   10.0),
	lvl("20 s",   20.0),
	lvl("50 s",   50.0),
	lvl("100 s",  100.0),
];

// Nearest allowed time/division for `t` seconds.
// Only values strictly between two table entries match; ties go to the lower entry.  A value
// equal to an entry, or outside the table, gives `None` and the caller should leave the
// timebase alone.
pub fn match_tdiv(t:f64) -> Option<&'static Level> {
	TDIV_LEVELS.windows(2)
		.find(|pair| pair[0].value < t && t < pair[1].value)
		.map(|pair| {
			let lower = (t - pair[0].value).abs();
			let upper = (t - pair[1].value).abs();
			if lower <= upper { &pair[0] } else { &pair[1] }
		})
}

pub fn find_level(table:&'static [Level], label:&str) -> Option<&'static Level> {
	let key:String = label.chars().filter(|c| !c.is_whitespace()).collect();
	table.iter().find(|l| {
		let candidate:String = l.label.chars().filter(|c| !c.is_whitespace()).collect();
		candidate.eq_ignore_ascii_case(&key)
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tables_are_strictly_ascending() {
		for table in &[&VDIV_LEVELS[..], &TDIV_LEVELS[..]] {
			assert!(table.windows(2).all(|p| p[0].value < p[1].value));
		}
		assert_eq!(VDIV_LEVELS[0].label, "500 uV");
		assert_eq!(VDIV_LEVELS[13].label, "10 V");
		assert_eq!(TDIV_LEVELS[0].label, "1 ns");
		assert_eq!(TDIV_LEVELS[33].label, "100 s");
	}

	#[test]
	fn three_ns_matches_two_ns() {
		assert_eq!(match_tdiv(3e-9).map(|l| l.label), Some("2 ns"));
	}

	#[test]
	fn closer_upper_entry_wins() {
		assert_eq!(match_tdiv(4e-9).map(|l| l.label), Some("5 ns"));
		assert_eq!(match_tdiv(0.9).map(|l| l.label), Some("1 s"));
	}

	#[test]
	fn tie_goes_to_lower_entry() {
		assert_eq!(match_tdiv(1.5).map(|l| l.label), Some("1 s"));
	}

	#[test]
	fn minimum_distance_everywhere_inside_the_table() {
		for pair in TDIV_LEVELS.windows(2) {
			for frac in &[0.1, 0.3, 0.6, 0.9] {
				let t = pair[0].value + frac * (pair[1].value - pair[0].value);
				let got = match_tdiv(t).unwrap();
				let best = if (t - pair[0].value).abs() <= (t - pair[1].value).abs() { pair[0] } else { pair[1] };
				assert_eq!(*got, best, "t={}", t);
			}
		}
	}

	#[test]
	fn boundaries_and_out_of_range_do_not_match() {
		assert!(match_tdiv(0.5e-9).is_none());
		assert!(match_tdiv(1.0e-9).is_none());
		assert!(match_tdiv(2.0e-9).is_none());
		assert!(match_tdiv(100.0).is_none());
		assert!(match_tdiv(1000.0).is_none());
		assert!(match_tdiv(0.0).is_none());
		assert!(match_tdiv(-1.0).is_none());
		assert!(match_tdiv(std::f64::NAN).is_none());
	}

	#[test]
	fn labels_resolve_loosely() {
		assert_eq!(find_level(&VDIV_LEVELS, "500mV").map(|l| l.value), Some(0.5));
		assert_eq!(find_level(&TDIV_LEVELS, " 2 NS ").map(|l| l.value), Some(2.0e-9));
		assert!(find_level(&VDIV_LEVELS, "3 V").is_none());
	}
}
