mod common;

use scopectl::Channel;
use scopectl::config::AutoFitConfig;
use scopectl::devices::sds1000x::autofit::fit_wave;

use common::{commands, session, ScriptedLink};

const C1:Channel = Channel::C1;

#[test]
fn fits_one_period_and_arms_single() {
	let mut link = ScriptedLink::new();
	link.reply("CYMT?", "CYMT 1.00E+03Hz\n")
		.reply("C1:PAVA? MAX", "C1:PAVA MAX,2.00E+00V\n");
	let mut scope = session(link);

	let report = fit_wave(&mut scope, C1, &AutoFitConfig::default());

	// 1 ms period over 7 divisions is ~143 us/div, closest to 100 us
	assert_eq!(commands(&scope), vec![
		"CYMT?",
		"C1:VDIV 1.00E1V",
		"C1:PAVA? MAX",
		"TDIV 1.00E-4S",
		"C1:VDIV 2.00E0V",
		"C1:TRLV 2.00E0V",
		"TRMD SINGLE",
	]);
	assert_eq!(report.frequency, Some(1000.0));
	assert_eq!(report.peak_voltage, Some(2.0));
	assert_eq!(report.time_division.map(|l| l.label), Some("100 us"));
	assert_eq!(report.volts_division_set, Some(2.0));
	assert_eq!(report.trigger_level_set, Some(2.0));
	assert!(report.armed);
}

#[test]
fn without_frequency_only_the_safe_range_is_set() {
	let mut link = ScriptedLink::new();
	link.reply("CYMT?", "CYMT <10Hz\n")
		.reply("C1:PAVA? MAX", "C1:PAVA MAX,2.00E+00V\n");
	let mut scope = session(link);

	let report = fit_wave(&mut scope, C1, &AutoFitConfig::default());

	assert_eq!(commands(&scope), vec!["CYMT?", "C1:VDIV 1.00E1V", "C1:PAVA? MAX"]);
	assert_eq!(report.frequency, None);
	assert_eq!(report.time_division, None);
	assert_eq!(report.trigger_level_set, None);
	assert!(!report.armed);
	assert!(scope.is_valid());
}

#[test]
fn timebase_outside_the_table_is_left_alone() {
	let mut link = ScriptedLink::new();
	link.reply("CYMT?", "CYMT 1.00E-03Hz\n")
		.reply("C1:PAVA? MAX", "C1:PAVA MAX,5.00E-01V\n");
	let mut scope = session(link);

	let report = fit_wave(&mut scope, C1, &AutoFitConfig::default());

	let cmds = commands(&scope);
	assert!(cmds.iter().all(|c| !c.starts_with("TDIV ")));
	assert_eq!(&cmds[cmds.len() - 3..], &["C1:VDIV 5.00E-1V", "C1:TRLV 5.00E-1V", "TRMD SINGLE"]);
	assert_eq!(report.time_division, None);
	assert!(report.armed);
}

#[test]
fn safe_range_and_divisions_come_from_config() {
	let mut link = ScriptedLink::new();
	link.reply("CYMT?", "CYMT 1.60E+03Hz\n")
		.reply("C1:PAVA? MAX", "C1:PAVA MAX,1.00E+00V\n");
	let mut scope = session(link);

	let cfg = AutoFitConfig{ safe_vdiv: 5.0, divisions: 10.0 };
	let report = fit_wave(&mut scope, C1, &cfg);

	let cmds = commands(&scope);
	assert_eq!(cmds[1], "C1:VDIV 5.00E0V");
	// 625 us over 10 divisions is 62.5 us/div; over the default 7 it would be ~89 us/div
	assert!(cmds.contains(&"TDIV 5.00E-5S"));
	assert!(report.armed);
}

#[test]
fn missing_peak_skips_scaling_but_still_arms() {
	let mut link = ScriptedLink::new();
	link.reply("CYMT?", "CYMT 2.5kHz\n")
		.reply("C1:PAVA? MAX", "C1:PAVA MAX,****\n");
	let mut scope = session(link);

	let report = fit_wave(&mut scope, C1, &AutoFitConfig::default());

	let cmds = commands(&scope);
	assert_eq!(cmds.iter().filter(|c| c.starts_with("C1:VDIV ")).count(), 1);
	assert!(cmds.iter().all(|c| !c.starts_with("C1:TRLV")));
	assert!(report.time_division.is_some());
	assert_eq!(report.volts_division_set, None);
	assert!(report.armed);
}

#[test]
fn broken_link_stops_everything_after_it() {
	let mut link = ScriptedLink::new();
	link.reply("CYMT?", "CYMT 1.00E+03Hz\n")
		.fail_on("C1:VDIV 1.00E1V");
	let mut scope = session(link);

	let report = fit_wave(&mut scope, C1, &AutoFitConfig::default());

	assert_eq!(commands(&scope), vec!["CYMT?", "C1:VDIV 1.00E1V"]);
	assert_eq!(report.frequency, Some(1000.0));
	assert_eq!(report.peak_voltage, None);
	assert!(!report.armed);
	assert!(!scope.is_valid());
}

#[test]
fn negative_frequency_keeps_the_timebase_but_still_scales() {
	let mut link = ScriptedLink::new();
	link.reply("CYMT?", "CYMT -1.00E+03Hz\n")
		.reply("C1:PAVA? MAX", "C1:PAVA MAX,2.00E+00V\n");
	let mut scope = session(link);

	let report = fit_wave(&mut scope, C1, &AutoFitConfig::default());

	assert_eq!(commands(&scope), vec![
		"CYMT?",
		"C1:VDIV 1.00E1V",
		"C1:PAVA? MAX",
		"C1:VDIV 2.00E0V",
		"C1:TRLV 2.00E0V",
		"TRMD SINGLE",
	]);
	assert_eq!(report.frequency, Some(-1000.0));
	assert_eq!(report.time_division, None);
	assert!(report.armed);
}

#[test]
fn zero_frequency_counts_as_unavailable() {
	let mut link = ScriptedLink::new();
	link.reply("CYMT?", "CYMT 0.00E+00Hz\n")
		.reply("C1:PAVA? MAX", "C1:PAVA MAX,2.00E+00V\n");
	let mut scope = session(link);

	let report = fit_wave(&mut scope, C1, &AutoFitConfig::default());

	assert_eq!(commands(&scope), vec!["CYMT?", "C1:VDIV 1.00E1V", "C1:PAVA? MAX"]);
	assert!(!report.armed);
}
