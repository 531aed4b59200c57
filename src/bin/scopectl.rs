
use std::error::Error;
use std::path::PathBuf;
use std::process;

use structopt::StructOpt;

use scopectl::{probe, Channel, Config, ScopeError, SDS1000X};
use scopectl::devices::sds1000x::autofit::fit_wave;
use scopectl::devices::sds1000x::levels::{find_level, Level, TDIV_LEVELS, VDIV_LEVELS};
use scopectl::plot::plot_file;
use scopectl::trace::{save_trace, TraceName};

#[derive(Debug, StructOpt)]
#[structopt(name = "scopectl", about = "Siglent SDS1000X-E control over VXI-11")]
struct Opt {
	/// JSON config file; defaults apply to anything it leaves out
	#[structopt(long, parse(from_os_str))]
	config: Option<PathBuf>,
	/// VISA resource, e.g. TCPIP0::192.168.1.100::inst0::INSTR
	#[structopt(long)]
	resource: Option<String>,
	#[structopt(short, long)]
	debug: bool,
	#[structopt(subcommand)]
	cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
	/// Check whether the scope answers
	Probe {},
	/// Show the current settings of channel 1
	Status {
		#[structopt(long)]
		json: bool,
	},
	/// Apply front-panel levels, e.g. --vdiv "500 mV" --tdiv "2 us"
	Set {
		#[structopt(long)]
		vdiv: Option<String>,
		#[structopt(long)]
		tdiv: Option<String>,
	},
	/// Save what channel 1 shows to a CSV file
	Acquire {
		/// File name, defaults to a timestamp
		#[structopt(long)]
		name: Option<String>,
		#[structopt(long, parse(from_os_str))]
		dir: Option<PathBuf>,
	},
	/// Render a stored trace to PNG
	Plot {
		#[structopt(parse(from_os_str))]
		file: PathBuf,
		#[structopt(long)]
		fft: bool,
		/// Defaults to FILE with a .png extension
		#[structopt(long, parse(from_os_str))]
		out: Option<PathBuf>,
	},
	/// Fit one period of the channel 1 signal on screen and arm a single trigger
	Fit {},
}

fn connect(cfg:&Config) -> Result<SDS1000X, ScopeError> {
	probe(cfg).ok_or_else(|| {
		println!("No Scope!");
		ScopeError::NotFound(cfg.resource.clone())
	})
}

fn level(table:&'static [Level], label:&str, what:&str) -> Result<&'static Level, Box<dyn Error>> {
	find_level(table, label).ok_or_else(|| {
		let known:Vec<&str> = table.iter().map(|l| l.label).collect();
		format!("{:?} is not a {} level (one of {})", label, what, known.join(", ")).into()
	})
}

fn show(value:Option<f64>, unit:&str) -> String {
	match value {
		Some(v) => format!("{} {}", v, unit),
		None    => "?".to_owned(),
	}
}

fn run(opt:Opt) -> Result<(), Box<dyn Error>> {
	let mut cfg = match &opt.config {
		Some(path) => Config::load(path)?,
		None => Config::default(),
	};
	if let Some(resource) = opt.resource { cfg.resource = resource; }

	let ch = Channel::C1;

	match opt.cmd {
		Command::Probe {} => {
			match probe(&cfg) {
				Some(scope) => {
					let idn = scope.identity();
					println!("Found instrument: {} {}", idn.manufacturer, idn.model);
					println!("  serial {}, firmware {}", idn.serial_num, idn.fw_version);
				},
				None => println!("No Scope!"),
			}
		},
		Command::Status { json } => {
			let mut scope = connect(&cfg)?;
			let state = scope.state(ch);
			if json {
				println!("{}", serde_json::to_string_pretty(&state)?);
			} else {
				println!("{} {}", state.identity.manufacturer, state.identity.model);
				println!("  time/div     {}", show(state.time_division, "s"));
				println!("  sample rate  {}", show(state.sample_rate, "Sa/s"));
				println!("  frequency    {}", show(state.frequency, "Hz"));
				println!("  trigger      {}", state.trigger_mode.map(|m| m.as_str()).unwrap_or("?"));
				println!("  {} volts/div {}", ch, show(state.volts_division, "V"));
				println!("  {} offset    {}", ch, show(state.voltage_offset, "V"));
				println!("  {} peak      {}", ch, show(state.peak_voltage, "V"));
			}
		},
		Command::Set { vdiv, tdiv } => {
			let vdiv = vdiv.map(|l| level(&VDIV_LEVELS, &l, "volts/div")).transpose()?;
			let tdiv = tdiv.map(|l| level(&TDIV_LEVELS, &l, "time/div")).transpose()?;

			let mut scope = connect(&cfg)?;
			if let Some(l) = vdiv {
				scope.set_volts_division(ch, l.value)?;
				println!("{} volts/div set to {}", ch, l);
			}
			if let Some(l) = tdiv {
				scope.set_time_division(l.value)?;
				println!("time/div set to {}", l);
			}
		},
		Command::Acquire { name, dir } => {
			let dir = dir.unwrap_or_else(|| cfg.data_dir.clone());
			let name = match name {
				Some(n) => TraceName::Custom(n),
				None    => TraceName::Timestamp,
			};

			let mut scope = connect(&cfg)?;
			let trace = scope.acquire(ch)?;
			let path = save_trace(&dir, &name, &trace)?;
			println!("{}", path.display());
		},
		Command::Plot { file, fft, out } => {
			let out = out.unwrap_or_else(|| file.with_extension("png"));
			plot_file(&file, fft, &out, &cfg.plot)?;
			println!("{}", out.display());
		},
		Command::Fit {} => {
			let mut scope = connect(&cfg)?;
			let report = fit_wave(&mut scope, ch, &cfg.autofit);
			println!("{}", serde_json::to_string_pretty(&report)?);
		},
	}

	Ok(())
}

fn main() {
	let opt = Opt::from_args();

	let loglevel = if opt.debug {
		log::LevelFilter::Debug
	} else {
		log::LevelFilter::Info
	};

	env_logger::Builder::new()
		.filter_level(loglevel)
		.parse_default_env()
		.init();

	if let Err(e) = run(opt) {
		log::error!("{}", e);
		process::exit(1);
	}
}
