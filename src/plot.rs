//! PNG rendering of stored traces, optionally with their spectrum underneath.

use std::ops::Range;
use std::path::Path;

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::config::PlotConfig;
use crate::error::ScopeError;
use crate::fourier::{fourier, Spectrum};
use crate::trace::{load_trace, Trace, TIME_HEADER, VOLTAGE_HEADER};

// Axis range covering every finite value with a little headroom
fn span<I: Iterator<Item = f64>>(values:I, pad_frac:f64) -> Range<f64> {
	let (lo, hi) = values.filter(|v| v.is_finite())
		.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

	if !(lo <= hi) { return 0.0..1.0; }
	if hi - lo <= f64::EPSILON * hi.abs().max(1.0) { return (lo - 0.5)..(hi + 0.5); }

	let pad = (hi - lo) * pad_frac;
	(lo - pad)..(hi + pad)
}

fn draw_pane<DB, I>(area:&DrawingArea<DB, Shift>, x_desc:&str, y_desc:&str, x_range:Range<f64>, y_range:Range<f64>, points:I)
	-> Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
	DB: DrawingBackend,
	I: IntoIterator<Item = (f64, f64)>,
{
	let mut chart = ChartBuilder::on(area)
		.margin(15)
		.x_label_area_size(40)
		.y_label_area_size(70)
		.build_cartesian_2d(x_range, y_range)?;

	chart.configure_mesh()
		.x_desc(x_desc)
		.y_desc(y_desc)
		.light_line_style(&BLACK.mix(0.05))
		.draw()?;

	chart.draw_series(LineSeries::new(points, &BLUE))?;
	Ok(())
}

// Draws `trace` to the PNG at `out`.  With a spectrum the image is split in two, time domain on
// top and `0..cfg.fft_max_hz` of the spectrum below.
pub fn render(trace:&Trace, spectrum:Option<&Spectrum>, out:&Path, cfg:&PlotConfig) -> Result<(), ScopeError> {
	if trace.is_empty() { return Err(ScopeError::TooFewSamples(0)); }

	let root = BitMapBackend::new(out, (cfg.width, cfg.height)).into_drawing_area();
	root.fill(&WHITE)?;

	let time_range = span(trace.time().iter().copied(), 0.0);
	let volt_range = span(trace.voltage().iter().copied(), 0.05);

	match spectrum {
		None => {
			draw_pane(&root, TIME_HEADER, VOLTAGE_HEADER, time_range, volt_range, trace.samples())?;
		},
		Some(s) => {
			let panes = root.split_evenly((2, 1));
			draw_pane(&panes[0], TIME_HEADER, VOLTAGE_HEADER, time_range, volt_range, trace.samples())?;

			let in_view = || s.frequency.iter().copied().zip(s.amplitude.iter().copied())
				.filter(|(f, _)| *f <= cfg.fft_max_hz);
			let amp_max = in_view().map(|(_, a)| a).fold(0.0, f64::max);
			let amp_range = 0.0..(if amp_max > 0.0 { amp_max * 1.05 } else { 1.0 });

			draw_pane(&panes[1], "Frequency (Hz)", "Amplitude (arb.)", 0.0..cfg.fft_max_hz, amp_range, in_view())?;
		},
	}

	root.present()?;
	log::info!("Wrote plot of {} samples to {}", trace.len(), out.display());
	Ok(())
}

pub fn plot_file(path:&Path, with_fft:bool, out:&Path, cfg:&PlotConfig) -> Result<(), ScopeError> {
	let trace = load_trace(path)?;
	if trace.len() > cfg.max_samples {
		return Err(ScopeError::TraceTooLarge{ path: path.to_owned(), samples: trace.len(), limit: cfg.max_samples });
	}

	let spectrum = if with_fft { Some(fourier(trace.time(), trace.voltage())?) } else { None };
	render(&trace, spectrum.as_ref(), out, cfg)
}
