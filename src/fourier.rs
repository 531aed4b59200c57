
use rustfft::FFTplanner;
use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;

use crate::error::ScopeError;

#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
	pub frequency: Vec<f64>,
	pub amplitude: Vec<f64>,
}

// Amplitude spectrum of `voltage`, sampled at the interval between the first two `time` values.
// Bins `0..n/2` only, scaled by `2/n`, no window and no zero padding.
pub fn fourier(time:&[f64], voltage:&[f64]) -> Result<Spectrum, ScopeError> {
	let n = time.len();
	if n != voltage.len() {
		return Err(ScopeError::LengthMismatch{ time: n, voltage: voltage.len() });
	}
	if n < 2 { return Err(ScopeError::TooFewSamples(n)); }

	let dt = time[1] - time[0];
	if !(dt > 0.0) || !dt.is_finite() { return Err(ScopeError::TooFewSamples(n)); }

	let mut input:Vec<Complex<f64>>  = voltage.iter().map(|v| Complex{ re: *v, im: 0.0 }).collect();
	let mut output:Vec<Complex<f64>> = vec![Complex::zero(); n];

	let mut planner = FFTplanner::new(false);
	let fft = planner.plan_fft(n);
	fft.process(&mut input, &mut output);

	let half = n / 2;
	let scale = 2.0 / (n as f64);
	let frequency:Vec<f64> = (0..half).map(|k| (k as f64) / ((n as f64) * dt)).collect();
	let amplitude:Vec<f64> = output[..half].iter().map(|x| scale * x.norm()).collect();

	Ok(Spectrum{ frequency, amplitude })
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::f64::consts::PI;

	#[test]
	fn sine_shows_up_at_its_frequency() {
		let n = 1000;
		let rate = 1.0e6;
		let f0 = 50.0e3;
		let time:Vec<f64> = (0..n).map(|i| i as f64 / rate).collect();
		let voltage:Vec<f64> = time.iter().map(|t| 1.5 * (2.0 * PI * f0 * t).sin()).collect();

		let s = fourier(&time, &voltage).unwrap();
		assert_eq!(s.frequency.len(), n / 2);
		assert_eq!(s.amplitude.len(), n / 2);
		assert!((s.frequency[1] - 1000.0).abs() < 1e-6);

		let (peak_idx, peak_amp) = s.amplitude.iter().enumerate()
			.fold((0, 0.0), |best, (i, a)| if *a > best.1 { (i, *a) } else { best });
		assert!((s.frequency[peak_idx] - f0).abs() < 1e-6);
		assert!((peak_amp - 1.5).abs() < 1e-9);
	}

	#[test]
	fn dc_bin_is_twice_the_mean() {
		let s = fourier(&[0.0, 1.0, 2.0, 3.0], &[1.0, 1.0, 1.0, 1.0]).unwrap();
		assert_eq!(s.frequency, vec![0.0, 0.25]);
		assert!((s.amplitude[0] - 2.0).abs() < 1e-12);
		assert!(s.amplitude[1].abs() < 1e-12);
	}

	#[test]
	fn needs_two_samples() {
		assert!(fourier(&[0.0], &[1.0]).is_err());
		assert!(fourier(&[0.0, 0.0], &[1.0, 2.0]).is_err());
		assert!(fourier(&[0.0, 1.0], &[1.0]).is_err());
	}
}
