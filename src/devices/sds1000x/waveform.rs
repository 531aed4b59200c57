
use std::str;

use crate::trace::Trace;

// Leading bytes of a `Cn:WF? DAT2` reply when the block header can't be parsed
pub const FALLBACK_HEADER_LEN:usize = 22;
// Trailing bytes dropped in the same case
pub const FALLBACK_TRAILER_LEN:usize = 3;

// ADC codes above 127 are negative, offset by 255 rather than 256.
pub fn decode_code(code:u8) -> i16 {
	let c = code as i16;
	if c > 127 { c - 255 } else { c }
}

pub fn code_to_voltage(code:u8, vdiv:f64, offset:f64) -> f64 {
	(decode_code(code) as f64) * (vdiv / 25.0) - offset
}

// `#<n><n length digits>` somewhere in the header
fn definite_length_block(raw:&[u8]) -> Option<(usize, usize)> {
	let hash = raw.iter().position(|b| *b == b'#')?;
	let n_digits = (*raw.get(hash + 1)? as char).to_digit(10)? as usize;
	if n_digits == 0 { return None; }

	let digits = raw.get(hash + 2 .. hash + 2 + n_digits)?;
	let length:usize = str::from_utf8(digits).ok()?.parse().ok()?;
	Some((hash + 2 + n_digits, length))
}

// Sample bytes of a waveform transfer reply.
// The reply is `C1:WF DAT2,#9000001400<samples>\n\n`.  When the `#9` length block is present the
// payload is exactly the declared length (as much of it as arrived).  Otherwise the fixed framing
// applies: skip 22 header bytes and stop 3 bytes before the end.
pub fn frame_payload(raw:&[u8]) -> &[u8] {
	match definite_length_block(raw) {
		Some((start, length)) if start <= raw.len() => {
			let end = (start + length).min(raw.len());
			&raw[start..end]
		},
		_ => {
			if raw.len() < FALLBACK_HEADER_LEN + FALLBACK_TRAILER_LEN { return &[]; }
			&raw[FALLBACK_HEADER_LEN .. raw.len() - FALLBACK_TRAILER_LEN]
		},
	}
}

pub fn decode_trace(payload:&[u8], vdiv:f64, offset:f64, sample_rate:f64) -> Trace {
	let voltage:Vec<f64> = payload.iter().map(|c| code_to_voltage(*c, vdiv, offset)).collect();
	let time:Vec<f64>    = (0..voltage.len()).map(|i| (i as f64) / sample_rate).collect();

	Trace::from_parts(time, voltage)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn frame(samples:&[u8]) -> Vec<u8> {
		let mut raw = format!("C1:WF DAT2,#9{:09}", samples.len()).into_bytes();
		raw.extend_from_slice(samples);
		raw.extend_from_slice(b"\n\n");
		raw
	}

	#[test]
	fn every_code_decodes() {
		for c in 0..=255u8 {
			let expected = if c <= 127 { c as i16 } else { c as i16 - 255 };
			assert_eq!(decode_code(c), expected);
		}
		assert_eq!(decode_code(255), 0);
		assert_eq!(decode_code(128), -127);
	}

	#[test]
	fn voltage_follows_decoded_value() {
		let mut codes:Vec<u8> = (0..=255u8).collect();
		codes.sort_by_key(|c| decode_code(*c));
		let volts:Vec<f64> = codes.iter().map(|c| code_to_voltage(*c, 2.0, 0.3)).collect();
		assert!(volts.windows(2).all(|w| w[0] <= w[1]));
	}

	#[test]
	fn code_200_at_one_volt_per_division() {
		assert!((code_to_voltage(200, 1.0, 0.0) - (-2.2)).abs() < 1e-12);
	}

	#[test]
	fn offset_is_subtracted() {
		assert!((code_to_voltage(25, 1.0, 0.5) - 0.5).abs() < 1e-12);
	}

	#[test]
	fn payload_uses_declared_length() {
		let raw = frame(&[1, 2, 3, 4, 5]);
		assert_eq!(raw.len(), 22 + 5 + 2);
		assert_eq!(frame_payload(&raw), &[1, 2, 3, 4, 5]);
	}

	#[test]
	fn truncated_block_keeps_what_arrived() {
		let mut raw = frame(&[9, 8, 7]);
		raw.truncate(22 + 2);
		assert_eq!(frame_payload(&raw), &[9, 8]);
	}

	#[test]
	fn fixed_framing_without_block_header() {
		let mut raw = vec![b'x'; 22];
		raw.extend_from_slice(&[10, 20, 30, 40]);
		raw.extend_from_slice(&[0, 0, 0]);
		assert_eq!(frame_payload(&raw), &[10, 20, 30, 40]);
		assert!(frame_payload(&[0u8; 10]).is_empty());
	}

	#[test]
	fn time_axis_from_sample_rate() {
		let trace = decode_trace(&[0, 25, 230], 1.0, 0.0, 1000.0);
		assert_eq!(trace.time(), &[0.0, 0.001, 0.002]);
		assert!((trace.voltage()[1] - 1.0).abs() < 1e-12);
		assert!((trace.voltage()[2] - (-1.0)).abs() < 1e-12);
	}
}
