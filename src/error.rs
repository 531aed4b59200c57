use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::devices::sds1000x::replies::Setting;

// A set command that didn't reach the instrument.  The setting is unchanged as far as we know.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid level: {command:?} was not delivered")]
pub struct InvalidLevel {
	pub command: String,
}

#[derive(Debug, Error)]
pub enum ScopeError {
	#[error("no instrument detected at {0}")]
	NotFound(String),
	#[error("could not read {0:?} from the instrument")]
	MissingSetting(Setting),
	#[error("waveform transfer failed")]
	TransferFailed,
	#[error("need at least 2 samples with increasing time, got {0}")]
	TooFewSamples(usize),
	#[error("time and voltage lengths differ ({time} vs {voltage})")]
	LengthMismatch { time: usize, voltage: usize },
	#[error("file size too large: {path} has {samples} samples (limit {limit})")]
	TraceTooLarge { path: PathBuf, samples: usize, limit: usize },
	#[error("config error: {0}")]
	Config(#[from] serde_json::Error),
	#[error("trace file error: {0}")]
	Csv(#[from] csv::Error),
	#[error("failed to render plot: {0}")]
	Plot(String),
	#[error(transparent)]
	Io(#[from] io::Error),
}

impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>> for ScopeError {
	fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
		ScopeError::Plot(format!("{:?}", value))
	}
}
