
// External data representation, a protocol for serializing data to be sent over the network
pub mod xdr;

// Remote procedure call, a protocol build on top of XDR to provide something like C-style function calls over the network
pub mod rpc;

// A protocol using RPC that's meant to communicate with instruments like oscilloscopes, power supplies, waveform generators, etc
pub mod vxi11;

// Byte-level request/response channel to an instrument, implemented by the VXI-11 core client
pub mod link;

// VISA resource strings and the lookup of instruments behind them
pub mod visa;

pub mod config;
pub mod error;

// Module for devices that implement the VXI11 protocol
pub mod devices;

// Acquired traces, their CSV files, and what can be done with them offline
pub mod trace;
pub mod fourier;
pub mod plot;

pub use config::Config;
pub use error::{InvalidLevel, ScopeError};
pub use devices::sds1000x::{probe, Channel, SDS1000X};
