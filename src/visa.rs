//! VISA resource addresses on top of the VXI-11 transport.
//!
//! Only LAN instruments (`TCPIP[board]::host[::device][::INSTR]`) can be reached.  USB, GPIB and
//! serial resources parse but are reported as unsupported.

use std::fmt;
use std::io::{self, Error, ErrorKind};
use std::time::Duration;

use crate::link::Link;
use crate::rpc::port_mapping::{Protocol, TcpPortMapperClient, PMAP_PORT};
use crate::vxi11::{CoreClient, DEVICE_CORE_PROG};

pub const DEFAULT_DEVICE:&str = "inst0";

#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
	Tcpip { board: u16, host: String, device: String },
	Unsupported { interface: String },
}

impl Resource {

	pub fn parse(address:&str) -> io::Result<Self> {
		let parts:Vec<&str> = address.trim().split("::").collect();
		let interface = parts[0].to_ascii_uppercase();

		if !interface.starts_with("TCPIP") {
			if interface.is_empty() { return Err(Error::new(ErrorKind::InvalidInput, "Empty VISA resource address")); }
			return Ok(Resource::Unsupported{ interface });
		}

		let board:u16 = match &interface["TCPIP".len()..] {
			"" => 0,
			n  => n.parse().map_err(|_| Error::new(ErrorKind::InvalidInput, format!("Bad board number in {:?}", address)))?,
		};

		let mut rest:&[&str] = &parts[1..];
		if let Some(last) = rest.last() {
			if last.eq_ignore_ascii_case("INSTR") { rest = &rest[..rest.len() - 1]; }
		}

		match rest {
			[host]         if !host.is_empty() => Ok(Resource::Tcpip{ board, host: host.to_string(), device: DEFAULT_DEVICE.to_owned() }),
			[host, device] if !host.is_empty() => Ok(Resource::Tcpip{ board, host: host.to_string(), device: device.to_string() }),
			_ => Err(Error::new(ErrorKind::InvalidInput, format!("Unrecognized VISA resource {:?}", address))),
		}
	}

}

impl fmt::Display for Resource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Resource::Tcpip{ board, host, device } => write!(f, "TCPIP{}::{}::{}::INSTR", board, host, device),
			Resource::Unsupported{ interface }     => write!(f, "{}::INSTR", interface),
		}
	}
}

pub struct ResourceManager {
	timeout: Duration,
	pmap_port: u16,
}

impl ResourceManager {

	pub fn new(timeout:Duration) -> Self { Self{ timeout, pmap_port: PMAP_PORT } }

	pub fn portmapper_port(self, pmap_port:u16) -> Self { Self{ pmap_port, ..self } }

	// Instrument resources the host behind `resource` advertises, one per VXI-11 device core
	// registration in its portmapper.  The device name can't be discovered this way, so each
	// entry reuses the one from `resource`.
	pub fn list_resources(&self, resource:&Resource) -> io::Result<Vec<Resource>> {
		let (board, host, device) = match resource {
			Resource::Tcpip{ board, host, device } => (*board, host, device),
			Resource::Unsupported{ interface } => {
				return Err(Error::new(ErrorKind::Other, format!("{} instruments need a vendor VISA library", interface)));
			}
		};

		let mut pmap = TcpPortMapperClient::with_port(host, self.pmap_port, self.timeout)?;
		let found = pmap.dump()?
			.into_iter()
			.filter(|m| m.program == DEVICE_CORE_PROG && m.protocol == Protocol::TCP)
			.map(|_| Resource::Tcpip{ board, host: host.clone(), device: device.clone() })
			.collect();

		Ok(found)
	}

	pub fn open(&self, resource:&Resource) -> io::Result<CoreClient> {
		match resource {
			Resource::Tcpip{ host, device, .. } => {
				let mut core = CoreClient::with_portmapper(host, self.pmap_port, self.timeout)?;
				if let Err(e) = core.create_link(device) {
					let _ = core.close();
					return Err(e);
				}
				Ok(core)
			},
			Resource::Unsupported{ interface } => {
				Err(Error::new(ErrorKind::Other, format!("{} instruments need a vendor VISA library", interface)))
			}
		}
	}

}
