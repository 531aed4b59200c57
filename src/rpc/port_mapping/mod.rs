
pub const PMAP_PROG:u32 = 100000;
pub const PMAP_VERS:u32 = 2;
pub const PMAP_PORT:u16 = 111;

pub const PMAPPROC_GETPORT:u32 = 3;     // (mapping) -> unsigned int
pub const PMAPPROC_DUMP:u32    = 4;     // (void) -> pmaplist

use std::io::{self, Error, ErrorKind};
use std::time::Duration;

use super::{IPPROTO_TCP, IPPROTO_UDP};
use super::xdr_pack;
use super::tcp_clients::TcpClient;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Protocol {
	TCP,
	UDP,
}

impl Protocol {
	pub fn to_u32(&self) -> u32 { match self {
		Protocol::TCP => IPPROTO_TCP,
		Protocol::UDP => IPPROTO_UDP,
	}}

	pub fn from_u32(x:u32) -> Option<Self> { match x {
		IPPROTO_TCP => Some(Protocol::TCP),
		IPPROTO_UDP => Some(Protocol::UDP),
		_           => None,
	}}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
	pub program: u32,
	pub version: u32,
	pub protocol: Protocol,
	pub port: u32,				// XDR carries it as a u32
}

pub struct TcpPortMapperClient {
	pub host: String,
	client: TcpClient,
}

impl TcpPortMapperClient {

	pub fn new(host:&str, timeout:Duration) -> io::Result<Self> { Self::with_port(host, PMAP_PORT, timeout) }

	// Anything other than 111 is only useful against a portmapper that isn't a real rpcbind
	pub fn with_port(host:&str, port:u16, timeout:Duration) -> io::Result<Self> {
		let client = TcpClient::connect((host, port), PMAP_PROG, PMAP_VERS, timeout)?;
		Ok(Self{ host: host.to_owned(), client })
	}

	// Zero when the program isn't registered
	pub fn get_port(&mut self, m:&Mapping) -> io::Result<u32> {
		self.client.start_call(PMAPPROC_GETPORT)?;
		xdr_pack::pack_mapping(&mut self.client.packer, m.program, m.version, m.protocol.to_u32(), m.port)?;
		self.client.do_call()?;

		let ans:u32 = self.client.unpacker.unpack_u32()?;

		if self.client.unpacker.all_data_consumed() { Ok(ans) }
		else { Err(Error::new(ErrorKind::InvalidData, "Data unexpectedly left over in unpacker after unpacking port")) }
	}

	// Registrations over protocols other than TCP and UDP are left out
	pub fn dump(&mut self) -> io::Result<Vec<Mapping>> {
		self.client.start_call(PMAPPROC_DUMP)?;
		self.client.do_call()?;

		let unpacker = &mut self.client.unpacker;
		let mut ans:Vec<Mapping> = vec![];
		while unpacker.unpack_bool()? {
			let program:u32 = unpacker.unpack_u32()?;
			let version:u32 = unpacker.unpack_u32()?;
			let prot:u32    = unpacker.unpack_u32()?;
			let port:u32    = unpacker.unpack_u32()?;
			match Protocol::from_u32(prot) {
				Some(protocol) => ans.push(Mapping{ program, version, protocol, port }),
				None => log::debug!("Skipping registration of program {} over unknown protocol {}", program, prot),
			}
		}

		Ok(ans)
	}

}
