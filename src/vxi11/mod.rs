
// Device core
pub const DEVICE_CORE_PROG:u32  = 0x0607af;
pub const DEVICE_CORE_VERS:u32  = 1;
pub const CREATE_LINK:u32       = 10;
pub const DEVICE_WRITE:u32      = 11;
pub const DEVICE_READ:u32       = 12;
pub const DESTROY_LINK:u32      = 23;

pub const CLIENT_ID:i32 = 3333;
pub const DEFAULT_LOCK_TIMEOUT:u32 = 10000;

pub const OPERATION_FLAGS_END:i32 = 8;

// Reason bits in a device_read response
pub const REASON_REQCNT:i32 = 1;
pub const REASON_CHR:i32    = 2;
pub const REASON_END:i32    = 4;

use std::io::{self, Error, ErrorKind};
use std::time::Duration;

use crate::link::Link;
use crate::rpc::port_mapping::{TcpPortMapperClient, Mapping, Protocol, PMAP_PORT};
use crate::rpc::tcp_clients::TcpClient;

fn err(msg:&str) -> io::Error { Error::new(ErrorKind::Other, msg) }

fn device_error(code:i32) -> io::Error {
	match code {
		1  => err("Syntax error"),
		3  => err("Device not accessible"),
		4  => err("Invalid link identifier"),
		5  => err("Parameter error"),
		9  => err("Out of resources"),
		11 => err("Device locked by another link"),
		15 => Error::new(ErrorKind::TimedOut, "I/O timeout"),
		17 => err("I/O error"),
		21 => err("Invalid address"),
		23 => err("Abort"),
		_  => Error::new(ErrorKind::Other, format!("Unknown VXI-11 device error {}", code)),
	}
}

pub mod xdr_pack;

const SOCKET_TIMEOUT_MARGIN:Duration = Duration::from_secs(1);

fn socket_timeout(io_timeout:Duration) -> Duration { io_timeout + SOCKET_TIMEOUT_MARGIN }

pub struct CoreClient {
	client: TcpClient,
	io_timeout_ms: u32,
	opt_link: Option<DeviceLink>,
}

struct DeviceLink {
	link_id: i32,
	max_recv_size: u32,
}

impl CoreClient {

	fn get_link(&self) -> io::Result<&DeviceLink> {
		self.opt_link.as_ref().ok_or_else(|| err("No link"))
	}

	pub fn new(host:&str, timeout:Duration) -> io::Result<Self> { Self::with_portmapper(host, PMAP_PORT, timeout) }

	// `timeout` is the instrument's I/O timeout; the socket waits a little longer so the device's own
	// timeout error arrives before ours
	pub fn with_portmapper(host:&str, pmap_port:u16, timeout:Duration) -> io::Result<Self> {
		let mut pmap_client = TcpPortMapperClient::with_port(host, pmap_port, timeout)?;

		let mapping = Mapping {
			program: DEVICE_CORE_PROG,
			version: DEVICE_CORE_VERS,
			protocol: Protocol::TCP,
			port: 0,
		};

		let port = pmap_client.get_port(&mapping)?;
		if port == 0 || port > u16::MAX as u32 {
			return Err(Error::new(ErrorKind::NotFound, "VXI-11 device core is not registered on this host"));
		}

		let client = TcpClient::connect((host, port as u16), DEVICE_CORE_PROG, DEVICE_CORE_VERS, socket_timeout(timeout))?;
		let io_timeout_ms = timeout.as_millis().min(u32::MAX as u128) as u32;

		Ok(CoreClient{ client, io_timeout_ms, opt_link: None })
	}

	pub fn create_link(&mut self, device:&str) -> io::Result<()> {
		if self.opt_link.is_some() {
			return Err(err("Already connected to a link"));
		}

		self.client.start_call(CREATE_LINK)?;
		xdr_pack::pack_create_link_parms(&mut self.client.packer, CLIENT_ID, false, DEFAULT_LOCK_TIMEOUT, device)?;
		self.client.do_call()?;

		let error:i32         = self.client.unpacker.unpack_i32()?;
		let link_id:i32       = self.client.unpacker.unpack_i32()?;
		let _abort_port:u32   = self.client.unpacker.unpack_u32()?;
		let max_recv_size:u32 = self.client.unpacker.unpack_u32()?;

		if error != 0 { return Err(device_error(error)); }

		log::debug!("Created VXI-11 link {} to {:?} (max_recv_size={})", link_id, device, max_recv_size);
		self.opt_link = Some(DeviceLink{ link_id, max_recv_size });
		Ok(())
	}

	fn write_chunk(&mut self, link_id:i32, chunk:&[u8], flags:i32) -> io::Result<()> {
		self.client.start_call(DEVICE_WRITE)?;
		xdr_pack::pack_device_write_parms(&mut self.client.packer, link_id, self.io_timeout_ms, DEFAULT_LOCK_TIMEOUT, flags, chunk)?;
		self.client.do_call()?;

		let error:i32 = self.client.unpacker.unpack_i32()?;
		let size:u32  = self.client.unpacker.unpack_u32()?;

		if error != 0 { return Err(device_error(error)); }
		if size as usize != chunk.len() {
			return Err(err("Number of bytes in confirmation doesn't match number of bytes sent"));
		}
		Ok(())
	}

	pub fn destroy_link(&mut self) -> io::Result<()> {
		let link_id = match self.opt_link.take() {
			Some(link) => link.link_id,
			None       => return Err(err("No link to destroy")),
		};

		self.client.start_call(DESTROY_LINK)?;
		xdr_pack::pack_device_link(&mut self.client.packer, link_id)?;
		self.client.do_call()?;

		match self.client.unpacker.unpack_i32()? {
			0    => Ok(()),
			code => Err(device_error(code)),
		}
	}

}

impl Link for CoreClient {

	// Commands longer than the device's receive buffer go out in pieces, END set on the last one
	fn write(&mut self, data:&[u8]) -> io::Result<()> {
		let (link_id, max_recv_size) = {
			let link = self.get_link()?;
			(link.link_id, link.max_recv_size.max(1) as usize)
		};

		let mut chunks = data.chunks(max_recv_size).peekable();
		if chunks.peek().is_none() {
			return self.write_chunk(link_id, &[], OPERATION_FLAGS_END);
		}
		while let Some(chunk) = chunks.next() {
			let flags = if chunks.peek().is_none() { OPERATION_FLAGS_END } else { 0 };
			self.write_chunk(link_id, chunk, flags)?;
		}
		Ok(())
	}

	// A waveform transfer comes back over several device_read calls; keep going until END
	fn read(&mut self) -> io::Result<Vec<u8>> {
		let link_id = self.get_link()?.link_id;
		let mut ans:Vec<u8> = vec![];

		loop {
			self.client.start_call(DEVICE_READ)?;
			xdr_pack::pack_device_read_parms(&mut self.client.packer, link_id, std::u32::MAX, self.io_timeout_ms, DEFAULT_LOCK_TIMEOUT, 0, 0)?;
			self.client.do_call()?;

			let error:i32  = self.client.unpacker.unpack_i32()?;
			let reason:i32 = self.client.unpacker.unpack_i32()?;
			let data:Vec<u8> = self.client.unpacker.unpack_variable_len_opaque()?;

			if error != 0 { return Err(device_error(error)); }

			ans.extend_from_slice(&data);

			if reason & REASON_END != 0 {
				return Ok(ans);
			} else if reason & (REASON_REQCNT | REASON_CHR) == 0 {
				return Err(err("Expected one of three reason bits to be set"));
			}
		}
	}

	fn close(&mut self) -> io::Result<()> {
		if self.opt_link.is_some() { self.destroy_link() } else { Ok(()) }
	}

}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn socket_outlasts_the_device_timeout() {
		let io = Duration::from_millis(10000);
		assert!(socket_timeout(io) > io);
		assert_eq!(socket_timeout(io), Duration::from_millis(11000));
	}

	#[test]
	fn device_timeout_keeps_its_kind() {
		assert_eq!(device_error(15).kind(), ErrorKind::TimedOut);
		assert!(device_error(99).to_string().contains("99"));
	}
}
