
use std::io::{self, Read, Write, Error, ErrorKind};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use byteorder::{BigEndian, WriteBytesExt, ReadBytesExt};

use crate::xdr;
use super::{xdr_pack, xdr_unpack, LAST_FRAGMENT};

pub struct TcpClient {
	pub stream: TcpStream,
	pub prog: u32,
	pub vers: u32,
	pub lastxid: u32,
	pub packer: xdr::Packer,
	pub unpacker: xdr::Unpacker,
}

impl TcpClient {

	// `timeout` bounds the connect and every later read and write on the stream
	pub fn connect<A: ToSocketAddrs>(addr: A, prog: u32, vers: u32, timeout: Duration) -> io::Result<Self> {
		let sock_addr = addr.to_socket_addrs()?.next()
			.ok_or_else(|| Error::new(ErrorKind::AddrNotAvailable, "Host did not resolve to any address"))?;

		let stream = TcpStream::connect_timeout(&sock_addr, timeout)?;
		stream.set_read_timeout(Some(timeout))?;
		stream.set_write_timeout(Some(timeout))?;
		stream.set_nodelay(true)?;

		Ok(Self{ stream, prog, vers, lastxid: 0, packer: xdr::Packer::new(), unpacker: xdr::Unpacker::new() })
	}

	pub fn start_call(&mut self, prc:u32) -> io::Result<()> {
		self.lastxid = self.lastxid.wrapping_add(1);
		self.packer.reset();
		xdr_pack::pack_callheader(&mut self.packer, self.lastxid, self.prog, self.vers, prc)
	}

	pub fn do_call(&mut self) -> io::Result<()> {
		let call:&[u8] = self.packer.as_bytes();

		let mut send_bytes:Vec<u8> = Vec::with_capacity(call.len() + 4);
		send_bytes.write_u32::<BigEndian>(call.len() as u32 | LAST_FRAGMENT)?;
		send_bytes.extend_from_slice(call);
		self.stream.write_all(&send_bytes)?;

		loop {
			let reply = self.read_record()?;
			self.unpacker.reset(&reply);

			// Stale replies are dropped before their status is looked at, errors included
			let xid = xdr_unpack::unpack_reply_xid(&mut self.unpacker)?;
			if xid == self.lastxid {
				xdr_unpack::unpack_reply_status(&mut self.unpacker, xid)?;
				return Ok(());
			} else if xid < self.lastxid {
				// Reply to an earlier call that timed out on our side
				log::debug!("Discarding stale RPC reply xid={} (expected {})", xid, self.lastxid);
				continue;
			} else {
				return Err(Error::new(ErrorKind::InvalidData, "Somehow got a packet from the future"));
			}
		}
	}

	fn read_record(&mut self) -> io::Result<Vec<u8>> {
		let mut record:Vec<u8> = vec![];

		let mut last:bool = false;
		while !last {
			let marker:u32 = self.stream.read_u32::<BigEndian>()?;
			last = (marker & LAST_FRAGMENT) != 0;

			let n = (marker & !LAST_FRAGMENT) as usize;
			let start = record.len();
			record.resize(start + n, 0);
			self.stream.read_exact(&mut record[start..])?;
		}

		Ok(record)
	}

}
