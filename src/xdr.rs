
use std::io::{self, Error, ErrorKind, Cursor};

use byteorder::{BigEndian, WriteBytesExt, ReadBytesExt};

fn err(msg:&str) -> io::Error { Error::new(ErrorKind::Other, msg) }

fn padding(n:usize) -> usize { (4 - (n % 4)) % 4 }

#[derive(Default)]
pub struct Packer {
	buff: Vec<u8>,
}

#[derive(Default)]
pub struct Unpacker {
	buff: Vec<u8>,
	pos: usize,
}

impl Packer {

	pub fn new() -> Self { Self::default() }

	pub fn reset(&mut self) { self.buff.clear(); }

	pub fn as_bytes(&self) -> &[u8] { &self.buff }

	pub fn pack_u32(&mut self, x:u32) -> io::Result<()> { self.buff.write_u32::<BigEndian>(x) }
	pub fn pack_i32(&mut self, x:i32) -> io::Result<()> { self.buff.write_i32::<BigEndian>(x) }
	pub fn pack_bool(&mut self, b:bool) -> io::Result<()> { self.pack_i32(if b { 1 } else { 0 }) }
	pub fn pack_enum(&mut self, x:i32) -> io::Result<()> { self.pack_i32(x) }

	pub fn pack_variable_len_opaque(&mut self, data:&[u8]) -> io::Result<()> {
		self.pack_u32(data.len() as u32)?;
		self.buff.extend_from_slice(data);
		self.buff.extend(std::iter::repeat(0u8).take(padding(data.len())));
		Ok(())
	}

	pub fn pack_string(&mut self, s:&str) -> io::Result<()> {
		if !s.is_ascii() { return Err(err("XDR strings must be ASCII")); }
		self.pack_variable_len_opaque(s.as_bytes())
	}

}

impl Unpacker {

	pub fn new() -> Self { Self::default() }

	pub fn reset(&mut self, data:&[u8]) {
		self.buff.clear();
		self.buff.extend_from_slice(data);
		self.pos = 0;
	}

	pub fn remaining(&self) -> usize { self.buff.len() - self.pos }
	pub fn all_data_consumed(&self) -> bool { self.remaining() == 0 }

	fn take(&mut self, n:usize) -> io::Result<&[u8]> {
		if n > self.remaining() {
			return Err(Error::new(ErrorKind::UnexpectedEof, "Tried to read past the end of the XDR buffer"));
		}
		let start = self.pos;
		self.pos += n;
		Ok(&self.buff[start..start + n])
	}

	pub fn unpack_u32(&mut self) -> io::Result<u32> { Cursor::new(self.take(4)?).read_u32::<BigEndian>() }
	pub fn unpack_i32(&mut self) -> io::Result<i32> { Cursor::new(self.take(4)?).read_i32::<BigEndian>() }

	// Whether an enum value is in range depends on the caller, so here it's just an i32
	pub fn unpack_enum(&mut self) -> io::Result<i32> { self.unpack_i32() }

	pub fn unpack_bool(&mut self) -> io::Result<bool> {
		match self.unpack_i32()? {
			0 => Ok(false),
			1 => Ok(true),
			_ => Err(err("Expected 0 or 1 for an XDR bool")),
		}
	}

	pub fn unpack_variable_len_opaque(&mut self) -> io::Result<Vec<u8>> {
		let n = self.unpack_u32()? as usize;
		let ans:Vec<u8> = self.take(n)?.to_vec();
		self.take(padding(n))?;
		Ok(ans)
	}

}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn opaque_is_padded_to_four_bytes() {
		let mut p = Packer::new();
		p.pack_variable_len_opaque(b"inst0").unwrap();
		assert_eq!(p.as_bytes(), &[0, 0, 0, 5, b'i', b'n', b's', b't', b'0', 0, 0, 0]);

		let mut u = Unpacker::new();
		u.reset(p.as_bytes());
		assert_eq!(u.unpack_variable_len_opaque().unwrap(), b"inst0".to_vec());
		assert!(u.all_data_consumed());
	}

	#[test]
	fn reading_past_the_end_is_an_error() {
		let mut u = Unpacker::new();
		u.reset(&[0, 0, 0]);
		assert_eq!(u.unpack_u32().unwrap_err().kind(), ErrorKind::UnexpectedEof);
	}

	#[test]
	fn bool_outside_zero_one_is_rejected() {
		let mut u = Unpacker::new();
		u.reset(&[0, 0, 0, 2]);
		assert!(u.unpack_bool().is_err());
	}

	#[test]
	fn non_ascii_strings_are_rejected() {
		let mut p = Packer::new();
		assert!(p.pack_string("inst\u{e9}").is_err());
	}
}
