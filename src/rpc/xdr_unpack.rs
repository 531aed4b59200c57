
use std::io::{self, Error, ErrorKind};

use crate::xdr::Unpacker;
use crate::rpc::{REPLY, MSG_DENIED, RPC_MISMATCH, AUTH_ERROR, MSG_ACCEPTED, PROG_UNAVAIL, PROG_MISMATCH, PROC_UNAVAIL, GARBAGE_ARGS, SUCCESS};

fn err(msg:&str) -> io::Error { Error::new(ErrorKind::Other, msg) }

pub struct ReplyHeader {
	pub xid: u32,
	pub verf_flavor: i32,
}

fn skip_auth(unpacker:&mut Unpacker) -> io::Result<i32> {
	let flavor:i32 = unpacker.unpack_enum()?;
	unpacker.unpack_variable_len_opaque()?;
	Ok(flavor)
}

pub fn unpack_reply_xid(unpacker:&mut Unpacker) -> io::Result<u32> { unpacker.unpack_u32() }

// Everything after the xid.  Leaves the unpacker positioned at the procedure's results on success
pub fn unpack_reply_status(unpacker:&mut Unpacker, xid:u32) -> io::Result<ReplyHeader> {
	if unpacker.unpack_enum()? != REPLY { return Err(err("Expected REPLY message type")); }

	match unpacker.unpack_enum()? {
		MSG_ACCEPTED => { },
		MSG_DENIED => {
			return match unpacker.unpack_enum()? {
				RPC_MISMATCH => {
					let lo = unpacker.unpack_u32()?;
					let hi = unpacker.unpack_u32()?;
					Err(Error::new(ErrorKind::Other, format!("Message denied: RPC version mismatch (server supports {}..{})", lo, hi)))
				},
				AUTH_ERROR => {
					let stat = unpacker.unpack_u32()?;
					Err(Error::new(ErrorKind::PermissionDenied, format!("Message denied: auth error {}", stat)))
				},
				_ => Err(err("Message denied for an unknown reason")),
			}
		},
		_ => return Err(err("Neither MSG_DENIED nor MSG_ACCEPTED in reply")),
	}

	let verf_flavor = skip_auth(unpacker)?;

	match unpacker.unpack_enum()? {
		SUCCESS       => Ok(ReplyHeader{ xid, verf_flavor }),
		PROG_UNAVAIL  => Err(err("Program unavailable")),
		PROG_MISMATCH => {
			let lo = unpacker.unpack_u32()?;
			let hi = unpacker.unpack_u32()?;
			Err(Error::new(ErrorKind::Other, format!("Program version mismatch (server supports {}..{})", lo, hi)))
		},
		PROC_UNAVAIL  => Err(err("Procedure unavailable")),
		GARBAGE_ARGS  => Err(err("Server could not decode arguments")),
		_             => Err(err("Call failed for unknown reason")),
	}
}

pub fn unpack_replyheader(unpacker:&mut Unpacker) -> io::Result<ReplyHeader> {
	let xid = unpack_reply_xid(unpacker)?;
	unpack_reply_status(unpacker, xid)
}
