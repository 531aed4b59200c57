#![allow(dead_code)]

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::io::{self, Error, ErrorKind};
use std::rc::Rc;
use std::time::Duration;

use scopectl::link::Link;
use scopectl::SDS1000X;

pub const IDN:&str = "Siglent Technologies,SDS1104X-E,SDSMMEBQ4R5668,8.2.6.1.37R9\n";

/// A `Link` that answers from a fixed table and records every command written to it.
#[derive(Default)]
pub struct ScriptedLink {
	replies: HashMap<String, Vec<u8>>,
	failing: HashSet<String>,
	pending: Option<String>,
	pub written: Vec<String>,
	pub reads: usize,
	pub closed: Rc<Cell<bool>>,
}

impl ScriptedLink {

	pub fn new() -> Self {
		let mut link = Self::default();
		link.reply("*IDN?", IDN);
		link
	}

	pub fn reply(&mut self, cmd:&str, reply:&str) -> &mut Self {
		self.replies.insert(cmd.to_owned(), reply.as_bytes().to_vec());
		self
	}

	pub fn reply_bytes(&mut self, cmd:&str, reply:Vec<u8>) -> &mut Self {
		self.replies.insert(cmd.to_owned(), reply);
		self
	}

	/// Writing `cmd` fails like a dropped connection would
	pub fn fail_on(&mut self, cmd:&str) -> &mut Self {
		self.failing.insert(cmd.to_owned());
		self
	}

}

impl Link for ScriptedLink {

	fn write(&mut self, data:&[u8]) -> io::Result<()> {
		let cmd = String::from_utf8_lossy(data).into_owned();
		self.written.push(cmd.clone());
		if self.failing.contains(&cmd) {
			return Err(Error::new(ErrorKind::BrokenPipe, format!("scripted failure on {}", cmd)));
		}
		self.pending = Some(cmd);
		Ok(())
	}

	fn read(&mut self) -> io::Result<Vec<u8>> {
		self.reads += 1;
		let cmd = self.pending.take().ok_or_else(|| Error::new(ErrorKind::Other, "read without a query"))?;
		self.replies.get(&cmd).cloned().ok_or_else(|| Error::new(ErrorKind::TimedOut, format!("no reply to {}", cmd)))
	}

	fn close(&mut self) -> io::Result<()> {
		self.closed.set(true);
		Ok(())
	}

}

pub fn session(link:ScriptedLink) -> SDS1000X<ScriptedLink> {
	SDS1000X::from_link(link, Duration::from_secs(0)).expect("scripted scope should identify itself")
}

/// Commands written after the `*IDN?` handshake
pub fn commands(scope:&SDS1000X<ScriptedLink>) -> Vec<&str> {
	scope.link().written.iter().skip(1).map(|s| s.as_str()).collect()
}

/// `Cn:WF? DAT2` reply carrying `samples` in a `#9` block
pub fn waveform_reply(samples:&[u8]) -> Vec<u8> {
	let mut raw = format!("C1:WF DAT2,#9{:09}", samples.len()).into_bytes();
	raw.extend_from_slice(samples);
	raw.extend_from_slice(b"\n\n");
	raw
}
