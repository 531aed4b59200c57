
use std::io;

// A message-based connection to one instrument.  Writes carry one complete command and reads
// return one complete response, whatever framing the transport needs underneath.
pub trait Link {
	fn write(&mut self, data:&[u8]) -> io::Result<()>;
	fn read(&mut self) -> io::Result<Vec<u8>>;

	fn ask(&mut self, data:&[u8]) -> io::Result<Vec<u8>> {
		self.write(data)?;
		self.read()
	}

	fn close(&mut self) -> io::Result<()> { Ok(()) }
}
