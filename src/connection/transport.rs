use std::env;
use std::ffi::OsStr;
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::net::UnixStream;

use crate::error::{Error, ErrorKind, Result};

const ENV_SESSION_BUS: &str = "DBUS_SESSION_BUS_ADDRESS";
const ENV_SYSTEM_BUS: &str = "DBUS_SYSTEM_BUS_ADDRESS";
const DEFAULT_SYSTEM_BUS: &str = "unix:path=/var/run/dbus/system_bus_socket";

/// A Unix-domain socket carrying a D-Bus session.
pub struct Transport {
    stream: UnixStream,
}

impl Transport {
    /// Connect to the session bus.
    ///
    /// The address is taken from the `DBUS_SESSION_BUS_ADDRESS`
    /// environment variable.
    pub fn session_bus() -> Result<Self> {
        Self::from_env(ENV_SESSION_BUS, None)
    }

    /// Connect to the system bus.
    ///
    /// The address is taken from the `DBUS_SYSTEM_BUS_ADDRESS` environment
    /// variable, falling back to the well-known address
    /// `unix:path=/var/run/dbus/system_bus_socket`.
    pub fn system_bus() -> Result<Self> {
        Self::from_env(ENV_SYSTEM_BUS, Some(DEFAULT_SYSTEM_BUS))
    }

    /// Construct a transport directly over a connected stream.
    pub fn from_std(stream: UnixStream) -> Self {
        Self { stream }
    }

    fn from_env(env: &str, default: Option<&str>) -> Result<Self> {
        let value;

        let address: &OsStr = match env::var_os(env) {
            Some(address) => {
                value = address;
                value.as_os_str()
            }
            None => match default {
                Some(default) => default.as_ref(),
                None => return Err(Error::new(ErrorKind::MissingBus)),
            },
        };

        let stream = match parse_address(address.as_bytes())? {
            Address::Unix(path) => UnixStream::connect(OsStr::from_bytes(path))?,
        };

        Ok(Self::from_std(stream))
    }

    pub(crate) fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        self.stream.set_nonblocking(nonblocking)
    }
}

impl Read for Transport {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for Transport {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

impl AsRawFd for Transport {
    #[inline]
    fn as_raw_fd(&self) -> RawFd {
        self.stream.as_raw_fd()
    }
}

enum Address<'a> {
    Unix(&'a [u8]),
}

fn parse_address(bytes: &[u8]) -> Result<Address<'_>> {
    let Some(at) = bytes.iter().position(|&b| b == b'=') else {
        return Err(Error::new(ErrorKind::InvalidAddress));
    };

    let (head, tail) = bytes.split_at(at);

    match head {
        b"unix:path" => Ok(Address::Unix(&tail[1..])),
        _ => Err(Error::new(ErrorKind::InvalidAddress)),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_address, Address};

    #[test]
    fn addresses() {
        assert!(matches!(
            parse_address(b"unix:path=/run/user/1000/bus"),
            Ok(Address::Unix(b"/run/user/1000/bus"))
        ));
        assert!(parse_address(b"tcp:host=localhost,port=1234").is_err());
        assert!(parse_address(b"unix").is_err());
    }
}
