//! LNet network identifiers.
//!
//! A NID names an endpoint on a Lustre network as `address@network`, where
//! the network is a driver name plus an instance number: `10.0.0.1@tcp1`.
//! Only the TCP socket driver is modelled.
//!
//! ```
//! use lustre_lnet::{Nid, parse_nid};
//!
//! let nid = parse_nid("192.168.1.10@tcp2")?;
//! assert_eq!(nid.driver(), "tcp");
//! assert_eq!(nid.lnet(), "tcp2");
//! # Ok::<(), lustre_lnet::NidError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod tcp;

use std::fmt;
use std::net::IpAddr;

pub use error::NidError;
pub use tcp::TcpNid;

/// An LNet network identifier.
pub trait Nid: fmt::Display + fmt::Debug + Send + Sync {
    /// Network address of the endpoint.
    fn address(&self) -> IpAddr;

    /// LND driver name, e.g. `tcp`.
    fn driver(&self) -> &'static str;

    /// LNet network name: driver plus instance, e.g. `tcp0`.
    fn lnet(&self) -> String;
}

/// Split `tcp1` into `("tcp", 1)` and `o2ib3` into `("o2ib", 3)`. A missing
/// number means instance 0.
pub(crate) fn split_network(net: &str) -> Result<(&str, u32), NidError> {
    let driver = net.trim_end_matches(|c: char| c.is_ascii_digit());
    if driver.is_empty() {
        return Err(NidError::InvalidNetwork(net.to_string()));
    }
    let instance = &net[driver.len()..];
    let instance = if instance.is_empty() {
        0
    } else {
        instance
            .parse()
            .map_err(|_| NidError::InvalidNetwork(net.to_string()))?
    };
    Ok((driver, instance))
}

/// Parse `address@network` into the NID type of its driver.
pub fn parse_nid(s: &str) -> Result<Box<dyn Nid>, NidError> {
    let (_, net) = s
        .trim()
        .rsplit_once('@')
        .ok_or_else(|| NidError::MissingNetwork(s.to_string()))?;
    let (driver, _) = split_network(net)?;
    match driver {
        TcpNid::DRIVER => Ok(Box::new(s.parse::<TcpNid>()?)),
        other => Err(NidError::UnsupportedDriver(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_network() {
        assert_eq!(split_network("tcp").unwrap(), ("tcp", 0));
        assert_eq!(split_network("tcp12").unwrap(), ("tcp", 12));
        assert_eq!(split_network("o2ib3").unwrap(), ("o2ib", 3));
        assert_eq!(split_network("tcp1x").unwrap(), ("tcp1x", 0));
        assert!(matches!(split_network("12"), Err(NidError::InvalidNetwork(_))));
        assert!(matches!(split_network("tcp99999999999"), Err(NidError::InvalidNetwork(_))));
        assert!(matches!(split_network(""), Err(NidError::InvalidNetwork(_))));
    }

    #[test]
    fn test_parse_nid_dispatches_tcp() {
        let nid = parse_nid("10.0.0.1@tcp").unwrap();
        assert_eq!(nid.address(), "10.0.0.1".parse::<IpAddr>().unwrap());
        assert_eq!(nid.to_string(), "10.0.0.1@tcp0");
    }

    #[test]
    fn test_parse_nid_rejects_other_drivers() {
        assert!(matches!(parse_nid("10.0.0.1@o2ib"), Err(NidError::UnsupportedDriver(d)) if d == "o2ib"));
        assert!(matches!(parse_nid("10.0.0.1"), Err(NidError::MissingNetwork(_))));
    }
}
