//! NIDs of the TCP socket driver (`socklnd`).

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::Serialize;

use crate::error::NidError;
use crate::{Nid, split_network};

/// A NID on a `tcp<N>` network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TcpNid {
    address: IpAddr,
    driver_instance: u32,
}

impl TcpNid {
    /// Driver name of the socket LND.
    pub const DRIVER: &'static str = "tcp";

    /// NID for `address` on network `tcp<driver_instance>`.
    pub fn new(address: &str, driver_instance: u32) -> Result<Self, NidError> {
        let address = address
            .trim()
            .parse()
            .map_err(|_| NidError::InvalidAddress(address.to_string()))?;
        Ok(Self::from_ip(address, driver_instance))
    }

    /// NID for an already parsed address.
    pub const fn from_ip(address: IpAddr, driver_instance: u32) -> Self {
        Self {
            address,
            driver_instance,
        }
    }

    /// The network instance number.
    pub const fn driver_instance(&self) -> u32 {
        self.driver_instance
    }
}

impl Nid for TcpNid {
    fn address(&self) -> IpAddr {
        self.address
    }

    fn driver(&self) -> &'static str {
        Self::DRIVER
    }

    fn lnet(&self) -> String {
        format!("{}{}", self.driver(), self.driver_instance)
    }
}

impl fmt::Display for TcpNid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.address, self.lnet())
    }
}

impl FromStr for TcpNid {
    type Err = NidError;

    /// Parses `10.0.0.1@tcp` or `10.0.0.1@tcp3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, net) = s
            .trim()
            .rsplit_once('@')
            .ok_or_else(|| NidError::MissingNetwork(s.to_string()))?;
        let (driver, instance) = split_network(net)?;
        if driver != Self::DRIVER {
            return Err(NidError::UnsupportedDriver(driver.to_string()));
        }
        Self::new(address, instance)
    }
}
