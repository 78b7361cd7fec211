//! Seed files: a fixed interface list installed via
//! [`InterfaceCache::update_interfaces`](crate::network::InterfaceCache::update_interfaces).
//!
//! ```toml
//! [[interface]]
//! name = "eth0"
//! index = 2
//! mtu = 1500
//! hardware_addr = "00:1a:2b:3c:4d:5e"
//! addresses = ["10.0.0.5/24", "fe80::1/64"]
//! flags = { up = true, broadcast = true, multicast = true, running = true }
//! ```

use std::collections::HashSet;
use std::path::Path;

use ipnetwork::IpNetwork;
use serde::Deserialize;

use super::ConfigError;
use crate::network::{HardwareAddr, Interface, InterfaceFlags};

/// Root structure of a seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    /// Seeded interfaces, in order
    #[serde(default, rename = "interface")]
    pub interfaces: Vec<SeedInterface>,
}

/// One `[[interface]]` entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedInterface {
    /// Interface name
    pub name: String,

    /// Interface index
    pub index: u32,

    /// MTU (default: 0)
    #[serde(default)]
    pub mtu: u32,

    /// Flags (default: none set)
    #[serde(default)]
    pub flags: InterfaceFlags,

    /// Hardware address as colon-separated hex
    pub hardware_addr: Option<String>,

    /// Address prefixes in CIDR notation; a bare address is a host prefix
    #[serde(default)]
    pub addresses: Vec<String>,
}

impl SeedFile {
    /// Loads a seed file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses a seed file from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    /// Validates every entry and converts the file into interfaces.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry has an empty name, a malformed prefix or
    /// hardware address, or shares its name or index with an earlier entry.
    pub fn into_interfaces(self) -> Result<Vec<Interface>, ConfigError> {
        let mut names = HashSet::new();
        let mut indices = HashSet::new();

        self.interfaces
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                if entry.name.is_empty() {
                    return Err(ConfigError::EmptySeedName { position: i + 1 });
                }
                if !names.insert(entry.name.clone()) {
                    return Err(ConfigError::DuplicateSeed {
                        key: format!("name '{}'", entry.name),
                    });
                }
                if !indices.insert(entry.index) {
                    return Err(ConfigError::DuplicateSeed {
                        key: format!("index {}", entry.index),
                    });
                }
                entry.into_interface()
            })
            .collect()
    }
}

impl SeedInterface {
    fn into_interface(self) -> Result<Interface, ConfigError> {
        let addresses = self
            .addresses
            .iter()
            .map(|value| {
                value
                    .parse::<IpNetwork>()
                    .map_err(|e| ConfigError::InvalidPrefix {
                        interface: self.name.clone(),
                        value: value.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let hardware_addr = self
            .hardware_addr
            .as_deref()
            .map(|value| {
                value
                    .parse::<HardwareAddr>()
                    .map_err(|_| ConfigError::InvalidHardwareAddr {
                        interface: self.name.clone(),
                        value: value.to_string(),
                    })
            })
            .transpose()?;

        Ok(Interface {
            name: self.name,
            index: self.index,
            mtu: self.mtu,
            flags: self.flags,
            hardware_addr,
            addresses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_convert_full_entry() {
        let seed = SeedFile::parse(
            r#"
            [[interface]]
            name = "eth0"
            index = 2
            mtu = 1500
            hardware_addr = "00:1a:2b:3c:4d:5e"
            addresses = ["10.0.0.5/24", "fe80::1/64"]
            flags = { up = true, multicast = true }

            [[interface]]
            name = "lo"
            index = 1
            addresses = ["127.0.0.1/8"]
        "#,
        )
        .unwrap();

        let interfaces = seed.into_interfaces().unwrap();

        assert_eq!(interfaces.len(), 2);
        let eth0 = &interfaces[0];
        assert_eq!(eth0.name, "eth0");
        assert_eq!(eth0.index, 2);
        assert_eq!(eth0.mtu, 1500);
        assert!(eth0.flags.up);
        assert!(eth0.flags.multicast);
        assert!(!eth0.flags.loopback);
        assert_eq!(
            eth0.hardware_addr.as_ref().map(ToString::to_string).as_deref(),
            Some("00:1a:2b:3c:4d:5e")
        );
        assert!(eth0.contains("10.0.0.77".parse().unwrap()));
        assert_eq!(interfaces[1].name, "lo");
        assert_eq!(interfaces[1].mtu, 0);
    }

    #[test]
    fn bare_address_is_host_prefix() {
        let seed = SeedFile::parse(
            r#"
            [[interface]]
            name = "tun0"
            index = 9
            addresses = ["10.8.0.2"]
        "#,
        )
        .unwrap();

        let interfaces = seed.into_interfaces().unwrap();
        assert_eq!(interfaces[0].addresses[0].prefix(), 32);
    }

    #[test]
    fn empty_file_yields_no_interfaces() {
        let seed = SeedFile::parse("").unwrap();
        assert!(seed.into_interfaces().unwrap().is_empty());
    }

    #[test]
    fn invalid_prefix_is_rejected() {
        let seed = SeedFile::parse(
            r#"
            [[interface]]
            name = "eth0"
            index = 2
            addresses = ["10.0.0.5/40"]
        "#,
        )
        .unwrap();

        assert!(matches!(
            seed.into_interfaces(),
            Err(ConfigError::InvalidPrefix { ref interface, ref value, .. })
                if interface == "eth0" && value == "10.0.0.5/40"
        ));
    }

    #[test]
    fn invalid_hardware_addr_is_rejected() {
        let seed = SeedFile::parse(
            r#"
            [[interface]]
            name = "eth0"
            index = 2
            hardware_addr = "zz:00"
        "#,
        )
        .unwrap();

        assert!(matches!(
            seed.into_interfaces(),
            Err(ConfigError::InvalidHardwareAddr { .. })
        ));
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let seed = SeedFile::parse(
            r#"
            [[interface]]
            name = "eth0"
            index = 2

            [[interface]]
            name = "eth0"
            index = 3
        "#,
        )
        .unwrap();

        let error = seed.into_interfaces().unwrap_err();
        assert!(error.to_string().contains("name 'eth0'"));
    }

    #[test]
    fn duplicate_index_is_rejected() {
        let seed = SeedFile::parse(
            r#"
            [[interface]]
            name = "eth0"
            index = 2

            [[interface]]
            name = "eth1"
            index = 2
        "#,
        )
        .unwrap();

        let error = seed.into_interfaces().unwrap_err();
        assert!(error.to_string().contains("index 2"));
    }

    #[test]
    fn empty_name_is_rejected() {
        let seed = SeedFile::parse(
            r#"
            [[interface]]
            name = ""
            index = 2
        "#,
        )
        .unwrap();

        assert!(matches!(
            seed.into_interfaces(),
            Err(ConfigError::EmptySeedName { position: 1 })
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = SeedFile::parse(
            r#"
            [[interface]]
            name = "eth0"
            index = 2
            speed = 1000
        "#,
        );

        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn load_reports_missing_file() {
        let result = SeedFile::load(Path::new("/nonexistent/ifcache-seed.toml"));
        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }
}
