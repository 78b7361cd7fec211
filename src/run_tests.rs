use super::*;

use std::net::{IpAddr, Ipv4Addr};

use ifcache::config::ValidatedConfig;
use ifcache::network::filter::{FilterChain, FlagFilter};
use ifcache::network::{
    FetchError, InterfaceFlags, InterfaceSource, Lookup, RawAddress, RawInterface, RawMask,
};

/// Source that reports a fixed interface list, or fails every enumeration.
struct FakeSource {
    interfaces: Vec<RawInterface>,
    fail: bool,
}

impl FakeSource {
    fn with(interfaces: Vec<RawInterface>) -> Self {
        Self {
            interfaces,
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            interfaces: vec![],
            fail: true,
        }
    }
}

impl InterfaceSource for FakeSource {
    fn enumerate(&self) -> Result<Vec<RawInterface>, FetchError> {
        if self.fail {
            return Err(FetchError::Platform {
                message: "enumeration unavailable".to_string(),
            });
        }
        Ok(self.interfaces.clone())
    }

    fn exists_by_name(&self, name: &str) -> bool {
        self.interfaces.iter().any(|i| i.name == name)
    }

    fn exists_by_index(&self, index: u32) -> bool {
        self.interfaces.iter().any(|i| i.index == index)
    }
}

fn raw(name: &str, index: u32, ip: [u8; 4], prefix: u8, loopback: bool) -> RawInterface {
    RawInterface {
        name: name.to_string(),
        index,
        mtu: 1500,
        flags: InterfaceFlags {
            up: true,
            loopback,
            ..InterfaceFlags::default()
        },
        hardware_addr: None,
        addresses: vec![RawAddress {
            ip: IpAddr::V4(Ipv4Addr::from(ip)),
            mask: RawMask::PrefixLen(prefix),
        }],
    }
}

fn host() -> FakeSource {
    FakeSource::with(vec![
        raw("lo", 1, [127, 0, 0, 1], 8, true),
        raw("eth0", 2, [10, 0, 0, 5], 24, false),
    ])
}

fn config(format: OutputFormat) -> ValidatedConfig {
    ValidatedConfig {
        seed: None,
        seed_path: None,
        refresh_on_start: false,
        filter: FilterChain::new(),
        format,
        verbose: false,
    }
}

fn run(
    cache: &InterfaceCache<FakeSource>,
    config: &ValidatedConfig,
    command: &Command,
) -> Result<String, RunError> {
    let mut out = Vec::new();
    run_command(cache, config, command, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

fn list() -> Command {
    Command::List {
        include: vec![],
        exclude: vec![],
        up_only: false,
        no_loopback: false,
    }
}

mod run_error {
    use super::*;

    #[test]
    fn lookup_error_is_transparent() {
        let error = RunError::Lookup(FinderError::InterfaceNotFound {
            lookup: Lookup::Index(9),
        });

        assert_eq!(error.to_string(), "no such network interface: index 9");
        assert!(error.is_not_found());
    }

    #[test]
    fn initial_update_is_not_a_miss() {
        let error = RunError::InitialUpdate(FinderError::Enumeration(FetchError::Platform {
            message: "boom".to_string(),
        }));

        assert!(error.to_string().starts_with("Failed to enumerate interfaces"));
        assert!(!error.is_not_found());
    }
}

mod prepare {
    use super::*;

    #[test]
    fn installs_seed_without_enumerating() {
        let cache = InterfaceCache::new(FakeSource::failing());
        let mut config = config(OutputFormat::Text);
        config.seed = Some(vec![Interface::new("tun0", 7, vec![])]);

        prepare(&cache, &config).unwrap();

        let names: Vec<_> = cache.interfaces().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["tun0"]);
    }

    #[test]
    fn refreshes_when_configured() {
        let cache = InterfaceCache::new(host());
        let mut config = config(OutputFormat::Text);
        config.refresh_on_start = true;

        prepare(&cache, &config).unwrap();

        assert_eq!(cache.interfaces().len(), 2);
    }

    #[test]
    fn refresh_failure_is_reported() {
        let cache = InterfaceCache::new(FakeSource::failing());
        let mut config = config(OutputFormat::Text);
        config.refresh_on_start = true;

        let result = prepare(&cache, &config);

        assert!(matches!(result, Err(RunError::InitialUpdate(_))));
    }
}

mod commands {
    use super::*;

    #[test]
    fn list_prints_one_line_per_interface() {
        let cache = InterfaceCache::new(host());
        cache.update().unwrap();

        let output = run(&cache, &config(OutputFormat::Text), &list()).unwrap();

        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("lo: index=1"));
        assert!(lines[1].starts_with("eth0: index=2"));
        assert!(lines[1].ends_with("10.0.0.5/24"));
    }

    #[test]
    fn list_applies_filter() {
        let cache = InterfaceCache::new(host());
        cache.update().unwrap();
        let mut config = config(OutputFormat::Text);
        config.filter = FilterChain::new().exclude(FlagFilter::Loopback);

        let output = run(&cache, &config, &list()).unwrap();

        assert_eq!(output.lines().count(), 1);
        assert!(output.starts_with("eth0:"));
    }

    #[test]
    fn list_json_is_an_array() {
        let cache = InterfaceCache::new(host());
        cache.update().unwrap();

        let output = run(&cache, &config(OutputFormat::Json), &list()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[1]["name"], "eth0");
        assert_eq!(array[1]["addresses"][0], "10.0.0.5/24");
    }

    #[test]
    fn name_lookup_refreshes_empty_cache() {
        let cache = InterfaceCache::new(host());

        let output = run(
            &cache,
            &config(OutputFormat::Text),
            &Command::Name {
                name: "eth0".to_string(),
            },
        )
        .unwrap();

        assert!(output.starts_with("eth0: index=2"));
    }

    #[test]
    fn index_lookup_prints_json_object() {
        let cache = InterfaceCache::new(host());

        let output = run(
            &cache,
            &config(OutputFormat::Json),
            &Command::Index { index: 1 },
        )
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["name"], "lo");
        assert_eq!(value["flags"]["loopback"], true);
    }

    #[test]
    fn addr_lookup_uses_snapshot() {
        let cache = InterfaceCache::new(host());
        cache.update().unwrap();

        let output = run(
            &cache,
            &config(OutputFormat::Text),
            &Command::Addr {
                addr: "10.0.0.77".parse().unwrap(),
            },
        )
        .unwrap();

        assert!(output.starts_with("eth0:"));
    }

    #[test]
    fn addr_lookup_on_empty_cache_is_not_found() {
        let cache = InterfaceCache::new(host());

        let error = run(
            &cache,
            &config(OutputFormat::Text),
            &Command::Addr {
                addr: "10.0.0.77".parse().unwrap(),
            },
        )
        .unwrap_err();

        assert!(error.is_not_found());
    }

    #[test]
    fn unknown_name_is_not_found() {
        let cache = InterfaceCache::new(host());

        let error = run(
            &cache,
            &config(OutputFormat::Text),
            &Command::Name {
                name: "wlan0".to_string(),
            },
        )
        .unwrap_err();

        assert!(error.is_not_found());
        assert_eq!(error.to_string(), "no such network interface: name 'wlan0'");
    }

    #[test]
    fn init_prints_nothing() {
        let cache = InterfaceCache::new(host());

        let output = run(
            &cache,
            &config(OutputFormat::Text),
            &Command::Init {
                output: "ifcache.toml".into(),
            },
        )
        .unwrap();

        assert!(output.is_empty());
    }
}
