// Host <-> node-address mapping.
//
// The device addresses nodes by IP literal, optionally tagged with a
// routing-domain suffix (`10.0.0.5%2220`). Which suffix (if any) gets
// appended is a per-environment policy decision driven by the device's
// configured routing domains.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

use crate::error::CoreError;
use lbshed_api::RouteDomain;

// ── Node address ────────────────────────────────────────────────────

/// A node address in the device's own representation: an IP literal
/// plus an optional routing-domain id.
///
/// Wire form is `ip` or `ip%id`; `Display`/`FromStr` round-trip it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAddress {
    ip: IpAddr,
    domain: Option<u32>,
}

impl NodeAddress {
    pub fn new(ip: IpAddr, domain: Option<u32>) -> Self {
        Self { ip, domain }
    }

    /// The bare IP, suffix stripped.
    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    /// The routing-domain id, if the address carries one.
    pub fn domain(&self) -> Option<u32> {
        self.domain
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.domain {
            Some(id) => write!(f, "{}%{id}", self.ip),
            None => write!(f, "{}", self.ip),
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid node address '{0}'")]
pub struct ParseNodeAddressError(String);

impl FromStr for NodeAddress {
    type Err = ParseNodeAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ip_part, domain) = match s.split_once('%') {
            Some((ip, id)) => {
                let id = id.parse().map_err(|_| ParseNodeAddressError(s.to_owned()))?;
                (ip, Some(id))
            }
            None => (s, None),
        };
        let ip = ip_part
            .parse()
            .map_err(|_| ParseNodeAddressError(s.to_owned()))?;
        Ok(Self { ip, domain })
    }
}

impl Serialize for NodeAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ── Suffix policy ───────────────────────────────────────────────────

/// When to append the routing-domain suffix to resolved addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuffixPolicy {
    /// Append `%id` iff exactly one routing domain is configured and
    /// its id is nonzero. Zero or multiple configured domains mean the
    /// bare IP is unambiguous enough for the device to place it.
    #[default]
    SingleNonzero,
    /// Never append a suffix.
    Never,
    /// Always append this id, regardless of what the device reports.
    Fixed(u32),
}

impl SuffixPolicy {
    /// The domain id to tag addresses with, given the device's
    /// configured routing domains.
    fn domain_for(self, domains: &[RouteDomain]) -> Option<u32> {
        match self {
            Self::Never => None,
            Self::Fixed(id) => Some(id),
            Self::SingleNonzero => match domains {
                [only] if only.id != 0 => Some(only.id),
                _ => None,
            },
        }
    }
}

// ── Name service collaborator ───────────────────────────────────────

/// Forward and reverse name resolution, injected so tests and embedders
/// can supply their own source of truth.
#[async_trait]
pub trait NameService: Send + Sync {
    /// Forward lookup: hostname (or IP literal) -> IP.
    async fn forward(&self, host: &str) -> std::io::Result<IpAddr>;

    /// Reverse lookup: IP -> fully-qualified hostname.
    async fn reverse(&self, ip: IpAddr) -> std::io::Result<String>;
}

/// `NameService` backed by the system resolver (getaddrinfo /
/// getnameinfo), so `/etc/hosts` and nsswitch behave as expected.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemNameService;

#[async_trait]
impl NameService for SystemNameService {
    async fn forward(&self, host: &str) -> std::io::Result<IpAddr> {
        let host = host.to_owned();
        let ips = tokio::task::spawn_blocking(move || dns_lookup::lookup_host(&host))
            .await
            .map_err(std::io::Error::other)??;
        ips.into_iter()
            .next()
            .ok_or_else(|| std::io::Error::other("no addresses returned"))
    }

    async fn reverse(&self, ip: IpAddr) -> std::io::Result<String> {
        tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&ip))
            .await
            .map_err(std::io::Error::other)?
    }
}

// ── Resolver ────────────────────────────────────────────────────────

/// Converts host identifiers to and from the device's node-address
/// representation, consulting the owning connection's cached
/// routing-domain list.
pub struct AddressResolver<'a> {
    domains: &'a [RouteDomain],
    policy: SuffixPolicy,
    names: &'a dyn NameService,
}

impl<'a> AddressResolver<'a> {
    pub fn new(domains: &'a [RouteDomain], policy: SuffixPolicy, names: &'a dyn NameService) -> Self {
        Self {
            domains,
            policy,
            names,
        }
    }

    /// Resolve `host` to the address form the device expects.
    pub async fn resolve(&self, host: &str) -> Result<NodeAddress, CoreError> {
        let ip = self
            .names
            .forward(host)
            .await
            .map_err(|e| CoreError::Resolution {
                host: host.to_owned(),
                reason: e.to_string(),
            })?;
        let address = NodeAddress::new(ip, self.policy.domain_for(self.domains));
        debug!(host, %address, "resolved node address");
        Ok(address)
    }

    /// Reverse-resolve a node address to a hostname.
    ///
    /// Falls back to the bare IP string when the reverse lookup fails --
    /// status output stays usable on networks without PTR records.
    pub async fn reverse(&self, address: &NodeAddress) -> String {
        match self.names.reverse(address.ip()).await {
            Ok(fqdn) => fqdn,
            Err(e) => {
                debug!(%address, error = %e, "reverse lookup failed, using bare IP");
                address.ip().to_string()
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct StaticNames {
        forward: HashMap<String, IpAddr>,
        reverse: HashMap<IpAddr, String>,
    }

    impl StaticNames {
        fn new(entries: &[(&str, &str)]) -> Self {
            let mut forward = HashMap::new();
            let mut reverse = HashMap::new();
            for (host, ip) in entries {
                let ip: IpAddr = ip.parse().unwrap();
                forward.insert((*host).to_owned(), ip);
                reverse.insert(ip, (*host).to_owned());
            }
            Self { forward, reverse }
        }
    }

    #[async_trait]
    impl NameService for StaticNames {
        async fn forward(&self, host: &str) -> std::io::Result<IpAddr> {
            self.forward
                .get(host)
                .copied()
                .ok_or_else(|| std::io::Error::other("unknown host"))
        }

        async fn reverse(&self, ip: IpAddr) -> std::io::Result<String> {
            self.reverse
                .get(&ip)
                .cloned()
                .ok_or_else(|| std::io::Error::other("no PTR record"))
        }
    }

    fn domains(ids: &[u32]) -> Vec<RouteDomain> {
        ids.iter()
            .map(|&id| RouteDomain { id, name: None })
            .collect()
    }

    #[tokio::test]
    async fn single_nonzero_domain_appends_suffix() {
        let names = StaticNames::new(&[("app1.example.com", "10.0.0.5")]);
        let domains = domains(&[2220]);
        let resolver = AddressResolver::new(&domains, SuffixPolicy::SingleNonzero, &names);

        let address = resolver.resolve("app1.example.com").await.unwrap();
        assert_eq!(address.to_string(), "10.0.0.5%2220");
        assert_eq!(address.domain(), Some(2220));
    }

    #[tokio::test]
    async fn zero_domain_leaves_address_bare() {
        let names = StaticNames::new(&[("app1.example.com", "10.0.0.5")]);
        let domains = domains(&[0]);
        let resolver = AddressResolver::new(&domains, SuffixPolicy::SingleNonzero, &names);

        let address = resolver.resolve("app1.example.com").await.unwrap();
        assert_eq!(address.to_string(), "10.0.0.5");
    }

    #[tokio::test]
    async fn multiple_domains_leave_address_bare() {
        let names = StaticNames::new(&[("app1.example.com", "10.0.0.5")]);
        let domains = domains(&[2220, 2221]);
        let resolver = AddressResolver::new(&domains, SuffixPolicy::SingleNonzero, &names);

        let address = resolver.resolve("app1.example.com").await.unwrap();
        assert_eq!(address.to_string(), "10.0.0.5");
    }

    #[tokio::test]
    async fn fixed_policy_overrides_device_domains() {
        let names = StaticNames::new(&[("app1.example.com", "10.0.0.5")]);
        let resolver = AddressResolver::new(&[], SuffixPolicy::Fixed(7), &names);

        let address = resolver.resolve("app1.example.com").await.unwrap();
        assert_eq!(address.to_string(), "10.0.0.5%7");
    }

    #[tokio::test]
    async fn never_policy_ignores_single_nonzero_domain() {
        let names = StaticNames::new(&[("app1.example.com", "10.0.0.5")]);
        let domains = domains(&[2220]);
        let resolver = AddressResolver::new(&domains, SuffixPolicy::Never, &names);

        let address = resolver.resolve("app1.example.com").await.unwrap();
        assert_eq!(address.to_string(), "10.0.0.5");
    }

    #[tokio::test]
    async fn unknown_host_is_a_resolution_error() {
        let names = StaticNames::new(&[]);
        let resolver = AddressResolver::new(&[], SuffixPolicy::SingleNonzero, &names);

        let err = resolver.resolve("ghost.example.com").await.unwrap_err();
        assert!(matches!(err, CoreError::Resolution { host, .. } if host == "ghost.example.com"));
    }

    #[tokio::test]
    async fn reverse_strips_suffix_and_resolves() {
        let names = StaticNames::new(&[("app1.example.com", "10.0.0.5")]);
        let resolver = AddressResolver::new(&[], SuffixPolicy::SingleNonzero, &names);

        let address: NodeAddress = "10.0.0.5%2220".parse().unwrap();
        assert_eq!(resolver.reverse(&address).await, "app1.example.com");
    }

    #[tokio::test]
    async fn reverse_falls_back_to_bare_ip() {
        let names = StaticNames::new(&[]);
        let resolver = AddressResolver::new(&[], SuffixPolicy::SingleNonzero, &names);

        let address: NodeAddress = "192.0.2.9".parse().unwrap();
        assert_eq!(resolver.reverse(&address).await, "192.0.2.9");
    }

    #[test]
    fn node_address_parse_display_round_trip() {
        for raw in ["10.0.0.5", "10.0.0.5%2220", "2001:db8::1", "2001:db8::1%3"] {
            let parsed: NodeAddress = raw.parse().unwrap();
            assert_eq!(parsed.to_string(), raw);
        }
    }

    #[test]
    fn node_address_rejects_garbage() {
        assert!("not-an-ip".parse::<NodeAddress>().is_err());
        assert!("10.0.0.5%x".parse::<NodeAddress>().is_err());
    }
}
