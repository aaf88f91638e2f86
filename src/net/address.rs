//! Bind address parsing.
//!
//! An address with an empty host (`":7878"`) binds every interface.

use std::io;
use std::net::SocketAddr;

fn normalize(addr: &str) -> String {
    let addr = addr.trim();
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    }
}

/// Parse a literal bind address without DNS.
pub fn parse_bind_address(addr: &str) -> Result<SocketAddr, io::Error> {
    normalize(addr)
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{addr:?}: {e}")))
}

/// Resolve a bind address, falling back to a host lookup for names.
pub async fn resolve_bind_address(addr: &str) -> Result<SocketAddr, io::Error> {
    if let Ok(parsed) = parse_bind_address(addr) {
        return Ok(parsed);
    }
    tokio::net::lookup_host(normalize(addr))
        .await?
        .next()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("{addr:?} did not resolve to any address"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_host_binds_all_interfaces() {
        let addr = parse_bind_address(":7878").unwrap();
        assert_eq!(addr, "0.0.0.0:7878".parse().unwrap());
    }

    #[test]
    fn literal_addresses() {
        assert_eq!(
            parse_bind_address("127.0.0.1:0").unwrap(),
            "127.0.0.1:0".parse().unwrap()
        );
        assert!(parse_bind_address("[::1]:8080").is_ok());
        assert!(parse_bind_address("nope").is_err());
        assert!(parse_bind_address("").is_err());
    }

    #[tokio::test]
    async fn resolves_localhost() {
        let addr = resolve_bind_address("localhost:0").await.unwrap();
        assert!(addr.ip().is_loopback());
    }
}
