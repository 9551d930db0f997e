//! Database reachability probe
//!
//! Only checks that the server accepts connections on the configured
//! endpoint. Authentication and schema work belong to the main application.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use log::debug;

use crate::install::core::DbConnection;

/// Upper bound on a single connection attempt
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Where the database server listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `host:port`, resolved at connect time
    Tcp(String),
    Unix(PathBuf),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tcp(addr) => write!(f, "tcp({addr})"),
            Endpoint::Unix(path) => write!(f, "unix({})", path.display()),
        }
    }
}

fn host_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

/// Append the default MySQL port when `addr` carries none
fn with_default_port(addr: &str) -> String {
    if addr.parse::<SocketAddr>().is_ok() {
        return addr.to_string();
    }
    match addr.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && !host.ends_with(':') && port.parse::<u16>().is_ok() => {
            addr.to_string()
        }
        _ => host_port(addr, DEFAULT_MYSQL_PORT),
    }
}

/// Parse a `[user[:password]@][net[(addr)]]/dbname[?params]` connection string
pub fn parse_dsn(dsn: &str) -> Result<Endpoint, String> {
    let (prefix, _db) = dsn
        .rsplit_once('/')
        .ok_or_else(|| "DSN is missing the '/dbname' part".to_string())?;

    let location = match prefix.rsplit_once('@') {
        Some((_credentials, location)) => location,
        None => prefix,
    };

    let (net, addr) = match location.split_once('(') {
        Some((net, rest)) => {
            let addr = rest
                .strip_suffix(')')
                .ok_or_else(|| format!("unterminated address in '{location}'"))?;
            (net, addr)
        }
        None => (location, ""),
    };

    match net {
        "" | "tcp" => {
            let addr = if addr.is_empty() { "127.0.0.1" } else { addr };
            Ok(Endpoint::Tcp(with_default_port(addr)))
        }
        "unix" => {
            if addr.is_empty() {
                return Err("unix DSN requires a socket path".to_string());
            }
            Ok(Endpoint::Unix(PathBuf::from(addr)))
        }
        other => Err(format!("unsupported network '{other}' in DSN")),
    }
}

/// Endpoint to probe for the configured connection mode
pub fn endpoint_for(db: &DbConnection) -> Result<Endpoint, String> {
    match db {
        DbConnection::Tcp { hostname, port, .. } => {
            let port: u16 = port
                .parse()
                .map_err(|e| format!("invalid database port '{port}': {e}"))?;
            Ok(Endpoint::Tcp(host_port(hostname, port)))
        }
        DbConnection::Socket { file, .. } => Ok(Endpoint::Unix(PathBuf::from(file))),
        DbConnection::Manual { dsn } => parse_dsn(dsn),
    }
}

/// Open and immediately drop a connection to `endpoint`
pub async fn probe(endpoint: &Endpoint, timeout: Duration) -> Result<(), String> {
    debug!("Probing database at {endpoint}");
    let attempt = async {
        match endpoint {
            Endpoint::Tcp(addr) => tokio::net::TcpStream::connect(addr.as_str())
                .await
                .map(drop)
                .map_err(|e| e.to_string()),
            Endpoint::Unix(path) => connect_unix(path).await,
        }
    };

    match tokio::time::timeout(timeout, attempt).await {
        Ok(result) => result,
        Err(_) => Err(format!(
            "timed out after {}s connecting to {endpoint}",
            timeout.as_secs()
        )),
    }
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        async fn connect_unix(path: &std::path::Path) -> Result<(), String> {
            tokio::net::UnixStream::connect(path)
                .await
                .map(drop)
                .map_err(|e| e.to_string())
        }
    } else {
        async fn connect_unix(path: &std::path::Path) -> Result<(), String> {
            Err(format!(
                "unix sockets are not supported on this platform: {}",
                path.display()
            ))
        }
    }
}
