//! Port resolution for the internal service registry

use std::net::TcpListener;

use log::info;

use crate::config::{ConfigStore, MICRO_API_KEY, PORTS_SECTION};

use super::error::InstallerError;

/// Return the configured registry port, allocating and persisting one if unset
pub fn ensure_micro_api_port(store: &mut dyn ConfigStore) -> Result<u16, InstallerError> {
    let configured = store
        .get(PORTS_SECTION, MICRO_API_KEY)
        .and_then(|v| v.as_integer())
        .and_then(|p| u16::try_from(p).ok())
        .unwrap_or(0);
    if configured != 0 {
        info!("Service registry port already configured: {configured}");
        return Ok(configured);
    }

    let port = available_port()?;
    store.set(PORTS_SECTION, MICRO_API_KEY, toml::Value::Integer(i64::from(port)));
    store.save("cli", "Install / Setting default Ports")?;
    info!("Allocated service registry port {port}");
    Ok(port)
}

/// Ask the OS for a free ephemeral port on the loopback interface
pub fn available_port() -> Result<u16, InstallerError> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).map_err(InstallerError::PortAllocation)?;
    let addr = listener.local_addr().map_err(InstallerError::PortAllocation)?;
    Ok(addr.port())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TomlConfigStore;

    #[test]
    fn allocates_and_persists_when_unset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cells.toml");
        let mut store = TomlConfigStore::open(&path).unwrap();

        let port = ensure_micro_api_port(&mut store).unwrap();
        assert_ne!(port, 0);

        let reopened = TomlConfigStore::open(&path).unwrap();
        assert_eq!(
            reopened.get(PORTS_SECTION, MICRO_API_KEY),
            Some(toml::Value::Integer(i64::from(port)))
        );
    }

    #[test]
    fn keeps_configured_port() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cells.toml");
        let mut store = TomlConfigStore::open(&path).unwrap();
        store.set(PORTS_SECTION, MICRO_API_KEY, toml::Value::Integer(8002));

        assert_eq!(ensure_micro_api_port(&mut store).unwrap(), 8002);
        // nothing saved because nothing changed
        assert!(!path.exists());
    }
}
