//! Install configuration record handed to the install collaborator

use std::fmt;

use log::info;

use super::check::CheckResult;

const MASK: &str = "********";

/// Database connection parameters, one mode at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbConnection {
    Tcp {
        hostname: String,
        port: String,
        user: String,
        password: String,
        name: String,
    },
    Socket {
        file: String,
        user: String,
        password: String,
        name: String,
    },
    /// Connection string supplied verbatim
    Manual { dsn: String },
}

impl DbConnection {
    /// Value of the `DB_CONNECTION_TYPE` discriminator selecting this mode
    pub fn kind(&self) -> &'static str {
        match self {
            DbConnection::Tcp { .. } => "tcp",
            DbConnection::Socket { .. } => "socket",
            DbConnection::Manual { .. } => "manual",
        }
    }
}

/// Everything the install collaborator needs for a full install
#[derive(Debug, Clone, Default)]
pub struct InstallConfiguration {
    /// Bind address of the main application
    pub internal_url: String,
    pub database: Option<DbConnection>,

    pub ds_name: String,
    pub ds_port: u16,
    pub ds_folder: String,

    pub external_micro: u16,
    pub external_gateway: u16,
    pub external_websocket: u16,
    pub external_front_plugins: u16,
    pub external_dav: u16,
    pub external_wopi: u16,
    pub external_dex_id: String,
    pub external_dex_secret: String,

    pub frontend_hosts: String,
    pub frontend_login: String,
    pub frontend_password: String,
    pub frontend_repeat_password: String,
    pub frontend_application_title: String,
    pub frontend_default_language: String,

    pub license_required: bool,
    pub license_string: String,

    pub check_results: Vec<CheckResult>,
}

/// Display helper hiding non-empty secrets
struct Secret<'a>(&'a str);

impl fmt::Display for Secret<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            Ok(())
        } else {
            f.write_str(MASK)
        }
    }
}

impl InstallConfiguration {
    /// Replace the database mode, clearing any previously selected one
    pub fn set_database(&mut self, connection: DbConnection) {
        self.database = Some(connection);
    }

    /// Log every field for operator visibility
    pub fn log_fields(&self) {
        for line in self.dump_lines() {
            info!("{line}");
        }
    }

    /// One `Name: value` line per field, secrets masked, check results last
    pub fn dump_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(32 + self.check_results.len());
        let mut push =
            |name: &str, value: &dyn fmt::Display| lines.push(format!("{name}: {value}"));

        push("InternalUrl", &self.internal_url);
        push(
            "DbConnectionType",
            &self.database.as_ref().map_or("", DbConnection::kind),
        );

        let (tcp_host, tcp_port, tcp_name, tcp_user, tcp_password) = match &self.database {
            Some(DbConnection::Tcp {
                hostname,
                port,
                user,
                password,
                name,
            }) => (hostname.as_str(), port.as_str(), name.as_str(), user.as_str(), password.as_str()),
            _ => ("", "", "", "", ""),
        };
        push("DBTCPHostname", &tcp_host);
        push("DBTCPPort", &tcp_port);
        push("DBTCPName", &tcp_name);
        push("DBTCPUser", &tcp_user);
        push("DBTCPPassword", &Secret(tcp_password));

        let (sock_file, sock_name, sock_user, sock_password) = match &self.database {
            Some(DbConnection::Socket {
                file,
                user,
                password,
                name,
            }) => (file.as_str(), name.as_str(), user.as_str(), password.as_str()),
            _ => ("", "", "", ""),
        };
        push("DBSocketFile", &sock_file);
        push("DBSocketName", &sock_name);
        push("DBSocketUser", &sock_user);
        push("DBSocketPassword", &Secret(sock_password));

        let dsn = match &self.database {
            Some(DbConnection::Manual { dsn }) => dsn.as_str(),
            _ => "",
        };
        push("DBManualDSN", &Secret(dsn));

        push("DsName", &self.ds_name);
        push("DsPort", &self.ds_port);
        push("DsFolder", &self.ds_folder);
        push("ExternalMicro", &self.external_micro);
        push("ExternalGateway", &self.external_gateway);
        push("ExternalWebsocket", &self.external_websocket);
        push("ExternalFrontPlugins", &self.external_front_plugins);
        push("ExternalDAV", &self.external_dav);
        push("ExternalWOPI", &self.external_wopi);
        push("ExternalDex", &self.external_dex_id);
        push("ExternalDexSecret", &Secret(&self.external_dex_secret));
        push("FrontendHosts", &self.frontend_hosts);
        push("FrontendLogin", &self.frontend_login);
        push("FrontendPassword", &Secret(&self.frontend_password));
        push("FrontendRepeatPassword", &Secret(&self.frontend_repeat_password));
        push("FrontendApplicationTitle", &self.frontend_application_title);
        push("FrontendDefaultLanguage", &self.frontend_default_language);
        push("LicenseRequired", &self.license_required);
        push("LicenseString", &Secret(&self.license_string));

        for (i, result) in self.check_results.iter().enumerate() {
            lines.push(format!(
                "CheckResult #{i}:  '{}':  {} ({})",
                result.name, result.success, result.json_result
            ));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_render_masked_or_empty() {
        assert_eq!(Secret("hunter2").to_string(), MASK);
        assert_eq!(Secret("").to_string(), "");
    }

    #[test]
    fn set_database_replaces_previous_mode() {
        let mut cfg = InstallConfiguration::default();
        cfg.set_database(DbConnection::Tcp {
            hostname: "localhost".into(),
            port: "3306".into(),
            user: "root".into(),
            password: String::new(),
            name: "cells".into(),
        });
        cfg.set_database(DbConnection::Manual {
            dsn: "root:pw@tcp(db:3306)/cells".into(),
        });
        assert_eq!(cfg.database.as_ref().map(DbConnection::kind), Some("manual"));
    }

    #[test]
    fn dump_masks_secrets_and_lists_checks() {
        let mut cfg = InstallConfiguration {
            internal_url: "0.0.0.0:8080".into(),
            external_dex_secret: "oidc-secret".into(),
            frontend_login: "admin".into(),
            frontend_password: "p4ss".into(),
            frontend_repeat_password: "p4ss".into(),
            ..Default::default()
        };
        cfg.set_database(DbConnection::Tcp {
            hostname: "db".into(),
            port: "3306".into(),
            user: "root".into(),
            password: "secret".into(),
            name: "cells".into(),
        });
        cfg.check_results
            .push(CheckResult::passed("DB", serde_json::json!({ "mode": "tcp" })));
        cfg.check_results.push(CheckResult::failed("SMTP", "refused"));

        let lines = cfg.dump_lines();
        let dump = lines.join("\n");
        for secret in ["secret", "oidc-secret", "p4ss"] {
            assert!(
                !lines.iter().any(|l| l.ends_with(&format!(": {secret}"))),
                "{secret} leaked:\n{dump}"
            );
        }

        assert!(lines.contains(&"InternalUrl: 0.0.0.0:8080".to_string()));
        assert!(lines.contains(&"DbConnectionType: tcp".to_string()));
        assert!(lines.contains(&"DBTCPHostname: db".to_string()));
        assert!(lines.contains(&format!("DBTCPPassword: {MASK}")));
        assert!(lines.contains(&format!("ExternalDexSecret: {MASK}")));
        assert!(lines.contains(&format!("FrontendRepeatPassword: {MASK}")));
        assert!(lines.contains(&"DBSocketPassword: ".to_string()));
        assert!(lines.contains(&"LicenseString: ".to_string()));
        assert!(lines.contains(&"FrontendLogin: admin".to_string()));

        let checks: Vec<&String> = lines
            .iter()
            .filter(|l| l.starts_with("CheckResult"))
            .collect();
        assert_eq!(
            checks,
            vec![
                r#"CheckResult #0:  'DB':  true ({"mode":"tcp"})"#,
                r#"CheckResult #1:  'SMTP':  false ({"error":"refused"})"#,
            ]
        );
    }
}
