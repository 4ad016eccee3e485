use std::collections::HashMap;

/// Read-only port → service label lookup
pub trait ServiceLookup: Send + Sync {
    /// Label for `port`, or `""` when the port is unknown.
    fn service_name(&self, port: u16) -> &str;
}

const WELL_KNOWN: &[(u16, &str)] = &[
    (20, "ftp"),
    (21, "ftp"),
    (22, "ssh"),
    (23, "telnet"),
    (25, "smtp"),
    (43, "whois"),
    (53, "dns"),
    (67, "dhcp"),
    (68, "dhcp"),
    (69, "tftp"),
    (80, "http"),
    (110, "pop3"),
    (123, "ntp"),
    (137, "netbios"),
    (138, "netbios"),
    (139, "netbios"),
    (143, "imap4"),
    (161, "snmp"),
    (162, "snmp"),
    (389, "ldap"),
    (443, "https"),
    (445, "microsoft-ds"),
    (465, "smtps"),
    (500, "isakmp"),
    (514, "syslog"),
    (520, "rip"),
    (587, "smtp"),
    (636, "ldaps"),
    (993, "imaps"),
    (995, "pop3s"),
    (1433, "mssql"),
    (1521, "oracle"),
    (1723, "pptp"),
    (2049, "nfs"),
    (3306, "mysql"),
    (3389, "rdp"),
    (5432, "postgresql"),
    (5900, "vnc"),
    (6379, "redis"),
    (8080, "http-proxy"),
    (8443, "https-alt"),
    (27017, "mongodb"),
];

/// Immutable service table, built once and shared by reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTable {
    entries: HashMap<u16, String>,
}

impl ServiceTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add or replace entries, consuming the table.
    pub fn with_entries<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (u16, S)>,
        S: Into<String>,
    {
        self.entries
            .extend(entries.into_iter().map(|(port, name)| (port, name.into())));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ServiceTable {
    fn default() -> Self {
        Self::empty().with_entries(WELL_KNOWN.iter().copied())
    }
}

impl ServiceLookup for ServiceTable {
    fn service_name(&self, port: u16) -> &str {
        self.entries.get(&port).map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = ServiceTable::default();
        assert_eq!(table.service_name(21), "ftp");
        assert_eq!(table.service_name(80), "http");
        assert_eq!(table.service_name(443), "https");
        assert_eq!(table.len(), WELL_KNOWN.len());
    }

    #[test]
    fn test_unknown_port_is_empty_label() {
        assert_eq!(ServiceTable::default().service_name(31337), "");
        assert_eq!(ServiceTable::empty().service_name(80), "");
    }

    #[test]
    fn test_entries_override_defaults() {
        let table = ServiceTable::default().with_entries([(8080, "jenkins"), (9999, "custom")]);
        assert_eq!(table.service_name(8080), "jenkins");
        assert_eq!(table.service_name(9999), "custom");
        assert_eq!(table.service_name(22), "ssh");
    }
}
