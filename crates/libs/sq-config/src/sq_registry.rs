//! Read-only name resolution over the registered TM servers.

use crate::prelude::*;
use crate::sq_server::SqTmServer;

/// Immutable view over the registered servers.
///
/// Built once from the loaded configuration and shared read-only with the
/// posting step. Duplicate names are rejected here, at load time, so later
/// lookups are unambiguous.
#[derive(Debug, Clone)]
pub struct SqServerRegistry {
    servers: Vec<SqTmServer>,
}

impl SqServerRegistry {
    /// Build a registry, rejecting duplicate server names.
    pub fn new(servers: Vec<SqTmServer>) -> Result<Self> {
        for (idx, server) in servers.iter().enumerate() {
            if servers[..idx].iter().any(|other| other.name == server.name) {
                return Err(Error::DuplicateServerName(server.name.clone()));
            }
        }
        Ok(Self { servers })
    }

    /// Look up a server by name.
    pub fn resolve(&self, name: &str) -> Option<&SqTmServer> {
        self.servers.iter().find(|server| server.name == name)
    }

    /// All registered servers, in configuration order.
    pub fn servers(&self) -> &[SqTmServer] {
        &self.servers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sq_server::SqCredential;

    fn server(name: &str) -> SqTmServer {
        SqTmServer {
            name: name.into(),
            url: format!("https://{name}.example.com"),
            credential: SqCredential {
                username: "jenkins".into(),
                password: "secret".into(),
            },
        }
    }

    #[test]
    fn resolves_by_name() {
        let registry = SqServerRegistry::new(vec![server("alpha"), server("beta")]).unwrap();
        assert_eq!(registry.resolve("beta").unwrap().name, "beta");
        assert!(registry.resolve("gamma").is_none());
    }

    #[test]
    fn rejects_duplicate_names() {
        let result = SqServerRegistry::new(vec![server("alpha"), server("alpha")]);
        assert!(matches!(result, Err(Error::DuplicateServerName(name)) if name == "alpha"));
    }
}
