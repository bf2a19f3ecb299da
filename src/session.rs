//! Access to remote clients for resource operations

use openwhisk::{Client, Config};

/// Hands out clients to lifecycle operations
///
/// Every operation asks for a fresh client; nothing is cached between calls.
pub trait ClientSession: Send + Sync {
    fn openwhisk_client(&self) -> Result<Client, openwhisk::Error>;
}

/// Session backed by a resolved provider configuration
#[derive(Debug, Clone)]
pub struct Session {
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ClientSession for Session {
    fn openwhisk_client(&self) -> Result<Client, openwhisk::Error> {
        Client::new(self.config.clone())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use openwhisk::MockActionService;

    /// Session that routes every client to one shared mock
    pub struct MockSession {
        mock: MockActionService,
    }

    impl MockSession {
        pub fn new(mock: MockActionService) -> Self {
            Self { mock }
        }
    }

    impl ClientSession for MockSession {
        fn openwhisk_client(&self) -> Result<Client, openwhisk::Error> {
            Ok(Client::with_service("guest", Box::new(self.mock.clone())))
        }
    }

    /// Session whose credentials are unusable
    pub struct FailingSession;

    impl ClientSession for FailingSession {
        fn openwhisk_client(&self) -> Result<Client, openwhisk::Error> {
            Err(openwhisk::Error::Config("no API host configured".to_string()))
        }
    }

    #[test]
    fn test_session_builds_client_from_config() {
        let session = Session::new(Config::new("localhost:3233", "user:key").namespace("ns"));
        let client = session.openwhisk_client().unwrap();
        assert_eq!(client.namespace(), "ns");
    }

    #[test]
    fn test_session_rejects_invalid_config() {
        let session = Session::new(Config::new("", "user:key"));
        assert!(session.openwhisk_client().is_err());
    }

    #[test]
    fn test_mock_session_shares_storage() {
        let mock = MockActionService::new();
        let session = MockSession::new(mock.clone());
        let client = session.openwhisk_client().unwrap();
        assert!(client.actions().get("missing").unwrap_err().is_not_found());
        assert_eq!(mock.requests().len(), 1);
    }
}
