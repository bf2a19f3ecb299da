//! The `ibm` provider and the resource types it offers

use crate::resource::OpenWhiskAction;
use crate::session::ClientSession;
use anyhow::Result;
use declarative::Provider;

pub const PROVIDER_NAME: &str = "ibm";

/// Build the provider with every supported resource type registered
pub fn provider() -> Result<Provider<dyn ClientSession>> {
    let mut provider: Provider<dyn ClientSession> = Provider::new(PROVIDER_NAME);
    provider.register(Box::new(OpenWhiskAction::new()))?;
    Ok(provider)
}
