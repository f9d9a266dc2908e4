//! Engine configuration

use folio_access::ResolverConfig;

/// Options for opening a `Folio`
///
/// Builder-style; the defaults match the well-known catalog (site
/// preferences at `Site/Defaults`, container preferences in a
/// `Preferences` document per container).
#[derive(Debug, Clone, Default)]
pub struct FolioConfig {
    /// Access resolver configuration
    pub resolver: ResolverConfig,
}

impl FolioConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the resolver configuration
    pub fn resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }
}
