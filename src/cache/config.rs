use std::collections::HashSet;
use std::time::Duration;

/// Routes the page cache may cover. Coverage is configuration, not code:
/// only the index is cached by default, matching observed behavior, but
/// group and profile pages accept the same policy when enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachedRoute {
    Index,
    Group,
    Profile,
}

impl CachedRoute {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "index" => Some(Self::Index),
            "group" => Some(Self::Group),
            "profile" => Some(Self::Profile),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl: Duration,
    pub routes: HashSet<CachedRoute>,
}

impl CacheConfig {
    pub fn covers(&self, route: CachedRoute) -> bool {
        self.enabled && self.routes.contains(&route)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(20),
            routes: HashSet::from([CachedRoute::Index]),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        let routes = settings
            .routes
            .iter()
            .filter_map(|name| CachedRoute::parse(name))
            .collect();
        Self {
            enabled: settings.enabled,
            ttl: Duration::from_secs(settings.ttl_seconds),
            routes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_only_index() {
        let config = CacheConfig::default();
        assert!(config.covers(CachedRoute::Index));
        assert!(!config.covers(CachedRoute::Group));
        assert!(!config.covers(CachedRoute::Profile));
    }

    #[test]
    fn disabled_config_covers_nothing() {
        let config = CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        };
        assert!(!config.covers(CachedRoute::Index));
    }

    #[test]
    fn unknown_route_names_are_ignored() {
        assert_eq!(CachedRoute::parse("group"), Some(CachedRoute::Group));
        assert_eq!(CachedRoute::parse("sitemap"), None);
    }
}
