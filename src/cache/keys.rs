//! Cache keys for rendered pages.
//!
//! A key is scoped to the route, not the request: it deliberately ignores
//! the query string (so every `?page=N` of a feed shares one entry) and the
//! viewer. Within the TTL window all viewers of a covered route see the
//! same rendered body.

use super::config::CachedRoute;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageKey {
    Index,
    Group { slug: String },
    Profile { username: String },
}

impl PageKey {
    pub fn route(&self) -> CachedRoute {
        match self {
            PageKey::Index => CachedRoute::Index,
            PageKey::Group { .. } => CachedRoute::Group,
            PageKey::Profile { .. } => CachedRoute::Profile,
        }
    }

    /// Map a request path to its cache key, if the path belongs to a
    /// cacheable route. Paths with reserved first segments (`new`, `follow`,
    /// `auth`, nested post paths) are never cacheable.
    pub fn for_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Some(PageKey::Index);
        }
        let mut segments = trimmed.split('/');
        let first = segments.next()?;
        let second = segments.next();
        if segments.next().is_some() {
            return None;
        }
        match (first, second) {
            ("group", Some(slug)) if !slug.is_empty() => Some(PageKey::Group {
                slug: slug.to_string(),
            }),
            ("new" | "follow" | "auth" | "group", _) => None,
            (username, None) => Some(PageKey::Profile {
                username: username.to_string(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_maps_to_index() {
        assert_eq!(PageKey::for_path("/"), Some(PageKey::Index));
    }

    #[test]
    fn group_path_maps_to_group_key() {
        assert_eq!(
            PageKey::for_path("/group/rust/"),
            Some(PageKey::Group {
                slug: "rust".to_string()
            })
        );
    }

    #[test]
    fn single_segment_maps_to_profile() {
        assert_eq!(
            PageKey::for_path("/alice/"),
            Some(PageKey::Profile {
                username: "alice".to_string()
            })
        );
    }

    #[test]
    fn reserved_segments_are_not_cacheable() {
        assert_eq!(PageKey::for_path("/new/"), None);
        assert_eq!(PageKey::for_path("/follow/"), None);
        assert_eq!(PageKey::for_path("/auth/login/"), None);
    }

    #[test]
    fn post_detail_paths_are_not_cacheable() {
        let id = "4f9f24d4-9f63-4a10-8be7-32b5522fbd7d";
        assert_eq!(PageKey::for_path(&format!("/alice/{id}/")), None);
        assert_eq!(PageKey::for_path(&format!("/alice/{id}/edit/")), None);
    }
}
