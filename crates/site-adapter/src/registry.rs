use std::sync::Arc;

use aipanel_core_types::{PanelError, SiteId, SiteProfile};
use dashmap::DashMap;
use tracing::{debug, info};

use crate::profiles::builtin_profiles;

/// Site profiles by id.
#[derive(Debug, Default)]
pub struct ProfileRegistry {
    profiles: DashMap<SiteId, Arc<SiteProfile>>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in sites.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for profile in builtin_profiles() {
            registry
                .profiles
                .insert(profile.site.clone(), Arc::new(profile));
        }
        debug!(count = registry.len(), "built-in site profiles registered");
        registry
    }

    /// Adds a profile, replacing any profile with the same id. Returns the replaced one.
    pub fn register(&self, profile: SiteProfile) -> Result<Option<Arc<SiteProfile>>, PanelError> {
        profile.validate()?;
        let site = profile.site.clone();
        let replaced = self.profiles.insert(site.clone(), Arc::new(profile));
        info!(%site, replaced = replaced.is_some(), "site profile registered");
        Ok(replaced)
    }

    pub fn get(&self, site: &SiteId) -> Option<Arc<SiteProfile>> {
        self.profiles.get(site).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, site: &SiteId) -> bool {
        self.profiles.contains_key(site)
    }

    /// Every profile, sorted by site id.
    pub fn list(&self) -> Vec<Arc<SiteProfile>> {
        let mut profiles: Vec<_> = self
            .profiles
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        profiles.sort_by(|a, b| a.site.cmp(&b.site));
        profiles
    }

    pub fn ids(&self) -> Vec<SiteId> {
        self.list().iter().map(|profile| profile.site.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aipanel_core_types::EditorKind;

    #[test]
    fn builtins_are_listed_sorted() {
        let registry = ProfileRegistry::with_builtins();
        let ids: Vec<_> = registry.ids().into_iter().map(|id| id.0).collect();
        assert_eq!(ids, vec!["chatglm", "deepseek", "kimi", "qwen"]);
        assert!(registry.get(&SiteId::from("kimi")).is_some());
        assert!(registry.get(&SiteId::from("gemini")).is_none());
    }

    #[test]
    fn custom_profile_replaces_builtin() {
        let registry = ProfileRegistry::with_builtins();
        let custom = SiteProfile::builder("kimi")
            .inputs(["textarea"])
            .messages(["article"])
            .editor_kind(EditorKind::PlainTextarea)
            .build();
        let replaced = registry.register(custom).unwrap();
        assert_eq!(
            replaced.map(|p| p.editor_kind),
            Some(EditorKind::RichText)
        );
        let current = registry.get(&SiteId::from("kimi")).unwrap();
        assert_eq!(current.editor_kind, EditorKind::PlainTextarea);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn invalid_profile_is_rejected() {
        let registry = ProfileRegistry::new();
        let err = registry
            .register(SiteProfile::builder("empty").build())
            .unwrap_err();
        assert!(matches!(err, PanelError::InvalidProfile { .. }));
        assert!(registry.is_empty());
    }
}
