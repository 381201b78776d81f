//! Memoized address composition.

use reportframe_composer::Composer;
use reportframe_core::{DisplayOptions, ReportConfiguration};

#[derive(Debug, Clone, PartialEq, Eq)]
struct AddressKey {
    raw_address: String,
    options: DisplayOptions,
    custom_parameters: String,
}

impl AddressKey {
    fn of(config: &ReportConfiguration) -> Self {
        Self {
            raw_address: config.raw_address.clone(),
            options: config.display_options(),
            custom_parameters: config.custom_parameters.clone(),
        }
    }
}

/// Remembers the last composed address so that configuration changes which
/// do not touch the address-affecting fields skip recomposition.
#[derive(Debug, Clone)]
pub struct AddressCache {
    composer: Composer,
    last: Option<(AddressKey, String)>,
}

impl AddressCache {
    pub fn new(composer: Composer) -> Self {
        Self {
            composer,
            last: None,
        }
    }

    /// The composed address for `config`.
    pub fn address_for(&mut self, config: &ReportConfiguration) -> &str {
        let key = AddressKey::of(config);
        let stale = self.last.as_ref().is_none_or(|(cached, _)| *cached != key);
        if stale {
            let composed = self.composer.compose_configuration(config);
            self.last = Some((key, composed));
        }
        self.last.as_ref().map(|(_, address)| address.as_str()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reportframe_core::Zoom;

    #[test]
    fn recomposes_only_when_address_fields_change() {
        let mut cache = AddressCache::new(Composer::default());
        let mut config = ReportConfiguration::for_address("https://host/reports/report?/Sales");
        let first = cache.address_for(&config).to_string();
        assert!(first.contains("rs%3AEmbed=true"));

        config.declared_height = 1200;
        config.auto_fit = false;
        assert_eq!(cache.address_for(&config), first);

        config.zoom = Some(Zoom::WholePage);
        assert!(cache.address_for(&config).ends_with("rc%3AZoom=Whole+Page"));
    }

    #[test]
    fn empty_address_composes_to_empty() {
        let mut cache = AddressCache::new(Composer::default());
        assert_eq!(cache.address_for(&ReportConfiguration::default()), "");
    }
}
