//! Built-in provider set seeded into every default registry.

use oembed_types::OEmbedError;
use tracing::warn;

use crate::provider::Provider;

/// Static description of a well-known oEmbed provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinProvider {
    pub name: &'static str,
    pub endpoint: &'static str,
    pub website: &'static str,
    pub schemes: &'static [&'static str],
}

impl BuiltinProvider {
    pub fn to_provider(&self) -> Result<Provider, OEmbedError> {
        Provider::new(self.endpoint, self.name, Some(self.website.to_string()), self.schemes.iter().copied())
    }
}

pub const FLICKR: BuiltinProvider = BuiltinProvider {
    name: "Flickr",
    endpoint: "http://www.flickr.com/services/oembed/",
    website: "http://www.flickr.com",
    schemes: &["http://*.flickr.com/*"],
};

pub const YOUTUBE: BuiltinProvider = BuiltinProvider {
    name: "YouTube",
    endpoint: "http://www.youtube.com/oembed",
    website: "http://www.youtube.com",
    schemes: &["http://*.youtube.com/*"],
};

pub const VIMEO: BuiltinProvider = BuiltinProvider {
    name: "Vimeo",
    endpoint: "http://www.vimeo.com/api/oembed.json",
    website: "http://www.vimeo.com",
    schemes: &["http://*.vimeo.com/*", "http://*.vimeo.com/groups/*/*"],
};

pub const SLIDESHARE: BuiltinProvider = BuiltinProvider {
    name: "SlideShare",
    endpoint: "http://www.slideshare.net/api/oembed/2",
    website: "http://www.slideshare.net",
    schemes: &["http://www.slideshare.net/*/*"],
};

pub const SMUGMUG: BuiltinProvider = BuiltinProvider {
    name: "SmugMug",
    endpoint: "http://api.smugmug.com/services/oembed/",
    website: "http://www.smugmug.com",
    schemes: &["http://*.smugmug.com/*"],
};

pub const VIDDLER: BuiltinProvider = BuiltinProvider {
    name: "Viddler",
    endpoint: "http://lab.viddler.com/services/oembed/",
    website: "http://www.viddler.com",
    schemes: &["http://*.viddler.com/*"],
};

pub const REVISION3: BuiltinProvider = BuiltinProvider {
    name: "Revision3",
    endpoint: "http://revision3.com/api/oembed/",
    website: "http://www.revision3.com",
    schemes: &["http://*.revision3.com/*"],
};

pub const IFIXIT: BuiltinProvider = BuiltinProvider {
    name: "iFixit",
    endpoint: "http://www.ifixit.com/Embed",
    website: "http://www.ifixit.com",
    schemes: &["http://*.ifixit.com/Guide/View/*"],
};

pub const POLL_EVERYWHERE: BuiltinProvider = BuiltinProvider {
    name: "Poll Everywhere",
    endpoint: "http://www.polleverywhere.com/services/oembed/",
    website: "http://www.polleverywhere.com",
    schemes: &[
        "http://*.polleverywhere.com/polls/*",
        "http://*.polleverywhere.com/multiple_choice_polls/*",
        "http://*.polleverywhere.com/free_text_polls/*",
    ],
};

pub const QIK: BuiltinProvider = BuiltinProvider {
    name: "Qik",
    endpoint: "http://qik.com/api/oembed.json",
    website: "http://www.qik.com",
    schemes: &["http://qik.com/video/*", "http://qik.com/*"],
};

pub const HULU: BuiltinProvider = BuiltinProvider {
    name: "Hulu",
    endpoint: "http://www.hulu.com/api/oembed.json",
    website: "http://www.hulu.com",
    schemes: &["http://www.hulu.com/watch/*"],
};

pub const TWITTER: BuiltinProvider = BuiltinProvider {
    name: "Twitter",
    endpoint: "https://api.twitter.com/1/statuses/oembed.json",
    website: "http://twitter.com",
    schemes: &["http://twitter.com/*/status/*", "https://twitter.com/*/status/*"],
};

/// Built-in providers in registry priority order.
pub const BUILTIN_PROVIDERS: &[BuiltinProvider] = &[
    FLICKR,
    YOUTUBE,
    VIMEO,
    SLIDESHARE,
    SMUGMUG,
    VIDDLER,
    REVISION3,
    IFIXIT,
    POLL_EVERYWHERE,
    QIK,
    HULU,
    TWITTER,
];

/// Instantiate every built-in provider.
pub fn default_providers() -> Vec<Provider> {
    BUILTIN_PROVIDERS
        .iter()
        .filter_map(|builtin| match builtin.to_provider() {
            Ok(provider) => Some(provider),
            Err(error) => {
                warn!(provider = builtin.name, error = %error, "skipping invalid built-in provider");
                None
            }
        })
        .collect()
}
