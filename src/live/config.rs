//! Connection configuration.
//!
//! Everything the original host page injected as globals (apphook,
//! language, post slug) is passed in explicitly here, together with the
//! page's host and transport security.

use url::Url;

/// Where and how to reach the live-blog feed for one post.
#[derive(Clone, Debug)]
pub struct LiveblogConfig {
    /// Apphook config namespace the post lives under.
    pub apphook: String,
    /// Language code of the post translation.
    pub language: String,
    /// Post slug (or id) identifying the stream.
    pub post: String,
    /// Host (and optional port) of the page serving the blog.
    pub host: String,
    /// Whether the page is served over a secure transport. Mirrored onto
    /// the socket scheme (wss vs ws) to avoid mixed-content failures.
    pub secure: bool,
}

impl LiveblogConfig {
    pub fn new(
        apphook: impl Into<String>,
        language: impl Into<String>,
        post: impl Into<String>,
    ) -> Self {
        Self {
            apphook: apphook.into(),
            language: language.into(),
            post: post.into(),
            host: "localhost:8000".to_string(),
            secure: false,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Build the connection target:
    /// `ws(s)://{host}/liveblog/liveblog/{apphook}/{language}/{post}/`
    pub fn connection_url(&self) -> Result<Url, url::ParseError> {
        let scheme = if self.secure { "wss" } else { "ws" };
        Url::parse(&format!(
            "{}://{}/liveblog/liveblog/{}/{}/{}/",
            scheme, self.host, self.apphook, self.language, self.post
        ))
    }
}
