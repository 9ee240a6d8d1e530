//! Network capability with URL route remapping.
//!
//! Sandboxed apps reach external services through the sandbox's own origin:
//! a request to `media.example.com` must travel as a path under the app's
//! host, where the host proxies it onward. Mappings declare that translation
//! with `{placeholder}` patterns:
//!
//! ```text
//! prefix: "/media/{bucket}"   target: "{bucket}.example.com"
//! https://assets.example.com/img/1.png
//!     → https://<own host>/media/assets/img/1.png/
//! ```
//!
//! [`RemappedNetwork`] applies the mappings and delegates to a caller-supplied
//! [`NetworkEnvironment`]. Activation is optional and carries no protocol
//! state; clients that talk to no external services never touch this module.

// ============================================================================
// Imports
// ============================================================================

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Route Mappings
// ============================================================================

/// `{placeholder}` tokens inside prefixes and targets.
static SUBSTITUTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([a-z]+)\}").expect("substitution pattern is valid")
});

/// One external route: requests whose host matches `target` are rewritten
/// onto the own-origin path `prefix`.
///
/// Placeholders captured from `target` are substituted into `prefix`, so a
/// single mapping can cover a family of hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteMapping {
    /// Own-origin path prefix, possibly holding `{placeholder}` tokens.
    pub prefix: String,
    /// External host (optionally `host/path`) to match against.
    pub target: String,
}

/// Builds the matcher for a mapping target, turning each `{placeholder}`
/// into a named capture of one hostname label.
fn regex_from_target(target: &str) -> Result<Regex> {
    let pattern = SUBSTITUTION.replace_all(target, |caps: &Captures<'_>| {
        format!("(?<{}>[\\w-]+)", &caps[1])
    });
    Regex::new(&format!("{pattern}(/|$)"))
        .map_err(|e| Error::config(format!("invalid route target {target:?}: {e}")))
}

/// Substitutes captured placeholder values into a mapping prefix.
fn substitute_prefix(prefix: &str, captures: &Captures<'_>) -> Result<String> {
    let mut out = String::new();
    let mut last = 0;
    for token in SUBSTITUTION.captures_iter(prefix) {
        let (Some(whole), Some(name)) = (token.get(0), token.get(1)) else {
            continue;
        };
        let value = captures
            .name(name.as_str())
            .ok_or_else(|| Error::config(format!("misconfigured route: no capture for {{{}}}", name.as_str())))?;
        out.push_str(&prefix[last..whole.start()]);
        out.push_str(value.as_str());
        last = whole.end();
    }
    out.push_str(&prefix[last..]);
    Ok(out)
}

/// Rewrites `original` onto the own origin when it matches `mapping`.
///
/// Returns `Ok(None)` when the mapping does not apply.
fn match_and_rewrite_url(
    original: &Url,
    mapping: &RouteMapping,
    own_host: &str,
) -> Result<Option<Url>> {
    let target_url = Url::parse(&format!("https://{}", mapping.target))
        .map_err(|e| Error::config(format!("invalid route target {:?}: {e}", mapping.target)))?;
    let target_host = target_url
        .host_str()
        .ok_or_else(|| Error::config(format!("route target {:?} has no host", mapping.target)))?;

    let matcher = regex_from_target(target_host)?;
    let Some(captures) = matcher.captures(original.as_str()) else {
        return Ok(None);
    };

    let mut rewritten = original.clone();
    set_authority(&mut rewritten, own_host)?;

    let mut path = substitute_prefix(&mapping.prefix, &captures)?;
    if path == "/" {
        path.push_str(original.path().trim_start_matches('/'));
    } else {
        path.push_str(original.path());
    }
    // The target's own path segment is the proxy's concern, not the app's.
    if target_url.path() != "/" {
        path = path.replacen(target_url.path(), "", 1);
    }
    if !path.ends_with('/') {
        path.push('/');
    }
    rewritten.set_path(&path);
    Ok(Some(rewritten))
}

/// Replaces a URL's host (and port, when the authority carries one).
fn set_authority(url: &mut Url, authority: &str) -> Result<()> {
    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => {
            let port = port
                .parse::<u16>()
                .map_err(|e| Error::config(format!("invalid port in {authority:?}: {e}")))?;
            (host, Some(port))
        }
        _ => (authority, None),
    };
    url.set_host(Some(host))
        .map_err(|e| Error::config(format!("invalid host {host:?}: {e}")))?;
    url.set_port(port)
        .map_err(|()| Error::config(format!("cannot set port on {url}")))?;
    Ok(())
}

/// Applies the first matching mapping; an unmatched URL passes through.
fn attempt_remap(url: &Url, mappings: &[RouteMapping], own_host: &str) -> Result<Url> {
    for mapping in mappings {
        if let Some(rewritten) = match_and_rewrite_url(url, mapping, own_host)? {
            debug!(original = %url, rewritten = %rewritten, "route remapped");
            return Ok(rewritten);
        }
    }
    Ok(url.clone())
}

/// Resolves a possibly root-relative URL against the own origin.
fn absolute_url(url: &str, scheme: &str, own_host: &str) -> Result<Url> {
    let resolved = if url.starts_with('/') {
        Url::parse(&format!("{scheme}://{own_host}{url}"))
    } else {
        Url::parse(url)
    };
    resolved.map_err(|e| Error::config(format!("invalid URL {url:?}: {e}")))
}

// ============================================================================
// NetworkEnvironment Capability
// ============================================================================

/// Outbound network capability supplied by the embedding application.
///
/// Implementations receive fully resolved, already remapped URLs.
pub trait NetworkEnvironment: Send + Sync {
    /// Issues a one-shot request for `url`.
    fn issue_fetch(&self, url: &Url) -> Result<()>;

    /// Opens a request with an explicit method.
    fn open_request(&self, method: &str, url: &Url) -> Result<()>;

    /// Opens a socket connection, negotiating `protocols`.
    fn open_socket(&self, url: &Url, protocols: &[String]) -> Result<()>;
}

impl<E: NetworkEnvironment + ?Sized> NetworkEnvironment for std::sync::Arc<E> {
    fn issue_fetch(&self, url: &Url) -> Result<()> {
        (**self).issue_fetch(url)
    }

    fn open_request(&self, method: &str, url: &Url) -> Result<()> {
        (**self).open_request(method, url)
    }

    fn open_socket(&self, url: &Url, protocols: &[String]) -> Result<()> {
        (**self).open_socket(url, protocols)
    }
}

// ============================================================================
// RemappedNetwork
// ============================================================================

/// Route-remapping front for a [`NetworkEnvironment`].
///
/// Requests and sockets are resolved against the own origin, run through the
/// mapping table, and handed to the wrapped environment. Sockets default to
/// the secure scheme when given a root-relative URL.
pub struct RemappedNetwork<E> {
    env: E,
    mappings: Vec<RouteMapping>,
    own_scheme: String,
    own_host: String,
}

impl<E: NetworkEnvironment> RemappedNetwork<E> {
    /// Wraps `env` with the given mapping table and own origin.
    ///
    /// `own_host` may carry a port (`localhost:3333`).
    pub fn new(
        env: E,
        mappings: Vec<RouteMapping>,
        own_scheme: impl Into<String>,
        own_host: impl Into<String>,
    ) -> Self {
        Self {
            env,
            mappings,
            own_scheme: own_scheme.into(),
            own_host: own_host.into(),
        }
    }

    /// Issues a fetch for `url`, remapped.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unparsable URLs or misconfigured
    /// mappings, and propagates environment faults.
    pub fn issue_fetch(&self, url: &str) -> Result<()> {
        let resolved = absolute_url(url, &self.own_scheme, &self.own_host)?;
        let remapped = attempt_remap(&resolved, &self.mappings, &self.own_host)?;
        self.env.issue_fetch(&remapped)
    }

    /// Opens a `method` request for `url`, remapped.
    ///
    /// # Errors
    ///
    /// Same contract as [`issue_fetch`](Self::issue_fetch).
    pub fn open_request(&self, method: &str, url: &str) -> Result<()> {
        let resolved = absolute_url(url, &self.own_scheme, &self.own_host)?;
        let remapped = attempt_remap(&resolved, &self.mappings, &self.own_host)?;
        self.env.open_request(method, &remapped)
    }

    /// Opens a socket for `url`, remapped.
    ///
    /// # Errors
    ///
    /// Same contract as [`issue_fetch`](Self::issue_fetch).
    pub fn open_socket(&self, url: &str, protocols: &[String]) -> Result<()> {
        let resolved = absolute_url(url, "wss", &self.own_host)?;
        let remapped = attempt_remap(&resolved, &self.mappings, &self.own_host)?;
        self.env.open_socket(&remapped, protocols)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    const OWN_HOST: &str = "123456789012345678.example-activities.com";

    fn mapping(prefix: &str, target: &str) -> RouteMapping {
        RouteMapping {
            prefix: prefix.to_string(),
            target: target.to_string(),
        }
    }

    fn remap(url: &str, mappings: &[RouteMapping]) -> String {
        let url = Url::parse(url).expect("test url");
        attempt_remap(&url, mappings, OWN_HOST)
            .expect("remap")
            .to_string()
    }

    #[test]
    fn test_plain_target_rewrite() {
        let mappings = [mapping("/maps", "www.google.com")];
        assert_eq!(
            remap("https://www.google.com/directions", &mappings),
            format!("https://{OWN_HOST}/maps/directions/")
        );
    }

    #[test]
    fn test_placeholder_capture_and_substitution() {
        let mappings = [mapping("/media/{bucket}", "{bucket}.storage.example.com")];
        assert_eq!(
            remap(
                "https://game-assets.storage.example.com/img/1.png",
                &mappings
            ),
            format!("https://{OWN_HOST}/media/game-assets/img/1.png/")
        );
    }

    #[test]
    fn test_target_path_segment_is_stripped() {
        let mappings = [mapping("/api", "backend.example.com/api-v2")];
        assert_eq!(
            remap("https://backend.example.com/api-v2/users", &mappings),
            format!("https://{OWN_HOST}/api/users/")
        );
    }

    #[test]
    fn test_unmatched_url_passes_through() {
        let mappings = [mapping("/maps", "www.google.com")];
        assert_eq!(
            remap("https://unrelated.example.com/page", &mappings),
            "https://unrelated.example.com/page"
        );
    }

    #[test]
    fn test_later_mapping_still_consulted() {
        let mappings = [
            mapping("/first", "first.example.com"),
            mapping("/second", "second.example.com"),
        ];
        assert_eq!(
            remap("https://second.example.com/x", &mappings),
            format!("https://{OWN_HOST}/second/x/")
        );
    }

    #[test]
    fn test_misconfigured_prefix_placeholder() {
        let url = Url::parse("https://cdn.example.com/a").expect("test url");
        let mappings = [mapping("/{missing}", "cdn.example.com")];
        let err = attempt_remap(&url, &mappings, OWN_HOST).expect_err("no capture");
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_own_host_port_preserved() -> anyhow::Result<()> {
        let url = Url::parse("https://api.example.com/v1")?;
        let mappings = [mapping("/api", "api.example.com")];
        let remapped = attempt_remap(&url, &mappings, "localhost:3333")?;
        assert_eq!(remapped.to_string(), "https://localhost:3333/api/v1/");
        Ok(())
    }

    #[test]
    fn test_absolute_url_resolves_root_relative() {
        let resolved = absolute_url("/token", "https", OWN_HOST).expect("resolve");
        assert_eq!(resolved.to_string(), format!("https://{OWN_HOST}/token"));

        let passthrough = absolute_url("https://elsewhere.example.com/x", "https", OWN_HOST)
            .expect("resolve");
        assert_eq!(passthrough.host_str(), Some("elsewhere.example.com"));
    }

    // ------------------------------------------------------------------------
    // RemappedNetwork delegation
    // ------------------------------------------------------------------------

    #[derive(Default)]
    struct RecordingEnv {
        calls: Mutex<Vec<String>>,
    }

    impl NetworkEnvironment for RecordingEnv {
        fn issue_fetch(&self, url: &Url) -> Result<()> {
            self.calls.lock().push(format!("FETCH {url}"));
            Ok(())
        }

        fn open_request(&self, method: &str, url: &Url) -> Result<()> {
            self.calls.lock().push(format!("{method} {url}"));
            Ok(())
        }

        fn open_socket(&self, url: &Url, protocols: &[String]) -> Result<()> {
            self.calls
                .lock()
                .push(format!("SOCKET {url} {}", protocols.join(",")));
            Ok(())
        }
    }

    fn wrapped() -> (RemappedNetwork<Arc<RecordingEnv>>, Arc<RecordingEnv>) {
        let env = Arc::new(RecordingEnv::default());
        let network = RemappedNetwork::new(
            Arc::clone(&env),
            vec![mapping("/voice", "voice.example.com")],
            "https",
            OWN_HOST,
        );
        (network, env)
    }

    #[test]
    fn test_fetch_delegates_remapped() {
        let (network, env) = wrapped();
        network
            .issue_fetch("https://voice.example.com/regions")
            .expect("fetch");
        assert_eq!(
            *env.calls.lock(),
            vec![format!("FETCH https://{OWN_HOST}/voice/regions/")]
        );
    }

    #[test]
    fn test_request_resolves_relative_against_own_origin() {
        let (network, env) = wrapped();
        network.open_request("POST", "/token").expect("request");
        assert_eq!(
            *env.calls.lock(),
            vec![format!("POST https://{OWN_HOST}/token")]
        );
    }

    #[test]
    fn test_socket_defaults_to_secure_scheme() {
        let (network, env) = wrapped();
        network
            .open_socket("/gateway", &["rpc".to_string()])
            .expect("socket");
        assert_eq!(
            *env.calls.lock(),
            vec![format!("SOCKET wss://{OWN_HOST}/gateway rpc")]
        );
    }
}
