//! Pattern-based HTML URL rewriting.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::http::request::ProxyOrigin;
use crate::rewrite::HtmlRewriter;
use crate::upstream::Upstream;

/// `href="/`, `src="/`, `action="/`, with an optional second slash captured
/// so protocol-relative values can be left alone.
static ROOT_RELATIVE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(href|src|action)="/(/?)"#).expect("attribute pattern is valid")
});

/// Rewrites upstream URLs with plain string patterns, no DOM parsing.
///
/// Rules run in order, each on the output of the previous one:
/// 1. the upstream base (`https://upstream`) becomes the proxy base
/// 2. double-quoted `href`/`src`/`action` values starting with a single `/`
///    are prefixed with the proxy base
/// 3. protocol-relative `//upstream` becomes `//proxy-host`
///
/// Single-quoted or unquoted attributes and URLs built by scripts are left
/// untouched.
#[derive(Debug, Clone)]
pub struct PatternRewriter {
    upstream_base: String,
    upstream_protocol_relative: String,
}

impl PatternRewriter {
    pub fn new(upstream: &Upstream) -> Self {
        Self {
            upstream_base: upstream.base().to_string(),
            upstream_protocol_relative: format!("//{}", upstream.authority()),
        }
    }
}

impl HtmlRewriter for PatternRewriter {
    fn rewrite(&self, html: &str, origin: &ProxyOrigin) -> String {
        let proxy_base = origin.base();

        let html = html.replace(&self.upstream_base, &proxy_base);

        let html = ROOT_RELATIVE_ATTR.replace_all(&html, |caps: &Captures<'_>| {
            if caps[2].is_empty() {
                format!("{}=\"{}/", &caps[1], proxy_base)
            } else {
                caps[0].to_string()
            }
        });

        html.replace(
            &self.upstream_protocol_relative,
            &format!("//{}", origin.host),
        )
    }
}
