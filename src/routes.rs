//! Static routing table: path prefix → upstream service.
//!
//! The table is built once at startup and never changes. Mount prefixes are
//! disjoint; overlapping public allow-list entries are a configuration error
//! detected here, not resolved by matching order.

use crate::config::Config;

/// Per-mount authentication requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    /// The whole mount is open.
    Public,
    /// A bearer token is required, except for paths on the public allow-list.
    Required,
}

#[derive(Debug, Clone)]
pub struct RouteRule {
    /// Mount prefix, e.g. `/auth`. Matched on path-segment boundaries.
    pub prefix: String,
    /// Upstream base URL the stripped path is appended to.
    pub upstream: String,
    pub auth: AuthRequirement,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    /// Paths admitted without a token, matched by prefix on the full path.
    public_prefixes: Vec<String>,
}

impl RouteTable {
    pub fn new(rules: Vec<RouteRule>, public_prefixes: Vec<String>) -> anyhow::Result<Self> {
        // Overlapping entries would make classification order-dependent,
        // which the allow-list contract rules out.
        for (i, a) in public_prefixes.iter().enumerate() {
            for b in public_prefixes.iter().skip(i + 1) {
                if a.starts_with(b.as_str()) || b.starts_with(a.as_str()) {
                    anyhow::bail!("overlapping public route prefixes: {} and {}", a, b);
                }
            }
        }
        for (i, a) in rules.iter().enumerate() {
            for b in rules.iter().skip(i + 1) {
                if a.prefix == b.prefix {
                    anyhow::bail!("duplicate route prefix: {}", a.prefix);
                }
            }
        }
        Ok(Self {
            rules,
            public_prefixes,
        })
    }

    /// The fixed production table: `/auth`, `/payment`, `/resource`, with
    /// login and register open.
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        Self::new(
            vec![
                RouteRule {
                    prefix: "/auth".into(),
                    upstream: cfg.auth_service_url.clone(),
                    auth: AuthRequirement::Required,
                },
                RouteRule {
                    prefix: "/payment".into(),
                    upstream: cfg.payment_service_url.clone(),
                    auth: AuthRequirement::Required,
                },
                RouteRule {
                    prefix: "/resource".into(),
                    upstream: cfg.resource_service_url.clone(),
                    auth: AuthRequirement::Required,
                },
            ],
            vec!["/auth/login".into(), "/auth/register".into()],
        )
    }

    /// Finds the rule whose mount prefix covers `path`.
    pub fn match_route(&self, path: &str) -> Option<&RouteRule> {
        self.rules.iter().find(|rule| {
            path == rule.prefix
                || path
                    .strip_prefix(rule.prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Whether `path` is admitted without authentication.
    pub fn is_public(&self, path: &str) -> bool {
        if let Some(rule) = self.match_route(path) {
            if rule.auth == AuthRequirement::Public {
                return true;
            }
        }
        self.public_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}
