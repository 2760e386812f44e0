use http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::SocketHub;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

impl AllowedOrigins {
    /// `*` (or empty) means any origin; otherwise a comma-separated list.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "*" {
            return AllowedOrigins::Any;
        }
        let list: Vec<String> = trimmed
            .split(',')
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if list.iter().any(|s| s == "*") {
            AllowedOrigins::Any
        } else {
            AllowedOrigins::List(list)
        }
    }
}

/// Real-time messaging extension: origin policy for the socket endpoint plus
/// the room hub that route groups publish into.
#[derive(Clone)]
pub struct SocketLayer {
    origins: AllowedOrigins,
    hub: SocketHub,
}

impl SocketLayer {
    pub fn new(origins: AllowedOrigins) -> Self {
        Self {
            origins,
            hub: SocketHub::new(),
        }
    }

    pub fn hub(&self) -> &SocketHub {
        &self.hub
    }

    /// Non-browser clients send no `Origin`; they are always accepted.
    pub fn accepts_origin(&self, origin: Option<&str>) -> bool {
        match (&self.origins, origin) {
            (AllowedOrigins::Any, _) | (_, None) => true,
            (AllowedOrigins::List(list), Some(o)) => {
                let o = o.trim_end_matches('/');
                list.iter().any(|allowed| allowed == o)
            }
        }
    }

    /// Wildcard CORS cannot carry credentials, so none are allowed here.
    pub fn cors(&self) -> CorsLayer {
        let base = CorsLayer::new()
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers(Any);
        match &self.origins {
            AllowedOrigins::Any => base.allow_origin(Any),
            AllowedOrigins::List(list) => {
                let values: Vec<HeaderValue> = list
                    .iter()
                    .filter_map(|o| HeaderValue::from_str(o).ok())
                    .collect();
                base.allow_origin(AllowOrigin::list(values))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_origins() {
        assert_eq!(AllowedOrigins::parse("*"), AllowedOrigins::Any);
        assert_eq!(AllowedOrigins::parse(""), AllowedOrigins::Any);
        assert_eq!(AllowedOrigins::parse("http://a, *"), AllowedOrigins::Any);
        assert_eq!(
            AllowedOrigins::parse("http://a.test/, https://b.test"),
            AllowedOrigins::List(vec!["http://a.test".into(), "https://b.test".into()])
        );
    }

    #[test]
    fn any_policy_accepts_arbitrary_origins() {
        let layer = SocketLayer::new(AllowedOrigins::Any);
        assert!(layer.accepts_origin(Some("http://evil.example")));
        assert!(layer.accepts_origin(None));
    }

    #[test]
    fn list_policy_checks_membership() {
        let layer = SocketLayer::new(AllowedOrigins::parse("http://a.test"));
        assert!(layer.accepts_origin(Some("http://a.test/")));
        assert!(!layer.accepts_origin(Some("http://b.test")));
        assert!(layer.accepts_origin(None));
    }
}
