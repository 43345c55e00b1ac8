use crate::config::RoutesConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param,
}

/// A route such as `/wishlists/:id`. `:name` segments match any single segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(raw: &str) -> Self {
        let segments = split(raw)
            .map(|segment| {
                if segment.starts_with(':') {
                    Segment::Param
                } else {
                    Segment::Literal(segment.to_string())
                }
            })
            .collect();
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = split(strip_query(path)).collect();
        parts.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(parts)
                .all(|(segment, part)| match segment {
                    Segment::Literal(literal) => literal == part,
                    Segment::Param => true,
                })
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// The routes the guard cares about: where to log in, where home is, and
/// which paths need no session.
#[derive(Debug, Clone)]
pub struct RouteTable {
    login: RoutePattern,
    home: RoutePattern,
    public: Vec<RoutePattern>,
}

impl RouteTable {
    pub fn new(login: &str, home: &str, public: &[String]) -> Self {
        Self {
            login: RoutePattern::parse(login),
            home: RoutePattern::parse(home),
            public: public.iter().map(|p| RoutePattern::parse(p)).collect(),
        }
    }

    pub fn from_config(config: &RoutesConfig) -> Self {
        Self::new(&config.login, &config.home, &config.public)
    }

    pub fn login(&self) -> &str {
        self.login.as_str()
    }

    pub fn home(&self) -> &str {
        self.home.as_str()
    }

    pub fn is_login(&self, path: &str) -> bool {
        self.login.matches(path)
    }

    /// The login route counts as public too.
    pub fn is_public(&self, path: &str) -> bool {
        self.is_login(path) || self.public.iter().any(|p| p.matches(path))
    }
}
