//! Hash routes: `#/` (tutorial list) and `#/tutorial/:id` (tutorial page).

use std::fmt;

use monotone_shared::{RouteParam, TutorialId};

/// A parsed navigable location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The tutorial list.
    Home,
    /// A tutorial page. The parameter is whatever the location carried.
    Tutorial(RouteParam),
    /// A location no route matches.
    Unknown(String),
}

impl Route {
    /// Parse a location fragment such as `#/tutorial/3`.
    pub fn parse(location: &str) -> Self {
        let path = location.strip_prefix('#').unwrap_or(location);
        let path = path.split(['?', '#']).next().unwrap_or_default();

        if path.is_empty() {
            return Self::Home;
        }
        if !path.starts_with('/') {
            return Self::Unknown(location.to_string());
        }

        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["tutorial", param] if !param.is_empty() => Self::Tutorial(RouteParam::new(*param)),
            _ => Self::Unknown(location.to_string()),
        }
    }

    pub fn tutorial(id: TutorialId) -> Self {
        Self::Tutorial(RouteParam::from(id))
    }

    /// The parameter a tutorial loader should follow, if any.
    pub fn param(&self) -> Option<&RouteParam> {
        match self {
            Self::Tutorial(param) => Some(param),
            Self::Home | Self::Unknown(_) => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "#/"),
            Self::Tutorial(param) => write!(f, "#/tutorial/{param}"),
            Self::Unknown(raw) => f.write_str(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_home_variants() {
        for loc in ["", "#", "#/", "/", "#//"] {
            assert_eq!(Route::parse(loc), Route::Home, "{loc:?}");
        }
    }

    #[test]
    fn parse_tutorial() {
        assert_eq!(
            Route::parse("#/tutorial/3"),
            Route::Tutorial(RouteParam::new("3"))
        );
        assert_eq!(
            Route::parse("/tutorial/3/"),
            Route::Tutorial(RouteParam::new("3"))
        );
        assert_eq!(
            Route::parse("#/tutorial/3?ref=list"),
            Route::Tutorial(RouteParam::new("3"))
        );
    }

    #[test]
    fn parse_keeps_malformed_param() {
        let route = Route::parse("#/tutorial/abc");
        assert_eq!(route.param().map(RouteParam::as_str), Some("abc"));
        assert_eq!(route.param().and_then(RouteParam::tutorial_id), None);
    }

    #[test]
    fn parse_unknown() {
        for loc in ["#/tutorial", "#/tutorial/", "#/tutorial/1/edit", "#/about", "tutorial/1"] {
            assert!(matches!(Route::parse(loc), Route::Unknown(_)), "{loc:?}");
        }
        assert_eq!(Route::parse("#/about").param(), None);
    }

    #[test]
    fn display_is_canonical_fragment() {
        assert_eq!(Route::Home.to_string(), "#/");
        assert_eq!(Route::tutorial(TutorialId(12)).to_string(), "#/tutorial/12");
        assert_eq!(Route::parse(&Route::tutorial(TutorialId(5)).to_string()), Route::tutorial(TutorialId(5)));
    }
}
