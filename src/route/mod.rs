use std::collections::BTreeMap;

use crate::theme::ThemeId;

pub const DEFAULT_ROUTE: &str = "/";

/// Static route path to mandatory theme map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    overrides: BTreeMap<String, ThemeId>,
}

impl RouteTable {
    pub fn empty() -> Self {
        Self {
            overrides: BTreeMap::new(),
        }
    }

    pub fn from_overrides<I, S>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (S, ThemeId)>,
        S: Into<String>,
    {
        Self {
            overrides: overrides
                .into_iter()
                .map(|(route, theme)| (route.into(), theme))
                .collect(),
        }
    }

    pub fn override_for(&self, route: &str) -> Option<ThemeId> {
        self.overrides.get(route).copied()
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ThemeId)> {
        self.overrides
            .iter()
            .map(|(route, theme)| (route.as_str(), *theme))
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::from_overrides([
            ("/trailers", ThemeId::Dark),
            ("/docs", ThemeId::Light),
            ("/accessibility", ThemeId::HighContrast),
        ])
    }
}

pub fn effective_theme(table: &RouteTable, route: &str, base_theme: ThemeId) -> ThemeId {
    table.override_for(route).unwrap_or(base_theme)
}

/// Owns the current route and shadows the base theme with route overrides.
#[derive(Debug, Clone)]
pub struct RouteOverrideLayer {
    table: RouteTable,
    current_route: String,
}

impl RouteOverrideLayer {
    pub fn new(table: RouteTable, initial_route: impl Into<String>) -> Self {
        Self {
            table,
            current_route: initial_route.into(),
        }
    }

    pub fn current_route(&self) -> &str {
        &self.current_route
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn navigate_to(&mut self, route: impl Into<String>) {
        self.current_route = route.into();
    }

    pub fn active_override(&self) -> Option<ThemeId> {
        self.table.override_for(&self.current_route)
    }

    pub fn effective_theme(&self, base_theme: ThemeId) -> ThemeId {
        effective_theme(&self.table, &self.current_route, base_theme)
    }
}

impl Default for RouteOverrideLayer {
    fn default() -> Self {
        Self::new(RouteTable::default(), DEFAULT_ROUTE)
    }
}
