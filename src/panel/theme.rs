//! Injected look-and-feel lookups.
//!
//! Panels ask a [`ThemeProvider`] for border insets and cosmetic colours
//! instead of reading global UI defaults, so they work without a host.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Insets;

/// 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(raw: &str) -> Option<Self> {
        let hex = raw.strip_prefix('#').unwrap_or(raw);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

pub trait ThemeProvider {
    /// Border insets for a wrap panel that has no explicit border.
    fn panel_insets(&self) -> Insets;

    fn color(&self, key: &str) -> Option<Rgb>;
}

/// Theme backed by a fixed table, loadable from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticTheme {
    pub panel_insets: Insets,
    pub colors: HashMap<String, String>,
}

impl StaticTheme {
    pub fn new(panel_insets: Insets) -> Self {
        Self {
            panel_insets,
            colors: HashMap::new(),
        }
    }

    pub fn with_color(mut self, key: impl Into<String>, hex: impl Into<String>) -> Self {
        self.colors.insert(key.into(), hex.into());
        self
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl ThemeProvider for StaticTheme {
    fn panel_insets(&self) -> Insets {
        self.panel_insets
    }

    fn color(&self, key: &str) -> Option<Rgb> {
        self.colors.get(key).and_then(|hex| Rgb::from_hex(hex))
    }
}
