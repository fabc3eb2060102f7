//! Optional module capabilities: translations and theme extensions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Locale → key → text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Translations {
    locales: BTreeMap<String, BTreeMap<String, String>>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        locale: impl Into<String>,
        key: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.insert(locale, key, text);
        self
    }

    pub fn insert(
        &mut self,
        locale: impl Into<String>,
        key: impl Into<String>,
        text: impl Into<String>,
    ) {
        self.locales
            .entry(locale.into())
            .or_default()
            .insert(key.into(), text.into());
    }

    /// Looks `key` up in `locale`, then in `fallback`.
    pub fn lookup(&self, locale: &str, fallback: &str, key: &str) -> Option<&str> {
        self.locales
            .get(locale)
            .and_then(|texts| texts.get(key))
            .or_else(|| self.locales.get(fallback).and_then(|texts| texts.get(key)))
            .map(String::as_str)
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }
}

/// Theme token overrides contributed by a module (colors, fonts, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeExtensions {
    tokens: BTreeMap<String, String>,
}

impl ThemeExtensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), value.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tokens.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Resolves text for the active locale.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    translations: Option<&'a Translations>,
    locale: &'a str,
    fallback: &'a str,
}

impl<'a> Translator<'a> {
    pub fn new(translations: Option<&'a Translations>, locale: &'a str, fallback: &'a str) -> Self {
        Self {
            translations,
            locale,
            fallback,
        }
    }

    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.translations?.lookup(self.locale, self.fallback, key)
    }

    /// Translated text, or the key itself when no translation exists.
    pub fn text(&self, key: &str) -> String {
        self.get(key).unwrap_or(key).to_owned()
    }

    pub fn locale(&self) -> &'a str {
        self.locale
    }
}
