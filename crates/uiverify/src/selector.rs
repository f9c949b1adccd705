//! Step targets and the DOM queries used to resolve them.
//!
//! Targets are written as plain strings in scenario files:
//!
//! - `commitments-button` or `testid=commitments-button` (also `data-testid=`)
//!   matches `[data-testid="commitments-button"]`
//! - `css=button.primary` is passed through as a CSS selector
//! - `text=Main Bank` matches the deepest element whose text contains the value
//!
//! A bare string is a test id, because stable `data-testid` attributes are the
//! contract with the application under test.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::result::{VerifyError, VerifyResult};

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Selector {
    /// Test ID selector (data-testid attribute)
    TestId(String),
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// Text content selector
    Text(String),
}

impl Selector {
    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Parse the scenario-file notation
    pub fn parse(raw: &str) -> VerifyResult<Self> {
        let raw = raw.trim();
        let (prefix, value) = match raw.split_once('=') {
            Some((p @ ("testid" | "data-testid" | "css" | "text"), v)) => (p, v),
            _ => ("testid", raw),
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(VerifyError::scenario(format!("empty selector: {raw:?}")));
        }
        Ok(match prefix {
            "css" => Self::Css(value.to_string()),
            "text" => Self::Text(value.to_string()),
            _ => Self::TestId(value.to_string()),
        })
    }

    /// CSS form of the selector, when one exists
    #[must_use]
    pub fn as_css(&self) -> Option<String> {
        match self {
            Self::TestId(id) => Some(format!(
                "[data-testid=\"{}\"]",
                id.replace('\\', "\\\\").replace('"', "\\\"")
            )),
            Self::Css(css) => Some(css.clone()),
            Self::Text(_) => None,
        }
    }

    /// JavaScript expression evaluating to the matched element or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Text(t) => {
                let t = js_string(t);
                format!(
                    "Array.from(document.querySelectorAll('body *')).find(el => \
                     el.textContent.includes({t}) && \
                     !Array.from(el.children).some(c => c.textContent.includes({t}))) || null"
                )
            }
            Self::TestId(_) | Self::Css(_) => {
                let css = self.as_css().unwrap_or_default();
                format!("document.querySelector({})", js_string(&css))
            }
        }
    }

    /// Script returning `"missing"`, `"hidden"` or `"visible"` for the target
    #[must_use]
    pub fn state_script(&self) -> String {
        format!(
            "(() => {{ const el = {}; \
             if (!el) return 'missing'; \
             const s = window.getComputedStyle(el); \
             const r = el.getBoundingClientRect(); \
             const shown = s.display !== 'none' && s.visibility !== 'hidden' \
             && parseFloat(s.opacity || '1') > 0 && r.width > 0 && r.height > 0; \
             return shown ? 'visible' : 'hidden'; }})()",
            self.to_query()
        )
    }

    /// Script that scrolls the target into view and clicks it; evaluates to
    /// `false` when nothing matched
    #[must_use]
    pub fn click_script(&self) -> String {
        format!(
            "(() => {{ const el = {}; \
             if (!el) return false; \
             el.scrollIntoView({{ block: 'center', inline: 'center' }}); \
             el.click(); return true; }})()",
            self.to_query()
        )
    }

    /// Script that sets `attribute` on the target, clearing it from any other
    /// element first; evaluates to `false` when nothing matched
    #[must_use]
    pub fn mark_script(&self, attribute: &str) -> String {
        let attr = js_string(attribute);
        format!(
            "(() => {{ document.querySelectorAll('[' + {attr} + ']')\
             .forEach(e => e.removeAttribute({attr})); \
             const el = {}; \
             if (!el) return false; \
             el.setAttribute({attr}, ''); return true; }})()",
            self.to_query()
        )
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TestId(id) => write!(f, "testid={id}"),
            Self::Css(css) => write!(f, "css={css}"),
            Self::Text(t) => write!(f, "text={t}"),
        }
    }
}

impl FromStr for Selector {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Selector {
    type Error = VerifyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

/// Quote a value as a JavaScript string literal
pub(crate) fn js_string(value: &str) -> String {
    // JSON string literals are valid JS string literals
    serde_json::Value::String(value.to_string()).to_string()
}
