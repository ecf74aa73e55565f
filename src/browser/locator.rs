//! Element locator strategies.
//!
//! A [`Locator`] is an immutable (strategy, selector) pair. It is opaque to
//! every layer except the driver, which translates it into its own lookup.
//!
//! # Example
//!
//! ```
//! use guvi_e2e::Locator;
//!
//! // Page objects declare their locators as constants.
//! const EMAIL_INPUT: Locator = Locator::id("email");
//! const LOGIN_BUTTON: Locator = Locator::xpath("//a[@id='login-btn']");
//!
//! assert_eq!(EMAIL_INPUT.strategy(), "id");
//! assert_eq!(LOGIN_BUTTON.to_string(), "xpath=//a[@id='login-btn']");
//! ```

use std::borrow::Cow;
use std::fmt;

// ============================================================================
// Locator Enum
// ============================================================================

/// Element locator strategy (like Selenium's `By`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// CSS selector.
    Css(Cow<'static, str>),

    /// XPath expression.
    XPath(Cow<'static, str>),

    /// Element ID.
    Id(Cow<'static, str>),

    /// Name attribute.
    Name(Cow<'static, str>),

    /// Class name (single class).
    Class(Cow<'static, str>),

    /// Tag name.
    Tag(Cow<'static, str>),

    /// Exact link text (for `<a>` elements).
    LinkText(Cow<'static, str>),

    /// Partial link text (for `<a>` elements).
    PartialLinkText(Cow<'static, str>),
}

impl Locator {
    /// Creates a CSS selector.
    #[inline]
    #[must_use]
    pub const fn css(selector: &'static str) -> Self {
        Self::Css(Cow::Borrowed(selector))
    }

    /// Creates an XPath selector.
    #[inline]
    #[must_use]
    pub const fn xpath(expr: &'static str) -> Self {
        Self::XPath(Cow::Borrowed(expr))
    }

    /// Creates an ID selector.
    #[inline]
    #[must_use]
    pub const fn id(id: &'static str) -> Self {
        Self::Id(Cow::Borrowed(id))
    }

    /// Creates a name attribute selector.
    #[inline]
    #[must_use]
    pub const fn name(name: &'static str) -> Self {
        Self::Name(Cow::Borrowed(name))
    }

    /// Creates a class name selector.
    #[inline]
    #[must_use]
    pub const fn class(class: &'static str) -> Self {
        Self::Class(Cow::Borrowed(class))
    }

    /// Creates a tag name selector.
    #[inline]
    #[must_use]
    pub const fn tag(tag: &'static str) -> Self {
        Self::Tag(Cow::Borrowed(tag))
    }

    /// Creates a link text selector.
    #[inline]
    #[must_use]
    pub const fn link_text(text: &'static str) -> Self {
        Self::LinkText(Cow::Borrowed(text))
    }

    /// Creates a partial link text selector.
    #[inline]
    #[must_use]
    pub const fn partial_link_text(text: &'static str) -> Self {
        Self::PartialLinkText(Cow::Borrowed(text))
    }

    /// Creates an XPath selector from a runtime string.
    #[inline]
    #[must_use]
    pub fn xpath_owned(expr: impl Into<String>) -> Self {
        Self::XPath(Cow::Owned(expr.into()))
    }

    /// Returns the strategy name.
    #[must_use]
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::Css(_) => "css",
            Self::XPath(_) => "xpath",
            Self::Id(_) => "id",
            Self::Name(_) => "name",
            Self::Class(_) => "class",
            Self::Tag(_) => "tag",
            Self::LinkText(_) => "linkText",
            Self::PartialLinkText(_) => "partialLinkText",
        }
    }

    /// Returns the selector value.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Css(v)
            | Self::XPath(v)
            | Self::Id(v)
            | Self::Name(v)
            | Self::Class(v)
            | Self::Tag(v)
            | Self::LinkText(v)
            | Self::PartialLinkText(v) => v,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy(), self.value())
    }
}

// ============================================================================
// From implementations for ergonomics
// ============================================================================

impl From<&'static str> for Locator {
    /// Converts a string to CSS selector (default).
    fn from(s: &'static str) -> Self {
        Self::css(s)
    }
}

impl From<String> for Locator {
    /// Converts a string to CSS selector (default).
    fn from(s: String) -> Self {
        Self::Css(Cow::Owned(s))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN: Locator = Locator::xpath("(//a[contains(text(),'Login')])[2]");

    #[test]
    fn test_const_locator() {
        assert_eq!(LOGIN.strategy(), "xpath");
        assert_eq!(LOGIN.value(), "(//a[contains(text(),'Login')])[2]");
    }

    #[test]
    fn test_display() {
        assert_eq!(Locator::id("email").to_string(), "id=email");
        assert_eq!(Locator::css(".user-dropdown").to_string(), "css=.user-dropdown");
    }

    #[test]
    fn test_owned_equals_borrowed() {
        assert_eq!(Locator::xpath_owned("//h2"), Locator::xpath("//h2"));
    }

    #[test]
    fn test_from_str() {
        let locator: Locator = "#login".into();
        assert!(matches!(locator, Locator::Css(_)));
    }

    #[test]
    fn test_strategies() {
        assert_eq!(Locator::name("q").strategy(), "name");
        assert_eq!(Locator::class("btn").strategy(), "class");
        assert_eq!(Locator::tag("input").strategy(), "tag");
        assert_eq!(Locator::link_text("Home").strategy(), "linkText");
        assert_eq!(
            Locator::partial_link_text("Read").strategy(),
            "partialLinkText"
        );
    }
}
