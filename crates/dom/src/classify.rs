//! Interactive classifier (C2)
//!
//! Selector list is a compile-time constant set — CSS attribute-substring
//! selectors have performance cliffs on large DOMs, so the
//! `*button*`/`*btn*`/… tail is plain substring matching against
//! `class`/`id`/`data-testid`, not a selector engine.

use crate::input::{RawElement, RawNode};

const ARIA_INTERACTIVE_ROLES: &[&str] = &[
    "button",
    "link",
    "checkbox",
    "radio",
    "tab",
    "menuitem",
    "option",
    "switch",
    "slider",
    "spinbutton",
    "combobox",
    "listbox",
    "searchbox",
    "textbox",
    "dialog",
    "alertdialog",
];

const ALWAYS_INTERACTIVE_TAGS: &[&str] = &["button", "input", "select", "textarea", "summary", "details"];

/// Substring patterns checked against `class` + `id` + `data-testid`.
const CLASS_ID_PATTERNS: &[&str] = &["button", "btn", "popup", "modal", "dialog", "overlay"];

fn matches_class_id_pattern(el: &RawElement) -> bool {
    let haystack = [
        el.attr("class").unwrap_or(""),
        el.attr("id").unwrap_or(""),
        el.attr("data-testid").unwrap_or(""),
    ]
    .join(" ")
    .to_lowercase();

    if haystack.trim().is_empty() {
        return false;
    }
    CLASS_ID_PATTERNS.iter().any(|p| haystack.contains(p))
}

fn matches_fixed_selector_set(el: &RawElement) -> bool {
    let tag = el.tag_name.as_str();

    if tag == "a" && (el.attr("href").is_some() || el.attr("role").is_some()) {
        return true;
    }
    if ALWAYS_INTERACTIVE_TAGS.contains(&tag) {
        return true;
    }
    if let Some(role) = el.attr("role") {
        if ARIA_INTERACTIVE_ROLES.contains(&role) {
            return true;
        }
    }
    if el.attr("tabindex").is_some() {
        return true;
    }
    if el.attr("onclick").is_some() {
        return true;
    }
    if el.attr("contenteditable") == Some("true") {
        return true;
    }
    if tag == "label" && el.attr("for").is_some() {
        return true;
    }
    if el.attr("draggable") == Some("true") {
        return true;
    }
    if el.attr("aria-modal") == Some("true") {
        return true;
    }
    if matches!(tag, "div" | "span") && el.style.cursor == "pointer" {
        return true;
    }

    matches_class_id_pattern(el)
}

fn has_visible_text(el: &RawElement) -> bool {
    el.children.iter().any(|child| match child {
        RawNode::Text(t) => !t.trim().is_empty(),
        RawNode::Element(child_el) => has_visible_text(child_el),
    })
}

fn has_image_descendant(el: &RawElement) -> bool {
    if matches!(el.tag_name.as_str(), "img" | "svg") || el.attr("role") == Some("img") {
        return true;
    }
    el.children.iter().any(|child| match child {
        RawNode::Text(_) => false,
        RawNode::Element(child_el) => has_image_descendant(child_el),
    })
}

/// An empty anchor (no text, no aria-label, no title, no image content) is
/// not a plausible click target even though it matches `a[href]`.
fn is_empty_anchor(el: &RawElement) -> bool {
    el.tag_name == "a"
        && !has_visible_text(el)
        && el.attr("aria-label").is_none()
        && el.attr("title").is_none()
        && !has_image_descendant(el)
}

/// `isInteractive(element)`. Selector-match failures (an unparsable
/// pattern, an unexpected attribute shape) are swallowed by construction:
/// every check here is a total boolean test, never a fallible
/// selector-engine call.
pub fn is_interactive(el: &RawElement) -> bool {
    if is_empty_anchor(el) {
        return false;
    }
    matches_fixed_selector_set(el)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ComputedStyle;

    #[test]
    fn button_is_interactive() {
        assert!(is_interactive(&RawElement::new("button")));
    }

    #[test]
    fn anchor_with_href_is_interactive() {
        let el = RawElement::new("a")
            .with_attr("href", "/x")
            .with_child(RawNode::Text("Click".to_string()));
        assert!(is_interactive(&el));
    }

    #[test]
    fn empty_anchor_is_not_interactive() {
        let el = RawElement::new("a").with_attr("href", "/x");
        assert!(!is_interactive(&el));
    }

    #[test]
    fn anchor_wrapping_span_is_interactive_via_anchor() {
        let span = RawElement::new("span").with_child(RawNode::Text("Click".to_string()));
        let el = RawElement::new("a")
            .with_attr("href", "/x")
            .with_child(RawNode::Element(Box::new(span)));
        assert!(is_interactive(&el));
    }

    #[test]
    fn anchor_with_only_image_is_interactive() {
        let img = RawElement::new("img");
        let el = RawElement::new("a")
            .with_attr("href", "/x")
            .with_child(RawNode::Element(Box::new(img)));
        assert!(is_interactive(&el));
    }

    #[test]
    fn div_with_pointer_cursor_is_interactive() {
        let mut style = ComputedStyle::default();
        style.cursor = "pointer".to_string();
        let el = RawElement::new("div").with_style(style);
        assert!(is_interactive(&el));
    }

    #[test]
    fn div_with_default_cursor_is_not_interactive() {
        assert!(!is_interactive(&RawElement::new("div")));
    }

    #[test]
    fn class_substring_pattern_matches() {
        let el = RawElement::new("div").with_attr("class", "my-btn-primary");
        assert!(is_interactive(&el));
    }

    #[test]
    fn plain_paragraph_is_not_interactive() {
        assert!(!is_interactive(&RawElement::new("p")));
    }
}
