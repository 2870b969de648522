use crate::page::Document;

use super::{ACTIVE_CLASS, HOME_PAGE, NAV_LINK_CLASS};

/// File name of the page at `path`, ignoring any query or fragment.
/// An empty name (e.g. `/` or `""`) is the home page.
pub fn current_page(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => HOME_PAGE,
    }
}

/// Mark the nav link pointing at the current page as active and clear the
/// marker everywhere else. Idempotent.
pub(crate) fn set_active_nav_link(doc: &mut Document) {
    let page = current_page(doc.location_path()).to_string();
    for link in doc.query_class_mut(NAV_LINK_CLASS) {
        let target = link.href.as_deref().map(normalize_href);
        let is_current = target.is_some_and(|t| t == page);
        link.toggle_class(ACTIVE_CLASS, is_current);
    }
}

fn normalize_href(href: &str) -> &str {
    match href.trim_start_matches("./") {
        "" | "/" => HOME_PAGE,
        other => current_page(other),
    }
}
