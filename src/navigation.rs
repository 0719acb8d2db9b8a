pub const ADMIN_ROOT: &str = "/admin";

/// Whether a sidebar link should be highlighted for `current_path`.
/// The dashboard link only matches the dashboard itself; section links match
/// any path that contains them.
pub fn is_active(current_path: &str, href: &str) -> bool {
    if href == ADMIN_ROOT {
        current_path == ADMIN_ROOT
    } else {
        !href.is_empty() && current_path.contains(href)
    }
}

/// Indices of the active links, in sidebar order
pub fn active_links(current_path: &str, hrefs: &[&str]) -> Vec<usize> {
    hrefs
        .iter()
        .enumerate()
        .filter(|(_, href)| is_active(current_path, href))
        .map(|(i, _)| i)
        .collect()
}
