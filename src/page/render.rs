//! Terminal rendering of page elements.

use colored::{ColoredString, Colorize};

use super::{Element, StatusKind};

/// One line for an element: status messages get a severity marker and
/// color, anything else is printed as-is.
pub fn element_line(element: &Element) -> String {
    match StatusKind::from_element(element) {
        Some(kind) => format!("{} {}", status_marker(kind), colorize(kind, &element.text)),
        None => element.text.clone(),
    }
}

/// `label  value` row with an aligned, bold label.
pub fn field_line(label: &str, value: &str) -> String {
    format!("  {} {}", format!("{label:<20}").bold(), value)
}

fn status_marker(kind: StatusKind) -> ColoredString {
    match kind {
        StatusKind::Info => "…".cyan().bold(),
        StatusKind::Success => "✓".green().bold(),
        StatusKind::Error => "✗".red().bold(),
    }
}

fn colorize(kind: StatusKind, text: &str) -> ColoredString {
    match kind {
        StatusKind::Info => text.normal(),
        StatusKind::Success => text.green(),
        StatusKind::Error => text.red(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Document;

    #[test]
    fn status_lines_carry_marker_and_text() {
        colored::control::set_override(false);
        let mut doc = Document::new("");
        doc.insert("status", Element::new());
        doc.show_status("status", StatusKind::Error, "Erreur : boom");
        assert_eq!(element_line(doc.get("status").unwrap()), "✗ Erreur : boom");

        doc.show_status("status", StatusKind::Success, "ok");
        assert_eq!(element_line(doc.get("status").unwrap()), "✓ ok");
    }

    #[test]
    fn plain_elements_render_their_text() {
        colored::control::set_override(false);
        assert_eq!(element_line(&Element::with_text("Copié !")), "Copié !");
    }

    #[test]
    fn field_line_pads_label() {
        colored::control::set_override(false);
        assert_eq!(field_line("FEN", "8/8"), format!("  {:<20} 8/8", "FEN"));
    }
}
