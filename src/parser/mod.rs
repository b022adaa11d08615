pub mod film;
pub mod listing;
pub mod overrides;
pub mod screening;
pub mod showtime;
pub mod text;

use scraper::{ElementRef, Html, Selector};

/// Concatenated text of an element and its descendants.
pub fn element_text(el: ElementRef) -> String {
    el.text().collect()
}

/// Text of the first element matching `sel`, trimmed.
pub fn first_text(doc: &Html, sel: &Selector) -> Option<String> {
    doc.select(sel).next().map(|el| element_text(el).trim().to_string())
}
