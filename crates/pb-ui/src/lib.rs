//! # pb-ui
//!
//! HTML views. Askama escapes every interpolated value for HTML, so paste
//! content can never turn into markup.

use askama::Template;
use pb_core::models::PasteRecord;

#[derive(Template)]
#[template(path = "paste.html")]
pub struct PasteTemplate<'a> {
    pub title: &'a str,
    pub content: &'a str,
}

/// Renders the document served for a consumed paste.
pub fn render_paste(record: &PasteRecord) -> askama::Result<String> {
    let title = format!("Paste {}", record.id);
    PasteTemplate {
        title: &title,
        content: &record.content,
    }
    .render()
}
