//! # Storefront
//!
//! Front page book list: the `{{TABLE}}` marker in `index.html` is replaced
//! with one row per active book, each linking to the embedded checkout page.

use checkout_core::{BookCatalog, ISBN_PARAM};

/// Marker replaced with the generated rows
pub const TABLE_MARKER: &str = "{{TABLE}}";

/// Page hosting the embedded checkout
pub const CHECKOUT_PAGE: &str = "checkout.html";

/// Escape text for HTML element and attribute content
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Table rows for every active book
pub fn render_table(catalog: &BookCatalog) -> String {
    catalog
        .active_books()
        .map(|book| {
            format!(
                r#"
      <tr>
        <td>{title}</td>
        <td>{author}</td>
        <td>{price}</td>
        <td>
            <a href="{page}?{param}={isbn}">Buy</a>
        </td>
      </tr>"#,
                title = escape_html(&book.title),
                author = escape_html(&book.author),
                price = book.price_display(),
                page = CHECKOUT_PAGE,
                param = ISBN_PARAM,
                isbn = escape_html(&book.isbn13),
            )
        })
        .collect()
}

/// Substitute the rows into the page template
pub fn render_page(template: &str, catalog: &BookCatalog) -> String {
    template.replace(TABLE_MARKER, &render_table(catalog))
}
