// RSS 2.0 rendering with the Google Merchant namespace

use std::fmt::Write;

use super::product::{FeedSettings, GoogleFeedItem};

pub const GOOGLE_NAMESPACE: &str = "http://base.google.com/ns/1.0";

/// Escapes text for XML element content and attributes
///
/// Control characters that XML 1.0 forbids are dropped.
pub fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

fn element(out: &mut String, name: &str, value: &str) {
    let _ = writeln!(out, "      <{name}>{}</{name}>", escape_xml(value));
}

fn optional_element(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        element(out, name, value);
    }
}

/// Renders the full feed document
pub fn render_rss(items: &[GoogleFeedItem], settings: &FeedSettings) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(out, "<rss version=\"2.0\" xmlns:g=\"{}\">", GOOGLE_NAMESPACE);
    out.push_str("  <channel>\n");
    let _ = writeln!(out, "    <title>{}</title>", escape_xml(&settings.store_name));
    let _ = writeln!(out, "    <link>{}</link>", escape_xml(&settings.store_url));
    let _ = writeln!(
        out,
        "    <description>{}</description>",
        escape_xml(&format!("Product feed for {}", settings.store_name))
    );

    for item in items {
        out.push_str("    <item>\n");
        element(&mut out, "g:id", &item.id);
        element(&mut out, "g:title", &item.title);
        element(&mut out, "g:description", &item.description);
        element(&mut out, "g:link", &item.link);
        element(&mut out, "g:image_link", &item.image_link);
        for link in &item.additional_image_links {
            element(&mut out, "g:additional_image_link", link);
        }
        element(&mut out, "g:availability", item.availability.as_str());
        element(&mut out, "g:price", &item.price);
        optional_element(&mut out, "g:sale_price", item.sale_price.as_deref());
        element(&mut out, "g:brand", &item.brand);
        optional_element(&mut out, "g:gtin", item.gtin.as_deref());
        optional_element(&mut out, "g:mpn", item.mpn.as_deref());
        if !item.identifier_exists {
            element(&mut out, "g:identifier_exists", "no");
        }
        element(&mut out, "g:condition", item.condition.as_str());
        optional_element(
            &mut out,
            "g:google_product_category",
            item.google_product_category.as_deref(),
        );
        optional_element(&mut out, "g:product_type", item.product_type.as_deref());
        optional_element(&mut out, "g:item_group_id", item.item_group_id.as_deref());
        optional_element(&mut out, "g:shipping_weight", item.shipping_weight.as_deref());
        out.push_str("    </item>\n");
    }

    out.push_str("  </channel>\n</rss>\n");
    out
}
