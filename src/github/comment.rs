//! Pull request comment formatting.

use crate::types::PreviewRow;

/// Heading of every preview comment.
pub const COMMENT_HEADING: &str = "### Minecraft Model Preview";

/// Width of preview images in the table.
const IMAGE_WIDTH: u32 = 200;

/// Render the before/after Markdown table.
///
/// Rows without any image are left out. A side without an image shows
/// `_missing_`.
pub fn build_comment_body(rows: &[PreviewRow]) -> String {
    let mut body = format!("{}\n\n", COMMENT_HEADING);

    let rows: Vec<_> = rows.iter().filter(|row| row.has_image()).collect();
    if rows.is_empty() {
        body.push_str("No previews could be rendered for the entities changed in this pull request.\n");
        return body;
    }

    body.push_str("| Entity | Before | After |\n");
    body.push_str("|--------|--------|-------|\n");
    for row in rows {
        body.push_str(&format!(
            "| `{}` | {} | {} |\n",
            row.identifier,
            image_cell(row.base_url.as_deref()),
            image_cell(row.head_url.as_deref())
        ));
    }
    body
}

fn image_cell(url: Option<&str>) -> String {
    match url {
        Some(url) => format!("<img src=\"{}\" width=\"{}\" />", url, IMAGE_WIDTH),
        None => "_missing_".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(identifier: &str, base: Option<&str>, head: Option<&str>) -> PreviewRow {
        PreviewRow {
            identifier: identifier.to_string(),
            base_url: base.map(str::to_string),
            head_url: head.map(str::to_string),
        }
    }

    #[test]
    fn test_table_rows() {
        let body = build_comment_body(&[
            row("minecraft:creeper", Some("https://x/base.png"), Some("https://x/head.png")),
            row("custom:new", None, Some("https://x/new.png")),
            row("custom:broken", None, None),
        ]);

        assert!(body.starts_with("### Minecraft Model Preview\n\n| Entity | Before | After |\n"));
        assert!(body.contains(
            "| `minecraft:creeper` | <img src=\"https://x/base.png\" width=\"200\" /> | <img src=\"https://x/head.png\" width=\"200\" /> |\n"
        ));
        assert!(body.contains("| `custom:new` | _missing_ | <img src=\"https://x/new.png\" width=\"200\" /> |\n"));
        assert!(!body.contains("custom:broken"));
    }

    #[test]
    fn test_no_rows() {
        let body = build_comment_body(&[row("custom:broken", None, None)]);
        assert!(body.contains("No previews could be rendered"));
        assert!(!body.contains("| Entity |"));
    }
}
