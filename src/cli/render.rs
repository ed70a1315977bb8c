use crate::models::{CatalogItem, GenreTaxonomy, ShortlistEntry};

const RULE_WIDTH: usize = 72;

/// Marker for a 0-10 rating
pub fn mood(rating: f64) -> &'static str {
    if rating < 3.0 {
        "☹️ "
    } else if rating < 6.0 {
        "😑 "
    } else if rating < 8.0 {
        "👌 "
    } else {
        "😍 "
    }
}

/// Formats one movie as a framed block
pub fn format_item(item: &CatalogItem, genres: &GenreTaxonomy) -> String {
    let rule = "─".repeat(RULE_WIDTH);
    [
        rule.clone(),
        format!("  {}", item.title),
        format!("\t{}", display_or_dash(&item.release_date)),
        format!("\t{}", display_or_dash(&genres.describe(&item.genre_ids))),
        format!("\t{}{:.1}", mood(item.vote_average), item.vote_average * 10.0),
        format!("\t{}", display_or_dash(&item.overview)),
        rule,
    ]
    .join("\n")
}

/// Formats a ranked movie followed by the ranking service's justification
pub fn format_recommendation(entry: &ShortlistEntry, genres: &GenreTaxonomy) -> String {
    let mut out = format_item(&entry.item, genres);
    if let Some(reason) = &entry.reason {
        out.push_str(&format!("\nWhy it was chosen: {}", reason));
    }
    out.push_str(&format!(
        "\nGenres: {}\n",
        genres.describe(&entry.item.genre_ids)
    ));
    out
}

fn display_or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}
