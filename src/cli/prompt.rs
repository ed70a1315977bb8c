use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};

use crate::models::{GenreTaxonomy, PreferenceSet};

/// Result of parsing the preferences menu input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuSelection {
    /// Blank input
    NoChange,
    /// Something other than comma-separated numbers
    Invalid,
    /// Only out-of-range numbers
    NothingValid,
    /// Genre ids to toggle
    Toggle(BTreeSet<u32>),
}

/// Numbered menu of every genre with a check mark on saved ones
pub fn format_menu(genres: &GenreTaxonomy, current: &PreferenceSet) -> String {
    genres
        .iter()
        .enumerate()
        .map(|(idx, genre)| {
            let marker = if current.contains(genre.id) { "✓" } else { " " };
            format!("{:>2}. [{}] {}", idx + 1, marker, genre.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Maps 1-based menu numbers to genre ids, ignoring out-of-range numbers
pub fn parse_menu_selection(input: &str, genres: &GenreTaxonomy) -> MenuSelection {
    let input = input.trim();
    if input.is_empty() {
        return MenuSelection::NoChange;
    }

    let indices: Result<BTreeSet<i64>, _> = input
        .split(',')
        .map(|part| part.trim().parse::<i64>())
        .collect();
    let Ok(indices) = indices else {
        return MenuSelection::Invalid;
    };

    let menu: Vec<u32> = genres.iter().map(|g| g.id).collect();
    let ids: BTreeSet<u32> = indices
        .into_iter()
        .filter_map(|i| usize::try_from(i).ok())
        .filter(|i| (1..=menu.len()).contains(i))
        .map(|i| menu[i - 1])
        .collect();

    if ids.is_empty() {
        MenuSelection::NothingValid
    } else {
        MenuSelection::Toggle(ids)
    }
}

/// Prints `message` and reads one trimmed line from stdin
///
/// The read runs on the blocking pool so the runtime thread stays free.
pub async fn read_line(message: &str) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let line = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).map(|_| line)
    })
    .await
    .map_err(io::Error::other)??;

    Ok(line.trim().to_string())
}

/// Asks a yes/no question; only `y` (any case) continues
pub async fn confirm(message: &str) -> bool {
    match read_line(message).await {
        Ok(answer) => answer.eq_ignore_ascii_case("y"),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read answer");
            false
        }
    }
}
