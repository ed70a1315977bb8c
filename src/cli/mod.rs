use clap::{Parser, Subcommand};

use crate::models::{Category, GenreSelector, ReleaseYear};

pub mod commands;
pub mod prompt;
pub mod render;

pub use commands::run;

/// Browse TMDB movie listings and get Gemini-ranked recommendations
#[derive(Debug, Parser)]
#[command(name = "reelpick", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse movies in batches, fetching more pages on demand
    Fetch {
        /// Which listing to browse
        #[arg(long = "type", value_enum, default_value_t = Category::Popular)]
        category: Category,

        /// Only movies released in this year, sorted by popularity
        #[arg(long, value_parser = clap::value_parser!(ReleaseYear))]
        year: Option<ReleaseYear>,
    },

    /// Show or change saved genre preferences (interactive without flags)
    Prefs {
        /// Genre name or id to add; repeatable
        #[arg(long, value_name = "GENRE")]
        add: Vec<GenreSelector>,

        /// Genre name or id to remove; repeatable
        #[arg(long, value_name = "GENRE")]
        remove: Vec<GenreSelector>,

        /// Print the saved genres and exit
        #[arg(long, conflicts_with_all = ["add", "remove"])]
        list: bool,
    },

    /// Ask the ranking service for the best movies for your saved genres
    Match {
        /// Listing to draw the shortlist from
        #[arg(long = "type", value_enum, default_value_t = Category::Popular)]
        category: Category,

        /// How many recommendations to display
        #[arg(long = "top", default_value_t = 10, value_parser = clap::value_parser!(u16).range(1..))]
        top: u16,
    },
}
