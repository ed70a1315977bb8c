use std::sync::Arc;
use std::time::Duration;

use crate::{
    cli::{prompt, render, Cli, Command},
    config::Config,
    db::PreferenceStore,
    error::{AppError, AppResult},
    models::{Category, GenreSelector, GenreTaxonomy, ReleaseYear},
    services::{
        browse::{run_browse_loop, PagedBrowser},
        providers::{CatalogProvider, TmdbProvider},
        ranking::GeminiClient,
        recommendations::Recommender,
    },
};

/// Dispatches a parsed command line
pub async fn run(cli: Cli, config: Config) -> AppResult<()> {
    let catalog: Arc<dyn CatalogProvider> = Arc::new(TmdbProvider::new(
        config.api_key().to_string(),
        config.tmdb_api_url.clone(),
        timeout(&config),
    )?);

    match cli.command {
        Command::Fetch { category, year } => fetch(catalog, &config, category, year).await,
        Command::Prefs { add, remove, list } => {
            prefs(catalog.as_ref(), &config, add, remove, list).await
        }
        Command::Match { category, top } => {
            match_movies(catalog, &config, category, usize::from(top)).await
        }
    }
}

fn timeout(config: &Config) -> Duration {
    Duration::from_secs(config.request_timeout_secs)
}

/// The taxonomy is required for anything that resolves genre names
async fn load_genres(catalog: &dyn CatalogProvider) -> AppResult<Arc<GenreTaxonomy>> {
    Ok(Arc::new(catalog.fetch_genres().await?))
}

fn preference_store(config: &Config, genres: Arc<GenreTaxonomy>) -> AppResult<PreferenceStore> {
    let path = config.preferences_path().ok_or_else(|| {
        AppError::Config("Could not determine a home directory; set PREFS_PATH".to_string())
    })?;
    Ok(PreferenceStore::new(path, genres))
}

async fn fetch(
    catalog: Arc<dyn CatalogProvider>,
    config: &Config,
    category: Category,
    year: Option<ReleaseYear>,
) -> AppResult<()> {
    println!("You chose {}", category);

    // Browsing still works with raw genre ids
    let genres = match catalog.fetch_genres().await {
        Ok(genres) => genres,
        Err(e) => {
            tracing::warn!(error = %e, "Genre names unavailable, showing ids");
            GenreTaxonomy::empty()
        }
    };

    let mut browser = PagedBrowser::new(catalog, category, year);
    let outcome = run_browse_loop(
        &mut browser,
        config.batch_size,
        |batch| {
            for item in batch {
                println!("{}", render::format_item(item, &genres));
            }
        },
        || prompt::confirm("View more? (Y/N): "),
    )
    .await?;

    if outcome.shown == 0 {
        println!("No more movies to show.");
    }

    tracing::debug!(shown = outcome.shown, end = ?outcome.end, "Browsing finished");
    Ok(())
}

async fn prefs(
    catalog: &dyn CatalogProvider,
    config: &Config,
    add: Vec<GenreSelector>,
    remove: Vec<GenreSelector>,
    list: bool,
) -> AppResult<()> {
    let genres = load_genres(catalog).await?;
    let store = preference_store(config, genres.clone())?;

    if list {
        print_names(&store.list_names().await);
        return Ok(());
    }

    if !add.is_empty() || !remove.is_empty() {
        if !add.is_empty() {
            store.add(&add).await?;
        }
        if !remove.is_empty() {
            store.remove(&remove).await?;
        }
        println!("\nUpdated preferences:");
        print_names(&store.list_names().await);
        return Ok(());
    }

    let current = store.load().await;
    println!("\nToggle your preferred genres (comma-separated numbers):\n");
    println!("{}", prompt::format_menu(&genres, &current));

    let input = prompt::read_line("\nSelect / Deselect → ")
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read selection: {}", e)))?;
    match prompt::parse_menu_selection(&input, &genres) {
        prompt::MenuSelection::NoChange => println!("No changes made."),
        prompt::MenuSelection::Invalid => {
            println!("❌  Please enter only numbers separated by commas.")
        }
        prompt::MenuSelection::NothingValid => println!("❌  No valid selections."),
        prompt::MenuSelection::Toggle(ids) => {
            store.toggle_ids(ids).await?;
            println!("\nUpdated preferences:");
            print_names(&store.list_names().await);
        }
    }

    Ok(())
}

fn print_names(names: &[String]) {
    if names.is_empty() {
        println!("  (no genres saved)");
    }
    for name in names {
        println!("  • {}", name);
    }
}

async fn match_movies(
    catalog: Arc<dyn CatalogProvider>,
    config: &Config,
    category: Category,
    top_k: usize,
) -> AppResult<()> {
    let api_key = config
        .gemini_api_key()
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::Config("GEM_API_KEY (or GEMINI_API_KEY) not set in environment".to_string())
        })?;

    let genres = load_genres(catalog.as_ref()).await?;
    let store = preference_store(config, genres.clone())?;
    let ranker = Arc::new(GeminiClient::new(
        api_key,
        config.gemini_api_url.clone(),
        config.gemini_model.clone(),
        timeout(config),
    )?);

    let recommender =
        Recommender::new(catalog, ranker, store).with_shortlist_pages(config.shortlist_pages);
    let recommendations = recommender.recommend(category, top_k).await?;

    if recommendations.is_empty() {
        println!("The ranking service did not pick any movies from the shortlist.");
    }
    for entry in &recommendations {
        println!("{}", render::format_recommendation(entry, &genres));
    }

    Ok(())
}
