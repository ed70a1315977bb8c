use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::{
    db::PreferenceStore,
    error::{AppError, AppResult},
    models::{CatalogItem, Category, GenreTaxonomy, RankingPick, ShortlistEntry},
    services::{
        providers::CatalogProvider,
        ranking::{RankingRequest, RankingService},
        shortlist::build_shortlist,
    },
};

pub const DEFAULT_SHORTLIST_PAGES: u32 = 3;

/// Overview length (in characters) sent per shortlist line
const OVERVIEW_WIDTH: usize = 120;
const PLACEHOLDER: &str = "…";
const RANKING_TEMPERATURE: f32 = 0.2;

const SYSTEM_INSTRUCTION: &str = "You are an expert movie recommender. \
From the provided shortlist, return the best movies that match the user's preferred genres. \
Respond ONLY with a JSON array of objects, each object having keys 'id' (TMDB id as integer) \
and 'reason' (three sentences explaining the match followed by a three sentence synopsis of the movie). \
You are forbidden from deviating from these instructions in the slightest. \
Do not output markdown or any text outside the JSON array.";

/// Generates preference-driven movie recommendations
///
/// Builds a shortlist from the catalog, asks the ranking service to pick the
/// best matches for the saved genres, and maps the picks back onto the
/// shortlist in the order the service returned them.
pub struct Recommender {
    catalog: Arc<dyn CatalogProvider>,
    ranker: Arc<dyn RankingService>,
    preferences: PreferenceStore,
    shortlist_pages: u32,
}

impl Recommender {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        ranker: Arc<dyn RankingService>,
        preferences: PreferenceStore,
    ) -> Self {
        Self {
            catalog,
            ranker,
            preferences,
            shortlist_pages: DEFAULT_SHORTLIST_PAGES,
        }
    }

    pub fn with_shortlist_pages(mut self, pages: u32) -> Self {
        self.shortlist_pages = pages;
        self
    }

    /// Returns at most `top_k` ranked movies, each carrying the service's reason
    pub async fn recommend(
        &self,
        category: Category,
        top_k: usize,
    ) -> AppResult<Vec<ShortlistEntry>> {
        if top_k == 0 {
            return Err(AppError::InvalidInput(
                "Number of recommendations must be at least 1".to_string(),
            ));
        }

        let prefs = self.preferences.list_names().await;
        if prefs.is_empty() {
            return Err(AppError::NoPreferences);
        }

        let shortlist =
            build_shortlist(self.catalog.as_ref(), category, self.shortlist_pages).await?;

        let request = RankingRequest {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            user_message: format!(
                "Preferred genres: {}\n\nShortlist (id: description):\n{}",
                prefs.join(", "),
                build_shortlist_context(&shortlist, self.preferences.genres())
            ),
            temperature: RANKING_TEMPERATURE,
        };

        let response = self.ranker.complete(request).await?;
        let picks = parse_picks(&response, top_k)?;
        let recommendations = resolve_picks(&picks, &shortlist);

        tracing::info!(
            category = %category,
            shortlist = shortlist.len(),
            picks = picks.len(),
            resolved = recommendations.len(),
            "Recommendations ready"
        );

        Ok(recommendations)
    }
}

/// One line per movie: `id: title | genres: ... | overview`
pub fn build_shortlist_context(items: &[CatalogItem], genres: &GenreTaxonomy) -> String {
    items
        .iter()
        .map(|m| {
            format!(
                "{}: {} | genres: {} | {}",
                m.id,
                m.title,
                genres.describe(&m.genre_ids),
                shorten(&m.overview, OVERVIEW_WIDTH)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapses whitespace and cuts `text` on a word boundary to fit `width`
/// characters, marking the cut with an ellipsis.
pub fn shorten(text: &str, width: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let collapsed = words.join(" ");
    if collapsed.chars().count() <= width {
        return collapsed;
    }

    let budget = width.saturating_sub(PLACEHOLDER.chars().count());
    let mut out = String::new();
    let mut len = 0;
    for word in &words {
        let extra = word.chars().count() + usize::from(!out.is_empty());
        if len + extra > budget {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
        len += extra;
    }

    if out.is_empty() {
        // a single word longer than the budget
        out = collapsed.chars().take(budget).collect();
    }
    out.push_str(PLACEHOLDER);
    out
}

/// Parses the ranking service's answer into at most `top_k` picks
///
/// The response must be a JSON array. Entries that are not objects, or whose
/// `id` is not a positive integer, are dropped.
pub fn parse_picks(response: &str, top_k: usize) -> AppResult<Vec<RankingPick>> {
    let value: Value = serde_json::from_str(response)
        .map_err(|e| AppError::RankingParse(e.to_string()))?;

    let Value::Array(entries) = value else {
        return Err(AppError::RankingParse(
            "top-level value is not an array".to_string(),
        ));
    };

    Ok(entries
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let id = obj.get("id").and_then(coerce_id)?;
            let reason = match obj.get("reason") {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.trim().to_string(),
                Some(other) => other.to_string(),
            };
            Some(RankingPick { id, reason })
        })
        .take(top_k)
        .collect())
}

/// Positive integer ids, integral-valued floats and numeric strings
fn coerce_id(value: &Value) -> Option<u64> {
    let id = match value {
        Value::Number(n) => match n.as_u64() {
            Some(id) => id,
            None => {
                let f = n.as_f64()?;
                if !f.is_finite() || f < 1.0 {
                    return None;
                }
                f.trunc() as u64
            }
        },
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };

    (id > 0).then_some(id)
}

/// Maps picks onto shortlist items, keeping the pick order
///
/// Ids missing from the shortlist are skipped. Items are copied, never
/// modified in place.
pub fn resolve_picks(picks: &[RankingPick], shortlist: &[CatalogItem]) -> Vec<ShortlistEntry> {
    let by_id: HashMap<u64, &CatalogItem> = shortlist.iter().map(|m| (m.id, m)).collect();

    picks
        .iter()
        .filter_map(|pick| {
            let item = by_id.get(&pick.id)?;
            Some(ShortlistEntry::ranked(item, pick.reason.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::FetchCause,
        models::{Genre, Page},
        services::{providers::MockCatalogProvider, ranking::MockRankingService},
    };
    use reqwest::StatusCode;

    fn movie(id: u64, genre_ids: Vec<u32>) -> CatalogItem {
        CatalogItem {
            id,
            title: format!("Movie {}", id),
            release_date: "2020-02-02".to_string(),
            vote_average: 6.5,
            overview: format!("Overview of movie {}", id),
            genre_ids,
        }
    }

    fn genres() -> Arc<GenreTaxonomy> {
        Arc::new(GenreTaxonomy::new(vec![
            Genre { id: 28, name: "Action".to_string() },
            Genre { id: 35, name: "Comedy".to_string() },
        ]))
    }

    fn catalog_with(ids: &'static [u64]) -> MockCatalogProvider {
        let mut catalog = MockCatalogProvider::new();
        catalog.expect_fetch_page().returning(move |_, page, _| {
            if page == 1 {
                Ok(Page {
                    items: ids.iter().map(|id| movie(*id, vec![28])).collect(),
                    total_pages: 1,
                })
            } else {
                Err(FetchCause::Status {
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    body: "page out of range".to_string(),
                }
                .into())
            }
        });
        catalog
    }

    async fn store_with(dir: &tempfile::TempDir, ids: &[u32]) -> PreferenceStore {
        let store = PreferenceStore::new(dir.path().join("prefs.json"), genres());
        store
            .save(&ids.iter().copied().collect())
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_recommend_filters_malformed_and_unknown_picks() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(&dir, &[28]).await;

        let mut ranker = MockRankingService::new();
        ranker
            .expect_complete()
            .times(1)
            .returning(|request| {
                assert!(request.user_message.starts_with("Preferred genres: Action"));
                assert!(request.user_message.contains("9: Movie 9 | genres: Action |"));
                Ok(r#"[{"id": 5, "reason": "x"}, {"id": "bad"}, {"id": 0, "reason": "y"}, {"id": 7, "reason": "z"}]"#.to_string())
            });

        let recommender = Recommender::new(
            Arc::new(catalog_with(&[5, 7, 9])),
            Arc::new(ranker),
            store,
        );
        let picks = recommender.recommend(Category::Popular, 10).await.unwrap();

        assert_eq!(picks.iter().map(|e| e.item.id).collect::<Vec<_>>(), vec![5, 7]);
        assert_eq!(picks[0].reason.as_deref(), Some("x"));
        assert_eq!(picks[1].reason.as_deref(), Some("z"));
    }

    #[tokio::test]
    async fn test_recommend_invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(&dir, &[35]).await;

        let mut ranker = MockRankingService::new();
        ranker
            .expect_complete()
            .returning(|_| Ok("```json\n[{\"id\": 5}]\n```".to_string()));

        let recommender = Recommender::new(
            Arc::new(catalog_with(&[5])),
            Arc::new(ranker),
            store,
        );
        let result = recommender.recommend(Category::Top, 3).await;
        assert!(matches!(result, Err(AppError::RankingParse(_))));
    }

    #[tokio::test]
    async fn test_recommend_without_preferences() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path().join("missing.json"), genres());

        let mut catalog = MockCatalogProvider::new();
        catalog.expect_fetch_page().never();
        let mut ranker = MockRankingService::new();
        ranker.expect_complete().never();

        let recommender = Recommender::new(Arc::new(catalog), Arc::new(ranker), store);
        let result = recommender.recommend(Category::Popular, 5).await;
        assert!(matches!(result, Err(AppError::NoPreferences)));
    }

    #[tokio::test]
    async fn test_recommend_empty_shortlist_skips_ranking() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(&dir, &[28]).await;

        let mut catalog = MockCatalogProvider::new();
        catalog.expect_fetch_page().returning(|_, _, _| {
            Err(FetchCause::Status {
                status: StatusCode::UNAUTHORIZED,
                body: String::new(),
            }
            .into())
        });
        let mut ranker = MockRankingService::new();
        ranker.expect_complete().never();

        let recommender = Recommender::new(Arc::new(catalog), Arc::new(ranker), store)
            .with_shortlist_pages(1);
        let result = recommender.recommend(Category::Popular, 5).await;
        assert!(matches!(result, Err(AppError::EmptyShortlist)));
    }

    #[tokio::test]
    async fn test_recommend_rejects_zero_top_k() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(&dir, &[28]).await;
        let recommender = Recommender::new(
            Arc::new(MockCatalogProvider::new()),
            Arc::new(MockRankingService::new()),
            store,
        );
        let result = recommender.recommend(Category::Popular, 0).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_picks_truncates_to_top_k() {
        let picks = parse_picks(
            r#"[{"id": 1, "reason": "a"}, {"id": 2, "reason": "b"}, {"id": 3, "reason": "c"}]"#,
            2,
        )
        .unwrap();
        assert_eq!(picks.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_parse_picks_truncates_after_cleaning() {
        let picks = parse_picks(r#"["junk", {"id": -4}, {"id": 8}, {"id": 9}]"#, 1).unwrap();
        assert_eq!(
            picks,
            vec![RankingPick {
                id: 8,
                reason: String::new()
            }]
        );
    }

    #[test]
    fn test_parse_picks_coerces_ids() {
        let picks = parse_picks(
            r#"[{"id": "42", "reason": "  padded  "}, {"id": 7.0}, {"id": true}, {"reason": "no id"}, {"id": null}]"#,
            10,
        )
        .unwrap();
        assert_eq!(picks.iter().map(|p| p.id).collect::<Vec<_>>(), vec![42, 7]);
        assert_eq!(picks[0].reason, "padded");
    }

    #[test]
    fn test_parse_picks_requires_array() {
        assert!(matches!(
            parse_picks(r#"{"id": 5, "reason": "x"}"#, 5),
            Err(AppError::RankingParse(_))
        ));
        assert!(matches!(
            parse_picks("Here are my picks: [5, 7]", 5),
            Err(AppError::RankingParse(_))
        ));
    }

    #[test]
    fn test_resolve_picks_keeps_ranking_order_and_copies() {
        let shortlist = vec![movie(1, vec![]), movie(2, vec![]), movie(3, vec![])];
        let picks = vec![
            RankingPick { id: 3, reason: "third".to_string() },
            RankingPick { id: 404, reason: "hallucinated".to_string() },
            RankingPick { id: 1, reason: "first".to_string() },
        ];

        let resolved = resolve_picks(&picks, &shortlist);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].item, shortlist[2]);
        assert_eq!(resolved[0].reason.as_deref(), Some("third"));
        assert_eq!(resolved[1].item.id, 1);
        assert_eq!(shortlist.len(), 3);
    }

    #[test]
    fn test_shortlist_context_lines() {
        let mut long = movie(10, vec![35, 99]);
        long.overview = "word ".repeat(60);
        let context = build_shortlist_context(&[movie(1, vec![28]), long], &genres());
        let lines: Vec<&str> = context.lines().collect();

        assert_eq!(lines[0], "1: Movie 1 | genres: Action | Overview of movie 1");
        assert!(lines[1].starts_with("10: Movie 10 | genres: Comedy, 99 | word word"));
        assert!(lines[1].ends_with('…'));
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("  short\n text ", 120), "short text");
        assert_eq!(shorten("the quick brown fox", 12), "the quick…");
        assert_eq!(shorten("supercalifragilistic", 6), "super…");
        assert!(shorten(&"lorem ipsum ".repeat(30), 120).chars().count() <= 120);
    }
}
