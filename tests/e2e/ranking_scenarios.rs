//! End-to-end ranking scenarios (spec §8, E1-E8), driven entirely through
//! [`recfeed_core::RecommenderCore`]'s public interface rather than through
//! individual component functions - these are the scenarios a caller
//! integrating the core would actually exercise.

use chrono::{DateTime, Duration, Utc};
use recfeed_core::catalog::{CatalogView, EntityMention, EpisodeRecord};
use recfeed_core::config::Config;
use recfeed_core::embeddings::FakeEmbeddingProvider;
use recfeed_core::engagement::EngagementType;
use recfeed_core::{EmbeddingProvider, RecommenderCore};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

const DIM: usize = 8;

fn unit_vec(hot: usize) -> Vec<f32> {
    let mut v = vec![0.0; DIM];
    v[hot % DIM] = 1.0;
    v
}

#[allow(clippy::too_many_arguments)]
fn episode(
    category: &str,
    entity: &str,
    series: Uuid,
    credibility: u8,
    insight: u8,
    days_old: i64,
    embedding: Vec<f32>,
    now: DateTime<Utc>,
) -> EpisodeRecord {
    EpisodeRecord {
        id: Uuid::new_v4(),
        content_id: None,
        published_at: now - Duration::days(days_old),
        series_id: series,
        series_name: format!("{category} series"),
        credibility: Some(credibility),
        insight: Some(insight),
        information: Some(3),
        entertainment: Some(2),
        categories: vec![category.to_string()],
        subcategories: vec![],
        entities: vec![EntityMention {
            name: entity.to_string(),
            relevance: 4,
            context: None,
        }],
        people: vec![],
        non_consensus_level: None,
        embedding,
    }
}

fn core_from(catalog: CatalogView) -> RecommenderCore {
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(FakeEmbeddingProvider::new(DIM));
    RecommenderCore::new(catalog, embedder, Config::default()).expect("default config is valid")
}

/// E1: cold start quality - a catalog dominated by credible episodes must
/// produce a first page that is itself credible, with `cold_start == true`.
#[tokio::test]
async fn e1_cold_start_quality() {
    let now = Utc::now();
    let records: Vec<EpisodeRecord> = (0..25)
        .map(|i| {
            episode(
                &format!("cat-{i}"),
                &format!("ent-{i}"),
                Uuid::new_v4(),
                3,
                4,
                i % 10,
                unit_vec(i as usize),
                now,
            )
        })
        .collect();
    let core = core_from(CatalogView::load(records, DIM));

    let created = core
        .create_session(Uuid::new_v4(), &[], &HashSet::new(), now)
        .await
        .unwrap();

    assert!(created.cold_start);
    assert_eq!(created.first_page.len(), 10);

    let credibilities: Vec<u8> = created
        .first_page
        .iter()
        .map(|entry| core.episode(entry.episode_id).unwrap().credibility)
        .collect();
    assert!(credibilities.iter().all(|&c| c >= 2));
    let average = f64::from(credibilities.iter().map(|&c| u32::from(c)).sum::<u32>()) / 10.0;
    assert!(average >= 3.0, "average credibility {average} below 3.0");
}

/// E2: personalization diverges from cold start - a user with a strong,
/// consistent viewing history ranks thematically-aligned episodes far above
/// a cold-start user, both in page composition and mean `S_sim`.
#[tokio::test]
async fn e2_personalization_diverges_from_cold_start() {
    let now = Utc::now();
    let mut records = Vec::new();

    // The history user B will view (excluded from their own results).
    let viewed: Vec<Uuid> = (0..10)
        .map(|i| {
            let rec = episode(
                &format!("viewed-{i}"),
                &format!("viewed-ent-{i}"),
                Uuid::new_v4(),
                3,
                3,
                5,
                unit_vec(0),
                now,
            );
            let id = rec.id;
            records.push(rec);
            id
        })
        .collect();

    // Unviewed, thematically-aligned episodes: mediocre quality, aging, but
    // perfectly aligned with the vector B's history will produce.
    for i in 0..8 {
        records.push(episode(
            &format!("ai-{i}"),
            &format!("ai-ent-{i}"),
            Uuid::new_v4(),
            2,
            3,
            60,
            unit_vec(0),
            now,
        ));
    }
    // High quality, fresh, but thematically orthogonal to B's history.
    for i in 0..10 {
        records.push(episode(
            &format!("hq-{i}"),
            &format!("hq-ent-{i}"),
            Uuid::new_v4(),
            4,
            4,
            1 + i,
            unit_vec(1 + (i as usize % 7)),
            now,
        ));
    }
    // Filler: low quality, stale, orthogonal.
    for i in 0..20 {
        records.push(episode(
            &format!("fill-{i}"),
            &format!("fill-ent-{i}"),
            Uuid::new_v4(),
            2,
            3,
            200,
            unit_vec(1 + (i as usize % 7)),
            now,
        ));
    }

    let core = core_from(CatalogView::load(records, DIM));

    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();
    for &id in &viewed {
        core.append_engagement(user_b, id, EngagementType::View, now - Duration::hours(1));
    }

    let page_a = core.create_session(user_a, &[], &HashSet::new(), now).await.unwrap();
    let page_b = core.create_session(user_b, &[], &HashSet::new(), now).await.unwrap();

    assert!(page_a.cold_start);
    assert!(!page_b.cold_start);

    let ids_a: HashSet<Uuid> = page_a.first_page.iter().map(|e| e.episode_id).collect();
    let ids_b: HashSet<Uuid> = page_b.first_page.iter().map(|e| e.episode_id).collect();
    let overlap = ids_a.intersection(&ids_b).count();
    assert!(10 - overlap >= 5, "pages differ in only {} of 10 slots", 10 - overlap);

    let mean_sim_a: f32 = page_a.first_page.iter().map(|e| e.score.s_sim).sum::<f32>() / 10.0;
    let mean_sim_b: f32 = page_b.first_page.iter().map(|e| e.score.s_sim).sum::<f32>() / 10.0;
    assert!(mean_sim_b > mean_sim_a, "B's mean S_sim ({mean_sim_b}) did not exceed A's ({mean_sim_a})");
}

/// E3: quality gate enforcement - an episode with `credibility < 2` never
/// appears, for any user.
#[tokio::test]
async fn e3_quality_gate_enforcement() {
    let now = Utc::now();
    let mut records: Vec<EpisodeRecord> = (0..25)
        .map(|i| {
            episode(
                &format!("cat-{i}"),
                &format!("ent-{i}"),
                Uuid::new_v4(),
                3,
                4,
                i % 10,
                unit_vec(i as usize),
                now,
            )
        })
        .collect();
    let low_quality = episode("macro", "Fed", Uuid::new_v4(), 1, 4, 1, unit_vec(0), now);
    let low_quality_id = low_quality.id;
    records.push(low_quality);

    let core = core_from(CatalogView::load(records, DIM));

    for user_id in [Uuid::new_v4(), Uuid::new_v4()] {
        let created = core
            .create_session(user_id, &[], &HashSet::new(), now)
            .await
            .unwrap();
        let mut seen: Vec<Uuid> = created.first_page.iter().map(|e| e.episode_id).collect();
        loop {
            let page = core.load_more(created.session_id, 10, now).unwrap();
            if page.episodes.is_empty() {
                break;
            }
            seen.extend(page.episodes.iter().map(|e| e.episode_id));
        }
        assert!(!seen.contains(&low_quality_id));
    }
}

/// E4: exclusion respected - episodes a user has bookmarked never reappear
/// in any subsequent session for that user.
#[tokio::test]
async fn e4_exclusion_respected() {
    let now = Utc::now();
    let records: Vec<EpisodeRecord> = (0..30)
        .map(|i| {
            episode(
                &format!("cat-{i}"),
                &format!("ent-{i}"),
                Uuid::new_v4(),
                3,
                4,
                i % 10,
                unit_vec(i as usize),
                now,
            )
        })
        .collect();
    let bookmarked: Vec<Uuid> = records.iter().take(3).map(|r| r.id).collect();
    let core = core_from(CatalogView::load(records, DIM));

    let user_id = Uuid::new_v4();
    for &id in &bookmarked {
        core.append_engagement(user_id, id, EngagementType::Bookmark, now);
    }

    for _ in 0..3 {
        let created = core
            .create_session(user_id, &[], &HashSet::new(), now)
            .await
            .unwrap();
        let mut all: Vec<Uuid> = created.first_page.iter().map(|e| e.episode_id).collect();
        loop {
            let page = core.load_more(created.session_id, 10, now).unwrap();
            if page.episodes.is_empty() {
                break;
            }
            all.extend(page.episodes.iter().map(|e| e.episode_id));
        }
        for id in &bookmarked {
            assert!(!all.contains(id));
        }
    }
}

/// E5: recency tie-break - two episodes identical in quality and embedding,
/// differing only by publish date, both appear for a cold-start user, with
/// the more recent one ranking higher.
#[tokio::test]
async fn e5_recency_tie_break() {
    let now = Utc::now();
    let shared_embedding = unit_vec(0);
    let mut records: Vec<EpisodeRecord> = (0..18)
        .map(|i| {
            episode(
                &format!("filler-{i}"),
                &format!("ent-{i}"),
                Uuid::new_v4(),
                2,
                3,
                300,
                unit_vec(1 + (i as usize % 7)),
                now,
            )
        })
        .collect();
    let newer = episode("macro", "Fed", Uuid::new_v4(), 3, 4, 2, shared_embedding.clone(), now);
    let older = episode("macro", "ECB", Uuid::new_v4(), 3, 4, 4, shared_embedding, now);
    let (newer_id, older_id) = (newer.id, older.id);
    records.push(newer);
    records.push(older);

    let core = core_from(CatalogView::load(records, DIM));
    let created = core
        .create_session(Uuid::new_v4(), &[], &HashSet::new(), now)
        .await
        .unwrap();

    let newer_pos = created.first_page.iter().position(|e| e.episode_id == newer_id);
    let older_pos = created.first_page.iter().position(|e| e.episode_id == older_id);
    let (newer_pos, older_pos) = (newer_pos.expect("newer in top 10"), older_pos.expect("older in top 10"));
    assert!(newer_pos < older_pos, "more recent episode should rank higher");
}

/// E6: bookmarks outweigh clicks - a user whose single bookmark sits on a
/// topic opposite a single click sees that topic dominate anyway, because
/// `w_bookmark > w_view` pulls `V_activity` toward it.
#[tokio::test]
async fn e6_bookmarks_outweigh_clicks() {
    let now = Utc::now();
    let mut records = Vec::new();

    let ai_embedding = unit_vec(0);
    let crypto_embedding = unit_vec(1);

    let ai_history = episode("ai-hist", "ai-hist-ent", Uuid::new_v4(), 3, 3, 5, ai_embedding.clone(), now);
    let ai_history_id = ai_history.id;
    records.push(ai_history);

    let crypto_history_a = episode("crypto-hist-a", "crypto-hist-ent-a", Uuid::new_v4(), 3, 3, 5, crypto_embedding.clone(), now);
    let crypto_history_a_id = crypto_history_a.id;
    records.push(crypto_history_a);
    let crypto_history_b = episode("crypto-hist-b", "crypto-hist-ent-b", Uuid::new_v4(), 3, 3, 5, crypto_embedding.clone(), now);
    let crypto_history_b_id = crypto_history_b.id;
    records.push(crypto_history_b);

    // Unviewed, thematically homogeneous but structurally distinct (own
    // category/entity) so the reranker's saturation penalties never engage -
    // the comparison below is about S_sim alone.
    for i in 0..8 {
        records.push(episode(
            &format!("ai-{i}"),
            &format!("ai-ent-{i}"),
            Uuid::new_v4(),
            3,
            3,
            30,
            ai_embedding.clone(),
            now,
        ));
    }
    for i in 0..8 {
        records.push(episode(
            &format!("crypto-{i}"),
            &format!("crypto-ent-{i}"),
            Uuid::new_v4(),
            3,
            3,
            30,
            crypto_embedding.clone(),
            now,
        ));
    }
    for i in 0..10 {
        records.push(episode(
            &format!("other-{i}"),
            &format!("other-ent-{i}"),
            Uuid::new_v4(),
            3,
            3,
            100,
            unit_vec(2 + (i as usize % 6)),
            now,
        ));
    }

    let core = core_from(CatalogView::load(records, DIM));

    // User X: 1 bookmark on AI, 1 click on crypto - AI dominates V_activity.
    let user_x = Uuid::new_v4();
    core.append_engagement(user_x, ai_history_id, EngagementType::Bookmark, now);
    core.append_engagement(user_x, crypto_history_a_id, EngagementType::View, now);

    // User Y: 1 click on AI, 2 bookmarks on crypto - crypto dominates harder.
    let user_y = Uuid::new_v4();
    core.append_engagement(user_y, ai_history_id, EngagementType::View, now);
    core.append_engagement(user_y, crypto_history_a_id, EngagementType::Bookmark, now);
    core.append_engagement(user_y, crypto_history_b_id, EngagementType::Bookmark, now);

    let page_x = core.create_session(user_x, &[], &HashSet::new(), now).await.unwrap();
    let page_y = core.create_session(user_y, &[], &HashSet::new(), now).await.unwrap();

    let crypto_count = |page: &recfeed_core::CreatedSession| {
        page.first_page
            .iter()
            .filter(|e| {
                core.episode(e.episode_id)
                    .map(|ep| ep.categories.first().map(|c| c.starts_with("crypto")).unwrap_or(false))
                    .unwrap_or(false)
            })
            .count()
    };

    let count_x = crypto_count(&page_x);
    let count_y = crypto_count(&page_y);
    assert!(count_y > count_x, "crypto-bookmark-heavy user ({count_y}) should beat AI-bookmark user ({count_x})");
}

/// E7: series cap - no single session's page contains more than
/// `config.series_cap` episodes from the same series, even when that series
/// dominates the top of the score distribution.
#[tokio::test]
async fn e7_series_cap() {
    let now = Utc::now();
    let series = Uuid::new_v4();
    let mut records: Vec<EpisodeRecord> = (0..5)
        .map(|i| {
            episode(
                &format!("hot-{i}"),
                &format!("hot-ent-{i}"),
                series,
                4,
                4,
                i,
                unit_vec(0),
                now,
            )
        })
        .collect();
    records.extend((0..20).map(|i| {
        episode(
            &format!("other-{i}"),
            &format!("other-ent-{i}"),
            Uuid::new_v4(),
            3,
            3,
            i % 10,
            unit_vec(1 + (i as usize % 7)),
            now,
        )
    }));

    let config = Config::default();
    let core = core_from(CatalogView::load(records, DIM));
    let created = core
        .create_session(Uuid::new_v4(), &[], &HashSet::new(), now)
        .await
        .unwrap();

    let from_series = created
        .first_page
        .iter()
        .filter(|e| core.episode(e.episode_id).map(|ep| ep.series_id == series).unwrap_or(false))
        .count();
    assert!(u32::try_from(from_series).unwrap() <= config.series_cap);
}

/// E8: load-more determinism - paging never skips or repeats episodes, and
/// `refresh` produces a fresh, internally-deterministic queue.
#[tokio::test]
async fn e8_load_more_determinism() {
    let now = Utc::now();
    let records: Vec<EpisodeRecord> = (0..40)
        .map(|i| {
            episode(
                &format!("cat-{i}"),
                &format!("ent-{i}"),
                Uuid::new_v4(),
                3,
                4,
                i % 15,
                unit_vec(i as usize),
                now,
            )
        })
        .collect();
    let core = core_from(CatalogView::load(records, DIM));
    let user_id = Uuid::new_v4();

    let created = core.create_session(user_id, &[], &HashSet::new(), now).await.unwrap();
    let first_load = core.load_more(created.session_id, 10, now).unwrap();
    let second_load = core.load_more(created.session_id, 10, now).unwrap();

    let first_ids: HashSet<Uuid> = first_load.episodes.iter().map(|e| e.episode_id).collect();
    let second_ids: HashSet<Uuid> = second_load.episodes.iter().map(|e| e.episode_id).collect();
    assert!(first_ids.is_disjoint(&second_ids), "second load_more repeated episodes from the first");
    assert_eq!(first_load.shown_count, 20);

    let refreshed = core
        .refresh(user_id, &[], &HashSet::new(), now)
        .await
        .unwrap();
    let refreshed_again = core
        .refresh(user_id, &[], &HashSet::new(), now)
        .await
        .unwrap();
    assert_eq!(
        refreshed.first_page.iter().map(|e| e.episode_id).collect::<Vec<_>>(),
        refreshed_again.first_page.iter().map(|e| e.episode_id).collect::<Vec<_>>(),
        "refresh with identical inputs must be deterministic"
    );
}

