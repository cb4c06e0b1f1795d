use std::fs;
use std::sync::Arc;
use std::thread;

use discovery_core::{Document, Kind};
use discovery_index::{store, Indexer, IndexerOptions};
use discovery_search::{SearchEngine, SearchOptions};
use proptest::prelude::*;

fn build(docs: &[Document]) -> discovery_index::Index {
    Indexer::new(IndexerOptions { parallel: false, ..IndexerOptions::default() })
        .build_index(docs)
        .expect("build")
}

fn skill(name: &str, description: &str) -> Document {
    Document::new(Kind::skill(), name).with_description(description)
}

fn two_skills() -> Vec<Document> {
    vec![
        skill("a", "optimize database query performance"),
        skill("b", "optimize frontend rendering performance"),
    ]
}

#[test]
fn shared_rare_term_ranks_first() {
    let engine = SearchEngine::new(build(&two_skills()));
    let hits = engine.search("optimize database performance", &SearchOptions::default());
    let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["skill:a", "skill:b"]);
    assert!(hits[0].score > hits[1].score);
    assert!(hits.iter().all(|h| (0.0..=1.0).contains(&h.score)));
}

#[test]
fn empty_and_stopword_queries_return_nothing() {
    let engine = SearchEngine::new(build(&two_skills()));
    let options = SearchOptions::default().with_min_score(0.0);
    assert!(engine.search("", &options).is_empty());
    assert!(engine.search("the and of", &options).is_empty());
}

#[test]
fn limit_and_min_score_are_honoured() {
    let engine = SearchEngine::new(build(&two_skills()));
    let top = engine.search("optimize performance", &SearchOptions::default().with_limit(1));
    assert_eq!(top.len(), 1);

    let strict = engine.search("optimize database performance", &SearchOptions::default().with_min_score(0.5));
    assert_eq!(strict.len(), 1);
    assert_eq!(strict[0].id, "skill:a");
}

#[test]
fn stopword_document_is_isolated() {
    let mut docs = two_skills();
    docs.push(skill("zz", "the and of"));
    let engine = SearchEngine::new(build(&docs));

    assert!(engine.find_related("skill:zz", 10).is_empty());
    for id in ["skill:a", "skill:b"] {
        let related = engine.find_related(id, 10);
        assert!(related.iter().all(|h| h.id != "skill:zz"));
        assert!(related.iter().all(|h| h.score > 0.0));
    }
    let any = engine.search("optimize", &SearchOptions::default().with_min_score(0.01));
    assert!(any.iter().all(|h| h.id != "skill:zz"));
}

#[test]
fn related_documents_exclude_the_reference() {
    let engine = SearchEngine::new(build(&two_skills()));
    let related = engine.find_related("skill:a", 10);
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].id, "skill:b");
    assert!(engine.find_related("skill:missing", 10).is_empty());
}

#[test]
fn missing_or_corrupt_index_falls_back_to_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("index.json");

    let engine = SearchEngine::open(&path);
    assert!(engine.is_empty());
    assert!(engine.search("optimize", &SearchOptions::default()).is_empty());
    assert!(SearchEngine::try_open(&path).is_err());

    fs::write(&path, "[1, 2, 3]").unwrap();
    let engine = SearchEngine::open(&path);
    assert_eq!(engine.len(), 0);
    assert!(engine.find_related("skill:a", 5).is_empty());
}

#[test]
fn reload_picks_up_rebuilt_index() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("index.json");
    store::save(&build(&two_skills()[..1]), &path).unwrap();

    let engine = SearchEngine::open(&path);
    assert_eq!(engine.len(), 1);

    store::save(&build(&two_skills()), &path).unwrap();
    assert!(engine.reload(&path));
    assert_eq!(engine.len(), 2);

    fs::write(&path, "garbage").unwrap();
    assert!(!engine.reload(&path));
    assert_eq!(engine.len(), 2, "failed reload keeps the previous snapshot");
}

#[test]
fn concurrent_searches_during_swap() {
    let engine = Arc::new(SearchEngine::new(build(&two_skills())));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..200 {
                    let hits = engine.search("optimize database", &SearchOptions::default());
                    // Either the two-document snapshot or the one-document one
                    assert!(hits.len() <= 2);
                }
            })
        })
        .collect();
    for _ in 0..50 {
        engine.swap(build(&two_skills()[..1]));
        engine.swap(build(&two_skills()));
    }
    for reader in readers {
        reader.join().unwrap();
    }
}

proptest! {
    #[test]
    fn find_related_never_returns_itself(
        descriptions in prop::collection::vec("(cache|query|render|index|shard|the|and)( (cache|query|render|index|shard|the|and)){0,5}", 1..8),
        pick in 0usize..8,
        limit in 1usize..10,
    ) {
        let docs: Vec<Document> = descriptions
            .iter()
            .enumerate()
            .map(|(i, d)| skill(&format!("doc{}", i), d))
            .collect();
        let engine = SearchEngine::new(build(&docs));
        let id = &docs[pick % docs.len()].id;
        let related = engine.find_related(id, limit);
        prop_assert!(related.len() <= limit);
        prop_assert!(related.iter().all(|h| &h.id != id));
        prop_assert!(related.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
