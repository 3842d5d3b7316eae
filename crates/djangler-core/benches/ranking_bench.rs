use criterion::{Criterion, black_box, criterion_group, criterion_main};
use djangler_core::{
    GenreTable, Metadata, QueryHit, QueryPreprocessor, RankingEngine, SearchConfig, StaticStore,
};

fn song(i: usize) -> QueryHit {
    let mut meta = Metadata::new();
    meta.insert("title".into(), format!("Song {i}").into());
    meta.insert("artist".into(), format!("Artist {}", i % 17).into());
    meta.insert("genres".into(), "indie rock, modern rock".into());
    meta.insert("popularity".into(), ((i * 7 % 100) as i64).into());
    QueryHit::new(i.to_string(), meta, i as f32 / 100.0)
}

fn section(i: usize) -> QueryHit {
    let song_id = i % 60;
    let mut meta = Metadata::new();
    meta.insert("song_id".into(), song_id.to_string().into());
    meta.insert("title".into(), format!("Song {song_id}").into());
    meta.insert("artist".into(), format!("Artist {}", song_id % 17).into());
    meta.insert("section_type".into(), "chorus".into());
    meta.insert("section_number".into(), ((i % 5) as i64).into());
    QueryHit::new(format!("{song_id}_section_{i}"), meta, i as f32 / 200.0)
        .with_document("and I'm driving through the night")
}

fn bench_hybrid_search(c: &mut Criterion) {
    let store = StaticStore::new(
        (0..50).map(song).collect(),
        (0..100).map(section).collect(),
    );
    let engine = RankingEngine::with_defaults(store).unwrap();
    let boosted = SearchConfig::new()
        .with_popularity_boost(1.3)
        .with_min_popularity(10);

    c.bench_function("hybrid_search_default", |b| {
        b.iter(|| engine.search(black_box("lonely nights driving")).unwrap());
    });

    c.bench_function("hybrid_search_genre_and_popularity", |b| {
        b.iter(|| {
            engine
                .search_with(black_box("indie rock rebellion"), &boosted)
                .unwrap()
        });
    });

    c.bench_function("sections_only", |b| {
        b.iter(|| engine.search_sections_only(black_box("heartbreak"), 10).unwrap());
    });
}

fn bench_preprocess(c: &mut Criterion) {
    let preprocessor = QueryPreprocessor::new(GenreTable::builtin().unwrap()).unwrap();

    c.bench_function("preprocess_with_genres", |b| {
        b.iter(|| preprocessor.preprocess(black_box("indie rock songs about rebellion")));
    });

    c.bench_function("preprocess_no_genres", |b| {
        b.iter(|| preprocessor.preprocess(black_box("lonely nights driving")));
    });
}

criterion_group!(benches, bench_preprocess, bench_hybrid_search);
criterion_main!(benches);
