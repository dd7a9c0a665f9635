use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tetris_lookahead::core::{Board, PieceCatalog, PieceQueue, ScoreWeights};
use tetris_lookahead::engine::{Lookahead, ParallelSearch, SearchConfig};

fn midgame_board() -> Board {
    Board::from_picture(
        "
        ....x.....
        x..xxx...x
        xx.xxxx.xx
        xxxxxxx.xx
        xxx.xxxxxx
        ",
    )
}

fn bench_drop_and_clear(c: &mut Criterion) {
    let catalog = PieceCatalog::standard();
    let i = &catalog[catalog.find("I").unwrap()];
    let vertical = i.rotations()[1].shifted(9);
    let mut rows = [0; 20];
    for row in rows.iter_mut().take(4) {
        *row = 0b1111111110;
    }
    let board = Board::from_rows(rows);

    c.bench_function("drop_clear_4_lines", |b| {
        b.iter(|| {
            let mut board = board.clone();
            black_box(board.place(black_box(&vertical)))
        })
    });
}

fn bench_features(c: &mut Criterion) {
    let board = midgame_board();
    c.bench_function("board_features", |b| b.iter(|| black_box(&board).features()));
}

fn bench_score(c: &mut Criterion) {
    let board = midgame_board();
    let weights = ScoreWeights::default();
    c.bench_function("score", |b| {
        b.iter(|| weights.score(black_box(&board), 1, 3, 2))
    });
}

fn bench_sequential_search(c: &mut Criterion) {
    let catalog = PieceCatalog::standard();
    let weights = ScoreWeights::default();
    let board = midgame_board();
    let queue = PieceQueue::new([6, 1]);
    let search = Lookahead::new(&catalog, &weights, 2);

    c.bench_function("search_depth_2", |b| {
        b.iter(|| search.search(black_box(&board), &queue))
    });
}

fn bench_parallel_search(c: &mut Criterion) {
    let catalog = Arc::new(PieceCatalog::standard());
    let config = SearchConfig::default().with_lookahead(3);
    let Ok(mut search) = ParallelSearch::new(catalog, &config) else {
        return;
    };
    let board = midgame_board();
    let queue = PieceQueue::new([6, 1, 3]);

    let mut group = c.benchmark_group("parallel");
    group.sample_size(20);
    group.bench_function("search_depth_3", |b| {
        b.iter(|| search.find_best(black_box(&board), &queue))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_drop_and_clear,
    bench_features,
    bench_score,
    bench_sequential_search,
    bench_parallel_search
);
criterion_main!(benches);
