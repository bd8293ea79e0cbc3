//! Event application and frame building benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use gridray::core::{Cursor, Grid, HighlightTable};
use gridray::redraw::{decode_batch, EventProcessor, LineCell, RedrawEvent, UiState};
use gridray::render::{CellMetrics, GlyphSource, Renderer, UvRect};
use serde_json::{json, Value};

const ROWS: usize = 50;
const COLS: usize = 200;

struct AllGlyphs;

impl GlyphSource for AllGlyphs {
    fn glyph_uv(&mut self, _ch: char, _bold: bool, _italic: bool) -> Option<UvRect> {
        Some(UvRect::default())
    }
}

fn new_state() -> UiState {
    UiState::new(
        Grid::new(ROWS, COLS),
        HighlightTable::default(),
        Cursor::default(),
    )
}

/// One full-screen redraw, as sent after `:redraw!`
fn full_redraw() -> Vec<RedrawEvent> {
    let mut batch: Vec<RedrawEvent> = (0..ROWS)
        .map(|row| RedrawEvent::GridLine {
            grid: 1,
            row,
            col_start: 0,
            cells: (0..COLS)
                .map(|col| {
                    let ch = (b'a' + (col % 26) as u8) as char;
                    LineCell::new(ch.to_string(), Some((col % 8) as u64), None)
                })
                .collect(),
        })
        .collect();
    batch.push(RedrawEvent::Flush);
    batch
}

fn full_redraw_json() -> Vec<Value> {
    let lines: Vec<Value> = (0..ROWS)
        .map(|row| json!([1, row, 0, [["x", 1, COLS / 2], ["y", 2, COLS / 2]]]))
        .collect();
    let mut group = vec![json!("grid_line")];
    group.extend(lines);
    vec![Value::Array(group), json!(["flush", []])]
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("redraw");
    let payload = full_redraw_json();
    group.throughput(Throughput::Elements(ROWS as u64));

    group.bench_function("decode_full_screen", |b| {
        b.iter(|| black_box(decode_batch(black_box(&payload))))
    });

    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("redraw");
    let batch = full_redraw();
    group.throughput(Throughput::Elements((ROWS * COLS) as u64));

    group.bench_function("apply_full_screen", |b| {
        let mut state = new_state();
        b.iter(|| {
            let outcome = EventProcessor::new(&mut state).apply_batch(black_box(&batch));
            black_box(outcome)
        })
    });

    group.bench_function("apply_scroll", |b| {
        let mut state = new_state();
        EventProcessor::new(&mut state).apply_batch(&batch);
        let scroll = RedrawEvent::GridScroll {
            grid: 1,
            top: 0,
            bottom: ROWS,
            left: 0,
            right: COLS,
            rows: 1,
        };
        b.iter(|| black_box(EventProcessor::new(&mut state).apply(black_box(&scroll))))
    });

    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let batch = full_redraw();

    group.bench_function("build_full_frame", |b| {
        let mut state = new_state();
        let mut renderer = Renderer::new(AllGlyphs, CellMetrics::new(9.0, 18.0));
        b.iter(|| {
            state.grid.mark_all_dirty();
            let frame = renderer.build_frame(&mut state.grid, &state.highlights, &state.cursor);
            black_box(frame)
        })
    });

    group.bench_function("build_one_line_frame", |b| {
        let mut state = new_state();
        EventProcessor::new(&mut state).apply_batch(&batch);
        let mut renderer = Renderer::new(AllGlyphs, CellMetrics::new(9.0, 18.0));
        renderer.build_frame(&mut state.grid, &state.highlights, &state.cursor);
        let line = RedrawEvent::GridLine {
            grid: 1,
            row: ROWS / 2,
            col_start: 0,
            cells: vec![LineCell::new("z", Some(3), Some(COLS))],
        };
        b.iter(|| {
            EventProcessor::new(&mut state).apply(&line);
            let frame = renderer.build_frame(&mut state.grid, &state.highlights, &state.cursor);
            black_box(frame)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_apply, bench_frame);
criterion_main!(benches);
