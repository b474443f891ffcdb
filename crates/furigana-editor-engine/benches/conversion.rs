use criterion::{Criterion, criterion_group, criterion_main};
use furigana_editor_engine::convert::{ConvertOptions, Converter, DictionaryConverter};
use furigana_editor_engine::editing::{Document, TextBuffer};

fn converter() -> DictionaryConverter {
    DictionaryConverter::from_entries([
        ("今日", "きょう"),
        ("天気", "てんき"),
        ("食べる", "たべる"),
        ("日本語", "にほんご"),
        ("勉強", "べんきょう"),
    ])
    .unwrap()
}

fn generate_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("{i}: 今日は天気がいいので日本語を勉強して食べる"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion");
    group.sample_size(10);

    let converter = converter();
    let options = ConvertOptions::default();
    let text = generate_text(200);

    group.bench_function("convert_text", |b| {
        b.iter(|| {
            let out = converter.convert(std::hint::black_box(&text), &options);
            std::hint::black_box(out)
        });
    });

    let doc = Document::from_plain_text(&text);
    group.bench_function("block_line_break", |b| {
        b.iter(|| {
            let mut d = doc.clone();
            let patch = d.confirm_line_break(&converter, &options);
            std::hint::black_box(patch)
        });
    });

    let buffer = TextBuffer::from_text(&text);
    group.bench_function("global_line_break", |b| {
        b.iter(|| {
            let mut t = buffer.clone();
            let restored = t.confirm_line_break(&converter, &options);
            std::hint::black_box(restored)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_conversion);
criterion_main!(benches);
