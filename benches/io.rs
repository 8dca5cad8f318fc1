use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::io::Cursor;

use onedd::{decode_record, GridReader, Header, Writer, CELLS_PER_DAY};

// Helper to create an in-memory file of `num_days` days
fn create_test_data(num_days: usize) -> Vec<u8> {
    let header = Header::new(1997, 1, num_days, -99999.0);
    let mut writer = Writer::new(Vec::new(), &header).unwrap();

    for day in 0..num_days {
        let readings: Vec<_> = (0..CELLS_PER_DAY)
            .map(|i| {
                if i % 17 == 0 {
                    None
                } else {
                    Some((day * 31 + i % 113) as f32 * 0.1) // Some arbitrary values
                }
            })
            .collect();
        writer.write_day(&readings).unwrap();
    }
    writer.finish().unwrap();
    writer.into_inner()
}

fn bench_io(c: &mut Criterion) {
    let mut group = c.benchmark_group("io");
    let num_days = 31;
    let buffer = create_test_data(num_days);

    group.bench_function("decode_record", |b| {
        let record = &buffer[onedd::HEADER_SIZE..onedd::HEADER_SIZE + onedd::RECORD_SIZE];
        b.iter(|| black_box(decode_record(black_box(record), -99999.0)));
    });

    group.bench_function("random_access", |b| {
        let mut reader = GridReader::open(Cursor::new(buffer.clone())).unwrap();
        b.iter(|| {
            for index in (0..num_days).rev() {
                black_box(reader.get(index).unwrap());
            }
        });
    });

    group.bench_function("iterate", |b| {
        let mut reader = GridReader::open(Cursor::new(buffer.clone())).unwrap();
        b.iter(|| {
            let days = reader.iter().unwrap().map(|d| d.unwrap()).count();
            assert_eq!(days, num_days);
        });
    });

    group.bench_function("measurements", |b| {
        let mut reader = GridReader::open(Cursor::new(buffer.clone())).unwrap();
        b.iter(|| {
            let observed = reader
                .measurements()
                .unwrap()
                .filter(|m| m.as_ref().unwrap().precipitation.is_some())
                .count();
            black_box(observed)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_io);
criterion_main!(benches);
