//! Benchmarks pour le parsing des CSV de campagne

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Génère un CSV d'effort synthétique (transects parallèles au large du Rio Grande do Norte)
fn synthetic_effort(rows: usize) -> String {
    let mut out = String::from("Index,LineLabel,Date,LatD_Beg,LatD_End,LongD_Beg,LongD_End\n");
    for i in 0..rows {
        let lat = -4.0 - (i % 200) as f64 * 0.01;
        let lon = -35.0 - (i / 200) as f64 * 0.05;
        out.push_str(&format!(
            "{},L{},2018-01-{:02},{:.5},{:.5},{:.5},{:.5}\n",
            i,
            i / 200,
            1 + i % 28,
            lat,
            lat - 0.01,
            lon,
            lon - 0.02
        ));
    }
    out
}

fn synthetic_sightings(rows: usize) -> String {
    let mut out = String::from("Species,Lat,Long,Effort\n");
    for i in 0..rows {
        let effort = if i % 3 == 0 { "OFF" } else { "ON" };
        out.push_str(&format!(
            "Stenella,{:.5},{:.5},{}\n",
            -4.0 - (i % 97) as f64 * 0.013,
            -35.0 - (i % 89) as f64 * 0.011,
            effort
        ));
    }
    out
}

fn bench_parse_segments(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_segments");

    for rows in [1_000usize, 10_000, 100_000] {
        let content = synthetic_effort(rows);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &content, |b, content| {
            b.iter(|| {
                let segments = survey_data::parse_segments(black_box(content)).unwrap();
                black_box(segments)
            })
        });
    }

    group.finish();
}

fn bench_parse_sightings(c: &mut Criterion) {
    let content = synthetic_sightings(50_000);

    let mut group = c.benchmark_group("parse_sightings");
    group.throughput(Throughput::Bytes(content.len() as u64));
    group.bench_function("50k", |b| {
        b.iter(|| {
            let sightings = survey_data::parse_sightings(black_box(&content)).unwrap();
            black_box(survey_data::classify_by_effort(&sightings).len())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_parse_segments, bench_parse_sightings);
criterion_main!(benches);
