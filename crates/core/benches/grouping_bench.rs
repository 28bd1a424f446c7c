use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use unitgroup_core::{
    GroupingParams, LineSegment, MinimumUnit, ObstructionIndex, Rect, UnitType, group_units,
};

#[derive(Clone)]
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn range(&mut self, lo: i32, hi: i32) -> i32 {
        lo + (self.next_u64() % (hi - lo) as u64) as i32
    }
}

fn generate_page(seed: u64, count: usize) -> Vec<MinimumUnit> {
    let mut rng = XorShift64::new(seed);
    let mut units = Vec::with_capacity(count);
    let per_row = 40;
    for i in 0..count {
        let row = (i / per_row) as i32;
        let col = (i % per_row) as i32;
        let x = col * 14 + rng.range(0, 3);
        let y = row * 24 + rng.range(0, 2);
        let text = if i % 17 == 16 { "," } else { "a" };
        units.push(MinimumUnit::from_rect(
            text,
            (x, y, x + 11, y + 12),
            0.6 + rng.range(0, 40) as f64 / 100.0,
            UnitType::Latin,
        ));
    }
    units
}

fn generate_grid(rows: usize, cols: usize) -> Vec<LineSegment> {
    let mut lines = Vec::with_capacity(rows + cols);
    for r in 0..rows {
        let y = r as f64 * 48.0 + 20.0;
        lines.push(LineSegment::new((0.0, y), (600.0, y)));
    }
    for c in 0..cols {
        let x = c as f64 * 70.0 + 5.0;
        lines.push(LineSegment::new((x, 0.0), (x, 1000.0)));
    }
    lines
}

fn bench_group_units(c: &mut Criterion) {
    let params = GroupingParams::default();
    let index = ObstructionIndex::new(generate_grid(20, 8));

    let mut group = c.benchmark_group("group_units");
    for &n in &[400usize, 1600, 6400] {
        let units = generate_page(0x5eed ^ n as u64, n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("plain", n), &units, |b, units| {
            b.iter(|| {
                let result = group_units(units.clone(), None, &params).unwrap();
                black_box(result.len());
            })
        });
        group.bench_with_input(BenchmarkId::new("with_lines", n), &units, |b, units| {
            b.iter(|| {
                let result = group_units(units.clone(), Some(&index), &params).unwrap();
                black_box(result.len());
            })
        });
    }
    group.finish();
}

fn bench_obstruction_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("obstruction_query");
    for &n in &[100usize, 1000, 10000] {
        let side = (n as f64).sqrt() as usize;
        let index = ObstructionIndex::new(generate_grid(side, side));
        group.bench_with_input(BenchmarkId::from_parameter(n), &index, |b, index| {
            b.iter(|| black_box(index.exists_line_in_region(Rect::new(300, 300, 40, 12))))
        });
    }
    group.finish();
}

criterion_group!(grouping_benches, bench_group_units, bench_obstruction_query);
criterion_main!(grouping_benches);
