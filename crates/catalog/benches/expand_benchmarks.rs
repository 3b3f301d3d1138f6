use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use craftledger_catalog::{expand, Catalog, Recipe};

/// Each item in a layer uses every item of the next layer.
fn layered_catalog(layers: usize, width: usize) -> Catalog {
    let mut recipes = Vec::new();
    for layer in 0..layers {
        for i in 0..width {
            let components: Vec<(String, f64)> = (0..width)
                .map(|j| (format!("l{}_{}", layer + 1, j), (j + 1) as f64))
                .collect();
            recipes.push(Recipe::new(format!("l{layer}_{i}"), components).expect("valid recipe"));
        }
    }
    let top: Vec<(String, f64)> = (0..width).map(|i| (format!("l0_{i}"), 1.0)).collect();
    recipes.push(Recipe::new("top", top).expect("valid recipe"));
    Catalog::from_recipes(recipes).expect("valid catalog")
}

fn chain_catalog(depth: usize) -> Catalog {
    let recipes = (0..depth)
        .map(|i| Recipe::new(format!("c{i}"), [(format!("c{}", i + 1), 1.0)]).expect("valid recipe"));
    Catalog::from_recipes(recipes).expect("valid catalog")
}

fn bench_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand");

    for layers in [2usize, 3, 4] {
        let catalog = layered_catalog(layers, 4);
        group.bench_with_input(BenchmarkId::new("layered_width4", layers), &catalog, |b, cat| {
            b.iter(|| expand(black_box("top"), black_box(10), cat).expect("acyclic"))
        });
    }

    let chain = chain_catalog(1_000);
    group.bench_function("chain_1000", |b| {
        b.iter(|| expand(black_box("c0"), black_box(1), &chain).expect("acyclic"))
    });

    group.finish();
}

criterion_group!(benches, bench_expand);
criterion_main!(benches);
