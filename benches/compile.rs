//! Document Compilation Benchmarks
//!
//! Measures the body compiler on a representative long-form post and the
//! render-tree interpreter on its output.
//!
//! Run with: `cargo bench --bench compile`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use folio::document::{compile, Compiler, CompileOptions};
use folio::library::{split_header, FrontMatter};
use folio::render::render;

/// One section of a typical post; repeated to build larger bodies
const SECTION: &str = r#"## Getting started

Install the toolchain and run the **first** build. See the [guide](https://example.com/guide)
for details on `cargo` and *workspaces*.

```bash title="setup.sh" {1,3}
$ curl -sSf https://sh.rustup.rs | sh
$ rustup default stable
$ cargo new demo

```

| Crate | Purpose | Since |
|:------|:-------:|------:|
| axum | HTTP | 0.7 |
| tokio | Runtime | 1.0 |

> [!TIP]
> Keep the lockfile in version control.

- First point
- Second point
  1. nested
  2. items

<Callout type="note" title="Aside">
Components nest *regular* content.
</Callout>
"#;

fn post(sections: usize) -> String {
    let mut body = String::from("---\ntitle: Benchmark\npublishedAt: 2024-01-01\ntags: [rust, bench]\n---\n");
    for _ in 0..sections {
        body.push_str(SECTION);
        body.push('\n');
    }
    body
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    for sections in [1, 10, 50] {
        let source = post(sections);
        let (front_matter, body) = split_header(&source).expect("valid header");
        group.throughput(Throughput::Bytes(body.len() as u64));

        group.bench_with_input(BenchmarkId::new("body", sections), &body, |b, body| {
            let compiler = Compiler::new(CompileOptions::default());
            b.iter(|| {
                let compiled = compiler
                    .compile(black_box(body), front_matter.clone())
                    .expect("Failed to compile");
                black_box(compiled)
            })
        });
    }

    group.finish();
}

fn bench_header(c: &mut Criterion) {
    let source = post(1);
    c.bench_function("split_header", |b| {
        b.iter(|| black_box(split_header(black_box(&source)).expect("valid header")))
    });
}

fn bench_render(c: &mut Criterion) {
    let source = post(10);
    let (_, body) = split_header(&source).expect("valid header");
    let compiled = compile(body, FrontMatter::new()).expect("Failed to compile");

    c.bench_function("render_tree", |b| {
        b.iter(|| black_box(render(black_box(&compiled.render_tree))))
    });
}

criterion_group!(benches, bench_compile, bench_header, bench_render);
criterion_main!(benches);
