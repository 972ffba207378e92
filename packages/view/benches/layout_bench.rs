use criterion::{black_box, criterion_group, criterion_main, Criterion};
use droplet_geometry::Point;
use droplet_model::NodeRef;
use droplet_parser::{parse, ParseOptions};
use droplet_view::{View, ViewOptions};
use std::collections::HashSet;

fn program(statements: usize) -> String {
    let mut source = String::new();
    for i in 0..statements {
        source.push_str(&format!("x{i} = (a + {i})\n"));
        source.push_str(&format!("if x{i}:\n    print x{i}\n    y = x{i}\n"));
    }
    source
}

fn full_layout(c: &mut Criterion) {
    let source = program(100);
    let (tree, root) = parse(&source, ParseOptions::default()).unwrap();

    c.bench_function("layout_full_100", |b| {
        b.iter(|| {
            let mut view = View::new(ViewOptions::default());
            view.layout(black_box(&tree), root, Point::ORIGIN)
        })
    });
}

fn cached_layout(c: &mut Criterion) {
    let source = program(100);
    let (tree, root) = parse(&source, ParseOptions::default()).unwrap();
    let mut view = View::new(ViewOptions::default());
    view.layout(&tree, root, Point::ORIGIN);

    c.bench_function("layout_cached_100", |b| {
        b.iter(|| view.layout(black_box(&tree), root, Point::ORIGIN))
    });
}

fn single_edit_layout(c: &mut Criterion) {
    let source = program(100);
    let (mut tree, root) = parse(&source, ParseOptions::default()).unwrap();
    let mut view = View::new(ViewOptions::default());
    view.layout(&tree, root, Point::ORIGIN);

    let Some(NodeRef::Token(token)) = tree.find(
        root,
        |node| matches!(node, NodeRef::Token(t) if tree.text(t) == Some("50")),
        &HashSet::new(),
    ) else {
        panic!("benchmark program has no literal 50");
    };

    let mut toggle = false;
    c.bench_function("layout_after_text_edit_100", |b| {
        b.iter(|| {
            toggle = !toggle;
            tree.set_text(token, if toggle { "5000" } else { "50" });
            view.layout(black_box(&tree), root, Point::ORIGIN)
        })
    });
}

criterion_group!(benches, full_layout, cached_layout, single_edit_layout);
criterion_main!(benches);
