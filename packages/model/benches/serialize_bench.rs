use criterion::{black_box, criterion_group, criterion_main, Criterion};
use folio_model::{Image, NodeData, NodeRegistry, NodeTree, TextFormat, TextNode};

fn layout_document() -> NodeTree {
    let mut grid = NodeTree::new(NodeData::layout_container("1fr 1fr 1fr 1fr"));
    for i in 1..=4 {
        grid = grid.with_child(
            NodeTree::new(NodeData::layout_item())
                .with_child(NodeTree::new(NodeData::paragraph()).with_child(NodeTree::new(
                    NodeData::Image(Image::new("photo.jpg", format!("test {}", i)).with_size(300, 120)),
                )))
                .with_child(NodeTree::paragraph_with_text(format!("test {}", i))),
        );
    }

    let mut root = NodeTree::new(NodeData::Root(Default::default()));
    for _ in 0..25 {
        root = root.with_child(
            NodeTree::new(NodeData::paragraph())
                .with_child(NodeTree::new(NodeData::Text(
                    TextNode::new("Lorem ipsum dolor sit amet").with_format(TextFormat::BOLD),
                )))
                .with_child(NodeTree::new(NodeData::text(" consectetur adipiscing elit"))),
        );
    }
    root.with_child(grid)
}

fn serialize_document(c: &mut Criterion) {
    let registry = NodeRegistry::with_defaults();
    let tree = layout_document();

    c.bench_function("serialize_document", |b| {
        b.iter(|| registry.serialize_tree(black_box(&tree)))
    });
}

fn deserialize_document(c: &mut Criterion) {
    let registry = NodeRegistry::with_defaults();
    let json = registry
        .serialize_tree(&layout_document())
        .expect("document serializes");

    c.bench_function("deserialize_document", |b| {
        b.iter(|| registry.deserialize_tree(black_box(&json)))
    });
}

fn export_document(c: &mut Criterion) {
    let registry = NodeRegistry::with_defaults();
    let tree = layout_document();

    c.bench_function("export_document", |b| {
        b.iter(|| registry.export_tree(black_box(&tree)))
    });
}

criterion_group!(
    benches,
    serialize_document,
    deserialize_document,
    export_document
);
criterion_main!(benches);
