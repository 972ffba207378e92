//! Whole-document properties: parse/stringify fixed points, splice
//! inverses through operations, and drop legality

use anyhow::Result;
use droplet_editor::{Document, Operation, UndoStack};
use droplet_model::{AcceptLevel, AcceptPolicy, ContainerId, ContainerKind, SocketLevel};
use droplet_parser::{parse, ParseOptions};

const SAMPLES: &[&str] = &[
    "",
    "x = 1",
    "a = 1\nif x:\n  b\n  c\nd",
    "def f(a):\n  if a:\n    return (a + 1)\n  return 0\n\nprint f(2)",
    "# a comment\nwhile running:\n  step ``\n",
];

fn blocks(doc: &Document) -> Vec<ContainerId> {
    doc.tree
        .descendants(doc.root)
        .into_iter()
        .filter(|c| doc.tree.container_kind(*c) == ContainerKind::Block)
        .collect()
}

fn reparsed(text: &str) -> Result<String> {
    let (tree, root) = parse(text, ParseOptions::default())?;
    Ok(tree.stringify(root))
}

#[test]
fn test_empty_program() -> Result<()> {
    let doc = Document::from_source("", ParseOptions::default())?;
    assert!(doc.tree.descendants(doc.root).is_empty());
    assert_eq!(doc.stringify(), "");
    Ok(())
}

#[test]
fn test_single_assignment() -> Result<()> {
    let doc = Document::from_source("x = 1", ParseOptions::default())?;
    let top: Vec<ContainerId> = doc
        .tree
        .descendants(doc.root)
        .into_iter()
        .filter(|c| doc.tree.container(*c).parent() == Some(doc.root))
        .collect();

    assert_eq!(top.len(), 1);
    let block = doc.tree.container(top[0]).as_block().unwrap();
    assert_eq!(block.color, "command");
    assert_eq!(doc.stringify(), "x = 1");
    Ok(())
}

#[test]
fn test_stringify_is_a_fixed_point() -> Result<()> {
    for source in SAMPLES {
        let text = reparsed(source)?;
        assert_eq!(reparsed(&text)?, text, "source {source:?}");
    }
    Ok(())
}

#[test]
fn test_fixed_point_after_edits() -> Result<()> {
    let mut doc = Document::from_source(SAMPLES[3], ParseOptions::default())?;
    let mut stack = UndoStack::new();

    // Move the first statement of the body to the end of the program
    let body = blocks(&doc)
        .into_iter()
        .find(|b| doc.tree.stringify(*b).starts_with("if a:"))
        .unwrap();
    let inverse = stack.apply(&Operation::pick_up(doc.location_of(body)), &mut doc)?;
    let last = blocks(&doc)
        .into_iter()
        .filter(|b| doc.tree.container(*b).parent() == Some(doc.root))
        .last()
        .unwrap();
    let anchor = doc.tree.get_serialized_location(doc.tree.end(last));
    stack.apply(&Operation::drop_block(anchor, inverse.carried_block().unwrap()), &mut doc)?;

    let text = doc.stringify();
    assert_eq!(reparsed(&text)?, text);
    Ok(())
}

#[test]
fn test_pick_up_and_undo_every_block() -> Result<()> {
    for source in SAMPLES {
        let mut doc = Document::from_source(source, ParseOptions::default())?;
        let expected = doc.tree.serialize(doc.root);

        for index in 0..blocks(&doc).len() {
            let block = blocks(&doc)[index];
            let inverse = doc.apply(&Operation::pick_up(doc.location_of(block)))?;
            doc.apply(&inverse)?;
            assert_eq!(
                doc.tree.serialize(doc.root),
                expected,
                "block {index} of {source:?}"
            );
        }
    }
    Ok(())
}

#[test]
fn test_versions_rise_along_the_edited_path() -> Result<()> {
    let mut doc = Document::from_source(SAMPLES[2], ParseOptions::default())?;
    let b = blocks(&doc)
        .into_iter()
        .find(|c| doc.tree.stringify(*c) == "b")
        .unwrap();
    let text = doc.tree.tokens_of(b).find(|t| doc.tree.text(*t) == Some("b")).unwrap();

    let ancestors: Vec<ContainerId> = doc.tree.ancestors(text.into()).collect();
    let before: Vec<u64> = ancestors.iter().map(|c| doc.tree.container(*c).version()).collect();
    let first = blocks(&doc)[0];
    let untouched = doc.tree.container(first).version();

    doc.apply(&Operation::SetText {
        location: doc.tree.get_serialized_location(text),
        value: "bb".to_string(),
    })?;

    for (c, old) in ancestors.iter().zip(before) {
        assert!(doc.tree.container(*c).version() > old);
    }
    assert_eq!(doc.tree.container(first).version(), untouched);
    Ok(())
}

#[test]
fn test_block_only_never_lands_in_forbidding_socket() -> Result<()> {
    let doc = Document::from_source("x = 1\ny = 2", ParseOptions::default())?;
    let all = blocks(&doc);
    let second = all[1];
    assert_eq!(
        doc.tree.container(second).as_block().unwrap().socket_level,
        SocketLevel::BlockOnly
    );

    let target = doc
        .tree
        .descendants(all[0])
        .into_iter()
        .find(|c| doc.tree.stringify(*c) == "x")
        .unwrap();
    assert_eq!(
        doc.tree.container(target).as_socket().unwrap().accepts,
        AcceptPolicy::Forbid
    );

    let level = doc.tree.get_accept_level(second, target);
    assert_eq!(level, AcceptLevel::Forbid);
    assert!(!level.is_droppable());
    Ok(())
}
