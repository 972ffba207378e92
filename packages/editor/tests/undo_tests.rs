//! Drag, drop and reparse through the undo stack

use droplet_editor::{Document, EditorError, Operation, UndoStack};
use droplet_model::{ContainerId, ContainerKind, TokenId, Tree};
use droplet_parser::{parse, ParseOptions};

const PROGRAM: &str = "a = 1\nif x:\n  b\n  c\nd";

fn document(source: &str) -> Document {
    Document::from_source(source, ParseOptions::default()).unwrap()
}

/// First container of `kind` whose text is exactly `text`
fn find(doc: &Document, kind: ContainerKind, text: &str) -> ContainerId {
    doc.tree
        .descendants(doc.root)
        .into_iter()
        .find(|c| doc.tree.container_kind(*c) == kind && doc.tree.stringify(*c) == text)
        .unwrap_or_else(|| panic!("no {kind} reading {text:?}"))
}

fn text_location(doc: &Document, value: &str) -> usize {
    let token: TokenId = doc
        .tree
        .tokens_of(doc.root)
        .find(|t| doc.tree.text(*t) == Some(value))
        .unwrap_or_else(|| panic!("no text {value:?}"));
    doc.tree.get_serialized_location(token)
}

fn end_location(doc: &Document, container: ContainerId) -> usize {
    doc.tree.get_serialized_location(doc.tree.end(container))
}

/// A single value block parsed on its own, as a palette would hold it
fn palette(source: &str) -> (Tree, ContainerId) {
    let (tree, root) = parse(source, ParseOptions::default()).unwrap();
    let block = tree.descendants(root)[0];
    (tree, block)
}

#[test]
fn test_pick_up_then_undo_restores_statement_in_indent() {
    let mut doc = document(PROGRAM);
    let mut stack = UndoStack::new();
    let before = doc.tree.serialize(doc.root);

    let b = find(&doc, ContainerKind::Block, "b");
    stack.apply(&Operation::pick_up(doc.location_of(b)), &mut doc).unwrap();
    assert_eq!(doc.stringify(), "a = 1\nif x:\n  c\nd");

    stack.undo(&mut doc).unwrap();
    assert_eq!(doc.stringify(), PROGRAM);
    assert_eq!(doc.tree.serialize(doc.root), before);
}

#[test]
fn test_pick_up_block_with_body_then_undo() {
    let mut doc = document(PROGRAM);
    let mut stack = UndoStack::new();

    let header = find(&doc, ContainerKind::Block, "if x:\n  b\n  c");
    stack.apply(&Operation::pick_up(doc.location_of(header)), &mut doc).unwrap();
    assert_eq!(doc.stringify(), "a = 1\nd");

    stack.undo(&mut doc).unwrap();
    assert_eq!(doc.stringify(), PROGRAM);

    stack.redo(&mut doc).unwrap();
    assert_eq!(doc.stringify(), "a = 1\nd");
}

#[test]
fn test_drag_is_one_undo_step() {
    let mut doc = document(PROGRAM);
    let mut stack = UndoStack::new();

    stack.begin_batch();
    stack.set_batch_description("Move d");
    let d = find(&doc, ContainerKind::Block, "d");
    let inverse = stack.apply(&Operation::pick_up(doc.location_of(d)), &mut doc).unwrap();
    let lifted = inverse.carried_block().unwrap();
    assert_eq!(doc.stringify(), "a = 1\nif x:\n  b\n  c");

    let b = find(&doc, ContainerKind::Block, "b");
    let anchor = end_location(&doc, b);
    stack.apply(&Operation::drop_block(anchor, lifted), &mut doc).unwrap();
    stack.end_batch(&mut doc);

    let moved = "a = 1\nif x:\n  b\n  d\n  c";
    assert_eq!(doc.stringify(), moved);
    assert_eq!(stack.undo_levels(), 1);
    assert_eq!(stack.undo_description(), Some("Move d"));

    stack.undo(&mut doc).unwrap();
    assert_eq!(doc.stringify(), PROGRAM);

    stack.redo(&mut doc).unwrap();
    assert_eq!(doc.stringify(), moved);
}

#[test]
fn test_drop_into_socket_displaces_text() {
    let mut doc = document("x = 1\nprint y");
    let mut stack = UndoStack::new();

    let (source, value) = palette("42");
    let block = doc.import(&source, value);
    assert!(!doc.tree.is_attached(block));

    let socket = find(&doc, ContainerKind::Socket, "1");
    let anchor = doc.location_of(socket);
    stack.apply(&Operation::drop_block(anchor, block), &mut doc).unwrap();
    assert_eq!(doc.stringify(), "x = 42\nprint y");
    assert!(doc.tree.socket_filled_block(socket).is_some());

    // The socket is taken now
    let err = stack
        .apply(&Operation::drop_block(anchor, block), &mut doc)
        .unwrap_err();
    assert_eq!(err, EditorError::SocketFilled(anchor));

    stack.undo(&mut doc).unwrap();
    assert_eq!(doc.stringify(), "x = 1\nprint y");
    assert!(doc.tree.socket_filled_block(socket).is_none());

    stack.redo(&mut doc).unwrap();
    assert_eq!(doc.stringify(), "x = 42\nprint y");
}

#[test]
fn test_dragging_out_of_socket_leaves_it_empty() {
    let mut doc = document("print (a + b)");
    let mut stack = UndoStack::new();

    let group = find(&doc, ContainerKind::Block, "(a + b)");
    stack.apply(&Operation::pick_up(doc.location_of(group)), &mut doc).unwrap();
    assert_eq!(doc.stringify(), "print ``");

    stack.undo(&mut doc).unwrap();
    assert_eq!(doc.stringify(), "print (a + b)");
}

#[test]
fn test_reparse_block_and_undo() {
    let mut doc = document("x = 1\nprint (a + b)");
    let mut stack = UndoStack::new();

    let print = find(&doc, ContainerKind::Block, "print (a + b)");
    let location = doc.location_of(print);
    let reparse = Operation::Reparse {
        location,
        text: "print (a - b)".to_string(),
    };
    stack.apply(&reparse, &mut doc).unwrap();
    assert_eq!(doc.stringify(), "x = 1\nprint (a - b)");
    assert!(!doc.tree.is_attached(print));

    stack.undo(&mut doc).unwrap();
    assert_eq!(doc.stringify(), "x = 1\nprint (a + b)");

    stack.redo(&mut doc).unwrap();
    assert_eq!(doc.stringify(), "x = 1\nprint (a - b)");
}

#[test]
fn test_reparse_header_keeps_body() {
    let mut doc = document("if x:\n  a");
    let header = find(&doc, ContainerKind::Block, "if x:\n  a");
    let location = doc.location_of(header);

    assert!(doc.try_reparse(location, "while y:"));
    assert_eq!(doc.stringify(), "while y:\n  a");
}

#[test]
fn test_reparse_socket_into_expression() {
    let mut doc = document("x = 1");
    let mut stack = UndoStack::new();

    let socket = find(&doc, ContainerKind::Socket, "1");
    let location = doc.location_of(socket);
    let reparse = Operation::Reparse {
        location,
        text: "2 + 3".to_string(),
    };
    stack.apply(&reparse, &mut doc).unwrap();
    assert_eq!(doc.stringify(), "x = 2 + 3");

    let replaced = find(&doc, ContainerKind::Socket, "2 + 3");
    let value = doc.tree.socket_filled_block(replaced).unwrap();
    assert_eq!(doc.tree.container(value).as_block().unwrap().color, "value");

    stack.undo(&mut doc).unwrap();
    assert_eq!(doc.stringify(), "x = 1");

    // A lone literal fills the socket directly
    assert!(doc.try_reparse(location, "y"));
    assert_eq!(doc.stringify(), "x = y");
    let socket = find(&doc, ContainerKind::Socket, "y");
    assert!(doc.tree.socket_filled_block(socket).is_none());
}

#[test]
fn test_reparse_rejections() {
    let mut doc = document("if x:\n  a");
    let header = find(&doc, ContainerKind::Block, "if x:\n  a");
    let location = doc.location_of(header);

    let two_lines = Operation::Reparse {
        location,
        text: "a\nb".to_string(),
    };
    assert!(matches!(doc.apply(&two_lines), Err(EditorError::Parse(_))));

    let indent = doc
        .tree
        .descendants(doc.root)
        .into_iter()
        .find(|c| doc.tree.container_kind(*c) == ContainerKind::Indent)
        .unwrap();
    let indent_location = doc.location_of(indent);
    let err = doc
        .apply(&Operation::Reparse {
            location: indent_location,
            text: "b".to_string(),
        })
        .unwrap_err();
    assert_eq!(
        err,
        EditorError::NotReparseable {
            location: indent_location,
            kind: ContainerKind::Indent
        }
    );

    assert_eq!(doc.stringify(), "if x:\n  a");
    assert_eq!(doc.version, 0);
}

#[test]
fn test_repeated_pick_up_and_undo_reuses_arena() {
    let source = "a = 1\nb = 2";
    let mut doc = document(source);
    let mut stack = UndoStack::with_max_levels(1);
    let initial = (doc.tree.token_count(), doc.tree.container_count());

    fn cycle(doc: &mut Document, stack: &mut UndoStack) {
        let a = find(doc, ContainerKind::Block, "a = 1");
        let location = doc.location_of(a);
        stack.apply(&Operation::pick_up(location), doc).unwrap();
        stack.undo(doc).unwrap();
    }

    cycle(&mut doc, &mut stack);
    let steady = (doc.tree.token_count(), doc.tree.container_count());
    for _ in 0..1000 {
        cycle(&mut doc, &mut stack);
    }
    assert_eq!((doc.tree.token_count(), doc.tree.container_count()), steady);
    assert_eq!(doc.stringify(), source);

    // The last pick-up is still redoable
    assert!(stack.redo(&mut doc).unwrap());
    assert_eq!(doc.stringify(), "b = 2");
    stack.undo(&mut doc).unwrap();

    stack.clear(&mut doc);
    assert_eq!((doc.tree.token_count(), doc.tree.container_count()), initial);
    assert_eq!(doc.stringify(), source);
}

#[test]
fn test_dropped_history_keeps_blocks_still_in_use() {
    let mut doc = document("x = 1\nprint y");
    let mut stack = UndoStack::with_max_levels(1);
    let (palette_tree, palette_block) = palette("42");
    let block = doc.import(&palette_tree, palette_block);

    let y = find(&doc, ContainerKind::Socket, "y");
    stack.apply(&Operation::drop_block(doc.location_of(y), block), &mut doc).unwrap();
    let one = find(&doc, ContainerKind::Socket, "1");
    stack.apply(&Operation::drop_block(doc.location_of(one), block), &mut doc).unwrap();
    assert_eq!(doc.stringify(), "x = 42\nprint 42");

    // The first drop fell off the stack, but the second still copies `block`
    assert!(doc.tree.contains_container(block));
    stack.undo(&mut doc).unwrap();
    stack.redo(&mut doc).unwrap();
    assert_eq!(doc.stringify(), "x = 42\nprint 42");
}

#[test]
fn test_failed_undo_rolls_back_and_keeps_batch() {
    let mut doc = document("x = 1\ny = 2");
    let mut stack = UndoStack::new();

    stack.begin_batch();
    for (old, new) in [("2", "3"), ("1", "5")] {
        let operation = Operation::SetText {
            location: text_location(&doc, old),
            value: new.to_string(),
        };
        stack.apply(&operation, &mut doc).unwrap();
    }
    stack.end_batch(&mut doc);
    assert_eq!(doc.stringify(), "x = 5\ny = 3");

    // An edit outside the stack removes the text the first inverse needs
    let y = find(&doc, ContainerKind::Block, "y = 3");
    let location = doc.location_of(y);
    let lifted = doc.apply(&Operation::pick_up(location)).unwrap();
    doc.discard(&lifted);
    assert_eq!(doc.stringify(), "x = 5");

    assert!(matches!(stack.undo(&mut doc), Err(EditorError::InvalidLocation(_))));
    assert_eq!(doc.stringify(), "x = 5");
    assert_eq!(stack.undo_levels(), 1);
    assert_eq!(stack.redo_levels(), 0);
}
