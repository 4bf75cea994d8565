//! Template restriction: a template must be the only top-level node

use folio_editor::{
    Command, CommandKind, Editor, EditorError, Mutation, NodeData, NodeKey, NodeSource, NodeTree, RestrictionState,
    Selection, TemplateRestriction, UpdateTag,
};
use std::cell::RefCell;
use std::rc::Rc;

fn editor_with_template() -> Editor {
    let mut editor = Editor::new();
    editor
        .dispatch(Command::InsertTemplate {
            template_id: "contact-support".to_string(),
        })
        .unwrap();
    assert_eq!(RestrictionState::classify(editor.state()), RestrictionState::TemplateOnly);
    editor
}

fn record_tags(editor: &mut Editor) -> Rc<RefCell<Vec<Vec<UpdateTag>>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let log = events.clone();
    editor.subscribe(move |event| log.borrow_mut().push(event.tags.clone()));
    events
}

fn assert_template_only(editor: &Editor) {
    let state = editor.state();
    assert_eq!(RestrictionState::classify(state), RestrictionState::TemplateOnly);
    assert!(matches!(
        state.data(&state.top_level_keys()[0]),
        Some(NodeData::LayoutContainer(_))
    ));
}

#[test]
fn test_classify_without_template() {
    let editor = Editor::new();
    assert_eq!(RestrictionState::classify(editor.state()), RestrictionState::NoTemplate);
}

#[test]
fn test_decorator_next_to_template_is_removed() {
    let mut editor = editor_with_template();
    editor.set_selection(None).unwrap();
    let events = record_tags(&mut editor);

    assert!(editor.dispatch(Command::InsertHorizontalRule).unwrap());

    assert_template_only(&editor);
    assert_eq!(
        *events.borrow(),
        vec![
            vec![UpdateTag::Command(CommandKind::InsertHorizontalRule)],
            vec![UpdateTag::Correction(TemplateRestriction::NAME)],
        ]
    );
}

#[test]
fn test_listener_sees_intrusion_before_correction() {
    let mut editor = editor_with_template();
    let states = Rc::new(RefCell::new(Vec::new()));
    let log = states.clone();
    editor.subscribe(move |event| {
        log.borrow_mut()
            .push((RestrictionState::classify(&event.state), event.is_correction()))
    });

    editor
        .update(|tx| {
            tx.append_tree(&NodeKey::root(), &NodeTree::paragraph_with_text("intruder"))?;
            Ok(())
        })
        .unwrap();

    assert_eq!(
        *states.borrow(),
        vec![
            (RestrictionState::TemplateWithIntrusion, false),
            (RestrictionState::TemplateOnly, true),
        ]
    );
    assert!(!editor.state().text_content().contains("intruder"));
}

#[test]
fn test_paste_at_root_is_removed() {
    let mut editor = editor_with_template();
    editor.set_selection(Some(Selection::caret(NodeKey::root(), 0))).unwrap();

    assert!(editor
        .dispatch(Command::PasteHtml {
            html: "<p>one</p><p>two</p>".to_string(),
        })
        .unwrap());

    assert_template_only(&editor);
    assert!(!editor.state().text_content().contains("two"));
}

#[test]
fn test_paste_inside_template_is_kept() {
    let mut editor = editor_with_template();

    assert!(editor
        .dispatch(Command::PasteHtml {
            html: "<p>pasted</p>".to_string(),
        })
        .unwrap());

    assert_template_only(&editor);
    assert!(editor.state().text_content().contains("pasted"));
}

#[test]
fn test_second_template_is_removed() -> anyhow::Result<()> {
    let mut editor = editor_with_template();
    let first = editor.state().top_level_keys()[0].clone();

    editor.update(|tx| {
        let grid = NodeTree::new(NodeData::layout_container("1fr 1fr"))
            .with_child(NodeTree::new(NodeData::layout_item()))
            .with_child(NodeTree::new(NodeData::layout_item()));
        tx.append_tree(&NodeKey::root(), &grid)?;
        Ok(())
    })?;

    assert_eq!(editor.state().top_level_keys(), &[first]);
    Ok(())
}

#[test]
fn test_import_with_intrusion_is_corrected() {
    let json = r##"{"root":{"children":[
        {"children":[
            {"detail":0,"format":0,"mode":"normal","style":"","text":"before","type":"text","version":1}
        ],"direction":null,"format":"","indent":0,"type":"paragraph","version":1},
        {"children":[
            {"children":[
                {"children":[
                    {"detail":0,"format":0,"mode":"normal","style":"","text":"inside","type":"text","version":1}
                ],"direction":null,"format":"","indent":0,"type":"paragraph","version":1}
            ],"direction":null,"format":"","indent":0,"type":"layout-item","version":1}
        ],"direction":null,"format":"","indent":0,"type":"layout-container",
         "templateColumns":"1fr","backgroundColor":"#f9fafb","version":1}
    ],"direction":null,"format":"","indent":0,"type":"root","version":1}}"##;

    let mut editor = Editor::new();
    let events = record_tags(&mut editor);
    editor.import_payload(json).unwrap();

    assert_template_only(&editor);
    assert_eq!(editor.state().text_content(), "inside");
    assert_eq!(
        *events.borrow(),
        vec![vec![UpdateTag::Import], vec![UpdateTag::Correction(TemplateRestriction::NAME)]]
    );
}

#[test]
fn test_key_enter_outside_template_is_swallowed() {
    let mut editor = editor_with_template();
    editor.set_selection(Some(Selection::caret(NodeKey::root(), 0))).unwrap();
    let before = editor.state().root_tree();
    let events = record_tags(&mut editor);

    assert!(editor.dispatch(Command::KeyEnter).unwrap());
    assert!(editor.dispatch(Command::InsertParagraph).unwrap());

    assert_eq!(editor.state().root_tree(), before);
    assert!(events.borrow().is_empty());
}

#[test]
fn test_key_enter_inside_template_adds_paragraph() {
    let mut editor = editor_with_template();
    let state = editor.state();
    let anchor = state.selection().map(|selection| selection.anchor_key().clone()).unwrap();
    let item = state
        .nearest_root_block(&anchor)
        .and_then(|block| state.parent_of(&block).cloned())
        .unwrap();
    let blocks_before = state.children_of(&item).len();

    assert!(editor.dispatch(Command::KeyEnter).unwrap());

    assert_template_only(&editor);
    assert_eq!(editor.state().children_of(&item).len(), blocks_before + 1);
}

#[test]
fn test_last_layout_item_cannot_be_removed() {
    let mut editor = editor_with_template();
    let container = editor.state().top_level_keys()[0].clone();
    let items = editor.state().children_of(&container).to_vec();
    assert_eq!(items.len(), 2);

    editor.apply(Mutation::RemoveNode { key: items[0].clone() }).unwrap();
    let version = editor.state().version();

    let err = editor.apply(Mutation::RemoveNode { key: items[1].clone() }).unwrap_err();
    assert!(matches!(err, EditorError::InvariantViolation(_)));
    assert_eq!(editor.state().version(), version);
    assert_eq!(editor.state().children_of(&container), &[items[1].clone()]);
}

#[test]
fn test_removing_template_lifts_restriction() -> anyhow::Result<()> {
    let mut editor = editor_with_template();
    editor.apply(Mutation::ClearRoot)?;
    assert_eq!(RestrictionState::classify(editor.state()), RestrictionState::NoTemplate);

    editor.set_selection(Some(Selection::caret(NodeKey::root(), 0)))?;
    assert!(editor.dispatch(Command::KeyEnter)?);
    assert_eq!(editor.state().top_level_keys().len(), 1);
    Ok(())
}
