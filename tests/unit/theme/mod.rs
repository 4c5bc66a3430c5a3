use super::*;
use crate::foundation::core::{Rgba, Transform2x3};
use crate::model::node::{ContainerNode, GroupNode, NodeBase, TextNode, VoidContainerNode};
use crate::model::paint::{GradientKind, GradientPaint, ScaleMode};
use crate::model::text::{
    FontName, LetterSpacing, LineHeight, TextAlignHorizontal, TextAlignVertical, TextCase,
    Truncation,
};

fn red() -> Paint {
    Paint::solid(Rgba::new(1.0, 0.0, 0.0, 1.0))
}

fn rect(id: &str, fill: Paint) -> WorldviewNode {
    WorldviewNode::VoidContainer(VoidContainerNode {
        base: NodeBase::new(id, id).sized(10.0, 10.0),
        fill: Some(Indirect::Value(fill)),
        ..Default::default()
    })
}

fn text(id: &str, characters: &str) -> WorldviewNode {
    WorldviewNode::Text(TextNode {
        base: NodeBase::new(id, id),
        fill: Some(Indirect::Value(Paint::solid(Rgba::BLACK))),
        font_name: FontName::default(),
        font_size: 14.0,
        font_weight: 400,
        letter_spacing: LetterSpacing::default(),
        line_height: LineHeight::default(),
        text_align_horizontal: TextAlignHorizontal::Left,
        text_align_vertical: TextAlignVertical::Top,
        text_case: TextCase::Original,
        characters: Indirect::Value(characters.to_string()),
        truncation: Truncation::Disabled,
    })
}

fn container(id: &str, children: Vec<WorldviewNode>) -> WorldviewNode {
    WorldviewNode::Container(ContainerNode {
        base: NodeBase::new(id, id).sized(100.0, 100.0),
        fill: Some(Indirect::Value(Paint::solid(Rgba::WHITE))),
        children: Some(children),
        ..Default::default()
    })
}

#[test]
fn literals_become_variables_with_fallbacks() {
    let root = container("1:1", vec![rect("1:2", red()), text("1:3", "Hello")]);
    let screen = extract_screen(&root);

    assert_eq!(screen.name, "1:1");
    let theme = &screen.meta.theme;
    assert_eq!(theme.colors.len(), 3);
    assert_eq!(theme.colors.get("#FF0000"), Some(&red()));
    assert_eq!(theme.characters.get("text:Hello").map(String::as_str), Some("Hello"));

    let themed = screen.root.children();
    let WorldviewNode::VoidContainer(r) = &themed[0] else {
        panic!("expected a rectangle");
    };
    assert_eq!(r.fill, Some(Indirect::variable("#FF0000", red())));
    let WorldviewNode::Text(t) = &themed[1] else {
        panic!("expected text");
    };
    assert_eq!(t.characters, Indirect::variable("text:Hello", "Hello".to_string()));
}

#[test]
fn input_tree_is_left_untouched() {
    let root = container("1:1", vec![rect("1:2", red())]);
    let before = root.clone();
    let _ = extract_screen(&root);
    assert_eq!(root, before);
}

#[test]
fn equal_colors_share_one_entry() {
    let root = container("1:1", vec![rect("1:2", red()), rect("1:3", red())]);
    let mut extractor = ThemeExtractor::new();
    let first = extractor.apply(&root);
    let second = extractor.apply(&root);
    assert_eq!(first, second);
    assert_eq!(extractor.theme().colors.len(), 2);
}

#[test]
fn images_are_recorded_as_preprocessed() {
    let root = container("1:1", vec![rect("1:2", Paint::image("abc", ScaleMode::Fit))]);
    let screen = extract_screen(&root);
    match screen.meta.theme.images.get("abc") {
        Some(ImageAsset::Preprocessed(img)) => assert_eq!(img.scale_mode, ScaleMode::Fit),
        other => panic!("unexpected image entry: {other:?}"),
    }
}

#[test]
fn only_container_children_are_visited() {
    let group = WorldviewNode::Group(GroupNode {
        base: NodeBase::new("1:5", "group"),
        children: Some(vec![rect("1:6", red())]),
    });
    let root = container("1:1", vec![group]);
    let screen = extract_screen(&root);
    let inner = &screen.root.children()[0].children()[0];
    let WorldviewNode::VoidContainer(r) = inner else {
        panic!("expected a rectangle");
    };
    assert!(r.fill.as_ref().is_some_and(Indirect::is_value));
}

#[test]
fn mixed_paint_themes_each_constituent() {
    let gradient = Paint::gradient(
        GradientKind::GradientRadial,
        GradientPaint {
            gradient_stops: Vec::new(),
            gradient_transform: Transform2x3::IDENTITY,
        },
    );
    let mixed = Paint::MixedPaint {
        values: vec![Indirect::Value(red()), Indirect::Value(gradient)],
    };
    let root = container("1:1", vec![rect("1:2", mixed)]);
    let screen = extract_screen(&root);

    let WorldviewNode::VoidContainer(r) = &screen.root.children()[0] else {
        panic!("expected a rectangle");
    };
    let Some(Indirect::Value(Paint::MixedPaint { values })) = &r.fill else {
        panic!("expected a mixed paint");
    };
    assert_eq!(values[0].variable_id(), Some("#FF0000"));
    let gradient_id = values[1].variable_id().unwrap();
    assert!(screen.meta.theme.gradients.contains_key(gradient_id));
}

#[test]
fn existing_variables_pass_through() {
    let mut node = rect("1:2", red());
    if let Some(slot) = node.fill_mut() {
        *slot = Some(Indirect::variable("brand", red()));
    }
    let root = container("1:1", vec![node]);
    let screen = extract_screen(&root);
    assert!(!screen.meta.theme.colors.contains_key("brand"));
    let WorldviewNode::VoidContainer(r) = &screen.root.children()[0] else {
        panic!("expected a rectangle");
    };
    assert_eq!(r.fill, Some(Indirect::variable("brand", red())));
}
