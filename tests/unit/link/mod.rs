use super::*;
use crate::model::node::{GroupNode, NodeBase};
use crate::model::reaction::Action;

fn leaf(id: &str, links_to: &[&str]) -> WorldviewNode {
    let reactions: Vec<Reaction> = links_to
        .iter()
        .map(|d| Reaction::on_click(Action::navigate(*d)))
        .collect();
    WorldviewNode::Group(GroupNode {
        base: NodeBase {
            reaction: (!reactions.is_empty()).then_some(reactions),
            ..NodeBase::new(id, id)
        },
        children: None,
    })
}

fn drawn(canvas: &mut Canvas, labels: &[&str]) -> IdMapping {
    let mut ids = IdMapping::new();
    for label in labels {
        let id = canvas.create_frame();
        let page = canvas.page();
        canvas.append_child(page, id).unwrap();
        ids.insert(*label, id);
    }
    ids
}

#[test]
fn forward_and_backward_links_resolve() {
    let mut canvas = Canvas::new();
    let ids = drawn(&mut canvas, &["a", "b", "c"]);
    let roots = vec![leaf("a", &["c"]), leaf("b", &["a"]), leaf("c", &[])];

    let report = link_reactions(&mut canvas, &roots, &ids);
    assert_eq!(report, LinkReport { resolved: 2, dropped: 0 });

    let a = canvas.get(ids.get("a").unwrap()).unwrap();
    let target = ids.get("c").unwrap().to_string();
    let dests: Vec<_> = a.reactions[0]
        .all_actions()
        .filter_map(|x| x.destination_id.clone())
        .collect();
    assert_eq!(dests, vec![target.clone(), target]);

    let b = canvas.get(ids.get("b").unwrap()).unwrap();
    assert_eq!(
        b.reactions[0].actions[0].destination_id.as_deref(),
        Some(ids.get("a").unwrap().to_string().as_str())
    );
}

#[test]
fn links_outside_the_batch_are_dropped() {
    let mut canvas = Canvas::new();
    let ids = drawn(&mut canvas, &["a"]);
    let roots = vec![leaf("a", &["elsewhere"])];
    let report = link_reactions(&mut canvas, &roots, &ids);
    assert_eq!(report, LinkReport { resolved: 0, dropped: 1 });
    assert!(canvas.get(ids.get("a").unwrap()).unwrap().reactions.is_empty());
}

#[test]
fn reactions_without_destinations_are_kept() {
    let mut canvas = Canvas::new();
    let ids = drawn(&mut canvas, &["a"]);
    let back = Reaction {
        action: None,
        actions: vec![Action {
            kind: "BACK".into(),
            destination_id: None,
            extra: Default::default(),
        }],
        trigger: None,
    };
    let mut root = leaf("a", &[]);
    root.base_mut().reaction = Some(vec![back.clone()]);
    let report = link_reactions(&mut canvas, std::slice::from_ref(&root), &ids);
    assert_eq!(report.resolved, 1);
    assert_eq!(canvas.get(ids.get("a").unwrap()).unwrap().reactions, vec![back]);
}

#[test]
fn links_to_detached_or_removed_nodes_are_dropped() {
    let mut canvas = Canvas::new();
    let mut ids = drawn(&mut canvas, &["a", "b"]);
    ids.insert("loose", canvas.create_frame());
    canvas.remove(ids.get("b").unwrap()).unwrap();
    let roots = vec![leaf("a", &["loose", "b"])];

    let report = link_reactions(&mut canvas, &roots, &ids);
    assert_eq!(report, LinkReport { resolved: 0, dropped: 2 });
    assert!(canvas.get(ids.get("a").unwrap()).unwrap().reactions.is_empty());
}

#[test]
fn detached_sources_get_no_links() {
    let mut canvas = Canvas::new();
    let mut ids = drawn(&mut canvas, &["b"]);
    let loose = canvas.create_frame();
    ids.insert("a", loose);
    let roots = vec![leaf("a", &["b"])];

    let report = link_reactions(&mut canvas, &roots, &ids);
    assert_eq!(report, LinkReport::default());
    assert!(canvas.get(loose).unwrap().reactions.is_empty());
}
