use serde::{Deserialize, Serialize};

use crate::model::effect::Effect;
use crate::model::layout::{BooleanOperationKind, CornerRadii, EdgeWeights, Layout};
use crate::model::paint::Paint;
use crate::model::reaction::Reaction;
use crate::model::text::{
    FontName, LetterSpacing, LineHeight, TextAlignHorizontal, TextAlignVertical, TextCase,
    Truncation,
};
use crate::model::value::Indirect;
use crate::model::vector::{VectorNetwork, VectorPath};

/// Portable document node.
///
/// Serialized internally tagged on `type`. Container-like variants always serialize `children`,
/// writing `null` when there are none.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorldviewNode {
    Container(ContainerNode),
    Instance(ContainerNode),
    Group(GroupNode),
    VoidContainer(VoidContainerNode),
    IconContainer(IconContainerNode),
    Text(TextNode),
    Vector(VectorNode),
    Ellipse(EllipseNode),
    BooleanOperation(BooleanOperationNode),
    Line(LineNode),
    Star(StarNode),
    Polygon(PolygonNode),
}

/// Fields every variant carries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeBase {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<Vec<Effect>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction: Option<Vec<Reaction>>,
}

impl NodeBase {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerNode {
    #[serde(flatten)]
    pub base: NodeBase,
    #[serde(flatten)]
    pub layout: Layout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Indirect<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Indirect<Paint>>,
    #[serde(flatten)]
    pub edges: EdgeWeights,
    #[serde(flatten)]
    pub radii: CornerRadii,
    #[serde(default)]
    pub children: Option<Vec<WorldviewNode>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupNode {
    #[serde(flatten)]
    pub base: NodeBase,
    #[serde(default)]
    pub children: Option<Vec<WorldviewNode>>,
}

/// Leaf rectangle-like shape.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VoidContainerNode {
    #[serde(flatten)]
    pub base: NodeBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Indirect<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Indirect<Paint>>,
    #[serde(flatten)]
    pub edges: EdgeWeights,
    #[serde(flatten)]
    pub radii: CornerRadii,
}

/// A small composition flattened to SVG markup; `fill` and `stroke` apply to every descendant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconContainerNode {
    #[serde(flatten)]
    pub base: NodeBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Indirect<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Indirect<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_weight: Option<f64>,
    pub data: Indirect<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    #[serde(flatten)]
    pub base: NodeBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Indirect<Paint>>,
    pub font_name: FontName,
    pub font_size: f64,
    pub font_weight: u32,
    pub letter_spacing: LetterSpacing,
    pub line_height: LineHeight,
    pub text_align_horizontal: TextAlignHorizontal,
    pub text_align_vertical: TextAlignVertical,
    pub text_case: TextCase,
    pub characters: Indirect<String>,
    pub truncation: Truncation,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorNode {
    #[serde(flatten)]
    pub base: NodeBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Indirect<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Indirect<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_weight: Option<f64>,
    pub vector_network: VectorNetwork,
    pub vector_paths: Vec<VectorPath>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EllipseNode {
    #[serde(flatten)]
    pub base: NodeBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Indirect<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Indirect<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_weight: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanOperationNode {
    #[serde(flatten)]
    pub base: NodeBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Indirect<Paint>>,
    pub boolean_operation: BooleanOperationKind,
    #[serde(default)]
    pub children: Option<Vec<WorldviewNode>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineNode {
    #[serde(flatten)]
    pub base: NodeBase,
    pub rotation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Indirect<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Indirect<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_weight: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarNode {
    #[serde(flatten)]
    pub base: NodeBase,
    pub rotation: f64,
    pub corner_radius: f64,
    /// Number of points.
    pub count: u32,
    /// Inner radius as a fraction of the outer radius.
    pub ratio: f64,
    pub corner_smoothing: f64,
    pub constrain_proportions: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Indirect<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Indirect<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_weight: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonNode {
    #[serde(flatten)]
    pub base: NodeBase,
    pub rotation: f64,
    pub corner_radius: f64,
    /// Number of sides.
    pub count: u32,
    pub corner_smoothing: f64,
    pub constrain_proportions: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Indirect<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Indirect<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_weight: Option<f64>,
}

/// Variant tag of a [`WorldviewNode`], displayed with its wire name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorldviewKind {
    Container,
    Instance,
    Group,
    VoidContainer,
    IconContainer,
    Text,
    Vector,
    Ellipse,
    BooleanOperation,
    Line,
    Star,
    Polygon,
}

impl WorldviewKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Container => "CONTAINER",
            Self::Instance => "INSTANCE",
            Self::Group => "GROUP",
            Self::VoidContainer => "VOID_CONTAINER",
            Self::IconContainer => "ICON_CONTAINER",
            Self::Text => "TEXT",
            Self::Vector => "VECTOR",
            Self::Ellipse => "ELLIPSE",
            Self::BooleanOperation => "BOOLEAN_OPERATION",
            Self::Line => "LINE",
            Self::Star => "STAR",
            Self::Polygon => "POLYGON",
        }
    }
}

impl std::fmt::Display for WorldviewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WorldviewNode {
    pub fn kind(&self) -> WorldviewKind {
        match self {
            Self::Container(_) => WorldviewKind::Container,
            Self::Instance(_) => WorldviewKind::Instance,
            Self::Group(_) => WorldviewKind::Group,
            Self::VoidContainer(_) => WorldviewKind::VoidContainer,
            Self::IconContainer(_) => WorldviewKind::IconContainer,
            Self::Text(_) => WorldviewKind::Text,
            Self::Vector(_) => WorldviewKind::Vector,
            Self::Ellipse(_) => WorldviewKind::Ellipse,
            Self::BooleanOperation(_) => WorldviewKind::BooleanOperation,
            Self::Line(_) => WorldviewKind::Line,
            Self::Star(_) => WorldviewKind::Star,
            Self::Polygon(_) => WorldviewKind::Polygon,
        }
    }

    pub fn base(&self) -> &NodeBase {
        match self {
            Self::Container(n) | Self::Instance(n) => &n.base,
            Self::Group(n) => &n.base,
            Self::VoidContainer(n) => &n.base,
            Self::IconContainer(n) => &n.base,
            Self::Text(n) => &n.base,
            Self::Vector(n) => &n.base,
            Self::Ellipse(n) => &n.base,
            Self::BooleanOperation(n) => &n.base,
            Self::Line(n) => &n.base,
            Self::Star(n) => &n.base,
            Self::Polygon(n) => &n.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut NodeBase {
        match self {
            Self::Container(n) | Self::Instance(n) => &mut n.base,
            Self::Group(n) => &mut n.base,
            Self::VoidContainer(n) => &mut n.base,
            Self::IconContainer(n) => &mut n.base,
            Self::Text(n) => &mut n.base,
            Self::Vector(n) => &mut n.base,
            Self::Ellipse(n) => &mut n.base,
            Self::BooleanOperation(n) => &mut n.base,
            Self::Line(n) => &mut n.base,
            Self::Star(n) => &mut n.base,
            Self::Polygon(n) => &mut n.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn children(&self) -> &[WorldviewNode] {
        let children = match self {
            Self::Container(n) | Self::Instance(n) => &n.children,
            Self::Group(n) => &n.children,
            Self::BooleanOperation(n) => &n.children,
            Self::VoidContainer(_)
            | Self::IconContainer(_)
            | Self::Text(_)
            | Self::Vector(_)
            | Self::Ellipse(_)
            | Self::Line(_)
            | Self::Star(_)
            | Self::Polygon(_) => return &[],
        };
        children.as_deref().unwrap_or(&[])
    }

    pub fn reactions(&self) -> &[Reaction] {
        self.base().reaction.as_deref().unwrap_or(&[])
    }

    pub fn fill(&self) -> Option<&Indirect<Paint>> {
        match self {
            Self::Container(n) | Self::Instance(n) => n.fill.as_ref(),
            Self::VoidContainer(n) => n.fill.as_ref(),
            Self::IconContainer(n) => n.fill.as_ref(),
            Self::Text(n) => n.fill.as_ref(),
            Self::Vector(n) => n.fill.as_ref(),
            Self::Ellipse(n) => n.fill.as_ref(),
            Self::BooleanOperation(n) => n.fill.as_ref(),
            Self::Line(n) => n.fill.as_ref(),
            Self::Star(n) => n.fill.as_ref(),
            Self::Polygon(n) => n.fill.as_ref(),
            Self::Group(_) => None,
        }
    }

    /// The `fill` slot of variants that carry one.
    pub fn fill_mut(&mut self) -> Option<&mut Option<Indirect<Paint>>> {
        match self {
            Self::Container(n) | Self::Instance(n) => Some(&mut n.fill),
            Self::VoidContainer(n) => Some(&mut n.fill),
            Self::IconContainer(n) => Some(&mut n.fill),
            Self::Text(n) => Some(&mut n.fill),
            Self::Vector(n) => Some(&mut n.fill),
            Self::Ellipse(n) => Some(&mut n.fill),
            Self::BooleanOperation(n) => Some(&mut n.fill),
            Self::Line(n) => Some(&mut n.fill),
            Self::Star(n) => Some(&mut n.fill),
            Self::Polygon(n) => Some(&mut n.fill),
            Self::Group(_) => None,
        }
    }

    /// The `stroke` slot of variants that carry one.
    pub fn stroke_mut(&mut self) -> Option<&mut Option<Indirect<Paint>>> {
        match self {
            Self::Container(n) | Self::Instance(n) => Some(&mut n.stroke),
            Self::VoidContainer(n) => Some(&mut n.stroke),
            Self::IconContainer(n) => Some(&mut n.stroke),
            Self::Vector(n) => Some(&mut n.stroke),
            Self::Ellipse(n) => Some(&mut n.stroke),
            Self::Line(n) => Some(&mut n.stroke),
            Self::Star(n) => Some(&mut n.stroke),
            Self::Polygon(n) => Some(&mut n.stroke),
            Self::Group(_) | Self::Text(_) | Self::BooleanOperation(_) => None,
        }
    }

    pub fn characters_mut(&mut self) -> Option<&mut Indirect<String>> {
        match self {
            Self::Text(n) => Some(&mut n.characters),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> &mut [WorldviewNode] {
        let children = match self {
            Self::Container(n) | Self::Instance(n) => &mut n.children,
            Self::Group(n) => &mut n.children,
            Self::BooleanOperation(n) => &mut n.children,
            _ => return &mut [],
        };
        children.as_deref_mut().unwrap_or(&mut [])
    }

    /// Pre-order walk over this node and every descendant.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a WorldviewNode)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut WorldviewNode)) {
        visit(self);
        for child in self.children_mut() {
            child.walk_mut(visit);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/node.rs"]
mod tests;
