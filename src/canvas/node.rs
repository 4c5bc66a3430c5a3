use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::foundation::core::{Rgb, Rgba, Vector};
use crate::foundation::error::{WorldviewError, WorldviewResult};
use crate::model::layout::{
    BooleanOperationKind, CounterAxisAlign, LayoutMode, LayoutPositioning, PrimaryAxisAlign,
};
use crate::model::paint::{GradientKind, GradientPaint, ScaleMode};
use crate::model::reaction::Reaction;
use crate::model::text::{
    FontName, LetterSpacing, LineHeight, TextAlignHorizontal, TextAlignVertical, Truncation,
};
use crate::model::vector::{VectorNetwork, VectorPath};

/// Native node identity, `"page:index"` on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    page: u16,
    index: u32,
}

impl NodeId {
    pub const fn new(page: u16, index: u32) -> Self {
        Self { page, index }
    }

    pub fn page(self) -> u16 {
        self.page
    }

    pub fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.page, self.index)
    }
}

impl FromStr for NodeId {
    type Err = WorldviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (page, index) = s
            .split_once(':')
            .ok_or_else(|| WorldviewError::validation(format!("malformed node id \"{s}\"")))?;
        let page = page
            .parse()
            .map_err(|_| WorldviewError::validation(format!("malformed node id \"{s}\"")))?;
        let index = index
            .parse()
            .map_err(|_| WorldviewError::validation(format!("malformed node id \"{s}\"")))?;
        Ok(Self { page, index })
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NativeKind {
    Page,
    Section,
    Frame,
    Group,
    Component,
    ComponentSet,
    Instance,
    Rectangle,
    Ellipse,
    Polygon,
    Star,
    Line,
    Vector,
    Text,
    BooleanOperation,
    Slice,
}

impl NativeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "PAGE",
            Self::Section => "SECTION",
            Self::Frame => "FRAME",
            Self::Group => "GROUP",
            Self::Component => "COMPONENT",
            Self::ComponentSet => "COMPONENT_SET",
            Self::Instance => "INSTANCE",
            Self::Rectangle => "RECTANGLE",
            Self::Ellipse => "ELLIPSE",
            Self::Polygon => "POLYGON",
            Self::Star => "STAR",
            Self::Line => "LINE",
            Self::Vector => "VECTOR",
            Self::Text => "TEXT",
            Self::BooleanOperation => "BOOLEAN_OPERATION",
            Self::Slice => "SLICE",
        }
    }

    pub fn accepts_children(self) -> bool {
        matches!(
            self,
            Self::Page
                | Self::Section
                | Self::Frame
                | Self::Group
                | Self::Component
                | Self::ComponentSet
                | Self::Instance
                | Self::BooleanOperation
        )
    }

    /// Frame-like kinds that can be extracted as containers.
    pub fn is_frame_like(self) -> bool {
        matches!(
            self,
            Self::Frame | Self::Component | Self::ComponentSet | Self::Instance
        )
    }

    pub fn has_fills(self) -> bool {
        !matches!(self, Self::Page | Self::Group | Self::Slice)
    }

    pub fn has_strokes(self) -> bool {
        !matches!(
            self,
            Self::Page | Self::Group | Self::Slice | Self::BooleanOperation
        )
    }
}

impl fmt::Display for NativeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A property that is `MIXED` when it differs across the node's content.
#[derive(Clone, Debug, PartialEq)]
pub enum Mixed<T> {
    Mixed,
    Value(T),
}

impl<T> Mixed<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Mixed => None,
        }
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, Self::Mixed)
    }
}

impl<T: Default> Default for Mixed<T> {
    fn default() -> Self {
        Self::Value(T::default())
    }
}

impl<T> From<T> for Mixed<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

#[derive(Serialize, Deserialize)]
enum MixedMarker {
    #[serde(rename = "MIXED")]
    Mixed,
}

impl<T: Serialize> Serialize for Mixed<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Mixed => MixedMarker::Mixed.serialize(serializer),
            Self::Value(v) => v.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Mixed<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<T> {
            Marker(MixedMarker),
            Value(T),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Marker(MixedMarker::Mixed) => Self::Mixed,
            Repr::Value(v) => Self::Value(v),
        })
    }
}

/// One entry of a native paint stack. Color and opacity are stored apart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativePaint {
    #[serde(flatten)]
    pub kind: NativePaintKind,
    #[serde(default = "one")]
    pub opacity: f64,
    #[serde(default = "yes")]
    pub visible: bool,
}

fn one() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NativePaintKind {
    Solid(NativeSolid),
    Image(NativeImage),
    GradientLinear(GradientPaint),
    GradientRadial(GradientPaint),
    GradientDiamond(GradientPaint),
    GradientAngular(GradientPaint),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeSolid {
    pub color: Rgb,
    /// Id of the color variable this paint is bound to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_variable: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeImage {
    #[serde(default)]
    pub scale_mode: ScaleMode,
    pub image_hash: Option<String>,
}

impl NativePaint {
    pub fn solid(color: Rgb, opacity: f64) -> Self {
        Self {
            kind: NativePaintKind::Solid(NativeSolid {
                color,
                bound_variable: None,
            }),
            opacity,
            visible: true,
        }
    }

    pub fn image(image_hash: Option<String>, scale_mode: ScaleMode) -> Self {
        Self {
            kind: NativePaintKind::Image(NativeImage {
                scale_mode,
                image_hash,
            }),
            opacity: 1.0,
            visible: true,
        }
    }

    pub fn gradient(kind: GradientKind, gradient: GradientPaint) -> Self {
        let kind = match kind {
            GradientKind::GradientLinear => NativePaintKind::GradientLinear(gradient),
            GradientKind::GradientRadial => NativePaintKind::GradientRadial(gradient),
            GradientKind::GradientDiamond => NativePaintKind::GradientDiamond(gradient),
            GradientKind::GradientAngular => NativePaintKind::GradientAngular(gradient),
        };
        Self {
            kind,
            opacity: 1.0,
            visible: true,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Color with opacity folded into alpha, for solid paints.
    pub fn solid_rgba(&self) -> Option<Rgba> {
        match &self.kind {
            NativePaintKind::Solid(s) => Some(s.color.with_alpha(self.opacity)),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StrokeWeights {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl StrokeWeights {
    pub fn uniform(weight: f64) -> Self {
        Self {
            top: weight,
            right: weight,
            bottom: weight,
            left: weight,
        }
    }

    /// The scalar weight, `MIXED` when edges differ.
    pub fn scalar(&self) -> Mixed<f64> {
        if self.top == self.right && self.top == self.bottom && self.top == self.left {
            Mixed::Value(self.top)
        } else {
            Mixed::Mixed
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeRadii {
    pub top_left: f64,
    pub top_right: f64,
    pub bottom_left: f64,
    pub bottom_right: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NativeEffect {
    DropShadow(NativeShadow),
    InnerShadow(NativeShadow),
    LayerBlur(NativeBlur),
    BackgroundBlur(NativeBlur),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeShadow {
    pub color: Rgba,
    pub offset: Vector,
    pub radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread: Option<f64>,
    #[serde(default = "yes")]
    pub visible: bool,
    #[serde(default = "normal_blend")]
    pub blend_mode: String,
}

fn normal_blend() -> String {
    "NORMAL".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NativeBlur {
    pub radius: f64,
    #[serde(default = "yes")]
    pub visible: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NativeLayout {
    pub layout_mode: LayoutMode,
    pub layout_positioning: LayoutPositioning,
    pub primary_axis_align_items: PrimaryAxisAlign,
    pub counter_axis_align_items: CounterAxisAlign,
    pub item_spacing: f64,
    pub padding_top: f64,
    pub padding_bottom: f64,
    pub padding_left: f64,
    pub padding_right: f64,
}

impl Default for NativeLayout {
    fn default() -> Self {
        Self {
            layout_mode: LayoutMode::None,
            layout_positioning: LayoutPositioning::Auto,
            primary_axis_align_items: PrimaryAxisAlign::Min,
            counter_axis_align_items: CounterAxisAlign::Min,
            item_spacing: 0.0,
            padding_top: 0.0,
            padding_bottom: 0.0,
            padding_left: 0.0,
            padding_right: 0.0,
        }
    }
}

/// Host text cases; the portable format keeps only the first three.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NativeTextCase {
    #[default]
    Original,
    Upper,
    Lower,
    Title,
    SmallCaps,
    SmallCapsForced,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextProps {
    pub characters: String,
    pub font_name: Mixed<FontName>,
    pub font_size: Mixed<f64>,
    pub font_weight: Mixed<u32>,
    pub letter_spacing: Mixed<LetterSpacing>,
    pub line_height: Mixed<LineHeight>,
    pub text_align_horizontal: TextAlignHorizontal,
    pub text_align_vertical: TextAlignVertical,
    pub text_case: Mixed<NativeTextCase>,
    pub text_truncation: Truncation,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            characters: String::new(),
            font_name: Mixed::Value(FontName::default()),
            font_size: Mixed::Value(12.0),
            font_weight: Mixed::Value(400),
            letter_spacing: Mixed::Value(LetterSpacing::default()),
            line_height: Mixed::Value(LineHeight::Auto),
            text_align_horizontal: TextAlignHorizontal::Left,
            text_align_vertical: TextAlignVertical::Top,
            text_case: Mixed::Value(NativeTextCase::Original),
            text_truncation: Truncation::Disabled,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapeProps {
    pub point_count: u32,
    pub inner_radius: f64,
    pub corner_radius: f64,
    pub corner_smoothing: f64,
    pub constrain_proportions: bool,
    pub boolean_operation: BooleanOperationKind,
}

impl Default for ShapeProps {
    fn default() -> Self {
        Self {
            point_count: 5,
            inner_radius: 0.382,
            corner_radius: 0.0,
            corner_smoothing: 0.0,
            constrain_proportions: false,
            boolean_operation: BooleanOperationKind::Union,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorGeometry {
    #[serde(default)]
    pub vector_network: VectorNetwork,
    #[serde(default)]
    pub vector_paths: Vec<VectorPath>,
}

/// A live node in the canvas arena. Tree links are owned by [`super::Canvas`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneNode {
    #[serde(skip)]
    pub id: NodeId,
    #[serde(skip)]
    pub parent: Option<NodeId>,
    #[serde(skip)]
    pub children: Vec<NodeId>,
    #[serde(rename = "type")]
    pub kind: NativeKind,
    pub name: String,
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub fills: Mixed<Vec<NativePaint>>,
    pub strokes: Vec<NativePaint>,
    pub stroke_weights: StrokeWeights,
    pub corner_radii: NativeRadii,
    pub effects: Vec<NativeEffect>,
    pub reactions: Vec<Reaction>,
    pub clips_content: bool,
    pub layout: NativeLayout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextProps>,
    pub shape: ShapeProps,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<VectorGeometry>,
    #[serde(skip)]
    pub main_component: Option<NodeId>,
}

impl Default for SceneNode {
    fn default() -> Self {
        Self::new(NativeKind::Frame)
    }
}

impl SceneNode {
    pub fn new(kind: NativeKind) -> Self {
        Self {
            id: NodeId::default(),
            parent: None,
            children: Vec::new(),
            kind,
            name: String::new(),
            visible: true,
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            rotation: 0.0,
            fills: Mixed::Value(Vec::new()),
            strokes: Vec::new(),
            stroke_weights: StrokeWeights::uniform(1.0),
            corner_radii: NativeRadii::default(),
            effects: Vec::new(),
            reactions: Vec::new(),
            clips_content: false,
            layout: NativeLayout::default(),
            text: (kind == NativeKind::Text).then(TextProps::default),
            shape: ShapeProps::default(),
            vector: (kind == NativeKind::Vector).then(VectorGeometry::default),
            main_component: None,
        }
    }

    pub fn stroke_weight(&self) -> Mixed<f64> {
        self.stroke_weights.scalar()
    }

    pub fn set_stroke_weight(&mut self, weight: f64) {
        self.stroke_weights = StrokeWeights::uniform(weight);
    }

    /// Paint stack as a slice, failing on `MIXED`.
    pub fn fill_stack(&self) -> WorldviewResult<&[NativePaint]> {
        match &self.fills {
            Mixed::Value(v) => Ok(v),
            Mixed::Mixed => Err(WorldviewError::validation(format!(
                "fills of node {} are mixed",
                self.id
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/node.rs"]
mod tests;
