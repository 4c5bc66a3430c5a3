//! Theme extraction: promote literal paints and text to theme-keyed variables.
//!
//! The input tree is never touched. A copy is rewritten so every literal `fill`, `stroke` and
//! `characters` becomes `Variable { id, fallback }`, and the theme collects one entry per id.
//! Only children of `CONTAINER` nodes are visited; other variants keep their nested values.

pub(crate) mod hash;

use crate::model::document::{ImageAsset, Screen, ScreenMeta, Theme};
use crate::model::node::WorldviewNode;
use crate::model::paint::Paint;
use crate::model::value::Indirect;

pub use self::hash::{characters_key, color_hex, paint_key};

/// Accumulates a [`Theme`] across one or more trees.
#[derive(Debug, Default)]
pub struct ThemeExtractor {
    theme: Theme,
}

impl ThemeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing theme; entries already present are never overwritten.
    pub fn with_theme(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn into_theme(self) -> Theme {
        self.theme
    }

    /// Return a themed copy of `root`.
    pub fn apply(&mut self, root: &WorldviewNode) -> WorldviewNode {
        let mut copy = root.clone();
        self.rewrite(&mut copy);
        copy
    }

    fn rewrite(&mut self, node: &mut WorldviewNode) {
        if let Some(slot) = node.fill_mut() {
            self.theme_slot(slot);
        }
        if let Some(slot) = node.stroke_mut() {
            self.theme_slot(slot);
        }
        if let Some(characters) = node.characters_mut() {
            self.theme_characters(characters);
        }
        if let WorldviewNode::Container(container) = node {
            for child in container.children.iter_mut().flatten() {
                self.rewrite(child);
            }
        }
    }

    fn theme_slot(&mut self, slot: &mut Option<Indirect<Paint>>) {
        let Some(field) = slot.take() else {
            return;
        };
        *slot = Some(match field {
            Indirect::Value(Paint::MixedPaint { values }) => Indirect::Value(Paint::MixedPaint {
                values: values.into_iter().map(|v| self.theme_paint(v)).collect(),
            }),
            other => self.theme_paint(other),
        });
    }

    /// Promote one literal paint; constants and variables pass through untouched.
    fn theme_paint(&mut self, field: Indirect<Paint>) -> Indirect<Paint> {
        let Indirect::Value(paint) = field else {
            return field;
        };
        let id = paint_key(&paint);
        match &paint {
            Paint::Solid(_) => {
                self.theme
                    .colors
                    .entry(id.clone())
                    .or_insert_with(|| paint.clone());
            }
            Paint::Image(image) => {
                self.theme
                    .images
                    .entry(id.clone())
                    .or_insert_with(|| ImageAsset::Preprocessed(image.clone()));
            }
            Paint::GradientLinear(_)
            | Paint::GradientRadial(_)
            | Paint::GradientDiamond(_)
            | Paint::GradientAngular(_) => {
                self.theme
                    .gradients
                    .entry(id.clone())
                    .or_insert_with(|| paint.clone());
            }
            Paint::MixedPaint { .. } => {
                tracing::debug!("nested mixed paint left as a literal");
                return Indirect::Value(paint);
            }
        }
        Indirect::variable(id, paint)
    }

    fn theme_characters(&mut self, field: &mut Indirect<String>) {
        let Indirect::Value(text) = field else {
            return;
        };
        let text = std::mem::take(text);
        let id = characters_key(&text);
        self.theme
            .characters
            .entry(id.clone())
            .or_insert_with(|| text.clone());
        *field = Indirect::variable(id, text);
    }
}

/// Theme one extracted root into a standalone [`Screen`] with its own theme.
pub fn extract_screen(root: &WorldviewNode) -> Screen {
    let mut extractor = ThemeExtractor::new();
    let themed = extractor.apply(root);
    tracing::debug!(
        screen = %root.base().name,
        colors = extractor.theme().colors.len(),
        images = extractor.theme().images.len(),
        "themed screen"
    );
    Screen {
        meta: ScreenMeta {
            theme: extractor.into_theme(),
        },
        name: root.base().name.clone(),
        description: String::new(),
        root: themed,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/theme/mod.rs"]
mod tests;
