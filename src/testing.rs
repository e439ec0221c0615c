//! Test doubles shared by the unit tests

use crate::engine::{ImageId, Point, Rect, Renderer, Size, TextStyle};
use crate::sprite::GapSource;
use std::cell::RefCell;
use std::collections::VecDeque;

/// Replays a fixed list of gap centers, then keeps repeating the last one
pub struct FixedGaps {
    centers: VecDeque<f32>,
    last: f32,
}

impl FixedGaps {
    pub fn new(centers: &[f32]) -> Self {
        FixedGaps {
            centers: centers.iter().copied().collect(),
            last: centers.last().copied().unwrap_or(300.0),
        }
    }
}

impl GapSource for FixedGaps {
    fn gap_center(&mut self, low: f32, high: f32) -> f32 {
        self.centers.pop_front().unwrap_or(self.last).clamp(low, high)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Image {
        image: ImageId,
        destination: Rect,
    },
    Rotated {
        image: ImageId,
        center: Point,
        size: Size,
        angle: f32,
    },
    Flipped {
        image: ImageId,
        destination: Rect,
    },
    Text {
        text: String,
        position: Point,
        style: TextStyle,
    },
}

/// Renderer that remembers what it was asked to draw
#[derive(Default)]
pub struct RecordingRenderer {
    commands: RefCell<Vec<DrawCommand>>,
}

impl RecordingRenderer {
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.commands.borrow().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.commands
            .borrow()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// every image drawn, whatever the variant
    pub fn images(&self) -> Vec<ImageId> {
        self.commands
            .borrow()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Image { image, .. }
                | DrawCommand::Rotated { image, .. }
                | DrawCommand::Flipped { image, .. } => Some(*image),
                _ => None,
            })
            .collect()
    }

    fn push(&self, command: DrawCommand) {
        self.commands.borrow_mut().push(command);
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&self, _rect: &Rect) {
        self.push(DrawCommand::Clear);
    }

    fn draw_image(&self, image: ImageId, destination: &Rect) {
        self.push(DrawCommand::Image {
            image,
            destination: *destination,
        });
    }

    fn draw_image_rotated(&self, image: ImageId, center: Point, size: Size, angle: f32) {
        self.push(DrawCommand::Rotated {
            image,
            center,
            size,
            angle,
        });
    }

    fn draw_image_flipped(&self, image: ImageId, destination: &Rect) {
        self.push(DrawCommand::Flipped {
            image,
            destination: *destination,
        });
    }

    fn draw_text(&self, text: &str, position: Point, style: &TextStyle) {
        self.push(DrawCommand::Text {
            text: text.to_string(),
            position,
            style: *style,
        });
    }
}
