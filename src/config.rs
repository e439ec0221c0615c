//! Tuning knobs for the whole game
//!
//! Every field has a default so a partial (or missing) `config.json` still
//! yields a playable game. All lengths are canvas pixels, all speeds are
//! pixels per tick.

use crate::engine::{Point, Rect, Size};
use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Copy, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub screen: ScreenConfig,
    pub bird: BirdConfig,
    pub pipe: PipeConfig,
    pub background: BackgroundConfig,
    pub button: ButtonConfig,
}

impl Config {
    pub const PATH: &'static str = "config.json";

    /// Reject values that parse but can't drive the simulation
    /// - lengths, speeds and the tilt range must be positive (NaN fails too)
    /// - two gap spacings must fit on the screen, the gap center is drawn
    ///   from `[spacing, height - spacing]`
    pub fn validated(self) -> Result<Config> {
        let positive = [
            ("screen.width", self.screen.width),
            ("screen.height", self.screen.height),
            ("bird.width", self.bird.width),
            ("bird.max_speed", self.bird.max_speed),
            ("bird.tilt_speed", self.bird.tilt_speed),
            ("bird.hitbox_scale", self.bird.hitbox_scale),
            ("pipe.width", self.pipe.width),
            ("pipe.speed", self.pipe.speed),
            ("pipe.spacing", self.pipe.spacing),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(anyhow!("{} must be positive, got {}", name, value));
            }
        }
        if self.pipe.spawn_interval == 0 {
            return Err(anyhow!("pipe.spawn_interval must be at least 1"));
        }
        if self.pipe.spacing * 2.0 > self.screen.height {
            return Err(anyhow!(
                "pipe.spacing {} leaves no room for the gap on a {} px screen",
                self.pipe.spacing,
                self.screen.height
            ));
        }
        Ok(self)
    }

    /// Start button, centered on the screen
    pub fn start_button(&self) -> Rect {
        Rect::centered(self.screen.center(), self.button.size())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        ScreenConfig {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl ScreenConfig {
    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.width / 2.0,
            y: self.height / 2.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BirdConfig {
    pub gravity: f32,
    /// negative because the canvas origin is top left
    pub lift: f32,
    pub max_speed: f32,
    pub width: f32,
    /// height / width of the sprite (443x311 image)
    pub aspect_ratio: f32,
    /// share of the sprite that counts for collisions
    pub hitbox_scale: f32,
    /// speed at which the sprite reaches its full tilt
    pub tilt_speed: f32,
    pub max_tilt: f32,
}

impl Default for BirdConfig {
    fn default() -> Self {
        BirdConfig {
            gravity: 0.3,
            lift: -6.0,
            max_speed: 15.0,
            width: 55.0,
            aspect_ratio: 311.0 / 443.0,
            hitbox_scale: 0.95,
            tilt_speed: 5.0,
            max_tilt: std::f32::consts::FRAC_PI_4,
        }
    }
}

impl BirdConfig {
    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.width * self.aspect_ratio,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipeConfig {
    /// height of the gap, also the margin kept between a gap center and
    /// the screen edges
    pub spacing: f32,
    pub width: f32,
    pub speed: f32,
    /// ticks between two spawns
    pub spawn_interval: u64,
}

impl Default for PipeConfig {
    fn default() -> Self {
        PipeConfig {
            spacing: 170.0,
            width: 50.0,
            speed: 3.0,
            spawn_interval: 100,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    pub scroll_speed: f32,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        BackgroundConfig { scroll_speed: 1.0 }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        ButtonConfig {
            width: 200.0,
            height: 100.0,
        }
    }
}

impl ButtonConfig {
    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }
}
