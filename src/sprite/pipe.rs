use crate::config::{Config, PipeConfig};
use crate::engine::{Point, Rect, Renderer, Size};
use crate::sprite::{self, Bird};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Where the next gap goes
/// - injectable so a session can be replayed with a known sequence
pub trait GapSource {
    /// a value in `[low, high]`
    fn gap_center(&mut self, low: f32, high: f32) -> f32;
}

impl GapSource for ChaCha8Rng {
    fn gap_center(&mut self, low: f32, high: f32) -> f32 {
        if high <= low {
            return low;
        }
        self.gen_range(low..=high)
    }
}

/// One obstacle: a top segment hanging from the ceiling, a gap of
/// `spacing`, and a bottom segment standing on the floor
/// - top + spacing + bottom == screen height
#[derive(Debug, Clone)]
pub struct Pipe {
    x: f32,
    gap_center: f32,
    top: f32,
    bottom: f32,
    passed: bool,
    screen_height: f32,
    config: PipeConfig,
}

impl Pipe {
    /// New pipe on the right edge of the screen with a random gap
    pub fn new<G: GapSource + ?Sized>(config: &Config, gaps: &mut G) -> Self {
        let spacing = config.pipe.spacing;
        let center = gaps.gap_center(spacing, config.screen.height - spacing);
        Pipe::with_gap_center(config, center)
    }

    pub fn with_gap_center(config: &Config, gap_center: f32) -> Self {
        let spacing = config.pipe.spacing;
        let screen_height = config.screen.height;
        Pipe {
            x: config.screen.width,
            gap_center,
            top: gap_center - spacing / 2.0,
            bottom: screen_height - (gap_center + spacing / 2.0),
            passed: false,
            screen_height,
            config: config.pipe,
        }
    }

    pub fn update(&mut self) {
        self.x -= self.config.speed;
    }

    /// Forgiving AABB test against the bird's shrunk hitbox
    /// - must overlap horizontally
    /// - and poke out of the gap vertically
    pub fn hits(&self, bird: &Bird) -> bool {
        let hitbox = bird.hitbox();
        let overlaps_x = hitbox.right() > self.x && hitbox.left() < self.right();
        overlaps_x && (hitbox.top() < self.top || hitbox.bottom() > self.gap_bottom())
    }

    pub fn offscreen(&self) -> bool {
        self.right() < 0.0
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    /// one way, a passed pipe stays passed
    pub fn mark_passed(&mut self) {
        self.passed = true;
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.config.width
    }

    pub fn gap_center(&self) -> f32 {
        self.gap_center
    }

    /// length of the top segment, also where the gap starts
    pub fn top(&self) -> f32 {
        self.top
    }

    /// length of the bottom segment
    pub fn bottom(&self) -> f32 {
        self.bottom
    }

    /// y where the bottom segment starts
    pub fn gap_bottom(&self) -> f32 {
        self.screen_height - self.bottom
    }

    pub fn draw(&self, renderer: &dyn Renderer) {
        renderer.draw_image(
            sprite::PIPE,
            &Rect::new(
                Point {
                    x: self.x,
                    y: self.gap_bottom(),
                },
                Size {
                    width: self.config.width,
                    height: self.bottom,
                },
            ),
        );
        // same sprite mirrored, its mouth points down at the gap
        renderer.draw_image_flipped(
            sprite::PIPE,
            &Rect::new(
                Point { x: self.x, y: 0.0 },
                Size {
                    width: self.config.width,
                    height: self.top,
                },
            ),
        );
    }

    #[cfg(test)]
    pub(crate) fn set_x(&mut self, x: f32) {
        self.x = x;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{DrawCommand, FixedGaps, RecordingRenderer};
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    fn config() -> Config {
        Config::default()
    }

    #[test]
    fn segments_and_gap_fill_the_screen() {
        let config = config();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let pipe = Pipe::new(&config, &mut rng);
            assert!(pipe.gap_center() >= 170.0 && pipe.gap_center() <= 430.0);
            assert_relative_eq!(pipe.top() + 170.0 + pipe.bottom(), 600.0, epsilon = 1e-3);
            assert_eq!(pipe.x(), 800.0);
            assert!(!pipe.passed());
        }
    }

    #[test]
    fn gap_comes_from_the_source() {
        let mut gaps = FixedGaps::new(&[250.0]);
        let pipe = Pipe::new(&config(), &mut gaps);
        assert_eq!(pipe.gap_center(), 250.0);
        assert_eq!(pipe.top(), 165.0);
        assert_eq!(pipe.bottom(), 265.0);
        assert_eq!(pipe.gap_bottom(), 335.0);
    }

    #[test]
    fn scrolls_left_at_fixed_speed() {
        let mut pipe = Pipe::with_gap_center(&config(), 300.0);
        pipe.update();
        pipe.update();
        assert_eq!(pipe.x(), 794.0);
    }

    #[test]
    fn offscreen_once_the_right_edge_leaves() {
        let mut pipe = Pipe::with_gap_center(&config(), 300.0);
        pipe.set_x(-51.0);
        assert!(pipe.offscreen());
        pipe.set_x(-49.0);
        assert!(!pipe.offscreen());
        pipe.set_x(-50.0);
        assert!(!pipe.offscreen());
    }

    #[test]
    fn bird_inside_the_gap_is_safe() {
        let config = config();
        let bird = Bird::new(&config);
        let mut pipe = Pipe::with_gap_center(&config, 300.0);
        pipe.set_x(190.0);
        assert!(!pipe.hits(&bird));
    }

    #[test]
    fn bird_outside_the_gap_hits() {
        let config = config();
        let mut bird = Bird::new(&config);
        let mut pipe = Pipe::with_gap_center(&config, 300.0);
        pipe.set_x(190.0);
        let half = bird.hitbox().size.height / 2.0;

        // gap spans 215..385
        bird.set_position(Point { x: 200.0, y: 215.0 + half - 1.0 });
        assert!(pipe.hits(&bird));
        bird.set_position(Point { x: 200.0, y: 385.0 - half + 1.0 });
        assert!(pipe.hits(&bird));
        bird.set_position(Point { x: 200.0, y: 215.0 + half + 1.0 });
        assert!(!pipe.hits(&bird));
    }

    #[test]
    fn no_hit_without_horizontal_overlap() {
        let config = config();
        let mut bird = Bird::new(&config);
        bird.set_position(Point { x: 200.0, y: 20.0 });
        let mut pipe = Pipe::with_gap_center(&config, 300.0);

        // shrunk half width is 26.125, so the hitbox spans 173.875..226.125
        pipe.set_x(227.0);
        assert!(!pipe.hits(&bird));
        pipe.set_x(226.0);
        assert!(pipe.hits(&bird));
        pipe.set_x(173.875 - 50.0 - 1.0);
        assert!(!pipe.hits(&bird));
    }

    #[test]
    fn passed_is_one_way() {
        let mut pipe = Pipe::with_gap_center(&config(), 300.0);
        pipe.mark_passed();
        pipe.update();
        assert!(pipe.passed());
    }

    #[test]
    fn draws_bottom_then_mirrored_top() {
        let pipe = Pipe::with_gap_center(&config(), 300.0);
        let renderer = RecordingRenderer::default();
        pipe.draw(&renderer);
        let commands = renderer.commands();
        assert_eq!(commands.len(), 2);
        match &commands[0] {
            DrawCommand::Image { image, destination } => {
                assert_eq!(*image, sprite::PIPE);
                assert_eq!(destination.top(), 385.0);
                assert_eq!(destination.bottom(), 600.0);
            }
            other => panic!("unexpected draw {:?}", other),
        }
        match &commands[1] {
            DrawCommand::Flipped { image, destination } => {
                assert_eq!(*image, sprite::PIPE);
                assert_eq!(destination.top(), 0.0);
                assert_eq!(destination.bottom(), 215.0);
            }
            other => panic!("unexpected draw {:?}", other),
        }
    }
}
