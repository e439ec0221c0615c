use crate::config::{BirdConfig, Config};
use crate::engine::{Point, Rect, Renderer, Size};
use crate::sprite;

/// Result of one physics step
/// - `Crashed` is only ever reported once, on the frame the bird hits the
///   ground
/// - `Dead` means the update was a no-op
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flight {
    Airborne,
    Crashed,
    Dead,
}

#[derive(Debug, Clone)]
pub struct Bird {
    position: Point,
    velocity: f32,
    size: Size,
    alive: bool,
    ground: f32,
    config: BirdConfig,
}

impl Bird {
    /// Fresh bird, a quarter of the way in and halfway down the screen
    pub fn new(config: &Config) -> Self {
        Bird {
            position: Point {
                x: config.screen.width / 4.0,
                y: config.screen.height / 2.0,
            },
            velocity: 0.0,
            size: config.bird.size(),
            alive: true,
            ground: config.screen.height,
            config: config.bird,
        }
    }

    /// ::update per tick
    /// - gravity -> velocity -> position (explicit Euler)
    /// - ground ends the flight, ceiling only stops it
    pub fn update(&mut self) -> Flight {
        if !self.alive {
            return Flight::Dead;
        }

        self.velocity += self.config.gravity;
        self.position.y += self.velocity;
        self.velocity = self
            .velocity
            .clamp(-self.config.max_speed, self.config.max_speed);

        let half_height = self.size.height / 2.0;
        let ground_level = self.ground - half_height;
        let mut flight = Flight::Airborne;

        if self.position.y > ground_level {
            self.position.y = ground_level;
            self.velocity = 0.0;
            self.alive = false;
            flight = Flight::Crashed;
        }

        if self.position.y < half_height {
            self.position.y = half_height;
            self.velocity = 0.0;
        }

        flight
    }

    pub fn jump(&mut self) {
        if self.alive {
            self.velocity = self.config.lift;
        }
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Collision box, shrunk so grazing a pipe is forgiven
    pub fn hitbox(&self) -> Rect {
        Rect::centered(
            self.position,
            Size {
                width: self.size.width * self.config.hitbox_scale,
                height: self.size.height * self.config.hitbox_scale,
            },
        )
    }

    /// Nose up when rising, nose down when falling
    /// - linear in velocity over [-tilt_speed, tilt_speed], clamped outside
    pub fn tilt(&self) -> f32 {
        let ratio = (self.velocity / self.config.tilt_speed).clamp(-1.0, 1.0);
        ratio * self.config.max_tilt
    }

    pub fn draw(&self, renderer: &dyn Renderer) {
        renderer.draw_image_rotated(sprite::BIRD, self.position, self.size, self.tilt());
    }

    #[cfg(test)]
    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    #[cfg(test)]
    pub(crate) fn set_velocity(&mut self, velocity: f32) {
        self.velocity = velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{DrawCommand, RecordingRenderer};
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_4;

    fn bird() -> Bird {
        Bird::new(&Config::default())
    }

    #[test]
    fn starts_alive_at_rest() {
        let bird = bird();
        assert!(bird.is_alive());
        assert_eq!(bird.position(), Point { x: 200.0, y: 300.0 });
        assert_eq!(bird.velocity(), 0.0);
        assert_relative_eq!(bird.size().height, 55.0 * 311.0 / 443.0);
    }

    #[test]
    fn gravity_accelerates_then_moves() {
        let mut bird = bird();
        assert_eq!(bird.update(), Flight::Airborne);
        assert_relative_eq!(bird.velocity(), 0.3);
        assert_relative_eq!(bird.position().y, 300.3);
        bird.update();
        assert_relative_eq!(bird.velocity(), 0.6);
        assert_relative_eq!(bird.position().y, 300.9);
    }

    #[test]
    fn velocity_is_clamped() {
        let mut bird = bird();
        bird.set_position(Point { x: 200.0, y: 100.0 });
        bird.set_velocity(14.9);
        bird.update();
        assert_relative_eq!(bird.velocity(), 15.0);

        bird.set_position(Point { x: 200.0, y: 300.0 });
        bird.set_velocity(-40.0);
        bird.update();
        assert!(bird.velocity() >= -15.0);
    }

    #[test]
    fn position_stays_on_screen_while_falling() {
        let mut bird = bird();
        let half_height = bird.size().height / 2.0;
        for _ in 0..500 {
            bird.update();
            assert!(bird.position().y >= half_height);
            assert!(bird.position().y <= 600.0 - half_height);
            assert!(bird.velocity().abs() <= 15.0);
        }
    }

    #[test]
    fn ground_crash_is_reported_once() {
        let mut bird = bird();
        let mut crashes = 0;
        for _ in 0..200 {
            if bird.update() == Flight::Crashed {
                crashes += 1;
            }
        }
        assert_eq!(crashes, 1);
        assert!(!bird.is_alive());
        assert_relative_eq!(bird.position().y, 600.0 - bird.size().height / 2.0);
        assert_eq!(bird.velocity(), 0.0);
    }

    #[test]
    fn ceiling_stops_without_killing() {
        let mut bird = bird();
        bird.set_position(Point { x: 200.0, y: 20.0 });
        bird.jump();
        assert_eq!(bird.update(), Flight::Airborne);
        assert!(bird.is_alive());
        assert_relative_eq!(bird.position().y, bird.size().height / 2.0);
        assert_eq!(bird.velocity(), 0.0);
    }

    #[test]
    fn jump_sets_lift() {
        let mut bird = bird();
        bird.set_velocity(10.0);
        bird.jump();
        assert_eq!(bird.velocity(), -6.0);
    }

    #[test]
    fn dead_bird_ignores_jump_and_gravity() {
        let mut bird = bird();
        bird.set_velocity(2.5);
        bird.kill();
        let position = bird.position();

        bird.jump();
        for _ in 0..10 {
            assert_eq!(bird.update(), Flight::Dead);
        }
        assert_eq!(bird.position(), position);
        assert_eq!(bird.velocity(), 2.5);
        assert!(!bird.is_alive());
    }

    #[test]
    fn tilt_follows_velocity_and_saturates() {
        let mut bird = bird();
        assert_eq!(bird.tilt(), 0.0);
        bird.set_velocity(2.5);
        assert_relative_eq!(bird.tilt(), FRAC_PI_4 / 2.0);
        bird.set_velocity(12.0);
        assert_relative_eq!(bird.tilt(), FRAC_PI_4);
        bird.set_velocity(-6.0);
        assert_relative_eq!(bird.tilt(), -FRAC_PI_4);
    }

    #[test]
    fn hitbox_is_shrunk_around_the_center() {
        let bird = bird();
        let hitbox = bird.hitbox();
        assert_relative_eq!(hitbox.size.width, 55.0 * 0.95);
        assert_relative_eq!(hitbox.left() + hitbox.size.width / 2.0, 200.0);
        assert_relative_eq!(hitbox.top() + hitbox.size.height / 2.0, 300.0);
    }

    #[test]
    fn draws_rotated_sprite_on_its_center() {
        let mut bird = bird();
        bird.set_velocity(5.0);
        let renderer = RecordingRenderer::default();
        bird.draw(&renderer);
        let commands = renderer.commands();
        assert_eq!(commands.len(), 1);
        match &commands[0] {
            DrawCommand::Rotated {
                image,
                center,
                angle,
                ..
            } => {
                assert_eq!(*image, sprite::BIRD);
                assert_eq!(*center, bird.position());
                assert_relative_eq!(*angle, FRAC_PI_4);
            }
            other => panic!("unexpected draw {:?}", other),
        }
    }
}
