use crate::config::Config;
use crate::engine::Renderer;
use crate::sprite::{Bird, GapSource, Pipe};

/// What one pass over the pipes did to the bird
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Sweep {
    pub scored: u32,
    pub collided: bool,
}

/// Live pipes, oldest first
pub struct Obstacles {
    pipes: Vec<Pipe>,
    config: Config,
}

impl Obstacles {
    pub fn new(config: &Config) -> Self {
        Obstacles {
            pipes: Vec::new(),
            config: *config,
        }
    }

    /// ::sweep per tick, newest to oldest
    /// - scroll the pipe
    /// - a hit kills the bird on the spot
    /// - first time a pipe is behind the bird it scores
    /// - offscreen pipes are dropped
    ///
    /// Walking backwards lets `remove(i)` happen mid loop, every index still
    /// to visit is below `i` and does not move.
    pub fn sweep(&mut self, bird: &mut Bird) -> Sweep {
        let mut sweep = Sweep::default();
        for i in (0..self.pipes.len()).rev() {
            let pipe = &mut self.pipes[i];
            pipe.update();

            if pipe.hits(bird) {
                bird.kill();
                sweep.collided = true;
            }

            if !pipe.passed() && pipe.x() < bird.position().x {
                pipe.mark_passed();
                sweep.scored += 1;
            }

            if pipe.offscreen() {
                self.pipes.remove(i);
            }
        }
        sweep
    }

    /// Append one pipe every `spawn_interval` ticks
    pub fn spawn<G: GapSource + ?Sized>(&mut self, tick: u64, gaps: &mut G) -> bool {
        let interval = self.config.pipe.spawn_interval.max(1);
        if tick % interval != 0 {
            return false;
        }
        self.pipes.push(Pipe::new(&self.config, gaps));
        true
    }

    pub fn clear(&mut self) {
        self.pipes.clear();
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    pub fn draw(&self, renderer: &dyn Renderer) {
        for pipe in &self.pipes {
            pipe.draw(renderer);
        }
    }

    #[cfg(test)]
    pub(crate) fn push(&mut self, pipe: Pipe) {
        self.pipes.push(pipe);
    }

    #[cfg(test)]
    pub(crate) fn pipes_mut(&mut self) -> &mut [Pipe] {
        &mut self.pipes
    }
}
