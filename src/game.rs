pub use self::flappy_states::Session;
use self::flappy_states::{GameOver, GameState, IsFlying, Playing, Start};
use crate::browser;
use crate::config::Config;
use crate::engine::{Game, ImageId, Point, Rect, Renderer};
use crate::sprite::{self, GapSource};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// TABLE
/// ┌───────────────────── Game Architecture Overview ────────────────────────┐
/// │                                                                         │
/// │    ┌─────────────┐          ┌─────────────┐          ┌─────────────┐    │
/// │    │   lib.rs    │  start   │  engine.rs  │  tick /  │   game.rs   │    │
/// │    │  main_js()  ├─────────►│  GameLoop   ├─────────►│ FlappyGame  │    │
/// │    └─────────────┘          └──────┬──────┘  click   └──────┬──────┘    │
/// │                                    │                        │           │
/// │                              ┌─────┴──────┐          ┌──────┴───────┐   │
/// │                              │ mousedown  │          │ StateMachine │   │
/// │                              │ channel    │          │ Start        │   │
/// │                              └────────────┘          │ Playing      │   │
/// │                                                      │ GameOver     │   │
/// │                                                      └──────────────┘   │
/// │                                                                         │
/// ├──────────────────────── Per animation frame ────────────────────────────┤
/// │  1. queued clicks   -> FlappyGame::on_click()                           │
/// │  2. each fixed step -> FlappyGame::update(tick)                         │
/// │     ├─► background scrolls (every state)                                │
/// │     └─► Playing: pipes -> spawn -> bird                                 │
/// │  3. FlappyGame::draw() : background -> state content -> text            │
/// └─────────────────────────────────────────────────────────────────────────┘
pub enum FlappyGame {
    /// Waiting on config before anything can be built
    Loading,
    Loaded(Flappy<ChaCha8Rng>),
}

impl FlappyGame {
    pub fn new() -> Self {
        FlappyGame::Loading
    }

    /// config.json is optional, anything wrong with it falls back to defaults
    async fn load_config() -> Config {
        let loaded = browser::fetch_json::<Config>(Config::PATH)
            .await
            .and_then(Config::validated);
        match loaded {
            Ok(config) => {
                log!("Loaded {}", Config::PATH);
                config
            }
            Err(err) => {
                log!("Using default config, {} unavailable : {:#}", Config::PATH, err);
                Config::default()
            }
        }
    }
}

impl Default for FlappyGame {
    fn default() -> Self {
        FlappyGame::new()
    }
}

#[async_trait(?Send)]
impl Game for FlappyGame {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            FlappyGame::Loading => {
                let config = Self::load_config().await;
                let flappy = Flappy::new(config, ChaCha8Rng::from_entropy());
                Ok(Box::new(FlappyGame::Loaded(flappy)))
            }
            FlappyGame::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn images(&self) -> &[ImageId] {
        &sprite::IMAGES
    }

    fn on_click(&mut self, point: Point) {
        if let FlappyGame::Loaded(flappy) = self {
            flappy.on_click(point);
        }
    }

    fn update(&mut self, tick: u64) {
        if let FlappyGame::Loaded(flappy) = self {
            flappy.update(tick);
        }
    }

    fn draw(&self, renderer: &dyn Renderer) {
        if let FlappyGame::Loaded(flappy) = self {
            flappy.draw(renderer);
        }
    }
}

/// Which screen is up, for callers that only need to look
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Start,
    Playing,
    GameOver,
}

/// One independent game session
/// - `machine` is only `None` for the duration of a transition
/// - the background and the tick counter survive restarts
pub struct Flappy<G: GapSource> {
    machine: Option<FlappyStateMachine>,
    background: Background,
    gaps: G,
}

impl<G: GapSource> Flappy<G> {
    pub fn new(config: Config, gaps: G) -> Self {
        Flappy {
            machine: Some(FlappyStateMachine::new(config)),
            background: Background::new(&config),
            gaps,
        }
    }

    pub fn on_click(&mut self, point: Point) {
        self.transition(Event::Click(point));
    }

    /// one simulation tick, `tick` is the loop's running counter
    pub fn update(&mut self, tick: u64) {
        self.background.update();
        self.transition(Event::Tick(tick));
    }

    pub fn draw(&self, renderer: &dyn Renderer) {
        renderer.clear(&self.background.bounds());
        self.background.draw(renderer);
        self.machine().draw(renderer);
    }

    pub fn phase(&self) -> Phase {
        self.machine().phase()
    }

    pub fn session(&self) -> &Session {
        self.machine().session()
    }

    pub fn background_offset(&self) -> f32 {
        self.background.offset
    }

    fn transition(&mut self, event: Event) {
        if let Some(machine) = self.machine.take() {
            let before = machine.phase();
            let machine = machine.transition(event, &mut self.gaps);
            let after = machine.phase();
            if before != after {
                log!(
                    "{:?} -> {:?} (score {})",
                    before,
                    after,
                    machine.session().score()
                );
            }
            self.machine.replace(machine);
        }
    }

    /// `machine` is put back before `transition` returns, so outside of it
    /// the option is always filled
    fn machine(&self) -> &FlappyStateMachine {
        self.machine
            .as_ref()
            .expect("state machine is restored after every transition")
    }

    #[cfg(test)]
    fn session_mut(&mut self) -> &mut Session {
        self.machine
            .as_mut()
            .map(FlappyStateMachine::session_mut)
            .expect("state machine is restored after every transition")
    }
}

/// Two tiled copies of the sky scrolling left forever
/// - wraps back to 0 once a full screen width has gone by
struct Background {
    offset: f32,
    bounds: Rect,
    speed: f32,
}

impl Background {
    fn new(config: &Config) -> Self {
        Background {
            offset: 0.0,
            bounds: Rect::new(Point::default(), config.screen.size()),
            speed: config.background.scroll_speed,
        }
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn update(&mut self) {
        self.offset -= self.speed;
        if self.offset < -self.bounds.size.width {
            self.offset = 0.0;
        }
    }

    fn draw(&self, renderer: &dyn Renderer) {
        let width = self.bounds.size.width;
        for x in [self.offset, self.offset + width] {
            renderer.draw_image(
                sprite::SKY,
                &Rect::new(Point { x, y: 0.0 }, self.bounds.size),
            );
        }
    }
}

/// ELI5:
/// ┌──────────────── State Transition Flow ──────────────────┐
/// │  From State  →  Event              →  To State          │
/// ├─────────────────────────────────────────────────────────┤
/// │  Start       →  Click (on button)  →  Playing           │
/// │  Start       →  Click (elsewhere)  →  Start             │
/// │  Playing     →  Click              →  Playing (jump)    │
/// │  Playing     →  Tick               →  Playing           │
/// │  Playing     →  Tick (crash)       →  GameOver          │
/// │  GameOver    →  Click              →  Playing (reset)   │
/// │  Start/Over  →  Tick               →  unchanged         │
/// └─────────────────────────────────────────────────────────┘
#[derive(Debug, Copy, Clone)]
enum Event {
    Click(Point),
    Tick(u64),
}

enum FlappyStateMachine {
    Start(GameState<Start>),
    Playing(GameState<Playing>),
    GameOver(GameState<GameOver>),
}

impl From<GameState<Start>> for FlappyStateMachine {
    fn from(state: GameState<Start>) -> Self {
        FlappyStateMachine::Start(state)
    }
}

impl From<GameState<Playing>> for FlappyStateMachine {
    fn from(state: GameState<Playing>) -> Self {
        FlappyStateMachine::Playing(state)
    }
}

impl From<GameState<GameOver>> for FlappyStateMachine {
    fn from(state: GameState<GameOver>) -> Self {
        FlappyStateMachine::GameOver(state)
    }
}

impl From<IsFlying> for FlappyStateMachine {
    fn from(is_flying: IsFlying) -> Self {
        match is_flying {
            IsFlying::InProgress(playing) => playing.into(),
            IsFlying::Crashed(game_over) => game_over.into(),
        }
    }
}

impl FlappyStateMachine {
    fn new(config: Config) -> Self {
        GameState::<Start>::new(config).into()
    }

    // CONSUMING self and returning the next state
    // - the old state can't be touched after a transition
    // - every (state, event) pair is spelled out, no catch all arm, so a new
    //   state or event will not compile until it is handled
    fn transition<G: GapSource + ?Sized>(self, event: Event, gaps: &mut G) -> Self {
        use FlappyStateMachine as Machine;
        match (self, event) {
            (Machine::Start(state), Event::Click(point)) => {
                if state.button().contains(point) {
                    state.start().into()
                } else {
                    state.into()
                }
            }
            (Machine::Start(state), Event::Tick(_)) => state.into(),
            (Machine::Playing(state), Event::Click(_)) => state.jump().into(),
            (Machine::Playing(state), Event::Tick(tick)) => state.update(tick, gaps).into(),
            (Machine::GameOver(state), Event::Click(_)) => state.restart().into(),
            (Machine::GameOver(state), Event::Tick(_)) => state.into(),
        }
    }

    fn phase(&self) -> Phase {
        match self {
            FlappyStateMachine::Start(_) => Phase::Start,
            FlappyStateMachine::Playing(_) => Phase::Playing,
            FlappyStateMachine::GameOver(_) => Phase::GameOver,
        }
    }

    fn session(&self) -> &Session {
        match self {
            FlappyStateMachine::Start(state) => state.session(),
            FlappyStateMachine::Playing(state) => state.session(),
            FlappyStateMachine::GameOver(state) => state.session(),
        }
    }

    #[cfg(test)]
    fn session_mut(&mut self) -> &mut Session {
        match self {
            FlappyStateMachine::Start(state) => state.session_mut(),
            FlappyStateMachine::Playing(state) => state.session_mut(),
            FlappyStateMachine::GameOver(state) => state.session_mut(),
        }
    }

    fn draw(&self, renderer: &dyn Renderer) {
        match self {
            FlappyStateMachine::Start(state) => state.draw(renderer),
            FlappyStateMachine::Playing(state) => state.draw(renderer),
            FlappyStateMachine::GameOver(state) => state.draw(renderer),
        }
    }
}

/// All code relating to individual states is behind this mod block, a
/// transition can only happen through the methods a state exposes:
/// - jump only exists on Playing
/// - restart only exists on GameOver
/// - start only exists on Start
mod flappy_states {
    use crate::config::Config;
    use crate::engine::{Baseline, Color, Point, Rect, Renderer, TextStyle};
    use crate::obstacle::Obstacles;
    use crate::sprite::{self, Bird, Flight, GapSource, Pipe};

    const TITLE: &str = "FLAPPY BIRD";
    const START_CAPTION: &str = "Click on Start button to begin";
    const GAME_OVER: &str = "Game Over!";
    const RESTART_CAPTION: &str = "Click to Restart";
    const SCORE_LABEL: &str = "SCORE";

    const SCORE_LABEL_COLOR: Color = Color::rgba(255, 255, 255, 180);

    fn text(size: f32, baseline: Baseline) -> TextStyle {
        TextStyle {
            size,
            color: Color::WHITE,
            baseline,
        }
    }

    pub struct Start;
    pub struct Playing;
    pub struct GameOver;

    pub enum IsFlying {
        InProgress(GameState<Playing>),
        Crashed(GameState<GameOver>),
    }

    pub struct GameState<S> {
        session: Session,
        // phantom marker, only there so each state gets its own impl block
        _state: S,
    }

    impl<S> GameState<S> {
        pub fn session(&self) -> &Session {
            &self.session
        }

        #[cfg(test)]
        pub fn session_mut(&mut self) -> &mut Session {
            &mut self.session
        }

        fn into_state<T>(self, state: T) -> GameState<T> {
            GameState {
                session: self.session,
                _state: state,
            }
        }
    }

    impl GameState<Start> {
        pub fn new(config: Config) -> Self {
            GameState {
                session: Session::new(config),
                _state: Start,
            }
        }

        pub fn button(&self) -> Rect {
            self.session.config.start_button()
        }

        /// bird keeps its idle pose and starts falling on the next tick
        pub fn start(self) -> GameState<Playing> {
            self.into_state(Playing)
        }

        pub fn draw(&self, renderer: &dyn Renderer) {
            let center = self.session.config.screen.center();
            renderer.draw_text(
                TITLE,
                Point {
                    x: center.x,
                    y: center.y - 150.0,
                },
                &text(64.0, Baseline::Middle),
            );
            renderer.draw_image(sprite::START, &self.button());
            renderer.draw_text(
                START_CAPTION,
                Point {
                    x: center.x,
                    y: center.y + 150.0,
                },
                &text(24.0, Baseline::Middle),
            );
            self.session.bird.draw(renderer);
        }
    }

    impl GameState<Playing> {
        pub fn jump(mut self) -> Self {
            self.session.bird.jump();
            self
        }

        /// Pipes first (scroll, collide, score, prune), then spawn, then the
        /// bird. A pipe hit or the ground ends the run.
        pub fn update<G: GapSource + ?Sized>(mut self, tick: u64, gaps: &mut G) -> IsFlying {
            let session = &mut self.session;
            let sweep = session.obstacles.sweep(&mut session.bird);
            session.score += sweep.scored;
            session.obstacles.spawn(tick, gaps);
            let flight = session.bird.update();

            if sweep.collided || flight == Flight::Crashed {
                IsFlying::Crashed(self.into_state(GameOver))
            } else {
                IsFlying::InProgress(self)
            }
        }

        pub fn draw(&self, renderer: &dyn Renderer) {
            self.session.obstacles.draw(renderer);
            if self.session.bird.is_alive() {
                self.session.bird.draw(renderer);
            }

            let x = self.session.config.screen.center().x;
            renderer.draw_text(
                &self.session.score.to_string(),
                Point { x, y: 20.0 },
                &text(48.0, Baseline::Top),
            );
            renderer.draw_text(
                SCORE_LABEL,
                Point { x, y: 80.0 },
                &TextStyle {
                    size: 20.0,
                    color: SCORE_LABEL_COLOR,
                    baseline: Baseline::Top,
                },
            );
        }
    }

    impl GameState<GameOver> {
        /// fresh bird, no pipes, score back to 0
        pub fn restart(mut self) -> GameState<Playing> {
            self.session.reset();
            self.into_state(Playing)
        }

        pub fn draw(&self, renderer: &dyn Renderer) {
            let center = self.session.config.screen.center();
            let lines = [
                (GAME_OVER.to_string(), 64.0, -50.0),
                (format!("Final Score: {}", self.session.score), 32.0, 20.0),
                (RESTART_CAPTION.to_string(), 24.0, 80.0),
            ];
            for (line, size, dy) in lines {
                renderer.draw_text(
                    &line,
                    Point {
                        x: center.x,
                        y: center.y + dy,
                    },
                    &text(size, Baseline::Middle),
                );
            }
        }
    }

    /// Shared data for every state
    /// - the bird, the pipes and the score belong to the session alone
    pub struct Session {
        bird: Bird,
        obstacles: Obstacles,
        score: u32,
        config: Config,
    }

    impl Session {
        fn new(config: Config) -> Self {
            Session {
                bird: Bird::new(&config),
                obstacles: Obstacles::new(&config),
                score: 0,
                config,
            }
        }

        fn reset(&mut self) {
            self.score = 0;
            self.obstacles.clear();
            self.bird = Bird::new(&self.config);
        }

        pub fn score(&self) -> u32 {
            self.score
        }

        pub fn bird(&self) -> &Bird {
            &self.bird
        }

        pub fn pipes(&self) -> &[Pipe] {
            self.obstacles.pipes()
        }

        #[cfg(test)]
        pub fn bird_mut(&mut self) -> &mut Bird {
            &mut self.bird
        }

        #[cfg(test)]
        pub fn obstacles_mut(&mut self) -> &mut Obstacles {
            &mut self.obstacles
        }
    }
}
