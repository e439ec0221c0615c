use crate::browser;
use anyhow::{anyhow, Context, Error, Result};
// ELI5: web assembly is a single threaded environment, so Rc RefCell > Mutex
use async_trait::async_trait;
use futures::channel::oneshot::channel;
use futures::future::try_join_all;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

/// Everything the loop needs from a game
/// - `initialize` is consumed once and hands back the playable game
/// - `on_click` / `update` mutate, `draw` only reads
#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    /// images the renderer must have loaded before the first frame
    fn images(&self) -> &[ImageId];
    fn on_click(&mut self, point: Point);
    fn update(&mut self, tick: u64);
    fn draw(&self, renderer: &dyn Renderer);
}

// length of a frame in milliseconds
const FRAME_SIZE: f32 = 1.0 / 60.0 * 1000.0;

/// Fixed step loop
/// - one `update` per FRAME_SIZE of elapsed time, each one a simulation tick
/// - `tick` only ever grows, restarting a game does not rewind it
pub struct GameLoop {
    last_frame: f64,
    accumulated_delta: f32,
    tick: u64,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let mut clicks = input::prepare_input()?;
        let mut game = game.initialize().await?;
        let images = load_images(game.images()).await?;
        let mut game_loop = GameLoop {
            last_frame: browser::now()?,
            accumulated_delta: 0.0,
            tick: 0,
        };
        let renderer = CanvasRenderer {
            context: browser::context()?,
            images,
        };
        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            input::process_input(&mut clicks, |point| game.on_click(point));

            game_loop.accumulated_delta += (perf - game_loop.last_frame) as f32;
            while game_loop.accumulated_delta > FRAME_SIZE {
                game_loop.tick += 1;
                game.update(game_loop.tick);
                game_loop.accumulated_delta -= FRAME_SIZE;
            }
            game_loop.last_frame = perf;
            game.draw(&renderer);

            if let Some(callback) = f.borrow().as_ref() {
                if let Err(err) = browser::request_animation_frame(callback) {
                    error!("GameLoop: {:#}", err);
                }
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }
}

// ==================== Geometry ====================
// Canvas space : origin top left, y grows downwards

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    /// Rect of `size` whose center sits on `center`
    pub fn centered(center: Point, size: Size) -> Self {
        Rect {
            position: Point {
                x: center.x - size.width / 2.0,
                y: center.y - size.height / 2.0,
            },
            size,
        }
    }

    pub fn left(&self) -> f32 {
        self.position.x
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.width
    }

    pub fn top(&self) -> f32 {
        self.position.y
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.height
    }

    /// strict containment, a point on the border is outside
    pub fn contains(&self, point: Point) -> bool {
        point.x > self.left()
            && point.x < self.right()
            && point.y > self.top()
            && point.y < self.bottom()
    }
}

// ==================== Drawing ====================

/// Opaque handle to an image, the path it is loaded from
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ImageId(pub &'static str);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    fn css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            f32::from(self.a) / 255.0
        )
    }
}

/// Vertical anchor of a line of text, text is always centered horizontally
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Baseline {
    Top,
    Middle,
}

impl Baseline {
    fn css(&self) -> &'static str {
        match self {
            Baseline::Top => "top",
            Baseline::Middle => "middle",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Color,
    pub baseline: Baseline,
}

/// Drawing primitives the game consumes, the host decides how
pub trait Renderer {
    fn clear(&self, rect: &Rect);
    fn draw_image(&self, image: ImageId, destination: &Rect);
    /// draw centered on `center`, rotated clockwise by `angle` radians
    fn draw_image_rotated(&self, image: ImageId, center: Point, size: Size, angle: f32);
    /// draw mirrored top to bottom inside `destination`
    fn draw_image_flipped(&self, image: ImageId, destination: &Rect);
    fn draw_text(&self, text: &str, position: Point, style: &TextStyle);
}

pub struct CanvasRenderer {
    context: CanvasRenderingContext2d,
    images: HashMap<ImageId, HtmlImageElement>,
}

impl CanvasRenderer {
    fn image(&self, id: ImageId) -> Option<&HtmlImageElement> {
        let image = self.images.get(&id);
        if image.is_none() {
            error!("Image not loaded : {}", id.0);
        }
        image
    }

    fn draw_at_origin(&self, image: &HtmlImageElement, size: Size) -> Result<(), JsValue> {
        self.context
            .draw_image_with_html_image_element_and_dw_and_dh(
                image,
                0.0,
                0.0,
                size.width.into(),
                size.height.into(),
            )
    }
}

impl Renderer for CanvasRenderer {
    fn clear(&self, rect: &Rect) {
        self.context.clear_rect(
            rect.position.x.into(),
            rect.position.y.into(),
            rect.size.width.into(),
            rect.size.height.into(),
        );
    }

    fn draw_image(&self, image: ImageId, destination: &Rect) {
        let Some(element) = self.image(image) else {
            return;
        };
        if let Err(err) = self
            .context
            .draw_image_with_html_image_element_and_dw_and_dh(
                element,
                destination.position.x.into(),
                destination.position.y.into(),
                destination.size.width.into(),
                destination.size.height.into(),
            )
        {
            error!("Drawing {} failed : {:#?}", image.0, err);
        }
    }

    fn draw_image_rotated(&self, image: ImageId, center: Point, size: Size, angle: f32) {
        let Some(element) = self.image(image) else {
            return;
        };
        self.context.save();
        let result = self
            .context
            .translate(center.x.into(), center.y.into())
            .and_then(|_| self.context.rotate(angle.into()))
            .and_then(|_| {
                self.context.translate(
                    (-size.width / 2.0).into(),
                    (-size.height / 2.0).into(),
                )
            })
            .and_then(|_| self.draw_at_origin(element, size));
        self.context.restore();
        if let Err(err) = result {
            error!("Drawing rotated {} failed : {:#?}", image.0, err);
        }
    }

    fn draw_image_flipped(&self, image: ImageId, destination: &Rect) {
        let Some(element) = self.image(image) else {
            return;
        };
        self.context.save();
        let result = self
            .context
            .translate(destination.left().into(), destination.bottom().into())
            .and_then(|_| self.context.scale(1.0, -1.0))
            .and_then(|_| self.draw_at_origin(element, destination.size));
        self.context.restore();
        if let Err(err) = result {
            error!("Drawing flipped {} failed : {:#?}", image.0, err);
        }
    }

    fn draw_text(&self, text: &str, position: Point, style: &TextStyle) {
        self.context.set_font(&format!("{}px sans-serif", style.size));
        self.context.set_text_align("center");
        self.context.set_text_baseline(style.baseline.css());
        self.context.set_fill_style_str(&style.color.css());
        if let Err(err) = self
            .context
            .fill_text(text, position.x.into(), position.y.into())
        {
            error!("Drawing text '{}' failed : {:#?}", text, err);
        }
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::new_image()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "[engine.rs::load_image] Error loading image: {:#?}",
                err
            )));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callback alive until image is loaded or errors
    success_callback.forget();
    error_callback.forget();

    // ?? - Result<Result<(), Error>, oneshot::Canceled>
    // - first ? yields the channel result
    // - second ? yields the image load result
    rx.await??;

    Ok(image)
}

/// Load every image in parallel, total time is the slowest image
pub async fn load_images(ids: &[ImageId]) -> Result<HashMap<ImageId, HtmlImageElement>> {
    let loads = ids.iter().map(|&id| async move {
        load_image(id.0)
            .await
            .with_context(|| format!("Failed to load image resource from : {}", id.0))
            .map(|image| (id, image))
    });
    Ok(try_join_all(loads).await?.into_iter().collect())
}

pub mod input {
    use super::Point;
    use crate::browser;
    use anyhow::Result;
    use futures::channel::mpsc::{unbounded, UnboundedReceiver};

    /// Clicks are queued by the mousedown listener and drained once per
    /// animation frame, so input never interleaves with an update
    pub fn prepare_input() -> Result<UnboundedReceiver<Point>> {
        let (tx, rx) = unbounded();
        browser::on_mouse_down(move |event: web_sys::MouseEvent| {
            let point = Point {
                x: event.offset_x() as f32,
                y: event.offset_y() as f32,
            };
            // receiver only goes away with the page
            let _ = tx.unbounded_send(point);
        })?;
        Ok(rx)
    }

    pub fn process_input(clicks: &mut UnboundedReceiver<Point>, mut on_click: impl FnMut(Point)) {
        while let Ok(Some(point)) = clicks.try_next() {
            on_click(point);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_built_around_its_center() {
        let rect = Rect::centered(
            Point { x: 400.0, y: 300.0 },
            Size {
                width: 200.0,
                height: 100.0,
            },
        );
        assert_eq!(rect.left(), 300.0);
        assert_eq!(rect.right(), 500.0);
        assert_eq!(rect.top(), 250.0);
        assert_eq!(rect.bottom(), 350.0);
    }

    #[test]
    fn contains_excludes_the_border() {
        let rect = Rect::new(
            Point { x: 0.0, y: 0.0 },
            Size {
                width: 10.0,
                height: 10.0,
            },
        );
        assert!(rect.contains(Point { x: 5.0, y: 5.0 }));
        assert!(!rect.contains(Point { x: 0.0, y: 5.0 }));
        assert!(!rect.contains(Point { x: 10.0, y: 5.0 }));
        assert!(!rect.contains(Point { x: 5.0, y: -1.0 }));
    }

    #[test]
    fn color_renders_as_css_rgba() {
        assert_eq!(Color::WHITE.css(), "rgba(255, 255, 255, 1)");
        assert_eq!(Color::rgba(0, 0, 0, 0).css(), "rgba(0, 0, 0, 0)");
    }
}
