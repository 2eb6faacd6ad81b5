mod style;

use futures::prelude::*;
use std::cell::Cell;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use iced::button::{self, Button};
use iced::canvas::event::{self, Event};
use iced::canvas::{Cache, Canvas, Cursor, Frame, Geometry, Path, Stroke};
use iced::time;
use iced::{
    mouse, Align, Application, Clipboard, Color, Column, Command, Container, Element,
    HorizontalAlignment, Length, Point, Rectangle, Row, Settings, Size, Subscription,
    VerticalAlignment,
};

use particle_field::{render, Animation, Config, ParticleField, Rgba, Surface};

const CONFIG_PATH: &str = "particles.json";

#[derive(Clone, Debug)]
enum Message {
    Tick,
    TogglePlay,
    Next,
    Reset,
    PointerMoved(Point),
    Advanced { duration: Duration },
    Reseeded { duration: Duration },
    ConfigLoaded(Config),
}

#[derive(Default)]
struct Controls {
    play_button: button::State,
    next_button: button::State,
    reset_button: button::State,
}

#[derive(Default)]
struct App {
    state: State,
    controls: Controls,
}

impl App {
    fn advance(&mut self) -> Option<impl Future<Output = Message>> {
        if self.state.is_advancing {
            return None;
        }

        // no surface yet, nothing to animate
        let size = self.state.canvas_size.get();
        if size.width <= 0.0 || size.height <= 0.0 {
            return None;
        }

        self.state.is_advancing = true;

        let field = self.state.field.clone();

        Some(async move {
            let start = Instant::now();
            let mut field = lock(&field);

            // a resize swaps in a fresh set under the same lock as the step
            sync_viewport(&mut field, size);
            field.step();

            let duration = start.elapsed();

            Message::Advanced { duration }
        })
    }

    fn reseed(&mut self) -> Option<impl Future<Output = Message>> {
        let size = self.state.canvas_size.get();
        if size.width <= 0.0 || size.height <= 0.0 {
            return None;
        }

        let field = self.state.field.clone();

        Some(async move {
            let start = Instant::now();
            lock(&field).init(size.width, size.height);

            let duration = start.elapsed();

            Message::Reseeded { duration }
        })
    }
}

impl Application for App {
    type Executor = iced::executor::Default;
    type Message = Message;
    type Flags = ();

    fn new(_flags: Self::Flags) -> (Self, Command<Message>) {
        (
            Self { ..Self::default() },
            Command::perform(Config::load(CONFIG_PATH), |result| match result {
                Ok(config) => Message::ConfigLoaded(config),
                Err(e) => {
                    if !e.is_not_found() {
                        eprintln!("{}: {}, using defaults", CONFIG_PATH, e);
                    }
                    Message::ConfigLoaded(Config::default())
                }
            }),
        )
    }

    fn title(&self) -> String {
        String::from("Particle Field")
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.state.animation.is_playing() {
            time::every(self.state.animation.interval()).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    fn update(&mut self, message: Self::Message, _clipboard: &mut Clipboard) -> Command<Message> {
        match message {
            Message::TogglePlay => {
                self.state.animation.toggle();
            }
            Message::Tick | Message::Next => {
                if let Some(task) = self.advance() {
                    return Command::perform(task, |message| message);
                }
            }
            Message::Reset => {
                if let Some(task) = self.reseed() {
                    return Command::perform(task, |message| message);
                }
            }
            Message::PointerMoved(position) => {
                lock(&self.state.field).set_pointer(position.x, position.y);
            }
            Message::Advanced { duration } => {
                self.state.is_advancing = false;
                self.state.animation.record(1);
                self.state.last_step_duration = duration;
                self.state.cache.clear();
            }
            Message::Reseeded { duration } => {
                self.state.animation.reset();
                self.state.last_step_duration = duration;
                self.state.cache.clear();
            }
            Message::ConfigLoaded(config) => {
                self.state
                    .animation
                    .set_interval(Duration::from_millis(config.frame_interval_ms.max(1)));
                *lock(&self.state.field) = ParticleField::new(config);
                self.state.animation.reset();
                self.state.animation.play();
                self.state.cache.clear();
            }
        }
        Command::none()
    }

    fn view(&mut self) -> Element<Message> {
        let controls = Row::new()
            .spacing(10)
            .push(
                Button::new(
                    &mut self.controls.play_button,
                    iced::widget::Text::new(if self.state.animation.is_playing() {
                        "Pause"
                    } else {
                        "Play"
                    }),
                )
                .on_press(Message::TogglePlay)
                .style(style::Button),
            )
            .push(
                Button::new(
                    &mut self.controls.next_button,
                    iced::widget::Text::new("Next"),
                )
                .on_press(Message::Next)
                .style(style::Button),
            )
            .push(
                Button::new(
                    &mut self.controls.reset_button,
                    iced::widget::Text::new("Reset"),
                )
                .on_press(Message::Reset)
                .style(style::Button),
            );

        let content = Column::new()
            .spacing(10)
            .padding(10)
            .align_items(Align::Center)
            .push(
                Canvas::new(&mut self.state)
                    .width(Length::Fill)
                    .height(Length::Fill),
            )
            .push(controls);

        Container::new(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(style::Container)
            .into()
    }
}

struct State {
    field: Arc<Mutex<ParticleField>>,
    animation: Animation,
    is_advancing: bool,
    last_step_duration: Duration,
    last_draw_duration: Cell<Duration>,
    link_count: Cell<usize>,
    canvas_size: Cell<Size>,
    cache: Cache,
}

impl Default for State {
    fn default() -> Self {
        Self {
            field: Arc::new(Mutex::new(ParticleField::new(Config::default()))),
            animation: Animation::default(),
            is_advancing: false,
            last_step_duration: Duration::default(),
            last_draw_duration: Cell::new(Duration::default()),
            link_count: Cell::new(0),
            canvas_size: Cell::new(Size::new(0.0, 0.0)),
            cache: Cache::default(),
        }
    }
}

impl iced::canvas::Program<Message> for State {
    fn update(
        &mut self,
        event: Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (event::Status, Option<Message>) {
        match event {
            Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                let message = cursor.position().map(|position| {
                    Message::PointerMoved(Point::new(position.x - bounds.x, position.y - bounds.y))
                });
                (event::Status::Ignored, message)
            }
            _ => (event::Status::Ignored, None),
        }
    }

    fn draw(&self, bounds: Rectangle, _cursor: Cursor) -> Vec<Geometry> {
        self.canvas_size.set(bounds.size());

        // paused or not, a new canvas size rebuilds the field before it is drawn
        let mut field = lock(&self.field);
        sync_viewport(&mut field, bounds.size());
        let background = {
            let [r, g, b] = field.config().background;
            Color::from_rgb8(r, g, b)
        };

        let field_geometry = self.cache.draw(bounds.size(), |frame| {
            let start = Instant::now();

            let mut surface = FrameSurface { frame, background };
            self.link_count.set(render(&field, &mut surface));

            self.last_draw_duration.set(start.elapsed());
        });

        let overlay = {
            let mut frame = Frame::new(bounds.size());

            let text = iced::canvas::Text {
                color: Color::from_rgb8(148, 163, 184),
                size: 14.0,
                position: Point::new(frame.width(), frame.height()),
                horizontal_alignment: HorizontalAlignment::Right,
                vertical_alignment: VerticalAlignment::Bottom,
                ..Default::default()
            };

            frame.fill_text(iced::canvas::Text {
                content: format! {
                    "frame = {}\nlast_step_duration = {:?}\nDraw duration: {:?}\nParticle count: {}\nLink count: {}",
                    self.animation.frame(),
                    self.last_step_duration,
                    self.last_draw_duration.get(),
                    field.particles().len(),
                    self.link_count.get(),
                },
                ..text
            });

            frame.into_geometry()
        };

        vec![field_geometry, overlay]
    }
}

/// Canvas frame as a render target.
struct FrameSurface<'a> {
    frame: &'a mut Frame,
    background: Color,
}

impl Surface for FrameSurface<'_> {
    fn clear(&mut self, width: f32, height: f32) {
        let background = Path::rectangle(Point::ORIGIN, Size::new(width, height));
        self.frame.fill(&background, self.background);
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        let circle = Path::circle(Point::new(x, y), radius);
        self.frame.fill(&circle, to_color(color));
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba) {
        let line = Path::line(Point::new(from.0, from.1), Point::new(to.0, to.1));
        self.frame.stroke(
            &line,
            Stroke::default().with_color(to_color(color)).with_width(width),
        );
    }
}

fn to_color(color: Rgba) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, color.a)
}

/// Re-initializes `field` when the canvas size differs from its viewport.
/// An empty canvas leaves the field as it is.
fn sync_viewport(field: &mut ParticleField, size: Size) -> bool {
    if size.width <= 0.0 || size.height <= 0.0 {
        return false;
    }
    field.resize(size.width, size.height)
}

fn lock(field: &Mutex<ParticleField>) -> MutexGuard<'_, ParticleField> {
    field.lock().unwrap_or_else(PoisonError::into_inner)
}

fn main() -> iced::Result {
    App::run(Settings {
        antialiasing: true,
        ..Settings::default()
    })
}
