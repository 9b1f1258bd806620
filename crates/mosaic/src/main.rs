mod panel;
mod screens;
mod system_metrics;

use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use directories::ProjectDirs;
use mosaic_compose::{Composer, FramePacer};
use mosaic_config::Config;
use mosaic_core::{Anchor, ColorTheme, Frame, TimeFormat, composite_at, place_at};
use mosaic_motion::{NumberTransition, RenderContext, Stack, Widget};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Stylize},
    text::Line,
    DefaultTerminal,
};
use tracing_subscriber::EnvFilter;

use panel::PanelView;
use screens::{
    PanelLayout,
    clock::{self, ClockFace},
    date::{self, DateState},
    marquee::{self, MarqueeState},
    system::{self, SystemState},
};
use system_metrics::SystemMonitor;

/// Seconds for the rainbow theme to go once round the hue circle.
const RAINBOW_PERIOD: f64 = 30.0;

/// Step applied by the brightness keys.
const BRIGHTNESS_STEP: f64 = 0.1;

/// Seconds a brightness change takes to settle.
const BRIGHTNESS_FADE: f64 = 0.3;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_logging()?;
    let config = Config::load()?;
    let terminal = ratatui::init();
    let result = App::new(config).run(terminal);
    ratatui::restore();
    result
}

/// Send logs to a file; the terminal belongs to the panel.
fn init_logging() -> color_eyre::Result<()> {
    let Some(dirs) = ProjectDirs::from("", "", "mosaic") else {
        return Ok(());
    };
    let dir = dirs.data_local_dir();
    std::fs::create_dir_all(dir)?;
    let file = File::create(dir.join("mosaic.log"))?;

    let filter =
        EnvFilter::try_from_env("MOSAIC_LOG").unwrap_or_else(|_| EnvFilter::new("mosaic=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    config: Config,
    /// Current time format (12h or 24h).
    time_format: TimeFormat,
    /// Current color theme.
    color_theme: ColorTheme,
    layout: PanelLayout,
    /// Named transitions, scrollers and stacks owned by the render loop.
    ctx: RenderContext,
    date: Composer<DateState>,
    system: Composer<SystemState>,
    marquee: Composer<MarqueeState>,
    monitor: SystemMonitor,
    pacer: FramePacer,
    started: Instant,
    /// Brightness the panel is fading towards.
    brightness: f64,
    /// Set by the advance key and consumed by the next frame.
    advance_requested: bool,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: Config) -> Self {
        let display = &config.display;
        let layout = PanelLayout::new(display.width, display.height);
        let poll = Duration::from_secs_f64(config.system.poll_interval);
        Self {
            running: false,
            time_format: config.clock.time_format,
            color_theme: config.clock.theme,
            layout,
            ctx: RenderContext::new(),
            date: date::composer(),
            system: system::composer(),
            marquee: marquee::composer(),
            monitor: SystemMonitor::new(poll),
            pacer: FramePacer::new(display.fps),
            started: Instant::now(),
            brightness: display.brightness,
            advance_requested: false,
            config,
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        self.monitor.start();
        tracing::info!(
            width = self.layout.width,
            height = self.layout.height,
            fps = self.config.display.fps,
            "panel started"
        );

        while self.running {
            self.pacer.begin();
            let t = self.started.elapsed().as_secs_f64();
            let panel = self.compose_panel(&Local::now(), t);
            terminal.draw(|frame| self.render(frame, &panel))?;
            self.handle_crossterm_events()?;
        }

        tracing::info!(dropped_frames = self.pacer.dropped(), "panel stopped");
        Ok(())
    }

    /// Renders the panel and the help line.
    fn render(&self, frame: &mut ratatui::Frame, panel: &Frame) {
        let [body, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());
        frame.render_widget(PanelView::new(panel), body);

        let [r, g, b, _] = self.color_theme.color().0;
        let color = Color::Rgb(r, g, b);
        let help = Line::from(vec![
            "q".bold().fg(color),
            " quit  ".dark_gray(),
            "t".bold().fg(color),
            " toggle 12/24h  ".dark_gray(),
            "c".bold().fg(color),
            " cycle color  ".dark_gray(),
            "n".bold().fg(color),
            " next card  ".dark_gray(),
            "+/-".bold().fg(color),
            " brightness".dark_gray(),
        ])
        .centered();
        frame.render_widget(help, help_area);
    }

    /// Build one panel frame for wall-clock `now` at animation time `t`.
    fn compose_panel(&mut self, now: &DateTime<Local>, t: f64) -> Frame {
        let layout = self.layout;
        let static_color = self.color_theme.color();
        let clock_color = self
            .color_theme
            .color_at((t / RAINBOW_PERIOD).fract() as f32);

        let mut panel = Frame::transparent(layout.width, layout.height);

        let face = ClockFace {
            time_format: self.time_format,
            flip_duration: self.config.clock.flip_duration,
            easing: self.config.clock.easing,
        };
        let clock = clock::draw(&mut self.ctx, &face, now, t).tint(clock_color);
        panel = composite_at(&clock, &panel, Anchor::Top, 0, layout.clock_y as i64, false);

        let widgets = self.card_widgets(now, static_color);
        let stack_config = &self.config.stack;
        let stack = self.ctx.stack("cards", |name| {
            Stack::new(name, layout.cards_height)
                .with_gap(stack_config.gap)
                .with_delta(stack_config.delta)
                .with_reverse_delta(stack_config.reverse_delta)
                .with_speed(stack_config.speed)
        });
        stack.update(widgets);
        if std::mem::take(&mut self.advance_requested) {
            stack.advance(t);
        }
        if let Some(cards) = stack.draw(t) {
            panel = place_at(&cards, &panel, 0, layout.cards_y as i64, Anchor::TopLeft);
        }

        let marquee_state = MarqueeState {
            text: self.config.marquee.text.clone(),
            color: static_color,
        };
        if let Some(text) = self.marquee.get(marquee_state) {
            let marquee_config = &self.config.marquee;
            let window = self
                .ctx
                .scroller("marquee", |name| {
                    marquee::scroller(
                        name,
                        layout.width,
                        marquee_config.delta,
                        marquee_config.speed,
                        marquee_config.pause_duration,
                    )
                })
                .draw(&text, t);
            panel = place_at(&window, &panel, 0, layout.marquee_y as i64, Anchor::TopLeft);
        }

        let brightness = self.ctx.number("brightness", |name| {
            NumberTransition::new(name, self.brightness).with_duration(BRIGHTNESS_FADE)
        });
        brightness.update(self.brightness, t);
        brightness.tick(t);
        let level = brightness.value() as f32;

        panel.flatten(self.config.display.background).brightness(level)
    }

    /// The cards offered to the stack this frame.
    fn card_widgets(&mut self, now: &DateTime<Local>, color: mosaic_core::Rgba<u8>) -> Vec<Widget> {
        let size = self.layout.card_size();
        let wait = self.config.stack.wait_time;

        let date = self.date.get(DateState::new(now, color, size));

        let load = self.monitor.get_metrics().map(|m| m.load());
        let busy = load.is_some_and(|l| {
            l.cpu as f32 / 100.0 >= self.config.system.focus_threshold
        });
        let system = self.system.get(SystemState { load, color, size });

        vec![
            Widget::new("date", date).with_priority(1.0).with_wait_time(wait),
            Widget::new("system", system)
                .with_priority(0.5)
                .with_wait_time(wait)
                .with_focus(busy),
        ]
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Waits for input until the next frame is due.
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        while self.running && !self.pacer.is_due() {
            if event::poll(self.pacer.remaining())? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                    Event::Mouse(_) => {}
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('t')) => self.toggle_time_format(),
            (_, KeyCode::Char('c')) => self.cycle_color_theme(),
            (_, KeyCode::Char('n')) => self.advance_requested = true,
            (_, KeyCode::Char('+') | KeyCode::Char('=')) => self.adjust_brightness(BRIGHTNESS_STEP),
            (_, KeyCode::Char('-')) => self.adjust_brightness(-BRIGHTNESS_STEP),
            _ => {}
        }
    }

    /// Toggle between 12-hour and 24-hour time format.
    fn toggle_time_format(&mut self) {
        self.time_format = self.time_format.toggle();
    }

    /// Cycle through available color themes.
    fn cycle_color_theme(&mut self) {
        self.color_theme = self.color_theme.next();
    }

    fn adjust_brightness(&mut self, step: f64) {
        self.brightness = (self.brightness + step).clamp(0.0, 1.0);
        tracing::debug!(brightness = self.brightness, "brightness changed");
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_quit_keys() {
        for key in [
            press(KeyCode::Char('q')),
            press(KeyCode::Esc),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut app = App::new(Config::default());
            app.running = true;
            app.on_key_event(key);
            assert!(!app.running, "{key:?}");
        }
    }

    #[test]
    fn test_toggle_and_cycle_keys() {
        let mut app = App::new(Config::default());
        app.running = true;
        app.on_key_event(press(KeyCode::Char('t')));
        assert_eq!(app.time_format, TimeFormat::TwelveHour);
        app.on_key_event(press(KeyCode::Char('c')));
        assert_eq!(app.color_theme, ColorTheme::Green);
        app.on_key_event(press(KeyCode::Char('n')));
        assert!(app.advance_requested);
        assert!(app.running);
    }

    #[test]
    fn test_brightness_keys_clamp() {
        let mut app = App::new(Config::default());
        app.on_key_event(press(KeyCode::Char('+')));
        assert_eq!(app.brightness, 1.0);
        for _ in 0..12 {
            app.on_key_event(press(KeyCode::Char('-')));
        }
        assert_eq!(app.brightness, 0.0);
    }

    #[test]
    fn test_panel_is_opaque_and_sized() {
        let mut app = App::new(Config::default());
        let now = Local.with_ymd_and_hms(2024, 3, 1, 12, 34, 56).unwrap();
        let panel = app.compose_panel(&now, 0.0);
        assert_eq!(panel.dimensions(), (64, 32));
        assert!(panel.image().pixels().all(|px| px.0[3] == 255));
    }

    #[test]
    fn test_dimmed_panel_is_black() {
        let mut config = Config::default();
        config.display.brightness = 0.0;
        let mut app = App::new(config);
        let now = Local.with_ymd_and_hms(2024, 3, 1, 12, 34, 56).unwrap();
        let panel = app.compose_panel(&now, 1.0);
        assert!(panel.image().pixels().all(|px| px.0[..3] == [0, 0, 0]));
    }
}
