// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

// External crate imports
use bon::Builder;
use pixels::{Pixels, SurfaceTexture};

// Standard library imports
use std::sync::mpsc::Receiver;
use std::time::Instant;

// Window management imports
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

mod geometry;
mod rotation;

pub use geometry::{compute_layout, BoundingBox, KnobGeometry, Padding};
pub use rotation::{
    KnobError, RotationEngine, RotationRange, DEFAULT_MAX_ANGLE, DEFAULT_MIN_ANGLE,
    VELOCITY_DOWNSCALE,
};

// ============================================================================
// COLOR CONFIGURATION
// ============================================================================

/// Color representation for knob layers
#[derive(Debug, Clone, Copy)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// Command enum for driving the knob from outside the window loop
#[derive(Debug, Clone)]
pub enum KnobCommand {
    /// A press-to-release gesture begins.
    BeginDrag,
    /// One drag sample: the delta since the last sample plus the absolute
    /// touch position in window coordinates.
    Drag { dx: f32, dy: f32, x: f32, y: f32 },
    /// The gesture ends.
    EndDrag,
    /// Set the rotation directly, in degrees. Values landing in the
    /// forbidden arc are ignored.
    SetRotation(i32),
}

/// Main knob struct - the primary public interface
#[derive(Debug, Clone)]
pub struct Knob {
    config: KnobConfig,
    state: KnobState,
}

#[derive(Debug, Clone, Builder)]
pub struct KnobConfig {
    #[builder(default = "Knob".to_string())]
    pub title: String,

    // Window configuration
    #[builder(default = 512)]
    pub window_width: usize,
    #[builder(default = 512)]
    pub window_height: usize,
    #[builder(default = 60.0)]
    pub max_framerate: f64,

    // Layout configuration
    #[builder(default)]
    pub padding: Padding,

    // Rotation configuration
    #[builder(default = DEFAULT_MIN_ANGLE)]
    pub min_angle: i32,
    #[builder(default = DEFAULT_MAX_ANGLE)]
    pub max_angle: i32,
    #[builder(default = VELOCITY_DOWNSCALE)]
    pub velocity_downscale: f32,
    /// Number of discrete labeling levels across the allowed arc. Scaling
    /// and labeling only; the rotation math never reads it.
    #[builder(default = 10)]
    pub max_level: u32,

    // Colors, outermost layer first
    #[builder(default = Color::new(0xf2, 0xf2, 0xf2))]
    pub window_background: Color,
    #[builder(default = Color::new(0x26, 0x26, 0x2b))]
    pub background_color: Color,
    #[builder(default = Color::new(0x3c, 0x3f, 0x45))]
    pub base_color: Color,
    #[builder(default = Color::new(0x55, 0x5a, 0x63))]
    pub knob_color: Color,
    #[builder(default = Color::new(0x14, 0x14, 0x16))]
    pub rim_color: Color,
    #[builder(default = Color::new(0xe8, 0x71, 0x1a))]
    pub indicator_color: Color,

    // Indicator glyph proportions, as fractions of the knob radius
    #[builder(default = 0.55)]
    pub indicator_inner_factor: f32,
    #[builder(default = 0.85)]
    pub indicator_length_factor: f32,
    #[builder(default = 5.0)]
    pub indicator_width: f32,
    #[builder(default = 3.0)]
    pub rim_thickness: f32,
}

impl Knob {
    /// Build a knob from its configuration.
    ///
    /// Fails when the stop angles violate their quadrant contract; there is
    /// no silent clamping of a misconfigured range.
    pub fn new(config: KnobConfig) -> Result<Self, KnobError> {
        let range = RotationRange::new(config.min_angle, config.max_angle)?;
        let state = KnobState::new(
            RotationEngine::new(range),
            config.velocity_downscale,
            config.padding,
            config.window_width as f32,
            config.window_height as f32,
        );
        Ok(Self { config, state })
    }

    /// The current rotation in degrees, `[0, 360)`.
    pub fn rotation(&self) -> i32 {
        self.state.engine.current_angle()
    }

    /// Set the rotation directly; forbidden values are ignored.
    /// Returns whether the value was taken.
    pub fn set_rotation(&mut self, rotation: i32) -> bool {
        self.state.engine.set_rotation(rotation)
    }

    /// The current position on the `0..=max_level` labeling scale.
    pub fn level(&self) -> u32 {
        self.state.engine.level(self.config.max_level)
    }

    /// The current layer boxes, as of the last resize.
    pub fn geometry(&self) -> KnobGeometry {
        self.state.geometry
    }

    /// Open the knob window and run until it is closed. Mouse drags on the
    /// window rotate the knob.
    pub fn show(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.run_window(None)
    }

    /// Like [`show`](Self::show), additionally draining gesture commands
    /// from `receiver` once per frame.
    pub fn show_with_commands(
        &mut self,
        receiver: Receiver<KnobCommand>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.run_window(Some(receiver))
    }

    fn run_window(
        &self,
        receiver: Option<Receiver<KnobCommand>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let config = self.config.clone();

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)?;

        let window = std::sync::Arc::new(window);
        let window_clone = window.clone();

        let size = window.inner_size();
        let mut fb_width = size.width as usize;
        let mut fb_height = size.height as usize;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

        // Seed the loop state from the knob, then lay out for the real
        // surface size (which may differ from the requested logical size).
        let mut state = self.state.clone();
        state.resize(size.width as f32, size.height as f32);

        let frame_duration = std::time::Duration::from_secs_f64(1.0 / config.max_framerate);
        let mut last_frame = Instant::now();

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        fb_width = new_size.width as usize;
                        fb_height = new_size.height as usize;
                        let _ = pixels.resize_buffer(new_size.width, new_size.height);
                        let _ = pixels.resize_surface(new_size.width, new_size.height);
                        state.resize(new_size.width as f32, new_size.height as f32);
                    }
                    WindowEvent::MouseInput {
                        state: element_state,
                        button: MouseButton::Left,
                        ..
                    } => match element_state {
                        ElementState::Pressed => state.begin_drag(),
                        ElementState::Released => state.end_drag(),
                    },
                    WindowEvent::CursorMoved { position, .. } => {
                        state.cursor_moved(position.x as f32, position.y as f32);
                    }
                    WindowEvent::RedrawRequested => {
                        if let Some(ref receiver) = receiver {
                            state.update_with_commands(receiver);
                        }

                        let frame = pixels.frame_mut();
                        let mut canvas = Canvas::new(frame, fb_width, fb_height);
                        render_knob(&mut canvas, &state, &config);
                        let _ = pixels.render();
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}

// ============================================================================
// WIDGET STATE & DRAG MACHINE (INTERNAL)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragPhase {
    Idle,
    Dragging,
}

/// Everything the window loop mutates: the rotation engine, the cached
/// layer geometry and the two-state drag machine. The machine transitions
/// carry only a render-layer hint; every drag sample is independent given
/// the engine's current angle.
#[derive(Debug, Clone)]
struct KnobState {
    engine: RotationEngine,
    geometry: KnobGeometry,
    drag: DragPhase,
    last_cursor: Option<(f32, f32)>,
    velocity_downscale: f32,
    padding: Padding,
}

impl KnobState {
    fn new(
        engine: RotationEngine,
        velocity_downscale: f32,
        padding: Padding,
        container_width: f32,
        container_height: f32,
    ) -> Self {
        Self {
            engine,
            geometry: compute_layout(container_width, container_height, padding),
            drag: DragPhase::Idle,
            last_cursor: None,
            velocity_downscale,
            padding,
        }
    }

    /// Recompute all four layer boxes for the new container size. The
    /// bundle is replaced as a whole so the renderer always sees a
    /// consistent nesting; the indicator transform follows immediately from
    /// the fresh indicator box on the next frame.
    fn resize(&mut self, container_width: f32, container_height: f32) {
        self.geometry = compute_layout(container_width, container_height, self.padding);
        let knob = self.geometry.knob;
        log::info!(
            "layout: container {container_width}x{container_height}, knob box ({}, {}, {}, {})",
            knob.left,
            knob.top,
            knob.right,
            knob.bottom
        );
    }

    fn begin_drag(&mut self) {
        self.drag = DragPhase::Dragging;
        log::debug!("drag begun, promoting indicator render layer");
    }

    fn end_drag(&mut self) {
        self.drag = DragPhase::Idle;
        log::debug!("drag ended, demoting indicator render layer");
    }

    /// Track the cursor until a drag is active, then turn consecutive
    /// positions into drag samples.
    fn cursor_moved(&mut self, x: f32, y: f32) {
        if self.drag == DragPhase::Dragging {
            if let Some((last_x, last_y)) = self.last_cursor {
                self.apply_drag(x - last_x, y - last_y, x, y);
            }
        }
        self.last_cursor = Some((x, y));
    }

    /// Feed one drag sample to the engine. The touch position is translated
    /// to rotation-center-relative coordinates here; the engine itself does
    /// no coordinate translation.
    fn apply_drag(&mut self, dx: f32, dy: f32, x: f32, y: f32) {
        if self.drag != DragPhase::Dragging {
            return;
        }
        let rel_x = x - self.geometry.indicator.center_x();
        let rel_y = y - self.geometry.indicator.center_y();
        let (accepted, angle) = self
            .engine
            .apply_scroll(dx, dy, rel_x, rel_y, self.velocity_downscale);
        if !accepted {
            log::trace!("drag sample absorbed at stop, angle stays {angle}");
        }
    }

    fn apply_command(&mut self, command: KnobCommand) {
        match command {
            KnobCommand::BeginDrag => self.begin_drag(),
            KnobCommand::Drag { dx, dy, x, y } => self.apply_drag(dx, dy, x, y),
            KnobCommand::EndDrag => self.end_drag(),
            KnobCommand::SetRotation(rotation) => {
                self.engine.set_rotation(rotation);
            }
        }
    }

    fn update_with_commands(&mut self, receiver: &Receiver<KnobCommand>) {
        // Drain without blocking; commands are applied in arrival order.
        while let Ok(command) = receiver.try_recv() {
            self.apply_command(command);
        }
    }
}

// ============================================================================
// RETAINED MODE ABSTRACTIONS
// ============================================================================

#[derive(Clone, Debug)]
enum DrawCommand {
    Clear((u8, u8, u8)),
    Disc {
        cx: f32,
        cy: f32,
        radius: f32,
        color: (u8, u8, u8),
    },
    Ring {
        cx: f32,
        cy: f32,
        radius: f32,
        thickness: f32,
        color: (u8, u8, u8),
    },
    Glyph {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        thickness: f32,
        color: (u8, u8, u8),
    },
}

struct Scene {
    commands: Vec<DrawCommand>,
}

impl Scene {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    fn add_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    fn render(&self, canvas: &mut Canvas) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear(color) => {
                    canvas.clear(*color);
                }
                DrawCommand::Disc {
                    cx,
                    cy,
                    radius,
                    color,
                } => {
                    draw_disc(canvas, *cx, *cy, *radius, *color);
                }
                DrawCommand::Ring {
                    cx,
                    cy,
                    radius,
                    thickness,
                    color,
                } => {
                    draw_ring(canvas, *cx, *cy, *radius, *thickness, *color);
                }
                DrawCommand::Glyph {
                    x0,
                    y0,
                    x1,
                    y1,
                    thickness,
                    color,
                } => {
                    draw_line_aa(canvas, *x0, *y0, *x1, *y1, *thickness, *color);
                }
            }
        }
    }
}

// ============================================================================
// CORE DATA TYPES
// ============================================================================

struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    fn clear(&mut self, color: (u8, u8, u8)) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.0, color.1, color.2, 0xff]);
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn render_knob(canvas: &mut Canvas, state: &KnobState, config: &KnobConfig) {
    let mut scene = Scene::new();
    scene.add_command(DrawCommand::Clear(config.window_background.as_tuple()));

    // Concentric layers, outermost first.
    let geometry = state.geometry;
    for (bounds, color) in [
        (geometry.background, config.background_color),
        (geometry.base, config.base_color),
        (geometry.knob, config.knob_color),
    ] {
        scene.add_command(DrawCommand::Disc {
            cx: bounds.center_x(),
            cy: bounds.center_y(),
            radius: bounds.radius(),
            color: color.as_tuple(),
        });
    }
    scene.add_command(DrawCommand::Ring {
        cx: geometry.background.center_x(),
        cy: geometry.background.center_y(),
        radius: geometry.background.radius(),
        thickness: config.rim_thickness,
        color: config.rim_color.as_tuple(),
    });

    // The indicator glyph rests pointing up and rotates visually as
    // 360 - angle, counter to raw angle growth.
    let render_deg = (360 - state.engine.current_angle()) as f64;
    let theta = (render_deg - 90.0).to_radians();
    let cx = geometry.indicator.center_x() as f64;
    let cy = geometry.indicator.center_y() as f64;
    let inner = geometry.indicator.radius() as f64 * config.indicator_inner_factor as f64;
    let outer = geometry.indicator.radius() as f64 * config.indicator_length_factor as f64;
    scene.add_command(DrawCommand::Glyph {
        x0: (cx + theta.cos() * inner).round() as i32,
        y0: (cy + theta.sin() * inner).round() as i32,
        x1: (cx + theta.cos() * outer).round() as i32,
        y1: (cy + theta.sin() * outer).round() as i32,
        thickness: config.indicator_width,
        color: config.indicator_color.as_tuple(),
    });

    scene.render(canvas);
}

// ============================================================================
// DRAWING PRIMITIVES
// ============================================================================

fn blend_pixel(canvas: &mut Canvas, x: i32, y: i32, color: (u8, u8, u8), alpha: f32) {
    if x < 0 || y < 0 || x >= canvas.width as i32 || y >= canvas.height as i32 {
        return;
    }
    let idx = (y as usize * canvas.width + x as usize) * 4;
    if idx + 3 >= canvas.frame.len() {
        return;
    }
    let a = alpha.clamp(0.0, 1.0);
    let src = [color.0 as f32, color.1 as f32, color.2 as f32];
    for ch in 0..3 {
        let dst = canvas.frame[idx + ch] as f32;
        canvas.frame[idx + ch] = (src[ch] * a + dst * (1.0 - a)).round() as u8;
    }
    canvas.frame[idx + 3] = 0xff;
}

fn draw_disc(canvas: &mut Canvas, cx: f32, cy: f32, radius: f32, color: (u8, u8, u8)) {
    let min_x = (cx - radius).floor() as i32 - 1;
    let max_x = (cx + radius).ceil() as i32 + 1;
    let min_y = (cy - radius).floor() as i32 - 1;
    let max_y = (cy + radius).ceil() as i32 + 1;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            let aa = (radius + 0.5 - dist).clamp(0.0, 1.0);
            if aa > 0.01 {
                blend_pixel(canvas, x, y, color, aa);
            }
        }
    }
}

fn draw_ring(
    canvas: &mut Canvas,
    cx: f32,
    cy: f32,
    radius: f32,
    thickness: f32,
    color: (u8, u8, u8),
) {
    let inner = (radius - thickness).max(0.0);
    let min_x = (cx - radius).floor() as i32 - 1;
    let max_x = (cx + radius).ceil() as i32 + 1;
    let min_y = (cy - radius).floor() as i32 - 1;
    let max_y = (cy + radius).ceil() as i32 + 1;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            let aa = (radius + 0.5 - dist).clamp(0.0, 1.0) * (dist - inner + 0.5).clamp(0.0, 1.0);
            if aa > 0.01 {
                blend_pixel(canvas, x, y, color, aa);
            }
        }
    }
}

fn draw_line_aa(
    canvas: &mut Canvas,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    thickness: f32,
    color: (u8, u8, u8),
) {
    let pad = thickness.ceil() as i32 + 1;
    let dx = (x1 - x0) as f32;
    let dy = (y1 - y0) as f32;
    let len_sq = (dx * dx + dy * dy).max(1.0);
    for y in (y0.min(y1) - pad)..=(y0.max(y1) + pad) {
        for x in (x0.min(x1) - pad)..=(x0.max(x1) + pad) {
            let px = (x - x0) as f32;
            let py = (y - y0) as f32;
            let t = ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0);
            let ox = t * dx - px;
            let oy = t * dy - py;
            let dist = (ox * ox + oy * oy).sqrt();
            let aa = (1.0 - (dist - thickness / 2.0)).clamp(0.0, 1.0);
            if aa > 0.01 {
                blend_pixel(canvas, x, y, color, aa);
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
