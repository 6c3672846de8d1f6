use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use driftwood_assets::{ModelLoader, PrimitiveLoader, ThreadedLoader};
use driftwood_input::{ControlState, Direction, KeyEvent as SteerEvent};
use driftwood_kernel::{GameConfig, GameEvent, GameState, Phase};
use driftwood_render::Environment;
use driftwood_render_wgpu::{OrbitCamera, WgpuRenderer};

const EVENT_LINES: usize = 8;

#[derive(Parser)]
#[command(name = "driftwood-desktop", about = "Sail a boat around and collect floating trash")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML game configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Trash placement seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of trash pieces
    #[arg(long)]
    trash_count: Option<usize>,

    /// Use placeholder boxes instead of loading model files
    #[arg(long)]
    primitives: bool,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => GameConfig::default(),
        };
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(count) = self.trash_count {
            config.trash_count = count;
        }
        Ok(config)
    }
}

fn steering_key(key: KeyCode) -> Option<Direction> {
    match key {
        KeyCode::ArrowUp => Some(Direction::Forward),
        KeyCode::ArrowDown => Some(Direction::Backward),
        KeyCode::ArrowLeft => Some(Direction::Left),
        KeyCode::ArrowRight => Some(Direction::Right),
        _ => None,
    }
}

/// Application state.
struct AppState {
    game: GameState,
    controls: ControlState,
    camera: OrbitCamera,
    environment: Environment,
    show_hud: bool,
    dragging: bool,
    recent: VecDeque<String>,
    last_frame: Instant,
}

impl AppState {
    fn new(config: GameConfig, loader: &dyn ModelLoader) -> Result<Self> {
        Ok(Self {
            game: GameState::new(config, loader)?,
            controls: ControlState::new(),
            camera: OrbitCamera::default(),
            environment: Environment::default(),
            show_hud: true,
            dragging: false,
            recent: VecDeque::with_capacity(EVENT_LINES),
            last_frame: Instant::now(),
        })
    }

    /// Track the orbit drag. A release always ends it, even when the UI
    /// took the event; presses over the UI never start one.
    fn mouse_button(&mut self, button: MouseButton, state: ElementState, ui_consumed: bool) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Released => self.dragging = false,
            ElementState::Pressed if !ui_consumed => self.dragging = true,
            ElementState::Pressed => {}
        }
    }

    /// Advance the game by the wall-clock time since the previous frame.
    fn update(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.game.frame(dt, &self.controls.snapshot());
        self.environment.advance_frame();

        for event in self.game.drain_events() {
            tracing::debug!(?event, "game event");
            let line = match event {
                GameEvent::BoatLaunched { node } => format!("boat launched [{}]", node.short()),
                GameEvent::TrashSpawned { .. } => continue,
                GameEvent::TrashCollected { node, tick } => {
                    format!("collected [{}] at tick {tick}", node.short())
                }
                GameEvent::LoadFailed { path, reason } => {
                    format!("failed to load {}: {reason}", path.display())
                }
                GameEvent::PhaseChanged { phase } => format!("phase: {phase:?}"),
            };
            if self.recent.len() == EVENT_LINES {
                self.recent.pop_front();
            }
            self.recent.push_back(line);
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if !pressed {
            self.controls.apply(SteerEvent::Released(steering_key(key)));
            return;
        }
        if let Some(direction) = steering_key(key) {
            self.controls.apply(SteerEvent::Pressed(direction));
            return;
        }
        if key == KeyCode::F1 {
            self.show_hud = !self.show_hud;
        }
    }

    fn draw_ui(&self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }

        let game = &self.game;
        egui::Window::new("Driftwood")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                let phase = match game.phase() {
                    Phase::Loading => "loading models...",
                    Phase::Running => "running",
                };
                ui.label(format!("Phase: {phase}"));
                ui.label(format!(
                    "Trash: {} collected / {} total",
                    game.collected(),
                    game.trash().len()
                ));
                let boat = game.boat();
                ui.label(format!(
                    "Boat: ({:.1}, {:.1}, {:.1}) heading {:.2}",
                    boat.position.x, boat.position.y, boat.position.z, boat.heading
                ));
                ui.label(format!("Tick: {}", game.tick()));

                for (path, reason) in game.load_failures() {
                    ui.colored_label(
                        egui::Color32::RED,
                        format!("{}: {reason}", path.display()),
                    );
                }

                if !self.recent.is_empty() {
                    ui.separator();
                    for line in &self.recent {
                        ui.small(line);
                    }
                }

                ui.separator();
                ui.small("Arrows: steer | LMB drag: orbit | Wheel: zoom | F1: HUD");
            });
    }
}

/// Surface, device and renderers, created once the window exists.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        egui_ctx: &EguiContext,
        environment: &Environment,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Driftwood")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("driftwood_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            config.width,
            config.height,
            environment.water.size,
        );

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            format = ?surface_format,
            "GPU initialized"
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn draw(&mut self, state: &AppState, egui_ctx: &EguiContext) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.render(
            &self.device,
            &self.queue,
            &view,
            &state.camera,
            state.game.scene(),
            &state.environment,
        );

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| state.draw_ui(ctx));
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("hud_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("hud_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx, &self.state.environment) {
            Ok(gpu) => {
                self.state
                    .camera
                    .set_viewport(gpu.config.width, gpu.config.height);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let consumed = gpu.egui_winit.on_window_event(&gpu.window, &event).consumed;
        if let WindowEvent::MouseInput { button, state, .. } = event {
            self.state.mouse_button(button, state, consumed);
        }
        if consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size.width, new_size.height);
                self.state
                    .camera
                    .set_viewport(gpu.config.width, gpu.config.height);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 40.0,
                };
                self.state.camera.zoom(lines);
            }
            WindowEvent::RedrawRequested => {
                self.state.update();
                gpu.draw(&self.state, &self.egui_ctx);
                gpu.window.request_redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.dragging {
                self.state.camera.rotate(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = cli.game_config()?;
    tracing::info!(
        trash = config.trash_count,
        seed = ?config.seed,
        primitives = cli.primitives,
        "driftwood-desktop starting"
    );

    let loader: Box<dyn ModelLoader> = if cli.primitives {
        Box::new(PrimitiveLoader::default())
    } else {
        Box::new(ThreadedLoader::new())
    };
    let state = AppState::new(config, loader.as_ref())?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> AppState {
        let config = GameConfig {
            seed: Some(1),
            ..GameConfig::default()
        };
        AppState::new(config, &PrimitiveLoader::default()).unwrap()
    }

    #[test]
    fn release_over_ui_ends_drag() {
        let mut app = app();
        app.mouse_button(MouseButton::Left, ElementState::Pressed, false);
        assert!(app.dragging);
        app.mouse_button(MouseButton::Left, ElementState::Released, true);
        assert!(!app.dragging);
    }

    #[test]
    fn press_over_ui_does_not_start_drag() {
        let mut app = app();
        app.mouse_button(MouseButton::Left, ElementState::Pressed, true);
        assert!(!app.dragging);
        app.mouse_button(MouseButton::Right, ElementState::Pressed, false);
        assert!(!app.dragging);
    }

    #[test]
    fn invalid_config_fails_startup() {
        let mut config = GameConfig::default();
        config.trash.near_probability = 1.5;
        assert!(AppState::new(config, &PrimitiveLoader::default()).is_err());
    }
}
