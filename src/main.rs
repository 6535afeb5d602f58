use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    error::EventLoopError,
    event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;

mod assets;
mod audio;
mod config;
mod math;
mod particles;
mod renderer;
mod scene;
mod ui;

use assets::{CachedModelLoader, FileModelLoader};
use audio::MusicPlayer;
use config::AppConfig;
use renderer::{Camera, GpuState};
use scene::{DrawList, Scene, SceneContext, SceneKind};
use ui::{FrameStats, UiActions, UiState, apply_theme, draw_help_overlay, draw_side_panel};

/// Longest frame the camera integrates in one go.
const MAX_CAMERA_DT: f32 = 0.1;

#[derive(Default)]
struct InputState {
    dragging: bool,
    drag_delta: Vec2,
}

struct App {
    config: AppConfig,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    egui_ctx: egui::Context,

    camera: Camera,
    scene_ctx: SceneContext,
    scene: Scene,
    draw_list: DrawList,
    rng: StdRng,
    music: MusicPlayer,
    ui_state: UiState,
    input: InputState,
    stats: FrameStats,

    last_frame: Instant,
    frame_count: u32,
    fps_timer: Instant,

    last_vsync_state: bool,
    fatal: bool,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!("particle seed: {seed}");
        let mut rng = StdRng::seed_from_u64(seed);

        let scene_ctx = SceneContext {
            assets: config.assets.clone(),
            viewer_model: config.viewer_model.clone(),
            loader: Arc::new(CachedModelLoader::new(FileModelLoader)),
        };
        let scene = Scene::build(config.scene, &scene_ctx, &mut rng);

        let mut camera = Camera::default();
        camera.apply_preset(&config.scene.camera());

        let ui_state = UiState {
            scene: config.scene,
            vsync_enabled: config.vsync,
            ..UiState::default()
        };

        Self {
            last_vsync_state: config.vsync,
            config,

            window: None,
            gpu: None,
            egui_state: None,
            egui_renderer: None,
            egui_ctx: egui::Context::default(),

            camera,
            scene_ctx,
            scene,
            draw_list: DrawList::default(),
            rng,
            music: MusicPlayer::new(),
            ui_state,
            input: InputState::default(),
            stats: FrameStats::default(),

            last_frame: Instant::now(),
            frame_count: 0,
            fps_timer: Instant::now(),

            fatal: false,
        }
    }

    fn init_gpu(&mut self, window: Arc<Window>) -> Result<(), renderer::RenderError> {
        let gpu = pollster::block_on(GpuState::new(window.clone(), self.config.vsync))?;

        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            self.egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2048),
        );

        let egui_renderer =
            egui_wgpu::Renderer::new(&gpu.device, gpu.config.format, None, 1, false);

        apply_theme(&self.egui_ctx);

        let size = window.inner_size();
        self.camera.set_aspect(size.width as f32, size.height as f32);

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn switch_scene(&mut self, kind: SceneKind) {
        if self.scene.kind() == kind {
            return;
        }
        self.scene = Scene::build(kind, &self.scene_ctx, &mut self.rng);
        self.ui_state.scene = kind;
        self.camera.apply_preset(&kind.camera());
        if let Some(gpu) = &mut self.gpu {
            gpu.clear_meshes();
        }
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.frame_count += 1;
        let window_secs = self.fps_timer.elapsed().as_secs_f32();
        if window_secs >= 1.0 {
            self.stats.fps = self.frame_count as f32 / window_secs;
            self.stats.frame_ms = window_secs * 1000.0 / self.frame_count as f32;
            self.frame_count = 0;
            self.fps_timer = Instant::now();
        }

        self.camera.auto_rotate = self.ui_state.auto_rotate;
        if self.input.dragging {
            self.camera.process_mouse_movement(self.input.drag_delta);
        }
        self.input.drag_delta = Vec2::ZERO;
        self.camera.update(dt.min(MAX_CAMERA_DT));

        self.scene.update(dt, &mut self.rng);
        self.scene.draw(&mut self.draw_list);

        self.stats.particles = self.draw_list.particles.len();
        self.stats.mesh_draws = self.draw_list.meshes.len();
        self.stats.meshes = self.scene.library().len();
    }

    fn render(&mut self) {
        let (Some(window), Some(egui_state)) = (&self.window, &mut self.egui_state) else {
            return;
        };

        let raw_input = egui_state.take_egui_input(window);

        let stats = self.stats;
        let status = self.scene.status().cloned();
        let mut ui_actions = UiActions::default();

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            ui_actions = draw_side_panel(ctx, &mut self.ui_state, &stats, status.as_ref());
            if self.ui_state.show_help {
                draw_help_overlay(ctx);
            }
        });

        self.handle_ui_actions(ui_actions);

        let Some(gpu) = &mut self.gpu else { return };
        let Some(window) = &self.window else { return };
        let Some(egui_state) = &mut self.egui_state else {
            return;
        };
        let Some(egui_renderer) = &mut self.egui_renderer else {
            return;
        };

        egui_state.handle_platform_output(window, full_output.platform_output);

        if self.ui_state.vsync_enabled != self.last_vsync_state {
            gpu.set_vsync(self.ui_state.vsync_enabled);
            self.last_vsync_state = self.ui_state.vsync_enabled;
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.resize(gpu.size);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory");
                self.fatal = true;
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let kind = self.scene.kind();
        gpu.sync_meshes(self.scene.library());
        gpu.update_camera(&self.camera);
        gpu.update_environment(&kind.lighting(), &kind.background(self.ui_state.background));

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, delta) in full_output.textures_delta.set {
            egui_renderer.update_texture(&gpu.device, &gpu.queue, id, &delta);
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Main Encoder"),
            });

        egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        gpu.render_scene(&view, &mut encoder, &self.draw_list);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in full_output.textures_delta.free {
            egui_renderer.free_texture(&id);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        window.request_redraw();
    }

    fn handle_ui_actions(&mut self, actions: UiActions) {
        if let Some(kind) = actions.switch_scene {
            self.switch_scene(kind);
        }

        if actions.toggle_music {
            self.ui_state.music_enabled = self.music.toggle();
        }

        if actions.reset_camera {
            self.camera.apply_preset(&self.scene.kind().camera());
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Digit1 => self.switch_scene(SceneKind::Heart),
            KeyCode::Digit2 => self.switch_scene(SceneKind::HeartTrail),
            KeyCode::Digit3 => self.switch_scene(SceneKind::PetalTunnel),
            KeyCode::Digit4 => self.switch_scene(SceneKind::Viewer),
            KeyCode::KeyR => self.ui_state.auto_rotate = !self.ui_state.auto_rotate,
            KeyCode::KeyB => self.ui_state.cycle_background(),
            KeyCode::KeyM => self.ui_state.music_enabled = self.music.toggle(),
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("heart3d")
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.init_gpu(window) {
            log::error!("failed to initialise renderer: {e}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(egui_state) = &mut self.egui_state {
            if let Some(window) = &self.window {
                let response = egui_state.on_window_event(window, &event);
                if response.consumed {
                    return;
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                    self.camera
                        .set_aspect(size.width as f32, size.height as f32);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(key) = event.physical_key {
                        self.handle_key(key);
                    }
                }
            }

            WindowEvent::MouseInput {
                button: MouseButton::Left | MouseButton::Right,
                state,
                ..
            } => {
                self.input.dragging = state == ElementState::Pressed;
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.camera.process_scroll(scroll);
            }

            WindowEvent::RedrawRequested => {
                self.update();
                self.render();
                if self.fatal {
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: winit::event::DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.input.dragging {
                self.input.drag_delta.x += delta.0 as f32;
                self.input.drag_delta.y += delta.1 as f32;
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<(), EventLoopError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::parse();
    log::info!("starting with scene {}", config.scene.label());

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)
}
