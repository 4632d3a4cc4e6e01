use std::process::ExitCode;

use anyhow::Result;
use carrier_engine::gfx::{
    BufferConfig, Color, GeometryBinding, GraphicsConfig, PassAction, Pipeline, PipelineConfig,
    Topology, UniformLocation,
};
use carrier_engine::input::{InputEvent, Key};
use carrier_engine::window::WindowConfig;
use carrier_engine::{run_app, App, ApplicationConfig, Context};

const QUAD_VERTICES: [[f32; 3]; 4] = [
    [-0.5, -0.5, 0.0],
    [0.5, -0.5, 0.0],
    [0.5, 0.5, 0.0],
    [-0.5, 0.5, 0.0],
];

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

const VERTEX_SHADER: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/quad.vert.wgsl");
const FRAGMENT_SHADER: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/quad.frag.wgsl");

/// Spinning quad. `G` toggles wireframe, `Escape` quits.
#[derive(Default)]
struct QuadDemo {
    scene: Option<Scene>,
    wireframe: bool,
}

struct Scene {
    quad: GeometryBinding,
    pipeline: Pipeline,
    mvp: UniformLocation,
    color: UniformLocation,
}

impl App for QuadDemo {
    fn on_init(&mut self, ctx: &mut Context) -> Result<()> {
        let gfx = ctx.setup_graphics(&GraphicsConfig::default())?;

        let shader = gfx.load_shader(VERTEX_SHADER, FRAGMENT_SHADER)?;
        let quad = gfx.make_buffer(&BufferConfig {
            vertex_buffer: bytemuck::cast_slice(&QUAD_VERTICES),
            index_buffer: Some(bytemuck::cast_slice(&QUAD_INDICES)),
        })?;
        let pipeline = gfx.make_pipeline(&PipelineConfig { shader, topology: Topology::Triangles });

        self.scene = Some(Scene {
            quad,
            pipeline,
            mvp: gfx.uniform_location(shader, "mvp"),
            color: gfx.uniform_location(shader, "color"),
        });

        log::info!("quad demo ready");
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut Context) -> Result<()> {
        let Some(scene) = &self.scene else {
            return Ok(());
        };

        let aspect = ctx.width().max(1) as f32 / ctx.height().max(1) as f32;
        let t = ctx.time() as f32;
        let mvp = spin(t, aspect);
        let pulse = 0.5 + 0.5 * (t * 1.5).sin();

        let gfx = ctx.gfx()?;
        gfx.begin_pass(&PassAction {
            clear_color: backdrop(t),
            ..PassAction::default()
        });
        gfx.apply_pipeline(&scene.pipeline);
        gfx.apply_bindings(&scene.quad);
        gfx.set_uniform_mat4(scene.mvp, &mvp);
        gfx.set_uniform_vec4(scene.color, &[0.9, 0.4 + 0.4 * pulse, 0.2, 1.0]);
        gfx.draw(&scene.quad, 0, QUAD_INDICES.len() as u32, 1);
        gfx.end_pass();
        gfx.commit()?;
        Ok(())
    }

    fn on_cleanup(&mut self, ctx: &mut Context) {
        self.scene = None;
        ctx.shutdown_graphics();
    }

    fn on_event(&mut self, ctx: &mut Context, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(k) if k.key == Key::Escape => ctx.request_close(true),
            InputEvent::KeyDown(k) if k.key == Key::G => {
                self.wireframe = !self.wireframe;
                if let Ok(gfx) = ctx.gfx() {
                    gfx.set_wireframe(self.wireframe);
                }
            }
            InputEvent::Resize { width, height } => {
                log::debug!("resized to {width}x{height}");
            }
            _ => {}
        }
    }
}

const ANTHRACITE: Color = Color::rgba(0.1, 0.1, 0.1, 1.0);
const DARK_BLUE: Color = Color::rgba(0.0, 0.0, 0.3, 1.0);

/// Clear colour drifting between anthracite and dark blue.
fn backdrop(t: f32) -> Color {
    let k = 0.5 + 0.5 * (t * 0.5).sin();
    let mix = |a: f32, b: f32| a * (1.0 - k) + b * k;
    Color::rgba(
        mix(ANTHRACITE.r, DARK_BLUE.r),
        mix(ANTHRACITE.g, DARK_BLUE.g),
        mix(ANTHRACITE.b, DARK_BLUE.b),
        1.0,
    )
}

/// Column-major rotation about Z, x scaled by `1 / aspect`.
#[rustfmt::skip]
fn spin(t: f32, aspect: f32) -> [f32; 16] {
    let (s, c) = t.sin_cos();
    let sx = 1.0 / aspect;
    [
        c * sx, s, 0.0, 0.0,
        -s * sx, c, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ]
}

fn build_config() -> ApplicationConfig {
    let window = WindowConfig::default()
        .with_size(960, 640)
        .with_title("carrier quad");
    ApplicationConfig::new(window, QuadDemo::default())
}

fn main() -> ExitCode {
    run_app(build_config())
}
