//! Optional lens post-processing.
//!
//! The graph is always drawn into the visible canvas with a 2D context. When
//! WebGL is available, each finished frame is uploaded as a texture to an
//! offscreen WebGL canvas, run through a fragment shader that blurs and
//! splits color channels with distance from a focal point, and composited
//! back over the frame. If the WebGL context is lost the unfiltered frame
//! simply stays on screen; the pipeline is rebuilt once the browser restores
//! the context. Nothing here feeds back into physics or hit-testing.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
	Document, HtmlCanvasElement, WebGlBuffer, WebGlProgram, WebGlRenderingContext as Gl,
	WebGlShader, WebGlTexture, WebGlUniformLocation,
};

use super::ticker::ListenerHandle;

/// Per-frame lens inputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LensParams {
	/// Focal point in texture coordinates, `0..=1` on both axes.
	pub focus: (f64, f64),
	/// Blur radius in device pixels.
	pub radius: f64,
	/// Normalized system energy.
	pub energy: f64,
	/// Seconds, drives the grain.
	pub time: f64,
	/// Frame size in device pixels.
	pub resolution: (f64, f64),
}

impl LensParams {
	/// Lens for the current frame. The focus follows the pointer while it is
	/// over the canvas and sits in the middle otherwise.
	pub fn from_frame(
		energy: f64,
		pointer: Option<(f64, f64)>,
		width: f64,
		height: f64,
		dpr: f64,
		time: f64,
	) -> Self {
		let energy = energy.clamp(0.0, 1.0);
		let (w, h) = (width.max(1.0), height.max(1.0));
		let focus = pointer
			.map(|(x, y)| ((x / w).clamp(0.0, 1.0), (y / h).clamp(0.0, 1.0)))
			.unwrap_or((0.5, 0.5));
		Self {
			focus,
			radius: (60.0 + energy * 80.0) * dpr,
			energy,
			time,
			resolution: (w * dpr, h * dpr),
		}
	}
}

/// A post-processing stage between the 2D renderer and the screen.
pub trait PostProcess {
	/// Short name for logs.
	fn name(&self) -> &'static str;

	/// Filters the finished `frame`. Returns the canvas holding the filtered
	/// image, or `None` when the frame should be shown as rendered.
	fn apply(&mut self, frame: &HtmlCanvasElement, params: &LensParams)
	-> Option<&HtmlCanvasElement>;

	/// Whether frames are currently being filtered.
	fn is_active(&self) -> bool;
}

/// No-op stage used when WebGL is unavailable.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough;

impl PostProcess for Passthrough {
	fn name(&self) -> &'static str {
		"passthrough"
	}

	fn apply(
		&mut self,
		_frame: &HtmlCanvasElement,
		_params: &LensParams,
	) -> Option<&HtmlCanvasElement> {
		None
	}

	fn is_active(&self) -> bool {
		false
	}
}

const VERTEX_SHADER: &str = r#"
attribute vec2 position;
varying vec2 vUv;
void main() {
	vUv = position * 0.5 + 0.5;
	vUv.y = 1.0 - vUv.y;
	gl_Position = vec4(position, 0.0, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"
precision highp float;
varying vec2 vUv;
uniform sampler2D uTexture;
uniform vec2 uResolution;
uniform vec2 uFocus;
uniform float uRadius;
uniform float uEnergy;
uniform float uTime;

float hash(vec2 p) {
	return fract(sin(dot(p, vec2(12.9898, 78.233))) * 43758.5453);
}

void main() {
	float dist = distance(vUv, uFocus);
	float blur = smoothstep(0.12, 0.55, dist) * uRadius;
	if (blur < 0.2) {
		gl_FragColor = texture2D(uTexture, vUv);
		return;
	}

	const int TAPS = 40;
	const float GOLDEN = 2.39996;
	float spin = hash(vUv) * 6.2831;
	float split = 1.0 + uEnergy * 0.15 * (blur / uRadius);
	vec3 sum = vec3(0.0);
	for (int i = 0; i < TAPS; i++) {
		float r = sqrt(float(i) / float(TAPS)) * blur;
		float theta = float(i) * GOLDEN + spin;
		vec2 offset = vec2(cos(theta), sin(theta)) * r / uResolution;
		sum.r += texture2D(uTexture, vUv + offset * split).r;
		sum.g += texture2D(uTexture, vUv + offset).g;
		sum.b += texture2D(uTexture, vUv + offset / split).b;
	}
	vec3 color = sum / float(TAPS);
	color += (hash(vUv + fract(uTime)) - 0.5) * 0.05 * (blur / uRadius);
	color *= 1.0 - smoothstep(0.4, 0.8, dist) * 0.1;
	gl_FragColor = vec4(color, 1.0);
}
"#;

/// Full-screen quad, two triangles.
const QUAD: [f32; 12] = [
	-1.0, -1.0, 1.0, -1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0, 1.0,
];

struct Uniforms {
	resolution: Option<WebGlUniformLocation>,
	focus: Option<WebGlUniformLocation>,
	radius: Option<WebGlUniformLocation>,
	energy: Option<WebGlUniformLocation>,
	time: Option<WebGlUniformLocation>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ContextStatus {
	Ready,
	Lost,
	Restored,
}

/// What the lens does with the next frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LensStep {
	Present,
	Skip,
	Rebuild,
}

/// WebGL context status, shared with the context event listeners.
#[derive(Clone, Debug)]
struct ContextWatch {
	status: Rc<Cell<ContextStatus>>,
}

impl ContextWatch {
	fn new() -> Self {
		Self {
			status: Rc::new(Cell::new(ContextStatus::Ready)),
		}
	}

	fn mark_lost(&self) {
		self.status.set(ContextStatus::Lost);
	}

	fn mark_restored(&self) {
		self.status.set(ContextStatus::Restored);
	}

	fn is_ready(&self) -> bool {
		self.status.get() == ContextStatus::Ready
	}

	/// Consumes a pending restore, so the rebuild happens exactly once.
	fn next_step(&self) -> LensStep {
		match self.status.get() {
			ContextStatus::Ready => LensStep::Present,
			ContextStatus::Lost => LensStep::Skip,
			ContextStatus::Restored => {
				self.status.set(ContextStatus::Ready);
				LensStep::Rebuild
			}
		}
	}
}

/// GL objects of the lens. All of them die with the context.
struct Pipeline {
	gl: Gl,
	program: WebGlProgram,
	texture: WebGlTexture,
	buffer: WebGlBuffer,
	position: u32,
	uniforms: Uniforms,
}

impl Pipeline {
	fn build(gl: Gl) -> Result<Self> {
		let program = link_program(&gl)?;

		let buffer = gl
			.create_buffer()
			.ok_or_else(|| anyhow!("unable to create vertex buffer"))?;
		gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
		let vertices = js_sys::Float32Array::from(&QUAD[..]);
		gl.buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &vertices, Gl::STATIC_DRAW);

		let texture = gl
			.create_texture()
			.ok_or_else(|| anyhow!("unable to create texture"))?;
		gl.bind_texture(Gl::TEXTURE_2D, Some(&texture));
		for (param, value) in [
			(Gl::TEXTURE_WRAP_S, Gl::CLAMP_TO_EDGE),
			(Gl::TEXTURE_WRAP_T, Gl::CLAMP_TO_EDGE),
			(Gl::TEXTURE_MIN_FILTER, Gl::LINEAR),
			(Gl::TEXTURE_MAG_FILTER, Gl::LINEAR),
		] {
			gl.tex_parameteri(Gl::TEXTURE_2D, param, value as i32);
		}

		let position = u32::try_from(gl.get_attrib_location(&program, "position"))
			.map_err(|_| anyhow!("shader has no position attribute"))?;
		let uniforms = Uniforms {
			resolution: gl.get_uniform_location(&program, "uResolution"),
			focus: gl.get_uniform_location(&program, "uFocus"),
			radius: gl.get_uniform_location(&program, "uRadius"),
			energy: gl.get_uniform_location(&program, "uEnergy"),
			time: gl.get_uniform_location(&program, "uTime"),
		};

		Ok(Self {
			gl,
			program,
			texture,
			buffer,
			position,
			uniforms,
		})
	}

	fn draw(&self, frame: &HtmlCanvasElement, params: &LensParams) -> Result<(), JsValue> {
		let gl = &self.gl;
		gl.viewport(0, 0, frame.width() as i32, frame.height() as i32);
		gl.use_program(Some(&self.program));
		gl.bind_texture(Gl::TEXTURE_2D, Some(&self.texture));
		gl.tex_image_2d_with_u32_and_u32_and_canvas(
			Gl::TEXTURE_2D,
			0,
			Gl::RGBA as i32,
			Gl::RGBA,
			Gl::UNSIGNED_BYTE,
			frame,
		)?;

		let u = &self.uniforms;
		gl.uniform2f(
			u.resolution.as_ref(),
			params.resolution.0 as f32,
			params.resolution.1 as f32,
		);
		gl.uniform2f(u.focus.as_ref(), params.focus.0 as f32, params.focus.1 as f32);
		gl.uniform1f(u.radius.as_ref(), params.radius as f32);
		gl.uniform1f(u.energy.as_ref(), params.energy as f32);
		gl.uniform1f(u.time.as_ref(), params.time as f32);

		gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&self.buffer));
		gl.enable_vertex_attrib_array(self.position);
		gl.vertex_attrib_pointer_with_i32(self.position, 2, Gl::FLOAT, false, 0, 0);
		gl.draw_arrays(Gl::TRIANGLES, 0, 6);
		Ok(())
	}
}

/// WebGL lens blur drawn on its own offscreen canvas.
pub struct LensBlur {
	output: HtmlCanvasElement,
	pipeline: Option<Pipeline>,
	watch: ContextWatch,
	upload_failed: bool,
	_listeners: Vec<ListenerHandle>,
}

fn webgl_context(canvas: &HtmlCanvasElement) -> Result<Gl> {
	canvas
		.get_context("webgl")
		.map_err(|e| anyhow!("getContext(\"webgl\") threw: {e:?}"))?
		.ok_or_else(|| anyhow!("webgl is not available"))?
		.dyn_into::<Gl>()
		.map_err(|_| anyhow!("context is not a WebGlRenderingContext"))
}

fn compile_shader(gl: &Gl, kind: u32, source: &str) -> Result<WebGlShader> {
	let shader = gl
		.create_shader(kind)
		.ok_or_else(|| anyhow!("unable to create shader"))?;
	gl.shader_source(&shader, source);
	gl.compile_shader(&shader);
	if gl
		.get_shader_parameter(&shader, Gl::COMPILE_STATUS)
		.as_bool()
		.unwrap_or(false)
	{
		Ok(shader)
	} else {
		let log = gl.get_shader_info_log(&shader).unwrap_or_default();
		gl.delete_shader(Some(&shader));
		bail!("shader compilation failed: {log}")
	}
}

fn link_program(gl: &Gl) -> Result<WebGlProgram> {
	let vertex = compile_shader(gl, Gl::VERTEX_SHADER, VERTEX_SHADER).context("vertex shader")?;
	let fragment =
		compile_shader(gl, Gl::FRAGMENT_SHADER, FRAGMENT_SHADER).context("fragment shader")?;
	let program = gl
		.create_program()
		.ok_or_else(|| anyhow!("unable to create program"))?;
	gl.attach_shader(&program, &vertex);
	gl.attach_shader(&program, &fragment);
	gl.link_program(&program);
	if gl
		.get_program_parameter(&program, Gl::LINK_STATUS)
		.as_bool()
		.unwrap_or(false)
	{
		Ok(program)
	} else {
		bail!(
			"program link failed: {}",
			gl.get_program_info_log(&program).unwrap_or_default()
		)
	}
}

fn create_canvas(document: &Document) -> Result<HtmlCanvasElement> {
	document
		.create_element("canvas")
		.map_err(|e| anyhow!("createElement(\"canvas\") threw: {e:?}"))?
		.dyn_into::<HtmlCanvasElement>()
		.map_err(|_| anyhow!("created element is not a canvas"))
}

impl LensBlur {
	/// Builds the shader pipeline on a fresh canvas and starts watching its
	/// context. Fails when WebGL or the shader is unavailable.
	pub fn new(document: &Document) -> Result<Self> {
		let output = create_canvas(document)?;
		let gl = webgl_context(&output).context("creating lens canvas")?;
		let pipeline = Pipeline::build(gl).context("building lens shader")?;

		let watch = ContextWatch::new();
		let mut listeners = Vec::new();
		let on_lost = watch.clone();
		listeners.extend(ListenerHandle::new(
			&output,
			"webglcontextlost",
			move |ev| {
				// Without this the browser never restores the context.
				ev.prevent_default();
				warn!("skills-graph: webgl context lost, drawing unfiltered");
				on_lost.mark_lost();
			},
		));
		let on_restored = watch.clone();
		listeners.extend(ListenerHandle::new(
			&output,
			"webglcontextrestored",
			move |_| {
				debug!("skills-graph: webgl context restored");
				on_restored.mark_restored();
			},
		));
		debug!("skills-graph: lens post-processing enabled");

		Ok(Self {
			output,
			pipeline: Some(pipeline),
			watch,
			upload_failed: false,
			_listeners: listeners,
		})
	}

	fn rebuild(&mut self) {
		self.pipeline = match webgl_context(&self.output).and_then(Pipeline::build) {
			Ok(pipeline) => {
				debug!("skills-graph: lens rebuilt");
				Some(pipeline)
			}
			Err(e) => {
				warn!("skills-graph: lens not rebuilt, drawing unfiltered: {e:#}");
				None
			}
		};
		self.upload_failed = false;
	}
}

impl PostProcess for LensBlur {
	fn name(&self) -> &'static str {
		"lens-blur"
	}

	fn apply(
		&mut self,
		frame: &HtmlCanvasElement,
		params: &LensParams,
	) -> Option<&HtmlCanvasElement> {
		match self.watch.next_step() {
			LensStep::Skip => return None,
			LensStep::Rebuild => self.rebuild(),
			LensStep::Present => {}
		}
		let pipeline = self.pipeline.as_ref()?;
		if pipeline.gl.is_context_lost() {
			self.watch.mark_lost();
			return None;
		}

		if self.output.width() != frame.width() || self.output.height() != frame.height() {
			self.output.set_width(frame.width());
			self.output.set_height(frame.height());
		}
		if let Err(e) = pipeline.draw(frame, params) {
			if !self.upload_failed {
				warn!("skills-graph: lens frame failed: {e:?}");
				self.upload_failed = true;
			}
			return None;
		}
		Some(&self.output)
	}

	fn is_active(&self) -> bool {
		self.pipeline.is_some() && self.watch.is_ready()
	}
}
