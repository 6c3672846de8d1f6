/// Uniform block shared by both pipelines.
const UNIFORMS: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    // xyz = camera eye, w = water clock in seconds
    eye_time: vec4<f32>,
    // xyz = direction towards the sun, w = ripple distortion scale
    sun_dir: vec4<f32>,
    water_color: vec4<f32>,
    sun_color: vec4<f32>,
    sky_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;
"#;

/// Instanced boxes for scene nodes, lit by the sun.
const NODE_BODY: &str = r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_node(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_normal = normalize(world_normal);
    out.color = instance.color;
    return out;
}

@fragment
fn fs_node(in: VertexOutput) -> @location(0) vec4<f32> {
    let sun = normalize(uniforms.sun_dir.xyz);
    let ambient = 0.45;
    let diffuse = max(dot(in.world_normal, sun), 0.0);
    let sky_fill = max(in.world_normal.y, 0.0) * 0.2;
    let lighting = ambient + diffuse * 0.6 + sky_fill;
    return vec4<f32>(in.color.rgb * lighting * uniforms.sun_color.rgb, in.color.a);
}
"#;

/// Water plane: rippled normals, fresnel sky reflection, sun glint, distance haze.
const WATER_BODY: &str = r#"
struct WaterVertex {
    @location(0) position: vec3<f32>,
};

struct WaterOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
};

@vertex
fn vs_water(vertex: WaterVertex) -> WaterOutput {
    var out: WaterOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.world_pos = vertex.position;
    return out;
}

fn ripple_normal(p: vec2<f32>, t: f32, strength: f32) -> vec3<f32> {
    let a = sin(p.x * 0.05 + t * 1.3) + sin(p.y * 0.07 - t * 0.9) + 0.5 * sin((p.x + p.y) * 0.19 + t * 2.1);
    let b = cos(p.x * 0.11 - t * 0.7) + cos(p.y * 0.13 + t * 1.1) + 0.5 * cos((p.x - p.y) * 0.23 - t * 1.7);
    return normalize(vec3<f32>(a * 0.015 * strength, 1.0, b * 0.015 * strength));
}

@fragment
fn fs_water(in: WaterOutput) -> @location(0) vec4<f32> {
    let t = uniforms.eye_time.w;
    let n = ripple_normal(in.world_pos.xz, t, uniforms.sun_dir.w);
    let to_eye = uniforms.eye_time.xyz - in.world_pos;
    let view_dir = normalize(to_eye);
    let sun = normalize(uniforms.sun_dir.xyz);

    let fresnel = 0.1 + 0.9 * pow(1.0 - max(dot(n, view_dir), 0.0), 5.0);
    let glint = pow(max(dot(reflect(-sun, n), view_dir), 0.0), 180.0);
    let base = mix(uniforms.water_color.rgb, uniforms.sky_color.rgb, fresnel);
    let color = base + uniforms.sun_color.rgb * glint * 2.0;

    let haze = clamp(length(to_eye) / 6000.0, 0.0, 1.0);
    return vec4<f32>(mix(color, uniforms.sky_color.rgb, haze * haze), 1.0);
}
"#;

pub fn node_shader() -> String {
    format!("{UNIFORMS}{NODE_BODY}")
}

pub fn water_shader() -> String {
    format!("{UNIFORMS}{WATER_BODY}")
}
