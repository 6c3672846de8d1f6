use glam::Vec3;

/// Convert a 0xRRGGBB literal to linear-ish RGB floats.
pub fn hex_color(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Atmosphere and sun placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyParams {
    /// Sun height above the horizon, in degrees.
    pub elevation_degrees: f32,
    /// Sun bearing, in degrees.
    pub azimuth_degrees: f32,
    pub turbidity: f32,
    pub rayleigh: f32,
    pub mie_coefficient: f32,
    pub mie_directional_g: f32,
    /// Radius of the sky dome.
    pub scale: f32,
}

impl Default for SkyParams {
    fn default() -> Self {
        Self {
            elevation_degrees: 2.0,
            azimuth_degrees: 180.0,
            turbidity: 10.0,
            rayleigh: 2.0,
            mie_coefficient: 0.005,
            mie_directional_g: 0.8,
            scale: 10_000.0,
        }
    }
}

impl SkyParams {
    /// Unit vector towards the sun.
    ///
    /// Spherical coordinates with polar angle measured from +Y
    /// (phi = 90 - elevation) and azimuth measured from +Z towards +X.
    pub fn sun_direction(&self) -> Vec3 {
        let phi = (90.0 - self.elevation_degrees).to_radians();
        let theta = self.azimuth_degrees.to_radians();
        Vec3::new(
            phi.sin() * theta.sin(),
            phi.cos(),
            phi.sin() * theta.cos(),
        )
        .normalize()
    }

    /// Flat sky colour for backends without a scattering shader.
    ///
    /// Blends from a warm horizon glow at low sun to a clear blue as the sun
    /// climbs; turbidity washes it towards grey and rayleigh deepens the blue.
    pub fn clear_color(&self) -> [f32; 3] {
        let height = self.sun_direction().y.clamp(0.0, 1.0);
        let t = smoothstep(0.0, 0.35, height);
        let dusk = [0.78, 0.52, 0.36];
        let day = [0.32, 0.52, 0.86];
        let mut rgb: [f32; 3] = std::array::from_fn(|i| dusk[i] + (day[i] - dusk[i]) * t);
        let blue_boost = (self.rayleigh / 4.0).clamp(0.0, 1.0) * 0.1;
        rgb[2] = (rgb[2] + blue_boost).min(1.0);
        let haze = (self.turbidity / 20.0).clamp(0.0, 1.0) * 0.3;
        let grey = (rgb[0] + rgb[1] + rgb[2]) / 3.0;
        rgb.map(|c| c + (grey - c) * haze)
    }
}

/// Water surface parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterParams {
    /// Edge length of the square water plane.
    pub size: f32,
    pub color: [f32; 3],
    pub sun_color: [f32; 3],
    pub distortion_scale: f32,
    /// Animation clock in seconds.
    pub time: f32,
}

impl Default for WaterParams {
    fn default() -> Self {
        Self {
            size: 10_000.0,
            color: hex_color(0x001e0f),
            sun_color: hex_color(0xffffff),
            distortion_scale: 3.7,
            time: 0.0,
        }
    }
}

/// Everything drawn around the entities: sky, sun and water.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Environment {
    pub sky: SkyParams,
    pub water: WaterParams,
}

impl Environment {
    /// Animation step applied once per rendered frame.
    pub const WATER_TIME_STEP: f32 = 1.0 / 60.0;

    pub fn sun_direction(&self) -> Vec3 {
        self.sky.sun_direction()
    }

    pub fn advance_frame(&mut self) {
        self.water.time += Self::WATER_TIME_STEP;
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_channels() {
        assert_eq!(hex_color(0xffffff), [1.0, 1.0, 1.0]);
        let water = hex_color(0x001e0f);
        assert_eq!(water[0], 0.0);
        assert!((water[1] - 30.0 / 255.0).abs() < 1e-6);
        assert!((water[2] - 15.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn default_sun_sits_low_behind_minus_z() {
        let sun = SkyParams::default().sun_direction();
        assert!((sun.length() - 1.0).abs() < 1e-5);
        assert!((sun.y - 2.0_f32.to_radians().sin()).abs() < 1e-5);
        assert!(sun.z < -0.99);
        assert!(sun.x.abs() < 1e-5);
    }

    #[test]
    fn overhead_sun_points_up() {
        let sky = SkyParams {
            elevation_degrees: 90.0,
            ..SkyParams::default()
        };
        assert!((sky.sun_direction() - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn low_sun_is_warmer_than_high_sun() {
        let low = SkyParams::default().clear_color();
        let high = SkyParams {
            elevation_degrees: 60.0,
            ..SkyParams::default()
        }
        .clear_color();
        assert!(low[0] > high[0]);
        assert!(high[2] > low[2]);
    }

    #[test]
    fn water_clock_advances_per_frame() {
        let mut env = Environment::default();
        for _ in 0..60 {
            env.advance_frame();
        }
        assert!((env.water.time - 1.0).abs() < 1e-4);
    }
}
