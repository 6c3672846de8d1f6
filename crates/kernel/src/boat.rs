use glam::Vec3;

use driftwood_common::{Transform, heading_forward};
use driftwood_input::Axis;

use crate::config::BoatConfig;

/// Length of one reference frame in seconds. Boat speeds are per frame.
pub const REFERENCE_FRAME: f32 = 1.0 / 60.0;

/// The player's boat.
///
/// Moves along its own heading: no drift, no inertia. Throttle and rudder
/// take effect immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct Boat {
    pub position: Vec3,
    /// Radians about +Y.
    pub heading: f32,
    pub scale: f32,
    /// Units per reference frame along the heading.
    pub velocity: f32,
    /// Radians per reference frame.
    pub angular_velocity: f32,
    forward_speed: f32,
    turn_rate: f32,
}

impl Boat {
    pub fn new(config: &BoatConfig) -> Self {
        Self {
            position: config.start_position,
            heading: config.start_heading,
            scale: config.scale,
            velocity: 0.0,
            angular_velocity: 0.0,
            forward_speed: config.forward_speed,
            turn_rate: config.turn_rate,
        }
    }

    /// Set throttle and rudder from a pair of discrete intents.
    pub fn set_control(&mut self, forward: Axis, turn: Axis) {
        self.velocity = forward.value() * self.forward_speed;
        self.angular_velocity = turn.value() * self.turn_rate;
    }

    pub fn stop(&mut self) {
        self.velocity = 0.0;
        self.angular_velocity = 0.0;
    }

    /// Advance by `dt` seconds: turn first, then move along the new heading.
    pub fn update(&mut self, dt: f32) {
        let frames = dt / REFERENCE_FRAME;
        self.heading += self.angular_velocity * frames;
        self.position += self.forward() * self.velocity * frames;
    }

    pub fn forward(&self) -> Vec3 {
        heading_forward(self.heading)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_heading(self.position, self.heading, self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boat_at(position: Vec3, heading: f32) -> Boat {
        Boat::new(&BoatConfig {
            start_position: position,
            start_heading: heading,
            ..BoatConfig::default()
        })
    }

    #[test]
    fn starts_at_configured_pose_and_still() {
        let boat = Boat::new(&BoatConfig::default());
        assert_eq!(boat.position, Vec3::new(5.0, 13.0, 50.0));
        assert_eq!(boat.heading, 1.5);
        assert_eq!(boat.velocity, 0.0);
        assert_eq!(boat.angular_velocity, 0.0);
    }

    #[test]
    fn control_mapping() {
        let mut boat = Boat::new(&BoatConfig::default());
        boat.set_control(Axis::Positive, Axis::Neutral);
        assert_eq!(boat.velocity, 1.0);
        boat.set_control(Axis::Negative, Axis::Positive);
        assert_eq!(boat.velocity, -1.0);
        assert!((boat.angular_velocity - 0.1).abs() < 1e-7);
        boat.set_control(Axis::Neutral, Axis::Negative);
        assert!((boat.angular_velocity + 0.1).abs() < 1e-7);

        boat.stop();
        assert_eq!(boat.velocity, 0.0);
        assert_eq!(boat.angular_velocity, 0.0);
    }

    #[test]
    fn one_frame_moves_one_unit_along_heading() {
        let mut boat = boat_at(Vec3::new(0.0, 13.0, 50.0), 1.5);
        boat.velocity = 1.0;
        boat.update(REFERENCE_FRAME);

        assert_eq!(boat.heading, 1.5);
        let delta = boat.position - Vec3::new(0.0, 13.0, 50.0);
        assert!((delta.length() - 1.0).abs() < 1e-5);
        assert!((delta - heading_forward(1.5)).length() < 1e-5);
        assert!((boat.position.y - 13.0).abs() < 1e-6);
    }

    #[test]
    fn speed_does_not_depend_on_heading() {
        for i in 0..64 {
            let heading = i as f32 * 0.1 - 3.2;
            for v in [-1.0_f32, -0.25, 0.5, 1.0, 3.0] {
                let start = Vec3::new(10.0, 0.0, -4.0);
                let mut boat = boat_at(start, heading);
                boat.velocity = v;
                boat.update(REFERENCE_FRAME);
                let moved = (boat.position - start).length();
                assert!(
                    (moved - v.abs()).abs() < 1e-4,
                    "heading {heading} v {v}: moved {moved}"
                );
            }
        }
    }

    #[test]
    fn turns_before_moving() {
        let mut boat = boat_at(Vec3::ZERO, 0.0);
        boat.velocity = 1.0;
        boat.angular_velocity = std::f32::consts::FRAC_PI_2;
        boat.update(REFERENCE_FRAME);
        assert!((boat.position - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn update_scales_with_elapsed_time() {
        let mut a = boat_at(Vec3::ZERO, 0.3);
        let mut b = a.clone();
        a.velocity = 1.0;
        b.velocity = 1.0;
        a.update(REFERENCE_FRAME * 2.0);
        b.update(REFERENCE_FRAME);
        b.update(REFERENCE_FRAME);
        assert!((a.position - b.position).length() < 1e-5);
    }

    #[test]
    fn stopped_boat_stays_put() {
        let mut boat = Boat::new(&BoatConfig::default());
        let before = boat.clone();
        boat.update(REFERENCE_FRAME);
        assert_eq!(boat, before);
    }

    #[test]
    fn transform_carries_heading_and_scale() {
        let boat = Boat::new(&BoatConfig::default());
        let t = boat.transform();
        assert_eq!(t.position, boat.position);
        assert_eq!(t.scale, Vec3::splat(3.0));
        assert!((t.rotation * Vec3::X - boat.forward()).length() < 1e-6);
    }
}
