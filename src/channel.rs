use kurbo::Vec2;

use crate::error::{RenderError, RenderResult};

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for f32 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        (*a as f64 + ((*b as f64 - *a as f64) * t)) as f32
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

/// Rotation value in radians. Interpolates along the shortest arc, so a
/// channel keyed at 350° and 10° sweeps through 0° rather than backwards
/// through 180°.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Radians(pub f64);

impl Lerp for Radians {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        let tau = std::f64::consts::TAU;
        let mut delta = (b.0 - a.0) % tau;
        if delta > tau / 2.0 {
            delta -= tau;
        } else if delta < -tau / 2.0 {
            delta += tau;
        }
        Radians(a.0 + delta * t)
    }
}

/// RGBA tint, interpolated per component.
impl Lerp for [u8; 4] {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        }
        [
            lerp_u8(a[0], b[0], t),
            lerp_u8(a[1], b[1], t),
            lerp_u8(a[2], b[2], t),
            lerp_u8(a[3], b[3], t),
        ]
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Keyframe<T> {
    /// Seconds from the start of the document timeline.
    pub time: f64,
    pub value: T,
}

/// One transform attribute over time: keyframes sorted by time, linearly
/// interpolated between the bracketing pair and clamped at both ends.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Channel<T> {
    pub keys: Vec<Keyframe<T>>,
    /// Value when the channel has no keys at all.
    pub default: T,
}

impl<T> Channel<T>
where
    T: Lerp + Clone,
{
    pub fn constant(value: T) -> Self {
        Self {
            keys: Vec::new(),
            default: value,
        }
    }

    pub fn validate(&self) -> RenderResult<()> {
        if !self.keys.windows(2).all(|w| w[0].time <= w[1].time) {
            return Err(RenderError::decode(
                "channel keyframes must be sorted by time",
            ));
        }
        if self.keys.iter().any(|k| !k.time.is_finite() || k.time < 0.0) {
            return Err(RenderError::decode(
                "channel keyframe times must be finite and non-negative",
            ));
        }
        Ok(())
    }

    /// Last keyframe time, 0 for constant channels.
    pub fn duration(&self) -> f64 {
        self.keys.last().map(|k| k.time).unwrap_or(0.0)
    }

    pub fn sample(&self, time: f64) -> T {
        if self.keys.is_empty() {
            return self.default.clone();
        }

        let idx = self.keys.partition_point(|k| k.time <= time);
        if idx == 0 {
            return self.keys[0].value.clone();
        }
        if idx >= self.keys.len() {
            return self.keys[self.keys.len() - 1].value.clone();
        }

        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        let denom = b.time - a.time;
        if denom <= 0.0 {
            return a.value.clone();
        }
        let t = (time - a.time) / denom;
        T::lerp(&a.value, &b.value, t)
    }
}
