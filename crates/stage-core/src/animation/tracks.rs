use glam::{Quat, Vec3, Vec4};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    Step,
    CubicSpline,
}

/// Values a keyframe track can blend between.
pub trait Interpolatable: Copy {
    fn lerp_value(a: Self, b: Self, t: f32) -> Self;

    /// Hermite blend with glTF cubic-spline tangents scaled by the key interval.
    fn hermite(v0: Self, out0: Self, in1: Self, v1: Self, t: f32, dt: f32) -> Self;
}

#[inline]
fn hermite_weights(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        2.0 * t3 - 3.0 * t2 + 1.0,
        t3 - 2.0 * t2 + t,
        -2.0 * t3 + 3.0 * t2,
        t3 - t2,
    ]
}

impl Interpolatable for f32 {
    fn lerp_value(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }

    fn hermite(v0: Self, out0: Self, in1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let [h0, h1, h2, h3] = hermite_weights(t);
        h0 * v0 + h1 * out0 * dt + h2 * v1 + h3 * in1 * dt
    }
}

impl Interpolatable for Vec3 {
    fn lerp_value(a: Self, b: Self, t: f32) -> Self {
        a.lerp(b, t)
    }

    fn hermite(v0: Self, out0: Self, in1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let [h0, h1, h2, h3] = hermite_weights(t);
        v0 * h0 + out0 * (h1 * dt) + v1 * h2 + in1 * (h3 * dt)
    }
}

impl Interpolatable for Quat {
    fn lerp_value(a: Self, b: Self, t: f32) -> Self {
        a.slerp(b, t)
    }

    fn hermite(v0: Self, out0: Self, in1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let [h0, h1, h2, h3] = hermite_weights(t);
        let v = Vec4::from(v0) * h0
            + Vec4::from(out0) * (h1 * dt)
            + Vec4::from(v1) * h2
            + Vec4::from(in1) * (h3 * dt);
        Quat::from_vec4(v).normalize()
    }
}

/// Remembers the last keyframe interval so scrubbing near the previous time
/// avoids a binary search.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

const LOCAL_SCAN: usize = 3;

#[derive(Clone, Debug)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    /// For cubic splines: `[in_tangent, value, out_tangent]` per key.
    pub values: Vec<T>,
    pub interpolation: Interpolation,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: Interpolation) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    /// Number of values each key stores.
    #[inline]
    fn stride(&self) -> usize {
        match self.interpolation {
            Interpolation::CubicSpline => 3,
            _ => 1,
        }
    }

    /// A track is usable when it has keys and enough values for them.
    pub fn is_valid(&self) -> bool {
        !self.times.is_empty() && self.values.len() >= self.times.len() * self.stride()
    }

    #[inline]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    #[inline]
    fn key_value(&self, index: usize) -> T {
        match self.interpolation {
            Interpolation::CubicSpline => self.values[index * 3 + 1],
            _ => self.values[index],
        }
    }

    /// Sample at `time`, clamping outside the key range. `None` for an invalid track.
    pub fn sample(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<T> {
        if !self.is_valid() {
            return None;
        }
        let index = self.locate(time, cursor);
        Some(self.sample_interval(index, time))
    }

    /// Index of the key that starts the interval containing `time`.
    fn locate(&self, time: f32, cursor: &mut KeyframeCursor) -> usize {
        let len = self.times.len();
        let start = cursor.last_index.min(len - 1);

        let local = if time >= self.times[start] {
            (start..(start + LOCAL_SCAN).min(len))
                .find(|&i| i + 1 >= len || time < self.times[i + 1])
        } else {
            (start.saturating_sub(LOCAL_SCAN)..start)
                .rev()
                .find(|&i| time >= self.times[i])
        };

        let index = local.unwrap_or_else(|| {
            self.times
                .partition_point(|&t| t <= time)
                .saturating_sub(1)
        });
        cursor.last_index = index;
        index
    }

    fn sample_interval(&self, index: usize, time: f32) -> T {
        let len = self.times.len();
        if index + 1 >= len || time <= self.times[0] {
            let edge = if time <= self.times[0] { 0 } else { len - 1 };
            return self.key_value(edge);
        }

        let t0 = self.times[index];
        let t1 = self.times[index + 1];
        let dt = t1 - t0;
        let t = if dt > 1e-6 {
            ((time - t0) / dt).clamp(0.0, 1.0)
        } else {
            0.0
        };

        match self.interpolation {
            Interpolation::Step => self.key_value(index),
            Interpolation::Linear => {
                T::lerp_value(self.key_value(index), self.key_value(index + 1), t)
            }
            Interpolation::CubicSpline => {
                let a = index * 3;
                let b = (index + 1) * 3;
                T::hermite(
                    self.values[a + 1],
                    self.values[a + 2],
                    self.values[b],
                    self.values[b + 1],
                    t,
                    dt,
                )
            }
        }
    }
}
