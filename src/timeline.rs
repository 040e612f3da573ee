/// A half-open-ish interval over the source video timeline, in seconds.
/// Both engines reason about 1-D interval placement; this is the shared piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Seconds shared with another interval; 0.0 when disjoint.
    pub fn overlap_seconds(&self, other: &Interval) -> f64 {
        let lo = self.start.max(other.start);
        let hi = self.end.min(other.end);
        (hi - lo).max(0.0)
    }

    /// Clamp both endpoints into `[min, max]`.
    pub fn clamp_to(&self, min: f64, max: f64) -> Interval {
        Interval {
            start: self.start.clamp(min, max),
            end: self.end.clamp(min, max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_of_disjoint_intervals_is_zero() {
        let a = Interval::new(0.0, 10.0);
        let b = Interval::new(12.0, 20.0);
        assert_eq!(a.overlap_seconds(&b), 0.0);
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = Interval::new(0.0, 10.0);
        let b = Interval::new(5.0, 20.0);
        assert_eq!(a.overlap_seconds(&b), 5.0);
        assert_eq!(b.overlap_seconds(&a), 5.0);
    }

    #[test]
    fn clamp_pins_endpoints() {
        let a = Interval::new(-3.0, 400.0);
        let clamped = a.clamp_to(0.0, 150.0);
        assert_eq!(clamped.start, 0.0);
        assert_eq!(clamped.end, 150.0);
    }
}
