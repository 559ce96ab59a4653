//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;
use serde::{Deserialize, Serialize};

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval overlaps with the other.
    /// Intervals which only touch at an end point do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.max > other.min && other.max > self.min
    }

    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl<T: std::ops::Sub<T, Output = T> + Copy> Interval<T> {
    /// Gets the magnitude of the interval.
    pub fn length(&self) -> T {
        self.max - self.min
    }
}

impl<T: Float> Interval<T> {
    /// An interval containing nothing, ready to be grown with [Interval::include].
    pub fn empty() -> Self {
        Self {
            min: T::infinity(),
            max: T::neg_infinity(),
        }
    }

    /// Grows the interval so it contains `value`.
    pub fn include(&mut self, value: T) {
        self.min = T::min(self.min, value);
        self.max = T::max(self.max, value);
    }

    pub fn lerp(&self, t: T) -> T {
        self.min + t * (self.max - self.min)
    }

    pub fn inv_lerp(&self, value: T) -> T {
        (value - self.min) / (self.max - self.min)
    }
}

impl<T: Float> FromIterator<T> for Interval<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut interval = Self::empty();
        for value in iter {
            interval.include(value);
        }
        interval
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}
