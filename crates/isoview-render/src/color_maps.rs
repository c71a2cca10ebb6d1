//! Color map system.

use std::collections::HashMap;

use glam::Vec3;

/// Name of the map used when a requested map is unknown.
pub const DEFAULT_COLOR_MAP: &str = "warm";

/// A color map for mapping scalar values to colors.
#[derive(Debug, Clone)]
pub struct ColorMap {
    /// Color map name.
    pub name: String,
    /// Control points as (position in [0, 1], color), sorted by position.
    pub stops: Vec<(f32, Vec3)>,
}

impl ColorMap {
    /// Creates a color map from colors evenly spaced from 0 to 1.
    pub fn new(name: impl Into<String>, colors: Vec<Vec3>) -> Self {
        let n = colors.len().saturating_sub(1).max(1) as f32;
        let stops = colors
            .into_iter()
            .enumerate()
            .map(|(i, c)| (i as f32 / n, c))
            .collect();
        Self {
            name: name.into(),
            stops,
        }
    }

    /// Creates a color map from explicit control points.
    pub fn with_stops(name: impl Into<String>, mut stops: Vec<(f32, Vec3)>) -> Self {
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self {
            name: name.into(),
            stops,
        }
    }

    /// Samples the color map at a given value (0 to 1).
    pub fn sample(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);

        let Some(&(first_t, first)) = self.stops.first() else {
            return Vec3::ZERO;
        };
        if t <= first_t || self.stops.len() == 1 {
            return first;
        }

        for pair in self.stops.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t <= t1 {
                let span = t1 - t0;
                let frac = if span > 0.0 { (t - t0) / span } else { 1.0 };
                return c0.lerp(c1, frac);
            }
        }

        self.stops.last().map_or(first, |&(_, c)| c)
    }
}

/// Registry for managing color maps.
#[derive(Debug, Default)]
pub struct ColorMapRegistry {
    color_maps: HashMap<String, ColorMap>,
}

impl ColorMapRegistry {
    /// Creates a new color map registry with default color maps.
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_defaults();
        registry
    }

    fn register_defaults(&mut self) {
        // Cool-to-warm diverging map
        self.register(ColorMap::new(
            "warm",
            vec![
                Vec3::new(0.230, 0.299, 0.754),
                Vec3::new(0.552, 0.690, 0.996),
                Vec3::new(0.866, 0.866, 0.866),
                Vec3::new(0.956, 0.604, 0.486),
                Vec3::new(0.706, 0.016, 0.150),
            ],
        ));

        self.register(ColorMap::new(
            "green-tan",
            vec![
                Vec3::new(0.085, 0.532, 0.201),
                Vec3::new(0.865, 0.865, 0.865),
                Vec3::new(0.677, 0.492, 0.093),
            ],
        ));

        // Hue from blue down to red at full saturation and value
        self.register(ColorMap::new(
            "rainbow",
            vec![
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(0.0, 1.0, 1.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
            ],
        ));

        self.register(ColorMap::with_stops(
            "fire",
            vec![
                (0.0, Vec3::new(0.0, 0.0, 0.0)),
                (0.4, Vec3::new(0.9, 0.0, 0.0)),
                (0.8, Vec3::new(0.9, 0.9, 0.0)),
                (1.0, Vec3::new(1.0, 1.0, 1.0)),
            ],
        ));

        self.register(ColorMap::new("grayscale", vec![Vec3::ZERO, Vec3::ONE]));
    }

    /// Registers a color map.
    pub fn register(&mut self, color_map: ColorMap) {
        self.color_maps.insert(color_map.name.clone(), color_map);
    }

    /// Gets a color map by name.
    pub fn get(&self, name: &str) -> Option<&ColorMap> {
        self.color_maps.get(name)
    }

    /// Gets a color map by name, falling back to [`DEFAULT_COLOR_MAP`].
    pub fn get_or_default(&self, name: &str) -> Option<&ColorMap> {
        self.get(name).or_else(|| {
            log::debug!("unknown color map '{name}', using '{DEFAULT_COLOR_MAP}'");
            self.get(DEFAULT_COLOR_MAP)
        })
    }

    /// Returns all color map names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.color_maps.keys().map(String::as_str)
    }
}

/// A discrete table mapping a scalar range onto a fixed number of colors.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable {
    range: (f64, f64),
    colors: Vec<Vec3>,
}

impl LookupTable {
    /// Builds a table of `num_colors` colors sampled evenly from `map` over `[fmin, fmax]`.
    ///
    /// A reversed range is swapped, a degenerate range (width below 1e-10)
    /// becomes `[0, 1]` and fewer than two colors are raised to two.
    pub fn build(map: &ColorMap, num_colors: u32, fmin: f64, fmax: f64) -> Self {
        let (mut lo, mut hi) = if fmax < fmin { (fmax, fmin) } else { (fmin, fmax) };
        if (hi - lo).abs() < 1e-10 {
            lo = 0.0;
            hi = 1.0;
        }
        let n = num_colors.max(2);
        let colors = (0..n)
            .map(|i| map.sample(i as f32 / (n - 1) as f32))
            .collect();
        Self {
            range: (lo, hi),
            colors,
        }
    }

    /// Returns the scalar range covered by the table.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Returns the table colors, lowest value first.
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Returns the color of the table entry containing `value`.
    ///
    /// Values outside the range map to the first or last entry.
    pub fn color(&self, value: f64) -> Vec3 {
        let (lo, hi) = self.range;
        let n = self.colors.len();
        if n == 0 {
            return Vec3::ZERO;
        }
        let t = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
        let idx = ((t * n as f64).floor() as usize).min(n - 1);
        self.colors[idx]
    }
}
