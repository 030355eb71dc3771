use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::magicnum;

/// Highest number of coordinate axes a [Noise] generator supports.
pub const MAX_DIMENSIONS: usize = 4;
/// Highest number of octaves a fractal evaluation may sum.
pub const MAX_OCTAVES: f32 = 128.;

const TABLE_SIZE: usize = 256;
const SIMPLEX_RADIUS_SQ: f32 = 0.5;
/// Reciprocal of the largest contribution a single simplex corner can make.
const SIMPLEX_SCALE: f32 = 108.74;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NoiseError {
    #[error("dimensions must be between 1 and {MAX_DIMENSIONS}, got {0}")]
    InvalidDimensions(usize),
    #[error("expected {expected} coordinates, got {actual}")]
    CoordinateCount { expected: usize, actual: usize },
    #[error("coordinate {0} is not finite")]
    NonFiniteCoordinate(f32),
    #[error("octaves must be between 1 and {MAX_OCTAVES}, got {0}")]
    InvalidOctaves(f32),
    #[error("{name} must be finite and positive, got {value}")]
    InvalidParameter { name: &'static str, value: f32 },
    #[error("{name} {value} overflows over {octaves} octaves")]
    OctaveOverflow {
        name: &'static str,
        value: f32,
        octaves: f32,
    },
}

/// Single-octave noise function.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum NoiseAlgorithm {
    /// Classic gradient noise on a square lattice.
    Perlin,
    /// Gradient noise on a simplex lattice; fewer directional artifacts than Perlin.
    #[default]
    Simplex,
    /// Interpolated random values on a square lattice.
    Value,
}

/// How octaves are combined by [Noise::evaluate].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum FractalKind {
    /// One octave at the base frequency.
    #[default]
    Single,
    /// Fractional Brownian motion: signed octaves summed with decreasing amplitude.
    Fbm,
    /// Absolute values of octaves summed with decreasing amplitude; never negative.
    Turbulence,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NoiseSettings {
    pub seed: u64,
    /// Number of coordinate axes, from 1 to [MAX_DIMENSIONS].
    pub dimensions: usize,
    pub algorithm: NoiseAlgorithm,
    pub fractal: FractalKind,
    /// Octaves summed by fractal evaluation; a fractional remainder adds a partial octave.
    pub octaves: f32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    /// Amplitude multiplier per octave.
    pub gain: f32,
    /// Coordinates are multiplied by this before sampling the first octave.
    pub frequency: f32,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            dimensions: 2,
            algorithm: NoiseAlgorithm::default(),
            fractal: FractalKind::default(),
            octaves: 4.,
            lacunarity: 2.,
            gain: 0.5,
            frequency: 1.,
        }
    }
}

impl NoiseSettings {
    pub fn validate(&self) -> Result<(), NoiseError> {
        if self.dimensions == 0 || self.dimensions > MAX_DIMENSIONS {
            return Err(NoiseError::InvalidDimensions(self.dimensions));
        }
        if !(1. ..=MAX_OCTAVES).contains(&self.octaves) {
            return Err(NoiseError::InvalidOctaves(self.octaves));
        }

        for (name, value) in [
            ("lacunarity", self.lacunarity),
            ("gain", self.gain),
            ("frequency", self.frequency),
        ] {
            if !value.is_finite() || value <= 0. {
                return Err(NoiseError::InvalidParameter { name, value });
            }
        }

        // Replay the octave loop so that no amplitude sum or frequency can become infinite.
        let mut amplitude = 1f32;
        let mut amplitude_sum = 0f32;
        let mut frequency = self.frequency;

        for octave in 0..self.octaves.ceil() as usize {
            if octave > 0 {
                amplitude *= self.gain;
                frequency *= self.lacunarity;
            }
            amplitude_sum += amplitude;

            if !amplitude_sum.is_finite() {
                return Err(self.overflow("gain", self.gain));
            }
            if !frequency.is_finite() {
                return Err(self.overflow("lacunarity", self.lacunarity));
            }
        }

        Ok(())
    }

    fn overflow(&self, name: &'static str, value: f32) -> NoiseError {
        NoiseError::OctaveOverflow {
            name,
            value,
            octaves: self.octaves,
        }
    }
}

/// Seeded coherent noise generator for 1 to 4 dimensions.
///
/// All tables are built by [Noise::new]; evaluation never mutates, so one generator can be
/// shared freely between threads.
#[derive(Clone, Debug)]
pub struct Noise {
    settings: NoiseSettings,
    perm: [u8; TABLE_SIZE],
    gradients: Vec<[f32; MAX_DIMENSIONS]>,
    values: Vec<f32>,
}

/// Random unit vector in the first `dimensions` axes.
fn random_gradient<R: Rng>(rng: &mut R, dimensions: usize) -> [f32; MAX_DIMENSIONS] {
    loop {
        let mut g = [0f32; MAX_DIMENSIONS];

        for c in g.iter_mut().take(dimensions) {
            *c = rng.gen_range(-1.0..1.0);
        }

        let len_sq: f32 = g.iter().map(|c| c * c).sum();

        // Sample inside the unit ball so directions stay uniform.
        if len_sq > 1e-4 && len_sq <= 1. {
            let len = len_sq.sqrt();
            g.iter_mut().for_each(|c| *c /= len);
            return g;
        }
    }
}

#[inline]
fn quintic(t: f32) -> f32 {
    t * t * t * (t * (t * 6. - 15.) + 10.)
}

#[inline]
fn dot(g: &[f32; MAX_DIMENSIONS], d: &[f32]) -> f32 {
    g.iter().zip(d).map(|(a, b)| a * b).sum()
}

impl Noise {
    pub fn new(settings: NoiseSettings) -> Result<Self, NoiseError> {
        settings.validate()?;

        let mut perm = [0u8; TABLE_SIZE];
        for (i, p) in perm.iter_mut().enumerate() {
            *p = i as u8;
        }
        perm.shuffle(&mut magicnum::seeded_rng(
            settings.seed,
            magicnum::NOISE_PERMUTATION,
        ));

        let mut rng = magicnum::seeded_rng(settings.seed, magicnum::NOISE_GRADIENTS);
        let gradients = (0..TABLE_SIZE)
            .map(|_| random_gradient(&mut rng, settings.dimensions))
            .collect();
        let values = (0..TABLE_SIZE).map(|_| rng.gen_range(-1.0..=1.0)).collect();

        log::debug!(
            "{:?} noise in {} dimensions, seed {}",
            settings.algorithm,
            settings.dimensions,
            settings.seed
        );

        Ok(Self {
            settings,
            perm,
            gradients,
            values,
        })
    }

    pub fn settings(&self) -> &NoiseSettings {
        &self.settings
    }

    /// Sample noise at `coords` using the configured fractal kind, giving a value in `[-1, 1]`.
    pub fn evaluate(&self, coords: &[f32]) -> Result<f32, NoiseError> {
        match self.settings.fractal {
            FractalKind::Single => self.evaluate_single(coords),
            FractalKind::Fbm => self.evaluate_fbm(coords),
            FractalKind::Turbulence => self.evaluate_turbulence(coords),
        }
    }

    /// One octave at the base frequency, in `[-1, 1]`.
    pub fn evaluate_single(&self, coords: &[f32]) -> Result<f32, NoiseError> {
        let p = self.scaled(coords, self.settings.frequency)?;

        Ok(self.sample(&p[..self.settings.dimensions]))
    }

    /// Fractional Brownian motion over the configured octaves, in `[-1, 1]`.
    pub fn evaluate_fbm(&self, coords: &[f32]) -> Result<f32, NoiseError> {
        self.fractal(coords, |v| v)
    }

    /// Turbulence over the configured octaves, in `[0, 1]`.
    pub fn evaluate_turbulence(&self, coords: &[f32]) -> Result<f32, NoiseError> {
        self.fractal(coords, f32::abs)
    }

    /// Check `coords` and scale them by `frequency`.
    fn scaled(&self, coords: &[f32], frequency: f32) -> Result<[f32; MAX_DIMENSIONS], NoiseError> {
        if coords.len() != self.settings.dimensions {
            return Err(NoiseError::CoordinateCount {
                expected: self.settings.dimensions,
                actual: coords.len(),
            });
        }

        let mut p = [0f32; MAX_DIMENSIONS];
        for (dst, &c) in p.iter_mut().zip(coords) {
            *dst = c * frequency;
            if !dst.is_finite() {
                return Err(NoiseError::NonFiniteCoordinate(*dst));
            }
        }

        Ok(p)
    }

    fn fractal<F: Fn(f32) -> f32>(&self, coords: &[f32], shape: F) -> Result<f32, NoiseError> {
        let NoiseSettings {
            dimensions,
            octaves,
            lacunarity,
            gain,
            frequency,
            ..
        } = self.settings;
        let whole = octaves.floor() as usize;
        let remainder = octaves - octaves.floor();
        let mut total = 0.;
        let mut amplitude = 1.;
        let mut amplitude_sum = 0.;
        let mut freq = frequency;

        for octave in 0..=whole {
            let weight = if octave < whole { 1. } else { remainder };

            if weight <= 0. {
                break;
            }

            let p = self.scaled(coords, freq)?;

            total += shape(self.sample(&p[..dimensions])) * amplitude * weight;
            amplitude_sum += amplitude * weight;
            amplitude *= gain;
            freq *= lacunarity;
        }

        Ok((total / amplitude_sum).clamp(-1., 1.))
    }

    fn sample(&self, p: &[f32]) -> f32 {
        match self.settings.algorithm {
            NoiseAlgorithm::Perlin => self.perlin(p),
            NoiseAlgorithm::Simplex => self.simplex(p),
            NoiseAlgorithm::Value => self.value(p),
        }
    }

    #[inline]
    fn hash(&self, lattice: &[i32]) -> usize {
        lattice.iter().fold(0usize, |h, &c| {
            self.perm[(h + (c & 0xff) as usize) & 0xff] as usize
        })
    }

    /// Visit each corner of the lattice cube around `p` with its interpolation weight.
    fn lattice_corners<F>(&self, p: &[f32], fade: fn(f32) -> f32, mut corner: F)
    where
        F: FnMut(f32, &[i32], &[f32]),
    {
        let n = p.len();
        let mut cell = [0i32; MAX_DIMENSIONS];
        let mut frac = [0f32; MAX_DIMENSIONS];

        for i in 0..n {
            let floor = p[i].floor();
            cell[i] = floor as i32;
            frac[i] = p[i] - floor;
        }

        for bits in 0..(1usize << n) {
            let mut lattice = [0i32; MAX_DIMENSIONS];
            let mut offset = [0f32; MAX_DIMENSIONS];
            let mut weight = 1.;

            for i in 0..n {
                let bit = (bits >> i) & 1;
                let f = fade(frac[i]);

                lattice[i] = cell[i].wrapping_add(bit as i32);
                offset[i] = frac[i] - bit as f32;
                weight *= if bit == 1 { f } else { 1. - f };
            }

            corner(weight, &lattice[..n], &offset[..n]);
        }
    }

    fn perlin(&self, p: &[f32]) -> f32 {
        let mut total = 0.;

        self.lattice_corners(p, quintic, |weight, lattice, offset| {
            total += weight * dot(&self.gradients[self.hash(lattice)], offset);
        });

        // Unit gradients peak at half the diagonal of the lattice cube.
        (total * 2. / (p.len() as f32).sqrt()).clamp(-1., 1.)
    }

    fn value(&self, p: &[f32]) -> f32 {
        let mut total = 0.;

        self.lattice_corners(
            p,
            |t| t * t * (3. - 2. * t),
            |weight, lattice, _| total += weight * self.values[self.hash(lattice)],
        );

        total.clamp(-1., 1.)
    }

    fn simplex(&self, p: &[f32]) -> f32 {
        let n = p.len();
        let nf = n as f32;
        let skew = ((nf + 1.).sqrt() - 1.) / nf;
        let unskew = (1. - 1. / (nf + 1.).sqrt()) / nf;

        // Find the simplex cell containing the point in skewed space.
        let s = p.iter().sum::<f32>() * skew;
        let mut cell = [0i32; MAX_DIMENSIONS];
        for i in 0..n {
            cell[i] = (p[i] + s).floor() as i32;
        }

        let t = cell[..n].iter().map(|&c| c as f32).sum::<f32>() * unskew;
        let mut d0 = [0f32; MAX_DIMENSIONS];
        for i in 0..n {
            d0[i] = p[i] - (cell[i] as f32 - t);
        }

        // Axes are stepped along in order of decreasing distance from the first corner.
        let mut order = [0usize, 1, 2, 3];
        order[..n].sort_by(|&a, &b| d0[b].total_cmp(&d0[a]));

        let mut lattice = cell;
        let mut total = 0.;

        for k in 0..=n {
            if k > 0 {
                let axis = order[k - 1];
                lattice[axis] = lattice[axis].wrapping_add(1);
            }

            let mut d = [0f32; MAX_DIMENSIONS];
            let mut dist_sq = 0.;

            for i in 0..n {
                let step = lattice[i].wrapping_sub(cell[i]) as f32;
                d[i] = d0[i] - step + k as f32 * unskew;
                dist_sq += d[i] * d[i];
            }

            let falloff = SIMPLEX_RADIUS_SQ - dist_sq;
            if falloff > 0. {
                let falloff_sq = falloff * falloff;
                total += falloff_sq
                    * falloff_sq
                    * dot(&self.gradients[self.hash(&lattice[..n])], &d[..n]);
            }
        }

        (total * SIMPLEX_SCALE).clamp(-1., 1.)
    }
}
