//! The particle field: a fixed-size set of drifting points that shy away from
//! the pointer and bounce off the viewport edges.
//!
//! [`ParticleField`] owns every piece of simulation state (viewport, pointer,
//! particles, rng). The host calls [`ParticleField::init`] on startup and resize,
//! [`ParticleField::set_pointer`] on pointer moves and [`ParticleField::step`]
//! once per frame. Positions advance by one velocity per step, so apparent
//! motion scales with frame rate.

use rand::prelude::*;

use crate::config::{Config, Rgb};

/// Where the pointer sits before the first move. Far enough off-screen that
/// nothing is repelled.
pub const POINTER_SENTINEL: Pointer = Pointer {
    x: -999.0,
    y: -999.0,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub fn new(rgb: Rgb, a: f32) -> Self {
        Rgba {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
            a,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
}

impl Default for Pointer {
    fn default() -> Self {
        POINTER_SENTINEL
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub color: Rgba,
}

impl Particle {
    pub fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    pub fn distance_to(&self, other: &Particle) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

pub type Particles = Vec<Particle>;

/// A line between two particles closer than the connect distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub distance: f32,
    pub opacity: f32,
}

/// Alpha of the line joining two particles `distance` apart.
///
/// Falls linearly from `line_opacity` at zero to nothing at `connect_distance`.
pub fn line_opacity(config: &Config, distance: f32) -> f32 {
    if distance >= config.connect_distance {
        0.0
    } else {
        (1.0 - distance / config.connect_distance) * config.line_opacity
    }
}

pub struct ParticleField {
    config: Config,
    width: f32,
    height: f32,
    pointer: Pointer,
    particles: Particles,
    rng: StdRng,
}

impl ParticleField {
    /// An empty field with no viewport. Seeded from `config.seed` when present.
    pub fn new(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        ParticleField {
            config,
            width: 0.0,
            height: 0.0,
            pointer: Pointer::default(),
            particles: Particles::new(),
            rng,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn viewport(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// False until the field has been given a viewport with some area.
    pub fn is_active(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn pointer(&self) -> Pointer {
        self.pointer
    }

    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.pointer = Pointer { x, y };
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Sets the viewport and replaces every particle with a fresh random one.
    pub fn init(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);

        let particles = (0..self.config.count)
            .map(|_| self.spawn())
            .collect::<Particles>();
        self.particles = particles;
    }

    /// Re-runs [`init`](Self::init) if the viewport size changed.
    ///
    /// Prior positions are not carried over.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if (width, height) == (self.width, self.height) {
            return false;
        }
        self.init(width, height);
        true
    }

    fn spawn(&mut self) -> Particle {
        let config = &self.config;
        let rng = &mut self.rng;

        let rgb = config
            .colors
            .choose(rng)
            .copied()
            .unwrap_or(config.line_color);
        let alpha = rng.gen::<f32>() * (config.alpha_max - config.alpha_min) + config.alpha_min;

        Particle {
            x: rng.gen::<f32>() * self.width,
            y: rng.gen::<f32>() * self.height,
            vx: (rng.gen::<f32>() - 0.5) * config.speed,
            vy: (rng.gen::<f32>() - 0.5) * config.speed,
            radius: rng.gen::<f32>() * (config.max_radius - config.min_radius) + config.min_radius,
            color: Rgba::new(rgb, (alpha * 100.0).round() / 100.0),
        }
    }

    /// Advances `particle` by one frame against this field's pointer and viewport.
    pub fn update_particle(&self, particle: &mut Particle) {
        let config = &self.config;

        // pointer repulsion, skipped when sitting exactly on the pointer
        let dx = particle.x - self.pointer.x;
        let dy = particle.y - self.pointer.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist < config.repel_radius && dist > 0.0 {
            let force = (config.repel_radius - dist) / config.repel_radius;
            let impulse = force * config.repel_force * config.repel_damping;
            particle.vx += dx / dist * impulse;
            particle.vy += dy / dist * impulse;
        }

        particle.vx *= config.damping;
        particle.vy *= config.damping;

        let speed = particle.speed();
        let max_speed = config.max_speed();
        if speed > max_speed {
            particle.vx = particle.vx / speed * max_speed;
            particle.vy = particle.vy / speed * max_speed;
        }

        particle.x += particle.vx;
        particle.y += particle.vy;

        if particle.x < 0.0 || particle.x > self.width {
            particle.vx = -particle.vx;
            particle.x = particle.x.max(0.0).min(self.width);
        }
        if particle.y < 0.0 || particle.y > self.height {
            particle.vy = -particle.vy;
            particle.y = particle.y.max(0.0).min(self.height);
        }
    }

    /// Advances every particle by one frame. Does nothing without a viewport.
    pub fn step(&mut self) {
        if !self.is_active() {
            return;
        }
        let mut particles = std::mem::take(&mut self.particles);
        for particle in particles.iter_mut() {
            self.update_particle(particle);
        }
        self.particles = particles;
    }

    pub fn line_opacity(&self, distance: f32) -> f32 {
        line_opacity(&self.config, distance)
    }

    /// Every unordered pair closer than the connect distance, `a < b`.
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        let particles = &self.particles;
        (0..particles.len()).flat_map(move |a| {
            (a + 1..particles.len()).filter_map(move |b| {
                let distance = particles[a].distance_to(&particles[b]);
                if distance < self.config.connect_distance {
                    Some(Link {
                        a,
                        b,
                        distance,
                        opacity: self.line_opacity(distance),
                    })
                } else {
                    None
                }
            })
        })
    }

    pub fn mean_speed(&self) -> f32 {
        if self.particles.is_empty() {
            return 0.0;
        }
        self.particles.iter().map(Particle::speed).sum::<f32>() / self.particles.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> ParticleField {
        ParticleField::new(Config {
            seed: Some(seed),
            ..Config::default()
        })
    }

    fn still(x: f32, y: f32) -> Particle {
        Particle {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            radius: 1.0,
            color: Rgba::new([0, 0, 0], 1.0),
        }
    }

    #[test]
    fn init_respects_ranges() {
        let mut field = seeded(1);
        field.init(640.0, 480.0);
        let config = Config::default();

        assert_eq!(field.particles().len(), 80);
        for p in field.particles() {
            assert!(p.x >= 0.0 && p.x <= 640.0);
            assert!(p.y >= 0.0 && p.y <= 480.0);
            assert!(p.vx.abs() <= config.speed / 2.0);
            assert!(p.vy.abs() <= config.speed / 2.0);
            assert!(p.radius >= config.min_radius && p.radius <= config.max_radius);
            assert!(p.color.a >= 0.2 && p.color.a <= 0.7);
            assert!((p.color.a * 100.0 - (p.color.a * 100.0).round()).abs() < 1e-3);
            assert!(config.colors.contains(&[p.color.r, p.color.g, p.color.b]));
        }
    }

    #[test]
    fn same_seed_same_field() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        a.init(300.0, 200.0);
        b.init(300.0, 200.0);
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn reflects_off_edges() {
        let mut field = seeded(3);
        field.init(100.0, 100.0);

        let mut p = still(99.8, 0.1);
        p.vx = 0.5;
        p.vy = -0.5;
        field.update_particle(&mut p);

        assert_eq!(p.x, 100.0);
        assert_eq!(p.y, 0.0);
        assert!(p.vx < 0.0);
        assert!(p.vy > 0.0);
    }

    #[test]
    fn clamps_speed_to_cap() {
        let mut field = seeded(4);
        field.init(1000.0, 1000.0);

        let mut p = still(500.0, 500.0);
        p.vx = 3.0;
        p.vy = 4.0;
        field.update_particle(&mut p);

        assert!((p.speed() - 0.9).abs() < 1e-5);
        assert!((p.vx / p.vy - 0.75).abs() < 1e-5);
    }

    #[test]
    fn pointer_on_particle_is_ignored() {
        let mut field = seeded(5);
        field.init(200.0, 200.0);
        field.set_pointer(50.0, 50.0);

        let mut p = still(50.0, 50.0);
        field.update_particle(&mut p);

        assert!(!p.vx.is_nan() && !p.vy.is_nan());
        assert_eq!((p.vx, p.vy), (0.0, 0.0));
    }

    #[test]
    fn pointer_pushes_away() {
        let mut field = seeded(6);
        field.init(200.0, 200.0);
        field.set_pointer(101.0, 100.0);

        let mut p = still(100.0, 100.0);
        field.update_particle(&mut p);

        // (particle - pointer) = (-1, 0)
        let dot = p.vx * -1.0 + p.vy * 0.0;
        assert!(dot > 0.0);
        let expected = 0.99 * 0.8 * 0.05 * 0.99;
        assert!((p.vx + expected).abs() < 1e-6);
    }

    #[test]
    fn opacity_is_linear_in_distance() {
        let config = Config::default();
        assert_eq!(line_opacity(&config, 130.0), 0.0);
        assert_eq!(line_opacity(&config, 500.0), 0.0);
        assert!((line_opacity(&config, 0.0) - 0.15).abs() < 1e-6);
        assert!((line_opacity(&config, 65.0) - 0.075).abs() < 1e-6);
    }

    #[test]
    fn links_cover_close_pairs_only() {
        let mut field = seeded(7);
        field.init(1000.0, 1000.0);
        {
            let particles = field.particles_mut();
            for p in particles.iter_mut() {
                p.x = 900.0;
                p.y = 900.0;
            }
            particles[0].x = 0.0;
            particles[0].y = 0.0;
            particles[1].x = 60.0;
            particles[1].y = 80.0;
            particles[2].x = 500.0;
            particles[2].y = 0.0;
        }

        let links = field.links().filter(|l| l.a < 3).collect::<Vec<_>>();
        assert_eq!(links.len(), 1);
        assert_eq!((links[0].a, links[0].b), (0, 1));
        assert!((links[0].distance - 100.0).abs() < 1e-4);

        // 77 particles stacked on one spot link to each other
        assert_eq!(field.links().count(), 1 + 77 * 76 / 2);
    }

    #[test]
    fn step_is_noop_without_viewport() {
        let mut field = seeded(8);
        field.init(0.0, 0.0);
        let before = field.particles().to_vec();
        field.step();
        assert_eq!(field.particles(), &before[..]);
    }

    #[test]
    fn resize_only_reinits_on_change() {
        let mut field = seeded(9);
        field.init(400.0, 300.0);
        let before = field.particles().to_vec();

        assert!(!field.resize(400.0, 300.0));
        assert_eq!(field.particles(), &before[..]);

        assert!(field.resize(200.0, 100.0));
        assert_eq!(field.viewport(), (200.0, 100.0));
        assert_ne!(field.particles(), &before[..]);
    }
}
