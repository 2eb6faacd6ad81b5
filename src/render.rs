//! Drawing the field onto anything that can fill circles and stroke lines.

use crate::field::{ParticleField, Rgba};

/// A 2D drawing target. Coordinates are viewport pixels.
pub trait Surface {
    fn clear(&mut self, width: f32, height: f32);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba);
    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba);
}

/// Clears `surface`, then draws every particle and every link. Returns the
/// number of links drawn.
pub fn render<S: Surface>(field: &ParticleField, surface: &mut S) -> usize {
    if !field.is_active() {
        return 0;
    }

    let (width, height) = field.viewport();
    surface.clear(width, height);

    let particles = field.particles();
    for particle in particles {
        surface.fill_circle(particle.x, particle.y, particle.radius, particle.color);
    }

    let config = field.config();
    let mut count = 0;
    for link in field.links() {
        let a = &particles[link.a];
        let b = &particles[link.b];
        surface.stroke_line(
            (a.x, a.y),
            (b.x, b.y),
            config.line_width,
            Rgba::new(config.line_color, link.opacity),
        );
        count += 1;
    }
    count
}
