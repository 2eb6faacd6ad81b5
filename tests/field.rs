use particle_field::field::POINTER_SENTINEL;
use particle_field::{Animation, Config, ParticleField};

/// Field with the stock config and a fixed seed, sized to `width` x `height`
pub fn seeded_field(width: f32, height: f32, seed: u64) -> ParticleField {
    let mut field = ParticleField::new(Config {
        seed: Some(seed),
        ..Config::default()
    });
    field.init(width, height);
    field
}

/// Asserts every particle lies inside the field's viewport
pub fn assert_in_bounds(field: &ParticleField) {
    let (width, height) = field.viewport();
    for (i, p) in field.particles().iter().enumerate() {
        assert!(
            p.x >= 0.0 && p.x <= width && p.y >= 0.0 && p.y <= height,
            "particle {} at ({}, {}) outside {}x{}",
            i,
            p.x,
            p.y,
            width,
            height
        );
    }
}

// ==================================================================================
// Motion invariants
// ==================================================================================

#[test]
fn positions_stay_in_viewport() {
    let mut field = seeded_field(300.0, 200.0, 1);

    // fast particles so many hit the walls
    for p in field.particles_mut() {
        p.vx *= 6.0;
        p.vy *= 6.0;
    }
    field.set_pointer(150.0, 100.0);

    for _ in 0..2000 {
        field.step();
        assert_in_bounds(&field);
    }
}

#[test]
fn speed_never_exceeds_cap() {
    let mut field = seeded_field(400.0, 400.0, 2);
    let cap = field.config().max_speed();

    for p in field.particles_mut() {
        p.vx = 10.0;
        p.vy = -7.0;
    }

    for frame in 0..300 {
        // drag the pointer through the middle of the field
        let t = frame as f32;
        field.set_pointer(200.0 + 120.0 * (t / 20.0).cos(), 200.0 + 120.0 * (t / 20.0).sin());
        field.step();
        for p in field.particles() {
            assert!(p.speed() <= cap + 1e-5, "speed {} over cap {}", p.speed(), cap);
        }
    }
}

#[test]
fn damping_decays_geometrically() {
    let mut field = seeded_field(800.0, 600.0, 3);
    assert_eq!(field.pointer(), POINTER_SENTINEL);

    let initial = field
        .particles()
        .iter()
        .map(|p| p.speed())
        .collect::<Vec<_>>();

    let frames = 50;
    for _ in 0..frames {
        field.step();
    }

    let factor = 0.99f32.powi(frames);
    for (p, s) in field.particles().iter().zip(initial.iter()) {
        assert!((p.speed() - s * factor).abs() < 1e-4);
    }
}

// ==================================================================================
// Lifecycle
// ==================================================================================

#[test]
fn init_always_yields_configured_count() {
    let mut field = seeded_field(100.0, 100.0, 4);
    assert_eq!(field.particles().len(), 80);

    for _ in 0..10 {
        field.step();
    }
    field.init(100.0, 100.0);
    assert_eq!(field.particles().len(), 80);
}

#[test]
fn resize_replaces_whole_set() {
    let mut field = seeded_field(1920.0, 1080.0, 5);
    let before = field.particles().to_vec();

    field.init(320.0, 240.0);

    assert_eq!(field.particles().len(), 80);
    assert_eq!(field.viewport(), (320.0, 240.0));
    assert_in_bounds(&field);
    assert!(field
        .particles()
        .iter()
        .zip(before.iter())
        .all(|(a, b)| a != b));
}

// ==================================================================================
// Scenario
// ==================================================================================

#[test]
fn thousand_frames_settle_without_pointer() {
    let mut field = seeded_field(800.0, 600.0, 6);
    let mut animation = Animation::default();

    for _ in 0..1000 {
        animation.step(&mut field);
        assert_in_bounds(&field);
    }

    assert_eq!(animation.frame(), 1000);
    assert!(field.mean_speed() < 0.05, "mean speed {}", field.mean_speed());
}

#[test]
fn pointer_clears_a_hole() {
    let mut field = seeded_field(400.0, 400.0, 7);
    field.set_pointer(200.0, 200.0);

    let near = |field: &ParticleField| {
        field
            .particles()
            .iter()
            .filter(|p| ((p.x - 200.0).powi(2) + (p.y - 200.0).powi(2)).sqrt() < 30.0)
            .count()
    };

    for p in field.particles_mut() {
        p.x = 200.0 + (p.x - 200.0) * 0.1;
        p.y = 200.0 + (p.y - 200.0) * 0.1;
    }
    let crowded = near(&field);

    Animation::default().run(&mut field, 400);

    assert!(near(&field) < crowded);
}
