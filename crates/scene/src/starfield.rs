use foundation::math::Vec3;
use rand::Rng;

/// Parameters of the star backdrop.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StarfieldParams {
    pub count: usize,
    /// Full width of the x/y spread, centered on the origin.
    pub spread: f64,
    /// Stars are placed at `z` in `(-depth, 0]`, behind the globe.
    pub depth: f64,
}

impl Default for StarfieldParams {
    fn default() -> Self {
        Self {
            count: 10_000,
            spread: 2000.0,
            depth: 2000.0,
        }
    }
}

pub fn generate_star_positions<R: Rng + ?Sized>(params: &StarfieldParams, rng: &mut R) -> Vec<Vec3> {
    (0..params.count)
        .map(|_| {
            let x = (rng.r#gen::<f64>() - 0.5) * params.spread;
            let y = (rng.r#gen::<f64>() - 0.5) * params.spread;
            let z = -rng.r#gen::<f64>() * params.depth;
            Vec3::new(x, y, z)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{StarfieldParams, generate_star_positions};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn stars_stay_inside_the_slab() {
        let params = StarfieldParams::default();
        let mut rng = StdRng::seed_from_u64(7);
        let stars = generate_star_positions(&params, &mut rng);

        assert_eq!(stars.len(), 10_000);
        for s in &stars {
            assert!(s.x >= -1000.0 && s.x < 1000.0);
            assert!(s.y >= -1000.0 && s.y < 1000.0);
            assert!(s.z <= 0.0 && s.z > -2000.0);
        }
    }

    #[test]
    fn same_seed_same_sky() {
        let params = StarfieldParams {
            count: 32,
            ..StarfieldParams::default()
        };
        let a = generate_star_positions(&params, &mut StdRng::seed_from_u64(42));
        let b = generate_star_positions(&params, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
