use vek::*;

#[derive(Copy, Clone, Debug, PartialEq)]
struct PointCharge {
    pos: Vec3<i32>,
    charge: f64,
}

impl PointCharge {
    /// Falls off as `1/r` with distance; infinite on top of the charge.
    fn potential_change(&self, pos: Vec3<i32>) -> f64 {
        let dist_sqr = self.pos.as_::<f64>().distance_squared(pos.as_());
        if dist_sqr == 0.0 {
            f64::INFINITY
        } else {
            self.charge / dist_sqr.sqrt()
        }
    }
}

/// Accumulates the charges of placed mobs and measures how crowded a position
/// would become with one more.
#[derive(Clone, Debug, Default)]
pub struct PotentialCalculator {
    charges: Vec<PointCharge>,
}

impl PotentialCalculator {
    pub fn new() -> Self { Self::default() }

    /// Zero charges never contribute and are dropped.
    pub fn add_charge(&mut self, pos: Vec3<i32>, charge: f64) {
        if charge != 0.0 {
            self.charges.push(PointCharge { pos, charge });
        }
    }

    /// Energy of a new charge of the given magnitude placed at `pos`.
    pub fn potential_energy_change(&self, pos: Vec3<i32>, charge: f64) -> f64 {
        if charge == 0.0 {
            return 0.0;
        }
        let potential = self
            .charges
            .iter()
            .map(|c| c.potential_change(pos))
            .sum::<f64>();
        potential * charge
    }

    pub fn len(&self) -> usize { self.charges.len() }

    pub fn is_empty(&self) -> bool { self.charges.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_has_no_energy() {
        let potential = PotentialCalculator::new();
        assert_eq!(potential.potential_energy_change(Vec3::zero(), 0.15), 0.0);
    }

    #[test]
    fn decreases_with_distance() {
        let mut potential = PotentialCalculator::new();
        potential.add_charge(Vec3::new(0, 0, 64), 0.15);
        let near = potential.potential_energy_change(Vec3::new(2, 0, 64), 0.15);
        let mid = potential.potential_energy_change(Vec3::new(8, 0, 64), 0.15);
        let far = potential.potential_energy_change(Vec3::new(40, 30, 64), 0.15);
        assert!(near > mid && mid > far && far > 0.0);
        assert!((mid - 0.15 * 0.15 / 8.0).abs() < 1e-12);
    }

    #[test]
    fn on_top_of_a_charge_is_infinite() {
        let mut potential = PotentialCalculator::new();
        potential.add_charge(Vec3::new(3, 4, 5), 0.7);
        assert!(potential
            .potential_energy_change(Vec3::new(3, 4, 5), 0.1)
            .is_infinite());
    }

    #[test]
    fn zero_charges_are_ignored() {
        let mut potential = PotentialCalculator::new();
        potential.add_charge(Vec3::new(1, 1, 1), 0.0);
        assert!(potential.is_empty());
        potential.add_charge(Vec3::new(1, 1, 1), 0.5);
        assert_eq!(potential.potential_energy_change(Vec3::new(1, 1, 1), 0.0), 0.0);
    }

    #[test]
    fn query_is_idempotent_and_order_free() {
        let charges = [
            (Vec3::new(0, 0, 64), 0.15),
            (Vec3::new(10, -4, 70), 0.7),
            (Vec3::new(-3, 12, 60), 0.3),
        ];
        let mut a = PotentialCalculator::new();
        let mut b = PotentialCalculator::new();
        for (pos, charge) in charges.iter() {
            a.add_charge(*pos, *charge);
        }
        for (pos, charge) in charges.iter().rev() {
            b.add_charge(*pos, *charge);
        }
        let pos = Vec3::new(5, 5, 65);
        let first = a.potential_energy_change(pos, 0.15);
        assert_eq!(first, a.potential_energy_change(pos, 0.15));
        assert!((first - b.potential_energy_change(pos, 0.15)).abs() < 1e-12);
    }
}
