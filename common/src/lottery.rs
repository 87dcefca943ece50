use rand::prelude::*;
use serde::Deserialize;

/// A weighted random table. Each item is stored alongside the running total
/// of the weights before it, so a draw is a binary search.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "Vec<(f32, T)>")]
pub struct Lottery<T> {
    items: Vec<(f32, T)>,
    total: f32,
}

impl<T> From<Vec<(f32, T)>> for Lottery<T> {
    fn from(mut items: Vec<(f32, T)>) -> Lottery<T> {
        let mut total = 0.0;

        for (rate, _) in &mut items {
            total += *rate;
            *rate = total - *rate;
        }

        Self { items, total }
    }
}

impl<T> Default for Lottery<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0.0,
        }
    }
}

impl<T> Lottery<T> {
    /// Picks the item whose weight interval contains `x`, a value in
    /// `[0, total)`.
    fn pick(&self, x: f32) -> Option<&T> {
        if self.items.is_empty() || self.total <= 0.0 {
            return None;
        }
        let mut idx = self
            .items
            .partition_point(|(start, _)| *start <= x)
            .saturating_sub(1);
        // Rounding can land `x` on `total`, past every weighted item
        while idx > 0 && self.weight(idx) <= 0.0 {
            idx -= 1;
        }
        self.items.get(idx).map(|(_, item)| item)
    }

    fn weight(&self, idx: usize) -> f32 {
        let end = self.items.get(idx + 1).map_or(self.total, |(next, _)| *next);
        self.items.get(idx).map_or(0.0, |(start, _)| end - start)
    }

    /// Weighted draw. `None` if the table is empty or all weights are zero.
    pub fn choose_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        if self.items.is_empty() {
            return None;
        }
        self.pick(rng.gen::<f32>() * self.total)
    }

    /// Iterates over the items in the table alongside their own weight.
    pub fn iter(&self) -> impl Iterator<Item = (f32, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(move |(i, (_, item))| (self.weight(i), item))
    }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn total(&self) -> f32 { self.total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    #[test]
    fn empty_lottery_draws_nothing() {
        let lottery = Lottery::<u32>::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(lottery.choose_with(&mut rng), None);
    }

    #[test]
    fn zero_weight_items_are_never_drawn() {
        let lottery = Lottery::from(vec![(0.0, 'a'), (1.0, 'b'), (0.0, 'c')]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert_eq!(lottery.choose_with(&mut rng), Some(&'b'));
        }
    }

    #[test]
    fn draw_at_the_total_skips_trailing_zero_weights() {
        let lottery = Lottery::from(vec![(1.0, "low"), (3.0, "high"), (0.0, "never")]);
        assert_eq!(lottery.pick(0.0), Some(&"low"));
        assert_eq!(lottery.pick(1.0), Some(&"high"));
        assert_eq!(lottery.pick(lottery.total()), Some(&"high"));
    }

    #[test]
    fn iter_recovers_weights() {
        let lottery = Lottery::from(vec![(2.0, 1), (5.0, 2)]);
        let weights = lottery.iter().map(|(w, i)| (w, *i)).collect::<Vec<_>>();
        assert_eq!(weights, vec![(2.0, 1), (5.0, 2)]);
        assert_eq!(lottery.total(), 7.0);
    }
}
