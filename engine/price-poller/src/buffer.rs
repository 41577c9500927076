use crate::sample::PriceSample;
use std::collections::VecDeque;

/// Fixed-capacity, oldest-first series of samples
#[derive(Debug, Clone)]
pub struct TimeSeriesBuffer {
    samples: VecDeque<PriceSample>,
    capacity: usize,
}

impl TimeSeriesBuffer {
    /// A capacity of zero is treated as one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { samples: VecDeque::with_capacity(capacity), capacity }
    }

    /// Append a sample, dropping from the front until within capacity
    ///
    /// Returns the number of samples dropped.
    pub fn push(&mut self, sample: PriceSample) -> usize {
        self.samples.push_back(sample);
        let mut dropped = 0;
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
            dropped += 1;
        }
        dropped
    }

    /// Remove every sample, returning how many there were
    pub fn clear(&mut self) -> usize {
        let removed = self.samples.len();
        self.samples.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&PriceSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceSample> {
        self.samples.iter()
    }

    pub fn to_vec(&self) -> Vec<PriceSample> {
        self.samples.iter().cloned().collect()
    }
}

impl Default for TimeSeriesBuffer {
    fn default() -> Self {
        Self::new(crate::DEFAULT_BUFFER_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use market_data::PriceMap;
    use proptest::prelude::*;

    fn sample(price: f64) -> PriceSample {
        let mut prices = PriceMap::new();
        prices.insert("BTC".to_string(), price);
        PriceSample::new(Local::now(), prices)
    }

    #[test]
    fn test_push_drops_oldest() {
        let mut buffer = TimeSeriesBuffer::new(2);
        assert_eq!(buffer.push(sample(1.0)), 0);
        assert_eq!(buffer.push(sample(2.0)), 0);
        assert_eq!(buffer.push(sample(3.0)), 1);

        let prices: Vec<_> = buffer.iter().filter_map(|s| s.price("BTC")).collect();
        assert_eq!(prices, vec![2.0, 3.0]);
        assert_eq!(buffer.latest().and_then(|s| s.price("BTC")), Some(3.0));
    }

    #[test]
    fn test_clear() {
        let mut buffer = TimeSeriesBuffer::default();
        buffer.push(sample(1.0));
        assert_eq!(buffer.clear(), 1);
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 60);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut buffer = TimeSeriesBuffer::new(0);
        buffer.push(sample(1.0));
        buffer.push(sample(2.0));
        assert_eq!(buffer.len(), 1);
    }

    proptest! {
        #[test]
        fn never_exceeds_capacity(capacity in 1usize..80, pushes in 0usize..200) {
            let mut buffer = TimeSeriesBuffer::new(capacity);
            for i in 0..pushes {
                buffer.push(sample(i as f64));
            }

            prop_assert_eq!(buffer.len(), pushes.min(capacity));
            if pushes > 0 {
                let first = (pushes - buffer.len()) as f64;
                prop_assert_eq!(buffer.iter().next().and_then(|s| s.price("BTC")), Some(first));
                prop_assert_eq!(buffer.latest().and_then(|s| s.price("BTC")), Some((pushes - 1) as f64));
            }
        }
    }
}
