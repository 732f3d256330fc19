use log::info;

const MAX_DEPTH: usize = 256;

/// Depth calculates minimum, maximum, average and percentile of leaf-node
/// depths in the [`RbTree`][crate::RbTree] tree. Depth is counted in
/// links from the root down to an absent child.
#[derive(Clone, Debug)]
pub struct Depth {
    samples: usize,
    min: usize,
    max: usize,
    total: usize,
    depths: [u64; MAX_DEPTH],
}

impl Depth {
    pub(crate) fn new() -> Depth {
        Default::default()
    }

    pub(crate) fn sample(&mut self, depth: usize) {
        self.samples += 1;
        self.total += depth;
        if self.samples == 1 || depth < self.min {
            self.min = depth
        }
        if depth > self.max {
            self.max = depth
        }
        self.depths[depth.min(MAX_DEPTH - 1)] += 1;
    }

    /// Return number of leaf-nodes sampled.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Return minimum depth of leaf-node.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Return maximum depth of leaf-node.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Return the average depth of leaf-nodes.
    pub fn mean(&self) -> usize {
        match self.samples {
            0 => 0,
            n => self.total / n,
        }
    }

    /// Return depth as tuple of percentiles, each tuple provides
    /// (percentile, depth). Returned percentiles from 90, 91 .. 99
    pub fn percentiles(&self) -> Vec<(u8, usize)> {
        let mut percentiles: Vec<(u8, usize)> = vec![];
        if self.samples == 0 {
            return percentiles;
        }
        let (mut acc, mut prev_perc) = (0_u64, 90_u8);
        let iter = self.depths.iter().enumerate().filter(|(_, &item)| item > 0);
        for (depth, samples) in iter {
            acc += *samples;
            let perc = ((acc as f64 / self.samples as f64) * 100_f64) as u8;
            if perc >= prev_perc {
                percentiles.push((perc, depth));
                prev_perc = perc;
            }
        }
        percentiles
    }

    /// Log depth statistics in human readable format.
    pub fn pretty_print(&self, prefix: &str) {
        info!(
            "{}depth (min, avg, max): {:?}",
            prefix,
            (self.min, self.mean(), self.max)
        );
        for (perc, depth) in self.percentiles().into_iter() {
            info!("{}  {} percentile = {}", prefix, perc, depth);
        }
    }

    /// Convert depth statistics to JSON format, useful for plotting.
    pub fn json(&self) -> String {
        let ps: Vec<String> = self
            .percentiles()
            .into_iter()
            .map(|(d, n)| format!("\"{}\": {}", d, n))
            .collect();
        let strs = [
            format!("\"min\": {}", self.min),
            format!("\"mean\": {}", self.mean()),
            format!("\"max\": {}", self.max),
            format!("\"percentiles\": {{ {} }}", ps.join(", ")),
        ];
        format!("{{ {} }}", strs.join(", "))
    }
}

impl Default for Depth {
    fn default() -> Self {
        Depth {
            samples: 0,
            min: 0,
            max: 0,
            total: 0,
            depths: [0; MAX_DEPTH],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_empty() {
        let depth = Depth::new();
        assert_eq!(depth.samples(), 0);
        assert_eq!(depth.mean(), 0);
        assert!(depth.percentiles().is_empty());
    }

    #[test]
    fn test_depth_sample() {
        let mut depth = Depth::new();
        for d in [3, 3, 4, 2, 3, 4, 4, 4].iter() {
            depth.sample(*d);
        }
        assert_eq!(depth.samples(), 8);
        assert_eq!(depth.min(), 2);
        assert_eq!(depth.max(), 4);
        assert_eq!(depth.mean(), 27 / 8);
        // 2 -> 12%, 3 -> 50%, 4 -> 100%
        assert_eq!(depth.percentiles(), vec![(100, 4)]);
    }

    #[test]
    fn test_depth_zero() {
        let mut depth = Depth::new();
        depth.sample(0);
        assert_eq!(depth.min(), 0);
        assert_eq!(depth.max(), 0);
        assert_eq!(depth.percentiles(), vec![(100, 0)]);
    }

    #[test]
    fn test_depth_json() {
        let mut depth = Depth::new();
        depth.sample(1);
        depth.sample(1);
        assert_eq!(
            depth.json(),
            "{ \"min\": 1, \"mean\": 1, \"max\": 1, \"percentiles\": { \"100\": 1 } }"
        );
    }
}
