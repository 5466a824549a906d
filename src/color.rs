//! Pure color conversions and the running histogram behind the info panel.

/// `#rrggbb` string for an RGB triple in [0,255].
pub fn rgb_to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Hue (degrees, rounded), saturation and lightness (percent, one decimal)
/// for an RGB triple in [0,255].
pub fn rgb_to_hsl(rgb: [u8; 3]) -> (f32, f32, f32) {
    let r = rgb[0] as f32 / 255.0;
    let g = rgb[1] as f32 / 255.0;
    let b = rgb[2] as f32 / 255.0;

    let cmin = r.min(g).min(b);
    let cmax = r.max(g).max(b);
    let delta = cmax - cmin;

    let mut h = if delta == 0.0 {
        0.0
    } else if cmax == r {
        ((g - b) / delta) % 6.0
    } else if cmax == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    h = (h * 60.0).round();
    if h < 0.0 {
        h += 360.0;
    }

    let l = (cmax + cmin) / 2.0;
    let s = if delta == 0.0 {
        0.0
    } else {
        delta / (1.0 - (2.0 * l - 1.0).abs())
    };

    (h, (s * 1000.0).round() / 10.0, (l * 1000.0).round() / 10.0)
}

pub const HISTOGRAM_BUCKETS: usize = 8;
const MAX_SAMPLES: usize = 500;

/// Rolling red-channel histogram over the most recent pixel samples.
pub struct Histogram {
    samples: std::collections::VecDeque<u8>,
    counts: [u32; HISTOGRAM_BUCKETS],
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            samples: std::collections::VecDeque::new(),
            counts: [0; HISTOGRAM_BUCKETS],
        }
    }

    pub fn push(&mut self, red: u8) {
        self.samples.push_back(red);
        while self.samples.len() > MAX_SAMPLES {
            self.samples.pop_front();
        }
        self.recount();
    }

    fn recount(&mut self) {
        self.counts = [0; HISTOGRAM_BUCKETS];
        let step = 255.0 / HISTOGRAM_BUCKETS as f32;
        for &value in &self.samples {
            let mut bucket = HISTOGRAM_BUCKETS - 1;
            for i in 0..HISTOGRAM_BUCKETS {
                if (value as f32) < (i + 1) as f32 * step {
                    bucket = i;
                    break;
                }
            }
            self.counts[bucket] += 1;
        }
    }

    pub fn counts(&self) -> &[u32; HISTOGRAM_BUCKETS] {
        &self.counts
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_pads_single_digits() {
        assert_eq!(rgb_to_hex([255, 0, 10]), "#ff000a");
        assert_eq!(rgb_to_hex([0, 0, 0]), "#000000");
    }

    #[test]
    fn hsl_known_triples() {
        assert_eq!(rgb_to_hsl([255, 0, 0]), (0.0, 100.0, 50.0));
        assert_eq!(rgb_to_hsl([0, 255, 0]), (120.0, 100.0, 50.0));
        assert_eq!(rgb_to_hsl([0, 0, 255]), (240.0, 100.0, 50.0));
        assert_eq!(rgb_to_hsl([255, 255, 255]), (0.0, 0.0, 100.0));
        let (h, s, l) = rgb_to_hsl([128, 128, 128]);
        assert_eq!((h, s), (0.0, 0.0));
        assert!((l - 50.2).abs() < 0.1);
    }

    #[test]
    fn histogram_buckets_by_red_channel() {
        let mut h = Histogram::new();
        h.push(0); // bucket 0
        h.push(40); // 255/8 = 31.875, so 40 lands in bucket 1
        h.push(255); // top bucket
        assert_eq!(h.counts()[0], 1);
        assert_eq!(h.counts()[1], 1);
        assert_eq!(h.counts()[7], 1);
        assert_eq!(h.sample_count(), 3);
    }

    #[test]
    fn histogram_window_is_bounded() {
        let mut h = Histogram::new();
        for _ in 0..600 {
            h.push(10);
        }
        assert_eq!(h.sample_count(), 500);
        assert_eq!(h.counts()[0], 500);
    }
}
