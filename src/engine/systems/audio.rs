use super::shared_slot::{ SharedSlot, SlotReader };

/// Whole PCM blocks handed from a capture thread to the render thread.
#[derive(Clone, Default)]
pub struct AudioBlockSlot {
    slot: SharedSlot<Vec<i16>>,
}

impl AudioBlockSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, block: Vec<i16>) {
        self.slot.publish(block);
    }

    pub fn reader(&self) -> SlotReader<Vec<i16>> {
        SlotReader::new(self.slot.clone())
    }
}

/// Reduces a PCM block to `out.len()` peak amplitudes in `[0, 1]`.
///
/// Each output bin covers an equal run of samples; an empty block zeroes the output.
pub fn fill_amplitudes(block: &[i16], out: &mut [f32]) {
    if out.is_empty() {
        return;
    }
    if block.is_empty() {
        out.fill(0.0);
        return;
    }
    let bins = out.len();
    for (bin, value) in out.iter_mut().enumerate() {
        let start = (bin * block.len()) / bins;
        let end = (((bin + 1) * block.len()) / bins).max(start + 1).min(block.len());
        let peak = block[start.min(block.len() - 1)..end]
            .iter()
            .map(|s| (*s as i32).unsigned_abs())
            .max()
            .unwrap_or(0);
        *value = (peak as f32) / 32_768.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amplitudes_are_normalized_peaks() {
        let block = [0, 16_384, -32_768, 100];
        let mut out = [0.0; 2];
        fill_amplitudes(&block, &mut out);
        assert_eq!(out, [0.5, 1.0]);
    }

    #[test]
    fn more_bins_than_samples_repeats_samples() {
        let mut out = [1.0; 4];
        fill_amplitudes(&[32_767, 0], &mut out);
        assert!(out[0] > 0.99 && out[1] > 0.99);
        assert_eq!(&out[2..], &[0.0, 0.0]);

        fill_amplitudes(&[], &mut out);
        assert_eq!(out, [0.0; 4]);
    }

    #[test]
    fn reader_gets_latest_whole_block() {
        let slot = AudioBlockSlot::new();
        let mut reader = slot.reader();
        slot.publish(vec![1; 256]);
        slot.publish(vec![2; 512]);
        let block = reader.poll().unwrap();
        assert_eq!(block.len(), 512);
        assert!(reader.poll().is_none());
    }
}
