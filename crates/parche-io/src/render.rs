//! Offline (faster-than-real-time) rendering.

use parche_core::Engine;

/// Drives `engine` for at least `frames` frames and returns the planar
/// output channels.
///
/// The engine must be configured. Rendering advances in whole blocks, so
/// the result may run up to one block long.
pub fn render_channels(engine: &mut Engine, frames: usize) -> Vec<Vec<f32>> {
    let Some(config) = engine.config() else {
        return Vec::new();
    };
    let mut channels: Vec<Vec<f32>> = vec![Vec::new(); config.output_channels];
    let mut produced = 0;
    while produced < frames {
        let outputs = engine.produce_next_block(&[]);
        for (dst, src) in channels.iter_mut().zip(outputs.iter()) {
            dst.extend_from_slice(src);
        }
        produced += config.block_size;
    }
    channels
}

#[cfg(test)]
mod tests {
    use super::*;
    use parche_core::{AudioConfig, Patch};

    #[test]
    fn renders_whole_blocks() {
        let mut engine = Engine::new(Patch::new());
        engine.configure(AudioConfig::new(48000.0, 64));
        let channels = render_channels(&mut engine, 100);
        assert_eq!(channels.len(), 2);
        // 100 frames rounds up to two 64-frame blocks.
        assert_eq!(channels[0].len(), 128);
        assert_eq!(engine.frame(), 128);
    }

    #[test]
    fn unconfigured_engine_renders_nothing() {
        let mut engine = Engine::new(Patch::new());
        assert!(render_channels(&mut engine, 64).is_empty());
    }
}
