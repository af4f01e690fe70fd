//! What the player reads off a tuned signal.

use rand::Rng;

use super::SignalDefinition;

/// Placeholder shown for signals that have not been decoded yet.
pub const ENCRYPTED_PLACEHOLDER: &str = "[ENCRYPTED SIGNAL]";

/// Placeholder shown when reception is below the signal's threshold.
pub const TOO_WEAK_PLACEHOLDER: &str = "[SIGNAL TOO WEAK]";

/// Strength above which content comes through clean.
pub const CLEAN_RECEPTION: f32 = 0.8;

impl SignalDefinition {
    /// Text shown for this signal at `strength`.
    ///
    /// Weak reception replaces `floor(len * (1 - strength) * 0.5)` characters
    /// with `*`, picked with `rng`.
    pub fn display_content<R: Rng + ?Sized>(
        &self,
        strength: f32,
        decoded: bool,
        rng: &mut R,
    ) -> String {
        if !decoded {
            return ENCRYPTED_PLACEHOLDER.to_owned();
        }
        if strength < self.min_signal_strength {
            return TOO_WEAK_PLACEHOLDER.to_owned();
        }
        if strength >= CLEAN_RECEPTION {
            return self.decoded_content.clone();
        }
        garble(&self.decoded_content, strength, rng)
    }
}

/// Replace a strength-dependent share of characters with static.
pub fn garble<R: Rng + ?Sized>(text: &str, strength: f32, rng: &mut R) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return String::new();
    }

    let static_amount = (1.0 - strength).clamp(0.0, 1.0);
    let static_chars = (chars.len() as f32 * static_amount * 0.5) as usize;
    for _ in 0..static_chars {
        let index = rng.gen_range(0..chars.len());
        chars[index] = '*';
    }
    chars.into_iter().collect()
}
