//! Prompts sent alongside the road image.
//!
//! The prompt asks for a bare number so the reply can go straight through
//! strict validation without any extraction step.

/// Steering prompt for the `[-180, 180]` range.
pub const STEERING_ANGLE_PROMPT: &str = "Based on the image, return ONLY one numeric steering turn angle in degrees.
The value must be between -180 and 180.
Do not include words, units, punctuation, or explanation.
Examples of valid output:
-15
0
32.5
";
