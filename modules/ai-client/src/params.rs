use serde::{Deserialize, Serialize};

/// Sampling parameters for a chat completion.
///
/// Every field is optional; unset fields fall back to the provider default.
/// Values are forwarded as-is and validated only by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
}

impl CompletionParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    pub fn presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    /// Overlay `overrides` on top of `self`. Fields set in `overrides` win.
    pub fn merged(&self, overrides: &CompletionParams) -> CompletionParams {
        CompletionParams {
            temperature: overrides.temperature.or(self.temperature),
            max_tokens: overrides.max_tokens.or(self.max_tokens),
            top_p: overrides.top_p.or(self.top_p),
            frequency_penalty: overrides.frequency_penalty.or(self.frequency_penalty),
            presence_penalty: overrides.presence_penalty.or(self.presence_penalty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_over_base() {
        let base = CompletionParams::new().temperature(0.2).max_tokens(100).top_p(1.0);
        let overrides = CompletionParams::new().temperature(0.9);
        let merged = base.merged(&overrides);
        assert_eq!(merged.temperature, Some(0.9));
        assert_eq!(merged.max_tokens, Some(100));
        assert_eq!(merged.top_p, Some(1.0));
        assert_eq!(merged.frequency_penalty, None);
    }

    #[test]
    fn unset_fields_are_not_serialized() {
        let params = CompletionParams::new().max_tokens(50);
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!({ "max_tokens": 50 }));
    }
}
