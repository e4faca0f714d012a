//! Per-model cost accounting.

/// Rates in dollars per 1K tokens.
struct ModelRate {
    model: &'static str,
    input_per_1k: f64,
    output_per_1k: f64,
}

/// Unknown model ids fall back to the baseline entry rather than failing:
/// cost accounting must never block an execution.
const BASELINE_MODEL: &str = "gpt-4o-mini";

const RATES: &[ModelRate] = &[
    ModelRate {
        model: "gpt-4o",
        input_per_1k: 0.0025,
        output_per_1k: 0.01,
    },
    ModelRate {
        model: "gpt-4o-mini",
        input_per_1k: 0.00015,
        output_per_1k: 0.0006,
    },
    ModelRate {
        model: "gpt-4-turbo",
        input_per_1k: 0.01,
        output_per_1k: 0.03,
    },
    ModelRate {
        model: "claude-3-opus",
        input_per_1k: 0.015,
        output_per_1k: 0.075,
    },
    ModelRate {
        model: "claude-3-sonnet",
        input_per_1k: 0.003,
        output_per_1k: 0.015,
    },
    ModelRate {
        model: "claude-3-haiku",
        input_per_1k: 0.00025,
        output_per_1k: 0.00125,
    },
];

fn rate_for(model: &str) -> &'static ModelRate {
    RATES
        .iter()
        .find(|r| r.model == model)
        .or_else(|| RATES.iter().find(|r| r.model == BASELINE_MODEL))
        .expect("baseline model rate present")
}

/// Estimated execution cost in dollars.
pub fn estimate_cost(model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
    let rate = rate_for(model);
    (f64::from(input_tokens) / 1000.0 * rate.input_per_1k)
        + (f64::from(output_tokens) / 1000.0 * rate.output_per_1k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_uses_its_rates() {
        let cost = estimate_cost("gpt-4o", 1000, 1000);
        assert!((cost - 0.0125).abs() < 1e-12);
    }

    #[test]
    fn unknown_model_falls_back_to_baseline() {
        let unknown = estimate_cost("some-future-model", 2000, 500);
        let baseline = estimate_cost("gpt-4o-mini", 2000, 500);
        assert_eq!(unknown, baseline);
    }

    #[test]
    fn zero_tokens_cost_nothing() {
        assert_eq!(estimate_cost("claude-3-haiku", 0, 0), 0.0);
    }
}
