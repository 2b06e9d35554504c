//! Human-readable and JSON rendering of probe results.

use serde_json::{json, Value};
use turnangle_core::{AngleRange, Verdict};
use turnangle_runtime::{ModelSummary, ProbeOutcome};

/// One-line PASS/FAIL message for a verdict.
pub fn verdict_message(verdict: &Verdict, range: AngleRange) -> String {
    match verdict {
        Verdict::Pass { angle } => format!("PASS: Steering angle = {}", angle),
        Verdict::FailNotNumeric => "FAIL: Output was not a numeric value only.".to_string(),
        Verdict::FailOutOfRange { angle } => format!(
            "FAIL: Angle out of range ({}..{}). Value: {}",
            range.min, range.max, angle
        ),
    }
}

/// Troubleshooting text shown when the model server cannot be reached.
pub fn connection_help(model: &str) -> String {
    format!(
        "CRITICAL ERROR: Could not connect to Ollama or the connection was reset.\n\
         Possible causes:\n\
         1) Ollama is not running (run 'ollama serve').\n\
         2) Ollama crashed while processing the image (check Ollama logs).\n\
         3) The '{model}' model is corrupted (try 'ollama rm {model}' then 'ollama pull {model}')."
    )
}

/// Ranking table of per-model summaries, in the order given.
pub fn ranking_table(summaries: &[ModelSummary]) -> String {
    let mut out = String::new();
    out.push_str(&"=".repeat(56));
    out.push_str("\nSTEERING ANGLE RANKING (Highest pass rate first)\n");
    out.push_str(&"=".repeat(56));
    out.push('\n');
    out.push_str(&format!(
        "{:<20} | {:<18} | {:<10}\n",
        "Model", "Pass rate", "Avg Time"
    ));
    out.push_str(&"-".repeat(56));
    out.push('\n');

    for summary in summaries {
        let rate = format!(
            "{}/{} ({:.1}%)",
            summary.passed,
            summary.cases,
            summary.pass_rate() * 100.0
        );
        out.push_str(&format!(
            "{:<20} | {:<18} | {:.2}s\n",
            summary.model,
            rate,
            summary.mean_elapsed.as_secs_f64()
        ));
    }

    out.push_str(&"=".repeat(56));
    out.push('\n');
    out
}

/// JSON document for a batch of probe outcomes and their per-model summary.
pub fn outcomes_json(outcomes: &[ProbeOutcome], summaries: &[ModelSummary]) -> Value {
    let results: Vec<Value> = outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(report) => serde_json::to_value(report).unwrap_or_else(|e| error_json(outcome, e)),
            Err(e) => error_json(outcome, e),
        })
        .collect();

    json!({
        "passed": outcomes.iter().all(ProbeOutcome::passed),
        "results": results,
        "summary": summaries,
    })
}

fn error_json(outcome: &ProbeOutcome, error: impl std::fmt::Display) -> Value {
    json!({
        "model": outcome.model,
        "image": outcome.image,
        "error": error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use turnangle_runtime::{ProbeReport, ProviderError};

    fn report(model: &str, verdict: Verdict, millis: u64) -> ProbeReport {
        ProbeReport {
            model: model.to_string(),
            image: "car-on-road.png".to_string(),
            raw_response: String::new(),
            verdict,
            elapsed: Duration::from_millis(millis),
            probed_at: Default::default(),
        }
    }

    fn summary(model: &str, cases: usize, passed: usize, millis: u64) -> ModelSummary {
        ModelSummary {
            model: model.to_string(),
            cases,
            passed,
            errors: 0,
            mean_elapsed: Duration::from_millis(millis),
        }
    }

    #[test]
    fn test_verdict_messages() {
        let range = AngleRange::STEERING;
        assert_eq!(
            verdict_message(&Verdict::Pass { angle: 32.5 }, range),
            "PASS: Steering angle = 32.5"
        );
        assert_eq!(
            verdict_message(&Verdict::FailNotNumeric, range),
            "FAIL: Output was not a numeric value only."
        );
        assert_eq!(
            verdict_message(&Verdict::FailOutOfRange { angle: 181.0 }, range),
            "FAIL: Angle out of range (-180..180). Value: 181"
        );
    }

    #[test]
    fn test_connection_help_names_model() {
        let help = connection_help("moondream");
        assert!(help.contains("ollama serve"));
        assert!(help.contains("ollama pull moondream"));
    }

    #[test]
    fn test_ranking_table_rows() {
        let table = ranking_table(&[summary("moondream", 3, 3, 800), summary("llava", 3, 2, 1200)]);
        assert!(table.contains("Pass rate"));
        assert!(table.contains("3/3 (100.0%)"));
        assert!(table.contains("2/3 (66.7%)"));
        assert!(table.contains("1.20s"));
        assert!(table.find("moondream").unwrap() < table.find("llava").unwrap());
    }

    #[test]
    fn test_outcomes_json() {
        let outcomes = vec![
            ProbeOutcome {
                model: "llava".to_string(),
                image: "car-on-road.png".to_string(),
                result: Ok(report("llava", Verdict::Pass { angle: 3.0 }, 10)),
            },
            ProbeOutcome {
                model: "ghost".to_string(),
                image: "car-on-road.png".to_string(),
                result: Err(ProviderError::ModelNotFound("ghost".to_string())),
            },
        ];
        let json = outcomes_json(&outcomes, &[summary("llava", 1, 1, 10)]);
        assert_eq!(json["passed"], false);
        assert_eq!(json["results"][0]["verdict"]["angle"], 3.0);
        assert!(json["results"][1]["error"].as_str().unwrap().contains("ghost"));
        assert_eq!(json["results"][1]["image"], "car-on-road.png");
        assert_eq!(json["summary"][0]["model"], "llava");
    }
}
