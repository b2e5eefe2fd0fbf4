//! Terminal front-end: input validation and result rendering
//!
//! Mirrors the constraints of the prediction form: age is an integer in
//! [18, 100] and salary is a non-negative number. An empty line submits the
//! form defaults.

use crate::error::PredictionError;
use crate::metrics::SessionMetrics;
use crate::models::inference::InferenceContext;
use crate::models::loader::{ArtifactState, Readiness};
use crate::types::features::FeatureVector;
use crate::types::prediction::{Prediction, PurchaseClass};
use std::io::{self, BufRead, Write};
use std::time::Instant;
use thiserror::Error;
use tracing::{error, warn};

pub const AGE_MIN: u32 = 18;
pub const AGE_MAX: u32 = 100;
pub const DEFAULT_AGE: u32 = 30;
pub const DEFAULT_SALARY: f64 = 50000.0;

/// One parsed line of user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Predict(FeatureVector),
    Quit,
}

/// Rejected user input; the session re-prompts
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InputError {
    #[error("expected `<age> <salary>`, e.g. `30 50000`")]
    Malformed,

    #[error("age must be a whole number, got `{0}`")]
    InvalidAge(String),

    #[error("age must be between 18 and 100, got {0}")]
    AgeOutOfRange(u32),

    #[error("salary must be a number, got `{0}`")]
    InvalidSalary(String),

    #[error("salary must not be negative")]
    NegativeSalary,
}

/// Parse a line of `<age> <salary>` (whitespace or comma separated)
pub fn parse_line(line: &str) -> Result<Command, InputError> {
    let line = line.trim();

    if line.is_empty() {
        return Ok(Command::Predict(FeatureVector::new(DEFAULT_AGE, DEFAULT_SALARY)));
    }
    if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
        return Ok(Command::Quit);
    }

    let fields: Vec<&str> = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|f| !f.is_empty())
        .collect();

    let [age, salary] = fields.as_slice() else {
        return Err(InputError::Malformed);
    };

    let age: u32 = age
        .parse()
        .map_err(|_| InputError::InvalidAge(age.to_string()))?;
    if !(AGE_MIN..=AGE_MAX).contains(&age) {
        return Err(InputError::AgeOutOfRange(age));
    }

    let salary: f64 = salary
        .parse()
        .ok()
        .filter(|s: &f64| s.is_finite())
        .ok_or_else(|| InputError::InvalidSalary(salary.to_string()))?;
    if salary < 0.0 {
        return Err(InputError::NegativeSalary);
    }

    Ok(Command::Predict(FeatureVector::new(age, salary)))
}

/// Startup banner describing whether predictions are available
pub fn render_readiness(readiness: &Readiness) -> String {
    if readiness.is_ready() {
        return "Model and scaler loaded.".to_string();
    }

    let mut lines = Vec::new();
    let missing = [&readiness.model, &readiness.scaler]
        .iter()
        .any(|r| r.state == ArtifactState::Missing);

    if missing {
        lines.push("Model or scaler not found. Make sure both files exist:".to_string());
        lines.push(format!("  Model path:  {}", readiness.model.path.display()));
        lines.push(format!("  Scaler path: {}", readiness.scaler.path.display()));
    }

    for report in [&readiness.model, &readiness.scaler] {
        if let ArtifactState::Failed { kind, message } = &report.state {
            lines.push(format!(
                "Failed to load {} from {}: {}: {}",
                report.artifact,
                report.path.display(),
                kind,
                message
            ));
        }
    }

    lines.join("\n")
}

/// Result block shown after a successful prediction
pub fn render_prediction(prediction: &Prediction) -> String {
    let verdict = match prediction.class {
        PurchaseClass::WillBuy => "Prediction: customer will likely BUY the product.",
        PurchaseClass::WillNotBuy => "Prediction: customer will likely NOT buy the product.",
    };

    format!(
        "Confidence: {}\n{}",
        prediction.confidence_percent(),
        verdict
    )
}

/// User-facing summary of a failed request
pub fn render_error(err: &PredictionError) -> String {
    match err {
        PredictionError::NotReady { reasons } if reasons.is_empty() => {
            "Model or scaler is not ready.".to_string()
        }
        PredictionError::NotReady { reasons } => {
            format!("Model or scaler is not ready: {}", reasons.join("; "))
        }
        PredictionError::Inference { message, .. } => {
            format!("An error occurred during prediction: {}", message)
        }
        other => other.to_string(),
    }
}

/// Prompt, read and answer requests until `quit` or end of input.
///
/// Unreadable lines (invalid UTF-8) are reported and skipped; only a failing
/// output stream ends the loop with an error.
pub fn run_session<R: BufRead, W: Write>(
    context: &InferenceContext,
    metrics: &SessionMetrics,
    input: R,
    output: &mut W,
) -> io::Result<()> {
    let mut lines = input.lines();

    loop {
        write!(
            output,
            "\nAge and salary (e.g. `30 50000`, empty for defaults, `quit` to exit): "
        )?;
        output.flush()?;

        let line = match lines.next() {
            None => break,
            Some(Ok(line)) => line,
            Some(Err(e)) if e.kind() == io::ErrorKind::InvalidData => {
                warn!(error = %e, "Unreadable input line");
                writeln!(output, "Invalid input: {}", e)?;
                continue;
            }
            Some(Err(e)) => {
                error!(error = %e, "Failed to read input; ending session");
                break;
            }
        };

        let features = match parse_line(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Predict(features)) => features,
            Err(e) => {
                writeln!(output, "Invalid input: {}", e)?;
                continue;
            }
        };

        let start_time = Instant::now();
        match context.predict(&features) {
            Ok(prediction) => {
                metrics.record_prediction(prediction.class, start_time.elapsed());
                writeln!(output, "{}", render_prediction(&prediction))?;
            }
            Err(e) => {
                match e {
                    PredictionError::NotReady { .. } => metrics.record_rejection(),
                    _ => metrics.record_failure(),
                }
                writeln!(output, "{}", render_error(&e))?;
            }
        }
    }

    writeln!(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArtifactKind;
    use crate::models::inference::Classifier;
    use crate::models::loader::ArtifactReport;
    use crate::models::scaler::StandardScaler;
    use std::path::PathBuf;
    use std::sync::atomic::Ordering;

    struct FixedProbability(f64);

    impl Classifier for FixedProbability {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict_proba(&self, _features: &[f32]) -> anyhow::Result<f64> {
            Ok(self.0)
        }
    }

    fn ready_context() -> InferenceContext {
        let scaler = StandardScaler::new(vec![37.5, 70000.0], vec![10.0, 20000.0]).unwrap();
        InferenceContext::new(scaler, Box::new(FixedProbability(0.73)))
    }

    fn readiness(model: ArtifactState, scaler: ArtifactState) -> Readiness {
        Readiness {
            model: ArtifactReport {
                artifact: ArtifactKind::Model,
                path: PathBuf::from("/srv/app/model_prediksi_konsumen.onnx"),
                state: model,
            },
            scaler: ArtifactReport {
                artifact: ArtifactKind::Scaler,
                path: PathBuf::from("/srv/app/scaler.json"),
                state: scaler,
            },
        }
    }

    #[test]
    fn test_parse_valid_lines() {
        assert_eq!(
            parse_line("30 50000").unwrap(),
            Command::Predict(FeatureVector::new(30, 50000.0))
        );
        assert_eq!(
            parse_line(" 45, 120000.5 ").unwrap(),
            Command::Predict(FeatureVector::new(45, 120000.5))
        );
        assert_eq!(
            parse_line("").unwrap(),
            Command::Predict(FeatureVector::new(DEFAULT_AGE, DEFAULT_SALARY))
        );
        assert_eq!(parse_line("QUIT").unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_enforces_form_bounds() {
        assert_eq!(parse_line("17 50000"), Err(InputError::AgeOutOfRange(17)));
        assert_eq!(parse_line("101 50000"), Err(InputError::AgeOutOfRange(101)));
        assert!(parse_line("18 0").is_ok());
        assert!(parse_line("100 0").is_ok());
        assert_eq!(parse_line("30 -1"), Err(InputError::NegativeSalary));
        assert_eq!(
            parse_line("30.5 50000"),
            Err(InputError::InvalidAge("30.5".to_string()))
        );
        assert_eq!(
            parse_line("30 inf"),
            Err(InputError::InvalidSalary("inf".to_string()))
        );
        assert_eq!(parse_line("30"), Err(InputError::Malformed));
        assert_eq!(parse_line("30 50000 7"), Err(InputError::Malformed));
    }

    #[test]
    fn test_render_prediction() {
        let text = render_prediction(&Prediction::from_probability(0.73));
        assert_eq!(
            text,
            "Confidence: 73.00%\nPrediction: customer will likely BUY the product."
        );

        let text = render_prediction(&Prediction::from_probability(0.2));
        assert!(text.starts_with("Confidence: 80.00%"));
        assert!(text.contains("NOT buy"));
    }

    #[test]
    fn test_render_missing_shows_both_paths() {
        let text = render_readiness(&readiness(ArtifactState::Missing, ArtifactState::Skipped));
        assert!(text.contains("/srv/app/model_prediksi_konsumen.onnx"));
        assert!(text.contains("/srv/app/scaler.json"));
    }

    #[test]
    fn test_render_failure_names_kind() {
        let text = render_readiness(&readiness(
            ArtifactState::Failed {
                kind: "onnx".to_string(),
                message: "protobuf parsing failed".to_string(),
            },
            ArtifactState::Loaded,
        ));
        assert!(text.contains("Failed to load model"));
        assert!(text.contains("onnx: protobuf parsing failed"));
        assert!(!text.contains("not found"));
    }

    #[test]
    fn test_render_not_ready_keeps_reasons() {
        let err = PredictionError::NotReady {
            reasons: vec![
                "model: not found at /srv/app/model_prediksi_konsumen.onnx".to_string(),
                "scaler: not loaded because its pair is incomplete (/srv/app/scaler.json)"
                    .to_string(),
            ],
        };
        assert_eq!(
            render_error(&err),
            "Model or scaler is not ready: model: not found at /srv/app/model_prediksi_konsumen.onnx; \
             scaler: not loaded because its pair is incomplete (/srv/app/scaler.json)"
        );
    }

    #[test]
    fn test_render_ready() {
        let text = render_readiness(&readiness(ArtifactState::Loaded, ArtifactState::Loaded));
        assert_eq!(text, "Model and scaler loaded.");
    }

    #[test]
    fn test_session_survives_unreadable_line() {
        let context = ready_context();
        let metrics = SessionMetrics::new();
        let input: &[u8] = b"30 50000\n\xff\xfe\n45 90000\nquit\n50 1000\n";
        let mut output = Vec::new();

        run_session(&context, &metrics, input, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(metrics.predictions(), 2);
        assert_eq!(metrics.will_buy.load(Ordering::Relaxed), 2);
        assert!(text.contains("Invalid input"));
        assert_eq!(text.matches("Confidence: 73.00%").count(), 2);
    }

    #[test]
    fn test_session_counts_rejections() {
        let context = InferenceContext::not_ready(vec!["model: not found".to_string()]);
        let metrics = SessionMetrics::new();
        let input: &[u8] = b"30 50000\n17 50000\n";
        let mut output = Vec::new();

        run_session(&context, &metrics, input, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(metrics.rejected.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.predictions(), 0);
        assert!(text.contains("Model or scaler is not ready: model: not found"));
        assert!(text.contains("age must be between 18 and 100, got 17"));
    }
}
