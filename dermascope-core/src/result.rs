use crate::models::{PredictionResult, Probability};

/// Urgency tier derived from model confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            Self::High
        } else if confidence >= 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            Self::High => {
                "Consult a dermatologist within 3–7 days. This requires immediate medical attention."
            }
            Self::Medium => "Book an appointment within 2–4 weeks for professional evaluation.",
            Self::Low => "Monitor the area and consider rechecking in 8–12 weeks if changes occur.",
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            Self::High => "badge badge-high",
            Self::Medium => "badge badge-medium",
            Self::Low => "badge badge-low",
        }
    }
}

/// Confidence as a whole percentage, as shown on the prediction card
pub fn confidence_percent(confidence: f64) -> u32 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Colour and note for the confidence bar, keyed on the rounded percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Moderate,
    Lower,
}

impl ConfidenceTier {
    pub fn from_percent(pct: u32) -> Self {
        match pct {
            80..=u32::MAX => Self::High,
            50..=79 => Self::Moderate,
            _ => Self::Lower,
        }
    }

    pub fn note(&self) -> &'static str {
        match self {
            Self::High => "High confidence - Consider professional medical consultation",
            Self::Moderate => "Moderate confidence - Monitor and seek advice if concerned",
            Self::Lower => "Lower confidence - Additional imaging may be beneficial",
        }
    }

    pub fn bar_class(&self) -> &'static str {
        match self {
            Self::High => "confidence-bar tier-high",
            Self::Moderate => "confidence-bar tier-moderate",
            Self::Lower => "confidence-bar tier-lower",
        }
    }
}

/// Resolve an image URL from the API against `media_base`.
///
/// Absolute URLs are kept; relative ones are prefixed with the base.
pub fn resolve_media_url(media_base: &str, url: Option<&str>) -> Option<String> {
    let url = url.map(str::trim).filter(|u| !u.is_empty())?;
    if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("data:") {
        return Some(url.to_string());
    }
    if url.starts_with('/') {
        Some(format!("{}{}", media_base, url))
    } else {
        Some(format!("{}/{}", media_base, url))
    }
}

/// Everything the result view renders, derived once from a prediction
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    pub predicted_class: String,
    pub confidence: f64,
    pub percent: u32,
    pub severity: Severity,
    pub image_url: Option<String>,
    pub heatmap_url: Option<String>,
}

impl ResultSummary {
    pub fn new(result: &PredictionResult, media_base: &str) -> Self {
        Self {
            predicted_class: result.predicted_class.clone(),
            confidence: result.confidence,
            percent: confidence_percent(result.confidence),
            severity: Severity::from_confidence(result.confidence),
            image_url: resolve_media_url(media_base, result.image_url.as_deref()),
            heatmap_url: resolve_media_url(media_base, result.heatmap_url.as_deref()),
        }
    }

    pub fn explanation(&self) -> String {
        format!(
            "The AI has analyzed your skin image and identified it as {} with {:.1}% confidence. \
             The heatmap visualization shows which areas of the image were most important in \
             making this diagnosis. This tool is for informational purposes only and should not \
             replace professional medical advice.",
            self.predicted_class,
            self.confidence * 100.0
        )
    }
}

/// One row of the probability distribution chart
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityBar {
    pub label: String,
    /// Score as a percentage with one decimal
    pub percent: f64,
    /// Bar width relative to the best score, floored at 5 so tiny scores stay visible
    pub width: f64,
}

pub fn probability_bars(probabilities: &[Probability]) -> Vec<ProbabilityBar> {
    let max_score = probabilities
        .iter()
        .map(|p| p.score)
        .fold(0.0_f64, f64::max);

    probabilities
        .iter()
        .map(|p| ProbabilityBar {
            label: p.label.to_uppercase(),
            percent: (p.score * 1000.0).round() / 10.0,
            width: if max_score > 0.0 {
                (p.score / max_score * 100.0).max(5.0)
            } else {
                5.0
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_boundaries() {
        assert_eq!(Severity::from_confidence(0.8), Severity::High);
        assert_eq!(Severity::from_confidence(0.95), Severity::High);
        assert_eq!(Severity::from_confidence(0.79), Severity::Medium);
        assert_eq!(Severity::from_confidence(0.5), Severity::Medium);
        assert_eq!(Severity::from_confidence(0.49), Severity::Low);
        assert_eq!(Severity::from_confidence(0.0), Severity::Low);
    }

    #[test]
    fn test_advice_text() {
        assert!(Severity::High.advice().contains("3–7 days"));
        assert!(Severity::Medium.advice().contains("2–4 weeks"));
        assert!(Severity::Low.advice().contains("8–12 weeks"));
    }

    #[test]
    fn test_confidence_percent() {
        assert_eq!(confidence_percent(0.92), 92);
        assert_eq!(confidence_percent(1.2), 100);
    }

    #[test]
    fn test_confidence_tiers() {
        assert_eq!(ConfidenceTier::from_percent(80), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_percent(79), ConfidenceTier::Moderate);
        assert_eq!(ConfidenceTier::from_percent(49), ConfidenceTier::Lower);
    }

    #[test]
    fn test_resolve_media_url() {
        let base = "http://localhost:8000";
        assert_eq!(
            resolve_media_url(base, Some("/static/test.jpg")).as_deref(),
            Some("http://localhost:8000/static/test.jpg")
        );
        assert_eq!(
            resolve_media_url(base, Some("https://cdn.example.com/h.jpg")).as_deref(),
            Some("https://cdn.example.com/h.jpg")
        );
        assert_eq!(
            resolve_media_url(base, Some("uploads/a.jpg")).as_deref(),
            Some("http://localhost:8000/uploads/a.jpg")
        );
        assert_eq!(resolve_media_url(base, Some("")), None);
        assert_eq!(resolve_media_url(base, None), None);
    }

    #[test]
    fn test_summary_for_melanoma() {
        let result = PredictionResult {
            id: Some(1),
            predicted_class: "Melanoma".to_string(),
            confidence: 0.92,
            image_url: Some("/static/test.jpg".to_string()),
            heatmap_url: Some("/static/heatmap.jpg".to_string()),
            image_path: None,
            timestamp: None,
            probabilities: vec![],
        };
        let summary = ResultSummary::new(&result, "http://localhost:8000");
        assert_eq!(summary.percent, 92);
        assert_eq!(format!("{}%", summary.percent), "92%");
        assert_eq!(summary.severity, Severity::High);
        assert_eq!(
            summary.heatmap_url.as_deref(),
            Some("http://localhost:8000/static/heatmap.jpg")
        );
        assert!(summary.explanation().contains("Melanoma with 92.0% confidence"));
    }

    #[test]
    fn test_probability_bars() {
        let probabilities = vec![
            Probability { label: "mel".to_string(), score: 0.8 },
            Probability { label: "nv".to_string(), score: 0.01 },
        ];
        let bars = probability_bars(&probabilities);
        assert_eq!(bars[0].label, "MEL");
        assert_eq!(bars[0].width, 100.0);
        assert_eq!(bars[0].percent, 80.0);
        assert_eq!(bars[1].width, 5.0);
        assert_eq!(bars[1].percent, 1.0);
    }
}
