//! Temperature band classification
//!
//! Bands are checked in a fixed order: extreme heat, heat, extreme cold,
//! cold, then normal. The historical comparison only qualifies the normal
//! band and never changes kind or severity.

use serde::{Deserialize, Serialize};

/// Temperature thresholds (Celsius)
pub const EXTREME_HOT_C: f64 = 40.0;
pub const HOT_THRESHOLD_C: f64 = 30.0;
pub const COLD_THRESHOLD_C: f64 = 10.0;
pub const EXTREME_COLD_C: f64 = 0.0;

/// Deviation from the historical average that counts as unusual
pub const TREND_MARGIN_C: f64 = 5.0;

/// Classifier configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureThresholds {
    /// temp >= this is extreme heat
    pub extreme_hot_c: f64,
    /// temp >= this is heat
    pub hot_c: f64,
    /// temp <= this is extreme cold
    pub extreme_cold_c: f64,
    /// temp <= this is cold
    pub cold_c: f64,
    pub trend_margin_c: f64,
}

impl Default for TemperatureThresholds {
    fn default() -> Self {
        Self {
            extreme_hot_c: EXTREME_HOT_C,
            hot_c: HOT_THRESHOLD_C,
            extreme_cold_c: EXTREME_COLD_C,
            cold_c: COLD_THRESHOLD_C,
            trend_margin_c: TREND_MARGIN_C,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    ExtremeHot,
    Hot,
    Normal,
    Cold,
    ExtremeCold,
}

impl AlertKind {
    pub fn is_hot(&self) -> bool {
        matches!(self, Self::ExtremeHot | Self::Hot)
    }

    pub fn is_cold(&self) -> bool {
        matches!(self, Self::ExtremeCold | Self::Cold)
    }

    /// Primary color of the alert
    pub fn color(&self) -> &'static str {
        match self {
            Self::ExtremeHot => "#DC2626",
            Self::Hot => "#EF4444",
            Self::ExtremeCold => "#1E40AF",
            Self::Cold => "#3B82F6",
            Self::Normal => "#10B981",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::ExtremeHot | Self::ExtremeCold => Severity::Extreme,
            Self::Hot | Self::Cold => Severity::High,
            Self::Normal => Severity::Low,
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::ExtremeHot => "Stay indoors! Avoid outdoor activities. Risk of heat stroke.",
            Self::Hot => "Avoid going out during peak hours. Stay hydrated if you must go out.",
            Self::ExtremeCold => "Stay indoors! Risk of hypothermia. Avoid outdoor activities.",
            Self::Cold => "Dress warmly if going out. Limit outdoor exposure.",
            Self::Normal => "Weather conditions are suitable for outdoor activities.",
        }
    }

    /// Card icon name
    pub fn icon(&self) -> &'static str {
        match self {
            Self::ExtremeHot | Self::Hot => "sun",
            Self::ExtremeCold | Self::Cold => "snowflake",
            Self::Normal => "check-circle",
        }
    }

    fn headline(&self) -> &'static str {
        match self {
            Self::ExtremeHot => "Extreme Heat Alert",
            Self::Hot => "High Temperature Alert",
            Self::ExtremeCold => "Extreme Cold Alert",
            Self::Cold => "Low Temperature Alert",
            Self::Normal => "Comfortable Temperature",
        }
    }
}

/// Coarse risk tier used for styling and alert urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Extreme,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Extreme => "extreme",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current temperature relative to the recent average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureTrend {
    WarmerThanUsual,
    CoolerThanUsual,
    Normal,
}

impl TemperatureTrend {
    pub fn compare(current_c: f64, historical_avg_c: f64, margin_c: f64) -> Self {
        if current_c > historical_avg_c + margin_c {
            Self::WarmerThanUsual
        } else if current_c < historical_avg_c - margin_c {
            Self::CoolerThanUsual
        } else {
            Self::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::WarmerThanUsual => "warmer than usual",
            Self::CoolerThanUsual => "cooler than usual",
            Self::Normal => "normal",
        }
    }
}

/// Classification result shown on the weather safety card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub recommendation: String,
    pub severity: Severity,
    pub color: String,
    /// Only set in the normal band when an average was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TemperatureTrend>,
}

impl WeatherAlert {
    pub fn is_hot(&self) -> bool {
        self.kind.is_hot()
    }

    pub fn is_cold(&self) -> bool {
        self.kind.is_cold()
    }

    pub fn background_color(&self) -> &'static str {
        match self.severity {
            Severity::Extreme if self.is_hot() => "#FEE2E2",
            Severity::Extreme => "#DBEAFE",
            Severity::High if self.is_hot() => "#FEF3C7",
            Severity::High => "#E0F2FE",
            Severity::Medium => "#FEF3C7",
            Severity::Low => "#D1FAE5",
        }
    }

    pub fn border_color(&self) -> &str {
        match self.severity {
            Severity::Extreme | Severity::High => &self.color,
            _ => "#E5E7EB",
        }
    }

    pub fn border_width(&self) -> u8 {
        if self.severity == Severity::Extreme {
            2
        } else {
            1
        }
    }

    /// Whether the card shows the "Safety Alert Active" footer
    pub fn is_safety_alert_active(&self) -> bool {
        self.severity != Severity::Low
    }
}

/// Classify with the default thresholds
pub fn classify(current_temp_c: f64, historical_avg_c: Option<f64>) -> WeatherAlert {
    classify_with(&TemperatureThresholds::default(), current_temp_c, historical_avg_c)
}

/// Classify a temperature.
///
/// A non-finite temperature fails every band check and lands in the normal
/// band; callers that fetch upstream data should skip classification instead.
pub fn classify_with(
    thresholds: &TemperatureThresholds,
    current_temp_c: f64,
    historical_avg_c: Option<f64>,
) -> WeatherAlert {
    let kind = if current_temp_c >= thresholds.extreme_hot_c {
        AlertKind::ExtremeHot
    } else if current_temp_c >= thresholds.hot_c {
        AlertKind::Hot
    } else if current_temp_c <= thresholds.extreme_cold_c {
        AlertKind::ExtremeCold
    } else if current_temp_c <= thresholds.cold_c {
        AlertKind::Cold
    } else {
        AlertKind::Normal
    };

    let trend = match (kind, historical_avg_c) {
        (AlertKind::Normal, Some(avg)) => Some(TemperatureTrend::compare(
            current_temp_c,
            avg,
            thresholds.trend_margin_c,
        )),
        _ => None,
    };

    // Adding +0.0 turns -0.0 into 0.0
    let shown_c = current_temp_c + 0.0;
    let message = match trend {
        Some(t) => format!("{}: {}°C ({})", kind.headline(), shown_c, t.label()),
        None => format!("{}: {}°C", kind.headline(), shown_c),
    };

    WeatherAlert {
        kind,
        message,
        recommendation: kind.recommendation().to_string(),
        severity: kind.severity(),
        color: kind.color().to_string(),
        trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        let cases = [
            (40.0, AlertKind::ExtremeHot, Severity::Extreme),
            (39.9, AlertKind::Hot, Severity::High),
            (30.0, AlertKind::Hot, Severity::High),
            (29.9, AlertKind::Normal, Severity::Low),
            (20.0, AlertKind::Normal, Severity::Low),
            (10.1, AlertKind::Normal, Severity::Low),
            (10.0, AlertKind::Cold, Severity::High),
            (0.1, AlertKind::Cold, Severity::High),
            (0.0, AlertKind::ExtremeCold, Severity::Extreme),
            (-15.0, AlertKind::ExtremeCold, Severity::Extreme),
        ];

        for (temp, kind, severity) in cases {
            let alert = classify(temp, None);
            assert_eq!(alert.kind, kind, "temp {}", temp);
            assert_eq!(alert.severity, severity, "temp {}", temp);
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(classify(40.0, None).message, "Extreme Heat Alert: 40°C");
        assert_eq!(classify(39.9, None).message, "High Temperature Alert: 39.9°C");
        assert_eq!(classify(0.1, None).message, "Low Temperature Alert: 0.1°C");
        assert_eq!(classify(-3.5, None).message, "Extreme Cold Alert: -3.5°C");
        assert_eq!(classify(20.0, None).message, "Comfortable Temperature: 20°C");
    }

    #[test]
    fn test_negative_zero_message() {
        let alert = classify(-0.0, None);
        assert_eq!(alert.kind, AlertKind::ExtremeCold);
        assert_eq!(alert.message, "Extreme Cold Alert: 0°C");
    }

    #[test]
    fn test_warmer_than_usual() {
        let alert = classify(20.0, Some(10.0));
        assert_eq!(alert.kind, AlertKind::Normal);
        assert_eq!(alert.severity, Severity::Low);
        assert_eq!(alert.trend, Some(TemperatureTrend::WarmerThanUsual));
        assert_eq!(alert.message, "Comfortable Temperature: 20°C (warmer than usual)");
    }

    #[test]
    fn test_cooler_and_normal_qualifiers() {
        assert!(classify(15.0, Some(25.0)).message.ends_with("(cooler than usual)"));
        assert!(classify(15.0, Some(20.0)).message.ends_with("(normal)"));
        // Exactly avg + 5 is not warmer
        assert_eq!(classify(25.0, Some(20.0)).trend, Some(TemperatureTrend::Normal));
    }

    #[test]
    fn test_zero_average_is_real_data() {
        let alert = classify(20.0, Some(0.0));
        assert_eq!(alert.trend, Some(TemperatureTrend::WarmerThanUsual));
    }

    #[test]
    fn test_history_ignored_outside_normal_band() {
        let alert = classify(35.0, Some(10.0));
        assert_eq!(alert.kind, AlertKind::Hot);
        assert!(alert.trend.is_none());
        assert_eq!(alert.message, "High Temperature Alert: 35°C");
    }

    #[test]
    fn test_classification_is_repeatable() {
        let a = classify(22.5, Some(18.0));
        let b = classify(22.5, Some(18.0));
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_colors_distinguish_hot_and_cold_extremes() {
        let hot = classify(45.0, None);
        let cold = classify(-5.0, None);
        assert_eq!(hot.severity, cold.severity);
        assert_eq!(hot.color, "#DC2626");
        assert_eq!(cold.color, "#1E40AF");
        assert_eq!(hot.background_color(), "#FEE2E2");
        assert_eq!(cold.background_color(), "#DBEAFE");
        assert_eq!(hot.border_width(), 2);
    }

    #[test]
    fn test_card_styling() {
        let cold = classify(5.0, None);
        assert_eq!(cold.background_color(), "#E0F2FE");
        assert_eq!(cold.border_color(), "#3B82F6");
        assert!(cold.is_safety_alert_active());

        let normal = classify(20.0, None);
        assert_eq!(normal.background_color(), "#D1FAE5");
        assert_eq!(normal.border_color(), "#E5E7EB");
        assert_eq!(normal.border_width(), 1);
        assert!(!normal.is_safety_alert_active());
        assert_eq!(normal.kind.icon(), "check-circle");
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = TemperatureThresholds {
            hot_c: 25.0,
            ..TemperatureThresholds::default()
        };
        assert_eq!(classify_with(&thresholds, 26.0, None).kind, AlertKind::Hot);
        assert_eq!(classify(26.0, None).kind, AlertKind::Normal);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(classify(41.0, None)).unwrap();
        assert_eq!(json["type"], "extreme_hot");
        assert_eq!(json["severity"], "extreme");
        assert!(json.get("trend").is_none());
    }

    #[test]
    fn test_nan_lands_in_normal_band() {
        let alert = classify(f64::NAN, None);
        assert_eq!(alert.kind, AlertKind::Normal);
    }
}
