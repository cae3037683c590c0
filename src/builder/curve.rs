use serde::Serialize;

use crate::config::CurveConfig;
use crate::models::card::Card;
use crate::models::deck::ThemeInfo;
use crate::models::strategy::Archetype;

/// Mana curve of the cards selected so far. Bucket 7 holds everything at 7+.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveStats {
    pub histogram: [usize; 8],
    pub average: f64,
    pub ramp_density: f64,
}

/// `None` for an empty selection.
pub fn analyze_curve<'c, I>(cards: I, ramp_count: usize) -> Option<CurveStats>
where
    I: IntoIterator<Item = &'c Card>,
{
    let mut histogram = [0usize; 8];
    let mut total = 0.0;
    let mut count = 0usize;
    for card in cards {
        let bucket = (card.mana_value().floor() as usize).min(7);
        histogram[bucket] += 1;
        total += card.mana_value();
        count += 1;
    }

    if count == 0 {
        return None;
    }

    Some(CurveStats {
        histogram,
        average: total / count as f64,
        ramp_density: ramp_count as f64 / count as f64,
    })
}

/// Highest mana value the deck wants before penalties start.
pub fn desired_ceiling(theme: Option<&ThemeInfo>, archetype: Archetype, config: &CurveConfig) -> f64 {
    let hint = format!(
        "{} {}",
        theme.and_then(|t| t.theme.as_deref()).unwrap_or_default(),
        archetype.tag()
    );
    let has_marker = |markers: &[String]| markers.iter().any(|m| hint.contains(m.as_str()));

    if has_marker(&config.aggressive_markers) {
        config.aggressive_ceiling
    } else if has_marker(&config.slow_markers) {
        config.slow_ceiling
    } else {
        config.default_ceiling
    }
}

/// Penalty subtracted from a candidate's score at selection time.
pub fn curve_penalty(
    card: &Card,
    ceiling: f64,
    ramp_count: usize,
    curve: Option<&CurveStats>,
    config: &CurveConfig,
) -> f64 {
    let mana_value = card.mana_value();
    if mana_value <= ceiling {
        return 0.0;
    }

    let mut penalty = (mana_value - ceiling) * config.penalty_per_point;
    let relief = (ramp_count as f64 * config.ramp_relief_per_card).min(config.max_ramp_relief);

    if let Some(curve) = curve {
        if curve.average < config.low_average {
            penalty *= config.low_average_scale;
        } else if curve.average > config.high_average {
            penalty *= config.high_average_scale;
        }
    }

    (penalty * (1.0 - relief)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::fixtures::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_full_penalty_without_ramp() {
        let config = CurveConfig::default();
        let theme = ThemeInfo::new(Some("aggro"), None);
        let ceiling = desired_ceiling(Some(&theme), Archetype::Midrange, &config);
        assert_eq!(ceiling, 3.0);

        let titan = creature("Titan", "G", 9.0, "");
        assert_eq!(curve_penalty(&titan, ceiling, 0, None, &config), 60.0);
    }

    #[test]
    fn test_ramp_relief_is_capped() {
        let config = CurveConfig::default();
        let titan = creature("Titan", "G", 9.0, "");
        assert!(close(curve_penalty(&titan, 3.0, 3, None, &config), 42.0));
        assert!(close(curve_penalty(&titan, 3.0, 8, None, &config), 12.0));
        assert!(close(curve_penalty(&titan, 3.0, 20, None, &config), 12.0));
    }

    #[test]
    fn test_curve_scaling() {
        let config = CurveConfig::default();
        let titan = creature("Titan", "G", 9.0, "");

        let cheap = creatures("Cheap", "G", 4);
        let low = analyze_curve(&cheap, 0).unwrap();
        assert_eq!(low.average, 2.0);
        assert!(close(curve_penalty(&titan, 4.0, 0, Some(&low), &config), 60.0));

        let fat = vec![creature("Fat", "G", 6.0, ""), creature("Fatter", "G", 8.0, "")];
        let high = analyze_curve(&fat, 1).unwrap();
        assert_eq!(high.histogram[6], 1);
        assert_eq!(high.histogram[7], 1);
        assert_eq!(high.ramp_density, 0.5);
        assert!(close(curve_penalty(&titan, 4.0, 0, Some(&high), &config), 40.0));
    }

    #[test]
    fn test_no_penalty_at_or_below_ceiling() {
        let config = CurveConfig::default();
        let bear = creature("Bear", "G", 2.0, "");
        let four = creature("Four", "G", 4.0, "");
        assert_eq!(curve_penalty(&bear, 3.0, 0, None, &config), 0.0);
        assert_eq!(curve_penalty(&four, 4.0, 0, None, &config), 0.0);
    }

    #[test]
    fn test_ceiling_by_archetype() {
        let config = CurveConfig::default();
        assert_eq!(desired_ceiling(None, Archetype::Control, &config), 5.0);
        assert_eq!(desired_ceiling(None, Archetype::Ramp, &config), 5.0);
        assert_eq!(desired_ceiling(None, Archetype::Tokens, &config), 4.0);
        let fast = ThemeInfo::new(Some("fast"), None);
        assert_eq!(desired_ceiling(Some(&fast), Archetype::Control, &config), 3.0);
        assert!(analyze_curve(&Vec::new(), 0).is_none());
    }
}
