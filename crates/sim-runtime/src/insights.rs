//! Results-view insights derived from a finished snapshot.

use serde::Serialize;
use sim_core::{EmployeeQuality, OutcomeSnapshot, Station};
use std::fmt;

/// Performance gap (in quality points) above which the team is flagged.
pub const PERFORMANCE_GAP_ALERT: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum QualityGrade {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl QualityGrade {
    /// Grade of the team average: 95 / 85 / 75 thresholds.
    pub fn for_team(average_quality: f64) -> Self {
        Self::grade(average_quality, [95.0, 85.0, 75.0])
    }

    /// Grade of a single employee: 95 / 90 / 85 thresholds.
    pub fn for_employee(quality: f64) -> Self {
        Self::grade(quality, [95.0, 90.0, 85.0])
    }

    fn grade(q: f64, [excellent, good, fair]: [f64; 3]) -> Self {
        if q >= excellent {
            QualityGrade::Excellent
        } else if q >= good {
            QualityGrade::Good
        } else if q >= fair {
            QualityGrade::Fair
        } else {
            QualityGrade::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityGrade::Excellent => "Excellent",
            QualityGrade::Good => "Good",
            QualityGrade::Fair => "Fair",
            QualityGrade::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PerformanceInsights {
    pub grade: QualityGrade,
    pub average_quality: f64,
    pub top_performer: Option<EmployeeQuality>,
    pub lowest_performer: Option<EmployeeQuality>,
    /// Quality points between top and lowest performer, 1 dp.
    pub performance_gap: f64,
    /// Defective units as a percent of the order.
    pub defect_rate_percent: f64,
    pub advice: Vec<String>,
}

impl PerformanceInsights {
    /// Insights for a sampled snapshot; `None` when no crew worked on it.
    pub fn from_snapshot(snapshot: &OutcomeSnapshot) -> Option<Self> {
        let average = snapshot.average_quality_across_workers?;
        Some(Self::compute(
            &snapshot.per_employee_quality,
            average,
            snapshot.bottleneck_station,
            snapshot.defective_units.unwrap_or(0),
            snapshot.quantity,
        ))
    }

    pub fn compute(
        employees: &[EmployeeQuality],
        average_quality: f64,
        bottleneck: Option<Station>,
        defective_units: u64,
        quantity: u64,
    ) -> Self {
        let mut sorted: Vec<&EmployeeQuality> = employees.iter().collect();
        sorted.sort_by(|a, b| b.quality.total_cmp(&a.quality));
        let top = sorted.first().map(|e| (*e).clone());
        let lowest = sorted.last().map(|e| (*e).clone());
        let performance_gap = match (&top, &lowest) {
            (Some(t), Some(l)) => ((t.quality - l.quality) * 10.0).round() / 10.0,
            _ => 0.0,
        };
        let defect_rate_percent = if quantity > 0 {
            defective_units as f64 / quantity as f64 * 100.0
        } else {
            0.0
        };

        let mut advice = Vec::new();
        advice.push(
            if average_quality >= 90.0 {
                "Excellent team quality - maintain current setup"
            } else if average_quality >= 80.0 {
                "Good quality performance - room for improvement"
            } else {
                "Quality needs attention - consider optimizing assignments"
            }
            .to_string(),
        );
        if let Some(station) = bottleneck {
            advice.push(format!("Focus on {station} to improve speed"));
        }
        if performance_gap > PERFORMANCE_GAP_ALERT {
            advice.push("Large performance gap between employees".to_string());
        }

        Self {
            grade: QualityGrade::for_team(average_quality),
            average_quality,
            top_performer: top,
            lowest_performer: lowest,
            performance_gap,
            defect_rate_percent,
            advice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(id: &str, quality: f64) -> EmployeeQuality {
        EmployeeQuality { id: id.into(), name: id.into(), defective: 0, quality }
    }

    #[test]
    fn team_and_employee_grades_use_their_own_thresholds() {
        assert_eq!(QualityGrade::for_team(95.0), QualityGrade::Excellent);
        assert_eq!(QualityGrade::for_team(86.0), QualityGrade::Good);
        assert_eq!(QualityGrade::for_team(80.0), QualityGrade::Fair);
        assert_eq!(QualityGrade::for_team(60.0), QualityGrade::NeedsImprovement);
        assert_eq!(QualityGrade::for_employee(86.0), QualityGrade::Fair);
        assert_eq!(QualityGrade::for_employee(84.9).to_string(), "Needs Improvement");
    }

    #[test]
    fn insights_flag_gap_and_bottleneck() {
        let team = [eq("a", 98.0), eq("b", 85.5), eq("c", 91.0)];
        let i = PerformanceInsights::compute(&team, 91.5, Some(Station::Assembly), 45, 1000);
        assert_eq!(i.grade, QualityGrade::Good);
        assert_eq!(i.top_performer.as_ref().map(|e| e.id.as_str()), Some("a"));
        assert_eq!(i.lowest_performer.as_ref().map(|e| e.id.as_str()), Some("b"));
        assert_eq!(i.performance_gap, 12.5);
        assert!((i.defect_rate_percent - 4.5).abs() < 1e-9);
        assert_eq!(
            i.advice,
            vec![
                "Excellent team quality - maintain current setup".to_string(),
                "Focus on assembly to improve speed".to_string(),
                "Large performance gap between employees".to_string(),
            ]
        );
    }

    #[test]
    fn quiet_team_gets_single_advice_line() {
        let i = PerformanceInsights::compute(&[eq("a", 82.0)], 82.0, None, 0, 0);
        assert_eq!(i.performance_gap, 0.0);
        assert_eq!(i.defect_rate_percent, 0.0);
        assert_eq!(i.advice, vec!["Good quality performance - room for improvement".to_string()]);
    }
}
