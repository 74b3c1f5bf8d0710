//! Final tier-threshold pass over scored, compliance-filtered leads.
//!
//! The gate never backfills: when fewer leads pass than were requested the
//! shortfall is reported as a warning and the delivered count stays short.
use crate::coverage::percent;
use crate::models::{Lead, QualityGateThreshold, QualityTier};
use crate::quality::{average_quality_score, calculate_p90_quality_score, sort_by_quality_desc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct QualityGateResult {
    pub tier: QualityTier,
    /// Every lead that met the threshold, highest score first.
    pub passed_leads: Vec<Lead>,
    pub rejected_leads: Vec<Lead>,
    /// `min(passed, requested)`; `requested_count == 0` means no cap.
    pub delivered_count: usize,
    pub rejected_by_quality_count: usize,
    pub min_quality_score_used: u8,
    pub warning: Option<String>,
}

impl QualityGateResult {
    /// The leads actually handed to the export, in delivery order.
    pub fn delivered_leads(&self) -> &[Lead] {
        &self.passed_leads[..self.delivered_count]
    }
}

pub fn passes_threshold(
    lead: &Lead,
    threshold: &QualityGateThreshold,
    is_call_campaign: bool,
) -> bool {
    lead.quality_score >= threshold.min_quality_score
        && lead.match_score >= threshold.min_match_score
        && (!threshold.require_wireless_phone || !is_call_campaign || lead.has_wireless_phone())
}

pub fn apply_quality_gate(
    leads: Vec<Lead>,
    tier: QualityTier,
    requested_count: usize,
    is_call_campaign: bool,
) -> QualityGateResult {
    let threshold = tier.threshold();
    let (mut passed_leads, rejected_leads): (Vec<Lead>, Vec<Lead>) = leads
        .into_iter()
        .partition(|lead| passes_threshold(lead, &threshold, is_call_campaign));
    sort_by_quality_desc(&mut passed_leads);

    let delivered_count = if requested_count == 0 {
        passed_leads.len()
    } else {
        passed_leads.len().min(requested_count)
    };

    let warning = if passed_leads.len() < requested_count {
        let message = format!(
            "Quality tier '{}' delivered {} of {} requested leads; {} lead(s) were below the \
             tier threshold (min quality score {}) and were not used to fill the gap",
            tier,
            passed_leads.len(),
            requested_count,
            rejected_leads.len(),
            threshold.min_quality_score
        );
        tracing::warn!("{}", message);
        Some(message)
    } else {
        None
    };

    tracing::info!(
        "Quality gate '{}': {} passed, {} rejected, {} delivered",
        tier,
        passed_leads.len(),
        rejected_leads.len(),
        delivered_count
    );

    QualityGateResult {
        tier,
        rejected_by_quality_count: rejected_leads.len(),
        passed_leads,
        rejected_leads,
        delivered_count,
        min_quality_score_used: threshold.min_quality_score,
        warning,
    }
}

/// Match-score histogram of delivered leads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScoreHistogram {
    #[serde(rename = "0")]
    pub score0: usize,
    #[serde(rename = "1")]
    pub score1: usize,
    #[serde(rename = "2")]
    pub score2: usize,
    #[serde(rename = "3")]
    pub score3: usize,
    #[serde(rename = "4")]
    pub score4: usize,
    #[serde(rename = "5+")]
    pub score5_plus: usize,
}

impl MatchScoreHistogram {
    fn record(&mut self, match_score: u8) {
        match match_score {
            0 => self.score0 += 1,
            1 => self.score1 += 1,
            2 => self.score2 += 1,
            3 => self.score3 += 1,
            4 => self.score4 += 1,
            _ => self.score5_plus += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub tier: QualityTier,
    pub requested_count: usize,
    pub delivered_count: usize,
    pub rejected_by_quality_count: usize,
    pub min_quality_score_used: u8,
    pub avg_quality_score: f64,
    pub p90_quality_score: u8,
    pub pct_with_wireless: usize,
    pub pct_complete_address: usize,
    pub match_score_histogram: MatchScoreHistogram,
    pub warning: Option<String>,
}

/// Summarize the delivered set of a gate run.
pub fn generate_quality_report(gate: &QualityGateResult, requested_count: usize) -> QualityReport {
    let delivered = gate.delivered_leads();
    let mut histogram = MatchScoreHistogram::default();
    for lead in delivered {
        histogram.record(lead.match_score);
    }

    let with_wireless = delivered.iter().filter(|l| l.has_wireless_phone()).count();
    let complete_address = delivered.iter().filter(|l| l.has_complete_address()).count();

    QualityReport {
        tier: gate.tier,
        requested_count,
        delivered_count: gate.delivered_count,
        rejected_by_quality_count: gate.rejected_by_quality_count,
        min_quality_score_used: gate.min_quality_score_used,
        avg_quality_score: average_quality_score(delivered),
        p90_quality_score: calculate_p90_quality_score(delivered),
        pct_with_wireless: percent(with_wireless, delivered.len()),
        pct_complete_address: percent(complete_address, delivered.len()),
        match_score_histogram: histogram,
        warning: gate.warning.clone(),
    }
}
