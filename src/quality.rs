//! Deterministic 0-100 lead quality scoring and batch statistics.
//!
//! Score = 50 + match bonus + phone bonus + address bonus + email bonus
//! - suppression penalty, clamped to 0..=100.
use crate::identity::status_is_valid;
use crate::lead_mapper::annotate_quality;
use crate::models::{Lead, QualityTier};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const BASE_SCORE: i32 = 50;
pub const SUPPRESSION_PENALTY: i32 = -25;
pub const HIGH_QUALITY_MIN: u8 = 70;
pub const MEDIUM_QUALITY_MIN: u8 = 50;

/// Match-score bands, highest first. The classifier currently emits 0..=3,
/// so only the two lowest bands are reachable; the upper ones are kept for
/// richer match scores.
const MATCH_SCORE_BANDS: [(u8, i32); 4] = [(7, 20), (5, 15), (3, 10), (1, 5)];

fn zip_pattern() -> &'static Regex {
    static ZIP: OnceLock<Regex> = OnceLock::new();
    ZIP.get_or_init(|| Regex::new(r"^\d{5}(-?\d{4})?$").expect("zip pattern compiles"))
}

/// Five-digit ZIP, optionally ZIP+4.
pub fn is_valid_zip(zip: &str) -> bool {
    zip_pattern().is_match(zip.trim())
}

/// Additive components of a lead's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityBreakdown {
    pub base: i32,
    pub match_score_bonus: i32,
    pub phone_bonus: i32,
    pub address_bonus: i32,
    pub email_bonus: i32,
    pub suppression_penalty: i32,
    pub total: u8,
}

pub fn match_score_bonus(match_score: u8) -> i32 {
    MATCH_SCORE_BANDS
        .iter()
        .find(|(min, _)| match_score >= *min)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0)
}

fn phone_bonus(lead: &Lead) -> i32 {
    if lead.has_wireless_phone() {
        20
    } else if !lead.best_phone.trim().is_empty() {
        10
    } else {
        -40
    }
}

fn address_bonus(lead: &Lead) -> i32 {
    if lead.address.trim().chars().count() > 5 && is_valid_zip(&lead.zip) {
        10
    } else if !lead.city.trim().is_empty() && !lead.state.trim().is_empty() {
        5
    } else {
        0
    }
}

fn email_bonus(lead: &Lead) -> i32 {
    if status_is_valid(&lead.email_validation_status) {
        10
    } else if lead.email.contains('@') {
        5
    } else {
        0
    }
}

/// Score a lead. `suppressed` is set by the compliance layer.
pub fn calculate_quality_score_breakdown(lead: &Lead, suppressed: bool) -> QualityBreakdown {
    let match_score_bonus = match_score_bonus(lead.match_score);
    let phone_bonus = phone_bonus(lead);
    let address_bonus = address_bonus(lead);
    let email_bonus = email_bonus(lead);
    let suppression_penalty = if suppressed { SUPPRESSION_PENALTY } else { 0 };

    let raw = BASE_SCORE
        + match_score_bonus
        + phone_bonus
        + address_bonus
        + email_bonus
        + suppression_penalty;

    QualityBreakdown {
        base: BASE_SCORE,
        match_score_bonus,
        phone_bonus,
        address_bonus,
        email_bonus,
        suppression_penalty,
        total: raw.clamp(0, 100) as u8,
    }
}

pub fn calculate_quality_score(lead: &Lead) -> u8 {
    calculate_quality_score_breakdown(lead, false).total
}

/// Batch score distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityStats {
    /// Rounded to one decimal.
    pub avg_quality_score: f64,
    pub max_quality_score: u8,
    pub min_quality_score: u8,
    pub top_decile_score: u8,
    pub high_quality_count: usize,
    pub medium_quality_count: usize,
    pub low_quality_count: usize,
}

pub fn average_quality_score(leads: &[Lead]) -> f64 {
    if leads.is_empty() {
        return 0.0;
    }
    let sum: u64 = leads.iter().map(|l| u64::from(l.quality_score)).sum();
    let avg = sum as f64 / leads.len() as f64;
    (avg * 10.0).round() / 10.0
}

/// Score at index `floor(n * 0.9)` of the ascending-sorted scores.
pub fn calculate_p90_quality_score(leads: &[Lead]) -> u8 {
    let mut scores: Vec<u8> = leads.iter().map(|l| l.quality_score).collect();
    if scores.is_empty() {
        return 0;
    }
    scores.sort_unstable();
    let idx = ((scores.len() as f64) * 0.9).floor() as usize;
    scores[idx.min(scores.len() - 1)]
}

/// Score at the top-decile boundary of the descending-sorted scores.
fn top_decile_score(leads: &[Lead]) -> u8 {
    let mut scores: Vec<u8> = leads.iter().map(|l| l.quality_score).collect();
    if scores.is_empty() {
        return 0;
    }
    scores.sort_unstable_by(|a, b| b.cmp(a));
    let idx = ((scores.len() as f64) * 0.1).floor() as usize;
    scores[idx.min(scores.len() - 1)]
}

pub fn calculate_quality_stats(leads: &[Lead]) -> QualityStats {
    if leads.is_empty() {
        return QualityStats::default();
    }

    let mut stats = QualityStats {
        avg_quality_score: average_quality_score(leads),
        max_quality_score: leads.iter().map(|l| l.quality_score).max().unwrap_or(0),
        min_quality_score: leads.iter().map(|l| l.quality_score).min().unwrap_or(0),
        top_decile_score: top_decile_score(leads),
        ..QualityStats::default()
    };

    for lead in leads {
        match lead.quality_score {
            s if s >= HIGH_QUALITY_MIN => stats.high_quality_count += 1,
            s if s >= MEDIUM_QUALITY_MIN => stats.medium_quality_count += 1,
            _ => stats.low_quality_count += 1,
        }
    }

    stats
}

/// Stable sort, highest score first.
pub fn sort_by_quality_desc(leads: &mut [Lead]) {
    leads.sort_by(|a, b| b.quality_score.cmp(&a.quality_score));
}

/// Score every lead, tag it with `tier`, sort descending and return stats.
pub fn process_leads_with_quality(leads: &mut [Lead], tier: QualityTier) -> QualityStats {
    process_leads_with_suppression(leads, tier, |_| false)
}

/// As [`process_leads_with_quality`], with a per-lead suppression flag.
pub fn process_leads_with_suppression<F>(
    leads: &mut [Lead],
    tier: QualityTier,
    is_suppressed: F,
) -> QualityStats
where
    F: Fn(&Lead) -> bool,
{
    for lead in leads.iter_mut() {
        let score = calculate_quality_score_breakdown(lead, is_suppressed(lead)).total;
        annotate_quality(lead, score, tier);
    }
    sort_by_quality_desc(leads);
    calculate_quality_stats(leads)
}
