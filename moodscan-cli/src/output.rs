//! Terminal rendering of analysis results

use std::collections::BTreeMap;

use moodscan_dsp::Analysis;

/// Ten-segment bar, filled proportionally to `value` in [0, 1].
pub fn energy_bar(value: f64) -> String {
    let filled = ((value * 10.0) as usize).min(10);
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

/// Archetypes ranked by descending score, name breaking ties.
pub fn top_similarities(scores: &BTreeMap<String, f64>, count: usize) -> Vec<(&str, f64)> {
    let mut ranked: Vec<(&str, f64)> = scores.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(count);
    ranked
}

/// Full single-file report.
pub fn print_analysis(analysis: &Analysis, with_similarity: bool) {
    let result = &analysis.mood_result;

    println!("Analysis complete");
    println!("Mood: {}", result.mood);
    println!(
        "Energy: {} {:.1}",
        energy_bar(analysis.features.energy),
        analysis.features.energy
    );
    println!("Tempo: {:.1} BPM", result.corrected_tempo);
    println!("Key: {}", result.key);
    println!("Explanation: {}", result.explanation);

    if with_similarity {
        println!();
        println!("Similar moods:");
        for (name, score) in top_similarities(&result.similarity_scores, 5) {
            println!("  {name}: {score:.2}");
        }
    }
}

/// Compact per-file block for batch output.
pub fn print_batch_summary(analysis: &Analysis) {
    let name = analysis
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| analysis.path.display().to_string());

    println!();
    println!("{name}:");
    println!("  Mood: {}", analysis.mood_result.mood);
    println!("  Energy: {:.2}", analysis.features.energy);
    println!("  Tempo: {:.1} BPM", analysis.mood_result.corrected_tempo);
}
